//! Workspace-level integration tests for mockloc.

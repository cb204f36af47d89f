//! Shared test utilities for the cardroom workspace.

pub mod logging;

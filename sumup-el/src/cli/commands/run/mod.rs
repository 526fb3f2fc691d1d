//! The `run` command: one extract-load pass

mod handler;

pub use handler::{apply_overrides, handle_run_command};

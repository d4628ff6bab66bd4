//! Terminal display and formatting utilities.
//!
//! Handles colorized JSON output, token rendering, and severity-tagged
//! messages for human-readable terminal output. Everything returns
//! strings; the caller decides where they go.

pub mod json_printer;
pub mod token_status;
pub mod token_view;

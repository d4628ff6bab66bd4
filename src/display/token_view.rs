//! Rendering of decoded tokens, generated tokens and status messages.

use chrono::Utc;
use colored::Colorize;
use serde_json::Value;

use crate::core::dispatcher::{Severity, TokenView};
use crate::display::json_printer::render_json;
use crate::display::token_status::timestamp_lines;

/// Header, payload, signature, algorithm and time claims as one block.
pub fn render_token(view: TokenView<'_>) -> String {
    let mut out = String::new();

    section(&mut out, "Header");
    out.push_str(&render_json(&Value::Object(view.header.fields().clone())));
    out.push('\n');

    section(&mut out, "Payload");
    out.push_str(&render_json(&Value::Object(view.claims.fields().clone())));
    out.push('\n');

    section(&mut out, "Signature");
    if view.signature.is_empty() {
        out.push_str(&"(empty)".dimmed().to_string());
    } else {
        out.push_str(view.signature);
    }
    out.push('\n');

    let algorithm = view.header.alg().unwrap_or("(missing)");
    out.push_str(&format!("\nAlgorithm: {}\n", algorithm.bold()));

    let timestamps = timestamp_lines(view.claims, Utc::now());
    if !timestamps.is_empty() {
        section(&mut out, "Token Status");
        for line in timestamps {
            out.push_str(&line);
            out.push('\n');
        }
    }

    out
}

fn section(out: &mut String, title: &str) {
    out.push_str(&format!("\n{}\n", format!("--- {title} ---").bold().blue()));
}

/// A one-line message with a severity marker.
pub fn render_message(severity: Severity, message: &str) -> String {
    match severity {
        Severity::Success => format!("✓ {message}").bold().green().to_string(),
        Severity::Warning => format!("! {message}").bold().yellow().to_string(),
        Severity::Error => format!("✗ {message}").bold().red().to_string(),
    }
}

/// The freshly generated token, ready to copy.
pub fn render_new_token(token: &str) -> String {
    format!("\n{}\n{}\n", "New JWT:".bold(), token.green())
}

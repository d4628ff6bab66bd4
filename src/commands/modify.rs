//! Handler for the `modify` subcommand.
//!
//! Runs the interactive dispatcher on the terminal. Stdin is the prompt
//! input here, so the token comes from the argument, the environment, or
//! the first prompt.

use std::io;

use anyhow::Result;

use crate::cli::ModifyArgs;
use crate::clipboard::{Clipboard, SystemClipboard};
use crate::core::dispatcher::Dispatcher;
use crate::input::resolve_optional_token;
use crate::terminal::TerminalInteraction;

/// Execute the `modify` subcommand. Returns `false` when the last flow
/// ended in an error, which the dispatcher has already reported.
pub fn execute(args: &ModifyArgs) -> Result<bool> {
    let initial = resolve_optional_token(args.token.as_deref(), args.token_env.as_deref())?;

    let stdin = io::stdin();
    let mut ui = TerminalInteraction::new(stdin.lock(), io::stdout());
    let mut system_clipboard = SystemClipboard::default();
    let clipboard: Option<&mut dyn Clipboard> = if args.no_clipboard {
        None
    } else {
        Some(&mut system_clipboard)
    };

    let termination = Dispatcher::new(&mut ui, clipboard).run_interactive(initial)?;
    if let Some(class) = termination.error_class() {
        tracing::debug!(?class, "last flow failed");
        return Ok(false);
    }
    Ok(true)
}

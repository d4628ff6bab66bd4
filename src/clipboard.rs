//! Clipboard integration for generated tokens.
//!
//! Copying is best-effort: callers report a failure and carry on.

use anyhow::{Context, Result};

/// Something a finished token can be copied into.
pub trait Clipboard {
    fn copy(&mut self, text: &str) -> Result<()>;
}

/// The desktop clipboard.
///
/// The handle is opened on first use and kept for the rest of the
/// session: on X11 the copied text is served by the process that owns it.
#[derive(Default)]
pub struct SystemClipboard {
    inner: Option<arboard::Clipboard>,
}

impl Clipboard for SystemClipboard {
    fn copy(&mut self, text: &str) -> Result<()> {
        if self.inner.is_none() {
            self.inner = Some(arboard::Clipboard::new().context("clipboard is unavailable")?);
        }
        if let Some(clipboard) = self.inner.as_mut() {
            clipboard
                .set_text(text.to_owned())
                .context("clipboard rejected the token")?;
        }
        Ok(())
    }
}

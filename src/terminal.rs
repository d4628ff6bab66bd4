//! Line-oriented terminal front end for the dispatcher.
//!
//! [`TerminalInteraction`] implements [`Interaction`] over any reader and
//! writer, so the prompts can be exercised with in-memory buffers. End of
//! input always counts as the user backing out.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use zeroize::Zeroizing;

use crate::core::algorithm::SUPPORTED_ALGORITHMS;
use crate::core::codec::{self, Claims, Header, JsonObject};
use crate::core::dispatcher::{EditAction, Interaction, KeyPurpose, Severity, TokenView};
use crate::core::session::{Session, parse_field_value, parse_json_object};
use crate::display::json_printer::render_json;
use crate::display::token_view::{render_message, render_new_token, render_token};

const MAIN_MENU: [&str; 5] = [
    "View JWT",
    "Modify Header",
    "Modify Payload",
    "Generate New JWT",
    "Exit",
];

const HEADER_MENU: [&str; 6] = [
    "Modify algorithm (alg)",
    "Modify type (typ)",
    "Add or replace field",
    "Remove field",
    "Save and return",
    "Cancel modifications",
];

const PAYLOAD_MENU: [&str; 5] = [
    "Add or replace claim",
    "Remove claim",
    "Replace with JSON",
    "Save and return",
    "Cancel modifications",
];

pub struct TerminalInteraction<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> TerminalInteraction<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Print `text`, read one trimmed line. `None` on end of input.
    fn prompt(&mut self, text: &str) -> io::Result<Option<String>> {
        write!(self.output, "\n{text}: ")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            writeln!(self.output)?;
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    /// Like [`Self::prompt`], but `exit` also backs out and blank answers
    /// are asked again.
    fn prompt_required(&mut self, text: &str, what: &str) -> io::Result<Option<String>> {
        loop {
            match self.prompt(text)? {
                None => return Ok(None),
                Some(answer) if answer.eq_ignore_ascii_case("exit") => return Ok(None),
                Some(answer) if answer.is_empty() => {
                    self.say(Severity::Error, &format!("{what} cannot be empty. Please try again."))?;
                }
                Some(answer) => return Ok(Some(answer)),
            }
        }
    }

    /// Show a numbered menu; returns the zero-based choice.
    fn menu(&mut self, title: &str, options: &[&str]) -> io::Result<Option<usize>> {
        writeln!(self.output, "\n{title}")?;
        for (i, option) in options.iter().enumerate() {
            writeln!(self.output, "[{}] {option}", i + 1)?;
        }

        let range = format!("1-{}", options.len());
        loop {
            let Some(answer) = self.prompt(&format!("Select an option ({range})"))? else {
                return Ok(None);
            };
            match answer.parse::<usize>() {
                Ok(n) if (1..=options.len()).contains(&n) => return Ok(Some(n - 1)),
                _ => writeln!(self.output, "Invalid choice. Please select from {range}.")?,
            }
        }
    }

    fn say(&mut self, severity: Severity, message: &str) -> io::Result<()> {
        writeln!(self.output, "\n{}", render_message(severity, message))
    }

    fn show_object(&mut self, title: &str, fields: &JsonObject) -> io::Result<()> {
        writeln!(
            self.output,
            "\nCurrent {title}:\n{}",
            render_json(&serde_json::Value::Object(fields.clone()))
        )
    }

    /// Pick one of `fields` by number.
    fn pick_field(&mut self, fields: &JsonObject) -> io::Result<Option<String>> {
        if fields.is_empty() {
            self.say(Severity::Warning, "There are no fields to remove.")?;
            return Ok(None);
        }
        let names: Vec<&str> = fields.keys().map(String::as_str).collect();
        Ok(self.menu("Available fields:", &names)?.map(|i| names[i].to_string()))
    }

    /// Ask for a field name and a value using the scalar-or-string rule.
    fn read_field(&mut self) -> io::Result<Option<(String, serde_json::Value)>> {
        let Some(name) = self.prompt("Enter field name")? else {
            return Ok(None);
        };
        if name.is_empty() {
            return Ok(None);
        }
        let Some(value) = self.prompt("Enter field value")? else {
            return Ok(None);
        };
        Ok(Some((name, parse_field_value(&value))))
    }

    fn edit_header(&mut self, original: &Header) -> io::Result<Header> {
        let mut header = original.clone();
        loop {
            self.show_object("header", header.fields())?;
            let Some(choice) = self.menu("Header modification options:", &HEADER_MENU)? else {
                return Ok(original.clone());
            };
            header = match choice {
                0 => match self.menu("Available algorithms:", &SUPPORTED_ALGORITHMS)? {
                    Some(i) => header.with_alg(SUPPORTED_ALGORITHMS[i]),
                    None => header,
                },
                1 => match self.prompt("Enter new type (default 'JWT')")? {
                    Some(typ) if !typ.is_empty() => header.with_field("typ", typ.into()),
                    Some(_) => header.with_field("typ", "JWT".into()),
                    None => header,
                },
                2 => match self.read_field()? {
                    Some((name, value)) => header.with_field(&name, value),
                    None => header,
                },
                3 => match self.pick_field(header.fields())? {
                    Some(name) => header.without_field(&name),
                    None => header,
                },
                4 => return Ok(header),
                _ => return Ok(original.clone()),
            };
        }
    }

    fn edit_claims(&mut self, original: &Claims) -> io::Result<Claims> {
        let mut claims = original.clone();
        loop {
            self.show_object("payload", claims.fields())?;
            let Some(choice) = self.menu("Payload modification options:", &PAYLOAD_MENU)? else {
                return Ok(original.clone());
            };
            claims = match choice {
                0 => match self.read_field()? {
                    Some((name, value)) => claims.with_field(&name, value),
                    None => claims,
                },
                1 => match self.pick_field(claims.fields())? {
                    Some(name) => claims.without_field(&name),
                    None => claims,
                },
                2 => match self.prompt("Enter new payload as a JSON object (blank to keep)")? {
                    Some(text) if !text.is_empty() => match parse_json_object(&text, "payload") {
                        Ok(object) => Claims::new(object),
                        Err(e) => {
                            self.say(Severity::Error, &e.to_string())?;
                            claims
                        }
                    },
                    _ => claims,
                },
                3 => return Ok(claims),
                _ => return Ok(original.clone()),
            };
        }
    }
}

impl<R: BufRead, W: Write> Interaction for TerminalInteraction<R, W> {
    fn request_token(&mut self) -> io::Result<Option<String>> {
        loop {
            let Some(token) = self.prompt("Enter your JWT (or 'exit' to quit)")? else {
                return Ok(None);
            };
            if token.is_empty() || token.eq_ignore_ascii_case("exit") {
                return Ok(None);
            }
            if codec::is_well_formed(&token) {
                return Ok(Some(token));
            }
            self.say(Severity::Error, "Invalid JWT format. Please try again.")?;
        }
    }

    fn request_secret(&mut self) -> io::Result<Option<Zeroizing<String>>> {
        Ok(self
            .prompt_required("Enter secret key (or type 'exit' to quit)", "Secret key")?
            .map(Zeroizing::new))
    }

    fn request_key_path(&mut self, purpose: KeyPurpose) -> io::Result<Option<PathBuf>> {
        let text = match purpose {
            KeyPurpose::Verify => "Enter path to public key file (or 'exit' to quit)",
            KeyPurpose::Sign => "Enter path to private key file (or 'exit' to quit)",
        };
        Ok(self.prompt_required(text, "File path")?.map(PathBuf::from))
    }

    fn confirm(&mut self, question: &str) -> io::Result<bool> {
        loop {
            let Some(answer) = self.prompt(&format!("{question} (y/n)"))? else {
                return Ok(false);
            };
            match answer.to_ascii_lowercase().as_str() {
                "y" | "yes" => return Ok(true),
                "n" | "no" => return Ok(false),
                _ => writeln!(self.output, "Please enter 'y' or 'n'")?,
            }
        }
    }

    fn next_action(&mut self, session: &Session) -> io::Result<EditAction> {
        let Some(choice) = self.menu("MAIN MENU", &MAIN_MENU)? else {
            return Ok(EditAction::Exit);
        };
        Ok(match choice {
            0 => EditAction::View,
            1 => EditAction::ReplaceHeader(self.edit_header(session.header())?),
            2 => EditAction::ReplaceClaims(self.edit_claims(session.claims())?),
            3 => EditAction::Generate,
            _ => EditAction::Exit,
        })
    }

    fn show_token(&mut self, view: TokenView<'_>) {
        let rendered = render_token(view);
        if let Err(e) = write!(self.output, "{rendered}") {
            tracing::warn!(error = %e, "failed to write token view");
        }
    }

    fn show_new_token(&mut self, token: &str) {
        if let Err(e) = write!(self.output, "{}", render_new_token(token)) {
            tracing::warn!(error = %e, "failed to write generated token");
        }
    }

    fn notify(&mut self, severity: Severity, message: &str) {
        if let Err(e) = self.say(severity, message) {
            tracing::warn!(error = %e, "failed to write message");
        }
    }
}

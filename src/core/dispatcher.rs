//! The verification and re-signing state machine.
//!
//! ```text
//! Start -> Decoded -> NoneFlow | HmacFlow | RsaFlow | (unsupported) -> EditLoop -> Terminated
//! ```
//!
//! A token only reaches the edit loop after its tier's verification
//! protocol succeeds. All user I/O goes through the [`Interaction`]
//! collaborator; the dispatcher never prints anything itself.

use std::io;
use std::path::{Path, PathBuf};

use zeroize::Zeroizing;

use crate::clipboard::Clipboard;
use crate::core::algorithm::AlgorithmTier;
use crate::core::codec::{self, Claims, DecodedToken, Header};
use crate::core::keys::{self, SigningKey};
use crate::core::session::Session;
use crate::core::signer;
use crate::core::verifier;
use crate::error::{ErrorClass, JwtForgeError};

/// Severity tag attached to every message handed to the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Warning,
    Error,
}

/// Which half of an RSA key pair is being requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyPurpose {
    /// Public key, used to verify the incoming token.
    Verify,
    /// Private key, used later to re-sign.
    Sign,
}

/// A header/payload/signature triple to display.
#[derive(Debug, Clone, Copy)]
pub struct TokenView<'a> {
    pub header: &'a Header,
    pub claims: &'a Claims,
    /// The raw signature segment, or a placeholder for unsigned drafts.
    pub signature: &'a str,
}

/// One step of the edit loop, as chosen by the user.
#[derive(Debug)]
pub enum EditAction {
    /// Show the current header and claims.
    View,
    /// Replace the header with an edited copy.
    ReplaceHeader(Header),
    /// Replace the claims with an edited copy.
    ReplaceClaims(Claims),
    /// Sign the current header and claims.
    Generate,
    Exit,
}

/// How a flow ended.
#[derive(Debug)]
pub enum Termination {
    /// The user left the edit loop.
    Normal,
    /// The user aborted before reaching the edit loop.
    Cancelled,
    /// The token cannot be processed.
    Failed(JwtForgeError),
}

impl Termination {
    /// The class of the error that ended the flow, if it failed.
    pub fn error_class(&self) -> Option<ErrorClass> {
        match self {
            Self::Failed(error) => Some(error.class()),
            Self::Normal | Self::Cancelled => None,
        }
    }
}

/// The interactive collaborator: prompts and presentation.
///
/// Prompt methods return `Ok(None)` when the user aborts.
pub trait Interaction {
    /// Ask for a token to process.
    fn request_token(&mut self) -> io::Result<Option<String>>;

    /// Ask for the HMAC shared secret.
    fn request_secret(&mut self) -> io::Result<Option<Zeroizing<String>>>;

    /// Ask for the path of an RSA key file.
    fn request_key_path(&mut self, purpose: KeyPurpose) -> io::Result<Option<PathBuf>>;

    /// Ask a yes/no question.
    fn confirm(&mut self, question: &str) -> io::Result<bool>;

    /// Ask for the next edit-loop action.
    fn next_action(&mut self, session: &Session) -> io::Result<EditAction>;

    fn show_token(&mut self, view: TokenView<'_>);

    fn show_new_token(&mut self, token: &str);

    fn notify(&mut self, severity: Severity, message: &str);
}

enum State {
    Start(String),
    Decoded(String, DecodedToken),
    NoneFlow(DecodedToken),
    HmacFlow(String, DecodedToken, AlgorithmTier),
    RsaFlow(String, DecodedToken, AlgorithmTier),
    EditLoop(Session),
    Terminated(Termination),
}

/// Drives one token at a time through the state machine.
pub struct Dispatcher<'a, I: Interaction> {
    ui: &'a mut I,
    clipboard: Option<&'a mut dyn Clipboard>,
}

impl<'a, I: Interaction> Dispatcher<'a, I> {
    /// Build a dispatcher. With `clipboard` set to `None`, generated tokens
    /// are only displayed.
    pub fn new(ui: &'a mut I, clipboard: Option<&'a mut dyn Clipboard>) -> Self {
        Self { ui, clipboard }
    }

    /// Process `initial` if given; otherwise keep requesting tokens until
    /// the user stops. Returns how the last flow ended.
    pub fn run_interactive(&mut self, initial: Option<String>) -> io::Result<Termination> {
        if let Some(token) = initial {
            return self.run(token);
        }

        let mut last = Termination::Normal;
        while let Some(token) = self.ui.request_token()? {
            last = self.run(token)?;
            if !self.ui.confirm("Inspect another token?")? {
                break;
            }
        }
        Ok(last)
    }

    /// Run a single token from `Start` to `Terminated`.
    ///
    /// Errors are reported through [`Interaction::notify`] and returned as
    /// [`Termination::Failed`]; only terminal I/O failures are `Err`.
    pub fn run(&mut self, token: String) -> io::Result<Termination> {
        let mut state = State::Start(token);
        loop {
            state = match state {
                State::Terminated(termination) => {
                    tracing::info!(
                        ?termination,
                        error_class = ?termination.error_class(),
                        "flow terminated"
                    );
                    return Ok(termination);
                }
                State::Start(token) => self.decode(token),
                State::Decoded(token, decoded) => self.classify(token, decoded),
                State::NoneFlow(decoded) => self.none_flow(decoded),
                State::HmacFlow(token, decoded, tier) => self.hmac_flow(&token, decoded, tier)?,
                State::RsaFlow(token, decoded, tier) => self.rsa_flow(&token, decoded, tier)?,
                State::EditLoop(session) => self.edit_loop(session)?,
            };
        }
    }

    fn decode(&mut self, token: String) -> State {
        match codec::decode(&token) {
            Ok(decoded) => {
                self.ui.show_token(TokenView {
                    header: &decoded.header,
                    claims: &decoded.claims,
                    signature: &decoded.signature,
                });
                State::Decoded(token, decoded)
            }
            Err(e) => self.fail(e),
        }
    }

    fn classify(&mut self, token: String, decoded: DecodedToken) -> State {
        let tier = match decoded.header.tier() {
            Ok(tier) => tier,
            Err(e) => return self.fail(e),
        };
        tracing::info!(algorithm = %tier, family = tier.family(), "classified token");

        match tier {
            AlgorithmTier::None => State::NoneFlow(decoded),
            AlgorithmTier::Hmac(_) => {
                self.ui.notify(
                    Severity::Warning,
                    &format!("{tier} algorithm detected. Secret key required for verification."),
                );
                State::HmacFlow(token, decoded, tier)
            }
            AlgorithmTier::Rsa(_) => {
                self.ui.notify(
                    Severity::Warning,
                    &format!("{tier} algorithm detected. Public key required for verification."),
                );
                State::RsaFlow(token, decoded, tier)
            }
            AlgorithmTier::Unsupported(algorithm) => {
                self.fail(JwtForgeError::UnsupportedAlgorithm { algorithm })
            }
        }
    }

    fn none_flow(&mut self, decoded: DecodedToken) -> State {
        self.ui.notify(
            Severity::Success,
            "'none' algorithm detected. Direct modification allowed.",
        );
        State::EditLoop(Session::new(
            decoded.header,
            decoded.claims,
            AlgorithmTier::None,
            None,
        ))
    }

    fn hmac_flow(
        &mut self,
        token: &str,
        decoded: DecodedToken,
        tier: AlgorithmTier,
    ) -> io::Result<State> {
        loop {
            let Some(secret) = self.ui.request_secret()? else {
                return Ok(State::Terminated(Termination::Cancelled));
            };
            if secret.is_empty() {
                self.ui
                    .notify(Severity::Error, "Secret key cannot be empty. Please try again.");
                continue;
            }

            match verifier::verify_hmac(token, &secret) {
                Ok(true) => {
                    self.ui
                        .notify(Severity::Success, "Verification successful! Valid JWT.");
                    let key = SigningKey::HmacSecret(secret);
                    return Ok(State::EditLoop(Session::new(
                        decoded.header,
                        decoded.claims,
                        tier,
                        Some(key),
                    )));
                }
                Ok(false) => {
                    self.ui
                        .notify(Severity::Error, "Invalid secret key. Verification failed.");
                }
                Err(e) if e.class() == ErrorClass::InvalidKey => {
                    self.ui.notify(Severity::Error, &e.to_string());
                }
                Err(e) => return Ok(self.fail(e)),
            }

            if !self.ui.confirm("Try again?")? {
                return Ok(State::Terminated(Termination::Cancelled));
            }
        }
    }

    fn rsa_flow(
        &mut self,
        token: &str,
        decoded: DecodedToken,
        tier: AlgorithmTier,
    ) -> io::Result<State> {
        let public_key = loop {
            let Some(path) = self.ui.request_key_path(KeyPurpose::Verify)? else {
                return Ok(State::Terminated(Termination::Cancelled));
            };

            let outcome =
                keys::load_key_file(&path).and_then(|pem| Ok((verifier::verify_rsa(token, &pem)?, pem)));
            match outcome {
                Ok((true, pem)) => {
                    self.ui
                        .notify(Severity::Success, "Verification successful! Valid JWT.");
                    break pem;
                }
                Ok((false, _)) => {
                    self.ui
                        .notify(Severity::Error, "Invalid public key. Verification failed.");
                }
                Err(e) if e.class() == ErrorClass::InvalidKey => {
                    self.ui.notify(Severity::Error, &e.to_string());
                }
                Err(e) => return Ok(self.fail(e)),
            }

            if !self.ui.confirm("Try again?")? {
                return Ok(State::Terminated(Termination::Cancelled));
            }
        };

        let private_key = loop {
            let Some(path) = self.ui.request_key_path(KeyPurpose::Sign)? else {
                return Ok(State::Terminated(Termination::Cancelled));
            };

            match load_private_key(&path) {
                Ok(pem) => break pem,
                Err(e) => self.ui.notify(Severity::Error, &e.to_string()),
            }

            if !self.ui.confirm("Try again?")? {
                return Ok(State::Terminated(Termination::Cancelled));
            }
        };

        if !key_pair_matches(&decoded, &tier, &private_key, &public_key) {
            self.ui.notify(
                Severity::Warning,
                "The private key does not match the verified public key; \
                 re-signed tokens will not verify against it.",
            );
        }

        Ok(State::EditLoop(Session::new(
            decoded.header,
            decoded.claims,
            tier,
            Some(SigningKey::RsaPrivate(private_key)),
        )))
    }

    fn edit_loop(&mut self, mut session: Session) -> io::Result<State> {
        tracing::info!(
            verified = %session.verified_tier(),
            keyed = session.has_key(),
            "entered edit loop"
        );

        loop {
            match self.ui.next_action(&session)? {
                EditAction::View => self.ui.show_token(TokenView {
                    header: session.header(),
                    claims: session.claims(),
                    signature: "...",
                }),
                EditAction::ReplaceHeader(header) => {
                    if &header == session.header() {
                        continue;
                    }
                    let warning = session.replace_header(header);
                    self.ui.notify(Severity::Success, "Header updated!");
                    if let Some(warning) = warning {
                        self.ui.notify(Severity::Warning, &warning);
                    }
                }
                EditAction::ReplaceClaims(claims) => {
                    if &claims == session.claims() {
                        continue;
                    }
                    session.replace_claims(claims);
                    self.ui.notify(Severity::Success, "Payload updated!");
                }
                EditAction::Generate => self.generate(&session),
                EditAction::Exit => return Ok(State::Terminated(Termination::Normal)),
            }
        }
    }

    fn generate(&mut self, session: &Session) {
        let token = match session.generate() {
            Ok(token) => token,
            Err(e) => {
                self.ui.notify(Severity::Error, &e.to_string());
                return;
            }
        };

        self.ui.show_new_token(&token);

        if let Some(clipboard) = self.clipboard.as_deref_mut() {
            match clipboard.copy(&token) {
                Ok(()) => self.ui.notify(Severity::Success, "Token copied to clipboard."),
                Err(e) => {
                    tracing::warn!(error = %e, "clipboard copy failed");
                    self.ui.notify(
                        Severity::Warning,
                        &format!("Could not copy the token to the clipboard: {e}"),
                    );
                }
            }
        }
    }

    fn fail(&mut self, error: JwtForgeError) -> State {
        self.ui.notify(Severity::Error, &error.to_string());
        State::Terminated(Termination::Failed(error))
    }
}

fn load_private_key(path: &Path) -> Result<Zeroizing<String>, JwtForgeError> {
    let pem = keys::load_key_file(path)?;
    signer::rsa_private_key(&pem)?;
    Ok(pem)
}

/// Sign the original claims with the private key and check the result
/// against the public key that verified the token.
fn key_pair_matches(
    decoded: &DecodedToken,
    tier: &AlgorithmTier,
    private_pem: &str,
    public_pem: &str,
) -> bool {
    signer::sign_rsa(decoded.header.clone(), &decoded.claims, private_pem, tier.alg())
        .and_then(|probe| verifier::verify_rsa(&probe, public_pem))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    use serde_json::json;

    const HS256_TOKEN: &str = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9.eyJzdWIiOiJ1MSJ9.\
                               zV82i2lDYQX6-C8iCQE6vu5jdANOVH7zRXC8vMn3kt0";
    const NONE_TOKEN: &str = "eyJhbGciOiJub25lIiwidHlwIjoiSldUIn0.eyJzdWIiOiJ1MSJ9.";
    const RS256_TOKEN: &str = include_str!("../../tests/fixtures/rs256_token.jwt");

    fn fixture(name: &str) -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("tests/fixtures")
            .join(name)
    }

    /// Replays canned answers and records everything shown.
    #[derive(Default)]
    struct Script {
        tokens: VecDeque<String>,
        secrets: VecDeque<String>,
        paths: VecDeque<PathBuf>,
        confirms: VecDeque<bool>,
        actions: VecDeque<Box<dyn FnOnce(&Session) -> EditAction>>,
        messages: Vec<(Severity, String)>,
        shown: usize,
        generated: Vec<String>,
    }

    impl Script {
        fn action(mut self, f: impl FnOnce(&Session) -> EditAction + 'static) -> Self {
            self.actions.push_back(Box::new(f));
            self
        }

        fn has_message(&self, severity: Severity, needle: &str) -> bool {
            self.messages
                .iter()
                .any(|(s, m)| *s == severity && m.contains(needle))
        }
    }

    impl Interaction for Script {
        fn request_token(&mut self) -> io::Result<Option<String>> {
            Ok(self.tokens.pop_front())
        }

        fn request_secret(&mut self) -> io::Result<Option<Zeroizing<String>>> {
            Ok(self.secrets.pop_front().map(Zeroizing::new))
        }

        fn request_key_path(&mut self, _purpose: KeyPurpose) -> io::Result<Option<PathBuf>> {
            Ok(self.paths.pop_front())
        }

        fn confirm(&mut self, _question: &str) -> io::Result<bool> {
            Ok(self.confirms.pop_front().unwrap_or(false))
        }

        fn next_action(&mut self, session: &Session) -> io::Result<EditAction> {
            Ok(match self.actions.pop_front() {
                Some(f) => f(session),
                None => EditAction::Exit,
            })
        }

        fn show_token(&mut self, _view: TokenView<'_>) {
            self.shown += 1;
        }

        fn show_new_token(&mut self, token: &str) {
            self.generated.push(token.to_string());
        }

        fn notify(&mut self, severity: Severity, message: &str) {
            self.messages.push((severity, message.to_string()));
        }
    }

    #[derive(Default)]
    struct RecordingClipboard {
        copied: Vec<String>,
        fail: bool,
    }

    impl Clipboard for RecordingClipboard {
        fn copy(&mut self, text: &str) -> anyhow::Result<()> {
            if self.fail {
                anyhow::bail!("no display");
            }
            self.copied.push(text.to_string());
            Ok(())
        }
    }

    fn run(script: &mut Script, clipboard: &mut RecordingClipboard, token: &str) -> Termination {
        Dispatcher::new(script, Some(clipboard))
            .run(token.trim().to_string())
            .unwrap()
    }

    #[test]
    fn test_hmac_verify_edit_and_resign() {
        let mut script = Script {
            secrets: VecDeque::from(["s3cr3t".to_string()]),
            ..Default::default()
        }
        .action(|s| EditAction::ReplaceClaims(s.claims().clone().with_field("admin", json!(true))))
        .action(|_| EditAction::Generate);
        let mut clipboard = RecordingClipboard::default();

        let termination = run(&mut script, &mut clipboard, HS256_TOKEN);

        assert!(matches!(termination, Termination::Normal));
        assert_eq!(script.generated.len(), 1);
        let token = &script.generated[0];
        let decoded = codec::decode(token).unwrap();
        assert_eq!(decoded.header.alg().unwrap(), "HS256");
        assert_eq!(
            serde_json::to_value(&decoded.claims).unwrap(),
            json!({"sub": "u1", "admin": true})
        );
        assert!(verifier::verify_hmac(token, "s3cr3t").unwrap());
        assert_eq!(clipboard.copied, vec![token.clone()]);
        assert!(script.has_message(Severity::Success, "Verification successful"));
    }

    #[test]
    fn test_none_token_cannot_be_upgraded_without_key() {
        let mut script = Script::default()
            .action(|s| EditAction::ReplaceHeader(s.header().clone().with_alg("HS256")))
            .action(|_| EditAction::Generate);
        let mut clipboard = RecordingClipboard::default();

        let termination = run(&mut script, &mut clipboard, NONE_TOKEN);

        assert!(matches!(termination, Termination::Normal));
        assert!(script.generated.is_empty());
        assert!(clipboard.copied.is_empty());
        assert!(script.has_message(Severity::Error, "invalid key"));
    }

    #[test]
    fn test_none_token_enters_edit_loop_directly() {
        let mut script = Script::default().action(|_| EditAction::Generate);
        let mut clipboard = RecordingClipboard::default();

        let termination = run(&mut script, &mut clipboard, NONE_TOKEN);

        assert!(matches!(termination, Termination::Normal));
        assert_eq!(script.generated, vec![NONE_TOKEN.to_string()]);
    }

    #[test]
    fn test_wrong_secret_then_retry_declined_cancels() {
        let mut script = Script {
            secrets: VecDeque::from(["wrong".to_string()]),
            confirms: VecDeque::from([false]),
            ..Default::default()
        };
        let mut clipboard = RecordingClipboard::default();

        let termination = run(&mut script, &mut clipboard, HS256_TOKEN);

        assert!(matches!(termination, Termination::Cancelled));
        assert!(script.has_message(Severity::Error, "Verification failed"));
    }

    #[test]
    fn test_wrong_secret_then_right_secret() {
        let mut script = Script {
            secrets: VecDeque::from(["wrong".to_string(), "s3cr3t".to_string()]),
            confirms: VecDeque::from([true]),
            ..Default::default()
        }
        .action(|_| EditAction::Generate);
        let mut clipboard = RecordingClipboard::default();

        let termination = run(&mut script, &mut clipboard, HS256_TOKEN);

        assert!(matches!(termination, Termination::Normal));
        assert_eq!(script.generated, vec![HS256_TOKEN.to_string()]);
    }

    #[test]
    fn test_secret_prompt_abort_cancels() {
        let mut script = Script::default();
        let mut clipboard = RecordingClipboard::default();
        let termination = run(&mut script, &mut clipboard, HS256_TOKEN);
        assert!(matches!(termination, Termination::Cancelled));
    }

    #[test]
    fn test_malformed_token_fails() {
        let mut script = Script::default();
        let mut clipboard = RecordingClipboard::default();

        let termination = run(&mut script, &mut clipboard, "abc.def");

        assert!(matches!(
            termination,
            Termination::Failed(JwtForgeError::InvalidTokenFormat)
        ));
        assert_eq!(script.shown, 0);
        assert!(script.has_message(Severity::Error, "invalid token format"));
        assert_eq!(termination.error_class(), Some(ErrorClass::MalformedToken));
    }

    #[test]
    fn test_unsupported_algorithm_never_reaches_edit_loop() {
        // {"alg":"ES256","typ":"JWT"} / {}
        let mut script = Script::default().action(|_| panic!("edit loop must not run"));
        let mut clipboard = RecordingClipboard::default();

        let termination = run(
            &mut script,
            &mut clipboard,
            "eyJhbGciOiJFUzI1NiIsInR5cCI6IkpXVCJ9.e30.c2ln",
        );

        assert!(matches!(
            termination,
            Termination::Failed(JwtForgeError::UnsupportedAlgorithm { .. })
        ));
        assert_eq!(
            termination.error_class(),
            Some(ErrorClass::UnsupportedAlgorithm)
        );
        assert_eq!(script.shown, 1);
    }

    #[test]
    fn test_rsa_flow_verifies_and_resigns() {
        let mut script = Script {
            paths: VecDeque::from([fixture("rsa_public.pem"), fixture("rsa_private.pem")]),
            ..Default::default()
        }
        .action(|s| EditAction::ReplaceHeader(s.header().clone().with_alg("RS512")))
        .action(|_| EditAction::Generate);
        let mut clipboard = RecordingClipboard::default();

        let termination = run(&mut script, &mut clipboard, RS256_TOKEN);

        assert!(matches!(termination, Termination::Normal));
        let token = &script.generated[0];
        assert_eq!(codec::decode(token).unwrap().header.alg().unwrap(), "RS512");
        let public = std::fs::read_to_string(fixture("rsa_public.pem")).unwrap();
        assert!(verifier::verify_rsa(token, &public).unwrap());
        assert!(!script.has_message(Severity::Warning, "does not match"));
    }

    #[test]
    fn test_rsa_flow_missing_key_file_offers_retry() {
        let mut script = Script {
            paths: VecDeque::from([
                fixture("missing.pem"),
                fixture("other_rsa_public.pem"),
                fixture("rsa_public.pem"),
                fixture("other_rsa_private.pem"),
            ]),
            confirms: VecDeque::from([true, true]),
            ..Default::default()
        };
        let mut clipboard = RecordingClipboard::default();

        let termination = run(&mut script, &mut clipboard, RS256_TOKEN);

        assert!(matches!(termination, Termination::Normal));
        assert!(script.has_message(Severity::Error, "file not found"));
        assert!(script.has_message(Severity::Error, "Invalid public key"));
        assert!(script.has_message(Severity::Warning, "does not match"));
    }

    #[test]
    fn test_rsa_flow_public_key_as_private_key_is_rejected() {
        let mut script = Script {
            paths: VecDeque::from([fixture("rsa_public.pem"), fixture("rsa_public.pem")]),
            confirms: VecDeque::from([false]),
            ..Default::default()
        };
        let mut clipboard = RecordingClipboard::default();

        let termination = run(&mut script, &mut clipboard, RS256_TOKEN);

        assert!(matches!(termination, Termination::Cancelled));
        assert!(script.has_message(Severity::Error, "expected an RSA private key"));
    }

    #[test]
    fn test_clipboard_failure_is_only_a_warning() {
        let mut script = Script::default().action(|_| EditAction::Generate);
        let mut clipboard = RecordingClipboard {
            fail: true,
            ..Default::default()
        };

        let termination = run(&mut script, &mut clipboard, NONE_TOKEN);

        assert!(matches!(termination, Termination::Normal));
        assert_eq!(script.generated.len(), 1);
        assert!(script.has_message(Severity::Warning, "clipboard"));
    }

    #[test]
    fn test_run_interactive_loops_over_tokens() {
        let mut script = Script {
            tokens: VecDeque::from(["abc.def".to_string(), NONE_TOKEN.to_string()]),
            confirms: VecDeque::from([true, false]),
            ..Default::default()
        };

        let termination = Dispatcher::new(&mut script, None)
            .run_interactive(None)
            .unwrap();

        assert!(matches!(termination, Termination::Normal));
        assert_eq!(script.shown, 1);
    }
}

// Chat session: relays one line at a time between the terminal and a chat
// provider. Each turn is a single stateless request; nothing from earlier
// turns is sent again.

use anyhow::Result;
use serde_json::Value;
use std::io::Write;
use tracing::{info, warn};

use crate::api::HttpTransport;
use crate::config::{Credential, ProviderSettings};
use crate::error::ChatError;
use crate::provider::Provider;
use crate::ui::{self, Prompter, ReadOutcome};

/// What the user typed at the chat prompt, classified before any network work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnInput {
    Exit,
    Blank,
    Message(String),
}

impl TurnInput {
    pub fn classify(line: &str) -> Self {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            TurnInput::Blank
        } else if trimmed.eq_ignore_ascii_case("exit") || trimmed.eq_ignore_ascii_case("quit") {
            TurnInput::Exit
        } else {
            TurnInput::Message(line.to_string())
        }
    }
}

/// Send one user message and return the extracted reply text.
pub fn exchange<T>(
    transport: &T,
    provider: Provider,
    settings: &ProviderSettings,
    credential: &Credential,
    text: &str,
) -> Result<String, ChatError>
where
    T: HttpTransport + ?Sized,
{
    let request = provider.build_request(settings, credential, text);
    let response = transport.post_json(&request)?;

    if !response.is_success() {
        let message = provider
            .extract_error(&response.body)
            .or_else(|| Some(response.body.trim().to_string()).filter(|b| !b.is_empty()))
            .unwrap_or_else(|| format!("HTTP {}", response.status));
        return Err(ChatError::Api {
            status: response.status,
            message,
        });
    }

    let body: Value =
        serde_json::from_str(&response.body).map_err(|e| ChatError::Decode(e.to_string()))?;
    let reply = provider.extract_reply(&body);
    if reply.is_empty() {
        return Err(ChatError::EmptyReply {
            raw: body.to_string(),
        });
    }
    Ok(reply)
}

/// Make sure a credential is available, prompting for it once if needed.
/// A prompted value is stored in `slot` for the rest of the process.
/// Returns `None` when the user gives nothing, in which case the session
/// must not start.
pub fn resolve_credential<P, W>(
    provider: Provider,
    slot: &mut Option<Credential>,
    prompter: &mut P,
    out: &mut W,
) -> Result<Option<Credential>>
where
    P: Prompter + ?Sized,
    W: Write,
{
    if let Some(existing) = slot.as_ref() {
        return Ok(Some(existing.clone()));
    }

    writeln!(
        out,
        "{} {} API Key is not set in environment variable {}.",
        ui::warning_label(),
        provider.display_name(),
        provider.api_key_env()
    )?;
    let prompt = format!(
        "Please enter your {} API Key (input is hidden)",
        provider.display_name()
    );
    let secret = match prompter.read_secret(&prompt) {
        Ok(secret) => secret,
        Err(e) => {
            writeln!(out, "{} {:#}", ui::error_label("Error during key input:"), e)?;
            return Ok(None);
        }
    };

    match Credential::new(secret) {
        Some(credential) => {
            *slot = Some(credential.clone());
            Ok(Some(credential))
        }
        None => {
            writeln!(
                out,
                "{} API Key is required to start the chat.",
                ui::error_label("Error:")
            )?;
            Ok(None)
        }
    }
}

/// Run an interactive chat with `provider` until the user leaves. Returns to
/// the caller on exit/quit, Ctrl+C or end of input; request failures are
/// reported and the loop carries on.
pub fn run_chat_session<T, P, W>(
    provider: Provider,
    settings: &mut ProviderSettings,
    transport: &T,
    prompter: &mut P,
    out: &mut W,
) -> Result<()>
where
    T: HttpTransport + ?Sized,
    P: Prompter + ?Sized,
    W: Write,
{
    let credential = match resolve_credential(provider, &mut settings.credential, prompter, out)? {
        Some(c) => c,
        None => return Ok(()),
    };

    let rule = "-".repeat(52);
    writeln!(out, "{}", rule)?;
    writeln!(out, "{}", provider.banner())?;
    writeln!(out, "Type 'exit' or 'quit' to return to the main menu.")?;
    writeln!(out, "{}", rule)?;
    info!(provider = provider.display_name(), model = %settings.model, "chat session started");

    loop {
        let line = match prompter.read_line("You: ")? {
            ReadOutcome::Line(line) => line,
            ReadOutcome::Unreadable => {
                writeln!(out, "{}", ui::UNREADABLE_INPUT)?;
                continue;
            }
            ReadOutcome::Interrupted | ReadOutcome::Eof => {
                writeln!(out)?;
                writeln!(out, "Exiting chat...")?;
                break;
            }
        };

        let text = match TurnInput::classify(&line) {
            TurnInput::Blank => continue,
            TurnInput::Exit => {
                writeln!(out, "Exiting chat...")?;
                break;
            }
            TurnInput::Message(text) => text,
        };

        let spinner = ui::thinking_spinner();
        let result = exchange(transport, provider, settings, &credential, &text);
        spinner.finish_and_clear();

        report_turn(provider, result, out)?;
    }

    info!(provider = provider.display_name(), "chat session ended");
    Ok(())
}

fn report_turn<W: Write>(
    provider: Provider,
    result: Result<String, ChatError>,
    out: &mut W,
) -> Result<()> {
    match result {
        Ok(reply) => {
            writeln!(out, "{}", ui::speaker_label(provider.display_name()))?;
            writeln!(out, "{}", ui::wrap_text(&reply, ui::current_reply_width(), "  "))?;
            writeln!(out)?;
        }
        Err(ChatError::EmptyReply { raw }) => {
            warn!(provider = provider.display_name(), "empty reply");
            writeln!(out, "{} Received empty reply from API.", ui::error_label("Error:"))?;
            writeln!(out, "Raw Output: {}", raw)?;
        }
        Err(ChatError::Api { status, message }) => {
            warn!(provider = provider.display_name(), status, "API returned an error");
            writeln!(out, "{}", ui::error_label("API Error:"))?;
            writeln!(out, "{}", message)?;
        }
        Err(e @ ChatError::Decode(_)) => {
            warn!(provider = provider.display_name(), error = %e, "undecodable response");
            writeln!(out, "{} {}", ui::error_label("Response Error:"), e)?;
        }
        Err(e) => {
            warn!(provider = provider.display_name(), error = %e, "request failed");
            writeln!(out, "{} {}", ui::error_label("Network/Request Error:"), e)?;
        }
    }
    Ok(())
}

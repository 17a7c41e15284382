// End-to-end menu and chat flows driven by scripted input and a fake
// transport. No terminal or network is touched.

use std::cell::RefCell;
use std::collections::VecDeque;

use anyhow::{anyhow, Result};
use gpr_reader::api::{ChatRequest, HttpTransport, RawResponse};
use gpr_reader::config::{Config, Credential};
use gpr_reader::error::ChatError;
use gpr_reader::menu::{main_menu, FAREWELL, INVALID_INPUT, MENU_PROMPT};
use gpr_reader::reader::ReaderOptions;
use gpr_reader::render::{RenderStyle, Viewport};
use gpr_reader::ui::{Prompter, ReadOutcome, UNREADABLE_INPUT};

struct ScriptedPrompter {
    lines: VecDeque<ReadOutcome>,
    secrets: VecDeque<Result<String>>,
    prompts: Vec<String>,
}

impl ScriptedPrompter {
    fn lines(lines: &[&str]) -> Self {
        ScriptedPrompter {
            lines: lines.iter().map(|l| ReadOutcome::Line(l.to_string())).collect(),
            secrets: VecDeque::new(),
            prompts: Vec::new(),
        }
    }

    fn then(mut self, outcome: ReadOutcome) -> Self {
        self.lines.push_back(outcome);
        self
    }

    fn with_secret(mut self, secret: Result<String>) -> Self {
        self.secrets.push_back(secret);
        self
    }
}

impl Prompter for ScriptedPrompter {
    fn read_line(&mut self, prompt: &str) -> Result<ReadOutcome> {
        self.prompts.push(prompt.to_string());
        Ok(self.lines.pop_front().unwrap_or(ReadOutcome::Eof))
    }

    fn read_secret(&mut self, _prompt: &str) -> Result<String> {
        self.secrets
            .pop_front()
            .unwrap_or_else(|| Err(anyhow!("no secret scripted")))
    }
}

#[derive(Default)]
struct FakeTransport {
    requests: RefCell<Vec<ChatRequest>>,
    responses: RefCell<VecDeque<Result<RawResponse, ChatError>>>,
}

impl FakeTransport {
    fn respond(self, status: u16, body: &str) -> Self {
        self.responses
            .borrow_mut()
            .push_back(Ok(RawResponse { status, body: body.to_string() }));
        self
    }

    fn fail(self, message: &str) -> Self {
        self.responses
            .borrow_mut()
            .push_back(Err(ChatError::Transport(message.to_string())));
        self
    }

    fn calls(&self) -> usize {
        self.requests.borrow().len()
    }
}

impl HttpTransport for FakeTransport {
    fn post_json(&self, request: &ChatRequest) -> Result<RawResponse, ChatError> {
        self.requests.borrow_mut().push(request.clone());
        self.responses
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(ChatError::Transport("unexpected request".into())))
    }
}

fn keyed_config() -> Config {
    let mut config = Config::from_lookup(|_| None);
    config.groq.credential = Credential::new("groq-key");
    config.gemini.credential = Credential::new("gemini-key");
    config
}

fn run(config: &mut Config, transport: &FakeTransport, prompter: &mut ScriptedPrompter) -> String {
    run_with_style(config, transport, prompter, RenderStyle::TrueColor)
}

fn run_with_style(
    config: &mut Config,
    transport: &FakeTransport,
    prompter: &mut ScriptedPrompter,
    style: RenderStyle,
) -> String {
    let mut out = Vec::new();
    let options = ReaderOptions {
        display: true,
        viewport: Some(Viewport { cols: 20, rows: 5 }),
        style,
    };
    main_menu(config, transport, prompter, &mut out, options).expect("menu loop");
    String::from_utf8(out).expect("utf8 output")
}

#[test]
fn unrecognized_inputs_all_get_the_same_message() {
    let mut config = keyed_config();
    let transport = FakeTransport::default();
    let mut prompter = ScriptedPrompter::lines(&["foo", "debug", "", "CHAT", "exit"]);
    let out = run(&mut config, &transport, &mut prompter);

    assert_eq!(out.matches(INVALID_INPUT).count(), 4);
    assert_eq!(transport.calls(), 0);
    assert!(out.ends_with(&format!("{}\n", FAREWELL)));
}

#[test]
fn exit_stops_reading_input() {
    let mut config = keyed_config();
    let transport = FakeTransport::default();
    let mut prompter = ScriptedPrompter::lines(&["version", "exit", "help"]);
    let out = run(&mut config, &transport, &mut prompter);

    assert!(out.contains("GPR Reader - Version"));
    assert!(!out.contains("Available Commands"));
    assert_eq!(prompter.lines.len(), 1);
}

#[test]
fn interrupt_and_eof_at_menu_say_goodbye() {
    let mut config = keyed_config();
    let transport = FakeTransport::default();
    let mut prompter = ScriptedPrompter::lines(&[]).then(ReadOutcome::Interrupted);
    let out = run(&mut config, &transport, &mut prompter);
    assert!(out.contains(FAREWELL));

    let mut prompter = ScriptedPrompter::lines(&["help"]);
    let out = run(&mut config, &transport, &mut prompter);
    assert!(out.contains("Available Commands"));
    assert!(out.contains(FAREWELL));
}

#[test]
fn stub_commands_report_not_implemented() {
    let mut config = keyed_config();
    let transport = FakeTransport::default();
    let mut prompter = ScriptedPrompter::lines(&["analyze_data", "Export_Results", "exit"]);
    let out = run(&mut config, &transport, &mut prompter);
    assert!(out.contains("'analyze_data' is not implemented yet."));
    assert!(out.contains("'export_results' is not implemented yet."));
}

#[test]
fn blank_chat_input_never_hits_the_network() {
    let mut config = keyed_config();
    let transport = FakeTransport::default();
    let mut prompter =
        ScriptedPrompter::lines(&["chat groq", "", "   ", "\t", "quit", "exit"]);
    let out = run(&mut config, &transport, &mut prompter);

    assert_eq!(transport.calls(), 0);
    // Every blank line came back to the chat prompt instead of the menu.
    let chat_prompts = prompter.prompts.iter().filter(|p| p.as_str() == "You: ").count();
    assert_eq!(chat_prompts, 4);
    assert_eq!(prompter.prompts.first().map(String::as_str), Some(MENU_PROMPT));
    assert_eq!(prompter.prompts.last().map(String::as_str), Some(MENU_PROMPT));
    assert!(out.contains("Groq Llama3 AI Chat Initialized."));
    assert!(out.contains("Exiting chat..."));
    assert!(out.contains(FAREWELL));
}

#[test]
fn groq_reply_is_printed_wrapped() {
    let mut config = keyed_config();
    let transport = FakeTransport::default().respond(
        200,
        concat!(
            r#"{"id":"x","choices":[{"message":{"role":"assistant","#,
            r#""content":"GPR images the subsurface."}}],"usage":{}}"#
        ),
    );
    let mut prompter = ScriptedPrompter::lines(&["chat groq", "what is gpr?", "exit", "exit"]);
    let out = run(&mut config, &transport, &mut prompter);

    assert!(out.contains("GPR images the subsurface."));
    let requests = transport.requests.borrow();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].headers, vec![("authorization", "Bearer groq-key".to_string())]);
    assert_eq!(
        requests[0].body.pointer("/messages/0/content").and_then(|v| v.as_str()),
        Some("what is gpr?")
    );
}

#[test]
fn gemini_session_sends_its_own_shape() {
    let mut config = keyed_config();
    let transport = FakeTransport::default().respond(
        200,
        concat!(
            r#"{"candidates":[{"content":{"parts":[{"text":"Use a 250 MHz antenna."}]},"#,
            r#""finishReason":"STOP"}]}"#
        ),
    );
    let mut prompter = ScriptedPrompter::lines(&["chat gemini", "which antenna?", "exit", "exit"]);
    let out = run(&mut config, &transport, &mut prompter);

    assert!(out.contains("Google Gemini AI Chat Initialized."));
    assert!(out.contains("Use a 250 MHz antenna."));
    let requests = transport.requests.borrow();
    assert!(requests[0].url.ends_with("/gemini-2.5-flash:generateContent"));
    assert_eq!(requests[0].headers, vec![("x-goog-api-key", "gemini-key".to_string())]);
    assert!(requests[0].body.pointer("/systemInstruction/parts/0/text").is_some());
}

#[test]
fn api_errors_show_envelope_message_or_raw_text() {
    let mut config = keyed_config();
    let transport = FakeTransport::default()
        .respond(401, r#"{"error":{"message":"Invalid API Key","type":"auth"}}"#)
        .respond(503, "upstream unavailable");
    let mut prompter = ScriptedPrompter::lines(&["chat groq", "one", "two", "exit", "exit"]);
    let out = run(&mut config, &transport, &mut prompter);

    assert_eq!(transport.calls(), 2);
    assert_eq!(out.matches("API Error:").count(), 2);
    assert!(out.contains("Invalid API Key"));
    assert!(!out.contains(r#""type":"auth""#));
    assert!(out.contains("upstream unavailable"));
}

#[test]
fn network_failure_keeps_the_session_alive() {
    let mut config = keyed_config();
    let transport = FakeTransport::default()
        .fail("dns error: no such host")
        .respond(200, r#"{"choices":[{"message":{"content":"back online"}}]}"#);
    let mut prompter = ScriptedPrompter::lines(&["chat groq", "first", "second", "exit", "exit"]);
    let out = run(&mut config, &transport, &mut prompter);

    assert!(out.contains("Network/Request Error:"));
    assert!(out.contains("dns error: no such host"));
    assert!(out.contains("back online"));
}

#[test]
fn empty_reply_prints_diagnostic_and_raw_body() {
    let mut config = keyed_config();
    let transport = FakeTransport::default().respond(200, r#"{"candidates":[]}"#);
    let mut prompter = ScriptedPrompter::lines(&["chat gemini", "hello", "exit", "exit"]);
    let out = run(&mut config, &transport, &mut prompter);

    assert!(out.contains("Received empty reply from API."));
    assert!(out.contains(r#"Raw Output: {"candidates":[]}"#));
}

#[test]
fn missing_credential_with_empty_answer_skips_the_session() {
    let mut config = Config::from_lookup(|_| None);
    let transport = FakeTransport::default();
    let mut prompter =
        ScriptedPrompter::lines(&["chat groq", "version", "exit"]).with_secret(Ok(String::new()));
    let out = run(&mut config, &transport, &mut prompter);

    assert!(out.contains("API Key is not set"));
    assert!(out.contains("API Key is required to start the chat."));
    assert!(!out.contains("Chat Initialized"));
    // The next line went back to the menu, not into a chat.
    assert!(out.contains("GPR Reader - Version"));
    assert_eq!(transport.calls(), 0);
    assert!(config.groq.credential.is_none());
}

#[test]
fn prompted_credential_is_reused_for_later_sessions() {
    let mut config = Config::from_lookup(|_| None);
    let transport = FakeTransport::default()
        .respond(200, r#"{"choices":[{"message":{"content":"a"}}]}"#)
        .respond(200, r#"{"choices":[{"message":{"content":"b"}}]}"#);
    let mut prompter = ScriptedPrompter::lines(&[
        "chat groq", "q1", "exit", "chat groq", "q2", "exit", "exit",
    ])
    .with_secret(Ok("typed-key".to_string()));
    let out = run(&mut config, &transport, &mut prompter);

    assert_eq!(out.matches("API Key is not set").count(), 1);
    assert_eq!(transport.calls(), 2);
    for request in transport.requests.borrow().iter() {
        assert_eq!(request.headers[0].1, "Bearer typed-key");
    }
    assert!(prompter.secrets.is_empty());
}

#[test]
fn interrupt_inside_chat_returns_to_menu() {
    let mut config = keyed_config();
    let transport = FakeTransport::default();
    let mut prompter = ScriptedPrompter::lines(&["chat gemini"])
        .then(ReadOutcome::Interrupted)
        .then(ReadOutcome::Line("version".into()))
        .then(ReadOutcome::Line("exit".into()));
    let out = run(&mut config, &transport, &mut prompter);

    assert!(out.contains("Exiting chat..."));
    assert!(out.contains("GPR Reader - Version"));
    assert!(out.contains(FAREWELL));
}

#[test]
fn read_gpr_reports_missing_files_and_paths() {
    let dir = tempfile::tempdir().expect("tempdir");
    let missing = dir.path().join("absent.png");
    let upload = format!("upload \"{}\"", missing.display());

    let mut config = keyed_config();
    let transport = FakeTransport::default();
    let mut prompter = ScriptedPrompter::lines(&["read_gpr", "upload", &upload, "exit", "exit"]);
    let out = run(&mut config, &transport, &mut prompter);

    assert!(out.contains("Welcome to the GPR Image Reader."));
    assert!(out.contains("Please provide the full path after 'upload'."));
    assert!(out.contains("File not found at path"));
    assert!(out.contains(FAREWELL));
}

#[test]
fn read_gpr_loads_and_draws_an_image() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("scan.png");
    let img = image::RgbaImage::from_fn(8, 6, |x, y| {
        image::Rgba([(x * 30) as u8, (y * 40) as u8, 90, 255])
    });
    img.save(&path).expect("save");
    let upload = format!("upload {}", path.display());

    let mut config = keyed_config();
    let transport = FakeTransport::default();
    let mut prompter = ScriptedPrompter::lines(&["read_gpr", &upload, "exit", "exit"]);
    let out = run(&mut config, &transport, &mut prompter);

    assert!(out.contains("Shape of the original data: (6, 8, 4)"));
    assert!(out.contains("Image successfully loaded and processed."));
    assert!(out.contains("Loaded GPR Profile (Intensity)"));
    assert!(out.contains("Distance Axis (Pixels)"));
    assert!(out.contains("Depth/Time Axis (Pixels)"));
    assert!(out.contains("Amplitude/Intensity"));
}

#[test]
fn read_gpr_draws_plain_text_when_not_on_a_terminal() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("scan.png");
    image::GrayImage::from_fn(10, 4, |x, _| image::Luma([(x * 25) as u8]))
        .save(&path)
        .expect("save");
    let upload = format!("upload {}", path.display());

    let mut config = keyed_config();
    let transport = FakeTransport::default();
    let mut prompter = ScriptedPrompter::lines(&["read_gpr", &upload, "exit", "exit"]);
    let out = run_with_style(&mut config, &transport, &mut prompter, RenderStyle::Plain);

    assert!(out.contains("Loaded GPR Profile (Intensity)"));
    assert!(out.contains("Amplitude/Intensity"));
    assert!(!out.contains('\x1b'));
    assert!(!out.contains('▀'));
}

#[test]
fn undecodable_lines_are_reported_and_every_loop_carries_on() {
    let mut config = keyed_config();
    let transport = FakeTransport::default();
    let mut prompter = ScriptedPrompter::lines(&[])
        .then(ReadOutcome::Unreadable)
        .then(ReadOutcome::Line("chat groq".into()))
        .then(ReadOutcome::Unreadable)
        .then(ReadOutcome::Line("exit".into()))
        .then(ReadOutcome::Line("read_gpr".into()))
        .then(ReadOutcome::Unreadable)
        .then(ReadOutcome::Line("exit".into()))
        .then(ReadOutcome::Line("version".into()))
        .then(ReadOutcome::Line("exit".into()));
    let out = run(&mut config, &transport, &mut prompter);

    assert_eq!(out.matches(UNREADABLE_INPUT).count(), 3);
    assert!(out.contains("Exiting chat..."));
    assert!(out.contains("Leaving GPR Image Reader."));
    assert!(out.contains("GPR Reader - Version"));
    assert!(out.ends_with(&format!("{}\n", FAREWELL)));
    assert_eq!(transport.calls(), 0);
    assert!(prompter.lines.is_empty());
}

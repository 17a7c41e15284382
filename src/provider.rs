// Provider descriptors: the two chat services differ only in endpoint,
// authentication header, request body shape and where the reply sits in
// the response. Everything provider-specific lives here so the chat session
// can stay generic.

use serde::Serialize;
use serde_json::Value;

use crate::api::ChatRequest;
use crate::config::{Credential, ProviderSettings};

/// Fixed system instruction sent with every Gemini request.
pub const GEMINI_SYSTEM_INSTRUCTION: &str = "You are a helpful, brief, and knowledgeable \
assistant for Ground Penetrating Radar (GPR) analysis. Provide concise answers. Only provide \
information on GPRs.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    /// Groq's OpenAI-compatible chat completions API.
    Groq,
    /// Google Gemini `generateContent`.
    Gemini,
}

// Request payloads. Field names follow each API's JSON exactly.

#[derive(Serialize, Debug)]
struct GroqMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize, Debug)]
struct GroqRequest<'a> {
    model: &'a str,
    messages: Vec<GroqMessage<'a>>,
}

#[derive(Serialize, Debug)]
struct GeminiPart<'a> {
    text: &'a str,
}

#[derive(Serialize, Debug)]
struct GeminiContent<'a> {
    parts: Vec<GeminiPart<'a>>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest<'a> {
    contents: Vec<GeminiContent<'a>>,
    system_instruction: GeminiContent<'a>,
}

impl Provider {
    pub fn display_name(self) -> &'static str {
        match self {
            Provider::Groq => "Groq",
            Provider::Gemini => "Gemini",
        }
    }

    /// Line printed when a session starts.
    pub fn banner(self) -> &'static str {
        match self {
            Provider::Groq => "Groq Llama3 AI Chat Initialized.",
            Provider::Gemini => "Google Gemini AI Chat Initialized.",
        }
    }

    pub fn api_key_env(self) -> &'static str {
        match self {
            Provider::Groq => "GROQ_API_KEY",
            Provider::Gemini => "GEMINI_API_KEY",
        }
    }

    pub fn model_env(self) -> &'static str {
        match self {
            Provider::Groq => "GROQ_MODEL",
            Provider::Gemini => "GEMINI_MODEL",
        }
    }

    pub fn api_url_env(self) -> &'static str {
        match self {
            Provider::Groq => "GROQ_API_URL",
            Provider::Gemini => "GEMINI_API_URL",
        }
    }

    /// Groq takes the full completions URL; Gemini takes the models base URL
    /// and the model name is appended per request.
    pub fn default_api_url(self) -> &'static str {
        match self {
            Provider::Groq => "https://api.groq.com/openai/v1/chat/completions",
            Provider::Gemini => "https://generativelanguage.googleapis.com/v1beta/models",
        }
    }

    pub fn default_model(self) -> &'static str {
        match self {
            Provider::Groq => "llama-3.3-70b-versatile",
            Provider::Gemini => "gemini-2.5-flash",
        }
    }

    /// Whether an environment value is one of the "fill me in" placeholders
    /// shipped in sample configuration, rather than a real key.
    pub fn is_placeholder_key(self, value: &str) -> bool {
        let value = value.trim();
        if value.is_empty() {
            return true;
        }
        match self {
            Provider::Groq => value.contains("your_key"),
            Provider::Gemini => value == "YOUR_GEMINI_API_KEY_HERE",
        }
    }

    /// Build the request for one stateless user turn.
    pub fn build_request(
        self,
        settings: &ProviderSettings,
        credential: &Credential,
        text: &str,
    ) -> ChatRequest {
        match self {
            Provider::Groq => {
                let body = GroqRequest {
                    model: &settings.model,
                    messages: vec![GroqMessage { role: "user", content: text }],
                };
                ChatRequest {
                    url: settings.api_url.clone(),
                    headers: vec![(
                        "authorization",
                        format!("Bearer {}", credential.expose()),
                    )],
                    body: to_value(&body),
                }
            }
            Provider::Gemini => {
                let body = GeminiRequest {
                    contents: vec![GeminiContent { parts: vec![GeminiPart { text }] }],
                    system_instruction: GeminiContent {
                        parts: vec![GeminiPart { text: GEMINI_SYSTEM_INSTRUCTION }],
                    },
                };
                ChatRequest {
                    url: format!(
                        "{}/{}:generateContent",
                        settings.api_url.trim_end_matches('/'),
                        settings.model
                    ),
                    // Sent as a header so the key never shows up in a URL.
                    headers: vec![("x-goog-api-key", credential.expose().to_string())],
                    body: to_value(&body),
                }
            }
        }
    }

    /// Pull the reply text out of a decoded success body, trimmed. Missing
    /// fields and wrong types yield an empty string.
    pub fn extract_reply(self, body: &Value) -> String {
        let pointer = match self {
            Provider::Groq => "/choices/0/message/content",
            Provider::Gemini => "/candidates/0/content/parts/0/text",
        };
        body.pointer(pointer)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .trim()
            .to_string()
    }

    /// Pull `error.message` out of an error body, if the body is JSON in the
    /// expected envelope.
    pub fn extract_error(self, body: &str) -> Option<String> {
        // Both services use the same envelope today; kept per provider so a
        // divergence only touches this match.
        let pointer = match self {
            Provider::Groq | Provider::Gemini => "/error/message",
        };
        let value: Value = serde_json::from_str(body).ok()?;
        value
            .pointer(pointer)
            .and_then(Value::as_str)
            .map(str::to_string)
    }
}

// Serializing these plain structs cannot fail.
fn to_value<T: Serialize>(body: &T) -> Value {
    serde_json::to_value(body).unwrap_or(Value::Null)
}

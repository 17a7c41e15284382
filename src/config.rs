// Configuration module: everything the CLI needs from the environment is
// read once at start-up and then passed around explicitly. Credentials are
// held in memory only and never written anywhere.

use std::fmt;
use std::time::Duration;

use crate::provider::Provider;

/// Upper bound for a single chat request, connect and read included.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Environment variable holding the tracing filter directive.
pub const LOG_ENV: &str = "GPR_READER_LOG";

/// An opaque API secret. `Debug` is redacted so the value cannot leak through
/// logging or panic messages.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Wrap a secret, returning `None` for empty or whitespace-only input.
    pub fn new(secret: impl Into<String>) -> Option<Self> {
        let secret = secret.into();
        if secret.trim().is_empty() {
            None
        } else {
            Some(Credential(secret.trim().to_string()))
        }
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

/// Per-provider settings: where to send requests, which model to ask for and
/// the credential, if one is known yet.
#[derive(Debug, Clone)]
pub struct ProviderSettings {
    pub api_url: String,
    pub model: String,
    pub credential: Option<Credential>,
}

impl ProviderSettings {
    /// Settings with the provider's default endpoint and model and no credential.
    pub fn defaults(provider: Provider) -> Self {
        ProviderSettings {
            api_url: provider.default_api_url().to_string(),
            model: provider.default_model().to_string(),
            credential: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub groq: ProviderSettings,
    pub gemini: ProviderSettings,
    pub request_timeout: Duration,
}

impl Config {
    /// Build the configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup. Unset or blank
    /// values fall back to the defaults; placeholder credentials count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let settings = |provider: Provider| {
            let non_blank = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
            let mut s = ProviderSettings::defaults(provider);
            if let Some(url) = non_blank(provider.api_url_env()) {
                s.api_url = url.trim().to_string();
            }
            if let Some(model) = non_blank(provider.model_env()) {
                s.model = model.trim().to_string();
            }
            s.credential = lookup(provider.api_key_env())
                .filter(|key| !provider.is_placeholder_key(key))
                .and_then(Credential::new);
            s
        };

        Config {
            groq: settings(Provider::Groq),
            gemini: settings(Provider::Gemini),
            request_timeout: REQUEST_TIMEOUT,
        }
    }

    pub fn provider(&self, provider: Provider) -> &ProviderSettings {
        match provider {
            Provider::Groq => &self.groq,
            Provider::Gemini => &self.gemini,
        }
    }

    pub fn provider_mut(&mut self, provider: Provider) -> &mut ProviderSettings {
        match provider {
            Provider::Groq => &mut self.groq,
            Provider::Gemini => &mut self.gemini,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn empty_environment_uses_defaults_and_no_credentials() {
        let config = Config::from_lookup(|_| None);
        assert_eq!(config.groq.model, "llama-3.3-70b-versatile");
        assert_eq!(config.gemini.model, "gemini-2.5-flash");
        assert_eq!(
            config.groq.api_url,
            "https://api.groq.com/openai/v1/chat/completions"
        );
        assert!(config.groq.credential.is_none());
        assert!(config.gemini.credential.is_none());
        assert_eq!(config.request_timeout, Duration::from_secs(30));
    }

    #[test]
    fn credentials_and_overrides_are_read() {
        let config = Config::from_lookup(lookup_from(&[
            ("GROQ_API_KEY", "gsk_live"),
            ("GEMINI_API_KEY", " gem-key "),
            ("GEMINI_MODEL", "gemini-pro"),
            ("GROQ_API_URL", "http://localhost:9000/chat"),
        ]));
        assert_eq!(config.groq.credential.as_ref().map(Credential::expose), Some("gsk_live"));
        assert_eq!(config.gemini.credential.as_ref().map(Credential::expose), Some("gem-key"));
        assert_eq!(config.gemini.model, "gemini-pro");
        assert_eq!(config.groq.api_url, "http://localhost:9000/chat");
    }

    #[test]
    fn placeholder_and_blank_keys_count_as_missing() {
        let config = Config::from_lookup(lookup_from(&[
            ("GROQ_API_KEY", "insert_your_key_here"),
            ("GEMINI_API_KEY", "YOUR_GEMINI_API_KEY_HERE"),
        ]));
        assert!(config.groq.credential.is_none());
        assert!(config.gemini.credential.is_none());

        let config = Config::from_lookup(lookup_from(&[("GROQ_API_KEY", "   ")]));
        assert!(config.groq.credential.is_none());
    }

    #[test]
    fn credential_debug_is_redacted() {
        let cred = Credential::new("super-secret").expect("credential");
        assert_eq!(format!("{:?}", cred), "Credential(***)");
        assert!(Credential::new("").is_none());
    }
}

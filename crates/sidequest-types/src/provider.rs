use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

/// Chat provider hosting the observed page
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    #[serde(alias = "openai")]
    Chatgpt,
    Gemini,
    #[serde(other)]
    Unknown,
}

impl Default for Provider {
    fn default() -> Self {
        Provider::Unknown
    }
}

impl Provider {
    /// Detect the provider from the page URL.
    pub fn detect(url: &str) -> Self {
        let Some(host) = Url::parse(url).ok().and_then(|u| u.host_str().map(str::to_owned)) else {
            return Provider::Unknown;
        };
        let host = host.as_str();

        if host_matches(host, "chat.openai.com") || host_matches(host, "chatgpt.com") {
            Provider::Chatgpt
        } else if host_matches(host, "gemini.google.com") {
            Provider::Gemini
        } else {
            Provider::Unknown
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Chatgpt => "chatgpt",
            Provider::Gemini => "gemini",
            Provider::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// `Url` lowercases the host of http(s) URLs
fn host_matches(host: &str, domain: &str) -> bool {
    host == domain
        || host
            .strip_suffix(domain)
            .is_some_and(|sub| sub.ends_with('.'))
}

use serde::{Deserialize, Serialize};

use crate::provider::Provider;
use crate::thread::Locator;

/// Question/answer text pulled out of the page for a bookmark
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedContent {
    #[serde(default)]
    pub provider: Provider,
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub answer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_message_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locator: Option<Locator>,
}

impl ExtractedContent {
    pub fn new(provider: Provider, question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            provider,
            question: question.into(),
            answer: answer.into(),
            provider_message_id: None,
            locator: None,
        }
    }

    pub fn with_locator(mut self, locator: Locator) -> Self {
        self.locator = Some(locator);
        self
    }

    pub fn with_provider_message_id(mut self, id: impl Into<String>) -> Self {
        self.provider_message_id = Some(id.into());
        self
    }

    /// True when neither a question nor an answer carries any text
    pub fn is_empty(&self) -> bool {
        self.question.trim().is_empty() && self.answer.trim().is_empty()
    }
}

/// Metadata about the page an observer is attached to
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub url: String,
    pub raw_title: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
}

use serde::{Deserialize, Serialize};

use crate::content::{ExtractedContent, PageInfo};
use crate::preferences::{Preferences, Theme};
use crate::thread::{Locator, Message, ThreadCollection};

/// Request envelope exchanged between contexts.
///
/// Serialized as a flat object tagged by `type`, e.g.
/// `{"type":"rename","threadId":"...","title":"..."}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Request {
    /// Display → Coordinator → Observer: bookmark the most recent answer
    CaptureLatest,

    /// Observer → Coordinator: persist extracted content
    Bookmark(ExtractedContent),

    ListThreads,

    AppendMessage {
        #[serde(rename = "threadId")]
        thread_id: String,
        message: Message,
    },

    /// Display → Coordinator → Observer: navigate to a bookmarked answer
    JumpTo {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        locator: Option<Locator>,
        #[serde(rename = "threadId", default, skip_serializing_if = "Option::is_none")]
        thread_id: Option<String>,
        #[serde(rename = "fallbackText", default, skip_serializing_if = "Option::is_none")]
        fallback_text: Option<String>,
    },

    Rename {
        #[serde(rename = "threadId")]
        thread_id: String,
        title: String,
    },

    Delete {
        #[serde(rename = "threadId")]
        thread_id: String,
    },

    ClearAll,

    SidebarMinimize,

    SidebarRestore,

    /// Display → Coordinator → Observer: relay a follow-up prompt to the page
    SendFollowup {
        #[serde(rename = "threadId", default, skip_serializing_if = "Option::is_none")]
        thread_id: Option<String>,
        text: String,
    },

    GetPreferences,

    SetTheme {
        theme: Theme,
    },

    SetPanelWidth {
        width: u32,
    },

    /// Observer → Coordinator: metadata of the observed page
    PageInfo(PageInfo),

    GetPageInfo,
}

impl Request {
    /// Wire tag of this request, for logging
    pub fn kind(&self) -> &'static str {
        match self {
            Request::CaptureLatest => "capture-latest",
            Request::Bookmark(_) => "bookmark",
            Request::ListThreads => "list-threads",
            Request::AppendMessage { .. } => "append-message",
            Request::JumpTo { .. } => "jump-to",
            Request::Rename { .. } => "rename",
            Request::Delete { .. } => "delete",
            Request::ClearAll => "clear-all",
            Request::SidebarMinimize => "sidebar-minimize",
            Request::SidebarRestore => "sidebar-restore",
            Request::SendFollowup { .. } => "send-followup",
            Request::GetPreferences => "get-preferences",
            Request::SetTheme { .. } => "set-theme",
            Request::SetPanelWidth { .. } => "set-panel-width",
            Request::PageInfo(_) => "page-info",
            Request::GetPageInfo => "get-page-info",
        }
    }
}

/// Response envelope: `{ok:true, ...}` or `{ok:false, error}`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thread_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<ThreadCollection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub via: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferences: Option<Preferences>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_info: Option<PageInfo>,
}

impl Response {
    pub fn ok() -> Self {
        Self {
            ok: true,
            ..Self::default()
        }
    }

    pub fn failure(error: impl ToString) -> Self {
        Self {
            ok: false,
            error: Some(error.to_string()),
            ..Self::default()
        }
    }

    pub fn with_thread_id(mut self, id: impl Into<String>) -> Self {
        self.thread_id = Some(id.into());
        self
    }

    pub fn with_data(mut self, data: ThreadCollection) -> Self {
        self.data = Some(data);
        self
    }

    pub fn with_via(mut self, via: impl Into<String>) -> Self {
        self.via = Some(via.into());
        self
    }

    pub fn with_preferences(mut self, preferences: Preferences) -> Self {
        self.preferences = Some(preferences);
        self
    }

    pub fn with_page_info(mut self, info: PageInfo) -> Self {
        self.page_info = Some(info);
        self
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

/// Fire-and-forget notification from the Coordinator to every Display Surface
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Broadcast {
    ThreadsUpdated,
    PreferencesUpdated,
}

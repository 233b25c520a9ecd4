use sidequest_bus::{BusError, Broadcaster, ContextHandle, Result};
use sidequest_types::{
    Broadcast, Locator, Message, PageInfo, Preferences, Request, Response, Theme, ThreadCollection,
};
use tokio::sync::broadcast;

/// Typed Display Surface view of the Coordinator.
///
/// Failed responses come back as `Err(BusError)`.
#[derive(Clone)]
pub struct DisplayClient {
    coordinator: ContextHandle,
    broadcasts: Broadcaster,
}

impl DisplayClient {
    pub fn new(coordinator: ContextHandle, broadcasts: Broadcaster) -> Self {
        Self {
            coordinator,
            broadcasts,
        }
    }

    /// Receive `threads-updated` and `preferences-updated`
    pub fn subscribe(&self) -> broadcast::Receiver<Broadcast> {
        self.broadcasts.subscribe()
    }

    pub async fn request(&self, request: Request) -> Result<Response> {
        let response = self.coordinator.try_call(request).await?;
        match BusError::from_response(&response) {
            Some(error) => Err(error),
            None => Ok(response),
        }
    }

    /// Bookmark the latest answer on the active page; returns the new thread id
    pub async fn capture_latest(&self) -> Result<Response> {
        self.request(Request::CaptureLatest).await
    }

    pub async fn list_threads(&self) -> Result<ThreadCollection> {
        let response = self.request(Request::ListThreads).await?;
        Ok(response.data.unwrap_or_default())
    }

    pub async fn append_message(&self, thread_id: &str, message: Message) -> Result<()> {
        self.request(Request::AppendMessage {
            thread_id: thread_id.to_string(),
            message,
        })
        .await
        .map(drop)
    }

    pub async fn jump_to_thread(&self, thread_id: &str) -> Result<()> {
        self.jump_to(None, Some(thread_id), None).await
    }

    pub async fn jump_to(
        &self,
        locator: Option<Locator>,
        thread_id: Option<&str>,
        fallback_text: Option<&str>,
    ) -> Result<()> {
        self.request(Request::JumpTo {
            locator,
            thread_id: thread_id.map(str::to_string),
            fallback_text: fallback_text.map(str::to_string),
        })
        .await
        .map(drop)
    }

    pub async fn rename(&self, thread_id: &str, title: &str) -> Result<()> {
        self.request(Request::Rename {
            thread_id: thread_id.to_string(),
            title: title.to_string(),
        })
        .await
        .map(drop)
    }

    pub async fn delete(&self, thread_id: &str) -> Result<()> {
        self.request(Request::Delete {
            thread_id: thread_id.to_string(),
        })
        .await
        .map(drop)
    }

    pub async fn clear_all(&self) -> Result<()> {
        self.request(Request::ClearAll).await.map(drop)
    }

    pub async fn minimize_sidebar(&self) -> Result<()> {
        self.request(Request::SidebarMinimize).await.map(drop)
    }

    pub async fn restore_sidebar(&self) -> Result<()> {
        self.request(Request::SidebarRestore).await.map(drop)
    }

    pub async fn send_followup(&self, thread_id: Option<&str>, text: &str) -> Result<()> {
        self.request(Request::SendFollowup {
            thread_id: thread_id.map(str::to_string),
            text: text.to_string(),
        })
        .await
        .map(drop)
    }

    pub async fn preferences(&self) -> Result<Preferences> {
        let response = self.request(Request::GetPreferences).await?;
        Ok(response.preferences.unwrap_or_default())
    }

    pub async fn set_theme(&self, theme: Theme) -> Result<Preferences> {
        let response = self.request(Request::SetTheme { theme }).await?;
        Ok(response.preferences.unwrap_or_default())
    }

    pub async fn set_panel_width(&self, width: u32) -> Result<Preferences> {
        let response = self.request(Request::SetPanelWidth { width }).await?;
        Ok(response.preferences.unwrap_or_default())
    }

    pub async fn page_info(&self) -> Result<Option<PageInfo>> {
        Ok(self.request(Request::GetPageInfo).await?.page_info)
    }
}

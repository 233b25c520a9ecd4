use async_trait::async_trait;
use sidequest_bus::{BusError, Broadcaster, Handler, ObserverRegistry};
use sidequest_persist::PersistClient;
use sidequest_types::{Broadcast, Locator, Message, Request, Response};
use std::sync::Arc;

/// The background context: sole owner of the thread store.
///
/// Display requests are answered from the store; page actions are forwarded
/// to the active Observer.
pub struct Coordinator {
    persist: Arc<PersistClient>,
    observers: Arc<ObserverRegistry>,
    broadcaster: Broadcaster,
}

impl Coordinator {
    pub fn new(
        persist: Arc<PersistClient>,
        observers: Arc<ObserverRegistry>,
        broadcaster: Broadcaster,
    ) -> Self {
        Self {
            persist,
            observers,
            broadcaster,
        }
    }

    pub fn persist(&self) -> &Arc<PersistClient> {
        &self.persist
    }

    pub fn observers(&self) -> &Arc<ObserverRegistry> {
        &self.observers
    }

    pub fn broadcaster(&self) -> &Broadcaster {
        &self.broadcaster
    }

    /// Fill in the locator and fallback text from the stored thread when the
    /// caller only named it
    async fn jump_target(
        &self,
        locator: Option<Locator>,
        thread_id: Option<&str>,
        fallback_text: Option<String>,
    ) -> Result<(Option<Locator>, Option<String>), BusError> {
        let stored = match thread_id {
            Some(id) => self.persist.threads().get(id).await,
            None => None,
        };

        let (locator, fallback_text) = match stored {
            Some(thread) => {
                let fallback = fallback_text.or_else(|| thread.answer().map(str::to_string));
                (locator.or(thread.locator), fallback)
            }
            None => (locator, fallback_text),
        };

        if locator.is_none() && fallback_text.as_deref().map_or(true, |t| t.trim().is_empty()) {
            return Err(BusError::NotFound);
        }
        Ok((locator, fallback_text))
    }

    async fn set_sidebar(&self, minimized: bool) -> anyhow::Result<Response> {
        self.persist
            .preferences()
            .set_sidebar_minimized(minimized)
            .await?;
        self.broadcaster.send(Broadcast::PreferencesUpdated);

        let request = if minimized {
            Request::SidebarMinimize
        } else {
            Request::SidebarRestore
        };
        Ok(self.observers.call_active(request).await)
    }

    async fn preferences_response(&self) -> Response {
        Response::ok().with_preferences(self.persist.preferences().load().await)
    }
}

#[async_trait]
impl Handler for Coordinator {
    async fn handle(&self, request: Request) -> anyhow::Result<Response> {
        let threads = self.persist.threads();

        match request {
            Request::CaptureLatest => Ok(self.observers.call_active(Request::CaptureLatest).await),

            Request::Bookmark(content) => match threads.bookmark(content).await? {
                Some(id) => Ok(Response::ok().with_thread_id(id)),
                None => Err(BusError::NoBubble.into()),
            },

            Request::ListThreads => Ok(Response::ok().with_data(threads.list().await)),

            Request::AppendMessage { thread_id, message } => {
                if !threads.append_message(&thread_id, message).await? {
                    tracing::debug!(thread_id = %thread_id, "Append to unknown thread ignored");
                }
                Ok(Response::ok())
            }

            Request::JumpTo { locator, thread_id, fallback_text } => {
                let (locator, fallback_text) = self
                    .jump_target(locator, thread_id.as_deref(), fallback_text)
                    .await?;
                let forward = Request::JumpTo { locator, thread_id, fallback_text };
                Ok(self.observers.call_active(forward).await)
            }

            Request::Rename { thread_id, title } => {
                threads.rename(&thread_id, &title).await?;
                Ok(Response::ok())
            }

            Request::Delete { thread_id } => {
                threads.delete(&thread_id).await?;
                Ok(Response::ok())
            }

            Request::ClearAll => {
                threads.clear_all().await?;
                Ok(Response::ok())
            }

            Request::SidebarMinimize => self.set_sidebar(true).await,

            Request::SidebarRestore => self.set_sidebar(false).await,

            Request::SendFollowup { thread_id, text } => {
                let text = text.trim().to_string();
                if text.is_empty() {
                    return Err(BusError::EmptyText.into());
                }
                if let Some(id) = &thread_id {
                    threads.append_message(id, Message::user(text.clone())).await?;
                }
                let forward = Request::SendFollowup { thread_id, text };
                Ok(self.observers.call_active(forward).await)
            }

            Request::GetPreferences => Ok(self.preferences_response().await),

            Request::SetTheme { theme } => {
                self.persist.preferences().set_theme(theme).await?;
                self.broadcaster.send(Broadcast::PreferencesUpdated);
                Ok(self.preferences_response().await)
            }

            Request::SetPanelWidth { width } => {
                self.persist.preferences().set_panel_width(width).await?;
                self.broadcaster.send(Broadcast::PreferencesUpdated);
                Ok(self.preferences_response().await)
            }

            Request::PageInfo(info) => {
                tracing::debug!(url = %info.url, "Page info updated");
                self.persist.save_page_info(&info).await?;
                Ok(Response::ok())
            }

            Request::GetPageInfo => Ok(match self.persist.load_page_info().await {
                Some(info) => Response::ok().with_page_info(info),
                None => Response::ok(),
            }),
        }
    }
}

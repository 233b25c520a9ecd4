use async_trait::async_trait;
use sidequest_bus::{spawn_context, BusConfig, BusError, Context};
use sidequest_capture::{FollowUpSink, MemoryPage, Observer};
use sidequest_coordinator::{CoordinatorService, DisplayClient};
use sidequest_persist::PersistClient;
use sidequest_types::{Broadcast, ExtractedContent, Message, Provider, Request, Role, Theme};
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Default)]
struct Composer {
    sent: Mutex<Vec<String>>,
}

#[async_trait]
impl FollowUpSink for Composer {
    async fn deliver(&self, _thread_id: Option<&str>, text: &str) -> anyhow::Result<()> {
        self.sent.lock().await.push(text.to_string());
        Ok(())
    }
}

struct App {
    service: CoordinatorService,
    display: DisplayClient,
}

async fn app() -> App {
    let persist = Arc::new(PersistClient::builder().memory().build().await.unwrap());
    let service = CoordinatorService::start(persist, &BusConfig::default());
    let display = service.display();
    App { service, display }
}

impl App {
    async fn attach(&self, id: &str, page: MemoryPage) -> (Observer<MemoryPage>, Context) {
        let observer = Observer::new(page, self.service.handle());
        let context = spawn_context(id, Arc::new(observer.clone()), &BusConfig::default());
        self.service.observers().attach(id, context.handle()).await;
        (observer, context)
    }
}

fn chat_page() -> MemoryPage {
    let mut page = MemoryPage::new("https://chatgpt.com/c/1").with_title("Arithmetic help");
    page.push_exchange("What is 2+2?", "4");
    page
}

#[tokio::test]
async fn test_capture_latest_creates_thread_and_notifies_display() {
    let app = app().await;
    let (_observer, _ctx) = app.attach("tab-1", chat_page()).await;
    let mut updates = app.display.subscribe();

    let response = app.display.capture_latest().await.unwrap();
    let id = response.thread_id.unwrap();
    assert_eq!(response.via.as_deref(), Some("bubble"));

    let collection = app.display.list_threads().await.unwrap();
    let thread = collection.get(&id).unwrap();
    assert_eq!(collection.order, vec![id.clone()]);
    assert_eq!(thread.title, "What is 2+2?");
    assert_eq!(thread.provider, Provider::Chatgpt);
    assert_eq!(thread.messages.len(), 2);
    assert_eq!(thread.messages[0].role, Role::User);
    assert_eq!(thread.messages[1].content, "4");
    assert!(thread.locator.is_some());

    assert_eq!(updates.recv().await.unwrap(), Broadcast::ThreadsUpdated);
}

#[tokio::test]
async fn test_page_actions_without_observer_are_no_active_target() {
    let app = app().await;

    assert_eq!(app.display.capture_latest().await.unwrap_err(), BusError::NoActiveTarget);
    assert_eq!(
        app.display.jump_to(None, None, Some("4")).await.unwrap_err(),
        BusError::NoActiveTarget
    );

    // the flag is still persisted for the next page
    assert_eq!(app.display.minimize_sidebar().await.unwrap_err(), BusError::NoActiveTarget);
    assert!(app.display.preferences().await.unwrap().sidebar_minimized);
}

#[tokio::test]
async fn test_detached_observer_stops_receiving() {
    let app = app().await;
    let (_observer, ctx) = app.attach("tab-1", chat_page()).await;
    assert!(app.display.capture_latest().await.is_ok());

    app.service.observers().detach("tab-1", &ctx.handle()).await;
    ctx.shutdown();
    assert_eq!(app.display.capture_latest().await.unwrap_err(), BusError::NoActiveTarget);
}

#[tokio::test]
async fn test_jump_to_thread_survives_rerender() {
    let app = app().await;
    let (observer, _ctx) = app.attach("tab-1", chat_page()).await;
    observer.scan().await;

    let id = app.display.capture_latest().await.unwrap().thread_id.unwrap();
    observer.with_host(|page| page.rerender()).await;

    app.display.jump_to_thread(&id).await.unwrap();
    let (scrolled, regions) = observer
        .with_host(|page| (page.scrolled_to().to_vec(), page.assistant_regions()))
        .await;
    assert_eq!(scrolled, regions);
}

#[tokio::test]
async fn test_jump_to_vanished_answer_is_not_found() {
    let app = app().await;
    let (observer, _ctx) = app.attach("tab-1", chat_page()).await;
    let id = app.display.capture_latest().await.unwrap().thread_id.unwrap();

    observer
        .with_host(|page| {
            for region in page.assistant_regions() {
                page.remove(region);
            }
        })
        .await;

    assert_eq!(app.display.jump_to_thread(&id).await.unwrap_err(), BusError::NotFound);
    assert!(observer.with_host(|page| page.scrolled_to().is_empty()).await);

    // unknown thread with nothing to match on
    assert_eq!(
        app.display.jump_to_thread("no-such-thread").await.unwrap_err(),
        BusError::NotFound
    );
}

#[tokio::test]
async fn test_thread_edits_go_through_the_store() {
    let app = app().await;
    let handle = app.service.handle();
    let first = handle
        .call(Request::Bookmark(ExtractedContent::new(Provider::Gemini, "first", "1")))
        .await
        .thread_id
        .unwrap();
    let second = handle
        .call(Request::Bookmark(ExtractedContent::new(Provider::Gemini, "second", "2")))
        .await
        .thread_id
        .unwrap();

    app.display.rename(&first, "  Renamed  ").await.unwrap();
    app.display.append_message(&first, Message::assistant("more")).await.unwrap();
    app.display.append_message("missing", Message::user("x")).await.unwrap();
    app.display.delete(&second).await.unwrap();

    let collection = app.display.list_threads().await.unwrap();
    assert_eq!(collection.order, vec![first.clone()]);
    let thread = collection.get(&first).unwrap();
    assert_eq!(thread.title, "Renamed");
    assert_eq!(thread.messages.last().unwrap().content, "more");

    app.display.clear_all().await.unwrap();
    assert!(app.display.list_threads().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_empty_bookmark_is_no_bubble() {
    let app = app().await;
    let response = app
        .service
        .handle()
        .call(Request::Bookmark(ExtractedContent::new(Provider::Unknown, " ", "")))
        .await;

    assert_eq!(response.error(), Some("no-bubble"));
    assert!(app.display.list_threads().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_concurrent_bookmarks_are_all_kept() {
    let app = app().await;
    let mut tasks = Vec::new();
    for i in 0..20 {
        let handle = app.service.handle();
        tasks.push(tokio::spawn(async move {
            handle
                .call(Request::Bookmark(ExtractedContent::new(
                    Provider::Unknown,
                    format!("q{i}"),
                    "a",
                )))
                .await
        }));
    }
    for task in tasks {
        assert!(task.await.unwrap().ok);
    }

    let collection = app.display.list_threads().await.unwrap();
    assert_eq!(collection.len(), 20);
    assert!(collection.is_consistent());
}

#[tokio::test]
async fn test_followup_is_appended_then_delivered() {
    let app = app().await;
    let composer = Arc::new(Composer::default());
    let observer = Observer::new(chat_page(), app.service.handle()).with_followup_sink(composer.clone());
    let ctx = spawn_context("tab-1", Arc::new(observer), &BusConfig::default());
    app.service.observers().attach("tab-1", ctx.handle()).await;

    let id = app.display.capture_latest().await.unwrap().thread_id.unwrap();

    assert_eq!(
        app.display.send_followup(Some(&id), "   ").await.unwrap_err(),
        BusError::EmptyText
    );
    app.display.send_followup(Some(&id), " why? ").await.unwrap();

    assert_eq!(composer.sent.lock().await.as_slice(), ["why?".to_string()]);
    let thread = app.display.list_threads().await.unwrap().threads.remove(&id).unwrap();
    let last = thread.messages.last().unwrap();
    assert_eq!((last.role, last.content.as_str()), (Role::User, "why?"));
}

#[tokio::test]
async fn test_preferences_are_stored_and_broadcast() {
    let app = app().await;
    let mut updates = app.display.subscribe();

    let prefs = app.display.set_theme(Theme::Dark).await.unwrap();
    assert_eq!(prefs.theme, Theme::Dark);
    assert_eq!(updates.recv().await.unwrap(), Broadcast::PreferencesUpdated);

    let prefs = app.display.set_panel_width(100).await.unwrap();
    assert_eq!(prefs.panel_width, 280);

    let (observer, _ctx) = app.attach("tab-1", chat_page()).await;
    app.display.minimize_sidebar().await.unwrap();
    assert!(observer.with_host(|page| page.sidebar_minimized()).await);
    app.display.restore_sidebar().await.unwrap();

    let prefs = app.display.preferences().await.unwrap();
    assert!(!prefs.sidebar_minimized);
    assert_eq!(prefs.theme, Theme::Dark);
}

#[tokio::test]
async fn test_page_info_is_announced_and_queryable() {
    let app = app().await;
    assert_eq!(app.display.page_info().await.unwrap(), None);

    let (observer, _ctx) = app.attach("tab-1", chat_page()).await;
    assert!(observer.announce_page_info().await.ok);

    let info = app.display.page_info().await.unwrap().unwrap();
    assert_eq!(info.url, "https://chatgpt.com/c/1");
    assert_eq!(info.title, "arithmetic help");
}

#[tokio::test]
async fn test_file_backed_threads_survive_coordinator_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sidequest.json");

    let id = {
        let persist = Arc::new(PersistClient::builder().file(&path).build().await.unwrap());
        let service = CoordinatorService::start(persist, &BusConfig::default());
        let response = service
            .handle()
            .call(Request::Bookmark(ExtractedContent::new(Provider::Chatgpt, "q", "a")))
            .await;
        service.shutdown();
        response.thread_id.unwrap()
    };

    let persist = Arc::new(PersistClient::builder().file(&path).build().await.unwrap());
    let service = CoordinatorService::start(persist, &BusConfig::default());
    let collection = service.display().list_threads().await.unwrap();
    assert!(collection.contains(&id));
}

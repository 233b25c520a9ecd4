use async_trait::async_trait;
use sidequest_bus::{spawn_context, BusConfig, BusError, Context, Handler};
use sidequest_capture::{
    CaptureConfig, FollowUpSink, HostEvent, MemoryPage, Observer, RegionState, Scanner,
    VIA_BUBBLE, VIA_SELECTION,
};
use sidequest_locator::{fingerprint, ContentTree};
use sidequest_types::{ExtractedContent, Locator, PageInfo, Provider, Request, Response};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// Stands in for the Coordinator and records what the Observer sends it
#[derive(Default)]
struct Recorder {
    bookmarks: Mutex<Vec<ExtractedContent>>,
    page_infos: Mutex<Vec<PageInfo>>,
}

#[async_trait]
impl Handler for Recorder {
    async fn handle(&self, request: Request) -> anyhow::Result<Response> {
        match request {
            Request::Bookmark(content) => {
                let mut bookmarks = self.bookmarks.lock().await;
                bookmarks.push(content);
                Ok(Response::ok().with_thread_id(format!("t-{}", bookmarks.len())))
            }
            Request::PageInfo(info) => {
                self.page_infos.lock().await.push(info);
                Ok(Response::ok())
            }
            _ => Ok(Response::ok()),
        }
    }
}

#[derive(Default)]
struct Composer {
    sent: Mutex<Vec<(Option<String>, String)>>,
}

#[async_trait]
impl FollowUpSink for Composer {
    async fn deliver(&self, thread_id: Option<&str>, text: &str) -> anyhow::Result<()> {
        self.sent
            .lock()
            .await
            .push((thread_id.map(str::to_string), text.to_string()));
        Ok(())
    }
}

struct Harness {
    recorder: Arc<Recorder>,
    _coordinator: Context,
    observer: Observer<MemoryPage>,
}

fn harness(page: MemoryPage) -> Harness {
    harness_with(page, CaptureConfig::default())
}

fn harness_with(page: MemoryPage, config: CaptureConfig) -> Harness {
    let recorder = Arc::new(Recorder::default());
    let coordinator = spawn_context("coordinator", Arc::clone(&recorder), &BusConfig::default());
    let observer = Observer::new(page, coordinator.handle()).with_config(config);
    Harness {
        recorder,
        _coordinator: coordinator,
        observer,
    }
}

fn chat_page() -> MemoryPage {
    MemoryPage::new("https://chatgpt.com/c/abc").with_title("ChatGPT - Rust ownership rules")
}

#[tokio::test]
async fn test_scan_tags_and_stars_each_region_once() {
    let mut page = chat_page();
    let first = page.push_exchange("What is 2+2?", "4");
    let second = page.push_exchange("And 3+3?", "6");
    let h = harness(page);

    let report = h.observer.scan().await;
    assert_eq!(report.candidates, 2);
    assert_eq!(report.newly_tagged, 2);
    assert_eq!(report.newly_starred, 2);
    assert!(!report.floating);

    let again = h.observer.scan().await;
    assert_eq!(again.newly_tagged, 0);
    assert_eq!(again.newly_starred, 0);

    assert_eq!(h.observer.region_state(&first).await, RegionState::Starred);
    assert!(h.observer.with_host(|page| page.has_affordance(second)).await);
}

#[tokio::test]
async fn test_floating_affordance_sits_over_latest_undecorated_region() {
    let mut page = chat_page();
    page.push_exchange("q1", "a1");
    let latest = page.push_exchange("q2", "a2");
    page.refuse_affordances(true);
    let h = harness(page);

    let report = h.observer.scan().await;
    assert!(report.floating);
    assert_eq!(h.observer.region_state(&latest).await, RegionState::Tagged);
    assert_eq!(h.observer.with_host(|page| page.floating()).await, Some(latest));

    h.observer.reposition().await;
    assert_eq!(h.observer.with_host(|page| page.floating_moves()).await, 2);

    let response = h.observer.bookmark_floating().await.unwrap();
    assert_eq!(response.thread_id.as_deref(), Some("t-1"));
    assert_eq!(h.recorder.bookmarks.lock().await[0].answer, "a2");

    // once decorations succeed the floating affordance goes away
    h.observer.with_host(|page| page.refuse_affordances(false)).await;
    assert!(!h.observer.scan().await.floating);
    assert_eq!(h.observer.with_host(|page| page.floating()).await, None);
}

#[tokio::test]
async fn test_capture_latest_bookmarks_most_recent_answer() {
    let mut page = chat_page();
    page.push_exchange("What is 2+2?", "4");
    let latest = page.push_exchange("What is the capital of France?", "  Paris  ");
    page.push_assistant("   ");
    let h = harness(page);

    let response = h.observer.capture_latest().await.unwrap();
    assert!(response.ok);
    assert_eq!(response.via.as_deref(), Some(VIA_BUBBLE));
    assert_eq!(response.thread_id.as_deref(), Some("t-1"));

    let bookmarks = h.recorder.bookmarks.lock().await;
    let content = &bookmarks[0];
    assert_eq!(content.provider, Provider::Chatgpt);
    assert_eq!(content.question, "What is the capital of France?");
    assert_eq!(content.answer, "Paris");

    let locator = content.locator.clone().unwrap();
    let tag = h.observer.with_host(|page| page.tag(&latest)).await;
    assert_eq!(Some(locator.stable_id), tag);
    assert_eq!(locator.fingerprint, fingerprint("Paris"));
}

#[tokio::test]
async fn test_capture_latest_falls_back_to_selection() {
    let mut page = MemoryPage::new("https://example.com/notes");
    page.set_selection(Some("  a highlighted passage "));
    let h = harness(page);

    let response = h.observer.capture_latest().await.unwrap();
    assert_eq!(response.via.as_deref(), Some(VIA_SELECTION));

    let bookmarks = h.recorder.bookmarks.lock().await;
    assert_eq!(bookmarks[0].question, "");
    assert_eq!(bookmarks[0].answer, "a highlighted passage");
    assert!(bookmarks[0].locator.is_none());
    assert_eq!(bookmarks[0].provider, Provider::Unknown);
}

#[tokio::test]
async fn test_capture_latest_with_nothing_is_no_bubble() {
    let mut page = chat_page();
    page.set_selection(Some("   "));
    let h = harness(page);

    let context = spawn_context("observer", Arc::new(h.observer.clone()), &BusConfig::default());
    let response = context.handle().call(Request::CaptureLatest).await;

    assert_eq!(response, Response::failure("no-bubble"));
    assert!(h.recorder.bookmarks.lock().await.is_empty());
}

#[tokio::test]
async fn test_question_is_nearest_reasonable_block() {
    let mut page = chat_page();
    page.push_user("the real question");
    page.push_user(&"x".repeat(2500));
    let answer = page.push_assistant("answer");
    page.push_user(&"y".repeat(700));
    let long_question_answer = page.push_assistant("second answer");
    let h = harness(page);

    h.observer.bookmark_region(&answer).await.unwrap();
    h.observer.bookmark_region(&long_question_answer).await.unwrap();

    let bookmarks = h.recorder.bookmarks.lock().await;
    assert_eq!(bookmarks[0].question, "the real question");
    assert_eq!(bookmarks[1].question.chars().count(), 600);
}

#[tokio::test]
async fn test_jump_to_tagged_region_highlights_briefly() {
    let mut page = chat_page();
    let region = page.push_exchange("q", "the answer");
    let config = CaptureConfig::default().with_highlight(Duration::from_millis(20));
    let h = harness_with(page, config);

    h.observer.scan().await;
    let tag = h.observer.with_host(|page| page.tag(&region)).await.unwrap();
    let locator = Locator::new(tag, "00000000");

    h.observer.jump_to(Some(&locator), None).await.unwrap();
    assert_eq!(h.observer.with_host(|page| page.scrolled_to().to_vec()).await, vec![region]);
    assert!(h.observer.with_host(|page| page.is_highlighted(region)).await);

    tokio::time::sleep(Duration::from_millis(120)).await;
    assert!(!h.observer.with_host(|page| page.is_highlighted(region)).await);
}

#[tokio::test]
async fn test_jump_after_rerender_matches_by_fingerprint() {
    let mut page = chat_page();
    page.push_exchange("q", "the answer");
    page.push_exchange("q", "another answer");
    let h = harness(page);

    h.observer.scan().await;
    h.observer.capture_latest().await.unwrap();
    let locator = h.recorder.bookmarks.lock().await[0].locator.clone().unwrap();

    h.observer.with_host(|page| page.rerender()).await;
    let rebuilt = h.observer.with_host(|page| page.assistant_regions()).await;

    h.observer.jump_to(Some(&locator), None).await.unwrap();
    assert_eq!(
        h.observer.with_host(|page| page.scrolled_to().to_vec()).await,
        vec![rebuilt[1]]
    );

    // re-tagged with the original id; the rebuilt node still gets decorated
    let tag = h.observer.with_host(|page| page.tag(&rebuilt[1])).await;
    assert_eq!(tag, Some(locator.stable_id.clone()));
    h.observer.scan().await;
    assert!(h.observer.with_host(|page| page.has_affordance(rebuilt[1])).await);
}

#[tokio::test]
async fn test_jump_to_unresolvable_locator_is_not_found() {
    let mut page = chat_page();
    let region = page.push_exchange("q", "a");
    let h = harness(page);

    let locator = Locator::new("sq-missing", fingerprint("something else"));
    let result = h.observer.jump_to(Some(&locator), Some("something else")).await;

    assert_eq!(result, Err(BusError::NotFound));
    h.observer
        .with_host(|page| {
            assert!(page.scrolled_to().is_empty());
            assert!(!page.is_highlighted(region));
            assert!(page.tag(&region).is_none());
        })
        .await;
}

#[tokio::test]
async fn test_handler_serves_sidebar_followup_and_page_info() {
    let page = chat_page().with_description("A chat");
    let h = harness(page);
    let composer = Arc::new(Composer::default());
    let observer = h.observer.clone().with_followup_sink(composer.clone());
    let context = spawn_context("observer", Arc::new(observer), &BusConfig::default());
    let handle = context.handle();

    assert!(handle.call(Request::SidebarMinimize).await.ok);
    assert!(h.observer.with_host(|page| page.sidebar_minimized()).await);
    assert!(handle.call(Request::SidebarRestore).await.ok);
    assert!(!h.observer.with_host(|page| page.sidebar_minimized()).await);

    let followup = Request::SendFollowup {
        thread_id: Some("t-1".into()),
        text: "tell me more".into(),
    };
    assert!(handle.call(followup).await.ok);
    assert_eq!(
        composer.sent.lock().await.as_slice(),
        &[(Some("t-1".to_string()), "tell me more".to_string())]
    );

    let info = handle.call(Request::GetPageInfo).await.page_info.unwrap();
    assert_eq!(info.title, "chatgpt rust ownership rules");
    assert_eq!(info.description, "A chat");

    let unsupported = handle.call(Request::ClearAll).await;
    assert_eq!(unsupported.error(), Some("unsupported request: clear-all"));
}

#[tokio::test]
async fn test_followup_without_composer_fails() {
    let h = harness(chat_page());
    let response = h
        .observer
        .handle(Request::SendFollowup { thread_id: None, text: "hi".into() })
        .await;
    assert_eq!(response.unwrap_err().to_string(), "no-composer");
}

#[tokio::test]
async fn test_scanner_coalesces_mutation_bursts() {
    let mut page = chat_page();
    page.push_exchange("q", "a");
    let config = CaptureConfig::default().with_debounce(Duration::from_millis(50));
    let h = harness_with(page, config);
    let scanner = Scanner::spawn(h.observer.clone());

    // initial scan and page announcement
    while h.recorder.page_infos.lock().await.is_empty() {
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    let before = h.observer.with_host(|page| page.enumerations()).await;

    for _ in 0..10 {
        h.observer.with_host(|page| page.push_exchange("more", "text")).await;
        scanner.notify(HostEvent::Mutated).await;
    }
    tokio::time::sleep(Duration::from_millis(200)).await;

    let after = h.observer.with_host(|page| page.enumerations()).await;
    assert_eq!(after, before + 1);
    let regions = h.observer.with_host(|page| page.assistant_regions()).await;
    assert!(h.observer.with_host(|page| page.has_affordance(regions[10])).await);

    h.observer
        .with_host(|page| page.set_url("https://chatgpt.com/c/other"))
        .await;
    scanner.notify(HostEvent::UrlChanged).await;
    tokio::time::sleep(Duration::from_millis(200)).await;

    let infos = h.recorder.page_infos.lock().await;
    assert_eq!(infos.len(), 2);
    assert_eq!(infos[1].url, "https://chatgpt.com/c/other");
    drop(infos);

    scanner.stop();
}

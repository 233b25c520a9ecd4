use async_trait::async_trait;
use sidequest_bus::{BusError, ContextHandle, Handler};
use sidequest_locator::{LocatorEngine, Resolution};
use sidequest_types::{ExtractedContent, Locator, PageInfo, Provider, Request, Response};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::config::CaptureConfig;
use crate::extract::{extract_answer, extract_question};
use crate::host::{FollowUpSink, ObserverHost};
use crate::page_info;
use crate::state::{RegionLedger, RegionState};
use crate::strategy::StrategySet;

/// `via` reported when capture-latest used a content region
pub const VIA_BUBBLE: &str = "bubble";
/// `via` reported when capture-latest fell back to the text selection
pub const VIA_SELECTION: &str = "selection";

/// What one scan did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanReport {
    pub candidates: usize,
    pub newly_tagged: usize,
    pub newly_starred: usize,
    pub floating: bool,
}

struct Page<H: ObserverHost> {
    host: H,
    ledger: RegionLedger,
    floating: Option<H::Region>,
    highlighted: Option<(H::Region, u64)>,
    highlight_seq: u64,
}

/// The page-embedded context.
///
/// Cheap to clone; clones share the same page.
pub struct Observer<H: ObserverHost> {
    page: Arc<Mutex<Page<H>>>,
    coordinator: ContextHandle,
    engine: LocatorEngine,
    strategies: Arc<StrategySet<H>>,
    followups: Option<Arc<dyn FollowUpSink>>,
    config: CaptureConfig,
}

impl<H: ObserverHost> Clone for Observer<H> {
    fn clone(&self) -> Self {
        Self {
            page: Arc::clone(&self.page),
            coordinator: self.coordinator.clone(),
            engine: self.engine.clone(),
            strategies: Arc::clone(&self.strategies),
            followups: self.followups.clone(),
            config: self.config.clone(),
        }
    }
}

impl<H: ObserverHost> Observer<H> {
    pub fn new(host: H, coordinator: ContextHandle) -> Self {
        Self {
            page: Arc::new(Mutex::new(Page {
                host,
                ledger: RegionLedger::new(),
                floating: None,
                highlighted: None,
                highlight_seq: 0,
            })),
            coordinator,
            engine: LocatorEngine::new(),
            strategies: Arc::new(StrategySet::new()),
            followups: None,
            config: CaptureConfig::default(),
        }
    }

    pub fn with_config(mut self, config: CaptureConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_strategies(mut self, strategies: StrategySet<H>) -> Self {
        self.strategies = Arc::new(strategies);
        self
    }

    pub fn with_followup_sink(mut self, sink: Arc<dyn FollowUpSink>) -> Self {
        self.followups = Some(sink);
        self
    }

    pub fn with_engine(mut self, engine: LocatorEngine) -> Self {
        self.engine = engine;
        self
    }

    pub fn config(&self) -> &CaptureConfig {
        &self.config
    }

    /// Run `f` against the host page
    pub async fn with_host<R>(&self, f: impl FnOnce(&mut H) -> R) -> R {
        let mut page = self.page.lock().await;
        f(&mut page.host)
    }

    /// Lifecycle state of `region` as tracked by this observer
    pub async fn region_state(&self, region: &H::Region) -> RegionState {
        let page = self.page.lock().await;
        match page.host.tag(region) {
            Some(tag) => page.ledger.state(&tag),
            None => RegionState::Unseen,
        }
    }

    pub async fn provider(&self) -> Provider {
        let page = self.page.lock().await;
        Provider::detect(&page.host.url())
    }

    /// Tag new regions, attach affordances, and place the floating affordance
    /// over the most recent region without one.
    pub async fn scan(&self) -> ScanReport {
        let mut guard = self.page.lock().await;
        let page = &mut *guard;

        let provider = Provider::detect(&page.host.url());
        let candidates = self.strategies.for_provider(provider).candidates(&page.host);
        let mut report = ScanReport {
            candidates: candidates.len(),
            ..ScanReport::default()
        };

        let mut live = HashSet::with_capacity(candidates.len());
        let mut floating = None;

        for region in &candidates {
            let tag = self.engine.ensure_tagged(&mut page.host, region);
            if page.ledger.advance(&tag, RegionState::Tagged) {
                report.newly_tagged += 1;
            }
            if page.ledger.state(&tag) < RegionState::Starred {
                if page.host.attach_affordance(region) {
                    page.ledger.advance(&tag, RegionState::Starred);
                    report.newly_starred += 1;
                } else {
                    floating = Some(region.clone());
                }
            }
            live.insert(tag);
        }
        page.ledger.retain_live(&live);

        match &floating {
            Some(region) => page.host.show_floating_affordance(region),
            None => page.host.hide_floating_affordance(),
        }
        report.floating = floating.is_some();
        page.floating = floating;

        if report.newly_tagged > 0 {
            tracing::debug!(
                provider = %provider,
                candidates = report.candidates,
                tagged = report.newly_tagged,
                starred = report.newly_starred,
                "Scanned page"
            );
        }
        report
    }

    /// Move the floating affordance back over its region (after scroll or resize)
    pub async fn reposition(&self) {
        let mut guard = self.page.lock().await;
        let page = &mut *guard;
        if let Some(region) = &page.floating {
            page.host.show_floating_affordance(region);
        }
    }

    fn extract(&self, host: &mut H, region: &H::Region, provider: Provider) -> ExtractedContent {
        let question = extract_question(host, region, &self.config);
        let answer = extract_answer(host, region);
        let locator = self.engine.locator_for(host, region);

        let mut content = ExtractedContent::new(provider, question, answer).with_locator(locator);
        if let Some(id) = host.provider_message_id(region) {
            content = content.with_provider_message_id(id);
        }
        content
    }

    async fn send_bookmark(&self, content: ExtractedContent) -> Result<Response, BusError> {
        let response = self.coordinator.try_call(Request::Bookmark(content)).await?;
        if let Some(id) = &response.thread_id {
            tracing::info!(thread_id = %id, "Bookmark saved");
        }
        Ok(response)
    }

    /// Bookmark a specific region (its inline affordance was clicked)
    pub async fn bookmark_region(&self, region: &H::Region) -> Result<Response, BusError> {
        let content = {
            let mut page = self.page.lock().await;
            let provider = Provider::detect(&page.host.url());
            self.extract(&mut page.host, region, provider)
        };
        self.send_bookmark(content).await
    }

    /// Bookmark whatever the floating affordance currently sits over
    pub async fn bookmark_floating(&self) -> Result<Response, BusError> {
        let region = self.page.lock().await.floating.clone();
        match region {
            Some(region) => self.bookmark_region(&region).await,
            None => Err(BusError::NoBubble),
        }
    }

    /// Bookmark the most recent non-empty region, or the current selection.
    pub async fn capture_latest(&self) -> Result<Response, BusError> {
        let (content, via) = {
            let mut guard = self.page.lock().await;
            let page = &mut *guard;
            let provider = Provider::detect(&page.host.url());
            let candidates = self.strategies.for_provider(provider).candidates(&page.host);

            let latest = candidates
                .iter()
                .rev()
                .find(|region| !page.host.visible_text(region).trim().is_empty())
                .cloned();

            match latest {
                Some(region) => (self.extract(&mut page.host, &region, provider), VIA_BUBBLE),
                None => {
                    let selection = page
                        .host
                        .selection()
                        .map(|text| text.trim().to_string())
                        .filter(|text| !text.is_empty())
                        .ok_or(BusError::NoBubble)?;
                    (ExtractedContent::new(provider, "", selection), VIA_SELECTION)
                }
            }
        };

        let response = self.send_bookmark(content).await?;
        Ok(if response.ok { response.with_via(via) } else { response })
    }

    /// Resolve a locator, scroll to the region and highlight it briefly.
    pub async fn jump_to(
        &self,
        locator: Option<&Locator>,
        fallback_text: Option<&str>,
    ) -> Result<(), BusError> {
        let (region, seq) = {
            let mut guard = self.page.lock().await;
            let page = &mut *guard;
            let provider = Provider::detect(&page.host.url());
            let candidates = self.strategies.for_provider(provider).candidates(&page.host);

            let resolution = self
                .engine
                .resolve(&mut page.host, &candidates, locator, fallback_text);

            if let Resolution::Fingerprint { region, previous_tag } = &resolution {
                if let Some(tag) = page.host.tag(region) {
                    match previous_tag {
                        Some(previous) if previous != &tag => page.ledger.migrate(previous, &tag),
                        Some(_) => {}
                        None => {
                            // untagged until now: a rebuilt node, whatever its old tag recorded is stale
                            page.ledger.forget(&tag);
                            page.ledger.advance(&tag, RegionState::Tagged);
                        }
                    }
                }
            }

            let Some(region) = resolution.into_region() else {
                tracing::debug!("Jump target not found");
                return Err(BusError::NotFound);
            };

            page.host.scroll_into_view(&region);
            page.host.set_highlighted(&region, true);
            page.highlight_seq += 1;
            page.highlighted = Some((region.clone(), page.highlight_seq));
            (region, page.highlight_seq)
        };

        let page = Arc::clone(&self.page);
        let highlight = self.config.highlight;
        tokio::spawn(async move {
            tokio::time::sleep(highlight).await;
            let mut guard = page.lock().await;
            let page = &mut *guard;
            let superseded = matches!(
                &page.highlighted,
                Some((current, current_seq)) if current == &region && *current_seq != seq
            );
            if !superseded {
                page.host.set_highlighted(&region, false);
                if matches!(&page.highlighted, Some((_, current_seq)) if *current_seq == seq) {
                    page.highlighted = None;
                }
            }
        });

        Ok(())
    }

    pub async fn set_sidebar_minimized(&self, minimized: bool) {
        self.page.lock().await.host.set_sidebar_minimized(minimized);
    }

    pub async fn send_followup(&self, thread_id: Option<&str>, text: &str) -> anyhow::Result<()> {
        let sink = self
            .followups
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("no-composer"))?;
        sink.deliver(thread_id, text).await
    }

    pub async fn page_info(&self) -> PageInfo {
        let page = self.page.lock().await;
        page_info::gather(&page.host)
    }

    /// Tell the Coordinator which page this observer is on
    pub async fn announce_page_info(&self) -> Response {
        let info = self.page_info().await;
        tracing::debug!(url = %info.url, title = %info.title, "Announcing page info");
        self.coordinator.call(Request::PageInfo(info)).await
    }
}

#[async_trait]
impl<H: ObserverHost> Handler for Observer<H> {
    async fn handle(&self, request: Request) -> anyhow::Result<Response> {
        match request {
            Request::CaptureLatest => Ok(self.capture_latest().await?),
            Request::JumpTo { locator, fallback_text, .. } => {
                self.jump_to(locator.as_ref(), fallback_text.as_deref()).await?;
                Ok(Response::ok())
            }
            Request::SidebarMinimize => {
                self.set_sidebar_minimized(true).await;
                Ok(Response::ok())
            }
            Request::SidebarRestore => {
                self.set_sidebar_minimized(false).await;
                Ok(Response::ok())
            }
            Request::SendFollowup { thread_id, text } => {
                self.send_followup(thread_id.as_deref(), &text).await?;
                Ok(Response::ok())
            }
            Request::GetPageInfo => Ok(Response::ok().with_page_info(self.page_info().await)),
            other => anyhow::bail!("unsupported request: {}", other.kind()),
        }
    }
}

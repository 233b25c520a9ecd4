use async_trait::async_trait;
use sidequest_locator::ContentTree;

/// The page an Observer is embedded in.
///
/// Everything the capture pipeline needs from the host environment: region
/// enumeration and text (via [`ContentTree`]), plus the few decorations and
/// navigation primitives it drives.
pub trait ObserverHost: ContentTree + Send + 'static {
    fn url(&self) -> String;

    fn page_title(&self) -> String;

    fn meta_description(&self) -> Option<String> {
        None
    }

    /// Candidate assistant regions in document order
    fn candidate_regions(&self) -> Vec<Self::Region>;

    /// Visible text of the blocks preceding `region`, nearest first
    fn preceding_text_blocks(&self, region: &Self::Region) -> Vec<String>;

    /// Provider's own id for the message rendered in `region`, when exposed
    fn provider_message_id(&self, _region: &Self::Region) -> Option<String> {
        None
    }

    /// Current user text selection
    fn selection(&self) -> Option<String>;

    /// Attach the inline bookmark affordance. Returns false if the region
    /// could not take one.
    fn attach_affordance(&mut self, region: &Self::Region) -> bool;

    /// Show (or move) the floating affordance over `region`
    fn show_floating_affordance(&mut self, region: &Self::Region);

    fn hide_floating_affordance(&mut self);

    fn scroll_into_view(&mut self, region: &Self::Region);

    fn set_highlighted(&mut self, region: &Self::Region, highlighted: bool);

    fn set_sidebar_minimized(&mut self, minimized: bool);
}

/// Delivers follow-up prompts into the page's own composer
#[async_trait]
pub trait FollowUpSink: Send + Sync {
    async fn deliver(&self, thread_id: Option<&str>, text: &str) -> anyhow::Result<()>;
}

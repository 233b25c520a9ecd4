//! In-memory host page, for tests and headless runs.

use sidequest_locator::ContentTree;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::host::ObserverHost;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NodeKind {
    User,
    Assistant,
}

#[derive(Debug, Clone)]
struct Node {
    id: u64,
    kind: NodeKind,
    text: String,
    tag: Option<String>,
    affordance: bool,
}

/// Chat transcript held in memory. Regions are node ids; [`MemoryPage::rerender`]
/// rebuilds every node under a new id, dropping tags and affordances the way a
/// client-side framework would.
#[derive(Debug)]
pub struct MemoryPage {
    url: String,
    title: String,
    description: Option<String>,
    nodes: Vec<Node>,
    next_id: u64,
    selection: Option<String>,
    refuse_affordances: bool,
    floating: Option<u64>,
    floating_moves: usize,
    scrolled_to: Vec<u64>,
    highlighted: HashSet<u64>,
    sidebar_minimized: bool,
    enumerations: AtomicUsize,
}

impl MemoryPage {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: String::new(),
            description: None,
            nodes: Vec::new(),
            next_id: 0,
            selection: None,
            refuse_affordances: false,
            floating: None,
            floating_moves: 0,
            scrolled_to: Vec::new(),
            highlighted: HashSet::new(),
            sidebar_minimized: false,
            enumerations: AtomicUsize::new(0),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    fn push(&mut self, kind: NodeKind, text: &str) -> u64 {
        self.next_id += 1;
        self.nodes.push(Node {
            id: self.next_id,
            kind,
            text: text.to_string(),
            tag: None,
            affordance: false,
        });
        self.next_id
    }

    pub fn push_user(&mut self, text: &str) -> u64 {
        self.push(NodeKind::User, text)
    }

    /// Append an assistant answer; returns its region
    pub fn push_assistant(&mut self, text: &str) -> u64 {
        self.push(NodeKind::Assistant, text)
    }

    /// Append a question/answer pair; returns the answer region
    pub fn push_exchange(&mut self, question: &str, answer: &str) -> u64 {
        self.push_user(question);
        self.push_assistant(answer)
    }

    pub fn set_text(&mut self, region: u64, text: &str) {
        if let Some(node) = self.node_mut(region) {
            node.text = text.to_string();
        }
    }

    pub fn remove(&mut self, region: u64) {
        self.nodes.retain(|node| node.id != region);
    }

    /// Rebuild every node with a fresh id, losing tags and affordances
    pub fn rerender(&mut self) {
        let old = std::mem::take(&mut self.nodes);
        for node in old {
            self.push(node.kind, &node.text);
        }
        self.floating = None;
        self.highlighted.clear();
    }

    pub fn set_url(&mut self, url: impl Into<String>) {
        self.url = url.into();
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn set_selection(&mut self, selection: Option<&str>) {
        self.selection = selection.map(str::to_string);
    }

    /// Make affordance attachment fail, as on regions the host cannot decorate
    pub fn refuse_affordances(&mut self, refuse: bool) {
        self.refuse_affordances = refuse;
    }

    pub fn assistant_regions(&self) -> Vec<u64> {
        self.nodes
            .iter()
            .filter(|node| node.kind == NodeKind::Assistant)
            .map(|node| node.id)
            .collect()
    }

    pub fn has_affordance(&self, region: u64) -> bool {
        self.node(region).map(|node| node.affordance).unwrap_or(false)
    }

    pub fn floating(&self) -> Option<u64> {
        self.floating
    }

    pub fn floating_moves(&self) -> usize {
        self.floating_moves
    }

    pub fn scrolled_to(&self) -> &[u64] {
        &self.scrolled_to
    }

    pub fn is_highlighted(&self, region: u64) -> bool {
        self.highlighted.contains(&region)
    }

    pub fn sidebar_minimized(&self) -> bool {
        self.sidebar_minimized
    }

    /// How many times the candidate regions were enumerated
    pub fn enumerations(&self) -> usize {
        self.enumerations.load(Ordering::Relaxed)
    }

    fn node(&self, region: u64) -> Option<&Node> {
        self.nodes.iter().find(|node| node.id == region)
    }

    fn node_mut(&mut self, region: u64) -> Option<&mut Node> {
        self.nodes.iter_mut().find(|node| node.id == region)
    }
}

impl ContentTree for MemoryPage {
    type Region = u64;

    fn visible_text(&self, region: &u64) -> String {
        self.node(*region).map(|node| node.text.clone()).unwrap_or_default()
    }

    fn tag(&self, region: &u64) -> Option<String> {
        self.node(*region)?.tag.clone()
    }

    fn set_tag(&mut self, region: &u64, tag: &str) {
        if let Some(node) = self.node_mut(*region) {
            node.tag = Some(tag.to_string());
        }
    }

    fn find_by_tag(&self, tag: &str) -> Option<u64> {
        self.nodes
            .iter()
            .find(|node| node.tag.as_deref() == Some(tag))
            .map(|node| node.id)
    }
}

impl ObserverHost for MemoryPage {
    fn url(&self) -> String {
        self.url.clone()
    }

    fn page_title(&self) -> String {
        self.title.clone()
    }

    fn meta_description(&self) -> Option<String> {
        self.description.clone()
    }

    fn candidate_regions(&self) -> Vec<u64> {
        self.enumerations.fetch_add(1, Ordering::Relaxed);
        self.assistant_regions()
    }

    fn preceding_text_blocks(&self, region: &u64) -> Vec<String> {
        let Some(index) = self.nodes.iter().position(|node| node.id == *region) else {
            return Vec::new();
        };
        self.nodes[..index]
            .iter()
            .rev()
            .map(|node| node.text.clone())
            .collect()
    }

    fn selection(&self) -> Option<String> {
        self.selection.clone()
    }

    fn attach_affordance(&mut self, region: &u64) -> bool {
        if self.refuse_affordances {
            return false;
        }
        match self.node_mut(*region) {
            Some(node) => {
                node.affordance = true;
                true
            }
            None => false,
        }
    }

    fn show_floating_affordance(&mut self, region: &u64) {
        self.floating = Some(*region);
        self.floating_moves += 1;
    }

    fn hide_floating_affordance(&mut self) {
        self.floating = None;
    }

    fn scroll_into_view(&mut self, region: &u64) {
        self.scrolled_to.push(*region);
    }

    fn set_highlighted(&mut self, region: &u64, highlighted: bool) {
        if highlighted {
            self.highlighted.insert(*region);
        } else {
            self.highlighted.remove(region);
        }
    }

    fn set_sidebar_minimized(&mut self, minimized: bool) {
        self.sidebar_minimized = minimized;
    }
}

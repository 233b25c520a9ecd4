use sidequest_types::Locator;

use crate::fingerprint::{fingerprint, normalize_text};
use crate::tree::ContentTree;

const DEFAULT_TAG_PREFIX: &str = "sq-";

/// Outcome of resolving a locator against the live tree
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution<R> {
    /// The tagged node still exists
    Tagged(R),
    /// Matched by fingerprint and re-tagged. `previous_tag` is the tag the
    /// region carried before, if it had one.
    Fingerprint { region: R, previous_tag: Option<String> },
    NotFound,
}

impl<R> Resolution<R> {
    pub fn region(&self) -> Option<&R> {
        match self {
            Resolution::Tagged(region) | Resolution::Fingerprint { region, .. } => Some(region),
            Resolution::NotFound => None,
        }
    }

    pub fn into_region(self) -> Option<R> {
        match self {
            Resolution::Tagged(region) | Resolution::Fingerprint { region, .. } => Some(region),
            Resolution::NotFound => None,
        }
    }

    pub fn is_found(&self) -> bool {
        !matches!(self, Resolution::NotFound)
    }
}

/// Assigns and resolves locators over any [`ContentTree`]
#[derive(Debug, Clone)]
pub struct LocatorEngine {
    tag_prefix: String,
}

impl LocatorEngine {
    pub fn new() -> Self {
        Self {
            tag_prefix: DEFAULT_TAG_PREFIX.to_string(),
        }
    }

    pub fn with_tag_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.tag_prefix = prefix.into();
        self
    }

    /// Fresh random tag
    pub fn new_stable_id(&self) -> String {
        format!("{}{}", self.tag_prefix, uuid::Uuid::new_v4().simple())
    }

    /// Return the region's tag, assigning one first if it has none
    pub fn ensure_tagged<T: ContentTree>(&self, tree: &mut T, region: &T::Region) -> String {
        if let Some(tag) = tree.tag(region) {
            return tag;
        }
        let tag = self.new_stable_id();
        tree.set_tag(region, &tag);
        tracing::trace!(tag = %tag, "Tagged region");
        tag
    }

    /// Build the locator for a region, tagging it if needed
    pub fn locator_for<T: ContentTree>(&self, tree: &mut T, region: &T::Region) -> Locator {
        let stable_id = self.ensure_tagged(tree, region);
        Locator::new(stable_id, fingerprint(&tree.visible_text(region)))
    }

    /// Re-find a region.
    ///
    /// 1. Tag lookup by `locator.stable_id`.
    /// 2. Fingerprint scan over `candidates` from last to first. The target is
    ///    the locator's fingerprint, or the fingerprint of `fallback_text` when
    ///    there is no locator. When `fallback_text` hashes to the target, the
    ///    region's normalized text must also equal it.
    /// 3. Otherwise not found.
    ///
    /// A fingerprint match is re-tagged with the locator's stable id.
    pub fn resolve<T: ContentTree>(
        &self,
        tree: &mut T,
        candidates: &[T::Region],
        locator: Option<&Locator>,
        fallback_text: Option<&str>,
    ) -> Resolution<T::Region> {
        if let Some(region) = locator.and_then(|l| tree.find_by_tag(&l.stable_id)) {
            return Resolution::Tagged(region);
        }

        let fallback = fallback_text
            .map(normalize_text)
            .filter(|text| !text.is_empty());

        let target = match (locator, &fallback) {
            (Some(locator), _) => locator.fingerprint.clone(),
            (None, Some(text)) => fingerprint(text),
            (None, None) => return Resolution::NotFound,
        };

        let confirm = fallback.filter(|text| fingerprint(text) == target);

        let matched = candidates.iter().rev().find(|region| {
            let text = tree.visible_text(region);
            fingerprint(&text) == target
                && confirm
                    .as_deref()
                    .map_or(true, |expected| normalize_text(&text) == expected)
        });

        let Some(region) = matched.cloned() else {
            tracing::debug!(target_fingerprint = %target, "No region matched locator");
            return Resolution::NotFound;
        };

        let previous_tag = tree.tag(&region);
        let tag = match locator {
            Some(locator) => locator.stable_id.clone(),
            None => previous_tag.clone().unwrap_or_else(|| self.new_stable_id()),
        };
        if previous_tag.as_deref() != Some(tag.as_str()) {
            tree.set_tag(&region, &tag);
        }
        tracing::debug!(tag = %tag, "Re-identified region by fingerprint");

        Resolution::Fingerprint { region, previous_tag }
    }
}

impl Default for LocatorEngine {
    fn default() -> Self {
        Self::new()
    }
}

use std::fmt::Debug;

/// Attribute name the tag is written under on a host region
pub const TAG_ATTRIBUTE: &str = "data-sidequest-id";

/// Host content tree the engine reads from and tags.
///
/// A `Region` is a cheap handle to one live node. Handles of destroyed nodes
/// simply stop being returned by [`ContentTree::find_by_tag`].
pub trait ContentTree {
    type Region: Clone + PartialEq + Debug + Send + Sync + 'static;

    /// Visible text of `region`, unnormalized
    fn visible_text(&self, region: &Self::Region) -> String;

    /// Tag previously written onto `region`, if any
    fn tag(&self, region: &Self::Region) -> Option<String>;

    /// Write `tag` onto `region`, replacing any previous tag
    fn set_tag(&mut self, region: &Self::Region, tag: &str);

    /// Live region currently carrying `tag`
    fn find_by_tag(&self, tag: &str) -> Option<Self::Region>;
}

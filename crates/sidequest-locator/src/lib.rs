//! Locator engine: two independent ways to re-find a rendered content region.
//!
//! A region is tagged with a random id the first time it is seen, and its
//! visible text is fingerprinted with 32-bit FNV-1a. Tags are O(1) to look up
//! but vanish when the host rebuilds the node; fingerprints survive rebuilds
//! but need a scan.

pub mod fingerprint;
pub mod tree;
pub mod engine;

pub use fingerprint::{fingerprint, fnv1a_32, normalize_text};
pub use tree::{ContentTree, TAG_ATTRIBUTE};
pub use engine::{LocatorEngine, Resolution};

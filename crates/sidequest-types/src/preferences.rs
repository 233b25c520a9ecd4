use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    #[default]
    System,
}

/// UI preference flags, each stored under its own durable key
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    pub sidebar_minimized: bool,
    pub theme: Theme,
    pub panel_width: u32,
}

impl Preferences {
    pub const DEFAULT_PANEL_WIDTH: u32 = 360;
    pub const MIN_PANEL_WIDTH: u32 = 280;
    pub const MAX_PANEL_WIDTH: u32 = 720;

    pub fn clamp_panel_width(width: u32) -> u32 {
        width.clamp(Self::MIN_PANEL_WIDTH, Self::MAX_PANEL_WIDTH)
    }
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            sidebar_minimized: false,
            theme: Theme::default(),
            panel_width: Self::DEFAULT_PANEL_WIDTH,
        }
    }
}

use std::time::Duration;

#[derive(Debug, Clone)]
pub struct CaptureConfig {
    /// Quiet period that coalesces a burst of mutations into one scan
    pub debounce: Duration,
    /// How long a jump target stays highlighted
    pub highlight: Duration,
    /// Questions are truncated to this many characters
    pub question_max_chars: usize,
    /// Preceding blocks this long or longer are not taken as the question
    pub question_block_max_chars: usize,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(300),
            highlight: Duration::from_millis(1600),
            question_max_chars: 600,
            question_block_max_chars: 2000,
        }
    }
}

impl CaptureConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    pub fn with_highlight(mut self, highlight: Duration) -> Self {
        self.highlight = highlight;
        self
    }

    pub fn with_question_max_chars(mut self, max: usize) -> Self {
        self.question_max_chars = max;
        self
    }

    pub fn with_question_block_max_chars(mut self, max: usize) -> Self {
        self.question_block_max_chars = max;
        self
    }
}

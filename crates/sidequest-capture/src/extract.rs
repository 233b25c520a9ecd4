use crate::config::CaptureConfig;
use crate::host::ObserverHost;

/// Question for an answer region: the nearest preceding non-empty block
/// shorter than `question_block_max_chars`, cut to `question_max_chars`.
pub fn extract_question<H: ObserverHost>(host: &H, region: &H::Region, config: &CaptureConfig) -> String {
    host.preceding_text_blocks(region)
        .iter()
        .map(|block| block.trim())
        .find(|block| !block.is_empty() && block.chars().count() < config.question_block_max_chars)
        .map(|block| truncate_chars(block, config.question_max_chars))
        .unwrap_or_default()
}

/// Full visible text of the region, trimmed
pub fn extract_answer<H: ObserverHost>(host: &H, region: &H::Region) -> String {
    host.visible_text(region).trim().to_string()
}

pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((end, _)) => text[..end].to_string(),
        None => text.to_string(),
    }
}

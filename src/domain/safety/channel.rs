//! Messaging channel dialect.
//!
//! The channel renders `*bold*` and `_italic_`, so generic markdown emphasis
//! is rewritten: `**bold**` → `*bold*` and `*italic*` → `_italic_`. Bold is
//! parked behind private-use placeholders first so the italic rule cannot
//! consume its asterisks.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::foundation::ValidationError;

/// Maximum message length accepted by the channel, in characters.
pub const CHANNEL_MAX_LENGTH: usize = 4000;
/// Characters kept when a message is truncated.
pub const CHANNEL_TRUNCATE_AT: usize = 3950;
/// Appended to truncated messages.
pub const CHANNEL_TRUNCATION_MARKER: &str = "\n\n...(truncated)";

const BOLD_OPEN: char = '\u{E000}';
const BOLD_CLOSE: char = '\u{E001}';

static BULLETS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^[ \t]*[*\-•][ \t]+").expect("valid regex"));
static BOLD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*([^*\n]+)\*\*").expect("valid regex"));
static ITALIC: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*([^*\n]+)\*").expect("valid regex"));
static PARKED_BOLD: Lazy<Regex> =
    Lazy::new(|| Regex::new("\u{E000}([^\u{E001}]*)\u{E001}").expect("valid regex"));

/// Rewrites text into the channel dialect and enforces its length limit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelFormatter {
    max_length: usize,
    truncate_at: usize,
    marker: String,
}

impl Default for ChannelFormatter {
    fn default() -> Self {
        Self {
            max_length: CHANNEL_MAX_LENGTH,
            truncate_at: CHANNEL_TRUNCATE_AT,
            marker: CHANNEL_TRUNCATION_MARKER.to_string(),
        }
    }
}

impl ChannelFormatter {
    /// Creates a formatter. A truncated message must still fit the maximum.
    pub fn new(
        max_length: usize,
        truncate_at: usize,
        marker: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let marker = marker.into();
        let marker_len = marker.chars().count();
        if marker_len == 0 {
            return Err(ValidationError::empty_field("truncation_marker"));
        }
        if truncate_at == 0 || truncate_at + marker_len > max_length {
            return Err(ValidationError::out_of_range(
                "truncate_at",
                1,
                max_length.saturating_sub(marker_len) as i64,
                truncate_at as i64,
            ));
        }
        Ok(Self {
            max_length,
            truncate_at,
            marker,
        })
    }

    pub fn max_length(&self) -> usize {
        self.max_length
    }

    pub fn marker(&self) -> &str {
        &self.marker
    }

    /// Converts emphasis and bullets, trims, then truncates if too long.
    pub fn to_channel_format(&self, text: &str) -> String {
        let text: String = text
            .chars()
            .filter(|c| *c != BOLD_OPEN && *c != BOLD_CLOSE)
            .collect();
        let text = BULLETS.replace_all(&text, "- ");
        let text = BOLD.replace_all(&text, "\u{E000}${1}\u{E001}");
        let text = ITALIC.replace_all(&text, "_${1}_");
        let text = PARKED_BOLD.replace_all(&text, "*${1}*");
        let formatted = text.trim();

        if formatted.chars().count() <= self.max_length {
            return formatted.to_string();
        }
        let mut truncated: String = formatted.chars().take(self.truncate_at).collect();
        truncated.truncate(truncated.trim_end().len());
        truncated.push_str(&self.marker);
        truncated
    }
}

//! Output safety: leak probes in, sanitized channel-ready replies out.

mod audit;
mod channel;
mod error;
mod filter;
mod leak;
mod reply_parser;
mod sanitizer;

pub use audit::{SafetyAudit, SafetyReport, Violation};
pub use channel::{
    ChannelFormatter, CHANNEL_MAX_LENGTH, CHANNEL_TRUNCATE_AT, CHANNEL_TRUNCATION_MARKER,
};
pub use error::PatternError;
pub use filter::{
    Delivery, FilterSettings, OutputSafetyFilter, SafeReply, DEFAULT_FALLBACK_REPLY,
    DEFAULT_MAX_REPLY_CHARS, DEFAULT_TEMPLATE_MARKERS,
};
pub use leak::{LeakDetector, LeakVerdict, DEFAULT_PROBES};
pub use reply_parser::{InternalThought, ParsedReply, ReplyParser, KEPT_REPLY_WORDS, MAX_REPLY_WORDS};
pub use sanitizer::{
    default_rules, SanitizationRule, Sanitizer, MARKER_TAGS, SANITIZER_CEILING, SANITIZER_MARKER,
};

//! Sentiment highlighting of the comparison summary.
//!
//! The free-text summary is segmented into plain text, highlighted terms,
//! and paragraph breaks. Positive terms are matched before negative ones,
//! so `不推薦` keeps its leading `不` plain while `推薦` is highlighted
//! positive, matching the established display behavior. The stored
//! summary text itself is never altered; this is presentation only.

use std::sync::LazyLock;

use regex::Regex;

static POSITIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new("更好|較佳|優勢|有利|推薦|適合|理想|優點|較高|較多").expect("valid regex")
});
static NEGATIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new("較差|不足|劣勢|不利|不推薦|不適合|問題|缺點|較低|較少").expect("valid regex")
});
static NEUTRAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("相似|差異|不同|各有|可能|視情況").expect("valid regex"));

/// Sentiment class of a highlighted term.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sentiment {
    /// Positive-evaluation term.
    Positive,
    /// Negative-evaluation term.
    Negative,
    /// Neutral-comparison term.
    Neutral,
}

/// One piece of the formatted summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SummarySegment {
    /// Plain text.
    Text(String),
    /// A recognized sentiment term.
    Highlight {
        /// The matched term, verbatim.
        text: String,
        /// Its sentiment class.
        sentiment: Sentiment,
    },
    /// A paragraph break (one per newline in the source).
    ParagraphBreak,
}

/// A summary split into renderable segments, with the unmodified source
/// text kept alongside.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormattedSummary {
    /// The summary exactly as the server produced it.
    pub raw: String,
    /// Presentation segments.
    pub segments: Vec<SummarySegment>,
}

/// Splits `raw` into highlighted segments and paragraph breaks.
#[must_use]
pub fn format_summary(raw: &str) -> FormattedSummary {
    let mut segments = vec![SummarySegment::Text(raw.to_string())];
    for (regex, sentiment) in [
        (&*POSITIVE, Sentiment::Positive),
        (&*NEGATIVE, Sentiment::Negative),
        (&*NEUTRAL, Sentiment::Neutral),
    ] {
        segments = split_pass(segments, regex, sentiment);
    }
    FormattedSummary {
        raw: raw.to_string(),
        segments: break_paragraphs(segments),
    }
}

/// Runs one highlighting pass over the still-plain segments.
fn split_pass(
    segments: Vec<SummarySegment>,
    regex: &Regex,
    sentiment: Sentiment,
) -> Vec<SummarySegment> {
    let mut out = Vec::with_capacity(segments.len());
    for segment in segments {
        let SummarySegment::Text(text) = segment else {
            out.push(segment);
            continue;
        };
        let mut cursor = 0;
        for found in regex.find_iter(&text) {
            if found.start() > cursor {
                out.push(SummarySegment::Text(text[cursor..found.start()].to_string()));
            }
            out.push(SummarySegment::Highlight {
                text: found.as_str().to_string(),
                sentiment,
            });
            cursor = found.end();
        }
        if cursor < text.len() {
            out.push(SummarySegment::Text(text[cursor..].to_string()));
        }
    }
    out
}

/// Converts newlines inside plain segments into paragraph breaks.
fn break_paragraphs(segments: Vec<SummarySegment>) -> Vec<SummarySegment> {
    let mut out = Vec::with_capacity(segments.len());
    for segment in segments {
        let SummarySegment::Text(text) = segment else {
            out.push(segment);
            continue;
        };
        let mut first = true;
        for part in text.split('\n') {
            if !first {
                out.push(SummarySegment::ParagraphBreak);
            }
            first = false;
            if !part.is_empty() {
                out.push(SummarySegment::Text(part.to_string()));
            }
        }
    }
    out
}

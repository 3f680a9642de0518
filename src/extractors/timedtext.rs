//! Parser for YouTube's timed-text caption XML.
//!
//! ```xml
//! <transcript>
//!   <text start="0.16" dur="2.4">Hey there &amp;amp; welcome</text>
//! </transcript>
//! ```
//!
//! Caption text is escaped twice: once by the XML document and once more as HTML.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use scraper::Html;

use super::{TranscriptEntry, YoutubeError};

static TEXT_ELEMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)<text\b([^>]*?)(?:/>|>(.*?)</text>)").expect("valid timedtext pattern")
});

static ATTRIBUTE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"([\w:-]+)="([^"]*)""#).expect("valid attribute pattern"));

static HTML_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<\s*/?\s*([^\s/>]*)[^>]*>").expect("valid tag pattern"));

/// Tags kept when formatting is preserved
const FORMATTING_TAGS: [&str; 10] = [
    "strong", "em", "b", "i", "mark", "small", "del", "ins", "sub", "sup",
];

#[derive(Debug, Clone, Copy, Default)]
pub struct TimedTextParser {
    preserve_formatting: bool,
}

impl TimedTextParser {
    pub fn new(preserve_formatting: bool) -> Self {
        Self {
            preserve_formatting,
        }
    }

    /// Parse a timed-text document into entries, skipping elements without text
    pub fn parse(&self, video_id: &str, xml: &str) -> Result<Vec<TranscriptEntry>, YoutubeError> {
        TEXT_ELEMENT
            .captures_iter(xml)
            .filter_map(|caps| {
                let body = caps.get(2).filter(|m| !m.as_str().is_empty())?;
                Some(self.entry(video_id, &caps[1], body.as_str()))
            })
            .collect()
    }

    fn entry(&self, video_id: &str, attributes: &str, body: &str) -> Result<TranscriptEntry, YoutubeError> {
        let mut start = None;
        let mut duration = None;
        for attr in ATTRIBUTE.captures_iter(attributes) {
            match &attr[1] {
                "start" => start = Some(parse_seconds(video_id, "start", &attr[2])?),
                "dur" => duration = Some(parse_seconds(video_id, "dur", &attr[2])?),
                _ => {}
            }
        }

        let start = start.ok_or_else(|| YoutubeError::unparsable(video_id, "caption without start time"))?;

        Ok(TranscriptEntry {
            text: self.clean_text(body),
            start,
            duration: duration.unwrap_or(0.0),
        })
    }

    fn clean_text(&self, body: &str) -> String {
        let text = html_unescape(&xml_decode(body));
        let preserve = self.preserve_formatting;

        HTML_TAG
            .replace_all(&text, |caps: &Captures| {
                if preserve && FORMATTING_TAGS.contains(&&caps[1]) {
                    caps[0].to_string()
                } else {
                    String::new()
                }
            })
            .into_owned()
    }
}

fn parse_seconds(video_id: &str, name: &str, value: &str) -> Result<f64, YoutubeError> {
    value
        .trim()
        .parse::<f64>()
        .map_err(|_| YoutubeError::unparsable(video_id, format!("invalid {} value: {:?}", name, value)))
}

/// Resolve the XML-level escaping of an element body
fn xml_decode(raw: &str) -> String {
    Html::parse_fragment(raw).root_element().text().collect()
}

/// Resolve HTML entities while keeping any markup as literal text
fn html_unescape(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    Html::parse_fragment(&text.replace('<', "&lt;"))
        .root_element()
        .text()
        .collect()
}

use anyhow::Result;
use std::io::Write;
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

use crate::extractors::TranscriptEntry;
use crate::{ErrorKind, TranscriptorError};

/// Language reported when the preferred-language fetch succeeds
pub const FOUND_LANGUAGE: &str = "found";

/// The single JSON value the program prints
#[derive(Debug, Clone, PartialEq)]
pub enum Envelope {
    Success {
        transcript: Vec<TranscriptEntry>,
        language: String,
    },
    /// A fetch that produced no transcript
    Failure { error: String },
    /// Bad invocation; serialized without transcript fields
    Rejected { error: String },
}

impl Envelope {
    pub fn success(transcript: Vec<TranscriptEntry>, language: impl Into<String>) -> Self {
        Self::Success {
            transcript,
            language: language.into(),
        }
    }

    pub fn from_error(err: &TranscriptorError) -> Self {
        match err.kind() {
            ErrorKind::Usage | ErrorKind::Resolution => Self::Rejected {
                error: err.to_string(),
            },
            ErrorKind::Fetch | ErrorKind::Infrastructure => Self::Failure {
                error: err.to_string(),
            },
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Success { .. } => None,
            Self::Failure { error } | Self::Rejected { error } => Some(error),
        }
    }
}

/// Entries' text joined by single spaces
pub fn full_text(transcript: &[TranscriptEntry]) -> String {
    transcript
        .iter()
        .map(|entry| entry.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

impl Serialize for Envelope {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Envelope::Success {
                transcript,
                language,
            } => {
                let mut map = serializer.serialize_map(Some(4))?;
                map.serialize_entry("success", &true)?;
                map.serialize_entry("transcript", transcript)?;
                map.serialize_entry("language", language)?;
                map.serialize_entry("full_text", &full_text(transcript))?;
                map.end()
            }
            Envelope::Failure { error } => {
                let mut map = serializer.serialize_map(Some(4))?;
                map.serialize_entry("success", &false)?;
                map.serialize_entry("error", error)?;
                map.serialize_entry("transcript", &[] as &[TranscriptEntry])?;
                map.serialize_entry("full_text", "")?;
                map.end()
            }
            Envelope::Rejected { error } => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("success", &false)?;
                map.serialize_entry("error", error)?;
                map.end()
            }
        }
    }
}

/// Render the envelope as one line of JSON
pub fn format_as_json(envelope: &Envelope) -> Result<String> {
    Ok(serde_json::to_string(envelope)?)
}

/// Print the envelope to stdout
pub fn print_to_console(envelope: &Envelope) -> Result<()> {
    write_json(envelope, &mut std::io::stdout().lock())
}

/// Write the envelope as one JSON line, returning write failures instead of panicking
pub fn write_json<W: Write>(envelope: &Envelope, writer: &mut W) -> Result<()> {
    let content = format_as_json(envelope)?;
    writeln!(writer, "{}", content)?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn entry(text: &str, start: f64) -> TranscriptEntry {
        TranscriptEntry {
            text: text.to_string(),
            start,
            duration: 1.5,
        }
    }

    fn keys(json: &str) -> Vec<String> {
        // serde_json::Value sorts keys, so read them off the raw text
        let mut keys = Vec::new();
        let mut rest = json;
        while let Some(pos) = rest.find("\":") {
            let head = &rest[..pos];
            if let Some(open) = head.rfind('"') {
                keys.push(head[open + 1..].to_string());
            }
            rest = &rest[pos + 2..];
        }
        keys
    }

    #[test]
    fn test_success_shape() {
        let envelope = Envelope::success(vec![entry("hello", 0.0), entry("world", 1.5)], FOUND_LANGUAGE);
        let json = format_as_json(&envelope).unwrap();
        assert_eq!(keys(&json), vec!["success", "transcript", "text", "start", "duration", "text", "start", "duration", "language", "full_text"]);

        let value: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["success"], true);
        assert_eq!(value["language"], "found");
        assert_eq!(value["full_text"], "hello world");
        assert_eq!(value["transcript"][1]["start"], 1.5);
        assert!(value.get("error").is_none());
    }

    #[test]
    fn test_failure_shape() {
        let err = TranscriptorError::NoAccessibleTranscript {
            video_id: "abc".to_string(),
        };
        let json = format_as_json(&Envelope::from_error(&err)).unwrap();
        assert_eq!(keys(&json), vec!["success", "error", "transcript", "full_text"]);

        let value: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["success"], false);
        assert_eq!(value["transcript"], Value::Array(vec![]));
        assert_eq!(value["full_text"], "");
        assert_eq!(value["error"], "No accessible transcripts found for video ID: abc");
    }

    #[test]
    fn test_rejection_omits_transcript_fields() {
        let envelope = Envelope::from_error(&TranscriptorError::usage());
        let json = format_as_json(&envelope).unwrap();
        assert_eq!(
            json,
            r#"{"success":false,"error":"Usage: get-transcript <video_id_or_url>"}"#
        );
    }

    #[test]
    fn test_non_ascii_is_literal() {
        let envelope = Envelope::success(vec![entry("héllo 世界", 0.0)], "fr");
        let json = format_as_json(&envelope).unwrap();
        assert!(json.contains("héllo 世界"));
        assert!(!json.contains("\\u"));
        assert!(!json.contains('\n'));
    }

    #[test]
    fn test_full_text_of_empty_transcript() {
        assert_eq!(full_text(&[]), "");
    }

    #[test]
    fn test_write_json_emits_single_line() {
        let mut buf = Vec::new();
        write_json(&Envelope::from_error(&TranscriptorError::usage()), &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.ends_with('\n'));
        assert_eq!(text.lines().count(), 1);
    }

    struct ClosedPipe;

    impl Write for ClosedPipe {
        fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
            Err(std::io::ErrorKind::BrokenPipe.into())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Err(std::io::ErrorKind::BrokenPipe.into())
        }
    }

    #[test]
    fn test_write_json_reports_closed_output() {
        let envelope = Envelope::success(vec![entry("hi", 0.0)], FOUND_LANGUAGE);
        let err = write_json(&envelope, &mut ClosedPipe).unwrap_err();
        let io = err.downcast_ref::<std::io::Error>().unwrap();
        assert_eq!(io.kind(), std::io::ErrorKind::BrokenPipe);
    }
}

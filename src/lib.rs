//! yt-transcript - fetch YouTube transcripts and print them as JSON
//!
//! This library resolves a YouTube URL or bare video ID, retrieves the transcript through
//! a two-tier strategy (preferred languages first, then any accessible track) and shapes
//! the outcome into a fixed JSON envelope.

pub mod cli;
pub mod config;
pub mod extractors;
pub mod fetcher;
pub mod output;
pub mod resolver;

pub use cli::Cli;
pub use config::Config;
pub use extractors::{TranscriptApi, TranscriptEntry, TranscriptList, TranscriptTrack, YoutubeError};
pub use fetcher::TranscriptFetcher;
pub use output::Envelope;

/// Result type used throughout the library
pub type Result<T> = anyhow::Result<T>;

/// Name the binary is invoked as, used in the usage message
pub const PROGRAM_NAME: &str = "get-transcript";

/// Coarse classification of a [`TranscriptorError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Usage,
    Resolution,
    Fetch,
    Infrastructure,
}

/// Error types specific to the transcript fetcher
#[derive(thiserror::Error, Debug)]
pub enum TranscriptorError {
    #[error("Usage: {program} <video_id_or_url>")]
    Usage { program: &'static str },

    #[error("Could not extract video ID from URL")]
    UnresolvableUrl(String),

    #[error("No transcript available for video ID: {video_id}. Error: {source}")]
    ListingFailed {
        video_id: String,
        #[source]
        source: YoutubeError,
    },

    #[error("No accessible transcripts found for video ID: {video_id}")]
    NoAccessibleTranscript { video_id: String },

    #[error("Unexpected error: {0:#}")]
    Unexpected(anyhow::Error),
}

impl TranscriptorError {
    pub fn usage() -> Self {
        Self::Usage {
            program: PROGRAM_NAME,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Usage { .. } => ErrorKind::Usage,
            Self::UnresolvableUrl(_) => ErrorKind::Resolution,
            Self::ListingFailed { .. } | Self::NoAccessibleTranscript { .. } => ErrorKind::Fetch,
            Self::Unexpected(_) => ErrorKind::Infrastructure,
        }
    }

    /// Usage and resolution problems fail the process; fetch outcomes are reported as data.
    pub fn exit_code(&self) -> u8 {
        match self.kind() {
            ErrorKind::Usage | ErrorKind::Resolution => 1,
            ErrorKind::Fetch | ErrorKind::Infrastructure => 0,
        }
    }
}

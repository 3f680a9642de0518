use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub mod error;
pub mod timedtext;
pub mod youtube;

pub use error::YoutubeError;
pub use youtube::YoutubeClient;

/// One timed caption segment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    /// Caption text
    pub text: String,

    /// Offset from the start of the video, in seconds
    pub start: f64,

    /// How long the caption is shown, in seconds
    pub duration: f64,
}

/// A single caption track offered for a video
#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptTrack {
    pub video_id: String,

    /// Human readable language name, e.g. "English (auto-generated)"
    pub language: String,

    pub language_code: String,

    /// Auto-generated (ASR) rather than uploaded by the creator
    pub is_generated: bool,

    pub is_translatable: bool,

    /// Timed-text download URL
    pub base_url: String,
}

/// A transcript that has been downloaded
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedTranscript {
    pub video_id: String,
    pub language: String,
    pub language_code: String,
    pub is_generated: bool,
    pub entries: Vec<TranscriptEntry>,
}

/// All caption tracks of a video, manually created ones kept apart from generated ones
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TranscriptList {
    pub video_id: String,
    manually_created: Vec<TranscriptTrack>,
    generated: Vec<TranscriptTrack>,
}

impl TranscriptList {
    /// Build a list from tracks in the order YouTube reports them
    pub fn new(video_id: impl Into<String>, tracks: impl IntoIterator<Item = TranscriptTrack>) -> Self {
        let (generated, manually_created) = tracks.into_iter().partition(|t| t.is_generated);
        Self {
            video_id: video_id.into(),
            manually_created,
            generated,
        }
    }

    /// Manually created tracks first, then generated ones
    pub fn iter(&self) -> impl Iterator<Item = &TranscriptTrack> {
        self.manually_created.iter().chain(self.generated.iter())
    }

    pub fn len(&self) -> usize {
        self.manually_created.len() + self.generated.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Language codes in iteration order
    pub fn language_codes(&self) -> Vec<String> {
        self.iter().map(|t| t.language_code.clone()).collect()
    }

    /// Find the best track for the given languages, in priority order.
    /// For each language a manually created track beats a generated one.
    pub fn find_transcript(&self, languages: &[String]) -> Result<&TranscriptTrack, YoutubeError> {
        languages
            .iter()
            .find_map(|code| {
                self.manually_created
                    .iter()
                    .chain(self.generated.iter())
                    .find(|t| &t.language_code == code)
            })
            .ok_or_else(|| YoutubeError::NoTranscriptFound {
                video_id: self.video_id.clone(),
                requested: languages.to_vec(),
                available: self.language_codes(),
            })
    }
}

impl<'a> IntoIterator for &'a TranscriptList {
    type Item = &'a TranscriptTrack;
    type IntoIter = std::iter::Chain<
        std::slice::Iter<'a, TranscriptTrack>,
        std::slice::Iter<'a, TranscriptTrack>,
    >;

    fn into_iter(self) -> Self::IntoIter {
        self.manually_created.iter().chain(self.generated.iter())
    }
}

/// Transcript retrieval capability
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TranscriptApi: Send + Sync {
    /// List every caption track available for a video
    async fn list(&self, video_id: &str) -> Result<TranscriptList, YoutubeError>;

    /// Download and parse one caption track
    async fn fetch_track(&self, track: &TranscriptTrack) -> Result<Vec<TranscriptEntry>, YoutubeError>;

    /// Fetch the first available transcript among `languages`
    async fn fetch(&self, video_id: &str, languages: &[String]) -> Result<FetchedTranscript, YoutubeError> {
        let list = self.list(video_id).await?;
        let track = list.find_transcript(languages)?;

        tracing::debug!(
            "Selected {} transcript ({}) for {}",
            track.language_code,
            if track.is_generated { "generated" } else { "manual" },
            video_id
        );

        let entries = self.fetch_track(track).await?;

        Ok(FetchedTranscript {
            video_id: video_id.to_string(),
            language: track.language.clone(),
            language_code: track.language_code.clone(),
            is_generated: track.is_generated,
            entries,
        })
    }
}

use crate::config::{Config, TranscriptConfig};
use crate::extractors::{TranscriptApi, YoutubeClient};
use crate::output::{Envelope, FOUND_LANGUAGE};
use crate::TranscriptorError;

/// Two-tier transcript retrieval: preferred languages first, then every listed track
pub struct TranscriptFetcher<A> {
    api: A,
    languages: Vec<String>,
    report_matched_language: bool,
}

impl<A: TranscriptApi> TranscriptFetcher<A> {
    pub fn new(api: A, config: &TranscriptConfig) -> Self {
        Self {
            api,
            languages: config.languages.clone(),
            report_matched_language: config.report_matched_language,
        }
    }

    /// Fetch a transcript, folding every failure into the envelope
    pub async fn fetch(&self, video_id: &str) -> Envelope {
        match self.try_fetch(video_id).await {
            Ok(envelope) => envelope,
            Err(err) => {
                tracing::warn!("{}", err);
                Envelope::from_error(&err)
            }
        }
    }

    pub async fn try_fetch(&self, video_id: &str) -> Result<Envelope, TranscriptorError> {
        match self.api.fetch(video_id, &self.languages).await {
            Ok(transcript) => {
                tracing::info!(
                    "Fetched {} transcript for {} ({} entries)",
                    transcript.language_code,
                    video_id,
                    transcript.entries.len()
                );
                let language = if self.report_matched_language {
                    transcript.language_code
                } else {
                    FOUND_LANGUAGE.to_string()
                };
                return Ok(Envelope::success(transcript.entries, language));
            }
            Err(err) => {
                tracing::debug!("Preferred-language fetch failed for {}: {}", video_id, err);
            }
        }

        self.probe_listed(video_id).await
    }

    /// Try each listed track in order until one downloads
    async fn probe_listed(&self, video_id: &str) -> Result<Envelope, TranscriptorError> {
        let list = self
            .api
            .list(video_id)
            .await
            .map_err(|source| TranscriptorError::ListingFailed {
                video_id: video_id.to_string(),
                source,
            })?;

        for track in &list {
            match self.api.fetch_track(track).await {
                Ok(entries) => {
                    tracing::info!(
                        "Fetched fallback {} transcript for {} ({} entries)",
                        track.language_code,
                        video_id,
                        entries.len()
                    );
                    return Ok(Envelope::success(entries, track.language_code.clone()));
                }
                Err(err) => {
                    tracing::debug!("Skipping {} transcript for {}: {}", track.language_code, video_id, err);
                }
            }
        }

        Err(TranscriptorError::NoAccessibleTranscript {
            video_id: video_id.to_string(),
        })
    }
}

/// Build the YouTube client from configuration and fetch the transcript.
/// Errors outside the two retrieval tiers are reported as unexpected.
pub async fn run(config: &Config, video_id: &str) -> Envelope {
    match YoutubeClient::new(&config.http, config.transcript.preserve_formatting) {
        Ok(client) => TranscriptFetcher::new(client, &config.transcript).fetch(video_id).await,
        Err(err) => unexpected(err),
    }
}

/// Envelope for an infrastructure failure
pub fn unexpected(err: anyhow::Error) -> Envelope {
    let err = TranscriptorError::Unexpected(err);
    tracing::error!("{}", err);
    Envelope::from_error(&err)
}

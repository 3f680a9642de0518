use thiserror::Error;

/// Failures of the YouTube transcript protocol
#[derive(Error, Debug)]
pub enum YoutubeError {
    #[error("Could not retrieve a transcript for the video {video_id}! The video is no longer available")]
    VideoUnavailable { video_id: String },

    #[error("Could not retrieve a transcript for the video {video_id}! You provided an invalid video id. Make sure you are using the video id and NOT the url!")]
    InvalidVideoId { video_id: String },

    #[error("Could not retrieve a transcript for the video {video_id}! Subtitles are disabled for this video")]
    TranscriptsDisabled { video_id: String },

    #[error(
        "Could not retrieve a transcript for the video {video_id}! No transcripts were found for any of the requested language codes: {requested:?}. Available languages: {available:?}"
    )]
    NoTranscriptFound {
        video_id: String,
        requested: Vec<String>,
        available: Vec<String>,
    },

    #[error("Could not retrieve a transcript for the video {video_id}! This video is age-restricted")]
    AgeRestricted { video_id: String },

    #[error("Could not retrieve a transcript for the video {video_id}! YouTube is blocking requests from your IP")]
    RequestBlocked { video_id: String },

    #[error("Could not retrieve a transcript for the video {video_id}! YouTube is rate limiting or blocking requests from your IP")]
    IpBlocked { video_id: String },

    #[error("Could not retrieve a transcript for the video {video_id}! The video is unplayable: {reason}{}", format_subreasons(.subreasons))]
    VideoUnplayable {
        video_id: String,
        reason: String,
        subreasons: Vec<String>,
    },

    #[error("Could not retrieve a transcript for the video {video_id}! The requested transcript requires a PO token")]
    PoTokenRequired { video_id: String },

    #[error("Could not retrieve a transcript for the video {video_id}! Failed to automatically give consent to saving cookies")]
    FailedToCreateConsentCookie { video_id: String },

    #[error("Could not retrieve a transcript for the video {video_id}! The data required to fetch the transcript is not parsable: {details}")]
    YouTubeDataUnparsable { video_id: String, details: String },

    #[error("Could not retrieve a transcript for the video {video_id}! Request to {url} failed with HTTP {status}")]
    RequestFailed {
        video_id: String,
        status: u16,
        url: String,
    },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
}

fn format_subreasons(subreasons: &[String]) -> String {
    if subreasons.is_empty() {
        String::new()
    } else {
        format!(" ({})", subreasons.join("; "))
    }
}

impl YoutubeError {
    pub fn unparsable(video_id: &str, details: impl Into<String>) -> Self {
        Self::YouTubeDataUnparsable {
            video_id: video_id.to_string(),
            details: details.into(),
        }
    }
}

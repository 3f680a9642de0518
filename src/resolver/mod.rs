//! Turns a command-line argument into a YouTube video ID.

use once_cell::sync::Lazy;
use regex::Regex;

/// Tried in order; the first capture of the first match wins.
static VIDEO_ID_PATTERNS: Lazy<[Regex; 2]> = Lazy::new(|| {
    [
        Regex::new(r"(?:youtube\.com/watch\?v=|youtu\.be/|youtube\.com/embed/)([^&\n?#]+)")
            .expect("valid video id pattern"),
        Regex::new(r"youtube\.com/watch\?.*v=([^&\n?#]+)").expect("valid video id pattern"),
    ]
});

/// Check whether the input should be treated as a YouTube URL
pub fn is_youtube_url(input: &str) -> bool {
    input.contains("youtube.com") || input.contains("youtu.be")
}

/// Extract the video ID from a YouTube URL
pub fn extract_video_id(url: &str) -> Option<String> {
    VIDEO_ID_PATTERNS
        .iter()
        .find_map(|pattern| pattern.captures(url))
        .and_then(|caps| caps.get(1))
        .map(|id| id.as_str().to_string())
}

/// Resolve a URL or bare video ID. Anything that is not a YouTube URL is passed through as-is.
pub fn resolve(input: &str) -> Option<String> {
    if is_youtube_url(input) {
        let id = extract_video_id(input);
        if id.is_none() {
            tracing::debug!("No video ID found in URL: {}", input);
        }
        id
    } else {
        Some(input.to_string())
    }
}

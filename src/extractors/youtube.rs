use anyhow::Context;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_LANGUAGE, COOKIE};
use reqwest::{Client, Proxy, Response, StatusCode};
use serde::Deserialize;
use serde_json::json;
use url::Url;

use super::timedtext::TimedTextParser;
use super::{TranscriptApi, TranscriptEntry, TranscriptList, TranscriptTrack, YoutubeError};
use crate::config::HttpConfig;

const CONSENT_FORM_ACTION: &str = "action=\"https://consent.youtube.com/s\"";
const RECAPTCHA_MARKER: &str = "class=\"g-recaptcha\"";

const INNERTUBE_CLIENT_NAME: &str = "ANDROID";
const INNERTUBE_CLIENT_VERSION: &str = "20.10.38";

static INNERTUBE_API_KEY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#""INNERTUBE_API_KEY":\s*"([a-zA-Z0-9_-]+)""#).expect("valid api key pattern")
});

static CONSENT_VALUE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"name="v" value="(.*?)""#).expect("valid consent pattern"));

/// Player response subset needed to locate caption tracks
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlayerResponse {
    #[serde(default)]
    playability_status: Option<PlayabilityStatus>,
    #[serde(default)]
    captions: Option<Captions>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlayabilityStatus {
    status: Option<String>,
    reason: Option<String>,
    #[serde(default)]
    error_screen: Option<ErrorScreen>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ErrorScreen {
    player_error_message_renderer: Option<PlayerErrorMessage>,
}

#[derive(Debug, Default, Deserialize)]
struct PlayerErrorMessage {
    subreason: Option<Runs>,
}

#[derive(Debug, Default, Deserialize)]
struct Runs {
    #[serde(default)]
    runs: Vec<Run>,
}

#[derive(Debug, Default, Deserialize)]
struct Run {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Captions {
    player_captions_tracklist_renderer: Option<TracklistRenderer>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TracklistRenderer {
    caption_tracks: Option<Vec<CaptionTrack>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CaptionTrack {
    base_url: String,
    #[serde(default)]
    name: TrackName,
    language_code: String,
    #[serde(default)]
    kind: Option<String>,
    #[serde(default)]
    is_translatable: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TrackName {
    simple_text: Option<String>,
    #[serde(default)]
    runs: Vec<Run>,
}

impl TrackName {
    fn display(&self) -> String {
        self.runs
            .first()
            .map(|run| run.text.clone())
            .or_else(|| self.simple_text.clone())
            .unwrap_or_default()
    }
}

/// YouTube transcript client speaking the watch page + InnerTube player protocol
pub struct YoutubeClient {
    client: Client,
    base_url: Url,
    parser: TimedTextParser,
}

impl YoutubeClient {
    pub fn new(config: &HttpConfig, preserve_formatting: bool) -> anyhow::Result<Self> {
        let mut base_url = Url::parse(&config.base_url)
            .with_context(|| format!("Invalid base URL: {}", config.base_url))?;
        // Relative joins must keep a mirror's path prefix
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_str(&config.accept_language)
                .context("Invalid Accept-Language header value")?,
        );

        let mut builder = Client::builder()
            .user_agent(config.user_agent.as_str())
            .default_headers(headers);

        if let Some(proxy_url) = &config.proxy {
            let proxy = Proxy::all(proxy_url)
                .with_context(|| format!("Invalid proxy URL: {}", proxy_url))?;
            builder = builder.proxy(proxy);
        }

        let client = builder.build().context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url,
            parser: TimedTextParser::new(preserve_formatting),
        })
    }

    fn endpoint(&self, video_id: &str, path: &str) -> Result<Url, YoutubeError> {
        self.base_url
            .join(path)
            .map_err(|e| YoutubeError::unparsable(video_id, format!("invalid endpoint {}: {}", path, e)))
    }

    /// Fetch the watch page, accepting the cookie consent form once if it is shown
    async fn watch_page_html(&self, video_id: &str) -> Result<String, YoutubeError> {
        let url = self.endpoint(video_id, &format!("watch?v={}", urlencoding::encode(video_id)))?;

        let html = self.get_text(video_id, url.clone(), None).await?;
        if !html.contains(CONSENT_FORM_ACTION) {
            return Ok(html);
        }

        tracing::debug!("Consent page shown for {}, retrying with consent cookie", video_id);
        let cookie = consent_cookie(&html).ok_or_else(|| YoutubeError::FailedToCreateConsentCookie {
            video_id: video_id.to_string(),
        })?;

        let html = self.get_text(video_id, url, Some(cookie)).await?;
        if html.contains(CONSENT_FORM_ACTION) {
            return Err(YoutubeError::FailedToCreateConsentCookie {
                video_id: video_id.to_string(),
            });
        }
        Ok(html)
    }

    async fn get_text(&self, video_id: &str, url: Url, cookie: Option<String>) -> Result<String, YoutubeError> {
        tracing::debug!("GET {}", url);
        let mut request = self.client.get(url);
        if let Some(cookie) = cookie {
            request = request.header(COOKIE, cookie);
        }
        let response = check_status(video_id, request.send().await?)?;
        Ok(response.text().await?)
    }

    async fn innertube_player(&self, video_id: &str, api_key: &str) -> Result<PlayerResponse, YoutubeError> {
        let mut url = self.endpoint(video_id, "youtubei/v1/player")?;
        url.query_pairs_mut().append_pair("key", api_key);

        let body = json!({
            "context": {
                "client": {
                    "clientName": INNERTUBE_CLIENT_NAME,
                    "clientVersion": INNERTUBE_CLIENT_VERSION,
                }
            },
            "videoId": video_id,
        });

        tracing::debug!("POST {}", url);
        let response = check_status(video_id, self.client.post(url).json(&body).send().await?)?;
        let text = response.text().await?;

        serde_json::from_str(&text)
            .map_err(|e| YoutubeError::unparsable(video_id, format!("player response: {}", e)))
    }

    /// Resolve a caption base URL against the site root, dropping the srv3 format override
    fn track_url(&self, base_url: &str) -> String {
        let cleaned = base_url.replace("&fmt=srv3", "");
        match Url::parse(&cleaned) {
            Ok(url) => url.to_string(),
            Err(_) => self
                .base_url
                .join(&cleaned)
                .map(|url| url.to_string())
                .unwrap_or(cleaned),
        }
    }

    fn build_list(&self, video_id: &str, player: PlayerResponse) -> Result<TranscriptList, YoutubeError> {
        if let Some(status) = &player.playability_status {
            assert_playable(video_id, status)?;
        }

        let tracks = player
            .captions
            .and_then(|c| c.player_captions_tracklist_renderer)
            .and_then(|r| r.caption_tracks)
            .ok_or_else(|| YoutubeError::TranscriptsDisabled {
                video_id: video_id.to_string(),
            })?;

        let tracks = tracks.into_iter().map(|track| TranscriptTrack {
            video_id: video_id.to_string(),
            language: track.name.display(),
            is_generated: track.kind.as_deref() == Some("asr"),
            is_translatable: track.is_translatable,
            base_url: self.track_url(&track.base_url),
            language_code: track.language_code,
        });

        Ok(TranscriptList::new(video_id, tracks))
    }
}

#[async_trait]
impl TranscriptApi for YoutubeClient {
    async fn list(&self, video_id: &str) -> Result<TranscriptList, YoutubeError> {
        let html = self.watch_page_html(video_id).await?;
        let api_key = extract_innertube_api_key(video_id, &html)?;
        let player = self.innertube_player(video_id, &api_key).await?;
        let list = self.build_list(video_id, player)?;

        tracing::debug!("Found {} caption tracks for {}: {:?}", list.len(), video_id, list.language_codes());
        Ok(list)
    }

    async fn fetch_track(&self, track: &TranscriptTrack) -> Result<Vec<TranscriptEntry>, YoutubeError> {
        if track.base_url.contains("&exp=xpe") {
            return Err(YoutubeError::PoTokenRequired {
                video_id: track.video_id.clone(),
            });
        }

        let url = Url::parse(&track.base_url)
            .map_err(|e| YoutubeError::unparsable(&track.video_id, format!("caption url: {}", e)))?;
        let xml = self.get_text(&track.video_id, url, None).await?;

        self.parser.parse(&track.video_id, &xml)
    }
}

fn check_status(video_id: &str, response: Response) -> Result<Response, YoutubeError> {
    let status = response.status();
    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(YoutubeError::IpBlocked {
            video_id: video_id.to_string(),
        });
    }
    if !status.is_success() {
        return Err(YoutubeError::RequestFailed {
            video_id: video_id.to_string(),
            status: status.as_u16(),
            url: response.url().to_string(),
        });
    }
    Ok(response)
}

fn consent_cookie(html: &str) -> Option<String> {
    CONSENT_VALUE
        .captures(html)
        .map(|caps| format!("CONSENT=YES+{}", &caps[1]))
}

fn extract_innertube_api_key(video_id: &str, html: &str) -> Result<String, YoutubeError> {
    if let Some(caps) = INNERTUBE_API_KEY.captures(html) {
        return Ok(caps[1].to_string());
    }
    if html.contains(RECAPTCHA_MARKER) {
        return Err(YoutubeError::IpBlocked {
            video_id: video_id.to_string(),
        });
    }
    Err(YoutubeError::unparsable(video_id, "INNERTUBE_API_KEY not found in watch page"))
}

fn assert_playable(video_id: &str, status: &PlayabilityStatus) -> Result<(), YoutubeError> {
    let code = match status.status.as_deref() {
        None | Some("OK") => return Ok(()),
        Some(code) => code,
    };
    let reason = status.reason.as_deref().unwrap_or_default();
    let video_id = video_id.to_string();

    match (code, reason) {
        ("LOGIN_REQUIRED", "Sign in to confirm you’re not a bot") => Err(YoutubeError::RequestBlocked { video_id }),
        ("LOGIN_REQUIRED", "This video may be inappropriate for some users.") => {
            Err(YoutubeError::AgeRestricted { video_id })
        }
        ("ERROR", "This video is unavailable") => {
            if video_id.starts_with("http://") || video_id.starts_with("https://") {
                Err(YoutubeError::InvalidVideoId { video_id })
            } else {
                Err(YoutubeError::VideoUnavailable { video_id })
            }
        }
        _ => {
            let subreasons = status
                .error_screen
                .as_ref()
                .and_then(|s| s.player_error_message_renderer.as_ref())
                .and_then(|r| r.subreason.as_ref())
                .map(|s| s.runs.iter().map(|run| run.text.clone()).collect::<Vec<_>>())
                .unwrap_or_default();
            Err(YoutubeError::VideoUnplayable {
                video_id,
                reason: reason.to_string(),
                subreasons,
            })
        }
    }
}

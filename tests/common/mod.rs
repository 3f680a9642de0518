//! Fixtures shared by the integration tests

#![allow(dead_code)]

use mockito::{Matcher, Mock, Server, ServerGuard};
use serde_json::json;

pub const VIDEO_ID: &str = "vid123";
pub const API_KEY: &str = "TESTKEY";

pub fn watch_page() -> String {
    format!(
        r#"<html><script>ytcfg.set({{"INNERTUBE_API_KEY": "{}", "INNERTUBE_CLIENT_VERSION": "2.0"}});</script></html>"#,
        API_KEY
    )
}

/// Player response listing the given (language code, generated) tracks
pub fn player_response(base: &str, tracks: &[(&str, bool)]) -> String {
    let caption_tracks: Vec<_> = tracks
        .iter()
        .map(|(code, generated)| {
            let mut track = json!({
                "baseUrl": format!("{}/api/timedtext?v={}&lang={}&fmt=srv3", base, VIDEO_ID, code),
                "name": {"runs": [{"text": code.to_uppercase()}]},
                "languageCode": code,
                "isTranslatable": true,
            });
            if *generated {
                track["kind"] = json!("asr");
            }
            track
        })
        .collect();

    json!({
        "playabilityStatus": {"status": "OK"},
        "captions": {"playerCaptionsTracklistRenderer": {"captionTracks": caption_tracks}},
    })
    .to_string()
}

pub fn timedtext(lines: &[&str]) -> String {
    let body: String = lines
        .iter()
        .enumerate()
        .map(|(i, line)| format!(r#"<text start="{}.0" dur="1.5">{}</text>"#, i * 2, line))
        .collect();
    format!(r#"<?xml version="1.0" encoding="utf-8" ?><transcript>{}</transcript>"#, body)
}

pub fn mock_watch_page(server: &mut ServerGuard, hits: usize) -> Mock {
    server
        .mock("GET", "/watch")
        .match_query(Matcher::UrlEncoded("v".into(), VIDEO_ID.into()))
        .with_status(200)
        .with_header("content-type", "text/html")
        .with_body(watch_page())
        .expect(hits)
        .create()
}

pub fn mock_player(server: &mut ServerGuard, body: &str, hits: usize) -> Mock {
    server
        .mock("POST", "/youtubei/v1/player")
        .match_query(Matcher::UrlEncoded("key".into(), API_KEY.into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(body)
        .expect(hits)
        .create()
}

pub fn mock_timedtext(server: &mut ServerGuard, lang: &str, status: usize, body: &str) -> Mock {
    server
        .mock("GET", "/api/timedtext")
        .match_query(Matcher::UrlEncoded("lang".into(), lang.into()))
        .with_status(status)
        .with_header("content-type", "text/xml")
        .with_body(body)
        .create()
}

pub fn new_server() -> ServerGuard {
    Server::new()
}

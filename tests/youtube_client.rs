mod common;

use mockito::Matcher;
use yt_transcript::config::HttpConfig;
use yt_transcript::extractors::{TranscriptApi, YoutubeClient, YoutubeError};

use common::*;

fn client_for(base_url: &str) -> YoutubeClient {
    let config = HttpConfig {
        base_url: base_url.to_string(),
        ..HttpConfig::default()
    };
    YoutubeClient::new(&config, false).unwrap()
}

fn block_on<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
        .block_on(future)
}

fn languages(codes: &[&str]) -> Vec<String> {
    codes.iter().map(|c| c.to_string()).collect()
}

#[test]
fn test_list_orders_manual_before_generated() {
    let mut server = new_server();
    let base = server.url();
    let _watch = mock_watch_page(&mut server, 1);
    let _player = mock_player(&mut server, &player_response(&base, &[("en", true), ("de", false)]), 1);

    let list = block_on(client_for(&base).list(VIDEO_ID)).unwrap();
    assert_eq!(list.language_codes(), vec!["de", "en"]);
    assert!(list.iter().all(|t| !t.base_url.contains("fmt=srv3")));
}

#[test]
fn test_fetch_picks_preferred_language() {
    let mut server = new_server();
    let base = server.url();
    let _watch = mock_watch_page(&mut server, 1);
    let _player = mock_player(&mut server, &player_response(&base, &[("de", false), ("en-US", true)]), 1);
    let en = mock_timedtext(&mut server, "en-US", 200, &timedtext(&["first", "second"]));

    let client = client_for(&base);
    let fetched = block_on(client.fetch(VIDEO_ID, &languages(&["en", "en-US"]))).unwrap();

    assert_eq!(fetched.language_code, "en-US");
    assert!(fetched.is_generated);
    assert_eq!(fetched.entries.len(), 2);
    assert_eq!(fetched.entries[1].text, "second");
    en.assert();
}

#[test]
fn test_fetch_without_requested_language() {
    let mut server = new_server();
    let base = server.url();
    let _watch = mock_watch_page(&mut server, 1);
    let _player = mock_player(&mut server, &player_response(&base, &[("ja", false)]), 1);

    let err = block_on(client_for(&base).fetch(VIDEO_ID, &languages(&["en"]))).unwrap_err();
    match err {
        YoutubeError::NoTranscriptFound { available, .. } => assert_eq!(available, vec!["ja"]),
        other => panic!("expected NoTranscriptFound, got {:?}", other),
    }
}

#[test]
fn test_consent_page_is_accepted_once() {
    let mut server = new_server();
    let base = server.url();
    let consent = server
        .mock("GET", "/watch")
        .match_query(Matcher::Any)
        .match_header("cookie", Matcher::Missing)
        .with_status(200)
        .with_body(r#"<form action="https://consent.youtube.com/s"><input type="hidden" name="v" value="cb.123"></form>"#)
        .create();
    let accepted = server
        .mock("GET", "/watch")
        .match_query(Matcher::Any)
        .match_header("cookie", "CONSENT=YES+cb.123")
        .with_status(200)
        .with_body(watch_page())
        .create();
    let _player = mock_player(&mut server, &player_response(&base, &[("en", false)]), 1);

    let list = block_on(client_for(&base).list(VIDEO_ID)).unwrap();
    assert_eq!(list.len(), 1);
    consent.assert();
    accepted.assert();
}

#[test]
fn test_rate_limited_watch_page_is_ip_block() {
    let mut server = new_server();
    let base = server.url();
    let _watch = server
        .mock("GET", "/watch")
        .match_query(Matcher::Any)
        .with_status(429)
        .create();

    let err = block_on(client_for(&base).list(VIDEO_ID)).unwrap_err();
    assert!(matches!(err, YoutubeError::IpBlocked { .. }));
}

#[test]
fn test_unavailable_video() {
    let mut server = new_server();
    let base = server.url();
    let _watch = mock_watch_page(&mut server, 1);
    let _player = mock_player(
        &mut server,
        r#"{"playabilityStatus":{"status":"ERROR","reason":"This video is unavailable"}}"#,
        1,
    );

    let err = block_on(client_for(&base).list(VIDEO_ID)).unwrap_err();
    assert!(matches!(err, YoutubeError::VideoUnavailable { .. }));
}

#[test]
fn test_failed_track_download() {
    let mut server = new_server();
    let base = server.url();
    let _watch = mock_watch_page(&mut server, 1);
    let _player = mock_player(&mut server, &player_response(&base, &[("en", false)]), 1);
    let _text = mock_timedtext(&mut server, "en", 404, "");

    let client = client_for(&base);
    let err = block_on(async {
        let list = client.list(VIDEO_ID).await?;
        let track = list.iter().next().cloned().expect("one track");
        client.fetch_track(&track).await
    })
    .unwrap_err();

    assert!(matches!(err, YoutubeError::RequestFailed { status: 404, .. }));
}

use bytes::Bytes;
use futures::{stream, StreamExt};
use linkchat_api::parse_event_frames;
use linkchat_types::{ProjectEvent, ProjectStatus};

fn byte_stream(
    chunks: Vec<&'static str>,
) -> impl futures::Stream<Item = anyhow::Result<Bytes>> + Send + 'static {
    stream::iter(chunks.into_iter().map(|c| Ok(Bytes::from_static(c.as_bytes()))))
}

async fn collect(chunks: Vec<&'static str>) -> Vec<ProjectEvent> {
    parse_event_frames(byte_stream(chunks))
        .map(|item| item.expect("stream item"))
        .collect()
        .await
}

#[tokio::test]
async fn dispatches_named_event_kinds() {
    let events = collect(vec![
        "event: status\ndata: {\"status\":\"scraping\",\"message\":\"Fetching page\"}\n\n",
        "event: progress\ndata: {\"message\":\"downloaded 3 files\"}\n\n",
        "event: complete\ndata: {\"chunksProcessed\":42}\n\n",
    ])
    .await;

    assert_eq!(events.len(), 3);
    match &events[0] {
        ProjectEvent::Status { status, message } => {
            assert_eq!(*status, ProjectStatus::Scraping);
            assert_eq!(message, "Fetching page");
        }
        _ => panic!("Expected Status"),
    }
    assert!(matches!(&events[1], ProjectEvent::Progress { .. }));
    match &events[2] {
        ProjectEvent::Complete { chunks_processed } => assert_eq!(*chunks_processed, 42),
        _ => panic!("Expected Complete"),
    }
}

#[tokio::test]
async fn frames_split_across_transport_chunks() {
    let events = collect(vec![
        "event: sta",
        "tus\ndata: {\"status\":\"embed",
        "ding\",\"message\":\"\"}\n",
        "\n",
    ])
    .await;

    assert_eq!(events.len(), 1);
    match &events[0] {
        ProjectEvent::Status { status, .. } => assert_eq!(*status, ProjectStatus::Embedding),
        _ => panic!("Expected Status"),
    }
}

#[tokio::test]
async fn terminal_event_ends_the_stream() {
    // Anything the server emits after a terminal frame is never delivered.
    let events = collect(vec![
        "event: complete\ndata: {\"chunksProcessed\":7}\n\n",
        "event: status\ndata: {\"status\":\"pending\",\"message\":\"\"}\n\n",
    ])
    .await;

    assert_eq!(events.len(), 1);
    assert!(events[0].is_terminal());
}

#[tokio::test]
async fn error_frame_without_payload_becomes_connection_error() {
    let events = collect(vec!["event: error\n\n"]).await;

    assert_eq!(events.len(), 1);
    match &events[0] {
        ProjectEvent::Error { error } => assert_eq!(error, "Connection error"),
        _ => panic!("Expected Error"),
    }
}

#[tokio::test]
async fn error_frame_with_payload_keeps_server_detail() {
    let events = collect(vec!["event: error\ndata: {\"error\":\"scrape blocked\"}\n\n"]).await;

    match &events[0] {
        ProjectEvent::Error { error } => assert_eq!(error, "scrape blocked"),
        _ => panic!("Expected Error"),
    }
}

#[tokio::test]
async fn malformed_payload_is_skipped_for_non_error_kinds() {
    let events = collect(vec![
        "event: status\ndata: {broken\n\n",
        "event: status\ndata: {\"status\":\"parsing\",\"message\":\"\"}\n\n",
    ])
    .await;

    assert_eq!(events.len(), 1);
    match &events[0] {
        ProjectEvent::Status { status, .. } => assert_eq!(*status, ProjectStatus::Parsing),
        _ => panic!("Expected Status"),
    }
}

#[tokio::test]
async fn unknown_event_kinds_are_ignored() {
    let events = collect(vec![
        "event: heartbeat\ndata: {}\n\n",
        "event: complete\ndata: {\"chunksProcessed\":1}\n\n",
    ])
    .await;

    assert_eq!(events.len(), 1);
    assert!(matches!(&events[0], ProjectEvent::Complete { .. }));
}

#[tokio::test]
async fn transport_error_surfaces_as_stream_error() {
    let source = stream::iter(vec![
        Ok(Bytes::from_static(b"event: status\n")),
        Err(anyhow::anyhow!("connection reset")),
    ]);

    let items: Vec<_> = parse_event_frames(source).collect().await;
    assert_eq!(items.len(), 1);
    assert!(items[0].is_err());
}

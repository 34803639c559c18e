use anyhow::Result;
use bytes::Bytes;
use futures::{Stream, StreamExt};
use reqwest::Response;
use serde::Deserialize;
use std::collections::VecDeque;

use linkchat_types::{ProjectEvent, ProjectStatus};

use crate::traits::ProjectEventStream;

#[derive(Debug, Deserialize)]
struct StatusPayload {
    status: ProjectStatus,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct ProgressPayload {
    message: String,
}

#[derive(Debug, Deserialize)]
struct CompletePayload {
    #[serde(rename = "chunksProcessed", default)]
    chunks_processed: u64,
}

#[derive(Debug, Deserialize)]
struct ErrorPayload {
    error: String,
}

/// Turn a push-stream response into typed [`ProjectEvent`]s.
///
/// Frames follow the SSE layout: an `event: <kind>` line, one or more
/// `data: <json>` lines, then a blank line. The stream ends itself after a
/// terminal event; dropping it closes the connection.
pub fn parse_event_stream(response: Response) -> ProjectEventStream {
    let stream = response
        .bytes_stream()
        .map(|result| result.map_err(anyhow::Error::from));
    parse_event_frames(stream)
}

/// Generic over the byte source so tests can drive it without a server.
pub fn parse_event_frames<S>(stream: S) -> ProjectEventStream
where
    S: Stream<Item = Result<Bytes>> + Send + 'static,
{
    Box::pin(async_stream::stream! {
        let mut byte_chunks = Box::pin(stream);
        let mut buffer: VecDeque<u8> = VecDeque::with_capacity(8192);
        let mut event_name: Option<String> = None;
        let mut data: Option<String> = None;

        while let Some(chunk_result) = byte_chunks.next().await {
            match chunk_result {
                Ok(bytes) => {
                    buffer.extend(bytes);

                    while let Some(newline_pos) = buffer.iter().position(|&b| b == b'\n') {
                        let line_bytes: Vec<u8> = buffer.drain(..=newline_pos).collect();

                        let Ok(line_str) = std::str::from_utf8(&line_bytes) else {
                            continue;
                        };
                        let line = line_str.trim_end_matches(['\r', '\n']);

                        if line.is_empty() {
                            // Blank line terminates the frame.
                            if let Some(event) = dispatch_frame(event_name.take(), data.take()) {
                                let terminal = event.is_terminal();
                                yield Ok(event);
                                if terminal {
                                    return;
                                }
                            }
                            continue;
                        }

                        if let Some(name) = line.strip_prefix("event: ") {
                            event_name = Some(name.to_string());
                        } else if let Some(payload) = line.strip_prefix("data: ") {
                            match data.as_mut() {
                                Some(existing) => {
                                    existing.push('\n');
                                    existing.push_str(payload);
                                }
                                None => data = Some(payload.to_string()),
                            }
                        }
                        // Comment lines and other SSE fields are ignored.
                    }
                }
                Err(e) => {
                    yield Err(anyhow::anyhow!("Push stream error: {}", e));
                    return;
                }
            }
        }

        // Connection ended without a blank line after the last frame.
        if let Some(event) = dispatch_frame(event_name.take(), data.take()) {
            yield Ok(event);
        }
    })
}

fn dispatch_frame(event_name: Option<String>, data: Option<String>) -> Option<ProjectEvent> {
    let name = event_name?;
    let data = data.unwrap_or_default();

    match name.as_str() {
        "status" => match serde_json::from_str::<StatusPayload>(&data) {
            Ok(payload) => Some(ProjectEvent::Status {
                status: payload.status,
                message: payload.message,
            }),
            Err(e) => {
                tracing::warn!("Failed to parse status event: {}", e);
                None
            }
        },
        "progress" => match serde_json::from_str::<ProgressPayload>(&data) {
            Ok(payload) => Some(ProjectEvent::Progress {
                message: payload.message,
            }),
            Err(e) => {
                tracing::warn!("Failed to parse progress event: {}", e);
                None
            }
        },
        "complete" => match serde_json::from_str::<CompletePayload>(&data) {
            Ok(payload) => Some(ProjectEvent::Complete {
                chunks_processed: payload.chunks_processed,
            }),
            Err(e) => {
                tracing::warn!("Failed to parse complete event: {}", e);
                None
            }
        },
        // An error frame always closes the connection, even when its payload
        // is missing or unparseable.
        "error" => match serde_json::from_str::<ErrorPayload>(&data) {
            Ok(payload) => Some(ProjectEvent::Error { error: payload.error }),
            Err(_) => Some(ProjectEvent::Error {
                error: "Connection error".to_string(),
            }),
        },
        other => {
            tracing::warn!("Ignoring unknown push event kind: {}", other);
            None
        }
    }
}

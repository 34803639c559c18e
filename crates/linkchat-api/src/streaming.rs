use anyhow::Result;
use bytes::Bytes;
use futures::{Stream, StreamExt};
use reqwest::Response;
use serde::Deserialize;
use std::collections::VecDeque;

use linkchat_types::MessageStreamEvent;

use crate::traits::MessageEventStream;

/// One `data: ` line of a chat reply body: either an incremental token or
/// the final canonical payload.
#[derive(Debug, Clone, Deserialize)]
struct MessageStreamLine {
    chunk: Option<String>,
    response: Option<String>,
    sources: Option<serde_json::Value>,
}

/// Turn a chunked chat-reply body into a sequence of typed events.
pub fn parse_message_stream(response: Response) -> MessageEventStream {
    let stream = response
        .bytes_stream()
        .map(|result| result.map_err(anyhow::Error::from));
    parse_message_lines(stream)
}

/// Generic over the byte source so tests can drive it without a server.
pub fn parse_message_lines<S>(stream: S) -> MessageEventStream
where
    S: Stream<Item = Result<Bytes>> + Send + 'static,
{
    Box::pin(async_stream::stream! {
        let mut byte_chunks = Box::pin(stream);
        let mut buffer: VecDeque<u8> = VecDeque::with_capacity(8192);

        while let Some(chunk_result) = byte_chunks.next().await {
            match chunk_result {
                Ok(bytes) => {
                    buffer.extend(bytes);

                    while let Some(newline_pos) = buffer.iter().position(|&b| b == b'\n') {
                        let line_bytes: Vec<u8> = buffer.drain(..=newline_pos).collect();

                        if let Ok(line_str) = std::str::from_utf8(&line_bytes) {
                            let line = line_str.trim();

                            if line.is_empty() {
                                continue;
                            }

                            if let Some(data) = line.strip_prefix("data: ") {
                                match serde_json::from_str::<MessageStreamLine>(data) {
                                    Ok(parsed) => {
                                        if let Some(text) = parsed.chunk {
                                            yield Ok(MessageStreamEvent::Chunk { text });
                                        }
                                        if parsed.response.is_some() {
                                            yield Ok(MessageStreamEvent::Done {
                                                response: parsed.response,
                                                sources: parsed.sources,
                                            });
                                        }
                                    }
                                    Err(e) => {
                                        // A single corrupt line must not abort
                                        // an otherwise healthy stream.
                                        tracing::warn!("Skipping malformed stream line: {}", e);
                                    }
                                }
                            }
                        }
                    }
                }
                Err(e) => yield Err(anyhow::anyhow!("Stream error: {}", e)),
            }
        }
    })
}

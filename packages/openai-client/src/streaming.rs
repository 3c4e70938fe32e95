//! SSE streaming parser for OpenAI chat completions.
//!
//! Converts a raw `reqwest` byte stream into [`StreamChunk`] values.
//! Handles `data: [DONE]`, partial lines, buffering, and tool-call deltas.

use bytes::Bytes;
use futures::stream::Stream;
use std::pin::Pin;
use std::task::{Context, Poll};

use crate::error::OpenAIError;

/// A single chunk from a streaming chat completion.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamChunk {
    /// A text delta.
    Delta(String),
    /// The model emitted a tool-call delta (no text content).
    ToolCall,
    /// The stream is done (`data: [DONE]`).
    Done,
}

/// Raw streaming chunk from the OpenAI API.
#[derive(Debug, serde::Deserialize)]
struct StreamChunkRaw {
    choices: Vec<StreamChoiceRaw>,
}

#[derive(Debug, serde::Deserialize)]
struct StreamChoiceRaw {
    delta: DeltaRaw,
}

#[derive(Debug, serde::Deserialize)]
struct DeltaRaw {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<serde_json::Value>,
}

/// Stream adapter that converts raw SSE bytes into [`StreamChunk`] values.
pub struct ChatCompletionStream {
    inner: Pin<Box<dyn Stream<Item = Result<Bytes, reqwest::Error>> + Send>>,
    buffer: String,
}

impl ChatCompletionStream {
    pub(crate) fn new(
        byte_stream: impl Stream<Item = Result<Bytes, reqwest::Error>> + Send + 'static,
    ) -> Self {
        Self {
            inner: Box::pin(byte_stream),
            buffer: String::new(),
        }
    }
}

impl Stream for ChatCompletionStream {
    type Item = Result<StreamChunk, OpenAIError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();

        loop {
            if let Some(chunk) = try_parse_line(&mut this.buffer) {
                return Poll::Ready(Some(chunk));
            }

            match Pin::new(&mut this.inner).poll_next(cx) {
                Poll::Ready(Some(Ok(bytes))) => match std::str::from_utf8(&bytes) {
                    Ok(text) => this.buffer.push_str(text),
                    Err(e) => {
                        return Poll::Ready(Some(Err(OpenAIError::StreamParse(format!(
                            "Invalid UTF-8 in stream: {}",
                            e
                        )))));
                    }
                },
                Poll::Ready(Some(Err(e))) => {
                    return Poll::Ready(Some(Err(OpenAIError::Network(e.to_string()))));
                }
                Poll::Ready(None) => {
                    if this.buffer.trim().is_empty() {
                        return Poll::Ready(None);
                    }
                    // Flush a final line that arrived without its
                    // terminating newline.
                    if !this.buffer.ends_with('\n') {
                        this.buffer.push('\n');
                    }
                    if let Some(chunk) = try_parse_line(&mut this.buffer) {
                        return Poll::Ready(Some(chunk));
                    }
                    return Poll::Ready(None);
                }
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}

/// Try to extract and parse a complete SSE line from the buffer.
/// Returns `None` if no complete line is available yet.
fn try_parse_line(buffer: &mut String) -> Option<Result<StreamChunk, OpenAIError>> {
    loop {
        let newline_pos = buffer.find('\n')?;
        let line = buffer[..newline_pos].trim().to_string();
        buffer.drain(..=newline_pos);

        // SSE uses blank lines as event separators
        if line.is_empty() {
            continue;
        }

        if let Some(data) = line.strip_prefix("data: ") {
            let data = data.trim();

            if data == "[DONE]" {
                return Some(Ok(StreamChunk::Done));
            }

            match serde_json::from_str::<StreamChunkRaw>(data) {
                Ok(raw) => {
                    let delta = raw.choices.into_iter().next().map(|c| c.delta);
                    return match delta {
                        Some(DeltaRaw {
                            content: Some(text),
                            ..
                        }) => Some(Ok(StreamChunk::Delta(text))),
                        Some(DeltaRaw {
                            tool_calls: Some(_),
                            ..
                        }) => Some(Ok(StreamChunk::ToolCall)),
                        _ => Some(Ok(StreamChunk::Delta(String::new()))),
                    };
                }
                Err(e) => {
                    return Some(Err(OpenAIError::StreamParse(format!(
                        "Failed to parse stream chunk: {} (data: {})",
                        e,
                        &data[..data.len().min(200)]
                    ))));
                }
            }
        }

        // Skip non-data lines (e.g., "event:", "id:", "retry:")
    }
}

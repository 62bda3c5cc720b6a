//! Streaming response handling
//!
//! Completion providers answer with server-sent events: `data: {json}` lines,
//! closed by `data: [DONE]`. [`SseDecoder`] splits raw body bytes into events,
//! [`StreamingResponse`] turns them into a stream of text deltas, and
//! [`StreamingResponse::relay`] hands those deltas to a consumer through a
//! bounded channel.

use std::collections::VecDeque;
use std::fmt::Display;
use std::pin::Pin;

use futures::channel::mpsc;
use futures::SinkExt;
use futures::Stream;
use futures::StreamExt;
use serde::Deserialize;
use tracing::debug;
use tracing::warn;

use crate::errors::ProfRagError;
use crate::errors::Result;

/// Boxed stream of text deltas
pub type DeltaStream = Pin<Box<dyn Stream<Item = Result<String>> + Send>>;

/// Streaming response from LLM
pub struct StreamingResponse {
    stream: DeltaStream,
}

impl StreamingResponse {
    pub fn new(stream: DeltaStream) -> Self {
        Self { stream }
    }

    /// Decode an SSE byte stream into non-empty text deltas
    pub fn from_sse<S, B, E>(body: S) -> Self
    where
        S: Stream<Item = std::result::Result<B, E>> + Send + 'static,
        B: AsRef<[u8]> + Send + 'static,
        E: Display + Send + 'static,
    {
        let state = SseState {
            body: Box::pin(body),
            decoder: SseDecoder::default(),
            pending: VecDeque::new(),
            body_done: false,
            finished: false,
        };
        Self::new(Box::pin(futures::stream::unfold(state, next_delta::<S, B, E>)))
    }

    /// Collect all chunks into a single string
    pub async fn collect_all(mut self) -> Result<String> {
        let mut result = String::new();
        while let Some(chunk) = self.stream.next().await {
            result.push_str(&chunk?);
        }
        Ok(result)
    }

    /// Get the underlying stream
    pub fn into_stream(self) -> DeltaStream {
        self.stream
    }

    /// Forward deltas through a bounded channel from a background task.
    ///
    /// At most one delta waits in the channel. The first error is forwarded and
    /// ends the relay; dropping the receiver stops reading from the provider.
    pub fn relay(self) -> mpsc::Receiver<Result<String>> {
        let (tx, rx) = mpsc::channel(0);
        tokio::spawn(async move {
            let state = pump(self.stream, tx).await;
            debug!("Completion relay finished: {:?}", state);
        });
        rx
    }
}

/// Terminal condition of a relayed stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayState {
    Open,
    Closed,
    Errored,
}

async fn pump(mut stream: DeltaStream, mut tx: mpsc::Sender<Result<String>>) -> RelayState {
    let mut state = RelayState::Open;
    while let Some(item) = stream.next().await {
        let failed = item.is_err();
        if let Err(e) = &item {
            warn!("Completion stream failed: {}", e);
        }

        if tx.send(item).await.is_err() {
            debug!("Response consumer went away, abandoning completion stream");
            return RelayState::Closed;
        }

        if failed {
            state = RelayState::Errored;
            break;
        }
    }

    if state == RelayState::Open {
        state = RelayState::Closed;
    }
    state
}

/// One decoded server-sent event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SseEvent {
    Data(String),
    Done,
}

/// Longest SSE line accepted before the stream is treated as broken
pub const MAX_LINE_BYTES: usize = 1 << 20;

/// Incremental line splitter for `text/event-stream` bodies
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
    // Bytes of `buffer` already known to hold no newline
    scanned: usize,
}

impl SseDecoder {
    /// Feed raw bytes and return the events completed by them
    ///
    /// # Errors
    /// - `CompletionProviderError` when a line grows past [`MAX_LINE_BYTES`]
    pub fn push(&mut self, bytes: &[u8]) -> Result<Vec<SseEvent>> {
        self.buffer.extend_from_slice(bytes);

        let mut events = Vec::new();
        let mut start = 0;
        while let Some(offset) = self.buffer[self.scanned..].iter().position(|&b| b == b'\n') {
            let end = self.scanned + offset;
            if let Some(event) = parse_line(&self.buffer[start..end]) {
                events.push(event);
            }
            start = end + 1;
            self.scanned = start;
        }
        self.buffer.drain(..start);
        self.scanned = self.buffer.len();

        if self.buffer.len() > MAX_LINE_BYTES {
            return Err(ProfRagError::CompletionProviderError(format!(
                "Stream line exceeds {MAX_LINE_BYTES} bytes"
            )));
        }
        Ok(events)
    }

    /// Flush a trailing line that was not newline-terminated
    pub fn finish(&mut self) -> Vec<SseEvent> {
        let line = std::mem::take(&mut self.buffer);
        self.scanned = 0;
        parse_line(&line).into_iter().collect()
    }
}

fn parse_line(line: &[u8]) -> Option<SseEvent> {
    let line = String::from_utf8_lossy(line);
    let line = line.trim_end_matches('\r');
    let data = line.strip_prefix("data:")?;
    let data = data.strip_prefix(' ').unwrap_or(data);

    if data.trim() == "[DONE]" {
        Some(SseEvent::Done)
    } else if data.trim().is_empty() {
        None
    } else {
        Some(SseEvent::Data(data.to_string()))
    }
}

#[derive(Deserialize)]
struct CompletionChunk {
    #[serde(default)]
    choices: Vec<ChunkChoice>,
    #[serde(default)]
    error: Option<serde_json::Value>,
}

#[derive(Deserialize)]
struct ChunkChoice {
    #[serde(default)]
    delta: Option<ChunkDelta>,
}

#[derive(Deserialize)]
struct ChunkDelta {
    #[serde(default)]
    content: Option<String>,
}

/// Extract the text delta of one completion chunk; `None` when it carries no text
pub fn parse_chunk(data: &str) -> Result<Option<String>> {
    let chunk: CompletionChunk = serde_json::from_str(data).map_err(|e| {
        ProfRagError::CompletionProviderError(format!("Malformed stream chunk: {e}"))
    })?;

    if let Some(error) = chunk.error {
        let message = error
            .get("message")
            .and_then(|m| m.as_str())
            .map_or_else(|| error.to_string(), str::to_string);
        return Err(ProfRagError::CompletionProviderError(message));
    }

    Ok(chunk
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.delta)
        .and_then(|delta| delta.content)
        .filter(|content| !content.is_empty()))
}

struct SseState<S> {
    body: Pin<Box<S>>,
    decoder: SseDecoder,
    pending: VecDeque<SseEvent>,
    body_done: bool,
    finished: bool,
}

async fn next_delta<S, B, E>(mut st: SseState<S>) -> Option<(Result<String>, SseState<S>)>
where
    S: Stream<Item = std::result::Result<B, E>> + Send,
    B: AsRef<[u8]>,
    E: Display,
{
    loop {
        if st.finished {
            return None;
        }

        if let Some(event) = st.pending.pop_front() {
            match event {
                SseEvent::Done => {
                    st.finished = true;
                    return None;
                }
                SseEvent::Data(data) => match parse_chunk(&data) {
                    Ok(Some(text)) => return Some((Ok(text), st)),
                    Ok(None) => continue,
                    Err(e) => {
                        st.finished = true;
                        return Some((Err(e), st));
                    }
                },
            }
        }

        if st.body_done {
            debug!("Completion stream ended without [DONE]");
            return None;
        }

        match st.body.next().await {
            Some(Ok(bytes)) => match st.decoder.push(bytes.as_ref()) {
                Ok(events) => st.pending.extend(events),
                Err(e) => {
                    st.finished = true;
                    return Some((Err(e), st));
                }
            },
            Some(Err(e)) => {
                st.finished = true;
                return Some((
                    Err(ProfRagError::CompletionProviderError(format!(
                        "Stream interrupted: {e}"
                    ))),
                    st,
                ));
            }
            None => {
                st.body_done = true;
                let events = st.decoder.finish();
                st.pending.extend(events);
            }
        }
    }
}

use crate::error::{ExplainError, Result};
use crate::provider::TextStream;
use async_stream::stream;
use futures::StreamExt;

/// Incremental decoder for `text/event-stream` bodies.
///
/// Network chunks do not respect line boundaries, so partial lines are kept
/// until their newline arrives. Only `data:` fields are surfaced.
#[derive(Debug, Default)]
pub struct SseDecoder {
    pending: Vec<u8>,
}

impl SseDecoder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk and get the data payloads of every line it completed.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(chunk);

        let mut payloads = Vec::new();
        while let Some(pos) = self.pending.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.pending.drain(..=pos).collect();
            if let Some(data) = data_field(&line[..line.len() - 1]) {
                payloads.push(data);
            }
        }
        payloads
    }

    /// Payload of a trailing line that never got its newline.
    pub fn finish(&mut self) -> Option<String> {
        let rest = std::mem::take(&mut self.pending);
        data_field(&rest)
    }
}

/// Payload decoder: `Ok(None)` skips the event, `Err` ends the stream.
pub(crate) type EventDecoder = fn(&str) -> Result<Option<String>>;

/// Turn a streaming HTTP response into text fragments using `decode` for
/// each `data:` payload.
pub(crate) fn event_stream(response: reqwest::Response, decode: EventDecoder) -> TextStream {
    Box::pin(stream! {
        let mut decoder = SseDecoder::new();
        let mut body = response.bytes_stream();
        while let Some(chunk) = body.next().await {
            let chunk = match chunk {
                Ok(chunk) => chunk,
                Err(err) => {
                    yield Err(ExplainError::from(err));
                    return;
                }
            };
            for payload in decoder.push(&chunk) {
                match decode(&payload) {
                    Ok(Some(text)) => {
                        yield Ok(text);
                    }
                    Ok(None) => {}
                    Err(err) => {
                        yield Err(err);
                        return;
                    }
                }
            }
        }
        if let Some(payload) = decoder.finish() {
            match decode(&payload) {
                Ok(Some(text)) => {
                    yield Ok(text);
                }
                Ok(None) => {}
                Err(err) => {
                    yield Err(err);
                }
            }
        }
    })
}

fn data_field(line: &[u8]) -> Option<String> {
    let text = String::from_utf8_lossy(line);
    let line = text.strip_suffix('\r').unwrap_or(&text);
    let value = line.strip_prefix("data:")?;
    Some(value.strip_prefix(' ').unwrap_or(value).to_string())
}

//! OpenAI SSE → Anthropic SSE transcoding.
//!
//! [`StreamTranscoder`] is a per-response state machine fed with raw upstream
//! bytes. It splits them into lines, keeping an incomplete trailing line in a
//! carry buffer, and turns each `data:` chunk into Anthropic stream events:
//!
//! ```text
//! message_start
//! content_block_start(0, text)  on first text
//! content_block_delta(0, text_delta)*
//! content_block_start(n, tool_use) + content_block_delta(n, input_json_delta) + content_block_stop(n)
//!                               per complete tool call, n = 1, 2, ...
//! content_block_stop(0)         on finish_reason / [DONE] / end of input
//! message_stop
//! ```
//!
//! A tool call is only emitted when a single delta carries both its name and
//! its arguments. Arguments split across several deltas are not merged.

use crate::response::{fresh_message_id, fresh_tool_use_id};
use async_stream::stream;
use bytes::Bytes;
use futures::{Stream, StreamExt};
use gateway_core::anthropic::{BlockDelta, ContentBlock, MessagesResponse, StreamEvent};
use gateway_core::openai::{ChatChunk, ToolCallDelta};
use serde_json::{Map, Value};
use std::convert::Infallible;
use tracing::{debug, error, warn};

const TEXT_BLOCK_INDEX: u32 = 0;
const DONE_SENTINEL: &str = "[DONE]";

/// Streaming state for one response
#[derive(Debug)]
pub struct StreamTranscoder {
    message_id: String,
    model: String,
    started: bool,
    text_block_opened: bool,
    text_block_closed: bool,
    next_tool_index: u32,
    carry: Vec<u8>,
    finished: bool,
}

impl StreamTranscoder {
    /// New transcoder with a fresh message id; `model` is the label sent to the client
    pub fn new(model: impl Into<String>) -> Self {
        Self::with_message_id(fresh_message_id(), model)
    }

    /// New transcoder with a fixed message id
    pub fn with_message_id(message_id: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            message_id: message_id.into(),
            model: model.into(),
            started: false,
            text_block_opened: false,
            text_block_closed: false,
            next_tool_index: TEXT_BLOCK_INDEX + 1,
            carry: Vec::new(),
            finished: false,
        }
    }

    /// Message id reported in `message_start`
    #[must_use]
    pub fn message_id(&self) -> &str {
        &self.message_id
    }

    /// Emit `message_start` if it has not been emitted yet
    pub fn start(&mut self) -> Vec<StreamEvent> {
        let mut events = Vec::new();
        self.ensure_started(&mut events);
        events
    }

    /// Feed raw upstream bytes; complete lines are consumed, the rest is carried
    pub fn push(&mut self, bytes: &[u8]) -> Vec<StreamEvent> {
        let mut events = Vec::new();
        self.ensure_started(&mut events);
        self.carry.extend_from_slice(bytes);

        while let Some(newline) = self.carry.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.carry.drain(..=newline).collect();
            let line = String::from_utf8_lossy(&line);
            self.consume_into(&line, &mut events);
        }

        events
    }

    /// Consume one SSE line
    pub fn consume(&mut self, line: &str) -> Vec<StreamEvent> {
        let mut events = Vec::new();
        self.ensure_started(&mut events);
        self.consume_into(line, &mut events);
        events
    }

    /// End of input: flush the carry, close the text block, emit `message_stop`.
    ///
    /// Returns nothing on repeated calls.
    pub fn finish(&mut self) -> Vec<StreamEvent> {
        let mut events = Vec::new();
        if self.finished {
            return events;
        }
        self.ensure_started(&mut events);

        if !self.carry.is_empty() {
            let rest = std::mem::take(&mut self.carry);
            let line = String::from_utf8_lossy(&rest);
            debug!(bytes = rest.len(), "Flushing unterminated final line");
            self.consume_into(&line, &mut events);
        }

        self.close_text_block(&mut events);
        events.push(StreamEvent::MessageStop);
        self.finished = true;
        events
    }

    fn ensure_started(&mut self, events: &mut Vec<StreamEvent>) {
        if !self.started {
            self.started = true;
            events.push(StreamEvent::MessageStart {
                message: MessagesResponse::empty(self.message_id.clone(), self.model.clone()),
            });
        }
    }

    fn consume_into(&mut self, line: &str, events: &mut Vec<StreamEvent>) {
        if self.finished {
            return;
        }
        let line = line.trim();
        let Some(payload) = line.strip_prefix("data:") else {
            return;
        };
        let payload = payload.trim_start();
        if payload.is_empty() {
            return;
        }

        if payload == DONE_SENTINEL {
            self.close_text_block(events);
            return;
        }

        let chunk: ChatChunk = match serde_json::from_str(payload) {
            Ok(chunk) => chunk,
            Err(e) => {
                warn!(error = %e, data = %payload, "Skipping malformed stream chunk");
                return;
            }
        };

        let Some(choice) = chunk.first_choice() else {
            return;
        };

        if let Some(text) = choice.delta.content.as_deref().filter(|t| !t.is_empty()) {
            self.emit_text(text, events);
        }

        if let Some(calls) = &choice.delta.tool_calls {
            for call in calls {
                self.emit_tool_call(call, events);
            }
        }

        if choice.finish_reason.is_some() {
            self.close_text_block(events);
        }
    }

    fn emit_text(&mut self, text: &str, events: &mut Vec<StreamEvent>) {
        if !self.text_block_opened {
            self.text_block_opened = true;
            events.push(StreamEvent::ContentBlockStart {
                index: TEXT_BLOCK_INDEX,
                content_block: ContentBlock::text(""),
            });
        }
        events.push(StreamEvent::ContentBlockDelta {
            index: TEXT_BLOCK_INDEX,
            delta: BlockDelta::TextDelta { text: text.to_string() },
        });
    }

    fn emit_tool_call(&mut self, call: &ToolCallDelta, events: &mut Vec<StreamEvent>) {
        let Some(function) = &call.function else {
            return;
        };
        let (Some(name), Some(arguments)) = (
            function.name.as_deref().filter(|n| !n.is_empty()),
            function.arguments.as_deref().filter(|a| !a.is_empty()),
        ) else {
            debug!(index = ?call.index, "Skipping partial tool call fragment");
            return;
        };

        let index = self.next_tool_index;
        self.next_tool_index += 1;

        events.push(StreamEvent::ContentBlockStart {
            index,
            content_block: ContentBlock::ToolUse {
                id: fresh_tool_use_id(),
                name: name.to_string(),
                input: Value::Object(Map::new()),
            },
        });
        events.push(StreamEvent::ContentBlockDelta {
            index,
            delta: BlockDelta::InputJsonDelta {
                partial_json: arguments.to_string(),
            },
        });
        events.push(StreamEvent::ContentBlockStop { index });
    }

    fn close_text_block(&mut self, events: &mut Vec<StreamEvent>) {
        if self.text_block_opened && !self.text_block_closed {
            self.text_block_closed = true;
            events.push(StreamEvent::ContentBlockStop { index: TEXT_BLOCK_INDEX });
        }
    }
}

fn frames(events: Vec<StreamEvent>) -> Option<Bytes> {
    if events.is_empty() {
        return None;
    }
    let text: String = events.iter().map(StreamEvent::to_sse_frame).collect();
    Some(Bytes::from(text))
}

/// Transcode an upstream byte stream into Anthropic SSE frames.
///
/// Each upstream chunk is translated and yielded before the next is polled.
/// An upstream read error ends the stream after the closing events.
pub fn transcode_stream<S, E>(upstream: S, mut transcoder: StreamTranscoder) -> impl Stream<Item = Result<Bytes, Infallible>>
where
    S: Stream<Item = Result<Bytes, E>> + Send + 'static,
    E: std::fmt::Display + Send + 'static,
{
    stream! {
        if let Some(frame) = frames(transcoder.start()) {
            yield Ok(frame);
        }

        let mut upstream = Box::pin(upstream);
        while let Some(chunk) = upstream.next().await {
            match chunk {
                Ok(bytes) => {
                    if let Some(frame) = frames(transcoder.push(&bytes)) {
                        yield Ok(frame);
                    }
                }
                Err(e) => {
                    error!(error = %e, message_id = %transcoder.message_id(), "Upstream stream failed");
                    break;
                }
            }
        }

        if let Some(frame) = frames(transcoder.finish()) {
            yield Ok(frame);
        }
    }
}

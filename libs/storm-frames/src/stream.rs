//! Decoder for the streaming `/api/v1/storm` endpoint.
//!
//! The body is a sequence of JSON arrays, `[tag, payload...]`, separated by
//! newlines or simply concatenated. Only `node`, `err` and `fini` matter;
//! everything else (`init`, `print`, `warn`, ...) is skipped.

use std::io::{BufRead, BufReader, Read};

use futures_lite::{Stream, StreamExt};
use serde_json::Value;
use tracing::{debug, warn};

use crate::Error;
use crate::flatten::compact;
use crate::node::{NodeRecord, node_table};
use crate::table::Table;

pub const TABLE_NAME: &str = "storm";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum State {
    Open,
    Done,
}

/// Incremental decoder: feed messages one at a time, then `finish`.
#[derive(Debug)]
pub struct StreamDecoder {
    ref_id: String,
    state: State,
    records: Vec<NodeRecord>,
    skipped: usize,
}

impl StreamDecoder {
    pub fn new(ref_id: impl ToString) -> Self {
        Self {
            ref_id: ref_id.to_string(),
            state: State::Open,
            records: Vec::new(),
            skipped: 0,
        }
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn records(&self) -> &[NodeRecord] {
        &self.records
    }

    /// Consumes one message. An `err` message fails the whole decode.
    pub fn feed(&mut self, msg: Value) -> Result<State, Error> {
        if self.state == State::Done {
            return Ok(State::Done);
        }
        let Value::Array(msg) = msg else {
            warn!("skipping non-array storm message");
            self.skipped += 1;
            return Ok(self.state);
        };
        if msg.len() < 2 {
            debug!(?msg, "skipping storm message without a payload");
            self.skipped += 1;
            return Ok(self.state);
        }
        let tag = match msg.first() {
            Some(Value::String(tag)) => tag.clone(),
            _ => {
                warn!("skipping storm message without a tag");
                self.skipped += 1;
                return Ok(self.state);
            }
        };
        match tag.as_str() {
            "fini" => {
                debug!(nodes = self.records.len(), "storm query finished");
                self.state = State::Done;
            }
            "err" => return Err(remote_error(msg.get(1))),
            "node" => match NodeRecord::parse(&msg[1]) {
                Some(record) => self.records.push(record),
                None => {
                    warn!("skipping malformed node message");
                    self.skipped += 1;
                }
            },
            _ => {}
        }
        Ok(self.state)
    }

    /// Builds the node table from everything accumulated so far.
    pub fn finish(self) -> Table {
        if self.skipped > 0 {
            debug!(skipped = self.skipped, "storm messages skipped");
        }
        node_table(TABLE_NAME, &self.ref_id, &self.records, true)
    }
}

/// `["err", [code, info]]`, where `info` is either the message or an object
/// carrying it under `mesg`.
fn remote_error(payload: Option<&Value>) -> Error {
    let parts = payload.and_then(Value::as_array).map(Vec::as_slice);
    let (code, info) = match parts {
        Some([code, info, ..]) => (code.as_str().unwrap_or_default(), Some(info)),
        Some([code]) => (code.as_str().unwrap_or_default(), None),
        _ => ("", payload),
    };
    let message = match info {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Object(obj)) => match obj.get("mesg") {
            Some(Value::String(mesg)) => mesg.clone(),
            _ => compact(&Value::Object(obj.clone())),
        },
        Some(other) => compact(other),
        None => code.to_string(),
    };
    Error::remote(code, message)
}

pub fn decode_messages(
    messages: impl IntoIterator<Item = Value>,
    ref_id: &str,
) -> Result<Table, Error> {
    let mut decoder = StreamDecoder::new(ref_id);
    for msg in messages {
        if decoder.feed(msg)? == State::Done {
            break;
        }
    }
    Ok(decoder.finish())
}

/// Decodes a response body, reading no further than the `fini` message.
///
/// Messages are newline-delimited, and a line may hold several concatenated
/// messages. A line that fails to parse is skipped from the first bad byte on.
pub fn decode_reader(reader: impl Read, ref_id: &str) -> Result<Table, Error> {
    let mut decoder = StreamDecoder::new(ref_id);
    let mut reader = BufReader::new(reader);
    let mut line = String::new();
    let mut line_no = 0usize;
    while decoder.state() == State::Open {
        line.clear();
        if reader.read_line(&mut line)? == 0 {
            break;
        }
        line_no += 1;
        for msg in serde_json::Deserializer::from_str(&line).into_iter::<Value>() {
            let msg = match msg {
                Ok(msg) => msg,
                Err(err) => {
                    warn!(?err, line = line_no, "skipping undecodable storm message");
                    break;
                }
            };
            if decoder.feed(msg)? == State::Done {
                break;
            }
        }
    }
    Ok(decoder.finish())
}

pub async fn decode_stream(
    mut messages: impl Stream<Item = Value> + Unpin,
    ref_id: &str,
) -> Result<Table, Error> {
    let mut decoder = StreamDecoder::new(ref_id);
    while let Some(msg) = messages.next().await {
        if decoder.feed(msg)? == State::Done {
            break;
        }
    }
    Ok(decoder.finish())
}

use alloc::{string::String, vec::Vec};

use crate::{ParseEvent, StreamingParser};

/// Split `payload` into approximately equal-sized chunks without breaking
/// UTF-8 code points.
///
/// # Panics
///
/// Panics if `parts` is zero.
pub fn produce_chunks(payload: &str, parts: usize) -> Vec<&str> {
    assert!(parts > 0);
    let len = payload.len();
    let chunk_size = len.div_ceil(parts);
    let mut chunks = Vec::new();
    let mut start = 0;
    while start < len {
        let mut end = core::cmp::min(start + chunk_size, len);
        while end < len && !payload.is_char_boundary(end) {
            end += 1;
        }
        chunks.push(&payload[start..end]);
        start = end;
    }
    chunks
}

/// Feed `chunks` through a fresh parser, terminating on the last, and
/// collect the events. Panics on parse errors.
pub fn feed_chunks(chunks: &[&str]) -> Vec<ParseEvent> {
    let mut parser = StreamingParser::new();
    let mut events = Vec::new();
    for (i, chunk) in chunks.iter().enumerate() {
        let terminate = i + 1 == chunks.len();
        for event in parser.write(chunk, terminate) {
            events.push(event.unwrap());
        }
    }
    events
}

/// Feed a whole document in one terminated chunk.
pub fn feed_whole(payload: &str) -> Vec<ParseEvent> {
    feed_chunks(&[payload])
}

/// Collapse the chunk-boundary artifacts of an event stream: consecutive
/// append deltas for the same node are concatenated and provisional number
/// values are superseded by the next one. Two streams of the same document
/// normalize identically regardless of how the input was partitioned.
pub fn normalize(events: impl IntoIterator<Item = ParseEvent>) -> Vec<ParseEvent> {
    let mut out: Vec<ParseEvent> = Vec::new();
    for event in events {
        let merged = match (out.last_mut(), &event) {
            (
                Some(ParseEvent::StringAppend { path: last, delta: acc }),
                ParseEvent::StringAppend { path, delta },
            ) if *last == *path => {
                acc.push_str(delta);
                true
            }
            (
                Some(ParseEvent::KeyAppend { path: last, delta: acc }),
                ParseEvent::KeyAppend { path, delta },
            ) if *last == *path => {
                acc.push_str(delta);
                true
            }
            (
                Some(ParseEvent::NumberValue { path: last, value: acc }),
                ParseEvent::NumberValue { path, value },
            ) if *last == *path => {
                *acc = *value;
                true
            }
            _ => false,
        };
        if !merged {
            out.push(event);
        }
    }
    out
}

#[derive(Debug, PartialEq, Eq)]
enum OpenNode {
    Object,
    Array,
    Key,
    String,
    Number,
    Boolean,
    Null,
}

/// Assert that every begin event is matched by an end of the same kind, in
/// properly nested order, and that payload events only occur inside their
/// node.
pub fn assert_balanced(events: &[ParseEvent]) {
    let mut stack: Vec<OpenNode> = Vec::new();
    for event in events {
        match event {
            ParseEvent::ObjectBegin { .. } => stack.push(OpenNode::Object),
            ParseEvent::ArrayBegin { .. } => stack.push(OpenNode::Array),
            ParseEvent::KeyBegin { .. } => stack.push(OpenNode::Key),
            ParseEvent::StringBegin { .. } => stack.push(OpenNode::String),
            ParseEvent::NumberBegin { .. } => stack.push(OpenNode::Number),
            ParseEvent::BooleanBegin { .. } => stack.push(OpenNode::Boolean),
            ParseEvent::NullBegin { .. } => stack.push(OpenNode::Null),

            ParseEvent::KeyAppend { .. } => {
                assert_eq!(stack.last(), Some(&OpenNode::Key), "stray {event:?}");
            }
            ParseEvent::StringAppend { .. } => {
                assert_eq!(stack.last(), Some(&OpenNode::String), "stray {event:?}");
            }
            ParseEvent::NumberValue { .. } => {
                assert_eq!(stack.last(), Some(&OpenNode::Number), "stray {event:?}");
            }

            ParseEvent::ObjectEnd { .. } => assert_eq!(stack.pop(), Some(OpenNode::Object)),
            ParseEvent::ArrayEnd { .. } => assert_eq!(stack.pop(), Some(OpenNode::Array)),
            ParseEvent::KeyEnd { .. } => assert_eq!(stack.pop(), Some(OpenNode::Key)),
            ParseEvent::StringEnd { .. } => assert_eq!(stack.pop(), Some(OpenNode::String)),
            ParseEvent::NumberEnd { .. } => assert_eq!(stack.pop(), Some(OpenNode::Number)),
            ParseEvent::BooleanEnd { .. } => assert_eq!(stack.pop(), Some(OpenNode::Boolean)),
            ParseEvent::NullEnd { .. } => assert_eq!(stack.pop(), Some(OpenNode::Null)),
        }
    }
    assert!(stack.is_empty(), "unclosed nodes: {stack:?}");
}

/// Concatenation of all string deltas between each begin/end pair, keyed by
/// occurrence order.
pub fn collect_strings(events: &[ParseEvent]) -> Vec<String> {
    let mut out = Vec::new();
    let mut current: Option<String> = None;
    for event in events {
        match event {
            ParseEvent::StringBegin { .. } => current = Some(String::new()),
            ParseEvent::StringAppend { delta, .. } => {
                if let Some(s) = current.as_mut() {
                    s.push_str(delta);
                }
            }
            ParseEvent::StringEnd { .. } => {
                if let Some(s) = current.take() {
                    out.push(s);
                }
            }
            _ => {}
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::produce_chunks;

    #[test]
    fn produce_chunks_example() {
        let payload = "[\"foo\",\"bar\"]";
        let chunks = produce_chunks(payload, 5);
        assert_eq!(chunks, vec!["[\"f", "oo\"", ",\"b", "ar\"", "]"]);
        assert_eq!(chunks.concat(), payload);
    }

    #[test]
    fn produce_chunks_multibyte() {
        let payload = "[\"f😊o\",\"b🚀r\"]";
        let chunks = produce_chunks(payload, 5);
        let mut idx = 0;
        for chunk in &chunks {
            idx += chunk.len();
            assert!(payload.is_char_boundary(idx));
        }
        assert_eq!(chunks.concat(), payload);
    }
}

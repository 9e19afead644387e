//! The streaming JSON parser.
//!
//! [`StreamingParser`] drives a [`StateMachine`] over chunks of input,
//! buffers token payloads, tracks the root-relative path, and emits
//! [`ParseEvent`]s. Input may be split anywhere, including inside escape
//! sequences and numbers; string content is flushed as one delta per chunk
//! rather than one event per character.
//!
//! # Examples
//!
//! ```rust
//! use jsonflume::{ParseEvent, StreamingParser};
//!
//! let mut parser = StreamingParser::new();
//! for event in parser.write(r#"{"key": [null, true, 3.14]}"#, true) {
//!     let event = event.unwrap();
//!     println!("{event:?}");
//! }
//! ```
#![allow(clippy::enum_glob_use)]

use alloc::{collections::VecDeque, string::String, vec::Vec};
use core::mem;

use crate::{
    error::ParseError,
    escape_buffer::UnicodeEscapeBuffer,
    event::{ParseEvent, PathComponent},
    machine::{State, StateMachine},
};

/// The streaming JSON parser.
///
/// Created once per document and consumed monotonically through
/// [`write`](Self::write). After an error the parser is poisoned: later
/// writes yield the stored failure again. After a successful terminating
/// write, further writes fail with
/// [`ParseError::WriteAfterTermination`].
///
/// # Examples
///
/// ```rust
/// use jsonflume::{ParseEvent, StreamingParser};
///
/// let mut parser = StreamingParser::new();
/// let mut deltas = String::new();
/// for chunk in ["[\"str", "eam\"]"] {
///     let terminate = chunk.ends_with(']');
///     for event in parser.write(chunk, terminate) {
///         if let ParseEvent::StringAppend { delta, .. } = event.unwrap() {
///             deltas.push_str(&delta);
///         }
///     }
/// }
/// assert_eq!(deltas, "stream");
/// ```
#[derive(Debug)]
pub struct StreamingParser {
    machine: StateMachine,

    /// Root-relative location of the value currently being produced.
    path: Vec<PathComponent>,

    /// Decoded string or key content not yet emitted as a delta.
    string_buf: String,
    /// Full decoded text of the in-progress key, across chunk boundaries.
    current_key: String,
    /// Raw text of the in-progress number.
    number_buf: String,
    unicode: UnicodeEscapeBuffer,

    pending: VecDeque<ParseEvent>,
    failure: Option<ParseError>,
}

impl Default for StreamingParser {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamingParser {
    /// Creates a parser for one JSON document.
    #[must_use]
    pub fn new() -> Self {
        Self {
            machine: StateMachine::new(),
            path: Vec::new(),
            string_buf: String::new(),
            current_key: String::new(),
            number_buf: String::new(),
            unicode: UnicodeEscapeBuffer::new(),
            pending: VecDeque::new(),
            failure: None,
        }
    }

    /// Feeds one chunk of JSON text and returns the events it produced.
    ///
    /// The chunk is consumed before this returns; the iterator drains the
    /// produced events in emission order and, after an error, yields the
    /// failure exactly once. Dropping the iterator early keeps undrained
    /// events queued for the next call.
    ///
    /// With `terminate` the parser marks the end of input after draining the
    /// chunk; unterminated values and open containers become a
    /// [`ParseError::PrematureTermination`].
    pub fn write(&mut self, chunk: &str, terminate: bool) -> Events<'_> {
        self.run(chunk, terminate);
        Events {
            parser: self,
            failed: false,
        }
    }

    /// The current state of the underlying recognizer.
    #[must_use]
    pub fn state(&self) -> State {
        self.machine.state()
    }

    fn run(&mut self, chunk: &str, terminate: bool) {
        if self.failure.is_some() {
            return;
        }
        for c in chunk.chars() {
            if let Err(err) = self.step(c) {
                self.failure = Some(err);
                return;
            }
        }
        self.flush(terminate);
    }

    fn step(&mut self, c: char) -> Result<(), ParseError> {
        let prev = self.machine.state();
        let next = self.machine.write_char(c)?;
        self.transition(prev, next, c);
        Ok(())
    }

    /// Translates one state transition into events and path updates.
    #[allow(clippy::too_many_lines)]
    fn transition(&mut self, prev: State, next: State, c: char) {
        use State::*;

        // Numbers have no terminator character; leaving the number family is
        // the close.
        if prev.in_number() && !next.in_number() {
            self.close_number();
        }

        match next {
            ObjectOpen if c == '{' => {
                self.emit(ParseEvent::ObjectBegin {
                    path: self.path.clone(),
                });
            }
            ObjectComma if c == ',' => {
                self.path.pop();
            }
            ObjectClose => {
                // Pop the pending member key, if this object had started one.
                // An empty object (or one closing directly above its own
                // position, like the inner `{}` of `{"a":{}}`) has not.
                if self.path.len() > self.machine.depth()
                    && matches!(self.path.last(), Some(PathComponent::Key(_)))
                {
                    self.path.pop();
                }
                self.emit(ParseEvent::ObjectEnd {
                    path: self.path.clone(),
                });
            }

            ArrayOpen if c == '[' => {
                self.emit(ParseEvent::ArrayBegin {
                    path: self.path.clone(),
                });
                self.path.push(PathComponent::Index(0));
            }
            ArrayComma if c == ',' => {
                if let Some(PathComponent::Index(i)) = self.path.last_mut() {
                    *i += 1;
                }
            }
            ArrayClose => {
                self.path.pop();
                self.emit(ParseEvent::ArrayEnd {
                    path: self.path.clone(),
                });
            }

            StringOpen => {
                self.string_buf.clear();
                if self.machine.is_in_key() {
                    self.current_key.clear();
                    self.emit(ParseEvent::KeyBegin {
                        path: self.path.clone(),
                    });
                } else {
                    self.emit(ParseEvent::StringBegin {
                        path: self.path.clone(),
                    });
                }
            }
            StringChar => self.push_text(c),
            StringEscapedChar => self.push_text(decode_escape(c)),
            StringEscapeUnicodeOpen => self.unicode.reset(),
            StringEscapeUnicode2 | StringEscapeUnicode3 | StringEscapeUnicode4 => {
                let _ = self.unicode.feed(c);
            }
            StringEscapeUnicodeClose => {
                if let Some(decoded) = self.unicode.feed(c) {
                    self.push_text(decoded);
                }
            }
            KeyClose if c == '"' => {
                let delta = mem::take(&mut self.string_buf);
                self.emit(ParseEvent::KeyAppend {
                    path: self.path.clone(),
                    delta,
                });
                let key = mem::take(&mut self.current_key);
                self.path.push(PathComponent::Key(key.clone()));
                self.emit(ParseEvent::KeyEnd {
                    path: self.path.clone(),
                    key,
                });
            }
            StringClose => {
                let delta = mem::take(&mut self.string_buf);
                self.emit(ParseEvent::StringAppend {
                    path: self.path.clone(),
                    delta,
                });
                self.emit(ParseEvent::StringEnd {
                    path: self.path.clone(),
                });
            }

            NumberSign | NumberIntegerZero | NumberInteger if !prev.in_number() => {
                self.number_buf.clear();
                self.number_buf.push(c);
                self.emit(ParseEvent::NumberBegin {
                    path: self.path.clone(),
                });
            }
            state if state.in_number() => self.number_buf.push(c),

            TrueOpen => self.emit(ParseEvent::BooleanBegin {
                path: self.path.clone(),
                value: true,
            }),
            FalseOpen => self.emit(ParseEvent::BooleanBegin {
                path: self.path.clone(),
                value: false,
            }),
            NullOpen => self.emit(ParseEvent::NullBegin {
                path: self.path.clone(),
            }),
            TrueClose => self.emit(ParseEvent::BooleanEnd {
                path: self.path.clone(),
                value: true,
            }),
            FalseClose => self.emit(ParseEvent::BooleanEnd {
                path: self.path.clone(),
                value: false,
            }),
            NullClose => self.emit(ParseEvent::NullEnd {
                path: self.path.clone(),
            }),

            _ => {}
        }
    }

    /// End-of-chunk flushes: the pending string delta, a provisional number
    /// value, and (on the final chunk) termination.
    fn flush(&mut self, terminate: bool) {
        let state = self.machine.state();

        if state.in_string() && !self.string_buf.is_empty() {
            let delta = mem::take(&mut self.string_buf);
            if self.machine.is_in_key() {
                self.emit(ParseEvent::KeyAppend {
                    path: self.path.clone(),
                    delta,
                });
            } else {
                self.emit(ParseEvent::StringAppend {
                    path: self.path.clone(),
                    delta,
                });
            }
        }

        if state.is_number_terminal() && !self.number_buf.is_empty() {
            let value = self.number_buf.parse::<f64>().unwrap();
            self.emit(ParseEvent::NumberValue {
                path: self.path.clone(),
                value,
            });
        }

        if terminate {
            match self.machine.terminate() {
                Ok(()) => {
                    if state.is_number_terminal() && !self.number_buf.is_empty() {
                        self.number_buf.clear();
                        self.emit(ParseEvent::NumberEnd {
                            path: self.path.clone(),
                        });
                    }
                }
                Err(err) => self.failure = Some(err),
            }
        }
    }

    /// Emits the final value of a completed number, clearing the buffer.
    fn close_number(&mut self) {
        if self.number_buf.is_empty() {
            return;
        }
        // Exits from the number family only happen in terminal states, where
        // the buffer is a valid JSON number.
        let value = self.number_buf.parse::<f64>().unwrap();
        self.number_buf.clear();
        self.emit(ParseEvent::NumberValue {
            path: self.path.clone(),
            value,
        });
        self.emit(ParseEvent::NumberEnd {
            path: self.path.clone(),
        });
    }

    fn push_text(&mut self, c: char) {
        self.string_buf.push(c);
        if self.machine.is_in_key() {
            self.current_key.push(c);
        }
    }

    fn emit(&mut self, event: ParseEvent) {
        self.pending.push_back(event);
    }
}

fn decode_escape(c: char) -> char {
    match c {
        'b' => '\u{0008}',
        'f' => '\u{000C}',
        'n' => '\n',
        'r' => '\r',
        't' => '\t',
        other => other, // '"', '\\', '/'
    }
}

/// Draining iterator over the events produced by one
/// [`StreamingParser::write`] call.
///
/// Yields `Ok` events in emission order, then the failure (if any) once,
/// then `None`.
#[derive(Debug)]
pub struct Events<'a> {
    parser: &'a mut StreamingParser,
    failed: bool,
}

impl Iterator for Events<'_> {
    type Item = Result<ParseEvent, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(event) = self.parser.pending.pop_front() {
            return Some(Ok(event));
        }
        if self.failed {
            return None;
        }
        if let Some(err) = self.parser.failure.clone() {
            self.failed = true;
            return Some(Err(err));
        }
        None
    }
}

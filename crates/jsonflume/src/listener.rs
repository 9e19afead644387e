//! Path-subscribed listeners over the streaming parser.
//!
//! [`PathListener`] registers callbacks against path patterns and feeds a
//! [`StreamingParser`] internally. For every subscription it maintains an
//! accumulator: a minimal partial reconstruction of the subtree rooted at
//! the subscription's pattern, grown event by event, so callbacks can be
//! handed real values while the document is still arriving.
//!
//! Patterns may contain [`ANY_INDEX`](crate::ANY_INDEX) to match any array
//! position at that depth.
//!
//! # Examples
//!
//! ```rust
//! use jsonflume::{PathListener, Value, path};
//!
//! let mut names = Vec::new();
//! let mut listener = PathListener::new();
//! listener.on_complete(path!["user", "name"], move |_, value| {
//!     if let Value::String(name) = value {
//!         names.push(name.clone());
//!     }
//! });
//! listener
//!     .write(r#"{"user":{"name":"Rabbit"}}"#, true)
//!     .unwrap();
//! ```
use alloc::{boxed::Box, string::String, vec::Vec};

use crate::{
    error::ParseError,
    event::{ParseEvent, PathComponent},
    parser::StreamingParser,
    value::{Map, Value},
};

type Callback = Box<dyn FnMut(&[PathComponent], &Value)>;

struct Subscription {
    pattern: Vec<PathComponent>,
    callback: Callback,
}

/// A partial reconstruction of the subtree rooted at one subscription's
/// pattern. Grows as events at or below the pattern arrive.
struct Accumulator {
    pattern: Vec<PathComponent>,
    partial: Option<Value>,
}

impl Accumulator {
    fn new(pattern: Vec<PathComponent>) -> Self {
        Self {
            pattern,
            partial: None,
        }
    }

    /// Places `value` at `rel`, creating intermediate containers and growing
    /// arrays (null-filled) as needed.
    fn place(&mut self, rel: &[PathComponent], value: Value) {
        let Some((last, front)) = rel.split_last() else {
            self.partial = Some(value);
            return;
        };
        let mut current = self.partial.get_or_insert(Value::Null);
        for component in front {
            current = descend(current, component);
        }
        match last {
            PathComponent::Key(k) => {
                as_object(current).insert(k.clone(), value);
            }
            PathComponent::Index(i) => {
                let arr = as_array(current);
                if *i >= arr.len() {
                    arr.resize(*i + 1, Value::Null);
                }
                arr[*i] = value;
            }
            // Event paths never carry the wildcard.
            PathComponent::AnyIndex => {}
        }
    }

    /// Appends a string delta at `rel`, creating the string if absent.
    fn append(&mut self, rel: &[PathComponent], delta: &str) {
        let Some((last, front)) = rel.split_last() else {
            if let Some(Value::String(s)) = self.partial.as_mut() {
                s.push_str(delta);
            } else {
                self.partial = Some(Value::String(String::from(delta)));
            }
            return;
        };
        let mut current = self.partial.get_or_insert(Value::Null);
        for component in front {
            current = descend(current, component);
        }
        match last {
            PathComponent::Key(k) => {
                let map = as_object(current);
                if let Some(Value::String(s)) = map.get_mut(k) {
                    s.push_str(delta);
                } else {
                    map.insert(k.clone(), Value::String(String::from(delta)));
                }
            }
            PathComponent::Index(i) => {
                let arr = as_array(current);
                if *i >= arr.len() {
                    arr.resize(*i + 1, Value::Null);
                }
                if let Value::String(s) = &mut arr[*i] {
                    s.push_str(delta);
                } else {
                    arr[*i] = Value::String(String::from(delta));
                }
            }
            PathComponent::AnyIndex => {}
        }
    }

    /// Reads the value at `rel`, if it exists in the partial yet.
    fn value_at(&self, rel: &[PathComponent]) -> Option<&Value> {
        let mut current = self.partial.as_ref()?;
        for component in rel {
            current = match (component, current) {
                (PathComponent::Key(k), Value::Object(map)) => map.get(k)?,
                (PathComponent::Index(i), Value::Array(arr)) => arr.get(*i)?,
                _ => return None,
            };
        }
        Some(current)
    }
}

/// Steps into `component` of `value`, replacing non-matching nodes with a
/// fresh container of the right kind.
fn descend<'a>(value: &'a mut Value, component: &PathComponent) -> &'a mut Value {
    match component {
        PathComponent::Key(k) => as_object(value).entry(k.clone()).or_insert(Value::Null),
        PathComponent::Index(i) => {
            let arr = as_array(value);
            if *i >= arr.len() {
                arr.resize(*i + 1, Value::Null);
            }
            &mut arr[*i]
        }
        PathComponent::AnyIndex => value,
    }
}

fn as_object(value: &mut Value) -> &mut Map {
    if !value.is_object() {
        *value = Value::Object(Map::new());
    }
    let Value::Object(map) = value else {
        unreachable!()
    };
    map
}

fn as_array(value: &mut Value) -> &mut Vec<Value> {
    if !value.is_array() {
        *value = Value::Array(Vec::new());
    }
    let Value::Array(arr) = value else {
        unreachable!()
    };
    arr
}

/// `true` when `pattern` covers `path`: the pattern is no longer than the
/// path and every component matches, with [`PathComponent::AnyIndex`]
/// matching any array index. The empty pattern covers everything.
fn covers(pattern: &[PathComponent], path: &[PathComponent]) -> bool {
    pattern.len() <= path.len()
        && pattern
            .iter()
            .zip(path)
            .all(|(p, c)| component_matches(p, c))
}

fn component_matches(pattern: &PathComponent, concrete: &PathComponent) -> bool {
    match (pattern, concrete) {
        (PathComponent::Key(a), PathComponent::Key(b)) => a == b,
        (PathComponent::Index(a), PathComponent::Index(b)) => a == b,
        (PathComponent::AnyIndex, PathComponent::Index(_)) => true,
        _ => false,
    }
}

/// Replaces wildcard positions in `pattern` with the concrete components of
/// `path`. Callers guarantee `pattern.len() <= path.len()`.
fn substitute(pattern: &[PathComponent], path: &[PathComponent]) -> Vec<PathComponent> {
    pattern
        .iter()
        .zip(path)
        .map(|(p, c)| {
            if matches!(p, PathComponent::AnyIndex) {
                c.clone()
            } else {
                p.clone()
            }
        })
        .collect()
}

/// Reads the value at `path` from the first accumulator whose pattern covers
/// it.
///
/// # Panics
///
/// Panics when no accumulator covers `path`; every subscription registers a
/// covering accumulator, so a miss is a bug in the dispatch logic.
fn lookup<'a>(accumulators: &'a [Accumulator], path: &[PathComponent]) -> Option<&'a Value> {
    let accumulator = accumulators
        .iter()
        .find(|acc| covers(&acc.pattern, path))
        .expect("no accumulator covers a dispatched path");
    accumulator.value_at(&path[accumulator.pattern.len()..])
}

/// Dispatches parser events to callbacks subscribed by path pattern.
///
/// Three kinds of subscription are supported:
///
/// - [`on_partial`](Self::on_partial) fires on every event at or below the
///   pattern, with the (possibly partial) value currently at the pattern.
/// - [`on_item`](Self::on_item) fires when an array element directly below
///   the pattern completes, with the element's full value.
/// - [`on_complete`](Self::on_complete) fires when the value at the pattern
///   is finalized, with the final value.
///
/// Callbacks run synchronously, in event order; for one event all partial
/// callbacks fire before item callbacks, which fire before complete
/// callbacks.
///
/// # Examples
///
/// ```rust
/// use std::{cell::RefCell, rc::Rc};
///
/// use jsonflume::{PathListener, path};
///
/// let seen = Rc::new(RefCell::new(Vec::new()));
/// let sink = Rc::clone(&seen);
///
/// let mut listener = PathListener::new();
/// listener.on_item(path!["items"], move |path, value| {
///     sink.borrow_mut().push((path.to_vec(), value.clone()));
/// });
/// listener.write(r#"{"items":[1,2,3]}"#, true).unwrap();
/// assert_eq!(seen.borrow().len(), 3);
/// ```
pub struct PathListener {
    parser: StreamingParser,
    partial: Vec<Subscription>,
    item: Vec<Subscription>,
    complete: Vec<Subscription>,
    accumulators: Vec<Accumulator>,
}

impl Default for PathListener {
    fn default() -> Self {
        Self::new()
    }
}

impl PathListener {
    /// Creates a listener over a fresh parser, with no subscriptions.
    #[must_use]
    pub fn new() -> Self {
        Self {
            parser: StreamingParser::new(),
            partial: Vec::new(),
            item: Vec::new(),
            complete: Vec::new(),
            accumulators: Vec::new(),
        }
    }

    /// Subscribes `callback` to every event at or below `pattern`.
    ///
    /// The callback receives the concrete path (wildcards substituted from
    /// the event) and the partial value currently at that path. It is not
    /// invoked for events that precede the pattern's value existing (key
    /// events announcing the member, for instance).
    pub fn on_partial(
        &mut self,
        pattern: Vec<PathComponent>,
        callback: impl FnMut(&[PathComponent], &Value) + 'static,
    ) {
        self.accumulators.push(Accumulator::new(pattern.clone()));
        self.partial.push(Subscription {
            pattern,
            callback: Box::new(callback),
        });
    }

    /// Subscribes `callback` to the completion of array elements directly
    /// below `pattern`.
    ///
    /// The callback receives the element's concrete path and its full value.
    pub fn on_item(
        &mut self,
        pattern: Vec<PathComponent>,
        callback: impl FnMut(&[PathComponent], &Value) + 'static,
    ) {
        self.accumulators.push(Accumulator::new(pattern.clone()));
        self.item.push(Subscription {
            pattern,
            callback: Box::new(callback),
        });
    }

    /// Subscribes `callback` to the finalization of the value at `pattern`.
    pub fn on_complete(
        &mut self,
        pattern: Vec<PathComponent>,
        callback: impl FnMut(&[PathComponent], &Value) + 'static,
    ) {
        self.accumulators.push(Accumulator::new(pattern.clone()));
        self.complete.push(Subscription {
            pattern,
            callback: Box::new(callback),
        });
    }

    /// Feeds one chunk of JSON text, updating accumulators and firing
    /// callbacks for each event in order.
    ///
    /// # Errors
    ///
    /// Propagates the parser's error verbatim. Callbacks fired before the
    /// error are not rolled back.
    pub fn write(&mut self, chunk: &str, terminate: bool) -> Result<(), ParseError> {
        let events: Vec<_> = self.parser.write(chunk, terminate).collect();
        for event in events {
            let event = event?;
            self.absorb(&event);
            self.dispatch(&event);
        }
        Ok(())
    }

    /// Applies one event to every accumulator whose pattern covers its path.
    fn absorb(&mut self, event: &ParseEvent) {
        let path = event.path();
        for accumulator in &mut self.accumulators {
            if !covers(&accumulator.pattern, path) {
                continue;
            }
            let rel = &path[accumulator.pattern.len()..];
            match event {
                ParseEvent::ObjectBegin { .. } => accumulator.place(rel, Value::Object(Map::new())),
                ParseEvent::ArrayBegin { .. } => accumulator.place(rel, Value::Array(Vec::new())),
                ParseEvent::StringBegin { .. } => accumulator.place(rel, Value::String(String::new())),
                ParseEvent::StringAppend { delta, .. } => accumulator.append(rel, delta),
                ParseEvent::NumberValue { value, .. } => accumulator.place(rel, Value::Number(*value)),
                ParseEvent::BooleanEnd { value, .. } => accumulator.place(rel, Value::Boolean(*value)),
                ParseEvent::NullEnd { .. } => accumulator.place(rel, Value::Null),
                _ => {}
            }
        }
    }

    fn dispatch(&mut self, event: &ParseEvent) {
        let path = event.path();

        for sub in &mut self.partial {
            if covers(&sub.pattern, path) {
                let concrete = substitute(&sub.pattern, path);
                if let Some(value) = lookup(&self.accumulators, &concrete) {
                    (sub.callback)(&concrete, value);
                }
            }
        }

        if !event.closes_value() {
            return;
        }

        if let Some((PathComponent::Index(_), parent)) = path.split_last() {
            for sub in &mut self.item {
                if sub.pattern.len() == parent.len() && covers(&sub.pattern, parent) {
                    let value = lookup(&self.accumulators, path)
                        .expect("completed array element missing from accumulator");
                    (sub.callback)(path, value);
                }
            }
        }

        for sub in &mut self.complete {
            if sub.pattern.len() == path.len() && covers(&sub.pattern, path) {
                let value = lookup(&self.accumulators, path)
                    .expect("completed value missing from accumulator");
                (sub.callback)(path, value);
            }
        }
    }
}

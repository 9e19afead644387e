//! Events emitted by the streaming JSON parser.
//!
//! [`ParseEvent`] enumerates parser outputs: structural boundaries, key
//! lifecycle, and value-payload fragments, each carrying the path of the node
//! it describes. [`PathComponent`] represents one key or index in such a
//! path; [`ANY_INDEX`] is the wildcard component accepted in subscription
//! patterns.
//!
//! # Examples
//!
//! ```
//! use jsonflume::{ParseEvent, StreamingParser, path};
//!
//! let mut parser = StreamingParser::new();
//! let events: Vec<_> = parser
//!     .write("[true]", true)
//!     .collect::<Result<_, _>>()
//!     .unwrap();
//! assert_eq!(
//!     events,
//!     vec![
//!         ParseEvent::ArrayBegin { path: path![] },
//!         ParseEvent::BooleanBegin {
//!             path: path![0],
//!             value: true,
//!         },
//!         ParseEvent::BooleanEnd {
//!             path: path![0],
//!             value: true,
//!         },
//!         ParseEvent::ArrayEnd { path: path![] },
//!     ]
//! );
//! ```
use alloc::{
    string::{String, ToString},
    vec::Vec,
};

/// A component in the path to a JSON value.
///
/// Paths are sequences of keys or indices (for objects and arrays,
/// respectively) starting at the document root. [`AnyIndex`] is a wildcard
/// matching any array index; it appears only in subscription patterns, never
/// in event paths.
///
/// [`AnyIndex`]: PathComponent::AnyIndex
///
/// # Examples
///
/// ```
/// use jsonflume::PathComponent;
///
/// let key = PathComponent::Key("foo".to_string());
/// assert_eq!(key.as_key(), Some(&"foo".to_string()));
///
/// let idx = PathComponent::Index(3);
/// assert_eq!(idx.as_index(), Some(&3));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathComponent {
    /// An object member key.
    Key(String),
    /// An array position.
    Index(usize),
    /// Wildcard matching any array position; legal only in patterns.
    AnyIndex,
}

/// The wildcard path component for subscription patterns.
///
/// Serialized as the integer `-1`, which is also how dynamic-language
/// bindings spell it.
pub const ANY_INDEX: PathComponent = PathComponent::AnyIndex;

impl From<&str> for PathComponent {
    fn from(s: &str) -> Self {
        Self::Key(s.to_string())
    }
}

impl From<String> for PathComponent {
    fn from(s: String) -> Self {
        Self::Key(s)
    }
}

impl From<usize> for PathComponent {
    fn from(i: usize) -> Self {
        Self::Index(i)
    }
}

#[doc(hidden)]
pub trait PathComponentFrom<T> {
    fn from_path_component(value: T) -> PathComponent;
}

// use macro_rules to implement for the integer widths so `path![0]` works
// without suffixes
macro_rules! impl_integer_as_path_component {
    ($($t:ty),+) => {
        $(
            impl PathComponentFrom<$t> for PathComponent {
                fn from_path_component(value: $t) -> Self {
                    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                    PathComponent::Index(value as usize)
                }
            }
        )+
    };
}
impl_integer_as_path_component!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl PathComponentFrom<&str> for PathComponent {
    fn from_path_component(value: &str) -> Self {
        PathComponent::Key(value.to_string())
    }
}

impl PathComponentFrom<String> for PathComponent {
    fn from_path_component(value: String) -> Self {
        PathComponent::Key(value)
    }
}

impl PathComponentFrom<PathComponent> for PathComponent {
    fn from_path_component(value: PathComponent) -> Self {
        value
    }
}

impl PathComponent {
    /// Returns the index if this component is an index, otherwise `None`.
    #[must_use]
    pub fn as_index(&self) -> Option<&usize> {
        if let Self::Index(v) = self {
            Some(v)
        } else {
            None
        }
    }

    /// Returns the key if this component is a key, otherwise `None`.
    #[must_use]
    pub fn as_key(&self) -> Option<&String> {
        if let Self::Key(v) = self {
            Some(v)
        } else {
            None
        }
    }
}

// Custom (de)serialization so that a `Vec<PathComponent>` becomes e.g.
// `["foo", 0, "bar"]` instead of the default tagged representation. The
// wildcard round-trips as -1.
#[cfg(any(test, feature = "serde"))]
mod serde_impls {
    use alloc::string::{String, ToString};
    use core::fmt;

    use serde::{
        Deserialize, Deserializer, Serialize, Serializer,
        de::{Error, Unexpected, Visitor},
    };

    use super::PathComponent;

    impl Serialize for PathComponent {
        fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            match self {
                PathComponent::Key(k) => serializer.serialize_str(k),
                PathComponent::Index(i) => serializer.serialize_u64(*i as u64),
                PathComponent::AnyIndex => serializer.serialize_i64(-1),
            }
        }
    }

    struct PathComponentVisitor;

    impl Visitor<'_> for PathComponentVisitor {
        type Value = PathComponent;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a string, an unsigned integer, or -1")
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: Error,
        {
            Ok(PathComponent::Key(value.to_string()))
        }

        fn visit_string<E>(self, value: String) -> Result<Self::Value, E>
        where
            E: Error,
        {
            Ok(PathComponent::Key(value))
        }

        fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
        where
            E: Error,
        {
            #[allow(clippy::cast_possible_truncation)]
            Ok(PathComponent::Index(value as usize))
        }

        fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
        where
            E: Error,
        {
            if value == -1 {
                return Ok(PathComponent::AnyIndex);
            }
            if value < 0 {
                return Err(Error::invalid_value(
                    Unexpected::Signed(value),
                    &"non-negative index or -1",
                ));
            }

            #[allow(clippy::cast_sign_loss)]
            #[allow(clippy::cast_possible_truncation)]
            Ok(PathComponent::Index(value as usize))
        }
    }

    impl<'de> Deserialize<'de> for PathComponent {
        fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
        where
            D: Deserializer<'de>,
        {
            deserializer.deserialize_any(PathComponentVisitor)
        }
    }
}

/// An event generated by the streaming JSON parser.
///
/// Every variant carries the `path` of the node it describes, as a sequence
/// of [`PathComponent`] from the root. Key events are anchored at the
/// enclosing object until the key text is final: `KeyBegin` and `KeyAppend`
/// carry the object's path, while `KeyEnd` and everything after it carry the
/// path extended with the finalized key.
///
/// String and key content arrives as `delta` fragments; concatenating the
/// deltas between a matched begin/end pair yields the decoded text.
/// `NumberValue` may be emitted more than once per number as digits accrue
/// across chunk boundaries; the last one before `NumberEnd` is authoritative.
#[cfg_attr(
    any(test, feature = "serde"),
    derive(serde::Serialize, serde::Deserialize)
)]
#[cfg_attr(any(test, feature = "serde"), serde(tag = "kind"))]
#[derive(Debug, Clone, PartialEq)]
pub enum ParseEvent {
    /// A `{` was consumed.
    ObjectBegin {
        /// The path to the object.
        path: Vec<PathComponent>,
    },
    /// The matching `}` was consumed.
    ObjectEnd {
        /// The path to the object.
        path: Vec<PathComponent>,
    },
    /// A `[` was consumed.
    ArrayBegin {
        /// The path to the array.
        path: Vec<PathComponent>,
    },
    /// The matching `]` was consumed.
    ArrayEnd {
        /// The path to the array.
        path: Vec<PathComponent>,
    },
    /// The opening quote of an object key was consumed.
    KeyBegin {
        /// The path to the enclosing object.
        path: Vec<PathComponent>,
    },
    /// A fragment of decoded key text.
    KeyAppend {
        /// The path to the enclosing object.
        path: Vec<PathComponent>,
        /// The decoded fragment, possibly empty at key close.
        delta: String,
    },
    /// The closing quote of a key was consumed.
    KeyEnd {
        /// The object path extended with the finalized key.
        path: Vec<PathComponent>,
        /// The full decoded key.
        key: String,
    },
    /// The opening quote of a string value was consumed.
    StringBegin {
        /// The path to the string.
        path: Vec<PathComponent>,
    },
    /// A fragment of decoded string content.
    StringAppend {
        /// The path to the string.
        path: Vec<PathComponent>,
        /// The decoded fragment, possibly empty at string close.
        delta: String,
    },
    /// The closing quote of a string value was consumed.
    StringEnd {
        /// The path to the string.
        path: Vec<PathComponent>,
    },
    /// The first character of a number was consumed.
    NumberBegin {
        /// The path to the number.
        path: Vec<PathComponent>,
    },
    /// The current numeric interpretation of the digits consumed so far.
    NumberValue {
        /// The path to the number.
        path: Vec<PathComponent>,
        /// The parsed value.
        value: f64,
    },
    /// The number was terminated by a structural character or end of input.
    NumberEnd {
        /// The path to the number.
        path: Vec<PathComponent>,
    },
    /// A `t` or `f` was consumed; the literal is already unambiguous.
    BooleanBegin {
        /// The path to the boolean.
        path: Vec<PathComponent>,
        /// The boolean value.
        value: bool,
    },
    /// The final character of `true` or `false` was consumed.
    BooleanEnd {
        /// The path to the boolean.
        path: Vec<PathComponent>,
        /// The boolean value.
        value: bool,
    },
    /// An `n` was consumed.
    NullBegin {
        /// The path to the null.
        path: Vec<PathComponent>,
    },
    /// The final character of `null` was consumed.
    NullEnd {
        /// The path to the null.
        path: Vec<PathComponent>,
    },
}

impl ParseEvent {
    /// The path this event describes.
    #[must_use]
    pub fn path(&self) -> &[PathComponent] {
        match self {
            Self::ObjectBegin { path }
            | Self::ObjectEnd { path }
            | Self::ArrayBegin { path }
            | Self::ArrayEnd { path }
            | Self::KeyBegin { path }
            | Self::KeyAppend { path, .. }
            | Self::KeyEnd { path, .. }
            | Self::StringBegin { path }
            | Self::StringAppend { path, .. }
            | Self::StringEnd { path }
            | Self::NumberBegin { path }
            | Self::NumberValue { path, .. }
            | Self::NumberEnd { path }
            | Self::BooleanBegin { path, .. }
            | Self::BooleanEnd { path, .. }
            | Self::NullBegin { path }
            | Self::NullEnd { path } => path,
        }
    }

    /// `true` for the events that finalize a value at their path.
    ///
    /// `KeyEnd` finalizes a key, not a value, and is excluded.
    #[must_use]
    pub fn closes_value(&self) -> bool {
        matches!(
            self,
            Self::ObjectEnd { .. }
                | Self::ArrayEnd { .. }
                | Self::StringEnd { .. }
                | Self::NumberEnd { .. }
                | Self::BooleanEnd { .. }
                | Self::NullEnd { .. }
        )
    }
}

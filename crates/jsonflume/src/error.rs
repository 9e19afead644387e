use thiserror::Error;

/// An error raised while feeding input to the parser.
///
/// All variants are fatal: the machine (and any parser wrapping it) must not
/// be fed further input once one has been returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// No legal transition exists from the current state on this character.
    #[error("invalid character {found:?} in state {state} at {line}:{column} (offset {offset})")]
    InvalidCharacter {
        /// The offending character.
        found: char,
        /// Name of the state the machine was in.
        state: &'static str,
        /// Character offset from the start of the input.
        offset: usize,
        /// 1-based line of the offending character.
        line: usize,
        /// 1-based column of the offending character.
        column: usize,
    },

    /// `terminate` was called mid-value or with containers still open.
    #[error("premature termination in state {state} at {line}:{column} (offset {offset})")]
    PrematureTermination {
        /// Name of the state the machine was in.
        state: &'static str,
        /// Character offset from the start of the input.
        offset: usize,
        /// 1-based line at the point of termination.
        line: usize,
        /// 1-based column at the point of termination.
        column: usize,
    },

    /// A character was written after a successful `terminate`.
    #[error("write after termination at {line}:{column} (offset {offset})")]
    WriteAfterTermination {
        /// Character offset from the start of the input.
        offset: usize,
        /// 1-based line at the point of the write.
        line: usize,
        /// 1-based column at the point of the write.
        column: usize,
    },
}

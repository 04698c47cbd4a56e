use std::ops::Deref;

use crate::parser::ParserError;

/// Error type for JSONPath query string parsing errors
#[derive(Debug, thiserror::Error)]
#[error("{err}")]
pub struct ParseError {
    err: Box<ErrorImpl>,
}

impl ParseError {
    /// Get the 1-indexed byte position of the error within the query string
    pub fn position(&self) -> usize {
        self.err.position
    }

    /// Get the 1-indexed line of the error within the query string
    pub fn line(&self) -> usize {
        self.err.line
    }

    /// Get the 1-indexed column of the error within the query string
    pub fn column(&self) -> usize {
        self.err.column
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.err.message
    }

    /// Get the kind of parse error
    pub fn kind(&self) -> ParseErrorKind {
        self.err.kind
    }

    pub(crate) fn new(
        position: usize,
        line: usize,
        column: usize,
        message: String,
        kind: ParseErrorKind,
    ) -> Self {
        Self {
            err: Box::new(ErrorImpl {
                position,
                line,
                column,
                message: message.into(),
                kind,
            }),
        }
    }
}

/// The broad category of a [`ParseError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// Malformed query syntax
    Syntax,
    /// A well-typedness violation, e.g., a non-singular query used in a comparison, or a
    /// filter function used with arguments of the wrong type
    Type,
    /// An integer literal outside the interoperable range
    Index,
    /// A non-standard construct used in strict mode, or an unknown filter function
    Name,
}

#[derive(Debug, thiserror::Error)]
#[error("at line {line}, column {column}: {message}")]
struct ErrorImpl {
    position: usize,
    line: usize,
    column: usize,
    message: Box<str>,
    kind: ParseErrorKind,
}

impl<I> From<(I, ParserError<I>)> for ParseError
where
    I: Deref<Target = str> + std::fmt::Debug,
{
    fn from((input, pe): (I, ParserError<I>)) -> Self {
        let input: &str = &input;
        #[cfg(feature = "trace")]
        tracing::trace!(input, parser_error = ?pe);
        let consumed = input.len() - pe.remaining_len();
        let line = input[..consumed].chars().filter(|&c| c == '\n').count() + 1;
        let column = input[..consumed]
            .rfind('\n')
            .map(|p| consumed - p)
            .unwrap_or(consumed + 1);
        Self::new(consumed + 1, line, column, pe.message(), pe.kind())
    }
}

/// Error produced while evaluating a compiled JSONPath query
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum QueryError {
    /// A descendant segment exceeded the environment's maximum recursion depth
    #[error("recursion limit exceeded at depth {depth} while in a descendant segment")]
    Recursion {
        /// The depth at which the walk was abandoned
        depth: usize,
    },
    /// A regular expression passed to `match()` or `search()` failed to compile
    ///
    /// Only produced when the environment has regex debugging enabled; the default is to
    /// treat an invalid pattern as a non-match.
    #[error("invalid regular expression: {pattern}")]
    Regex {
        /// The offending pattern
        pattern: String,
    },
}

/// Convenience error wrapping every failure mode of this crate
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A JSONPath query string failed to parse
    #[error(transparent)]
    Parse(#[from] ParseError),
    /// A JSONPath query failed during evaluation
    #[error(transparent)]
    Query(#[from] QueryError),
    /// A JSON Pointer failed to parse or resolve
    #[error(transparent)]
    Pointer(#[from] crate::pointer::PointerError),
    /// A JSON Patch failed to build or apply
    #[error(transparent)]
    Patch(#[from] crate::patch::PatchError),
}

#[cfg(test)]
mod tests {
    use crate::ParseError;

    #[test]
    fn test_send() {
        fn assert_send<T: Send>() {}
        assert_send::<ParseError>();
    }

    #[test]
    fn test_sync() {
        fn assert_sync<T: Sync>() {}
        assert_sync::<ParseError>();
    }
}

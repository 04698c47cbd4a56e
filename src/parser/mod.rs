use nom::character::complete::multispace0;
use nom::combinator::all_consuming;
use nom::sequence::delimited;
use nom::IResult;

use crate::error::{ParseError, ParseErrorKind};
use crate::spec::functions::FunctionValidationError;
use crate::spec::integer::IntegerError;
use crate::spec::query::{Query, QueryKind, SetOp};
use crate::spec::selector::filter::NonSingularQueryError;

pub(crate) mod primitive;
pub(crate) mod segment;
pub(crate) mod selector;
pub(crate) mod utils;

pub(crate) type PResult<'a, O> = IResult<&'a str, O, ParserError<&'a str>>;

/// Options threaded through the parser
///
/// Strict mode restricts the accepted grammar to RFC 9535; the default grammar also
/// accepts the non-standard extensions.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct ParserOptions {
    pub(crate) strict: bool,
}

/// The parser's internal error type
///
/// Tracks the remaining input at the point of failure, which the public [`ParseError`]
/// turns into a byte offset and line/column pair, along with an optional context label and
/// an optional cause carrying a message and error kind.
#[derive(Debug, PartialEq)]
pub(crate) struct ParserError<I> {
    pub(crate) input: I,
    pub(crate) context: Option<&'static str>,
    pub(crate) cause: Option<ParseErrorCause>,
}

impl<I> ParserError<I>
where
    I: std::ops::Deref<Target = str>,
{
    pub(crate) fn remaining_len(&self) -> usize {
        self.input.len()
    }

    pub(crate) fn message(&self) -> String {
        match (&self.cause, self.context) {
            (Some(cause), _) => cause.message.clone(),
            (None, Some(context)) => format!("syntax error in {context}"),
            (None, None) => String::from("syntax error"),
        }
    }

    pub(crate) fn kind(&self) -> ParseErrorKind {
        self.cause
            .as_ref()
            .map(|c| c.kind)
            .unwrap_or(ParseErrorKind::Syntax)
    }
}

impl<I> nom::error::ParseError<I> for ParserError<I> {
    fn from_error_kind(input: I, _kind: nom::error::ErrorKind) -> Self {
        Self {
            input,
            context: None,
            cause: None,
        }
    }

    fn append(_input: I, _kind: nom::error::ErrorKind, other: Self) -> Self {
        other
    }

    fn or(self, other: Self) -> Self {
        if self.cause.is_some() && other.cause.is_none() {
            self
        } else {
            other
        }
    }
}

impl<I> nom::error::ContextError<I> for ParserError<I> {
    fn add_context(_input: I, context: &'static str, mut other: Self) -> Self {
        other.context.get_or_insert(context);
        other
    }
}

impl<I, E: Into<ParseErrorCause>> nom::error::FromExternalError<I, E> for ParserError<I> {
    fn from_external_error(input: I, _kind: nom::error::ErrorKind, e: E) -> Self {
        Self {
            input,
            context: None,
            cause: Some(e.into()),
        }
    }
}

/// A diagnosed parse failure: what went wrong, and which error category it belongs to
#[derive(Debug, PartialEq)]
pub(crate) struct ParseErrorCause {
    pub(crate) kind: ParseErrorKind,
    pub(crate) message: String,
}

impl ParseErrorCause {
    pub(crate) fn new(kind: ParseErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// A non-standard construct encountered while parsing in strict mode
    pub(crate) fn strict(what: &str) -> Self {
        Self::new(
            ParseErrorKind::Name,
            format!("{what} is not standard JSONPath syntax"),
        )
    }
}

impl From<IntegerError> for ParseErrorCause {
    fn from(e: IntegerError) -> Self {
        Self::new(ParseErrorKind::Index, e.to_string())
    }
}

impl From<FunctionValidationError> for ParseErrorCause {
    fn from(e: FunctionValidationError) -> Self {
        let kind = match e {
            FunctionValidationError::Undefined { .. } => ParseErrorKind::Name,
            _ => ParseErrorKind::Type,
        };
        Self::new(kind, e.to_string())
    }
}

impl From<NonSingularQueryError> for ParseErrorCause {
    fn from(e: NonSingularQueryError) -> Self {
        Self::new(
            ParseErrorKind::Type,
            format!("query is not comparable: {e}"),
        )
    }
}

impl From<serde_json::Error> for ParseErrorCause {
    fn from(e: serde_json::Error) -> Self {
        Self::new(ParseErrorKind::Syntax, e.to_string())
    }
}

impl From<std::num::ParseIntError> for ParseErrorCause {
    fn from(e: std::num::ParseIntError) -> Self {
        Self::new(ParseErrorKind::Syntax, e.to_string())
    }
}

impl From<std::string::FromUtf16Error> for ParseErrorCause {
    fn from(_: std::string::FromUtf16Error) -> Self {
        Self::new(ParseErrorKind::Syntax, "invalid surrogate pair")
    }
}

impl From<regex::Error> for ParseErrorCause {
    fn from(e: regex::Error) -> Self {
        Self::new(
            ParseErrorKind::Syntax,
            format!("invalid regular expression: {e}"),
        )
    }
}

/// Parse a complete, possibly compound, JSONPath expression
#[cfg_attr(feature = "trace", tracing::instrument(level = "trace", parent = None, ret, err))]
pub(crate) fn parse_path_main(
    input: &str,
    opts: ParserOptions,
) -> Result<(Query, Vec<(SetOp, Query)>), ParseError> {
    let result = if opts.strict {
        all_consuming(|i| parse_compound_path(i, opts))(input)
    } else {
        all_consuming(delimited(multispace0, |i| parse_compound_path(i, opts), multispace0))(
            input,
        )
    };
    match result {
        Ok((_, path)) => Ok(path),
        Err(nom::Err::Error(e) | nom::Err::Failure(e)) => Err(ParseError::from((input, e))),
        Err(nom::Err::Incomplete(_)) => unreachable!("we do not use streaming parsers"),
    }
}

#[cfg_attr(feature = "trace", tracing::instrument(level = "trace", parent = None, ret, err))]
fn parse_compound_path(input: &str, opts: ParserOptions) -> PResult<(Query, Vec<(SetOp, Query)>)> {
    let (mut rest, first) = parse_root_query(input, opts)?;
    let mut others = Vec::new();
    loop {
        let checkpoint = rest;
        let (i, _) = multispace0::<&str, ParserError<&str>>(rest)?;
        let Ok((i, op)) = parse_set_op(i) else {
            rest = checkpoint;
            break;
        };
        if opts.strict {
            return utils::strict_fail(i, "a compound path ('|' or '&')");
        }
        let (i, _) = multispace0::<&str, ParserError<&str>>(i)?;
        let (i, query) = parse_root_query(i, opts)?;
        others.push((op, query));
        rest = i;
    }
    Ok((rest, (first, others)))
}

fn parse_set_op(input: &str) -> PResult<SetOp> {
    use nom::branch::alt;
    use nom::character::complete::char;
    use nom::combinator::value;
    alt((
        value(SetOp::Union, char('|')),
        value(SetOp::Intersect, char('&')),
    ))(input)
}

/// Parse a query rooted at `$`, or in non-strict mode also a query with an implicit root
#[cfg_attr(feature = "trace", tracing::instrument(level = "trace", parent = None, ret, err))]
pub(crate) fn parse_root_query(input: &str, opts: ParserOptions) -> PResult<Query> {
    if let Some(rest) = input.strip_prefix('$') {
        let (rest, segments) = segment::parse_segments(rest, opts)?;
        return Ok((
            rest,
            Query {
                kind: QueryKind::Root,
                segments,
            },
        ));
    }
    if opts.strict {
        return utils::strict_fail(input, "a path without a leading root identifier ('$')");
    }
    if input.starts_with("..") {
        let (rest, segments) = segment::parse_segments(input, opts)?;
        return Ok((
            rest,
            Query {
                kind: QueryKind::Root,
                segments,
            },
        ));
    }
    let (rest, first) = segment::parse_bare_first_segment(input, opts)?;
    let (rest, mut segments) = segment::parse_segments(rest, opts)?;
    segments.insert(0, first);
    Ok((
        rest,
        Query {
            kind: QueryKind::Root,
            segments,
        },
    ))
}

#[cfg(test)]
mod tests {
    use crate::spec::query::{QueryKind, SetOp};
    use crate::spec::segment::Segment;
    use crate::spec::selector::{name::Name, Selector};

    use super::{parse_path_main, parse_root_query, ParserOptions};

    const LENIENT: ParserOptions = ParserOptions { strict: false };
    const STRICT: ParserOptions = ParserOptions { strict: true };

    #[test]
    fn root_path() {
        {
            let (_, p) = parse_root_query("$", LENIENT).unwrap();
            assert!(matches!(p.kind, QueryKind::Root));
        }
        {
            let (_, p) = parse_root_query("$.name", LENIENT).unwrap();
            assert_eq!(p.segments[0].segment.as_dot_name().unwrap(), "name");
        }
        {
            let (_, p) = parse_root_query("$.names['first_name']..*", LENIENT).unwrap();
            assert_eq!(p.segments[0].segment.as_dot_name().unwrap(), "names");
            let clh = p.segments[1].segment.as_long_hand().unwrap();
            assert!(matches!(&clh[0], Selector::Name(Name(s)) if s == "first_name"));
            assert!(matches!(p.segments[2].segment, Segment::Wildcard));
        }
    }

    #[test]
    fn implicit_root() {
        let (_, p) = parse_root_query("name.other", LENIENT).unwrap();
        assert_eq!(p.segments[0].segment.as_dot_name().unwrap(), "name");
        assert_eq!(p.segments[1].segment.as_dot_name().unwrap(), "other");
    }

    #[test]
    fn implicit_root_rejected_in_strict_mode() {
        let err = parse_path_main("name.other", STRICT).unwrap_err();
        assert_eq!(err.kind(), crate::ParseErrorKind::Name);
    }

    #[test]
    fn no_tail() {
        assert!(parse_path_main("$.a['b']tail", LENIENT).is_err());
    }

    #[test]
    fn compound_paths() {
        let (first, rest) = parse_path_main("$.a | $.b & $.c", LENIENT).unwrap();
        assert_eq!(first.segments.len(), 1);
        assert_eq!(rest.len(), 2);
        assert!(matches!(rest[0].0, SetOp::Union));
        assert!(matches!(rest[1].0, SetOp::Intersect));
    }

    #[test]
    fn compound_paths_rejected_in_strict_mode() {
        let err = parse_path_main("$.a | $.b", STRICT).unwrap_err();
        assert_eq!(err.kind(), crate::ParseErrorKind::Name);
    }
}

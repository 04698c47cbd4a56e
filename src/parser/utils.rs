use nom::combinator::not;
use nom::sequence::terminated;
use nom::{bytes::complete::tag, character::complete::satisfy, error::ParseError, IResult, Parser};

use super::{ParseErrorCause, ParserError, PResult};

/// Prevent a `cut` parser from poisoning an alt branch
pub(crate) fn uncut<I, O, E: ParseError<I>, F: Parser<I, O, E>>(
    mut parser: F,
) -> impl FnMut(I) -> IResult<I, O, E> {
    move |input: I| match parser.parse(input) {
        Err(nom::Err::Failure(e)) => Err(nom::Err::Error(e)),
        rest => rest,
    }
}

/// Fail the parse because a non-standard construct was used in strict mode
pub(crate) fn strict_fail<'a, O>(input: &'a str, what: &'static str) -> PResult<'a, O> {
    Err(nom::Err::Failure(ParserError {
        input,
        context: None,
        cause: Some(ParseErrorCause::strict(what)),
    }))
}

pub(crate) fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c >= '\u{0080}'
}

/// Match a keyword operator, requiring a non-name character (or end of input) after it
pub(crate) fn keyword<'a>(kw: &'static str) -> impl FnMut(&'a str) -> PResult<'a, &'a str> {
    terminated(tag(kw), not(satisfy(is_name_char)))
}

use nom::branch::alt;
use nom::bytes::complete::tag;
use nom::combinator::value;

use super::utils::strict_fail;
use super::{ParserOptions, PResult};

pub(crate) mod int;
pub(crate) mod number;
pub(crate) mod string;

pub(crate) fn parse_bool(input: &str, opts: ParserOptions) -> PResult<bool> {
    if opts.strict {
        alt((value(true, tag("true")), value(false, tag("false"))))(input)
    } else {
        alt((
            value(true, alt((tag("true"), tag("True")))),
            value(false, alt((tag("false"), tag("False")))),
        ))(input)
    }
}

pub(crate) fn parse_null(input: &str, opts: ParserOptions) -> PResult<&str> {
    if opts.strict {
        tag("null")(input)
    } else {
        alt((
            tag("null"),
            tag("Null"),
            tag("nil"),
            tag("Nil"),
            tag("none"),
            tag("None"),
        ))(input)
    }
}

/// The non-standard `undefined` literal, equal only to the absence of a value
pub(crate) fn parse_undefined(input: &str, opts: ParserOptions) -> PResult<&str> {
    let (rest, token) = alt((tag("undefined"), tag("missing")))(input)?;
    if opts.strict {
        return strict_fail(input, "the undefined literal");
    }
    Ok((rest, token))
}

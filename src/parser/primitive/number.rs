use std::str::FromStr;

use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::{char, digit0, digit1, one_of},
    combinator::{map_res, opt, recognize},
    sequence::{pair, preceded, tuple},
};
use serde_json::Number;

use crate::parser::PResult;

use super::int::parse_int_string;

/// Recognize the fractional and exponent tails of a JSON number, e.g. `.25e-3`
///
/// Both parts are optional, so this also matches the empty tail of a plain integer.
#[cfg_attr(feature = "trace", tracing::instrument(level = "trace", parent = None, ret, err))]
fn parse_number_tail(input: &str) -> PResult<&str> {
    recognize(pair(
        opt(preceded(char('.'), digit1)),
        opt(tuple((one_of("eE"), opt(one_of("+-")), digit0))),
    ))(input)
}

/// Parse a JSON number literal, as used in filter expressions
///
/// The integer part follows the same no-leading-zeros rule as index selectors, with `-0`
/// additionally allowed here.
#[cfg_attr(feature = "trace", tracing::instrument(level = "trace", parent = None, ret, err))]
pub(crate) fn parse_number(input: &str) -> PResult<Number> {
    map_res(
        recognize(pair(
            alt((parse_int_string, tag("-0"))),
            parse_number_tail,
        )),
        Number::from_str,
    )(input)
}

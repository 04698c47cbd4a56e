use nom::character::complete::char;
use nom::{
    branch::alt,
    bytes::complete::{tag, take_while_m_n},
    character::complete::digit0,
    combinator::{map_res, opt, recognize},
    sequence::tuple,
};

use crate::parser::PResult;
use crate::spec::integer::Integer;

#[cfg_attr(feature = "trace", tracing::instrument(level = "trace", parent = None, ret, err))]
fn parse_zero(input: &str) -> PResult<&str> {
    tag("0")(input)
}

fn is_non_zero_digit(chr: char) -> bool {
    ('1'..='9').contains(&chr)
}

#[cfg_attr(feature = "trace", tracing::instrument(level = "trace", parent = None, ret, err))]
fn parse_non_zero_first_digit(input: &str) -> PResult<&str> {
    take_while_m_n(1, 1, is_non_zero_digit)(input)
}

/// Recognize an integer without leading `0`'s, e.g., `0123` stops after the `0`
#[cfg_attr(feature = "trace", tracing::instrument(level = "trace", parent = None, ret, err))]
fn parse_non_zero_int(input: &str) -> PResult<&str> {
    recognize(tuple((opt(char('-')), parse_non_zero_first_digit, digit0)))(input)
}

#[cfg_attr(feature = "trace", tracing::instrument(level = "trace", parent = None, ret, err))]
pub(crate) fn parse_int_string(input: &str) -> PResult<&str> {
    alt((parse_zero, parse_non_zero_int))(input)
}

/// Parse an integer within the interoperable range; values outside it are an error
#[cfg_attr(feature = "trace", tracing::instrument(level = "trace", parent = None, ret, err))]
pub(crate) fn parse_int(input: &str) -> PResult<i64> {
    map_res(parse_int_string, |i_str| {
        i_str.parse::<Integer>().map(|i| i.as_i64())
    })(input)
}

#[cfg(test)]
mod tests {
    use super::parse_int;

    #[test]
    fn parse_integers() {
        assert_eq!(parse_int("0"), Ok(("", 0)));
        assert_eq!(parse_int("10"), Ok(("", 10)));
        assert_eq!(parse_int("-10"), Ok(("", -10)));
        // Leading zeros are not consumed; higher level parsers fail on the remainder.
        assert_eq!(parse_int("010"), Ok(("10", 0)));
    }

    #[test]
    fn out_of_range_integers() {
        assert!(parse_int("9007199254740991").is_ok());
        assert!(parse_int("9007199254740992").is_err());
    }
}

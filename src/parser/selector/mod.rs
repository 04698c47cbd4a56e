use nom::branch::alt;
use nom::character::complete::{char, multispace0};
use nom::combinator::map;
use nom::error::context;

use crate::spec::selector::filter::SingularQuery;
use crate::spec::selector::{index::Index, name::Name, Selector};

use self::filter::{parse_filter, parse_filter_query};
use self::slice::parse_array_slice;

use super::primitive::int::parse_int;
use super::primitive::string::parse_string_literal;
use super::utils::{strict_fail, uncut};
use super::{ParserOptions, PResult};

pub(crate) mod filter;
pub(crate) mod function;
pub(crate) mod slice;

#[cfg_attr(feature = "trace", tracing::instrument(level = "trace", parent = None, ret, err))]
pub(crate) fn parse_wildcard_selector(input: &str) -> PResult<Selector> {
    map(char('*'), |_| Selector::Wildcard)(input)
}

#[cfg_attr(feature = "trace", tracing::instrument(level = "trace", parent = None, ret, err))]
pub(crate) fn parse_name(input: &str) -> PResult<Name> {
    map(parse_string_literal, Name)(input)
}

fn parse_name_selector(input: &str) -> PResult<Selector> {
    map(parse_name, Selector::Name)(input)
}

fn parse_index_selector(input: &str) -> PResult<Selector> {
    map(parse_int, |i| Selector::Index(Index(i)))(input)
}

fn parse_array_slice_selector(input: &str) -> PResult<Selector> {
    map(parse_array_slice, Selector::ArraySlice)(input)
}

fn parse_filter_selector(input: &str, opts: ParserOptions) -> PResult<Selector> {
    map(|i| parse_filter(i, opts), Selector::Filter)(input)
}

/// The non-standard keys (`~`) and keys filter (`~?`) selectors
fn parse_keys_selector(input: &str, opts: ParserOptions) -> PResult<Selector> {
    let (rest, _) = char('~')(input)?;
    if opts.strict {
        return strict_fail(input, "the keys selector ('~')");
    }
    let (after_ws, _) = multispace0::<&str, _>(rest)?;
    if after_ws.starts_with('?') {
        let (rest, filter) = parse_filter(after_ws, opts)?;
        return Ok((rest, Selector::KeysFilter(filter)));
    }
    Ok((rest, Selector::Keys))
}

/// The non-standard embedded singular query selector, e.g. `$.store[@.pick]`
fn parse_embedded_query_selector(input: &str, opts: ParserOptions) -> PResult<Selector> {
    let (rest, query) = parse_filter_query(input, opts)?;
    if opts.strict {
        return strict_fail(input, "an embedded query selector");
    }
    match SingularQuery::try_from(query) {
        Ok(sq) => Ok((rest, Selector::Embedded(sq))),
        Err(e) => Err(nom::Err::Error(super::ParserError {
            input,
            context: None,
            cause: Some(e.into()),
        })),
    }
}

#[cfg_attr(feature = "trace", tracing::instrument(level = "trace", parent = None, ret, err))]
pub(crate) fn parse_selector(input: &str, opts: ParserOptions) -> PResult<Selector> {
    context(
        "selector",
        alt((
            parse_wildcard_selector,
            parse_name_selector,
            parse_array_slice_selector,
            parse_index_selector,
            |i| parse_filter_selector(i, opts),
            |i| parse_keys_selector(i, opts),
            |i| uncut(|i2| parse_embedded_query_selector(i2, opts))(i),
        )),
    )(input)
}

#[cfg(test)]
mod tests {
    use crate::spec::selector::{name::Name, slice::Slice, Selector};

    use super::{parse_selector, parse_wildcard_selector, Index, ParserOptions};

    const LENIENT: ParserOptions = ParserOptions { strict: false };

    #[test]
    fn wildcard() {
        assert!(matches!(
            parse_wildcard_selector("*"),
            Ok(("", Selector::Wildcard))
        ));
    }

    #[test]
    fn all_selectors() {
        {
            let (_, s) = parse_selector("0", LENIENT).unwrap();
            assert_eq!(s, Selector::Index(Index(0)));
        }
        {
            let (_, s) = parse_selector("10", LENIENT).unwrap();
            assert_eq!(s, Selector::Index(Index(10)));
        }
        {
            let (_, s) = parse_selector("'name'", LENIENT).unwrap();
            assert_eq!(s, Selector::Name(Name(String::from("name"))));
        }
        {
            let (_, s) = parse_selector("\"name\"", LENIENT).unwrap();
            assert_eq!(s, Selector::Name(Name(String::from("name"))));
        }
        {
            let (_, s) = parse_selector("0:3", LENIENT).unwrap();
            assert_eq!(
                s,
                Selector::ArraySlice(Slice::new().with_start(0).with_end(3))
            );
        }
        {
            let (_, s) = parse_selector("~", LENIENT).unwrap();
            assert_eq!(s, Selector::Keys);
        }
    }

    #[test]
    fn embedded_queries() {
        let (_, s) = parse_selector("@.foo.bar", LENIENT).unwrap();
        assert!(matches!(s, Selector::Embedded(_)));
        let (_, s) = parse_selector("$.foo[0]", LENIENT).unwrap();
        assert!(matches!(s, Selector::Embedded(_)));
    }
}

use nom::bytes::complete::tag;
use nom::character::complete::{char, multispace0, satisfy};
use nom::combinator::{cut, map, not, peek};
use nom::error::context;
use nom::multi::many0;
use nom::sequence::terminated;
use nom::{
    branch::alt,
    bytes::complete::take_while1,
    character::complete::{alpha1, digit1},
    combinator::recognize,
    multi::{fold_many0, separated_list1},
    sequence::{delimited, pair, preceded},
};

use crate::spec::segment::{QuerySegment, QuerySegmentKind, Segment};
use crate::spec::selector::{index::Index, Selector};

use super::primitive::int::parse_int;
use super::selector::parse_selector;
use super::utils::{is_name_char, strict_fail};
use super::{ParserOptions, PResult};

/// Zero or more segments, each optionally preceded by whitespace
pub(crate) fn parse_segments(input: &str, opts: ParserOptions) -> PResult<Vec<QuerySegment>> {
    many0(preceded(multispace0, |i| parse_segment(i, opts)))(input)
}

fn is_non_ascii_unicode(chr: char) -> bool {
    chr >= '\u{0080}'
}

fn parse_non_ascii_unicode(input: &str) -> PResult<&str> {
    take_while1(is_non_ascii_unicode)(input)
}

fn parse_name_first(input: &str) -> PResult<&str> {
    alt((alpha1, recognize(char('_')), parse_non_ascii_unicode))(input)
}

fn parse_name_char(input: &str, opts: ParserOptions) -> PResult<&str> {
    if opts.strict {
        alt((digit1, parse_name_first))(input)
    } else {
        // the lenient grammar also permits dashes within names
        alt((digit1, parse_name_first, recognize(char('-'))))(input)
    }
}

pub(crate) fn parse_dot_member_name(input: &str, opts: ParserOptions) -> PResult<String> {
    map(
        recognize(pair(parse_name_first, |i| {
            fold_many0(
                |i| parse_name_char(i, opts),
                String::new,
                |mut s: String, item| {
                    s.push_str(item);
                    s
                },
            )(i)
        })),
        |s| s.to_string(),
    )(input)
}

fn parse_dot_member_name_shorthand(input: &str, opts: ParserOptions) -> PResult<Segment> {
    let (rest, _) = char('.')(input)?;
    let rest = if opts.strict {
        rest
    } else {
        // flexible whitespace between the dot and the name
        multispace0::<&str, _>(rest)?.0
    };
    map(|i| parse_dot_member_name(i, opts), Segment::DotName)(rest)
}

fn parse_multi_selector(input: &str, opts: ParserOptions) -> PResult<Vec<Selector>> {
    separated_list1(delimited(multispace0, char(','), multispace0), |i| {
        parse_selector(i, opts)
    })(input)
}

fn parse_child_long_hand(input: &str, opts: ParserOptions) -> PResult<Segment> {
    context(
        "child long-hand segment",
        preceded(
            pair(char('['), multispace0),
            cut(terminated(
                map(|i| parse_multi_selector(i, opts), Segment::LongHand),
                pair(multispace0, char(']')),
            )),
        ),
    )(input)
}

fn parse_dot_wildcard_shorthand(input: &str, opts: ParserOptions) -> PResult<Segment> {
    let (rest, _) = char('.')(input)?;
    let rest = if opts.strict {
        rest
    } else {
        multispace0::<&str, _>(rest)?.0
    };
    map(char('*'), |_| Segment::Wildcard)(rest)
}

/// The non-standard `.~` keys shorthand
fn parse_dot_keys_shorthand(input: &str, opts: ParserOptions) -> PResult<Segment> {
    let (rest, _) = char('.')(input)?;
    let (rest, _) = multispace0::<&str, _>(rest)?;
    let (rest, _) = char('~')(rest)?;
    if opts.strict {
        return strict_fail(input, "the keys selector ('~')");
    }
    Ok((rest, Segment::LongHand(vec![Selector::Keys])))
}

/// The non-standard `.0` index shorthand
fn parse_dot_index_shorthand(input: &str, opts: ParserOptions) -> PResult<Segment> {
    if opts.strict {
        return Err(nom::Err::Error(super::ParserError {
            input,
            context: None,
            cause: None,
        }));
    }
    let (rest, _) = char('.')(input)?;
    let (rest, _) = multispace0::<&str, _>(rest)?;
    let (rest, index) = terminated(parse_int, not(peek(satisfy(is_name_char))))(rest)?;
    Ok((
        rest,
        Segment::LongHand(vec![Selector::Index(Index(index))]),
    ))
}

fn parse_child_segment(input: &str, opts: ParserOptions) -> PResult<Segment> {
    alt((
        |i| parse_dot_wildcard_shorthand(i, opts),
        |i| parse_dot_keys_shorthand(i, opts),
        |i| parse_dot_member_name_shorthand(i, opts),
        |i| parse_dot_index_shorthand(i, opts),
        |i| parse_child_long_hand(i, opts),
    ))(input)
}

fn parse_descendant_keys_shorthand(input: &str, opts: ParserOptions) -> PResult<Segment> {
    let (rest, _) = char('~')(input)?;
    if opts.strict {
        strict_fail(input, "the keys selector ('~')")
    } else {
        Ok((rest, Segment::LongHand(vec![Selector::Keys])))
    }
}

fn parse_descendant_segment(input: &str, opts: ParserOptions) -> PResult<Segment> {
    preceded(
        tag(".."),
        alt((
            map(char('*'), |_| Segment::Wildcard),
            |i| parse_descendant_keys_shorthand(i, opts),
            map(|i| parse_dot_member_name(i, opts), Segment::DotName),
            |i| parse_child_segment(i, opts),
        )),
    )(input)
}

pub(crate) fn parse_segment(input: &str, opts: ParserOptions) -> PResult<QuerySegment> {
    alt((
        map(
            |i| parse_descendant_segment(i, opts),
            |inner| QuerySegment {
                kind: QuerySegmentKind::Descendant,
                segment: inner,
            },
        ),
        map(
            |i| parse_child_segment(i, opts),
            |inner| QuerySegment {
                kind: QuerySegmentKind::Child,
                segment: inner,
            },
        ),
    ))(input)
}

/// The first segment of a path with an implicit root, or of a filter-context query: a bare
/// member name, wildcard, or bracketed segment with no leading dot
pub(crate) fn parse_bare_first_segment(
    input: &str,
    opts: ParserOptions,
) -> PResult<QuerySegment> {
    map(
        alt((
            |i| parse_child_long_hand(i, opts),
            map(char('*'), |_| Segment::Wildcard),
            map(|i| parse_dot_member_name(i, opts), Segment::DotName),
        )),
        |segment| QuerySegment {
            kind: QuerySegmentKind::Child,
            segment,
        },
    )(input)
}

#[cfg(test)]
mod tests {
    use crate::spec::segment::Segment;
    use crate::spec::selector::{index::Index, name::Name, slice::Slice, Selector};

    use super::{
        parse_child_long_hand, parse_child_segment, parse_descendant_segment,
        parse_dot_member_name_shorthand, ParserOptions,
    };
    use nom::combinator::all_consuming;

    const LENIENT: ParserOptions = ParserOptions { strict: false };
    const STRICT: ParserOptions = ParserOptions { strict: true };

    #[test]
    fn dot_member_names() {
        assert!(matches!(
            parse_dot_member_name_shorthand(".name", STRICT),
            Ok(("", Segment::DotName(s))) if s == "name",
        ));
        assert!(matches!(
            parse_dot_member_name_shorthand(".foo_bar", STRICT),
            Ok(("", Segment::DotName(s))) if s == "foo_bar",
        ));
        assert!(parse_dot_member_name_shorthand(". space", STRICT).is_err());
        assert!(matches!(
            parse_dot_member_name_shorthand(". space", LENIENT),
            Ok(("", Segment::DotName(s))) if s == "space",
        ));
        assert!(
            all_consuming(|i| parse_dot_member_name_shorthand(i, STRICT))(".no-dash").is_err()
        );
        assert!(parse_dot_member_name_shorthand(".1no_num_1st", STRICT).is_err());
    }

    #[test]
    fn child_long_hand() {
        {
            let (_, sk) = parse_child_long_hand(r#"["name"]"#, STRICT).unwrap();
            let s = sk.as_long_hand().unwrap();
            assert_eq!(s[0], Selector::Name(Name::from("name")));
        }
        {
            let (_, sk) = parse_child_long_hand(r#"['name']"#, STRICT).unwrap();
            let s = sk.as_long_hand().unwrap();
            assert_eq!(s[0], Selector::Name(Name::from("name")));
        }
        {
            let (_, sk) = parse_child_long_hand(r#"["name","test"]"#, STRICT).unwrap();
            let s = sk.as_long_hand().unwrap();
            assert_eq!(s[0], Selector::Name(Name::from("name")));
            assert_eq!(s[1], Selector::Name(Name::from("test")));
        }
        {
            let (_, sk) = parse_child_long_hand(r#"['name',10,0:3]"#, STRICT).unwrap();
            let s = sk.as_long_hand().unwrap();
            assert_eq!(s[0], Selector::Name(Name::from("name")));
            assert_eq!(s[1], Selector::Index(Index(10)));
            assert_eq!(
                s[2],
                Selector::ArraySlice(Slice::new().with_start(0).with_end(3))
            );
        }
        {
            let (_, sk) = parse_child_long_hand(r#"[::,*]"#, STRICT).unwrap();
            let s = sk.as_long_hand().unwrap();
            assert_eq!(s[0], Selector::ArraySlice(Slice::new()));
            assert_eq!(s[1], Selector::Wildcard);
        }
        {
            assert!(parse_child_long_hand("[010]", STRICT).is_err());
        }
    }

    #[test]
    fn child_segment() {
        {
            let (_, sk) = parse_child_segment(".name", STRICT).unwrap();
            assert_eq!(sk.as_dot_name(), Some("name"));
        }
        {
            let (_, sk) = parse_child_segment(".*", STRICT).unwrap();
            assert!(matches!(sk, Segment::Wildcard));
        }
        {
            let (_, sk) = parse_child_segment("[*]", STRICT).unwrap();
            let s = sk.as_long_hand().unwrap();
            assert_eq!(s[0], Selector::Wildcard);
        }
        {
            let (_, sk) = parse_child_segment(".~", LENIENT).unwrap();
            let s = sk.as_long_hand().unwrap();
            assert_eq!(s[0], Selector::Keys);
        }
        {
            let (_, sk) = parse_child_segment(".1", LENIENT).unwrap();
            let s = sk.as_long_hand().unwrap();
            assert_eq!(s[0], Selector::Index(Index(1)));
        }
    }

    #[test]
    fn descendant_segment() {
        {
            let (_, sk) = parse_descendant_segment("..['name']", STRICT).unwrap();
            let s = sk.as_long_hand().unwrap();
            assert_eq!(s[0], Selector::Name(Name::from("name")));
        }
        {
            let (_, sk) = parse_descendant_segment("..name", STRICT).unwrap();
            assert_eq!(sk.as_dot_name().unwrap(), "name");
        }
        {
            let (_, sk) = parse_descendant_segment("...name", STRICT).unwrap();
            assert_eq!(sk.as_dot_name().unwrap(), "name");
        }
        {
            let (_, sk) = parse_descendant_segment("..*", STRICT).unwrap();
            assert!(matches!(sk, Segment::Wildcard));
        }
        {
            let (_, sk) = parse_descendant_segment("..~", LENIENT).unwrap();
            let s = sk.as_long_hand().unwrap();
            assert_eq!(s[0], Selector::Keys);
        }
    }
}

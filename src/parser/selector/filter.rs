use nom::bytes::complete::{is_not, tag, take_while};
use nom::character::complete::{anychar, char, multispace0};
use nom::combinator::{map, map_res, value};
use nom::multi::{many0, separated_list1};
use nom::sequence::{delimited, pair, preceded, separated_pair};
use nom::branch::alt;

use crate::parser::primitive::number::parse_number;
use crate::parser::primitive::string::parse_string_literal;
use crate::parser::primitive::{parse_bool, parse_null, parse_undefined};
use crate::parser::segment::{parse_bare_first_segment, parse_segments};
use crate::parser::utils::{keyword, strict_fail, uncut};
use crate::parser::{ParseErrorCause, ParserError, ParserOptions, PResult};
use crate::spec::functions::{FunctionArgType, FunctionValidationError};
use crate::spec::pattern::{compile_literal, FilterRegex};
use crate::spec::query::{Query, QueryKind};
use crate::spec::selector::filter::{
    BasicExpr, Comparable, ComparisonExpr, ComparisonOperator, ExistExpr, Filter, Literal,
    LogicalAndExpr, LogicalOrExpr, RegexMatchExpr, SingularQuery,
};

use super::function::parse_function_expr;

#[cfg_attr(feature = "trace", tracing::instrument(level = "trace", parent = None, ret, err))]
pub(crate) fn parse_filter(input: &str, opts: ParserOptions) -> PResult<Filter> {
    map(
        preceded(pair(char('?'), multispace0), |i| {
            parse_logical_or_expr(i, opts)
        }),
        Filter,
    )(input)
}

/// A query rooted at `$`, `@`, or (non-standard) the filter context `#`
#[cfg_attr(feature = "trace", tracing::instrument(level = "trace", parent = None, ret, err))]
pub(crate) fn parse_filter_query(input: &str, opts: ParserOptions) -> PResult<Query> {
    let (rest, kind) = alt((
        value(QueryKind::Root, char('$')),
        value(QueryKind::Current, char('@')),
        value(QueryKind::FilterContext, char('#')),
    ))(input)?;
    if matches!(kind, QueryKind::FilterContext) {
        if opts.strict {
            return strict_fail(input, "the filter context query ('#')");
        }
        // `#name` addresses into the context mapping directly; a bare `#` is the
        // current key and is handled elsewhere
        if let Ok((rest, first)) = parse_bare_first_segment(rest, opts) {
            let (rest, mut segments) = parse_segments(rest, opts)?;
            segments.insert(0, first);
            return Ok((rest, Query { kind, segments }));
        }
        let (rest, segments) = parse_segments(rest, opts)?;
        if segments.is_empty() {
            return Err(nom::Err::Error(ParserError {
                input,
                context: None,
                cause: None,
            }));
        }
        return Ok((rest, Query { kind, segments }));
    }
    let (rest, segments) = parse_segments(rest, opts)?;
    Ok((rest, Query { kind, segments }))
}

fn parse_or_op(input: &str, opts: ParserOptions) -> PResult<&str> {
    if opts.strict {
        tag("||")(input)
    } else {
        alt((tag("||"), keyword("or")))(input)
    }
}

fn parse_and_op(input: &str, opts: ParserOptions) -> PResult<&str> {
    if opts.strict {
        tag("&&")(input)
    } else {
        alt((tag("&&"), keyword("and")))(input)
    }
}

fn parse_not_op(input: &str, opts: ParserOptions) -> PResult<&str> {
    if opts.strict {
        tag("!")(input)
    } else {
        alt((tag("!"), keyword("not")))(input)
    }
}

#[cfg_attr(feature = "trace", tracing::instrument(level = "trace", parent = None, ret, err))]
fn parse_logical_and(input: &str, opts: ParserOptions) -> PResult<LogicalAndExpr> {
    map(
        separated_list1(
            delimited(multispace0, |i| parse_and_op(i, opts), multispace0),
            |i| parse_basic_expr(i, opts),
        ),
        LogicalAndExpr,
    )(input)
}

#[cfg_attr(feature = "trace", tracing::instrument(level = "trace", parent = None, ret, err))]
pub(crate) fn parse_logical_or_expr(input: &str, opts: ParserOptions) -> PResult<LogicalOrExpr> {
    map(
        separated_list1(
            delimited(multispace0, |i| parse_or_op(i, opts), multispace0),
            |i| parse_logical_and(i, opts),
        ),
        LogicalOrExpr,
    )(input)
}

#[cfg_attr(feature = "trace", tracing::instrument(level = "trace", parent = None, ret, err))]
fn parse_exist_expr_inner(input: &str, opts: ParserOptions) -> PResult<ExistExpr> {
    let (rest, query) = parse_filter_query(input, opts)?;
    if opts.strict {
        // A query followed by a comparison operator is a comparison operand, not an
        // existence test. Reaching this branch means the comparison failed to parse:
        // report a type error if this query is the reason, otherwise step aside so the
        // comparison branch's own error surfaces.
        let (after_ws, _) = multispace0::<&str, _>(rest)?;
        if ["==", "!=", "<", ">"].iter().any(|op| after_ws.starts_with(op)) {
            if SingularQuery::try_from(query).is_err() {
                return Err(nom::Err::Failure(ParserError {
                    input,
                    context: None,
                    cause: Some(ParseErrorCause::new(
                        crate::error::ParseErrorKind::Type,
                        "non-singular query is not comparable",
                    )),
                }));
            }
            return Err(nom::Err::Error(ParserError {
                input,
                context: None,
                cause: None,
            }));
        }
    }
    Ok((rest, ExistExpr(query)))
}

fn parse_exist_expr(input: &str, opts: ParserOptions) -> PResult<BasicExpr> {
    map(|i| parse_exist_expr_inner(i, opts), BasicExpr::Exist)(input)
}

fn parse_not_exist_expr(input: &str, opts: ParserOptions) -> PResult<BasicExpr> {
    map(
        preceded(pair(|i| parse_not_op(i, opts), multispace0), |i| {
            parse_exist_expr_inner(i, opts)
        }),
        BasicExpr::NotExist,
    )(input)
}

fn parse_func_expr_inner(
    input: &str,
    opts: ParserOptions,
) -> PResult<crate::spec::functions::FunctionExpr> {
    map_res(
        |i| parse_function_expr(i, opts),
        |fe| match fe.return_type {
            FunctionArgType::Logical | FunctionArgType::Nodelist => Ok(fe),
            _ => Err(FunctionValidationError::IncorrectFunctionReturnType),
        },
    )(input)
}

fn parse_func_expr(input: &str, opts: ParserOptions) -> PResult<BasicExpr> {
    map(|i| parse_func_expr_inner(i, opts), BasicExpr::FuncExpr)(input)
}

fn parse_not_func_expr(input: &str, opts: ParserOptions) -> PResult<BasicExpr> {
    map(
        preceded(pair(|i| parse_not_op(i, opts), multispace0), |i| {
            parse_func_expr_inner(i, opts)
        }),
        BasicExpr::NotFuncExpr,
    )(input)
}

fn parse_paren_expr_inner(input: &str, opts: ParserOptions) -> PResult<LogicalOrExpr> {
    delimited(
        pair(char('('), multispace0),
        |i| parse_logical_or_expr(i, opts),
        pair(multispace0, char(')')),
    )(input)
}

fn parse_paren_expr(input: &str, opts: ParserOptions) -> PResult<BasicExpr> {
    map(|i| parse_paren_expr_inner(i, opts), BasicExpr::Paren)(input)
}

fn parse_not_paren_expr(input: &str, opts: ParserOptions) -> PResult<BasicExpr> {
    map(
        preceded(pair(|i| parse_not_op(i, opts), multispace0), |i| {
            parse_paren_expr_inner(i, opts)
        }),
        BasicExpr::NotParen,
    )(input)
}

fn parse_literal_basic_expr(input: &str, opts: ParserOptions) -> PResult<BasicExpr> {
    if opts.strict {
        return Err(nom::Err::Error(ParserError {
            input,
            context: None,
            cause: None,
        }));
    }
    map(|i| parse_literal(i, opts), BasicExpr::Literal)(input)
}

#[cfg_attr(feature = "trace", tracing::instrument(level = "trace", parent = None, ret, err))]
fn parse_basic_expr(input: &str, opts: ParserOptions) -> PResult<BasicExpr> {
    alt((
        |i| parse_not_paren_expr(i, opts),
        |i| parse_paren_expr(i, opts),
        |i| map(|i2| parse_comp_expr(i2, opts), BasicExpr::Relation)(i),
        |i| map(|i2| parse_regex_match_expr(i2, opts), BasicExpr::RegexMatch)(i),
        |i| parse_not_exist_expr(i, opts),
        |i| parse_exist_expr(i, opts),
        |i| parse_not_func_expr(i, opts),
        |i| parse_func_expr(i, opts),
        |i| parse_literal_basic_expr(i, opts),
    ))(input)
}

#[cfg_attr(feature = "trace", tracing::instrument(level = "trace", parent = None, ret, err))]
fn parse_comp_expr(input: &str, opts: ParserOptions) -> PResult<ComparisonExpr> {
    map(
        separated_pair(
            |i| parse_comparable(i, opts),
            multispace0,
            separated_pair(
                |i| parse_comparison_operator(i, opts),
                multispace0,
                |i| parse_comparable(i, opts),
            ),
        ),
        |(left, (op, right))| ComparisonExpr { left, op, right },
    )(input)
}

#[cfg_attr(feature = "trace", tracing::instrument(level = "trace", parent = None, ret, err))]
fn parse_comparison_operator(input: &str, opts: ParserOptions) -> PResult<ComparisonOperator> {
    if let Ok((rest, op)) = alt((
        value(ComparisonOperator::EqualTo, tag::<_, _, ParserError<&str>>("==")),
        value(ComparisonOperator::NotEqualTo, tag("!=")),
        value(ComparisonOperator::LessThanEqualTo, tag("<=")),
        value(ComparisonOperator::GreaterThanEqualTo, tag(">=")),
    ))(input)
    {
        return Ok((rest, op));
    }
    if let Ok((rest, _)) = tag::<_, _, ParserError<&str>>("<>")(input) {
        if opts.strict {
            return strict_fail(input, "the '<>' operator");
        }
        return Ok((rest, ComparisonOperator::NotEqualTo));
    }
    if let Ok((rest, op)) = alt((
        value(ComparisonOperator::LessThan, char::<_, ParserError<&str>>('<')),
        value(ComparisonOperator::GreaterThan, char('>')),
    ))(input)
    {
        return Ok((rest, op));
    }
    if let Ok((rest, _)) = keyword("in")(input) {
        if opts.strict {
            return strict_fail(input, "the 'in' operator");
        }
        return Ok((rest, ComparisonOperator::In));
    }
    if let Ok((rest, _)) = keyword("contains")(input) {
        if opts.strict {
            return strict_fail(input, "the 'contains' operator");
        }
        return Ok((rest, ComparisonOperator::Contains));
    }
    Err(nom::Err::Error(ParserError {
        input,
        context: None,
        cause: None,
    }))
}

#[cfg_attr(feature = "trace", tracing::instrument(level = "trace", parent = None, ret, err))]
fn parse_regex_match_expr(input: &str, opts: ParserOptions) -> PResult<RegexMatchExpr> {
    let (rest, left) = parse_comparable(input, opts)?;
    let (rest, _) = multispace0::<&str, _>(rest)?;
    let op_input = rest;
    let (rest, _) = tag("=~")(rest)?;
    if opts.strict {
        return strict_fail(op_input, "the regex match operator ('=~')");
    }
    let (rest, _) = multispace0::<&str, _>(rest)?;
    let (rest, regex) = parse_regex_literal(rest)?;
    Ok((rest, RegexMatchExpr { left, regex }))
}

/// A regex literal, e.g. `/ab?c/i`
fn parse_regex_literal(input: &str) -> PResult<FilterRegex> {
    let (rest, pattern) = delimited(
        char('/'),
        nom::combinator::recognize(many0(alt((
            value((), is_not("\\/")),
            value((), pair(char('\\'), anychar)),
        )))),
        char('/'),
    )(input)?;
    let (rest, flags) = take_while(|c: char| c.is_ascii_lowercase())(rest)?;
    match compile_literal(pattern, flags) {
        Ok(regex) => Ok((rest, regex)),
        Err(e) => Err(nom::Err::Failure(ParserError {
            input,
            context: None,
            cause: Some(e.into()),
        })),
    }
}

#[cfg_attr(feature = "trace", tracing::instrument(level = "trace", parent = None, ret, err))]
pub(crate) fn parse_literal(input: &str, opts: ParserOptions) -> PResult<Literal> {
    alt((
        map(parse_string_literal, Literal::String),
        map(parse_number, Literal::Number),
        |i| map(|i2| parse_bool(i2, opts), Literal::Bool)(i),
        |i| value(Literal::Null, |i2| parse_null(i2, opts))(i),
        |i| value(Literal::Undefined, |i2| parse_undefined(i2, opts))(i),
    ))(input)
}

fn parse_literal_comparable(input: &str, opts: ParserOptions) -> PResult<Comparable> {
    map(|i| parse_literal(i, opts), Comparable::Literal)(input)
}

/// A query used as a comparison operand
///
/// In strict mode only singular queries are comparable; the lenient grammar accepts any
/// query and resolves it to a value at evaluation time.
fn parse_query_comparable(input: &str, opts: ParserOptions) -> PResult<Comparable> {
    let (rest, query) = parse_filter_query(input, opts)?;
    match SingularQuery::try_from(query.clone()) {
        Ok(sq) => Ok((rest, Comparable::SingularQuery(sq))),
        Err(e) if opts.strict => Err(nom::Err::Error(ParserError {
            input,
            context: None,
            cause: Some(e.into()),
        })),
        Err(_) => Ok((rest, Comparable::Query(Box::new(query)))),
    }
}

/// A singular query in a position that requires one, e.g. a `ValueType` function argument
#[cfg_attr(feature = "trace", tracing::instrument(level = "trace", parent = None, ret, err))]
pub(crate) fn parse_singular_query(input: &str, opts: ParserOptions) -> PResult<SingularQuery> {
    map_res(|i| parse_filter_query(i, opts), SingularQuery::try_from)(input)
}

fn parse_function_expr_comparable(input: &str, opts: ParserOptions) -> PResult<Comparable> {
    map_res(
        |i| parse_function_expr(i, opts),
        |fe| {
            match fe.return_type {
                FunctionArgType::Value => Ok(fe),
                _ => Err(FunctionValidationError::IncorrectFunctionReturnType),
            }
            .map(Comparable::FunctionExpr)
        },
    )(input)
}

/// The current key (`#`) in a comparison position
pub(crate) fn parse_current_key(input: &str, opts: ParserOptions) -> PResult<Comparable> {
    let (rest, _) = char('#')(input)?;
    if opts.strict {
        return strict_fail(input, "the current key identifier ('#')");
    }
    Ok((rest, Comparable::CurrentKey))
}

fn parse_list_literal(input: &str, opts: ParserOptions) -> PResult<Comparable> {
    if opts.strict {
        return Err(nom::Err::Error(ParserError {
            input,
            context: None,
            cause: None,
        }));
    }
    map(
        delimited(
            pair(char('['), multispace0),
            separated_list1(delimited(multispace0, char(','), multispace0), |i| {
                parse_literal(i, opts)
            }),
            pair(multispace0, char(']')),
        ),
        Comparable::ListLiteral,
    )(input)
}

#[cfg_attr(feature = "trace", tracing::instrument(level = "trace", parent = None, ret, err))]
pub(crate) fn parse_comparable(input: &str, opts: ParserOptions) -> PResult<Comparable> {
    uncut(alt((
        |i| parse_literal_comparable(i, opts),
        |i| parse_query_comparable(i, opts),
        |i| parse_function_expr_comparable(i, opts),
        |i| parse_current_key(i, opts),
        |i| parse_list_literal(i, opts),
    )))(input)
}

#[cfg(test)]
mod tests {
    use serde_json::Number;

    use crate::parser::ParserOptions;
    use crate::spec::selector::filter::{
        Comparable, ComparisonOperator, Literal, SingularQuerySegment,
    };
    use crate::spec::selector::{index::Index, name::Name};

    use super::{parse_basic_expr, parse_comp_expr, parse_comparable, parse_literal};

    const LENIENT: ParserOptions = ParserOptions { strict: false };
    const STRICT: ParserOptions = ParserOptions { strict: true };

    #[test]
    fn literals() {
        {
            let (_, lit) = parse_literal("null", STRICT).unwrap();
            assert!(matches!(lit, Literal::Null));
        }
        {
            let (_, lit) = parse_literal("nil", LENIENT).unwrap();
            assert!(matches!(lit, Literal::Null));
        }
        {
            let (_, lit) = parse_literal("true", STRICT).unwrap();
            assert!(matches!(lit, Literal::Bool(true)));
        }
        {
            let (_, lit) = parse_literal("false", STRICT).unwrap();
            assert!(matches!(lit, Literal::Bool(false)));
        }
        {
            let (_, lit) = parse_literal("\"test\"", STRICT).unwrap();
            assert!(matches!(lit, Literal::String(s) if s == "test"));
        }
        {
            let (_, lit) = parse_literal("'test'", STRICT).unwrap();
            assert!(matches!(lit, Literal::String(s) if s == "test"));
        }
        {
            let (_, lit) = parse_literal("123", STRICT).unwrap();
            assert!(matches!(lit, Literal::Number(n) if n == Number::from(123)));
        }
        {
            let (_, lit) = parse_literal("undefined", LENIENT).unwrap();
            assert!(matches!(lit, Literal::Undefined));
        }
    }

    #[test]
    fn comp_expr() {
        let (_, cxp) = parse_comp_expr("true != false", STRICT).unwrap();
        assert!(matches!(cxp.left, Comparable::Literal(Literal::Bool(true))));
        assert!(matches!(cxp.op, ComparisonOperator::NotEqualTo));
        assert!(matches!(
            cxp.right,
            Comparable::Literal(Literal::Bool(false))
        ));
    }

    #[test]
    fn membership_operators() {
        let (_, cxp) = parse_comp_expr("@.a in ['x', 'y']", LENIENT).unwrap();
        assert!(matches!(cxp.op, ComparisonOperator::In));
        assert!(matches!(cxp.right, Comparable::ListLiteral(items) if items.len() == 2));
        let (_, cxp) = parse_comp_expr("@.a contains 'x'", LENIENT).unwrap();
        assert!(matches!(cxp.op, ComparisonOperator::Contains));
    }

    #[test]
    fn basic_expr() {
        let (_, bxp) = parse_basic_expr("true == true", STRICT).unwrap();
        let cx = bxp.as_relation().unwrap();
        assert!(matches!(cx.left, Comparable::Literal(Literal::Bool(true))));
        assert!(matches!(cx.right, Comparable::Literal(Literal::Bool(true))));
        assert!(matches!(cx.op, ComparisonOperator::EqualTo));
    }

    #[test]
    fn keyword_aliases() {
        let (_, bxp) = parse_basic_expr("@.a and @.b", LENIENT).unwrap();
        // `and` is a separator at the logical-and level, so the basic expression here is
        // only the exist test for `@.a`
        assert!(matches!(bxp, crate::spec::selector::filter::BasicExpr::Exist(_)));
    }

    #[test]
    fn singular_path_comparables() {
        {
            let (_, cmp) = parse_comparable("@.name", STRICT).unwrap();
            let sp = &cmp.as_singular_path().unwrap().segments;
            assert!(matches!(&sp[0], SingularQuerySegment::Name(Name(s)) if s == "name"));
        }
        {
            let (_, cmp) = parse_comparable("$.data[0].id", STRICT).unwrap();
            let sp = &cmp.as_singular_path().unwrap().segments;
            assert!(matches!(&sp[0], SingularQuerySegment::Name(Name(s)) if s == "data"));
            assert!(matches!(&sp[1], SingularQuerySegment::Index(Index(i)) if i == &0));
            assert!(matches!(&sp[2], SingularQuerySegment::Name(Name(s)) if s == "id"));
        }
    }

    #[test]
    fn non_singular_comparable_is_lenient_only() {
        let (_, cmp) = parse_comparable("@.a.*", LENIENT).unwrap();
        assert!(matches!(cmp, Comparable::Query(_)));
        assert!(parse_comparable("@.a.*", STRICT).is_err());
    }

    #[test]
    fn current_key_comparable() {
        let (_, cmp) = parse_comparable("#", LENIENT).unwrap();
        assert!(matches!(cmp, Comparable::CurrentKey));
    }
}

use nom::character::complete::{char, multispace0, satisfy};
use nom::combinator::{cut, map};
use nom::multi::separated_list0;
use nom::sequence::{delimited, preceded, terminated};
use nom::{branch::alt, multi::fold_many1, sequence::pair};

use crate::parser::utils::uncut;
use crate::parser::{ParserError, ParserOptions, PResult};
use crate::spec::functions::{FunctionExpr, FunctionExprArg};

use super::filter::{
    parse_current_key, parse_filter_query, parse_literal, parse_logical_or_expr,
    parse_singular_query,
};

#[cfg_attr(feature = "trace", tracing::instrument(level = "trace", parent = None, ret, err))]
fn parse_function_name_first(input: &str) -> PResult<char> {
    satisfy(|c| c.is_ascii_lowercase())(input)
}

#[cfg_attr(feature = "trace", tracing::instrument(level = "trace", parent = None, ret, err))]
fn parse_function_name_char(input: &str) -> PResult<char> {
    alt((
        parse_function_name_first,
        char('_'),
        satisfy(|c| c.is_ascii_digit()),
    ))(input)
}

#[cfg_attr(feature = "trace", tracing::instrument(level = "trace", parent = None, ret, err))]
fn parse_function_name(input: &str) -> PResult<String> {
    map(
        pair(
            parse_function_name_first,
            fold_many1(
                parse_function_name_char,
                String::new,
                |mut string, fragment| {
                    string.push(fragment);
                    string
                },
            ),
        ),
        |(first, rest)| format!("{first}{rest}"),
    )(input)
}

#[cfg_attr(feature = "trace", tracing::instrument(level = "trace", parent = None, ret, err))]
fn parse_function_argument(input: &str, opts: ParserOptions) -> PResult<FunctionExprArg> {
    alt((
        |i| map(|i2| parse_literal(i2, opts), FunctionExprArg::Literal)(i),
        |i| {
            map(
                uncut(|i2| parse_singular_query(i2, opts)),
                FunctionExprArg::SingularQuery,
            )(i)
        },
        |i| {
            map(
                uncut(|i2| parse_filter_query(i2, opts)),
                FunctionExprArg::FilterQuery,
            )(i)
        },
        |i| {
            map(
                uncut(|i2| parse_function_expr(i2, opts)),
                FunctionExprArg::FunctionExpr,
            )(i)
        },
        |i| {
            map(uncut(|i2| parse_current_key(i2, opts)), |_| {
                FunctionExprArg::CurrentKey
            })(i)
        },
        |i| {
            map(
                uncut(|i2| parse_logical_or_expr(i2, opts)),
                FunctionExprArg::LogicalExpr,
            )(i)
        },
    ))(input)
}

#[cfg_attr(feature = "trace", tracing::instrument(level = "trace", parent = None, ret, err))]
pub(crate) fn parse_function_expr(input: &str, opts: ParserOptions) -> PResult<FunctionExpr> {
    let (rest, name) = parse_function_name(input)?;
    let (rest, args) = preceded(
        terminated(char('('), multispace0),
        cut(terminated(
            separated_list0(delimited(multispace0, char(','), multispace0), |i| {
                parse_function_argument(i, opts)
            }),
            preceded(multispace0, char(')')),
        )),
    )(rest)?;
    match FunctionExpr::validate(name, args) {
        Ok(expr) => Ok((rest, expr)),
        Err(e) => Err(nom::Err::Failure(ParserError {
            input,
            context: None,
            cause: Some(e.into()),
        })),
    }
}

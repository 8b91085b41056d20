//! Compact member notation parser
//!
//! Parses the short member forms people type into descriptions:
//! `id`, `id: int`, `-saldo: double$`, `crear()`,
//! `+crear(nombre: String): void`. Missing types default to `String`,
//! missing return types to `void`, missing visibility to public.

use chumsky::prelude::*;

use super::error::PipelineError;
use super::model::{Attribute, Method, Param};
use super::types::{Modifier, Visibility};

pub const DEFAULT_TYPE: &str = "String";
pub const DEFAULT_RETURN: &str = "void";

/// A parsed member, ready to attach to an element
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Member {
    Attribute(Attribute),
    Method(Method),
}

#[derive(Debug, Clone, PartialEq)]
struct ParsedMember {
    visibility: Option<Visibility>,
    name: String,
    member_type: Option<String>,
    params: Option<String>,
    modifier: Option<Modifier>,
}

fn member_parser<'src>() -> impl Parser<'src, &'src str, ParsedMember> + Clone {
    let inline_ws = just(' ').or(just('\t')).repeated().ignored();

    // Visibility prefix: + - # ~
    let visibility = one_of("+-#~").map(Visibility::from_char).or_not();

    // Member name (until : or ( or a modifier)
    let member_name = none_of(":(){}*$\n\r")
        .repeated()
        .at_least(1)
        .to_slice()
        .map(|s: &str| s.trim().to_string());

    // Attribute type: `: type`
    let type_annotation = just(':')
        .ignore_then(none_of("()*${}\n\r").repeated().to_slice())
        .map(|s: &str| s.trim().to_string())
        .or_not();

    // Method arguments, kept raw and split afterwards
    let method_parens = just('(')
        .ignore_then(none_of(")").repeated().to_slice())
        .then_ignore(just(')'))
        .map(|s: &str| s.trim().to_string());

    // Method return type: `): type`
    let return_type = inline_ws
        .clone()
        .ignore_then(just(':'))
        .ignore_then(none_of("*${}\n\r").repeated().to_slice())
        .map(|s: &str| s.trim().to_string())
        .or_not();

    // Modifier suffix: * or $
    let modifier = inline_ws
        .clone()
        .ignore_then(
            just('*')
                .to(Modifier::Abstract)
                .or(just('$').to(Modifier::Static)),
        )
        .or_not();

    let method = visibility
        .then(member_name)
        .then(method_parens)
        .then(return_type)
        .then(modifier)
        .map(|((((vis, name), params), ret), modifier)| ParsedMember {
            visibility: vis.flatten(),
            name,
            member_type: ret,
            params: Some(params),
            modifier,
        });

    let attribute = visibility
        .then(member_name)
        .then(type_annotation)
        .then(modifier)
        .map(|(((vis, name), member_type), modifier)| ParsedMember {
            visibility: vis.flatten(),
            name,
            member_type,
            params: None,
            modifier,
        });

    method
        .or(attribute)
        .then_ignore(inline_ws)
        .then_ignore(end())
}

/// Parse one member in compact notation
pub fn parse_member(input: &str) -> Result<Member, PipelineError> {
    let trimmed = input.trim();
    let parsed = member_parser()
        .parse(trimmed)
        .into_result()
        .map_err(|errors| {
            PipelineError::build(format!("cannot parse member '{}': {:?}", trimmed, errors))
        })?;

    if parsed.name.is_empty() {
        return Err(PipelineError::build(format!(
            "member '{}' has no name",
            trimmed
        )));
    }

    let visibility = parsed.visibility.unwrap_or_default();
    let member_type = parsed
        .member_type
        .filter(|t| !t.is_empty());

    let member = match parsed.params {
        Some(params) => Member::Method(Method {
            name: parsed.name,
            params: parse_params(&params),
            return_type: member_type.unwrap_or_else(|| DEFAULT_RETURN.to_string()),
            visibility,
            modifier: parsed.modifier,
        }),
        None => Member::Attribute(Attribute {
            name: parsed.name,
            attr_type: member_type.unwrap_or_else(|| DEFAULT_TYPE.to_string()),
            visibility,
            modifier: parsed.modifier,
        }),
    };
    Ok(member)
}

/// Split `a: int, b` or `int a, String b` into parameters
fn parse_params(raw: &str) -> Vec<Param> {
    raw.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|p| {
            if let Some((name, ty)) = p.split_once(':') {
                let ty = ty.trim();
                let ty = if ty.is_empty() { DEFAULT_TYPE } else { ty };
                return Param::new(name.trim(), ty);
            }
            let words: Vec<&str> = p.split_whitespace().collect();
            match words.as_slice() {
                [ty, name] => Param::new(*name, *ty),
                _ => Param::new(p, DEFAULT_TYPE),
            }
        })
        .collect()
}

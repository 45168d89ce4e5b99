//! `key=value` pairs embedded in free text.
//!
//! Values are bare words or single/double quoted strings (quotes are stripped).
//! Anything that is not a pair is ignored.

use crate::models::command::{ParamValue, Params};
use once_cell::sync::Lazy;
use regex::Regex;

static PAIR: Lazy<Regex> = Lazy::new(|| Regex::new(r#"(\w+)=("[^"]*"|'[^']*'|\S+)"#).unwrap());

pub fn parse_pairs(input: &str) -> Params {
    let mut params = Params::new();
    for caps in PAIR.captures_iter(input) {
        params.insert(caps[1].to_string(), ParamValue::Text(unquote(&caps[2]).to_string()));
    }
    params
}

fn unquote(value: &str) -> &str {
    if value.len() >= 2 {
        for q in ['"', '\''] {
            if value.starts_with(q) && value.ends_with(q) {
                return &value[1..value.len() - 1];
            }
        }
    }
    value
}

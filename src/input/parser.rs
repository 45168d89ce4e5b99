//! Free-text admin command interpreter.
//!
//! Examples:
//!   "create passkey tenant=2 max_uses=3"   -> admin.create_passkey {tenant:"2", max_uses:"3"}
//!   "search users alice"                    -> admin.list_users {search:"alice"}
//!   "disable user 7 reason=\"policy\""      -> admin.update_user {id:"7", is_active:false, disable_reason:"policy"}
//!   "reset password 9 new-pass"             -> admin.reset_password {id:"9", new_password:"new-pass"}
//!
//! Rules are tried in table order and the first match wins, so more specific
//! phrases must sit above anything they share a prefix with.

use crate::input::kv::parse_pairs;
use crate::models::command::ParsedCommand;

pub const ACTION_HELP: &str = "admin.help";
pub const ACTION_CREATE_PASSKEY: &str = "admin.create_passkey";
pub const ACTION_LIST_USERS: &str = "admin.list_users";
pub const ACTION_UPDATE_USER: &str = "admin.update_user";
pub const ACTION_RESET_PASSWORD: &str = "admin.reset_password";
pub const ACTION_VIEW_USER: &str = "admin.view_user";

enum Matcher {
    /// Whole input equals one of these (case-insensitive)
    Exact(&'static [&'static str]),
    /// Input starts with one of these (case-insensitive)
    Prefix(&'static [&'static str]),
}

struct Rule {
    matcher: Matcher,
    /// Receives the text left after the matched phrase.
    build: fn(&str) -> ParsedCommand,
}

static RULES: &[Rule] = &[
    Rule {
        matcher: Matcher::Exact(&["admin help", "help admin", "admin commands"]),
        build: |_| ParsedCommand::new(ACTION_HELP),
    },
    Rule {
        matcher: Matcher::Prefix(&["create passkey", "passkey create"]),
        build: |rest| with_pairs(ParsedCommand::new(ACTION_CREATE_PASSKEY), rest),
    },
    Rule {
        matcher: Matcher::Prefix(&["list users"]),
        build: |rest| with_pairs(ParsedCommand::new(ACTION_LIST_USERS), rest),
    },
    Rule {
        matcher: Matcher::Prefix(&["search users"]),
        build: |rest| ParsedCommand::new(ACTION_LIST_USERS).with("search", rest.trim()),
    },
    Rule {
        matcher: Matcher::Prefix(&["enable user"]),
        build: |rest| {
            let (id, _) = first_token(rest);
            ParsedCommand::new(ACTION_UPDATE_USER)
                .with("id", id)
                .with("is_active", true)
        },
    },
    Rule {
        matcher: Matcher::Prefix(&["disable user"]),
        build: |rest| {
            let (id, tail) = first_token(rest);
            let mut cmd = ParsedCommand::new(ACTION_UPDATE_USER)
                .with("id", id)
                .with("is_active", false);
            if let Some(reason) = parse_pairs(&tail).remove("reason") {
                cmd = cmd.with("disable_reason", reason);
            }
            cmd
        },
    },
    Rule {
        matcher: Matcher::Prefix(&["reset user password", "reset password"]),
        build: |rest| {
            let (id, tail) = first_token(rest);
            ParsedCommand::new(ACTION_RESET_PASSWORD)
                .with("id", id)
                .with("new_password", tail)
        },
    },
    Rule {
        matcher: Matcher::Prefix(&["view user"]),
        build: |rest| ParsedCommand::new(ACTION_VIEW_USER).with("search", rest.trim()),
    },
    Rule {
        matcher: Matcher::Prefix(&["update user", "edit user"]),
        build: |rest| {
            let (id, tail) = first_token(rest);
            let mut cmd = ParsedCommand::new(ACTION_UPDATE_USER).with("id", id);
            cmd.params.extend(parse_pairs(&tail));
            cmd
        },
    },
];

/// Parses one line of admin input. Returns `None` when no rule recognizes it.
pub fn parse(input: &str) -> Option<ParsedCommand> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }

    RULES.iter().find_map(|rule| {
        let rest = match rule.matcher {
            Matcher::Exact(phrases) => phrases.iter().any(|p| trimmed.eq_ignore_ascii_case(p)).then_some("")?,
            Matcher::Prefix(phrases) => phrases.iter().find_map(|p| strip_phrase(trimmed, p))?,
        };
        Some((rule.build)(rest))
    })
}

/// True when the input reads as an admin command at all.
pub fn is_admin_command(input: &str) -> bool {
    parse(input).is_some()
}

/// Remainder after `phrase`, which must end on a word boundary.
fn strip_phrase<'a>(input: &'a str, phrase: &str) -> Option<&'a str> {
    let head = input.get(..phrase.len())?;
    let rest = &input[phrase.len()..];
    (head.eq_ignore_ascii_case(phrase) && rest.chars().next().is_none_or(char::is_whitespace)).then_some(rest)
}

fn first_token(s: &str) -> (String, String) {
    let mut words = s.split_whitespace();
    let token = words.next().unwrap_or_default().to_string();
    let rest = words.collect::<Vec<_>>().join(" ");
    (token, rest)
}

fn with_pairs(mut cmd: ParsedCommand, rest: &str) -> ParsedCommand {
    cmd.params.extend(parse_pairs(rest));
    cmd
}

//! Rewriting of dotted calls `Class.verb(args)` into `verb Class args`.

use super::parser::{find_outside_quotes, split_outside_quotes};
use once_cell::sync::Lazy;
use regex::Regex;

static DOTTED_CALL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*([^\s.(]*)\.([A-Za-z_]\w*)\((.*)\)\s*$").expect("valid dotted call regex")
});

/// Verbs accepted in dotted form.
pub const DOTTED_VERBS: &[&str] = &["all", "count", "create", "destroy", "show", "update"];

/// Result of inspecting one input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rewrite {
    /// Not a dotted call; dispatch the line as typed.
    Direct,
    /// Normalized direct command.
    Command(String),
    /// Dotted call naming a verb outside `DOTTED_VERBS`.
    UnknownMethod(String),
}

/// Normalizes a dotted call.
///
/// Argument commas become spaces, except that a mapping literal (from its first
/// unquoted `{` to the end) is carried over verbatim. Commas inside quotes are
/// kept.
pub fn rewrite_dotted(line: &str) -> Rewrite {
    let Some(captures) = DOTTED_CALL_RE.captures(line) else {
        return Rewrite::Direct;
    };
    let class_name = &captures[1];
    let verb = &captures[2];
    let args = captures[3].trim();

    if !DOTTED_VERBS.contains(&verb) {
        return Rewrite::UnknownMethod(verb.to_string());
    }

    let (positional, mapping) = match find_outside_quotes(args, '{') {
        Some(brace) => (&args[..brace], &args[brace..]),
        None => (args, ""),
    };
    let positional = split_outside_quotes(positional, ',')
        .into_iter()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    let command = [verb, class_name, positional.as_str(), mapping.trim()]
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    Rewrite::Command(command)
}

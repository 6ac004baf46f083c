//! Argument parsing for console commands.
//!
//! # Responsibility
//! - Split command remainders into shell-like tokens, remembering which
//!   tokens were quoted.
//! - Extract class name, object id and attribute arguments.
//! - Parse `key=value` create parameters, update pairs and mapping literals.
//!
//! # Invariants
//! - Quoted tokens are always strings; unquoted tokens go through
//!   `AttrValue::coerce`.
//! - An empty attribute name (`''`) is reported as missing.
//! - Parsing never panics on malformed input; an unterminated quote runs to
//!   the end of the line.

use super::messages::ConsoleError;
use crate::model::value::AttrValue;

/// One shell-like word.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Text with quotes removed and escapes resolved.
    pub text: String,
    /// Whether any part of the token was quoted.
    pub quoted: bool,
    /// Byte offset of the token's first character in the parsed input.
    pub start: usize,
}

impl Token {
    fn empty(start: usize) -> Self {
        Self {
            text: String::new(),
            quoted: false,
            start,
        }
    }

    /// Typed value of this token.
    pub fn value(&self) -> AttrValue {
        if self.quoted {
            AttrValue::Str(self.text.clone())
        } else {
            AttrValue::coerce(&self.text)
        }
    }
}

/// Trailing arguments after class name and id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeArgs {
    Tokens(Vec<Token>),
    /// Raw text between the outer braces of a mapping literal.
    Mapping(String),
}

/// Positional arguments shared by `show`, `update`, `destroy`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandArgs {
    pub class_name: Option<String>,
    pub object_id: Option<String>,
    pub attributes: AttributeArgs,
}

/// Splits input into tokens.
///
/// Whitespace separates tokens; `"..."` and `'...'` group text and are
/// stripped. A backslash escapes the next character outside quotes and `"` or
/// `\` inside double quotes.
pub fn tokenize(input: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut current: Option<Token> = None;
    let mut chars = input.char_indices().peekable();

    while let Some((index, ch)) = chars.next() {
        match ch {
            c if c.is_whitespace() => {
                if let Some(token) = current.take() {
                    tokens.push(token);
                }
            }
            '"' | '\'' => {
                let token = current.get_or_insert_with(|| Token::empty(index));
                token.quoted = true;
                while let Some((_, next)) = chars.next() {
                    if next == ch {
                        break;
                    }
                    if next == '\\' && ch == '"' {
                        if let Some(&(_, escaped)) = chars.peek() {
                            if escaped == '"' || escaped == '\\' {
                                token.text.push(escaped);
                                chars.next();
                                continue;
                            }
                        }
                    }
                    token.text.push(next);
                }
            }
            '\\' => {
                let token = current.get_or_insert_with(|| Token::empty(index));
                if let Some((_, escaped)) = chars.next() {
                    token.text.push(escaped);
                }
            }
            c => current.get_or_insert_with(|| Token::empty(index)).text.push(c),
        }
    }

    if let Some(token) = current {
        tokens.push(token);
    }
    tokens
}

/// Extracts class name, id and attribute arguments from a command remainder.
///
/// A mapping literal is recognized only in third position: an unquoted `{`
/// followed later by a closing `}`.
pub fn parse_command_args(remainder: &str) -> CommandArgs {
    let mut tokens = tokenize(remainder);

    let attributes = match mapping_body(remainder, &tokens) {
        Some(body) => {
            tokens.truncate(2);
            AttributeArgs::Mapping(body.to_string())
        }
        None => AttributeArgs::Tokens(tokens.split_off(tokens.len().min(2))),
    };

    let mut positional = tokens.into_iter().map(|token| token.text);
    CommandArgs {
        class_name: positional.next().filter(|text| !text.is_empty()),
        object_id: positional.next().filter(|text| !text.is_empty()),
        attributes,
    }
}

fn mapping_body<'a>(remainder: &'a str, tokens: &[Token]) -> Option<&'a str> {
    let third = tokens.get(2)?;
    let tail = &remainder[third.start..];
    if !tail.starts_with('{') {
        return None;
    }
    let close = tail.rfind('}')?;
    Some(&tail[1..close])
}

/// Parses `name value [name value ...]` update arguments.
///
/// The first pair is mandatory; later tokens are consumed two at a time and a
/// trailing unpaired token is ignored.
///
/// # Errors
/// - `NoAttributeName` when the first name is absent or empty.
/// - `NoAttributeValue` when the first value is absent.
pub fn parse_attribute_pairs(tokens: &[Token]) -> Result<Vec<(String, AttrValue)>, ConsoleError> {
    let name = match tokens.first() {
        Some(token) if !token.text.is_empty() => token,
        _ => return Err(ConsoleError::NoAttributeName),
    };
    let value = tokens.get(1).ok_or(ConsoleError::NoAttributeValue)?;

    let mut pairs = vec![(name.text.clone(), value.value())];
    pairs.extend(
        tokens[2..]
            .chunks_exact(2)
            .filter(|pair| !pair[0].text.is_empty())
            .map(|pair| (pair[0].text.clone(), pair[1].value())),
    );
    Ok(pairs)
}

/// Parses the body of a mapping literal: `key: value` entries split by commas.
///
/// # Errors
/// - `NoAttributeName` for an empty mapping or an entry with an empty key.
/// - `NoAttributeValue` for an entry without `:` or without a value.
pub fn parse_mapping(body: &str) -> Result<Vec<(String, AttrValue)>, ConsoleError> {
    let mut pairs = Vec::new();

    for entry in split_outside_quotes(body, ',') {
        if entry.trim().is_empty() {
            continue;
        }
        let separator = find_outside_quotes(entry, ':').ok_or(ConsoleError::NoAttributeValue)?;
        let key = scalar(&entry[..separator])
            .filter(|token| !token.text.is_empty())
            .ok_or(ConsoleError::NoAttributeName)?;
        let value = scalar(&entry[separator + 1..]).ok_or(ConsoleError::NoAttributeValue)?;
        pairs.push((key.text, value.value()));
    }

    if pairs.is_empty() {
        return Err(ConsoleError::NoAttributeName);
    }
    Ok(pairs)
}

/// Parses `key=value` parameters of `create`. Tokens without `=` or with an
/// empty key are skipped.
pub fn parse_create_params(tokens: &[Token]) -> Vec<(String, AttrValue)> {
    tokens
        .iter()
        .filter_map(|token| {
            let (key, raw) = token.text.split_once('=')?;
            if key.is_empty() {
                return None;
            }
            let value = Token {
                text: raw.to_string(),
                quoted: token.quoted,
                start: token.start,
            };
            Some((key.to_string(), value.value()))
        })
        .collect()
}

fn scalar(raw: &str) -> Option<Token> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let mut tokens = tokenize(trimmed);
    if tokens.len() == 1 {
        return tokens.pop();
    }
    Some(Token {
        text: trimmed.to_string(),
        quoted: false,
        start: 0,
    })
}

/// Splits on `separator` wherever it appears outside quotes.
pub(crate) fn split_outside_quotes(input: &str, separator: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut rest = input;
    while let Some(index) = find_outside_quotes(rest, separator) {
        parts.push(&rest[..index]);
        rest = &rest[index + separator.len_utf8()..];
    }
    parts.push(rest);
    parts
}

pub(crate) fn find_outside_quotes(input: &str, target: char) -> Option<usize> {
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for (index, ch) in input.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match (quote, ch) {
            (Some('"'), '\\') => escaped = true,
            (Some(open), c) if c == open => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(ch),
            (None, c) if c == target => return Some(index),
            (None, _) => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::{
        parse_attribute_pairs, parse_command_args, parse_create_params, parse_mapping,
        split_outside_quotes, tokenize, AttributeArgs,
    };
    use crate::console::messages::ConsoleError;
    use crate::model::value::AttrValue;

    fn texts(input: &str) -> Vec<String> {
        tokenize(input).into_iter().map(|token| token.text).collect()
    }

    #[test]
    fn tokenize_strips_quotes_and_keeps_quoted_spaces() {
        assert_eq!(texts(r#"User 1 name "a b" x"#), vec!["User", "1", "name", "a b", "x"]);
        assert_eq!(texts(r#"name="X""#), vec!["name=X"]);
        assert_eq!(texts(r#"say "he said \"hi\"""#), vec!["say", r#"he said "hi""#]);
    }

    #[test]
    fn tokenize_marks_quoted_tokens_and_keeps_empty_quotes() {
        let tokens = tokenize("age \"20\" ''");
        assert!(!tokens[0].quoted);
        assert!(tokens[1].quoted);
        assert_eq!(tokens[2].text, "");
        assert!(tokens[2].quoted);
        assert_eq!(tokens[1].value(), AttrValue::from("20"));
    }

    #[test]
    fn tokenize_runs_unterminated_quote_to_end() {
        assert_eq!(texts("name 'open ended"), vec!["name", "open ended"]);
    }

    #[test]
    fn command_args_detect_mapping_in_third_position() {
        let args = parse_command_args(r#"User abc {"email": "x@g.c", "age": 3}"#);
        assert_eq!(args.class_name.as_deref(), Some("User"));
        assert_eq!(args.object_id.as_deref(), Some("abc"));
        assert_eq!(
            args.attributes,
            AttributeArgs::Mapping(r#""email": "x@g.c", "age": 3"#.to_string())
        );
    }

    #[test]
    fn command_args_treat_unclosed_brace_as_tokens() {
        let args = parse_command_args("User abc {name x");
        match args.attributes {
            AttributeArgs::Tokens(tokens) => assert_eq!(tokens.len(), 2),
            other => panic!("unexpected attributes: {other:?}"),
        }
    }

    #[test]
    fn command_args_report_missing_positionals() {
        let args = parse_command_args("");
        assert!(args.class_name.is_none());
        assert!(args.object_id.is_none());

        let args = parse_command_args("User");
        assert_eq!(args.class_name.as_deref(), Some("User"));
        assert!(args.object_id.is_none());
    }

    #[test]
    fn attribute_pairs_cycle_two_at_a_time() {
        let tokens = tokenize(r#"age "20" name "x" size 4 dangling"#);
        let pairs = parse_attribute_pairs(&tokens).unwrap();
        assert_eq!(
            pairs,
            vec![
                ("age".to_string(), AttrValue::from("20")),
                ("name".to_string(), AttrValue::from("x")),
                ("size".to_string(), AttrValue::Int(4)),
            ]
        );
    }

    #[test]
    fn attribute_pairs_report_missing_name_and_value() {
        assert!(matches!(
            parse_attribute_pairs(&tokenize("")),
            Err(ConsoleError::NoAttributeName)
        ));
        assert!(matches!(
            parse_attribute_pairs(&tokenize("''")),
            Err(ConsoleError::NoAttributeName)
        ));
        assert!(matches!(
            parse_attribute_pairs(&tokenize("name")),
            Err(ConsoleError::NoAttributeValue)
        ));
    }

    #[test]
    fn mapping_parses_quoted_and_bare_values() {
        let pairs = parse_mapping(r#""email": "x@g.c", 'age': 30, ratio: 0.5, "note": "a, b: c""#)
            .unwrap();
        assert_eq!(
            pairs,
            vec![
                ("email".to_string(), AttrValue::from("x@g.c")),
                ("age".to_string(), AttrValue::Int(30)),
                ("ratio".to_string(), AttrValue::Float(0.5)),
                ("note".to_string(), AttrValue::from("a, b: c")),
            ]
        );
    }

    #[test]
    fn mapping_reports_missing_parts() {
        assert!(matches!(parse_mapping("  "), Err(ConsoleError::NoAttributeName)));
        assert!(matches!(parse_mapping(r#""": 1"#), Err(ConsoleError::NoAttributeName)));
        assert!(matches!(parse_mapping(r#""name""#), Err(ConsoleError::NoAttributeValue)));
        assert!(matches!(parse_mapping(r#""name": "#), Err(ConsoleError::NoAttributeValue)));
    }

    #[test]
    fn create_params_coerce_unquoted_values_only() {
        let tokens = tokenize(r#"name="My house" rooms=4 price=9.5 code="7" junk =x"#);
        let params = parse_create_params(&tokens);
        assert_eq!(
            params,
            vec![
                ("name".to_string(), AttrValue::from("My house")),
                ("rooms".to_string(), AttrValue::Int(4)),
                ("price".to_string(), AttrValue::Float(9.5)),
                ("code".to_string(), AttrValue::from("7")),
            ]
        );
    }

    #[test]
    fn split_ignores_separators_inside_quotes() {
        assert_eq!(
            split_outside_quotes(r#"a, "b, c", 'd,e'"#, ','),
            vec!["a", r#" "b, c""#, " 'd,e'"]
        );
    }
}

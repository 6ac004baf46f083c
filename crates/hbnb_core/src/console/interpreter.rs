//! Command interpreter.
//!
//! # Responsibility
//! - Normalize dotted calls and dispatch direct commands to verb handlers.
//! - Validate class names, ids and attributes in a fixed order.
//! - Persist the store after every mutating verb.
//!
//! # Invariants
//! - Validation order is class name, class, id, object, attribute name,
//!   attribute value; the first failure is the one reported.
//! - A command failure prints one line and never stops the read loop.
//! - Only writer I/O errors leave `onecmd`/`run`.

use super::dotted::{rewrite_dotted, Rewrite};
use super::messages::ConsoleError;
use super::parser::{
    parse_attribute_pairs, parse_command_args, parse_create_params, parse_mapping, tokenize,
    AttributeArgs,
};
use crate::model::record::{storage_key, Model};
use crate::model::registry::ModelRegistry;
use crate::model::value::AttrValue;
use crate::store::ObjectStore;
use log::{debug, info, warn};
use std::io::{self, BufRead, Write};

/// Prompt printed before each line in interactive sessions.
pub const PROMPT: &str = "(hbnb) ";

const HELP_TOPICS: &[(&str, &str)] = &[
    ("EOF", "Exit the console at end of input."),
    ("all", "Usage: all [<class>] | <class>.all()"),
    ("count", "Usage: count <class> | <class>.count()"),
    (
        "create",
        "Usage: create <class> [<key>=<value> ...] | <class>.create()",
    ),
    ("destroy", "Usage: destroy <class> <id> | <class>.destroy(<id>)"),
    ("help", "Usage: help [<topic>]"),
    ("quit", "Exit the console."),
    ("show", "Usage: show <class> <id> | <class>.show(<id>)"),
    (
        "update",
        "Usage: update <class> <id> <name> <value> | update <class> <id> {<mapping>} | <class>.update(<id>, ...)",
    ),
];

type CommandResult = Result<Reply, ConsoleError>;

/// Loop control returned by `Console::onecmd`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Stop,
}

#[derive(Debug)]
enum Reply {
    Silent,
    Line(String),
    Stop { echo_newline: bool },
}

/// Line-oriented interpreter over an object store and a model registry.
#[derive(Debug)]
pub struct Console<S: ObjectStore> {
    store: S,
    registry: ModelRegistry,
}

impl<S: ObjectStore> Console<S> {
    pub fn new(store: S, registry: ModelRegistry) -> Self {
        Self { store, registry }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Executes one input line, writing its output to `out`.
    ///
    /// Dotted calls are normalized first, so both syntaxes produce identical
    /// output and state changes.
    ///
    /// # Errors
    /// - Returns an error only when writing to `out` fails.
    pub fn onecmd<W: Write + ?Sized>(&mut self, line: &str, out: &mut W) -> io::Result<Flow> {
        let result = match rewrite_dotted(line) {
            Rewrite::Direct => self.dispatch(line),
            Rewrite::Command(command) => self.dispatch(&command),
            Rewrite::UnknownMethod(verb) => Err(ConsoleError::NoMethod(verb)),
        };

        match result {
            Ok(Reply::Silent) => Ok(Flow::Continue),
            Ok(Reply::Line(text)) => {
                writeln!(out, "{text}")?;
                Ok(Flow::Continue)
            }
            Ok(Reply::Stop { echo_newline }) => {
                if echo_newline {
                    writeln!(out)?;
                }
                Ok(Flow::Stop)
            }
            Err(err) => {
                match &err {
                    ConsoleError::Storage(source) => warn!(
                        "event=command_dispatch module=console status=error error_code={} error={}",
                        err.code(),
                        source
                    ),
                    _ => debug!(
                        "event=command_dispatch module=console status=rejected error_code={}",
                        err.code()
                    ),
                }
                writeln!(out, "{err}")?;
                Ok(Flow::Continue)
            }
        }
    }

    /// Reads commands from `input` until `quit`, `EOF` or end of input.
    ///
    /// End of input is dispatched as `EOF`. The prompt, when given, is written
    /// before each read.
    ///
    /// # Errors
    /// - Returns an error when reading `input` or writing `out` fails.
    pub fn run<R: BufRead, W: Write + ?Sized>(
        &mut self,
        input: R,
        out: &mut W,
        prompt: Option<&str>,
    ) -> io::Result<()> {
        info!(
            "event=console_start module=console status=ok interactive={} objects={}",
            prompt.is_some(),
            self.store.all().len()
        );

        let mut lines = input.lines();
        loop {
            if let Some(prompt) = prompt {
                write!(out, "{prompt}")?;
                out.flush()?;
            }
            let line = match lines.next() {
                Some(line) => line?,
                None => "EOF".to_string(),
            };
            if self.onecmd(&line, out)? == Flow::Stop {
                info!("event=console_stop module=console status=ok");
                return Ok(());
            }
        }
    }

    fn dispatch(&mut self, line: &str) -> CommandResult {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Ok(Reply::Silent);
        }

        let (verb, remainder) = trimmed
            .split_once(char::is_whitespace)
            .map(|(verb, rest)| (verb, rest.trim_start()))
            .unwrap_or((trimmed, ""));
        debug!("event=command_dispatch module=console status=start verb={verb}");

        match verb {
            "create" => self.do_create(remainder),
            "show" => self.do_show(remainder),
            "update" => self.do_update(remainder),
            "destroy" => self.do_destroy(remainder),
            "count" => self.do_count(remainder),
            "all" => self.do_all(remainder),
            "help" => Ok(do_help(remainder)),
            "quit" => Ok(Reply::Stop {
                echo_newline: false,
            }),
            "EOF" => Ok(Reply::Stop { echo_newline: true }),
            _ => Err(ConsoleError::UnknownSyntax(trimmed.to_string())),
        }
    }

    fn do_create(&mut self, remainder: &str) -> CommandResult {
        let tokens = tokenize(remainder);
        let class_name = self.require_class(tokens.first().map(|token| token.text.as_str()))?;
        let constructor = self
            .registry
            .lookup(class_name)
            .ok_or(ConsoleError::NoClass)?;
        let mut object = constructor(None).map_err(ConsoleError::Model)?;

        for (name, value) in parse_create_params(tokens.get(1..).unwrap_or_default()) {
            apply_attribute(&mut *object, &name, value);
        }

        let id = object.id().to_string();
        self.store.insert(object);
        self.store.save()?;
        Ok(Reply::Line(id))
    }

    fn do_show(&mut self, remainder: &str) -> CommandResult {
        let args = parse_command_args(remainder);
        let key = self.require_key(args.class_name.as_deref(), args.object_id.as_deref())?;
        let object = self.store.get(&key).ok_or(ConsoleError::NoObject)?;
        Ok(Reply::Line(object.describe()))
    }

    fn do_update(&mut self, remainder: &str) -> CommandResult {
        let args = parse_command_args(remainder);
        let key = self.require_key(args.class_name.as_deref(), args.object_id.as_deref())?;
        if self.store.get(&key).is_none() {
            return Err(ConsoleError::NoObject);
        }

        let pairs = match &args.attributes {
            AttributeArgs::Mapping(body) => parse_mapping(body)?,
            AttributeArgs::Tokens(tokens) => parse_attribute_pairs(tokens)?,
        };

        let object = self.store.get_mut(&key).ok_or(ConsoleError::NoObject)?;
        for (name, value) in pairs {
            apply_attribute(&mut *object, &name, value);
        }
        object.touch();

        self.store.save()?;
        Ok(Reply::Silent)
    }

    fn do_destroy(&mut self, remainder: &str) -> CommandResult {
        let args = parse_command_args(remainder);
        let key = self.require_key(args.class_name.as_deref(), args.object_id.as_deref())?;
        self.store.remove(&key).ok_or(ConsoleError::NoObject)?;
        self.store.save()?;
        Ok(Reply::Silent)
    }

    fn do_count(&mut self, remainder: &str) -> CommandResult {
        let tokens = tokenize(remainder);
        let class_name = self.require_class(tokens.first().map(|token| token.text.as_str()))?;
        Ok(Reply::Line(self.store.count_class(class_name).to_string()))
    }

    fn do_all(&mut self, remainder: &str) -> CommandResult {
        let tokens = tokenize(remainder);
        let filter = match tokens.first() {
            Some(token) => Some(self.require_class(Some(token.text.as_str()))?),
            None => None,
        };

        let listed = self
            .store
            .all()
            .values()
            .filter(|object| filter.map_or(true, |class_name| object.class_name() == class_name))
            .map(|object| AttrValue::Str(object.describe()).repr())
            .collect::<Vec<_>>();
        Ok(Reply::Line(format!("[{}]", listed.join(", "))))
    }

    /// Checks that a class name is present and registered.
    fn require_class<'a>(&self, class_name: Option<&'a str>) -> Result<&'a str, ConsoleError> {
        let class_name = class_name
            .filter(|name| !name.is_empty())
            .ok_or(ConsoleError::NoClassName)?;
        if !self.registry.contains(class_name) {
            return Err(ConsoleError::NoClass);
        }
        Ok(class_name)
    }

    fn require_key(
        &self,
        class_name: Option<&str>,
        object_id: Option<&str>,
    ) -> Result<String, ConsoleError> {
        let class_name = self.require_class(class_name)?;
        let object_id = object_id.ok_or(ConsoleError::NoObjectId)?;
        Ok(storage_key(class_name, object_id))
    }
}

fn apply_attribute(object: &mut dyn Model, name: &str, value: AttrValue) {
    if !object.set_attr(name, value) {
        debug!("event=attribute_skipped module=console reason=reserved name={name}");
    }
}

fn do_help(topic: &str) -> Reply {
    let topic = topic.trim();
    if topic.is_empty() {
        let names = HELP_TOPICS
            .iter()
            .map(|(name, _)| *name)
            .collect::<Vec<_>>()
            .join(" ");
        return Reply::Line(format!("Documented commands (type help <topic>):\n{names}"));
    }

    match HELP_TOPICS.iter().find(|(name, _)| *name == topic) {
        Some((_, usage)) => Reply::Line((*usage).to_string()),
        None => Reply::Line(format!("*** No help on {topic}")),
    }
}

//! The flag registry: one named flag per bound field, parsed from a
//! command line.
//!
//! Flags use the single-dash grammar common to Go-style tools:
//!
//! ```text
//! -name value     -name=value     --name value     --name=value
//! -verbose        (boolean flags need no value)
//! --              (stops flag parsing; everything after is positional)
//! ```
//!
//! Parsing also stops at the first argument that is not a flag. Arguments are
//! first normalized into `--name=value` tokens, then handed to
//! [clap](https://docs.rs/clap) which rejects unknown flags and renders usage
//! text. `-h` / `-help` (when not registered as flags) return
//! [`EnvflagError::Help`] carrying that usage text. Usage lists flags in the
//! double-dash form and ends with a note that either form is accepted.

use clap::builder::{Arg, ArgAction, Command};
use clap::error::ErrorKind;
use clap::parser::ValueSource;
use indexmap::IndexMap;
use tracing::debug;

use crate::error::EnvflagError;
use crate::types::Kind;

const DASH_FORMS: &str =
    "Flags take one or two dashes: -name value, -name=value, --name value, --name=value.";

/// One registered flag.
#[derive(Debug, Clone, PartialEq)]
pub struct Flag {
    name: String,
    kind: Kind,
    default: String,
    help: String,
    value: Option<String>,
}

impl Flag {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    /// The textual default, normally seeded from the environment.
    pub fn default_value(&self) -> &str {
        &self.default
    }

    pub fn help(&self) -> &str {
        &self.help
    }

    /// The text given on the command line, if any. The last occurrence wins.
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// The command-line value if one was given, otherwise the default.
    pub fn effective(&self) -> &str {
        self.value.as_deref().unwrap_or(&self.default)
    }
}

/// An ordered set of flags.
#[derive(Debug, Clone)]
pub struct FlagSet {
    name: String,
    flags: IndexMap<String, Flag>,
    args: Vec<String>,
}

impl FlagSet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            flags: IndexMap::new(),
            args: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Add a flag. Names must be unique within the set.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        kind: Kind,
        default: impl Into<String>,
        help: impl Into<String>,
    ) -> Result<(), EnvflagError> {
        let name = name.into();
        check_name(&name)?;
        if self.flags.contains_key(&name) {
            return Err(EnvflagError::DuplicateFlag(name));
        }

        let flag = Flag {
            name: name.clone(),
            kind,
            default: default.into(),
            help: help.into(),
            value: None,
        };
        debug!(flag = %flag.name, kind = %kind, default = %flag.default, "registered flag");
        self.flags.insert(name, flag);
        Ok(())
    }

    pub fn lookup(&self, name: &str) -> Option<&Flag> {
        self.flags.get(name)
    }

    /// Flags in registration order.
    pub fn flags(&self) -> impl Iterator<Item = &Flag> {
        self.flags.values()
    }

    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    /// Whether `name` was given on the command line in the last parse.
    pub fn is_set(&self, name: &str) -> bool {
        self.lookup(name).is_some_and(|f| f.value.is_some())
    }

    /// Positional arguments left over after flag parsing.
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Parse `args` (without the program name). Values from any earlier
    /// parse are cleared first.
    pub fn parse<I, A>(&mut self, args: I) -> Result<(), EnvflagError>
    where
        I: IntoIterator<Item = A>,
        A: Into<String>,
    {
        let args: Vec<String> = args.into_iter().map(Into::into).collect();
        for flag in self.flags.values_mut() {
            flag.value = None;
        }
        self.args.clear();

        let (tokens, positional) = self.normalize(args)?;
        let matches = match self.command().try_get_matches_from(tokens) {
            Ok(matches) => matches,
            Err(err) if err.kind() == ErrorKind::DisplayHelp => {
                return Err(EnvflagError::Help(self.usage()));
            }
            Err(err) => return Err(err.into()),
        };

        for flag in self.flags.values_mut() {
            if matches.value_source(&flag.name) != Some(ValueSource::CommandLine) {
                continue;
            }
            flag.value = matches
                .get_many::<String>(&flag.name)
                .and_then(|values| values.last())
                .cloned();
        }
        self.args = positional;

        debug!(
            set = self.flags.values().filter(|f| f.value.is_some()).count(),
            positional = self.args.len(),
            "parsed command line"
        );
        Ok(())
    }

    /// Rendered usage text: every flag with its type, help and default.
    pub fn usage(&self) -> String {
        self.command().render_help().to_string()
    }

    /// Rewrite the single-dash grammar into `--name=value` tokens and split
    /// off the positional tail.
    fn normalize(&self, args: Vec<String>) -> Result<(Vec<String>, Vec<String>), EnvflagError> {
        let mut tokens = Vec::new();
        let mut iter = args.into_iter();

        while let Some(arg) = iter.next() {
            if arg == "--" {
                return Ok((tokens, iter.collect()));
            }
            if arg.len() < 2 || !arg.starts_with('-') {
                let mut rest = vec![arg];
                rest.extend(iter);
                return Ok((tokens, rest));
            }

            let body = arg[1..].strip_prefix('-').unwrap_or(&arg[1..]);
            if body.is_empty() || body.starts_with(['-', '=']) {
                return Err(EnvflagError::FlagSyntax(arg));
            }
            let (name, inline) = match body.split_once('=') {
                Some((name, value)) => (name, Some(value.to_string())),
                None => (body, None),
            };

            let Some(flag) = self.flags.get(name) else {
                if name == "h" || name == "help" {
                    return Err(EnvflagError::Help(self.usage()));
                }
                // clap reports it as unknown
                tokens.push(format!("--{body}"));
                continue;
            };

            let value = match inline {
                Some(value) => value,
                None if flag.kind == Kind::Bool => "true".to_string(),
                None => iter.next().ok_or_else(|| {
                    EnvflagError::FlagSyntax(format!("flag needs an argument: {arg}"))
                })?,
            };
            tokens.push(format!("--{name}={value}"));
        }

        Ok((tokens, Vec::new()))
    }

    fn command(&self) -> Command {
        let mut command = Command::new(self.name.clone())
            .no_binary_name(true)
            .disable_version_flag(true)
            .after_help(DASH_FORMS);
        if self.flags.contains_key("help") {
            command = command.disable_help_flag(true);
        }

        for flag in self.flags.values() {
            let mut arg = Arg::new(flag.name.clone())
                .long(flag.name.clone())
                .help(flag.help.clone())
                .value_name(flag.kind.type_name())
                .action(ArgAction::Append)
                .num_args(1)
                .allow_hyphen_values(true);
            if !flag.default.is_empty() {
                arg = arg.default_value(flag.default.clone());
            }
            command = command.arg(arg);
        }
        command
    }
}

/// Reject names the command-line grammar cannot address.
pub(crate) fn check_name(name: &str) -> Result<(), EnvflagError> {
    let unusable = name.is_empty()
        || name.starts_with('-')
        || name.contains('=')
        || name.contains(char::is_whitespace);
    if unusable {
        return Err(EnvflagError::InvalidSchema(format!(
            "{name:?} is not a usable flag name"
        )));
    }
    Ok(())
}

//! Line-oriented command shell over an [`Emitter`].
//!
//! Listeners are addressed by name. The first `on`/`once` that mentions a name
//! creates a listener for it; later commands with the same name reuse that
//! listener, so its identity is stable across `on`, `once` and `off`. Every
//! named listener reports `"<name> <- <payload>"` when invoked.

use std::collections::HashMap;
use std::str::FromStr;

use crossbeam::channel::{Receiver, Sender, unbounded};
use rusty_emitter::{Emitter, Listener};
use thiserror::Error;

use crate::logger::LogMessage;

const HELP: &[&str] = &[
    "on <event> <listener>      register a listener",
    "once <event> <listener>    register a listener for the next emit only",
    "off <event> <listener>     deregister a listener",
    "emit <event> [payload]     invoke the listeners of an event",
    "events                     list events and their listener counts",
    "verbose on|off             show emitter log records",
    "help                       show this help",
    "exit                       leave the shell",
];

/// A parsed shell command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    On { event: String, listener: String },
    Once { event: String, listener: String },
    Off { event: String, listener: String },
    Emit { event: String, payload: String },
    Events,
    Verbose(bool),
    Help,
    Exit,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ShellError {
    #[error("unknown command: {0} (try `help`)")]
    UnknownCommand(String),

    #[error("`{command}` is missing <{argument}>")]
    MissingArgument {
        command: &'static str,
        argument: &'static str,
    },

    #[error("invalid argument for `{command}`: {value}")]
    InvalidArgument { command: &'static str, value: String },

    #[error("no listener named {0}")]
    UnknownListener(String),

    #[error(transparent)]
    Emitter(#[from] rusty_emitter::Error),
}

/// What the shell should do after a command.
#[derive(Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Print these lines and read the next command.
    Continue(Vec<String>),
    Exit,
}

impl FromStr for Command {
    type Err = ShellError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let (word, rest) = split_word(line);
        match word {
            "on" => {
                let (event, listener) = event_and_listener("on", rest)?;
                Ok(Command::On { event, listener })
            }
            "once" => {
                let (event, listener) = event_and_listener("once", rest)?;
                Ok(Command::Once { event, listener })
            }
            "off" => {
                let (event, listener) = event_and_listener("off", rest)?;
                Ok(Command::Off { event, listener })
            }
            "emit" => {
                let (event, payload) = split_word(rest);
                if event.is_empty() {
                    return Err(ShellError::MissingArgument {
                        command: "emit",
                        argument: "event",
                    });
                }
                Ok(Command::Emit {
                    event: event.to_string(),
                    payload: payload.to_string(),
                })
            }
            "events" => Ok(Command::Events),
            "verbose" => match rest {
                "on" => Ok(Command::Verbose(true)),
                "off" => Ok(Command::Verbose(false)),
                "" => Err(ShellError::MissingArgument {
                    command: "verbose",
                    argument: "on|off",
                }),
                other => Err(ShellError::InvalidArgument {
                    command: "verbose",
                    value: other.to_string(),
                }),
            },
            "help" => Ok(Command::Help),
            "exit" | "quit" => Ok(Command::Exit),
            other => Err(ShellError::UnknownCommand(other.to_string())),
        }
    }
}

/// Splits off the first whitespace-delimited word; the remainder is trimmed.
fn split_word(s: &str) -> (&str, &str) {
    let s = s.trim();
    match s.find(char::is_whitespace) {
        Some(i) => (&s[..i], s[i..].trim()),
        None => (s, ""),
    }
}

fn event_and_listener(command: &'static str, rest: &str) -> Result<(String, String), ShellError> {
    let (event, rest) = split_word(rest);
    let (listener, extra) = split_word(rest);
    if event.is_empty() {
        return Err(ShellError::MissingArgument {
            command,
            argument: "event",
        });
    }
    if listener.is_empty() {
        return Err(ShellError::MissingArgument {
            command,
            argument: "listener",
        });
    }
    if !extra.is_empty() {
        return Err(ShellError::InvalidArgument {
            command,
            value: extra.to_string(),
        });
    }
    Ok((event.to_string(), listener.to_string()))
}

pub struct Shell {
    emitter: Emitter<String>,
    listeners: HashMap<String, Listener<String>>,
    sender: Sender<String>,
    received: Receiver<String>,
    records: Option<Receiver<LogMessage>>,
    verbose: bool,
}

impl Shell {
    pub fn new() -> Self {
        Self::with_emitter(Emitter::new())
    }

    pub fn with_emitter(emitter: Emitter<String>) -> Self {
        let (sender, received) = unbounded();
        Self {
            emitter,
            listeners: HashMap::new(),
            sender,
            received,
            records: None,
            verbose: false,
        }
    }

    /// Attaches the receiving end of a [`ChannelLogger`](crate::logger::ChannelLogger).
    pub fn with_log(mut self, records: Receiver<LogMessage>) -> Self {
        self.records = Some(records);
        self
    }

    /// Whether emitter log records should be shown.
    pub fn verbose(&self) -> bool {
        self.verbose
    }

    /// Takes every pending log record. They are formatted for printing when
    /// verbose is on and discarded otherwise.
    pub fn drain_log(&self) -> Vec<String> {
        let Some(records) = &self.records else {
            return Vec::new();
        };
        let pending = records.try_iter();
        if self.verbose {
            pending.map(|record| record.to_string()).collect()
        } else {
            pending.for_each(drop);
            Vec::new()
        }
    }

    pub fn execute(&mut self, command: Command) -> Result<Outcome, ShellError> {
        let lines = match command {
            Command::On { event, listener } => {
                let listener = self.listener(&listener);
                self.emitter.on(&event, listener);
                Vec::new()
            }
            Command::Once { event, listener } => {
                let listener = self.listener(&listener);
                self.emitter.once(&event, listener);
                Vec::new()
            }
            Command::Off { event, listener } => {
                let known = self
                    .listeners
                    .get(&listener)
                    .ok_or(ShellError::UnknownListener(listener))?;
                self.emitter.off(&event, known)?;
                Vec::new()
            }
            Command::Emit { event, payload } => {
                self.emitter.emit(&event, payload)?;
                self.received.try_iter().collect()
            }
            Command::Events => {
                let names = self.emitter.event_names();
                if names.is_empty() {
                    vec!["no events registered".to_string()]
                } else {
                    names
                        .into_iter()
                        .map(|name| {
                            let count = self.emitter.listener_count(&name);
                            format!("{name} ({count} listener(s))")
                        })
                        .collect()
                }
            }
            Command::Verbose(verbose) => {
                self.verbose = verbose;
                vec![format!("verbose {}", if verbose { "on" } else { "off" })]
            }
            Command::Help => HELP.iter().map(|line| line.to_string()).collect(),
            Command::Exit => return Ok(Outcome::Exit),
        };
        Ok(Outcome::Continue(lines))
    }

    /// Looks up the listener called `name`, creating it on first use.
    fn listener(&mut self, name: &str) -> Listener<String> {
        let sender = &self.sender;
        self.listeners
            .entry(name.to_string())
            .or_insert_with(|| {
                let sender = sender.clone();
                let name = name.to_string();
                Listener::new(move |payload: &String| {
                    let _ = sender.send(format!("{name} <- {payload}"));
                })
            })
            .clone()
    }
}

impl Default for Shell {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logger::ChannelLogger;
    use log::LevelFilter;
    use std::sync::{Mutex, MutexGuard, OnceLock};

    /// The process-wide logger is installed once. Receivers share one queue,
    /// so tests that drain it hold the guard for their whole run.
    fn log_records() -> (MutexGuard<'static, Receiver<LogMessage>>, Receiver<LogMessage>) {
        static RECORDS: OnceLock<Mutex<Receiver<LogMessage>>> = OnceLock::new();
        let guard = RECORDS
            .get_or_init(|| {
                let (logger, records) = ChannelLogger::with_receiver(LevelFilter::Debug);
                logger.install().unwrap();
                Mutex::new(records)
            })
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let records = guard.clone();
        (guard, records)
    }

    fn run(shell: &mut Shell, line: &str) -> Result<Vec<String>, ShellError> {
        match shell.execute(line.parse()?)? {
            Outcome::Continue(lines) => Ok(lines),
            Outcome::Exit => Ok(vec!["<exit>".to_string()]),
        }
    }

    // ==================== Parsing ====================

    #[test]
    fn parses_registration_commands() {
        assert_eq!(
            "on foo bar".parse::<Command>(),
            Ok(Command::On {
                event: "foo".into(),
                listener: "bar".into()
            })
        );
        assert_eq!(
            "  once   foo  bar ".parse::<Command>(),
            Ok(Command::Once {
                event: "foo".into(),
                listener: "bar".into()
            })
        );
        assert_eq!(
            "off foo bar".parse::<Command>(),
            Ok(Command::Off {
                event: "foo".into(),
                listener: "bar".into()
            })
        );
    }

    #[test]
    fn emit_payload_is_rest_of_line() {
        assert_eq!(
            "emit foo hello big world".parse::<Command>(),
            Ok(Command::Emit {
                event: "foo".into(),
                payload: "hello big world".into()
            })
        );
        assert_eq!(
            "emit foo".parse::<Command>(),
            Ok(Command::Emit {
                event: "foo".into(),
                payload: String::new()
            })
        );
    }

    #[test]
    fn rejects_malformed_commands() {
        assert_eq!(
            "on foo".parse::<Command>(),
            Err(ShellError::MissingArgument {
                command: "on",
                argument: "listener"
            })
        );
        assert_eq!(
            "emit".parse::<Command>(),
            Err(ShellError::MissingArgument {
                command: "emit",
                argument: "event"
            })
        );
        assert_eq!(
            "off foo bar baz".parse::<Command>(),
            Err(ShellError::InvalidArgument {
                command: "off",
                value: "baz".into()
            })
        );
        assert_eq!(
            "verbose maybe".parse::<Command>(),
            Err(ShellError::InvalidArgument {
                command: "verbose",
                value: "maybe".into()
            })
        );
        assert_eq!(
            "publish foo".parse::<Command>(),
            Err(ShellError::UnknownCommand("publish".into()))
        );
    }

    // ==================== Execution ====================

    #[test]
    fn register_emit_deregister() {
        let mut shell = Shell::new();

        run(&mut shell, "on foo bar").unwrap();
        assert_eq!(run(&mut shell, "emit foo world").unwrap(), vec!["bar <- world"]);

        run(&mut shell, "off foo bar").unwrap();
        assert_eq!(
            run(&mut shell, "emit foo world"),
            Err(ShellError::Emitter(rusty_emitter::Error::EventNotRegistered {
                event: "foo".into()
            }))
        );
    }

    #[test]
    fn once_fires_a_single_time() {
        let mut shell = Shell::new();

        run(&mut shell, "once foo callback").unwrap();
        assert_eq!(run(&mut shell, "emit foo 1").unwrap(), vec!["callback <- 1"]);
        assert!(matches!(
            run(&mut shell, "emit foo 2"),
            Err(ShellError::Emitter(_))
        ));
    }

    #[test]
    fn named_listener_keeps_identity() {
        let mut shell = Shell::new();

        run(&mut shell, "on foo bar").unwrap();
        run(&mut shell, "on foo bar").unwrap();
        run(&mut shell, "on foo baz").unwrap();

        assert_eq!(
            run(&mut shell, "emit foo x").unwrap(),
            vec!["bar <- x", "bar <- x", "baz <- x"]
        );

        run(&mut shell, "off foo bar").unwrap();
        assert_eq!(
            run(&mut shell, "emit foo y").unwrap(),
            vec!["bar <- y", "baz <- y"]
        );
    }

    #[test]
    fn off_unknown_names() {
        let mut shell = Shell::new();

        assert_eq!(
            run(&mut shell, "off foo ghost"),
            Err(ShellError::UnknownListener("ghost".into()))
        );

        run(&mut shell, "on foo bar").unwrap();
        assert_eq!(
            run(&mut shell, "off other bar"),
            Err(ShellError::Emitter(rusty_emitter::Error::ListenerNotFound {
                event: "other".into()
            }))
        );
    }

    #[test]
    fn events_lists_counts() {
        let mut shell = Shell::new();
        assert_eq!(run(&mut shell, "events").unwrap(), vec!["no events registered"]);

        run(&mut shell, "on foo a").unwrap();
        run(&mut shell, "on foo b").unwrap();
        run(&mut shell, "once bar a").unwrap();

        assert_eq!(
            run(&mut shell, "events").unwrap(),
            vec!["bar (1 listener(s))", "foo (2 listener(s))"]
        );
    }

    #[test]
    fn verbose_and_exit() {
        let mut shell = Shell::new();
        assert!(!shell.verbose());

        assert_eq!(run(&mut shell, "verbose on").unwrap(), vec!["verbose on"]);
        assert!(shell.verbose());

        assert_eq!(run(&mut shell, "help").unwrap().len(), HELP.len());
        assert_eq!(shell.execute(Command::Exit), Ok(Outcome::Exit));
    }

    // ==================== Logging ====================

    #[test]
    fn verbose_shows_emitter_records() {
        let (_guard, records) = log_records();
        let mut shell = Shell::new().with_log(records);
        run(&mut shell, "verbose on").unwrap();

        run(&mut shell, "on audit-trail bar").unwrap();
        assert_eq!(run(&mut shell, "emit audit-trail x").unwrap(), vec!["bar <- x"]);

        let lines = shell.drain_log();
        assert!(
            lines
                .iter()
                .any(|line| line.contains("rusty_emitter") && line.contains("on 'audit-trail'"))
        );
        assert!(
            lines
                .iter()
                .any(|line| line.contains("emit 'audit-trail': 1 listener(s)"))
        );
    }

    #[test]
    fn quiet_shell_discards_records() {
        let (_guard, records) = log_records();
        let mut shell = Shell::new().with_log(records);

        run(&mut shell, "on quiet-trail bar").unwrap();
        run(&mut shell, "emit quiet-trail x").unwrap();

        assert!(shell.drain_log().is_empty());
    }

    #[test]
    fn drain_without_logger_is_empty() {
        let mut shell = Shell::new();
        run(&mut shell, "verbose on").unwrap();

        assert!(shell.drain_log().is_empty());
    }
}

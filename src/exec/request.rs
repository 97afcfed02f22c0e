// src/exec/request.rs

//! What to run: the command line plus the cosmetic bits handed to the
//! progress surface.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use tokio::process::Command;

/// A command line, either as an argv list or as a shell string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandSpec {
    /// Program plus arguments, no shell interpretation.
    Argv(Vec<String>),
    /// A string handed to `sh -c`.
    Shell(String),
}

impl CommandSpec {
    pub fn argv<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        CommandSpec::Argv(args.into_iter().map(Into::into).collect())
    }

    pub fn shell(cmd: impl Into<String>) -> Self {
        CommandSpec::Shell(cmd.into())
    }

    /// Interpret a plain string the way callers pass them.
    ///
    /// A single word (`"true"`, `"/sbin/mounted.ocfs2"`) is run directly;
    /// anything containing whitespace goes through the shell.
    pub fn from_string(cmd: &str) -> Self {
        let trimmed = cmd.trim();
        if trimmed.split_whitespace().nth(1).is_none() {
            CommandSpec::Argv(vec![trimmed.to_string()])
        } else {
            CommandSpec::Shell(cmd.to_string())
        }
    }

    /// Build the tokio command. `None` for an empty argv.
    pub(crate) fn to_command(&self) -> Option<Command> {
        match self {
            CommandSpec::Argv(args) => {
                let (program, rest) = args.split_first()?;
                if program.is_empty() {
                    return None;
                }
                let mut c = Command::new(program);
                c.args(rest);
                Some(c)
            }
            CommandSpec::Shell(s) => {
                let mut c = Command::new("sh");
                c.arg("-c").arg(s);
                Some(c)
            }
        }
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandSpec::Argv(args) => f.write_str(&args.join(" ")),
            CommandSpec::Shell(s) => write!(f, "sh -c {s:?}"),
        }
    }
}

/// Opaque context forwarded to the progress surface (e.g. a parent window).
///
/// The runner never looks inside it.
#[derive(Clone)]
pub struct ParentHandle(Arc<dyn Any + Send + Sync>);

impl ParentHandle {
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self(Arc::new(value))
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref::<T>()
    }
}

impl fmt::Debug for ParentHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ParentHandle(..)")
    }
}

/// One command to supervise.
///
/// Fields are private so a request can't change once it is handed to the
/// runner; build it with the `with_*` methods.
#[derive(Debug, Clone)]
pub struct ProcessRequest {
    command: CommandSpec,
    title: String,
    desc: String,
    parent: Option<ParentHandle>,
    spin_now: bool,
}

impl ProcessRequest {
    pub fn new(command: CommandSpec) -> Self {
        Self {
            command,
            title: String::new(),
            desc: String::new(),
            parent: None,
            spin_now: false,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_desc(mut self, desc: impl Into<String>) -> Self {
        self.desc = desc.into();
        self
    }

    pub fn with_parent(mut self, parent: ParentHandle) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Show progress from the start and use the long timeout budget.
    pub fn with_spin_now(mut self, spin_now: bool) -> Self {
        self.spin_now = spin_now;
        self
    }

    pub fn command(&self) -> &CommandSpec {
        &self.command
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn desc(&self) -> &str {
        &self.desc
    }

    pub fn parent(&self) -> Option<&ParentHandle> {
        self.parent.as_ref()
    }

    pub fn spin_now(&self) -> bool {
        self.spin_now
    }
}

use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::Utc;
use ftree_core::{FileTree, Stat};
use parking_lot::Mutex;
use thiserror::Error;

/// One line of driver input, parsed into a concrete operation. Mirrors
/// `ftree_core::cli::Command` but reads from whitespace-separated stdin
/// lines instead of process argv, since a single driver process runs many
/// commands over one long-lived tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriverCommand {
    Init,
    Destroy,
    Mkdir(String),
    Write(String, String),
    Replace(String, String),
    Rm(String),
    Rmdir(String),
    Stat(String),
    Ls,
    Validate,
    Quit,
}

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("empty command")]
    Empty,
    #[error("unknown command: {0}")]
    Unknown(String),
    #[error("{0} requires a path argument")]
    MissingPath(String),
    #[error("{0} requires a path and contents")]
    MissingContents(String),
}

/// Parses one line of driver input. `write`/`replace` take the remainder of
/// the line after the path as the literal contents — no quoting support,
/// this is a line-oriented protocol, not a shell.
pub fn parse_line(line: &str) -> Result<DriverCommand, ParseError> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Err(ParseError::Empty);
    }
    let mut parts = trimmed.splitn(3, ' ');
    let verb = parts.next().unwrap_or_default();

    match verb {
        "init" => Ok(DriverCommand::Init),
        "destroy" => Ok(DriverCommand::Destroy),
        "ls" => Ok(DriverCommand::Ls),
        "validate" => Ok(DriverCommand::Validate),
        "quit" | "exit" => Ok(DriverCommand::Quit),
        "mkdir" => parts
            .next()
            .map(|p| DriverCommand::Mkdir(p.to_string()))
            .ok_or_else(|| ParseError::MissingPath(verb.to_string())),
        "rm" => parts
            .next()
            .map(|p| DriverCommand::Rm(p.to_string()))
            .ok_or_else(|| ParseError::MissingPath(verb.to_string())),
        "rmdir" => parts
            .next()
            .map(|p| DriverCommand::Rmdir(p.to_string()))
            .ok_or_else(|| ParseError::MissingPath(verb.to_string())),
        "stat" => parts
            .next()
            .map(|p| DriverCommand::Stat(p.to_string()))
            .ok_or_else(|| ParseError::MissingPath(verb.to_string())),
        "write" | "replace" => {
            let path = parts.next().ok_or_else(|| ParseError::MissingContents(verb.to_string()))?;
            let contents = parts.next().unwrap_or("").to_string();
            if verb == "write" {
                Ok(DriverCommand::Write(path.to_string(), contents))
            } else {
                Ok(DriverCommand::Replace(path.to_string(), contents))
            }
        }
        other => Err(ParseError::Unknown(other.to_string())),
    }
}

/// Running counters reported when the driver shuts down.
#[derive(Debug, Default, Clone, Copy)]
pub struct Summary {
    pub ops_run: usize,
    pub ops_failed: usize,
}

/// A long-lived tree guarded by a mutex, plus the counters a `ctrlc` handler
/// needs to print a summary on the way out. The mutex exists for the same
/// reason the teacher wraps shared state in `parking_lot` — not because the
/// tree is accessed from more than one thread here, but because it is the
/// idiomatic guard to put around state the signal handler and the main loop
/// both need a handle to.
pub struct Session {
    tree: Mutex<FileTree>,
    ops_run: AtomicUsize,
    ops_failed: AtomicUsize,
}

impl Session {
    pub fn new() -> Self {
        let mut tree = FileTree::new();
        tree.initialize().expect("fresh tree always initializes");
        Session {
            tree: Mutex::new(tree),
            ops_run: AtomicUsize::new(0),
            ops_failed: AtomicUsize::new(0),
        }
    }

    pub fn summary(&self) -> Summary {
        Summary {
            ops_run: self.ops_run.load(Ordering::Relaxed),
            ops_failed: self.ops_failed.load(Ordering::Relaxed),
        }
    }

    /// Runs one command against the tree, logging the outcome, and returns
    /// the line that should be echoed back to the operator.
    pub fn execute(&self, command: DriverCommand) -> String {
        self.ops_run.fetch_add(1, Ordering::Relaxed);
        let timestamp = Utc::now().to_rfc3339();
        let result = self.dispatch(&command);

        match &result {
            Ok(line) => {
                log::info!("[{timestamp}] {command:?} -> ok");
                line.clone()
            }
            Err(err) => {
                self.ops_failed.fetch_add(1, Ordering::Relaxed);
                log::warn!("[{timestamp}] {command:?} -> {err}");
                format!("error: {err}")
            }
        }
    }

    fn dispatch(&self, command: &DriverCommand) -> anyhow::Result<String> {
        let mut tree = self.tree.lock();
        match command {
            DriverCommand::Init => {
                tree.initialize()?;
                Ok("initialized".to_string())
            }
            DriverCommand::Destroy => {
                tree.destroy()?;
                Ok("destroyed".to_string())
            }
            DriverCommand::Mkdir(path) => {
                tree.insert_directory(path)?;
                Ok(format!("created directory {path}"))
            }
            DriverCommand::Write(path, contents) => {
                let bytes = contents.as_bytes().to_vec();
                let len = bytes.len();
                tree.insert_file(path, bytes)?;
                Ok(format!("created file {path} ({len} bytes)"))
            }
            DriverCommand::Replace(path, contents) => {
                let bytes = contents.as_bytes().to_vec();
                let old = tree
                    .replace_file_contents(path, bytes)
                    .ok_or_else(|| anyhow::anyhow!("no such file: {path}"))?;
                Ok(format!("replaced {path}, discarded {} old bytes", old.len()))
            }
            DriverCommand::Rm(path) => {
                tree.remove_file(path)?;
                Ok(format!("removed file {path}"))
            }
            DriverCommand::Rmdir(path) => {
                tree.remove_directory(path)?;
                Ok(format!("removed directory {path}"))
            }
            DriverCommand::Stat(path) => {
                let Stat { is_file, size } = tree.stat(path)?;
                let kind = if is_file { "file" } else { "directory" };
                Ok(format!("{path}: {kind}, {size} bytes"))
            }
            DriverCommand::Ls => Ok(tree.serialize()?),
            DriverCommand::Validate => {
                let violations = ftree_core::validate(&tree);
                if violations.is_empty() {
                    Ok("tree is structurally valid".to_string())
                } else {
                    for violation in &violations {
                        log::error!("structural violation: {violation:?}");
                    }
                    Ok(format!("{} structural violation(s) found", violations.len()))
                }
            }
            DriverCommand::Quit => Ok("bye".to_string()),
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Session::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_known_verb() {
        assert_eq!(parse_line("init").unwrap(), DriverCommand::Init);
        assert_eq!(
            parse_line("mkdir a/b").unwrap(),
            DriverCommand::Mkdir("a/b".to_string())
        );
        assert_eq!(
            parse_line("write a/f hello world").unwrap(),
            DriverCommand::Write("a/f".to_string(), "hello world".to_string())
        );
        assert_eq!(parse_line("ls").unwrap(), DriverCommand::Ls);
        assert_eq!(parse_line("quit").unwrap(), DriverCommand::Quit);
    }

    #[test]
    fn rejects_empty_and_unknown_lines() {
        assert!(matches!(parse_line(""), Err(ParseError::Empty)));
        assert!(matches!(parse_line("   "), Err(ParseError::Empty)));
        assert!(matches!(parse_line("frobnicate a"), Err(ParseError::Unknown(_))));
        assert!(matches!(parse_line("mkdir"), Err(ParseError::MissingPath(_))));
    }

    #[test]
    fn session_tracks_ops_and_failures() {
        let session = Session::new();
        session.execute(DriverCommand::Mkdir("a".to_string()));
        session.execute(DriverCommand::Mkdir("a".to_string()));
        let summary = session.summary();
        assert_eq!(summary.ops_run, 2);
        assert_eq!(summary.ops_failed, 1);
    }

    #[test]
    fn write_then_stat_round_trips_through_the_session() {
        let session = Session::new();
        session.execute(DriverCommand::Write("a/f".to_string(), "hi".to_string()));
        let out = session.execute(DriverCommand::Stat("a/f".to_string()));
        assert_eq!(out, "a/f: file, 2 bytes");
    }
}

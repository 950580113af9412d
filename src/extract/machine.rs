//! Per-file extraction state machine
//!
//! Transitions:
//!
//! | state         | line          | next          | effect                              |
//! |---------------|---------------|---------------|-------------------------------------|
//! | `Idle`        | comment       | `InComment`   | start comment buffer                |
//! | `Idle`        | statement     | `InStatement` | start statement, no comment         |
//! | `Idle`        | other         | `Idle`        | discard                             |
//! | `InComment`   | comment       | `InComment`   | append to comment                   |
//! | `InComment`   | statement     | `InStatement` | comment becomes the pending comment |
//! | `InComment`   | blank         | `Idle`        | drop the comment                    |
//! | `InComment`   | other         | `InComment`   | append to comment                   |
//! | `InStatement` | any           | `InStatement` | append; emit + `Idle` on `;`        |
//!
//! At end of input an open statement is emitted flagged unterminated and an
//! open comment is dropped.

use std::mem;
use std::path::{Path, PathBuf};

use super::classifier::{Dialect, LineKind};
use crate::models::{Provenance, Query};

#[derive(Debug, Default, PartialEq, Eq)]
enum State {
    #[default]
    Idle,
    InComment {
        lines: Vec<String>,
    },
    InStatement {
        comment: String,
        lines: Vec<String>,
        start_line: usize,
    },
}

/// Incremental extractor fed one line at a time.
#[derive(Debug)]
pub struct Extractor<'d> {
    dialect: &'d Dialect,
    file: PathBuf,
    state: State,
    queries: Vec<Query>,
}

impl<'d> Extractor<'d> {
    pub fn new(dialect: &'d Dialect, file: impl Into<PathBuf>) -> Self {
        Self {
            dialect,
            file: file.into(),
            state: State::Idle,
            queries: Vec::new(),
        }
    }

    /// Feed the next line; `line_no` is 1-based.
    pub fn push_line(&mut self, line_no: usize, line: &str) {
        let kind = self.dialect.classify(line);
        let state = mem::take(&mut self.state);

        self.state = match (state, kind) {
            (State::Idle, LineKind::Comment) => State::InComment {
                lines: vec![self.comment_text(line)],
            },
            (State::Idle, LineKind::Statement) => {
                self.open_statement(String::new(), line_no, line)
            }
            (State::Idle, LineKind::Unrecognized) => State::Idle,

            (State::InComment { mut lines }, LineKind::Comment) => {
                lines.push(self.comment_text(line));
                State::InComment { lines }
            }
            (State::InComment { lines }, LineKind::Statement) => {
                self.open_statement(lines.join("\n"), line_no, line)
            }
            (State::InComment { .. }, LineKind::Unrecognized) if line.trim().is_empty() => {
                State::Idle
            }
            (State::InComment { mut lines }, LineKind::Unrecognized) => {
                lines.push(line.trim().to_string());
                State::InComment { lines }
            }

            (
                State::InStatement {
                    comment,
                    mut lines,
                    start_line,
                },
                _,
            ) => {
                lines.push(line.trim_end().to_string());
                self.close_if_terminated(comment, lines, start_line)
            }
        };
    }

    /// Flush any open region and return the extracted queries in order.
    pub fn finish(mut self) -> Vec<Query> {
        match mem::take(&mut self.state) {
            State::InStatement {
                comment,
                lines,
                start_line,
            } => {
                tracing::warn!(
                    file = %self.file.display(),
                    line = start_line,
                    "statement not terminated by ';' before end of file"
                );
                self.emit(comment, lines, start_line, true);
            }
            State::InComment { lines } => {
                tracing::debug!(
                    file = %self.file.display(),
                    lines = lines.len(),
                    "discarding trailing comment"
                );
            }
            State::Idle => {}
        }
        self.queries
    }

    fn comment_text(&self, line: &str) -> String {
        self.dialect
            .strip_comment(line)
            .unwrap_or_default()
            .to_string()
    }

    fn open_statement(&mut self, comment: String, line_no: usize, line: &str) -> State {
        self.close_if_terminated(comment, vec![line.trim().to_string()], line_no)
    }

    fn close_if_terminated(&mut self, comment: String, lines: Vec<String>, start_line: usize) -> State {
        let terminated = lines
            .last()
            .map(|l| l.trim_end().ends_with(';'))
            .unwrap_or(false);

        if terminated {
            self.emit(comment, lines, start_line, false);
            State::Idle
        } else {
            State::InStatement {
                comment,
                lines,
                start_line,
            }
        }
    }

    fn emit(&mut self, comment: String, lines: Vec<String>, start_line: usize, unterminated: bool) {
        let text = lines.join("\n").trim_end().to_string();
        let source = Provenance {
            file: self.file.clone(),
            line: start_line,
            unterminated,
        };
        self.queries.push(Query::new(comment, text, source));
    }
}

/// Extract all queries from the contents of one file.
///
/// A leading UTF-8 byte-order mark is ignored.
pub fn extract_str(content: &str, dialect: &Dialect, file: &Path) -> Vec<Query> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let mut extractor = Extractor::new(dialect, file);
    for (idx, line) in content.lines().enumerate() {
        extractor.push_line(idx + 1, line);
    }
    extractor.finish()
}

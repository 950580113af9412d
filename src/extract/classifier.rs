//! Line classification for query files
//!
//! Purely lexical: a line is a comment if it starts with one of the dialect's
//! comment markers, a statement start if its first word is a known SQL verb,
//! and unrecognized otherwise.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::backend::BackendFamily;

static STATEMENT_START: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^\s*(SELECT|INSERT|UPDATE|DELETE|CREATE|ALTER|DROP|TRUNCATE|REPLACE|MERGE)\b",
    )
    .expect("statement-start pattern is valid")
});

/// Kind of a single source line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Comment,
    Statement,
    Unrecognized,
}

/// Comment syntax of a SQL dialect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dialect {
    comment_prefixes: Vec<&'static str>,
}

impl Dialect {
    pub fn new(comment_prefixes: Vec<&'static str>) -> Self {
        Self { comment_prefixes }
    }

    pub fn mysql() -> Self {
        Self::new(vec!["--", "#"])
    }

    pub fn for_family(family: BackendFamily) -> Self {
        match family {
            BackendFamily::MySql => Self::mysql(),
        }
    }

    /// Classify one line. Total and side-effect free.
    pub fn classify(&self, line: &str) -> LineKind {
        if self.comment_marker(line).is_some() {
            LineKind::Comment
        } else if is_statement_start(line) {
            LineKind::Statement
        } else {
            LineKind::Unrecognized
        }
    }

    /// Comment text without its marker, or `None` if the line is not a comment.
    pub fn strip_comment<'a>(&self, line: &'a str) -> Option<&'a str> {
        let trimmed = line.trim_start();
        self.comment_marker(line)
            .map(|marker| trimmed[marker.len()..].trim())
    }

    fn comment_marker(&self, line: &str) -> Option<&'static str> {
        let trimmed = line.trim_start();
        self.comment_prefixes
            .iter()
            .copied()
            .find(|prefix| trimmed.starts_with(prefix))
    }
}

impl Default for Dialect {
    fn default() -> Self {
        Self::mysql()
    }
}

pub fn is_statement_start(line: &str) -> bool {
    STATEMENT_START.is_match(line)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_comments() {
        let dialect = Dialect::mysql();
        assert_eq!(dialect.classify("-- get all"), LineKind::Comment);
        assert_eq!(dialect.classify("   # hash style"), LineKind::Comment);
        assert_eq!(dialect.classify("--"), LineKind::Comment);
    }

    #[test]
    fn test_classify_statements() {
        let dialect = Dialect::mysql();
        for line in [
            "SELECT * FROM t;",
            "  select 1",
            "InSeRt INTO t VALUES (1);",
            "update t set a = 1",
            "DELETE FROM t",
            "CREATE TABLE t (id INT);",
            "alter table t add c int",
            "DROP TABLE t;",
            "TRUNCATE t;",
            "REPLACE INTO t VALUES (1);",
            "MERGE INTO t USING s ON (t.id = s.id)",
        ] {
            assert_eq!(dialect.classify(line), LineKind::Statement, "{}", line);
        }
    }

    #[test]
    fn test_classify_unrecognized() {
        let dialect = Dialect::mysql();
        assert_eq!(dialect.classify(""), LineKind::Unrecognized);
        assert_eq!(dialect.classify("    "), LineKind::Unrecognized);
        assert_eq!(dialect.classify("FROM users"), LineKind::Unrecognized);
        assert_eq!(dialect.classify("WHERE id = 1;"), LineKind::Unrecognized);
        // keyword must be a whole word
        assert_eq!(dialect.classify("selection;"), LineKind::Unrecognized);
        assert_eq!(dialect.classify("x SELECT 1;"), LineKind::Unrecognized);
    }

    #[test]
    fn test_comment_wins_over_statement() {
        let dialect = Dialect::mysql();
        assert_eq!(dialect.classify("-- SELECT * FROM t;"), LineKind::Comment);
    }

    #[test]
    fn test_classify_is_idempotent() {
        let dialect = Dialect::mysql();
        for line in ["-- c", "SELECT 1;", "junk", ""] {
            assert_eq!(dialect.classify(line), dialect.classify(line));
        }
    }

    #[test]
    fn test_custom_dialect() {
        let dialect = Dialect::new(vec!["//"]);
        assert_eq!(dialect.classify("// note"), LineKind::Comment);
        assert_eq!(dialect.classify("-- note"), LineKind::Unrecognized);
    }

    #[test]
    fn test_strip_comment() {
        let dialect = Dialect::mysql();
        assert_eq!(dialect.strip_comment("  --  get all  "), Some("get all"));
        assert_eq!(dialect.strip_comment("#x"), Some("x"));
        assert_eq!(dialect.strip_comment("SELECT 1;"), None);
    }
}

//! Extraction over real files and directories.

use std::fs;

use query_tester::extract::{extract_path, Dialect, LineKind};
use query_tester::QueryTesterError;
use tempfile::TempDir;

#[tokio::test]
async fn test_commented_query_file() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("q.sql");
    fs::write(&file, "-- get all\nSELECT * FROM t;\n").unwrap();

    let queries = extract_path(&file, &Dialect::mysql()).await.unwrap();

    assert_eq!(queries.len(), 1);
    assert_eq!(queries[0].comment(), "get all");
    assert_eq!(queries[0].text(), "SELECT * FROM t;");
    assert_eq!(queries[0].source().file, file);
    assert_eq!(queries[0].source().line, 2);
}

#[tokio::test]
async fn test_directory_is_sorted_and_filtered() {
    let dir = TempDir::new().unwrap();
    // written out of order on purpose
    fs::write(dir.path().join("b.sql"), "-- from b\nSELECT 'b';\n").unwrap();
    fs::write(dir.path().join("c.txt"), "SELECT 'c';\n").unwrap();
    fs::write(
        dir.path().join("a.sql"),
        "SELECT 'a1';\n\n# second\nSELECT\n  'a2'\n;\n",
    )
    .unwrap();

    let queries = extract_path(dir.path(), &Dialect::mysql()).await.unwrap();

    let files: Vec<String> = queries
        .iter()
        .map(|q| {
            q.source()
                .file
                .file_name()
                .unwrap()
                .to_string_lossy()
                .into_owned()
        })
        .collect();
    assert_eq!(files, vec!["a.sql", "a.sql", "b.sql"]);
    assert_eq!(queries[1].comment(), "second");
    assert_eq!(queries[1].text(), "SELECT\n  'a2'\n;");
    assert_eq!(queries[2].comment(), "from b");
}

#[tokio::test]
async fn test_unterminated_tail_is_flagged() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("tail.sql");
    fs::write(&file, "SELECT 1;\nUPDATE t\nSET a = 2\nWHERE id = 3").unwrap();

    let queries = extract_path(&file, &Dialect::mysql()).await.unwrap();

    assert_eq!(queries.len(), 2);
    assert!(queries[1].is_unterminated());
    assert_eq!(queries[1].text(), "UPDATE t\nSET a = 2\nWHERE id = 3");
}

#[tokio::test]
async fn test_file_with_byte_order_mark() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("windows.sql");
    fs::write(&file, b"\xEF\xBB\xBF-- saved with BOM\r\nSELECT 1;\r\n").unwrap();

    let queries = extract_path(&file, &Dialect::mysql()).await.unwrap();

    assert_eq!(queries.len(), 1);
    assert_eq!(queries[0].comment(), "saved with BOM");
    assert_eq!(queries[0].text(), "SELECT 1;");
}

#[tokio::test]
async fn test_missing_directory_is_path_error() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("does-not-exist");

    let err = extract_path(&missing, &Dialect::mysql()).await.unwrap_err();

    assert!(matches!(err, QueryTesterError::Path { .. }));
    assert!(err.to_string().contains("does-not-exist"));
}

#[test]
fn test_every_line_has_exactly_one_kind() {
    let dialect = Dialect::mysql();
    let samples = [
        "",
        "   ",
        "-- c",
        "#",
        "SELECT",
        "select 1;",
        "FROM t",
        ";",
        "MERGE INTO x",
        "ünïcödé",
        "\t-- tabbed comment",
    ];
    for line in samples {
        let kind = dialect.classify(line);
        assert!(matches!(
            kind,
            LineKind::Comment | LineKind::Statement | LineKind::Unrecognized
        ));
        assert_eq!(kind, dialect.classify(line));
    }
}

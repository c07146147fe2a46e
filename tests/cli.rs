use assert_cmd::Command;
use predicates::prelude::*;
use rusqlite::Connection;
use tempfile::NamedTempFile;

fn sales_db() -> NamedTempFile {
    let file = NamedTempFile::new().unwrap();
    let conn = Connection::open(file.path()).unwrap();
    conn.execute_batch(
        r#"
        CREATE TABLE sales_data (id INTEGER, amount INTEGER);
        INSERT INTO sales_data VALUES (1, 10), (2, 20), (3, 30);
        CREATE TABLE regions (name TEXT);
        "#,
    )
    .unwrap();
    file
}

fn cmd() -> Command {
    let mut cmd = Command::cargo_bin("sqlite-tables").unwrap();
    cmd.env_remove("SQLITE_TABLES_DB").env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_preview_default_table() {
    let db = sales_db();
    cmd()
        .arg(db.path())
        .assert()
        .success()
        .stdout("   id  amount\n0   1      10\n1   2      20\n2   3      30\n");
}

#[test]
fn test_preview_rows_and_json() {
    let db = sales_db();
    cmd()
        .arg(db.path())
        .args(["--rows", "1", "--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"amount\": 10"))
        .stdout(predicate::str::contains("20").not());
}

#[test]
fn test_path_from_env() {
    let db = sales_db();
    cmd()
        .env("SQLITE_TABLES_DB", db.path())
        .args(["--table", "regions"])
        .assert()
        .success()
        .stdout("Empty table\nColumns: [name]\nIndex: []\n");
}

#[test]
fn test_list() {
    let db = sales_db();
    cmd()
        .arg(db.path())
        .arg("--list")
        .assert()
        .success()
        .stdout("sales_data (3 rows): id integer, amount integer\nregions (0 rows): name text\n");
}

#[test]
fn test_config_file() {
    let db = sales_db();
    let mut config = NamedTempFile::new().unwrap();
    let toml = format!("db_path = {:?}\nrows = 2\n", db.path().display().to_string());
    std::io::Write::write_all(&mut config, toml.as_bytes()).unwrap();

    cmd()
        .arg("--config")
        .arg(config.path())
        .assert()
        .success()
        .stdout("   id  amount\n0   1      10\n1   2      20\n");
}

#[test]
fn test_missing_table_fails() {
    let db = sales_db();
    cmd()
        .arg(db.path())
        .args(["--table", "customers"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("table 'customers' not found"));
}

#[test]
fn test_missing_database_fails() {
    let dir = tempfile::tempdir().unwrap();
    cmd()
        .arg(dir.path().join("nope.db"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot open database"));
}

#[test]
fn test_no_path_fails() {
    cmd()
        .assert()
        .failure()
        .stderr(predicate::str::contains("no database path given"));
}

#[test]
fn test_row_limit_fails() {
    let db = sales_db();
    cmd()
        .arg(db.path())
        .args(["--max-rows", "2"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("has more than 2 rows"));
}

#[test]
fn test_help_documents_json_encoding() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("{\"blob\": \"<hex>\"}"))
        .stdout(predicate::str::contains("written as null"));
}

//! T-SQL text issued by the provisioner.

use std::borrow::Cow;
use std::path::{Path, PathBuf};

pub const DATABASE_ID_QUERY: &str = "SELECT database_id FROM sys.databases WHERE name = @P1";

/// Non-null once the server reports the database as usable.
pub const DATABASE_COLLATION_QUERY: &str =
    "SELECT CAST(DATABASEPROPERTYEX(@P1, 'Collation') AS nvarchar(128))";

pub const BEGIN_SCRIPT_TRANSACTION: &str = "SET XACT_ABORT ON; BEGIN TRANSACTION";
pub const COMMIT_SCRIPT_TRANSACTION: &str = "COMMIT TRANSACTION";
pub const ROLLBACK_SCRIPT_TRANSACTION: &str = "IF @@TRANCOUNT > 0 ROLLBACK TRANSACTION";

/// Logical names and physical paths of a new database's data and log files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseFiles {
    pub data_name: String,
    pub data_path: PathBuf,
    pub log_name: String,
    pub log_path: PathBuf,
}

impl DatabaseFiles {
    pub fn new(data_dir: &Path, database: &str) -> Self {
        Self {
            data_name: format!("{database}_Data"),
            data_path: data_dir.join(format!("{database}_data.mdf")),
            log_name: format!("{database}_Log"),
            log_path: data_dir.join(format!("{database}_log.ldf")),
        }
    }
}

/// `CREATE DATABASE` with explicit file placement. Sizes and growth are left
/// to the server defaults.
pub fn create_database_statement(database: &str, files: &DatabaseFiles) -> String {
    format!(
        "CREATE DATABASE {} ON PRIMARY (NAME = {}, FILENAME = {}) LOG ON (NAME = {}, FILENAME = {})",
        quote_identifier(database),
        quote_identifier(&files.data_name),
        quote_literal(&files.data_path.to_string_lossy()),
        quote_identifier(&files.log_name),
        quote_literal(&files.log_path.to_string_lossy()),
    )
}

/// Regular identifiers are emitted as-is; anything else, including reserved
/// keywords, is bracket-delimited.
pub fn quote_identifier(name: &str) -> Cow<'_, str> {
    if is_regular_identifier(name) && !is_reserved_keyword(name) {
        Cow::Borrowed(name)
    } else {
        Cow::Owned(format!("[{}]", name.replace(']', "]]")))
    }
}

// A leading `#` or `@` would make the name a temp object or a variable.
fn is_regular_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first.is_alphabetic() || first == '_')
        && chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | '@' | '$' | '#'))
}

fn is_reserved_keyword(name: &str) -> bool {
    let upper = name.to_ascii_uppercase();
    RESERVED_KEYWORDS.contains(&upper.as_str())
}

const RESERVED_KEYWORDS: &[&str] = &[
    "ADD", "ALL", "ALTER", "AND", "ANY", "AS", "ASC", "AUTHORIZATION", "BACKUP", "BEGIN",
    "BETWEEN", "BREAK", "BROWSE", "BULK", "BY", "CASCADE", "CASE", "CHECK", "CHECKPOINT",
    "CLOSE", "CLUSTERED", "COALESCE", "COLLATE", "COLUMN", "COMMIT", "COMPUTE", "CONSTRAINT",
    "CONTAINS", "CONTAINSTABLE", "CONTINUE", "CONVERT", "CREATE", "CROSS", "CURRENT",
    "CURRENT_DATE", "CURRENT_TIME", "CURRENT_TIMESTAMP", "CURRENT_USER", "CURSOR", "DATABASE",
    "DBCC", "DEALLOCATE", "DECLARE", "DEFAULT", "DELETE", "DENY", "DESC", "DISK", "DISTINCT",
    "DISTRIBUTED", "DOUBLE", "DROP", "DUMP", "ELSE", "END", "ERRLVL", "ESCAPE", "EXCEPT",
    "EXEC", "EXECUTE", "EXISTS", "EXIT", "EXTERNAL", "FETCH", "FILE", "FILLFACTOR", "FOR",
    "FOREIGN", "FREETEXT", "FREETEXTTABLE", "FROM", "FULL", "FUNCTION", "GOTO", "GRANT",
    "GROUP", "HAVING", "HOLDLOCK", "IDENTITY", "IDENTITY_INSERT", "IDENTITYCOL", "IF", "IN",
    "INDEX", "INNER", "INSERT", "INTERSECT", "INTO", "IS", "JOIN", "KEY", "KILL", "LEFT",
    "LIKE", "LINENO", "LOAD", "MERGE", "NATIONAL", "NOCHECK", "NONCLUSTERED", "NOT", "NULL",
    "NULLIF", "OF", "OFF", "OFFSETS", "ON", "OPEN", "OPENDATASOURCE", "OPENQUERY",
    "OPENROWSET", "OPENXML", "OPTION", "OR", "ORDER", "OUTER", "OVER", "PERCENT", "PIVOT",
    "PLAN", "PRECISION", "PRIMARY", "PRINT", "PROC", "PROCEDURE", "PUBLIC", "RAISERROR",
    "READ", "READTEXT", "RECONFIGURE", "REFERENCES", "REPLICATION", "RESTORE", "RESTRICT",
    "RETURN", "REVERT", "REVOKE", "RIGHT", "ROLLBACK", "ROWCOUNT", "ROWGUIDCOL", "RULE",
    "SAVE", "SCHEMA", "SECURITYAUDIT", "SELECT", "SEMANTICKEYPHRASETABLE",
    "SEMANTICSIMILARITYDETAILSTABLE", "SEMANTICSIMILARITYTABLE", "SESSION_USER", "SET",
    "SETUSER", "SHUTDOWN", "SOME", "STATISTICS", "SYSTEM_USER", "TABLE", "TABLESAMPLE",
    "TEXTSIZE", "THEN", "TO", "TOP", "TRAN", "TRANSACTION", "TRIGGER", "TRUNCATE",
    "TRY_CONVERT", "TSEQUAL", "UNION", "UNIQUE", "UNPIVOT", "UPDATE", "UPDATETEXT", "USE",
    "USER", "VALUES", "VARYING", "VIEW", "WAITFOR", "WHEN", "WHERE", "WHILE", "WITH",
    "WRITETEXT",
];

pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

#![allow(dead_code)]

// tests/common/mod.rs
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use db_infra::{
    ConnectionDescriptor, Keyword, ProvisionSettings, ReadinessStrategy, ServerError,
    ServerSession, SqlServer,
};

// Logging is auto-installed for every test binary that uses this module
#[ctor::ctor]
fn init_logging() {
    test_support::logging::init();
}

pub const COLLATION: &str = "SQL_Latin1_General_CP1_CI_AS";

/// Everything the fake server was asked to do, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Connect {
        catalog: Option<String>,
        user: Option<String>,
    },
    DatabaseId {
        catalog: Option<String>,
        name: String,
    },
    Execute {
        catalog: Option<String>,
        sql: String,
    },
    Collation {
        catalog: Option<String>,
        name: String,
    },
    Transaction {
        catalog: Option<String>,
        script: String,
    },
}

#[derive(Debug, Default)]
struct FakeState {
    /// database name -> committed tables
    databases: BTreeMap<String, Vec<String>>,
    calls: Vec<Call>,
    unreachable: bool,
    lenient_login: bool,
    deny_create: Option<String>,
    pending_polls: u32,
}

/// In-memory stand-in for a SQL Server instance.
///
/// Logins fail for catalogs that do not exist (like a real server), `CREATE
/// DATABASE` registers a database, and a schema script is "applied" by
/// collecting its `CREATE TABLE` names (indexes are accepted and ignored); any
/// other statement fails the script and nothing from it is kept.
#[derive(Clone, Debug)]
pub struct FakeServer {
    state: Arc<Mutex<FakeState>>,
}

impl FakeServer {
    pub fn new() -> Self {
        let mut state = FakeState::default();
        for system in ["master", "tempdb", "model", "msdb"] {
            state.databases.insert(system.to_string(), Vec::new());
        }
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    pub fn with_database(self, name: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .databases
            .insert(name.to_string(), Vec::new());
        self
    }

    pub fn unreachable(self) -> Self {
        self.state.lock().unwrap().unreachable = true;
        self
    }

    /// Accept logins to catalogs that do not exist.
    pub fn lenient_login(self) -> Self {
        self.state.lock().unwrap().lenient_login = true;
        self
    }

    pub fn deny_create(self, message: &str) -> Self {
        self.state.lock().unwrap().deny_create = Some(message.to_string());
        self
    }

    /// The collation probe reports "not ready" this many times first.
    pub fn ready_after(self, polls: u32) -> Self {
        self.state.lock().unwrap().pending_polls = polls;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn has_database(&self, name: &str) -> bool {
        self.state.lock().unwrap().databases.contains_key(name)
    }

    pub fn tables(&self, database: &str) -> Option<Vec<String>> {
        self.state.lock().unwrap().databases.get(database).cloned()
    }

    pub fn executed_sql(&self) -> Vec<(Option<String>, String)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Execute { catalog, sql } => Some((catalog, sql)),
                _ => None,
            })
            .collect()
    }

    pub fn collation_probes(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, Call::Collation { .. }))
            .count()
    }
}

pub struct FakeSession {
    catalog: Option<String>,
    state: Arc<Mutex<FakeState>>,
}

#[async_trait]
impl SqlServer for FakeServer {
    type Session = FakeSession;

    async fn connect(&self, descriptor: &ConnectionDescriptor) -> Result<FakeSession, ServerError> {
        let catalog = descriptor.catalog().map(str::to_string);
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Connect {
            catalog: catalog.clone(),
            user: descriptor.get(Keyword::UserId).map(str::to_string),
        });

        if state.unreachable {
            return Err(ServerError::new(
                "A network-related or instance-specific error occurred while establishing a connection to SQL Server.",
            ));
        }
        if let Some(c) = &catalog {
            if !state.lenient_login && !state.databases.contains_key(c) {
                return Err(ServerError::new(format!(
                    "Cannot open database \"{c}\" requested by the login. The login failed."
                )));
            }
        }

        Ok(FakeSession {
            catalog,
            state: Arc::clone(&self.state),
        })
    }
}

fn created_database_name(sql: &str) -> Option<String> {
    let rest = sql.strip_prefix("CREATE DATABASE ")?;
    let name = if let Some(bracketed) = rest.strip_prefix('[') {
        bracketed.split("] ").next()?.replace("]]", "]")
    } else {
        rest.split_whitespace().next()?.to_string()
    };
    Some(name)
}

#[async_trait]
impl ServerSession for FakeSession {
    async fn execute(&mut self, sql: &str) -> Result<(), ServerError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Execute {
            catalog: self.catalog.clone(),
            sql: sql.to_string(),
        });

        if let Some(name) = created_database_name(sql) {
            if let Some(message) = &state.deny_create {
                return Err(ServerError::new(message.clone()));
            }
            if state.databases.contains_key(&name) {
                return Err(ServerError::new(format!(
                    "Database '{name}' already exists. Choose a different database name."
                )));
            }
            state.databases.insert(name, Vec::new());
        }
        Ok(())
    }

    async fn database_id(&mut self, name: &str) -> Result<Option<i32>, ServerError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::DatabaseId {
            catalog: self.catalog.clone(),
            name: name.to_string(),
        });
        Ok(state
            .databases
            .keys()
            .position(|db| db == name)
            .map(|i| i as i32 + 1))
    }

    async fn database_collation(&mut self, name: &str) -> Result<Option<String>, ServerError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Collation {
            catalog: self.catalog.clone(),
            name: name.to_string(),
        });
        if state.pending_polls > 0 {
            state.pending_polls -= 1;
            return Ok(None);
        }
        Ok(state
            .databases
            .contains_key(name)
            .then(|| COLLATION.to_string()))
    }

    async fn execute_in_transaction(&mut self, script: &str) -> Result<(), ServerError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Transaction {
            catalog: self.catalog.clone(),
            script: script.to_string(),
        });

        let mut staged = Vec::new();
        for statement in script.split(';').map(str::trim).filter(|s| !s.is_empty()) {
            if statement.starts_with("CREATE INDEX ")
                || statement.starts_with("CREATE UNIQUE INDEX ")
            {
                continue;
            }
            match statement.strip_prefix("CREATE TABLE ") {
                Some(rest) => {
                    let table = rest
                        .split(|c: char| c.is_whitespace() || c == '(')
                        .next()
                        .unwrap_or_default();
                    staged.push(table.to_string());
                }
                None => {
                    let word = statement.split_whitespace().next().unwrap_or_default();
                    return Err(ServerError::new(format!(
                        "Incorrect syntax near '{word}'."
                    )));
                }
            }
        }

        let catalog = self.catalog.clone().unwrap_or_default();
        match state.databases.get_mut(&catalog) {
            Some(tables) => {
                tables.extend(staged);
                Ok(())
            }
            None => Err(ServerError::new(format!(
                "Database '{catalog}' does not exist."
            ))),
        }
    }

    async fn close(self) -> Result<(), ServerError> {
        Ok(())
    }
}

/// Settings with files under `data_dir` and no settling delay.
pub fn settings_in(data_dir: &Path) -> ProvisionSettings {
    ProvisionSettings {
        data_dir: data_dir.to_path_buf(),
        readiness: ReadinessStrategy::FixedDelay(Duration::ZERO),
        ..ProvisionSettings::default()
    }
}

/// Progress sink that remembers every report.
#[derive(Default)]
pub struct RecordingProgress {
    seen: Mutex<Vec<(i32, String)>>,
}

impl RecordingProgress {
    pub fn messages(&self) -> Vec<String> {
        self.seen
            .lock()
            .unwrap()
            .iter()
            .map(|(_, m)| m.clone())
            .collect()
    }

    pub fn codes(&self) -> Vec<i32> {
        self.seen.lock().unwrap().iter().map(|(c, _)| *c).collect()
    }
}

impl db_infra::ProgressSink for RecordingProgress {
    fn report(&self, code: i32, message: &str) {
        self.seen.lock().unwrap().push((code, message.to_string()));
    }
}

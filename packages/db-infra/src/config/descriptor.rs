//! ADO-style SQL Server connection strings.
//!
//! The grammar follows `SqlConnectionStringBuilder`: `key=value` pairs split on
//! `;`, case-insensitive keywords with synonyms, optional single or double
//! quoting, and `==` for a literal `=` inside a key. Unknown keywords and
//! malformed values are rejected with the same wording the .NET builder uses.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

/// Default for `Connect Timeout` when the descriptor does not set one.
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 15;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct DescriptorError {
    pub message: String,
}

impl DescriptorError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    fn format_at(index: usize) -> Self {
        Self::new(format!(
            "Format of the initialization string does not conform to specification starting at index {index}."
        ))
    }

    fn not_supported(key: &str) -> Self {
        Self::new(format!("Keyword not supported: '{key}'."))
    }

    fn invalid_value(keyword: Keyword) -> Self {
        Self::new(format!(
            "Invalid value for key '{}'.",
            keyword.canonical().to_ascii_lowercase()
        ))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ValueKind {
    Text,
    Bool,
    Int,
    IntegratedSecurity,
    /// One of a fixed set, compared case-insensitively with whitespace removed.
    OneOf(&'static [&'static str]),
}

const APPLICATION_INTENTS: &[&str] = &["readonly", "readwrite"];
const TRANSACTION_BINDINGS: &[&str] = &["implicitunbind", "explicitunbind"];
const TYPE_SYSTEM_VERSIONS: &[&str] = &[
    "latest",
    "sqlserver2000",
    "sqlserver2005",
    "sqlserver2008",
    "sqlserver2012",
];
const AUTHENTICATION_METHODS: &[&str] = &[
    "sqlpassword",
    "activedirectorypassword",
    "activedirectoryintegrated",
    "activedirectoryinteractive",
    "activedirectoryserviceprincipal",
    "activedirectorydevicecodeflow",
    "activedirectorymanagedidentity",
    "activedirectorymsi",
    "activedirectorydefault",
    "activedirectoryworkloadidentity",
];
const COLUMN_ENCRYPTION_SETTINGS: &[&str] = &["enabled", "disabled"];

/// Keywords recognised in a connection string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    DataSource,
    InitialCatalog,
    UserId,
    Password,
    IntegratedSecurity,
    ConnectTimeout,
    ApplicationName,
    Encrypt,
    TrustServerCertificate,
    MultipleActiveResultSets,
    Pooling,
    MaxPoolSize,
    MinPoolSize,
    PacketSize,
    PersistSecurityInfo,
    WorkstationId,
    AttachDbFilename,
    MultiSubnetFailover,
    NetworkLibrary,
    ApplicationIntent,
    LoadBalanceTimeout,
    Enlist,
    FailoverPartner,
    UserInstance,
    AsynchronousProcessing,
    CurrentLanguage,
    Replication,
    TransactionBinding,
    TypeSystemVersion,
    ContextConnection,
    ConnectRetryCount,
    ConnectRetryInterval,
    Authentication,
    ColumnEncryptionSetting,
}

impl Keyword {
    const ALL: [Keyword; 34] = [
        Keyword::DataSource,
        Keyword::InitialCatalog,
        Keyword::UserId,
        Keyword::Password,
        Keyword::IntegratedSecurity,
        Keyword::ConnectTimeout,
        Keyword::ApplicationName,
        Keyword::Encrypt,
        Keyword::TrustServerCertificate,
        Keyword::MultipleActiveResultSets,
        Keyword::Pooling,
        Keyword::MaxPoolSize,
        Keyword::MinPoolSize,
        Keyword::PacketSize,
        Keyword::PersistSecurityInfo,
        Keyword::WorkstationId,
        Keyword::AttachDbFilename,
        Keyword::MultiSubnetFailover,
        Keyword::NetworkLibrary,
        Keyword::ApplicationIntent,
        Keyword::LoadBalanceTimeout,
        Keyword::Enlist,
        Keyword::FailoverPartner,
        Keyword::UserInstance,
        Keyword::AsynchronousProcessing,
        Keyword::CurrentLanguage,
        Keyword::Replication,
        Keyword::TransactionBinding,
        Keyword::TypeSystemVersion,
        Keyword::ContextConnection,
        Keyword::ConnectRetryCount,
        Keyword::ConnectRetryInterval,
        Keyword::Authentication,
        Keyword::ColumnEncryptionSetting,
    ];

    /// Name used in error messages.
    pub fn canonical(self) -> &'static str {
        match self {
            Keyword::DataSource => "Data Source",
            Keyword::InitialCatalog => "Initial Catalog",
            Keyword::UserId => "User ID",
            Keyword::Password => "Password",
            Keyword::IntegratedSecurity => "Integrated Security",
            Keyword::ConnectTimeout => "Connect Timeout",
            Keyword::ApplicationName => "Application Name",
            Keyword::Encrypt => "Encrypt",
            Keyword::TrustServerCertificate => "TrustServerCertificate",
            Keyword::MultipleActiveResultSets => "MultipleActiveResultSets",
            Keyword::Pooling => "Pooling",
            Keyword::MaxPoolSize => "Max Pool Size",
            Keyword::MinPoolSize => "Min Pool Size",
            Keyword::PacketSize => "Packet Size",
            Keyword::PersistSecurityInfo => "Persist Security Info",
            Keyword::WorkstationId => "Workstation ID",
            Keyword::AttachDbFilename => "AttachDbFilename",
            Keyword::MultiSubnetFailover => "MultiSubnetFailover",
            Keyword::NetworkLibrary => "Network Library",
            Keyword::ApplicationIntent => "ApplicationIntent",
            Keyword::LoadBalanceTimeout => "Load Balance Timeout",
            Keyword::Enlist => "Enlist",
            Keyword::FailoverPartner => "Failover Partner",
            Keyword::UserInstance => "User Instance",
            Keyword::AsynchronousProcessing => "Asynchronous Processing",
            Keyword::CurrentLanguage => "Current Language",
            Keyword::Replication => "Replication",
            Keyword::TransactionBinding => "Transaction Binding",
            Keyword::TypeSystemVersion => "Type System Version",
            Keyword::ContextConnection => "Context Connection",
            Keyword::ConnectRetryCount => "ConnectRetryCount",
            Keyword::ConnectRetryInterval => "ConnectRetryInterval",
            Keyword::Authentication => "Authentication",
            Keyword::ColumnEncryptionSetting => "Column Encryption Setting",
        }
    }

    /// Name written when serialising; chosen so the driver's own parser accepts it too.
    fn serial_name(self) -> &'static str {
        match self {
            Keyword::DataSource => "Server",
            Keyword::InitialCatalog => "Database",
            Keyword::IntegratedSecurity => "IntegratedSecurity",
            other => other.canonical(),
        }
    }

    fn synonyms(self) -> &'static [&'static str] {
        match self {
            Keyword::DataSource => &[
                "data source",
                "server",
                "address",
                "addr",
                "network address",
            ],
            Keyword::InitialCatalog => &["initial catalog", "database"],
            Keyword::UserId => &["user id", "uid", "user"],
            Keyword::Password => &["password", "pwd"],
            Keyword::IntegratedSecurity => &[
                "integrated security",
                "integratedsecurity",
                "trusted_connection",
            ],
            Keyword::ConnectTimeout => &["connect timeout", "connection timeout", "timeout"],
            Keyword::ApplicationName => &["application name", "app"],
            Keyword::Encrypt => &["encrypt"],
            Keyword::TrustServerCertificate => &["trustservercertificate"],
            Keyword::MultipleActiveResultSets => &["multipleactiveresultsets"],
            Keyword::Pooling => &["pooling"],
            Keyword::MaxPoolSize => &["max pool size"],
            Keyword::MinPoolSize => &["min pool size"],
            Keyword::PacketSize => &["packet size"],
            Keyword::PersistSecurityInfo => &["persist security info", "persistsecurityinfo"],
            Keyword::WorkstationId => &["workstation id", "wsid"],
            Keyword::AttachDbFilename => &[
                "attachdbfilename",
                "initial file name",
                "extended properties",
            ],
            Keyword::MultiSubnetFailover => &["multisubnetfailover"],
            Keyword::NetworkLibrary => &["network library", "net"],
            Keyword::ApplicationIntent => &["applicationintent", "application intent"],
            Keyword::LoadBalanceTimeout => &["load balance timeout", "connection lifetime"],
            Keyword::Enlist => &["enlist"],
            Keyword::FailoverPartner => &["failover partner"],
            Keyword::UserInstance => &["user instance"],
            Keyword::AsynchronousProcessing => &["asynchronous processing", "async"],
            Keyword::CurrentLanguage => &["current language", "language"],
            Keyword::Replication => &["replication"],
            Keyword::TransactionBinding => &["transaction binding"],
            Keyword::TypeSystemVersion => &["type system version"],
            Keyword::ContextConnection => &["context connection"],
            Keyword::ConnectRetryCount => &["connectretrycount", "connect retry count"],
            Keyword::ConnectRetryInterval => &["connectretryinterval", "connect retry interval"],
            Keyword::Authentication => &["authentication"],
            Keyword::ColumnEncryptionSetting => &["column encryption setting"],
        }
    }

    fn kind(self) -> ValueKind {
        match self {
            Keyword::IntegratedSecurity => ValueKind::IntegratedSecurity,
            Keyword::Encrypt
            | Keyword::TrustServerCertificate
            | Keyword::MultipleActiveResultSets
            | Keyword::Pooling
            | Keyword::PersistSecurityInfo
            | Keyword::MultiSubnetFailover
            | Keyword::Enlist
            | Keyword::UserInstance
            | Keyword::AsynchronousProcessing
            | Keyword::Replication
            | Keyword::ContextConnection => ValueKind::Bool,
            Keyword::ConnectTimeout
            | Keyword::MaxPoolSize
            | Keyword::MinPoolSize
            | Keyword::PacketSize
            | Keyword::LoadBalanceTimeout
            | Keyword::ConnectRetryCount
            | Keyword::ConnectRetryInterval => ValueKind::Int,
            Keyword::ApplicationIntent => ValueKind::OneOf(APPLICATION_INTENTS),
            Keyword::TransactionBinding => ValueKind::OneOf(TRANSACTION_BINDINGS),
            Keyword::TypeSystemVersion => ValueKind::OneOf(TYPE_SYSTEM_VERSIONS),
            Keyword::Authentication => ValueKind::OneOf(AUTHENTICATION_METHODS),
            Keyword::ColumnEncryptionSetting => ValueKind::OneOf(COLUMN_ENCRYPTION_SETTINGS),
            _ => ValueKind::Text,
        }
    }

    /// Resolve a user-supplied key (any case, any synonym).
    pub fn lookup(key: &str) -> Option<Keyword> {
        let key = key.to_ascii_lowercase();
        Keyword::ALL
            .into_iter()
            .find(|kw| kw.synonyms().contains(&key.as_str()))
    }

    fn accepts(self, value: &str) -> bool {
        let lower = value.trim().to_ascii_lowercase();
        match self.kind() {
            ValueKind::Text => true,
            ValueKind::Bool => matches!(lower.as_str(), "true" | "false" | "yes" | "no"),
            ValueKind::IntegratedSecurity => {
                matches!(lower.as_str(), "true" | "false" | "yes" | "no" | "sspi")
            }
            ValueKind::Int => lower.parse::<u32>().is_ok(),
            ValueKind::OneOf(allowed) => {
                let compact: String = lower.chars().filter(|c| !c.is_whitespace()).collect();
                allowed.contains(&compact.as_str())
            }
        }
    }
}

/// A parsed connection string. Entries keep the order in which they first
/// appeared; a repeated keyword overwrites the earlier value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConnectionDescriptor {
    entries: Vec<(Keyword, String)>,
}

impl ConnectionDescriptor {
    pub fn parse(input: &str) -> Result<Self, DescriptorError> {
        let chars: Vec<char> = input.chars().collect();
        let n = chars.len();
        let mut descriptor = ConnectionDescriptor::default();
        let mut i = 0;

        loop {
            while i < n && (chars[i] == ';' || chars[i].is_whitespace()) {
                i += 1;
            }
            if i >= n {
                break;
            }
            // Reported as a character position, not a byte offset
            let segment_start = i;

            let mut key = String::new();
            loop {
                if i >= n {
                    return Err(DescriptorError::format_at(segment_start));
                }
                match chars[i] {
                    '=' if i + 1 < n && chars[i + 1] == '=' => {
                        key.push('=');
                        i += 2;
                    }
                    '=' => {
                        i += 1;
                        break;
                    }
                    ';' => return Err(DescriptorError::format_at(segment_start)),
                    c => {
                        key.push(c);
                        i += 1;
                    }
                }
            }
            let key = key.trim();
            if key.is_empty() {
                return Err(DescriptorError::format_at(segment_start));
            }

            while i < n && chars[i] != ';' && chars[i].is_whitespace() {
                i += 1;
            }

            let value = if i < n && (chars[i] == '\'' || chars[i] == '"') {
                let quote = chars[i];
                i += 1;
                let mut value = String::new();
                loop {
                    if i >= n {
                        return Err(DescriptorError::format_at(segment_start));
                    }
                    let c = chars[i];
                    if c == quote {
                        if i + 1 < n && chars[i + 1] == quote {
                            value.push(quote);
                            i += 2;
                            continue;
                        }
                        i += 1;
                        break;
                    }
                    value.push(c);
                    i += 1;
                }
                while i < n && chars[i].is_whitespace() {
                    i += 1;
                }
                if i < n && chars[i] != ';' {
                    return Err(DescriptorError::format_at(segment_start));
                }
                value
            } else {
                let mut value = String::new();
                while i < n && chars[i] != ';' {
                    value.push(chars[i]);
                    i += 1;
                }
                value.trim().to_string()
            };

            let keyword = Keyword::lookup(key).ok_or_else(|| DescriptorError::not_supported(key))?;
            if !keyword.accepts(&value) {
                return Err(DescriptorError::invalid_value(keyword));
            }
            descriptor.set(keyword, value);
        }

        Ok(descriptor)
    }

    fn set(&mut self, keyword: Keyword, value: String) {
        match self.entries.iter_mut().find(|(kw, _)| *kw == keyword) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((keyword, value)),
        }
    }

    pub fn get(&self, keyword: Keyword) -> Option<&str> {
        self.entries
            .iter()
            .find(|(kw, _)| *kw == keyword)
            .map(|(_, value)| value.as_str())
    }

    /// The catalog (target database) named by this descriptor, if any.
    pub fn catalog(&self) -> Option<&str> {
        self.get(Keyword::InitialCatalog).filter(|c| !c.is_empty())
    }

    pub fn server(&self) -> Option<&str> {
        self.get(Keyword::DataSource)
    }

    pub fn connect_timeout(&self) -> Duration {
        let secs = self
            .get(Keyword::ConnectTimeout)
            .and_then(|v| v.trim().parse::<u64>().ok())
            .unwrap_or(DEFAULT_CONNECT_TIMEOUT_SECS);
        Duration::from_secs(secs)
    }

    /// Clone of this descriptor targeting `catalog`; every other field is untouched.
    pub fn with_catalog(&self, catalog: &str) -> Self {
        let mut derived = self.clone();
        derived.set(Keyword::InitialCatalog, catalog.to_string());
        derived
    }

    /// True when the descriptor points at a SQL Server Compact (`.sdf`) file
    /// rather than at a server.
    pub fn is_compact_edition(&self) -> bool {
        [Keyword::DataSource, Keyword::AttachDbFilename]
            .into_iter()
            .filter_map(|kw| self.get(kw))
            .any(|v| v.trim().to_ascii_lowercase().ends_with(".sdf"))
    }

    /// Serialise back to a connection string, credentials included.
    pub fn to_connection_string(&self) -> String {
        self.render(false)
    }

    fn render(&self, mask_password: bool) -> String {
        self.entries
            .iter()
            .map(|(kw, value)| {
                let value = if mask_password && *kw == Keyword::Password {
                    "***"
                } else {
                    value.as_str()
                };
                format!("{}={}", kw.serial_name(), quote_value(value))
            })
            .collect::<Vec<_>>()
            .join(";")
    }
}

fn quote_value(value: &str) -> String {
    let needs_quotes = value.contains(';')
        || value.contains('\'')
        || value.contains('"')
        || value.starts_with(char::is_whitespace)
        || value.ends_with(char::is_whitespace);
    if !needs_quotes {
        return value.to_string();
    }
    if value.contains('"') && !value.contains('\'') {
        format!("'{value}'")
    } else {
        format!("\"{}\"", value.replace('"', "\"\""))
    }
}

impl FromStr for ConnectionDescriptor {
    type Err = DescriptorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Logging form: the password is masked.
impl fmt::Display for ConnectionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(true))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_typical_connection_string() {
        let d = ConnectionDescriptor::parse(
            "Data Source=db01\\SQLEXPRESS;Initial Catalog=Orders;User ID=sa;Password=s3cret",
        )
        .unwrap();
        assert_eq!(d.server(), Some("db01\\SQLEXPRESS"));
        assert_eq!(d.catalog(), Some("Orders"));
        assert_eq!(d.get(Keyword::UserId), Some("sa"));
        assert_eq!(d.get(Keyword::Password), Some("s3cret"));
    }

    #[test]
    fn keywords_are_case_insensitive_and_accept_synonyms() {
        let d = ConnectionDescriptor::parse("SERVER=x; database = Demo ;uid=u;PWD=p").unwrap();
        assert_eq!(d.server(), Some("x"));
        assert_eq!(d.catalog(), Some("Demo"));
        assert_eq!(d.get(Keyword::UserId), Some("u"));
        assert_eq!(d.get(Keyword::Password), Some("p"));
    }

    #[test]
    fn quoted_values_keep_semicolons_and_doubled_quotes() {
        let d = ConnectionDescriptor::parse(r#"Server=x;Password="a;b""c";Database='it''s'"#)
            .unwrap();
        assert_eq!(d.get(Keyword::Password), Some("a;b\"c"));
        assert_eq!(d.catalog(), Some("it's"));
    }

    #[test]
    fn last_occurrence_wins() {
        let d = ConnectionDescriptor::parse("Database=One;Server=x;Database=Two").unwrap();
        assert_eq!(d.catalog(), Some("Two"));
        assert_eq!(d.to_connection_string(), "Database=Two;Server=x");
    }

    #[test]
    fn unknown_keyword_is_rejected() {
        let err = ConnectionDescriptor::parse("Server=x;Colour=blue").unwrap_err();
        assert_eq!(err.message, "Keyword not supported: 'Colour'.");
    }

    #[test]
    fn segment_without_equals_is_a_format_error() {
        let err = ConnectionDescriptor::parse("Server=x;garbage").unwrap_err();
        assert_eq!(
            err.message,
            "Format of the initialization string does not conform to specification starting at index 9."
        );
    }

    #[test]
    fn format_error_index_counts_characters() {
        let err = ConnectionDescriptor::parse("Server=é;garbage").unwrap_err();
        assert_eq!(
            err.message,
            "Format of the initialization string does not conform to specification starting at index 9."
        );
    }

    #[test]
    fn less_common_keywords_are_accepted() {
        let cases = [
            ("Network Library=DBMSSOCN", Keyword::NetworkLibrary),
            ("Net=dbmslpcn", Keyword::NetworkLibrary),
            ("ApplicationIntent=ReadOnly", Keyword::ApplicationIntent),
            ("Application Intent=readwrite", Keyword::ApplicationIntent),
            ("Connection Lifetime=0", Keyword::LoadBalanceTimeout),
            ("Load Balance Timeout=30", Keyword::LoadBalanceTimeout),
            ("Enlist=false", Keyword::Enlist),
            ("Failover Partner=db02", Keyword::FailoverPartner),
            ("User Instance=no", Keyword::UserInstance),
            ("Asynchronous Processing=true", Keyword::AsynchronousProcessing),
            ("Async=yes", Keyword::AsynchronousProcessing),
            ("Current Language=us_english", Keyword::CurrentLanguage),
            ("Language=Deutsch", Keyword::CurrentLanguage),
            ("Replication=false", Keyword::Replication),
            ("Transaction Binding=Explicit Unbind", Keyword::TransactionBinding),
            ("Type System Version=SQL Server 2012", Keyword::TypeSystemVersion),
            ("Context Connection=false", Keyword::ContextConnection),
            ("ConnectRetryCount=3", Keyword::ConnectRetryCount),
            ("ConnectRetryInterval=10", Keyword::ConnectRetryInterval),
            ("Authentication=Active Directory Password", Keyword::Authentication),
            ("Authentication=SqlPassword", Keyword::Authentication),
            ("Column Encryption Setting=Enabled", Keyword::ColumnEncryptionSetting),
        ];

        for (pair, keyword) in cases {
            let input = format!("Server=db01;Database=Demo;{pair}");
            let d = ConnectionDescriptor::parse(&input)
                .unwrap_or_else(|e| panic!("{pair} rejected: {e}"));
            let expected = pair.split_once('=').unwrap().1;
            assert_eq!(d.get(keyword), Some(expected), "{pair}");
            assert_eq!(d.catalog(), Some("Demo"));
        }
    }

    #[test]
    fn enumerated_keywords_reject_unknown_values() {
        let err = ConnectionDescriptor::parse("Server=x;ApplicationIntent=Sometimes").unwrap_err();
        assert_eq!(err.message, "Invalid value for key 'applicationintent'.");

        let err = ConnectionDescriptor::parse("Server=x;Authentication=Kerberos").unwrap_err();
        assert_eq!(err.message, "Invalid value for key 'authentication'.");

        let err = ConnectionDescriptor::parse("Server=x;ConnectRetryCount=-1").unwrap_err();
        assert_eq!(err.message, "Invalid value for key 'connectretrycount'.");
    }

    #[test]
    fn unterminated_quote_is_a_format_error() {
        let err = ConnectionDescriptor::parse("Server='x").unwrap_err();
        assert!(err.message.starts_with("Format of the initialization string"));
    }

    #[test]
    fn invalid_boolean_and_integer_values_are_rejected() {
        let err = ConnectionDescriptor::parse("Server=x;Encrypt=maybe").unwrap_err();
        assert_eq!(err.message, "Invalid value for key 'encrypt'.");

        let err = ConnectionDescriptor::parse("Server=x;Connect Timeout=soon").unwrap_err();
        assert_eq!(err.message, "Invalid value for key 'connect timeout'.");

        assert!(ConnectionDescriptor::parse("Server=x;Integrated Security=SSPI").is_ok());
    }

    #[test]
    fn empty_string_parses_to_empty_descriptor() {
        let d = ConnectionDescriptor::parse("  ;; ").unwrap();
        assert_eq!(d, ConnectionDescriptor::default());
        assert_eq!(d.catalog(), None);
    }

    #[test]
    fn key_with_doubled_equals_is_unescaped() {
        let err = ConnectionDescriptor::parse("a==b=c").unwrap_err();
        assert_eq!(err.message, "Keyword not supported: 'a=b'.");
    }

    #[test]
    fn with_catalog_only_touches_the_catalog_field() {
        let d = ConnectionDescriptor::parse(
            "Server=Orders-host;Database=Orders;User ID=Orders;Password=Orders123",
        )
        .unwrap();
        let admin = d.with_catalog("master");

        assert_eq!(admin.catalog(), Some("master"));
        assert_eq!(admin.server(), Some("Orders-host"));
        assert_eq!(admin.get(Keyword::UserId), Some("Orders"));
        assert_eq!(admin.get(Keyword::Password), Some("Orders123"));
        assert_eq!(d.catalog(), Some("Orders"));
    }

    #[test]
    fn with_catalog_adds_missing_catalog() {
        let d = ConnectionDescriptor::parse("Server=x").unwrap();
        assert_eq!(d.with_catalog("master").catalog(), Some("master"));
    }

    #[test]
    fn serialised_form_parses_back_to_the_same_descriptor() {
        let d = ConnectionDescriptor::parse(
            "Data Source=x;Initial Catalog=Demo;Password=\" padded;'\";Application Name=tool",
        )
        .unwrap();
        let again = ConnectionDescriptor::parse(&d.to_connection_string()).unwrap();
        assert_eq!(d, again);
    }

    #[test]
    fn display_masks_the_password() {
        let d = ConnectionDescriptor::parse("Server=x;Database=Demo;Password=hunter2").unwrap();
        let shown = d.to_string();
        assert!(!shown.contains("hunter2"));
        assert!(shown.contains("Password=***"));
    }

    #[test]
    fn compact_edition_is_detected_from_the_file_name() {
        let d = ConnectionDescriptor::parse("Data Source=C:\\data\\App.SDF").unwrap();
        assert!(d.is_compact_edition());

        let d = ConnectionDescriptor::parse("Server=x;Database=Demo;Password=asdf").unwrap();
        assert!(!d.is_compact_edition());
    }

    #[test]
    fn connect_timeout_defaults_to_fifteen_seconds() {
        let d = ConnectionDescriptor::parse("Server=x").unwrap();
        assert_eq!(d.connect_timeout(), Duration::from_secs(15));

        let d = ConnectionDescriptor::parse("Server=x;Timeout=3").unwrap();
        assert_eq!(d.connect_timeout(), Duration::from_secs(3));
    }
}

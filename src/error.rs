use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("authentication failed: wrong password/keyfile or tampered database")]
    Authentication,

    #[error("malformed database: {0}")]
    Format(String),

    #[error("database not found: {0}")]
    DatabaseNotFound(String),

    #[error("database already exists: {0}")]
    DatabaseExists(String),

    #[error("no entry matching '{0}'")]
    EntryNotFound(String),

    #[error("no group matching '{0}'")]
    GroupNotFound(String),

    #[error("an entry titled '{title}' already exists in group '{group}'")]
    DuplicateEntry { group: String, title: String },

    #[error("unknown field: {0}")]
    InvalidField(String),

    #[error("the root group cannot be deleted")]
    RootGroup,

    #[error("invalid search pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        source: regex::Error,
    },

    #[error("no database configured: pass --db or set STRONGBOX_DB")]
    NoDatabase,

    #[error("config error: {0}")]
    Config(String),

    #[error("crypto failure: {0}")]
    Crypto(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

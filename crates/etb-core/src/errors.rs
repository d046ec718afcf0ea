/// Core error type.
///
/// Only infrastructure failures live here (config, transport). Malformed user
/// input is never an `Error`: the command processor turns it straight into a
/// reply string.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("external error: {0}")]
    External(String),
}

pub type Result<T> = std::result::Result<T, Error>;

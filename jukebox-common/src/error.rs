//! Error type shared by the jukebox crates

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// Reading the config file failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Config file is not valid TOML for [`crate::config::TomlConfig`]
    #[error("Configuration error: {0}")]
    Config(String),

    /// Config parsed but holds a value that cannot be used
    #[error("Invalid setting: {0}")]
    InvalidInput(String),
}

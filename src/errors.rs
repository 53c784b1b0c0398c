use std::string::FromUtf8Error;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, TelloError>;

#[derive(Error, Debug)]
pub enum TelloError {
    #[error("WiFi not connected")]
    WiFiNotConnected,

    #[error("{msg}")]
    Generic { msg: String },

    #[error("failed to parse \"{msg}\"")]
    ParseError { msg: String },

    #[error("no response to \"{command}\"")]
    Timeout { command: String },

    #[error("\"{command}\" failed with response \"{response}\"")]
    CommandFailed { command: String, response: String },

    #[error("I/O error - {0}")]
    IoError(#[from] std::io::Error),

    #[error("invalid UTF-8 in response - {0}")]
    Utf8Error(#[from] FromUtf8Error),
}

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Startup file patch failed: {0}")]
    Patch(String),

    #[error("Git error: {0}")]
    Git(String),

    #[error("SSH error: {0}")]
    Ssh(String),

    #[error("Timed out waiting for build: {0}")]
    Timeout(String),

    #[error("Remote deployment failed: {0}")]
    Deploy(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn code(&self) -> &'static str {
        match self {
            Error::Config(_) => "CONFIG_ERROR",
            Error::Patch(_) => "PATCH_FAILED",
            Error::Git(_) => "GIT_ERROR",
            Error::Ssh(_) => "SSH_ERROR",
            Error::Timeout(_) => "BUILD_TIMEOUT",
            Error::Deploy(_) => "DEPLOY_FAILED",
            Error::Io(_) => "IO_ERROR",
            Error::Json(_) => "JSON_ERROR",
            Error::Other(_) => "ERROR",
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Error::Config(message.into())
    }

    pub fn patch(message: impl Into<String>) -> Self {
        Error::Patch(message.into())
    }

    pub fn git(message: impl Into<String>) -> Self {
        Error::Git(message.into())
    }

    pub fn ssh(message: impl Into<String>) -> Self {
        Error::Ssh(message.into())
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Error::Timeout(message.into())
    }

    pub fn deploy(message: impl Into<String>) -> Self {
        Error::Deploy(message.into())
    }

    pub fn other(message: impl Into<String>) -> Self {
        Error::Other(message.into())
    }
}

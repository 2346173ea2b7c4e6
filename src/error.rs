//! Error types surfaced by the navigator, the registry pipeline, and the
//! package-manager subprocess.
//!
//! Route handlers propagate with `anyhow::Result`; callers that need to tell
//! failures apart use `downcast_ref::<LauncherError>()`.

use std::io;
use thiserror::Error;

/// Failures talking to the package registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The registry answered with a non-2xx status.
    #[error("registry request to {url} failed with status {status}")]
    Status { url: String, status: u16 },

    /// The request never produced a response (DNS, connection, TLS...).
    #[error("could not reach the registry at {url}: {message}")]
    Network { url: String, message: String },

    /// The response body was not the JSON shape we expected.
    #[error("unexpected registry response from {url}: {message}")]
    InvalidResponse { url: String, message: String },
}

/// Top-level error type for the launcher core.
#[derive(Debug, Error)]
pub enum LauncherError {
    #[error("no routes called: {0}")]
    RouteNotFound(String),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("failed to spawn `{program}`: {source}")]
    Subprocess {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("prompt failed: {0}")]
    Prompt(String),

    /// The user interrupted an interactive prompt (Ctrl-C / Esc).
    #[error("prompt interrupted")]
    PromptInterrupted,
}

impl LauncherError {
    pub fn subprocess(program: impl Into<String>, source: io::Error) -> Self {
        LauncherError::Subprocess {
            program: program.into(),
            source,
        }
    }
}

impl From<dialoguer::Error> for LauncherError {
    fn from(err: dialoguer::Error) -> Self {
        match err {
            dialoguer::Error::IO(e) if e.kind() == io::ErrorKind::Interrupted => {
                LauncherError::PromptInterrupted
            }
            other => LauncherError::Prompt(other.to_string()),
        }
    }
}

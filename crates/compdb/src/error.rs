use std::path::PathBuf;
use thiserror::Error;

/// Machine-readable classification of a generation failure, used by UI
/// layers to pick messages and remediation actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompdbErrorKind {
    NoChroot,
    CommandFailed,
    Cancelled,
    Io,
}

#[derive(Error, Debug)]
pub enum CompdbError {
    #[error("no SDK chroot under {checkout}; enter the chroot with cros_sdk first")]
    NoChroot { checkout: PathBuf },
    #[error("`{command}` exited with status {status}")]
    CommandFailed {
        command: String,
        status: i32,
        stderr: String,
    },
    /// Distinct from failure: the caller rolled the run back on purpose.
    #[error("generation was cancelled")]
    Cancelled,
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CompdbError {
    pub fn kind(&self) -> CompdbErrorKind {
        match self {
            CompdbError::NoChroot { .. } => CompdbErrorKind::NoChroot,
            CompdbError::CommandFailed { .. } => CompdbErrorKind::CommandFailed,
            CompdbError::Cancelled => CompdbErrorKind::Cancelled,
            CompdbError::Io(_) => CompdbErrorKind::Io,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, CompdbError::Cancelled)
    }

    /// Action labels offered next to the error message. Advisory only;
    /// the prompting layer decides what each action does.
    pub fn remediation(&self) -> &'static [&'static str] {
        match self.kind() {
            CompdbErrorKind::NoChroot => &["Open setup guide"],
            CompdbErrorKind::CommandFailed => &["Show log"],
            CompdbErrorKind::Cancelled | CompdbErrorKind::Io => &[],
        }
    }
}

pub type Result<T> = std::result::Result<T, CompdbError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_match_variants() {
        let err = CompdbError::NoChroot {
            checkout: PathBuf::from("/cros"),
        };
        assert_eq!(err.kind(), CompdbErrorKind::NoChroot);
        assert!(!err.is_cancelled());
        assert!(CompdbError::Cancelled.is_cancelled());
    }

    #[test]
    fn command_failure_mentions_the_command() {
        let err = CompdbError::CommandFailed {
            command: "gn gen out/Default".to_string(),
            status: 1,
            stderr: String::new(),
        };
        assert!(err.to_string().contains("gn gen out/Default"));
        assert_eq!(err.remediation(), &["Show log"]);
    }
}

//! Fire-and-forget operator notices.
//!
//! The host platform owns the real message surface; the engine only knows
//! a write-only channel with no acknowledgment. [`LogNotices`] backs the
//! channel with the log for headless use and tests.

use async_trait::async_trait;

use crate::error::SubmitError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Error,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub message: String,
    pub kind: NoticeKind,
    pub timeout_ms: u64,
}

impl Notice {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: NoticeKind::Error,
            timeout_ms: 3000,
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: NoticeKind::Info,
            timeout_ms: 3000,
        }
    }
}

/// Write-only notice channel supplied by the host.
#[async_trait]
pub trait NoticeSender: Send + Sync {
    async fn send(&self, notice: Notice);
}

/// Notice channel that writes through the log. Useful headless and in tests.
pub struct LogNotices;

#[async_trait]
impl NoticeSender for LogNotices {
    async fn send(&self, notice: Notice) {
        match notice.kind {
            NoticeKind::Error => log::error!("notice: {}", notice.message),
            NoticeKind::Info => log::info!("notice: {}", notice.message),
        }
    }
}

/// Map a submission failure to its operator-facing notice.
///
/// Validation errors are local and shown verbatim; anything that touched
/// the remote shows a generic retry message — the detail is already in
/// the log and is not for end users.
pub fn notice_for(error: &SubmitError) -> Notice {
    match error {
        SubmitError::Validation(e) => Notice::error(e.to_string()),
        SubmitError::PartialFailure { .. } | SubmitError::Remote(_) => {
            Notice::error("Failed to submit form. Please try again.")
        }
    }
}

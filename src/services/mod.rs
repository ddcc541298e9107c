use serde::Serialize;

pub mod dashboard;
pub mod errors;
pub mod tone;
pub mod trainer_data;

pub use errors::{ServiceError, ServiceResult};

/// Severity of a successful outcome shown back to the user.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum NoticeLevel {
    Success,
    /// The main action went through but a follow-up step did not.
    Warning,
}

/// Message describing a completed action.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }
}

//! Standard user-facing messages

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Message {
    OperationSuccess,
    SaveSuccess,
    UpdateSuccess,
    InvalidInput,
    ConnectionError,
    NotFound,
    InputNotAllowed,
    Processing,
    PleaseWait,
    UnexpectedError,
}

impl Message {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OperationSuccess => "Operation completed successfully",
            Self::SaveSuccess => "Data saved successfully",
            Self::UpdateSuccess => "Update completed successfully",
            Self::InvalidInput => "Invalid input provided",
            Self::ConnectionError => "Unable to establish connection",
            Self::NotFound => "Resource not found",
            Self::InputNotAllowed => "input_not_allowed",
            Self::Processing => "Processing your request",
            Self::PleaseWait => "Please wait while we process your request",
            Self::UnexpectedError => "An unexpected error occurred",
        }
    }
}

impl std::fmt::Display for Message {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

use thiserror::Error;

use crate::store::StoreError;

/// Domain failures raised by the engine components. The IPC layer maps
/// each variant onto a wire error code; validation of raw params happens
/// before these are ever produced.
#[derive(Debug, Error)]
pub enum OpError {
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("club not found")]
    ClubNotFound,
    #[error("assignment not found")]
    AssignmentNotFound,
    #[error("not a member of this club")]
    NotAMember,
    #[error("questionnaire already submitted")]
    QuestionnaireAlreadySubmitted,
    #[error("assignment already submitted")]
    AssignmentAlreadySubmitted,
    #[error("assignment {0} has an unparseable due date")]
    InvalidDueDate(i64),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl OpError {
    pub fn code(&self) -> &'static str {
        match self {
            OpError::InvalidCredentials => "invalid_credentials",
            OpError::ClubNotFound | OpError::AssignmentNotFound => "not_found",
            OpError::NotAMember => "forbidden",
            OpError::QuestionnaireAlreadySubmitted | OpError::AssignmentAlreadySubmitted => {
                "already_submitted"
            }
            OpError::InvalidDueDate(_) => "invalid_due_date",
            OpError::Store(StoreError::Corrupt { .. }) => "corrupt_collection",
            OpError::Store(StoreError::Io { .. }) => "store_io",
        }
    }
}

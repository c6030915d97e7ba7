use crate::response::Status;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Failure of a detection run, reported to the invoker as the payload status and body.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ServiceError {
    pub msg: String,
    pub status: Status,
}

impl ServiceError {
    pub fn new<T: fmt::Display>(status: Status, msg: T) -> ServiceError {
        ServiceError {
            msg: msg.to_string(),
            status,
        }
    }

    /// The batch or event is unusable as sent; retrying it unchanged will fail again.
    pub fn bad_request<T: fmt::Display>(msg: T) -> ServiceError {
        Self::new(Status::BadRequest, msg)
    }

    pub fn internal_server_error<T: fmt::Display>(msg: T) -> ServiceError {
        Self::new(Status::InternalServerError, msg)
    }

    pub fn is_client_error(&self) -> bool {
        self.status == Status::BadRequest
    }
}

// Single-line JSON.
impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let json = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        f.write_str(&json)
    }
}

impl std::error::Error for ServiceError {}

impl From<serde_json::Error> for ServiceError {
    fn from(err: serde_json::Error) -> Self {
        ServiceError::internal_server_error(format!("Unable to encode summary: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_renders_status_code_and_message() {
        let err = ServiceError::bad_request("file must contain columns 'id'");
        let rendered: serde_json::Value = serde_json::from_str(&err.to_string()).unwrap();
        assert_eq!(rendered["status"], 400);
        assert_eq!(rendered["msg"], "file must contain columns 'id'");
        assert!(!err.to_string().contains('\n'));
    }

    #[test]
    fn constructors_pick_status() {
        assert!(ServiceError::bad_request("bad").is_client_error());
        let err = ServiceError::internal_server_error("Unable to extract body");
        assert!(!err.is_client_error());
        assert_eq!(err.status, Status::InternalServerError);
    }

    #[test]
    fn json_failures_are_internal() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = ServiceError::from(json_err);
        assert_eq!(err.status, Status::InternalServerError);
        assert!(err.msg.starts_with("Unable to encode summary"));
    }
}

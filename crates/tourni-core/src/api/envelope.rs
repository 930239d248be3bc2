//! The backend's uniform response wrapper.
//!
//! Services disagree on the flag name (`success` vs `isSuccess`), so both
//! are accepted here and nothing past this module sees the raw shape.

use serde::{Deserialize, Serialize};

use super::ApiError;

/// Placeholder used when a failure envelope carries no details.
pub const UNKNOWN_ERROR_MESSAGE: &str = "Unknown error";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorDetails {
    #[serde(default)]
    pub error_code: i32,
    #[serde(default)]
    pub error_message: String,
}

impl ErrorDetails {
    pub fn unknown() -> Self {
        Self {
            error_code: 0,
            error_message: UNKNOWN_ERROR_MESSAGE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiEnvelope<T> {
    #[serde(alias = "isSuccess")]
    pub success: bool,
    pub data: Option<T>,
    #[serde(default)]
    pub error_details: Option<ErrorDetails>,
}

impl<T> ApiEnvelope<T> {
    /// Error details of a failure envelope, with the placeholder substituted
    /// when the backend sent none.
    pub fn error_details_or_unknown(&self) -> ErrorDetails {
        match &self.error_details {
            Some(details) if !details.error_message.trim().is_empty() => details.clone(),
            Some(details) => ErrorDetails {
                error_code: details.error_code,
                error_message: UNKNOWN_ERROR_MESSAGE.to_string(),
            },
            None => ErrorDetails::unknown(),
        }
    }

    /// Collapse into the payload or a `Rejected` error. A success envelope
    /// without data is a malformed response.
    pub fn into_result(self) -> Result<T, ApiError> {
        if self.success {
            return self
                .data
                .ok_or_else(|| ApiError::InvalidResponse("success envelope without data".into()));
        }
        let details = self.error_details_or_unknown();
        Err(ApiError::Rejected {
            code: details.error_code,
            message: details.error_message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_success_spelling() {
        let env: ApiEnvelope<String> =
            serde_json::from_str(r#"{"success":true,"data":"saved","errorDetails":null}"#).unwrap();
        assert_eq!(env.into_result().unwrap(), "saved");
    }

    #[test]
    fn test_decode_is_success_spelling() {
        let env: ApiEnvelope<Vec<i32>> =
            serde_json::from_str(r#"{"isSuccess":true,"data":[1,2]}"#).unwrap();
        assert_eq!(env.into_result().unwrap(), vec![1, 2]);
    }

    #[test]
    fn test_missing_flag_is_rejected_at_decode() {
        let result: Result<ApiEnvelope<String>, _> = serde_json::from_str(r#"{"data":"x"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_failure_carries_details() {
        let env: ApiEnvelope<String> = serde_json::from_str(
            r#"{"success":false,"data":null,"errorDetails":{"errorCode":401,"errorMessage":"bad credentials"}}"#,
        )
        .unwrap();
        match env.into_result() {
            Err(ApiError::Rejected { code, message }) => {
                assert_eq!(code, 401);
                assert_eq!(message, "bad credentials");
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_failure_without_details_uses_placeholder() {
        let env: ApiEnvelope<String> = serde_json::from_str(r#"{"success":false}"#).unwrap();
        assert_eq!(env.error_details_or_unknown(), ErrorDetails::unknown());
        assert!(matches!(
            env.into_result(),
            Err(ApiError::Rejected { code: 0, ref message }) if message == UNKNOWN_ERROR_MESSAGE
        ));
    }

    fn decode<T: serde::de::DeserializeOwned>(json: &str) -> Result<T, ApiError> {
        let env: ApiEnvelope<T> = serde_json::from_str(json).unwrap();
        env.into_result()
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Opaque {
        id: i64,
    }

    #[test]
    fn test_decode_through_generic_caller() {
        // Payload types need not implement Default.
        let item: Opaque = decode(r#"{"success":true,"data":{"id":7}}"#).unwrap();
        assert_eq!(item, Opaque { id: 7 });
        assert!(decode::<Opaque>(r#"{"success":true}"#).is_err());
    }

    #[test]
    fn test_success_without_data_is_invalid() {
        let env: ApiEnvelope<String> = serde_json::from_str(r#"{"success":true}"#).unwrap();
        assert!(matches!(env.into_result(), Err(ApiError::InvalidResponse(_))));
    }
}

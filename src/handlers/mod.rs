pub mod admin;
pub mod content;
pub mod misc;
pub mod presence;
pub mod profiles;

use actix_web::{get, HttpResponse, Responder};
use serde::de::DeserializeOwned;

use crate::error::ServiceError;

/// Parse an optional snake_case status query parameter into its enum. Empty
/// strings behave like an absent parameter; anything unknown is a 400.
pub(crate) fn parse_status<T: DeserializeOwned>(raw: Option<&str>) -> Result<Option<T>, ServiceError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => serde_json::from_value(serde_json::Value::String(value.to_string()))
            .map(Some)
            .map_err(|_| ServiceError::invalid(format!("unknown status \"{value}\""))),
    }
}

// ============================================================================
// HEALTH CHECK
// ============================================================================

#[get("/health")]
pub async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "service": "community-service",
        "timestamp": chrono::Utc::now()
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{JobStatus, ModerationStatus};

    #[test]
    fn status_parser_accepts_snake_case_values() {
        assert_eq!(
            parse_status::<ModerationStatus>(Some("approved")).ok().flatten(),
            Some(ModerationStatus::Approved)
        );
        assert_eq!(
            parse_status::<JobStatus>(Some("closed")).ok().flatten(),
            Some(JobStatus::Closed)
        );
    }

    #[test]
    fn status_parser_treats_blank_as_absent() {
        assert_eq!(parse_status::<ModerationStatus>(None).ok().flatten(), None);
        assert_eq!(parse_status::<ModerationStatus>(Some("  ")).ok().flatten(), None);
    }

    #[test]
    fn status_parser_rejects_unknown_values() {
        assert!(parse_status::<ModerationStatus>(Some("banana")).is_err());
    }
}

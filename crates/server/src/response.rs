//! The JSON response envelope shared by every operation.
//!
//! Every operation responds with
//! `{success, data, message?, error?, page?, limit?, total?, totalPages?}`.
//! List operations always populate the pagination fields; single-entity
//! operations omit them. Failures are non-throwing on the wire: the
//! caller inspects `success` rather than relying on a transport fault.

use serde::Serialize;

use bazaar_core::PageMeta;

/// Response envelope for a payload of type `T`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub success: bool,
    /// Always present, `null` on failure.
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_pages: Option<u64>,
}

impl<T> ApiResponse<T> {
    /// Successful single-entity response.
    #[must_use]
    pub const fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            error: None,
            page: None,
            limit: None,
            total: None,
            total_pages: None,
        }
    }

    /// Successful response with a human-readable message.
    #[must_use]
    pub fn ok_with_message(data: Option<T>, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data,
            message: Some(message.into()),
            error: None,
            page: None,
            limit: None,
            total: None,
            total_pages: None,
        }
    }

    /// Successful list response carrying pagination metadata.
    #[must_use]
    pub const fn paged(data: T, meta: PageMeta) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            error: None,
            page: Some(meta.page),
            limit: Some(meta.limit),
            total: Some(meta.total),
            total_pages: Some(meta.total_pages),
        }
    }

    /// Reported (non-fatal) failure outcome, e.g. clearing a cart that
    /// does not exist.
    #[must_use]
    pub fn not_found_outcome(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message.into()),
            error: None,
            page: None,
            limit: None,
            total: None,
            total_pages: None,
        }
    }

    /// Failure envelope produced by the error boundary.
    #[must_use]
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: None,
            error: Some(error.into()),
            page: None,
            limit: None,
            total: None,
            total_pages: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    #[test]
    fn single_entity_omits_pagination_fields() {
        let envelope = ApiResponse::ok(json!({"id": 1}));
        let value = serde_json::to_value(&envelope).expect("serialize");
        assert_eq!(value["success"], Value::Bool(true));
        assert!(value.get("page").is_none());
        assert!(value.get("totalPages").is_none());
    }

    #[test]
    fn paged_response_carries_all_pagination_fields() {
        let envelope = ApiResponse::paged(json!([]), PageMeta::compute(2, 10, 25));
        let value = serde_json::to_value(&envelope).expect("serialize");
        assert_eq!(value["page"], json!(2));
        assert_eq!(value["limit"], json!(10));
        assert_eq!(value["total"], json!(25));
        assert_eq!(value["totalPages"], json!(3));
    }

    #[test]
    fn failure_reports_error_and_null_data() {
        let envelope = ApiResponse::<Value>::failure("Cart not found");
        let value = serde_json::to_value(&envelope).expect("serialize");
        assert_eq!(value["success"], Value::Bool(false));
        assert_eq!(value["data"], Value::Null);
        assert_eq!(value["error"], json!("Cart not found"));
    }
}

use axum::{
    extract::rejection::JsonRejection,
    extract::{FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use validator::Validate;

use crate::error::AppError;

/// JSON extractor that runs the payload through its declared field rules
/// before the handler sees it.
#[derive(Debug)]
pub struct ValidatedJson<T>(pub T);

/// One field-level violation, as reported to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// Path of the offending field; empty when the body as a whole was
    /// malformed.
    pub field: String,
    pub message: String,
}

/// Rejection raised by [`ValidatedJson`].
///
/// Violations of the payload's shape end the request with 400 and the full
/// list of field errors. Failures that say nothing about the payload (the
/// body could not be read at all) take the generic error path instead.
#[derive(Debug)]
pub enum ValidationRejection {
    Invalid(Vec<FieldError>),
    Internal(AppError),
}

impl ValidationRejection {
    fn from_json_rejection(rejection: JsonRejection) -> Self {
        let schema_related = matches!(
            rejection,
            JsonRejection::JsonDataError(_)
                | JsonRejection::JsonSyntaxError(_)
                | JsonRejection::MissingJsonContentType(_)
        );

        if schema_related {
            ValidationRejection::Invalid(vec![FieldError {
                field: String::new(),
                message: rejection.body_text(),
            }])
        } else {
            ValidationRejection::Internal(AppError::Internal(anyhow::anyhow!(
                "failed to read request body: {rejection}"
            )))
        }
    }

    fn from_validation_errors(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<FieldError> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, violations)| {
                violations.iter().map(move |violation| FieldError {
                    field: field.to_string(),
                    message: violation
                        .message
                        .as_ref()
                        .map(|message| message.to_string())
                        .unwrap_or_else(|| violation.code.to_string()),
                })
            })
            .collect();
        // HashMap iteration order is arbitrary; keep the report stable.
        fields.sort_by(|a, b| a.field.cmp(&b.field));

        ValidationRejection::Invalid(fields)
    }
}

impl IntoResponse for ValidationRejection {
    fn into_response(self) -> Response {
        match self {
            ValidationRejection::Invalid(errors) => {
                #[derive(Serialize)]
                struct FailResponse {
                    status: &'static str,
                    errors: Vec<FieldError>,
                }

                (
                    StatusCode::BAD_REQUEST,
                    Json(FailResponse {
                        status: "fail",
                        errors,
                    }),
                )
                    .into_response()
            }
            ValidationRejection::Internal(err) => err.into_response(),
        }
    }
}

#[axum::async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate + 'static,
    S: Send + Sync,
{
    type Rejection = ValidationRejection;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(ValidationRejection::from_json_rejection)?;

        value
            .validate()
            .map_err(ValidationRejection::from_validation_errors)?;

        Ok(ValidatedJson(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dtos::{CreateUserRequest, UpdateUserRequest};
    use axum::body::Body;
    use axum::http::header;
    use http_body_util::BodyExt;
    use serde_json::{json, Value};

    async fn extract<T>(
        body: Body,
        content_type: Option<&str>,
    ) -> Result<ValidatedJson<T>, ValidationRejection>
    where
        T: DeserializeOwned + Validate + 'static,
    {
        let mut builder = axum::http::Request::builder().method("POST").uri("/");
        if let Some(content_type) = content_type {
            builder = builder.header(header::CONTENT_TYPE, content_type);
        }
        let request = builder.body(body).expect("failed to build request");

        ValidatedJson::<T>::from_request(request, &()).await
    }

    async fn response_parts(rejection: ValidationRejection) -> (StatusCode, Value) {
        let response = rejection.into_response();
        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("failed to read body")
            .to_bytes();
        let body = serde_json::from_slice(&bytes).expect("body is not JSON");
        (status, body)
    }

    fn fields(rejection: &ValidationRejection) -> Vec<(String, String)> {
        match rejection {
            ValidationRejection::Invalid(errors) => errors
                .iter()
                .map(|e| (e.field.clone(), e.message.clone()))
                .collect(),
            ValidationRejection::Internal(_) => panic!("expected Invalid rejection"),
        }
    }

    #[tokio::test]
    async fn well_formed_payload_passes() {
        let body = Body::from(
            json!({ "name": "Anil", "email": "anil@gmail.com", "password": "123456" }).to_string(),
        );

        let validated = extract::<CreateUserRequest>(body, Some("application/json"))
            .await
            .expect("payload should validate");
        assert!(format!("{validated:?}").contains("anil@gmail.com"));

        let ValidatedJson(request) = validated;
        assert_eq!(request.name.as_deref(), Some("Anil"));
        assert_eq!(request.email.as_deref(), Some("anil@gmail.com"));
    }

    #[tokio::test]
    async fn missing_fields_are_all_reported_at_once() {
        let body = Body::from(json!({}).to_string());

        let rejection = extract::<CreateUserRequest>(body, Some("application/json"))
            .await
            .expect_err("empty payload should be rejected");

        assert_eq!(
            fields(&rejection),
            vec![
                ("email".to_string(), "Email is required".to_string()),
                ("name".to_string(), "Name is required".to_string()),
                ("password".to_string(), "Password is required".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn constraint_violations_carry_their_messages() {
        let body = Body::from(
            json!({ "name": "J", "email": "not-an-email", "password": "123" }).to_string(),
        );

        let rejection = extract::<CreateUserRequest>(body, Some("application/json"))
            .await
            .expect_err("payload should be rejected");

        assert_eq!(
            fields(&rejection),
            vec![
                ("email".to_string(), "Invalid email format".to_string()),
                (
                    "name".to_string(),
                    "Name must be at least 2 characters".to_string()
                ),
                (
                    "password".to_string(),
                    "Password must be at least 6 characters long".to_string()
                ),
            ]
        );

        let (status, body) = response_parts(rejection).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["status"], "fail");
        assert_eq!(body["errors"].as_array().map(Vec::len), Some(3));
    }

    #[tokio::test]
    async fn unknown_fields_are_rejected() {
        let body = Body::from(
            json!({
                "name": "Anil",
                "email": "anil@gmail.com",
                "password": "123456",
                "role": "admin"
            })
            .to_string(),
        );

        let rejection = extract::<CreateUserRequest>(body, Some("application/json"))
            .await
            .expect_err("unknown field should be rejected");

        let reported = fields(&rejection);
        assert_eq!(reported.len(), 1);
        assert_eq!(reported[0].0, "");
        assert!(reported[0].1.contains("unknown field `role`"));
    }

    #[tokio::test]
    async fn type_mismatch_is_a_schema_failure() {
        let body = Body::from(
            json!({ "name": 42, "email": "anil@gmail.com", "password": "123456" }).to_string(),
        );

        let rejection = extract::<CreateUserRequest>(body, Some("application/json"))
            .await
            .expect_err("type mismatch should be rejected");

        let (status, body) = response_parts(rejection).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["status"], "fail");
    }

    #[tokio::test]
    async fn syntactically_broken_json_is_a_schema_failure() {
        let body = Body::from("{ not json");

        let rejection = extract::<CreateUserRequest>(body, Some("application/json"))
            .await
            .expect_err("broken JSON should be rejected");

        let (status, body) = response_parts(rejection).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["status"], "fail");
    }

    #[tokio::test]
    async fn missing_content_type_is_a_schema_failure() {
        let body = Body::from(
            json!({ "name": "Anil", "email": "anil@gmail.com", "password": "123456" }).to_string(),
        );

        let rejection = extract::<CreateUserRequest>(body, None)
            .await
            .expect_err("missing content type should be rejected");

        let (status, _) = response_parts(rejection).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn unreadable_body_takes_the_generic_error_path() {
        let stream = futures::stream::once(async {
            Err::<Vec<u8>, std::io::Error>(std::io::Error::other("connection reset"))
        });
        let body = Body::from_stream(stream);

        let rejection = extract::<CreateUserRequest>(body, Some("application/json"))
            .await
            .expect_err("unreadable body should be rejected");
        assert!(matches!(rejection, ValidationRejection::Internal(_)));

        let (status, body) = response_parts(rejection).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["success"], false);
        assert!(body.get("status").is_none());
    }

    #[tokio::test]
    async fn empty_update_payload_is_valid() {
        let body = Body::from(json!({}).to_string());

        extract::<UpdateUserRequest>(body, Some("application/json"))
            .await
            .expect("empty update should validate");
    }

    #[tokio::test]
    async fn update_fields_keep_their_registration_constraints() {
        let body = Body::from(json!({ "email": "nope" }).to_string());

        let rejection = extract::<UpdateUserRequest>(body, Some("application/json"))
            .await
            .expect_err("bad email should be rejected");

        assert_eq!(
            fields(&rejection),
            vec![("email".to_string(), "Invalid email format".to_string())]
        );
    }
}

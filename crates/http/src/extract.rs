//! Request body validation at the HTTP boundary.

use axum::{
    extract::{FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::error::AppError;

/// Checks a deserialized request body before anything is built from it.
pub trait Validate {
    /// Fixed message returned to the client for any malformed body of this type.
    const INVALID_MESSAGE: &'static str;

    /// Returns per-field failure details on rejection.
    fn validate(&self) -> Result<(), Vec<Value>>;
}

/// Presence check shared by every input type: each named string must be non-empty.
pub fn require_non_empty(fields: &[(&str, &str)]) -> Result<(), Vec<Value>> {
    let details: Vec<Value> = fields
        .iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(field, _)| json!({"field": field, "error": "must be a non-empty string"}))
        .collect();

    if details.is_empty() {
        Ok(())
    } else {
        Err(details)
    }
}

/// JSON body that has been deserialized into `T` and passed [`Validate`].
///
/// Missing fields, nulls, wrong primitive types, malformed JSON, and a missing JSON content
/// type are all rejected with `T::INVALID_MESSAGE` and status 400.
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| {
                AppError::validation(
                    vec![json!({"error": rejection.body_text()})],
                    T::INVALID_MESSAGE,
                )
            })?;

        value
            .validate()
            .map_err(|details| AppError::validation(details, T::INVALID_MESSAGE))?;

        Ok(Self(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{self, header::CONTENT_TYPE, StatusCode},
        response::IntoResponse,
    };
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Greeting {
        name: String,
        times: f64,
    }

    impl Validate for Greeting {
        const INVALID_MESSAGE: &'static str = "name and times are required";

        fn validate(&self) -> Result<(), Vec<Value>> {
            require_non_empty(&[("name", &self.name)])
        }
    }

    fn json_request(body: &str) -> Request {
        http::Request::builder()
            .method("POST")
            .uri("/")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn extract(req: Request) -> Result<ValidatedJson<Greeting>, AppError> {
        ValidatedJson::<Greeting>::from_request(req, &()).await
    }

    #[test]
    fn require_non_empty_reports_each_blank_field() {
        let err = require_non_empty(&[("a", ""), ("b", "x"), ("c", "")]).unwrap_err();
        assert_eq!(err.len(), 2);
        assert_eq!(err[0]["field"], "a");
        assert_eq!(err[1]["field"], "c");
    }

    #[tokio::test]
    async fn accepts_well_formed_body() {
        let ValidatedJson(greeting) = extract(json_request(r#"{"name":"Ada","times":2}"#))
            .await
            .unwrap();
        assert_eq!(greeting.name, "Ada");
        assert_eq!(greeting.times, 2.0);
    }

    #[tokio::test]
    async fn rejects_wrong_type_with_fixed_message() {
        let err = extract(json_request(r#"{"name":"Ada","times":"two"}"#))
            .await
            .unwrap_err();
        match &err {
            AppError::Validation { message, .. } => {
                assert_eq!(message, Greeting::INVALID_MESSAGE)
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn rejects_null_and_empty_fields() {
        for body in [
            r#"{"name":null,"times":1}"#,
            r#"{"name":"","times":1}"#,
            r#"{"times":1}"#,
            "not json",
        ] {
            let err = extract(json_request(body)).await.unwrap_err();
            assert_eq!(err.status(), StatusCode::BAD_REQUEST, "body: {body}");
        }
    }

    #[tokio::test]
    async fn rejects_missing_content_type() {
        let req = http::Request::builder()
            .method("POST")
            .uri("/")
            .body(Body::from(r#"{"name":"Ada","times":1}"#))
            .unwrap();
        let err = extract(req).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }
}

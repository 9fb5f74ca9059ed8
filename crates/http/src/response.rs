//! Success envelopes: `{ "message": .., "<key>": <payload> }`.

use axum::{http::StatusCode, Json};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::AppError;

fn envelope<T: Serialize + ?Sized>(
    message: &str,
    key: &str,
    payload: &T,
) -> Result<Value, AppError> {
    let payload = serde_json::to_value(payload).map_err(AppError::internal)?;

    let mut body = Map::new();
    body.insert("message".to_string(), Value::String(message.to_string()));
    body.insert(key.to_string(), payload);
    Ok(Value::Object(body))
}

/// `201 Created` carrying a single freshly stored entity.
pub fn created<T: Serialize>(
    message: &str,
    key: &str,
    entity: &T,
) -> Result<(StatusCode, Json<Value>), AppError> {
    Ok((StatusCode::CREATED, Json(envelope(message, key, entity)?)))
}

/// `200 OK` carrying every entity of one kind.
pub fn listed<T: Serialize>(
    message: &str,
    key: &str,
    entities: &[T],
) -> Result<(StatusCode, Json<Value>), AppError> {
    Ok((StatusCode::OK, Json(envelope(message, key, entities)?)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn created_wraps_entity_under_key() {
        let (status, Json(body)) =
            created("Thing created", "thing", &json!({"id": "t1"})).unwrap();
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body, json!({"message": "Thing created", "thing": {"id": "t1"}}));
    }

    #[test]
    fn listed_wraps_array_under_key() {
        let (status, Json(body)) = listed("Things", "things", &[1, 2]).unwrap();
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"message": "Things", "things": [1, 2]}));
    }
}

use bookswap_http::{require_non_empty, Validate};
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use time::OffsetDateTime;

use crate::modules::collection::Entity;

/// A rating left by a user about a swap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feedback {
    pub id: String,
    pub user_id: String,
    pub swap_request_id: String,
    /// Kept exactly as sent; `5` stays `5` and large integers are not rounded.
    pub rating: Number,
    pub comment: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Request model for leaving feedback. `rating` must be a JSON number.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateFeedback {
    pub user_id: String,
    pub swap_request_id: String,
    pub rating: Number,
    pub comment: String,
}

impl Validate for CreateFeedback {
    const INVALID_MESSAGE: &'static str =
        "Invalid input: userId, swapRequestId and comment must be non-empty strings and rating must be a number";

    fn validate(&self) -> Result<(), Vec<Value>> {
        require_non_empty(&[
            ("userId", &self.user_id),
            ("swapRequestId", &self.swap_request_id),
            ("comment", &self.comment),
        ])
    }
}

impl Entity for Feedback {
    type Input = CreateFeedback;

    const TABLE: &'static str = "feedback";
    const SINGULAR: &'static str = "feedback";
    const PLURAL: &'static str = "feedback";
    const CREATED_MESSAGE: &'static str = "Feedback created successfully";
    const LISTED_MESSAGE: &'static str = "Feedback retrieved successfully";

    fn build(input: CreateFeedback, id: String, created_at: OffsetDateTime) -> Self {
        Self {
            id,
            user_id: input.user_id,
            swap_request_id: input.swap_request_id,
            rating: input.rating,
            comment: input.comment,
            created_at,
        }
    }

    fn id(&self) -> &str {
        &self.id
    }
}

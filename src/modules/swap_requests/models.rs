use bookswap_http::{require_non_empty, Validate};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::OffsetDateTime;

use crate::modules::collection::Entity;

/// A request by one user to swap for a listed book.
///
/// `status` is free-form text; no transitions are enforced and it has no effect on the book.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapRequest {
    pub id: String,
    pub book_id: String,
    pub requested_by_id: String,
    pub status: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSwapRequest {
    pub book_id: String,
    pub requested_by_id: String,
    pub status: String,
}

impl Validate for CreateSwapRequest {
    const INVALID_MESSAGE: &'static str =
        "Invalid input: bookId, requestedById and status are required and must be non-empty strings";

    fn validate(&self) -> Result<(), Vec<Value>> {
        require_non_empty(&[
            ("bookId", &self.book_id),
            ("requestedById", &self.requested_by_id),
            ("status", &self.status),
        ])
    }
}

impl Entity for SwapRequest {
    type Input = CreateSwapRequest;

    const TABLE: &'static str = "swap_requests";
    const SINGULAR: &'static str = "swapRequest";
    const PLURAL: &'static str = "swapRequests";
    const CREATED_MESSAGE: &'static str = "Swap request created successfully";
    const LISTED_MESSAGE: &'static str = "Swap requests retrieved successfully";

    fn build(input: CreateSwapRequest, id: String, created_at: OffsetDateTime) -> Self {
        Self {
            id,
            book_id: input.book_id,
            requested_by_id: input.requested_by_id,
            status: input.status,
            created_at,
        }
    }

    fn id(&self) -> &str {
        &self.id
    }
}

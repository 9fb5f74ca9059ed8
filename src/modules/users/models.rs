use bookswap_http::{require_non_empty, Validate};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::OffsetDateTime;

use crate::modules::collection::Entity;

/// A registered marketplace member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Request model for registering a user.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUser {
    pub name: String,
    pub email: String,
}

impl Validate for CreateUser {
    const INVALID_MESSAGE: &'static str =
        "Invalid input: name and email are required and must be non-empty strings";

    fn validate(&self) -> Result<(), Vec<Value>> {
        require_non_empty(&[("name", &self.name), ("email", &self.email)])
    }
}

impl Entity for User {
    type Input = CreateUser;

    const TABLE: &'static str = "users";
    const SINGULAR: &'static str = "user";
    const PLURAL: &'static str = "users";
    const CREATED_MESSAGE: &'static str = "User created successfully";
    const LISTED_MESSAGE: &'static str = "Users retrieved successfully";

    fn build(input: CreateUser, id: String, created_at: OffsetDateTime) -> Self {
        Self {
            id,
            name: input.name,
            email: input.email,
            created_at,
        }
    }

    fn id(&self) -> &str {
        &self.id
    }
}

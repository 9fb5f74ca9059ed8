use bookswap_http::{require_non_empty, Validate};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::OffsetDateTime;

use crate::modules::collection::Entity;

/// A book offered for swapping by its owner.
///
/// `user_id` is not checked against the users table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    /// Unique identifier for the book
    pub id: String,
    /// Owner of the book
    pub user_id: String,
    /// Title of the book
    pub title: String,
    /// Author of the book
    pub author: String,
    /// Free-form description of the copy on offer
    pub description: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Request model for listing a new book.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBook {
    pub user_id: String,
    pub title: String,
    pub author: String,
    pub description: String,
}

impl Validate for CreateBook {
    const INVALID_MESSAGE: &'static str =
        "Invalid input: userId, title, author and description are required and must be non-empty strings";

    fn validate(&self) -> Result<(), Vec<Value>> {
        require_non_empty(&[
            ("userId", &self.user_id),
            ("title", &self.title),
            ("author", &self.author),
            ("description", &self.description),
        ])
    }
}

impl Entity for Book {
    type Input = CreateBook;

    const TABLE: &'static str = "books";
    const SINGULAR: &'static str = "book";
    const PLURAL: &'static str = "books";
    const CREATED_MESSAGE: &'static str = "Book created successfully";
    const LISTED_MESSAGE: &'static str = "Books retrieved successfully";

    fn build(input: CreateBook, id: String, created_at: OffsetDateTime) -> Self {
        Self {
            id,
            user_id: input.user_id,
            title: input.title,
            author: input.author,
            description: input.description,
            created_at,
        }
    }

    fn id(&self) -> &str {
        &self.id
    }
}

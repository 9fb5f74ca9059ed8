pub mod models;

use std::sync::Arc;

use async_trait::async_trait;
use axum::{routing::post, Router};
use bookswap_db::{StorageResult, Store};
use bookswap_kernel::{Capabilities, InitCtx, Module};
use serde_json::Map;

use crate::modules::collection::{self, Collection, Entity};
use crate::utils::{self, CollectionDoc};
use models::Book;

/// Books module: the catalogue of copies users offer for swapping
pub struct BooksModule {
    books: Collection<Book>,
}

impl BooksModule {
    pub fn new(books: Collection<Book>) -> Self {
        Self { books }
    }
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        "books"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            rows = self.books.rows()?,
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        Router::new()
            .route(
                "/books",
                post(collection::create::<Book>).get(collection::list::<Book>),
            )
            .with_state(self.books.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let mut entity = Map::new();
        entity.insert("userId".into(), utils::string_property("Id of the owning user"));
        entity.insert("title".into(), utils::string_property("Title of the book"));
        entity.insert("author".into(), utils::string_property("Author of the book"));
        entity.insert(
            "description".into(),
            utils::string_property("Description of the copy on offer"),
        );
        let input = entity.clone();
        let required = ["userId", "title", "author", "description"];

        Some(utils::collection_openapi(
            &CollectionDoc {
                path: "/books",
                tag: "Books",
                singular: Book::SINGULAR,
                plural: Book::PLURAL,
                schema: "Book",
                input_schema: "CreateBook",
                created_message: Book::CREATED_MESSAGE,
                listed_message: Book::LISTED_MESSAGE,
            },
            utils::entity_schema(entity, &required),
            utils::input_schema(input, &required),
        ))
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module stopped");
        Ok(())
    }
}

/// Create a new instance of the books module backed by `store`
pub fn create_module(store: &Store, caps: &Capabilities) -> StorageResult<Arc<dyn Module>> {
    Ok(Arc::new(BooksModule::new(Collection::open(store, caps)?)))
}

pub mod models;

use std::sync::Arc;

use async_trait::async_trait;
use axum::{routing::post, Router};
use bookswap_db::{StorageResult, Store};
use bookswap_kernel::{Capabilities, InitCtx, Module};
use serde_json::{json, Map};

use crate::modules::collection::{self, Collection, Entity};
use crate::utils::{self, CollectionDoc};
use models::Feedback;

/// Feedback on completed swaps
pub struct FeedbackModule {
    feedback: Collection<Feedback>,
}

impl FeedbackModule {
    pub fn new(feedback: Collection<Feedback>) -> Self {
        Self { feedback }
    }
}

#[async_trait]
impl Module for FeedbackModule {
    fn name(&self) -> &'static str {
        "feedback"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            rows = self.feedback.rows()?,
            "feedback module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        Router::new()
            .route(
                "/feedback",
                post(collection::create::<Feedback>).get(collection::list::<Feedback>),
            )
            .with_state(self.feedback.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let mut entity = Map::new();
        entity.insert("userId".into(), utils::string_property("Id of the reviewing user"));
        entity.insert(
            "swapRequestId".into(),
            utils::string_property("Id of the swap being reviewed"),
        );
        entity.insert(
            "rating".into(),
            json!({ "type": "number", "description": "Numeric rating" }),
        );
        entity.insert("comment".into(), utils::string_property("Free-text comment"));
        let input = entity.clone();
        let required = ["userId", "swapRequestId", "rating", "comment"];

        Some(utils::collection_openapi(
            &CollectionDoc {
                path: "/feedback",
                tag: "Feedback",
                singular: Feedback::SINGULAR,
                plural: Feedback::PLURAL,
                schema: "Feedback",
                input_schema: "CreateFeedback",
                created_message: Feedback::CREATED_MESSAGE,
                listed_message: Feedback::LISTED_MESSAGE,
            },
            utils::entity_schema(entity, &required),
            utils::input_schema(input, &required),
        ))
    }
}

/// Create a new instance of the feedback module backed by `store`
pub fn create_module(store: &Store, caps: &Capabilities) -> StorageResult<Arc<dyn Module>> {
    Ok(Arc::new(FeedbackModule::new(Collection::open(store, caps)?)))
}

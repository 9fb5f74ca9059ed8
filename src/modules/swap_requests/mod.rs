pub mod models;

use std::sync::Arc;

use async_trait::async_trait;
use axum::{routing::post, Router};
use bookswap_db::{StorageResult, Store};
use bookswap_kernel::{Capabilities, InitCtx, Module};
use serde_json::Map;

use crate::modules::collection::{self, Collection, Entity};
use crate::utils::{self, CollectionDoc};
use models::SwapRequest;

/// Swap requests module
pub struct SwapRequestsModule {
    requests: Collection<SwapRequest>,
}

impl SwapRequestsModule {
    pub fn new(requests: Collection<SwapRequest>) -> Self {
        Self { requests }
    }
}

#[async_trait]
impl Module for SwapRequestsModule {
    fn name(&self) -> &'static str {
        "swap_requests"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            rows = self.requests.rows()?,
            "swap requests module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        Router::new()
            .route(
                "/swapRequests",
                post(collection::create::<SwapRequest>).get(collection::list::<SwapRequest>),
            )
            .with_state(self.requests.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let mut entity = Map::new();
        entity.insert("bookId".into(), utils::string_property("Id of the requested book"));
        entity.insert(
            "requestedById".into(),
            utils::string_property("Id of the requesting user"),
        );
        entity.insert("status".into(), utils::string_property("Free-form status text"));
        let input = entity.clone();
        let required = ["bookId", "requestedById", "status"];

        Some(utils::collection_openapi(
            &CollectionDoc {
                path: "/swapRequests",
                tag: "Swap requests",
                singular: SwapRequest::SINGULAR,
                plural: SwapRequest::PLURAL,
                schema: "SwapRequest",
                input_schema: "CreateSwapRequest",
                created_message: SwapRequest::CREATED_MESSAGE,
                listed_message: SwapRequest::LISTED_MESSAGE,
            },
            utils::entity_schema(entity, &required),
            utils::input_schema(input, &required),
        ))
    }
}

/// Create a new instance of the swap requests module backed by `store`
pub fn create_module(store: &Store, caps: &Capabilities) -> StorageResult<Arc<dyn Module>> {
    Ok(Arc::new(SwapRequestsModule::new(Collection::open(store, caps)?)))
}

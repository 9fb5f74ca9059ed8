pub mod models;

use std::sync::Arc;

use async_trait::async_trait;
use axum::{routing::post, Router};
use bookswap_db::{StorageResult, Store};
use bookswap_kernel::{Capabilities, InitCtx, Module};
use serde_json::Map;

use crate::modules::collection::{self, Collection, Entity};
use crate::utils::{self, CollectionDoc};
use models::User;

/// Registration and listing of marketplace members
pub struct UsersModule {
    users: Collection<User>,
}

impl UsersModule {
    pub fn new(users: Collection<User>) -> Self {
        Self { users }
    }
}

#[async_trait]
impl Module for UsersModule {
    fn name(&self) -> &'static str {
        "users"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            rows = self.users.rows()?,
            "users module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        Router::new()
            .route(
                "/users",
                post(collection::create::<User>).get(collection::list::<User>),
            )
            .with_state(self.users.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let mut entity = Map::new();
        entity.insert("name".into(), utils::string_property("User's display name"));
        entity.insert("email".into(), utils::string_property("User's email address"));
        let input = entity.clone();

        Some(utils::collection_openapi(
            &CollectionDoc {
                path: "/users",
                tag: "Users",
                singular: User::SINGULAR,
                plural: User::PLURAL,
                schema: "User",
                input_schema: "CreateUser",
                created_message: User::CREATED_MESSAGE,
                listed_message: User::LISTED_MESSAGE,
            },
            utils::entity_schema(entity, &["name", "email"]),
            utils::input_schema(input, &["name", "email"]),
        ))
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "users module stopped");
        Ok(())
    }
}

/// Create a new instance of the users module backed by `store`
pub fn create_module(store: &Store, caps: &Capabilities) -> StorageResult<Arc<dyn Module>> {
    Ok(Arc::new(UsersModule::new(Collection::open(store, caps)?)))
}

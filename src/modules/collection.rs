//! Create and list handlers shared by every entity module.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use anyhow::Context;
use bookswap_db::{StorageResult, Store, Table};
use bookswap_http::{response, AppError, Validate, ValidatedJson};
use bookswap_kernel::Capabilities;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use time::OffsetDateTime;

/// A stored record with a generated id and creation time.
pub trait Entity: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Request body accepted by the create endpoint.
    type Input: DeserializeOwned + Validate + Send + 'static;

    /// Name of the backing table.
    const TABLE: &'static str;
    /// Envelope key for a single entity.
    const SINGULAR: &'static str;
    /// Envelope key for a list of entities.
    const PLURAL: &'static str;
    const CREATED_MESSAGE: &'static str;
    const LISTED_MESSAGE: &'static str;

    /// Assemble a record from already-validated input. Field values are kept verbatim.
    fn build(input: Self::Input, id: String, created_at: OffsetDateTime) -> Self;

    fn id(&self) -> &str;
}

/// One entity table plus the capabilities needed to mint new records.
pub struct Collection<E> {
    table: Arc<dyn Table<E>>,
    caps: Capabilities,
}

impl<E> Clone for Collection<E> {
    fn clone(&self) -> Self {
        Self {
            table: self.table.clone(),
            caps: self.caps.clone(),
        }
    }
}

impl<E: Entity> Collection<E> {
    pub fn new(table: Arc<dyn Table<E>>, caps: Capabilities) -> Self {
        Self { table, caps }
    }

    /// Open `E::TABLE` from the store.
    pub fn open(store: &Store, caps: &Capabilities) -> StorageResult<Self> {
        Ok(Self::new(store.table::<E>(E::TABLE)?, caps.clone()))
    }

    /// Number of stored records.
    pub fn rows(&self) -> StorageResult<usize> {
        self.table.len()
    }

    /// Build a record with a fresh id and the current time.
    pub fn construct(&self, input: E::Input) -> E {
        E::build(input, self.caps.ids.next_id(), self.caps.clock.now())
    }

    /// Construct and store a new record.
    ///
    /// Table calls may fsync, so they run on the blocking pool rather than a runtime worker.
    pub async fn create(&self, input: E::Input) -> anyhow::Result<E> {
        let entity = self.construct(input);
        let table = Arc::clone(&self.table);
        let record = entity.clone();

        tokio::task::spawn_blocking(move || table.insert(record.id().to_string(), record))
            .await
            .context("table insert task failed")?
            .with_context(|| format!("failed to insert into '{}'", E::TABLE))?;

        Ok(entity)
    }

    pub async fn list(&self) -> anyhow::Result<Vec<E>> {
        let table = Arc::clone(&self.table);

        tokio::task::spawn_blocking(move || table.values())
            .await
            .context("table read task failed")?
            .with_context(|| format!("failed to read '{}'", E::TABLE))
    }
}

/// `POST` handler: validate, construct, insert, answer 201.
pub async fn create<E: Entity>(
    State(collection): State<Collection<E>>,
    ValidatedJson(input): ValidatedJson<E::Input>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let entity = collection.create(input).await?;

    tracing::info!(table = E::TABLE, id = entity.id(), "entity created");

    response::created(E::CREATED_MESSAGE, E::SINGULAR, &entity)
}

/// `GET` handler: every stored entity in key order.
pub async fn list<E: Entity>(
    State(collection): State<Collection<E>>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let entities = collection.list().await?;

    tracing::debug!(table = E::TABLE, count = entities.len(), "entities listed");

    response::listed(E::LISTED_MESSAGE, E::PLURAL, &entities)
}

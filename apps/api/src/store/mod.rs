//! Store Client for the GridDB Web API: a schemaless store driven by SQL over HTTP.
//!
//! The client holds only immutable configuration; every operation is one
//! HTTP request (two for the probing `ensure_container`) and no state is
//! carried between calls. Nothing is retried here; callers decide.

pub mod config;
pub mod error;
mod http;
pub mod query;
pub mod record;
pub mod schema;

use std::sync::Arc;
use std::time::Duration;

use reqwest::Method;
use tokio_util::sync::CancellationToken;
use tracing::info;

pub use config::{InsertStrategy, StoreConfig};
pub use error::{StoreError, StoreResult};
pub use query::{Query, QueryKind, ResultSet, StoreResponse};
pub use record::{FieldValue, Record};
pub use schema::{Column, ColumnSchema, ColumnType, DEFAULT_CONTAINER};

use http::{HttpBackend, Probe};
use query::{validate_batch, UpdateStatement};
use record::{insert_statement, row_payload};
use schema::{validate_identifier, ContainerSpec};

#[derive(Debug, Clone)]
pub struct StoreClient {
    http: HttpBackend,
    config: Arc<StoreConfig>,
}

impl StoreClient {
    /// Validates the configuration and pre-computes the Basic token.
    pub fn new(config: StoreConfig) -> StoreResult<Self> {
        config.validate()?;
        let http = HttpBackend::new(&config)?;
        info!(
            base_url = %http.log_url(""),
            insert_strategy = ?config.insert_strategy,
            query_path = %config.query_path,
            "store client configured"
        );
        Ok(Self {
            http,
            config: Arc::new(config),
        })
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// A client sharing this one's connection pool with a different per-request timeout.
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        let mut client = self.clone();
        client.http.timeout = timeout;
        client
    }

    /// A client whose in-flight requests abort with `StoreError::Cancelled`
    /// once `token` is cancelled.
    pub fn with_cancellation(&self, token: CancellationToken) -> Self {
        let mut client = self.clone();
        client.http.cancel = Some(token);
        client
    }

    /// Creates `container` as a keyed collection unless it already exists.
    ///
    /// With probing enabled, an existing container is a logged no-op rather
    /// than an error. `schema` defaults to the configured one.
    pub async fn ensure_container(
        &self,
        schema: Option<&ColumnSchema>,
        container: &str,
    ) -> StoreResult<StoreResponse> {
        validate_identifier("container", container)?;
        let schema = schema.unwrap_or(&self.config.schema);
        self.create_container(schema, container)
            .await
            .map_err(|e| StoreError::ContainerCreation(Box::new(e)))
    }

    async fn create_container(
        &self,
        schema: &ColumnSchema,
        container: &str,
    ) -> StoreResult<StoreResponse> {
        if self.config.probe_before_create {
            let probe = self
                .http
                .probe(&format!("/containers/{container}/info"))
                .await?;
            if probe == Probe::Present {
                info!(container, "container already exists, skipping creation");
                return Ok(StoreResponse::Synthetic {
                    message: format!("Container '{container}' already exists"),
                    response: None,
                });
            }
        }

        let spec = ContainerSpec::collection(container, schema);
        let response = self.http.send(Method::POST, "/containers", &spec).await?;
        info!(container, columns = schema.len(), "container created");
        Ok(response)
    }

    /// Writes one row. The record is checked against the configured schema
    /// before anything is sent; a bad record never reaches the network.
    pub async fn insert_record(&self, record: &Record, container: &str) -> StoreResult<StoreResponse> {
        validate_identifier("container", container)?;
        let row = record.to_row(&self.config.schema)?;

        let result = match self.config.insert_strategy {
            InsertStrategy::Sql => {
                let stmt = insert_statement(container, &self.config.schema, &row);
                self.http
                    .send(
                        Method::POST,
                        &self.config.update_path,
                        &[UpdateStatement { stmt: &stmt }],
                    )
                    .await
            }
            InsertStrategy::DirectRow => {
                self.http
                    .send(
                        Method::PUT,
                        &format!("/containers/{container}/rows"),
                        &row_payload(&row),
                    )
                    .await
            }
        };

        result.map_err(|e| StoreError::Insert(Box::new(e)))
    }

    /// Submits the whole batch in one request. Per-statement results are
    /// returned as the store sent them.
    pub async fn run_query(&self, queries: &[Query]) -> StoreResult<StoreResponse> {
        validate_batch(queries)?;
        self.http
            .send(Method::POST, &self.config.query_path, queries)
            .await
            .map_err(|e| StoreError::Query(Box::new(e)))
    }

    /// `run_query` for an untyped batch, such as a JSON request body.
    pub async fn run_query_value(&self, batch: &serde_json::Value) -> StoreResult<StoreResponse> {
        let queries = Query::parse_batch(batch)?;
        self.run_query(&queries).await
    }

    /// Removes the row whose key equals `id`. The key is the first schema column.
    pub async fn delete_record(&self, id: i64, container: &str) -> StoreResult<StoreResponse> {
        validate_identifier("container", container)?;
        let key = self
            .config
            .schema
            .columns()
            .first()
            .map(|c| c.name.as_str())
            .ok_or_else(|| StoreError::validation("schema has no key column"))?;
        let stmt = format!("DELETE FROM {container} WHERE {key} = {id}");

        self.http
            .send(
                Method::POST,
                &self.config.update_path,
                &[UpdateStatement { stmt: &stmt }],
            )
            .await
            .map_err(|e| StoreError::Delete(Box::new(e)))
    }
}

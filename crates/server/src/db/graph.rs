//! Neo4j adapter: lazy connection, parameterized statements, timeouts

use std::time::Instant;

use aegis_core::ClinicalError;
use neo4rs::{BoltType, ConfigBuilder, Graph, Query, Row, query};
use serde::de::DeserializeOwned;
use tokio::sync::RwLock;

use crate::config::{GraphConfig, redact_uri};

/// Characters of query text kept in diagnostics
const QUERY_FRAGMENT_LEN: usize = 100;

/// A Cypher statement plus its parameters.
///
/// The text is kept alongside the driver query so failures can be logged
/// with a query fragment; parameter values are never logged.
pub struct Statement {
    text: String,
    query: Query,
}

impl Statement {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let query = query(&text);
        Self { text, query }
    }

    pub fn param<T: Into<BoltType>>(mut self, key: &str, value: T) -> Self {
        self.query = self.query.param(key, value);
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Whitespace-collapsed prefix of the query text
    pub fn fragment(&self) -> String {
        let collapsed = self.text.split_whitespace().collect::<Vec<_>>().join(" ");
        match collapsed.char_indices().nth(QUERY_FRAGMENT_LEN) {
            Some((cut, _)) => format!("{}...", &collapsed[..cut]),
            None => collapsed,
        }
    }
}

/// Result of a write statement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteSummary {
    pub records: usize,
}

/// Process-scoped handle to the graph database.
///
/// Construction performs no I/O; the driver connects on first use (or on an
/// explicit [`GraphDb::connect`]) and the handle is reused afterwards.
pub struct GraphDb {
    config: GraphConfig,
    graph: RwLock<Option<Graph>>,
}

impl GraphDb {
    pub fn new(config: GraphConfig) -> Self {
        Self {
            config,
            graph: RwLock::new(None),
        }
    }

    /// Connect eagerly and verify the server answers
    pub async fn connect(&self) -> Result<(), ClinicalError> {
        self.run_query("verify_connectivity", Statement::new("RETURN 1 AS ok"))
            .await?;
        tracing::info!(
            uri = %redact_uri(&self.config.uri),
            database = %self.config.database,
            "Connected to graph database"
        );
        Ok(())
    }

    /// Drop the driver handle. Best-effort: never fails.
    pub async fn close(&self) {
        if self.graph.write().await.take().is_some() {
            tracing::info!("Graph database connection closed");
        }
    }

    async fn graph(&self) -> Result<Graph, ClinicalError> {
        if let Some(graph) = self.graph.read().await.as_ref() {
            return Ok(graph.clone());
        }

        let mut slot = self.graph.write().await;
        if let Some(graph) = slot.as_ref() {
            return Ok(graph.clone());
        }
        let graph = self.open().await?;
        *slot = Some(graph.clone());
        Ok(graph)
    }

    async fn open(&self) -> Result<Graph, ClinicalError> {
        let config = ConfigBuilder::default()
            .uri(self.config.uri.as_str())
            .user(self.config.username.as_str())
            .password(self.config.password.as_str())
            .db(self.config.database.as_str())
            .build()
            .map_err(|e| ClinicalError::Connection(format!("invalid graph configuration: {}", e)))?;

        match tokio::time::timeout(self.config.query_timeout, Graph::connect(config)).await {
            Ok(Ok(graph)) => Ok(graph),
            Ok(Err(e)) => {
                tracing::error!(
                    uri = %redact_uri(&self.config.uri),
                    error = %e,
                    "Failed to connect to graph database"
                );
                Err(ClinicalError::Connection(e.to_string()))
            }
            Err(_) => Err(ClinicalError::Timeout(format!(
                "connecting to graph database exceeded {:?}",
                self.config.query_timeout
            ))),
        }
    }

    /// Run a read statement and collect every row
    pub async fn run_query(
        &self,
        operation: &'static str,
        statement: Statement,
    ) -> Result<Vec<Row>, ClinicalError> {
        let graph = self.graph().await?;
        let fragment = statement.fragment();

        let work = async move {
            let mut stream = graph.execute(statement.query).await?;
            let mut rows = Vec::new();
            while let Some(row) = stream.next().await? {
                rows.push(row);
            }
            Ok::<_, neo4rs::Error>(rows)
        };

        let start = Instant::now();
        let outcome = tokio::time::timeout(self.config.query_timeout, work).await;
        metrics::histogram!("graph_query_duration_seconds", "operation" => operation)
            .record(start.elapsed().as_secs_f64());

        match outcome {
            Ok(Ok(rows)) => Ok(rows),
            Ok(Err(e)) => {
                metrics::counter!("graph_query_errors_total", "operation" => operation).increment(1);
                tracing::error!(operation, query = %fragment, error = %e, "Graph query failed");
                Err(classify(operation, &e))
            }
            Err(_) => {
                metrics::counter!("graph_query_errors_total", "operation" => operation).increment(1);
                tracing::error!(
                    operation,
                    query = %fragment,
                    timeout = ?self.config.query_timeout,
                    "Graph query timed out"
                );
                Err(ClinicalError::Timeout(format!(
                    "{} exceeded {:?}",
                    operation, self.config.query_timeout
                )))
            }
        }
    }

    /// Run a write statement; the summary counts returned records
    pub async fn run_write(
        &self,
        operation: &'static str,
        statement: Statement,
    ) -> Result<WriteSummary, ClinicalError> {
        let rows = self.run_query(operation, statement).await?;
        Ok(WriteSummary {
            records: rows.len(),
        })
    }
}

fn classify(operation: &str, err: &neo4rs::Error) -> ClinicalError {
    match err {
        neo4rs::Error::ConnectionError | neo4rs::Error::IOError { .. } => {
            ClinicalError::Connection(format!("{}: {}", operation, err))
        }
        _ => ClinicalError::Query(format!("{}: {}", operation, err)),
    }
}

/// Typed column access; a missing or mistyped column is invalid data
pub fn field<T: DeserializeOwned>(row: &Row, operation: &str, key: &str) -> Result<T, ClinicalError> {
    row.get::<T>(key).map_err(|e| {
        ClinicalError::InvalidData(format!("{}: column `{}`: {}", operation, key, e))
    })
}

/// Bolt value for an optional property; `None` becomes null
pub fn nullable(value: &Option<String>) -> BoltType {
    match value {
        Some(v) => BoltType::from(v.as_str()),
        None => BoltType::Null(neo4rs::BoltNull),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn fragment_collapses_and_truncates() {
        let statement = Statement::new(format!(
            "MATCH (p:Patient {{id: $id}})\n    RETURN p\n{}",
            "x".repeat(200)
        ));
        let fragment = statement.fragment();
        assert!(fragment.starts_with("MATCH (p:Patient {id: $id}) RETURN p"));
        assert!(fragment.ends_with("..."));
        assert_eq!(fragment.chars().count(), QUERY_FRAGMENT_LEN + 3);
    }

    #[test]
    fn params_never_appear_in_fragment() {
        let statement = Statement::new("MATCH (p:Patient {id: $id}) RETURN p")
            .param("id", "MRN-SECRET-42");
        assert!(!statement.fragment().contains("MRN-SECRET-42"));
        assert_eq!(statement.text(), "MATCH (p:Patient {id: $id}) RETURN p");
    }

    #[tokio::test]
    async fn construction_and_close_need_no_server() {
        let db = GraphDb::new(GraphConfig {
            uri: "bolt://127.0.0.1:1".into(),
            username: "neo4j".into(),
            password: "unused".into(),
            database: "neo4j".into(),
            query_timeout: Duration::from_millis(200),
        });
        db.close().await;
        let err = db.connect().await.unwrap_err();
        assert!(matches!(
            err,
            ClinicalError::Connection(_) | ClinicalError::Timeout(_)
        ));
    }
}

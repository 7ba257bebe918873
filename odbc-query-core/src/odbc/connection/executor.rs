//! Async statement execution.

use crate::odbc::connection::{OdbcBackend, QueryBackend};
use crate::odbc::{ConnectionString, Error, ExecuteOptions, QueryOutcome, QuerySpec, Result};
use std::sync::Arc;
use std::time::Instant;

/// Runs statements on a blocking worker thread through a [`QueryBackend`].
#[derive(Clone)]
pub struct QueryExecutor {
    backend: Arc<dyn QueryBackend>,
    options: ExecuteOptions,
}

impl std::fmt::Debug for QueryExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryExecutor")
            .field("options", &self.options)
            .finish()
    }
}

impl Default for QueryExecutor {
    fn default() -> Self {
        Self::new(Arc::new(OdbcBackend))
    }
}

impl QueryExecutor {
    pub fn new(backend: Arc<dyn QueryBackend>) -> Self {
        Self {
            backend,
            options: ExecuteOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ExecuteOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &ExecuteOptions {
        &self.options
    }

    /// Execute one statement over a fresh connection.
    ///
    /// The placeholder count is checked before anything is sent to the
    /// driver. Driver failures are returned unchanged.
    pub async fn execute(
        &self,
        connection_string: &ConnectionString,
        query: QuerySpec,
    ) -> Result<QueryOutcome> {
        query.check_parameter_count()?;

        if let Some(level) = self.options.log_statements.to_level() {
            log::log!(level, "executing: {} ({} values)", query.sql(), query.values().len());
        }

        let backend = self.backend.clone();
        let options = self.options.clone();
        let connection_string = connection_string.clone();
        let sql = query.sql().to_string();
        let started = Instant::now();

        let outcome = tokio::task::spawn_blocking(move || {
            backend.run(&connection_string, &query, &options)
        })
        .await
        .map_err(|_| Error::WorkerCrashed)??;

        let elapsed = started.elapsed();
        let (slow_level, threshold) = self.options.log_slow_statements;
        if elapsed >= threshold
            && let Some(level) = slow_level.to_level()
        {
            log::log!(level, "slow statement ({:?}): {}", elapsed, sql);
        }

        match &outcome {
            QueryOutcome::Rows(set) => log::info!("query returned {} row(s)", set.len()),
            QueryOutcome::Affected(n) => log::info!("query affected {} row(s)", n),
        }
        Ok(outcome)
    }
}

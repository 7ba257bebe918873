//! The resolve, build, execute, normalize sequence.

use crate::odbc::catalog::OdbcCatalog;
use crate::odbc::row::{NormalizedRow, normalize};
use crate::odbc::{
    ConnectionFields, ConnectionStringBuilder, ParameterResolver, QueryExecutor, QueryOutcome,
    QuerySpec, Result,
};
use serde::Serialize;
use std::sync::Arc;

/// Normalized result of one statement.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NormalizedOutcome {
    Rows(Vec<NormalizedRow>),
    Affected(u64),
}

impl NormalizedOutcome {
    pub fn rows(&self) -> &[NormalizedRow] {
        match self {
            NormalizedOutcome::Rows(rows) => rows,
            NormalizedOutcome::Affected(_) => &[],
        }
    }

    pub fn rows_affected(&self) -> Option<u64> {
        match self {
            NormalizedOutcome::Rows(_) => None,
            NormalizedOutcome::Affected(n) => Some(*n),
        }
    }
}

/// One query invocation from parameters to normalized rows.
#[derive(Clone)]
pub struct Pipeline {
    catalog: Arc<dyn OdbcCatalog>,
    executor: QueryExecutor,
}

impl Pipeline {
    pub fn new(catalog: Arc<dyn OdbcCatalog>, executor: QueryExecutor) -> Self {
        Self { catalog, executor }
    }

    pub fn catalog(&self) -> &dyn OdbcCatalog {
        self.catalog.as_ref()
    }

    pub fn executor(&self) -> &QueryExecutor {
        &self.executor
    }

    pub async fn run(
        &self,
        explicit: &ConnectionFields,
        config: &ConnectionFields,
        query: QuerySpec,
    ) -> Result<NormalizedOutcome> {
        let descriptor = ParameterResolver::new(self.catalog()).resolve(explicit, config)?;
        let connection_string = ConnectionStringBuilder::new(self.catalog()).build(&descriptor)?;
        let query = query.with_quote_escape(descriptor.quote_escape());

        match self.executor.execute(&connection_string, query).await? {
            QueryOutcome::Rows(set) => {
                let policy = self.executor.options().get_duplicate_columns();
                Ok(NormalizedOutcome::Rows(normalize(set, policy)?))
            }
            QueryOutcome::Affected(n) => Ok(NormalizedOutcome::Affected(n)),
        }
    }
}

//! Automation-module contract: JSON arguments in, JSON result out.

use odbc_query_core::odbc::{
    ConnectionFields, Error, NormalizedOutcome, NormalizedRow, OdbcValue, Pipeline, QuerySpec,
    Result,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

/// Arguments accepted by the `sql_query` module.
///
/// Every connection field may be given directly or inside `config`; direct
/// fields take precedence.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModuleArgs {
    pub config: Option<Map<String, JsonValue>>,
    pub dsn: Option<String>,
    pub servername: Option<String>,
    pub port: Option<JsonValue>,
    pub database: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub dbtype: Option<String>,
    pub driver: Option<String>,
    pub odbc_opts: Option<Map<String, JsonValue>>,
    pub query: String,
    pub values: Option<Vec<JsonValue>>,
    /// Host routing hint, accepted and ignored
    pub delegate: Option<JsonValue>,
    #[serde(rename = "_ansible_check_mode", default)]
    pub check_mode: bool,
}

/// Config keys that are module arguments rather than connection fields.
const NON_CONNECTION_KEYS: &[&str] = &["query", "values", "delegate"];

impl ModuleArgs {
    /// Parse arguments, accepting a bare object or one wrapped in `ANSIBLE_MODULE_ARGS`.
    pub fn from_json(text: &str) -> Result<Self> {
        let mut value: JsonValue = serde_json::from_str(text)
            .map_err(|e| Error::InvalidParameter(format!("module arguments are not JSON: {}", e)))?;
        if let Some(inner) = value.get_mut("ANSIBLE_MODULE_ARGS") {
            value = inner.take();
        }
        serde_json::from_value(value)
            .map_err(|e| Error::InvalidParameter(format!("invalid module arguments: {}", e)))
    }

    /// Fields given directly with the task.
    pub fn explicit_fields(&self) -> Result<ConnectionFields> {
        let mut fields = ConnectionFields::new();
        let named = [
            ("dsn", &self.dsn),
            ("servername", &self.servername),
            ("database", &self.database),
            ("username", &self.username),
            ("password", &self.password),
            ("dbtype", &self.dbtype),
            ("driver", &self.driver),
        ];
        for (key, value) in named {
            if let Some(value) = value {
                fields.set(key, value.clone());
            }
        }
        if let Some(port) = &self.port
            && let Some(port) = scalar_text("port", port)?
        {
            fields.set("port", port);
        }
        if let Some(opts) = &self.odbc_opts {
            apply_options(&mut fields, opts)?;
        }
        Ok(fields)
    }

    /// Fields from the `config` mapping. Unknown keys become connection options.
    pub fn config_fields(&self) -> Result<ConnectionFields> {
        let mut fields = ConnectionFields::new();
        let Some(config) = &self.config else {
            return Ok(fields);
        };

        let mut nested_opts = None;
        for (key, value) in config {
            if key == "odbc_opts" {
                nested_opts = Some(value);
                continue;
            }
            if NON_CONNECTION_KEYS.contains(&key.as_str()) {
                continue;
            }
            if let Some(text) = scalar_text(key, value)? {
                fields.set(key, text);
            }
        }

        match nested_opts {
            Some(JsonValue::Object(opts)) => apply_options(&mut fields, opts)?,
            Some(JsonValue::Null) | None => {}
            Some(other) => {
                return Err(Error::InvalidParameter(format!(
                    "config.odbc_opts must be a mapping, got {}",
                    other
                )));
            }
        }
        Ok(fields)
    }

    pub fn query_spec(&self) -> Result<QuerySpec> {
        let values = self
            .values
            .iter()
            .flatten()
            .cloned()
            .map(OdbcValue::try_from)
            .collect::<Result<Vec<_>>>()?;
        Ok(QuerySpec::new(self.query.clone()).with_values(values))
    }
}

fn apply_options(fields: &mut ConnectionFields, opts: &Map<String, JsonValue>) -> Result<()> {
    for (key, value) in opts {
        if let Some(text) = scalar_text(key, value)? {
            fields.set_option(key.clone(), text);
        }
    }
    Ok(())
}

/// Render a mapping value as connection string text. `null` means unset.
fn scalar_text(key: &str, value: &JsonValue) -> Result<Option<String>> {
    match value {
        JsonValue::Null => Ok(None),
        JsonValue::String(s) => Ok(Some(s.clone())),
        JsonValue::Number(n) => Ok(Some(n.to_string())),
        JsonValue::Bool(b) => Ok(Some(if *b { "yes" } else { "no" }.to_string())),
        _ => Err(Error::InvalidParameter(format!(
            "'{}' must be a string, number or boolean",
            key
        ))),
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct AnsibleFacts {
    pub query_rows: Vec<NormalizedRow>,
}

/// Result reported back to the automation host.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ModuleResult {
    pub changed: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub failed: bool,
    pub output: Vec<NormalizedRow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rowcount: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub msg: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ansible_facts: Option<AnsibleFacts>,
}

impl ModuleResult {
    pub fn from_outcome(outcome: NormalizedOutcome) -> Self {
        match outcome {
            NormalizedOutcome::Rows(rows) => Self {
                output: rows.clone(),
                ansible_facts: Some(AnsibleFacts { query_rows: rows }),
                ..Default::default()
            },
            NormalizedOutcome::Affected(n) => Self {
                changed: n > 0,
                rowcount: Some(n),
                ansible_facts: Some(AnsibleFacts::default()),
                ..Default::default()
            },
        }
    }

    pub fn from_error(error: &Error) -> Self {
        Self {
            failed: true,
            msg: Some(error.to_string()),
            error_kind: Some(error.kind().to_string()),
            ..Default::default()
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| {
            format!(
                r#"{{"changed":false,"failed":true,"msg":"cannot serialize result: {}"}}"#,
                e.to_string().replace('"', "'")
            )
        })
    }
}

/// Run one module invocation.
///
/// In check mode nothing is resolved or executed.
pub async fn run_module(args: &ModuleArgs, pipeline: &Pipeline) -> ModuleResult {
    if args.check_mode {
        log::debug!("check mode, query not executed");
        return ModuleResult::default();
    }

    match execute(args, pipeline).await {
        Ok(outcome) => ModuleResult::from_outcome(outcome),
        Err(e) => {
            log::error!("{}", e);
            ModuleResult::from_error(&e)
        }
    }
}

async fn execute(args: &ModuleArgs, pipeline: &Pipeline) -> Result<NormalizedOutcome> {
    let explicit = args.explicit_fields()?;
    let config = args.config_fields()?;
    let query = args.query_spec()?;
    pipeline.run(&explicit, &config, query).await
}

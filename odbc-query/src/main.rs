use clap::{Parser, ValueEnum};
use odbc_query::odbc::{
    DuplicateColumns, Error, ExecuteOptions, Pipeline, QueryExecutor, StaticCatalog,
    SystemCatalog,
};
use odbc_query::{ModuleArgs, ModuleResult, run_module};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::filter::LevelFilter;

/// Execute one SQL statement through ODBC and print the result as JSON.
#[derive(Debug, Parser)]
#[command(name = "sql_query", version)]
struct Cli {
    /// JSON arguments file; stdin when absent or `-`
    args_file: Option<PathBuf>,

    /// Log level for diagnostics written to stderr
    #[arg(long, default_value = "warn")]
    log_level: LevelFilter,

    /// Login timeout in seconds, 0 for the driver default
    #[arg(long, default_value_t = 30)]
    login_timeout: u64,

    /// Statement timeout in seconds, 0 to wait indefinitely
    #[arg(long, default_value_t = 0)]
    query_timeout: u64,

    /// How repeated column names are reported
    #[arg(long, value_enum, default_value_t = DuplicatePolicy::LastWins)]
    duplicate_columns: DuplicatePolicy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum DuplicatePolicy {
    LastWins,
    Reject,
    Suffix,
}

impl From<DuplicatePolicy> for DuplicateColumns {
    fn from(policy: DuplicatePolicy) -> Self {
        match policy {
            DuplicatePolicy::LastWins => DuplicateColumns::LastWins,
            DuplicatePolicy::Reject => DuplicateColumns::Reject,
            DuplicatePolicy::Suffix => DuplicateColumns::Suffix,
        }
    }
}

fn seconds(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}

fn read_args(path: Option<&Path>) -> Result<String, Error> {
    let mut text = String::new();
    let read = match path {
        Some(path) if path != Path::new("-") => std::fs::File::open(path)
            .and_then(|mut file| file.read_to_string(&mut text)),
        _ => std::io::stdin().read_to_string(&mut text),
    };
    read.map_err(|e| Error::InvalidParameter(format!("cannot read module arguments: {}", e)))?;
    Ok(text)
}

async fn run(cli: &Cli) -> ModuleResult {
    let args = match read_args(cli.args_file.as_deref())
        .and_then(|text| ModuleArgs::from_json(&text))
    {
        Ok(args) => args,
        Err(e) => return ModuleResult::from_error(&e),
    };
    if args.check_mode {
        let pipeline = Pipeline::new(Arc::new(StaticCatalog::new()), QueryExecutor::default());
        return run_module(&args, &pipeline).await;
    }

    let catalog = match SystemCatalog::load() {
        Ok(catalog) => catalog,
        Err(e) => return ModuleResult::from_error(&e),
    };

    let options = ExecuteOptions::new()
        .login_timeout(seconds(cli.login_timeout))
        .query_timeout(seconds(cli.query_timeout))
        .duplicate_columns(cli.duplicate_columns.into());
    let pipeline = Pipeline::new(
        Arc::new(catalog),
        QueryExecutor::default().with_options(options),
    );

    run_module(&args, &pipeline).await
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_max_level(cli.log_level)
        .init();

    let result = run(&cli).await;
    println!("{}", result.to_json());

    if result.failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

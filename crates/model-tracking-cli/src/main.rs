// crates/model-tracking-cli/src/main.rs
// ============================================================================
// Module: Model Tracking CLI Entry Point
// Description: Command dispatcher for model tracking lineage and results.
// Purpose: Drive the tracker over a SQLite store from the command line.
// Dependencies: clap, model-tracking-config, model-tracking-core,
//               model-tracking-store-sqlite, serde_json, thiserror
// ============================================================================

//! ## Overview
//! Each invocation loads the configuration, opens the `SQLite` store, runs a
//! single tracker operation, and prints the resulting record as JSON on
//! stdout. Failures print the error and its status class on stderr and exit
//! non-zero. Schema documents and result payloads are read from files with
//! hard size limits. Security posture: inputs are untrusted.

// ============================================================================
// SECTION: Modules
// ============================================================================

#[cfg(test)]
mod main_tests;

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::File;
use std::io::Read;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Args;
use clap::Parser;
use clap::Subcommand;
use model_tracking_config::CONFIG_ENV_VAR;
use model_tracking_config::DEFAULT_CONFIG_NAME;
use model_tracking_config::ModelTrackingConfig;
use model_tracking_core::JsonPayload;
use model_tracking_core::ModelScope;
use model_tracking_core::ModelTracker;
use model_tracking_core::ModelUpdate;
use model_tracking_core::NewModel;
use model_tracking_core::NewOrganization;
use model_tracking_core::NewSchema;
use model_tracking_core::NewVersion;
use model_tracking_core::OrganizationScope;
use model_tracking_core::RequestContext;
use model_tracking_core::ResultId;
use model_tracking_core::ResultSubmission;
use model_tracking_core::SchemaId;
use model_tracking_core::Timestamp;
use model_tracking_core::TrackingError;
use model_tracking_core::VersionScope;
use model_tracking_store_sqlite::SqliteModelTrackingStore;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "model-tracking", disable_help_subcommand = true, disable_version_flag = true)]
struct Cli {
    /// Path to the configuration file.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Subcommand to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Top-level commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Organization commands.
    Organization {
        /// Organization subcommand.
        #[command(subcommand)]
        command: OrganizationCommand,
    },
    /// Model commands.
    Model {
        /// Model subcommand.
        #[command(subcommand)]
        command: ModelCommand,
    },
    /// Schema commands.
    Schema {
        /// Schema subcommand.
        #[command(subcommand)]
        command: SchemaCommand,
    },
    /// Version commands.
    Version {
        /// Version subcommand.
        #[command(subcommand)]
        command: VersionCommand,
    },
    /// Result commands.
    Result {
        /// Result subcommand.
        #[command(subcommand)]
        command: ResultCommand,
    },
    /// Configuration commands.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

/// Organization subcommands.
#[derive(Subcommand, Debug)]
enum OrganizationCommand {
    /// Create an organization.
    Create {
        /// Organization name.
        name: String,
    },
    /// Show an organization.
    Get {
        /// Organization name.
        name: String,
    },
    /// List organizations.
    List,
}

/// Organization selector shared by scoped commands.
#[derive(Args, Debug, Clone)]
struct OrgArgs {
    /// Organization name.
    #[arg(long = "org", value_name = "NAME")]
    organization: String,
}

/// Model selector shared by scoped commands.
#[derive(Args, Debug, Clone)]
struct ModelArgs {
    /// Organization name.
    #[arg(long = "org", value_name = "NAME")]
    organization: String,
    /// Model name.
    #[arg(long, value_name = "NAME")]
    model: String,
}

/// Version selector shared by result commands.
#[derive(Args, Debug, Clone)]
struct VersionArgs {
    /// Organization name.
    #[arg(long = "org", value_name = "NAME")]
    organization: String,
    /// Model name.
    #[arg(long, value_name = "NAME")]
    model: String,
    /// Version name.
    #[arg(long, value_name = "NAME")]
    version: String,
}

/// Model subcommands.
#[derive(Subcommand, Debug)]
enum ModelCommand {
    /// Create a model.
    Create {
        /// Owning organization.
        #[command(flatten)]
        scope: OrgArgs,
        /// Model name.
        name: String,
        /// Default schema name for auto-created versions.
        #[arg(long, value_name = "SCHEMA")]
        default_schema: Option<String>,
    },
    /// Show a model.
    Get {
        /// Owning organization.
        #[command(flatten)]
        scope: OrgArgs,
        /// Model name.
        name: String,
    },
    /// List models of an organization.
    List {
        /// Owning organization.
        #[command(flatten)]
        scope: OrgArgs,
    },
    /// Set or clear the default schema of a model.
    Update {
        /// Owning organization.
        #[command(flatten)]
        scope: OrgArgs,
        /// Model name.
        name: String,
        /// New default schema name; omit to clear.
        #[arg(long, value_name = "SCHEMA")]
        default_schema: Option<String>,
    },
}

/// Schema subcommands.
#[derive(Subcommand, Debug)]
enum SchemaCommand {
    /// Create a schema from input and output documents.
    Create {
        /// Owning organization.
        #[command(flatten)]
        scope: OrgArgs,
        /// Schema name.
        name: String,
        /// Input JSON Schema document.
        #[arg(long, value_name = "FILE")]
        input: PathBuf,
        /// Output JSON Schema document.
        #[arg(long, value_name = "FILE")]
        output: PathBuf,
    },
    /// Show a schema.
    Get {
        /// Owning organization.
        #[command(flatten)]
        scope: OrgArgs,
        /// Schema name.
        name: String,
    },
    /// List schemas of an organization.
    List {
        /// Owning organization.
        #[command(flatten)]
        scope: OrgArgs,
    },
}

/// Version subcommands.
#[derive(Subcommand, Debug)]
enum VersionCommand {
    /// Create a version bound to a schema.
    Create {
        /// Owning model.
        #[command(flatten)]
        scope: ModelArgs,
        /// Version name.
        name: String,
        /// Schema name.
        #[arg(long, value_name = "SCHEMA")]
        schema: String,
    },
    /// Show a version.
    Get {
        /// Owning model.
        #[command(flatten)]
        scope: ModelArgs,
        /// Version name.
        name: String,
    },
    /// Show a version, creating it with the model default schema if absent.
    GetOrCreate {
        /// Owning model.
        #[command(flatten)]
        scope: ModelArgs,
        /// Version name.
        name: String,
    },
    /// List versions of a model.
    List {
        /// Owning model.
        #[command(flatten)]
        scope: ModelArgs,
    },
}

/// Result subcommands.
#[derive(Subcommand, Debug)]
enum ResultCommand {
    /// Validate and store a result.
    Submit {
        /// Owning version.
        #[command(flatten)]
        scope: VersionArgs,
        /// Input payload file.
        #[arg(long, value_name = "FILE")]
        input: PathBuf,
        /// Output payload file.
        #[arg(long, value_name = "FILE")]
        output: PathBuf,
        /// Ground-truth output payload file.
        #[arg(long, value_name = "FILE")]
        true_output: PathBuf,
        /// Observation time (RFC 3339); defaults to now.
        #[arg(long, value_name = "RFC3339")]
        time: Option<String>,
    },
    /// Show a result.
    Get {
        /// Owning version.
        #[command(flatten)]
        scope: VersionArgs,
        /// Result id.
        id: u64,
    },
    /// List results of a version.
    List {
        /// Owning version.
        #[command(flatten)]
        scope: VersionArgs,
    },
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Validate the configuration file.
    Validate,
}

impl From<&OrgArgs> for OrganizationScope {
    fn from(args: &OrgArgs) -> Self {
        Self::new(args.organization.as_str())
    }
}

impl From<&VersionArgs> for VersionScope {
    fn from(args: &VersionArgs) -> Self {
        Self::new(args.organization.as_str(), args.model.as_str(), args.version.as_str())
    }
}

impl ModelArgs {
    /// Returns the model scope.
    fn scope(&self) -> ModelScope {
        OrganizationScope::new(self.organization.as_str()).model(self.model.as_str())
    }
}

/// Summary printed by `config validate`.
#[derive(Debug, Serialize)]
struct ConfigSummary {
    /// Always true when printed.
    valid: bool,
    /// Database path.
    store_path: PathBuf,
    /// Result payload limit.
    max_payload_bytes: usize,
    /// Schema document limit.
    max_schema_bytes: usize,
    /// Request timeout, if any.
    timeout_ms: Option<u64>,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper for user-facing messages.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`].
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

impl From<TrackingError> for CliError {
    fn from(error: TrackingError) -> Self {
        Self::new(format!("{error} ({} {})", error.http_status(), error.kind().as_str()))
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

/// Errors returned by bounded file reads.
#[derive(Debug)]
enum ReadLimitError {
    /// File I/O failure.
    Io(std::io::Error),
    /// File size exceeds the configured limit.
    TooLarge {
        /// Actual size in bytes.
        size: u64,
        /// Allowed limit in bytes.
        limit: usize,
    },
}

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
fn main() -> ExitCode {
    match run(Cli::parse()) {
        Ok(value) => match write_json(&value) {
            Ok(()) => ExitCode::SUCCESS,
            Err(err) => emit_error(&err.to_string()),
        },
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Loads configuration and dispatches the command.
fn run(cli: Cli) -> CliResult<Value> {
    let config = load_config(cli.config.as_deref())?;
    if let Commands::Config {
        command: ConfigCommand::Validate,
    } = cli.command
    {
        return config_summary(&config);
    }
    let tracker = open_tracker(&config)?;
    let ctx = config.requests.request_context();
    dispatch(&tracker, &ctx, &config, cli.command)
}

/// Loads the configuration, falling back to defaults when no file exists.
fn load_config(path: Option<&Path>) -> CliResult<ModelTrackingConfig> {
    let implicit = path.is_none() && std::env::var_os(CONFIG_ENV_VAR).is_none();
    if implicit && !Path::new(DEFAULT_CONFIG_NAME).exists() {
        return Ok(ModelTrackingConfig::default());
    }
    ModelTrackingConfig::load(path).map_err(|err| CliError::new(err.to_string()))
}

/// Renders the `config validate` summary.
fn config_summary(config: &ModelTrackingConfig) -> CliResult<Value> {
    to_json(&ConfigSummary {
        valid: true,
        store_path: config.store.path.clone(),
        max_payload_bytes: config.store.max_payload_bytes,
        max_schema_bytes: config.store.max_schema_bytes,
        timeout_ms: config.requests.timeout_ms,
    })
}

/// Opens the store and wraps it in a tracker with the configured sink.
fn open_tracker(
    config: &ModelTrackingConfig,
) -> CliResult<ModelTracker<SqliteModelTrackingStore>> {
    let store = SqliteModelTrackingStore::new(config.store.sqlite_config())
        .map_err(|err| CliError::new(err.to_string()))?;
    let sink = config.logging.build_sink().map_err(|err| CliError::new(err.to_string()))?;
    Ok(ModelTracker::new(store)
        .with_log_sink(sink)
        .with_max_payload_bytes(config.store.max_payload_bytes))
}

// ============================================================================
// SECTION: Dispatch
// ============================================================================

/// Runs one tracker command and returns its JSON rendering.
fn dispatch(
    tracker: &ModelTracker<SqliteModelTrackingStore>,
    ctx: &RequestContext,
    config: &ModelTrackingConfig,
    command: Commands,
) -> CliResult<Value> {
    match command {
        Commands::Organization {
            command,
        } => command_organization(tracker, ctx, command),
        Commands::Model {
            command,
        } => command_model(tracker, ctx, command),
        Commands::Schema {
            command,
        } => command_schema(tracker, ctx, config.store.max_schema_bytes, command),
        Commands::Version {
            command,
        } => command_version(tracker, ctx, command),
        Commands::Result {
            command,
        } => command_result(tracker, ctx, config.store.max_payload_bytes, command),
        Commands::Config {
            command: ConfigCommand::Validate,
        } => config_summary(config),
    }
}

/// Executes `organization` subcommands.
fn command_organization(
    tracker: &ModelTracker<SqliteModelTrackingStore>,
    ctx: &RequestContext,
    command: OrganizationCommand,
) -> CliResult<Value> {
    match command {
        OrganizationCommand::Create {
            name,
        } => to_json(&tracker.create_organization(ctx, NewOrganization {
            name: name.into(),
        })?),
        OrganizationCommand::Get {
            name,
        } => to_json(&tracker.get_organization(ctx, &name.into())?),
        OrganizationCommand::List => to_json(&tracker.list_organizations(ctx)?),
    }
}

/// Executes `model` subcommands.
fn command_model(
    tracker: &ModelTracker<SqliteModelTrackingStore>,
    ctx: &RequestContext,
    command: ModelCommand,
) -> CliResult<Value> {
    match command {
        ModelCommand::Create {
            scope,
            name,
            default_schema,
        } => {
            let org = OrganizationScope::from(&scope);
            let default_schema_id = resolve_schema(tracker, ctx, &org, default_schema)?;
            to_json(&tracker.create_model(ctx, &org, NewModel {
                name: name.into(),
                default_schema_id,
            })?)
        }
        ModelCommand::Get {
            scope,
            name,
        } => to_json(&tracker.get_model(ctx, &OrganizationScope::from(&scope), &name.into())?),
        ModelCommand::List {
            scope,
        } => to_json(&tracker.list_models(ctx, &OrganizationScope::from(&scope))?),
        ModelCommand::Update {
            scope,
            name,
            default_schema,
        } => {
            let org = OrganizationScope::from(&scope);
            let default_schema_id = resolve_schema(tracker, ctx, &org, default_schema)?;
            to_json(&tracker.update_model(ctx, &org, ModelUpdate {
                name: name.into(),
                default_schema_id,
            })?)
        }
    }
}

/// Executes `schema` subcommands.
fn command_schema(
    tracker: &ModelTracker<SqliteModelTrackingStore>,
    ctx: &RequestContext,
    max_schema_bytes: usize,
    command: SchemaCommand,
) -> CliResult<Value> {
    match command {
        SchemaCommand::Create {
            scope,
            name,
            input,
            output,
        } => {
            let input = read_text(&input, max_schema_bytes)?;
            let output = read_text(&output, max_schema_bytes)?;
            to_json(&tracker.create_schema(ctx, &OrganizationScope::from(&scope), NewSchema {
                name: name.into(),
                input,
                output,
            })?)
        }
        SchemaCommand::Get {
            scope,
            name,
        } => to_json(&tracker.get_schema(ctx, &OrganizationScope::from(&scope), &name.into())?),
        SchemaCommand::List {
            scope,
        } => to_json(&tracker.list_schemas(ctx, &OrganizationScope::from(&scope))?),
    }
}

/// Executes `version` subcommands.
fn command_version(
    tracker: &ModelTracker<SqliteModelTrackingStore>,
    ctx: &RequestContext,
    command: VersionCommand,
) -> CliResult<Value> {
    match command {
        VersionCommand::Create {
            scope,
            name,
            schema,
        } => {
            let model = scope.scope();
            let schema = tracker.get_schema(ctx, &model.organization_scope(), &schema.into())?;
            to_json(&tracker.create_version(ctx, &model, NewVersion {
                name: name.into(),
                schema_id: schema.id,
            })?)
        }
        VersionCommand::Get {
            scope,
            name,
        } => to_json(&tracker.get_version(ctx, &scope.scope(), &name.into())?),
        VersionCommand::GetOrCreate {
            scope,
            name,
        } => to_json(&tracker.get_or_create_version(ctx, &scope.scope(), &name.into())?),
        VersionCommand::List {
            scope,
        } => to_json(&tracker.list_versions(ctx, &scope.scope())?),
    }
}

/// Executes `result` subcommands.
fn command_result(
    tracker: &ModelTracker<SqliteModelTrackingStore>,
    ctx: &RequestContext,
    max_payload_bytes: usize,
    command: ResultCommand,
) -> CliResult<Value> {
    match command {
        ResultCommand::Submit {
            scope,
            input,
            output,
            true_output,
            time,
        } => {
            let time = time
                .map(|value| Timestamp::parse_rfc3339(&value))
                .transpose()
                .map_err(|err| CliError::from(TrackingError::InvalidInput(err.to_string())))?;
            let submission = ResultSubmission {
                input: read_payload(&input, max_payload_bytes)?,
                output: read_payload(&output, max_payload_bytes)?,
                true_output: read_payload(&true_output, max_payload_bytes)?,
                time,
            };
            to_json(&tracker.submit_result(ctx, &VersionScope::from(&scope), submission)?)
        }
        ResultCommand::Get {
            scope,
            id,
        } => {
            let id = ResultId::from_raw(id).ok_or_else(|| {
                CliError::from(TrackingError::InvalidInput(
                    "result id must be greater than zero".to_string(),
                ))
            })?;
            to_json(&tracker.get_result(ctx, &VersionScope::from(&scope), id)?)
        }
        ResultCommand::List {
            scope,
        } => to_json(&tracker.list_results(ctx, &VersionScope::from(&scope))?),
    }
}

/// Resolves an optional schema name to its id.
fn resolve_schema(
    tracker: &ModelTracker<SqliteModelTrackingStore>,
    ctx: &RequestContext,
    org: &OrganizationScope,
    name: Option<String>,
) -> CliResult<Option<SchemaId>> {
    let Some(name) = name else {
        return Ok(None);
    };
    Ok(Some(tracker.get_schema(ctx, org, &name.into())?.id))
}

// ============================================================================
// SECTION: Input Helpers
// ============================================================================

/// Reads a file from disk while enforcing a hard size limit.
fn read_bytes_with_limit(path: &Path, max_bytes: usize) -> Result<Vec<u8>, ReadLimitError> {
    let file = File::open(path).map_err(ReadLimitError::Io)?;
    let metadata = file.metadata().map_err(ReadLimitError::Io)?;
    let size = metadata.len();
    let limit = u64::try_from(max_bytes).map_err(|_| ReadLimitError::TooLarge {
        size,
        limit: max_bytes,
    })?;
    if size > limit {
        return Err(ReadLimitError::TooLarge {
            size,
            limit: max_bytes,
        });
    }

    let mut limited = file.take(limit.saturating_add(1));
    let mut bytes = Vec::new();
    limited.read_to_end(&mut bytes).map_err(ReadLimitError::Io)?;
    if bytes.len() > max_bytes {
        let actual = u64::try_from(bytes.len()).unwrap_or(u64::MAX);
        return Err(ReadLimitError::TooLarge {
            size: actual,
            limit: max_bytes,
        });
    }
    Ok(bytes)
}

/// Formats a bounded read failure for `path`.
fn read_error(path: &Path, error: ReadLimitError) -> CliError {
    match error {
        ReadLimitError::Io(err) => {
            CliError::new(format!("failed to read {}: {err}", path.display()))
        }
        ReadLimitError::TooLarge {
            size,
            limit,
        } => CliError::from(TrackingError::InvalidInput(format!(
            "{} exceeds size limit: {size} bytes (max {limit})",
            path.display()
        ))),
    }
}

/// Reads a JSON payload file.
fn read_payload(path: &Path, max_bytes: usize) -> CliResult<JsonPayload> {
    read_bytes_with_limit(path, max_bytes)
        .map(JsonPayload::from)
        .map_err(|err| read_error(path, err))
}

/// Reads a UTF-8 document file.
fn read_text(path: &Path, max_bytes: usize) -> CliResult<String> {
    let bytes = read_bytes_with_limit(path, max_bytes).map_err(|err| read_error(path, err))?;
    String::from_utf8(bytes).map_err(|_| {
        CliError::from(TrackingError::InvalidInput(format!(
            "{} must be utf-8",
            path.display()
        )))
    })
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Renders a serializable value as JSON.
fn to_json<T: Serialize>(value: &T) -> CliResult<Value> {
    serde_json::to_value(value)
        .map_err(|err| CliError::new(format!("failed to render output: {err}")))
}

/// Writes a JSON value to stdout followed by a newline.
fn write_json(value: &Value) -> CliResult<()> {
    let mut bytes = serde_json::to_vec_pretty(value)
        .map_err(|err| CliError::new(format!("failed to render output: {err}")))?;
    bytes.push(b'\n');
    let mut stdout = std::io::stdout();
    stdout
        .write_all(&bytes)
        .map_err(|err| CliError::new(format!("failed to write stdout: {err}")))
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}

// crates/judgment-gate-cli/src/main.rs
// ============================================================================
// Module: Judgment Gate CLI Entry Point
// Description: Command dispatcher for manual judgment workflows.
// Purpose: Evaluate authorization, render gates, and record judgments.
// Dependencies: clap, judgment-gate-core, judgment-gate-config, serde_json, tokio.
// ============================================================================

//! ## Overview
//! The `judgment-gate` CLI drives a judgment gate against the pipeline API:
//! `view` attaches a gate and prints its presentation snapshot, `judge`
//! applies operator input and invokes a decision. `authorize` evaluates
//! stage authorization offline. Results are JSON on stdout; errors go to
//! stderr with a non-zero exit code.

// ============================================================================
// SECTION: Modules
// ============================================================================


// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::fs::File;
use std::io::Read;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Args;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use judgment_gate_cli::ApiJudgmentTransport;
use judgment_gate_cli::GateApiClient;
use judgment_gate_config::JudgmentGateConfig;
use judgment_gate_core::AuthorizationEvaluator;
use judgment_gate_core::ExecutionId;
use judgment_gate_core::GateCollaborators;
use judgment_gate_core::JudgmentDecision;
use judgment_gate_core::JudgmentGate;
use judgment_gate_core::OperatorRoles;
use judgment_gate_core::RoleGrantSet;
use judgment_gate_core::StageId;
use judgment_gate_core::StaticIdentity;
use judgment_gate_core::SubmissionOutcome;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum size of a role grants JSON input.
const MAX_GRANTS_BYTES: usize = 1024 * 1024;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "judgment-gate", version, disable_help_subcommand = true)]
struct Cli {
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Evaluate stage authorization offline.
    Authorize(AuthorizeCommand),
    /// Attach a gate to a stage and print its view.
    View(GateArgs),
    /// Invoke a decision on a stage.
    Judge(JudgeCommand),
    /// Configuration utilities.
    Config {
        /// Selected config subcommand.
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

/// Arguments for `authorize`.
#[derive(Args, Debug)]
struct AuthorizeCommand {
    /// JSON file holding the application role grants.
    #[arg(long, value_name = "PATH")]
    grants: PathBuf,
    /// Role permitted to judge the stage (repeatable; none means unrestricted).
    #[arg(long = "stage-role", value_name = "ROLE")]
    stage_roles: Vec<String>,
    /// Role held by the operator (repeatable).
    #[arg(long = "operator-role", value_name = "ROLE")]
    operator_roles: Vec<String>,
}

/// Arguments identifying a gate.
#[derive(Args, Debug, Clone)]
struct GateArgs {
    /// Pipeline execution identifier.
    #[arg(long, value_name = "ID")]
    execution: String,
    /// Stage identifier within the execution.
    #[arg(long, value_name = "ID")]
    stage: String,
    /// Optional config file path (defaults to judgment-gate.toml or env override).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

/// Arguments for `judge`.
#[derive(Args, Debug)]
struct JudgeCommand {
    /// Gate selection.
    #[command(flatten)]
    gate: GateArgs,
    /// Decision to record.
    #[arg(long, value_enum)]
    decision: DecisionArg,
    /// Option value to select before deciding.
    #[arg(long = "option", value_name = "VALUE")]
    option: Option<String>,
    /// Freeform text to enter before deciding.
    #[arg(long = "text", value_name = "TEXT")]
    text: Option<String>,
}

/// Decision argument values.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum DecisionArg {
    /// Let the pipeline continue.
    Continue,
    /// Stop the pipeline.
    Stop,
}

impl From<DecisionArg> for JudgmentDecision {
    fn from(value: DecisionArg) -> Self {
        match value {
            DecisionArg::Continue => Self::Continue,
            DecisionArg::Stop => Self::Stop,
        }
    }
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Validate a configuration file.
    Validate(ConfigValidateCommand),
}

/// Arguments for `config validate`.
#[derive(Args, Debug)]
struct ConfigValidateCommand {
    /// Optional config file path (defaults to judgment-gate.toml or env override).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
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

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
#[tokio::main(flavor = "multi_thread")]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
async fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Authorize(command) => command_authorize(&command),
        Commands::View(command) => command_view(&command).await,
        Commands::Judge(command) => command_judge(&command).await,
        Commands::Config {
            command,
        } => command_config(&command),
    }
}

// ============================================================================
// SECTION: Authorize Command
// ============================================================================

/// Executes the offline `authorize` command.
fn command_authorize(command: &AuthorizeCommand) -> CliResult<ExitCode> {
    let grants = read_grants(&command.grants)?;
    let stage_roles: BTreeSet<String> = command.stage_roles.iter().cloned().collect();
    let operator_roles = OperatorRoles::new(command.operator_roles.iter().cloned());
    let decision = AuthorizationEvaluator::evaluate(&stage_roles, &grants, &operator_roles);
    write_json(&decision)?;
    Ok(ExitCode::SUCCESS)
}

/// Reads and decodes a role grants file.
fn read_grants(path: &Path) -> CliResult<RoleGrantSet> {
    let bytes = read_bytes_with_limit(path, MAX_GRANTS_BYTES).map_err(|err| match err {
        ReadLimitError::Io(err) => {
            CliError::new(format!("failed to read grants {}: {err}", path.display()))
        }
        ReadLimitError::TooLarge {
            size,
            limit,
        } => CliError::new(format!(
            "grants file {} is {size} bytes (limit {limit})",
            path.display()
        )),
    })?;
    serde_json::from_slice(&bytes)
        .map_err(|err| CliError::new(format!("invalid grants {}: {err}", path.display())))
}

// ============================================================================
// SECTION: Gate Commands
// ============================================================================

/// Executes the `view` command.
async fn command_view(args: &GateArgs) -> CliResult<ExitCode> {
    let gate = open_gate(args).await?;
    write_json(&gate.view())?;
    gate.detach();
    Ok(ExitCode::SUCCESS)
}

/// Executes the `judge` command.
async fn command_judge(command: &JudgeCommand) -> CliResult<ExitCode> {
    let gate = open_gate(&command.gate).await?;
    if let Some(option) = &command.option {
        gate.select_option(option.as_str())
            .map_err(|err| CliError::new(format!("cannot select option: {err}")))?;
    }
    if let Some(text) = &command.text {
        gate.set_freeform_text(text.as_str())
            .map_err(|err| CliError::new(format!("cannot set freeform text: {err}")))?;
    }
    let outcome = gate
        .decide(command.decision.into())
        .await
        .map_err(|err| CliError::new(format!("judgment refused: {err}")))?;
    write_json(&outcome)?;
    let code = match outcome {
        SubmissionOutcome::Accepted => ExitCode::SUCCESS,
        SubmissionOutcome::Failed {
            ..
        } => {
            if let Some(message) = gate.view().error_message {
                let _ = write_stderr_line(&message);
            }
            ExitCode::FAILURE
        }
        SubmissionOutcome::Discarded => ExitCode::FAILURE,
    };
    gate.detach();
    Ok(code)
}

/// Loads the execution, operator, and grants, then attaches a gate.
async fn open_gate(args: &GateArgs) -> CliResult<JudgmentGate> {
    let config = JudgmentGateConfig::load(args.config.as_deref())
        .map_err(|err| CliError::new(format!("failed to load config: {err}")))?;
    let client = Arc::new(
        GateApiClient::from_config(&config.api)
            .map_err(|err| CliError::new(format!("failed to build api client: {err}")))?,
    );
    let execution_id = ExecutionId::new(args.execution.as_str());
    let stage_id = StageId::new(args.stage.as_str());
    let operator = client
        .authenticated_operator()
        .await
        .map_err(|err| CliError::new(format!("failed to load operator: {err}")))?;
    let execution = client
        .execution(&execution_id)
        .await
        .map_err(|err| CliError::new(format!("failed to load execution: {err}")))?;
    let stage = execution
        .stage(&stage_id)
        .cloned()
        .ok_or_else(|| CliError::new(format!("stage {stage_id} not found in {execution_id}")))?;
    let audit = config
        .audit
        .build_sink()
        .map_err(|err| CliError::new(format!("failed to open audit sink: {err}")))?;
    let collaborators = GateCollaborators {
        directory: client.clone(),
        identity: Arc::new(StaticIdentity::new(OperatorRoles::new(operator.roles))),
        transport: Arc::new(ApiJudgmentTransport::new(client, Some(operator.username))),
        audit,
    };
    let gate = JudgmentGate::new(
        execution.application,
        execution_id,
        stage,
        config.labels.to_gate_labels(),
        collaborators,
    );
    gate.attach().await;
    Ok(gate)
}

// ============================================================================
// SECTION: Config Command
// ============================================================================

/// Dispatches config subcommands.
fn command_config(command: &ConfigCommand) -> CliResult<ExitCode> {
    match command {
        ConfigCommand::Validate(command) => command_config_validate(command),
    }
}

/// Executes the config validation command.
fn command_config_validate(command: &ConfigValidateCommand) -> CliResult<ExitCode> {
    let _config = JudgmentGateConfig::load(command.config.as_deref())
        .map_err(|err| CliError::new(format!("failed to load config: {err}")))?;
    write_stdout_line("config ok").map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Input Helpers
// ============================================================================

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

/// Reads a file from disk while enforcing a hard size limit.
fn read_bytes_with_limit(path: &Path, max_bytes: usize) -> Result<Vec<u8>, ReadLimitError> {
    let file = File::open(path).map_err(ReadLimitError::Io)?;
    let size = file.metadata().map_err(ReadLimitError::Io)?.len();
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
    let mut bytes = Vec::new();
    file.take(limit.saturating_add(1)).read_to_end(&mut bytes).map_err(ReadLimitError::Io)?;
    if bytes.len() > max_bytes {
        return Err(ReadLimitError::TooLarge {
            size: u64::try_from(bytes.len()).unwrap_or(u64::MAX),
            limit: max_bytes,
        });
    }
    Ok(bytes)
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes a value as pretty JSON on stdout.
fn write_json<T: Serialize>(value: &T) -> CliResult<()> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|err| CliError::new(format!("failed to encode output: {err}")))?;
    write_stdout_line(&text).map_err(|err| CliError::new(output_error("stdout", &err)))
}

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats an output error message.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    format!("failed to write {stream}: {error}")
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}

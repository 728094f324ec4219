//! CogLoad CLI - Command-line interface for Synheart CogLoad
//!
//! Commands:
//! - replay: Run a session over recorded frames (batch mode)
//! - run: Process streaming frames from stdin (streaming mode)
//! - simulate: Generate a synthetic session and report its summary
//! - validate: Validate frame records
//! - config: Print an engine configuration
//! - doctor: Diagnose configuration and environment

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, BufRead, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use synheart_cogload::breathing::SimulatedBreathing;
use synheart_cogload::collaborators::{
    CannedRescuePlan, LoggingAutomation, NoRescuePlan, NoScreenContext, StaticScreenContext,
};
use synheart_cogload::schema::{FrameRecord, FrameRecordAdapter, ValidationError, SCHEMA_VERSION};
use synheart_cogload::{
    Collaborators, EngineConfig, EngineError, FrameSample, MonitorSession, SessionSummary,
    TickOutcome, COGLOAD_VERSION, PRODUCER_NAME,
};

/// CogLoad - Real-time cognitive-load fusion and regulation engine
#[derive(Parser)]
#[command(name = "cogload")]
#[command(author = "Synheart AI Inc")]
#[command(version = COGLOAD_VERSION)]
#[command(about = "Fuse blink, posture and breathing signals into a cognitive-load score", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a session over recorded frames (batch mode)
    Replay {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file path (use - for stdout)
        #[arg(short, long)]
        output: PathBuf,

        /// Input format
        #[arg(long, default_value = "ndjson")]
        input_format: InputFormat,

        /// Output format
        #[arg(long, default_value = "ndjson")]
        output_format: OutputFormat,

        #[command(flatten)]
        engine: EngineArgs,

        /// Seconds to wait for in-flight interventions before stopping
        #[arg(long, default_value = "0")]
        wait_interventions: f64,

        /// Write the session summary to file
        #[arg(long)]
        summary: Option<PathBuf>,
    },

    /// Process streaming frames from stdin (streaming mode)
    Run {
        #[command(flatten)]
        engine: EngineArgs,

        /// Flush output after each record
        #[arg(long, default_value = "true")]
        flush: bool,

        /// Write the session summary to file on exit
        #[arg(long)]
        summary: Option<PathBuf>,
    },

    /// Generate a synthetic session and print its summary
    Simulate {
        /// Simulated duration in seconds
        #[arg(long, default_value = "120")]
        duration: f64,

        /// Frame rate in Hz
        #[arg(long, default_value = "12.5")]
        hz: f64,

        /// Blink rate at the start of the simulation (per minute)
        #[arg(long, default_value = "12")]
        blink_start: f64,

        /// Blink rate at the end of the simulation (per minute)
        #[arg(long, default_value = "36")]
        blink_end: f64,

        /// Start leaning forward after this many seconds
        #[arg(long)]
        lean_after: Option<f64>,

        #[command(flatten)]
        engine: EngineArgs,

        /// Also write the generated frames as frame.sample.v1 NDJSON
        #[arg(long)]
        frames_out: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Validate frame records
    Validate {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Input format
        #[arg(long, default_value = "ndjson")]
        input_format: InputFormat,

        /// Output validation report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print a validated engine configuration as JSON
    Config {
        /// Configuration file to check and print
        #[arg(long)]
        config: Option<PathBuf>,

        /// Preset used when no file is given
        #[arg(long, default_value = "default")]
        preset: Preset,
    },

    /// Diagnose configuration and environment
    Doctor {
        /// Check configuration file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Options shared by every command that runs a session
#[derive(Args)]
struct EngineArgs {
    /// Engine configuration file (JSON, partial files allowed)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Preset used when no configuration file is given
    #[arg(long, default_value = "default")]
    preset: Preset,

    /// Fixed screen context handed to the rescue-plan generator
    #[arg(long)]
    context: Option<String>,

    /// Fixed rescue plan returned for every intervention
    #[arg(long)]
    plan: Option<String>,
}

impl EngineArgs {
    fn load_config(&self) -> Result<EngineConfig, CogloadCliError> {
        load_config(self.config.as_deref(), &self.preset)
    }

    fn collaborators(&self) -> Collaborators {
        let extractor: Arc<dyn synheart_cogload::ScreenContextExtractor> = match &self.context {
            Some(text) => Arc::new(StaticScreenContext(text.clone())),
            None => Arc::new(NoScreenContext),
        };
        let generator: Arc<dyn synheart_cogload::RescuePlanGenerator> = match &self.plan {
            Some(text) => Arc::new(CannedRescuePlan(text.clone())),
            None => Arc::new(NoRescuePlan),
        };
        Collaborators::new(extractor, generator, Arc::new(LoggingAutomation::default()))
    }
}

#[derive(Clone, ValueEnum)]
enum InputFormat {
    /// Newline-delimited JSON (one frame per line)
    Ndjson,
    /// JSON array of frames
    Json,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Newline-delimited JSON (one tick outcome per line)
    Ndjson,
    /// JSON array of tick outcomes
    Json,
    /// Pretty-printed JSON
    JsonPretty,
}

#[derive(Clone, ValueEnum)]
enum Preset {
    Default,
    Strict,
    Lenient,
}

fn main() -> ExitCode {
    init_logging();
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", serde_json::to_string(&CliError::from(e)).unwrap_or_else(|_| "Unknown error".to_string()));
            ExitCode::FAILURE
        }
    }
}

/// Logs go to stderr so stdout stays machine-readable
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).with_writer(io::stderr).init();
}

fn run(cli: Cli) -> Result<(), CogloadCliError> {
    match cli.command {
        Commands::Replay {
            input,
            output,
            input_format,
            output_format,
            engine,
            wait_interventions,
            summary,
        } => cmd_replay(
            &input,
            &output,
            input_format,
            output_format,
            &engine,
            wait_interventions,
            summary.as_deref(),
        ),

        Commands::Run {
            engine,
            flush,
            summary,
        } => cmd_run(&engine, flush, summary.as_deref()),

        Commands::Simulate {
            duration,
            hz,
            blink_start,
            blink_end,
            lean_after,
            engine,
            frames_out,
            json,
        } => cmd_simulate(
            SimulationPlan {
                duration,
                hz,
                blink_start,
                blink_end,
                lean_after,
            },
            &engine,
            frames_out.as_deref(),
            json,
        ),

        Commands::Validate {
            input,
            input_format,
            json,
        } => cmd_validate(&input, input_format, json),

        Commands::Config { config, preset } => cmd_config(config.as_deref(), &preset),

        Commands::Doctor { config, json } => cmd_doctor(config.as_deref(), json),
    }
}

fn cmd_replay(
    input: &Path,
    output: &Path,
    input_format: InputFormat,
    output_format: OutputFormat,
    engine: &EngineArgs,
    wait_interventions: f64,
    summary_path: Option<&Path>,
) -> Result<(), CogloadCliError> {
    let input_data = read_input(input)?;
    let records = parse_records(&input_data, &input_format)?;
    if records.is_empty() {
        return Err(CogloadCliError::NoFrames);
    }
    let samples = FrameRecordAdapter::to_samples(&records)?;

    let mut session = MonitorSession::start(engine.load_config()?, engine.collaborators())?;
    let mut outcomes: Vec<TickOutcome> = samples.iter().map(|s| session.tick(s)).collect();

    if wait_interventions > 0.0 {
        let deadline = Duration::from_secs_f64(wait_interventions);
        let entries = session.await_intervention(deadline);
        if !entries.is_empty() {
            info!(count = entries.len(), "recorded late intervention results");
            if let Some(last) = outcomes.last_mut() {
                last.events.extend(entries);
            }
        }
    }

    let summary = session.stop();
    write_summary(summary_path, &summary)?;

    let output_data = format_output(&outcomes, &output_format)?;
    if output.to_string_lossy() == "-" {
        print!("{}", output_data);
    } else {
        fs::write(output, output_data)?;
    }

    Ok(())
}

fn cmd_run(engine: &EngineArgs, flush: bool, summary_path: Option<&Path>) -> Result<(), CogloadCliError> {
    let mut session = MonitorSession::start(engine.load_config()?, engine.collaborators())?;

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for (line_num, line) in stdin.lock().lines().enumerate() {
        let line = line?;
        let record = match FrameRecordAdapter::parse_line(&line) {
            Ok(Some(record)) => record,
            Ok(None) => continue,
            Err(e) => {
                return Err(CogloadCliError::ParseError(format!(
                    "Failed to parse line {}: {}",
                    line_num + 1,
                    e
                )))
            }
        };

        // Streaming input is validated per record; ordering is the session's job
        record.validate()?;

        let outcome = session.tick(&record.to_sample());
        writeln!(stdout, "{}", serde_json::to_string(&outcome)?)?;
        if flush {
            stdout.flush()?;
        }
    }
    stdout.flush()?;

    let summary = session.stop();
    write_summary(summary_path, &summary)?;
    Ok(())
}

/// Shape of a synthetic session
struct SimulationPlan {
    duration: f64,
    hz: f64,
    blink_start: f64,
    blink_end: f64,
    lean_after: Option<f64>,
}

const SIMULATED_OPEN_EAR: f64 = 0.30;
const SIMULATED_CLOSED_EAR: f64 = 0.15;
const SIMULATED_BLINK_SECONDS: f64 = 0.16;

impl SimulationPlan {
    fn frames(&self) -> Vec<FrameSample> {
        let step = 1.0 / self.hz;
        let count = (self.duration * self.hz).floor() as usize;
        let mut frames = Vec::with_capacity(count);
        let mut next_blink = 0.0;

        for i in 0..count {
            let t = i as f64 * step;
            let progress = (t / self.duration).clamp(0.0, 1.0);
            let blink_rate = self.blink_start + (self.blink_end - self.blink_start) * progress;

            if t >= next_blink + SIMULATED_BLINK_SECONDS {
                next_blink += 60.0 / blink_rate.max(1.0);
            }
            let ear_value = if t >= next_blink && t < next_blink + SIMULATED_BLINK_SECONDS {
                SIMULATED_CLOSED_EAR
            } else {
                SIMULATED_OPEN_EAR
            };
            let nose_depth = match self.lean_after {
                Some(lean) if t >= lean => -0.12,
                _ => -0.02,
            };

            frames.push(FrameSample::new(
                t,
                ear_value,
                nose_depth,
                SimulatedBreathing::rate_at(t),
            ));
        }
        frames
    }
}

fn cmd_simulate(
    plan: SimulationPlan,
    engine: &EngineArgs,
    frames_out: Option<&Path>,
    json: bool,
) -> Result<(), CogloadCliError> {
    if !(plan.duration > 0.0 && plan.hz > 0.0 && plan.blink_start > 0.0 && plan.blink_end > 0.0) {
        return Err(CogloadCliError::ParseError(
            "duration, hz and blink rates must be positive".to_string(),
        ));
    }

    let frames = plan.frames();
    if let Some(path) = frames_out {
        let mut lines = Vec::with_capacity(frames.len());
        for frame in &frames {
            lines.push(serde_json::to_string(&FrameRecord::from(frame))?);
        }
        fs::write(path, lines.join("\n") + "\n")?;
    }

    let mut session = MonitorSession::start(engine.load_config()?, engine.collaborators())?;
    for frame in &frames {
        session.tick(frame);
    }
    let summary = session.stop();

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&summary);
    }
    Ok(())
}

fn cmd_validate(input: &Path, input_format: InputFormat, json: bool) -> Result<(), CogloadCliError> {
    let input_data = read_input(input)?;
    let records = parse_records(&input_data, &input_format)?;

    let failures = FrameRecordAdapter::validate_records(&records);

    let report = ValidationReport {
        schema_version: SCHEMA_VERSION.to_string(),
        total_frames: records.len(),
        valid_frames: records.len() - failures.len(),
        invalid_frames: failures.len(),
        errors: failures
            .iter()
            .map(|f| ValidationErrorDetail {
                index: f.index,
                timestamp: f.timestamp,
                error: f.error.to_string(),
            })
            .collect(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Validation Report ({})", report.schema_version);
        println!("=================");
        println!("Total frames:   {}", report.total_frames);
        println!("Valid frames:   {}", report.valid_frames);
        println!("Invalid frames: {}", report.invalid_frames);

        if !report.errors.is_empty() {
            println!("\nErrors:");
            for err in &report.errors {
                println!("  - Frame {} (t={}): {}", err.index, err.timestamp, err.error);
            }
        }
    }

    if report.invalid_frames > 0 {
        Err(CogloadCliError::ValidationFailed(report.invalid_frames))
    } else {
        Ok(())
    }
}

fn cmd_config(config: Option<&Path>, preset: &Preset) -> Result<(), CogloadCliError> {
    let config = load_config(config, preset)?;
    println!("{}", config.to_json()?);
    Ok(())
}

fn cmd_doctor(config: Option<&Path>, json: bool) -> Result<(), CogloadCliError> {
    let mut checks: Vec<DoctorCheck> = Vec::new();

    checks.push(DoctorCheck {
        name: "cogload_version".to_string(),
        status: CheckStatus::Ok,
        message: format!("CogLoad version {}", COGLOAD_VERSION),
    });

    checks.push(DoctorCheck {
        name: "schema_version".to_string(),
        status: CheckStatus::Ok,
        message: format!("Input schema: {}", SCHEMA_VERSION),
    });

    match config {
        Some(path) if !path.exists() => checks.push(DoctorCheck {
            name: "config".to_string(),
            status: CheckStatus::Warning,
            message: "Configuration file does not exist, defaults apply".to_string(),
        }),
        Some(path) => {
            let check = match fs::read_to_string(path) {
                Ok(content) => match EngineConfig::from_json(&content) {
                    Ok(loaded) => DoctorCheck {
                        name: "config".to_string(),
                        status: CheckStatus::Ok,
                        message: format!(
                            "Configuration valid (history {} entries, event log {} entries)",
                            loaded.retention.history_capacity, loaded.retention.event_log_capacity
                        ),
                    },
                    Err(e) => DoctorCheck {
                        name: "config".to_string(),
                        status: CheckStatus::Error,
                        message: e.to_string(),
                    },
                },
                Err(e) => DoctorCheck {
                    name: "config".to_string(),
                    status: CheckStatus::Error,
                    message: format!("Cannot read configuration file: {}", e),
                },
            };
            checks.push(check);
        }
        None => checks.push(DoctorCheck {
            name: "config".to_string(),
            status: CheckStatus::Ok,
            message: "Using built-in defaults".to_string(),
        }),
    }

    // The intervention worker is a real thread; make sure one can start
    let worker_check = match MonitorSession::start(EngineConfig::default(), Collaborators::offline()) {
        Ok(session) => {
            session.stop();
            DoctorCheck {
                name: "intervention_worker".to_string(),
                status: CheckStatus::Ok,
                message: "Intervention worker starts and stops cleanly".to_string(),
            }
        }
        Err(e) => DoctorCheck {
            name: "intervention_worker".to_string(),
            status: CheckStatus::Error,
            message: e.to_string(),
        },
    };
    checks.push(worker_check);

    let stdin_check = if atty::is(atty::Stream::Stdin) {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a TTY (interactive mode)".to_string(),
        }
    } else {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a pipe (streaming mode ready)".to_string(),
        }
    };
    checks.push(stdin_check);

    let report = DoctorReport {
        producer: PRODUCER_NAME.to_string(),
        version: COGLOAD_VERSION.to_string(),
        checks,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("CogLoad Doctor Report");
        println!("=====================");
        println!("Producer: {}", report.producer);
        println!("Version:  {}", report.version);
        println!("\nChecks:");
        for check in &report.checks {
            let status_icon = match check.status {
                CheckStatus::Ok => "[OK]",
                CheckStatus::Warning => "[WARN]",
                CheckStatus::Error => "[ERR]",
            };
            println!("  {} {}: {}", status_icon, check.name, check.message);
        }
    }

    let has_errors = report.checks.iter().any(|c| matches!(c.status, CheckStatus::Error));
    if has_errors {
        Err(CogloadCliError::DoctorFailed)
    } else {
        Ok(())
    }
}

// Helper functions

fn read_input(input: &Path) -> Result<String, CogloadCliError> {
    if input.to_string_lossy() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(fs::read_to_string(input)?)
    }
}

fn parse_records(input_data: &str, format: &InputFormat) -> Result<Vec<FrameRecord>, CogloadCliError> {
    Ok(match format {
        InputFormat::Ndjson => FrameRecordAdapter::parse_ndjson(input_data)?,
        InputFormat::Json => FrameRecordAdapter::parse_array(input_data)?,
    })
}

fn load_config(path: Option<&Path>, preset: &Preset) -> Result<EngineConfig, CogloadCliError> {
    match path {
        Some(path) => Ok(EngineConfig::from_json(&fs::read_to_string(path)?)?),
        None => Ok(match preset {
            Preset::Default => EngineConfig::default(),
            Preset::Strict => EngineConfig::strict(),
            Preset::Lenient => EngineConfig::lenient(),
        }),
    }
}

fn write_summary(path: Option<&Path>, summary: &SessionSummary) -> Result<(), CogloadCliError> {
    if let Some(path) = path {
        fs::write(path, serde_json::to_string_pretty(summary)?)?;
    }
    Ok(())
}

fn format_output(outcomes: &[TickOutcome], format: &OutputFormat) -> Result<String, CogloadCliError> {
    match format {
        OutputFormat::Ndjson => {
            let mut lines: Vec<String> = Vec::new();
            for outcome in outcomes {
                lines.push(serde_json::to_string(outcome)?);
            }
            Ok(lines.join("\n") + "\n")
        }
        OutputFormat::Json => Ok(serde_json::to_string(outcomes)?),
        OutputFormat::JsonPretty => Ok(serde_json::to_string_pretty(outcomes)?),
    }
}

fn print_summary(summary: &SessionSummary) {
    let stats = &summary.stats;
    println!("CogLoad Session Summary");
    println!("=======================");
    println!("Session:      {}", summary.session_id);
    println!("Duration:     {:.1} s", summary.duration_seconds);
    println!("Final zone:   {:?}", summary.final_zone);
    println!("Frames:       {} fused, {} skipped", stats.frames_processed, stats.frames_skipped());
    println!("Peak load:    {:.1}", stats.peak_load);
    println!("Peak blinks:  {:.1}/min", stats.peak_blink_rate);
    println!(
        "Zone time:    deep flow {:.1} s, normal {:.1} s, brain fried {:.1} s",
        stats.zone_time.deep_flow, stats.zone_time.normal, stats.zone_time.brain_fried
    );
    if let Some(shares) = stats.zone_shares() {
        println!(
            "Zone share:   deep flow {:.0}%, normal {:.0}%, brain fried {:.0}%",
            shares.deep_flow * 100.0,
            shares.normal * 100.0,
            shares.brain_fried * 100.0
        );
    }
    println!(
        "History:      {} retained of {} written",
        summary.history_len, summary.history_appended
    );
    println!(
        "Event log:    {} retained of {} written",
        summary.event_log_len, summary.events_appended
    );
    println!("Alerts:       {} ({} toasts)", stats.alerts, stats.toasts);
    println!(
        "Interventions: {} started, {} succeeded, {} failed",
        stats.interventions_started, stats.interventions_succeeded, stats.interventions_failed
    );
    println!("Posture fixes: {}", stats.posture_fixes);
    if stats.interventions_dropped > 0 {
        warn!(dropped = stats.interventions_dropped, "some interventions were dropped");
    }
}

// Error types

#[derive(Debug)]
enum CogloadCliError {
    Io(io::Error),
    Engine(EngineError),
    Json(serde_json::Error),
    Validation(ValidationError),
    NoFrames,
    ValidationFailed(usize),
    DoctorFailed,
    ParseError(String),
}

impl From<io::Error> for CogloadCliError {
    fn from(e: io::Error) -> Self {
        CogloadCliError::Io(e)
    }
}

impl From<EngineError> for CogloadCliError {
    fn from(e: EngineError) -> Self {
        CogloadCliError::Engine(e)
    }
}

impl From<serde_json::Error> for CogloadCliError {
    fn from(e: serde_json::Error) -> Self {
        CogloadCliError::Json(e)
    }
}

impl From<ValidationError> for CogloadCliError {
    fn from(e: ValidationError) -> Self {
        CogloadCliError::Validation(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    hint: Option<String>,
}

impl From<CogloadCliError> for CliError {
    fn from(e: CogloadCliError) -> Self {
        match e {
            CogloadCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            CogloadCliError::Engine(EngineError::InvalidConfig(msg)) => CliError {
                code: "CONFIG_ERROR".to_string(),
                message: msg,
                hint: Some("Run 'cogload config' to see a valid configuration".to_string()),
            },
            CogloadCliError::Engine(e) => CliError {
                code: "ENGINE_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Ensure input matches frame.sample.v1 schema".to_string()),
            },
            CogloadCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            CogloadCliError::Validation(e) => CliError {
                code: "VALIDATION_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Run 'cogload validate' for details".to_string()),
            },
            CogloadCliError::NoFrames => CliError {
                code: "NO_FRAMES".to_string(),
                message: "No frames found in input".to_string(),
                hint: Some("Ensure input file is not empty".to_string()),
            },
            CogloadCliError::ValidationFailed(count) => CliError {
                code: "VALIDATION_FAILED".to_string(),
                message: format!("{} frames failed validation", count),
                hint: Some("Fix validation errors and retry".to_string()),
            },
            CogloadCliError::DoctorFailed => CliError {
                code: "DOCTOR_FAILED".to_string(),
                message: "One or more health checks failed".to_string(),
                hint: Some("Review the doctor report for details".to_string()),
            },
            CogloadCliError::ParseError(msg) => CliError {
                code: "PARSE_ERROR".to_string(),
                message: msg,
                hint: Some("Check input format".to_string()),
            },
        }
    }
}

// Report types

#[derive(serde::Serialize)]
struct ValidationReport {
    schema_version: String,
    total_frames: usize,
    valid_frames: usize,
    invalid_frames: usize,
    errors: Vec<ValidationErrorDetail>,
}

#[derive(serde::Serialize)]
struct ValidationErrorDetail {
    index: usize,
    timestamp: f64,
    error: String,
}

#[derive(serde::Serialize)]
struct DoctorReport {
    producer: String,
    version: String,
    checks: Vec<DoctorCheck>,
}

#[derive(serde::Serialize)]
struct DoctorCheck {
    name: String,
    status: CheckStatus,
    message: String,
}

#[derive(serde::Serialize)]
enum CheckStatus {
    Ok,
    Warning,
    Error,
}

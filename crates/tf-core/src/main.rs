//! Table Filter Core - headless table search, filter and bulk actions
//!
//! The main entry point for tf-core, handling:
//! - Filtering a rendered table snapshot by query and filter values
//! - Printing the generated filter menu
//! - Running bulk actions over selected rows
//! - Simulating the confirmation dialog prefill
//! - Config validation and schema export

use std::collections::BTreeMap;
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, CommandFactory, Parser, Subcommand};
use serde::Serialize;
use tf_common::{OutputFormat, RowId, StructuredError};
use tf_config::TableConfig;
use tf_core::bulk::{ActionTransport, BulkExecutor, HttpTransport, NoopTransport};
use tf_core::config::{load_config, ConfigOptions, LoadedConfig};
use tf_core::engine::{ResultsSummary, Segment};
use tf_core::events::{JsonlWriter, NoopEmitter, ProgressEmitter};
use tf_core::exit_codes::ExitCode;
use tf_core::logging::{
    event_names, init_logging, truncate_for_log, LogConfig, LogFormat, LogLevel, Stage,
};
use tf_core::view::FilterButton;
use tf_core::{Document, RecordingView, TablePage};

/// Table Filter Core - search, filter and bulk-act on rendered admin tables
#[derive(Parser)]
#[command(name = "tf-core")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    global: GlobalOpts,
}

/// Global options available to all commands
#[derive(Args, Debug)]
struct GlobalOpts {
    /// Table config file (JSON or TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Translations file (flat JSON object)
    #[arg(long, global = true)]
    translations: Option<PathBuf>,

    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "json")]
    format: OutputFormat,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(long, global = true)]
    quiet: bool,

    /// Log format on stderr (human, jsonl)
    #[arg(long, global = true)]
    log_format: Option<LogFormat>,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply a query and filters to a table snapshot and print the visible rows
    Filter(TableArgs),

    /// Print the filter menu generated from a table snapshot
    Menu(TableArgs),

    /// Select rows and run the configured bulk action
    Bulk(BulkArgs),

    /// Show what the confirmation dialog displays for a trigger
    Prefill(PrefillArgs),

    /// Validate configuration and translations
    Check,

    /// Print the JSON schema of the table config
    Schema,

    /// Generate shell completions
    Completions(CompletionsArgs),

    /// Print version information
    Version,
}

#[derive(Args, Debug)]
struct TableArgs {
    /// Rendered table snapshot (JSON)
    document: PathBuf,

    /// Search text
    #[arg(long, default_value = "")]
    query: String,

    /// Activate a filter value: DIMENSION=VALUE (repeatable)
    #[arg(long = "filter", value_name = "DIMENSION=VALUE")]
    filters: Vec<String>,
}

#[derive(Args, Debug)]
struct BulkArgs {
    #[command(flatten)]
    table: TableArgs,

    /// Row ids to select (comma separated); defaults to every visible row
    #[arg(long, value_delimiter = ',')]
    select: Vec<String>,

    /// Server base URL the endpoint template is appended to
    #[arg(long, env = "TABLE_FILTER_BASE_URL")]
    base_url: Option<String>,

    /// Pause between requests in milliseconds (overrides config)
    #[arg(long)]
    pause_ms: Option<u64>,

    /// Action name reported in progress and logs (overrides config)
    #[arg(long)]
    action: Option<String>,

    /// Endpoint template with an `{id}` placeholder (overrides config)
    #[arg(long)]
    endpoint: Option<String>,

    /// Accept every request without contacting a server
    #[arg(long)]
    dry_run: bool,
}

#[derive(Args, Debug)]
struct PrefillArgs {
    /// Rendered table snapshot (JSON)
    document: PathBuf,

    /// Id of the control that opens the dialog
    #[arg(long)]
    trigger: String,
}

#[derive(Args, Debug)]
struct CompletionsArgs {
    shell: clap_complete::Shell,
}

fn main() {
    let cli = Cli::parse();

    let cli_level = if cli.global.quiet {
        Some(LogLevel::Error)
    } else {
        match cli.global.verbose {
            0 => None,
            1 => Some(LogLevel::Info),
            2 => Some(LogLevel::Debug),
            _ => Some(LogLevel::Trace),
        }
    };
    init_logging(&LogConfig::from_env(cli_level, cli.global.log_format));

    let code = match cli.command {
        None => {
            let mut cmd = Cli::command();
            let _ = cmd.print_help();
            ExitCode::Clean
        }
        Some(Commands::Filter(args)) => run_filter(&cli.global, &args),
        Some(Commands::Menu(args)) => run_menu(&cli.global, &args),
        Some(Commands::Bulk(args)) => run_bulk(&cli.global, &args),
        Some(Commands::Prefill(args)) => run_prefill(&cli.global, &args),
        Some(Commands::Check) => run_check(&cli.global),
        Some(Commands::Schema) => run_schema(),
        Some(Commands::Completions(args)) => {
            let mut cmd = Cli::command();
            clap_complete::generate(args.shell, &mut cmd, "tf-core", &mut std::io::stdout());
            ExitCode::Clean
        }
        Some(Commands::Version) => run_version(&cli.global),
    };

    std::process::exit(code.as_i32());
}

// ----------------------------------------------------------------------------
// Shared helpers
// ----------------------------------------------------------------------------

fn config_options(global: &GlobalOpts) -> ConfigOptions {
    ConfigOptions {
        table_path: global.config.clone(),
        translations_path: global.translations.clone(),
    }
}

/// Print an error in the requested format and map it to an exit code.
fn fail(global: &GlobalOpts, err: &tf_common::Error) -> ExitCode {
    match global.format {
        OutputFormat::Json | OutputFormat::Jsonl => {
            println!("{}", StructuredError::from(err).to_json());
        }
        OutputFormat::Md | OutputFormat::Summary => eprintln!("{}", err.to_human()),
    }
    ExitCode::from(err)
}

fn args_error(message: &str) -> ExitCode {
    eprintln!("tf-core: {}", message);
    ExitCode::ArgsError
}

fn print_json<T: Serialize>(value: &T) -> ExitCode {
    match serde_json::to_string_pretty(value) {
        Ok(json) => {
            println!("{}", json);
            ExitCode::Clean
        }
        Err(err) => {
            eprintln!("tf-core: failed to serialize output: {}", err);
            ExitCode::InternalError
        }
    }
}

fn parse_filter(raw: &str) -> Option<(&str, &str)> {
    let (dimension, value) = raw.split_once('=')?;
    let (dimension, value) = (dimension.trim(), value.trim());
    if dimension.is_empty() || value.is_empty() {
        return None;
    }
    Some((dimension, value))
}

/// Config, snapshot and an initialized table page with query and filters applied.
struct Session {
    config: LoadedConfig,
    page: TablePage,
    view: RecordingView,
}

fn open_session(global: &GlobalOpts, args: &TableArgs) -> Result<Session, ExitCode> {
    let config = load_config(&config_options(global))
        .map_err(|err| fail(global, &tf_common::Error::from(err)))?;
    let doc = Document::from_file(&args.document).map_err(|err| fail(global, &err))?;

    let mut page = TablePage::initialize(&config.table, &doc, config.translations.clone());
    if let Some(err) = page.init_error() {
        return Err(fail(global, &tf_common::Error::from(err.clone())));
    }
    let mut view = RecordingView::new();
    page.render(&mut view);

    for raw in &args.filters {
        let Some((dimension, value)) = parse_filter(raw) else {
            return Err(args_error(&format!(
                "invalid --filter '{}': expected DIMENSION=VALUE",
                raw
            )));
        };
        page.on_filter_toggled(dimension, value, true, &mut view)
            .map_err(|err| fail(global, &err))?;
    }
    if !args.query.is_empty() {
        page.on_query_changed(&args.query, &mut view);
    }

    tracing::info!(
        target: event_names::RUN_STARTED,
        run_id = %page.log_context().run_id,
        table = %page.table(),
        stage = %Stage::Init,
        config = %config.snapshot.short_id(),
        query = %truncate_for_log(&args.query, 64),
        "table opened"
    );

    Ok(Session { config, page, view })
}

// ----------------------------------------------------------------------------
// filter
// ----------------------------------------------------------------------------

#[derive(Serialize)]
struct RowOutput {
    id: RowId,
    cells: BTreeMap<String, Vec<Segment>>,
}

#[derive(Serialize)]
struct FilterOutput {
    table: String,
    query: String,
    filters: BTreeMap<String, Vec<String>>,
    summary: ResultsSummary,
    filter_button: FilterButton,
    rows: Vec<RowOutput>,
}

fn run_filter(global: &GlobalOpts, args: &TableArgs) -> ExitCode {
    let session = match open_session(global, args) {
        Ok(s) => s,
        Err(code) => return code,
    };
    let Some(engine) = session.page.engine() else {
        return ExitCode::DocumentError;
    };

    let summary = engine.summary();
    let rows: Vec<RowOutput> = engine
        .visible_ids()
        .into_iter()
        .map(|id| RowOutput {
            cells: session.view.cells.get(&id).cloned().unwrap_or_default(),
            id,
        })
        .collect();
    let output = FilterOutput {
        table: engine.table().to_string(),
        query: engine.query().trimmed().to_string(),
        filters: engine
            .dimensions()
            .iter()
            .filter(|d| d.is_active())
            .map(|d| (d.name.clone(), d.active().iter().cloned().collect()))
            .collect(),
        summary,
        filter_button: engine.filter_button(),
        rows,
    };

    let code = match global.format {
        OutputFormat::Json | OutputFormat::Jsonl => print_json(&output),
        OutputFormat::Md => {
            println!("{}", filter_markdown(&output, engine.columns()));
            ExitCode::Clean
        }
        OutputFormat::Summary => {
            if output.summary.no_results {
                println!("No results for '{}'", output.query);
            } else {
                println!("{}", output.summary.text);
            }
            ExitCode::Clean
        }
    };

    if code == ExitCode::Clean && output.summary.no_results {
        ExitCode::NoResults
    } else {
        code
    }
}

fn filter_markdown(output: &FilterOutput, columns: &[tf_config::SearchColumn]) -> String {
    let mut md = format!("# {}\n\n", output.table);
    if output.summary.no_results {
        md.push_str(&format!("No results for '{}'.\n", output.query));
        return md;
    }
    md.push_str(&format!("{}\n\n", output.summary.text));

    md.push_str("| id |");
    for column in columns {
        md.push_str(&format!(" {} |", column.key));
    }
    md.push_str("\n|---|");
    for _ in columns {
        md.push_str("---|");
    }
    md.push('\n');

    for row in &output.rows {
        md.push_str(&format!("| {} |", row.id));
        for column in columns {
            let text: String = row
                .cells
                .get(&column.key)
                .map(|segments| {
                    segments
                        .iter()
                        .map(|s| {
                            if s.is_match {
                                format!("**{}**", s.text)
                            } else {
                                s.text.clone()
                            }
                        })
                        .collect()
                })
                .unwrap_or_default();
            md.push_str(&format!(" {} |", text.replace('|', "\\|")));
        }
        md.push('\n');
    }
    md
}

// ----------------------------------------------------------------------------
// menu
// ----------------------------------------------------------------------------

fn run_menu(global: &GlobalOpts, args: &TableArgs) -> ExitCode {
    let session = match open_session(global, args) {
        Ok(s) => s,
        Err(code) => return code,
    };
    let Some(menu) = session.page.filter_menu() else {
        return ExitCode::DocumentError;
    };

    match global.format {
        OutputFormat::Json | OutputFormat::Jsonl => print_json(&menu),
        OutputFormat::Md | OutputFormat::Summary => {
            for section in &menu.sections {
                println!("## {} ({})", section.label, section.combinator);
                for option in &section.options {
                    let mark = if option.checked { "x" } else { " " };
                    println!("- [{}] {} ({})", mark, option.label, option.count);
                }
                println!();
            }
            ExitCode::Clean
        }
    }
}

// ----------------------------------------------------------------------------
// bulk
// ----------------------------------------------------------------------------

#[derive(Serialize)]
struct RejectedRow {
    id: String,
}

fn run_bulk(global: &GlobalOpts, args: &BulkArgs) -> ExitCode {
    let mut session = match open_session(global, &args.table) {
        Ok(s) => s,
        Err(code) => return code,
    };
    let Some(bulk) = session.config.table.bulk.clone() else {
        return fail(
            global,
            &tf_common::Error::InvalidTableConfig("table has no bulk section".to_string()),
        );
    };
    if session.page.selection().is_none() {
        return fail(
            global,
            &tf_common::Error::MissingElement {
                id: format!("{} / {}", bulk.select_all, bulk.bulk_button),
            },
        );
    }

    let mut rejected = Vec::new();
    if args.select.is_empty() {
        session.page.toggle_all_visible(true, &mut session.view);
    } else {
        for raw in &args.select {
            let Some(id) = RowId::parse(raw.trim()) else {
                return args_error(&format!("invalid row id '{}'", raw));
            };
            if !session.page.toggle_row(&id, true, &mut session.view) {
                rejected.push(RejectedRow { id: raw.clone() });
            }
        }
    }

    let transport: Box<dyn ActionTransport> = if args.dry_run {
        Box::new(NoopTransport)
    } else {
        match &args.base_url {
            Some(base) => Box::new(HttpTransport::with_timeout(
                base.clone(),
                bulk.timeout_secs.map(Duration::from_secs),
            )),
            None => return args_error("--base-url is required unless --dry-run is set"),
        }
    };
    let emitter: Box<dyn ProgressEmitter> = match global.format {
        OutputFormat::Jsonl => Box::new(JsonlWriter::new(std::io::stdout())),
        _ => Box::new(NoopEmitter),
    };
    let pause = Duration::from_millis(args.pause_ms.unwrap_or(bulk.pause_ms));
    let executor = BulkExecutor::new(transport.as_ref())
        .with_emitter(emitter.as_ref())
        .with_pause(pause);

    let action = args.action.as_deref().unwrap_or(&bulk.action);
    let endpoint = args.endpoint.as_deref().unwrap_or(&bulk.endpoint);
    let Some(report) = session
        .page
        .run_bulk_action_with(&executor, &mut session.view, action, endpoint)
    else {
        if global.format != OutputFormat::Jsonl {
            let _ = print_json(&serde_json::json!({
                "action": action,
                "attempted": 0,
                "rejected": rejected,
                "message": "nothing selected",
            }));
        }
        return ExitCode::Clean;
    };

    let code = match global.format {
        OutputFormat::Jsonl => ExitCode::Clean,
        OutputFormat::Json => print_json(&serde_json::json!({
            "report": report,
            "rejected": rejected,
            "summary": session.page.summary(),
        })),
        OutputFormat::Md | OutputFormat::Summary => {
            println!("{}", report.message);
            for outcome in report.outcomes.iter().filter(|o| o.error.is_some()) {
                println!(
                    "- {} ({}): {}",
                    outcome.name,
                    outcome.id,
                    outcome.error.as_deref().unwrap_or_default()
                );
            }
            ExitCode::Clean
        }
    };
    let _ = std::io::stdout().flush();

    if code == ExitCode::Clean && !report.is_clean() {
        ExitCode::PartialFail
    } else {
        code
    }
}

// ----------------------------------------------------------------------------
// prefill
// ----------------------------------------------------------------------------

fn run_prefill(global: &GlobalOpts, args: &PrefillArgs) -> ExitCode {
    let config = match load_config(&config_options(global)) {
        Ok(c) => c,
        Err(err) => return fail(global, &tf_common::Error::from(err)),
    };
    let doc = match Document::from_file(&args.document) {
        Ok(d) => d,
        Err(err) => return fail(global, &err),
    };
    let Some(modal) = &config.table.modal else {
        return fail(
            global,
            &tf_common::Error::InvalidTableConfig("table has no modal section".to_string()),
        );
    };
    if !doc.has_element(&modal.modal) {
        return fail(
            global,
            &tf_common::Error::MissingElement {
                id: modal.modal.clone(),
            },
        );
    }

    let mut page = TablePage::initialize(&config.table, &doc, config.translations.clone());
    let mut view = RecordingView::new();
    let Some(prefill) = page.show_modal(&args.trigger, &mut view).cloned() else {
        return fail(
            global,
            &tf_common::Error::Document(format!("trigger '{}' not found", args.trigger)),
        );
    };

    match global.format {
        OutputFormat::Json | OutputFormat::Jsonl => print_json(&prefill),
        OutputFormat::Md | OutputFormat::Summary => {
            for (element, text) in &prefill.texts {
                println!("{}: {}", element, text);
            }
            if let Some(action) = &prefill.form_action {
                println!("action: {}", action);
            }
            ExitCode::Clean
        }
    }
}

// ----------------------------------------------------------------------------
// check / schema / version
// ----------------------------------------------------------------------------

fn run_check(global: &GlobalOpts) -> ExitCode {
    match load_config(&config_options(global)) {
        Ok(config) => {
            let result = serde_json::json!({
                "status": "ok",
                "table": config.table.table,
                "table_source": config.paths.table_source.to_string(),
                "translations_source": config.paths.translations_source.to_string(),
                "translation_overrides": config.translations.override_count(),
                "snapshot": config.snapshot,
            });
            match global.format {
                OutputFormat::Json | OutputFormat::Jsonl => print_json(&result),
                OutputFormat::Md | OutputFormat::Summary => {
                    println!(
                        "ok: table '{}' ({}), config {}",
                        config.table.table,
                        config.paths.table_source,
                        config.snapshot.short_id()
                    );
                    ExitCode::Clean
                }
            }
        }
        Err(err) => {
            let code = err.code();
            let message = err.to_string();
            match global.format {
                OutputFormat::Json | OutputFormat::Jsonl => {
                    let _ = print_json(&serde_json::json!({
                        "status": "error",
                        "code": code,
                        "message": message,
                    }));
                }
                OutputFormat::Md | OutputFormat::Summary => eprintln!("error: {}", message),
            }
            ExitCode::ConfigError
        }
    }
}

fn run_schema() -> ExitCode {
    let schema = schemars::schema_for!(TableConfig);
    print_json(&schema)
}

fn run_version(global: &GlobalOpts) -> ExitCode {
    match global.format {
        OutputFormat::Json | OutputFormat::Jsonl => print_json(&serde_json::json!({
            "name": env!("CARGO_PKG_NAME"),
            "version": env!("CARGO_PKG_VERSION"),
            "config_schema_version": tf_config::CONFIG_SCHEMA_VERSION,
        })),
        OutputFormat::Md | OutputFormat::Summary => {
            println!("tf-core {}", env!("CARGO_PKG_VERSION"));
            ExitCode::Clean
        }
    }
}

// prtrack - PR/PO material control tracking from spreadsheet exports

mod exit_codes;
mod input;
mod report;
mod util;
mod watch;

use std::collections::BTreeSet;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use chrono::{Local, NaiveDate};
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use log::LevelFilter;
use prtrack_config::{ConfigError, Settings};
use prtrack_core::{
    daily_summary, daily_trend, overview, remark_values, Dataset, Record, RecordFilter, Status,
    TrackError,
};
use prtrack_io::export::{export_csv, export_xlsx, write_csv};
use prtrack_io::{load, LoadError, LoadOptions, Loaded};

use exit_codes::{
    load_exit_code, EXIT_CONFIG, EXIT_ERROR, EXIT_EXPORT, EXIT_NO_INPUT, EXIT_SUCCESS,
    EXIT_UNAVAILABLE, EXIT_USAGE,
};
use input::resolve_input;

#[derive(Parser)]
#[command(name = "prtrack")]
#[command(about = "Track PR/PO material procurement status from control-sheet exports")]
#[command(version)]
struct Cli {
    /// Settings file (default: <config dir>/prtrack/settings.toml)
    #[arg(long, global = true, env = "PRTRACK_CONFIG")]
    config: Option<PathBuf>,

    /// More log output on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Status counts, remark keyword counts and total value
    #[command(after_help = "\
Examples:
  prtrack summary pr_control.csv
  prtrack summary --by-day --json")]
    Summary {
        /// PR control file (csv, tsv, txt, xlsx, xlsm, xls, xlsb, ods)
        input: Option<PathBuf>,

        /// Also show record count and value per requisition date
        #[arg(long)]
        by_day: bool,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Filtered record table
    #[command(after_help = "\
Examples:
  prtrack list -q bearing
  prtrack list --status pending --status po_issued
  prtrack list --remark 'รอของเข้า' --json")]
    List {
        input: Option<PathBuf>,

        #[command(flatten)]
        filter: FilterArgs,

        /// Show at most N records
        #[arg(long)]
        limit: Option<usize>,

        #[arg(long)]
        json: bool,
    },

    /// PRs opened on one day
    Daily {
        input: Option<PathBuf>,

        /// Day to report (YYYY-MM-DD, default today)
        #[arg(long)]
        date: Option<NaiveDate>,

        #[arg(long)]
        json: bool,
    },

    /// Export filtered records with their original columns
    #[command(after_help = "\
Examples:
  prtrack export --status pending -o pending.csv
  prtrack export -q hose -o hose.xlsx
  prtrack export > all.csv")]
    Export {
        input: Option<PathBuf>,

        #[command(flatten)]
        filter: FilterArgs,

        /// Output file (CSV goes to stdout when omitted)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Output format (default: from the output extension, else csv)
        #[arg(long, value_enum)]
        format: Option<ExportFormat>,
    },

    /// Show which column each logical field resolved to
    Columns {
        input: Option<PathBuf>,

        #[arg(long)]
        json: bool,
    },

    /// Re-print the summary whenever the file changes
    Watch {
        input: Option<PathBuf>,

        /// Seconds between checks (at least 1)
        #[arg(long, default_value_t = 2, value_parser = clap::value_parser!(u64).range(1..))]
        interval: u64,

        /// Stop after N checks
        #[arg(long)]
        max_cycles: Option<u64>,
    },
}

#[derive(Args, Debug, Default)]
struct FilterArgs {
    /// Case-insensitive text in item description, PR number or PO number
    #[arg(long, short = 'q')]
    query: Option<String>,

    /// Keep only this status (pending, po_issued, received); repeatable
    #[arg(long = "status")]
    statuses: Vec<Status>,

    /// Keep only records whose remark equals this value; repeatable
    #[arg(long = "remark")]
    remarks: Vec<String>,
}

impl FilterArgs {
    fn to_filter(&self) -> RecordFilter {
        let mut filter = RecordFilter::new().statuses(self.statuses.iter().copied());
        if let Some(q) = &self.query {
            filter = filter.query(q.clone());
        }
        for remark in &self.remarks {
            filter = filter.remark(remark.clone());
        }
        filter
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ExportFormat {
    Csv,
    Xlsx,
}

impl ExportFormat {
    fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "csv" => Some(Self::Csv),
            "xlsx" => Some(Self::Xlsx),
            _ => None,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = Context::new(cli.config.as_deref()).and_then(|ctx| match cli.command {
        Commands::Summary { input, by_day, json } => cmd_summary(&ctx, input, by_day, json),
        Commands::List { input, filter, limit, json } => cmd_list(&ctx, input, &filter, limit, json),
        Commands::Daily { input, date, json } => cmd_daily(&ctx, input, date, json),
        Commands::Export { input, filter, output, format } => {
            cmd_export(&ctx, input, &filter, output, format)
        }
        Commands::Columns { input, json } => cmd_columns(&ctx, input, json),
        Commands::Watch { input, interval, max_cycles } => {
            watch::cmd_watch(&ctx, input, interval, max_cycles)
        }
    });

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint, info }) => {
            let label = if info { "info" } else { "error" };
            if !message.is_empty() {
                eprintln!("{label}: {message}");
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {hint}");
            }
            ExitCode::from(code)
        }
    }
}

/// `PRTRACK_LOG` (env_logger filter syntax) wins over `-v`.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    let mut builder = env_logger::Builder::new();
    builder
        .filter_level(level)
        .format_timestamp(None)
        .target(env_logger::Target::Stderr);
    if let Ok(spec) = std::env::var("PRTRACK_LOG") {
        builder.parse_filters(&spec);
    }
    let _ = builder.try_init();
}

// ============================================================================
// Shared context
// ============================================================================

pub struct Context {
    pub settings: Settings,
    pub options: LoadOptions,
}

impl Context {
    fn new(config: Option<&Path>) -> Result<Self, CliError> {
        let settings = match config {
            Some(path) => Settings::load(path),
            None => Settings::load_default(),
        }
        .map_err(CliError::from_config)?;

        let mut options = LoadOptions::default()
            .with_encoding_labels(&settings.parse.encodings)
            .map_err(CliError::from_load)?;
        options.sheet = settings.input.sheet.clone();
        options.parse = settings.parse_options();
        options.aliases = settings.alias_table().map_err(CliError::from_config)?;

        Ok(Self { settings, options })
    }

    /// Resolve the input path without loading it.
    pub fn input_path(&self, input: Option<PathBuf>) -> Result<PathBuf, CliError> {
        let cwd = std::env::current_dir().map_err(|e| CliError::io(e.to_string()))?;
        let (path, source) = resolve_input(input, &self.settings, &cwd)?;
        log::info!("input {} ({source:?})", path.display());
        Ok(path)
    }

    fn load(&self, input: Option<PathBuf>) -> Result<Loaded, CliError> {
        let path = self.input_path(input)?;
        load(&path, &self.options).map_err(CliError::from_load)
    }
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
    /// Printed as `info:` rather than `error:`.
    pub info: bool,
}

impl CliError {
    pub fn new(code: u8, msg: impl Into<String>) -> Self {
        Self { code, message: msg.into(), hint: None, info: false }
    }

    pub fn usage(msg: impl Into<String>) -> Self {
        Self::new(EXIT_USAGE, msg)
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self::new(EXIT_ERROR, msg)
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::new(EXIT_CONFIG, msg)
    }

    pub fn from_load(err: LoadError) -> Self {
        let code = load_exit_code(&err);
        let hint = err.hint().map(str::to_string);
        let cli = Self { code, message: err.to_string(), hint, info: false };
        if code == EXIT_NO_INPUT {
            cli.info()
        } else {
            cli
        }
    }

    pub fn from_config(err: ConfigError) -> Self {
        let hint = match &err {
            ConfigError::UnknownField(_) => Some(
                "alias keys: pr_number, requisition_date, item_description, po_number, \
                 received_date, quantity, total_value, requisitioner, vendor, remark",
            ),
            _ => None,
        };
        Self {
            code: EXIT_CONFIG,
            message: err.to_string(),
            hint: hint.map(str::to_string),
            info: false,
        }
    }

    pub fn from_track(err: TrackError) -> Self {
        let hint = match &err {
            TrackError::FieldUnavailable { field, .. } => Some(format!(
                "rename the column or add it under [aliases] {} in settings",
                field.key()
            )),
            _ => None,
        };
        Self { code: EXIT_UNAVAILABLE, message: err.to_string(), hint, info: false }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    /// Mark as informational.
    pub fn info(mut self) -> Self {
        self.info = true;
        self
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), CliError> {
    let json = serde_json::to_string_pretty(value).map_err(|e| CliError::io(e.to_string()))?;
    println!("{json}");
    Ok(())
}

fn print_text(text: &str) -> Result<(), CliError> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    handle
        .write_all(text.as_bytes())
        .map_err(|e| CliError::io(e.to_string()))
}

// ============================================================================
// summary
// ============================================================================

pub fn summary_text(ctx: &Context, loaded: &Loaded, by_day: bool) -> String {
    let ds = &loaded.dataset;
    let ov = overview(ds, &ctx.settings.remarks);

    let mut out = report::source_line(&loaded.source, ds);
    out.push_str("\n\n");
    out.push_str(&report::overview_text(&ov, ds));
    if by_day {
        out.push('\n');
        match daily_trend(ds) {
            Ok(days) => out.push_str(&report::trend_text(&days)),
            Err(e) => {
                out.push_str(&e.to_string());
                out.push('\n');
            }
        }
    }
    out
}

fn cmd_summary(ctx: &Context, input: Option<PathBuf>, by_day: bool, json: bool) -> Result<(), CliError> {
    let loaded = ctx.load(input)?;

    if json {
        let ov = overview(&loaded.dataset, &ctx.settings.remarks);
        return print_json(&report::SummaryJson {
            source: &loaded.source,
            dropped_rows: loaded.dataset.dropped_rows(),
            overview: &ov,
            trend: by_day.then(|| daily_trend(&loaded.dataset).into()),
        });
    }

    print_text(&summary_text(ctx, &loaded, by_day))
}

// ============================================================================
// list
// ============================================================================

fn cmd_list(
    ctx: &Context,
    input: Option<PathBuf>,
    filter: &FilterArgs,
    limit: Option<usize>,
    json: bool,
) -> Result<(), CliError> {
    let loaded = ctx.load(input)?;
    let ds = &loaded.dataset;
    let matched = apply_filter(ds, filter)?;
    let shown = &matched[..limit.unwrap_or(matched.len()).min(matched.len())];

    if json {
        return print_json(&report::ListJson {
            total: ds.len(),
            matched: matched.len(),
            records: shown,
        });
    }

    let mut out = report::records_text(shown);
    out.push_str(&format!("\n{} of {} records", matched.len(), ds.len()));
    if shown.len() < matched.len() {
        out.push_str(&format!(" (showing first {})", shown.len()));
    }
    out.push('\n');
    if matched.is_empty() && !filter.remarks.is_empty() {
        let known = remark_values(ds);
        if !known.is_empty() {
            out.push_str(&format!("Remarks in this file: {}\n", known.join(", ")));
        }
    }
    print_text(&out)
}

/// Filter with remark and status checks that need columns reported up front.
fn apply_filter<'a>(ds: &'a Dataset, args: &FilterArgs) -> Result<Vec<&'a Record>, CliError> {
    if !args.remarks.is_empty() {
        ds.schema()
            .require(prtrack_core::LogicalField::Remark, "remark filter")
            .map_err(CliError::from_track)?;
    }
    let filter = args.to_filter();
    log::debug!(
        "filter: query={:?} statuses={:?} remarks={:?}",
        filter.query,
        filter.statuses.iter().map(Status::key).collect::<BTreeSet<_>>(),
        filter.remarks
    );
    Ok(filter.apply(ds))
}

// ============================================================================
// daily
// ============================================================================

fn cmd_daily(ctx: &Context, input: Option<PathBuf>, date: Option<NaiveDate>, json: bool) -> Result<(), CliError> {
    let loaded = ctx.load(input)?;
    let date = date.unwrap_or_else(|| Local::now().date_naive());
    let day = daily_summary(&loaded.dataset, date).map_err(CliError::from_track)?;

    if json {
        return print_json(&day);
    }
    print_text(&report::daily_text(&day))
}

// ============================================================================
// export
// ============================================================================

fn cmd_export(
    ctx: &Context,
    input: Option<PathBuf>,
    filter: &FilterArgs,
    output: Option<PathBuf>,
    format: Option<ExportFormat>,
) -> Result<(), CliError> {
    let format = format
        .or_else(|| output.as_deref().and_then(ExportFormat::from_path))
        .unwrap_or(ExportFormat::Csv);
    if format == ExportFormat::Xlsx && output.is_none() {
        return Err(CliError::usage("xlsx export needs an output file").with_hint("add -o FILE.xlsx"));
    }

    let loaded = ctx.load(input)?;
    let ds = &loaded.dataset;
    let rows = apply_filter(ds, filter)?;

    let written = match (&output, format) {
        (None, _) => write_csv(io::stdout().lock(), ds, &rows),
        (Some(path), ExportFormat::Csv) => export_csv(path, ds, &rows),
        (Some(path), ExportFormat::Xlsx) => export_xlsx(path, ds, &rows),
    };
    written.map_err(|e| CliError::new(EXIT_EXPORT, e.to_string()))?;

    if let Some(path) = output {
        eprintln!("Exported {} of {} records to {}", rows.len(), ds.len(), path.display());
    }
    Ok(())
}

// ============================================================================
// columns
// ============================================================================

fn cmd_columns(ctx: &Context, input: Option<PathBuf>, json: bool) -> Result<(), CliError> {
    let loaded = ctx.load(input)?;
    let ds = &loaded.dataset;

    if json {
        return print_json(&report::ColumnsJson {
            source: &loaded.source,
            headers: ds.headers(),
            fields: report::field_reports(ds),
        });
    }
    print_text(&report::columns_text(&loaded.source, ds))
}

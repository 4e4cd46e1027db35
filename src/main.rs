use std::path::PathBuf;
use std::process::ExitCode;
use std::thread;

use clap::{Parser, Subcommand};
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use case_report::config::ReportConfig;
use case_report::report::{FileReportDataType, ProgressEvent, ReportResult, TableFormat};
use case_report::{logging, RunSummary, SearchRequest};

/// Generate reports from a forensic case database
#[derive(Debug, Parser)]
#[command(name = "case-report", version, about)]
struct Args {
    #[command(subcommand)]
    search: Option<Search>,

    /// Case database (SQLite)
    #[arg(long, env = "CASE_REPORT_DB", global = true)]
    case: Option<PathBuf>,

    /// JSON config file; flags override its values
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Parent folder for the report run folder
    #[arg(long)]
    output: Option<PathBuf>,

    #[arg(long)]
    case_name: Option<String>,

    /// Only report results and files carrying this tag (repeatable)
    #[arg(long = "tag")]
    tags: Vec<String>,

    /// Artifact type by name or display name (repeatable); default all in use
    #[arg(long = "artifact-type")]
    artifact_types: Vec<String>,

    /// Table format: html, csv or docx (repeatable)
    #[arg(long = "format")]
    formats: Vec<TableFormat>,

    /// Also write the tab-separated file list; optional comma-separated columns
    #[arg(long, num_args = 0..=1, value_delimiter = ',', require_equals = true)]
    file_list: Option<Vec<FileReportDataType>>,

    /// Skip the JSON case summary
    #[arg(long)]
    no_summary: bool,

    /// Worker threads
    #[arg(long, global = true)]
    threads: Option<usize>,

    /// Write the effective config to this file and exit
    #[arg(long)]
    save_config: Option<PathBuf>,

    /// Verbose logging (file:line, thread ids)
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Searches printed as JSON instead of writing a report
#[derive(Debug, Subcommand)]
enum Search {
    /// Files whose MD5 hash occurs more than once
    CommonFiles {
        /// Only look inside this data source (object id)
        #[arg(long)]
        data_source: Option<i64>,
    },
    /// Artifacts of a web domain grouped by day
    Timeline { domain: String },
}

impl From<Search> for SearchRequest {
    fn from(search: Search) -> Self {
        match search {
            Search::CommonFiles { data_source } => SearchRequest::CommonFiles { data_source },
            Search::Timeline { domain } => SearchRequest::Timeline { domain },
        }
    }
}

impl Args {
    fn into_config(self) -> ReportResult<(ReportConfig, Option<PathBuf>)> {
        let mut config = match &self.config {
            Some(path) => ReportConfig::load(path)?,
            None => ReportConfig::default(),
        };

        if self.case.is_some() {
            config.case_db = self.case;
        }
        if self.output.is_some() {
            config.report_directory = self.output;
        }
        if self.case_name.is_some() {
            config.case_name = self.case_name;
        }
        if !self.tags.is_empty() {
            config.tag_filter = self.tags;
        }
        if !self.artifact_types.is_empty() {
            config.artifact_types = self.artifact_types;
        }
        if !self.formats.is_empty() {
            config.table_formats = self.formats;
        }
        if let Some(columns) = self.file_list {
            config.file_list = true;
            if !columns.is_empty() {
                config.file_list_columns = columns;
            }
        }
        if self.no_summary {
            config.case_summary = false;
        }
        if let Some(threads) = self.threads {
            config.threads = threads;
        }
        Ok((config, self.save_config))
    }
}

fn print_summary(summary: &RunSummary) {
    println!("Report folder: {}", summary.report_path.display());
    for module in &summary.modules {
        println!("  {:<16} {:?}", module.module_name, module.status);
    }
    let errors: Vec<&String> = summary.errors().collect();
    if !errors.is_empty() {
        println!("{} error(s):", errors.len());
        for message in errors {
            println!("  {}", message);
        }
    }
}

fn run_search(config: &ReportConfig, request: &SearchRequest) -> ReportResult<String> {
    let case = case_report::open_case(config)?;
    let json = case_report::run_search(case, request, config.threads)?;
    Ok(serde_json::to_string_pretty(&json)?)
}

fn main() -> ExitCode {
    let mut args = Args::parse();

    // Control log level with RUST_LOG env var:
    //   RUST_LOG=debug ./case-report --case autopsy.db
    //   RUST_LOG=forensic_audit=info ./case-report --case autopsy.db
    logging::init(args.verbose);
    let search = args.search.take().map(SearchRequest::from);

    let (config, save_path) = match args.into_config() {
        Ok(resolved) => resolved,
        Err(e) => {
            error!("{}", e);
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Some(path) = save_path {
        return match config.save(&path) {
            Ok(()) => {
                println!("Config written to {}", path.display());
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("error: {}", e);
                ExitCode::FAILURE
            }
        };
    }

    if let Some(request) = search {
        return match run_search(&config, &request) {
            Ok(json) => {
                println!("{}", json);
                ExitCode::SUCCESS
            }
            Err(e) => {
                error!("Search failed: {}", e);
                eprintln!("error: {}", e);
                ExitCode::FAILURE
            }
        };
    }

    let (tx, mut rx) = mpsc::unbounded_channel::<ProgressEvent>();
    let watcher = thread::spawn(move || {
        while let Some(event) = rx.blocking_recv() {
            match event {
                ProgressEvent::Status { module, status } => info!(module = %module, status = ?status, "Report status"),
                ProgressEvent::Label { module, label } => debug!(module = %module, "{}", label),
                ProgressEvent::Progress { .. } => {}
            }
        }
    });

    let result = case_report::run(&config, Some(tx));
    if watcher.join().is_err() {
        error!("Progress watcher panicked");
    }

    match result {
        Ok(summary) => {
            print_summary(&summary);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Report generation failed: {}", e);
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

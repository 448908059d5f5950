//! Process command implementation

use anyhow::{Context, Result};
use clap::Args;
use rayon::prelude::*;
use spanwrap_core::{Alphabet, SegmentReport, Segmenter, TaggingSession};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use crate::config::{resolve_config, ConfigOverrides};
use crate::error::CliError;
use crate::input::{resolve_patterns, InputSource};
use crate::output::{HtmlFormatter, JsonFormatter, OutputFormatter, ProcessedDocument};
use crate::progress::ProgressReporter;

/// Arguments for the process command
#[derive(Debug, Args)]
pub struct ProcessArgs {
    /// Input files or patterns (supports glob, `-` for stdin, stdin when omitted)
    #[arg(short, long, value_name = "FILE/PATTERN")]
    pub input: Vec<String>,

    /// Output file (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "html")]
    pub format: OutputFormat,

    /// Segmentation modes, comma separated (default: letter)
    #[arg(short, long, value_name = "MODES", value_delimiter = ',')]
    pub modes: Vec<String>,

    /// Element name for wrappers
    #[arg(short, long, value_name = "TAG")]
    pub tag: Option<String>,

    /// Attribute carrying the wrapper identifier
    #[arg(long, value_name = "NAME")]
    pub id_attribute: Option<String>,

    /// Do not number wrappers
    #[arg(long)]
    pub no_ids: bool,

    /// First identifier of every document
    #[arg(long, value_name = "N", default_value_t = 0)]
    pub start_id: u64,

    /// Number all documents in one sequence, in input order
    #[arg(long)]
    pub continue_ids: bool,

    /// Add class labels to wrappers
    #[arg(long)]
    pub labels: bool,

    /// Elements left untouched, replaces the default list
    #[arg(long, value_name = "SELECTOR")]
    pub exclude: Option<String>,

    /// Elements treated as block boundaries, replaces the default list
    #[arg(long, value_name = "SELECTOR")]
    pub block: Option<String>,

    /// Which characters count as letters
    #[arg(long, value_enum)]
    pub alphabet: Option<AlphabetArg>,

    /// Configuration file
    #[arg(short, long, value_name = "FILE", env = "SPANWRAP_CONFIG")]
    pub config: Option<PathBuf>,

    /// Segment documents on several threads
    #[arg(short, long)]
    pub parallel: bool,

    /// Worker threads for --parallel (default: number of CPUs)
    #[arg(long, value_name = "N")]
    pub threads: Option<usize>,

    /// Suppress progress output
    #[arg(short, long)]
    pub quiet: bool,

    /// Increase verbosity
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Supported output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Segmented markup, each document followed by a newline
    Html,
    /// JSON array with markup and statistics per document
    Json,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 2] = [OutputFormat::Html, OutputFormat::Json];

    pub fn name(self) -> &'static str {
        match self {
            OutputFormat::Html => "html",
            OutputFormat::Json => "json",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            OutputFormat::Html => "segmented markup, each document followed by a newline",
            OutputFormat::Json => "array of {source, html, report} objects",
        }
    }
}

/// Letter alphabets selectable on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum AlphabetArg {
    Unicode,
    UnicodeAlphanumeric,
    Ascii,
}

impl From<AlphabetArg> for Alphabet {
    fn from(arg: AlphabetArg) -> Self {
        match arg {
            AlphabetArg::Unicode => Alphabet::Unicode,
            AlphabetArg::UnicodeAlphanumeric => Alphabet::UnicodeAlphanumeric,
            AlphabetArg::Ascii => Alphabet::Ascii,
        }
    }
}

impl ProcessArgs {
    /// Execute the process command
    pub fn execute(&self) -> Result<()> {
        self.init_logging()?;

        log::info!("Starting segmentation");
        log::debug!("Arguments: {:?}", self);

        let config = resolve_config(self.config.as_deref(), &self.overrides())?;
        let segmenter = Segmenter::with_config(config);
        let sources = resolve_patterns(&self.input)?;
        log::info!("Segmenting {} document(s)", sources.len());

        let mut progress = ProgressReporter::new(self.quiet);
        progress.init_documents(sources.len() as u64);

        let documents = if self.continue_ids {
            if self.parallel {
                log::warn!("--continue-ids numbers documents in input order, ignoring --parallel");
            }
            let mut session = TaggingSession::starting_at(self.start_id);
            sources
                .iter()
                .map(|source| self.segment_one(&segmenter, source, &mut session, &progress))
                .collect::<Result<Vec<_>>>()?
        } else if self.parallel && sources.len() > 1 {
            self.segment_parallel(&segmenter, &sources, &progress)?
        } else {
            sources
                .iter()
                .map(|source| {
                    let mut session = TaggingSession::starting_at(self.start_id);
                    self.segment_one(&segmenter, source, &mut session, &progress)
                })
                .collect::<Result<Vec<_>>>()?
        };
        progress.finish();

        let mut formatter = self.formatter()?;
        let mut total = SegmentReport::empty();
        for document in &documents {
            total.merge(&document.report);
            formatter.format_document(document)?;
        }
        formatter.finish()?;

        log::info!(
            "Wrapped {} spans over {} tokens in {} document(s)",
            total.executed_spans,
            total.tokens,
            documents.len()
        );
        Ok(())
    }

    /// Command-line values that take precedence over the configuration file
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            modes: (!self.modes.is_empty()).then(|| self.modes.clone()),
            wrapper_tag: self.tag.clone(),
            identifier_attribute: self.id_attribute.clone(),
            assign_identifiers: self.no_ids.then_some(false),
            use_labels: self.labels.then_some(true),
            exclude: self.exclude.clone(),
            block: self.block.clone(),
            alphabet: self.alphabet.map(Alphabet::from),
        }
    }

    fn segment_one(
        &self,
        segmenter: &Segmenter,
        source: &InputSource,
        session: &mut TaggingSession,
        progress: &ProgressReporter,
    ) -> Result<ProcessedDocument> {
        let name = source.name();
        let segmented = segmenter
            .process(source.open()?, session)
            .map_err(|e| CliError::Segmentation {
                source: name.clone(),
                reason: e.to_string(),
            })?;

        log::debug!(
            "{name}: {} tokens, {} wrappers, {} skipped",
            segmented.report.tokens,
            segmented.report.executed_spans,
            segmented.report.skipped_spans
        );
        progress.document_completed(&name);

        Ok(ProcessedDocument {
            source: name,
            html: segmented.html,
            report: segmented.report,
        })
    }

    fn segment_parallel(
        &self,
        segmenter: &Segmenter,
        sources: &[InputSource],
        progress: &ProgressReporter,
    ) -> Result<Vec<ProcessedDocument>> {
        let threads = self.threads.unwrap_or_else(num_cpus::get).max(1);
        log::info!("Using {threads} worker threads");

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()
            .context("Failed to build worker pool")?;

        pool.install(|| {
            sources
                .par_iter()
                .map(|source| {
                    let mut session = TaggingSession::starting_at(self.start_id);
                    self.segment_one(segmenter, source, &mut session, progress)
                })
                .collect()
        })
    }

    fn formatter(&self) -> Result<Box<dyn OutputFormatter>> {
        let writer: Box<dyn Write + Send + Sync> = match &self.output {
            Some(path) => Box::new(BufWriter::new(File::create(path).with_context(|| {
                format!("Failed to create output file: {}", path.display())
            })?)),
            None => Box::new(io::stdout()),
        };

        Ok(match self.format {
            OutputFormat::Html => Box::new(HtmlFormatter::new(writer)),
            OutputFormat::Json => Box::new(JsonFormatter::new(writer)),
        })
    }

    /// Initialize logging based on verbosity level
    fn init_logging(&self) -> Result<()> {
        let log_level = match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        };

        if !self.quiet {
            // A logger may already be installed when several commands run in one process
            let _ = env_logger::Builder::from_env(
                env_logger::Env::default().default_filter_or(log_level),
            )
            .try_init();
        }

        Ok(())
    }
}

//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::engine::{ExportConfig, ExportMode, Exporter};
use crate::error::{Error, Result, ResultExt};
use crate::http::{LogsClient, RateLimiter};
use crate::loader::{load_definition, ExportDefinition};
use crate::output::CsvSink;
use crate::partition::IntervalPartitioner;
use crate::types::{FilterSpec, Interval};
use serde_json::{json, Value};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Overrides given on the `export` command line
#[derive(Debug, Default, Clone)]
pub struct ExportOverrides {
    /// Output file
    pub output: Option<PathBuf>,
    /// Run partitions concurrently
    pub parallel: bool,
    /// Range start
    pub from: Option<i64>,
    /// Range end
    pub to: Option<i64>,
    /// Search query
    pub query: Option<String>,
    /// Record cap
    pub max_records: Option<usize>,
}

impl ExportOverrides {
    /// Apply range and query overrides to `filter`
    pub fn apply(&self, filter: &FilterSpec) -> Result<FilterSpec> {
        let mut filter = filter.clone();
        if let Some(query) = &self.query {
            filter.query.clone_from(query);
        }
        if let Some(from) = self.from {
            filter.from = from;
        }
        if let Some(to) = self.to {
            filter.to = to;
        }
        if filter.from > filter.to {
            return Err(Error::invalid_value(
                "--from/--to",
                format!("from ({}) must not be after to ({})", filter.from, filter.to),
            ));
        }
        Ok(filter)
    }

    /// Output path, falling back to the definition's default
    pub fn output_path(&self, def: &ExportDefinition) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| PathBuf::from(def.default_output()))
    }

    /// Fetch mode
    pub fn mode(&self) -> ExportMode {
        if self.parallel {
            ExportMode::Parallel
        } else {
            ExportMode::Sequential
        }
    }
}

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Validate { sample } => self.validate(*sample).await,
            Commands::Export {
                output,
                parallel,
                from,
                to,
                query,
                max_records,
            } => {
                let overrides = ExportOverrides {
                    output: output.clone(),
                    parallel: *parallel,
                    from: *from,
                    to: *to,
                    query: query.clone(),
                    max_records: *max_records,
                };
                self.export(&overrides).await
            }
            Commands::Intervals => self.intervals(),
        }
    }

    /// Load export definition
    fn load_definition(&self) -> Result<ExportDefinition> {
        load_definition(&self.cli.config)
    }

    /// Fetch a sample, print it as CSV on stdout and width hints on stderr
    async fn validate(&self, sample: usize) -> Result<()> {
        let def = self.load_definition()?;
        let exporter = build_exporter(&def, def.spec.filter.clone(), def.export_config())?;

        let validation = exporter.validate(sample).await?;

        let stdout = std::io::stdout();
        let mut writer = csv::WriterBuilder::new()
            .flexible(true)
            .from_writer(stdout.lock());
        for row in &validation.rows {
            writer
                .write_record(row)
                .context("Failed to write validation sample")?;
        }
        writer.flush().context("Failed to write validation sample")?;

        for (field, width) in &validation.suggested_widths {
            eprintln!("Suggested width for expansion rule '{field}': {width}");
        }
        Ok(())
    }

    /// Export the configured range into a CSV file
    async fn export(&self, overrides: &ExportOverrides) -> Result<()> {
        let def = self.load_definition()?;
        let filter = overrides.apply(&def.spec.filter)?;
        let mut config = def.export_config();
        if let Some(max) = overrides.max_records {
            config = config.with_max_records(max);
        }

        let exporter = build_exporter(&def, filter, config)?;
        let path = overrides.output_path(&def);
        let sink = CsvSink::create(&path)
            .with_context(|| format!("Cannot export to {}", path.display()))?;

        info!("Writing {} to {}", exporter.filter().interval(), path.display());
        let stats = exporter.run(overrides.mode(), &sink).await?;

        self.output_message(&json!({
            "type": "STATS",
            "output": path.display().to_string(),
            "stats": stats,
        }))
    }

    /// Print the partition plan
    fn intervals(&self) -> Result<()> {
        let def = self.load_definition()?;

        for interval in plan_intervals(&def) {
            self.output_message(&json!({
                "type": "INTERVAL",
                "from": interval.from,
                "to": interval.to,
                "span_ms": interval.span(),
            }))?;
        }
        Ok(())
    }

    fn output_message(&self, msg: &Value) -> Result<()> {
        let text = match self.cli.format {
            OutputFormat::Json => serde_json::to_string(msg)?,
            OutputFormat::Pretty => serde_json::to_string_pretty(msg)?,
        };
        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "{text}")?;
        Ok(())
    }
}

/// Exporter over the Datadog client with the definition's rate limit
pub fn build_exporter(
    def: &ExportDefinition,
    filter: FilterSpec,
    config: ExportConfig,
) -> Result<Exporter> {
    let client = LogsClient::new(def.credentials())?;
    let mut exporter =
        Exporter::new(Arc::new(client), def.spec.mapping.clone(), filter).with_config(config);
    if let Some(limit) = def.rate_limit() {
        exporter = exporter.with_rate_limiter(RateLimiter::new(&limit));
    }
    Ok(exporter)
}

/// Partition plan for the definition's configured range
fn plan_intervals(def: &ExportDefinition) -> Vec<Interval> {
    let filter = &def.spec.filter;
    IntervalPartitioner::new(def.export_config().partition).split(filter.from, filter.to)
}

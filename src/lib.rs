// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # dd-export
//!
//! Export time-ranged Datadog logs into CSV files through a declarative
//! field mapping.
//!
//! ## Features
//!
//! - **Field mapping**: dotted-path columns with deep search through nested arrays
//! - **Array expansion**: one column per array element, optionally pinned to a fixed width
//! - **Cursor pagination**: follows continuation tokens until the range is exhausted
//! - **Parallel fetch**: time range split into partitions fetched concurrently
//! - **Shared rate limiting**: one request budget across every worker
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use dd_export::engine::{ExportMode, Exporter};
//! use dd_export::http::{Credentials, LogsClient};
//! use dd_export::mapping::MappingRule;
//! use dd_export::output::CsvSink;
//! use dd_export::{FilterSpec, Result};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let client = LogsClient::new(Credentials::new("datadoghq.com", "api", "app"))?;
//!     let exporter = Exporter::new(
//!         Arc::new(client),
//!         vec![MappingRule::scalar("user_id", "usr.id")],
//!         FilterSpec::new("service:checkout", 1_700_000_000_000, 1_700_003_600_000),
//!     );
//!
//!     let sink = CsvSink::create("checkout.csv")?;
//!     let stats = exporter.run(ExportMode::Parallel, &sink).await?;
//!     println!("{} rows", stats.rows_written);
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                    Exporter (engine)                         │
//! │  run_sequential()   run_parallel()   validate()              │
//! └──────────────────────────────────────────────────────────────┘
//!                               │
//! ┌───────────┬─────────────────┼───────────────┬────────────────┐
//! │ Partition │   Pagination    │     HTTP      │    Mapping     │
//! ├───────────┼─────────────────┼───────────────┼────────────────┤
//! │ Intervals │ CursorLoop      │ LogsClient    │ Resolver       │
//! │           │ PageSource      │ RateLimiter   │ Projector      │
//! └───────────┴─────────────────┴───────────────┴────────────────┘
//!                               │
//!                      Output: CsvSink / MemorySink
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// Field mapping and record projection
pub mod mapping;

/// Time range partitioning
pub mod partition;

/// Page sources and the cursor fetch loop
pub mod pagination;

/// Datadog Logs client and rate limiting
pub mod http;

/// CSV and in-memory sinks
pub mod output;

/// Sequential and parallel export orchestration
pub mod engine;

/// YAML loader for export definitions
pub mod loader;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

// Re-export commonly used types
pub use engine::{ExportConfig, ExportMode, ExportStats, Exporter};
pub use loader::{load_definition, load_definition_from_str, ExportDefinition};
pub use mapping::{MappingRule, RecordProjector};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");

//! Report model compiler.
//!
//! Turns a test result tree into the compact model read by the log and
//! report viewer: positional tuples whose text lives in deduplicated string
//! tables, timestamps as offsets from a shared epoch, optional lazily loaded
//! chunks for keyword subtrees, and pass/fail statistics.

pub mod builder;
pub mod config;
pub mod criticality;
pub mod encoding;
pub mod errors;
pub mod html;
pub mod model;
pub mod pattern;
pub mod result;
pub mod splitter;
pub mod stats;
pub mod strings;

// Convenience re-exports
pub use builder::{BuiltModel, ModelBuilder};
pub use config::{load_config, parse_config, BuildConfig, CombinedTagSpec, TagDoc, TagLink};
pub use errors::{ConfigError, DecodeError, ModelError, ModelResult};
pub use model::{CompiledModel, ModelValue, SplitChunk};
pub use result::{
    read_suite, read_suite_file, Keyword, KeywordType, LogLevel, Message, Status, TestCase,
    TestSuite,
};
pub use stats::{StatRecord, StatisticsBuilder, StatisticsModel};
pub use strings::{decode_entry, StringCache, StringIndex, StringTable};

/// Compile `root` into the viewer model.
///
/// Configuration errors are returned before anything is built; malformed
/// result data (missing or unparsable times, empty fields) never fails.
pub fn compile(root: &TestSuite, config: &BuildConfig) -> Result<CompiledModel, ConfigError> {
    let builder = ModelBuilder::new(config)?;
    let statistics = StatisticsBuilder::new(config)?;

    let built = builder.build(root);
    let statistics = statistics.build(root);
    tracing::info!(
        suite = %root.name,
        strings = built.strings.len(),
        chunks = built.split_chunks.len(),
        split = config.split_log,
        "compiled report model"
    );

    Ok(CompiledModel {
        root_model: built.model,
        root_strings: built.strings,
        split_chunks: built.split_chunks,
        statistics,
    })
}

//! Conversion of the result tree into positional model tuples.
//!
//! Tuple layouts (`status` is `(status, start, elapsed[, message])`):
//!
//! ```text
//! suite:   (name, source, relsource, doc, metadata, status,
//!           suites, tests, keywords, (total, passed, critical, critical passed))
//! test:    (name, doc, tags, critical, timeout, status, keywords)
//! keyword: (type, name, doc, args, timeout, status, keywords, messages)
//! message: (timestamp, level, text)
//! ```
//!
//! With splitting enabled, the `keywords` slot of every test and of every
//! suite-level keyword holds a chunk placeholder instead.

use crate::config::BuildConfig;
use crate::criticality::Criticality;
use crate::encoding::{keyword_type_code, level_code, status_group, TimestampEncoder};
use crate::errors::ConfigError;
use crate::html::{html_escape, html_format};
use crate::model::{ModelValue, SplitChunk};
use crate::result::{Keyword, Message, Status, TestCase, TestSuite};
use crate::splitter::Splitter;
use crate::stats::SuiteCounts;
use crate::strings::{StringCache, StringIndex};
use std::path::{Path, PathBuf};

/// Output of one [`ModelBuilder::build`] call.
#[derive(Debug, Clone)]
pub struct BuiltModel {
    pub model: ModelValue,
    pub strings: Vec<String>,
    pub split_chunks: Vec<SplitChunk>,
}

#[derive(Debug)]
pub struct ModelBuilder {
    strings: StringCache,
    timestamps: TimestampEncoder,
    splitter: Splitter,
    criticality: Criticality,
    compress_threshold: usize,
    compress_margin: f64,
    log_dir: Option<PathBuf>,
}

impl ModelBuilder {
    pub fn new(config: &BuildConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            strings: StringCache::with_compression(
                config.compress_threshold,
                config.compress_margin,
            ),
            timestamps: TimestampEncoder::new(),
            splitter: Splitter::new(config.split_log),
            criticality: config.criticality(),
            compress_threshold: config.compress_threshold,
            compress_margin: config.compress_margin,
            log_dir: config
                .log_path
                .as_deref()
                .and_then(Path::parent)
                .map(Path::to_path_buf),
        })
    }

    /// Build the whole document. Consumes the builder: its string cache and
    /// chunks belong to this one tree.
    pub fn build(mut self, root: &TestSuite) -> BuiltModel {
        let (model, counts) = self.build_suite(root);
        let strings = self.strings.dump();
        let split_chunks = self.splitter.into_chunks();
        tracing::debug!(
            strings = strings.len(),
            chunks = split_chunks.len(),
            tests = counts.all.total(),
            "built log model"
        );
        BuiltModel {
            model,
            strings,
            split_chunks,
        }
    }

    fn build_suite(&mut self, suite: &TestSuite) -> (ModelValue, SuiteCounts) {
        let name = self.text(&suite.name);
        let source = self.text(&suite.source);
        let relsource = self.text(&self.relative_source(&suite.source));
        let doc = self.formatted(&suite.doc);
        let mut metadata = Vec::with_capacity(suite.metadata.len() * 2);
        for (key, value) in &suite.metadata {
            metadata.push(ModelValue::Text(self.text(key)));
            metadata.push(ModelValue::Text(self.formatted(value)));
        }
        let start = self.timestamps.encode(suite.starttime.as_deref());
        let message = self.text(&suite.message);

        let mut counts = SuiteCounts::default();
        let mut suites = Vec::with_capacity(suite.suites.len());
        for child in &suite.suites {
            let (model, child_counts) = self.build_suite(child);
            counts.merge(child_counts);
            suites.push(model);
        }
        let mut tests = Vec::with_capacity(suite.tests.len());
        for test in &suite.tests {
            let critical = self.criticality.test_is_critical(test);
            counts.record(test, critical);
            tests.push(self.build_test(test, critical));
        }
        let keywords = suite
            .keywords
            .iter()
            .map(|kw| self.build_keyword(kw, true))
            .collect::<Vec<_>>();

        let status = if counts.critical.failed > 0 {
            Status::Fail
        } else {
            Status::Pass
        };
        let stats = ModelValue::Tuple(vec![
            ModelValue::Int(counts.all.total() as i64),
            ModelValue::Int(counts.all.passed as i64),
            ModelValue::Int(counts.critical.total() as i64),
            ModelValue::Int(counts.critical.passed as i64),
        ]);

        let model = ModelValue::Tuple(vec![
            name.into(),
            source.into(),
            relsource.into(),
            doc.into(),
            metadata.into(),
            status_group(status, start, suite.elapsed_ms(), message),
            suites.into(),
            tests.into(),
            keywords.into(),
            stats,
        ]);
        (model, counts)
    }

    fn build_test(&mut self, test: &TestCase, critical: bool) -> ModelValue {
        let name = self.text(&test.name);
        let doc = self.formatted(&test.doc);
        let tags: ModelValue = test
            .tags
            .iter()
            .map(|tag| ModelValue::Text(self.text(tag)))
            .collect();
        let timeout = self.text(&test.timeout);
        let start = self.timestamps.encode(test.starttime.as_deref());
        let message = self.text(&test.message);
        let keywords = self.maybe_split(|builder| builder.build_keywords(&test.keywords));

        ModelValue::Tuple(vec![
            name.into(),
            doc.into(),
            tags,
            critical.into(),
            timeout.into(),
            status_group(test.status, start, test.elapsed_ms(), message),
            keywords,
        ])
    }

    /// `split_children` is set for suite-level keywords, whose child keywords
    /// may go to a chunk.
    fn build_keyword(&mut self, kw: &Keyword, split_children: bool) -> ModelValue {
        let kw_type = ModelValue::Int(keyword_type_code(kw.kw_type));
        let name = self.text(&kw.name);
        let doc = self.formatted(&kw.doc);
        let args = self.text(&kw.args.join(", "));
        let timeout = self.text(&kw.timeout);
        let start = self.timestamps.encode(kw.starttime.as_deref());
        let keywords = if split_children {
            self.maybe_split(|builder| builder.build_keywords(&kw.keywords))
        } else {
            self.build_keywords(&kw.keywords)
        };
        let messages: ModelValue = kw.messages.iter().map(|m| self.build_message(m)).collect();

        ModelValue::Tuple(vec![
            kw_type,
            name.into(),
            doc.into(),
            args.into(),
            timeout.into(),
            status_group(kw.status, start, kw.elapsed_ms(), StringIndex::EMPTY),
            keywords,
            messages,
        ])
    }

    fn build_keywords(&mut self, keywords: &[Keyword]) -> ModelValue {
        keywords
            .iter()
            .map(|kw| self.build_keyword(kw, false))
            .collect()
    }

    fn build_message(&mut self, msg: &Message) -> ModelValue {
        let timestamp = self.timestamps.encode(msg.timestamp.as_deref());
        let text = if msg.html {
            self.strings.add(&msg.message)
        } else {
            self.text(&msg.message)
        };
        ModelValue::Tuple(vec![
            timestamp.into(),
            ModelValue::Int(level_code(msg.level)),
            text.into(),
        ])
    }

    /// Build a subtree either inline or, when the splitter asks for it, into
    /// a fresh string cache that becomes a chunk.
    fn maybe_split<F>(&mut self, build: F) -> ModelValue
    where
        F: FnOnce(&mut Self) -> ModelValue,
    {
        if !self.splitter.should_split() {
            return build(self);
        }
        let chunk_cache =
            StringCache::with_compression(self.compress_threshold, self.compress_margin);
        let parent_cache = std::mem::replace(&mut self.strings, chunk_cache);
        self.splitter.begin();
        let model = build(self);
        let chunk_strings = std::mem::replace(&mut self.strings, parent_cache).dump();
        self.splitter.finish(model, chunk_strings)
    }

    fn text(&mut self, text: &str) -> StringIndex {
        if text.is_empty() {
            return StringIndex::EMPTY;
        }
        self.strings.add(&html_escape(text))
    }

    fn formatted(&mut self, text: &str) -> StringIndex {
        if text.is_empty() {
            return StringIndex::EMPTY;
        }
        self.strings.add(&html_format(text))
    }

    /// Source path relative to the log directory, or empty when there is no
    /// log path or the source does not exist.
    fn relative_source(&self, source: &str) -> String {
        let Some(log_dir) = &self.log_dir else {
            return String::new();
        };
        let path = Path::new(source);
        if source.is_empty() || !path.exists() {
            return String::new();
        }
        pathdiff::diff_paths(path, log_dir)
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

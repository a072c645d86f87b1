//! Build configuration.
//!
//! Every setting is optional. The configuration is usually assembled by the
//! calling tool, but can also be read from YAML:
//!
//! ```yaml
//! split_log: true
//! log_path: out/log.html
//! suite_stat_level: 2
//! critical_tags: [smoke]
//! combined_tags:
//!   - pattern: smoke&regression
//!     name: Smoke regression
//! tag_docs:
//!   - pattern: smoke
//!     doc: Quick checks run on every commit
//! tag_links:
//!   - pattern: bug-*
//!     link: http://tracker/%1
//!     title: Bug %1
//! ```

use crate::criticality::Criticality;
use crate::errors::ConfigError;
use crate::strings::{DEFAULT_COMPRESS_MARGIN, DEFAULT_COMPRESS_THRESHOLD};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuildConfig {
    /// Extract keyword subtrees into separately loadable chunks.
    pub split_log: bool,
    /// Location of the log file; suite sources are made relative to its directory.
    pub log_path: Option<PathBuf>,
    pub compress_threshold: usize,
    pub compress_margin: f64,
    /// Deepest suite level with its own statistics record; 0 means all.
    pub suite_stat_level: usize,
    pub critical_tags: Vec<String>,
    pub non_critical_tags: Vec<String>,
    pub combined_tags: Vec<CombinedTagSpec>,
    pub tag_docs: Vec<TagDoc>,
    pub tag_links: Vec<TagLink>,
    pub tag_stat_include: Vec<String>,
    pub tag_stat_exclude: Vec<String>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            split_log: false,
            log_path: None,
            compress_threshold: DEFAULT_COMPRESS_THRESHOLD,
            compress_margin: DEFAULT_COMPRESS_MARGIN,
            suite_stat_level: 0,
            critical_tags: Vec::new(),
            non_critical_tags: Vec::new(),
            combined_tags: Vec::new(),
            tag_docs: Vec::new(),
            tag_links: Vec::new(),
            tag_stat_include: Vec::new(),
            tag_stat_exclude: Vec::new(),
        }
    }
}

/// `A&B` (optionally `A&BNOTC`) statistics over tests carrying all parts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombinedTagSpec {
    pub pattern: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagDoc {
    pub pattern: String,
    pub doc: String,
}

/// Link attached to matching tags; `%N` in `link`/`title` is replaced by
/// the Nth wildcard match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagLink {
    pub pattern: String,
    pub link: String,
    pub title: String,
}

impl BuildConfig {
    pub fn with_split_log(mut self, split_log: bool) -> Self {
        self.split_log = split_log;
        self
    }

    pub fn with_critical_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.critical_tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn criticality(&self) -> Criticality {
        Criticality::new(&self.critical_tags, &self.non_critical_tags)
    }

    /// Reject settings that cannot produce a meaningful model.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.compress_margin.is_finite() && self.compress_margin > 0.0) {
            return Err(ConfigError::invalid(
                "compress_margin",
                format!("must be a positive number, got {}", self.compress_margin),
            ));
        }
        for (i, spec) in self.combined_tags.iter().enumerate() {
            let parts_ok = !spec.pattern.trim().is_empty()
                && spec
                    .pattern
                    .split("NOT")
                    .flat_map(|part| part.split('&'))
                    .all(|part| !part.trim().is_empty());
            if !parts_ok {
                return Err(ConfigError::invalid(
                    format!("combined_tags[{}].pattern", i),
                    format!("'{}' has an empty tag part", spec.pattern),
                ));
            }
        }
        for (i, doc) in self.tag_docs.iter().enumerate() {
            if doc.pattern.trim().is_empty() {
                return Err(ConfigError::invalid(
                    format!("tag_docs[{}].pattern", i),
                    "must not be empty",
                ));
            }
        }
        for (i, link) in self.tag_links.iter().enumerate() {
            if link.pattern.trim().is_empty() {
                return Err(ConfigError::invalid(
                    format!("tag_links[{}].pattern", i),
                    "must not be empty",
                ));
            }
            if link.link.trim().is_empty() {
                return Err(ConfigError::invalid(
                    format!("tag_links[{}].link", i),
                    "must not be empty",
                ));
            }
        }
        Ok(())
    }
}

pub fn load_config(path: &Path) -> Result<BuildConfig, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config = parse_config(&raw)?;
    tracing::debug!(path = %path.display(), "loaded build config");
    Ok(config)
}

pub fn parse_config(raw: &str) -> Result<BuildConfig, ConfigError> {
    let config: BuildConfig = if raw.trim().is_empty() {
        BuildConfig::default()
    } else {
        serde_yaml::from_str(raw)?
    };
    config.validate()?;
    Ok(config)
}

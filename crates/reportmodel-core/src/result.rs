//! Result tree consumed by the compiler.
//!
//! The tree is produced by test execution and is only ever read here. Every
//! field is optional in the serialized form; missing values deserialize to
//! empty strings, empty collections, `FAIL` statuses and unknown times.

use crate::encoding::elapsed_ms;
use crate::errors::{ModelError, ModelResult};
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::Path;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    #[default]
    Fail,
    Pass,
    NotRun,
}

impl Status {
    pub fn is_passed(self) -> bool {
        self == Status::Pass
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeywordType {
    #[default]
    #[serde(alias = "kw")]
    Keyword,
    Setup,
    Teardown,
    For,
    #[serde(alias = "for_item")]
    ForItem,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
    Fail,
}

/// A single log message emitted by a keyword.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Message {
    pub message: String,
    pub level: LogLevel,
    /// Message text is already HTML and must not be escaped.
    pub html: bool,
    pub timestamp: Option<String>,
}

impl Message {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Self::default()
        }
    }

    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    pub fn with_timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.timestamp = Some(timestamp.into());
        self
    }

    pub fn html(mut self) -> Self {
        self.html = true;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Keyword {
    pub name: String,
    pub doc: String,
    pub args: Vec<String>,
    #[serde(rename = "type")]
    pub kw_type: KeywordType,
    pub timeout: String,
    pub status: Status,
    pub starttime: Option<String>,
    pub endtime: Option<String>,
    pub keywords: Vec<Keyword>,
    pub messages: Vec<Message>,
}

impl Keyword {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_type(mut self, kw_type: KeywordType) -> Self {
        self.kw_type = kw_type;
        self
    }

    pub fn with_status(mut self, status: Status) -> Self {
        self.status = status;
        self
    }

    pub fn with_times(mut self, start: impl Into<String>, end: impl Into<String>) -> Self {
        self.starttime = Some(start.into());
        self.endtime = Some(end.into());
        self
    }

    pub fn elapsed_ms(&self) -> i64 {
        elapsed_ms(self.starttime.as_deref(), self.endtime.as_deref())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TestCase {
    pub name: String,
    pub doc: String,
    pub tags: Vec<String>,
    pub timeout: String,
    pub status: Status,
    pub message: String,
    pub starttime: Option<String>,
    pub endtime: Option<String>,
    pub keywords: Vec<Keyword>,
}

impl TestCase {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_status(mut self, status: Status) -> Self {
        self.status = status;
        self
    }

    pub fn with_times(mut self, start: impl Into<String>, end: impl Into<String>) -> Self {
        self.starttime = Some(start.into());
        self.endtime = Some(end.into());
        self
    }

    pub fn passed(&self) -> bool {
        self.status.is_passed()
    }

    pub fn elapsed_ms(&self) -> i64 {
        elapsed_ms(self.starttime.as_deref(), self.endtime.as_deref())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TestSuite {
    pub name: String,
    pub source: String,
    pub doc: String,
    /// Ordered `(name, value)` pairs.
    pub metadata: Vec<(String, String)>,
    pub message: String,
    pub starttime: Option<String>,
    pub endtime: Option<String>,
    pub suites: Vec<TestSuite>,
    pub tests: Vec<TestCase>,
    pub keywords: Vec<Keyword>,
}

impl TestSuite {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_times(mut self, start: impl Into<String>, end: impl Into<String>) -> Self {
        self.starttime = Some(start.into());
        self.endtime = Some(end.into());
        self
    }

    pub fn elapsed_ms(&self) -> i64 {
        elapsed_ms(self.starttime.as_deref(), self.endtime.as_deref())
    }

    /// All tests of this suite and its descendants, depth-first.
    pub fn all_tests(&self) -> Box<dyn Iterator<Item = &TestCase> + '_> {
        Box::new(
            self.tests
                .iter()
                .chain(self.suites.iter().flat_map(|suite| suite.all_tests())),
        )
    }
}

/// Deserialize a result tree from JSON.
pub fn read_suite<R: Read>(reader: R) -> ModelResult<TestSuite> {
    Ok(serde_json::from_reader(reader)?)
}

pub fn read_suite_file(path: &Path) -> ModelResult<TestSuite> {
    let file = std::fs::File::open(path).map_err(|source| ModelError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    read_suite(std::io::BufReader::new(file))
}

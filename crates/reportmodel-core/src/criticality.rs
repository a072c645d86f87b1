//! Which tests count as critical.

use crate::pattern::TagPatterns;
use crate::result::TestCase;

#[derive(Debug, Clone, Default)]
pub struct Criticality {
    critical: TagPatterns,
    non_critical: TagPatterns,
}

impl Criticality {
    pub fn new<S: AsRef<str>>(critical_tags: &[S], non_critical_tags: &[S]) -> Self {
        Self {
            critical: TagPatterns::new(critical_tags),
            non_critical: TagPatterns::new(non_critical_tags),
        }
    }

    /// With no critical tags configured every test is critical unless it
    /// carries a non-critical tag.
    pub fn test_is_critical(&self, test: &TestCase) -> bool {
        if self.non_critical.matches_any(&test.tags) {
            return false;
        }
        self.critical.is_empty() || self.critical.matches_any(&test.tags)
    }

    pub fn tag_is_critical(&self, tag: &str) -> bool {
        self.critical.matches(tag)
    }

    pub fn tag_is_non_critical(&self, tag: &str) -> bool {
        self.non_critical.matches(tag)
    }
}

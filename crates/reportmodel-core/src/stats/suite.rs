use super::{Counts, StatRecord};
use crate::result::TestSuite;

/// One record per suite down to `level` (0 = no limit). Counts always cover
/// every descendant test.
pub(super) fn suite_stats(root: &TestSuite, level: usize) -> Vec<StatRecord> {
    let mut records = Vec::new();
    visit(root, None, "s1".to_string(), 1, level, &mut records);
    records
}

fn visit(
    suite: &TestSuite,
    parent_longname: Option<&str>,
    id: String,
    depth: usize,
    level: usize,
    records: &mut Vec<StatRecord>,
) {
    if level != 0 && depth > level {
        return;
    }
    let longname = match parent_longname {
        Some(parent) => format!("{}.{}", parent, suite.name),
        None => suite.name.clone(),
    };

    let mut counts = Counts::default();
    for test in suite.all_tests() {
        counts.record(test);
    }
    let mut record = StatRecord::new(longname.clone(), counts);
    record.name = suite.name.clone();
    record.id = id.clone();
    records.push(record);

    for (i, child) in suite.suites.iter().enumerate() {
        visit(
            child,
            Some(&longname),
            format!("{}-s{}", id, i + 1),
            depth + 1,
            level,
            records,
        );
    }
}

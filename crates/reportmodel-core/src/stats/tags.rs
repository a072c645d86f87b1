use super::{Counts, StatRecord};
use crate::config::{BuildConfig, CombinedTagSpec};
use crate::criticality::Criticality;
use crate::html::html_format;
use crate::pattern::{normalize, substitute_groups, CapturePattern, TagPattern, TagPatterns};
use crate::result::{TestCase, TestSuite};
use std::collections::{BTreeMap, HashSet};

/// Tag combination such as `smoke&regression` or `smokeNOTflaky`.
#[derive(Debug, Clone)]
pub struct CombinedTag {
    pattern: String,
    label: String,
    required: Vec<TagPattern>,
    excluded: Vec<TagPattern>,
}

impl CombinedTag {
    pub fn new(spec: &CombinedTagSpec) -> Self {
        let mut parts = spec.pattern.split("NOT");
        let required = parts
            .next()
            .unwrap_or_default()
            .split('&')
            .map(|p| TagPattern::new(p.trim()))
            .collect();
        let excluded = parts
            .flat_map(|part| part.split('&'))
            .map(|p| TagPattern::new(p.trim()))
            .collect();
        Self {
            pattern: spec.pattern.clone(),
            label: spec.name.clone().unwrap_or_else(|| spec.pattern.clone()),
            required,
            excluded,
        }
    }

    pub fn matches(&self, tags: &[String]) -> bool {
        let has = |pattern: &TagPattern| tags.iter().any(|tag| pattern.matches(tag));
        self.required.iter().all(has) && !self.excluded.iter().any(has)
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

#[derive(Debug, Clone)]
struct LinkTemplate {
    pattern: CapturePattern,
    link: String,
    title: String,
}

#[derive(Debug, Clone)]
pub(super) struct TagStatisticsBuilder {
    include: TagPatterns,
    exclude: TagPatterns,
    docs: Vec<(TagPattern, String)>,
    links: Vec<LinkTemplate>,
    combined: Vec<CombinedTag>,
}

struct TagCounts {
    label: String,
    counts: Counts,
}

impl TagStatisticsBuilder {
    pub(super) fn new(config: &BuildConfig) -> Self {
        Self {
            include: TagPatterns::new(&config.tag_stat_include),
            exclude: TagPatterns::new(&config.tag_stat_exclude),
            docs: config
                .tag_docs
                .iter()
                .map(|d| (TagPattern::new(&d.pattern), d.doc.clone()))
                .collect(),
            links: config
                .tag_links
                .iter()
                .map(|l| LinkTemplate {
                    pattern: CapturePattern::new(&l.pattern),
                    link: l.link.clone(),
                    title: l.title.clone(),
                })
                .collect(),
            combined: config.combined_tags.iter().map(CombinedTag::new).collect(),
        }
    }

    /// Records ordered critical, non-critical, combined (configured order),
    /// then the rest by normalized name.
    pub(super) fn build(&self, root: &TestSuite, criticality: &Criticality) -> Vec<StatRecord> {
        let mut by_tag: BTreeMap<String, TagCounts> = BTreeMap::new();
        let mut combined = vec![Counts::default(); self.combined.len()];

        for test in root.all_tests() {
            self.count_tags(test, &mut by_tag);
            for (counts, comb) in combined.iter_mut().zip(&self.combined) {
                if comb.matches(&test.tags) {
                    counts.record(test);
                }
            }
        }

        let mut critical = Vec::new();
        let mut non_critical = Vec::new();
        let mut plain = Vec::new();
        for tag in by_tag.into_values() {
            let mut record = self.annotate(StatRecord::new(&tag.label, tag.counts));
            if criticality.tag_is_critical(&tag.label) {
                record.info = "critical".into();
                critical.push(record);
            } else if criticality.tag_is_non_critical(&tag.label) {
                record.info = "non-critical".into();
                non_critical.push(record);
            } else {
                plain.push(record);
            }
        }

        let combined = self
            .combined
            .iter()
            .zip(combined)
            .map(|(comb, counts)| {
                let mut record = self.annotate(StatRecord::new(comb.label(), counts));
                record.info = "combined".into();
                record.combined = comb.pattern.clone();
                record
            })
            .collect::<Vec<_>>();

        critical
            .into_iter()
            .chain(non_critical)
            .chain(combined)
            .chain(plain)
            .collect()
    }

    fn count_tags(&self, test: &TestCase, by_tag: &mut BTreeMap<String, TagCounts>) {
        let mut seen = HashSet::new();
        for tag in &test.tags {
            let key = normalize(tag);
            if key.is_empty() || !seen.insert(key.clone()) || !self.is_included(tag) {
                continue;
            }
            by_tag
                .entry(key)
                .or_insert_with(|| TagCounts {
                    label: tag.clone(),
                    counts: Counts::default(),
                })
                .counts
                .record(test);
        }
    }

    fn is_included(&self, tag: &str) -> bool {
        (self.include.is_empty() || self.include.matches(tag)) && !self.exclude.matches(tag)
    }

    fn annotate(&self, mut record: StatRecord) -> StatRecord {
        let docs: Vec<String> = self
            .docs
            .iter()
            .filter(|(pattern, _)| pattern.matches(&record.label))
            .map(|(_, doc)| html_format(doc))
            .collect();
        record.doc = docs.join(" &amp; ");

        let links: Vec<String> = self
            .links
            .iter()
            .filter_map(|template| {
                let groups = template.pattern.captures(&record.label)?;
                Some(format!(
                    "{}:{}",
                    substitute_groups(&template.title, &groups),
                    substitute_groups(&template.link, &groups)
                ))
            })
            .collect();
        record.links = links.join(":::");
        record
    }
}

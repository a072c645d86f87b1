use reportmodel_core::{
    compile, BuildConfig, CombinedTagSpec, StatRecord, Status, TagDoc, TagLink, TestCase,
    TestSuite,
};

fn record(label: &str, pass: usize, fail: usize) -> StatRecord {
    StatRecord {
        label: label.into(),
        pass,
        fail,
        ..StatRecord::default()
    }
}

fn suite() -> TestSuite {
    let mut sub1 = TestSuite::new("sub1");
    sub1.tests = vec![
        TestCase::default().with_tags(["t1", "t2"]).with_status(Status::Pass),
        TestCase::default().with_tags(["t1"]).with_status(Status::Fail),
    ];
    let mut below = TestSuite::new("below suite stat level");
    below.tests = vec![TestCase::default().with_tags(["t1"]).with_status(Status::Fail)];
    let mut sub2 = TestSuite::new("sub2");
    sub2.tests = vec![TestCase::default().with_tags(["t1", "t2"]).with_status(Status::Pass)];
    sub2.suites = vec![below];

    let mut root = TestSuite::new("root");
    root.suites = vec![sub1, sub2];
    root
}

fn config() -> BuildConfig {
    let mut config = BuildConfig::default().with_critical_tags(["t2"]);
    config.suite_stat_level = 2;
    config.combined_tags = vec![CombinedTagSpec {
        pattern: "t1&t2".into(),
        name: Some("name".into()),
    }];
    config.tag_docs = vec![TagDoc {
        pattern: "t2".into(),
        doc: "doc".into(),
    }];
    config.tag_links = vec![TagLink {
        pattern: "?2".into(),
        link: "url".into(),
        title: "%1".into(),
    }];
    config
}

#[test]
fn test_total_stats() {
    let stats = compile(&suite(), &config()).unwrap().statistics;
    assert_eq!(stats.total, vec![record("Critical Tests", 2, 0), record("All Tests", 2, 2)]);
}

#[test]
fn test_tag_stats() {
    let stats = compile(&suite(), &config()).unwrap().statistics;
    let t2 = StatRecord {
        info: "critical".into(),
        doc: "doc".into(),
        links: "t:url".into(),
        ..record("t2", 2, 0)
    };
    let comb = StatRecord {
        info: "combined".into(),
        combined: "t1&t2".into(),
        ..record("name", 2, 0)
    };
    assert_eq!(stats.tag, vec![t2, comb, record("t1", 2, 2)]);
}

#[test]
fn test_suite_stats() {
    let stats = compile(&suite(), &config()).unwrap().statistics;
    let suite_record = |label: &str, pass, fail, name: &str, id: &str| StatRecord {
        name: name.into(),
        id: id.into(),
        ..record(label, pass, fail)
    };
    assert_eq!(
        stats.suite,
        vec![
            suite_record("root", 2, 2, "root", "s1"),
            suite_record("root.sub1", 1, 1, "sub1", "s1-s1"),
            suite_record("root.sub2", 1, 1, "sub2", "s1-s2"),
        ]
    );
}

#[test]
fn test_suite_model_stats_match_totals() {
    let compiled = compile(&suite(), &config()).unwrap();
    let stats = compiled.root_model.get(9).and_then(|v| v.as_tuple()).unwrap();
    let counts: Vec<_> = stats.iter().map(|v| v.as_int().unwrap()).collect();
    assert_eq!(counts, vec![4, 2, 2, 2]);
    // All critical tests passed.
    let status = compiled.root_model.get(5).and_then(|v| v.get(0)).and_then(|v| v.as_int());
    assert_eq!(status, Some(1));
}

#[test]
fn test_statistics_serialize_without_empty_attributes() {
    let stats = compile(&suite(), &config()).unwrap().statistics;
    let value = serde_json::to_value(&stats).unwrap();
    assert_eq!(value["total"][0], serde_json::json!({"label": "Critical Tests", "pass": 2, "fail": 0}));
    assert_eq!(
        value["tag"][0],
        serde_json::json!({
            "label": "t2", "pass": 2, "fail": 0,
            "info": "critical", "doc": "doc", "links": "t:url"
        })
    );
    assert_eq!(value["suite"][1]["id"], "s1-s1");
}

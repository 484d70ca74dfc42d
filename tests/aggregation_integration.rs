//! End-to-end collection from a settings file through a mocked executor

use serde_json::json;
use sitreps::config::load_layered_with;
use sitreps::executor::{ExecutorError, QueryExecutor, QueryResult, RetryPolicy, RetryingExecutor};
use sitreps::metrics::{AggregatorOptions, FailureKind, MetricValue, MetricsAggregator};
use sitreps::query::{resolve, FilterRegistry, Params};
use sitreps::testing::fixtures::{SAMPLE_OVERRIDE_YAML, SAMPLE_SETTINGS_YAML};
use sitreps::testing::mocks::MockQueryExecutor;
use sitreps::testing::TestContext;
use std::sync::Arc;
use std::time::Duration;

const BASE: &str = r#"project = "{project}" AND type = {type}"#;

fn params(pairs: &[(&str, &str)]) -> Params {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[test]
fn test_resolve_scenario() {
    let query = resolve(
        BASE,
        &params(&[("project", "FOO"), ("type", "Bug")]),
        Some("resolution = Unresolved"),
    )
    .unwrap();

    assert_eq!(
        query.as_str(),
        r#"(project = "FOO" AND type = Bug) AND (resolution = Unresolved)"#
    );
}

#[tokio::test(start_paused = true)]
async fn test_collect_service_from_layered_settings() {
    let ctx = TestContext::new().unwrap();
    let defaults = ctx.write_file("settings.yaml", SAMPLE_SETTINGS_YAML).unwrap();
    let project = ctx.write_file("project.yaml", SAMPLE_OVERRIDE_YAML).unwrap();
    let settings = load_layered_with(&defaults, Some(project.as_path()), |_| None).unwrap();

    let q = |fragment: &str| format!(r#"(project = "BAR" AND type = Bug) AND ({fragment})"#);
    let mock = Arc::new(
        MockQueryExecutor::builder()
            .named("jira")
            .with_count(&q("resolution != Unresolved"), 40)
            .with_count(&q("resolution = Unresolved"), 0)
            .with_sequence(
                &q("priority = Blocker AND resolution = Unresolved"),
                vec![
                    Err(ExecutorError::TransientService("503".into())),
                    Ok(QueryResult::Items(vec![json!({"key": "BAR-7"})])),
                ],
            )
            .with_error(
                &q("priority = Critical"),
                ExecutorError::InvalidQuery("field 'priority' does not exist".into()),
            )
            .build(),
    );
    let executor: Arc<dyn QueryExecutor> =
        Arc::new(RetryingExecutor::new(mock.clone(), RetryPolicy::default()));

    let registry = Arc::new(FilterRegistry::from_settings(&settings.jira).unwrap());
    let aggregator = MetricsAggregator::new(
        registry,
        executor,
        AggregatorOptions::from_settings(&settings),
    );

    let snapshot = aggregator
        .collect_service("jira", &settings.jira, &settings.params)
        .await
        .unwrap();

    assert_eq!(
        snapshot.names().collect::<Vec<_>>(),
        vec!["resolved", "unresolved", "blocker", "critical"]
    );
    assert_eq!(snapshot.get("resolved").and_then(MetricValue::count), Some(40));
    assert_eq!(snapshot.get("unresolved"), Some(&MetricValue::Count { count: 0 }));
    assert_eq!(snapshot.get("blocker").and_then(MetricValue::count), Some(1));
    assert_eq!(
        snapshot.get("critical").and_then(MetricValue::failure_kind),
        Some(FailureKind::InvalidQuery)
    );
    // The blocker query is retried once after the transient failure
    assert_eq!(mock.call_count(), 5);
    assert!(mock.max_in_flight() <= settings.max_concurrency);

    let json = serde_json::to_value(&snapshot).unwrap();
    assert_eq!(json["metrics"]["unresolved"], json!({"status": "count", "count": 0}));
    assert_eq!(json["metrics"]["critical"]["status"], "failed");
    assert!(json["collected_at"].is_string());
}

#[tokio::test]
async fn test_unknown_filter_scenario() {
    let registry = Arc::new(
        FilterRegistry::from_definitions([sitreps::query::FilterDefinition::new(
            "resolved",
            "resolution != Unresolved",
        )])
        .unwrap(),
    );
    let executor = Arc::new(
        MockQueryExecutor::builder()
            .with_default(Ok(QueryResult::Count(3)))
            .build(),
    );
    let aggregator = MetricsAggregator::new(registry, executor, AggregatorOptions::default());

    let snapshot = aggregator
        .collect(
            BASE,
            &params(&[("project", "FOO"), ("type", "Bug")]),
            &["resolved", "missing_filter"],
        )
        .await
        .unwrap();

    assert_eq!(snapshot.get("resolved"), Some(&MetricValue::Count { count: 3 }));
    assert_eq!(
        snapshot.get("missing_filter").and_then(MetricValue::failure_kind),
        Some(FailureKind::UnknownFilter)
    );
}

#[tokio::test(start_paused = true)]
async fn test_slow_service_times_out_per_filter() {
    let registry = Arc::new(
        FilterRegistry::from_definitions([
            sitreps::query::FilterDefinition::new("a", "a = 1"),
            sitreps::query::FilterDefinition::new("b", "b = 1"),
        ])
        .unwrap(),
    );
    let executor = Arc::new(
        MockQueryExecutor::builder()
            .with_default(Ok(QueryResult::Count(1)))
            .with_default_delay(Duration::from_secs(30))
            .build(),
    );
    let aggregator = MetricsAggregator::new(
        registry,
        executor,
        AggregatorOptions {
            max_concurrency: 1,
            timeout: Some(Duration::from_secs(1)),
        },
    );

    let snapshot = aggregator
        .collect_all(BASE, &params(&[("project", "FOO"), ("type", "Bug")]))
        .await
        .unwrap();

    assert_eq!(snapshot.failures().count(), 2);
    assert!(snapshot
        .iter()
        .all(|(_, value)| value.failure_kind() == Some(FailureKind::Timeout)));
}

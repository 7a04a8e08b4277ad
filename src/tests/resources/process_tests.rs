use super::{create_test_client, mount_endpoint};
use crate::{
    MetricValue, PROCESS_SOURCE, ProcessClass, ProcessScanner, RegexProcessMatcher,
    RestartTracker, SCAN_STATUS_EVENT_KEY, Severity,
};
use serde_json::{Value, json};
use wiremock::MockServer;

fn processes(pids: &[u32]) -> Value {
    let entries: Vec<Value> = pids
        .iter()
        .map(|pid| {
            json!({
                "pid": pid,
                "name": "postgres",
                "exe": "/usr/lib/postgresql/16/bin/postgres",
                "cmd": "Unknown",
                "mem_rss": [64, "MiB"],
                "cpu_percent": [2.5, "%"]
            })
        })
        .collect();
    json!({ "processes": entries })
}

fn scanner() -> ProcessScanner {
    ProcessScanner::new(vec![
        ProcessClass::new("postgres", RegexProcessMatcher::new("postgres", None).unwrap())
            .alert_on_restart(true)
            .fail_severity(Severity::Critical),
        ProcessClass::new("redis", RegexProcessMatcher::new("redis-server", None).unwrap()),
    ])
}

#[tokio::test]
async fn test_scan_detects_restart_across_polls() {
    let scanner = scanner();
    let mut tracker = RestartTracker::new();

    let first = MockServer::start().await;
    mount_endpoint(&first, "processes", processes(&[100, 101])).await;
    let report = create_test_client(&first)
        .scan_processes(&scanner, &mut tracker)
        .await;

    assert_eq!(
        report.metrics.component_value(PROCESS_SOURCE, "postgres", "count"),
        Some(MetricValue::Int(2))
    );
    assert_eq!(
        report.metrics.component_value(PROCESS_SOURCE, "postgres", "mem"),
        Some(MetricValue::Int(128 * 1024 * 1024))
    );
    let redis = report
        .events
        .iter()
        .find(|event| event.component.as_deref() == Some("redis"))
        .unwrap();
    assert_eq!(redis.summary, "no matching processes running");
    assert_eq!(redis.severity, Severity::Error);

    let second = MockServer::start().await;
    mount_endpoint(&second, "processes", processes(&[200, 201])).await;
    let report = create_test_client(&second)
        .scan_processes(&scanner, &mut tracker)
        .await;

    let postgres = report
        .events
        .iter()
        .find(|event| event.component.as_deref() == Some("postgres"))
        .unwrap();
    assert_eq!(postgres.summary, "matching processes restarted");
    assert_eq!(postgres.severity, Severity::Critical);
    assert_eq!(
        report.events.last().unwrap().event_key.as_deref(),
        Some(SCAN_STATUS_EVENT_KEY)
    );
}

#[tokio::test]
async fn test_scan_unreachable_agent() {
    let mock_server = MockServer::start().await;
    let client = create_test_client(&mock_server);
    drop(mock_server);

    let report = client
        .scan_processes(&scanner(), &mut RestartTracker::new())
        .await;
    assert_eq!(report.events.len(), 1);
    assert_eq!(report.events[0].severity, Severity::Error);
    assert!(report.events[0].summary.starts_with("process scan error: "));
    assert!(report.metrics.is_empty());
}

#[tokio::test]
async fn test_discover_processes() {
    let mock_server = MockServer::start().await;
    mount_endpoint(&mock_server, "processes", processes(&[1, 2])).await;
    let client = create_test_client(&mock_server);

    let records = client.discover_processes(&scanner()).await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].component, "postgres");
    assert_eq!(
        records[0].process_texts,
        vec!["/usr/lib/postgresql/16/bin/postgres".to_string()]
    );
}

use super::{create_test_client, mount_endpoint};
use crate::{EVENT_CLASS_NAGIOS, MetricValue, NcpaError, Severity};
use serde_json::json;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path, query_param},
};

#[tokio::test]
async fn test_run_plugin_critical() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/plugins%2Fcheck_disk.sh"))
        .and(query_param("args", "-w 80 -c 90"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "returncode": 2,
            "stdout": "CRITICAL - / is 93% full|/=93%;80;90;0;100 free=3.5GB"
        })))
        .mount(&mock_server)
        .await;
    let client = create_test_client(&mock_server);

    let report = client
        .run_plugin("check_disk.sh", Some("-w 80 -c 90"))
        .await
        .unwrap();

    assert_eq!(report.event.severity, Severity::Error);
    assert_eq!(report.event.summary, "CRITICAL - / is 93% full");
    assert_eq!(report.event.component.as_deref(), Some("check_disk.sh"));
    assert_eq!(report.event.event_class.as_deref(), Some(EVENT_CLASS_NAGIOS));
    assert_eq!(report.values.get("/"), Some(&MetricValue::Int(93)));
    assert_eq!(report.values.get("free"), Some(&MetricValue::Float(3.5)));
    assert_eq!(report.values.get("returncode"), Some(&MetricValue::Int(2)));
}

#[tokio::test]
async fn test_run_plugin_with_event_key() {
    let mock_server = MockServer::start().await;
    mount_endpoint(
        &mock_server,
        "plugins%2Fcheck_ntp",
        json!({"returncode": 0, "stdout": "NTP OK: Offset 0.0012 secs|offset=0.0012s;60;120;"}),
    )
    .await;
    let client = create_test_client(&mock_server);

    let report = client
        .run_plugin_with_event_key("check_ntp", None, "ntp")
        .await
        .unwrap();
    assert_eq!(report.event.severity, Severity::Clear);
    assert_eq!(report.event.event_key.as_deref(), Some("ntp"));
    assert_eq!(report.values.get("offset"), Some(&MetricValue::Float(0.0012)));
}

#[tokio::test]
async fn test_run_missing_plugin() {
    let mock_server = MockServer::start().await;
    mount_endpoint(
        &mock_server,
        "plugins%2Fcheck_nothing",
        json!({"error": "An unknown NCPA error occurred"}),
    )
    .await;
    let client = create_test_client(&mock_server);

    let report = client.run_plugin("check_nothing", None).await.unwrap();
    assert_eq!(report.event.severity, Severity::Error);
    assert_eq!(
        report.event.summary,
        "NCPA plugin execution error: An unknown NCPA error occurred"
    );
    assert_eq!(report.event.event_key.as_deref(), Some("NcpaPlugin"));
}

#[tokio::test]
async fn test_run_plugin_requires_name() {
    let mock_server = MockServer::start().await;
    let client = create_test_client(&mock_server);

    let result = client.run_plugin("", None).await;
    assert!(matches!(result, Err(NcpaError::Validation(_))));
    assert!(mock_server.received_requests().await.unwrap().is_empty());
}

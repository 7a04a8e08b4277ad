use super::{create_test_client, mount_endpoint};
use crate::{Endpoint, MetricValue, NcpaError, NormalizeSchema, UnitTable};
use serde_json::json;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path, query_param},
};

async fn mount_agent(mock_server: &MockServer) {
    mount_endpoint(
        mock_server,
        "",
        json!({
            "root": {
                "cpu": {"count": [[4], "cores"], "percent": []},
                "memory": {
                    "virtual": {
                        "total": [15.5, "GiB"],
                        "available": [8, "GiB"],
                        "free": [2, "GiB"],
                        "used": [7.5, "GiB"],
                        "percent": [48.4, "%"]
                    },
                    "swap": {
                        "total": [2, "GiB"],
                        "free": [1.5, "GiB"],
                        "used": [512, "MiB"],
                        "percent": [25.0, "%"]
                    }
                },
                "disk": {
                    "logical": {
                        "|": {
                            "total": [50, "GiB"],
                            "used": [20, "GiB"],
                            "free": [30, "GiB"],
                            "used_percent": [40.0, "%"],
                            "device_name": ["/dev/mapper/root"],
                            "fstype": "xfs",
                            "opts": "rw,relatime"
                        }
                    },
                    "physical": {
                        "sda": {
                            "read_count": [1200, "c"],
                            "write_count": [3400, "c"],
                            "read_bytes": [10, "MiB"],
                            "write_bytes": [20, "MiB"]
                        }
                    }
                },
                "interface": {
                    "eth0": {
                        "bytes_recv": [1, "KiB"],
                        "bytes_sent": [2, "KiB"],
                        "dropin": [0, "packets"],
                        "dropout": [0, "packets"],
                        "errin": [1, "errors"],
                        "errout": [0, "errors"],
                        "packets_recv": [30, "packets"],
                        "packets_sent": [40, "packets"]
                    }
                },
                "system": {"node": "web01", "system": "Linux", "uptime": [86400.5, "s"]},
                "user": {"count": [2, "users"]},
                "processes": [],
                "services": []
            }
        }),
    )
    .await;

    mount_endpoint(
        mock_server,
        "cpu%2Fpercent",
        json!({"percent": [[5.0, 15.0, 25.0, 35.0], "%"]}),
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/api/processes"))
        .and(query_param("aggregate", "avg"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "processes": [
                {"pid": 0, "name": "System Idle Process", "mem_rss": [8, "KiB"], "mem_vms": [0, "B"], "cpu_percent": [97.0, "%"], "mem_percent": [0.0, "%"]},
                {"pid": 812, "name": "nginx", "cmd": "nginx: master process", "mem_rss": [2, "MiB"], "mem_vms": [16, "MiB"], "cpu_percent": [1.5, "%"], "mem_percent": [0.5, "%"]}
            ]
        })))
        .mount(mock_server)
        .await;

    mount_endpoint(
        mock_server,
        "services",
        json!({"services": {"nginx": "running", "cups": "stopped", "odd": "degraded"}}),
    )
    .await;
}

#[tokio::test]
async fn test_collect_metrics_full_tree() {
    let mock_server = MockServer::start().await;
    mount_agent(&mock_server).await;
    let client = create_test_client(&mock_server);

    let metrics = client.collect_metrics().await.unwrap();

    assert_eq!(metrics.device_value("cpu_percent"), Some(MetricValue::Float(20.0)));
    assert_eq!(
        metrics.component_value("cpu", "3", "percent"),
        Some(MetricValue::Float(35.0))
    );
    assert_eq!(
        metrics.device_value("memory_used"),
        Some(MetricValue::Int(8_053_063_680))
    );
    assert_eq!(
        metrics.device_value("swap_used"),
        Some(MetricValue::Int(512 * 1024 * 1024))
    );
    assert_eq!(metrics.device_value("swap_in"), None);
    assert_eq!(
        metrics.component_value("disk-logical", "-", "used_bytes"),
        Some(MetricValue::Int(20 * 1024 * 1024 * 1024))
    );
    assert_eq!(
        metrics.component_value("disk-physical", "sda", "read_bytes"),
        Some(MetricValue::Int(10 * 1024 * 1024))
    );
    assert_eq!(
        metrics.component_value("intf", "eth0", "ifOutOctets"),
        Some(MetricValue::Int(2048))
    );
    assert_eq!(
        metrics.component_value("intf", "eth0", "ifInErrors"),
        Some(MetricValue::Int(1))
    );
    assert_eq!(metrics.device_value("processes"), Some(MetricValue::Int(1)));
    assert_eq!(metrics.device_value("proc_cpu"), Some(MetricValue::Float(1.5)));
    assert_eq!(
        metrics.device_value("mem_rss"),
        Some(MetricValue::Int(2 * 1024 * 1024 + 8 * 1024))
    );
    assert_eq!(
        metrics.component_value("services", "cups", "status"),
        Some(MetricValue::Int(1))
    );
    assert_eq!(
        metrics.component_value("services", "odd", "status"),
        Some(MetricValue::Int(10))
    );
    assert_eq!(metrics.device_value("sysUpTime"), Some(MetricValue::Int(8_640_050)));
    assert_eq!(metrics.device_value("users"), Some(MetricValue::Int(2)));
}

#[tokio::test]
async fn test_collect_with_selected_endpoints_and_units() {
    let mock_server = MockServer::start().await;
    mount_agent(&mock_server).await;
    let client = create_test_client(&mock_server);

    let schema = NormalizeSchema::new([Endpoint::DiskPhysical, Endpoint::User])
        .with_units(UnitTable::default().with_multiplier("c", 2.0));
    let metrics = client.collect_with(&schema).await.unwrap();

    assert_eq!(
        metrics.component_value("disk-physical", "sda", "read_count"),
        Some(MetricValue::Int(2400))
    );
    assert_eq!(metrics.device_value("cpu_percent"), None);
    assert_eq!(metrics.components_of("intf").count(), 0);
}

#[tokio::test]
async fn test_collect_metrics_wrong_token() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "error": {"message": "Incorrect credentials given."}
        })))
        .mount(&mock_server)
        .await;
    let client = create_test_client(&mock_server);

    let result = client.collect_metrics().await;
    assert!(matches!(result, Err(NcpaError::IncorrectCredentials(_))));
}

#[tokio::test]
async fn test_fetch_single_endpoint() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/memory%2Fvirtual"))
        .and(query_param("units", "G"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "virtual": {"total": [15.5, "GiB"]}
        })))
        .mount(&mock_server)
        .await;
    let client = create_test_client(&mock_server);

    let reply = client.fetch("memory/virtual", &[("units", "G")]).await.unwrap();
    assert_eq!(reply["virtual"]["total"][1], "GiB");
}

#[tokio::test]
async fn test_unknown_node() {
    let mock_server = MockServer::start().await;
    mount_endpoint(
        &mock_server,
        "memory%2Fnope",
        json!({"error": {
            "message": "The node requested does not exist.",
            "node": "nope",
            "path": "/api/memory/nope"
        }}),
    )
    .await;
    let client = create_test_client(&mock_server);

    match client.fetch("memory/nope", &[]).await {
        Err(NcpaError::NodeNotFound { node, .. }) => assert_eq!(node, "nope"),
        other => panic!("unexpected result: {:?}", other),
    }
}

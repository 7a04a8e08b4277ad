use super::{create_test_client, mount_endpoint};
use crate::{InventoryOptions, NcpaError, ServiceState};
use serde_json::json;
use wiremock::MockServer;

async fn mount_windows_agent(mock_server: &MockServer) {
    mount_endpoint(
        mock_server,
        "",
        json!({
            "root": {
                "system": {
                    "node": "WIN-SQL01",
                    "system": "Windows",
                    "release": "2019Server",
                    "version": "10.0.17763",
                    "machine": "AMD64",
                    "processor": "AMD64 Family 23 Model 49 Stepping 0, AuthenticAMD"
                },
                "memory": {
                    "virtual": {"total": [32, "GiB"]},
                    "swap": {"total": [4.75, "GiB"]}
                },
                "cpu": {"count": [[8, 8], "cores"], "percent": []},
                "disk": {
                    "logical": {
                        "C:|": {"total": [126.4, "GiB"], "device_name": ["C:\\"], "fstype": "NTFS", "opts": "rw,fixed"},
                        "D:|": {"total": [0, "B"], "device_name": ["D:\\"], "fstype": "", "opts": "cdrom"}
                    },
                    "physical": {"PhysicalDrive0": {}, "PhysicalDrive1": {}}
                },
                "interface": {
                    "Ethernet0": {},
                    "Loopback Pseudo-Interface 1": {}
                },
                "services": []
            }
        }),
    )
    .await;

    mount_endpoint(
        mock_server,
        "services",
        json!({"services": {
            "MSSQLSERVER": "running",
            "SQLSERVERAGENT": "stopped",
            "Spooler": "running",
            "wuauserv": "stopped"
        }}),
    )
    .await;
}

#[tokio::test]
async fn test_model_windows_host() {
    let mock_server = MockServer::start().await;
    mount_windows_agent(&mock_server).await;
    let client = create_test_client(&mock_server);

    let options = InventoryOptions::new()
        .filesystem_ignore_types(["cdrom"])
        .interface_ignore_names("^Loopback")
        .unwrap()
        .hard_disk_match("Drive0$")
        .unwrap()
        .services_expected_running(["MSSQLSERVER", "Spooler"])
        .services_expected_stopped(["SQLSERVERAGENT"])
        .services_ignored(["Spooler"]);

    let inventory = client.model(&options).await.unwrap();

    let device = &inventory.device;
    assert_eq!(device.sys_name, "WIN-SQL01");
    assert_eq!(device.hw_product, "Windows");
    assert_eq!(device.os_product, "Windows 2019Server");
    assert_eq!(device.os_manufacturer, "Microsoft");
    assert_eq!(
        device.sys_descr,
        "Hardware AMD64 Family 23 Model 49 Stepping 0 - Software Windows Version 2019Server (Build 17763)"
    );
    assert_eq!(device.total_memory, 32 * 1024 * 1024 * 1024);
    assert_eq!(device.total_swap, 5_100_273_664);

    assert_eq!(inventory.cpus.len(), 16);
    assert_eq!(inventory.cpus[15].socket, 1);
    assert_eq!(inventory.cpus[0].manufacturer, "AMD");

    assert_eq!(inventory.filesystems.len(), 1);
    assert_eq!(inventory.filesystems[0].mount, "C:");
    assert_eq!(inventory.filesystems[0].storage_device, "C:\\");

    assert_eq!(inventory.hard_disks.len(), 1);
    assert_eq!(inventory.hard_disks[0].title, "PhysicalDrive0");

    assert_eq!(inventory.interfaces.len(), 1);
    assert_eq!(inventory.interfaces[0].name, "Ethernet0");

    let services: Vec<_> = inventory
        .services
        .iter()
        .map(|service| (service.id.as_str(), service.expected_state))
        .collect();
    assert_eq!(
        services,
        vec![
            ("MSSQLSERVER", ServiceState::Running),
            ("SQLSERVERAGENT", ServiceState::Stopped)
        ]
    );
}

#[tokio::test]
async fn test_model_fails_on_agent_error() {
    let mock_server = MockServer::start().await;
    mount_endpoint(
        &mock_server,
        "",
        json!({"error": {"message": "Incorrect credentials given."}}),
    )
    .await;
    let client = create_test_client(&mock_server);

    let result = client.model(&InventoryOptions::new()).await;
    assert!(matches!(result, Err(NcpaError::IncorrectCredentials(_))));
}

//! Inventory records derived from agent responses.
//!
//! These describe what exists on the host (filesystems, disks, interfaces,
//! services, CPUs) in the shape of the legacy SNMP-based data model. Storing
//! them is the caller's business.

use crate::core::domain::model::service_state::ServiceState;
use serde::{Deserialize, Serialize};

/// Device-level identification.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceProfile {
    pub sys_name: String,
    /// Platform name as the agent reports it (`Linux`, `Windows`, ...).
    pub platform: String,
    /// Hardware product, `NCPA` when the platform is unknown.
    pub hw_product: String,
    pub hw_manufacturer: String,
    /// OS product string, e.g. `Linux 4.1.12-124.48.3.1.el6uek.x86_64`.
    pub os_product: String,
    pub os_manufacturer: String,
    /// `sysDescr`-style one-line description.
    pub sys_descr: String,
    /// Physical memory in bytes.
    pub total_memory: i64,
    /// Swap space in bytes.
    pub total_swap: i64,
}

/// One logical CPU.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CpuCore {
    pub id: String,
    pub socket: u32,
    pub model: String,
    pub manufacturer: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileSystemRecord {
    pub id: String,
    pub mount: String,
    pub storage_device: String,
    pub fs_type: String,
    pub block_size: i64,
    pub total_blocks: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HardDiskRecord {
    pub id: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterfaceRecord {
    pub id: String,
    pub name: String,
    /// The agent cannot tell whether an interface is up; both are always 1.
    pub admin_status: u8,
    pub oper_status: u8,
    pub if_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceRecord {
    pub id: String,
    pub name: String,
    /// Only `Running` or `Stopped`.
    pub expected_state: ServiceState,
}

/// A process class with running processes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessRecord {
    pub component: String,
    /// Distinct process texts that matched, sorted.
    pub process_texts: Vec<String>,
}

/// Everything one modeling pass discovered.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Inventory {
    pub device: DeviceProfile,
    pub cpus: Vec<CpuCore>,
    pub filesystems: Vec<FileSystemRecord>,
    pub hard_disks: Vec<HardDiskRecord>,
    pub interfaces: Vec<InterfaceRecord>,
    pub services: Vec<ServiceRecord>,
}

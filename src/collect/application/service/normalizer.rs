//! Normalization of agent JSON trees into named metrics.
//!
//! The agent nests metrics under endpoint-shaped keys and is inconsistent
//! about leaf shapes and about which keys are present. Each endpoint
//! subtree is decoded into its typed model independently; a subtree that
//! cannot be decoded is logged and skipped, and a leaf that is missing
//! simply does not produce a metric.

use crate::core::domain::model::{
    cpu::CpuNode,
    disk::{LogicalDisk, PhysicalDisk, guess_block_size},
    interface::NetworkInterface,
    memory::{SwapMemory, VirtualMemory},
    metric::{NormalizedMetrics, prep_id},
    process::ProcessInfo,
    service_state::ServiceState,
    system::{SystemInfo, UserInfo},
    unit_value::{Reading, UnitTable},
};
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::{Map, Value};
use std::fmt;
use tracing::{debug, warn};

/// Component source for CPU cores.
pub const CPU_SOURCE: &str = "cpu";
/// Component source for mounted filesystems.
pub const DISK_LOGICAL_SOURCE: &str = "disk-logical";
/// Component source for block devices.
pub const DISK_PHYSICAL_SOURCE: &str = "disk-physical";
/// Component source for network interfaces, named after the legacy SNMP datasource.
pub const INTERFACE_SOURCE: &str = "intf";
/// Component source for operating-system services.
pub const SERVICE_SOURCE: &str = "services";

/// An agent API node the normalizer understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Cpu,
    MemoryVirtual,
    MemorySwap,
    DiskLogical,
    DiskPhysical,
    Interface,
    Processes,
    Services,
    System,
    User,
}

impl Endpoint {
    pub const ALL: [Endpoint; 10] = [
        Endpoint::Cpu,
        Endpoint::MemoryVirtual,
        Endpoint::MemorySwap,
        Endpoint::DiskLogical,
        Endpoint::DiskPhysical,
        Endpoint::Interface,
        Endpoint::Processes,
        Endpoint::Services,
        Endpoint::System,
        Endpoint::User,
    ];

    /// API path of the node, relative to `/api/`.
    #[must_use]
    pub fn path(self) -> &'static str {
        match self {
            Endpoint::Cpu => "cpu",
            Endpoint::MemoryVirtual => "memory/virtual",
            Endpoint::MemorySwap => "memory/swap",
            Endpoint::DiskLogical => "disk/logical",
            Endpoint::DiskPhysical => "disk/physical",
            Endpoint::Interface => "interface",
            Endpoint::Processes => "processes",
            Endpoint::Services => "services",
            Endpoint::System => "system",
            Endpoint::User => "user",
        }
    }

    /// Leaves the agent may legitimately leave out of this node.
    ///
    /// For keyed nodes (disks, interfaces) and the process list these
    /// apply to every entry.
    #[must_use]
    pub fn optional_keys(self) -> &'static [&'static str] {
        match self {
            Endpoint::Cpu => &["count"],
            Endpoint::MemorySwap => &["swapped_in", "swapped_out"],
            Endpoint::DiskLogical => &["device_name", "fstype", "opts"],
            Endpoint::Processes => &["cpu_percent", "mem_percent"],
            _ => &[],
        }
    }

    /// Whether the whole node may be missing. Hosts with swap disabled
    /// have no `memory/swap` node.
    #[must_use]
    pub fn is_optional(self) -> bool {
        matches!(self, Endpoint::MemorySwap)
    }

    fn locate(self, tree: &Value) -> Option<&Value> {
        self.path()
            .split('/')
            .try_fold(tree, |node, key| node.get(key))
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Which nodes to normalize and how to convert their units.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizeSchema {
    pub endpoints: Vec<Endpoint>,
    pub units: UnitTable,
}

impl Default for NormalizeSchema {
    fn default() -> Self {
        Self {
            endpoints: Endpoint::ALL.to_vec(),
            units: UnitTable::default(),
        }
    }
}

impl NormalizeSchema {
    pub fn new(endpoints: impl IntoIterator<Item = Endpoint>) -> Self {
        Self {
            endpoints: endpoints.into_iter().collect(),
            units: UnitTable::default(),
        }
    }

    #[must_use]
    pub fn with_units(mut self, units: UnitTable) -> Self {
        self.units = units;
        self
    }
}

/// Normalizes a decoded agent response into metrics.
///
/// A top-level `root` wrapper is removed first. Nodes that are missing
/// from the response produce no metrics.
pub fn normalize(raw: &Value, schema: &NormalizeSchema) -> NormalizedMetrics {
    let tree = unwrap_root(raw);
    let mut metrics = NormalizedMetrics::new();

    for &endpoint in &schema.endpoints {
        let Some(node) = endpoint.locate(tree) else {
            if endpoint.is_optional() {
                debug!(endpoint = %endpoint, "Optional node not reported");
            } else {
                warn!(endpoint = %endpoint, "Node missing from agent response");
            }
            continue;
        };

        debug!(endpoint = %endpoint, "Processing node");
        let leaves = Leaves {
            endpoint,
            component: None,
            units: &schema.units,
        };
        match endpoint {
            Endpoint::Cpu => normalize_cpu(node, &leaves, &mut metrics),
            Endpoint::MemoryVirtual => normalize_virtual_memory(node, &leaves, &mut metrics),
            Endpoint::MemorySwap => normalize_swap(node, &leaves, &mut metrics),
            Endpoint::DiskLogical => normalize_logical_disks(node, &leaves, &mut metrics),
            Endpoint::DiskPhysical => normalize_physical_disks(node, &leaves, &mut metrics),
            Endpoint::Interface => normalize_interfaces(node, &leaves, &mut metrics),
            Endpoint::Processes => normalize_processes(node, &leaves, &mut metrics),
            Endpoint::Services => normalize_services(node, &leaves, &mut metrics),
            Endpoint::System => normalize_system(node, &leaves, &mut metrics),
            Endpoint::User => normalize_user(node, &leaves, &mut metrics),
        }
    }

    metrics
}

/// Strips the `root` key newer agents wrap every response in.
pub(crate) fn unwrap_root(raw: &Value) -> &Value {
    raw.get("root").unwrap_or(raw)
}

/// Decodes the entries of a process list, skipping malformed ones.
pub(crate) fn parse_process_list(node: &Value) -> Vec<ProcessInfo> {
    let Some(entries) = node.as_array() else {
        warn!(endpoint = %Endpoint::Processes, "Process list is not a list");
        return Vec::new();
    };

    entries
        .iter()
        .filter_map(|entry| match ProcessInfo::deserialize(entry) {
            Ok(info) => Some(info),
            Err(e) => {
                warn!(error = %e, entry = %entry, "Unable to parse process entry");
                None
            }
        })
        .collect()
}

/// Leaf access for one node or keyed entry, with missing-key logging.
struct Leaves<'a> {
    endpoint: Endpoint,
    component: Option<&'a str>,
    units: &'a UnitTable,
}

impl<'a> Leaves<'a> {
    fn entry(&self, component: &'a str) -> Leaves<'a> {
        Leaves {
            endpoint: self.endpoint,
            component: Some(component),
            units: self.units,
        }
    }

    fn parse<T: DeserializeOwned>(&self, node: &Value) -> Option<T> {
        match T::deserialize(node) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                warn!(
                    endpoint = %self.endpoint,
                    component = self.component,
                    error = %e,
                    "Skipping malformed node"
                );
                None
            }
        }
    }

    fn get<'r>(&self, key: &str, reading: &'r Option<Reading>) -> Option<&'r Reading> {
        if reading.is_none() {
            if self.endpoint.optional_keys().contains(&key) {
                debug!(endpoint = %self.endpoint, component = self.component, key, "Optional metric not reported");
            } else {
                warn!(endpoint = %self.endpoint, component = self.component, key, "Metric missing from agent response");
            }
        }
        reading.as_ref()
    }

    /// Canonical integer value: bytes for sized pairs, the floored count otherwise.
    fn whole(&self, key: &str, reading: &Option<Reading>) -> Option<i64> {
        self.get(key, reading)?.canonical(self.units)
    }

    /// Unconverted magnitude, for percentages and other fractional values.
    fn fraction(&self, key: &str, reading: &Option<Reading>) -> Option<f64> {
        self.get(key, reading)?.magnitude()
    }
}

fn keyed_entries<'v>(node: &'v Value, leaves: &Leaves<'_>) -> Option<&'v Map<String, Value>> {
    match node {
        Value::Object(entries) => Some(entries),
        // The root endpoint reports nodes it did not compute as an empty list.
        Value::Array(items) if items.is_empty() => {
            debug!(endpoint = %leaves.endpoint, "Node reported empty");
            None
        }
        _ => {
            warn!(endpoint = %leaves.endpoint, "Expected a mapping of entries");
            None
        }
    }
}

fn normalize_cpu(node: &Value, leaves: &Leaves<'_>, metrics: &mut NormalizedMetrics) {
    let Some(cpu) = leaves.parse::<CpuNode>(node) else {
        return;
    };
    let Some(percent) = leaves.get("percent", &cpu.percent) else {
        return;
    };

    let cores = percent.series();
    if cores.is_empty() {
        debug!(endpoint = %leaves.endpoint, "No per-core figures reported");
        return;
    }

    for (index, value) in cores.iter().enumerate() {
        metrics.set_component(CPU_SOURCE, &index.to_string(), "percent", *value);
    }
    let mean = cores.iter().sum::<f64>() / cores.len() as f64;
    metrics.set_device("cpu_percent", mean);
}

fn normalize_virtual_memory(node: &Value, leaves: &Leaves<'_>, metrics: &mut NormalizedMetrics) {
    let Some(memory) = leaves.parse::<VirtualMemory>(node) else {
        return;
    };

    if let Some(value) = leaves.whole("available", &memory.available) {
        metrics.set_device("memory_available", value);
    }
    if let Some(value) = leaves.whole("free", &memory.free) {
        metrics.set_device("memory_free", value);
    }
    if let Some(value) = leaves.whole("used", &memory.used) {
        metrics.set_device("memory_used", value);
    }
    if let Some(value) = leaves.fraction("percent", &memory.percent) {
        metrics.set_device("memory_percent", value);
    }
}

fn normalize_swap(node: &Value, leaves: &Leaves<'_>, metrics: &mut NormalizedMetrics) {
    let Some(swap) = leaves.parse::<SwapMemory>(node) else {
        return;
    };

    if let Some(value) = leaves.whole("free", &swap.free) {
        metrics.set_device("swap_free", value);
    }
    if let Some(value) = leaves.whole("used", &swap.used) {
        metrics.set_device("swap_used", value);
    }
    if let Some(value) = leaves.fraction("percent", &swap.percent) {
        metrics.set_device("swap_percent", value);
    }
    // Windows agents report neither.
    if let Some(value) = leaves.whole("swapped_in", &swap.swapped_in) {
        metrics.set_device("swap_in", value);
    }
    if let Some(value) = leaves.whole("swapped_out", &swap.swapped_out) {
        metrics.set_device("swap_out", value);
    }
}

fn normalize_logical_disks(node: &Value, leaves: &Leaves<'_>, metrics: &mut NormalizedMetrics) {
    let Some(entries) = keyed_entries(node, leaves) else {
        return;
    };

    for (key, entry) in entries {
        let id = prep_id(key);
        let leaves = leaves.entry(&id);
        let Some(disk) = leaves.parse::<LogicalDisk>(entry) else {
            continue;
        };

        let total = leaves.whole("total", &disk.total);
        if let Some(total) = total {
            metrics.set_component(DISK_LOGICAL_SOURCE, &id, "total_bytes", total);
        }
        if let Some(used) = leaves.whole("used", &disk.used) {
            metrics.set_component(DISK_LOGICAL_SOURCE, &id, "used_bytes", used);
            let block_size = guess_block_size(total.unwrap_or_default());
            metrics.set_component(DISK_LOGICAL_SOURCE, &id, "usedBlocks", used / block_size);
        }
        if let Some(free) = leaves.whole("free", &disk.free) {
            metrics.set_component(DISK_LOGICAL_SOURCE, &id, "free_bytes", free);
        }
        if let Some(percent) = leaves.fraction("used_percent", &disk.used_percent) {
            metrics.set_component(DISK_LOGICAL_SOURCE, &id, "used_percent", percent);
        }
    }
}

fn normalize_physical_disks(node: &Value, leaves: &Leaves<'_>, metrics: &mut NormalizedMetrics) {
    let Some(entries) = keyed_entries(node, leaves) else {
        return;
    };

    for (key, entry) in entries {
        let id = prep_id(key);
        let leaves = leaves.entry(&id);
        let Some(disk) = leaves.parse::<PhysicalDisk>(entry) else {
            continue;
        };

        let counters = [
            ("read_count", &disk.read_count),
            ("write_count", &disk.write_count),
            ("read_bytes", &disk.read_bytes),
            ("write_bytes", &disk.write_bytes),
        ];
        for (name, reading) in counters {
            if let Some(value) = leaves.whole(name, reading) {
                metrics.set_component(DISK_PHYSICAL_SOURCE, &id, name, value);
            }
        }
    }
}

fn normalize_interfaces(node: &Value, leaves: &Leaves<'_>, metrics: &mut NormalizedMetrics) {
    let Some(entries) = keyed_entries(node, leaves) else {
        return;
    };

    for (key, entry) in entries {
        let id = prep_id(key);
        let leaves = leaves.entry(&id);
        let Some(interface) = leaves.parse::<NetworkInterface>(entry) else {
            continue;
        };

        // Named after their IF-MIB::ifEntry counterparts. IF-MIB has no
        // all-packets counters, hence ifInPkts / ifOutPkts.
        let counters = [
            ("bytes_recv", "ifInOctets", &interface.bytes_recv),
            ("bytes_sent", "ifOutOctets", &interface.bytes_sent),
            ("dropin", "ifInDiscards", &interface.dropin),
            ("dropout", "ifOutDiscards", &interface.dropout),
            ("errin", "ifInErrors", &interface.errin),
            ("errout", "ifOutErrors", &interface.errout),
            ("packets_recv", "ifInPkts", &interface.packets_recv),
            ("packets_sent", "ifOutPkts", &interface.packets_sent),
        ];
        for (field, name, reading) in counters {
            if let Some(value) = leaves.whole(field, reading) {
                metrics.set_component(INTERFACE_SOURCE, &id, name, value);
            }
        }
    }
}

fn normalize_processes(node: &Value, leaves: &Leaves<'_>, metrics: &mut NormalizedMetrics) {
    let processes = parse_process_list(node);
    if processes.is_empty() {
        debug!(endpoint = %leaves.endpoint, "No processes reported");
        return;
    }

    let mut count: i64 = 0;
    let mut mem_rss: i64 = 0;
    let mut mem_vms: i64 = 0;
    let mut proc_cpu = 0.0;
    let mut proc_mem = 0.0;

    for process in &processes {
        mem_rss += leaves.whole("mem_rss", &process.mem_rss).unwrap_or_default();
        mem_vms += leaves.whole("mem_vms", &process.mem_vms).unwrap_or_default();
        proc_mem += leaves
            .fraction("mem_percent", &process.mem_percent)
            .unwrap_or_default();

        // The idle pseudo-process would pin the CPU sum at saturation.
        if process.is_system_idle() {
            continue;
        }
        count += 1;
        proc_cpu += leaves
            .fraction("cpu_percent", &process.cpu_percent)
            .unwrap_or_default();
    }

    metrics.set_device("processes", count);
    metrics.set_device("mem_rss", mem_rss);
    metrics.set_device("mem_vms", mem_vms);
    metrics.set_device("proc_cpu", proc_cpu);
    metrics.set_device("proc_mem", proc_mem);
}

fn normalize_services(node: &Value, leaves: &Leaves<'_>, metrics: &mut NormalizedMetrics) {
    let Some(entries) = keyed_entries(node, leaves) else {
        return;
    };

    for (name, state) in entries {
        let state = ServiceState::from_agent(state.as_str().unwrap_or_default());
        metrics.set_component(SERVICE_SOURCE, &prep_id(name), "status", state.code());
    }
}

fn normalize_system(node: &Value, leaves: &Leaves<'_>, metrics: &mut NormalizedMetrics) {
    let Some(system) = leaves.parse::<SystemInfo>(node) else {
        return;
    };

    // Seconds to timeticks.
    if let Some(uptime) = leaves.fraction("uptime", &system.uptime) {
        metrics.set_device("sysUpTime", (uptime * 100.0).floor() as i64);
    }
}

fn normalize_user(node: &Value, leaves: &Leaves<'_>, metrics: &mut NormalizedMetrics) {
    let Some(user) = leaves.parse::<UserInfo>(node) else {
        return;
    };

    if let Some(count) = leaves.fraction("count", &user.count) {
        metrics.set_device("users", count.floor() as i64);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::domain::model::metric::MetricValue;
    use serde_json::json;

    fn only(endpoint: Endpoint) -> NormalizeSchema {
        NormalizeSchema::new([endpoint])
    }

    #[test]
    fn test_cpu_expands_per_core() {
        let raw = json!({"cpu": {"percent": [[10.0, 20.0, 30.0, 40.0], "%"], "count": [4, "cores"]}});
        let metrics = normalize(&raw, &only(Endpoint::Cpu));

        assert_eq!(metrics.device_value("cpu_percent"), Some(MetricValue::Float(25.0)));
        assert_eq!(metrics.components_of(CPU_SOURCE).count(), 4);
        assert_eq!(
            metrics.component_value(CPU_SOURCE, "2", "percent"),
            Some(MetricValue::Float(30.0))
        );
    }

    #[test]
    fn test_cpu_empty_list_from_root_endpoint() {
        let raw = json!({"cpu": {"percent": [], "count": [4, "cores"]}});
        let metrics = normalize(&raw, &only(Endpoint::Cpu));
        assert!(metrics.is_empty());
    }

    #[test]
    fn test_virtual_memory_converts_units() {
        let raw = json!({"memory": {"virtual": {
            "total": [8, "GiB"],
            "available": [4, "GiB"],
            "free": [1024, "MiB"],
            "used": [3.5, "GB"],
            "percent": [50.5, "%"]
        }}});
        let metrics = normalize(&raw, &only(Endpoint::MemoryVirtual));

        assert_eq!(metrics.device_value("memory_available"), Some(MetricValue::Int(4 << 30)));
        assert_eq!(metrics.device_value("memory_free"), Some(MetricValue::Int(1 << 30)));
        assert_eq!(metrics.device_value("memory_used"), Some(MetricValue::Int(3_500_000_000)));
        assert_eq!(metrics.device_value("memory_percent"), Some(MetricValue::Float(50.5)));
    }

    #[test]
    fn test_missing_swap_and_swap_counters_are_not_errors() {
        let raw = json!({"memory": {"virtual": {"free": [1, "B"]}}});
        let metrics = normalize(&raw, &only(Endpoint::MemorySwap));
        assert!(metrics.is_empty());

        let raw = json!({"memory": {"swap": {
            "total": [2, "GiB"], "free": [1, "GiB"], "used": [1, "GiB"], "percent": [50.0, "%"]
        }}});
        let metrics = normalize(&raw, &only(Endpoint::MemorySwap));
        assert_eq!(metrics.device_value("swap_free"), Some(MetricValue::Int(1 << 30)));
        assert_eq!(metrics.device_value("swap_percent"), Some(MetricValue::Float(50.0)));
        assert_eq!(metrics.device_value("swap_in"), None);
        assert_eq!(metrics.device_value("swap_out"), None);

        let raw = json!({"memory": {"swap": {"swapped_in": [10, "KiB"], "swapped_out": [2, "KiB"]}}});
        let metrics = normalize(&raw, &only(Endpoint::MemorySwap));
        assert_eq!(metrics.device_value("swap_in"), Some(MetricValue::Int(10240)));
        assert_eq!(metrics.device_value("swap_out"), Some(MetricValue::Int(2048)));
    }

    #[test]
    fn test_logical_disks() {
        let raw = json!({"disk": {"logical": {
            "|": {
                "total": [40, "GiB"],
                "used": [10, "GiB"],
                "free": [30, "GiB"],
                "used_percent": [25.0, "%"],
                "device_name": ["/dev/sda1"],
                "fstype": "xfs"
            },
            "|boot": {"total": [1536, "B"], "used": [1024, "B"]}
        }}});
        let metrics = normalize(&raw, &only(Endpoint::DiskLogical));

        assert_eq!(
            metrics.component_value(DISK_LOGICAL_SOURCE, "-", "used_bytes"),
            Some(MetricValue::Int(10 << 30))
        );
        assert_eq!(
            metrics.component_value(DISK_LOGICAL_SOURCE, "-", "usedBlocks"),
            Some(MetricValue::Int((10 << 30) / 4096))
        );
        assert_eq!(
            metrics.component_value(DISK_LOGICAL_SOURCE, "-", "used_percent"),
            Some(MetricValue::Float(25.0))
        );
        // 1536 bytes only divides into 512-byte blocks.
        assert_eq!(
            metrics.component_value(DISK_LOGICAL_SOURCE, "boot", "usedBlocks"),
            Some(MetricValue::Int(2))
        );
    }

    #[test]
    fn test_physical_disks_and_malformed_entries() {
        let raw = json!({"disk": {"physical": {
            "sda": {
                "read_count": [120, "c"],
                "write_count": [80, "c"],
                "read_bytes": [2, "MiB"],
                "write_bytes": [1, "KiB"]
            },
            "sdb": "offline"
        }}});
        let metrics = normalize(&raw, &only(Endpoint::DiskPhysical));

        assert_eq!(
            metrics.component_value(DISK_PHYSICAL_SOURCE, "sda", "read_count"),
            Some(MetricValue::Int(120))
        );
        assert_eq!(
            metrics.component_value(DISK_PHYSICAL_SOURCE, "sda", "read_bytes"),
            Some(MetricValue::Int(2 << 20))
        );
        assert!(metrics.component(DISK_PHYSICAL_SOURCE, "sdb").is_none());
    }

    #[test]
    fn test_interfaces_use_if_mib_names() {
        let raw = json!({"interface": {"Local Area Connection* 2": {
            "bytes_recv": [1, "KB"],
            "bytes_sent": [2, "KB"],
            "dropin": [3, "packets"],
            "dropout": [4, "packets"],
            "errin": [5, "errors"],
            "errout": [6, "errors"],
            "packets_recv": [7, "packets"],
            "packets_sent": [8, "packets"]
        }}});
        let metrics = normalize(&raw, &only(Endpoint::Interface));
        let id = "Local Area Connection_ 2";

        assert_eq!(
            metrics.component_value(INTERFACE_SOURCE, id, "ifInOctets"),
            Some(MetricValue::Int(1000))
        );
        assert_eq!(
            metrics.component_value(INTERFACE_SOURCE, id, "ifOutErrors"),
            Some(MetricValue::Int(6))
        );
        assert_eq!(
            metrics.component_value(INTERFACE_SOURCE, id, "ifOutPkts"),
            Some(MetricValue::Int(8))
        );
    }

    #[test]
    fn test_system_idle_process_only_skews_cpu_and_count() {
        let raw = json!({"processes": [
            {
                "name": "System Idle Process",
                "mem_rss": [8, "KiB"],
                "mem_vms": [0, "B"],
                "mem_percent": [0.0, "%"],
                "cpu_percent": [97.0, "%"]
            },
            {
                "name": "svchost.exe",
                "mem_rss": [2, "MiB"],
                "mem_vms": [4, "MiB"],
                "mem_percent": [1.5, "%"],
                "cpu_percent": [3.0, "%"]
            }
        ]});
        let metrics = normalize(&raw, &only(Endpoint::Processes));

        assert_eq!(metrics.device_value("processes"), Some(MetricValue::Int(1)));
        assert_eq!(metrics.device_value("proc_cpu"), Some(MetricValue::Float(3.0)));
        assert_eq!(
            metrics.device_value("mem_rss"),
            Some(MetricValue::Int(8 * 1024 + 2 * 1024 * 1024))
        );
        assert_eq!(metrics.device_value("mem_vms"), Some(MetricValue::Int(4 << 20)));
        assert_eq!(metrics.device_value("proc_mem"), Some(MetricValue::Float(1.5)));
    }

    #[test]
    fn test_services_map_to_codes() {
        let raw = json!({"services": {"sshd": "running", "cups": "stopped", "odd": "degraded"}});
        let metrics = normalize(&raw, &only(Endpoint::Services));

        assert_eq!(metrics.component_value(SERVICE_SOURCE, "sshd", "status"), Some(MetricValue::Int(0)));
        assert_eq!(metrics.component_value(SERVICE_SOURCE, "cups", "status"), Some(MetricValue::Int(1)));
        assert_eq!(metrics.component_value(SERVICE_SOURCE, "odd", "status"), Some(MetricValue::Int(10)));
    }

    #[test]
    fn test_root_wrapper_system_and_user() {
        let raw = json!({"root": {
            "system": {"uptime": [1234.567, "s"], "node": "web01", "system": "Linux"},
            "user": {"count": [3, "users"]}
        }});
        let metrics = normalize(&raw, &NormalizeSchema::new([Endpoint::System, Endpoint::User]));

        assert_eq!(metrics.device_value("sysUpTime"), Some(MetricValue::Int(123456)));
        assert_eq!(metrics.device_value("users"), Some(MetricValue::Int(3)));
    }

    #[test]
    fn test_custom_unit_table() {
        let raw = json!({"memory": {"virtual": {"free": [2, "pages"]}}});
        let schema =
            only(Endpoint::MemoryVirtual).with_units(UnitTable::default().with_multiplier("pages", 4096.0));
        let metrics = normalize(&raw, &schema);
        assert_eq!(metrics.device_value("memory_free"), Some(MetricValue::Int(8192)));
    }

    #[test]
    fn test_flattened_output() {
        let raw = json!({
            "cpu": {"percent": [[5.0], "%"]},
            "services": {"sshd": "running"}
        });
        let flat = normalize(&raw, &NormalizeSchema::default()).flatten();

        assert_eq!(flat.get("cpu_percent"), Some(&MetricValue::Float(5.0)));
        assert_eq!(flat.get("cpu/0/percent"), Some(&MetricValue::Float(5.0)));
        assert_eq!(flat.get("services/sshd/status"), Some(&MetricValue::Int(0)));
        assert!(!flat.contains_key("memory_free"));
    }
}

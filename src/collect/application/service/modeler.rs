//! Derives inventory records from an agent's root tree.

use crate::collect::application::service::{normalizer::unwrap_root, process_scanner::compile};
use crate::core::domain::{
    error::NcpaResult,
    model::{
        cpu::CpuNode,
        disk::{LogicalDisk, guess_block_size, mount_path},
        inventory::{
            CpuCore, DeviceProfile, FileSystemRecord, HardDiskRecord, Inventory, InterfaceRecord,
            ServiceRecord,
        },
        metric::prep_id,
        service_state::ServiceState,
        system::SystemInfo,
        unit_value::{Reading, UnitTable},
    },
};
use regex::Regex;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

const HW_MANUFACTURER: &str = "Nagios";
const DEFAULT_HW_PRODUCT: &str = "NCPA";
const DEFAULT_CPU_MODEL: &str = "CPU";
const INTERFACE_TYPE: &str = "ethernetCsmacd";
const UNKNOWN_VENDOR: &str = "Unknown";

/// Filters applied while modeling.
///
/// An empty pattern or list means no filtering.
#[derive(Debug, Clone, Default)]
pub struct InventoryOptions {
    filesystem_ignore_names: Option<Regex>,
    filesystem_ignore_types: Vec<String>,
    hard_disk_match: Option<Regex>,
    interface_ignore_names: Option<Regex>,
    services_expected_running: Vec<String>,
    services_expected_stopped: Vec<String>,
    services_ignored: Vec<String>,
}

impl InventoryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Skip filesystems whose mount path matches `pattern`.
    ///
    /// # Errors
    /// Returns `NcpaError::Validation` if the pattern does not compile.
    pub fn filesystem_ignore_names(mut self, pattern: &str) -> NcpaResult<Self> {
        self.filesystem_ignore_names = optional_pattern(pattern)?;
        Ok(self)
    }

    /// Skip filesystems of these types; a type also matches when it appears
    /// in the mount options.
    #[must_use]
    pub fn filesystem_ignore_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.filesystem_ignore_types = types.into_iter().map(Into::into).collect();
        self
    }

    /// Only model physical disks whose name matches `pattern`.
    ///
    /// # Errors
    /// Returns `NcpaError::Validation` if the pattern does not compile.
    pub fn hard_disk_match(mut self, pattern: &str) -> NcpaResult<Self> {
        self.hard_disk_match = optional_pattern(pattern)?;
        Ok(self)
    }

    /// Skip interfaces whose name matches `pattern`.
    ///
    /// # Errors
    /// Returns `NcpaError::Validation` if the pattern does not compile.
    pub fn interface_ignore_names(mut self, pattern: &str) -> NcpaResult<Self> {
        self.interface_ignore_names = optional_pattern(pattern)?;
        Ok(self)
    }

    #[must_use]
    pub fn services_expected_running<I, S>(mut self, services: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.services_expected_running = services.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn services_expected_stopped<I, S>(mut self, services: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.services_expected_stopped = services.into_iter().map(Into::into).collect();
        self
    }

    /// Services never modeled, even when listed as expected.
    #[must_use]
    pub fn services_ignored<I, S>(mut self, services: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.services_ignored = services.into_iter().map(Into::into).collect();
        self
    }
}

fn optional_pattern(pattern: &str) -> NcpaResult<Option<Regex>> {
    if pattern.is_empty() {
        Ok(None)
    } else {
        Ok(Some(compile(pattern)?))
    }
}

/// Builds an [`Inventory`] from the root tree plus the `services` node.
#[derive(Debug, Clone, Default)]
pub struct InventoryModeler {
    options: InventoryOptions,
    units: UnitTable,
}

impl InventoryModeler {
    pub fn new(options: InventoryOptions, units: UnitTable) -> Self {
        Self { options, units }
    }

    /// Runs every modeler over one tree.
    #[must_use]
    pub fn model(&self, tree: &Value) -> Inventory {
        let tree = unwrap_root(tree);
        Inventory {
            device: self.model_device(tree),
            cpus: self.model_cpus(tree),
            filesystems: self.model_filesystems(tree),
            hard_disks: self.model_hard_disks(tree),
            interfaces: self.model_interfaces(tree),
            services: self.model_services(tree),
        }
    }

    #[must_use]
    pub fn model_device(&self, tree: &Value) -> DeviceProfile {
        let system = system_info(tree);
        let platform = system.system.clone().unwrap_or_default();
        let release = system.release.clone().unwrap_or_default();
        let sys_name = system.node.clone().unwrap_or_default();

        let os_product = if !platform.is_empty() && !release.is_empty() {
            format!("{} {}", platform, release)
        } else {
            release.clone()
        };

        let sys_descr = if platform == "Windows" {
            let processor = system.processor.as_deref().unwrap_or_default();
            let build = system
                .version
                .as_deref()
                .unwrap_or_default()
                .rsplit('.')
                .next()
                .unwrap_or_default();
            format!(
                "Hardware {} - Software Windows Version {} (Build {})",
                processor.split(',').next().unwrap_or_default(),
                release,
                build
            )
        } else {
            format!(
                "{} {} {} {} {}",
                platform,
                sys_name,
                release,
                system.version.as_deref().unwrap_or_default(),
                system.machine.as_deref().unwrap_or_default()
            )
        };

        DeviceProfile {
            hw_product: if platform.is_empty() {
                DEFAULT_HW_PRODUCT.to_string()
            } else {
                platform.clone()
            },
            hw_manufacturer: HW_MANUFACTURER.to_string(),
            os_manufacturer: os_vendor(&platform, &os_product).to_string(),
            os_product,
            sys_descr,
            total_memory: self.bytes_at(tree, "/memory/virtual/total"),
            total_swap: self.bytes_at(tree, "/memory/swap/total"),
            sys_name,
            platform,
        }
    }

    /// One record per core, numbered across sockets.
    #[must_use]
    pub fn model_cpus(&self, tree: &Value) -> Vec<CpuCore> {
        let sockets = tree
            .get("cpu")
            .and_then(|node| CpuNode::deserialize(node).ok())
            .map(|cpu| cpu.cores_per_socket())
            .unwrap_or_default();
        if sockets.iter().sum::<u32>() == 0 {
            warn!("Unable to get CPU core count");
            return Vec::new();
        }

        let model = system_info(tree)
            .processor
            .filter(|processor| !processor.is_empty())
            .unwrap_or_else(|| {
                warn!("Unable to get CPU model");
                DEFAULT_CPU_MODEL.to_string()
            });
        let manufacturer = cpu_vendor(&model);

        let mut cpus = Vec::new();
        for (socket, &cores) in sockets.iter().enumerate() {
            for core in 0..cores {
                let id = cpus.len().to_string();
                debug!(cpu = %id, socket, core, "Found CPU");
                cpus.push(CpuCore {
                    id,
                    socket: socket as u32,
                    model: model.clone(),
                    manufacturer: manufacturer.clone(),
                });
            }
        }
        cpus
    }

    #[must_use]
    pub fn model_filesystems(&self, tree: &Value) -> Vec<FileSystemRecord> {
        let Some(entries) = section(tree, "/disk/logical", "filesystems") else {
            return Vec::new();
        };

        entries
            .iter()
            .filter_map(|(key, node)| {
                let mount = mount_path(key);
                if let Some(pattern) = &self.options.filesystem_ignore_names {
                    if pattern.is_match(&mount) {
                        info!(mount = %mount, "Filesystem ignored by name");
                        return None;
                    }
                }

                let disk = match LogicalDisk::deserialize(node) {
                    Ok(disk) => disk,
                    Err(e) => {
                        warn!(mount = %mount, error = %e, "Skipping malformed filesystem");
                        return None;
                    }
                };
                let fs_type = disk.fstype.clone().unwrap_or_default();
                let opts = disk.opts.as_deref().unwrap_or_default();
                if self
                    .options
                    .filesystem_ignore_types
                    .iter()
                    .any(|ignored| *ignored == fs_type || opts.contains(ignored.as_str()))
                {
                    info!(mount = %mount, fs_type = %fs_type, "Filesystem ignored by type");
                    return None;
                }

                let total = disk
                    .total
                    .as_ref()
                    .and_then(|total| total.canonical(&self.units))
                    .unwrap_or(0);
                let block_size = guess_block_size(total);
                debug!(mount = %mount, "Found filesystem");

                Some(FileSystemRecord {
                    id: prep_id(key),
                    storage_device: disk.device().unwrap_or_default(),
                    fs_type,
                    block_size,
                    total_blocks: total / block_size,
                    mount,
                })
            })
            .collect()
    }

    #[must_use]
    pub fn model_hard_disks(&self, tree: &Value) -> Vec<HardDiskRecord> {
        let Some(entries) = section(tree, "/disk/physical", "physical disks") else {
            return Vec::new();
        };

        entries
            .keys()
            .filter(|name| match &self.options.hard_disk_match {
                Some(pattern) if !pattern.is_match(name) => {
                    info!(disk = %name, "Disk does not match filter");
                    false
                }
                _ => true,
            })
            .map(|name| HardDiskRecord {
                id: prep_id(name),
                title: name.clone(),
            })
            .collect()
    }

    #[must_use]
    pub fn model_interfaces(&self, tree: &Value) -> Vec<InterfaceRecord> {
        let Some(entries) = section(tree, "/interface", "interfaces") else {
            return Vec::new();
        };

        entries
            .keys()
            .filter(|name| match &self.options.interface_ignore_names {
                Some(pattern) if pattern.is_match(name) => {
                    info!(interface = %name, "Interface ignored by name");
                    false
                }
                _ => true,
            })
            .map(|name| InterfaceRecord {
                id: prep_id(name),
                name: name.clone(),
                admin_status: 1,
                oper_status: 1,
                if_type: INTERFACE_TYPE.to_string(),
            })
            .collect()
    }

    /// Services listed as expected running or stopped; the rest are skipped.
    #[must_use]
    pub fn model_services(&self, tree: &Value) -> Vec<ServiceRecord> {
        let Some(entries) = section(tree, "/services", "services") else {
            return Vec::new();
        };
        let listed = |list: &[String], name: &str| list.iter().any(|entry| entry == name);

        entries
            .keys()
            .filter_map(|name| {
                let expected_state = if listed(&self.options.services_ignored, name) {
                    info!(service = %name, "Service ignored");
                    return None;
                } else if listed(&self.options.services_expected_running, name) {
                    ServiceState::Running
                } else if listed(&self.options.services_expected_stopped, name) {
                    ServiceState::Stopped
                } else {
                    debug!(service = %name, "Service has no expected state");
                    return None;
                };

                Some(ServiceRecord {
                    id: prep_id(name),
                    name: name.clone(),
                    expected_state,
                })
            })
            .collect()
    }

    fn bytes_at(&self, tree: &Value, pointer: &str) -> i64 {
        tree.pointer(pointer)
            .and_then(|node| Reading::deserialize(node).ok())
            .and_then(|reading| reading.canonical(&self.units))
            .unwrap_or(0)
    }
}

fn system_info(tree: &Value) -> SystemInfo {
    tree.get("system")
        .and_then(|node| SystemInfo::deserialize(node).ok())
        .unwrap_or_default()
}

fn section<'v>(tree: &'v Value, pointer: &str, what: &str) -> Option<&'v Map<String, Value>> {
    match tree.pointer(pointer).and_then(Value::as_object) {
        Some(entries) if !entries.is_empty() => Some(entries),
        _ => {
            warn!(section = what, "Unable to get {}", what);
            None
        }
    }
}

fn os_vendor(platform: &str, os_product: &str) -> &'static str {
    let product = os_product.to_lowercase();
    if product.contains("uek") {
        "Oracle"
    } else if product.contains("el") {
        "RedHat"
    } else if platform.to_lowercase().contains("mac") {
        "Apple"
    } else {
        match platform {
            "AIX" => "IBM",
            "Darwin" => "Apple",
            "Linux" => "GNU",
            "Windows" => "Microsoft",
            _ => UNKNOWN_VENDOR,
        }
    }
}

fn cpu_vendor(model: &str) -> String {
    let upper = model.to_uppercase();
    if upper.contains("INTEL") {
        "Intel".to_string()
    } else if upper.contains("AMD") {
        "AMD".to_string()
    } else {
        match model.split_once(' ') {
            Some((first, _)) => first.to_string(),
            None => UNKNOWN_VENDOR.to_string(),
        }
    }
}

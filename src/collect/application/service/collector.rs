//! Fetches agent trees and hands them to the normalizer, scanner and modeler.

use crate::collect::application::service::{
    modeler::{InventoryModeler, InventoryOptions},
    normalizer::{NormalizeSchema, normalize, parse_process_list, unwrap_root},
    plugin_parser::parse_plugin_output,
    process_scanner::{ProcessScanReport, ProcessScanner, RestartTracker},
};
use crate::core::{
    domain::{
        error::{NcpaError, NcpaResult, ValidationError},
        model::{
            inventory::{Inventory, ProcessRecord},
            metric::NormalizedMetrics,
            plugin_result::{PluginOutput, PluginReport},
            process::ProcessInfo,
            unit_value::UnitTable,
        },
    },
    infrastructure::api_client::AgentApi,
};
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, error};

/// API root; returns every node at once.
pub const ROOT_ENDPOINT: &str = "";
pub const CPU_PERCENT_ENDPOINT: &str = "cpu/percent";
pub const PROCESSES_ENDPOINT: &str = "processes";
pub const SERVICES_ENDPOINT: &str = "services";
const PLUGINS_ENDPOINT: &str = "plugins";

/// Collection operations over any [`AgentApi`].
pub struct CollectService<'a> {
    api: &'a dyn AgentApi,
    units: &'a UnitTable,
}

impl<'a> CollectService<'a> {
    pub fn new(api: &'a dyn AgentApi, units: &'a UnitTable) -> Self {
        Self { api, units }
    }

    /// Fetches the root tree and fills in the nodes the root leaves empty.
    ///
    /// The root endpoint reports `cpu/percent`, `processes` and `services`
    /// as `[]`, so those are requested on their own and grafted back in.
    ///
    /// # Errors
    /// Returns the first failed request's error.
    pub async fn fetch_tree(&self) -> NcpaResult<Value> {
        let root = self.api.fetch(ROOT_ENDPOINT, &[]).await?;
        let mut tree = unwrap_root(&root).clone();

        let cpu = self.api.fetch(CPU_PERCENT_ENDPOINT, &[]).await?;
        if let Some(percent) = unwrap_root(&cpu).get("percent") {
            graft(&mut tree, &["cpu", "percent"], percent.clone());
        }

        let processes = self
            .api
            .fetch(PROCESSES_ENDPOINT, &[("aggregate".to_string(), "avg".to_string())])
            .await?;
        merge(&mut tree, unwrap_root(&processes).clone());

        let services = self.api.fetch(SERVICES_ENDPOINT, &[]).await?;
        merge(&mut tree, unwrap_root(&services).clone());

        debug!(nodes = tree.as_object().map_or(0, Map::len), "Fetched agent tree");
        Ok(tree)
    }

    /// # Errors
    /// Returns any transport or agent error from [`Self::fetch_tree`].
    pub async fn collect_metrics(&self, schema: &NormalizeSchema) -> NcpaResult<NormalizedMetrics> {
        let tree = self.fetch_tree().await?;
        Ok(normalize(&tree, schema))
    }

    /// Runs a Nagios plugin through `api/plugins/{name}`.
    ///
    /// Failures after validation are reported through the returned report's
    /// event rather than as an `Err`.
    ///
    /// # Errors
    /// Returns `NcpaError::Validation` when `name` is empty.
    pub async fn run_plugin(
        &self,
        name: &str,
        args: Option<&str>,
        event_key: Option<&str>,
    ) -> NcpaResult<PluginReport> {
        if name.trim().is_empty() {
            return Err(ValidationError::Field {
                field: "plugin".to_string(),
                message: "No NCPA plugin specified".to_string(),
            }
            .into());
        }

        let endpoint = format!("{}/{}", PLUGINS_ENDPOINT, name);
        let params: Vec<(String, String)> = args
            .filter(|args| !args.is_empty())
            .map(|args| vec![("args".to_string(), args.to_string())])
            .unwrap_or_default();

        let output = match self.api.fetch(&endpoint, &params).await.and_then(|reply| {
            PluginOutput::deserialize(&reply)
                .map_err(|e| NcpaError::Connection(format!("Failed to parse response: {}", e)))
        }) {
            Ok(output) => output,
            Err(e) => {
                error!(plugin = name, error = %e, "NCPA plugin execution failed");
                return Ok(PluginReport::from_error(name, event_key, &e));
            }
        };

        debug!(plugin = name, returncode = output.returncode, stdout = %output.stdout, "Plugin output");
        let result = parse_plugin_output(&output.stdout);
        Ok(PluginReport::new(name, event_key, &output, result))
    }

    /// Fetches the process list and scans it; fetch failures become an error report.
    pub async fn scan_processes(
        &self,
        scanner: &ProcessScanner,
        tracker: &mut RestartTracker,
    ) -> ProcessScanReport {
        match self.fetch_processes().await {
            Ok(processes) => scanner.scan(&processes, self.units, tracker),
            Err(e) => {
                error!(error = %e, "Process scan failed");
                ProcessScanReport::from_error(&e)
            }
        }
    }

    /// # Errors
    /// Returns any transport or agent error from the process request.
    pub async fn discover_processes(&self, scanner: &ProcessScanner) -> NcpaResult<Vec<ProcessRecord>> {
        let processes = self.fetch_processes().await?;
        Ok(scanner.discover(&processes))
    }

    /// Models the device from the root tree plus the services list.
    ///
    /// # Errors
    /// Returns any transport or agent error.
    pub async fn model(&self, options: &InventoryOptions) -> NcpaResult<Inventory> {
        let root = self.api.fetch(ROOT_ENDPOINT, &[]).await?;
        let mut tree = unwrap_root(&root).clone();
        let services = self.api.fetch(SERVICES_ENDPOINT, &[]).await?;
        merge(&mut tree, unwrap_root(&services).clone());

        Ok(InventoryModeler::new(options.clone(), self.units.clone()).model(&tree))
    }

    async fn fetch_processes(&self) -> NcpaResult<Vec<ProcessInfo>> {
        let reply = self
            .api
            .fetch(PROCESSES_ENDPOINT, &[("aggregate".to_string(), "avg".to_string())])
            .await?;
        Ok(parse_process_list(
            unwrap_root(&reply)
                .get(PROCESSES_ENDPOINT)
                .unwrap_or(&Value::Null),
        ))
    }
}

/// Sets `tree[path[0]][path[1]]...` to `value`, replacing non-mappings on the way.
fn graft(tree: &mut Value, path: &[&str], value: Value) {
    let Some((head, rest)) = path.split_first() else {
        *tree = value;
        return;
    };
    if !tree.is_object() {
        *tree = Value::Object(Map::new());
    }
    if let Value::Object(map) = tree {
        let child = map.entry(*head).or_insert(Value::Null);
        graft(child, rest, value);
    }
}

/// Copies the top-level keys of a reply into the tree.
fn merge(tree: &mut Value, reply: Value) {
    if let Value::Object(entries) = reply {
        for (key, value) in entries {
            graft(tree, &[key.as_str()], value);
        }
    }
}

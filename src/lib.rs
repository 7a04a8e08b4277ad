mod collect;
mod core;

pub use crate::collect::application::service::{
    collector::CollectService,
    modeler::{InventoryModeler, InventoryOptions},
    normalizer::{Endpoint, NormalizeSchema, normalize},
    plugin_parser::{parse_plugin_output, severity_of},
    process_scanner::{
        PROCESS_SOURCE, ProcessClass, ProcessMatcher, ProcessScanReport, ProcessScanner,
        RegexProcessMatcher, RestartTracker, SCAN_STATUS_EVENT_KEY,
    },
};
pub use crate::core::domain::error::{
    NcpaError, NcpaResult, UNKNOWN_AGENT_ERROR, ValidationError, classify_error, error_check,
};
pub use crate::core::domain::model::{
    cpu::CpuNode,
    disk::{DEFAULT_BLOCK_SIZE, LogicalDisk, PhysicalDisk, guess_block_size, mount_path},
    event::{EVENT_CLASS_NAGIOS, EVENT_CLASS_OS_PROCESS, Event, Severity},
    interface::NetworkInterface,
    inventory::{
        CpuCore, DeviceProfile, FileSystemRecord, HardDiskRecord, Inventory, InterfaceRecord,
        ProcessRecord, ServiceRecord,
    },
    memory::{SwapMemory, VirtualMemory},
    metric::{ComponentKey, MetricMap, MetricValue, NormalizedMetrics, prep_id},
    ncpa_connection::NcpaConnection,
    plugin_result::{DEFAULT_PLUGIN_EVENT_KEY, NagiosPluginResult, PluginOutput, PluginReport},
    process::{CommandLine, ProcessEntry, ProcessInfo, SYSTEM_IDLE_PROCESS},
    service_state::ServiceState,
    system::{SystemInfo, UserInfo},
    unit_value::{Reading, Unit, UnitTable, UnitValue, convert},
};
pub use crate::core::domain::value_object::{NcpaHost, NcpaPort, NcpaToken, NcpaUrl, build_url};
pub use crate::core::infrastructure::{
    api_client::{AgentApi, ApiClient},
    config::{DEFAULT_TIMEOUT, NcpaConfig, RateLimitConfig},
};

use serde_json::Value;
use std::env;

/// A client for the Nagios Cross-Platform Agent REST API.
///
/// It wraps the authenticated transport and runs the collection
/// operations over it:
/// - normalized metrics from the root tree
/// - Nagios plugin runs
/// - process-class scans with restart detection
/// - inventory modeling
///
/// # Examples
///
/// ```no_run
/// use ncpa_agent::{NcpaClient, NcpaResult};
///
/// #[tokio::main]
/// async fn main() -> NcpaResult<()> {
///     let client = NcpaClient::builder()
///         .host("agent.example.com")
///         .port(5693)
///         .token("mytoken")
///         .build()?;
///
///     let metrics = client.collect_metrics().await?;
///     println!("{:?}", metrics.device_value("cpu_percent"));
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct NcpaClient {
    api_client: ApiClient,
}

/// Builder for NcpaClient configuration
#[derive(Debug)]
pub struct NcpaClientBuilder {
    host: Option<String>,
    port: NcpaPort,
    token: Option<String>,
    secure: bool,
    config: NcpaConfig,
}

impl Default for NcpaClientBuilder {
    fn default() -> Self {
        Self {
            host: None,
            port: NcpaPort::DEFAULT,
            token: None,
            secure: true,
            config: NcpaConfig::default(),
        }
    }
}

impl NcpaClientBuilder {
    /// Reads `NCPA_HOST`, `NCPA_PORT` and `NCPA_TOKEN`; unset variables are left unset.
    pub fn from_env() -> Self {
        let mut builder = Self::default();
        if let Ok(host) = env::var("NCPA_HOST") {
            builder = builder.host(host);
        }
        if let Ok(port) = env::var("NCPA_PORT") {
            builder = builder.port(port);
        }
        if let Ok(token) = env::var("NCPA_TOKEN") {
            builder = builder.token(token);
        }
        builder
    }

    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Sets the agent port; values that are not a usable port fall back to 5693.
    pub fn port(mut self, port: impl Into<NcpaPort>) -> Self {
        self.port = port.into();
        self
    }

    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Use https (the default); plain http is for proxies and tests.
    pub fn secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    pub fn accept_invalid_certs(mut self, accept: bool) -> Self {
        self.config.accept_invalid_certs = accept;
        self
    }

    pub fn config(mut self, config: NcpaConfig) -> Self {
        self.config = config;
        self
    }

    /// Validates the settings and builds the client.
    ///
    /// # Errors
    /// Returns `NcpaError::Validation` when the host or token is missing or
    /// invalid, or the rate limit is zero.
    pub fn build(self) -> NcpaResult<NcpaClient> {
        let host = NcpaHost::new(self.host.ok_or_else(|| ValidationError::Field {
            field: "host".to_string(),
            message: "Host is required".to_string(),
        })?)?;

        let token = NcpaToken::new(self.token.ok_or_else(|| ValidationError::Field {
            field: "token".to_string(),
            message: "Token is required".to_string(),
        })?)?;

        let connection = NcpaConnection::new(host, self.port, token, self.secure)?;

        Ok(NcpaClient {
            api_client: ApiClient::new(connection, self.config)?,
        })
    }
}

impl NcpaClient {
    /// Creates a new builder for NcpaClient configuration
    pub fn builder() -> NcpaClientBuilder {
        NcpaClientBuilder::default()
    }

    pub fn connection(&self) -> &NcpaConnection {
        self.api_client.connection()
    }

    pub fn config(&self) -> &NcpaConfig {
        self.api_client.config()
    }

    /// Fetches one endpoint below `/api/`, e.g. `memory/virtual`.
    ///
    /// # Errors
    /// Returns the classified agent error, or `NcpaError::Connection` for
    /// transport failures and non-JSON replies.
    pub async fn fetch(&self, endpoint: &str, params: &[(&str, &str)]) -> NcpaResult<Value> {
        self.api_client.get(endpoint, params).await
    }

    /// Collects and normalizes every known endpoint.
    ///
    /// # Errors
    /// Returns the first failed request's error.
    pub async fn collect_metrics(&self) -> NcpaResult<NormalizedMetrics> {
        let schema = NormalizeSchema::default().with_units(self.config().units.clone());
        self.collect_with(&schema).await
    }

    /// Collects and normalizes the endpoints selected by `schema`.
    ///
    /// # Errors
    /// Returns the first failed request's error.
    pub async fn collect_with(&self, schema: &NormalizeSchema) -> NcpaResult<NormalizedMetrics> {
        self.service().collect_metrics(schema).await
    }

    /// Runs a plugin installed on the agent, reporting under the default event key.
    ///
    /// # Errors
    /// Returns `NcpaError::Validation` when `name` is empty; request failures
    /// are reported in the returned event.
    pub async fn run_plugin(&self, name: &str, args: Option<&str>) -> NcpaResult<PluginReport> {
        self.service().run_plugin(name, args, None).await
    }

    /// Like [`Self::run_plugin`], with a caller-chosen event key.
    ///
    /// # Errors
    /// Returns `NcpaError::Validation` when `name` is empty.
    pub async fn run_plugin_with_event_key(
        &self,
        name: &str,
        args: Option<&str>,
        event_key: &str,
    ) -> NcpaResult<PluginReport> {
        self.service().run_plugin(name, args, Some(event_key)).await
    }

    pub async fn scan_processes(
        &self,
        scanner: &ProcessScanner,
        tracker: &mut RestartTracker,
    ) -> ProcessScanReport {
        self.service().scan_processes(scanner, tracker).await
    }

    /// # Errors
    /// Returns any transport or agent error.
    pub async fn discover_processes(&self, scanner: &ProcessScanner) -> NcpaResult<Vec<ProcessRecord>> {
        self.service().discover_processes(scanner).await
    }

    /// # Errors
    /// Returns any transport or agent error.
    pub async fn model(&self, options: &InventoryOptions) -> NcpaResult<Inventory> {
        self.service().model(options).await
    }

    fn service(&self) -> CollectService<'_> {
        CollectService::new(&self.api_client, &self.api_client.config().units)
    }
}

#[cfg(test)]
mod tests;

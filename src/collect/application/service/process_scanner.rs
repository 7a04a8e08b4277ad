//! Process-class matching over `api/processes`, with restart detection.
//!
//! Deciding which processes belong to which process class is the job of a
//! [`ProcessMatcher`]. The scanner assigns every process to the first class
//! (by sequence) whose matcher accepts it, sums the figures per class, and
//! emits one status event per class plus a scan status event.

use crate::core::domain::{
    error::{NcpaResult, ValidationError},
    model::{
        event::{EVENT_CLASS_OS_PROCESS, Event, Severity},
        inventory::ProcessRecord,
        metric::NormalizedMetrics,
        process::{ProcessEntry, ProcessInfo},
        unit_value::UnitTable,
    },
};
use regex::Regex;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::{debug, error, warn};

/// Component source for process-class metrics.
pub const PROCESS_SOURCE: &str = "processes";
/// Event key of the scan status event.
pub const SCAN_STATUS_EVENT_KEY: &str = "ProcessScanStatus";
const PROCESS_EVENT_GROUP: &str = "Process";

/// Decides whether a process command line belongs to a process class.
#[cfg_attr(test, mockall::automock)]
pub trait ProcessMatcher: Send + Sync {
    fn matches(&self, process_text: &str) -> bool;
}

/// Include / exclude regular expression matcher.
#[derive(Debug, Clone)]
pub struct RegexProcessMatcher {
    include: Regex,
    exclude: Option<Regex>,
}

impl RegexProcessMatcher {
    /// # Errors
    /// Returns `NcpaError::Validation` if either pattern does not compile.
    pub fn new(include: &str, exclude: Option<&str>) -> NcpaResult<Self> {
        let include = compile(include)?;
        let exclude = exclude
            .filter(|pattern| !pattern.is_empty())
            .map(compile)
            .transpose()?;
        Ok(Self { include, exclude })
    }
}

impl ProcessMatcher for RegexProcessMatcher {
    fn matches(&self, process_text: &str) -> bool {
        self.include.is_match(process_text)
            && !self
                .exclude
                .as_ref()
                .is_some_and(|exclude| exclude.is_match(process_text))
    }
}

pub(crate) fn compile(pattern: &str) -> Result<Regex, ValidationError> {
    Regex::new(pattern)
        .map_err(|e| ValidationError::Format(format!("Invalid pattern '{}': {}", pattern, e)))
}

/// A monitored process class.
pub struct ProcessClass {
    component: String,
    sequence: i64,
    matcher: Box<dyn ProcessMatcher>,
    alert_on_restart: bool,
    fail_severity: Severity,
}

impl ProcessClass {
    pub fn new(component: impl Into<String>, matcher: impl ProcessMatcher + 'static) -> Self {
        Self {
            component: component.into(),
            sequence: 0,
            matcher: Box::new(matcher),
            alert_on_restart: false,
            fail_severity: Severity::Error,
        }
    }

    /// Matching order; lower sequences are tried first.
    #[must_use]
    pub fn sequence(mut self, sequence: i64) -> Self {
        self.sequence = sequence;
        self
    }

    /// Raise the fail severity, rather than a clear, when all PIDs changed.
    #[must_use]
    pub fn alert_on_restart(mut self, alert: bool) -> Self {
        self.alert_on_restart = alert;
        self
    }

    #[must_use]
    pub fn fail_severity(mut self, severity: Severity) -> Self {
        self.fail_severity = severity;
        self
    }

    pub fn component(&self) -> &str {
        &self.component
    }
}

/// PIDs seen per process class on earlier scans.
///
/// Owned by the caller and handed to every scan of the same device.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RestartTracker {
    previous: HashMap<String, BTreeSet<u32>>,
}

impl RestartTracker {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn previous_pids(&self, component: &str) -> Option<&BTreeSet<u32>> {
        self.previous.get(component)
    }

    /// Sets are only replaced by non-empty ones, so a class that briefly
    /// had no processes still detects a restart when they come back.
    fn record(&mut self, current: BTreeMap<String, BTreeSet<u32>>) {
        self.previous
            .extend(current.into_iter().filter(|(_, pids)| !pids.is_empty()));
    }
}

/// Result of one process scan.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProcessScanReport {
    /// `count`, `mem` and `cpu` per process class under [`PROCESS_SOURCE`].
    pub metrics: NormalizedMetrics,
    pub events: Vec<Event>,
}

impl ProcessScanReport {
    /// The report for a scan that could not fetch the process list.
    pub fn from_error(error: &impl std::fmt::Display) -> Self {
        Self {
            metrics: NormalizedMetrics::new(),
            events: vec![scan_status_event(
                Severity::Error,
                format!("process scan error: {}", error),
            )],
        }
    }
}

#[derive(Default)]
struct ClassTotals {
    pids: BTreeSet<u32>,
    count: i64,
    mem: i64,
    cpu: f64,
}

/// Matches processes against a set of process classes.
pub struct ProcessScanner {
    classes: Vec<ProcessClass>,
}

impl ProcessScanner {
    pub fn new(mut classes: Vec<ProcessClass>) -> Self {
        classes.sort_by_key(|class| class.sequence);
        Self { classes }
    }

    pub fn classes(&self) -> &[ProcessClass] {
        &self.classes
    }

    /// Scans a process list and updates `tracker` for the next scan.
    pub fn scan(
        &self,
        processes: &[ProcessInfo],
        units: &UnitTable,
        tracker: &mut RestartTracker,
    ) -> ProcessScanReport {
        let entries = extract_entries(processes, units);
        if entries.is_empty() {
            error!("No processes returned by NCPA");
            return ProcessScanReport::default();
        }

        let mut totals: BTreeMap<String, ClassTotals> = BTreeMap::new();
        for entry in &entries {
            if let Some(class) = self.first_match(&entry.process_text) {
                let class_totals = totals.entry(class.component.clone()).or_default();
                class_totals.pids.insert(entry.pid);
                class_totals.count += 1;
                class_totals.mem += entry.rss;
                class_totals.cpu += entry.cpu;
            }
        }

        let mut report = ProcessScanReport::default();
        for class in &self.classes {
            let (severity, summary) = match totals.get(&class.component) {
                Some(class_totals) => {
                    report.metrics.set_component(PROCESS_SOURCE, &class.component, "count", class_totals.count);
                    report.metrics.set_component(PROCESS_SOURCE, &class.component, "mem", class_totals.mem);
                    report.metrics.set_component(PROCESS_SOURCE, &class.component, "cpu", class_totals.cpu);

                    // A restart means every PID changed, not just some.
                    let restarted = tracker
                        .previous_pids(&class.component)
                        .is_some_and(|previous| {
                            !previous.is_empty() && previous.is_disjoint(&class_totals.pids)
                        });
                    if restarted {
                        let severity = if class.alert_on_restart {
                            class.fail_severity
                        } else {
                            Severity::Clear
                        };
                        (severity, "matching processes restarted")
                    } else {
                        (Severity::Clear, "matching processes running")
                    }
                }
                None => {
                    report.metrics.set_component(PROCESS_SOURCE, &class.component, "count", 0_i64);
                    (class.fail_severity, "no matching processes running")
                }
            };

            debug!(component = %class.component, summary, "Process class status");
            report.events.push(
                Event::new(severity, summary)
                    .component(class.component.as_str())
                    .event_class(EVENT_CLASS_OS_PROCESS)
                    .event_group(PROCESS_EVENT_GROUP),
            );
        }

        tracker.record(
            totals
                .into_iter()
                .map(|(component, class_totals)| (component, class_totals.pids))
                .collect(),
        );

        report
            .events
            .push(scan_status_event(Severity::Clear, "process scan successful"));
        report
    }

    /// The process classes with running processes and the command lines they matched.
    pub fn discover(&self, processes: &[ProcessInfo]) -> Vec<ProcessRecord> {
        let mut matched: BTreeMap<&str, BTreeSet<String>> = BTreeMap::new();
        for process in processes {
            let Some(text) = process.process_text() else {
                warn!(pid = process.pid, "Skipping process with no name");
                continue;
            };
            if let Some(class) = self.first_match(&text) {
                matched.entry(class.component.as_str()).or_default().insert(text);
            }
        }

        matched
            .into_iter()
            .map(|(component, texts)| ProcessRecord {
                component: component.to_string(),
                process_texts: texts.into_iter().collect(),
            })
            .collect()
    }

    fn first_match(&self, process_text: &str) -> Option<&ProcessClass> {
        self.classes
            .iter()
            .find(|class| class.matcher.matches(process_text))
    }
}

fn extract_entries(processes: &[ProcessInfo], units: &UnitTable) -> Vec<ProcessEntry> {
    processes
        .iter()
        .filter_map(|process| {
            let entry = ProcessEntry::from_info(process, units);
            match &entry {
                Some(entry) => debug!(
                    pid = entry.pid,
                    rss = entry.rss,
                    cpu = entry.cpu,
                    process_text = %entry.process_text,
                    "Parsed process entry"
                ),
                None => warn!(pid = process.pid, name = process.name.as_deref(), "Unable to parse process entry"),
            }
            entry
        })
        .collect()
}

fn scan_status_event(severity: Severity, summary: impl Into<String>) -> Event {
    Event::new(severity, summary)
        .event_key(SCAN_STATUS_EVENT_KEY)
        .event_class(EVENT_CLASS_OS_PROCESS)
}

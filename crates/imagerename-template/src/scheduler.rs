//! Event job scheduler — recurring callbacks installed by hotkey handlers.
//!
//! A hotkey handler that asks for the job table may install, replace or
//! remove jobs, and so may a running job. On every semantic event the host
//! calls [`EventJobScheduler::dispatch`]:
//!
//! - Jobs are ordered by priority, highest first; equal priorities keep
//!   installation order. The order is snapshotted when the pass starts.
//! - Only jobs whose trigger matches the event run. Jobs installed during
//!   the pass wait for the next one; jobs removed during it are skipped.
//! - `Once` jobs are removed right after they run, even when they fail.
//! - A job that removes or reinstalls itself keeps that change.
//! - A failing or panicking job is logged and does not stop the others.

use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};

use imagerename_core::{AppResult, Event};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::error::panic_message;
use crate::host::app::App;

/// Whether a job survives running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Lifecycle {
    /// Removed after its first matching dispatch.
    Once,
    /// Kept until removed explicitly.
    Forever,
}

/// A job callback. Receives the running application and the job table it runs from.
pub type JobCallback = Box<dyn FnMut(&mut App, &mut EventJobScheduler) -> AppResult<()> + Send>;

struct JobEntry {
    priority: i32,
    trigger: Event,
    lifecycle: Lifecycle,
    seq: u64,
    callback: JobCallback,
}

/// The job currently out of the table because it is running.
#[derive(Debug, Clone)]
struct RunningJob {
    name: String,
    info: JobInfo,
    seq: u64,
    removed: bool,
}

/// Public description of an installed job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JobInfo {
    /// Priority (higher = runs first).
    pub priority: i32,
    /// Event that triggers the job.
    pub trigger: Event,
    /// Whether the job survives running.
    pub lifecycle: Lifecycle,
}

/// A job that failed during a dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobFailure {
    /// Job name.
    pub job: String,
    /// Error or panic message.
    pub message: String,
}

/// Outcome of one or more dispatch passes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Jobs that ran, in execution order (failed ones included).
    pub ran: Vec<String>,
    /// Jobs that returned an error or panicked.
    pub failed: Vec<JobFailure>,
    /// `Once` jobs removed after running.
    pub removed: Vec<String>,
}

impl DispatchReport {
    /// Appends another report.
    pub fn extend(&mut self, other: DispatchReport) {
        self.ran.extend(other.ran);
        self.failed.extend(other.failed);
        self.removed.extend(other.removed);
    }
}

/// The job table: job name → job entry.
///
/// Scoped to one running application. Nothing is persisted; the table is
/// simply dropped on shutdown.
#[derive(Default)]
pub struct EventJobScheduler {
    jobs: HashMap<String, JobEntry>,
    next_seq: u64,
    running: Option<RunningJob>,
}

impl EventJobScheduler {
    /// Creates an empty job table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs a job, replacing any job with the same name.
    ///
    /// A replaced job keeps its original position among jobs of equal priority.
    pub fn install<F>(
        &mut self,
        name: impl Into<String>,
        priority: i32,
        trigger: Event,
        lifecycle: Lifecycle,
        callback: F,
    ) where
        F: FnMut(&mut App, &mut EventJobScheduler) -> AppResult<()> + Send + 'static,
    {
        let name = name.into();
        let seq = match self.jobs.get(&name) {
            Some(existing) => existing.seq,
            None => match self.running_as(&name) {
                Some(running) => running.seq,
                None => {
                    let seq = self.next_seq;
                    self.next_seq += 1;
                    seq
                }
            },
        };

        let replaced = self
            .jobs
            .insert(
                name.clone(),
                JobEntry {
                    priority,
                    trigger,
                    lifecycle,
                    seq,
                    callback: Box::new(callback),
                },
            )
            .is_some();

        info!(
            job = %name,
            priority,
            trigger = %trigger,
            lifecycle = ?lifecycle,
            replaced,
            "Job installed"
        );
    }

    /// Removes a job. Returns whether it existed.
    pub fn remove(&mut self, name: &str) -> bool {
        let mut removed = self.jobs.remove(name).is_some();
        if let Some(running) = self.running.as_mut().filter(|running| running.name == name) {
            removed |= !running.removed;
            running.removed = true;
        }
        if removed {
            info!(job = %name, "Job removed");
        }
        removed
    }

    /// Whether a job is installed under `name`.
    ///
    /// The running job counts as installed until it removes itself.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Describes an installed job.
    pub fn get(&self, name: &str) -> Option<JobInfo> {
        match self.jobs.get(name) {
            Some(entry) => Some(JobInfo {
                priority: entry.priority,
                trigger: entry.trigger,
                lifecycle: entry.lifecycle,
            }),
            None => self.running_as(name).map(|running| running.info),
        }
    }

    /// Number of installed jobs.
    pub fn len(&self) -> usize {
        let running = self
            .running
            .as_ref()
            .is_some_and(|running| !running.removed && !self.jobs.contains_key(&running.name));
        self.jobs.len() + usize::from(running)
    }

    /// Whether no job is installed.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Removes every job, the running one included.
    pub fn clear(&mut self) {
        self.jobs.clear();
        if let Some(running) = self.running.as_mut() {
            running.removed = true;
        }
    }

    /// The running job, unless it removed itself.
    fn running_as(&self, name: &str) -> Option<&RunningJob> {
        self.running
            .as_ref()
            .filter(|running| running.name == name && !running.removed)
    }

    /// Job names in execution order: priority descending, then installation order.
    pub fn ordered(&self) -> Vec<String> {
        let mut entries: Vec<(&String, &JobEntry)> = self.jobs.iter().collect();
        entries.sort_by(|(_, a), (_, b)| b.priority.cmp(&a.priority).then(a.seq.cmp(&b.seq)));
        entries.into_iter().map(|(name, _)| name.clone()).collect()
    }

    /// Runs every job triggered by `event`.
    pub fn dispatch(&mut self, event: Event, app: &mut App) -> DispatchReport {
        let mut report = DispatchReport::default();

        for name in self.ordered() {
            let triggered = self
                .jobs
                .get(&name)
                .is_some_and(|entry| entry.trigger == event);
            if !triggered {
                continue;
            }
            // Taken out of the table while it runs.
            let Some(mut entry) = self.jobs.remove(&name) else {
                continue;
            };

            debug!(job = %name, event = %event, priority = entry.priority, "Running job");

            let outer = self.running.replace(RunningJob {
                name: name.clone(),
                info: JobInfo {
                    priority: entry.priority,
                    trigger: entry.trigger,
                    lifecycle: entry.lifecycle,
                },
                seq: entry.seq,
                removed: false,
            });
            let outcome =
                panic::catch_unwind(AssertUnwindSafe(|| (entry.callback)(app, &mut *self)));
            let running = std::mem::replace(&mut self.running, outer);

            let failure = match outcome {
                Ok(Ok(())) => None,
                Ok(Err(e)) => Some(e.to_string()),
                Err(payload) => Some(format!("panicked: {}", panic_message(payload.as_ref()))),
            };

            if let Some(message) = failure {
                error!(job = %name, event = %event, error = %message, "Job failed");
                report.failed.push(JobFailure {
                    job: name.clone(),
                    message,
                });
            }
            report.ran.push(name.clone());

            let removed_itself = running.is_some_and(|running| running.removed);
            if self.jobs.contains_key(&name) {
                debug!(job = %name, "Job reinstalled itself");
            } else if removed_itself {
                debug!(job = %name, "Job removed itself");
            } else {
                match entry.lifecycle {
                    Lifecycle::Forever => {
                        self.jobs.insert(name, entry);
                    }
                    Lifecycle::Once => {
                        debug!(job = %name, "One-shot job removed");
                        report.removed.push(name);
                    }
                }
            }
        }

        report
    }
}

impl std::fmt::Debug for EventJobScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventJobScheduler")
            .field("jobs", &self.ordered())
            .finish()
    }
}

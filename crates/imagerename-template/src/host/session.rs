//! One interactive run: the application plus its job table.

use imagerename_core::{AppResult, Event};
use tracing::{debug, info, warn};

use super::app::App;
use super::window::WindowId;
use crate::scheduler::{DispatchReport, EventJobScheduler};

/// The running application together with the job table its hotkeys mutate.
///
/// The two live side by side so a hotkey handler can receive both mutably.
#[derive(Debug)]
pub struct Session {
    app: App,
    jobs: EventJobScheduler,
}

impl Session {
    /// Starts a session around an application whose template is already rendered.
    pub fn new(app: App) -> Self {
        Self {
            app,
            jobs: EventJobScheduler::new(),
        }
    }

    /// The application.
    pub fn app(&self) -> &App {
        &self.app
    }

    /// The application, mutably.
    pub fn app_mut(&mut self) -> &mut App {
        &mut self.app
    }

    /// The job table.
    pub fn jobs(&self) -> &EventJobScheduler {
        &self.jobs
    }

    /// The job table, mutably.
    pub fn jobs_mut(&mut self) -> &mut EventJobScheduler {
        &mut self.jobs
    }

    /// Delivers a key press. Returns `false` when nothing is bound to `combo`.
    pub fn press(&mut self, combo: &str) -> AppResult<bool> {
        let Some(binding) = self.app.binding(combo).cloned() else {
            debug!(combo = %combo, "Unbound key combo");
            return Ok(false);
        };
        debug!(combo = %combo, hotkey = %binding.hotkey, "Hotkey fired");
        binding.handler.call(&mut self.app, &mut self.jobs)?;
        Ok(true)
    }

    /// Clicks a toolbar button.
    pub fn click(&mut self, window: &WindowId, index: usize) -> AppResult<()> {
        self.app.click(window, index)
    }

    /// Runs one host loop cycle.
    ///
    /// `Tick` jobs run every cycle. When the subject changed since the last
    /// cycle, panel views are notified and `ImgChange` jobs run as well.
    /// Background programs that exited are reaped.
    pub fn tick(&mut self) -> DispatchReport {
        self.app.reap_children();
        let mut report = self.jobs.dispatch(Event::Tick, &mut self.app);
        if self.app.subject_mut().take_changed() {
            self.app.broadcast(Event::ImgChange);
            report.extend(self.jobs.dispatch(Event::ImgChange, &mut self.app));
        }
        for failure in &report.failed {
            warn!(job = %failure.job, error = %failure.message, "Job failed during tick");
        }
        report
    }

    /// Whether every image was handled.
    pub fn is_finished(&self) -> bool {
        self.app.subject().is_finished()
    }

    /// Ends the session. The job table is dropped with it.
    pub fn shutdown(self) -> App {
        info!(
            jobs = self.jobs.len(),
            background_programs = self.app.background_programs(),
            "Session shutting down"
        );
        self.app
    }
}

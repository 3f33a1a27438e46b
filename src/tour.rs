//! Guided onboarding tour of the admin area.
//!
//! The controller walks a first-time administrator through the dashboard,
//! properties and settings sections in that order. Progress is written to the
//! [`PreferenceStore`] so a finished tour never shows again; the in-memory run
//! state lives only as long as the controller.

mod steps;

use std::{
    collections::BTreeSet,
    fmt,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use tokio::{task::JoinHandle, time::sleep};
use tracing::{debug, info};

pub use self::steps::{steps_for, Placement, Step, Target};
use crate::preference::PreferenceStore;

pub const OVERALL_STATUS_KEY: &str = "hasSeenAdminTutorial";
const SECTION_SEEN_PREFIX: &str = "hasSeenTutorial_";
const IN_PROGRESS: &str = "true";
const COMPLETED: &str = "completed";
const ADMIN_ROOT: &str = "/admin";
pub const RESTART_SECTION_PROMPT: &str =
    "Are you sure you want to restart the tutorial for this section?";

const SETTLE_DELAY: Duration = Duration::from_millis(500);
const TRANSITION_DELAY: Duration = Duration::from_millis(300);

#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum TourSection {
    Dashboard,
    Properties,
    Settings,
}

impl TourSection {
    /// Sections in walkthrough order.
    pub const ALL: [TourSection; 3] = [Self::Dashboard, Self::Properties, Self::Settings];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Dashboard => "dashboard",
            Self::Properties => "properties",
            Self::Settings => "settings",
        }
    }

    /// Maps an admin path to its section. The root and unknown segments fall
    /// back to the dashboard.
    pub fn from_path(path: &str) -> Self {
        match path.split('/').nth(2).unwrap_or_default() {
            "properties" => Self::Properties,
            "settings" => Self::Settings,
            _ => Self::Dashboard,
        }
    }

    pub fn route(self) -> String {
        match self {
            Self::Dashboard => ADMIN_ROOT.to_string(),
            other => format!("{ADMIN_ROOT}/{}", other.as_str()),
        }
    }

    pub fn next(self) -> Option<Self> {
        let pos = Self::ALL.iter().position(|s| *s == self)?;
        Self::ALL.get(pos + 1).copied()
    }

    pub fn is_last(self) -> bool {
        self.next().is_none()
    }

    fn seen_key(self) -> String {
        format!("{SECTION_SEEN_PREFIX}{}", self.as_str())
    }
}

impl fmt::Display for TourSection {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the host reports after a step is dismissed.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum TourAction {
    Next,
    Prev,
    Skip,
    Finished,
    /// The step's anchor was missing when the host tried to render it.
    Error,
}

/// How a terminal signal reached the controller.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Delivery {
    /// Reported once for the tour as a whole.
    Tour,
    /// Reported by the callback of the step that was just dismissed.
    Step,
}

/// Persisted progress of the whole walkthrough.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum OverallStatus {
    Unset,
    InProgress,
    Completed,
}

impl OverallStatus {
    fn load(prefs: &dyn PreferenceStore) -> Self {
        match prefs.get(OVERALL_STATUS_KEY).as_deref() {
            Some(COMPLETED) => Self::Completed,
            Some(IN_PROGRESS) => Self::InProgress,
            Some(other) => {
                debug!("Ignoring unexpected tour status {other:?}");
                Self::Unset
            }
            None => Self::Unset,
        }
    }
}

/// The current route, and a way to change it.
pub trait Navigator: Send + Sync {
    fn current_path(&self) -> String;
    fn navigate(&self, path: &str);
}

/// Tells whether a selector matches an element currently on screen.
pub trait ElementProbe: Send + Sync {
    fn exists(&self, selector: &str) -> bool;
}

/// Collaborators the controller talks to.
#[derive(Clone)]
pub struct TourHost {
    pub prefs: Arc<dyn PreferenceStore>,
    pub navigator: Arc<dyn Navigator>,
    pub probe: Arc<dyn ElementProbe>,
}

#[derive(Copy, Clone, Debug)]
pub struct TourTiming {
    /// Wait after mounting so the page finishes rendering its anchors.
    pub settle: Duration,
    /// Wait between finishing a section and opening the next one.
    pub transition: Duration,
}

impl Default for TourTiming {
    fn default() -> Self {
        Self {
            settle: SETTLE_DELAY,
            transition: TRANSITION_DELAY,
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TourRunState {
    pub is_running: bool,
    pub current_step_index: usize,
    pub current_section: TourSection,
    pub completed_sections: BTreeSet<TourSection>,
    pub is_initialized: bool,
}

struct Shared {
    host: TourHost,
    state: Mutex<TourRunState>,
}

impl Shared {
    fn state(&self) -> MutexGuard<'_, TourRunState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Drives the onboarding walkthrough for one admin session.
///
/// Must be created inside a tokio runtime. Dropping the controller aborts any
/// pending delay, so no callback ever runs after unmount.
pub struct TourController {
    shared: Arc<Shared>,
    timing: TourTiming,
    settle: Option<JoinHandle<()>>,
    transition: Option<JoinHandle<()>>,
}

impl TourController {
    pub fn mount(host: TourHost, timing: TourTiming) -> Self {
        let section = TourSection::from_path(&host.navigator.current_path());
        let shared = Arc::new(Shared {
            host,
            state: Mutex::new(TourRunState {
                is_running: false,
                current_step_index: 0,
                current_section: section,
                completed_sections: BTreeSet::new(),
                is_initialized: false,
            }),
        });
        let mut controller = Self {
            shared,
            timing,
            settle: None,
            transition: None,
        };
        controller.initialize();
        controller
    }

    /// Re-runs initialization for a new admin route.
    pub fn route_changed(&mut self, path: &str) {
        let section = TourSection::from_path(path);
        self.shared.state().current_section = section;
        self.initialize();
    }

    fn initialize(&mut self) {
        if let Some(pending) = self.settle.take() {
            pending.abort();
        }
        let section = {
            let mut state = self.shared.state();
            state.is_initialized = false;
            let section = state.current_section;
            let seen = self.shared.host.prefs.get(&section.seen_key());
            if seen.as_deref() == Some(IN_PROGRESS) {
                state.completed_sections.insert(section);
            } else {
                state.completed_sections.remove(&section);
            }
            section
        };

        if OverallStatus::load(self.shared.host.prefs.as_ref()) == OverallStatus::Completed {
            let mut state = self.shared.state();
            state.is_running = false;
            state.is_initialized = true;
            return;
        }

        debug!("Tour waiting for {section} to settle");
        let shared = Arc::clone(&self.shared);
        let delay = self.timing.settle;
        self.settle = Some(tokio::spawn(async move {
            sleep(delay).await;
            let completed =
                OverallStatus::load(shared.host.prefs.as_ref()) == OverallStatus::Completed;
            let mut state = shared.state();
            if !completed {
                state.is_running = true;
            }
            state.is_initialized = true;
        }));
    }

    /// Steps of the current section whose anchors are on screen.
    pub fn steps(&self) -> Vec<&'static Step> {
        let section = self.shared.state().current_section;
        self.visible_steps(section)
    }

    fn visible_steps(&self, section: TourSection) -> Vec<&'static Step> {
        let probe = &self.shared.host.probe;
        steps_for(section)
            .iter()
            .filter(|step| match step.target {
                Target::WholePage => true,
                Target::Selector(selector) => probe.exists(selector),
            })
            .collect()
    }

    pub fn current_step(&self) -> Option<&'static Step> {
        let index = self.shared.state().current_step_index;
        self.steps().get(index).copied()
    }

    pub fn state(&self) -> TourRunState {
        self.shared.state().clone()
    }

    pub fn is_running(&self) -> bool {
        self.shared.state().is_running
    }

    pub fn is_initialized(&self) -> bool {
        self.shared.state().is_initialized
    }

    pub fn current_step_index(&self) -> usize {
        self.shared.state().current_step_index
    }

    pub fn current_section(&self) -> TourSection {
        self.shared.state().current_section
    }

    /// Applies one host callback reported for the tour as a whole.
    pub fn advance(&mut self, action: TourAction) {
        self.advance_with(action, Delivery::Tour);
    }

    pub fn advance_with(&mut self, action: TourAction, delivery: Delivery) {
        match action {
            TourAction::Next => self.shared.state().current_step_index += 1,
            TourAction::Error => {
                let mut state = self.shared.state();
                debug!(
                    "Tour anchor missing at step {}, moving on",
                    state.current_step_index
                );
                state.current_step_index += 1;
            }
            TourAction::Prev => {
                let mut state = self.shared.state();
                state.current_step_index = state.current_step_index.saturating_sub(1);
            }
            TourAction::Skip | TourAction::Finished => {
                self.complete_section(action == TourAction::Skip, delivery);
            }
        }
    }

    fn complete_section(&mut self, skipped: bool, delivery: Delivery) {
        let section = self.current_section();
        let last_index = self.visible_steps(section).len().saturating_sub(1);
        let prefs = &self.shared.host.prefs;

        let mut state = self.shared.state();
        if !state.is_running {
            debug!("Ignoring end of {section} tour, no tour is running");
            return;
        }
        state.is_running = false;
        state.completed_sections.insert(section);

        let at_last_step = delivery == Delivery::Step && state.current_step_index == last_index;
        if skipped || section.is_last() || at_last_step {
            prefs.set(OVERALL_STATUS_KEY, COMPLETED);
            info!("Admin tour completed in {section}");
            return;
        }

        prefs.set(OVERALL_STATUS_KEY, IN_PROGRESS);
        prefs.set(&section.seen_key(), IN_PROGRESS);
        drop(state);

        let Some(next) = section.next() else {
            return;
        };
        info!("Admin tour finished {section}, continuing with {next}");
        if let Some(pending) = self.transition.take() {
            pending.abort();
        }
        let shared = Arc::clone(&self.shared);
        let delay = self.timing.transition;
        self.transition = Some(tokio::spawn(async move {
            sleep(delay).await;
            shared.host.navigator.navigate(&next.route());
            let mut state = shared.state();
            state.current_section = next;
            state.current_step_index = 0;
            state.is_running = true;
        }));
    }

    /// Forgets all progress and starts over from the dashboard.
    pub fn restart_all(&mut self) {
        if let Some(pending) = self.transition.take() {
            pending.abort();
        }
        let prefs = &self.shared.host.prefs;
        prefs.remove(OVERALL_STATUS_KEY);
        for section in TourSection::ALL {
            prefs.remove(&section.seen_key());
        }
        {
            let mut state = self.shared.state();
            state.completed_sections.clear();
            state.current_step_index = 0;
            state.current_section = TourSection::Dashboard;
            state.is_running = true;
        }
        info!("Admin tour restarted");
        self.shared
            .host
            .navigator
            .navigate(&TourSection::Dashboard.route());
    }

    /// Replays the current section once `confirm` approves the prompt.
    ///
    /// Other sections and the overall status are left alone. Returns whether
    /// the restart happened.
    pub fn restart_section(&mut self, confirm: impl FnOnce(&str) -> bool) -> bool {
        if !confirm(RESTART_SECTION_PROMPT) {
            return false;
        }
        let mut state = self.shared.state();
        let section = state.current_section;
        self.shared.host.prefs.remove(&section.seen_key());
        state.completed_sections.remove(&section);
        state.current_step_index = 0;
        state.is_running = true;
        info!("Admin tour restarted for {section}");
        true
    }

    /// Stops the controller and cancels its pending delays.
    pub fn unmount(self) {}
}

impl Drop for TourController {
    fn drop(&mut self) {
        for pending in [self.settle.take(), self.transition.take()]
            .into_iter()
            .flatten()
        {
            pending.abort();
        }
    }
}

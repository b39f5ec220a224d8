//! Dashboard controller: owns the source, the chart set, the page and the
//! single recurring refresh timer.
//!
//! Cycles are serialized by one in-flight guard. A manual refresh waits for
//! a running cycle to finish and then runs its own; a timer tick that finds a
//! cycle running is skipped. A cycle fetches first (its only await point),
//! then validates and renders every chart into a staging list, and only then
//! locks the page and mounts them all, so a failed cycle never leaves a
//! partially updated page.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use serde_json::json;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use crate::chart::{render_chart, ChartSet};
use crate::error::DashboardError;
use crate::logging::{
    log, log_cycle_failed, log_cycle_ok, log_cycle_skipped, log_cycle_start, log_timer_replaced, obj,
    payload_digest, ts_now, v_str, Domain, Level, ProfileScope,
};
use crate::page::{NoticeLevel, Page};
use crate::render::Element;
use crate::source::MetricsSource;
use crate::validate::validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// No recurring timer registered yet (or shut down).
    Idle,
    /// Exactly one recurring timer is live.
    Live,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Fetched, validated and mounted every chart.
    Completed,
    /// Not run: another cycle was in flight, or the dashboard was shut down.
    Skipped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Trigger {
    Init,
    Manual,
    Timer,
}

impl Trigger {
    fn as_str(self) -> &'static str {
        match self {
            Trigger::Init => "init",
            Trigger::Manual => "manual",
            Trigger::Timer => "timer",
        }
    }
}

struct Inner {
    source: Box<dyn MetricsSource>,
    charts: ChartSet,
    required: Vec<&'static str>,
    page: Mutex<Page>,
    in_flight: tokio::sync::Mutex<()>,
    cycle_seq: AtomicU64,
    completed: AtomicU64,
    closed: AtomicBool,
}

impl Inner {
    fn page(&self) -> MutexGuard<'_, Page> {
        self.page.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn run(&self, trigger: Trigger) -> Result<CycleOutcome, DashboardError> {
        if self.closed.load(Ordering::SeqCst) {
            return Ok(CycleOutcome::Skipped);
        }
        let cycle = self.cycle_seq.fetch_add(1, Ordering::SeqCst) + 1;
        log_cycle_start(cycle, trigger.as_str(), &self.source.describe());
        let _scope = ProfileScope::with_context("refresh_cycle", &[("cycle", json!(cycle))]);

        match self.attempt(cycle, trigger).await {
            Ok(outcome) => Ok(outcome),
            Err(err) if self.closed.load(Ordering::SeqCst) => {
                log(
                    Level::Debug,
                    Domain::Scheduler,
                    "cycle_discarded",
                    obj(&[("cycle", json!(cycle)), ("msg", v_str(&err.to_string()))]),
                );
                Ok(CycleOutcome::Skipped)
            }
            Err(err) => {
                log_cycle_failed(cycle, trigger.as_str(), err.kind(), &err.to_string());
                self.page().notify(NoticeLevel::Error, format!("Dashboard refresh failed: {}", err));
                Err(err)
            }
        }
    }

    async fn attempt(&self, cycle: u64, trigger: Trigger) -> Result<CycleOutcome, DashboardError> {
        let raw = self.source.fetch().await?;
        let digest = payload_digest(&raw);
        let dataset = validate(raw, &self.required)?;

        let staged = self
            .charts
            .charts
            .iter()
            .map(|spec| render_chart(&dataset, spec).map(|el| (spec.region, el)))
            .collect::<Result<Vec<(&'static str, Element)>, DashboardError>>()?;

        // Shutdown may have happened while the fetch was pending.
        if self.closed.load(Ordering::SeqCst) {
            return Ok(CycleOutcome::Skipped);
        }
        let mut page = self.page();
        for (region, el) in staged {
            page.mount(region, el);
        }
        page.set_last_updated(dataset.generated_at().map(str::to_string).unwrap_or_else(ts_now));
        drop(page);

        self.completed.fetch_add(1, Ordering::SeqCst);
        log_cycle_ok(cycle, trigger.as_str(), self.charts.charts.len(), &digest);
        Ok(CycleOutcome::Completed)
    }

    async fn manual(&self, trigger: Trigger) -> Result<CycleOutcome, DashboardError> {
        let _guard = self.in_flight.lock().await;
        self.run(trigger).await
    }

    async fn tick(&self) -> Result<CycleOutcome, DashboardError> {
        let Ok(_guard) = self.in_flight.try_lock() else {
            log_cycle_skipped(Trigger::Timer.as_str());
            return Ok(CycleOutcome::Skipped);
        };
        self.run(Trigger::Timer).await
    }
}

pub struct Dashboard {
    inner: Arc<Inner>,
    period: Duration,
    timer: Mutex<Option<JoinHandle<()>>>,
}

impl Dashboard {
    pub fn new(source: Box<dyn MetricsSource>, charts: ChartSet, period: Duration) -> Self {
        let page = Page::new(charts.title, charts.regions());
        let required = charts.required_sections();
        Self {
            inner: Arc::new(Inner {
                source,
                charts,
                required,
                page: Mutex::new(page),
                in_flight: tokio::sync::Mutex::new(()),
                cycle_seq: AtomicU64::new(0),
                completed: AtomicU64::new(0),
                closed: AtomicBool::new(false),
            }),
            period,
            timer: Mutex::new(None),
        }
    }

    /// Runs one cycle now and, if it succeeds, replaces the recurring timer.
    ///
    /// A failed cycle leaves any existing timer in place.
    pub async fn initialize(&self) -> Result<CycleOutcome, DashboardError> {
        self.cycle_and_rearm(Trigger::Init).await
    }

    /// The page's refresh control: same as [`Dashboard::initialize`].
    pub async fn refresh(&self) -> Result<CycleOutcome, DashboardError> {
        self.cycle_and_rearm(Trigger::Manual).await
    }

    async fn cycle_and_rearm(&self, trigger: Trigger) -> Result<CycleOutcome, DashboardError> {
        let outcome = self.inner.manual(trigger).await?;
        if outcome == CycleOutcome::Completed {
            self.rearm();
        }
        Ok(outcome)
    }

    /// One timer-driven cycle; skipped while another cycle is in flight.
    pub async fn tick(&self) -> Result<CycleOutcome, DashboardError> {
        self.inner.tick().await
    }

    fn timer_slot(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.timer.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn rearm(&self) {
        // Checked under the slot lock so a concurrent shutdown cannot slip in
        // between the check and the store.
        let mut slot = self.timer_slot();
        if self.inner.closed.load(Ordering::SeqCst) {
            return;
        }
        let weak: Weak<Inner> = Arc::downgrade(&self.inner);
        let period = self.period;
        let handle = tokio::spawn(async move {
            let mut ticks = interval_at(Instant::now() + period, period);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticks.tick().await;
                let Some(inner) = weak.upgrade() else { break };
                // Errors are already logged and shown on the page.
                let _ = inner.tick().await;
            }
        });
        let previous = slot.replace(handle);
        drop(slot);
        let cancelled = previous.is_some();
        if let Some(old) = previous {
            old.abort();
        }
        log_timer_replaced(self.period.as_secs(), cancelled);
    }

    pub fn has_live_timer(&self) -> bool {
        self.timer_slot().as_ref().map_or(false, |h| !h.is_finished())
    }

    pub fn state(&self) -> SchedulerState {
        if self.has_live_timer() {
            SchedulerState::Live
        } else {
            SchedulerState::Idle
        }
    }

    pub fn cycles_completed(&self) -> u64 {
        self.inner.completed.load(Ordering::SeqCst)
    }

    /// Cancels the timer and detaches every interaction target. Cycles still
    /// in flight finish their fetch but are discarded.
    pub fn shutdown(&self) {
        let mut slot = self.timer_slot();
        self.inner.closed.store(true, Ordering::SeqCst);
        if let Some(handle) = slot.take() {
            handle.abort();
        }
        drop(slot);
        self.inner.page().detach();
        log(Level::Info, Domain::Scheduler, "shutdown", obj(&[]));
    }

    pub fn pointer_move(&self, region: &str, target: usize, x: f64, y: f64) -> bool {
        self.inner.page().pointer_move(region, target, x, y)
    }

    pub fn pointer_leave(&self, region: &str, target: usize) -> bool {
        self.inner.page().pointer_leave(region, target)
    }

    pub fn click(&self, region: &str, target: usize) -> bool {
        self.inner.page().click(region, target)
    }

    pub fn page_html(&self) -> String {
        let _scope = ProfileScope::new("page_html");
        self.inner.page().to_html()
    }

    /// Read access to the page, e.g. for inspecting regions.
    pub fn with_page<R>(&self, f: impl FnOnce(&Page) -> R) -> R {
        f(&self.inner.page())
    }
}

impl Drop for Dashboard {
    fn drop(&mut self) {
        if let Some(handle) = self.timer_slot().take() {
            handle.abort();
        }
    }
}

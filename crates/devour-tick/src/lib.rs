//! Fixed-interval tick scheduler for Devour rooms.
//!
//! Each room owns one [`TickScheduler`]. It fires every `interval`, always
//! hands the game the same fixed `dt`, and never skips: a tick that wakes
//! late is still delivered, and the next one is scheduled a full interval
//! after it. Under load the cadence drifts instead of bursting.
//!
//! # Integration
//!
//! The scheduler sits inside a room actor's `tokio::select!` loop:
//!
//! ```ignore
//! loop {
//!     tokio::select! {
//!         Some(cmd) = cmd_rx.recv() => { /* handle commands */ }
//!         tick = scheduler.wait_for_tick() => {
//!             simulation.step(&mut world, tick.dt);
//!             scheduler.record_tick_end();
//!         }
//!     }
//! }
//! ```

use std::time::{Duration, Instant};

use rand::Rng;
use tokio::time::{self, Instant as TokioInstant};
use tracing::{debug, trace, warn};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// How a room's clock runs.
#[derive(Debug, Clone)]
pub struct TickConfig {
    /// Time between ticks, and the `dt` every tick reports.
    pub interval: Duration,
    /// Budget warning threshold (0.0–1.0). Default: 0.80.
    /// A warning is emitted when tick execution exceeds this fraction of
    /// the interval.
    pub budget_warn_threshold: f64,
    /// Budget critical threshold (0.0–1.0). Default: 1.0.
    pub budget_critical_threshold: f64,
    /// Enable per-tick timing metrics.
    pub metrics_enabled: bool,
    /// Random jitter (0–max µs) added to the *first* tick so rooms created
    /// at the same instant do not tick in lockstep.
    pub initial_jitter_us: u64,
}

impl Default for TickConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(16),
            budget_warn_threshold: 0.80,
            budget_critical_threshold: 1.0,
            metrics_enabled: true,
            initial_jitter_us: 2_000,
        }
    }
}

impl TickConfig {
    /// Shortest interval the scheduler accepts.
    pub const MIN_INTERVAL: Duration = Duration::from_millis(1);

    /// A config for the given interval with default thresholds.
    pub fn with_interval(interval: Duration) -> Self {
        Self {
            interval,
            ..Default::default()
        }
    }

    /// Clamps out-of-range values. [`TickScheduler::new`] calls this.
    ///
    /// The interval is raised to [`Self::MIN_INTERVAL`]; both thresholds
    /// are kept in `0.0..=1.0` with the warning level never above the
    /// critical one.
    pub fn validated(mut self) -> Self {
        if self.interval < Self::MIN_INTERVAL {
            warn!(
                interval_us = self.interval.as_micros() as u64,
                "tick interval below minimum, clamping"
            );
            self.interval = Self::MIN_INTERVAL;
        }
        let critical = match self.budget_critical_threshold {
            t if t.is_nan() => 1.0,
            t => t.clamp(0.0, 1.0),
        };
        self.budget_critical_threshold = critical;
        self.budget_warn_threshold = self.budget_warn_threshold.clamp(0.0, critical);
        self
    }
}

// ---------------------------------------------------------------------------
// Tick info (returned to caller each tick)
// ---------------------------------------------------------------------------

/// Information about a fired tick, returned by [`TickScheduler::wait_for_tick`].
#[derive(Debug, Clone)]
pub struct TickInfo {
    /// 1 for the first tick, then counting up.
    pub tick: u64,
    /// Fixed delta time (always the configured interval).
    pub dt: Duration,
    /// `true` if this tick woke more than 10% of an interval late.
    pub overrun: bool,
    /// How late the tick woke.
    pub late_by: Duration,
}

// ---------------------------------------------------------------------------
// Metrics
// ---------------------------------------------------------------------------

/// How the room's ticks have been going.
///
/// Timing values refer to the work reported through
/// [`TickScheduler::record_tick_end`].
#[derive(Debug, Clone, Default)]
pub struct TickMetrics {
    /// Total ticks fired.
    pub total_ticks: u64,
    /// Ticks that woke late.
    pub total_overruns: u64,
    /// Moving average of the work per tick.
    pub avg_tick_time: Duration,
    /// Slowest tick so far.
    pub max_tick_time: Duration,
    /// Last tick's budget utilization (0.0–∞). >1.0 means overrun.
    pub budget_utilization: f64,
}

// ---------------------------------------------------------------------------
// Scheduler
// ---------------------------------------------------------------------------

/// Fixed-interval tick scheduler. One per room actor.
pub struct TickScheduler {
    config: TickConfig,
    tick_count: u64,
    /// Deadline of the next tick on the Tokio clock.
    next_tick: TokioInstant,
    /// Wall-clock instant when the last tick's work started.
    tick_start: Option<Instant>,
    metrics: TickMetrics,
}

impl TickScheduler {
    /// Creates a scheduler. The first tick is due one interval (plus
    /// jitter) from now.
    pub fn new(config: TickConfig) -> Self {
        let config = config.validated();

        let jitter = if config.initial_jitter_us > 0 {
            Duration::from_micros(rand::rng().random_range(0..config.initial_jitter_us))
        } else {
            Duration::ZERO
        };
        let next_tick = TokioInstant::now() + config.interval + jitter;

        debug!(
            interval_ms = config.interval.as_secs_f64() * 1000.0,
            jitter_us = jitter.as_micros() as u64,
            "tick scheduler created"
        );

        Self {
            config,
            tick_count: 0,
            next_tick,
            tick_start: None,
            metrics: TickMetrics::default(),
        }
    }

    /// A scheduler for the given interval with default settings.
    pub fn with_interval(interval: Duration) -> Self {
        Self::new(TickConfig::with_interval(interval))
    }

    /// Waits until the next tick is due.
    ///
    /// Cancel-safe: if the future is dropped before it resolves (another
    /// `select!` branch won), no tick is consumed.
    pub async fn wait_for_tick(&mut self) -> TickInfo {
        let due = self.next_tick;
        let interval = self.config.interval;

        time::sleep_until(due).await;

        let now = TokioInstant::now();
        self.tick_count += 1;
        self.tick_start = Some(Instant::now());

        let late_by = now.saturating_duration_since(due);
        let overrun = late_by > interval / 10;

        // On time: keep the original cadence. Late: drift, never burst.
        self.next_tick = if overrun {
            warn!(
                tick = self.tick_count,
                late_ms = late_by.as_secs_f64() * 1000.0,
                "tick woke late, delaying the next one"
            );
            now + interval
        } else {
            due + interval
        };

        if overrun {
            self.metrics.total_overruns += 1;
        }
        self.metrics.total_ticks += 1;

        trace!(tick = self.tick_count, overrun, "tick fired");

        TickInfo {
            tick: self.tick_count,
            dt: interval,
            overrun,
            late_by,
        }
    }

    /// Records that the work for the current tick has finished.
    ///
    /// Call after the simulation step returns. Without it the scheduler
    /// cannot see how much of the interval a tick used.
    pub fn record_tick_end(&mut self) {
        let Some(start) = self.tick_start.take() else {
            return;
        };
        let spent = start.elapsed();
        let used = spent.as_secs_f64() / self.config.interval.as_secs_f64();
        self.metrics.budget_utilization = used;

        let level = if used >= self.config.budget_critical_threshold {
            Some("over budget")
        } else if used >= self.config.budget_warn_threshold {
            Some("near budget")
        } else {
            None
        };
        if let Some(level) = level {
            warn!(
                tick = self.tick_count,
                spent_us = spent.as_micros() as u64,
                interval_us = self.config.interval.as_micros() as u64,
                used_pct = (used * 100.0).round(),
                level,
                "slow tick"
            );
        }

        if self.config.metrics_enabled {
            self.metrics.max_tick_time = self.metrics.max_tick_time.max(spent);
            // EMA with alpha = 0.1
            let avg = self.metrics.avg_tick_time.as_secs_f64();
            self.metrics.avg_tick_time = Duration::from_secs_f64(0.9 * avg + 0.1 * spent.as_secs_f64());
        }
    }

    /// Ticks fired so far.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn metrics(&self) -> &TickMetrics {
        &self.metrics
    }

    /// The fixed interval (and `dt`).
    pub fn interval(&self) -> Duration {
        self.config.interval
    }
}

//! Health tracking for the hosting loop
//!
//! Counters are plain atomics so the receiving and ticking threads can update them
//! without locking. The only lock guards the timestamp of the last completed cycle.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use crate::core::constants::HEALTHY_CYCLE_AGE_SECS;

/// Overall status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
}

/// Point-in-time health snapshot
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub status: HealthStatus,
    /// Wall-clock time of the last completed cycle (seconds since the Unix epoch)
    pub last_update_time: Option<f64>,
    /// Seconds since the last completed cycle, `None` before the first one
    pub time_since_last_update: Option<f64>,
    pub beacon_count: usize,
    pub total_nodes_processed: u64,
    pub cycles_completed: u64,
    pub cycles_failed: u64,
    pub ticks_skipped_busy: u64,
    pub snapshots_dropped: u64,
    pub uptime_seconds: f64,
    pub version: String,
}

#[derive(Debug, Clone, Copy)]
struct LastUpdate {
    at: Instant,
    wall: SystemTime,
}

/// Health counters shared between the receiving and ticking threads
#[derive(Debug)]
pub struct HealthMonitor {
    started: Instant,
    last_update: Mutex<Option<LastUpdate>>,
    beacon_count: AtomicUsize,
    nodes_processed: AtomicU64,
    cycles_completed: AtomicU64,
    cycles_failed: AtomicU64,
    ticks_skipped: AtomicU64,
    snapshots_dropped: AtomicU64,
}

impl Default for HealthMonitor {
    fn default() -> Self {
        Self::new()
    }
}

impl HealthMonitor {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
            last_update: Mutex::new(None),
            beacon_count: AtomicUsize::new(0),
            nodes_processed: AtomicU64::new(0),
            cycles_completed: AtomicU64::new(0),
            cycles_failed: AtomicU64::new(0),
            ticks_skipped: AtomicU64::new(0),
            snapshots_dropped: AtomicU64::new(0),
        }
    }

    /// Record a completed cycle over `nodes` nodes
    pub fn record_cycle(&self, nodes: usize) {
        self.record_cycle_at(nodes, Instant::now());
    }

    fn record_cycle_at(&self, nodes: usize, at: Instant) {
        self.cycles_completed.fetch_add(1, Ordering::Relaxed);
        self.nodes_processed.fetch_add(nodes as u64, Ordering::Relaxed);
        if let Ok(mut last) = self.last_update.lock() {
            *last = Some(LastUpdate {
                at,
                wall: SystemTime::now(),
            });
        }
    }

    pub fn record_failure(&self) {
        self.cycles_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_busy_skip(&self) {
        self.ticks_skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_dropped_snapshot(&self) {
        self.snapshots_dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn set_beacon_count(&self, count: usize) {
        self.beacon_count.store(count, Ordering::Relaxed);
    }

    pub fn report(&self) -> HealthReport {
        self.report_at(Instant::now())
    }

    /// Health as seen at `now`
    pub fn report_at(&self, now: Instant) -> HealthReport {
        let last = self.last_update.lock().ok().and_then(|guard| *guard);
        let since = last.map(|l| now.saturating_duration_since(l.at));

        let status = match since {
            Some(age) if age < Duration::from_secs_f64(HEALTHY_CYCLE_AGE_SECS) => HealthStatus::Healthy,
            _ => HealthStatus::Degraded,
        };

        HealthReport {
            status,
            last_update_time: last.and_then(|l| l.wall.duration_since(UNIX_EPOCH).ok()).map(|d| d.as_secs_f64()),
            time_since_last_update: since.map(|d| d.as_secs_f64()),
            beacon_count: self.beacon_count.load(Ordering::Relaxed),
            total_nodes_processed: self.nodes_processed.load(Ordering::Relaxed),
            cycles_completed: self.cycles_completed.load(Ordering::Relaxed),
            cycles_failed: self.cycles_failed.load(Ordering::Relaxed),
            ticks_skipped_busy: self.ticks_skipped.load(Ordering::Relaxed),
            snapshots_dropped: self.snapshots_dropped.load(Ordering::Relaxed),
            uptime_seconds: now.saturating_duration_since(self.started).as_secs_f64(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

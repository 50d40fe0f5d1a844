//! Safety monitor implementation
//!
//! Checks current, temperature, pack voltage and sensor freshness against
//! the configured limits. A condition must hold for a number of
//! consecutive evaluations before it latches as a hard fault; once latched
//! the fault is reported on every evaluation until `clear()`.

use crate::config::SafetyLimits;
use crate::state::FaultKind;
use crate::store::{Freshness, Snapshot};

/// Evaluation order; the first confirmed condition wins the latch
const CONDITIONS: [FaultKind; 4] = [
    FaultKind::OverCurrent,
    FaultKind::OverTemp,
    FaultKind::UnderVoltage,
    FaultKind::SensorStale,
];

/// Safety condition status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SafetyStatus {
    /// All conditions normal
    Ok,
    /// Temperature at or above the warning level, below critical
    WarnTemp,
    /// Hard fault latched
    Fault(FaultKind),
}

impl SafetyStatus {
    /// Check if this status requires an abort
    pub fn is_fault(&self) -> bool {
        matches!(self, SafetyStatus::Fault(_))
    }
}

/// Safety monitor for fault detection
#[derive(Debug, Clone)]
pub struct SafetyMonitor {
    limits: SafetyLimits,
    /// Consecutive ticks each condition has held, indexed like `CONDITIONS`
    counters: [u8; 4],
    latched: Option<FaultKind>,
}

impl SafetyMonitor {
    /// Create a new safety monitor
    pub fn new(limits: SafetyLimits) -> Self {
        Self {
            limits,
            counters: [0; 4],
            latched: None,
        }
    }

    fn holds(
        &self,
        kind: FaultKind,
        snapshot: &Snapshot,
        freshness: &Freshness,
        now_ms: u32,
    ) -> bool {
        let l = &self.limits;
        match kind {
            FaultKind::OverCurrent => snapshot.current_a >= l.max_current_a,
            FaultKind::OverTemp => snapshot.temperature_c >= l.critical_temp_c,
            FaultKind::UnderVoltage => snapshot.voltage_v <= l.min_voltage_v,
            FaultKind::SensorStale => freshness.stale(now_ms, l.stale_timeout_ms).is_some(),
        }
    }

    /// Evaluate one tick
    ///
    /// Updates the debounce counters and returns the latched fault if any,
    /// otherwise the advisory temperature status.
    pub fn evaluate(
        &mut self,
        snapshot: &Snapshot,
        freshness: &Freshness,
        now_ms: u32,
    ) -> SafetyStatus {
        for (i, kind) in CONDITIONS.into_iter().enumerate() {
            self.counters[i] = if self.holds(kind, snapshot, freshness, now_ms) {
                self.counters[i].saturating_add(1)
            } else {
                0
            };
        }

        if self.latched.is_none() {
            let debounce = self.limits.fault_debounce_ticks;
            self.latched = CONDITIONS
                .into_iter()
                .zip(self.counters)
                .find(|&(_, count)| count >= debounce)
                .map(|(kind, _)| kind);
        }

        match self.latched {
            Some(kind) => SafetyStatus::Fault(kind),
            None if self.warn_active(snapshot) => SafetyStatus::WarnTemp,
            None => SafetyStatus::Ok,
        }
    }

    /// Advisory: temperature at or above the warning level
    pub fn warn_active(&self, snapshot: &Snapshot) -> bool {
        snapshot.temperature_c >= self.limits.warn_temp_c
    }

    /// Latched fault, if any
    pub fn latched(&self) -> Option<FaultKind> {
        self.latched
    }

    /// No latched fault and no condition part-way through its debounce
    pub fn is_clear(&self) -> bool {
        self.latched.is_none() && self.counters.iter().all(|&c| c == 0)
    }

    /// Drop the latch and all debounce progress
    pub fn clear(&mut self) {
        self.latched = None;
        self.counters = [0; 4];
    }

    /// Configured limits
    pub fn limits(&self) -> &SafetyLimits {
        &self.limits
    }
}

//! Ingest coordinator and query service. One ingest call is one critical section over
//! both stores: load, apply every report, sweep, persist.

use std::sync::Mutex;

use serde::Serialize;

use crate::db::{RadarState, StateStore};
use crate::device::{Evidence, classify, normalize};
use crate::error::{RadarError, RadarResult};
use crate::presence::PresenceEntry;
use crate::probe::{ScanBatch, ScanReport};

/// Reports weaker than this are noise
pub const RSSI_FLOOR: i32 = -95;

/// What happened to a batch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngestSummary {
    pub accepted: usize,
    pub invalid_address: usize,
    pub noise: usize,
    pub malformed: usize,
    pub evicted: usize,
}

/// Owns the durable store and serializes writers.
pub struct Radar {
    store: Box<dyn StateStore>,
    write_lock: Mutex<()>,
}

impl Radar {
    pub fn new(store: Box<dyn StateStore>) -> Self {
        Self {
            store,
            write_lock: Mutex::new(()),
        }
    }

    /// Apply a batch of reports taken at `now` (epoch seconds)
    pub fn ingest(&self, batch: &ScanBatch, now: i64) -> RadarResult<IngestSummary> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| RadarError::LockPoisoned)?;

        let mut state = self.store.load()?;
        let mut summary = IngestSummary {
            malformed: batch.malformed,
            ..Default::default()
        };

        for report in &batch.reports {
            match apply_report(&mut state, report, now) {
                Ok(true) => summary.accepted += 1,
                Ok(false) => summary.noise += 1,
                Err(e) => {
                    tracing::debug!("Skipping report: {}", e);
                    summary.invalid_address += 1;
                }
            }
        }

        // Sweep once per batch so a report cannot be evicted by its own batch
        summary.evicted = state.registry.evict(now);

        self.store.persist(&state)?;

        tracing::debug!(
            accepted = summary.accepted,
            invalid_address = summary.invalid_address,
            noise = summary.noise,
            malformed = summary.malformed,
            evicted = summary.evicted,
            tracked = state.registry.len(),
            "Ingested scan batch"
        );

        Ok(summary)
    }

    /// Current roster, unordered and unfiltered
    pub fn list(&self) -> RadarResult<Vec<PresenceEntry>> {
        Ok(self.store.load_registry()?.snapshot())
    }
}

/// Returns `Ok(false)` for reports dropped as noise.
fn apply_report(state: &mut RadarState, report: &ScanReport, now: i64) -> RadarResult<bool> {
    let address = normalize(&report.address)?;

    if report.rssi < RSSI_FLOOR {
        return Ok(false);
    }

    let evidence = Evidence {
        radio_type: report.radio_type,
        manufacturer_data: report.manufacturer_data.as_deref(),
        advertised_name: report.advertised_name.as_deref(),
    };
    let classification = classify(&state.cache, &address, evidence);

    state.registry.update(
        address,
        report.rssi,
        &classification.result,
        report.radio_type,
        now,
    );
    if classification.should_persist {
        state.cache.record(address, classification.result);
    }

    Ok(true)
}

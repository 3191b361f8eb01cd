//! Per-tick record builder and the run-wide fault log.
//!
//! Collectors never write into shared state: each one fills its own
//! [`SampleBuilder`], the sampler merges them and finalises the record once.

use crate::error::{ProbeError, ProbeResult};
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::time::{SystemTime, UNIX_EPOCH};
use time::OffsetDateTime;
use tracing::{debug, warn};

/// One flat persisted record: metric name -> value.
pub type Sample = Map<String, Value>;

/// Seconds since the epoch as a float, the capture timestamp used for `t*` fields.
pub fn now_secs() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}

/// Nanoseconds since the epoch; zero for instants before it.
pub fn epoch_nanos(ts: OffsetDateTime) -> u64 {
    u64::try_from(ts.unix_timestamp_nanos()).unwrap_or(0)
}

#[derive(Debug, Default)]
pub struct SampleBuilder {
    fields: Sample,
    faults: Vec<(String, ProbeError)>,
}

impl SampleBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Record a probed field, substituting `default` on failure.
    pub fn probe<T: Into<Value>>(
        &mut self,
        key: &str,
        res: ProbeResult<T>,
        default: T,
    ) -> &mut Self {
        let v = match res {
            Ok(v) => v,
            Err(e) => {
                self.faults.push((key.to_string(), e));
                default
            }
        };
        self.set(key, v)
    }

    /// Like [`probe`](Self::probe) but also stamps `t<key>` with the capture time.
    pub fn timed<T: Into<Value>>(
        &mut self,
        key: &str,
        res: ProbeResult<T>,
        default: T,
    ) -> &mut Self {
        self.probe(key, res, default);
        self.set(format!("t{key}"), now_secs())
    }

    /// Note a failure that degraded a group of fields at once.
    pub fn fault(&mut self, key: &str, err: ProbeError) {
        self.faults.push((key.to_string(), err));
    }

    pub fn merge(&mut self, other: SampleBuilder) {
        self.fields.extend(other.fields);
        self.faults.extend(other.faults);
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn faults(&self) -> &[(String, ProbeError)] {
        &self.faults
    }

    /// Hand faults to the log and return the finished record.
    pub fn finish(self, log: &mut FaultLog) -> Sample {
        if !self.faults.is_empty() {
            debug!(degraded = self.faults.len(), "sample finalised with defaults");
        }
        for (field, err) in &self.faults {
            log.report(field, err);
        }
        self.fields
    }
}

/// Remembers which fields already complained so repeats drop to `debug`.
#[derive(Debug, Default)]
pub struct FaultLog {
    seen: HashSet<String>,
}

impl FaultLog {
    pub fn report(&mut self, field: &str, err: &ProbeError) {
        if self.seen.insert(field.to_string()) {
            warn!(field, "{err}; using default");
        } else {
            debug!(field, "{err}; using default");
        }
    }

    pub fn seen(&self, field: &str) -> bool {
        self.seen.contains(field)
    }
}

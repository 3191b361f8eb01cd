//! Sampler loop: one flat record per tick, paced to the configured interval,
//! until the liveness file goes away.

use crate::blockdev::detect_disks;
use crate::cgroup::collect_container;
use crate::config::{CgroupVersion, SamplerConfig};
use crate::liveness::{is_alive, release};
use crate::metrics::{collect_processes, collect_vm};
use crate::record::{epoch_nanos, FaultLog, Sample, SampleBuilder};
use crate::state::HostState;
use crate::static_info::collect_static;
use anyhow::Context;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use time::macros::format_description;
use time::OffsetDateTime;
use tokio::time::sleep;
use tracing::{debug, info};

pub const STATIC_FILE: &str = "static.json";

/// Outcome of one persisted tick.
#[derive(Debug, Clone)]
pub struct TickReport {
    pub path: PathBuf,
    pub elapsed: Duration,
}

pub struct Sampler {
    cfg: SamplerConfig,
    cgroup: CgroupVersion,
    state: HostState,
    faults: FaultLog,
    written: usize,
}

impl Sampler {
    /// Fails only when the output directory cannot be created.
    pub fn new(cfg: SamplerConfig) -> anyhow::Result<Self> {
        fs::create_dir_all(&cfg.output_dir)
            .with_context(|| format!("creating output dir {}", cfg.output_dir.display()))?;
        let cgroup = cfg.cgroup_version.resolve(&cfg.paths.cgroup_root);
        debug!(?cgroup, root = %cfg.paths.cgroup_root.display(), "cgroup layout");
        Ok(Self {
            cfg,
            cgroup,
            state: HostState::new(),
            faults: FaultLog::default(),
            written: 0,
        })
    }

    pub fn samples_written(&self) -> usize {
        self.written
    }

    pub fn config(&self) -> &SamplerConfig {
        &self.cfg
    }

    /// Write `static.json` unless it already exists. Returns whether it was written.
    pub fn ensure_static(&mut self) -> anyhow::Result<bool> {
        let path = self.cfg.output_dir.join(STATIC_FILE);
        if path.exists() {
            return Ok(false);
        }
        let info = collect_static(&self.state, &self.cfg.paths, &mut self.faults);
        fs::write(&path, serde_json::to_vec_pretty(&info)?)
            .with_context(|| format!("writing {}", path.display()))?;
        info!(path = %path.display(), "static info written");
        Ok(true)
    }

    /// Collect every enabled level into one record (not persisted).
    pub fn sample(&mut self) -> anyhow::Result<Sample> {
        self.sample_at(OffsetDateTime::now_utc())
    }

    /// Like [`Sampler::sample`], stamping `currentTime` with `now`.
    pub fn sample_at(&mut self, now: OffsetDateTime) -> anyhow::Result<Sample> {
        let started = Instant::now();
        let mut rec = SampleBuilder::new();
        rec.set("currentTime", epoch_nanos(now));
        self.ensure_static()?;

        let levels = self.cfg.levels;
        let disks = if levels.vm || levels.container {
            detect_disks(&self.cfg.paths.sys_root).unwrap_or_else(|e| {
                rec.fault("blockDevices", e);
                Vec::new()
            })
        } else {
            Vec::new()
        };

        if levels.vm {
            let t = Instant::now();
            rec.merge(collect_vm(&mut self.state, &self.cfg.paths, &disks));
            rec.set("VM_Write_Time", t.elapsed().as_secs_f64());
        }
        if levels.container {
            let t = Instant::now();
            rec.merge(collect_container(
                &self.cfg.paths,
                self.cgroup,
                &self.cfg.net_iface,
                &disks,
            ));
            rec.set("Container_Write_Time", t.elapsed().as_secs_f64());
        }
        if levels.process {
            let t = Instant::now();
            let procs = collect_processes(&mut self.state, &self.cfg.paths.proc_root);
            rec.set("pProcesses", serde_json::to_value(&procs)?);
            rec.set("Process_Write_Time", t.elapsed().as_secs_f64());
        }

        rec.set("profiling_time", started.elapsed().as_secs_f64());
        Ok(rec.finish(&mut self.faults))
    }

    /// Sample and persist one tick. Write failures are fatal.
    pub fn tick(&mut self) -> anyhow::Result<TickReport> {
        let started = Instant::now();
        // one instant names the artifact and stamps its record
        let now = OffsetDateTime::now_utc();
        let sample = self.sample_at(now)?;
        let path = artifact_path(&self.cfg.output_dir, now);
        fs::write(&path, serde_json::to_vec_pretty(&sample)?)
            .with_context(|| format!("writing {}", path.display()))?;
        self.written += 1;
        let elapsed = started.elapsed();
        debug!(path = %path.display(), ?elapsed, "tick persisted");
        Ok(TickReport { path, elapsed })
    }

    /// Tick, pace, check liveness; once `alive` says no, take one final sample.
    pub async fn run_until<F>(&mut self, mut alive: F) -> anyhow::Result<usize>
    where
        F: FnMut() -> bool,
    {
        let interval = Duration::from_millis(self.cfg.interval_ms);
        loop {
            let report = self.tick()?;
            let wait = remaining(interval, report.elapsed);
            if !wait.is_zero() {
                sleep(wait).await;
            }
            if !alive() {
                break;
            }
        }
        self.tick()?;
        Ok(self.written)
    }
}

/// Time left in the tick; zero when the tick overran (no catch-up).
pub fn remaining(interval: Duration, elapsed: Duration) -> Duration {
    interval.saturating_sub(elapsed)
}

pub fn tick_stem(ts: OffsetDateTime) -> String {
    ts.format(format_description!(
        "[year]_[month]_[day]_[hour]_[minute]_[second]"
    ))
    .unwrap_or_else(|_| ts.unix_timestamp().to_string())
}

/// Second-resolution artifact name, suffixed `_1`, `_2`, ... if already taken.
pub fn artifact_path(dir: &Path, ts: OffsetDateTime) -> PathBuf {
    let stem = tick_stem(ts);
    let mut path = dir.join(format!("{stem}.json"));
    let mut n = 1;
    while path.exists() {
        path = dir.join(format!("{stem}_{n}.json"));
        n += 1;
    }
    path
}

/// Run the sampler until the liveness file disappears. Returns the number of
/// tick artifacts written.
pub async fn run_sampler(cfg: SamplerConfig) -> anyhow::Result<usize> {
    let pid_file = cfg.pid_file.clone();
    let proc_root = cfg.paths.proc_root.clone();
    let owns_pid_file = cfg.removes_pid_file();
    let mut sampler = Sampler::new(cfg)?;
    info!(
        output = %sampler.config().output_dir.display(),
        interval_ms = sampler.config().interval_ms,
        levels = ?sampler.config().levels,
        "sampler started"
    );
    let written = sampler
        .run_until(|| is_alive(&pid_file, &proc_root))
        .await?;
    if owns_pid_file {
        release(&pid_file).with_context(|| format!("removing {}", pid_file.display()))?;
    }
    info!(samples = written, "sampler stopped");
    Ok(written)
}

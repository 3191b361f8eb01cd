//! ruprof_agent: single-host resource sampler.
//!
//! Each tick reads VM-level counters from procfs/sysinfo, container counters
//! from the cgroup hierarchy and per-process details from `/proc/<pid>`, and
//! persists them as one flat JSON record. A missing or malformed source only
//! ever degrades its own field.

pub mod blockdev;
pub mod cgroup;
pub mod cli;
pub mod config;
pub mod error;
pub mod liveness;
pub mod metrics;
pub mod probe;
pub mod procfs;
pub mod record;
pub mod sampler;
pub mod state;
pub mod static_info;
pub mod types;
pub mod units;

pub use config::{CgroupVersion, Levels, SamplerConfig, SourcePaths};
pub use error::{ProbeError, ProbeResult};
pub use sampler::{run_sampler, Sampler};

//! Argument parsing for the `chart` binary.

use crate::plot::RenderMode;
use crate::render::OutputTarget;
use std::path::PathBuf;

pub const USAGE: &str =
    "Usage: chart <samples_file_or_dir> [output_dir_or_file|-] [group_config_file] [single|multi]";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartArgs {
    pub samples: PathBuf,
    pub output: OutputTarget,
    pub group_config: Option<PathBuf>,
    pub mode: RenderMode,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cli {
    Run(ChartArgs),
    Help,
}

pub fn parse_args<I: IntoIterator<Item = String>>(args: I) -> Result<Cli, String> {
    let mut it = args.into_iter();
    let _prog = it.next();
    let mut positional: Vec<String> = Vec::new();
    let mut mode: Option<RenderMode> = None;

    for arg in it {
        match arg.as_str() {
            "-h" | "--help" => return Ok(Cli::Help),
            "-" => positional.push(arg),
            _ if arg.starts_with('-') => return Err(format!("Unknown flag {arg}. {USAGE}")),
            // the mode word may follow either the output or the config
            _ if positional.len() >= 2 && RenderMode::parse(&arg).is_some() => {
                if mode.is_some() {
                    return Err(format!("Unexpected argument {arg:?}. {USAGE}"));
                }
                mode = RenderMode::parse(&arg);
            }
            _ if positional.len() < 3 && mode.is_none() => positional.push(arg),
            _ => return Err(format!("Unexpected argument {arg:?}. {USAGE}")),
        }
    }

    let mut positional = positional.into_iter();
    let samples = positional.next().ok_or_else(|| USAGE.to_string())?;
    let output = OutputTarget::from_arg(positional.next().as_deref());
    let group_config = positional.next().map(PathBuf::from);

    Ok(Cli::Run(ChartArgs {
        samples: PathBuf::from(samples),
        output,
        group_config,
        mode: mode.unwrap_or(RenderMode::Multi),
    }))
}

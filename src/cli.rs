use crate::command::SyncCommand;
use crate::config::SyncConfigOverrides;
use anyhow::{anyhow, bail, Context, Result};
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CliOptions {
    pub config: Option<PathBuf>,
    pub scenario: Option<PathBuf>,
    /// Commands to run in order before idling.
    pub commands: Vec<SyncCommand>,
    /// Idle ticks to deliver after the commands ran.
    pub ticks: u32,
    tolerance: Option<f64>,
    change_tolerance: Option<f64>,
    activate_targets: Option<bool>,
}

impl CliOptions {
    pub fn parse_from_env() -> Result<Self> {
        Self::parse(env::args())
    }

    pub fn parse<I, S>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut options = CliOptions::default();
        let mut iter = args.into_iter().peekable();
        let _ = iter.next(); // skip program name if present
        while let Some(raw_flag) = iter.next() {
            let flag = raw_flag.as_ref();
            let Some(key) = flag.strip_prefix("--") else {
                bail!("Unexpected argument '{flag}'. Flags take the form --name value.");
            };
            // A bare switch means on.
            if key == "activate-targets" && iter.peek().map_or(true, |next| next.as_ref().starts_with("--")) {
                options.activate_targets = Some(true);
                continue;
            }
            let value =
                iter.next().ok_or_else(|| anyhow!("Expected a value after '{flag}'"))?.as_ref().to_string();
            match key {
                "config" => options.config = Some(PathBuf::from(value)),
                "scenario" => options.scenario = Some(PathBuf::from(value)),
                "command" => options.commands.push(value.parse()?),
                "ticks" => {
                    options.ticks = value.parse::<u32>().with_context(|| format!("Invalid tick count '{value}'"))?;
                }
                "tolerance" => options.tolerance = Some(parse_tolerance("tolerance", &value)?),
                "change-tolerance" => options.change_tolerance = Some(parse_tolerance("change-tolerance", &value)?),
                "activate-targets" => options.activate_targets = Some(parse_bool_flag("activate-targets", &value)?),
                _ => bail!(
                    "Unknown flag '{flag}'. Supported flags: --config, --scenario, --command, --ticks, --tolerance, \
                     --change-tolerance, --activate-targets."
                ),
            }
        }
        Ok(options)
    }

    pub fn config_overrides(&self) -> SyncConfigOverrides {
        SyncConfigOverrides {
            tolerance: self.tolerance,
            activate_targets: self.activate_targets,
            change_tolerance: self.change_tolerance,
        }
    }
}

fn parse_tolerance(flag: &str, value: &str) -> Result<f64> {
    let parsed = value.parse::<f64>().with_context(|| format!("Invalid {flag} '{value}'"))?;
    if !parsed.is_finite() || parsed < 0.0 {
        bail!("Invalid {flag} '{value}'. Use a non-negative number.");
    }
    Ok(parsed)
}

fn parse_bool_flag(flag: &str, value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Ok(true),
        "0" | "false" | "off" | "no" => Ok(false),
        other => bail!("Invalid {flag} value '{other}'. Use on/off or true/false."),
    }
}

use clap::{Parser, Subcommand};
use sleepmate_core::config::ConfigOverrides;

#[derive(Parser, Debug)]
#[command(author, version, about = "Sleep log, task calendar and sleep planner", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Output JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Override configuration values (format KEY=VALUE)
    #[arg(long = "config-override", value_name = "KEY=VALUE", global = true)]
    pub config_override: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Weekly sleep log
    Sleep {
        #[command(subcommand)]
        sleep: SleepCommand,
    },
    /// Dated tasks
    Task {
        #[command(subcommand)]
        task: TaskCommand,
    },
    /// Show calendar dots for every date with tasks
    ///
    /// Example: sleepmate calendar
    Calendar,
    /// Recommend a sleep window from a day's last task and the next day's first task
    ///
    /// Example: sleepmate recommend --date 2025-03-01
    Recommend {
        #[arg(long)]
        date: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum SleepCommand {
    /// Record the sleep window for a weekday
    ///
    /// Example: sleepmate sleep set mon 23:00 07:00
    Set {
        day: String,
        start: String,
        end: String,
    },
    /// Show hours per weekday with average, best and worst day
    ///
    /// Example: sleepmate sleep show
    Show,
    /// Show today's sleep status
    ///
    /// Example: sleepmate sleep status
    Status,
    /// Clear every sleep record
    ///
    /// Example: sleepmate sleep reset --yes
    Reset {
        /// Confirm the reset; it cannot be undone
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum TaskCommand {
    /// Add a task
    ///
    /// Example: sleepmate task add "Team sync" --date 2025-03-01 --color blue
    Add {
        title: Option<String>,
        #[arg(long)]
        date: Option<String>,
        #[arg(long)]
        color: Option<String>,
    },
    /// List the tasks of a date, earliest first
    ///
    /// Example: sleepmate task list --date 2025-03-01
    List {
        #[arg(long)]
        date: Option<String>,
    },
    /// Mark a task as started now
    ///
    /// Example: sleepmate task start task-1
    Start { id: String },
    /// Mark a task as ended now
    ///
    /// Example: sleepmate task end task-1
    End { id: String },
    /// Set both start and end time of a task
    ///
    /// Example: sleepmate task time task-1 09:00 10:30
    Time {
        id: String,
        start: String,
        end: String,
    },
    /// Delete a task
    ///
    /// Example: sleepmate task delete task-1
    Delete { id: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOverrideTarget {
    UtcOffset,
    StorePath,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedConfigOverride {
    pub target: ConfigOverrideTarget,
    pub value: String,
}

/// Parse a raw `KEY=VALUE` override string into a structured target.
pub fn parse_config_override(raw: &str) -> Result<ParsedConfigOverride, String> {
    let trimmed = raw.trim();
    let (key_raw, value_raw) = trimmed
        .split_once('=')
        .ok_or_else(|| "override must be in KEY=VALUE format".to_string())?;

    let value = value_raw.trim().to_string();
    let field =
        canonicalize_flag_name(key_raw).ok_or_else(|| "override key cannot be empty".to_string())?;

    let target = match field.as_str() {
        "utc_offset" | "utc_offset_hours" | "offset" => ConfigOverrideTarget::UtcOffset,
        "store_path" | "store" => ConfigOverrideTarget::StorePath,
        other => return Err(format!("unknown config field '{other}'")),
    };

    if value.is_empty() {
        return Err(format!("override '{field}' needs a value"));
    }

    Ok(ParsedConfigOverride { target, value })
}

/// Fold every `--config-override` into one set of overrides; later flags win.
pub fn collect_overrides(raw: &[String]) -> Result<ConfigOverrides, String> {
    let mut overrides = ConfigOverrides::default();
    for entry in raw {
        let parsed = parse_config_override(entry)?;
        match parsed.target {
            ConfigOverrideTarget::UtcOffset => {
                let hours = parsed.value.parse::<i8>().map_err(|_| {
                    format!("utc offset must be whole hours, got '{}'", parsed.value)
                })?;
                overrides.utc_offset_hours = Some(hours);
            }
            ConfigOverrideTarget::StorePath => overrides.store_path = Some(parsed.value),
        }
    }
    Ok(overrides)
}

fn canonicalize_flag_name(name: &str) -> Option<String> {
    let mut cleaned = String::new();
    let mut previous_underscore = false;

    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            cleaned.push(ch.to_ascii_lowercase());
            previous_underscore = false;
        } else if !previous_underscore && !cleaned.is_empty() {
            cleaned.push('_');
            previous_underscore = true;
        }
    }

    let trimmed = cleaned.trim_matches('_');
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

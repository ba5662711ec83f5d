use clap::Parser;
use std::path::PathBuf;

use crate::app::{Invocation, Mode};
use crate::config::{SYSTEM_CONFIG_PATH, USER_CONFIG_FILE};
use crate::matchers::MatcherRequest;
use crate::types::DEFAULT_SILENCE_HOURS;

/// Command line arguments
#[derive(Debug, Parser)]
#[command(
    name = "am-silence-ctl",
    about = "Create or delete an Alertmanager silence via API",
    version,
    after_help = "\
EXAMPLES:
    am-silence-ctl --alertname DiskFull --hours 4 -c \"disk replacement\"
    am-silence-ctl -r -g payments
    am-silence-ctl --delete --alertname DiskFull --dry-run"
)]
pub struct Cli {
    /// Optional comment (create mode only)
    #[arg(short, long, default_value = "")]
    pub comment: String,

    /// Silence duration in hours (create mode)
    #[arg(long, default_value_t = DEFAULT_SILENCE_HOURS)]
    pub hours: u32,

    /// Value for the 'alertname' label
    #[arg(long)]
    pub alertname: Option<String>,

    /// Include a 'role' matcher (config default when no value is given)
    #[arg(short, long, value_name = "ROLE")]
    pub role: Option<Option<String>>,

    /// Include a 'group' matcher (config default when no value is given)
    #[arg(short, long, value_name = "GROUP")]
    pub group: Option<Option<String>>,

    /// Delete matching active silences instead of creating one
    #[arg(short, long)]
    pub delete: bool,

    /// Do not call the API for changes; only log what would be done
    #[arg(long)]
    pub dry_run: bool,

    #[arg(
        long,
        value_name = "PATH",
        help = format!("YAML config path (default search: {SYSTEM_CONFIG_PATH}, ~/{USER_CONFIG_FILE})")
    )]
    pub config: Option<PathBuf>,
}

impl Cli {
    pub fn invocation(&self) -> Invocation {
        Invocation {
            mode: if self.delete { Mode::Delete } else { Mode::Create },
            dry_run: self.dry_run,
            hours: self.hours,
            comment: self.comment.clone(),
            matchers: MatcherRequest {
                alertname: self.alertname.clone(),
                role: self.role.clone().into(),
                group: self.group.clone().into(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matchers::FlagValue;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("am-silence-ctl").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_defaults() {
        let invocation = parse(&[]).invocation();
        assert_eq!(invocation, Invocation::default());
    }

    #[test]
    fn test_optional_flag_values() {
        let invocation = parse(&["-r", "-g", "payments"]).invocation();
        assert_eq!(invocation.matchers.role, FlagValue::PresentNoValue);
        assert_eq!(
            invocation.matchers.group,
            FlagValue::PresentWithValue("payments".to_string())
        );

        let invocation = parse(&["--role=db"]).invocation();
        assert_eq!(
            invocation.matchers.role,
            FlagValue::PresentWithValue("db".to_string())
        );
        assert_eq!(invocation.matchers.group, FlagValue::Absent);
    }

    #[test]
    fn test_delete_dry_run() {
        let cli = parse(&["-d", "--dry-run", "--alertname", "Disk", "--config", "/tmp/am.yaml"]);
        let invocation = cli.invocation();

        assert_eq!(invocation.mode, Mode::Delete);
        assert!(invocation.dry_run);
        assert_eq!(invocation.matchers.alertname.as_deref(), Some("Disk"));
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/am.yaml")));
    }

    #[test]
    fn test_create_options() {
        let invocation = parse(&["-c", "kernel upgrade", "--hours", "6"]).invocation();
        assert_eq!(invocation.mode, Mode::Create);
        assert_eq!(invocation.comment, "kernel upgrade");
        assert_eq!(invocation.hours, 6);
    }

    #[test]
    fn test_rejects_negative_hours() {
        let result = Cli::try_parse_from(["am-silence-ctl", "--hours", "-1"]);
        assert!(result.is_err());
    }
}

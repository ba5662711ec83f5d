use tracing::info;

use crate::config::Config;
use crate::errors::{Result, SilenceCtlError};
use crate::types::Matcher;

/// Label set by `--alertname`
pub const ALERTNAME_LABEL: &str = "alertname";
/// Label set by `--role`
pub const ROLE_LABEL: &str = "role";
/// Label set by `--group`
pub const GROUP_LABEL: &str = "group";
/// Label used when no other matcher was requested
pub const FQDN_LABEL: &str = "fqdn";

/// A command line flag whose value is optional
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FlagValue {
    /// Flag not given
    #[default]
    Absent,
    /// Flag given without a value; the config default applies
    PresentNoValue,
    /// Flag given with an explicit value
    PresentWithValue(String),
}

impl From<Option<Option<String>>> for FlagValue {
    fn from(value: Option<Option<String>>) -> Self {
        match value {
            None => FlagValue::Absent,
            Some(None) => FlagValue::PresentNoValue,
            Some(Some(value)) => FlagValue::PresentWithValue(value),
        }
    }
}

impl FlagValue {
    /// Resolve the flag against a config default
    ///
    /// Returns `Ok(None)` when the flag is absent and an error when it is
    /// present but neither it nor the default carries a non-empty value.
    pub fn resolve(&self, label: &'static str, default: Option<&str>) -> Result<Option<String>> {
        let value = match self {
            FlagValue::Absent => return Ok(None),
            FlagValue::PresentNoValue => default,
            FlagValue::PresentWithValue(value) => Some(value.as_str()),
        };

        match value {
            Some(value) if !value.is_empty() => Ok(Some(value.to_string())),
            _ => Err(SilenceCtlError::MissingMatcherValue { label }),
        }
    }
}

/// Matcher-related command line input
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatcherRequest {
    pub alertname: Option<String>,
    pub role: FlagValue,
    pub group: FlagValue,
}

/// Build the ordered matcher list for a request
///
/// Order: alertname, role, group. When none of them is requested the host
/// FQDN is used instead, which fails if `fqdn` is missing or empty.
pub fn build_matchers(
    request: &MatcherRequest,
    config: &Config,
    fqdn: Option<&str>,
) -> Result<Vec<Matcher>> {
    let mut matchers = Vec::new();

    if let Some(alertname) = request.alertname.as_deref().filter(|v| !v.is_empty()) {
        matchers.push(Matcher::equal(ALERTNAME_LABEL, alertname));
        info!(label = ALERTNAME_LABEL, value = %alertname, "Added matcher");
    }

    let flags = [
        (ROLE_LABEL, &request.role, config.role.as_deref()),
        (GROUP_LABEL, &request.group, config.group.as_deref()),
    ];
    for (label, flag, default) in flags {
        if let Some(value) = flag.resolve(label, default)? {
            info!(label, value = %value, "Added matcher");
            matchers.push(Matcher::equal(label, &value));
        }
    }

    if matchers.is_empty() {
        let fqdn = fqdn
            .filter(|v| !v.is_empty())
            .ok_or(SilenceCtlError::UnresolvedFqdn)?;
        matchers.push(Matcher::equal(FQDN_LABEL, fqdn));
        info!(label = FQDN_LABEL, value = %fqdn, "Added matcher");
    }

    Ok(matchers)
}

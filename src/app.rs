use std::env;
use std::net::IpAddr;
use tracing::{debug, error, info, warn};

use crate::client::SilenceClient;
use crate::config::Config;
use crate::errors::{Result, SilenceCtlError};
use crate::matchers::{build_matchers, MatcherRequest};
use crate::types::{CreatedSilence, Matcher, PostableSilence, DEFAULT_SILENCE_HOURS};

/// Name recorded as `createdBy` when the user is unknown
pub const UNKNOWN_USER: &str = "unknown";

/// What the invocation should do
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Mode {
    #[default]
    Create,
    Delete,
}

/// Everything the user asked for on the command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub mode: Mode,
    /// Report mutating requests instead of sending them
    pub dry_run: bool,
    /// Silence duration in hours (create mode)
    pub hours: u32,
    /// Silence comment (create mode); empty means generated
    pub comment: String,
    pub matchers: MatcherRequest,
}

impl Default for Invocation {
    fn default() -> Self {
        Self {
            mode: Mode::default(),
            dry_run: false,
            hours: DEFAULT_SILENCE_HOURS,
            comment: String::new(),
            matchers: MatcherRequest::default(),
        }
    }
}

/// Identity of the user and machine running the tool, captured once at startup
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostIdentity {
    /// Login name, from `USER`
    pub user: Option<String>,
    /// Fully-qualified host name
    pub fqdn: Option<String>,
}

impl HostIdentity {
    /// Read the user from the environment and the FQDN from the system
    pub fn detect() -> Self {
        let user = env::var("USER").ok().filter(|u| !u.is_empty());
        let fqdn = match hostname::get() {
            Ok(name) => Some(name.to_string_lossy().into_owned())
                .filter(|n| !n.is_empty())
                .map(|n| canonical_host_name(&n)),
            Err(e) => {
                warn!(error = %e, "Failed to resolve host name");
                None
            }
        };

        Self { user, fqdn }
    }

    pub fn created_by(&self) -> &str {
        self.user.as_deref().unwrap_or(UNKNOWN_USER)
    }
}

/// Canonicalize a host name through the resolver
///
/// Forward-resolves `host`, then reverse-resolves each address and picks a
/// name with [`pick_fqdn`]. Falls back to `host` when resolution fails.
fn canonical_host_name(host: &str) -> String {
    let addrs: Vec<IpAddr> = match dns_lookup::lookup_host(host) {
        Ok(addrs) => addrs,
        Err(e) => {
            warn!(host, error = %e, "Failed to resolve host name; using it as FQDN");
            return host.to_string();
        }
    };

    let names: Vec<String> = addrs
        .iter()
        .filter_map(|addr| match dns_lookup::lookup_addr(addr) {
            Ok(name) => Some(name),
            Err(e) => {
                debug!(%addr, error = %e, "Reverse lookup failed");
                None
            }
        })
        .collect();

    if names.is_empty() {
        warn!(host, "No reverse name for host; using it as FQDN");
    }
    pick_fqdn(host, names)
}

/// Choose the FQDN among resolver names
///
/// The first dotted name wins, then the first non-empty name, then `host`.
pub fn pick_fqdn(host: &str, names: impl IntoIterator<Item = String>) -> String {
    let names: Vec<String> = names.into_iter().filter(|n| !n.is_empty()).collect();

    names
        .iter()
        .find(|n| n.contains('.'))
        .or_else(|| names.first())
        .cloned()
        .unwrap_or_else(|| host.to_string())
}

/// Result of a successful invocation
#[derive(Debug, Clone)]
pub enum Outcome {
    /// A silence was created
    Created(CreatedSilence),
    /// Dry-run: the silence that would have been posted
    WouldCreate(PostableSilence),
    /// Matching silences were processed; `failed` lists ids whose deletion failed
    Deleted {
        deleted: Vec<String>,
        failed: Vec<String>,
    },
    /// Dry-run: ids that would have been deleted
    WouldDelete(Vec<String>),
    /// No active silence matched
    NothingToDelete,
}

/// Run one invocation
///
/// Matchers are resolved before any request is sent, so configuration
/// errors never reach the network. List and create failures are returned;
/// individual delete failures are logged and recorded in the outcome.
pub async fn run(
    invocation: &Invocation,
    config: &Config,
    host: &HostIdentity,
    client: &SilenceClient,
) -> Result<Outcome> {
    let matchers = build_matchers(&invocation.matchers, config, host.fqdn.as_deref())?;

    match invocation.mode {
        Mode::Create => create(invocation, host, client, matchers).await,
        Mode::Delete => delete_matching(invocation, client, &matchers).await,
    }
}

async fn create(
    invocation: &Invocation,
    host: &HostIdentity,
    client: &SilenceClient,
    matchers: Vec<Matcher>,
) -> Result<Outcome> {
    let silence = PostableSilence::new(matchers, host.created_by())
        .with_hours(invocation.hours)?
        .with_comment(&invocation.comment);

    let payload = serde_json::to_string_pretty(&silence).map_err(SilenceCtlError::Serialize)?;
    info!(url = %client.endpoints().silences(), "Prepared request:\n{payload}");

    if invocation.dry_run {
        info!("[dry-run] Would create a silence; no request sent");
        return Ok(Outcome::WouldCreate(silence));
    }

    let created = client.create_silence(&silence).await?;
    info!(silence = %created, "Silence created successfully");
    Ok(Outcome::Created(created))
}

async fn delete_matching(
    invocation: &Invocation,
    client: &SilenceClient,
    matchers: &[Matcher],
) -> Result<Outcome> {
    let active = client.list_active_silences().await?;
    let to_delete: Vec<_> = active.iter().filter(|s| s.matches(matchers)).collect();

    if to_delete.is_empty() {
        info!("No active silences matched the provided matchers. Nothing to delete");
        return Ok(Outcome::NothingToDelete);
    }
    info!(count = to_delete.len(), "Matched silence(s) for deletion");

    let mut ids = Vec::with_capacity(to_delete.len());
    for silence in to_delete {
        match silence.id.as_deref().filter(|id| !id.is_empty()) {
            Some(id) => ids.push(id.to_string()),
            None => warn!(silence = ?silence, "Skipping silence without id"),
        }
    }

    if invocation.dry_run {
        for id in &ids {
            info!(silence_id = %id, "[dry-run] Would delete silence");
        }
        return Ok(Outcome::WouldDelete(ids));
    }

    let mut deleted = Vec::new();
    let mut failed = Vec::new();
    for id in ids {
        match client.delete_silence(&id).await {
            Ok(()) => deleted.push(id),
            Err(e) => {
                error!(silence_id = %id, class = %e.class(), error = %e, "Failed to delete silence");
                failed.push(id);
            }
        }
    }

    if !failed.is_empty() {
        warn!(
            deleted = deleted.len(),
            failed = failed.len(),
            "Some silences could not be deleted"
        );
    }
    Ok(Outcome::Deleted { deleted, failed })
}

const API_PREFIX: &str = "/api/v2";

/// Silence endpoints of an Alertmanager v2 API
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    silences: String,
    silence: String,
}

impl Endpoints {
    /// Derive the endpoints from an Alertmanager base URL
    ///
    /// Trailing slashes are dropped and `/api/v2` is appended unless the URL
    /// already ends with it, so `http://am:9093` and `http://am:9093/api/v2/`
    /// produce the same endpoints.
    pub fn from_base_url(base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/');
        let api = if base.ends_with(API_PREFIX) {
            base.to_string()
        } else {
            format!("{base}{API_PREFIX}")
        };

        Self {
            silences: format!("{api}/silences"),
            silence: format!("{api}/silence"),
        }
    }

    /// Collection endpoint, used to list and create silences
    pub fn silences(&self) -> &str {
        &self.silences
    }

    /// Prefix of the single-silence endpoint
    pub fn silence(&self) -> &str {
        &self.silence
    }

    /// Endpoint for one silence, used to delete it
    pub fn silence_by_id(&self, id: &str) -> String {
        format!("{}/{id}", self.silence)
    }
}

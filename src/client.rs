use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Response};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use std::time::Duration;
use tracing::{debug, info, instrument};

use crate::endpoints::Endpoints;
use crate::errors::{Result, SilenceCtlError};
use crate::types::{CreatedSilence, PostableSilence, Silence};

/// Timeout applied to every request by the command line tool
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Client for the silence endpoints of Alertmanager
///
/// Requests are sent once; failures are returned to the caller without retry.
///
/// # Example
///
/// ```rust,no_run
/// use am_silence_ctl::{Endpoints, Matcher, PostableSilence, SilenceClient};
/// use std::time::Duration;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let client = SilenceClient::new(
///         Endpoints::from_base_url("http://localhost:9093"),
///         Duration::from_secs(10),
///     )?;
///
///     let silence = PostableSilence::new(vec![Matcher::equal("role", "db")], "alice")
///         .with_hours(1)?;
///
///     let created = client.create_silence(&silence).await?;
///     println!("created {created}");
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct SilenceClient {
    client: ClientWithMiddleware,
    endpoints: Endpoints,
}

impl SilenceClient {
    /// Create a new silence client
    ///
    /// # Arguments
    ///
    /// * `endpoints` - Silence endpoints of the Alertmanager instance
    /// * `timeout` - Request timeout duration
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(endpoints: Endpoints, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(SilenceCtlError::BuildHttpClient)?;

        let client = ClientBuilder::new(client).build();

        Ok(Self { client, endpoints })
    }

    /// Create a new client with a custom reqwest middleware client
    pub fn with_client(client: ClientWithMiddleware, endpoints: Endpoints) -> Self {
        Self { client, endpoints }
    }

    /// Fetch every silence known to Alertmanager
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, Alertmanager answers with a
    /// non-success status, or the body is not a list of silences.
    #[instrument(name = "SilenceClient::list_silences", skip_all)]
    pub async fn list_silences(&self) -> Result<Vec<Silence>> {
        let url = self.endpoints.silences();
        debug!(url = %url, "Listing silences");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(SilenceCtlError::Request)?;

        let response = error_for_status(response).await?;
        let silences: Vec<Silence> = response.json().await.map_err(SilenceCtlError::Response)?;

        debug!(count = silences.len(), "Fetched silences");
        Ok(silences)
    }

    /// Fetch only the silences whose state is `active`
    pub async fn list_active_silences(&self) -> Result<Vec<Silence>> {
        let silences = self.list_silences().await?;
        Ok(silences.into_iter().filter(Silence::is_active).collect())
    }

    /// Create a silence
    ///
    /// The identifier is taken from the `silenceID` field of a JSON answer;
    /// any other successful answer is returned as raw text.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The HTTP request fails
    /// - Alertmanager returns a non-success status code
    #[instrument(
        name = "SilenceClient::create_silence",
        skip_all,
        fields(matcher_count = silence.matchers.len())
    )]
    pub async fn create_silence(&self, silence: &PostableSilence) -> Result<CreatedSilence> {
        let url = self.endpoints.silences();
        debug!(url = %url, "Creating silence");

        let response = self
            .client
            .post(url)
            .json(silence)
            .send()
            .await
            .map_err(SilenceCtlError::Request)?;

        let response = error_for_status(response).await?;

        let is_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with("application/json"));
        let body = response.text().await.map_err(SilenceCtlError::Response)?;

        let id = is_json
            .then(|| serde_json::from_str::<serde_json::Value>(&body).ok())
            .flatten()
            .and_then(|json| json.get("silenceID")?.as_str().map(str::to_string));

        let created = match id {
            Some(id) => CreatedSilence::Id(id),
            None => CreatedSilence::Raw(body),
        };
        debug!(silence = %created, "Silence created");
        Ok(created)
    }

    /// Delete a silence by identifier
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or Alertmanager answers with a
    /// non-success status.
    #[instrument(name = "SilenceClient::delete_silence", skip(self))]
    pub async fn delete_silence(&self, silence_id: &str) -> Result<()> {
        let url = self.endpoints.silence_by_id(silence_id);
        debug!(url = %url, "Deleting silence");

        let response = self
            .client
            .delete(&url)
            .send()
            .await
            .map_err(SilenceCtlError::Request)?;

        error_for_status(response).await?;

        info!(silence_id, "Deleted silence");
        Ok(())
    }

    /// Get the endpoints this client talks to
    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }
}

/// Turn a non-success response into [`SilenceCtlError::Api`] carrying the body
async fn error_for_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = response.text().await.unwrap_or_default();
    Err(SilenceCtlError::Api {
        status: status.as_u16(),
        message,
    })
}

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{
    Client,
    header::{AUTHORIZATION, HeaderMap, HeaderValue},
};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::args::DEFAULT_USER_AGENT;
use crate::error::{AppError, AppResult, FetchCause, ValidationError};

use super::{
    EventsRequest, PerformanceEventsParams, PerformanceEventsResponse, RecordingApi,
    RecordingMetaResponse, SnapshotsResponse, types::EventsResponse,
};

#[derive(Debug, Clone)]
pub struct ApiSettings {
    pub base_url: String,
    pub project_id: u64,
    pub api_token: Option<String>,
    pub request_timeout: Duration,
}

/// `reqwest`-backed implementation of [`RecordingApi`].
#[derive(Debug, Clone)]
pub struct HttpRecordingApi {
    client: Client,
    base_url: Url,
    project_id: u64,
}

impl HttpRecordingApi {
    /// Builds the HTTP client for the configured API host.
    ///
    /// # Errors
    ///
    /// Returns an error when the base URL or token is invalid or the client
    /// cannot be built.
    pub fn new(settings: &ApiSettings) -> AppResult<Self> {
        let base_url = normalize_base_url(&settings.base_url)?;

        let mut headers = HeaderMap::new();
        if let Some(token) = settings.api_token.as_deref() {
            let value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|_err| AppError::validation(ValidationError::InvalidToken))?;
            headers.insert(AUTHORIZATION, value);
        }

        let client = Client::builder()
            .timeout(settings.request_timeout)
            .user_agent(DEFAULT_USER_AGENT)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url,
            project_id: settings.project_id,
        })
    }

    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, FetchCause> {
        self.base_url
            .join(path)
            .map_err(|err| FetchCause::InvalidUrl {
                url: path.to_owned(),
                message: err.to_string(),
            })
    }

    fn project_endpoint(&self, suffix: &str) -> Result<Url, FetchCause> {
        self.endpoint(&format!("api/projects/{}/{}", self.project_id, suffix))
    }

    /// `session_recordings/{id}` followed by `tail`. The id is a single
    /// encoded segment, so `/`, `?` and `#` cannot reshape the path.
    pub(crate) fn recording_endpoint(
        &self,
        recording_id: &str,
        tail: &[&str],
    ) -> Result<Url, FetchCause> {
        let mut url = self.project_endpoint("session_recordings")?;
        url.path_segments_mut()
            .map_err(|()| FetchCause::InvalidUrl {
                url: recording_id.to_owned(),
                message: "base URL cannot hold path segments".to_owned(),
            })?
            .pop_if_empty()
            .push(recording_id)
            .extend(tail);
        Ok(url)
    }

    async fn get_json<T>(&self, url: Url) -> Result<T, FetchCause>
    where
        T: DeserializeOwned,
    {
        debug!(url = %url, "GET");
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchCause::Status {
                status: status.as_u16(),
            });
        }
        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|err| FetchCause::Decode {
            message: err.to_string(),
        })
    }
}

/// Parses the API host and makes sure relative paths join below it.
///
/// # Errors
///
/// Returns an error when the URL does not parse or cannot be a base.
pub(crate) fn normalize_base_url(raw: &str) -> AppResult<Url> {
    let mut url = Url::parse(raw.trim()).map_err(|err| {
        AppError::validation(ValidationError::InvalidBaseUrl {
            url: raw.to_owned(),
            source: err,
        })
    })?;
    if url.cannot_be_a_base() {
        return Err(AppError::validation(ValidationError::BaseUrlCannotBeABase {
            url: raw.to_owned(),
        }));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

#[async_trait]
impl RecordingApi for HttpRecordingApi {
    async fn recording_meta(
        &self,
        recording_id: &str,
    ) -> Result<RecordingMetaResponse, FetchCause> {
        let url = self.recording_endpoint(recording_id, &[])?;
        self.get_json(url).await
    }

    async fn recording_snapshots(
        &self,
        recording_id: &str,
        cursor: Option<&str>,
    ) -> Result<SnapshotsResponse, FetchCause> {
        let url = match cursor {
            Some(next) => self.endpoint(next)?,
            None => self.recording_endpoint(recording_id, &["snapshots"])?,
        };
        self.get_json(url).await
    }

    async fn events(&self, request: &EventsRequest) -> Result<EventsResponse, FetchCause> {
        let url = match request {
            EventsRequest::Next(next) => self.endpoint(next)?,
            EventsRequest::Initial(params) => {
                let mut url = self.project_endpoint("events")?;
                let pairs = params.query_pairs().map_err(|err| FetchCause::Decode {
                    message: err.to_string(),
                })?;
                url.query_pairs_mut().extend_pairs(pairs);
                url
            }
        };
        self.get_json(url).await
    }

    async fn performance_events(
        &self,
        params: &PerformanceEventsParams,
    ) -> Result<PerformanceEventsResponse, FetchCause> {
        let mut url = self.project_endpoint("performance_events")?;
        url.query_pairs_mut().extend_pairs(params.query_pairs());
        self.get_json(url).await
    }
}

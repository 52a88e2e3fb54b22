//! SonarQube Web API client.
//!
//! Thin wrapper over `reqwest` covering the two endpoints the exporter
//! needs. Every call authenticates with HTTP Basic, is bounded by the
//! configured request timeout, and surfaces non-2xx responses as
//! [`ClientError::Status`].

use std::fmt;
use std::time::Duration;

use reqwest::StatusCode;
use serde::Deserialize;

use crate::measure::Fields;

/// Error type for quality-API calls.
#[derive(Debug)]
pub enum ClientError {
    /// Transport-level failure: connect, timeout, or body decode.
    Request(reqwest::Error),
    /// The API answered with a non-success status.
    Status { endpoint: String, status: StatusCode },
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientError::Request(e) => write!(f, "quality-API request failed: {}", e),
            ClientError::Status { endpoint, status } => {
                write!(f, "quality-API returned {} for '{}'", status, endpoint)
            }
        }
    }
}

impl std::error::Error for ClientError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ClientError::Request(e) => Some(e),
            ClientError::Status { .. } => None,
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        ClientError::Request(e)
    }
}

/// Reference to a project from the search endpoint.
#[derive(Clone, Debug, Deserialize)]
pub struct ProjectRef {
    pub key: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
struct SearchProjectsResponse {
    components: Vec<ProjectRef>,
}

/// The `component` payload of `api/measures/component`.
#[derive(Debug, Deserialize)]
pub struct ComponentMeasures {
    pub measures: Vec<Fields>,
}

#[derive(Debug, Deserialize)]
struct MeasuresResponse {
    component: ComponentMeasures,
}

/// SonarQube Web API client.
#[derive(Clone, Debug)]
pub struct SonarClient {
    http: reqwest::Client,
    base_url: String,
    user: String,
    password: String,
}

impl SonarClient {
    /// Creates a client for the given server, credentials and request
    /// timeout.
    pub fn new(
        base_url: impl Into<String>,
        user: impl Into<String>,
        password: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("sonarex/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;

        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }

        Ok(Self {
            http,
            base_url,
            user: user.into(),
            password: password.into(),
        })
    }

    async fn get_json<T>(&self, path: &str, query: &[(&str, &str)]) -> Result<T, ClientError>
    where
        T: serde::de::DeserializeOwned,
    {
        let url = format!("{}/{}", self.base_url, path);
        let resp = self
            .http
            .get(&url)
            .query(query)
            .basic_auth(&self.user, Some(&self.password))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ClientError::Status {
                endpoint: path.to_string(),
                status,
            });
        }
        Ok(resp.json().await?)
    }

    /// Lists all projects carrying the given tag.
    pub async fn search_projects(&self, tag: &str) -> Result<Vec<ProjectRef>, ClientError> {
        let filter = format!("tags={}", tag);
        let resp: SearchProjectsResponse = self
            .get_json("api/components/search_projects", &[("filter", &filter)])
            .await?;
        Ok(resp.components)
    }

    /// Fetches one component's measures for the given comma-joined metric
    /// keys.
    pub async fn component_measures(
        &self,
        component_key: &str,
        metric_keys: &str,
    ) -> Result<ComponentMeasures, ClientError> {
        let resp: MeasuresResponse = self
            .get_json(
                "api/measures/component",
                &[("component", component_key), ("metricKeys", metric_keys)],
            )
            .await?;
        Ok(resp.component)
    }
}

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use crate::error::RoastError;
use crate::username::Username;

const USER_AGENT: &str = "Profile-Humiliator-App";
const GITHUB_ACCEPT: &str = "application/vnd.github.v3+json";

/// Public profile attributes, as returned by `GET /users/{username}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub public_repos: u64,
    #[serde(default)]
    pub followers: u64,
    #[serde(default)]
    pub following: u64,
    #[serde(default)]
    pub location: Option<String>,
    pub html_url: String,
    #[serde(default)]
    pub avatar_url: String,
}

/// Anything that can look up a profile by (already validated) username.
#[async_trait]
pub trait ProfileSource: Send + Sync {
    async fn fetch(&self, username: &Username) -> Result<Profile, RoastError>;
}

#[derive(Clone)]
pub struct GithubClient {
    client: Client,
    base_url: String,
}

impl GithubClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Validate `raw` and fetch the profile. Invalid names never hit the network.
    pub async fn fetch_profile(&self, raw: &str) -> Result<Profile, RoastError> {
        let username = Username::parse(raw)?;
        self.fetch(&username).await
    }

    fn user_url(&self, username: &Username) -> String {
        format!("{}/users/{}", self.base_url, username)
    }
}

#[async_trait]
impl ProfileSource for GithubClient {
    async fn fetch(&self, username: &Username) -> Result<Profile, RoastError> {
        let url = self.user_url(username);
        tracing::debug!("Fetching GitHub profile: {}", url);

        let response = self
            .client
            .get(&url)
            .header("Accept", GITHUB_ACCEPT)
            .header("User-Agent", USER_AGENT)
            .send()
            .await
            .map_err(|e| RoastError::Internal(format!("GitHub request failed: {}", e)))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(RoastError::NotFound(username.to_string()));
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            tracing::warn!("GitHub API error {} for {}: {}", status, username, text);
            return Err(RoastError::Upstream { status: status.as_u16() });
        }

        response
            .json::<Profile>()
            .await
            .map_err(|e| RoastError::Internal(format!("Invalid GitHub profile payload: {}", e)))
    }
}

use reqwest::Client;
use serde::{Deserialize, Serialize};
use anyhow::{Result, anyhow};

use humilhador_core::RoastResult;

#[derive(Serialize)]
struct RoastRequest<'a> {
    #[serde(rename = "profileUrl")]
    profile_url: &'a str,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: Option<String>,
}

/// Client for the `POST /api/roast` endpoint.
#[derive(Clone)]
pub struct RoastApiClient {
    client: Client,
    base_url: String,
}

impl RoastApiClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn endpoint(&self) -> String {
        format!("{}/api/roast", self.base_url)
    }

    /// Errors carry the server's user-facing message, ready for a notification.
    pub async fn roast(&self, username: &str) -> Result<RoastResult> {
        let response = self.client
            .post(self.endpoint())
            .json(&RoastRequest { profile_url: username })
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Roast request failed: {}", e);
                anyhow!("Não consegui falar com o servidor de roasts")
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let message = response
                .json::<ErrorResponse>()
                .await
                .ok()
                .and_then(|body| body.error)
                .unwrap_or_else(|| "Erro ao gerar roast".to_string());
            tracing::warn!("Roast endpoint answered {}: {}", status, message);
            return Err(anyhow!(message));
        }

        Ok(response.json::<RoastResult>().await?)
    }
}

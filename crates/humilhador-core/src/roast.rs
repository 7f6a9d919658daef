//! Fetch → compose → generate, in that order.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::ai::{ChatRequest, TextGenerator};
use crate::error::RoastError;
use crate::profile::ProfileSource;
use crate::prompt::{compose_prompt, ROAST_PERSONA};
use crate::username::Username;

pub const FALLBACK_ROAST: &str = "Ops, não consegui gerar um roast engraçado!";

/// What the endpoint hands back to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoastResult {
    #[serde(rename = "roast")]
    pub text: String,
    #[serde(rename = "profileImage")]
    pub profile_image_url: String,
}

/// Ask the generator for a roast. Blank answers become [`FALLBACK_ROAST`];
/// transport and service failures become [`RoastError::Generation`].
pub async fn generate_roast(
    generator: &dyn TextGenerator,
    prompt: &str,
) -> Result<String, RoastError> {
    let request = ChatRequest::new(ROAST_PERSONA, prompt);

    match generator.complete(&request).await {
        Ok(Some(text)) if !text.trim().is_empty() => Ok(text.trim().to_string()),
        Ok(_) => {
            tracing::warn!("Generator returned no usable text, using fallback roast");
            Ok(FALLBACK_ROAST.to_string())
        }
        Err(e) => {
            tracing::error!("Roast generation failed: {:#}", e);
            Err(RoastError::Generation(e.to_string()))
        }
    }
}

/// The whole server-side pipeline, with its collaborators injected.
#[derive(Clone)]
pub struct RoastService {
    profiles: Arc<dyn ProfileSource>,
    generator: Arc<dyn TextGenerator>,
}

impl RoastService {
    pub fn new(profiles: Arc<dyn ProfileSource>, generator: Arc<dyn TextGenerator>) -> Self {
        Self { profiles, generator }
    }

    pub async fn roast(&self, raw_username: &str) -> Result<RoastResult, RoastError> {
        let username = Username::parse(raw_username)?;

        let profile = self.profiles.fetch(&username).await?;
        tracing::info!(
            "Roasting {} ({} repos, {} followers)",
            username,
            profile.public_repos,
            profile.followers
        );

        let prompt = compose_prompt(&profile, &username);
        let text = generate_roast(self.generator.as_ref(), &prompt).await?;

        Ok(RoastResult {
            text,
            profile_image_url: profile.avatar_url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::Profile;
    use anyhow::anyhow;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct CannedGenerator {
        answer: Option<String>,
        fail: bool,
        prompts: Mutex<Vec<ChatRequest>>,
    }

    impl CannedGenerator {
        fn answering(answer: Option<&str>) -> Self {
            Self {
                answer: answer.map(str::to_string),
                fail: false,
                prompts: Mutex::new(Vec::new()),
            }
        }

        fn failing() -> Self {
            Self {
                answer: None,
                fail: true,
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl TextGenerator for CannedGenerator {
        async fn complete(&self, request: &ChatRequest) -> anyhow::Result<Option<String>> {
            self.prompts.lock().unwrap().push(request.clone());
            if self.fail {
                return Err(anyhow!("connection refused"));
            }
            Ok(self.answer.clone())
        }
    }

    struct OneProfile(Profile);

    #[async_trait]
    impl ProfileSource for OneProfile {
        async fn fetch(&self, username: &Username) -> Result<Profile, RoastError> {
            if username.as_str() == "octocat" {
                Ok(self.0.clone())
            } else {
                Err(RoastError::NotFound(username.to_string()))
            }
        }
    }

    fn octocat() -> Profile {
        Profile {
            name: Some("The Octocat".to_string()),
            bio: None,
            public_repos: 8,
            followers: 100,
            following: 9,
            location: None,
            html_url: "https://github.com/octocat".to_string(),
            avatar_url: "https://avatars.githubusercontent.com/u/583231?v=4".to_string(),
        }
    }

    #[tokio::test]
    async fn test_generate_trims_answer() {
        let generator = CannedGenerator::answering(Some("\n  Você tem 8 repos. 😎  \n"));
        let roast = generate_roast(&generator, "prompt").await.unwrap();
        assert_eq!(roast, "Você tem 8 repos. 😎");

        let sent = generator.prompts.lock().unwrap();
        assert_eq!(sent[0].system, ROAST_PERSONA);
        assert_eq!(sent[0].prompt, "prompt");
    }

    #[tokio::test]
    async fn test_generate_falls_back_on_empty_answer() {
        for answer in [None, Some(""), Some("   ")] {
            let generator = CannedGenerator::answering(answer);
            assert_eq!(generate_roast(&generator, "prompt").await.unwrap(), FALLBACK_ROAST);
        }
    }

    #[tokio::test]
    async fn test_generate_maps_failures() {
        let generator = CannedGenerator::failing();
        let err = generate_roast(&generator, "prompt").await.unwrap_err();
        assert!(matches!(err, RoastError::Generation(_)));
    }

    #[tokio::test]
    async fn test_service_pipeline() {
        let generator = Arc::new(CannedGenerator::answering(Some("Roast!")));
        let service = RoastService::new(Arc::new(OneProfile(octocat())), generator.clone());

        let result = service.roast("octocat").await.unwrap();
        assert_eq!(result.text, "Roast!");
        assert_eq!(result.profile_image_url, octocat().avatar_url);

        let sent = generator.prompts.lock().unwrap();
        assert!(sent[0].prompt.contains("Bio vazia"));
        assert!(sent[0].prompt.contains("- Repositórios públicos: 8"));
    }

    #[tokio::test]
    async fn test_service_stops_before_generation_on_errors() {
        let generator = Arc::new(CannedGenerator::answering(Some("Roast!")));
        let service = RoastService::new(Arc::new(OneProfile(octocat())), generator.clone());

        assert!(matches!(service.roast("ghost").await, Err(RoastError::NotFound(_))));
        assert!(matches!(service.roast("-bad-").await, Err(RoastError::Validation(_))));
        assert!(generator.prompts.lock().unwrap().is_empty());
    }

    #[test]
    fn test_result_wire_format() {
        let result = RoastResult {
            text: "haha".to_string(),
            profile_image_url: "https://img".to_string(),
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json, serde_json::json!({ "roast": "haha", "profileImage": "https://img" }));
    }
}

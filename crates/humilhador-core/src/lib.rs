pub mod ai;
pub mod card;
pub mod config;
pub mod error;
pub mod profile;
pub mod prompt;
pub mod reveal;
pub mod roast;
pub mod username;

#[cfg(test)]
mod test_support;

// Re-export main types for convenience
pub use ai::{ChatRequest, OpenAIClient, TextGenerator};
pub use card::{action_for, initials, CardAction, CardCapability, CompletedCard, RoastCard};
pub use config::Config;
pub use error::RoastError;
pub use profile::{GithubClient, Profile, ProfileSource};
pub use prompt::{compose_prompt, ROAST_PERSONA};
pub use reveal::{RevealPacing, RevealPhase, RevealState, Revealer};
pub use roast::{generate_roast, RoastResult, RoastService, FALLBACK_ROAST};
pub use username::{normalize_username, Username};

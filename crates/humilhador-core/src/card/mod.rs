//! The roast card and what can be done with it once the reveal is over.

pub mod export;
pub mod share;

pub use export::PdfExporter;
pub use share::{share_text, ClipboardSharer};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::RoastError;
use crate::reveal::RevealState;
use crate::roast::RoastResult;

/// Which action the card offers. The two variants are mutually exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardCapability {
    Export,
    Share,
}

impl CardCapability {
    pub fn as_str(&self) -> &'static str {
        match self {
            CardCapability::Export => "export",
            CardCapability::Share => "share",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "export" | "pdf" => Some(CardCapability::Export),
            "share" => Some(CardCapability::Share),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoastCard {
    pub username: String,
    pub roast: String,
    pub profile_image_url: String,
}

impl RoastCard {
    pub fn new(username: &str, result: &RoastResult) -> Self {
        Self {
            username: username.to_string(),
            roast: result.text.clone(),
            profile_image_url: result.profile_image_url.clone(),
        }
    }

    pub fn initials(&self) -> String {
        initials(&self.username)
    }
}

/// A card whose reveal has finished. Card actions only accept this type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedCard {
    card: RoastCard,
}

impl CompletedCard {
    /// `None` unless `reveal` has fully shown exactly this card's roast.
    pub fn new(card: RoastCard, reveal: &RevealState) -> Option<Self> {
        (reveal.is_complete() && reveal.displayed() == card.roast).then_some(Self { card })
    }

    pub fn card(&self) -> &RoastCard {
        &self.card
    }
}

#[async_trait]
pub trait CardAction: Send + Sync {
    fn capability(&self) -> CardCapability;

    /// Button/key hint text
    fn label(&self) -> &'static str;

    /// Run the action and return the notification to show.
    async fn perform(&self, card: &CompletedCard) -> Result<String, RoastError>;
}

/// Build the action configured for this install.
pub fn action_for(capability: CardCapability, config: &Config) -> Box<dyn CardAction> {
    match capability {
        CardCapability::Export => Box::new(PdfExporter::new(config.resolved_export_dir())),
        CardCapability::Share => Box::new(ClipboardSharer::new(config.public_base_url.clone())),
    }
}

/// "deyvison-tavares" → "DT"
pub fn initials(username: &str) -> String {
    username
        .split('-')
        .filter_map(|part| part.chars().next())
        .collect::<String>()
        .to_uppercase()
}

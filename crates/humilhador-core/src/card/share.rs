use arboard::Clipboard;
use async_trait::async_trait;
use std::process::{Command, Stdio};

use super::{CardAction, CardCapability, CompletedCard};
use crate::error::RoastError;

pub const COMPOSE_URL: &str = "https://www.linkedin.com/feed/?shareActive=true";
pub const SHARE_NOTIFICATION: &str = "Roast copiado! Cole no post e humilhe em público 😈";

const PROMO_FOOTER: &str = "🎭 Gerado pelo Humilhador de Perfil. Descubra a sua humilhação personalizada";

/// Roast plus the promotional footer (and the app link, when one is configured).
pub fn share_text(roast: &str, public_base_url: Option<&str>) -> String {
    let mut text = String::new();
    text.push_str(roast.trim_end());
    text.push_str("\n\n");
    text.push_str(PROMO_FOOTER);

    match public_base_url.map(str::trim).filter(|url| !url.is_empty()) {
        Some(url) => {
            text.push_str(": ");
            text.push_str(url.trim_end_matches('/'));
        }
        None => text.push('!'),
    }

    text
}

/// Copy to clipboard, then hand the compose page to the browser.
pub struct ClipboardSharer {
    public_base_url: Option<String>,
    compose_url: String,
}

impl ClipboardSharer {
    pub fn new(public_base_url: Option<String>) -> Self {
        Self {
            public_base_url,
            compose_url: COMPOSE_URL.to_string(),
        }
    }

    fn copy_to_clipboard(text: &str) -> Result<(), RoastError> {
        let mut clipboard = Clipboard::new()
            .map_err(|e| RoastError::Share(format!("Failed to access clipboard: {}", e)))?;

        clipboard
            .set_text(text)
            .map_err(|e| RoastError::Share(format!("Failed to copy: {}", e)))
    }
}

#[async_trait]
impl CardAction for ClipboardSharer {
    fn capability(&self) -> CardCapability {
        CardCapability::Share
    }

    fn label(&self) -> &'static str {
        "Compartilhar"
    }

    async fn perform(&self, card: &CompletedCard) -> Result<String, RoastError> {
        let text = share_text(&card.card().roast, self.public_base_url.as_deref());

        if let Err(e) = Self::copy_to_clipboard(&text) {
            tracing::error!("{}", e);
            return Err(e);
        }

        // The text is already on the clipboard, so a browser failure is only worth a log line.
        if let Err(e) = open_in_browser(&self.compose_url) {
            tracing::warn!("Could not open {}: {}", self.compose_url, e);
        }

        Ok(SHARE_NOTIFICATION.to_string())
    }
}

fn open_in_browser(url: &str) -> std::io::Result<()> {
    let mut command = if cfg!(target_os = "macos") {
        Command::new("open")
    } else if cfg!(target_os = "windows") {
        let mut command = Command::new("cmd");
        command.args(["/C", "start", ""]);
        command
    } else {
        Command::new("xdg-open")
    };

    command
        .arg(url)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map(|_| ())
}

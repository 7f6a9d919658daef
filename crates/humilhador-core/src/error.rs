//! Error taxonomy shared by the endpoint and the client.

use thiserror::Error;

/// Everything that can go wrong while producing, revealing or exporting a roast.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RoastError {
    /// Bad input, rejected before any network call
    #[error("{0}")]
    Validation(String),

    /// The GitHub account does not exist
    #[error("GitHub user not found: {0}")]
    NotFound(String),

    /// Any other non-success response from GitHub, including rate limiting
    #[error("GitHub API responded with status {status}")]
    Upstream { status: u16 },

    /// The text-generation service failed or answered with garbage
    #[error("Roast generation failed: {0}")]
    Generation(String),

    /// Card rasterization or PDF writing failed
    #[error("Export failed: {0}")]
    Export(String),

    /// Clipboard or browser hand-off failed
    #[error("Share failed: {0}")]
    Share(String),

    /// Anything unexpected (transport errors, undecodable payloads)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl RoastError {
    /// HTTP status the endpoint answers with for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            RoastError::Validation(_) => 400,
            RoastError::NotFound(_) => 404,
            RoastError::Upstream { status } if (400..=599).contains(status) => *status,
            RoastError::Upstream { .. } => 502,
            RoastError::Generation(_)
            | RoastError::Export(_)
            | RoastError::Share(_)
            | RoastError::Internal(_) => 500,
        }
    }

    /// Message shown to the person using the app. Internal details stay in the logs.
    pub fn public_message(&self) -> String {
        match self {
            RoastError::Validation(message) => message.clone(),
            RoastError::NotFound(_) => "Usuário do GitHub não encontrado".to_string(),
            RoastError::Upstream { .. } => "Erro ao acessar a API do GitHub".to_string(),
            RoastError::Generation(_) | RoastError::Internal(_) => "Erro ao gerar roast".to_string(),
            RoastError::Export(_) => "Erro ao gerar PDF".to_string(),
            RoastError::Share(_) => "Não consegui copiar o roast para a área de transferência".to_string(),
        }
    }
}

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CatalogError>;

/// Why a single candidate source could not be used
#[derive(Debug, Clone)]
pub struct SourceFailure {
    /// Source label with credentials redacted
    pub source: String,
    pub reason: String,
}

impl std::fmt::Display for SourceFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.source, self.reason)
    }
}

/// Catalog loading errors
#[derive(Error, Debug)]
pub enum CatalogError {
    /// One source unreachable or answered with a non-success status
    #[error("Falha ao carregar {origin}: {reason}")]
    Transport { origin: String, reason: String },

    /// Every candidate source failed
    #[error("Não foi possível carregar a lista M3U de nenhuma fonte ({} tentativas)", .0.len())]
    AllSourcesFailed(Vec<SourceFailure>),

    /// Body fetched but nothing could be categorized
    #[error("A lista M3U está vazia ou não contém canais reconhecíveis")]
    Content,

    #[error("Nenhuma fonte de playlist configurada")]
    NoSources,

    /// Invalid classifier rule table
    #[error("Regra de classificação inválida: {0}")]
    Rules(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CatalogError {
    pub fn transport(origin: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Transport {
            origin: origin.into(),
            reason: reason.into(),
        }
    }

    /// Content problems are reported apart from transport problems
    pub fn is_content(&self) -> bool {
        matches!(self, CatalogError::Content)
    }

    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            CatalogError::Transport { .. } | CatalogError::AllSourcesFailed(_)
        )
    }
}

impl From<CatalogError> for SourceFailure {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::Transport { origin, reason } => SourceFailure {
                source: origin,
                reason,
            },
            other => SourceFailure {
                source: "unknown".to_string(),
                reason: other.to_string(),
            },
        }
    }
}

use thiserror::Error;

/// Field-level rejection of a candidate notification address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EmailError {
    #[error("Limite de 5 emails atingido.")]
    LimitReached,
    #[error("Formato de email inválido.")]
    InvalidFormat,
    #[error("Este email já foi adicionado.")]
    Duplicate,
}

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("relay unreachable: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("relay answered {status} with a non-JSON body: {raw}")]
    InvalidResponse { status: u16, raw: String },
    #[error("{message}")]
    Rejected {
        status: u16,
        message: String,
        raw: Option<String>,
    },
}

impl SubmitError {
    /// Text shown in the status banner.
    pub fn banner_message(&self) -> String {
        match self {
            SubmitError::Transport(_) => {
                "Falha ao conectar com o servidor. Tente novamente.".to_string()
            }
            SubmitError::InvalidResponse { .. } => "Resposta da API não é JSON válido.".to_string(),
            SubmitError::Rejected { message, .. } => message.clone(),
        }
    }

    /// Diagnostic text kept next to the banner, when there is any.
    pub fn detail(&self) -> Option<String> {
        match self {
            SubmitError::Transport(err) => Some(err.to_string()),
            SubmitError::InvalidResponse { raw, .. } => Some(raw.clone()),
            SubmitError::Rejected { raw, .. } => raw.clone(),
        }
    }
}

use std::time::Duration;

pub const SUCCESS_MESSAGE: &str = "Certidão cadastrada com sucesso!";
pub const UNKNOWN_FAILURE_MESSAGE: &str = "Erro desconhecido ao salvar.";

/// How long a success banner stays up before it is cleared.
pub const SUCCESS_BANNER_TTL: Duration = Duration::from_secs(5);

/// Banner state for the last submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SubmitStatus {
    #[default]
    Idle,
    Submitting,
    Success {
        message: String,
    },
    Error {
        message: String,
        detail: Option<String>,
    },
}

impl SubmitStatus {
    pub fn success() -> Self {
        SubmitStatus::Success {
            message: SUCCESS_MESSAGE.to_string(),
        }
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            SubmitStatus::Idle | SubmitStatus::Submitting => None,
            SubmitStatus::Success { message } | SubmitStatus::Error { message, .. } => {
                Some(message)
            }
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, SubmitStatus::Error { .. })
    }
}

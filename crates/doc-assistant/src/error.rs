use docs_common::error::CollaboratorError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Collaborator(#[from] CollaboratorError),

    #[error("search unavailable: {0}")]
    SearchUnavailable(CollaboratorError),

    #[error("generation unavailable: {0}")]
    GenerationUnavailable(CollaboratorError),

    #[error("config error: {0}")]
    Config(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("knowledge table error: {0}")]
    Tables(String),

    #[error("navigation target rejected: {0}")]
    Navigation(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    /// Errors caused by the caller's request rather than by this process or its collaborators.
    pub fn is_client_error(&self) -> bool {
        matches!(self, AppError::InvalidInput(_) | AppError::Navigation(_))
    }
}

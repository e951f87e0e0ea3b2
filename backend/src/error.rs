use thiserror::Error;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Game session not found")]
    SessionNotFound,
}

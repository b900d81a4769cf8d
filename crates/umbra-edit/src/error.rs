use thiserror::Error;

#[derive(Debug, Error)]
pub enum EditError {
    #[error("change manager is shut down")]
    ShutDown,
    #[error("failed to start change worker: {0}")]
    Spawn(#[source] std::io::Error),
}

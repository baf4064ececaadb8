use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransportError {
    /// The channel has been shut down.
    #[error("channel closed")]
    Closed,

    #[error("intent has an empty action")]
    EmptyAction,

    /// A receiver with the same name is already registered for the action.
    #[error("receiver {name} already registered for {action}")]
    AlreadyRegistered { name: String, action: String },
}

pub type Result<T> = std::result::Result<T, TransportError>;

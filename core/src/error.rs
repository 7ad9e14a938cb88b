use thiserror::Error;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("No game in progress, start a new one first")]
    NotActive,
    #[error("Unknown card kind")]
    UnknownCard,
    #[error("Unknown round outcome")]
    UnknownOutcome,
    #[error("Card is not in the player's hand")]
    CardNotInHand,
    #[error("Name is reserved for the computer opponent")]
    ReservedName,
    #[error("Name cannot change while a session is in progress")]
    SessionInProgress,
}

pub type Result<T> = core::result::Result<T, GameError>;

/// Failure of the storage medium behind a [`SlotStore`](crate::SlotStore).
#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Storage is not available")]
    Unavailable,
    #[error("Stored value could not be parsed")]
    Corrupted,
}

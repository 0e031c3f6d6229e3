use dom::StableId;
use thiserror::Error;

/// Why a single edit was skipped. None of these abort a batch.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PatchError {
    #[error("data-live-id={0} not found")]
    Lookup(StableId),

    #[error("data-live-id={0} cannot move into its own subtree")]
    Hierarchy(StableId),

    #[error("{0} has no parent to insert into")]
    MissingParent(&'static str),
}

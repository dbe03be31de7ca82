//! # Editing commands
use crate::model::SliceError;
use crate::transform::StepError;
use displaydoc::Display;
use thiserror::Error;

mod wrap;

pub use wrap::{wrap_selection, WrapSelection};

/// Why a command could not be applied
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum CommandError {
    /// Node type `{0}` is not part of the schema
    UnknownNodeType(String),
    /// No node type was given
    EmptyTypeChain,
    /// Node type `{0}` can't be created from the selection
    InvalidTarget(String),
    /// Could not cut the selected content: {0}
    Slice(#[from] SliceError),
    /// The new node does not fit: {0}
    Step(#[from] StepError),
    /// The transaction was rejected
    Rejected,
}

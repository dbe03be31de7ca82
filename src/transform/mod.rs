//! # The document transformations
//!
//! Edits are expressed as steps. A [`ReplaceStep`] replaces a range of the
//! document with a slice and maps positions across the change with a [`StepMap`].
mod replace_range;
mod step;

pub use replace_range::replace_range_with;
pub use step::{Assoc, ReplaceStep, Span, StepError, StepMap, StepResult};

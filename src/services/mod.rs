//! Service layer for pdflabel business logic.
//!
//! This module contains domain logic separated from UI concerns.

pub mod label;
pub mod pipeline;

pub use label::{LabelOutcome, Labeler, FAILED_LABEL, NO_TEXT_LABEL};
pub use pipeline::{LabelPipeline, RunSummary};

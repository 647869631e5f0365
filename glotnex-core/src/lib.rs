//! Glotnex core library.
//!
//! Builds NEXUS phylogenetic character matrices from cognate-coding records:
//! record filters, the three ascertainment construction strategies, the
//! combining-cognate postprocessor, and the NEXUS writer.

mod builder;
mod combining;
mod error;
mod filter;
mod maker;
mod matrix;
pub mod record;

pub use crate::{
    builder::{Ascertainment, MatrixBuilder},
    combining::remove_combining_cognates,
    error::{FilterError, FilterErrorCode, MatrixError, MatrixErrorCode},
    filter::{filter_parameters, filter_subtree},
    maker::NexusMaker,
    matrix::{Character, CharacterMatrix, CognateId},
    record::Record,
};

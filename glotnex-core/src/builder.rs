//! Builder utilities for configuring matrix construction.
//!
//! Exposes the ascertainment strategy selection surface and the switches
//! shared by all three construction strategies before a [`NexusMaker`] is
//! produced.

use crate::maker::NexusMaker;

/// Selects how ascertainment-bias correction characters are injected when
/// the matrix is built.
///
/// Every mode shares the same grouping of records into binary characters;
/// the modes differ only in which correction characters are added.
///
/// # Examples
/// ```
/// use glotnex_core::Ascertainment;
///
/// let mode = Ascertainment::Overall;
/// assert!(matches!(mode, Ascertainment::Overall));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Ascertainment {
    /// Base construction with no correction characters.
    #[default]
    None,
    /// A single all-zero correction character across the whole matrix.
    Overall,
    /// One correction character per parameter ("word").
    Word,
}

/// Configures and constructs [`NexusMaker`] instances.
///
/// # Examples
/// ```
/// use glotnex_core::{Ascertainment, MatrixBuilder};
///
/// let maker = MatrixBuilder::new()
///     .with_ascertainment(Ascertainment::Word)
///     .with_remove_loans(true)
///     .with_unique_ids(true)
///     .build();
/// assert_eq!(maker.ascertainment(), Ascertainment::Word);
/// ```
#[derive(Debug, Clone)]
pub struct MatrixBuilder {
    ascertainment: Ascertainment,
    remove_loans: bool,
    unique_ids: bool,
}

impl Default for MatrixBuilder {
    fn default() -> Self {
        Self {
            ascertainment: Ascertainment::None,
            remove_loans: true,
            unique_ids: true,
        }
    }
}

impl MatrixBuilder {
    /// Creates a builder populated with default parameters: no correction,
    /// loanwords removed, taxon labels made unique per language identifier.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the ascertainment-bias correction mode.
    #[must_use]
    pub fn with_ascertainment(mut self, mode: Ascertainment) -> Self {
        self.ascertainment = mode;
        self
    }

    /// Returns the configured ascertainment mode.
    #[must_use]
    pub fn ascertainment(&self) -> Ascertainment {
        self.ascertainment
    }

    /// Controls whether records flagged as loanwords are excluded.
    #[must_use]
    pub fn with_remove_loans(mut self, remove: bool) -> Self {
        self.remove_loans = remove;
        self
    }

    /// Returns whether loanwords will be excluded.
    #[must_use]
    pub fn remove_loans(&self) -> bool {
        self.remove_loans
    }

    /// Controls whether taxon labels are suffixed with the language
    /// identifier to keep matrix rows unique.
    #[must_use]
    pub fn with_unique_ids(mut self, unique: bool) -> Self {
        self.unique_ids = unique;
        self
    }

    /// Returns whether taxon labels carry the language-identifier suffix.
    #[must_use]
    pub fn unique_ids(&self) -> bool {
        self.unique_ids
    }

    /// Constructs the [`NexusMaker`] for the configured strategy.
    #[must_use]
    pub fn build(self) -> NexusMaker {
        NexusMaker::new(self.ascertainment, self.remove_loans, self.unique_ids)
    }
}

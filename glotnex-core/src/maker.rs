//! Matrix construction from cognate-coding records.
//!
//! [`NexusMaker`] turns a record list into a [`CharacterMatrix`]: records are
//! grouped by parameter and cognate set into binary characters, loanwords are
//! optionally excluded, uncoded forms found fresh singleton sets, and the
//! configured ascertainment strategy injects its correction characters.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{info, instrument};

use crate::{
    builder::Ascertainment,
    error::MatrixError,
    matrix::{Character, CharacterMatrix, CognateId},
    record::Record,
};

/// Constructs character matrices for one configured strategy.
///
/// Instances are produced by [`crate::MatrixBuilder`]; construction itself is
/// a pure function of the record list.
///
/// # Examples
/// ```
/// use glotnex_core::{MatrixBuilder, Record};
///
/// let records = vec![
///     Record::test_record("hand", "Mota", "1"),
///     Record::test_record("hand", "Fijian", "1"),
/// ];
/// let matrix = MatrixBuilder::new()
///     .build()
///     .build_matrix(&records)
///     .expect("taxa are unique");
/// assert_eq!(matrix.taxon_count(), 2);
/// assert_eq!(matrix.character_count(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct NexusMaker {
    ascertainment: Ascertainment,
    remove_loans: bool,
    unique_ids: bool,
}

impl NexusMaker {
    pub(crate) fn new(ascertainment: Ascertainment, remove_loans: bool, unique_ids: bool) -> Self {
        Self {
            ascertainment,
            remove_loans,
            unique_ids,
        }
    }

    /// Returns the ascertainment mode this maker applies.
    #[must_use]
    pub fn ascertainment(&self) -> Ascertainment {
        self.ascertainment
    }

    /// Returns whether loanwords are excluded during construction.
    #[must_use]
    pub fn remove_loans(&self) -> bool {
        self.remove_loans
    }

    /// Returns whether taxon labels carry the language-identifier suffix.
    #[must_use]
    pub fn unique_ids(&self) -> bool {
        self.unique_ids
    }

    /// Builds the character matrix for `records`.
    ///
    /// An empty record list yields an empty matrix; this is not an error so
    /// aggressive filtering still produces a structurally valid output file.
    ///
    /// # Errors
    /// Returns [`MatrixError::DuplicateTaxon`] when two distinct language
    /// identifiers resolve to the same taxon label.
    #[instrument(
        name = "core.build_matrix",
        err,
        skip(self, records),
        fields(records = records.len(), mode = ?self.ascertainment),
    )]
    pub fn build_matrix(&self, records: &[Record]) -> Result<CharacterMatrix, MatrixError> {
        let mut taxa = BTreeSet::new();
        let mut taxon_owners: BTreeMap<String, String> = BTreeMap::new();
        let mut coverage: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        let mut sets: BTreeMap<(String, String), BTreeSet<String>> = BTreeMap::new();
        let mut unique_counters: BTreeMap<String, u32> = BTreeMap::new();
        let mut uniques: Vec<(String, u32, String)> = Vec::new();
        let mut loans_removed = 0_usize;

        for record in records {
            if self.remove_loans && record.loan {
                loans_removed += 1;
                continue;
            }
            let taxon = self.taxon_label(record);
            match taxon_owners.get(&taxon) {
                Some(owner) if *owner != record.language_id => {
                    return Err(MatrixError::DuplicateTaxon {
                        taxon,
                        left_language_id: owner.clone(),
                        right_language_id: record.language_id.clone(),
                    });
                }
                Some(_) => {}
                None => {
                    taxon_owners.insert(taxon.clone(), record.language_id.clone());
                }
            }
            taxa.insert(taxon.clone());
            coverage
                .entry(record.parameter.clone())
                .or_default()
                .insert(taxon.clone());
            match record.cognate_set() {
                Some(set) => {
                    sets.entry((record.parameter.clone(), set.to_owned()))
                        .or_default()
                        .insert(taxon);
                }
                None => {
                    let counter = unique_counters.entry(record.parameter.clone()).or_insert(0);
                    *counter += 1;
                    uniques.push((record.parameter.clone(), *counter, taxon));
                }
            }
        }

        let mut characters: Vec<Character> = Vec::with_capacity(sets.len() + uniques.len());
        for ((parameter, set), present) in sets {
            let label = format!("{parameter}_{set}");
            characters.push(Character::new(
                label,
                Some(parameter),
                CognateId::Set(set),
                present,
            ));
        }
        for (parameter, ordinal, taxon) in uniques {
            let label = format!("{parameter}_u{ordinal}");
            characters.push(Character::new(
                label,
                Some(parameter),
                CognateId::Unique(ordinal),
                [taxon].into_iter().collect(),
            ));
        }
        self.add_ascertainment(&coverage, &mut characters);

        info!(
            taxa = taxa.len(),
            characters = characters.len(),
            loans_removed,
            "constructed character matrix"
        );
        Ok(CharacterMatrix::new(taxa, characters, coverage))
    }

    fn taxon_label(&self, record: &Record) -> String {
        if self.unique_ids {
            format!("{}_{}", record.language, record.language_id)
        } else {
            record.language.clone()
        }
    }

    fn add_ascertainment(
        &self,
        coverage: &BTreeMap<String, BTreeSet<String>>,
        characters: &mut Vec<Character>,
    ) {
        match self.ascertainment {
            Ascertainment::None => {}
            Ascertainment::Overall => {
                characters.push(Character::new(
                    "_ascertainment_0".to_owned(),
                    None,
                    CognateId::Ascertainment,
                    BTreeSet::new(),
                ));
            }
            Ascertainment::Word => {
                for parameter in coverage.keys() {
                    characters.push(Character::new(
                        format!("{parameter}_0ascertainment"),
                        Some(parameter.clone()),
                        CognateId::Ascertainment,
                        BTreeSet::new(),
                    ));
                }
            }
        }
    }
}

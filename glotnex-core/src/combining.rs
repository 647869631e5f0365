//! Removal of combining-cognate characters from a constructed matrix.
//!
//! ABVD-style codings such as `1,65` denote a cognate set combined from
//! several simpler components. Downstream analyses sometimes want those
//! compound sets stripped; this module drops every character whose set has
//! more components than a caller-chosen threshold.

use tracing::info;

use crate::matrix::CharacterMatrix;

/// Returns a matrix without characters combining more than `keep` components.
///
/// Unique-set and ascertainment characters are never combining and always
/// survive. Taxa and parameter coverage are left untouched, so the cell
/// states of the surviving characters do not change.
///
/// # Examples
/// ```
/// use glotnex_core::{MatrixBuilder, Record, remove_combining_cognates};
///
/// let records = vec![
///     Record::test_record("hand", "Mota", "1"),
///     Record::test_record("hand", "Fijian", "1,65"),
/// ];
/// let matrix = MatrixBuilder::new()
///     .build()
///     .build_matrix(&records)
///     .expect("taxa are unique");
/// assert_eq!(matrix.character_count(), 2);
///
/// let pruned = remove_combining_cognates(matrix, 1);
/// assert_eq!(pruned.character_count(), 1);
/// assert!(pruned.character("hand_1").is_some());
/// ```
#[must_use]
pub fn remove_combining_cognates(matrix: CharacterMatrix, keep: u32) -> CharacterMatrix {
    let keep = keep as usize;
    let (taxa, characters, coverage) = matrix.into_parts();
    let before = characters.len();
    let kept: Vec<_> = characters
        .into_iter()
        .filter(|character| character.components().is_none_or(|n| n <= keep))
        .collect();
    info!(
        removed = before - kept.len(),
        keep, "removed combining cognate characters"
    );
    CharacterMatrix::new(taxa, kept, coverage)
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;

    use crate::{
        builder::{Ascertainment, MatrixBuilder},
        matrix::Character,
        record::Record,
    };

    fn combined_matrix(mode: Ascertainment) -> CharacterMatrix {
        let records = vec![
            Record::test_record("hand", "Mota", "1"),
            Record::test_record("hand", "Fijian", "1,65"),
            Record::test_record("hand", "Maori", "1,65,3"),
            Record::test_record("leg", "Mota", ""),
        ];
        MatrixBuilder::new()
            .with_ascertainment(mode)
            .build()
            .build_matrix(&records)
            .expect("taxa are unique")
    }

    #[rstest]
    #[case::strip_all_compounds(1, vec!["hand_1", "leg_u1"])]
    #[case::keep_pairs(2, vec!["hand_1", "hand_1,65", "leg_u1"])]
    #[case::threshold_above_max(3, vec!["hand_1", "hand_1,65", "hand_1,65,3", "leg_u1"])]
    fn drops_characters_above_the_threshold(
        #[case] keep: u32,
        #[case] expected: Vec<&str>,
    ) {
        let pruned = remove_combining_cognates(combined_matrix(Ascertainment::None), keep);
        let labels: Vec<&str> = pruned.characters().iter().map(Character::label).collect();
        assert_eq!(labels, expected);
    }

    #[test]
    fn taxa_and_states_survive_pruning() {
        let matrix = combined_matrix(Ascertainment::None);
        let taxa = matrix.taxa().clone();
        let pruned = remove_combining_cognates(matrix, 1);
        assert_eq!(pruned.taxa(), &taxa);
        let hand_1 = pruned.character("hand_1").expect("kept");
        // Maori still counts as having hand data, so absence stays `0`.
        assert_eq!(pruned.state(hand_1, "Maori_Maori"), '0');
        let leg_u1 = pruned.character("leg_u1").expect("kept");
        assert_eq!(pruned.state(leg_u1, "Maori_Maori"), '?');
    }

    #[test]
    fn ascertainment_characters_are_never_removed() {
        let pruned = remove_combining_cognates(combined_matrix(Ascertainment::Word), 1);
        assert!(pruned.character("hand_0ascertainment").is_some());
        assert!(pruned.character("leg_0ascertainment").is_some());
        assert!(pruned.character("hand_1,65").is_none());
    }
}

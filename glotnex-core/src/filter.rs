//! Record filters applied between loading and matrix construction.
//!
//! Each filter is a pure function taking and returning an owned record list,
//! so the pipeline stages remain independently testable. Taxonomy state (the
//! language table and the resolved subtree) is passed in explicitly rather
//! than looked up ambiently.
//!
//! Filters only ever remove records; they never add or rewrite them, and the
//! relative order of surviving records is preserved. A filter entry that
//! removes nothing is reported as a warning but never fails the run.

use std::collections::{HashMap, HashSet};

use tracing::{info, warn};

use crate::{error::FilterError, record::Record};

/// Drops every record whose parameter matches an entry of `deny_list`.
///
/// Matching is case-insensitive. Blank entries are skipped, so an empty
/// deny-list (or a file of blank lines) leaves the records untouched. For
/// each effective entry the number of removed records is logged; an entry
/// that removes nothing emits a warning since it is likely a typo or an
/// already-absent parameter.
///
/// # Examples
/// ```
/// use glotnex_core::{Record, filter_parameters};
///
/// let records = vec![
///     Record::test_record("hand", "Mota", "1"),
///     Record::test_record("leg", "Mota", "2"),
/// ];
/// let kept = filter_parameters(records, &["HAND".into()]);
/// assert_eq!(kept.len(), 1);
/// assert_eq!(kept[0].parameter, "leg");
/// ```
#[must_use]
pub fn filter_parameters(records: Vec<Record>, deny_list: &[String]) -> Vec<Record> {
    let mut records = records;
    for entry in deny_list {
        let entry = entry.trim();
        if entry.is_empty() {
            continue;
        }
        let needle = entry.to_lowercase();
        let before = records.len();
        records.retain(|record| record.parameter.to_lowercase() != needle);
        let removed = before - records.len();
        info!(removed, parameter = entry, "removed records for parameter");
        if removed == 0 {
            warn!(parameter = entry, "no records removed for parameter");
        }
    }
    records
}

/// Keeps only records whose language lies inside the given taxonomy subtree.
///
/// `glottocodes` maps dataset language identifiers to taxonomy codes and
/// `subtree` is the inclusive descendant set of the chosen root, resolved by
/// the caller. Removing zero records emits a warning; downstream stages
/// still run on whatever survives, including an empty list.
///
/// # Errors
/// Returns [`FilterError::UnknownLanguage`] when a record's language
/// identifier is absent from `glottocodes`. The error is propagated, not
/// recovered from.
///
/// # Examples
/// ```
/// use std::collections::{HashMap, HashSet};
/// use glotnex_core::{Record, filter_subtree};
///
/// let records = vec![
///     Record::test_record("hand", "mota", "1"),
///     Record::test_record("hand", "fiji", "2"),
/// ];
/// let glottocodes: HashMap<String, String> = [
///     ("mota".to_owned(), "mota1237".to_owned()),
///     ("fiji".to_owned(), "fiji1243".to_owned()),
/// ]
/// .into_iter()
/// .collect();
/// let subtree: HashSet<String> = ["mota1237".to_owned()].into_iter().collect();
///
/// let kept = filter_subtree(records, &glottocodes, &subtree)?;
/// assert_eq!(kept.len(), 1);
/// assert_eq!(kept[0].language_id, "mota");
/// # Ok::<(), glotnex_core::FilterError>(())
/// ```
pub fn filter_subtree(
    records: Vec<Record>,
    glottocodes: &HashMap<String, String>,
    subtree: &HashSet<String>,
) -> Result<Vec<Record>, FilterError> {
    let before = records.len();
    let mut kept = Vec::with_capacity(records.len());
    for record in records {
        let glottocode =
            glottocodes
                .get(&record.language_id)
                .ok_or_else(|| FilterError::UnknownLanguage {
                    language_id: record.language_id.clone(),
                })?;
        if subtree.contains(glottocode) {
            kept.push(record);
        }
    }
    let removed = before - kept.len();
    info!(removed, remaining = kept.len(), "pruned records outside subtree");
    if removed == 0 {
        warn!("no records removed for subtree");
    }
    Ok(kept)
}

#[cfg(test)]
mod tests {
    use super::*;

    use glotnex_test_support::tracing::RecordingLayer;
    use rstest::rstest;
    use tracing::Level;
    use tracing_subscriber::layer::SubscriberExt;

    fn sample_records() -> Vec<Record> {
        vec![
            Record::test_record("hand", "Mota", "1"),
            Record::test_record("leg", "Mota", "4"),
            Record::test_record("hand", "Fijian", "1"),
            Record::test_record("Hand", "Maori", "2"),
            Record::test_record("leg", "Maori", "5"),
        ]
    }

    fn recorded<F: FnOnce()>(run: F) -> RecordingLayer {
        let layer = RecordingLayer::default();
        let subscriber = tracing_subscriber::registry().with(layer.clone());
        tracing::subscriber::with_default(subscriber, run);
        layer
    }

    fn warnings(layer: &RecordingLayer) -> Vec<String> {
        layer
            .events()
            .into_iter()
            .filter(|event| event.level == Level::WARN)
            .map(|event| event.fields.get("message").cloned().unwrap_or_default())
            .collect()
    }

    #[rstest]
    #[case::exact("hand")]
    #[case::upper("HAND")]
    #[case::mixed("hAnD")]
    fn filter_parameters_matches_case_insensitively(#[case] entry: &str) {
        let kept = filter_parameters(sample_records(), &[entry.to_owned()]);
        // "hand" twice plus Maori's "Hand" drop regardless of entry case.
        assert_eq!(kept.len(), 2);
        assert!(kept.iter().all(|r| !r.parameter.eq_ignore_ascii_case("hand")));
    }

    #[test]
    fn filter_parameters_preserves_relative_order() {
        let kept = filter_parameters(sample_records(), &["hand".to_owned()]);
        let parameters: Vec<&str> = kept.iter().map(|r| r.parameter.as_str()).collect();
        let languages: Vec<&str> = kept.iter().map(|r| r.language.as_str()).collect();
        assert_eq!(parameters, ["leg", "leg"]);
        assert_eq!(languages, ["Mota", "Maori"]);
    }

    #[rstest]
    #[case::empty(Vec::new())]
    #[case::blank_lines(vec![String::new(), "   ".to_owned()])]
    fn filter_parameters_with_no_effective_entries_is_identity(#[case] deny: Vec<String>) {
        let records = sample_records();
        let expected = records.clone();
        let layer = recorded(|| {
            let kept = filter_parameters(records, &deny);
            assert_eq!(kept, expected);
        });
        assert!(warnings(&layer).is_empty());
    }

    #[test]
    fn filter_parameters_warns_on_zero_effect_entry() {
        let layer = recorded(|| {
            let kept = filter_parameters(sample_records(), &["wing".to_owned()]);
            assert_eq!(kept.len(), 5);
        });
        let warned = warnings(&layer);
        assert_eq!(warned, ["no records removed for parameter"]);
    }

    #[test]
    fn filter_parameters_removes_exactly_the_matching_records() {
        let mut records = Vec::new();
        for index in 0..100 {
            let parameter = if index % 20 == 0 { "hand" } else { "leg" };
            let mut record = Record::test_record(parameter, "Mota", "1");
            record.id = format!("r{index}");
            records.push(record);
        }
        let layer = recorded(|| {
            let kept = filter_parameters(records, &["hand".to_owned()]);
            assert_eq!(kept.len(), 95);
        });
        assert!(warnings(&layer).is_empty());
    }

    #[test]
    fn filter_parameters_does_not_warn_on_effective_entry() {
        let layer = recorded(|| {
            let kept = filter_parameters(sample_records(), &["leg".to_owned()]);
            assert_eq!(kept.len(), 3);
        });
        assert!(warnings(&layer).is_empty());
    }

    fn lookup() -> HashMap<String, String> {
        [
            ("Mota".to_owned(), "mota1237".to_owned()),
            ("Fijian".to_owned(), "fiji1243".to_owned()),
            ("Maori".to_owned(), "maor1246".to_owned()),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn filter_subtree_keeps_only_members() {
        let subtree: HashSet<String> = ["mota1237".to_owned(), "maor1246".to_owned()]
            .into_iter()
            .collect();
        let kept = filter_subtree(sample_records(), &lookup(), &subtree)
            .expect("all languages resolve");
        assert_eq!(kept.len(), 4);
        assert!(kept.iter().all(|r| r.language_id != "Fijian"));
        let languages: Vec<&str> = kept.iter().map(|r| r.language.as_str()).collect();
        assert_eq!(languages, ["Mota", "Mota", "Maori", "Maori"]);
    }

    #[test]
    fn filter_subtree_rejects_unknown_language() {
        let mut glottocodes = lookup();
        glottocodes.remove("Fijian");
        let subtree: HashSet<String> = ["mota1237".to_owned()].into_iter().collect();
        let err = filter_subtree(sample_records(), &glottocodes, &subtree)
            .expect_err("missing language must fail");
        assert_eq!(
            err,
            FilterError::UnknownLanguage {
                language_id: "Fijian".to_owned(),
            }
        );
    }

    #[test]
    fn filter_subtree_warns_when_nothing_removed() {
        let subtree: HashSet<String> = lookup().into_values().collect();
        let layer = recorded(|| {
            let kept = filter_subtree(sample_records(), &lookup(), &subtree)
                .expect("all languages resolve");
            assert_eq!(kept.len(), 5);
        });
        assert_eq!(warnings(&layer), ["no records removed for subtree"]);
    }

    #[test]
    fn filter_subtree_may_remove_everything() {
        let subtree = HashSet::new();
        let layer = recorded(|| {
            let kept = filter_subtree(sample_records(), &lookup(), &subtree)
                .expect("all languages resolve");
            assert!(kept.is_empty());
        });
        assert!(warnings(&layer).is_empty());
    }
}

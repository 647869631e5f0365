//! Cognate-coding record model.
//!
//! A [`Record`] is one observation from a lexical dataset: a word form in one
//! language, coded against zero or more cognate sets. Records are immutable
//! once loaded; the filter and matrix stages only include or exclude them.

/// One cognate-coding observation.
///
/// The `cognacy` field holds the raw coding string from the dataset. A coding
/// with comma-separated components (for example `1,65`) denotes a single
/// *combined* cognate set built from those components, not membership in
/// several sets. An empty coding means the form has not been assigned to any
/// set yet.
///
/// # Examples
/// ```
/// use glotnex_core::Record;
///
/// let record = Record {
///     id: "1".into(),
///     language_id: "abc".into(),
///     language: "Mota".into(),
///     parameter: "hand".into(),
///     value: "lima".into(),
///     cognacy: "1".into(),
///     loan: false,
/// };
/// assert_eq!(record.cognate_set(), Some("1"));
/// assert!(record.is_coded());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Dataset-wide identifier for this observation.
    pub id: String,
    /// Identifier of the language in the dataset's language table.
    pub language_id: String,
    /// Display name of the language.
    pub language: String,
    /// Semantic concept (meaning) this form expresses.
    pub parameter: String,
    /// The word form itself.
    pub value: String,
    /// Raw cognate-set coding, empty when the form is uncoded.
    pub cognacy: String,
    /// Whether the form was flagged as a loanword.
    pub loan: bool,
}

impl Record {
    /// Returns the trimmed cognate-set coding, or `None` for uncoded forms.
    ///
    /// # Examples
    /// ```
    /// use glotnex_core::Record;
    ///
    /// let mut record = Record::test_record("hand", "taxon", " 1,65 ");
    /// assert_eq!(record.cognate_set(), Some("1,65"));
    /// record.cognacy = "  ".into();
    /// assert_eq!(record.cognate_set(), None);
    /// ```
    #[must_use]
    pub fn cognate_set(&self) -> Option<&str> {
        let trimmed = self.cognacy.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed)
        }
    }

    /// Returns whether the form carries a cognate-set coding.
    #[must_use]
    pub fn is_coded(&self) -> bool {
        self.cognate_set().is_some()
    }

    /// Builds a minimal record for use in tests and documentation examples.
    ///
    /// The language name doubles as the language identifier so taxa resolve
    /// predictably without a full language table.
    #[must_use]
    pub fn test_record(parameter: &str, language: &str, cognacy: &str) -> Self {
        Self {
            id: format!("{language}-{parameter}"),
            language_id: language.to_owned(),
            language: language.to_owned(),
            parameter: parameter.to_owned(),
            value: String::new(),
            cognacy: cognacy.to_owned(),
            loan: false,
        }
    }
}

/// Counts the comma-separated components of a cognate-set coding.
///
/// Blank components are ignored, so `"1,"` counts as one component.
///
/// # Examples
/// ```
/// use glotnex_core::record::component_count;
///
/// assert_eq!(component_count("1"), 1);
/// assert_eq!(component_count("1,65"), 2);
/// assert_eq!(component_count("1, 65, 3"), 3);
/// ```
#[must_use]
pub fn component_count(cognate_set: &str) -> usize {
    cognate_set
        .split(',')
        .filter(|part| !part.trim().is_empty())
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;

    #[rstest]
    #[case("1", Some("1"))]
    #[case(" 24 ", Some("24"))]
    #[case("1,65", Some("1,65"))]
    #[case("", None)]
    #[case("   ", None)]
    fn cognate_set_trims_and_rejects_blank(#[case] cognacy: &str, #[case] expected: Option<&str>) {
        let record = Record::test_record("hand", "Mota", cognacy);
        assert_eq!(record.cognate_set(), expected);
        assert_eq!(record.is_coded(), expected.is_some());
    }

    #[rstest]
    #[case("1", 1)]
    #[case("1,65", 2)]
    #[case("1, 65 ,3", 3)]
    #[case("1,", 1)]
    fn component_count_splits_on_commas(#[case] coding: &str, #[case] expected: usize) {
        assert_eq!(component_count(coding), expected);
    }
}

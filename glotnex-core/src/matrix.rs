//! Character matrix model and NEXUS serialization.
//!
//! A [`CharacterMatrix`] is the product of matrix construction: taxa (one per
//! doculect) crossed with binary presence/absence characters (one per cognate
//! set), plus any ascertainment-correction characters the chosen strategy
//! injected. Cells distinguish absence (`0`) from missing data (`?`): a taxon
//! without any record for a parameter is unknown for all of that parameter's
//! characters rather than absent.

use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write as _;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::record::component_count;

/// Identifies the cognate set a character was derived from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CognateId {
    /// A coded cognate set, possibly combined from several components.
    Set(String),
    /// A singleton set founded by an uncoded record.
    Unique(u32),
    /// An ascertainment-bias correction character.
    Ascertainment,
}

/// One column of the matrix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Character {
    label: String,
    parameter: Option<String>,
    cognate: CognateId,
    present: BTreeSet<String>,
}

impl Character {
    pub(crate) fn new(
        label: String,
        parameter: Option<String>,
        cognate: CognateId,
        present: BTreeSet<String>,
    ) -> Self {
        Self {
            label,
            parameter,
            cognate,
            present,
        }
    }

    /// Returns the character's label as written to the NEXUS file.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Returns the parameter this character belongs to; `None` only for the
    /// matrix-wide ascertainment character.
    #[must_use]
    pub fn parameter(&self) -> Option<&str> {
        self.parameter.as_deref()
    }

    /// Returns the cognate-set identity behind this character.
    #[must_use]
    pub fn cognate(&self) -> &CognateId {
        &self.cognate
    }

    /// Returns whether this is an ascertainment-correction character.
    #[must_use]
    pub fn is_ascertainment(&self) -> bool {
        matches!(self.cognate, CognateId::Ascertainment)
    }

    /// Number of combined components behind a coded set; `None` for unique
    /// and ascertainment characters, which are never combining.
    #[must_use]
    pub fn components(&self) -> Option<usize> {
        match &self.cognate {
            CognateId::Set(set) => Some(component_count(set)),
            CognateId::Unique(_) | CognateId::Ascertainment => None,
        }
    }

    /// Taxa scored `1` for this character.
    #[must_use]
    pub fn present(&self) -> &BTreeSet<String> {
        &self.present
    }
}

/// The constructed taxa-by-characters matrix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharacterMatrix {
    taxa: BTreeSet<String>,
    characters: Vec<Character>,
    coverage: BTreeMap<String, BTreeSet<String>>,
}

impl CharacterMatrix {
    pub(crate) fn new(
        taxa: BTreeSet<String>,
        mut characters: Vec<Character>,
        coverage: BTreeMap<String, BTreeSet<String>>,
    ) -> Self {
        characters.sort_by(|a, b| a.label.cmp(&b.label));
        Self {
            taxa,
            characters,
            coverage,
        }
    }

    /// Returns the taxa (matrix rows) in label order.
    #[must_use]
    pub fn taxa(&self) -> &BTreeSet<String> {
        &self.taxa
    }

    /// Returns the characters (matrix columns) in label order.
    #[must_use]
    pub fn characters(&self) -> &[Character] {
        &self.characters
    }

    /// Looks a character up by its label.
    #[must_use]
    pub fn character(&self, label: &str) -> Option<&Character> {
        self.characters.iter().find(|c| c.label == label)
    }

    /// Number of taxa.
    #[must_use]
    pub fn taxon_count(&self) -> usize {
        self.taxa.len()
    }

    /// Number of characters.
    #[must_use]
    pub fn character_count(&self) -> usize {
        self.characters.len()
    }

    /// Returns whether the matrix holds no taxa and no characters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.taxa.is_empty() && self.characters.is_empty()
    }

    pub(crate) fn into_parts(
        self,
    ) -> (
        BTreeSet<String>,
        Vec<Character>,
        BTreeMap<String, BTreeSet<String>>,
    ) {
        (self.taxa, self.characters, self.coverage)
    }

    /// Resolves the cell state for `character` and `taxon`.
    ///
    /// `1` means the taxon has a form in the character's cognate set, `0`
    /// means the taxon has data for the parameter but not the set, `?` means
    /// no data for the parameter at all. Ascertainment characters score `0`
    /// wherever the taxon has data in their scope and `?` otherwise.
    #[must_use]
    pub fn state(&self, character: &Character, taxon: &str) -> char {
        match (&character.cognate, character.parameter.as_deref()) {
            (CognateId::Ascertainment, None) => '0',
            (CognateId::Ascertainment, Some(parameter)) => {
                if self.has_coverage(parameter, taxon) {
                    '0'
                } else {
                    '?'
                }
            }
            (_, parameter) => {
                if character.present.contains(taxon) {
                    '1'
                } else if parameter.is_some_and(|p| self.has_coverage(p, taxon)) {
                    '0'
                } else {
                    '?'
                }
            }
        }
    }

    fn has_coverage(&self, parameter: &str, taxon: &str) -> bool {
        self.coverage
            .get(parameter)
            .is_some_and(|taxa| taxa.contains(taxon))
    }

    /// Renders the matrix as a NEXUS `data` block.
    ///
    /// Characters appear in label order, taxa in row-label order. Labels
    /// containing characters outside `[A-Za-z0-9_.-]` are single-quoted.
    #[must_use]
    pub fn to_nexus_string(&self) -> String {
        let mut out = String::new();
        out.push_str("#NEXUS\n\n");
        out.push_str("begin data;\n");
        let _ = writeln!(
            out,
            "  dimensions ntax={} nchar={};",
            self.taxon_count(),
            self.character_count()
        );
        out.push_str("  format datatype=standard symbols=\"01\" gap=- missing=?;\n");
        if !self.characters.is_empty() {
            out.push_str("  charstatelabels\n");
            let last = self.characters.len() - 1;
            for (index, character) in self.characters.iter().enumerate() {
                let suffix = if index == last { "" } else { "," };
                let _ = writeln!(
                    out,
                    "    {} {}{}",
                    index + 1,
                    quote_token(&character.label),
                    suffix
                );
            }
            out.push_str("  ;\n");
        }
        out.push_str("  matrix\n");
        let width = self
            .taxa
            .iter()
            .map(|taxon| quote_token(taxon).chars().count())
            .max()
            .unwrap_or(0);
        for taxon in &self.taxa {
            let row: String = self
                .characters
                .iter()
                .map(|character| self.state(character, taxon))
                .collect();
            let label = quote_token(taxon);
            let _ = writeln!(out, "  {label:<width$}  {row}");
        }
        out.push_str("  ;\nend;\n");
        out
    }

    /// Writes the NEXUS rendition to `writer`.
    ///
    /// # Errors
    /// Returns any [`io::Error`] raised by the underlying writer.
    pub fn write<W: Write>(&self, mut writer: W) -> io::Result<()> {
        writer.write_all(self.to_nexus_string().as_bytes())
    }

    /// Writes the NEXUS rendition to a file at `path`.
    ///
    /// # Errors
    /// Returns any [`io::Error`] raised while creating or writing the file.
    pub fn write_path(&self, path: &Path) -> io::Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        self.write(&mut writer)?;
        writer.flush()
    }
}

/// Quotes a NEXUS token when it contains characters that would otherwise
/// break the block grammar. Embedded single quotes are doubled.
fn quote_token(token: &str) -> Cow<'_, str> {
    let safe = !token.is_empty()
        && token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'));
    if safe {
        Cow::Borrowed(token)
    } else {
        Cow::Owned(format!("'{}'", token.replace('\'', "''")))
    }
}

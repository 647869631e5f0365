//! CLDF dataset provider: loads cognate-coding records and the language
//! table from a metadata-described tabular dataset.
//!
//! A CLDF dataset is a JSON metadata descriptor (`cldf-metadata.json`) whose
//! `tables` entries point at CSV files. This provider resolves the
//! `FormTable`, `ParameterTable`, and `LanguageTable` components, joins
//! human-readable parameter and language names onto the forms, and yields
//! [`glotnex_core::Record`]s ready for filtering and matrix construction.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use glotnex_core::Record;

const FORM_TABLE: &str = "FormTable";
const PARAMETER_TABLE: &str = "ParameterTable";
const LANGUAGE_TABLE: &str = "LanguageTable";

/// Errors raised while locating or reading a CLDF dataset.
#[derive(Debug, Error)]
pub enum CldfError {
    /// The metadata descriptor or one of its tables could not be read.
    #[error("failed to read `{path}`: {source}")]
    Io {
        /// Path that triggered the failure.
        path: PathBuf,
        /// Underlying operating system error.
        #[source]
        source: io::Error,
    },
    /// The metadata descriptor was not valid JSON.
    #[error("failed to parse metadata `{path}`: {source}")]
    Metadata {
        /// Path of the offending descriptor.
        path: PathBuf,
        /// Underlying JSON parse failure.
        #[source]
        source: serde_json::Error,
    },
    /// A table CSV failed to parse.
    #[error("failed to parse `{path}`: {source}")]
    Csv {
        /// Path of the offending table.
        path: PathBuf,
        /// Underlying CSV failure.
        #[source]
        source: csv::Error,
    },
    /// The metadata declared no table for a required component.
    #[error("metadata `{path}` declares no {component} component")]
    MissingTable {
        /// Path of the descriptor lacking the component.
        path: PathBuf,
        /// The `dc:conformsTo` component that was expected.
        component: &'static str,
    },
}

/// One row of the dataset's language table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LanguageRow {
    /// Dataset-local language identifier.
    #[serde(rename = "ID")]
    pub id: String,
    /// Display name of the language.
    #[serde(rename = "Name", default)]
    pub name: String,
    /// Taxonomy code; empty when the dataset has not linked the language.
    #[serde(rename = "Glottocode", default)]
    pub glottocode: String,
}

#[derive(Debug, Deserialize)]
struct FormRow {
    #[serde(rename = "ID")]
    id: String,
    #[serde(rename = "Language_ID")]
    language_id: String,
    #[serde(rename = "Parameter_ID")]
    parameter_id: String,
    #[serde(rename = "Value", default)]
    value: String,
    #[serde(rename = "Form", default)]
    form: String,
    #[serde(rename = "Cognacy", default)]
    cognacy: String,
    #[serde(rename = "Loan", default)]
    loan: String,
}

#[derive(Debug, Deserialize)]
struct ParameterRow {
    #[serde(rename = "ID")]
    id: String,
    #[serde(rename = "Name", default)]
    name: String,
}

/// A located CLDF dataset: the descriptor plus resolved table paths.
#[derive(Debug, Clone)]
pub struct CldfDataset {
    forms_path: PathBuf,
    parameters_path: Option<PathBuf>,
    languages_path: PathBuf,
}

/// The fully loaded dataset contents.
#[derive(Debug, Clone)]
pub struct LoadedData {
    /// Cognate-coding records with parameter and language names joined on.
    pub records: Vec<Record>,
    /// The language table, in file order.
    pub languages: Vec<LanguageRow>,
}

impl LoadedData {
    /// Builds the language-identifier → taxonomy-code lookup used by the
    /// subtree filter.
    #[must_use]
    pub fn glottocode_lookup(&self) -> HashMap<String, String> {
        glottocode_lookup(&self.languages)
    }
}

/// Builds the language-identifier → taxonomy-code lookup used by the subtree
/// filter. Languages without a taxonomy code map to an empty string, so they
/// resolve (no lookup error) but never fall inside any subtree.
#[must_use]
pub fn glottocode_lookup(languages: &[LanguageRow]) -> HashMap<String, String> {
    languages
        .iter()
        .map(|row| (row.id.clone(), row.glottocode.clone()))
        .collect()
}

impl CldfDataset {
    /// Locates the dataset behind a `cldf-metadata.json` descriptor.
    ///
    /// Table URLs are resolved relative to the descriptor's directory. The
    /// `ParameterTable` is optional; without it, records keep their raw
    /// parameter identifiers as names.
    ///
    /// # Errors
    /// Returns [`CldfError`] when the descriptor cannot be read or parsed,
    /// or when it declares no `FormTable` or `LanguageTable`.
    pub fn from_metadata_path(metadata_path: &Path) -> Result<Self, CldfError> {
        let text = std::fs::read_to_string(metadata_path).map_err(|source| CldfError::Io {
            path: metadata_path.to_path_buf(),
            source,
        })?;
        let document: serde_json::Value =
            serde_json::from_str(&text).map_err(|source| CldfError::Metadata {
                path: metadata_path.to_path_buf(),
                source,
            })?;
        let base = metadata_path.parent().unwrap_or_else(|| Path::new("."));

        let forms_path = table_url(&document, FORM_TABLE)
            .map(|url| base.join(url))
            .ok_or(CldfError::MissingTable {
                path: metadata_path.to_path_buf(),
                component: FORM_TABLE,
            })?;
        let languages_path = table_url(&document, LANGUAGE_TABLE)
            .map(|url| base.join(url))
            .ok_or(CldfError::MissingTable {
                path: metadata_path.to_path_buf(),
                component: LANGUAGE_TABLE,
            })?;
        let parameters_path = table_url(&document, PARAMETER_TABLE).map(|url| base.join(url));

        debug!(
            forms = %forms_path.display(),
            languages = %languages_path.display(),
            "resolved dataset tables"
        );
        Ok(Self {
            forms_path,
            parameters_path,
            languages_path,
        })
    }

    /// Reads every table and joins names onto the form records.
    ///
    /// # Errors
    /// Returns [`CldfError`] when a table file is missing or malformed.
    pub fn load(&self) -> Result<LoadedData, CldfError> {
        let languages = self.load_languages()?;
        let parameters = self.load_parameters()?;
        let language_names: HashMap<&str, &str> = languages
            .iter()
            .map(|row| (row.id.as_str(), row.name.as_str()))
            .collect();

        let mut records = Vec::new();
        for row in read_rows::<FormRow>(&self.forms_path)? {
            let row = row?;
            let parameter = parameters
                .get(row.parameter_id.as_str())
                .cloned()
                .unwrap_or_else(|| row.parameter_id.clone());
            let language = language_names
                .get(row.language_id.as_str())
                .map_or_else(|| row.language_id.clone(), |name| (*name).to_owned());
            let value = if row.form.is_empty() { row.value } else { row.form };
            records.push(Record {
                id: row.id,
                language_id: row.language_id,
                language,
                parameter,
                value,
                cognacy: row.cognacy,
                loan: parse_flag(&row.loan),
            });
        }
        Ok(LoadedData { records, languages })
    }

    fn load_languages(&self) -> Result<Vec<LanguageRow>, CldfError> {
        read_rows::<LanguageRow>(&self.languages_path)?.collect()
    }

    fn load_parameters(&self) -> Result<HashMap<String, String>, CldfError> {
        let Some(path) = &self.parameters_path else {
            return Ok(HashMap::new());
        };
        let mut names = HashMap::new();
        for row in read_rows::<ParameterRow>(path)? {
            let row = row?;
            if !row.name.is_empty() {
                names.insert(row.id, row.name);
            }
        }
        Ok(names)
    }
}

/// Extracts the file URL of the table conforming to the given CLDF component.
fn table_url<'a>(document: &'a serde_json::Value, component: &str) -> Option<&'a str> {
    let suffix = format!("#{component}");
    document
        .get("tables")?
        .as_array()?
        .iter()
        .find(|table| {
            table
                .get("dc:conformsTo")
                .and_then(serde_json::Value::as_str)
                .is_some_and(|uri| uri.ends_with(&suffix))
        })?
        .get("url")?
        .as_str()
}

/// Interprets the CSVW serializations of a boolean flag column.
fn parse_flag(raw: &str) -> bool {
    matches!(raw.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes")
}

struct RowIter<T> {
    path: PathBuf,
    inner: csv::DeserializeRecordsIntoIter<std::fs::File, T>,
}

impl<T: serde::de::DeserializeOwned> Iterator for RowIter<T> {
    type Item = Result<T, CldfError>;

    fn next(&mut self) -> Option<Self::Item> {
        let row = self.inner.next()?;
        Some(row.map_err(|source| CldfError::Csv {
            path: self.path.clone(),
            source,
        }))
    }
}

fn read_rows<T: serde::de::DeserializeOwned>(path: &Path) -> Result<RowIter<T>, CldfError> {
    let reader = csv::Reader::from_path(path).map_err(|source| CldfError::Csv {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(RowIter {
        path: path.to_path_buf(),
        inner: reader.into_deserialize(),
    })
}

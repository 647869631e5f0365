//! Command-line interface orchestration for the glotnex pipeline.
//!
//! The CLI loads the cognate records of a CLDF dataset, applies the optional
//! parameter and subtree filters, dispatches to the selected
//! matrix-construction strategy, optionally strips combining cognates, and
//! writes the NEXUS file.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use clap::{Parser, ValueEnum};
use thiserror::Error;
use tracing::info;

use glotnex_core::{
    Ascertainment, CharacterMatrix, FilterError, MatrixBuilder, MatrixError, filter_parameters,
    filter_subtree, remove_combining_cognates,
};
use glotnex_providers_cldf::{CldfDataset, CldfError, LoadedData, glottocode_lookup};
use glotnex_providers_glottolog::{Catalog, Glottolog, GlottologError};

const METADATA_FILE: &str = "cldf-metadata.json";

/// Top-level CLI options parsed by [`clap`].
#[derive(Debug, Parser, Clone)]
#[command(
    name = "glotnex",
    about = "Build a NEXUS character matrix from a CLDF cognate dataset."
)]
pub struct Cli {
    /// Output file name.
    #[arg(long, default_value = "abvdoceanic.nex")]
    pub output: PathBuf,

    /// Ascertainment-bias correction mode.
    #[arg(long, value_enum, default_value = "none")]
    pub ascertainment: AscertainmentMode,

    /// File containing a newline-separated list of parameters to remove.
    #[arg(long)]
    pub filter: Option<PathBuf>,

    /// Remove combined cognates with more than this many components.
    #[arg(long)]
    pub removecombined: Option<u32>,

    /// Restrict output to the subtree below the given glottocode.
    #[arg(long)]
    pub subtree: Option<String>,

    /// Dataset directory containing the `cldf-metadata.json` descriptor.
    #[arg(long, default_value = "cldf")]
    pub cldf: PathBuf,

    /// Glottolog clone directory, overriding the catalog configuration.
    #[arg(long)]
    pub glottolog: Option<PathBuf>,
}

/// Ascertainment modes selectable on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AscertainmentMode {
    /// Base construction without correction characters.
    None,
    /// One correction character across the whole matrix.
    Overall,
    /// One correction character per parameter.
    Word,
}

impl From<AscertainmentMode> for Ascertainment {
    fn from(mode: AscertainmentMode) -> Self {
        match mode {
            AscertainmentMode::None => Self::None,
            AscertainmentMode::Overall => Self::Overall,
            AscertainmentMode::Word => Self::Word,
        }
    }
}

/// Errors surfaced while executing the pipeline.
#[derive(Debug, Error)]
pub enum CliError {
    /// The parameter deny-list file could not be read.
    #[error("failed to read filter file `{path}`: {source}")]
    FilterFile {
        /// Path that triggered the failure.
        path: PathBuf,
        /// Underlying operating system error.
        #[source]
        source: io::Error,
    },
    /// Loading the CLDF dataset failed.
    #[error(transparent)]
    Cldf(#[from] CldfError),
    /// Resolving the taxonomy subtree failed.
    #[error(transparent)]
    Glottolog(#[from] GlottologError),
    /// A record's language could not be resolved during filtering.
    #[error(transparent)]
    Filter(#[from] FilterError),
    /// Matrix construction failed.
    #[error(transparent)]
    Matrix(#[from] MatrixError),
    /// The output file could not be written.
    #[error("failed to write `{path}`: {source}")]
    Write {
        /// Path that triggered the failure.
        path: PathBuf,
        /// Underlying operating system error.
        #[source]
        source: io::Error,
    },
}

/// Summarises the outcome of a pipeline run.
#[derive(Debug, Clone)]
pub struct ExecutionSummary {
    /// Path the NEXUS file was written to.
    pub output: PathBuf,
    /// Number of records that survived filtering.
    pub records: usize,
    /// Number of taxa in the written matrix.
    pub taxa: usize,
    /// Number of characters in the written matrix.
    pub characters: usize,
}

/// Executes the pipeline described by `cli`.
///
/// # Errors
/// Returns [`CliError`] when loading, filtering, construction, or writing
/// fails.
pub fn run_cli(cli: Cli) -> Result<ExecutionSummary, CliError> {
    let metadata_path = cli.cldf.join(METADATA_FILE);
    let dataset = CldfDataset::from_metadata_path(&metadata_path)?;
    let LoadedData {
        mut records,
        languages,
    } = dataset.load()?;
    info!(
        records = records.len(),
        metadata = %metadata_path.display(),
        "records loaded"
    );

    if let Some(path) = &cli.filter {
        let deny_list = read_deny_list(path)?;
        records = filter_parameters(records, &deny_list);
    }

    if let Some(code) = &cli.subtree {
        let glottolog = open_glottolog(cli.glottolog.as_deref())?;
        let languoid = glottolog.languoid(code)?;
        let subtree = languoid.descendants()?;
        info!(
            subtree = %code,
            name = languoid.name(),
            members = subtree.len(),
            "resolved taxonomy subtree"
        );
        let lookup = glottocode_lookup(&languages);
        records = filter_subtree(records, &lookup, &subtree)?;
    }

    info!(
        records = records.len(),
        output = %cli.output.display(),
        ascertainment = ?cli.ascertainment,
        "building nexus matrix"
    );
    let maker = MatrixBuilder::new()
        .with_ascertainment(cli.ascertainment.into())
        .build();
    let mut matrix = maker.build_matrix(&records)?;

    if let Some(keep) = cli.removecombined.filter(|keep| *keep > 0) {
        matrix = remove_combining_cognates(matrix, keep);
    }

    write_matrix(&matrix, &cli.output)?;
    Ok(ExecutionSummary {
        output: cli.output,
        records: records.len(),
        taxa: matrix.taxon_count(),
        characters: matrix.character_count(),
    })
}

fn read_deny_list(path: &Path) -> Result<Vec<String>, CliError> {
    let text = std::fs::read_to_string(path).map_err(|source| CliError::FilterFile {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(text.lines().map(ToOwned::to_owned).collect())
}

fn open_glottolog(override_dir: Option<&Path>) -> Result<Glottolog, CliError> {
    let clone_dir = match override_dir {
        Some(dir) => dir.to_path_buf(),
        None => Catalog::from_config()?.clone_dir().to_path_buf(),
    };
    Ok(Glottolog::open(&clone_dir)?)
}

fn write_matrix(matrix: &CharacterMatrix, path: &Path) -> Result<(), CliError> {
    matrix.write_path(path).map_err(|source| CliError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Renders `summary` to `writer` in a human-readable text format.
///
/// # Errors
/// Returns [`io::Error`] if writing to the supplied writer fails.
pub fn render_summary(summary: &ExecutionSummary, mut writer: impl Write) -> io::Result<()> {
    writeln!(writer, "wrote {}", summary.output.display())?;
    writeln!(writer, "records: {}", summary.records)?;
    writeln!(writer, "taxa: {}", summary.taxa)?;
    writeln!(writer, "characters: {}", summary.characters)?;
    Ok(())
}

//! The JSON-in, JSON-out extraction run.

use std::path::{Path, PathBuf};

use fk_index::Index;
use fk_kernel::{extract, Extraction, ParsedKernel, ParsedRoutine};
use serde::{Deserialize, Serialize};

use crate::{DriverError, RunConfig};

/// Suffix of the output document.
pub const OUTPUT_SUFFIX: &str = "kernels.json";

/// Parser output for one Fortran source file.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KernelDocument {
    pub kernels: Vec<ParsedKernel>,
    pub routines: Vec<ParsedRoutine>,
}

/// Inputs and settings of one run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Invocation {
    pub index: PathBuf,
    pub kernels: PathBuf,
    /// Output path without suffix; defaults to the kernel document's path
    /// with its extension removed.
    pub output_prefix: Option<PathBuf>,
    pub config: RunConfig,
}

impl Invocation {
    pub fn output_prefix(&self) -> PathBuf {
        self.output_prefix
            .clone()
            .unwrap_or_else(|| self.kernels.with_extension(""))
    }

    /// `<prefix>.kernels.json`
    pub fn output_path(&self) -> PathBuf {
        let prefix = self.output_prefix();
        let mut name = prefix.as_os_str().to_os_string();
        name.push(".");
        name.push(OUTPUT_SUFFIX);
        PathBuf::from(name)
    }
}

/// Read both documents, extract, and write the result.
///
/// Returns the output path, or `None` when no kernel was selected and
/// nothing was written.
#[tracing::instrument(level = "debug", skip_all, fields(kernels = %invocation.kernels.display()))]
pub fn run(invocation: &Invocation) -> Result<Option<PathBuf>, DriverError> {
    let index = read_index(&invocation.index)?;
    let document = read_kernels(&invocation.kernels)?;
    tracing::debug!(
        records = index.len(),
        kernels = document.kernels.len(),
        routines = document.routines.len(),
        "inputs loaded"
    );

    let prefix = invocation.output_prefix();
    let basename = prefix
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let options = invocation.config.extract_options(&basename);

    let extraction = extract(&index, &document.kernels, &document.routines, &options)?;
    if extraction.is_empty() {
        tracing::debug!("no kernels selected; nothing written");
        return Ok(None);
    }

    let output = invocation.output_path();
    write_extraction(&output, &extraction)?;
    Ok(Some(output))
}

pub fn read_index(path: &Path) -> Result<Index, DriverError> {
    let text = read(path)?;
    Index::from_json(&text).map_err(|source| DriverError::Index {
        path: path.to_path_buf(),
        source,
    })
}

pub fn read_kernels(path: &Path) -> Result<KernelDocument, DriverError> {
    let text = read(path)?;
    serde_json::from_str(&text).map_err(|source| DriverError::Kernels {
        path: path.to_path_buf(),
        source,
    })
}

fn read(path: &Path) -> Result<String, DriverError> {
    std::fs::read_to_string(path).map_err(|source| DriverError::Read {
        path: path.to_path_buf(),
        source,
    })
}

fn write_extraction(path: &Path, extraction: &Extraction) -> Result<(), DriverError> {
    let text = serde_json::to_string_pretty(extraction).map_err(DriverError::Serialize)?;
    std::fs::write(path, text).map_err(|source| DriverError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!("wrote '{}'", path.display());
    Ok(())
}

// ABI copier
//
// Extracts the `abi` array from compiled-contract artifacts and writes it
// into each consumer project's abis directory. Consumers never need the
// bytecode or metadata the full artifact carries.

use crate::addresses::ContractName;
use crate::config::ProjectPaths;
use anyhow::{bail, Context, Result};
use serde_json::Value;
use std::fs;
use std::path::PathBuf;

/// One artifact-to-destination copy
#[derive(Debug, Clone)]
pub struct AbiCopyJob {
    pub source: PathBuf,
    pub dest: PathBuf,
}

/// Outcome of a copy run
#[derive(Debug, Default)]
pub struct AbiCopySummary {
    pub copied: Vec<PathBuf>,
    /// Sources that did not exist (warned and skipped, not fatal)
    pub skipped: Vec<PathBuf>,
}

/// Pull the `abi` field out of a Hardhat-style artifact
pub fn extract_abi(artifact: &str) -> Result<Value> {
    let value: Value = serde_json::from_str(artifact)?;
    match value.get("abi") {
        Some(abi) if abi.is_array() => Ok(abi.clone()),
        Some(_) => bail!("artifact `abi` field is not an array"),
        None => bail!("artifact has no `abi` field"),
    }
}

/// Run the copy jobs. Missing sources are collected, not fatal.
pub fn copy_abis(jobs: &[AbiCopyJob]) -> Result<AbiCopySummary> {
    let mut summary = AbiCopySummary::default();

    for job in jobs {
        if !job.source.exists() {
            log::warn!("artifact missing, skipping: {}", job.source.display());
            summary.skipped.push(job.source.clone());
            continue;
        }
        let raw = fs::read_to_string(&job.source)
            .with_context(|| format!("failed to read {}", job.source.display()))?;
        let abi = extract_abi(&raw)
            .with_context(|| format!("bad artifact {}", job.source.display()))?;

        if let Some(parent) = job.dest.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let mut rendered = serde_json::to_string_pretty(&abi)?;
        rendered.push('\n');
        fs::write(&job.dest, rendered)
            .with_context(|| format!("failed to write {}", job.dest.display()))?;
        summary.copied.push(job.dest.clone());
    }

    Ok(summary)
}

/// Standard jobs: every contract's artifact into the frontend, backend and
/// subgraph abis directories.
pub fn default_jobs(paths: &ProjectPaths) -> Vec<AbiCopyJob> {
    let mut jobs = Vec::new();
    for name in ContractName::ALL {
        let artifact = paths.contracts.join(format!(
            "artifacts/contracts/{0}.sol/{0}.json",
            name.artifact_name()
        ));
        let file = format!("{}.json", name.artifact_name());
        for dest_dir in [
            paths.frontend.join("src/abis"),
            paths.backend.join("abis"),
            paths.subgraph.join("abis"),
        ] {
            jobs.push(AbiCopyJob {
                source: artifact.clone(),
                dest: dest_dir.join(&file),
            });
        }
    }
    jobs
}

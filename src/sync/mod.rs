// Config synchronization pipeline
//
// Propagates the canonical address set into each consumer project in its
// own format: env files and a TypeScript constants module for the frontend,
// env plus a JSON config for the backend, and the manifest plus constants
// for the subgraph. Writes go through the backup writer; --check-only
// reports what would change without touching anything.

pub mod abi;
mod env;
mod json;
mod typescript;
mod writer;
mod yaml;

pub use env::{merge_env, render_env};
pub use json::merge_backend_config;
pub use typescript::render_module;
pub use writer::{backup_path, prune_backups, restore_backup, BackupWriter};
pub use yaml::update_manifest;

use crate::addresses::{ContractAddressSet, ContractName};
use crate::config::OpsConfig;
use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};

/// Contracts the subgraph indexes as data sources
pub const SUBGRAPH_SOURCES: [ContractName; 8] = [
    ContractName::Hero,
    ContractName::Relic,
    ContractName::Party,
    ContractName::DungeonMaster,
    ContractName::AltarOfAscension,
    ContractName::PlayerProfile,
    ContractName::VipStaking,
    ContractName::Marketplace,
];

/// Consumer project selector for partial sync runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    Frontend,
    Backend,
    Subgraph,
}

/// What happened to one target file
#[derive(Debug)]
pub enum SyncAction {
    /// File rewritten; backup taken when a previous version existed
    Updated { backup: Option<PathBuf> },

    /// Rendered content matched the file exactly
    Unchanged,

    /// --check-only run found a difference
    WouldUpdate,

    /// Target left alone (missing manifest, unknown data source, ...)
    Skipped { reason: String },
}

/// Per-file result of a sync run
#[derive(Debug)]
pub struct SyncOutcome {
    pub path: PathBuf,
    pub action: SyncAction,
}

/// Run the sync pipeline against every (or one) consumer project.
pub fn sync_all(
    config: &OpsConfig,
    set: &ContractAddressSet,
    check_only: bool,
    target: Option<TargetKind>,
) -> Result<Vec<SyncOutcome>> {
    let writer = BackupWriter::new();
    let mut outcomes = Vec::new();
    let wants = |kind: TargetKind| target.map_or(true, |t| t == kind);

    if wants(TargetKind::Frontend) {
        let env_path = config.paths.frontend.join(".env");
        outcomes.push(apply(&writer, check_only, env_path.clone(), {
            let existing = read_or_empty(&env_path)?;
            merge_env(&existing, set)
        })?);

        let ts_path = config.paths.frontend.join("src/config/contracts.ts");
        outcomes.push(apply(&writer, check_only, ts_path, render_module(set)?)?);
    }

    if wants(TargetKind::Backend) {
        let env_path = config.paths.backend.join(".env");
        outcomes.push(apply(&writer, check_only, env_path.clone(), {
            let existing = read_or_empty(&env_path)?;
            merge_env(&existing, set)
        })?);

        let json_path = config.paths.backend.join("config/contracts.json");
        let existing = read_or_empty(&json_path)?;
        outcomes.push(apply(
            &writer,
            check_only,
            json_path,
            merge_backend_config(&existing, set)?,
        )?);
    }

    if wants(TargetKind::Subgraph) {
        outcomes.push(sync_manifest(config, set, &writer, check_only)?);

        let ts_path = config.paths.subgraph.join("src/contracts.ts");
        outcomes.push(apply(&writer, check_only, ts_path, render_module(set)?)?);
    }

    Ok(outcomes)
}

/// Rewrite the subgraph manifest, one scoped edit per indexed contract
fn sync_manifest(
    config: &OpsConfig,
    set: &ContractAddressSet,
    writer: &BackupWriter,
    check_only: bool,
) -> Result<SyncOutcome> {
    let path = config.paths.subgraph.join("subgraph.yaml");
    if !path.exists() {
        return Ok(SyncOutcome {
            path,
            action: SyncAction::Skipped {
                reason: "manifest not found".to_string(),
            },
        });
    }

    let mut manifest = fs::read_to_string(&path)?;
    for name in SUBGRAPH_SOURCES {
        let Some(address) = set.get(name) else {
            continue;
        };
        match update_manifest(&manifest, name.artifact_name(), address, set.meta.start_block) {
            Ok(updated) => manifest = updated,
            Err(err) => log::warn!("subgraph manifest: {err}"),
        }
    }

    apply(writer, check_only, path, manifest)
}

fn read_or_empty(path: &Path) -> Result<String> {
    if path.exists() {
        Ok(fs::read_to_string(path)?)
    } else {
        Ok(String::new())
    }
}

fn apply(
    writer: &BackupWriter,
    check_only: bool,
    path: PathBuf,
    content: String,
) -> Result<SyncOutcome> {
    let existing = read_or_empty(&path)?;
    let action = if existing == content {
        SyncAction::Unchanged
    } else if check_only {
        SyncAction::WouldUpdate
    } else {
        let backup = writer.write(&path, &content)?;
        SyncAction::Updated { backup }
    };
    Ok(SyncOutcome { path, action })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProjectPaths;
    use ethers::types::Address;
    use tempfile::tempdir;

    fn test_config(root: &Path) -> OpsConfig {
        OpsConfig::builder()
            .paths(ProjectPaths {
                frontend: root.join("frontend"),
                backend: root.join("backend"),
                subgraph: root.join("subgraph"),
                contracts: root.join("contracts"),
            })
            .build()
    }

    fn sample_set() -> ContractAddressSet {
        let mut set = ContractAddressSet::new();
        set.insert(ContractName::Hero, Address::from_low_u64_be(0x11));
        set.insert(ContractName::Oracle, Address::from_low_u64_be(0x22));
        set
    }

    #[test]
    fn test_sync_all_creates_and_merges() {
        let dir = tempdir().unwrap();
        let config = test_config(dir.path());
        fs::create_dir_all(config.paths.frontend.clone()).unwrap();
        fs::write(config.paths.frontend.join(".env"), "API_KEY=keep\n").unwrap();

        let outcomes = sync_all(&config, &sample_set(), false, None).unwrap();
        assert!(!outcomes.is_empty());

        let env = fs::read_to_string(config.paths.frontend.join(".env")).unwrap();
        assert!(env.contains("API_KEY=keep"));
        assert!(env.contains("HERO="));

        let ts = fs::read_to_string(config.paths.frontend.join("src/config/contracts.ts")).unwrap();
        assert!(ts.contains("export const HERO"));

        // Subgraph manifest is absent, so it is skipped rather than invented
        let manifest_outcome = outcomes
            .iter()
            .find(|o| o.path.ends_with("subgraph.yaml"))
            .unwrap();
        assert!(matches!(manifest_outcome.action, SyncAction::Skipped { .. }));
    }

    #[test]
    fn test_check_only_touches_nothing() {
        let dir = tempdir().unwrap();
        let config = test_config(dir.path());

        let outcomes = sync_all(&config, &sample_set(), true, Some(TargetKind::Frontend)).unwrap();
        assert!(outcomes
            .iter()
            .all(|o| matches!(o.action, SyncAction::WouldUpdate)));
        assert!(!config.paths.frontend.join(".env").exists());
    }

    #[test]
    fn test_second_run_is_unchanged() {
        let dir = tempdir().unwrap();
        let config = test_config(dir.path());

        sync_all(&config, &sample_set(), false, Some(TargetKind::Backend)).unwrap();
        let outcomes = sync_all(&config, &sample_set(), false, Some(TargetKind::Backend)).unwrap();
        assert!(outcomes
            .iter()
            .all(|o| matches!(o.action, SyncAction::Unchanged)));
    }
}

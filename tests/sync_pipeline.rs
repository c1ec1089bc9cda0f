// End-to-end sync pipeline tests against a scratch workspace

use dungeon_ops::addresses::{self, ContractName};
use dungeon_ops::config::{OpsConfig, ProjectPaths};
use dungeon_ops::sync::{self, SyncAction};
use std::fs;
use std::path::Path;
use tempfile::tempdir;

const HERO_ADDR: &str = "0xAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA1111";
const RELIC_ADDR: &str = "0xBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBB2222";

fn workspace_config(root: &Path) -> OpsConfig {
    OpsConfig::builder()
        .paths(ProjectPaths {
            frontend: root.join("frontend"),
            backend: root.join("backend"),
            subgraph: root.join("subgraph"),
            contracts: root.join("contracts"),
        })
        .build()
}

fn write_deployment_source(root: &Path) -> std::path::PathBuf {
    let source = root.join("deployment.json");
    fs::write(
        &source,
        format!(
            r#"{{
  "version": "v1.3",
  "chainId": 56,
  "startBlock": 31000000,
  "contracts": {{
    "HERO": {{ "address": "{HERO_ADDR}" }},
    "RELIC": {{ "address": "{RELIC_ADDR}" }}
  }}
}}"#
        ),
    )
    .unwrap();
    source
}

#[test]
fn sync_merges_env_without_losing_unrelated_keys() {
    let dir = tempdir().unwrap();
    let config = workspace_config(dir.path());
    let source = write_deployment_source(dir.path());

    // Existing frontend env with an unrelated key and a stale HERO entry
    fs::create_dir_all(&config.paths.frontend).unwrap();
    fs::write(
        config.paths.frontend.join(".env"),
        "API_KEY=secret\nHERO=0x0000000000000000000000000000000000000000\n",
    )
    .unwrap();

    let loaded = addresses::load(&source).unwrap();
    assert!(loaded.warnings.is_empty());
    sync::sync_all(&config, &loaded.set, false, None).unwrap();

    let env = fs::read_to_string(config.paths.frontend.join(".env")).unwrap();
    let lowered = env.to_lowercase();
    assert!(env.contains("API_KEY=secret"));
    assert!(lowered.contains(&format!("hero={}", HERO_ADDR.to_lowercase())));
    assert!(lowered.contains(&format!("relic={}", RELIC_ADDR.to_lowercase())));
    assert!(!env.contains("0x0000000000000000000000000000000000000000"));

    // The previous env version was backed up before the write
    let backups: Vec<_> = fs::read_dir(&config.paths.frontend)
        .unwrap()
        .filter_map(|entry| entry.ok())
        .filter(|entry| {
            entry
                .file_name()
                .to_string_lossy()
                .starts_with(".env.backup-")
        })
        .collect();
    assert_eq!(backups.len(), 1);
    assert!(fs::read_to_string(backups[0].path())
        .unwrap()
        .contains("0x0000000000000000000000000000000000000000"));
}

#[test]
fn sync_rewrites_only_the_matching_manifest_source() {
    let dir = tempdir().unwrap();
    let config = workspace_config(dir.path());
    let source = write_deployment_source(dir.path());

    fs::create_dir_all(&config.paths.subgraph).unwrap();
    fs::write(
        config.paths.subgraph.join("subgraph.yaml"),
        r#"specVersion: 0.0.5
dataSources:
  - kind: ethereum/contract
    name: Hero
    source:
      address: "0x0000000000000000000000000000000000000001"
      startBlock: 100
  - kind: ethereum/contract
    name: Party
    source:
      address: "0x0000000000000000000000000000000000000003"
      startBlock: 300
"#,
    )
    .unwrap();

    let loaded = addresses::load(&source).unwrap();
    sync::sync_all(&config, &loaded.set, false, Some(sync::TargetKind::Subgraph)).unwrap();

    let manifest = fs::read_to_string(config.paths.subgraph.join("subgraph.yaml")).unwrap();
    // Hero picked up the new address and start block
    assert!(manifest.to_lowercase().contains(&HERO_ADDR.to_lowercase()));
    assert!(manifest.contains("startBlock: 31000000"));
    // Party has no address in the set and keeps its fields
    assert!(manifest.contains("0x0000000000000000000000000000000000000003"));
    assert!(manifest.contains("startBlock: 300"));
}

#[test]
fn check_only_reports_and_leaves_files_alone() {
    let dir = tempdir().unwrap();
    let config = workspace_config(dir.path());
    let source = write_deployment_source(dir.path());

    let loaded = addresses::load(&source).unwrap();
    let outcomes =
        sync::sync_all(&config, &loaded.set, true, Some(sync::TargetKind::Backend)).unwrap();

    assert!(outcomes
        .iter()
        .all(|o| matches!(o.action, SyncAction::WouldUpdate)));
    assert!(!config.paths.backend.exists());
}

#[test]
fn synced_outputs_round_trip_through_the_reader() {
    let dir = tempdir().unwrap();
    let config = workspace_config(dir.path());
    let source = write_deployment_source(dir.path());

    let loaded = addresses::load(&source).unwrap();
    sync::sync_all(&config, &loaded.set, false, None).unwrap();

    // Frontend env round-trips
    let reparsed = addresses::load(&config.paths.frontend.join(".env")).unwrap();
    assert_eq!(
        reparsed.set.get(ContractName::Hero),
        loaded.set.get(ContractName::Hero)
    );
    assert_eq!(
        reparsed.set.get(ContractName::Relic),
        loaded.set.get(ContractName::Relic)
    );

    // Backend JSON round-trips, metadata included
    let backend = addresses::load(&config.paths.backend.join("config/contracts.json")).unwrap();
    assert_eq!(backend.set.get(ContractName::Hero), loaded.set.get(ContractName::Hero));
    assert_eq!(backend.set.meta.version.as_deref(), Some("v1.3"));
}

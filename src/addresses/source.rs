// Address source readers
//
// Loads a ContractAddressSet from any of the three supported source shapes:
// flat env lines, the nested master config JSON, or a deployment record
// JSON. Missing or malformed entries are collected as warnings rather than
// failing the whole read; several flows intentionally run on partial sets.

use super::{parse_address, ContractAddressSet, ContractName};
use anyhow::{bail, Context, Result};
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Result of reading an address source: whatever could be parsed, plus
/// everything the caller should surface as a warning.
#[derive(Debug, Clone, Default)]
pub struct LoadedAddresses {
    /// The (possibly partial) address set
    pub set: ContractAddressSet,

    /// Human-readable warnings for malformed entries
    pub warnings: Vec<String>,
}

impl LoadedAddresses {
    /// Contracts absent from the loaded set
    pub fn missing(&self) -> Vec<ContractName> {
        self.set.missing()
    }
}

/// Load an address source, picking the parser from the file name.
///
/// `.json` files are shape-sniffed (master config vs deployment record);
/// everything else is treated as env lines.
pub fn load(path: &Path) -> Result<LoadedAddresses> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read address source {}", path.display()))?;

    let is_json = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if is_json {
        let value: Value = serde_json::from_str(&raw)
            .with_context(|| format!("invalid JSON in {}", path.display()))?;
        from_json_value(&value)
    } else {
        Ok(from_env_str(&raw))
    }
}

/// Parse flat `KEY=0x...` env lines.
///
/// Unknown keys are skipped silently: env files legitimately hold unrelated
/// settings (API keys, RPC URLs) that must never be misread as addresses.
pub fn from_env_str(raw: &str) -> LoadedAddresses {
    let mut loaded = LoadedAddresses::default();

    for line in raw.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let key = key.trim().trim_start_matches("export ").trim();
        let Some(name) = ContractName::from_key(key) else {
            continue;
        };
        let value = value.trim().trim_matches('"').trim_matches('\'');
        match parse_address(key, value) {
            Ok(address) => loaded.set.insert(name, address),
            Err(err) => loaded.warnings.push(err.to_string()),
        }
    }

    loaded
}

/// Parse a JSON source, detecting which of the two supported shapes it is.
pub fn from_json_value(value: &Value) -> Result<LoadedAddresses> {
    let Some(contracts) = value.get("contracts") else {
        bail!("no `contracts` object in JSON address source");
    };

    if contracts.get("mainnet").map_or(false, Value::is_object) {
        Ok(from_master_config(value))
    } else if contracts.is_object() {
        Ok(from_deployment_record(value))
    } else {
        bail!("`contracts` is not an object in JSON address source");
    }
}

/// Master config shape: `contracts.mainnet.<NAME>_ADDRESS`
pub fn from_master_config(value: &Value) -> LoadedAddresses {
    let mut loaded = LoadedAddresses::default();
    loaded.set.meta = read_meta(value);

    let Some(mainnet) = value.pointer("/contracts/mainnet").and_then(Value::as_object) else {
        return loaded;
    };

    for name in ContractName::ALL {
        let key = name.master_key();
        match mainnet.get(&key).and_then(Value::as_str) {
            Some(raw) => match parse_address(&key, raw) {
                Ok(address) => loaded.set.insert(name, address),
                Err(err) => loaded.warnings.push(err.to_string()),
            },
            None => {}
        }
    }

    loaded
}

/// Deployment record shape: `contracts.<NAME>.address`
pub fn from_deployment_record(value: &Value) -> LoadedAddresses {
    let mut loaded = LoadedAddresses::default();
    loaded.set.meta = read_meta(value);

    let Some(contracts) = value.get("contracts").and_then(Value::as_object) else {
        return loaded;
    };

    for name in ContractName::ALL {
        let entry = contracts
            .get(name.key())
            .or_else(|| contracts.get(name.artifact_name()));
        let Some(entry) = entry else { continue };
        match entry.get("address").and_then(Value::as_str) {
            Some(raw) => match parse_address(name.key(), raw) {
                Ok(address) => loaded.set.insert(name, address),
                Err(err) => loaded.warnings.push(err.to_string()),
            },
            None => loaded
                .warnings
                .push(format!("entry for {} has no `address` field", name.key())),
        }
    }

    loaded
}

/// Pull deployment metadata from the top level of a JSON source
fn read_meta(value: &Value) -> super::DeploymentMeta {
    let mut meta = super::DeploymentMeta::default();
    meta.version = value
        .get("version")
        .and_then(Value::as_str)
        .map(str::to_string);
    meta.start_block = value.get("startBlock").and_then(Value::as_u64);
    meta.chain_id = value.get("chainId").and_then(Value::as_u64);
    meta.deployed_at = value.get("deployedAt").and_then(parse_timestamp);
    meta
}

/// Accept either an RFC 3339 string or unix seconds
fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        Value::Number(n) => n
            .as_i64()
            .and_then(|secs| Utc.timestamp_opt(secs, 0).single()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_env_lines() {
        let raw = "\
# deployment output
API_KEY=secret
HERO=0x000000000000000000000000000000000000AAaa
RELIC=\"0x000000000000000000000000000000000000bBbB\"
BROKEN=0x1234
";
        let loaded = from_env_str(raw);
        assert_eq!(loaded.set.len(), 2);
        assert!(loaded.set.contains(ContractName::Hero));
        assert!(loaded.set.contains(ContractName::Relic));
        // BROKEN is not a known contract key, so it is skipped, not warned
        assert!(loaded.warnings.is_empty());
    }

    #[test]
    fn test_env_malformed_known_key_warns() {
        let loaded = from_env_str("HERO=0xnothex\n");
        assert!(loaded.set.is_empty());
        assert_eq!(loaded.warnings.len(), 1);
        assert!(loaded.warnings[0].contains("HERO"));
    }

    #[test]
    fn test_master_config_shape() {
        let value = json!({
            "version": "v1.3",
            "chainId": 56,
            "contracts": {
                "mainnet": {
                    "HERO_ADDRESS": "0x0000000000000000000000000000000000001234",
                    "ORACLE_ADDRESS": "0x0000000000000000000000000000000000005678"
                }
            }
        });
        let loaded = from_json_value(&value).unwrap();
        assert_eq!(loaded.set.len(), 2);
        assert!(loaded.set.contains(ContractName::Hero));
        assert!(loaded.set.contains(ContractName::Oracle));
        assert_eq!(loaded.set.meta.version.as_deref(), Some("v1.3"));
        assert_eq!(loaded.set.meta.chain_id, Some(56));
    }

    #[test]
    fn test_deployment_record_shape() {
        let value = json!({
            "version": "v1.3",
            "startBlock": 31000000,
            "deployedAt": "2024-07-01T12:00:00Z",
            "contracts": {
                "HERO": { "address": "0x0000000000000000000000000000000000001234" },
                "DUNGEONCORE": { "address": "0x0000000000000000000000000000000000009abc" },
                "PARTY": { "note": "redeploy pending" }
            }
        });
        let loaded = from_json_value(&value).unwrap();
        assert_eq!(loaded.set.len(), 2);
        assert_eq!(loaded.set.meta.start_block, Some(31000000));
        assert!(loaded.set.meta.deployed_at.is_some());
        // PARTY entry without an address is a warning, not an error
        assert_eq!(loaded.warnings.len(), 1);
        assert!(loaded.warnings[0].contains("PARTY"));
    }

    #[test]
    fn test_missing_keys_are_soft() {
        let loaded = from_env_str("HERO=0x0000000000000000000000000000000000001234\n");
        let missing = loaded.missing();
        assert!(missing.contains(&ContractName::Relic));
        assert!(!missing.contains(&ContractName::Hero));
    }
}

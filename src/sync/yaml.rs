// Subgraph manifest formatter
//
// Rewrites only the `address:` and `startBlock:` fields of one named data
// source in subgraph.yaml. The edit is textual and scoped to the block that
// follows the matching `name:` line, so the rest of the manifest (and every
// other data source) is preserved byte for byte.

use crate::addresses::format_address;
use anyhow::{bail, Result};
use ethers::types::Address;
use regex::Regex;

/// Update one data source's address and (optionally) start block.
///
/// Fails when the manifest has no data source with the given name; callers
/// treat that as a warning and leave the manifest alone.
pub fn update_manifest(
    manifest: &str,
    data_source: &str,
    address: Address,
    start_block: Option<u64>,
) -> Result<String> {
    let name_pattern = Regex::new(&format!(
        r"(?m)^\s*name:\s*{}\s*$",
        regex::escape(data_source)
    ))
    .expect("static name pattern");

    let Some(name_match) = name_pattern.find(manifest) else {
        bail!("no data source named {} in manifest", data_source);
    };

    // The block owned by this data source runs from the name line to the
    // next `- kind:` entry (or the end of the file).
    let scope_start = name_match.end();
    let boundary = Regex::new(r"(?m)^\s*-\s+kind:").expect("static boundary pattern");
    let scope_end = boundary
        .find_at(manifest, scope_start)
        .map(|m| m.start())
        .unwrap_or(manifest.len());

    let mut scope = manifest[scope_start..scope_end].to_string();

    let address_pattern =
        Regex::new(r#"(?m)^(\s*address:\s*).*$"#).expect("static address pattern");
    if !address_pattern.is_match(&scope) {
        bail!("data source {} has no address field", data_source);
    }
    let replacement = format!("${{1}}\"{}\"", format_address(address));
    scope = address_pattern.replace(&scope, replacement.as_str()).into_owned();

    if let Some(block) = start_block {
        let block_pattern =
            Regex::new(r"(?m)^(\s*startBlock:\s*).*$").expect("static startBlock pattern");
        if block_pattern.is_match(&scope) {
            let replacement = format!("${{1}}{}", block);
            scope = block_pattern.replace(&scope, replacement.as_str()).into_owned();
        }
    }

    let mut output = String::with_capacity(manifest.len());
    output.push_str(&manifest[..scope_start]);
    output.push_str(&scope);
    output.push_str(&manifest[scope_end..]);
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MANIFEST: &str = r#"specVersion: 0.0.5
schema:
  file: ./schema.graphql
dataSources:
  - kind: ethereum/contract
    name: Hero
    network: bsc
    source:
      address: "0x0000000000000000000000000000000000000001"
      abi: Hero
      startBlock: 100
    mapping:
      file: ./src/hero.ts
  - kind: ethereum/contract
    name: Relic
    network: bsc
    source:
      address: "0x0000000000000000000000000000000000000002"
      abi: Relic
      startBlock: 200
    mapping:
      file: ./src/relic.ts
"#;

    #[test]
    fn test_updates_only_named_source() {
        let updated = update_manifest(
            MANIFEST,
            "Hero",
            Address::from_low_u64_be(0xabcd),
            Some(31000000),
        )
        .unwrap();

        // Hero was rewritten
        assert!(!updated.contains("0x0000000000000000000000000000000000000001"));
        assert!(updated.contains("startBlock: 31000000"));
        // Relic is untouched, including its startBlock
        assert!(updated.contains("0x0000000000000000000000000000000000000002"));
        assert!(updated.contains("startBlock: 200"));
        // Everything outside the sources survives
        assert!(updated.contains("file: ./src/hero.ts"));
        assert!(updated.contains("specVersion: 0.0.5"));
    }

    #[test]
    fn test_second_source_can_be_targeted() {
        let updated = update_manifest(MANIFEST, "Relic", Address::from_low_u64_be(0xff), None)
            .unwrap();
        assert!(updated.contains("0x0000000000000000000000000000000000000001"));
        assert!(!updated.contains("0x0000000000000000000000000000000000000002"));
        // startBlock untouched when not provided
        assert!(updated.contains("startBlock: 200"));
    }

    #[test]
    fn test_unknown_source_is_an_error() {
        let result = update_manifest(MANIFEST, "Party", Address::zero(), None);
        assert!(result.is_err());
    }
}

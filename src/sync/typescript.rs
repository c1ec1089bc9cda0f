// TypeScript module renderer
//
// Renders the address set as a constants module for the frontend and
// subgraph mappings. Values flow from typed addresses through a renderer
// that re-validates every interpolated string, so a corrupted set can never
// produce a syntactically broken module.

use crate::addresses::{format_address, is_well_formed, ContractAddressSet};
use anyhow::{bail, Result};

/// Render the full constants module
pub fn render_module(set: &ContractAddressSet) -> Result<String> {
    let mut output = String::new();
    output.push_str("// Generated by dungeon-ops. Do not edit by hand.\n");
    if let Some(version) = &set.meta.version {
        output.push_str(&render_string_const("DEPLOYMENT_VERSION", version)?);
    }
    output.push('\n');

    for (name, address) in set.iter() {
        let rendered = format_address(address);
        if !is_well_formed(&rendered) {
            bail!("refusing to render malformed address for {}", name.key());
        }
        output.push_str(&format!(
            "export const {} = \"{}\" as const;\n",
            name.key(),
            rendered
        ));
    }

    // Aggregate object so consumers can iterate the set
    output.push_str("\nexport const CONTRACT_ADDRESSES = {\n");
    for (name, _) in set.iter() {
        output.push_str(&format!("  {},\n", name.key()));
    }
    output.push_str("} as const;\n");

    Ok(output)
}

/// Render one exported string constant, escaping the value
fn render_string_const(name: &str, value: &str) -> Result<String> {
    if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        bail!("invalid identifier for TypeScript constant: {name}");
    }
    let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
    Ok(format!("export const {} = \"{}\" as const;\n", name, escaped))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::addresses::ContractName;
    use ethers::types::Address;

    #[test]
    fn test_render_module() {
        let mut set = ContractAddressSet::new();
        set.meta.version = Some("v1.3".to_string());
        set.insert(ContractName::Hero, Address::from_low_u64_be(1));
        set.insert(ContractName::DungeonCore, Address::from_low_u64_be(2));

        let module = render_module(&set).unwrap();
        assert!(module.contains("export const DEPLOYMENT_VERSION = \"v1.3\" as const;"));
        assert!(module.contains("export const HERO = \"0x"));
        assert!(module.contains("export const DUNGEONCORE = \"0x"));
        assert!(module.contains("CONTRACT_ADDRESSES"));
        // Entries are rendered in canonical order: DUNGEONCORE sorts after HERO
        let hero_pos = module.find("export const HERO").unwrap();
        let core_pos = module.find("export const DUNGEONCORE").unwrap();
        assert!(hero_pos < core_pos);
    }

    #[test]
    fn test_string_const_escaping() {
        let rendered = render_string_const("LABEL", "say \"hi\"").unwrap();
        assert_eq!(
            rendered,
            "export const LABEL = \"say \\\"hi\\\"\" as const;\n"
        );
    }

    #[test]
    fn test_invalid_identifier_rejected() {
        assert!(render_string_const("BAD-NAME", "x").is_err());
    }
}

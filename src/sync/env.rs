// Env-file formatter
//
// Renders the address set into KEY=value lines, merged into whatever the
// destination file already holds. Keys already present are rewritten in
// place through a key-anchored pattern; keys the file does not know yet are
// appended. Unrelated settings (API keys, RPC URLs) survive untouched.

use crate::addresses::{format_address, ContractAddressSet};
use regex::Regex;

/// Merge the address set into existing env-file content.
///
/// Never removes a key that was present in the original content and absent
/// from the set.
pub fn merge_env(existing: &str, set: &ContractAddressSet) -> String {
    let mut output = existing.to_string();
    let mut appended = Vec::new();

    for (name, address) in set.iter() {
        let key = name.key();
        let line = format!("{}={}", key, format_address(address));
        let pattern = Regex::new(&format!(r"(?m)^\s*{}\s*=.*$", regex::escape(key)))
            .expect("static env key pattern");
        if pattern.is_match(&output) {
            output = pattern.replace(&output, line.as_str()).into_owned();
        } else {
            appended.push(line);
        }
    }

    if !appended.is_empty() {
        if !output.is_empty() && !output.ends_with('\n') {
            output.push('\n');
        }
        for line in appended {
            output.push_str(&line);
            output.push('\n');
        }
    }

    output
}

/// Render the set as a standalone env file
pub fn render_env(set: &ContractAddressSet) -> String {
    merge_env("", set)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::addresses::{from_env_str, ContractName};
    use ethers::types::Address;

    fn sample_set() -> ContractAddressSet {
        let mut set = ContractAddressSet::new();
        set.insert(ContractName::Hero, Address::from_low_u64_be(0xAAAA1111));
        set.insert(ContractName::Relic, Address::from_low_u64_be(0xBBBB2222));
        set
    }

    #[test]
    fn test_merge_preserves_unrelated_keys() {
        let existing = "API_KEY=secret\nHERO=0x0000000000000000000000000000000000000000\n";
        let merged = merge_env(existing, &sample_set());

        assert!(merged.contains("API_KEY=secret"));
        assert!(!merged.contains("HERO=0x0000000000000000000000000000000000000000"));
        let reparsed = from_env_str(&merged);
        assert_eq!(
            reparsed.set.get(ContractName::Hero),
            sample_set().get(ContractName::Hero)
        );
        assert_eq!(
            reparsed.set.get(ContractName::Relic),
            sample_set().get(ContractName::Relic)
        );
    }

    #[test]
    fn test_merge_appends_missing_newline() {
        let existing = "RPC_URL=https://bsc-dataseed1.binance.org";
        let merged = merge_env(existing, &sample_set());
        assert!(merged.contains("RPC_URL=https://bsc-dataseed1.binance.org\n"));
        assert!(merged.ends_with('\n'));
    }

    #[test]
    fn test_round_trip_identity() {
        let set = sample_set();
        let rendered = render_env(&set);
        let reparsed = from_env_str(&rendered);
        assert_eq!(reparsed.set, set);
        assert!(reparsed.warnings.is_empty());
    }

    #[test]
    fn test_merge_is_idempotent() {
        let set = sample_set();
        let once = merge_env("API_KEY=secret\n", &set);
        let twice = merge_env(&once, &set);
        assert_eq!(once, twice);
    }
}

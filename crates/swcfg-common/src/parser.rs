//! Field extraction from running-config output.
//!
//! Device output is treated as a block of lines; each field is looked up by
//! its label at the start of a line (`speed 1000`, `mtu 9216`,
//! `description ...`). Lookups never fail: a missing or malformed field is
//! `None`.

use regex::Regex;

/// A block of running-config text for one interface or filter.
#[derive(Debug, Clone, Copy)]
pub struct ConfigBlock<'a> {
    text: &'a str,
}

impl<'a> ConfigBlock<'a> {
    /// Wraps raw command output.
    pub fn new(text: &'a str) -> Self {
        Self { text }
    }

    /// Returns the trimmed, non-empty lines of the block.
    pub fn lines(&self) -> impl Iterator<Item = &'a str> + 'a {
        self.text.lines().map(str::trim).filter(|l| !l.is_empty())
    }

    /// Returns the value following `label` on the first line labeled with it.
    ///
    /// The label must be a whole word: `speed` does not match `speedx 10`.
    pub fn field(&self, label: &str) -> Option<&'a str> {
        self.lines().find_map(|line| {
            let rest = line.strip_prefix(label)?;
            if rest.is_empty() {
                return Some("");
            }
            rest.starts_with(char::is_whitespace).then(|| rest.trim())
        })
    }

    /// Returns the integer on the first `<label> <int>` line.
    pub fn numeric_field(&self, label: &str) -> Option<u32> {
        self.lines().find_map(|line| {
            let mut tokens = line.split_whitespace();
            if tokens.next()? != label {
                return None;
            }
            let value = tokens.next()?.parse().ok()?;
            tokens.next().is_none().then_some(value)
        })
    }

    /// Returns true if any line starts with `label` as a whole word,
    /// ignoring case.
    pub fn has_field(&self, label: &str) -> bool {
        let label = label.to_lowercase();
        self.lines().any(|line| {
            let line = line.to_lowercase();
            line.split_whitespace().next() == Some(label.as_str())
        })
    }

    /// Returns the first line matching `pattern`.
    pub fn first_match(&self, pattern: &Regex) -> Option<&'a str> {
        self.lines().find(|line| pattern.is_match(line))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const ETH_CONFIG: &str = "\
!Command: show running-config interface Ethernet1/1

interface Ethernet1/1
  description speed=1000;mtu=
  speed 10000
  mtu 9216
  switchport trunk allowed vlan 10
  no shutdown
";

    #[test]
    fn test_numeric_field() {
        let block = ConfigBlock::new(ETH_CONFIG);
        assert_eq!(block.numeric_field("speed"), Some(10000));
        assert_eq!(block.numeric_field("mtu"), Some(9216));
        assert_eq!(block.numeric_field("duplex"), None);
    }

    #[test]
    fn test_numeric_field_ignores_non_numeric_values() {
        let block = ConfigBlock::new("interface Ethernet1/1\n  speed auto\n");
        assert_eq!(block.numeric_field("speed"), None);
        assert!(block.has_field("speed"));
    }

    #[test]
    fn test_field_is_whole_word() {
        let block = ConfigBlock::new(ETH_CONFIG);
        assert_eq!(block.field("description"), Some("speed=1000;mtu="));
        assert_eq!(block.field("desc"), None);
    }

    #[test]
    fn test_has_field_ignores_case() {
        let block = ConfigBlock::new("interface Ethernet1/1\n  MTU 1500\n");
        assert!(block.has_field("mtu"));
        assert!(!block.has_field("speed"));
        // "no speed" is not a speed line
        assert!(!ConfigBlock::new("  no speed").has_field("speed"));
    }

    #[test]
    fn test_first_match() {
        let vlan = Regex::new(r"switchport.*vlan.*\d+").unwrap();
        let block = ConfigBlock::new(ETH_CONFIG);
        assert_eq!(
            block.first_match(&vlan),
            Some("switchport trunk allowed vlan 10")
        );
        assert_eq!(block.first_match(&Regex::new(r"channel-group").unwrap()), None);
    }
}

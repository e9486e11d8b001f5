//! Tentative pre-clustering hints.
//!
//! A hint file groups chain identifiers, one tab-separated group per
//! line. Hints do not force membership; they bias the pre-filter so
//! hinted representatives are tested first.

use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use tracing::warn;

#[derive(Debug, Clone, Default)]
pub struct InitHints {
    groups: HashMap<String, HashSet<String>>,
}

impl InitHints {
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn from_path(path: &Path) -> io::Result<Self> {
        Self::parse(BufReader::new(File::open(path)?))
    }

    /// Parses hint lines. Lines with fewer than two identifiers carry
    /// no pairing information and are skipped with a warning.
    pub fn parse(reader: impl BufRead) -> io::Result<Self> {
        let mut groups: HashMap<String, HashSet<String>> = HashMap::new();
        for (line_index, line) in reader.lines().enumerate() {
            let line = line?;
            let fields: Vec<&str> = line
                .split('\t')
                .map(str::trim)
                .filter(|f| !f.is_empty())
                .collect();
            if fields.is_empty() {
                continue;
            }
            if fields.len() < 2 {
                warn!(
                    line = line_index + 1,
                    "skipping hint line with fewer than two identifiers"
                );
                continue;
            }
            for &member in &fields {
                let others: HashSet<String> = fields
                    .iter()
                    .filter(|&&other| other != member)
                    .map(|&other| other.to_string())
                    .collect();
                groups.insert(member.to_string(), others);
            }
        }
        Ok(Self { groups })
    }

    /// Chains hinted to co-cluster with `id`, if any.
    pub fn co_clustered(&self, id: &str) -> Option<&HashSet<String>> {
        self.groups.get(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn parse(text: &str) -> InitHints {
        InitHints::parse(Cursor::new(text)).unwrap()
    }

    #[test]
    fn empty_input_yields_no_hints() {
        let hints = parse("");
        assert!(hints.is_empty());
        assert!(hints.co_clustered("a").is_none());
    }

    #[test]
    fn each_member_hints_all_others() {
        let hints = parse("a\tb\tc\n");
        let a = hints.co_clustered("a").unwrap();
        assert_eq!(a.len(), 2);
        assert!(a.contains("b") && a.contains("c"));
        let c = hints.co_clustered("c").unwrap();
        assert!(c.contains("a") && c.contains("b"));
        assert!(!c.contains("c"));
    }

    #[test]
    fn single_member_lines_are_skipped() {
        let hints = parse("solo\na\tb\n");
        assert!(hints.co_clustered("solo").is_none());
        assert!(hints.co_clustered("a").is_some());
    }

    #[test]
    fn blank_lines_are_ignored() {
        let hints = parse("\n\na\tb\n\n");
        assert!(hints.co_clustered("a").is_some());
    }

    #[test]
    fn later_lines_override_earlier_ones() {
        let hints = parse("a\tb\na\tc\n");
        let a = hints.co_clustered("a").unwrap();
        assert_eq!(a.len(), 1);
        assert!(a.contains("c"));
    }
}

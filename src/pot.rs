//! Credential index built from cracking-tool potfiles.
//!
//! Potfile lines are `hash:cleartext`; only the first `:` splits and the
//! cleartext is kept verbatim (it may be empty or contain colons). Hashes are
//! lowercased so lookups are case-insensitive.
use std::collections::HashMap;

use crate::error::{Error, Result};

/// Which cracking tool wrote the potfile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PotConvention {
    #[default]
    Hashcat,
    /// John the Ripper: only `$NT$`-tagged entries are kept, tag stripped.
    John,
}

const JOHN_NT_TAG: &str = "$NT$";

/// Parse one potfile line. `Ok(None)` means the line is well formed but not
/// relevant under `convention`.
pub fn parse_pot_line(line: &str, convention: PotConvention) -> Result<Option<(String, String)>> {
    let (hash, cleartext) = line
        .split_once(':')
        .ok_or_else(|| Error::malformed(line, "missing ':' separator"))?;
    let hash = match convention {
        PotConvention::Hashcat => hash.to_string(),
        PotConvention::John => {
            if !hash.contains(JOHN_NT_TAG) {
                return Ok(None);
            }
            hash.replace(JOHN_NT_TAG, "")
        }
    };
    Ok(Some((hash.to_lowercase(), cleartext.to_string())))
}

/// Entries pulled out of potfile text plus the number of rejected lines.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PotParse {
    pub entries: Vec<(String, String)>,
    pub malformed: usize,
}

impl PotParse {
    pub fn push_line(&mut self, line: &str, convention: PotConvention) {
        if line.is_empty() {
            return;
        }
        match parse_pot_line(line, convention) {
            Ok(Some(entry)) => self.entries.push(entry),
            Ok(None) => {}
            Err(e) => {
                log::debug!("{}", e);
                self.malformed += 1;
            }
        }
    }
}

pub fn parse_pot_contents(contents: &str, convention: PotConvention) -> PotParse {
    let mut parsed = PotParse::default();
    for line in contents.lines() {
        parsed.push_line(line, convention);
    }
    parsed
}

/// Maps a lowercase hash to its recovered cleartext. Read-only once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialIndex {
    entries: HashMap<String, String>,
}

impl CredentialIndex {
    /// Build from `(hash, cleartext)` pairs; later duplicates win. Fails when
    /// no entry survives.
    pub fn build<I, H, C>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (H, C)>,
        H: AsRef<str>,
        C: Into<String>,
    {
        let entries: HashMap<String, String> = entries
            .into_iter()
            .map(|(h, c)| (h.as_ref().to_lowercase(), c.into()))
            .collect();
        if entries.is_empty() {
            return Err(Error::Configuration(
                "no entry in potfile".to_string(),
            ));
        }
        Ok(Self { entries })
    }

    pub fn lookup(&self, hash: &str) -> Option<&str> {
        self.entries.get(&hash.to_lowercase()).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

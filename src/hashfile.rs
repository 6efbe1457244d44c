//! Hash-file record parsing for the three supported layouts.
//!
//! - `Bare`: one hash per line, accounts get synthetic `user_N` names.
//! - `UserHash`: `username:hash`.
//! - `DirectoryDump`: secretsdump style `user:rid:lm:nt:::`. Machine accounts
//!   and lines without the `:::` terminator are placeholders and skipped;
//!   identifiers such as `bob_history0` are prior generations of `bob`.
use regex::Regex;

use crate::error::{Error, Result};
use crate::repository::RepositoryConfig;

/// Layout of the hash file, selected on the command line as 1, 2 or 3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HashFormat {
    Bare,
    UserHash,
    #[default]
    DirectoryDump,
}

impl HashFormat {
    pub fn from_selector(selector: u8) -> Result<Self> {
        match selector {
            1 => Ok(Self::Bare),
            2 => Ok(Self::UserHash),
            3 => Ok(Self::DirectoryDump),
            other => Err(Error::Configuration(format!(
                "unknown hash file format {other} (expected 1, 2 or 3)"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashRecord {
    pub identifier: String,
    pub hash: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRecord {
    pub base: String,
    pub index: u32,
    pub hash: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DumpLine {
    Current(HashRecord),
    History(HistoryRecord),
}

pub fn parse_user_hash_line(line: &str, config: &RepositoryConfig) -> Result<HashRecord> {
    let mut parts = line.split(config.field_separator);
    match (parts.next(), parts.next(), parts.next()) {
        (Some(user), Some(hash), None) if !user.is_empty() => Ok(HashRecord {
            identifier: user.to_string(),
            hash: hash.trim().to_lowercase(),
        }),
        _ => Err(Error::malformed(line, "expected username:hash")),
    }
}

/// Parses DirectoryDump lines with the history pattern compiled once.
#[derive(Debug, Clone)]
pub struct DumpParser<'a> {
    config: &'a RepositoryConfig,
    history: Regex,
}

impl<'a> DumpParser<'a> {
    pub fn new(config: &'a RepositoryConfig) -> Result<Self> {
        let pattern = format!(
            r"^(?P<base>.+){}(?P<index>\d+)$",
            regex::escape(&config.history_marker)
        );
        let history = Regex::new(&pattern).map_err(|e| {
            Error::Configuration(format!("invalid history marker {:?}: {e}", config.history_marker))
        })?;
        Ok(Self { config, history })
    }

    /// Machine accounts, machine history and unterminated lines carry no
    /// usable user hash.
    pub fn is_placeholder(&self, line: &str) -> bool {
        let sep = self.config.field_separator;
        !line.contains(self.config.dump_terminator.as_str())
            || line.contains(&format!("${sep}"))
            || line.contains(&format!("${}", self.config.history_marker))
    }

    pub fn parse_line(&self, line: &str) -> Result<DumpLine> {
        let record = line
            .split(self.config.dump_terminator.as_str())
            .next()
            .unwrap_or_default();
        let fields: Vec<&str> = record.split(self.config.field_separator).collect();
        if fields.len() < 4 || fields[0].is_empty() {
            return Err(Error::malformed(line, "expected user:rid:lm:nt"));
        }
        let identifier = fields[0];
        let hash = fields[3].trim().to_lowercase();
        if !identifier.contains(self.config.history_marker.as_str()) {
            return Ok(DumpLine::Current(HashRecord {
                identifier: identifier.to_string(),
                hash,
            }));
        }
        let (base, index) = self.split_history_identifier(identifier).ok_or_else(|| {
            Error::malformed(line, "history identifier without generation index")
        })?;
        Ok(DumpLine::History(HistoryRecord { base, index, hash }))
    }

    /// `bob_history3` -> (`bob`, 3).
    pub fn split_history_identifier(&self, identifier: &str) -> Option<(String, u32)> {
        let caps = self.history.captures(identifier)?;
        let index = caps["index"].parse().ok()?;
        Some((caps["base"].to_string(), index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_selectors() {
        assert_eq!(HashFormat::from_selector(1).unwrap(), HashFormat::Bare);
        assert_eq!(HashFormat::from_selector(2).unwrap(), HashFormat::UserHash);
        assert_eq!(
            HashFormat::from_selector(3).unwrap(),
            HashFormat::DirectoryDump
        );
        assert!(matches!(
            HashFormat::from_selector(4),
            Err(Error::Configuration(_))
        ));
    }

    #[test]
    fn user_hash_lines() {
        let cfg = RepositoryConfig::default();
        let r = parse_user_hash_line("alice:8846F7EAEE8FB117AD06BDD830B7586C", &cfg).unwrap();
        assert_eq!(r.identifier, "alice");
        assert_eq!(r.hash, "8846f7eaee8fb117ad06bdd830b7586c");
        assert!(parse_user_hash_line("justahash", &cfg).is_err());
        assert!(parse_user_hash_line("a:b:c", &cfg).is_err());
    }

    #[test]
    fn dump_placeholders() {
        let cfg = RepositoryConfig::default();
        let p = DumpParser::new(&cfg).unwrap();
        assert!(p.is_placeholder("HOST$:1000:aad3b435b51404ee:31d6cfe0d16ae931:::"));
        assert!(p.is_placeholder("HOST$_history0:1000:aa:bb:::"));
        assert!(p.is_placeholder("bob:500:aa:bb"));
        assert!(!p.is_placeholder("bob:500:aa:bb:::"));
        assert!(!p.is_placeholder("bob_history1:500:aa:bb:::"));
    }

    #[test]
    fn dump_current_and_history_lines() {
        let cfg = RepositoryConfig::default();
        let p = DumpParser::new(&cfg).unwrap();
        assert_eq!(
            p.parse_line("DOM\\bob:500:aad3b435b51404ee:AAAA:::").unwrap(),
            DumpLine::Current(HashRecord {
                identifier: "DOM\\bob".to_string(),
                hash: "aaaa".to_string(),
            })
        );
        assert_eq!(
            p.parse_line("bob_history12:500:aa:BBBB:::").unwrap(),
            DumpLine::History(HistoryRecord {
                base: "bob".to_string(),
                index: 12,
                hash: "bbbb".to_string(),
            })
        );
        assert!(p.parse_line("bob:500:aa:::").is_err());
        assert!(p.parse_line("bob_historyX:500:aa:bb:::").is_err());
    }

    #[test]
    fn history_split_uses_last_marker() {
        let cfg = RepositoryConfig::default();
        let p = DumpParser::new(&cfg).unwrap();
        assert_eq!(
            p.split_history_identifier("svc_history_history3"),
            Some(("svc_history".to_string(), 3))
        );
        assert_eq!(p.split_history_identifier("_history3"), None);
    }
}

//! Account repository: reconciles hash records with the credential index.
//!
//! Accounts keep the order in which their identifier was first seen; a later
//! record for the same identifier replaces the earlier credential in place.
//! DirectoryDump history lines are attached in a second pass once every base
//! account exists.
use std::collections::HashMap;

use log::{debug, warn};

use crate::credential::{Account, Credential};
use crate::error::{Error, Result};
use crate::hashfile::{DumpLine, DumpParser, HashFormat, HistoryRecord, parse_user_hash_line};
use crate::pot::CredentialIndex;

/// Record layout conventions injected into [`AccountRepository::build`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryConfig {
    pub format: HashFormat,
    pub history_marker: String,
    pub dump_terminator: String,
    pub field_separator: char,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            format: HashFormat::DirectoryDump,
            history_marker: "_history".to_string(),
            dump_terminator: ":::".to_string(),
            field_separator: ':',
        }
    }
}

impl RepositoryConfig {
    pub fn with_format(format: HashFormat) -> Self {
        Self {
            format,
            ..Self::default()
        }
    }
}

/// Lines that did not become accounts or history entries.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RecordStats {
    pub malformed: usize,
    pub placeholders: usize,
    pub orphaned_history: usize,
}

#[derive(Debug, Clone)]
pub struct AccountRepository {
    accounts: Vec<Account>,
    positions: HashMap<String, usize>,
    record_stats: RecordStats,
}

impl AccountRepository {
    /// Build the repository from raw hash-file lines. Blank lines are
    /// ignored. Fails when there are no records or no account survives.
    pub fn build<S: AsRef<str>>(
        records: &[S],
        index: &CredentialIndex,
        config: &RepositoryConfig,
    ) -> Result<Self> {
        let lines: Vec<&str> = records
            .iter()
            .map(|r| r.as_ref())
            .filter(|r| !r.trim().is_empty())
            .collect();
        if lines.is_empty() {
            return Err(Error::Configuration("no entry in hashfile".to_string()));
        }
        let mut repo = Self {
            accounts: Vec::new(),
            positions: HashMap::new(),
            record_stats: RecordStats::default(),
        };
        match config.format {
            HashFormat::Bare => {
                for (i, line) in lines.iter().enumerate() {
                    repo.upsert(&format!("user_{i}"), line.trim(), index);
                }
            }
            HashFormat::UserHash => {
                for line in &lines {
                    match parse_user_hash_line(line, config) {
                        Ok(rec) => repo.upsert(&rec.identifier, &rec.hash, index),
                        Err(e) => repo.skip_malformed(e),
                    }
                }
            }
            HashFormat::DirectoryDump => {
                let parser = DumpParser::new(config)?;
                let mut deferred: Vec<HistoryRecord> = Vec::new();
                for line in &lines {
                    if parser.is_placeholder(line) {
                        repo.record_stats.placeholders += 1;
                        continue;
                    }
                    match parser.parse_line(line) {
                        Ok(DumpLine::Current(rec)) => repo.upsert(&rec.identifier, &rec.hash, index),
                        Ok(DumpLine::History(rec)) => deferred.push(rec),
                        Err(e) => repo.skip_malformed(e),
                    }
                }
                for rec in deferred {
                    repo.attach_history(rec, index);
                }
            }
        }
        if repo.accounts.is_empty() {
            return Err(Error::Configuration(
                "hashfile produced no accounts".to_string(),
            ));
        }
        Ok(repo)
    }

    fn resolve(hash: &str, index: &CredentialIndex) -> Credential {
        let mut credential = Credential::new(hash);
        if let Some(cleartext) = index.lookup(hash) {
            credential.crack(cleartext);
        }
        credential
    }

    fn upsert(&mut self, identifier: &str, hash: &str, index: &CredentialIndex) {
        let account = Account::new(identifier, Self::resolve(hash, index));
        match self.positions.get(identifier) {
            Some(&pos) => self.accounts[pos] = account,
            None => {
                self.positions
                    .insert(identifier.to_string(), self.accounts.len());
                self.accounts.push(account);
            }
        }
    }

    fn attach_history(&mut self, rec: HistoryRecord, index: &CredentialIndex) {
        let Some(&pos) = self.positions.get(&rec.base) else {
            warn!(
                "history entry {} for unknown account {}, skipping",
                rec.index, rec.base
            );
            self.record_stats.orphaned_history += 1;
            return;
        };
        let credential = Self::resolve(&rec.hash, index);
        self.accounts[pos].add_history(rec.index, credential);
    }

    fn skip_malformed(&mut self, e: Error) {
        debug!("{}", e);
        self.record_stats.malformed += 1;
    }

    pub fn all_accounts(&self) -> &[Account] {
        &self.accounts
    }

    pub fn get(&self, identifier: &str) -> Option<&Account> {
        self.positions.get(identifier).map(|&pos| &self.accounts[pos])
    }

    /// Identifier and cleartext of each cracked account, in account order.
    pub fn cracked_accounts(&self) -> Vec<(&str, &str)> {
        self.accounts
            .iter()
            .filter_map(|a| a.current().cleartext().map(|c| (a.identifier(), c)))
            .collect()
    }

    pub fn all_hash_values(&self) -> Vec<&str> {
        self.accounts.iter().map(|a| a.current().hash()).collect()
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    pub fn record_stats(&self) -> RecordStats {
        self.record_stats
    }
}

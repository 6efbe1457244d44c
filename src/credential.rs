//! Credential and account data model.
//!
//! A [`Credential`] pairs a normalized (lowercase) hash with an optional
//! recovered cleartext. An [`Account`] owns its current credential and a
//! sparse history of prior generations keyed by generation index.
//!
//! Use [`Credential::crack`] to resolve an unrecovered credential; the
//! transition happens at most once.
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq)]
/// A hash value and, once recovered, its cleartext.
pub struct Credential {
    hash: String,
    cleartext: Option<String>,
}

impl Credential {
    /// Construct an unrecovered credential. The hash is lowercased.
    pub fn new(hash: &str) -> Self {
        Self {
            hash: hash.to_lowercase(),
            cleartext: None,
        }
    }

    /// Construct a credential with an already known cleartext.
    pub fn recovered(hash: &str, cleartext: &str) -> Self {
        Self {
            hash: hash.to_lowercase(),
            cleartext: Some(cleartext.to_string()),
        }
    }

    pub fn hash(&self) -> &str {
        &self.hash
    }

    /// Recovered cleartext. `Some("")` is a blank password.
    pub fn cleartext(&self) -> Option<&str> {
        self.cleartext.as_deref()
    }

    pub fn is_recovered(&self) -> bool {
        self.cleartext.is_some()
    }

    /// Record the cleartext for an unrecovered credential. Returns `false`
    /// and leaves the credential untouched if it was already recovered.
    pub fn crack(&mut self, cleartext: &str) -> bool {
        if self.cleartext.is_some() {
            return false;
        }
        self.cleartext = Some(cleartext.to_string());
        true
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// An account with its current credential and prior generations.
pub struct Account {
    identifier: String,
    current: Credential,
    history: BTreeMap<u32, Credential>,
}

impl Account {
    pub fn new(identifier: &str, current: Credential) -> Self {
        Self {
            identifier: identifier.to_string(),
            current,
            history: BTreeMap::new(),
        }
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn current(&self) -> &Credential {
        &self.current
    }

    pub fn history(&self) -> &BTreeMap<u32, Credential> {
        &self.history
    }

    pub fn has_history(&self) -> bool {
        !self.history.is_empty()
    }

    pub fn is_cracked(&self) -> bool {
        self.current.is_recovered()
    }

    /// Attach a prior generation. A repeated index replaces the earlier entry
    /// so indices stay unique.
    pub(crate) fn add_history(&mut self, index: u32, credential: Credential) {
        self.history.insert(index, credential);
    }
}

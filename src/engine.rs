//! Engine: runs the analysis pipeline. Potfiles become a credential index,
//! the hash file becomes an account repository, then the cracked accounts are
//! aggregated and password histories are checked for reuse. Each stage runs
//! once and its output is immutable afterwards.
//!
//! Typical usage:
//!
//! ```no_run
//! use graphcat::engine::Engine;
//! use graphcat::repository::RepositoryConfig;
//! # fn main() -> anyhow::Result<()> {
//! let mut engine = Engine::new(RepositoryConfig::default());
//! let analysis = engine.load_from_file_paths("/path/to/ntds.txt", &["/path/to/hashcat.potfile"])?;
//! println!("{}", graphcat::report::render_summary(&analysis));
//! # Ok(())
//! # }
//! ```
use std::path::Path;

use anyhow::Result as AnyResult;
use log::info;

use crate::error::Result;
use crate::history::{HistoryReuse, analyze_history};
use crate::io::{DEFAULT_MMAP_THRESHOLD_BYTES, read_lines};
use crate::pot::{CredentialIndex, PotConvention, PotParse, parse_pot_contents};
use crate::repository::{AccountRepository, RepositoryConfig};
use crate::stats::{DEFAULT_TOP_N, Statistics, calculate_statistics};

/// Lines rejected while loading, across both inputs.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ParseStats {
    pub hash_malformed: usize,
    pub hash_placeholders: usize,
    pub orphaned_history: usize,
    pub pot_malformed: usize,
}

/// Output of one pipeline run.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub index_size: usize,
    pub repository: AccountRepository,
    pub statistics: Statistics,
    pub history: HistoryReuse,
}

#[derive(Debug, Clone)]
pub struct Engine {
    pub config: RepositoryConfig,
    pub pot_convention: PotConvention,
    pub top_n: usize,
    pub parallel: bool,
    pub parse_stats: Option<ParseStats>,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(RepositoryConfig::default())
    }
}

impl Engine {
    pub fn new(config: RepositoryConfig) -> Self {
        Self {
            config,
            pot_convention: PotConvention::Hashcat,
            top_n: DEFAULT_TOP_N,
            parallel: false,
            parse_stats: None,
        }
    }

    pub fn with_pot_convention(mut self, convention: PotConvention) -> Self {
        self.pot_convention = convention;
        self
    }

    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Run the pipeline over inputs already in memory. Intended for tests and
    /// small programmatic integrations; later potfiles override earlier ones.
    pub fn load_from_strings(&mut self, hashes: &str, pots: &[&str]) -> Result<Analysis> {
        let mut pot = PotParse::default();
        for contents in pots {
            let parsed = parse_pot_contents(contents, self.pot_convention);
            pot.entries.extend(parsed.entries);
            pot.malformed += parsed.malformed;
        }
        let lines: Vec<&str> = hashes.lines().collect();
        self.analyze(&lines, pot)
    }

    /// Read the inputs from disk, memory-mapping files at or above
    /// `mmap_threshold_bytes`, then run the pipeline.
    pub fn load_from_file_paths_with_threshold<H, P>(
        &mut self,
        hash_path: H,
        pot_paths: &[P],
        mmap_threshold_bytes: u64,
    ) -> AnyResult<Analysis>
    where
        H: AsRef<Path> + Sync,
        P: AsRef<Path> + Sync,
    {
        let convention = self.pot_convention;
        let read_pots = || -> AnyResult<PotParse> {
            let mut pot = PotParse::default();
            for p in pot_paths {
                for line in read_lines(p, mmap_threshold_bytes)? {
                    pot.push_line(&line, convention);
                }
            }
            Ok(pot)
        };
        let read_hashes = || read_lines(&hash_path, mmap_threshold_bytes);
        let (hashes, pot) = if self.parallel {
            rayon::join(read_hashes, read_pots)
        } else {
            (read_hashes(), read_pots())
        };
        Ok(self.analyze(&hashes?, pot?)?)
    }

    pub fn load_from_file_paths<H, P>(&mut self, hash_path: H, pot_paths: &[P]) -> AnyResult<Analysis>
    where
        H: AsRef<Path> + Sync,
        P: AsRef<Path> + Sync,
    {
        self.load_from_file_paths_with_threshold(hash_path, pot_paths, DEFAULT_MMAP_THRESHOLD_BYTES)
    }

    fn analyze<S: AsRef<str>>(&mut self, hash_lines: &[S], pot: PotParse) -> Result<Analysis> {
        let mut stats = ParseStats {
            pot_malformed: pot.malformed,
            ..ParseStats::default()
        };
        self.parse_stats = Some(stats);

        let index = CredentialIndex::build(pot.entries)?;
        info!("{} entries in potfile", index.len());

        let repository = AccountRepository::build(hash_lines, &index, &self.config)?;
        let records = repository.record_stats();
        stats.hash_malformed = records.malformed;
        stats.hash_placeholders = records.placeholders;
        stats.orphaned_history = records.orphaned_history;
        self.parse_stats = Some(stats);
        info!("{} accounts in hashfile", repository.len());

        let statistics = calculate_statistics(&repository, self.top_n, self.parallel)?;
        let history = analyze_history(&repository);
        info!(
            "{} of {} accounts with history reuse a previous password pattern",
            history.count(),
            history.examined
        );

        Ok(Analysis {
            index_size: index.len(),
            repository,
            statistics,
            history,
        })
    }
}

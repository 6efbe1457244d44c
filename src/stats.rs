//! Statistical summaries over the cracked accounts of a repository.
//!
//! Defines `RecoverySummary` (crack rate), the composition and length
//! histograms, and first-seen-stable frequency counters used for the top
//! passwords, basewords and masks tables. Totals use every account; all other
//! figures only look at cracked ones.
use std::cmp::Reverse;
use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

use log::info;
use rayon::prelude::*;
use serde::Serialize;

use crate::classify::{
    Composition, LengthBucket, classify_composition, classify_length, compute_mask,
    extract_basewords,
};
use crate::error::{Error, Result};
use crate::repository::AccountRepository;

pub const DEFAULT_TOP_N: usize = 10;
/// Shown instead of a blank password.
pub const EMPTY_PASSWORD_LABEL: &str = "[EMPTY]";

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

fn pct(n: usize, d: usize) -> f64 {
    if d == 0 {
        return 0.0;
    }
    round2((n as f64) / (d as f64) * 100.0)
}

#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct RecoverySummary {
    pub total: usize,
    pub recovered: usize,
    pub not_recovered: usize,
    pub recovered_pct: f64,
}

impl RecoverySummary {
    pub fn new(recovered: usize, total: usize) -> Self {
        Self {
            total,
            recovered,
            not_recovered: total - recovered,
            recovered_pct: pct(recovered, total),
        }
    }
}

/// Occurrence counter whose ranking breaks ties by first insertion.
#[derive(Debug, Clone)]
pub struct FrequencyCounter<K> {
    entries: Vec<(K, usize)>,
    positions: HashMap<K, usize>,
}

impl<K> Default for FrequencyCounter<K> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            positions: HashMap::new(),
        }
    }
}

impl<K: Eq + Hash + Clone> FrequencyCounter<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, key: K) {
        match self.positions.get(&key) {
            Some(&pos) => self.entries[pos].1 += 1,
            None => {
                self.positions.insert(key.clone(), self.entries.len());
                self.entries.push((key, 1));
            }
        }
    }

    pub fn get(&self, key: &K) -> usize {
        self.positions
            .get(key)
            .map(|&pos| self.entries[pos].1)
            .unwrap_or(0)
    }

    /// Distinct keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Up to `n` entries by descending count, earlier first-seen winning ties.
    pub fn most_common(&self, n: usize) -> Vec<(&K, usize)> {
        let mut ranked: Vec<(usize, &(K, usize))> = self.entries.iter().enumerate().collect();
        ranked.sort_by_key(|(seen, (_, count))| (Reverse(*count), *seen));
        ranked
            .into_iter()
            .take(n)
            .map(|(_, (key, count))| (key, *count))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositionHistogram {
    counts: BTreeMap<Composition, usize>,
}

impl Default for CompositionHistogram {
    fn default() -> Self {
        Self {
            counts: Composition::ALL.iter().map(|&c| (c, 0)).collect(),
        }
    }
}

impl CompositionHistogram {
    pub fn add(&mut self, composition: Composition) {
        *self.counts.entry(composition).or_insert(0) += 1;
    }

    pub fn count(&self, composition: Composition) -> usize {
        self.counts.get(&composition).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Composition, usize)> + '_ {
        self.counts.iter().map(|(&c, &n)| (c, n))
    }

    /// Display rows: categories under 1% of the total fold into `Other`
    /// together with the genuine `Other` bucket; empty rows are dropped.
    pub fn display(&self) -> Vec<(Composition, usize)> {
        let threshold = self.total() as f64 / 100.0;
        let mut rows = Vec::new();
        let mut other = self.count(Composition::Other);
        for (composition, count) in self.iter() {
            if composition == Composition::Other || count == 0 {
                continue;
            }
            if (count as f64) < threshold {
                other += count;
            } else {
                rows.push((composition, count));
            }
        }
        if other > 0 {
            rows.push((Composition::Other, other));
        }
        rows
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FrequencyRow {
    pub value: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MaskRow {
    pub mask: String,
    pub count: usize,
    pub percent: f64,
}

/// Everything derived from one cleartext.
struct Profile<'a> {
    cleartext: &'a str,
    composition: Composition,
    length: LengthBucket,
    mask: String,
    basewords: Vec<&'a str>,
}

impl<'a> Profile<'a> {
    fn of(cleartext: &'a str) -> Self {
        Self {
            cleartext,
            composition: classify_composition(cleartext),
            length: classify_length(cleartext),
            mask: compute_mask(cleartext),
            basewords: extract_basewords(cleartext),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Statistics {
    pub recovery: RecoverySummary,
    pub composition: CompositionHistogram,
    pub length: BTreeMap<LengthBucket, usize>,
    pub passwords: FrequencyCounter<String>,
    pub basewords: FrequencyCounter<String>,
    pub masks: FrequencyCounter<String>,
    pub top_n: usize,
}

impl Statistics {
    /// Most reused passwords, single occurrences left out.
    pub fn top_passwords(&self) -> Vec<FrequencyRow> {
        reused_rows(&self.passwords, self.top_n)
            .into_iter()
            .map(|mut row| {
                if row.value.is_empty() {
                    row.value = EMPTY_PASSWORD_LABEL.to_string();
                }
                row
            })
            .collect()
    }

    pub fn top_basewords(&self) -> Vec<FrequencyRow> {
        reused_rows(&self.basewords, self.top_n)
    }

    pub fn top_masks(&self) -> Vec<MaskRow> {
        self.masks
            .most_common(self.top_n)
            .into_iter()
            .map(|(mask, count)| MaskRow {
                mask: mask.clone(),
                count,
                percent: pct(count, self.recovery.recovered),
            })
            .collect()
    }

    pub fn length_rows(&self) -> Vec<(LengthBucket, usize)> {
        self.length.iter().map(|(&b, &n)| (b, n)).collect()
    }
}

fn reused_rows(counter: &FrequencyCounter<String>, top_n: usize) -> Vec<FrequencyRow> {
    counter
        .most_common(top_n)
        .into_iter()
        .filter(|(_, count)| *count > 1)
        .map(|(value, count)| FrequencyRow {
            value: value.clone(),
            count,
        })
        .collect()
}

/// Aggregate the cracked accounts of `repo`. With `parallel`, cleartexts are
/// classified on the rayon pool; counting still happens in account order so
/// the result does not depend on scheduling.
pub fn calculate_statistics(
    repo: &AccountRepository,
    top_n: usize,
    parallel: bool,
) -> Result<Statistics> {
    let cracked = repo.cracked_accounts();
    if cracked.is_empty() {
        return Err(Error::NoData);
    }
    info!("aggregating {} cracked accounts", cracked.len());

    let profiles: Vec<Profile> = if parallel {
        cracked.par_iter().map(|&(_, c)| Profile::of(c)).collect()
    } else {
        cracked.iter().map(|&(_, c)| Profile::of(c)).collect()
    };

    let mut composition = CompositionHistogram::default();
    let mut length: BTreeMap<LengthBucket, usize> =
        LengthBucket::ALL.iter().map(|&b| (b, 0)).collect();
    let mut passwords = FrequencyCounter::new();
    let mut basewords = FrequencyCounter::new();
    let mut masks = FrequencyCounter::new();
    for p in profiles {
        composition.add(p.composition);
        *length.entry(p.length).or_insert(0) += 1;
        for word in p.basewords {
            basewords.add(word.to_string());
        }
        passwords.add(p.cleartext.to_string());
        masks.add(p.mask);
    }

    Ok(Statistics {
        recovery: RecoverySummary::new(cracked.len(), repo.len()),
        composition,
        length,
        passwords,
        basewords,
        masks,
        top_n,
    })
}

//! Password history reuse detection.
//!
//! Two cleartexts are aligned character by character with a longest-matching-
//! block diff (Ratcliff/Obershelp, as used by classic `ndiff`). The similarity
//! score is the longest unbroken run of matching characters in that
//! alignment. An account is flagged when any cracked prior generation scores
//! at least [`MIN_SHARED_RUN`], or scores within [`MAX_EDIT_SLACK`] of the
//! current password's length.
use std::collections::HashMap;

use log::debug;

use crate::repository::AccountRepository;

pub const MIN_SHARED_RUN: usize = 5;
pub const MAX_EDIT_SLACK: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edit {
    Equal(char),
    Delete(char),
    Insert(char),
}

/// A run of `len` equal items starting at `a[i]` and `b[j]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Block {
    i: usize,
    j: usize,
    len: usize,
}

struct Matcher<'a> {
    a: &'a [char],
    b: &'a [char],
    b_positions: HashMap<char, Vec<usize>>,
}

impl<'a> Matcher<'a> {
    fn new(a: &'a [char], b: &'a [char]) -> Self {
        let mut b_positions: HashMap<char, Vec<usize>> = HashMap::new();
        for (j, &c) in b.iter().enumerate() {
            b_positions.entry(c).or_default().push(j);
        }
        Self { a, b, b_positions }
    }

    /// Longest common block inside `a[alo..ahi]` x `b[blo..bhi]`. Ties go to
    /// the block starting earliest in `a`, then earliest in `b`.
    fn longest_match(&self, alo: usize, ahi: usize, blo: usize, bhi: usize) -> Block {
        let mut best = Block {
            i: alo,
            j: blo,
            len: 0,
        };
        let mut run_ending_at: HashMap<usize, usize> = HashMap::new();
        for i in alo..ahi {
            let mut next: HashMap<usize, usize> = HashMap::new();
            if let Some(positions) = self.b_positions.get(&self.a[i]) {
                for &j in positions {
                    if j < blo {
                        continue;
                    }
                    if j >= bhi {
                        break;
                    }
                    let prev = if j > 0 {
                        run_ending_at.get(&(j - 1)).copied().unwrap_or(0)
                    } else {
                        0
                    };
                    let len = prev + 1;
                    next.insert(j, len);
                    if len > best.len {
                        best = Block {
                            i: i + 1 - len,
                            j: j + 1 - len,
                            len,
                        };
                    }
                }
            }
            run_ending_at = next;
        }
        best
    }

    fn collect_blocks(&self, alo: usize, ahi: usize, blo: usize, bhi: usize, out: &mut Vec<Block>) {
        let m = self.longest_match(alo, ahi, blo, bhi);
        if m.len == 0 {
            return;
        }
        if alo < m.i && blo < m.j {
            self.collect_blocks(alo, m.i, blo, m.j, out);
        }
        out.push(m);
        if m.i + m.len < ahi && m.j + m.len < bhi {
            self.collect_blocks(m.i + m.len, ahi, m.j + m.len, bhi, out);
        }
    }

    /// Matching blocks in order, adjacent blocks merged.
    fn matching_blocks(&self) -> Vec<Block> {
        let mut raw = Vec::new();
        self.collect_blocks(0, self.a.len(), 0, self.b.len(), &mut raw);
        let mut merged: Vec<Block> = Vec::with_capacity(raw.len());
        for block in raw {
            match merged.last_mut() {
                Some(last) if last.i + last.len == block.i && last.j + last.len == block.j => {
                    last.len += block.len;
                }
                _ => merged.push(block),
            }
        }
        merged
    }
}

/// Character-level alignment turning `a` into `b`.
pub fn align(a: &str, b: &str) -> Vec<Edit> {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let matcher = Matcher::new(&a, &b);
    let mut edits = Vec::with_capacity(a.len().max(b.len()));
    let (mut i, mut j) = (0, 0);
    for block in matcher.matching_blocks() {
        edits.extend(a[i..block.i].iter().map(|&c| Edit::Delete(c)));
        edits.extend(b[j..block.j].iter().map(|&c| Edit::Insert(c)));
        edits.extend(a[block.i..block.i + block.len].iter().map(|&c| Edit::Equal(c)));
        i = block.i + block.len;
        j = block.j + block.len;
    }
    edits.extend(a[i..].iter().map(|&c| Edit::Delete(c)));
    edits.extend(b[j..].iter().map(|&c| Edit::Insert(c)));
    edits
}

/// Longest unbroken run of [`Edit::Equal`] in the alignment of `previous`
/// onto `current`.
pub fn similarity(previous: &str, current: &str) -> usize {
    let mut longest = 0;
    let mut run = 0;
    for edit in align(previous, current) {
        if matches!(edit, Edit::Equal(_)) {
            run += 1;
            longest = longest.max(run);
        } else {
            run = 0;
        }
    }
    longest
}

pub fn is_pattern_reuse(previous: &str, current: &str) -> bool {
    let score = similarity(previous, current);
    let current_len = current.chars().count();
    score >= MIN_SHARED_RUN || score + MAX_EDIT_SLACK > current_len
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct HistoryReuse {
    /// Cracked accounts carrying at least one history entry.
    pub examined: usize,
    /// Identifiers flagged for pattern reuse, in account order.
    pub flagged: Vec<String>,
}

impl HistoryReuse {
    pub fn count(&self) -> usize {
        self.flagged.len()
    }
}

/// Flag each cracked account whose current password resembles any cracked
/// prior generation. An account is flagged at most once.
pub fn analyze_history(repo: &AccountRepository) -> HistoryReuse {
    let mut out = HistoryReuse::default();
    for account in repo.all_accounts() {
        let Some(current) = account.current().cleartext() else {
            continue;
        };
        if !account.has_history() {
            continue;
        }
        out.examined += 1;
        let reused = account
            .history()
            .iter()
            .filter_map(|(idx, cred)| cred.cleartext().map(|c| (idx, c)))
            .find(|(_, previous)| is_pattern_reuse(previous, current));
        if let Some((idx, _)) = reused {
            debug!(
                "{} reuses the pattern of history generation {}",
                account.identifier(),
                idx
            );
            out.flagged.push(account.identifier().to_string());
        }
    }
    out
}

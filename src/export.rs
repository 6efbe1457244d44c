//! Export helpers for writing analysis results to CSV and plain text files.
//!
//! - `save_user_pass_txt` writes `identifier:cleartext` for cracked accounts.
//! - `save_tables_csv` writes one CSV per report table, named
//!   `graphcat_<table>_<stamp>.csv`.
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use csv::Writer;
use serde::Serialize;

use crate::engine::Analysis;
use crate::stats::{FrequencyRow, MaskRow};

#[derive(Debug, Serialize)]
struct CountRow<'a> {
    category: &'a str,
    count: usize,
}

fn write_rows<T: Serialize, P: AsRef<Path>>(path: P, rows: &[T]) -> Result<()> {
    let path = path.as_ref();
    let mut wtr = Writer::from_path(path).with_context(|| format!("create {}", path.display()))?;
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

fn count_rows(pairs: &[(String, usize)]) -> Vec<CountRow<'_>> {
    pairs
        .iter()
        .map(|(category, count)| CountRow {
            category,
            count: *count,
        })
        .collect()
}

pub fn save_user_pass_txt<P: AsRef<Path>>(analysis: &Analysis, path: P) -> Result<()> {
    let path = path.as_ref();
    let mut f = File::create(path).with_context(|| format!("create {}", path.display()))?;
    for (identifier, cleartext) in analysis.repository.cracked_accounts() {
        writeln!(f, "{}:{}", identifier, cleartext)?;
    }
    Ok(())
}

/// Write the composition, length, passwords, basewords and masks tables into
/// `dir`. Returns the written paths in that order.
pub fn save_tables_csv<P: AsRef<Path>>(analysis: &Analysis, dir: P, stamp: &str) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    let stats = &analysis.statistics;
    let path_for = |table: &str| dir.join(format!("graphcat_{}_{}.csv", table, stamp));

    let composition: Vec<(String, usize)> = stats
        .composition
        .display()
        .into_iter()
        .map(|(c, n)| (c.to_string(), n))
        .collect();
    let length: Vec<(String, usize)> = stats
        .length_rows()
        .into_iter()
        .map(|(b, n)| (b.to_string(), n))
        .collect();
    let mut written = Vec::new();
    let p = path_for("composition");
    write_rows(&p, &count_rows(&composition))?;
    written.push(p);
    let p = path_for("length");
    write_rows(&p, &count_rows(&length))?;
    written.push(p);
    let p = path_for("passwords");
    write_rows::<FrequencyRow, _>(&p, &stats.top_passwords())?;
    written.push(p);
    let p = path_for("basewords");
    write_rows::<FrequencyRow, _>(&p, &stats.top_basewords())?;
    written.push(p);
    let p = path_for("masks");
    write_rows::<MaskRow, _>(&p, &stats.top_masks())?;
    written.push(p);
    Ok(written)
}

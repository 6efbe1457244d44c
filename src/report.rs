//! Human-readable report rendering for terminal output.
//!
//! Produces a colored summary of the crack rate, composition and length
//! repartition, the top passwords/basewords/masks tables and, when any
//! account qualifies, the password history reuse section.
use colored::*;

use crate::engine::Analysis;

fn visible_len(s: &str) -> usize {
    // Strip ANSI escape sequences (\x1b[ ... m) to compute printable width
    let mut len = 0;
    let mut iter = s.chars().peekable();
    while let Some(ch) = iter.next() {
        if ch == '\u{1b}' {
            if let Some('[') = iter.peek().cloned() {
                let _ = iter.next();
            }
            for c in iter.by_ref() {
                if c == 'm' {
                    break;
                }
            }
        } else {
            len += 1;
        }
    }
    len
}

fn section(out: &mut String, title: ColoredString, lines: Vec<String>) {
    let title = title.to_string();
    out.push('\n');
    out.push_str(&title);
    out.push('\n');
    out.push_str(&"─".repeat(visible_len(&title)));
    out.push_str("\n\n");
    for line in lines {
        out.push_str(&line);
        out.push('\n');
    }
}

pub fn render_summary(analysis: &Analysis) -> String {
    let stats = &analysis.statistics;
    let top_n = stats.top_n;
    let mut out = String::new();
    out.push_str(&format!(
        "{}\n",
        "GraphCat: Password Cracking Report".bold().cyan()
    ));

    let r = &stats.recovery;
    section(
        &mut out,
        "Recovery".bold().yellow(),
        vec![
            format!("Total hashes submitted: {}", r.total),
            format!("Passwords found: {}", r.recovered.to_string().green()),
            format!("Passwords not found: {}", r.not_recovered.to_string().red()),
            format!("Percent of recovered passwords: {:.2}%", r.recovered_pct),
        ],
    );

    let format_lines = stats
        .composition
        .display()
        .into_iter()
        .map(|(c, n)| format!("  {}: {}", c, n))
        .collect();
    section(
        &mut out,
        "Password Format Repartition".bold().blue(),
        format_lines,
    );

    let length_lines = stats
        .length_rows()
        .into_iter()
        .map(|(b, n)| format!("  {}: {}", b, n))
        .collect();
    section(
        &mut out,
        "Password Length Repartition".bold().blue(),
        length_lines,
    );

    let mut most_lines: Vec<String> = stats
        .top_passwords()
        .into_iter()
        .map(|row| format!("  {}: {}", row.value.red(), row.count))
        .collect();
    if most_lines.is_empty() {
        most_lines.push("(No reused passwords)".to_string());
    }
    section(
        &mut out,
        format!("Top {} Most Used Passwords", top_n).bold().magenta(),
        most_lines,
    );

    let mut baseword_lines: Vec<String> = stats
        .top_basewords()
        .into_iter()
        .map(|row| format!("  {}: {}", row.value, row.count))
        .collect();
    if baseword_lines.is_empty() {
        baseword_lines.push("(No reused basewords)".to_string());
    }
    section(
        &mut out,
        format!("Top {} Most Used Basewords", top_n).bold().magenta(),
        baseword_lines,
    );

    let mut mask_lines: Vec<String> = stats
        .top_masks()
        .into_iter()
        .map(|row| format!("  {}: {} ({:.2}%)", row.mask, row.count, row.percent))
        .collect();
    mask_lines.push(String::new());
    mask_lines.push(
        "Legend: d = digit, l = lowercase, U = uppercase, $ = special"
            .dimmed()
            .to_string(),
    );
    section(
        &mut out,
        format!("Top {} Most Used Masks", top_n).bold().magenta(),
        mask_lines,
    );

    let reused = analysis.history.count();
    if reused > 0 {
        section(
            &mut out,
            "Password History".bold().cyan(),
            vec![
                format!(
                    "Users with similar password pattern along history: {}",
                    reused.to_string().red()
                ),
                format!(
                    "Users without similar password pattern along history: {}",
                    r.recovered - reused
                ),
            ],
        );
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Engine;

    fn strip_ansi(s: &str) -> String {
        let mut out = String::new();
        let mut iter = s.chars();
        while let Some(ch) = iter.next() {
            if ch == '\u{1b}' {
                for c in iter.by_ref() {
                    if c == 'm' {
                        break;
                    }
                }
            } else {
                out.push(ch);
            }
        }
        out
    }

    #[test]
    fn visible_len_ignores_escapes() {
        assert_eq!(visible_len("\u{1b}[1;33mRecovery\u{1b}[0m"), 8);
        assert_eq!(visible_len("plain"), 5);
    }

    #[test]
    fn snapshot_summary() {
        let mut e = Engine::default();
        let dump = "alice:1:x:aaaa:::\nalice_history0:1:x:bbbb:::\nbob:2:x:aaaa:::\ncarol:3:x:cccc:::";
        let pot = "aaaa:Summer2023!\nbbbb:Summer2022!";
        let analysis = e.load_from_strings(dump, &[pot]).unwrap();
        let s = strip_ansi(&render_summary(&analysis));
        insta::assert_snapshot!(s.trim_end(), @r"
        GraphCat: Password Cracking Report

        Recovery
        ────────

        Total hashes submitted: 3
        Passwords found: 2
        Passwords not found: 1
        Percent of recovered passwords: 66.67%

        Password Format Repartition
        ───────────────────────────

          Alpha + Numeric + Special: 2

        Password Length Repartition
        ───────────────────────────

          0-5: 0
          6: 0
          7: 0
          8: 0
          9: 0
          10: 0
          11: 2
          12: 0
          13: 0
          14: 0
          15+: 0

        Top 10 Most Used Passwords
        ──────────────────────────

          Summer2023!: 2

        Top 10 Most Used Basewords
        ──────────────────────────

          Summer: 2

        Top 10 Most Used Masks
        ──────────────────────

          Ullllldddd$: 2 (100.00%)

        Legend: d = digit, l = lowercase, U = uppercase, $ = special

        Password History
        ────────────────

        Users with similar password pattern along history: 1
        Users without similar password pattern along history: 1
        ");
    }

    #[test]
    fn history_section_is_omitted_without_reuse() {
        let mut e = Engine::default();
        let analysis = e
            .load_from_strings("dave:1:x:aaaa:::\nerin:2:x:bbbb:::", &["aaaa:pw\nbbbb:pw"])
            .unwrap();
        let s = strip_ansi(&render_summary(&analysis));
        assert!(s.contains("  pw: 2"));
        assert!(s.contains("(No reused basewords)"));
        assert!(!s.contains("Password History"));
    }
}

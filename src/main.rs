//! CLI entrypoint for `graphcat`.
//!
//! Parses command-line arguments, validates input files, runs the analysis
//! pipeline through the library engine, prints a terminal report, and
//! optionally writes the cracked credentials and CSV tables when an output
//! directory is provided.
use std::fs;
use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::{Parser, ValueEnum};
use colored::Colorize;
use graphcat::{
    engine::Engine,
    error::Error,
    export::{save_tables_csv, save_user_pass_txt},
    hashfile::HashFormat,
    io::DEFAULT_MMAP_THRESHOLD_BYTES,
    pot::PotConvention,
    report::render_summary,
    repository::RepositoryConfig,
    stats::DEFAULT_TOP_N,
};
use log::{LevelFilter, error, info, warn};

#[derive(Parser, Debug)]
#[command(
    name = "graphcat-rs",
    version,
    about = "Password cracking analytics reporter (Rust)"
)]
struct Args {
    /// Path to the cracking tool potfile(s); later files win on duplicates
    #[arg(short = 'p', long = "potfile", required = true)]
    potfiles: Vec<PathBuf>,

    /// Path to the file containing the submitted hashes
    #[arg(short = 'H', long = "hashfile")]
    hashfile: PathBuf,

    /// Hash file format: 1 hash per line, 2 username:hash, 3 secretsdump (username:uid:lm:nt)
    #[arg(short = 'f', long = "format", default_value_t = 3)]
    format: u8,

    /// Potfile was written by John the Ripper (keeps $NT$ entries only)
    #[arg(long = "john")]
    john: bool,

    /// Path to the output directory
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// Also write every report table as CSV into the output directory
    #[arg(long = "export-tables", requires = "output")]
    export_tables: bool,

    /// Limit number of entries in the top passwords/basewords/masks tables
    #[arg(long = "top", default_value_t = DEFAULT_TOP_N)]
    top_limit: usize,

    /// Load inputs and classify passwords in parallel
    #[arg(long = "parallel")]
    parallel: bool,

    /// Override mmap threshold in bytes. If zero, disable mmap.
    #[arg(long = "mmap-threshold", default_value_t = DEFAULT_MMAP_THRESHOLD_BYTES)]
    mmap_threshold: u64,

    /// Log counts of skipped/malformed lines encountered during parsing
    #[arg(long = "log-parse-stats")]
    log_parse_stats: bool,

    /// Control color output (auto, always, never)
    #[arg(long = "color", value_enum, default_value_t = ColorChoice::Auto)]
    color: ColorChoice,

    /// Suppress report output (still writes exports if -o is provided)
    #[arg(short = 'q', long = "quiet")]
    quiet: bool,

    /// Increase verbosity (-v, -vv)
    #[arg(short = 'v', action = clap::ArgAction::Count)]
    verbose: u8,

    /// Print the full error chain on failure
    #[arg(long = "debug")]
    debug: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ColorChoice {
    Auto,
    Always,
    Never,
}

const ASCII_TITLE: &str = r#"
  ____                 _      ____      _
 / ___|_ __ __ _ _ __ | |__  / ___|__ _| |_
| |  _| '__/ _` | '_ \| '_ \| |   / _` | __|
| |_| | | | (_| | |_) | | | | |__| (_| | |_
 \____|_|  \__,_| .__/|_| |_|\____\__,_|\__|
                |_|
"#;

fn init_logger(verbosity: u8) {
    let level = match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };
    let _ = env_logger::Builder::from_default_env()
        .filter_level(level)
        .try_init();
}

fn verify_inputs(args: &Args) -> Result<()> {
    if !args.hashfile.exists() {
        bail!("hash file not found: {}", args.hashfile.display());
    }
    for p in &args.potfiles {
        if !p.exists() {
            bail!("potfile not found: {}", p.display());
        }
    }
    Ok(())
}

fn report_failure(context: &str, e: &anyhow::Error, debug: bool) {
    if debug {
        error!("{}: {:?}", context, e);
    } else {
        error!("{}: {:#}", context, e);
    }
}

fn main() {
    let args = Args::parse();
    let verbosity = if args.log_parse_stats {
        args.verbose.max(1)
    } else {
        args.verbose
    };
    init_logger(verbosity);
    match args.color {
        ColorChoice::Always => {
            colored::control::set_override(true);
        }
        ColorChoice::Never => {
            colored::control::set_override(false);
        }
        ColorChoice::Auto => {}
    }
    if let Err(e) = verify_inputs(&args) {
        report_failure("invalid input", &e, args.debug);
        std::process::exit(2);
    }
    let format = match HashFormat::from_selector(args.format) {
        Ok(f) => f,
        Err(e) => {
            report_failure("invalid format", &e.into(), args.debug);
            std::process::exit(3);
        }
    };

    let convention = if args.john {
        PotConvention::John
    } else {
        PotConvention::Hashcat
    };
    let mut engine = Engine::new(RepositoryConfig::with_format(format))
        .with_pot_convention(convention)
        .with_top_n(args.top_limit)
        .with_parallel(args.parallel);
    let threshold = if args.mmap_threshold == 0 {
        u64::MAX
    } else {
        args.mmap_threshold
    };

    let load_res =
        engine.load_from_file_paths_with_threshold(&args.hashfile, &args.potfiles, threshold);

    if args.log_parse_stats {
        if let Some(stats) = engine.parse_stats {
            info!(
                "parse stats: hash_malformed={}, hash_placeholders={}, orphaned_history={}, pot_malformed={}",
                stats.hash_malformed,
                stats.hash_placeholders,
                stats.orphaned_history,
                stats.pot_malformed
            );
        } else {
            info!("parse stats: (not collected for this run)");
        }
    }

    let analysis = match load_res {
        Ok(a) => a,
        Err(e) => {
            if let Some(Error::NoData) = e.downcast_ref::<Error>() {
                warn!("no user cracked, nothing to report");
                return;
            }
            report_failure("failed to analyze inputs", &e, args.debug);
            std::process::exit(3);
        }
    };

    if !args.quiet {
        println!("{}", ASCII_TITLE.bold().green());
        println!("{}", render_summary(&analysis));
    }

    if let Some(outdir) = args.output {
        if let Err(e) = fs::create_dir_all(&outdir) {
            error!(
                "failed to create output directory {}: {}",
                outdir.display(),
                e
            );
            std::process::exit(4);
        }
        let ts = chrono::Local::now().format("%Y.%m.%d_%H.%M.%S").to_string();
        let txt = outdir.join(format!("graphcat_user_pass_{}.txt", ts));
        if let Err(e) = save_user_pass_txt(&analysis, &txt) {
            report_failure(&format!("failed to write {}", txt.display()), &e, args.debug);
            std::process::exit(5);
        }
        info!("cracked credentials written to {}", txt.display());
        if args.export_tables {
            match save_tables_csv(&analysis, &outdir, &ts) {
                Ok(paths) => {
                    for p in paths {
                        info!("table written to {}", p.display());
                    }
                }
                Err(e) => {
                    report_failure("failed to write tables", &e, args.debug);
                    std::process::exit(5);
                }
            }
        }
    }
}

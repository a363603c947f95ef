//! `postlinks` CLI: loads a posts directory, validates links, suggests new
//! ones and writes console, JSON, CSV or Markdown reports.

use clap::Parser;
use colored::Colorize;
use postlinks::config::{load_config, Config};
use postlinks::corpus::{Corpus, LoadOptions};
use postlinks::error::Error;
use postlinks::report::{self, Report};
use postlinks::{planner, validate};
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// postlinks - Internal link analysis and suggestions for Markdown blog posts
#[derive(Parser)]
#[command(name = "postlinks")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory containing the posts (overrides config)
    #[arg(long)]
    posts_dir: Option<PathBuf>,

    /// Suggest internal links for every post
    #[arg(long)]
    suggest: bool,

    /// Check existing internal links
    #[arg(long)]
    validate: bool,

    /// Full report: suggestions, validation and statistics (default)
    #[arg(long)]
    report: bool,

    /// Limit analysis to the first N posts
    #[arg(long, value_name = "N")]
    pilot: Option<usize>,

    /// Write a Markdown suggestions document
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Write a per-post CSV summary
    #[arg(long, value_name = "FILE")]
    csv: Option<PathBuf>,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    /// Minimum relevance score for a suggestion (0.0 to 1.0)
    #[arg(long)]
    min_score: Option<f64>,

    /// Maximum suggestions per post
    #[arg(long)]
    max_suggestions: Option<usize>,

    /// File name patterns to exclude (can be repeated)
    #[arg(short, long)]
    exclude: Vec<String>,

    /// Config file path
    #[arg(short, long, default_value = ".postlinks.toml")]
    config: PathBuf,

    /// Quiet mode - suppress non-essential output
    #[arg(short, long)]
    quiet: bool,

    /// Verbose logging
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.quiet, cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn init_tracing(quiet: bool, verbose: bool) {
    let default_level = if verbose {
        "debug"
    } else if quiet {
        "error"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let start = Instant::now();
    let config = load_config(&cli.config)?;
    let settings = Settings::resolve(&cli, config)?;

    let full = settings.corpus()?;
    let corpus = match cli.pilot {
        Some(n) => {
            info!("pilot mode: limiting to {} of {} posts", n.min(full.len()), full.len());
            full.pilot(n)
        }
        None => full,
    };

    let report_mode = cli.report || !(cli.suggest || cli.validate);
    let run_validate = cli.validate || report_mode;
    let run_suggest = cli.suggest || report_mode || cli.output.is_some();

    if !cli.quiet && !cli.json {
        println!(
            "{} {} posts in {}\n",
            "Analyzing".cyan().bold(),
            corpus.len(),
            settings.posts_dir.display()
        );
    }

    let validation = run_validate.then(|| validate::validate(&corpus));
    let suggestions =
        run_suggest.then(|| planner::plan_all(&corpus, settings.min_score, &settings.plan));

    let report = Report::new(&corpus, settings.band, validation, suggestions);

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        report::print_console(&report);
    }

    if let Some(path) = &cli.output {
        let all = report.suggestions.as_deref().unwrap_or_default();
        report::write_file(path, &report::render_markdown(all))?;
        if !cli.quiet && !cli.json {
            println!("\n{} {}", "Suggestions written to".green(), path.display().to_string().cyan());
        }
    }

    if let Some(path) = &cli.csv {
        report::write_file(path, &report::render_csv(&corpus, &report))?;
        if !cli.quiet && !cli.json {
            println!("{} {}", "CSV written to".green(), path.display().to_string().cyan());
        }
    }

    info!("finished in {:.2?}", start.elapsed());
    Ok(())
}

/// Config file values with command-line overrides applied.
struct Settings {
    posts_dir: PathBuf,
    exclude: Vec<String>,
    min_score: f64,
    plan: planner::PlanOptions,
    band: report::ReportBand,
}

impl Settings {
    fn resolve(cli: &Cli, config: Config) -> Result<Settings, Box<dyn std::error::Error>> {
        let min_score = cli.min_score.unwrap_or(config.scoring.min_score);
        if !(0.0..=1.0).contains(&min_score) {
            return Err(format!("min score must be between 0.0 and 1.0, got {}", min_score).into());
        }

        let mut plan = config.planner.plan_options();
        if let Some(max) = cli.max_suggestions {
            plan.max_suggestions = max;
        }

        let mut exclude = config.exclude;
        exclude.extend(cli.exclude.iter().cloned());

        Ok(Settings {
            posts_dir: cli.posts_dir.clone().unwrap_or(config.posts_dir),
            exclude,
            min_score,
            plan,
            band: config.report.into(),
        })
    }

    fn corpus(&self) -> Result<Corpus, Error> {
        let options = LoadOptions {
            exclude: self.exclude.clone(),
        };
        let corpus = Corpus::load(&self.posts_dir, &options)?;
        if corpus.is_empty() {
            return Err(Error::NoPosts(self.posts_dir.clone()));
        }
        Ok(corpus)
    }
}

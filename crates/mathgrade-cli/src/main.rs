//! mathgrade CLI: grade math answers from the command line.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "mathgrade", version, about = "Math answer evaluation engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Grade one answer against a reference
    Grade {
        /// The student's answer
        #[arg(long, allow_hyphen_values = true)]
        student: String,

        /// The reference answer
        #[arg(long, allow_hyphen_values = true)]
        expected: String,

        /// Also print a worked explanation
        #[arg(long)]
        explain: bool,

        /// Output format: text, json
        #[arg(long, default_value = "text")]
        format: String,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Grade a sequence of solution steps
    Steps {
        /// One solution step (repeat for each step, in order)
        #[arg(long = "step", required = true, allow_hyphen_values = true)]
        steps: Vec<String>,

        /// The final reference answer
        #[arg(long, allow_hyphen_values = true)]
        expected: String,

        /// Reference for the step at the same position (repeatable)
        #[arg(long = "expected-step", allow_hyphen_values = true)]
        expected_steps: Vec<String>,

        /// Output format: text, json
        #[arg(long, default_value = "text")]
        format: String,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Show how an expression is normalized, parsed, and simplified
    Inspect {
        /// The expression to inspect
        #[arg(long, allow_hyphen_values = true)]
        expression: String,

        /// Output format: text, json
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Grade every case of a grade set
    Run {
        /// Path to .toml grade set or directory
        #[arg(long)]
        grade_set: PathBuf,

        /// Max concurrent evaluations (defaults to the config value)
        #[arg(long)]
        parallelism: Option<usize>,

        /// Output directory for JSON reports
        #[arg(long, default_value = "./mathgrade-results")]
        output: PathBuf,

        /// Only grade cases whose id contains this, or that carry it as a tag
        #[arg(long)]
        filter: Option<String>,

        /// Exit code 1 if any case misses its expectations
        #[arg(long)]
        fail_on_mismatch: bool,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Compare two grade reports
    Compare {
        /// Baseline report JSON
        #[arg(long)]
        baseline: PathBuf,

        /// Current report JSON
        #[arg(long)]
        current: PathBuf,

        /// Score change below which a case counts as unchanged
        #[arg(long, default_value = "0.05")]
        threshold: f64,

        /// Exit code 1 if regressions found
        #[arg(long)]
        fail_on_regression: bool,

        /// Output format: text, json, markdown
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Validate grade set TOML files
    Validate {
        /// Path to grade set file or directory
        #[arg(long)]
        grade_set: PathBuf,
    },

    /// Create starter config and example grade set
    Init,
}

#[tokio::main]
async fn main() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("mathgrade=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Grade {
            student,
            expected,
            explain,
            format,
            config,
        } => commands::grade::execute(student, expected, explain, format, config),
        Commands::Steps {
            steps,
            expected,
            expected_steps,
            format,
            config,
        } => commands::steps::execute(steps, expected, expected_steps, format, config),
        Commands::Inspect { expression, format } => commands::inspect::execute(expression, format),
        Commands::Run {
            grade_set,
            parallelism,
            output,
            filter,
            fail_on_mismatch,
            config,
        } => {
            commands::run::execute(grade_set, parallelism, output, filter, fail_on_mismatch, config)
                .await
        }
        Commands::Compare {
            baseline,
            current,
            threshold,
            fail_on_regression,
            format,
        } => commands::compare::execute(baseline, current, threshold, fail_on_regression, format),
        Commands::Validate { grade_set } => commands::validate::execute(grade_set),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

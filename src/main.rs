use clap::{Parser, Subcommand};
use miette::Result;
use std::path::PathBuf;

use p4_midend::cli;

#[derive(Parser)]
#[command(name = "p4-midend")]
#[command(about = "Midend optimizer for P4 programs in JSON IR form")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the midend passes over a JSON IR file
    Optimize {
        /// Input JSON IR file
        input: PathBuf,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format (json, p4)
        #[arg(short, long, default_value = "json")]
        format: String,

        /// JSON file with midend options
        #[arg(long)]
        options: Option<PathBuf>,

        /// Keep locals made dead by copy propagation
        #[arg(long)]
        no_dead_store_elim: bool,

        /// Repeat the passes until the program stops changing
        #[arg(long)]
        fixed_point: bool,

        /// Upper bound on fixed-point rounds
        #[arg(long)]
        max_iterations: Option<usize>,

        /// Print pass statistics to stderr
        #[arg(long)]
        stats: bool,
    },

    /// Print a JSON IR file as P4 source
    Dump {
        /// Input JSON IR file
        input: PathBuf,
    },
}

fn main() -> Result<()> {
    // Initialize logging
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Optimize {
            input,
            output,
            format,
            options,
            no_dead_store_elim,
            fixed_point,
            max_iterations,
            stats,
        } => {
            let args = cli::optimize::OptimizeArgs {
                input_path: input,
                output_path: output,
                format: format.parse()?,
                options_path: options,
                no_dead_store_elim,
                fixed_point,
                max_iterations,
                stats,
            };
            cli::optimize::optimize(&args)?;
        }
        Commands::Dump { input } => cli::dump::dump(&input)?,
    }
    Ok(())
}

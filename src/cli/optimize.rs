use super::utils::{read_program, write_output};
use crate::error::{Error, Result};
use crate::midend::{MidendOptions, PassManager};
use std::path::PathBuf;

/// Output format of the optimize command
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Json,
    P4,
}

impl std::str::FromStr for OutputFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "json" => Ok(OutputFormat::Json),
            "p4" => Ok(OutputFormat::P4),
            other => Err(Error::InvalidOptions {
                message: format!("unknown output format `{}` (expected json or p4)", other),
            }),
        }
    }
}

/// Arguments for the optimize command
#[derive(Debug, Clone, Default)]
pub struct OptimizeArgs {
    pub input_path: PathBuf,
    pub output_path: Option<PathBuf>,
    pub format: OutputFormat,
    pub options_path: Option<PathBuf>,
    pub no_dead_store_elim: bool,
    pub fixed_point: bool,
    pub max_iterations: Option<usize>,
    pub stats: bool,
}

impl OptimizeArgs {
    /// Options file (or defaults) with the command-line overrides applied
    pub fn to_options(&self) -> Result<MidendOptions> {
        let mut options = match &self.options_path {
            Some(path) => MidendOptions::from_file(path)?,
            None => MidendOptions::default(),
        };
        if self.no_dead_store_elim {
            options.eliminate_dead_stores = false;
        }
        if self.fixed_point {
            options.iterate_to_fixed_point = true;
        }
        if let Some(max_iterations) = self.max_iterations {
            options.max_iterations = max_iterations;
        }
        options.validate()?;
        Ok(options)
    }
}

/// Run the optimize subcommand
pub fn optimize(args: &OptimizeArgs) -> Result<()> {
    let options = args.to_options()?;
    let program = read_program(&args.input_path)?;

    let mut manager = PassManager::from_options(&options)?;
    let result = manager.run(&program)?;

    let output = match args.format {
        OutputFormat::Json => result.to_json()?,
        OutputFormat::P4 => result.to_string(),
    };
    write_output(&output, args.output_path.as_deref())?;

    if args.stats {
        eprintln!("rounds: {}", manager.iterations());
        for pass in manager.passes() {
            for (counter, value) in pass.statistics() {
                eprintln!("{}.{}: {}", pass.name(), counter, value);
            }
        }
    }
    Ok(())
}

use super::utils::{read_program, write_output};
use crate::error::Result;
use std::path::Path;

/// Run the dump subcommand: print a JSON IR file as P4 source
pub fn dump(input_path: &Path) -> Result<()> {
    let program = read_program(input_path)?;
    write_output(&program.to_string(), None)
}

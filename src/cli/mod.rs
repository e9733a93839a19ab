//! Command-line interface module
//!
//! This module contains the implementations for the CLI subcommands.

pub mod dump;
pub mod optimize;

/// Common CLI utilities
pub mod utils {
    use crate::error::{Error, Result};
    use crate::ir::Program;
    use std::path::Path;
    use std::rc::Rc;

    /// Read a file into a string
    pub fn read_file(path: &Path) -> Result<String> {
        std::fs::read_to_string(path)
            .map_err(|e| Error::Io(format!("Failed to read {}: {}", path.display(), e)))
    }

    /// Read and parse a JSON IR file
    pub fn read_program(path: &Path) -> Result<Rc<Program>> {
        let text = read_file(path)?;
        Program::from_json(&text).map_err(|e| match e {
            Error::MalformedIr { message } => Error::MalformedIr {
                message: format!("{}: {}", path.display(), message),
            },
            other => other,
        })
    }

    /// Write output to file or stdout
    pub fn write_output(content: &str, output_path: Option<&Path>) -> Result<()> {
        match output_path {
            Some(path) => std::fs::write(path, content)
                .map_err(|e| Error::Io(format!("Failed to write {}: {}", path.display(), e))),
            None => {
                println!("{}", content);
                Ok(())
            }
        }
    }
}

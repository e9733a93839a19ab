use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Which midend passes run and how they are scheduled
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MidendOptions {
    /// Run local copy propagation over every action
    pub local_copy_propagation: bool,
    /// Remove locals left dead by copy propagation
    pub eliminate_dead_stores: bool,
    /// Repeat the pass sequence until the program stops changing
    pub iterate_to_fixed_point: bool,
    /// Upper bound on repetitions of the pass sequence
    pub max_iterations: usize,
}

impl Default for MidendOptions {
    fn default() -> Self {
        Self {
            local_copy_propagation: true,
            eliminate_dead_stores: true,
            iterate_to_fixed_point: false,
            max_iterations: 8,
        }
    }
}

impl MidendOptions {
    pub fn from_json(text: &str) -> Result<Self> {
        let options: MidendOptions =
            serde_json::from_str(text).map_err(|e| Error::InvalidOptions {
                message: e.to_string(),
            })?;
        options.validate()?;
        Ok(options)
    }

    /// Load options from a JSON file; missing keys keep their defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::Io(format!("Failed to read {}: {}", path.display(), e)))?;
        Self::from_json(&text)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_iterations == 0 {
            return Err(Error::InvalidOptions {
                message: "max_iterations must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_keys_take_defaults() {
        let options = MidendOptions::from_json(r#"{ "iterate_to_fixed_point": true }"#).unwrap();
        assert!(options.iterate_to_fixed_point);
        assert!(options.local_copy_propagation);
        assert_eq!(options.max_iterations, 8);
    }

    #[test]
    fn test_rejects_unknown_keys_and_zero_iterations() {
        let unknown = MidendOptions::from_json(r#"{ "inline_everything": true }"#);
        assert!(matches!(unknown, Err(Error::InvalidOptions { .. })));

        let zero = MidendOptions::from_json(r#"{ "max_iterations": 0 }"#);
        assert!(matches!(zero, Err(Error::InvalidOptions { .. })));
    }
}

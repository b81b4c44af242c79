//! Output utilities for CLI tools.

use std::fs::File;
use std::io::Write;

use serde::Serialize;

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// YAML format (default).
    #[default]
    Yaml,
    Json,
}

impl OutputFormat {
    pub fn from_json_flag(json: bool) -> Self {
        if json { Self::Json } else { Self::Yaml }
    }
}

/// Where and how results are printed.
pub struct Output {
    pub format: OutputFormat,
    pub file: Option<String>,
}

impl Output {
    pub fn new(format: OutputFormat, file: Option<String>) -> Self {
        Self { format, file }
    }

    pub fn render<T: Serialize>(&self, value: &T) -> anyhow::Result<String> {
        Ok(match self.format {
            OutputFormat::Yaml => serde_yaml::to_string(value)?,
            OutputFormat::Json => serde_json::to_string_pretty(value)? + "\n",
        })
    }

    /// Writes `value` to the output file, or stdout if none is set.
    pub fn write<T: Serialize>(&self, value: &T) -> anyhow::Result<()> {
        let output = self.render(value)?;
        match &self.file {
            Some(path) => {
                let mut file = File::create(path)?;
                file.write_all(output.as_bytes())?;
            }
            None => print!("{}", output),
        }
        Ok(())
    }
}

/// Prints verbose output if enabled.
pub fn print_verbose(enabled: bool, message: &str) {
    if enabled {
        eprintln!("[verbose] {}", message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Row {
        name: &'static str,
        score: f32,
    }

    #[test]
    fn test_render_formats() {
        let row = Row {
            name: "hover",
            score: 0.5,
        };
        let yaml = Output::new(OutputFormat::Yaml, None).render(&row).unwrap();
        assert_eq!(yaml, "name: hover\nscore: 0.5\n");
        let json = Output::new(OutputFormat::from_json_flag(true), None)
            .render(&row)
            .unwrap();
        assert!(json.contains("\"score\": 0.5"));
    }

    #[test]
    fn test_write_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.yaml");
        let out = Output::new(OutputFormat::Yaml, Some(path.to_string_lossy().into_owned()));
        out.write(&vec!["a", "b"]).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "- a\n- b\n");
    }
}

//! Command-line interface for the diagrammer utility
//!
//! Converts between diagram source text and the JSON model, regenerates
//! canonical source, and reports validation findings.

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;

use crate::colorizer::render_report;
use diagrammer::core::logging::init_logging;
use diagrammer::plugins::Orchestrator;
use diagrammer::validator::DiagramValidator;
use diagrammer::{Diagram, DiagramType, GeneratorConfig};

/// Diagrammer - Parse, validate and regenerate Mermaid-style diagrams
#[derive(Parser)]
#[command(name = "diagrammer")]
#[command(about = "Parse, validate and regenerate Mermaid-style diagram source")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = env!("CARGO_PKG_AUTHORS"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Set log level (trace|debug|info|warn|error)
    #[arg(long, value_enum, default_value_t = LogLevel::Warn)]
    pub log_level: LogLevel,

    /// Set log format (compact|pretty|json)
    #[arg(long, value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,

    /// Spaces per indentation level in generated source
    #[arg(long, default_value_t = 4)]
    pub indent: usize,
}

/// Log level options
#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Log format options
#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

impl LogFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogFormat::Compact => "compact",
            LogFormat::Pretty => "pretty",
            LogFormat::Json => "json",
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Parse diagram source into the JSON model
    Parse {
        /// Input file containing diagram source (use - for stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output file for the JSON model (use - for stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Generate diagram source from the JSON model
    Generate {
        /// Input file containing the JSON model (use - for stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output file for diagram source (use - for stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Rewrite diagram source in canonical form
    Format {
        /// Input file containing diagram source (use - for stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output file for canonical source (use - for stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Validate diagram syntax
    Validate {
        /// Input file to validate (use - for stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,

        /// Include fix suggestions
        #[arg(long)]
        suggest: bool,

        /// When to use colors in output
        #[arg(long, value_enum, default_value_t = ColorChoice::Auto)]
        color: ColorChoice,
    },

    /// Detect diagram type in input
    Detect {
        /// Input file to analyze (use - for stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,
    },

    /// Show supported diagram types
    Types {
        /// Show in JSON format
        #[arg(long)]
        json: bool,
    },
}

/// When to colorize output
#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq, Default)]
pub enum ColorChoice {
    /// Use colors if stdout is a terminal and NO_COLOR is not set
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

fn describe(diagram_type: DiagramType) -> &'static str {
    match diagram_type {
        DiagramType::Flowchart => "Nodes, edges and subgraphs",
        DiagramType::Sequence => "Participants exchanging ordered messages",
        DiagramType::Class => "Classes, members and relationships",
        DiagramType::State => "States, transitions and composite states",
        DiagramType::Er => "Entities, attributes and cardinalities",
        _ => "Diagram",
    }
}

/// Main CLI application
pub struct DiagrammerApp {
    orchestrator: Orchestrator,
    validator: DiagramValidator,
}

impl DiagrammerApp {
    /// Create a new application instance with default settings
    pub fn new() -> Self {
        Self::with_config(GeneratorConfig::default())
    }

    /// Create a new application instance with a generator config
    pub fn with_config(config: GeneratorConfig) -> Self {
        Self {
            orchestrator: Orchestrator::with_generator_config(config),
            validator: DiagramValidator::new(),
        }
    }

    /// Run the application with the given CLI arguments
    pub fn run(&mut self, cli: Cli) -> Result<()> {
        // Environment variables take precedence over flags
        let log_level = std::env::var("DIAGRAMMER_LOG_LEVEL")
            .ok()
            .or_else(|| std::env::var("RUST_LOG").ok())
            .unwrap_or_else(|| cli.log_level.as_str().to_string());
        let log_format = std::env::var("DIAGRAMMER_LOG_FORMAT")
            .ok()
            .unwrap_or_else(|| cli.log_format.as_str().to_string());

        if let Err(e) = init_logging(Some(&log_level), Some(&log_format)) {
            eprintln!("Warning: Failed to initialize logging: {}", e);
        }

        if cli.verbose {
            eprintln!("Diagrammer v{}", env!("CARGO_PKG_VERSION"));
        }

        if cli.indent != GeneratorConfig::default().indent {
            self.orchestrator =
                Orchestrator::with_generator_config(GeneratorConfig::new().with_indent(cli.indent));
        }

        match cli.command {
            Commands::Parse { input, output } => self.parse_command(input, output, cli.verbose),
            Commands::Generate { input, output } => {
                self.generate_command(input, output, cli.verbose)
            }
            Commands::Format { input, output } => self.format_command(input, output, cli.verbose),
            Commands::Validate {
                input,
                json,
                suggest,
                color,
            } => self.validate_command(input, json, suggest, color, cli.verbose),
            Commands::Detect { input } => self.detect_command(input, cli.verbose),
            Commands::Types { json } => self.types_command(json, cli.verbose),
        }
    }

    /// Source text to the pretty-printed JSON model
    pub fn parse_to_json(&self, content: &str) -> Result<String> {
        let diagram = self.orchestrator.parse(content)?;
        Ok(diagram.to_json_string()?)
    }

    /// JSON model to source text
    pub fn generate_from_json(&self, content: &str) -> Result<String> {
        let diagram = Diagram::from_json_str(content)?;
        Ok(self.orchestrator.generate(&diagram)?)
    }

    /// Source text to canonical source text
    pub fn format_source(&self, content: &str) -> Result<String> {
        let diagram = self.orchestrator.parse(content)?;
        Ok(self.orchestrator.generate(&diagram)?)
    }

    fn parse_command(
        &self,
        input: Option<PathBuf>,
        output: Option<PathBuf>,
        verbose: bool,
    ) -> Result<()> {
        let content = self.read_input(input)?;
        if verbose {
            eprintln!("Read {} bytes of input", content.len());
        }
        let json = self.parse_to_json(&content)?;
        self.write_output(output, &json)
    }

    fn generate_command(
        &self,
        input: Option<PathBuf>,
        output: Option<PathBuf>,
        verbose: bool,
    ) -> Result<()> {
        let content = self.read_input(input)?;
        if verbose {
            eprintln!("Read {} bytes of input", content.len());
        }
        let code = self.generate_from_json(&content)?;
        self.write_output(output, &code)
    }

    fn format_command(
        &self,
        input: Option<PathBuf>,
        output: Option<PathBuf>,
        verbose: bool,
    ) -> Result<()> {
        let content = self.read_input(input)?;
        if verbose {
            eprintln!("Read {} bytes of input", content.len());
        }
        let code = self.format_source(&content)?;
        self.write_output(output, &code)
    }

    /// Build the validation report, as JSON or terminal text
    pub fn validation_report(
        &self,
        content: &str,
        json: bool,
        suggest: bool,
        color: bool,
    ) -> Result<(bool, String)> {
        let result = self.validator.validate(content);
        let suggestions = if suggest {
            self.validator.suggest_fixes(content)
        } else {
            Vec::new()
        };

        let report = if json {
            let mut value = serde_json::to_value(&result)?;
            if suggest {
                if let Some(map) = value.as_object_mut() {
                    map.insert("suggestions".to_string(), serde_json::json!(suggestions));
                }
            }
            serde_json::to_string_pretty(&value)?
        } else {
            render_report(&result, &suggestions, color)
        };
        Ok((result.is_valid, report))
    }

    fn validate_command(
        &self,
        input: Option<PathBuf>,
        json: bool,
        suggest: bool,
        color: ColorChoice,
        verbose: bool,
    ) -> Result<()> {
        let content = self.read_input(input)?;
        if verbose {
            eprintln!("Read {} bytes of input", content.len());
        }

        let colorize = !json && self.should_colorize(color);
        let (is_valid, report) = self.validation_report(&content, json, suggest, colorize)?;
        self.write_output(None, &report)?;

        if is_valid {
            Ok(())
        } else {
            Err(anyhow!("Validation failed"))
        }
    }

    /// Determine if the report should carry ANSI colors
    fn should_colorize(&self, color: ColorChoice) -> bool {
        match color {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => {
                if std::env::var("NO_COLOR").is_ok() {
                    return false;
                }
                crossterm::tty::IsTty::is_tty(&std::io::stdout())
            }
        }
    }

    fn detect_command(&self, input: Option<PathBuf>, verbose: bool) -> Result<()> {
        let content = self.read_input(input)?;
        if verbose {
            eprintln!("Read {} bytes of input", content.len());
        }

        match self.orchestrator.detect_diagram_type(&content) {
            Ok(diagram_type) => {
                println!("{}", diagram_type);
                Ok(())
            }
            Err(e) => {
                eprintln!("Could not detect diagram type: {}", e);
                Err(e.into())
            }
        }
    }

    /// Supported dialects, as JSON or a human-readable table
    pub fn types_listing(&self, json: bool) -> Result<String> {
        let types = self.orchestrator.supported_types();

        if json {
            let entries: Vec<serde_json::Value> = types
                .iter()
                .map(|t| {
                    serde_json::json!({
                        "name": t.to_string(),
                        "keyword": t.keyword(),
                        "description": describe(*t),
                    })
                })
                .collect();
            let listing = serde_json::json!({
                "supported_types": entries,
                "total": types.len(),
            });
            return Ok(serde_json::to_string_pretty(&listing)?);
        }

        let mut lines = vec!["Supported diagram types:".to_string()];
        for t in &types {
            lines.push(format!("  {:<10} - {}", t.to_string(), describe(*t)));
        }
        lines.push(String::new());
        lines.push(format!("Total: {} diagram types supported", types.len()));
        Ok(lines.join("\n"))
    }

    fn types_command(&self, json: bool, verbose: bool) -> Result<()> {
        if verbose {
            eprintln!("Listing supported diagram types");
        }
        let listing = self.types_listing(json)?;
        self.write_output(None, &listing)
    }

    /// Read input from file or stdin
    pub fn read_input(&self, input: Option<PathBuf>) -> Result<String> {
        match input {
            Some(path) if path.to_string_lossy() != "-" => fs::read_to_string(&path)
                .map_err(|e| anyhow!("Failed to read input file '{}': {}", path.display(), e)),
            _ => {
                let mut content = String::new();
                io::stdin().read_to_string(&mut content)?;
                Ok(content)
            }
        }
    }

    /// Write output to file or stdout
    pub fn write_output(&self, output: Option<PathBuf>, content: &str) -> Result<()> {
        match output {
            Some(path) if path.to_string_lossy() != "-" => {
                fs::write(&path, content).map_err(|e| {
                    anyhow!("Failed to write output file '{}': {}", path.display(), e)
                })?;
            }
            _ => {
                let mut stdout = io::stdout().lock();
                stdout.write_all(content.as_bytes())?;
                if !content.is_empty() && !content.ends_with('\n') {
                    stdout.write_all(b"\n")?;
                }
                stdout.flush()?;
            }
        }
        Ok(())
    }
}

impl Default for DiagrammerApp {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_cli_parsing_parse_command() {
        let args = vec![
            "diagrammer",
            "parse",
            "--input",
            "test.mmd",
            "--output",
            "model.json",
        ];
        let cli = Cli::try_parse_from(args).unwrap();

        match cli.command {
            Commands::Parse { input, output } => {
                assert_eq!(input.unwrap().to_string_lossy(), "test.mmd");
                assert_eq!(output.unwrap().to_string_lossy(), "model.json");
            }
            _ => panic!("Expected Parse command"),
        }
        assert_eq!(cli.indent, 4);
        assert_eq!(cli.log_level, LogLevel::Warn);
    }

    #[test]
    fn test_cli_parsing_validate_command() {
        let args = vec!["diagrammer", "validate", "--json", "--suggest", "--color", "never"];
        let cli = Cli::try_parse_from(args).unwrap();

        match cli.command {
            Commands::Validate {
                input,
                json,
                suggest,
                color,
            } => {
                assert!(input.is_none());
                assert!(json);
                assert!(suggest);
                assert_eq!(color, ColorChoice::Never);
            }
            _ => panic!("Expected Validate command"),
        }
    }

    #[test]
    fn test_cli_parsing_global_flags() {
        let args = vec![
            "diagrammer",
            "--verbose",
            "--indent",
            "2",
            "--log-format",
            "json",
            "format",
        ];
        let cli = Cli::try_parse_from(args).unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.indent, 2);
        assert_eq!(cli.log_format, LogFormat::Json);
        assert!(matches!(cli.command, Commands::Format { .. }));
    }

    #[test]
    fn test_cli_rejects_unknown_color() {
        let args = vec!["diagrammer", "validate", "--color", "sometimes"];
        assert!(Cli::try_parse_from(args).is_err());
    }

    #[test]
    fn test_read_input_from_file() {
        let app = DiagrammerApp::new();
        let input = "graph TD; A-->B;";

        let dir = tempdir().unwrap();
        let file_path = dir.path().join("test.mmd");
        fs::write(&file_path, input).unwrap();

        let content = app.read_input(Some(file_path)).unwrap();
        assert_eq!(content, input);
    }

    #[test]
    fn test_read_missing_file() {
        let app = DiagrammerApp::new();
        let dir = tempdir().unwrap();
        let err = app.read_input(Some(dir.path().join("missing.mmd"))).unwrap_err();
        assert!(err.to_string().contains("Failed to read input file"));
    }

    #[test]
    fn test_write_output_to_file() {
        let app = DiagrammerApp::new();
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("out.mmd");

        app.write_output(Some(file_path.clone()), "flowchart TD").unwrap();
        assert_eq!(fs::read_to_string(&file_path).unwrap(), "flowchart TD");
    }

    #[test]
    fn test_parse_then_generate_through_files() {
        let app = DiagrammerApp::new();
        let dir = tempdir().unwrap();
        let model_path = dir.path().join("model.json");

        let json = app.parse_to_json("graph LR; A[Start] --> B[End]").unwrap();
        app.write_output(Some(model_path.clone()), &json).unwrap();

        let content = app.read_input(Some(model_path)).unwrap();
        let code = app.generate_from_json(&content).unwrap();
        assert_eq!(code, "flowchart LR\n    A[Start]\n    B[End]\n    A --> B");
    }

    #[test]
    fn test_format_with_indent() {
        let app = DiagrammerApp::with_config(GeneratorConfig::new().with_indent(2));
        let code = app.format_source("sequenceDiagram\nAlice->>Bob: Hi").unwrap();
        assert!(code.contains("\n  Alice->>Bob: Hi"));
    }

    #[test]
    fn test_format_unknown_type() {
        let app = DiagrammerApp::new();
        assert!(app.format_source("pie title Pets").is_err());
    }

    #[test]
    fn test_generate_rejects_bad_json() {
        let app = DiagrammerApp::new();
        assert!(app.generate_from_json("{not json").is_err());
    }

    #[test]
    fn test_validation_report_json() {
        let app = DiagrammerApp::new();
        let (is_valid, report) = app
            .validation_report("flowchart TD\n    A[Start --> B", true, true, false)
            .unwrap();
        assert!(!is_valid);

        let value: serde_json::Value = serde_json::from_str(&report).unwrap();
        assert_eq!(value["is_valid"], false);
        assert_eq!(value["diagram_type"], "flowchart");
        assert_eq!(value["errors"].as_array().unwrap().len(), 1);
        assert_eq!(value["suggestions"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_validation_report_text() {
        let app = DiagrammerApp::new();
        let (is_valid, report) = app
            .validation_report("erDiagram\n    A ||--o{ B : has", false, false, false)
            .unwrap();
        assert!(is_valid);
        assert_eq!(report, "✓ Valid erDiagram diagram");
    }

    #[test]
    fn test_types_listing() {
        let app = DiagrammerApp::new();
        let listing = app.types_listing(false).unwrap();
        assert!(listing.contains("flowchart"));
        assert!(listing.contains("Total: 5 diagram types supported"));

        let json: serde_json::Value = serde_json::from_str(&app.types_listing(true).unwrap()).unwrap();
        assert_eq!(json["total"], 5);
        assert_eq!(json["supported_types"][4]["keyword"], "erDiagram");
    }
}

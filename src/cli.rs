//! CLI: check documents against a schema, print a schema, compare two schemas.
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use anyhow::{Context, Result, anyhow, bail};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use rayon::prelude::*;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use paramschema::{Parameter, Value, decl};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// validate JSON/NDJSON documents against declarative parameter schemas
#[derive(Parser, Debug)]
#[command(name = "paramschema", version)]
pub struct CommandLineInterface {
    /// more log output (-v debug, -vv trace); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// validate every input document against a schema
    Check(CheckOut),
    /// load a schema and print its normalized form
    Schema(SchemaOut),
    /// check that one schema can stand in for another
    Compat(CompatOut),
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// treat input as newline-delimited JSON (NDJSON)
    #[arg(long, default_value_t = false)]
    ndjson: bool,

    /// JSON Pointer to select a subnode in each document (e.g. /data/items/0/payload)
    #[arg(long)]
    json_pointer: Option<String>,

    /// One or more inputs. May be literal paths or quoted glob patterns
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,
}

#[derive(clap::Parser, Debug)]
struct CheckOut {
    /// schema document (.json)
    #[arg(long)]
    schema: PathBuf,

    #[command(flatten)]
    input_settings: InputSettings,
}

#[derive(clap::Parser, Debug)]
struct SchemaOut {
    /// schema document (.json)
    #[arg(long)]
    schema: PathBuf,

    /// output .json file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

#[derive(clap::Parser, Debug)]
struct CompatOut {
    /// the schema callers rely on
    #[arg(long)]
    schema: PathBuf,

    /// the schema proposed as a substitute
    #[arg(long)]
    against: PathBuf,
}

/// One JSON document to check, labelled by where it came from.
#[derive(Debug)]
struct Document {
    label: String,
    value: serde_json::Value,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl InputSettings {
    fn load(&self) -> Result<Vec<Document>> {
        let source_paths = resolve_file_path_patterns(&self.input)
            .context("failed to resolve input file paths")?;
        let mut documents = Vec::new();
        for source_path in source_paths {
            let source_path_str = source_path.to_string_lossy().to_string();
            let source = std::fs::read_to_string(&source_path)
                .with_context(|| format!("failed to read source file {source_path_str}"))?;
            if self.ndjson {
                for (ix, line) in source.lines().enumerate() {
                    if line.trim().is_empty() {
                        continue;
                    }
                    let label = format!("{source_path_str}:{}", ix + 1);
                    documents.push(self.parse(label, line)?);
                }
            } else {
                documents.push(self.parse(source_path_str, &source)?);
            }
        }
        debug!(count = documents.len(), "loaded input documents");
        Ok(documents)
    }

    fn parse(&self, label: String, source: &str) -> Result<Document> {
        let value = serde_json::from_str::<serde_json::Value>(source)
            .with_context(|| format!("failed to parse JSON ({label})"))?;
        let value = match self.json_pointer.as_deref() {
            None => value,
            Some(pointer) => value
                .pointer(pointer)
                .cloned()
                .ok_or_else(|| anyhow!("JSON pointer {pointer} not found ({label})"))?,
        };
        Ok(Document { label, value })
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }

    /// Logs go to stderr so stdout stays machine-readable.
    pub fn init_tracing(&self) {
        let level = match self.verbose {
            0 => "warn",
            1 => "debug",
            _ => "trace",
        };
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(format!("paramschema={level}")));
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }

    pub fn run(&self) -> Result<ExitCode> {
        match &self.cmd {
            Command::Check(target) => {
                let schema = load_schema(&target.schema)?;
                let documents = target.input_settings.load()?;
                let outcomes: Vec<Result<(), paramschema::Error>> = documents
                    .par_iter()
                    .map(|doc| schema.invoke(&Value::from(doc.value.clone())).map(|_| ()))
                    .collect();
                let mut failed = 0usize;
                for (doc, outcome) in documents.iter().zip(outcomes) {
                    match outcome {
                        Ok(()) => println!("{} {}", "✅".green(), doc.label),
                        Err(error) => {
                            failed += 1;
                            println!("{} {}: {}", "❌".red(), doc.label.bold(), error);
                        }
                    }
                }
                info!(total = documents.len(), failed, "check finished");
                Ok(if failed == 0 { ExitCode::SUCCESS } else { ExitCode::FAILURE })
            }
            Command::Schema(target) => {
                let schema = load_schema(&target.schema)?;
                let schema_src = serde_json::to_string_pretty(&schema.schema())?;
                if let Some(out) = target.out.as_ref() {
                    if let Some(parent) = out.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::write(out, &schema_src)
                        .with_context(|| format!("failed to write {}", out.display()))?;
                } else {
                    println!("{schema_src}");
                }
                Ok(ExitCode::SUCCESS)
            }
            Command::Compat(target) => {
                let expected = load_schema(&target.schema)?;
                let provided = load_schema(&target.against)?;
                match expected.assert_compatible(&provided) {
                    Ok(()) => {
                        println!("{} compatible", "✅".green());
                        Ok(ExitCode::SUCCESS)
                    }
                    Err(error) => {
                        println!("{} {}", "❌".red(), error);
                        Ok(ExitCode::FAILURE)
                    }
                }
            }
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn load_schema(path: &Path) -> Result<Parameter> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read schema {}", path.display()))?;
    decl::load_str(&source).with_context(|| format!("invalid schema {}", path.display()))
}

fn resolve_file_path_patterns<I>(patterns: I) -> Result<Vec<PathBuf>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{'))
    }

    let mut out = Vec::<PathBuf>::new();

    for raw in patterns {
        let pattern = raw.as_ref();

        if has_glob_chars(pattern) {
            let mut matched_any = false;
            for entry in glob::glob(pattern)? {
                out.push(entry?);
                matched_any = true;
            }
            if !matched_any {
                bail!("glob pattern matched no files: {pattern}");
            }
        } else {
            out.push(PathBuf::from(pattern));
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_check_arguments() {
        let cli = CommandLineInterface::try_parse_from([
            "paramschema", "-vv", "check", "--schema", "s.json", "-i", "a.json", "b/*.json", "--ndjson",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        let Command::Check(check) = cli.cmd else { panic!("expected check") };
        assert!(check.input_settings.ndjson);
        assert_eq!(check.input_settings.input, vec!["a.json", "b/*.json"]);
    }

    #[test]
    fn json_pointer_selects_a_subnode() {
        let settings = InputSettings { ndjson: false, json_pointer: Some("/data/0".into()), input: vec![] };
        let doc = settings.parse("x".into(), r#"{"data": [{"id": 1}]}"#).unwrap();
        assert_eq!(doc.value, serde_json::json!({"id": 1}));
        assert!(settings.parse("y".into(), r#"{"data": []}"#).is_err());
    }

    #[test]
    fn literal_paths_pass_through_unglobbed() {
        let paths = resolve_file_path_patterns(["plain.json"]).unwrap();
        assert_eq!(paths, vec![PathBuf::from("plain.json")]);
    }
}

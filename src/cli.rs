//! Command-line arguments and the non-interactive commands
//!
//! Without a subcommand the playground opens the TUI. `compile` and
//! `examples` run the same services once and print to stdout, so the
//! compile service can be scripted against.

use crate::config::Config;
use crate::model::display::render_text;
use crate::model::{ExampleEntry, RenderMode, SourceText, Surfaces};
use crate::services::{
    CompileOrchestrator, CompileTransport, ExampleLoader, HttpTransport, LoadState,
    ResolutionPolicy,
};
use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Terminal playground for the SmickelScript compiler
#[derive(Parser, Debug)]
#[command(name = "smickel-playground")]
#[command(about = "Terminal playground for the SmickelScript compiler", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Compile service base URL
    #[arg(short, long, env = "SMICKEL_ENDPOINT")]
    pub endpoint: Option<String>,

    /// Example dataset: URL, examples.json path or directory of samples
    #[arg(long, env = "SMICKEL_EXAMPLES")]
    pub examples: Option<String>,

    /// Compile request timeout in seconds
    #[arg(short, long)]
    pub timeout: Option<u64>,

    /// Print server text without stripping escape sequences
    #[arg(long)]
    pub raw: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Command {
    /// Compile a file and print the assembly
    Compile {
        /// Source file, `-` for stdin
        file: PathBuf,
    },

    /// List the example dataset labels
    Examples,
}

impl Cli {
    /// Layer the flags over the saved config
    pub fn apply(&self, config: &mut Config) {
        if let Some(endpoint) = &self.endpoint {
            config.endpoint_base = endpoint.clone();
        }
        if let Some(examples) = &self.examples {
            config.examples = Some(examples.clone());
        }
        if let Some(secs) = self.timeout {
            config.timeout_secs = Some(secs);
        }
        if self.raw {
            config.render_mode = RenderMode::Raw;
        }
    }
}

/// The surface a one-shot compile ended on
#[derive(Debug, PartialEq)]
pub enum CompileReport {
    Output(String),
    Error(String),
}

/// Run `command` and return the process exit code
pub fn run(command: Command, config: &Config) -> Result<i32> {
    match command {
        Command::Compile { file } => {
            let source = read_source(&file)?;
            let transport = HttpTransport::new(&config.endpoint_base, config.timeout())?;
            tracing::info!(url = transport.compile_url(), file = %file.display(), "compiling");

            match compile_once(Arc::new(transport), &source, config.timeout())? {
                CompileReport::Output(asm) => {
                    println!("{}", render_text(&asm, config.render_mode));
                    Ok(0)
                }
                CompileReport::Error(detail) => {
                    eprintln!("{}", render_text(&detail, config.render_mode));
                    Ok(1)
                }
            }
        }
        Command::Examples => {
            let loader = ExampleLoader::start(config.examples_source());
            for entry in load_examples(loader, config.timeout())? {
                println!("{}", render_text(&entry.label, config.render_mode));
            }
            Ok(0)
        }
    }
}

fn read_source(file: &Path) -> Result<SourceText> {
    let text = if file.as_os_str() == "-" {
        io::read_to_string(io::stdin()).context("Failed to read source from stdin")?
    } else {
        fs::read_to_string(file)
            .with_context(|| format!("Failed to read {}", file.display()))?
    };
    Ok(SourceText::from(text))
}

/// Submit `source` once and block until the display resolves.
///
/// Transport and decoding failures become errors; a compiler error message
/// is a normal `CompileReport::Error`.
pub fn compile_once(
    transport: Arc<dyn CompileTransport>,
    source: &SourceText,
    timeout: Option<Duration>,
) -> Result<CompileReport> {
    let mut orchestrator = CompileOrchestrator::new(transport, ResolutionPolicy::default());
    let mut surfaces = Surfaces::new();
    let ticket = orchestrator.submit(source);

    let Some(resolution) = orchestrator.wait_next(&mut surfaces, timeout) else {
        if orchestrator.is_pending(ticket.id) {
            orchestrator.cancel(ticket.id);
        }
        bail!("compile request {} timed out", ticket.id);
    };
    resolution.outcome?;

    let display = &surfaces.display;
    display
        .output()
        .map(|asm| CompileReport::Output(asm.to_string()))
        .or_else(|| display.error().map(|detail| CompileReport::Error(detail.to_string())))
        .ok_or_else(|| anyhow!("compile request {} produced nothing to show", ticket.id))
}

/// Wait for the dataset fetch and return its entries in order
pub fn load_examples(
    mut loader: ExampleLoader,
    timeout: Option<Duration>,
) -> Result<Vec<ExampleEntry>> {
    let mut surfaces = Surfaces::new();
    if !loader.wait(&mut surfaces, timeout) {
        bail!("timed out loading examples");
    }
    if loader.state() == LoadState::Failed {
        bail!("could not load the example dataset; see the log for details");
    }
    Ok(surfaces.examples)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LoaderError;
    use crate::services::orchestrator::tests::{
        err_body, ok_body, FixedTransport, GatedTransport, TIMEOUT,
    };

    #[test]
    fn test_no_subcommand_opens_tui() {
        let cli = Cli::try_parse_from(["smickel-playground"]).expect("parse");
        assert_eq!(cli.command, None);
        assert!(!cli.raw);
    }

    #[test]
    fn test_compile_subcommand() {
        let cli = Cli::try_parse_from([
            "smickel-playground",
            "--endpoint",
            "https://saas.cerbus.nl/api",
            "--timeout",
            "7",
            "compile",
            "main.smk",
        ])
        .expect("parse");
        assert_eq!(
            cli.command,
            Some(Command::Compile {
                file: PathBuf::from("main.smk")
            })
        );

        let mut config = Config::default();
        cli.apply(&mut config);
        assert_eq!(config.endpoint_base, "https://saas.cerbus.nl/api");
        assert_eq!(config.timeout(), Some(Duration::from_secs(7)));
        assert_eq!(config.render_mode, RenderMode::Sanitized);
    }

    #[test]
    fn test_flags_leave_unset_fields_alone() {
        let cli = Cli::try_parse_from(["smickel-playground", "--raw", "examples"]).expect("parse");
        let mut config = Config {
            timeout_secs: Some(3),
            ..Config::default()
        };
        cli.apply(&mut config);

        assert_eq!(cli.command, Some(Command::Examples));
        assert_eq!(config.render_mode, RenderMode::Raw);
        assert_eq!(config.timeout_secs, Some(3));
        assert_eq!(config.endpoint_base, Config::default().endpoint_base);
    }

    #[test]
    fn test_compile_once_output() {
        let transport = Arc::new(FixedTransport(Ok(ok_body("main:\n  ret"))));
        let report = compile_once(transport, &SourceText::new("func main() {}"), TIMEOUT)
            .expect("compile");
        assert_eq!(report, CompileReport::Output("main:\n  ret".to_string()));
    }

    #[test]
    fn test_compile_once_compiler_error() {
        let transport = Arc::new(FixedTransport(Ok(err_body("line 1: unexpected '}'"))));
        let report = compile_once(transport, &SourceText::new("}"), TIMEOUT).expect("compile");
        assert_eq!(
            report,
            CompileReport::Error("line 1: unexpected '}'".to_string())
        );
    }

    #[test]
    fn test_compile_once_http_failure_is_error() {
        let transport = Arc::new(FixedTransport(Err(503)));
        let err = compile_once(transport, &SourceText::new("x"), TIMEOUT).unwrap_err();
        assert!(err.to_string().contains("503"), "{err}");
    }

    #[test]
    fn test_compile_once_times_out() {
        let transport = Arc::new(GatedTransport::default());
        let _gate = transport.gate("slow");
        let err = compile_once(
            transport.clone(),
            &SourceText::new("slow"),
            Some(Duration::from_millis(50)),
        )
        .unwrap_err();
        assert!(err.to_string().contains("timed out"), "{err}");
    }

    #[test]
    fn test_load_examples() {
        let loader = ExampleLoader::start_with(|| {
            Ok(vec![
                ExampleEntry::new("None", ""),
                ExampleEntry::new("fib", "func fib() {}"),
            ])
        });
        let entries = load_examples(loader, TIMEOUT).expect("examples");
        let labels: Vec<&str> = entries.iter().map(|e| e.label.as_str()).collect();
        assert_eq!(labels, vec!["None", "fib"]);
    }

    #[test]
    fn test_load_examples_failure_is_error() {
        let loader = ExampleLoader::start_with(|| Err(LoaderError::Status(404)));
        assert!(load_examples(loader, TIMEOUT).is_err());
    }

    #[test]
    fn test_read_source_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("main.smk");
        fs::write(&path, "func main() {}\n").expect("write");
        let source = read_source(&path).expect("read");
        assert_eq!(source.as_str(), "func main() {}\n");
        assert!(read_source(&dir.path().join("missing.smk")).is_err());
    }
}

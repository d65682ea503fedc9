use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use envgen_codegen::{SynthOptions, generate_file};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "envgen")]
#[command(version, about = "Generate a typed configuration module from an env declaration file")]
struct Cli {
    /// Declaration file to read
    file: PathBuf,

    /// Prefix stripped from variable names before splitting on `__`
    prefix: Option<String>,

    /// Write the module here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Path of the runtime crate used by the generated code
    #[arg(long, default_value = "envgen_runtime")]
    runtime_crate: String,

    /// Name of the generated top-level struct
    #[arg(long, default_value = "Config")]
    root_struct: String,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn setup_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("warn")
        }
    });
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn run(cli: &Cli) -> Result<()> {
    let options = SynthOptions {
        runtime_crate: cli.runtime_crate.clone(),
        root_struct: cli.root_struct.clone(),
    };
    debug!(file = %cli.file.display(), prefix = ?cli.prefix, "generating");
    let source = generate_file(&cli.file, cli.prefix.as_deref(), &options).inspect_err(|err| {
        if let Some(raw) = err.raw_output() {
            eprintln!("{raw}");
        }
    })?;

    match &cli.output {
        Some(path) => {
            std::fs::write(path, &source).with_context(|| format!("failed to write {}", path.display()))?;
            info!(path = %path.display(), "wrote configuration module");
        }
        None => print!("{source}"),
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    setup_tracing(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("envgen: {err:#}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::Cli;

    #[test]
    fn prefix_is_optional() {
        let cli = Cli::try_parse_from(["envgen", "app.env"]).unwrap();
        assert_eq!(cli.prefix, None);
        assert_eq!(cli.runtime_crate, "envgen_runtime");
        assert_eq!(cli.root_struct, "Config");

        let cli = Cli::try_parse_from(["envgen", "app.env", "APP", "-o", "config.rs", "-v"]).unwrap();
        assert_eq!(cli.prefix.as_deref(), Some("APP"));
        assert_eq!(cli.output.unwrap().to_str(), Some("config.rs"));
        assert!(cli.verbose);
    }

    #[test]
    fn file_is_required() {
        assert!(Cli::try_parse_from(["envgen"]).is_err());
    }
}

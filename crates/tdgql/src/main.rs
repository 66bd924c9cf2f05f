use std::{fs, path::PathBuf, process::ExitCode};

use anyhow::Context as _;
use clap::Parser;
use typedecl_graphql::{ast::Program, generate_sdl};

/// Generates a GraphQL SDL document from a typed declaration module.
#[derive(Debug, Parser)]
#[command(name = "tdgql", version)]
struct Args {
    /// Path to the declaration module, serialized as JSON.
    module: PathBuf,
    /// Names of the schema root interfaces. When omitted, every exported
    /// interface tagged `@graphql schema` becomes a root.
    roots: Vec<String>,
    /// Suppress diagnostic output.
    #[arg(long, short = 'q')]
    quiet: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    if !args.quiet {
        tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_writer(std::io::stderr)
            .init();
    }

    match run(&args) {
        Ok(sdl) => {
            print!("{sdl}");
            ExitCode::SUCCESS
        }
        Err(error) => {
            eprintln!("Error: {error:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> anyhow::Result<String> {
    let raw = fs::read_to_string(&args.module)
        .with_context(|| format!("could not read `{}`", args.module.display()))?;
    let program: Program = serde_json::from_str(&raw).with_context(|| {
        format!(
            "could not parse `{}` as a declaration module",
            args.module.display()
        )
    })?;

    Ok(generate_sdl(&program, &args.roots)?)
}

//! kubeyaml - Kubernetes manifest patcher
//!
//! Reads a YAML stream on stdin, updates the first matching object, and
//! writes the whole stream to stdout.

use std::io;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use kubeyaml::{parse_annotation, run, Error, MutationDirective, Selector};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "kubeyaml", version, about = "Patch Kubernetes manifests read from stdin")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Set the image of a container
    Image(ImageArgs),
    /// Add or overwrite annotations
    Annotate(AnnotateArgs),
}

/// Which object to change.
#[derive(Debug, Args)]
struct Target {
    /// Namespace of the object
    #[arg(long)]
    namespace: String,
    /// Kind of the object, matched ignoring case
    #[arg(long)]
    kind: String,
    /// Name of the object
    #[arg(long)]
    name: String,
}

#[derive(Debug, Args)]
struct ImageArgs {
    #[command(flatten)]
    target: Target,
    /// Name of the container to update
    #[arg(long)]
    container: String,
    /// New image reference
    #[arg(long)]
    image: String,
}

#[derive(Debug, Args)]
struct AnnotateArgs {
    #[command(flatten)]
    target: Target,
    /// Annotations as key=value
    #[arg(required = true, value_name = "KEY=VALUE", value_parser = parse_note)]
    notes: Vec<(String, String)>,
}

fn parse_note(arg: &str) -> Result<(String, String), String> {
    parse_annotation(arg).map_err(|e| e.to_string())
}

impl Command {
    fn into_parts(self) -> (Selector, MutationDirective) {
        match self {
            Command::Image(args) => {
                let Target {
                    namespace,
                    kind,
                    name,
                } = args.target;
                (
                    Selector::new(namespace, kind, name).with_container(args.container),
                    MutationDirective::SetImage(args.image),
                )
            }
            Command::Annotate(args) => {
                let Target {
                    namespace,
                    kind,
                    name,
                } = args.target;
                (
                    Selector::new(namespace, kind, name),
                    MutationDirective::MergeAnnotations(args.notes),
                )
            }
        }
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging();

    let (selector, directive) = cli.command.into_parts();
    let stdin = io::stdin();
    let mut stdout = io::stdout().lock();

    match run(stdin.lock(), &mut stdout, &selector, &directive) {
        Ok(_) => ExitCode::SUCCESS,
        Err(Error::NotFound) => {
            eprintln!("{}", Error::NotFound);
            ExitCode::from(2)
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

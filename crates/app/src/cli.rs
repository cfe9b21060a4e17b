//! Command-line arguments.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use graphit_domain::SubscriptionProtocol;

#[derive(Debug, Parser)]
#[command(name = "graphit")]
#[command(about = "Run GraphQL operations, stream subscriptions and tidy documents")]
#[command(version)]
pub struct Cli {
    #[arg(short, long, help = "Enable debug logging", global = true)]
    pub debug: bool,

    #[arg(
        long,
        value_name = "FILE",
        help = "Settings file (defaults to the user config directory)",
        global = true
    )]
    pub settings: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    #[command(about = "Run a query or mutation and print the result")]
    Run(RunArgs),
    #[command(about = "Open a subscription and print messages as JSON lines")]
    Subscribe(SubscribeArgs),
    #[command(about = "Fetch the schema of an endpoint by introspection")]
    Schema(SchemaArgs),
    #[command(about = "List the operations of a document")]
    Operations(OperationsArgs),
    #[command(about = "Pretty-print a document")]
    Format(DocumentArgs),
    #[command(about = "Minify a document")]
    Minify(DocumentArgs),
}

#[derive(Debug, Args)]
pub struct EnvArgs {
    #[arg(short, long, value_name = "FILE", help = "Environment file with variable values")]
    pub env: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct RunArgs {
    #[arg(value_name = "REQUEST", help = "Request definition (JSON)")]
    pub request: PathBuf,

    #[command(flatten)]
    pub env: EnvArgs,

    #[arg(short, long, help = "Operation to run when the document has several")]
    pub operation: Option<String>,

    #[arg(long, value_name = "MS", help = "Request timeout in milliseconds")]
    pub timeout: Option<u64>,

    #[arg(long, help = "Skip pre-request and post-request scripts")]
    pub no_scripts: bool,

    #[arg(long, requires = "env", help = "Write script environment overrides back to --env")]
    pub save_env: bool,
}

#[derive(Debug, Args)]
pub struct SubscribeArgs {
    #[arg(value_name = "REQUEST", help = "Request definition (JSON)")]
    pub request: PathBuf,

    #[command(flatten)]
    pub env: EnvArgs,

    #[arg(short, long, help = "Operation to run when the document has several")]
    pub operation: Option<String>,

    #[arg(short, long, help = "Transport: ws, sse or appsync")]
    pub protocol: Option<SubscriptionProtocol>,
}

#[derive(Debug, Args)]
pub struct SchemaArgs {
    #[arg(
        value_name = "REQUEST",
        help = "Request definition supplying endpoint, headers and auth",
        required_unless_present = "endpoint"
    )]
    pub request: Option<PathBuf>,

    #[arg(long, help = "Endpoint URL", conflicts_with = "request")]
    pub endpoint: Option<String>,

    #[command(flatten)]
    pub env: EnvArgs,

    #[arg(long, help = "Print the introspection result as JSON instead of SDL")]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct DocumentArgs {
    #[arg(value_name = "FILE", help = "GraphQL document; reads stdin when omitted or '-'")]
    pub file: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct OperationsArgs {
    #[command(flatten)]
    pub document: DocumentArgs,

    #[arg(long, help = "Print as JSON")]
    pub json: bool,
}

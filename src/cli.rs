use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::mapping::Variant;

#[derive(Parser, Clone, Debug)]
#[command(author, version, about, long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Server options used when no subcommand is given
    #[command(flatten)]
    pub serve: ServeArgs,
}

impl Args {
    /// The subcommand to run. Without one the server is started.
    pub fn into_command(self) -> Command {
        self.command.unwrap_or(Command::Serve(self.serve))
    }
}

#[derive(Subcommand, Clone, Debug)]
pub enum Command {
    /// Start the HTTP server
    Serve(ServeArgs),
    /// Classify a single image and print the JSON response
    Classify(ClassifyArgs),
}

#[derive(clap::Args, Clone, Debug)]
pub struct ServeArgs {
    /// Host to bind to
    #[arg(long, default_value = "localhost", env = "WASTE_HOST")]
    pub host: String,

    /// Port to listen on
    #[arg(long, short, default_value_t = 5001, env = "WASTE_PORT")]
    pub port: u16,

    #[command(flatten)]
    pub models: ModelArgs,
}

#[derive(clap::Args, Clone, Debug)]
pub struct ClassifyArgs {
    /// Model variant to run
    #[arg(long, value_enum)]
    pub variant: Variant,

    /// image path
    #[arg(long, required = true)]
    pub source: PathBuf,

    /// Pretty-print the JSON output
    #[arg(long)]
    pub pretty: bool,

    #[command(flatten)]
    pub models: ModelArgs,
}

/// Model locations. A variant without a model, or whose model fails to load,
/// is served by its mock.
#[derive(clap::Args, Clone, Debug, Default)]
pub struct ModelArgs {
    /// TrashNet ONNX model path
    #[arg(long = "trashnet-model", env = "WASTE_TRASHNET_MODEL")]
    pub trashnet_model: Option<PathBuf>,

    /// TACO ONNX model path
    #[arg(long = "taco-model", env = "WASTE_TACO_MODEL")]
    pub taco_model: Option<PathBuf>,

    /// WasteNet ONNX model path
    #[arg(long = "wastenet-model", env = "WASTE_WASTENET_MODEL")]
    pub wastenet_model: Option<PathBuf>,

    /// Replacement TrashNet labels, one per line
    #[arg(long = "trashnet-labels", env = "WASTE_TRASHNET_LABELS")]
    pub trashnet_labels: Option<PathBuf>,

    /// Replacement TACO labels, one per line
    #[arg(long = "taco-labels", env = "WASTE_TACO_LABELS")]
    pub taco_labels: Option<PathBuf>,

    /// Replacement WasteNet labels, one per line
    #[arg(long = "wastenet-labels", env = "WASTE_WASTENET_LABELS")]
    pub wastenet_labels: Option<PathBuf>,

    /// Run models on the CUDA execution provider
    #[arg(long, env = "WASTE_CUDA")]
    pub cuda: bool,
}

//! Configuration types for the server and the one-shot CLI.

use std::path::PathBuf;

use crate::cli::{ModelArgs, ServeArgs};
use crate::mapping::Variant;

/// Where one variant's model and labels come from.
#[derive(Debug, Clone, Default)]
pub struct ModelConfig {
    pub model: Option<PathBuf>,
    pub labels: Option<PathBuf>,
}

#[derive(Debug, Clone, Default)]
pub struct ModelsConfig {
    pub trashnet: ModelConfig,
    pub taco: ModelConfig,
    pub wastenet: ModelConfig,
    pub cuda: bool,
}

impl ModelsConfig {
    pub fn get(&self, variant: Variant) -> &ModelConfig {
        match variant {
            Variant::TrashNet => &self.trashnet,
            Variant::Taco => &self.taco,
            Variant::WasteNet => &self.wastenet,
        }
    }
}

impl From<ModelArgs> for ModelsConfig {
    fn from(args: ModelArgs) -> Self {
        Self {
            trashnet: ModelConfig {
                model: args.trashnet_model,
                labels: args.trashnet_labels,
            },
            taco: ModelConfig {
                model: args.taco_model,
                labels: args.taco_labels,
            },
            wastenet: ModelConfig {
                model: args.wastenet_model,
                labels: args.wastenet_labels,
            },
            cuda: args.cuda,
        }
    }
}

/// Configuration for the HTTP server
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub models: ModelsConfig,
}

impl From<ServeArgs> for ServerConfig {
    fn from(args: ServeArgs) -> Self {
        Self {
            host: args.host,
            port: args.port,
            models: args.models.into(),
        }
    }
}

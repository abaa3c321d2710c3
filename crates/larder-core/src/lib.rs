//! Shared domain types for the larder product pipeline: the canonical
//! [`Product`] record, its provenance side-map, category policy, dietary
//! tag vocabulary, and the environment/YAML configuration layers.

pub mod app_config;
pub mod category;
pub mod config;
pub mod dietary_tag;
pub mod nutrition;
pub mod product;
pub mod provenance;
pub mod slug;
pub mod sources;

pub use app_config::{AppConfig, Environment};
pub use category::Category;
pub use config::{load_app_config, load_app_config_from_env};
pub use dietary_tag::DietaryTag;
pub use nutrition::Nutrition;
pub use product::{Descriptions, Product};
pub use provenance::{DataSource, Field, Provenance, SourceTier};
pub use slug::slugify;
pub use sources::{
    load_sources, BrandSiteConfig, FallbackSite, HeaderlessLayout, SelectorSet, SourcesFile,
    SupplierConfig,
};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for environment variable {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read sources file {path}: {source}")]
    SourcesFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse sources file: {0}")]
    SourcesFileParse(#[from] serde_yaml::Error),

    #[error("sources validation failed: {0}")]
    Validation(String),
}

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("product name is required (sku: {sku:?})")]
    MissingName { sku: String },
}

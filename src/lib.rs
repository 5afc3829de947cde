pub mod batch;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod layout;
pub mod model;
pub mod palette;
pub mod render;
pub mod text_metrics;
pub mod theme;
pub mod validate;

pub use batch::{ArtifactFormat, BatchReport, artifact_slug, run_batch};
#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{Config, LayoutConfig, load_config};
pub use layout::{Geometry, compute_layout};
pub use model::{Attribute, Category, EntityDescription, FieldGroup, Identifier, MetadataDocument};
pub use render::render_svg;
pub use theme::Theme;
pub use validate::validate_entity;

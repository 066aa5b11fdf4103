//! `helmkit-core` — shared types and seams for chart values tooling.

pub mod error;
pub mod schema;
pub mod traits;
pub mod version;

pub use error::HelmKitError;
pub use schema::{AdditionalProperties, JsonSchema, SchemaType};
pub use traits::SchemaSource;
pub use version::{uses_unified_layout, ChartVersion};

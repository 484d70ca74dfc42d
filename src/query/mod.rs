//! Query construction: template resolution and the filter registry

pub mod registry;
pub mod template;

pub use registry::{FilterDefinition, FilterRegistry, RegistryError};
pub use template::{resolve, Params, ResolvedQuery, Segment, Template, TemplateError};

mod aggregate;
mod helpers;
mod merge;

pub use aggregate::SchemaAggregator;
pub use helpers::{parameters, request_body, responses, schema_ref, yamlize};
pub use merge::deep_merge;

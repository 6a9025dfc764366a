mod load;
mod types;

pub use load::{load_endpoint_doc, parse_endpoint};
pub use types::{EndpointFile, HandlerSource, MethodSpec};

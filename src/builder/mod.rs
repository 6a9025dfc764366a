mod core;

pub use core::{build_routes, BuildOptions, Registration, RoutesBuild};

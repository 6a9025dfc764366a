mod core;

pub use core::{RouteEntry, Router, RouterLike};

pub mod config;
pub mod error;
pub mod expand;
pub mod io;
pub mod model;
pub mod server;
pub mod stats;
pub mod sync;

pub use error::{DashboardError, Result};

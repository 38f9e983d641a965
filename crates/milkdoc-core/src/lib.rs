pub mod config;
pub mod error;
pub mod safety;
pub mod types;

pub use config::MilkdocConfig;
pub use error::{MilkdocError, Result};
pub use types::*;

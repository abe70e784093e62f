pub mod dependencies;
pub mod registry;
pub mod tables;
pub mod types;

pub use dependencies::*;
pub use registry::*;
pub use tables::*;
pub use types::*;

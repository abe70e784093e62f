pub mod chain;
pub mod record;
pub mod walker;

pub use chain::*;
pub use record::*;
pub use walker::*;

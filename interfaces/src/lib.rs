pub mod defs;
pub mod traits;

pub use defs::*;
pub use traits::{Filter, FilterPlugin, OutputPlugin, OutputProvider};

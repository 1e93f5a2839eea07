mod inventory;
mod plan;

pub use inventory::*;
pub use plan::*;

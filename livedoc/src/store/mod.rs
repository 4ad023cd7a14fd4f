pub mod memory;
mod storage;

pub use storage::*;

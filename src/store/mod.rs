//! History store implementations

pub mod json_file;
pub mod memory;

pub use json_file::JsonFileHistory;
pub use memory::MemoryHistory;

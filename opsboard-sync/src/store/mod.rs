//! Board stores implementing the persistence and snapshot collaborators

mod file;
mod memory;

pub use file::{BoardFormat, FileBoard};
pub use memory::MemoryBoard;

pub mod moves;
pub mod positions;

pub use moves::{GoodMove, MemoryEntry, MoveMemory};
pub use positions::PositionMemory;

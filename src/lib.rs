pub mod adapter;
pub mod compose;
pub mod core;
pub mod export;
pub mod pipeline;

pub use crate::core::model::{Block, BlockKind, Page, Word};

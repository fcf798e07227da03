pub mod collect;
pub mod export;
pub mod search;
pub mod stats;

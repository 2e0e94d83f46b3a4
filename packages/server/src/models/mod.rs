pub mod challenge;
pub mod shared;

pub mod ai;
pub mod system;

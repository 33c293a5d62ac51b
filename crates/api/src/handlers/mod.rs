pub mod generation;
pub mod system;
pub mod video;

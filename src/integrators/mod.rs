pub mod debug;
pub mod direct;
pub mod path;

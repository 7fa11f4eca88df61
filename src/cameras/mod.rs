pub mod pinhole;
pub mod thinlens;

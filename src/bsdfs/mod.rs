pub mod conductor;
pub mod dielectric;
pub mod diffuse;
pub mod microfacet;
pub mod mirror;
pub mod oren_nayar;
pub mod two_sided;

pub mod normalize;
pub mod placement;

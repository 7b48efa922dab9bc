pub mod engine;
pub mod species;
pub mod weights;

pub mod actions;
pub mod config;
pub mod error;
pub mod fixture;
pub mod model;
pub mod normalizer;
pub mod reducer;
pub mod state;
pub mod view;

pub use actions::*;
pub use error::*;
pub use model::*;
pub use normalizer::*;
pub use reducer::*;
pub use state::*;

pub mod config;
pub mod env;
pub mod fs;
pub mod math;
pub mod rng;
pub mod softmax;

pub use config::*;
pub use env::*;
pub use fs::*;
pub use math::*;
pub use rng::*;
pub use softmax::*;

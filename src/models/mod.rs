pub mod advisory;
pub mod crop;
pub mod farm;
pub mod input;
pub mod market;
pub mod prediction;

pub use advisory::*;
pub use crop::*;
pub use farm::*;
pub use input::*;
pub use market::*;
pub use prediction::*;

pub mod clock;
pub mod errors;

pub use clock::*;
pub use errors::*;

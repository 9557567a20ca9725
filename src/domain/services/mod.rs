mod error;
mod transform;

pub use error::*;
pub use transform::*;

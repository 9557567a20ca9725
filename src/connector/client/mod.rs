mod lazy;
mod mock;

pub use lazy::*;
pub use mock::*;

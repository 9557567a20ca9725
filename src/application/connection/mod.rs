mod events;
mod manager;
mod probe;

pub use events::*;
pub use manager::*;
pub use probe::*;

mod cad_client;
mod sketch_selector;

pub use cad_client::*;
pub use sketch_selector::*;

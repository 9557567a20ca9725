mod collect_sketches;
mod deliver_sketch;

pub use collect_sketches::*;
pub use deliver_sketch::*;

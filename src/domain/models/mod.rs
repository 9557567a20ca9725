mod backend;
mod document;
mod sketch_info;
mod transform;

pub use backend::*;
pub use document::*;
pub use sketch_info::*;
pub use transform::*;

mod position;

pub use position::{Campus, Position};

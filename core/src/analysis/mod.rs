pub use constraints::*;
pub use risk::*;

mod constraints;
mod risk;

//! Print head: the carriage and the pen it carries.

pub mod carriage;
pub mod pen;

pub use carriage::Carriage;
pub use pen::{Pen, PenSettings};

pub mod catalog;
pub mod view;

pub use catalog::*;
pub use view::*;

pub mod controller;
pub mod fetch;
pub mod surface;

pub use controller::*;
pub use fetch::*;
pub use surface::*;

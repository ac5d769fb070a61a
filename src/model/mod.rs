pub mod request;
pub mod term;

pub use request::*;
pub use term::*;

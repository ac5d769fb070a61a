pub mod auth;
pub mod mutate;
pub mod orchestrate;
pub mod vocabulary;
pub mod weighting;

pub use auth::*;
pub use mutate::*;
pub use orchestrate::*;
pub use vocabulary::*;
pub use weighting::*;

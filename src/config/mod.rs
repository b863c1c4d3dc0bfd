mod data;
mod model;
mod service;

pub use data::*;
pub use model::*;
pub use service::*;

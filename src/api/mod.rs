pub mod server;
pub mod types;

pub use server::routes;
pub use types::{ErrorResponse, PredictRequest};

mod client;
mod error;
mod gateway;

pub use client::ApiClient;
pub use error::{ApiError, ApiResult};
pub use gateway::{ActionGateway, ActionRequest, ActionResponse};

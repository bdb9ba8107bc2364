mod app;
mod config;
mod fetch;
mod validation;

#[cfg(test)]
mod test_support;

pub use app::{AppError, AppResult};
pub use config::ConfigError;
pub use fetch::{FetchCause, LoaderError};
pub use validation::ValidationError;

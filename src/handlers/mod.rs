//! Appender builders and associated traits.
//!
//! Builders validate user supplied options before any socket is touched and
//! return handlers ready for registration with a
//! [`LogioLogger`](crate::LogioLogger).

use thiserror::Error;

use crate::handler::LogioHandler;

pub mod logio_builder;

pub use logio_builder::LogioAppenderBuilder;

/// Errors that may occur while building a handler.
#[derive(Debug, Error)]
pub enum HandlerBuildError {
    /// Invalid user supplied configuration.
    #[error("invalid handler configuration: {0}")]
    InvalidConfig(String),
}

/// Trait implemented by all handler builders.
pub trait HandlerBuilderTrait: Send + Sync {
    type Handler: LogioHandler + 'static;

    /// Build the concrete handler.
    fn build_inner(&self) -> Result<Self::Handler, HandlerBuildError>;

    /// Build the handler boxed as a trait object.
    fn build(&self) -> Result<Box<dyn LogioHandler>, HandlerBuildError> {
        Ok(Box::new(self.build_inner()?))
    }
}

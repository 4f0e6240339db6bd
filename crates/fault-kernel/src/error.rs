use fault_config::ConfigError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum KernelError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("trace id must not be empty")]
    EmptyTraceId,
}

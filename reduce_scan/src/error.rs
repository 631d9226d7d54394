use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Failures surfaced by the device layer, the engines and the tasks.
///
/// Setup failures abort initialisation. Launch, transfer and
/// synchronisation failures are fatal for the whole run and are never
/// retried. Result mismatches are not errors at all; the validation harness
/// records them per variant.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to allocate a device buffer of {len} elements: {reason}")]
    Allocation { len: usize, reason: String },

    #[error("failed to create kernel {kernel}: {reason}")]
    KernelCreation { kernel: &'static str, reason: String },

    #[error("resources have not been initialized")]
    NotInitialized,

    #[error("failed to launch {kernel}: {reason}")]
    Launch { kernel: &'static str, reason: String },

    #[error("device transfer failed: {0}")]
    Transfer(String),

    #[error("failed to drain the command queue: {0}")]
    Sync(String),

    #[cfg(feature = "cuda")]
    #[error(transparent)]
    Cuda(#[from] cust::error::CudaError),
}

impl Error {
    /// Whether this error belongs to resource setup rather than to a run.
    pub fn is_setup(&self) -> bool {
        matches!(
            self,
            Error::InvalidConfig(_)
                | Error::Allocation { .. }
                | Error::KernelCreation { .. }
                | Error::NotInitialized
        )
    }

    pub(crate) fn launch(kernel: kernel_abi::Kernel, reason: impl Into<String>) -> Self {
        Error::Launch {
            kernel: kernel.entry_point(),
            reason: reason.into(),
        }
    }
}

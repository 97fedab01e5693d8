pub mod backend;

pub use backend::{NullBackend, NullStats};

use easel_core::{Context, CoreError, Settings};

/// A context running on the null backend.
pub fn new_context(settings: Settings) -> Result<Context, CoreError> {
    Context::new(NullBackend::new(), settings)
}

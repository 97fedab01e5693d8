pub mod backend;
pub mod config;
pub mod context;
pub mod error;
pub mod executor;
pub mod leak;
pub mod queue;
pub mod registry;
pub mod sampler_cache;
pub mod slab;
pub mod validate;

mod passes;
mod resources;

pub use backend::{Backend, BackendInfo};
pub use config::{default_config_path, EaselConfig, LoggingConfig, Settings};
pub use context::Context;
pub use error::{BackendError, CoreError};
pub use leak::{LeakReport, LeakTracker, LeakTracking, LeakedHandle};
pub use registry::{CountedRef, HandleRecord, HandleRegistry, PassTarget, Payload, RefCount};

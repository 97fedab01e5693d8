pub mod handle;
pub mod desc;
pub mod command;
pub mod event;
pub mod error;

pub use command::Command;
pub use error::{DescError, PassError};
pub use event::{Event, EventSource, NativeSurface};
pub use handle::{
    Buffer, Compute, Handle, HandleKind, Pass, Pipeline, Program, Sampler, Swapchain, Texture,
    Timer,
};

use easel_protocol::desc::{TextureEditDesc, TextureOrigin};
use easel_protocol::{Buffer, Command, Handle, Texture, Timer};
use serde::Serialize;

use crate::config::Settings;
use crate::error::BackendError;
use crate::registry::{HandleRecord, HandleRegistry};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BackendInfo {
    pub description: String,
    pub gpu_memory_in_bytes: u64,
}

/// The operation table a concrete graphics backend fills in.
///
/// The context owns all bookkeeping (handles, reference counts, queues,
/// validation). A backend only turns commands into native work, in the
/// order the context hands them over, and destroys native objects when a
/// handle is finalized.
pub trait Backend: Send {
    /// Brings up the native device. Called once by `Context::new`.
    fn init(&mut self, settings: &Settings) -> Result<(), BackendError>;

    fn name(&self) -> &'static str;

    fn texture_origin(&self) -> TextureOrigin;

    fn info(&self) -> BackendInfo;

    /// Performs the native work of a non-destructive command. Handles the
    /// command refers to are resolved through `registry`.
    fn execute(&mut self, registry: &HandleRegistry, command: &Command);

    /// Destroys the native object behind a handle whose last reference is gone.
    fn release(&mut self, handle: Handle, record: &HandleRecord);

    /// Copies buffer contents starting at `offset` into `out`.
    fn buffer_read(&mut self, buffer: Buffer, offset: usize, out: &mut [u8]);

    /// Copies the region described by `desc` into `desc.bytes`.
    fn texture_read(&mut self, texture: Texture, desc: &mut TextureEditDesc);

    /// GPU time between a timer's begin and end, in nanoseconds, once available.
    fn timer_elapsed(&mut self, timer: Timer) -> Option<u64>;

    fn texture_native_handle(&self, texture: Texture) -> u64;

    /// Releases the native device. Called once at context teardown.
    fn dispose(&mut self);
}

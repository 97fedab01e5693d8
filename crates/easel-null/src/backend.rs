use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use easel_core::{Backend, BackendError, BackendInfo, HandleRecord, HandleRegistry, Settings};
use easel_protocol::desc::{TextureEditDesc, TextureOrigin};
use easel_protocol::{Buffer, Command, Handle, Texture, Timer};
use tracing::{debug, info, trace};

/// Counters kept by a [`NullBackend`], shared so they stay readable once
/// the backend has been moved into a context.
#[derive(Debug, Default)]
pub struct NullStats {
    commands_executed: AtomicU64,
    handles_released: AtomicU64,
    presents: AtomicU64,
}

impl NullStats {
    pub fn commands_executed(&self) -> u64 {
        self.commands_executed.load(Ordering::Relaxed)
    }

    pub fn handles_released(&self) -> u64 {
        self.handles_released.load(Ordering::Relaxed)
    }

    pub fn presents(&self) -> u64 {
        self.presents.load(Ordering::Relaxed)
    }
}

/// Backend that performs no GPU work. Reads return zeroes and timers never
/// produce a result.
pub struct NullBackend {
    stats: Arc<NullStats>,
    description: String,
}

impl NullBackend {
    pub fn new() -> Self {
        Self {
            stats: Arc::new(NullStats::default()),
            description: String::new(),
        }
    }

    pub fn stats(&self) -> Arc<NullStats> {
        self.stats.clone()
    }
}

impl Default for NullBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl Backend for NullBackend {
    fn init(&mut self, settings: &Settings) -> Result<(), BackendError> {
        self.description = "null".to_string();
        info!(
            "null backend initialised (deferred={})",
            settings.defer_api_calls
        );
        Ok(())
    }

    fn name(&self) -> &'static str {
        "null"
    }

    fn texture_origin(&self) -> TextureOrigin {
        TextureOrigin::TopLeft
    }

    fn info(&self) -> BackendInfo {
        BackendInfo {
            description: self.description.clone(),
            gpu_memory_in_bytes: 0,
        }
    }

    fn execute(&mut self, _registry: &HandleRegistry, command: &Command) {
        self.stats.commands_executed.fetch_add(1, Ordering::Relaxed);
        if let Command::SwapchainPresent(_) = command {
            self.stats.presents.fetch_add(1, Ordering::Relaxed);
        }
        trace!("null: {}", command.name());
    }

    fn release(&mut self, handle: Handle, record: &HandleRecord) {
        self.stats.handles_released.fetch_add(1, Ordering::Relaxed);
        trace!("null: release {} {}", record.kind(), handle);
    }

    fn buffer_read(&mut self, _buffer: Buffer, _offset: usize, out: &mut [u8]) {
        out.fill(0);
    }

    fn texture_read(&mut self, _texture: Texture, desc: &mut TextureEditDesc) {
        desc.bytes.fill(0);
    }

    fn timer_elapsed(&mut self, _timer: Timer) -> Option<u64> {
        None
    }

    fn texture_native_handle(&self, _texture: Texture) -> u64 {
        0
    }

    fn dispose(&mut self) {
        debug!(
            "null backend disposed: {} commands executed, {} handles released, {} presents",
            self.stats.commands_executed(),
            self.stats.handles_released(),
            self.stats.presents()
        );
    }
}

//! Shared test helpers: a backend that records the work it is handed.

#![allow(dead_code)]

use std::sync::Arc;

use easel_core::{
    Backend, BackendError, BackendInfo, Context, HandleRecord, HandleRegistry, LeakTracking,
    Settings,
};
use easel_protocol::desc::{Size, TextureDesc, TextureEditDesc, TextureOrigin};
use easel_protocol::{Buffer, Command, Handle, Texture, Timer};
use parking_lot::Mutex;

pub type Log = Arc<Mutex<Vec<String>>>;

/// Logs `execute` calls by command name and `release` calls as `release:<kind>`.
pub struct RecordingBackend {
    log: Log,
}

impl RecordingBackend {
    pub fn new() -> (Self, Log) {
        let log: Log = Arc::new(Mutex::new(Vec::new()));
        (Self { log: log.clone() }, log)
    }
}

impl Backend for RecordingBackend {
    fn init(&mut self, _settings: &Settings) -> Result<(), BackendError> {
        Ok(())
    }

    fn name(&self) -> &'static str {
        "recording"
    }

    fn texture_origin(&self) -> TextureOrigin {
        TextureOrigin::BottomLeft
    }

    fn info(&self) -> BackendInfo {
        BackendInfo {
            description: "recording".to_string(),
            gpu_memory_in_bytes: 0,
        }
    }

    fn execute(&mut self, _registry: &HandleRegistry, command: &Command) {
        self.log.lock().push(command.name().to_string());
    }

    fn release(&mut self, _handle: Handle, record: &HandleRecord) {
        self.log.lock().push(format!("release:{}", record.kind()));
    }

    fn buffer_read(&mut self, _buffer: Buffer, _offset: usize, out: &mut [u8]) {
        out.fill(0xAB);
    }

    fn texture_read(&mut self, _texture: Texture, desc: &mut TextureEditDesc) {
        desc.bytes.fill(0xCD);
    }

    fn timer_elapsed(&mut self, _timer: Timer) -> Option<u64> {
        Some(1_000)
    }

    fn texture_native_handle(&self, texture: Texture) -> u64 {
        texture.handle().index as u64 + 1
    }

    fn dispose(&mut self) {
        self.log.lock().push("dispose".to_string());
    }
}

pub fn settings(defer: bool) -> Settings {
    Settings {
        defer_api_calls: defer,
        leak_tracking: LeakTracking::Origin,
        ..Settings::default()
    }
}

pub fn make_context(defer: bool) -> (Context, Log) {
    let (backend, log) = RecordingBackend::new();
    let ctx = Context::new(backend, settings(defer)).expect("context init");
    (ctx, log)
}

pub fn entries(log: &Log) -> Vec<String> {
    log.lock().clone()
}

pub fn count(log: &Log, entry: &str) -> usize {
    log.lock().iter().filter(|e| e.as_str() == entry).count()
}

pub fn render_target(ctx: &Context, width: u32, height: u32) -> Texture {
    render_target_with_mips(ctx, width, height, 1)
}

pub fn render_target_with_mips(ctx: &Context, width: u32, height: u32, mipmaps: u32) -> Texture {
    ctx.texture_new(TextureDesc {
        size: Size::new(width, height),
        mipmaps,
        render_target: true,
        ..TextureDesc::default()
    })
}

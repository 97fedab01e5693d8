//! Integration test: null backend
//!
//! Drives a full context over the null backend and checks that no GPU work
//! is simulated beyond counting.

use easel_core::{LeakTracking, Settings};
use easel_null::{new_context, NullBackend};
use easel_protocol::desc::{
    Access, BufferDesc, BufferKind, PixelFormat, Size, TextureDesc, TextureEditDesc, TextureOrigin,
    Usage,
};
use easel_protocol::NativeSurface;

#[test]
fn test_context_reports_null_backend() {
    let ctx = new_context(Settings::default()).expect("null backend never fails");
    assert_eq!(ctx.name(), "null");
    assert_eq!(ctx.texture_origin(), TextureOrigin::TopLeft);
    let info = ctx.info();
    assert_eq!(info.description, "null");
    assert_eq!(info.gpu_memory_in_bytes, 0);
}

#[test]
fn test_reads_return_zeroes() {
    let ctx = new_context(Settings::default()).expect("context");
    let buffer = ctx.buffer_new(BufferDesc {
        usage: Some(Usage::Dynamic),
        access: Access::READ_WRITE,
        ..BufferDesc::new(BufferKind::Vertex, 8)
    });
    let mut out = [0xFFu8; 8];
    ctx.buffer_read(buffer, 0, &mut out);
    assert_eq!(out, [0; 8]);

    let texture = ctx.texture_new(TextureDesc {
        size: Size::new(2, 2),
        format: PixelFormat::Rgba8,
        ..TextureDesc::default()
    });
    let mut edit = TextureEditDesc {
        width: 2,
        height: 2,
        bytes: vec![7; 16],
        ..TextureEditDesc::default()
    };
    ctx.texture_read(texture, &mut edit);
    assert!(edit.bytes.iter().all(|b| *b == 0));

    let timer = ctx.timer_new();
    assert_eq!(ctx.timer_elapsed(timer), None);
    assert_eq!(ctx.texture_native_handle(texture), 0);
}

#[test]
fn test_stats_count_executed_and_released() {
    let backend = NullBackend::new();
    let stats = backend.stats();
    let settings = Settings {
        defer_api_calls: true,
        leak_tracking: LeakTracking::Count,
        ..Settings::default()
    };
    let ctx = easel_core::Context::new(backend, settings).expect("context");

    let swapchain = ctx.swapchain_new(320, 240, NativeSurface::default());
    let buffer = ctx.buffer_new(BufferDesc::new(BufferKind::Index, 12));
    ctx.buffer_free(buffer);
    assert_eq!(stats.commands_executed(), 0);

    ctx.swapchain_present(swapchain);
    assert_eq!(stats.commands_executed(), 3);
    assert_eq!(stats.handles_released(), 1);
    assert_eq!(stats.presents(), 1);

    ctx.swapchain_free(swapchain);
    let report = ctx.dispose();
    assert!(report.is_empty());
    // the queued swapchain free was settled without backend work
    assert_eq!(stats.handles_released(), 1);
}

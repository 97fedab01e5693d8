//! Integration test: passes
//!
//! Offscreen attachment size validation, attachment ownership, pass
//! submission order in both modes, recording contracts and the sampler
//! cache behind texture binds.

mod common;

use common::{count, entries, make_context, render_target, render_target_with_mips, RecordingBackend};
use easel_core::{Context, Settings};
use easel_protocol::desc::{
    Access, AttachmentSlot, BufferDesc, BufferKind, ClearDesc, DrawDesc, PassAttachment,
    PassOffscreenDesc, SamplerDesc, Shader, Size, TextureDesc, TextureFilter, Usage,
};
use easel_protocol::{NativeSurface, PassError};

fn two_color_desc(
    first: easel_protocol::Texture,
    second: easel_protocol::Texture,
    second_level: u32,
) -> PassOffscreenDesc {
    let mut desc = PassOffscreenDesc::default();
    desc.color[0] = PassAttachment::new(first, 0);
    desc.color[1] = PassAttachment::new(second, second_level);
    desc
}

#[test]
fn test_mismatched_attachments_are_rejected() {
    let (ctx, log) = make_context(false);
    let a = render_target(&ctx, 256, 256);
    let b = render_target(&ctx, 128, 128);

    let result = ctx.try_pass_offscreen_new(two_color_desc(a, b, 0));
    assert_eq!(
        result,
        Err(PassError::AttachmentSizeMismatch {
            slot: AttachmentSlot::Color(1),
            width: 128,
            height: 128,
            expected_width: 256,
            expected_height: 256,
        })
    );
    // nothing allocated, nothing retained
    assert_eq!(ctx.leak_tracker().live_count(), 2);
    assert_eq!(ctx.ref_count(a), Some(1));
    assert_eq!(count(&log, "pass_offscreen_new"), 0);
}

#[test]
fn test_mip_level_is_applied_before_comparing() {
    let (ctx, _log) = make_context(false);
    let a = render_target(&ctx, 256, 256);
    let half = render_target_with_mips(&ctx, 256, 256, 2);
    assert!(ctx.try_pass_offscreen_new(two_color_desc(a, half, 1)).is_err());

    let big = render_target_with_mips(&ctx, 512, 512, 2);
    let pass = ctx
        .try_pass_offscreen_new(two_color_desc(a, big, 1))
        .expect("attachments resolve to 256x256");
    assert_eq!(ctx.pass_size(pass), Size::new(256, 256));
    assert_eq!(ctx.pass_offscreen_desc(pass).color[1].level, 1);
}

#[test]
#[should_panic(expected = "resolves to 128x128, expected 256x256")]
fn test_pass_offscreen_new_panics_on_mismatch() {
    let (ctx, _log) = make_context(false);
    let a = render_target(&ctx, 256, 256);
    let b = render_target(&ctx, 128, 128);
    ctx.pass_offscreen_new(two_color_desc(a, b, 0));
}

#[test]
fn test_depth_attachment_must_match_colors() {
    let (ctx, _log) = make_context(false);
    let color = render_target(&ctx, 64, 64);
    let depth = render_target(&ctx, 32, 64);
    let mut desc = PassOffscreenDesc::default();
    desc.color[0] = PassAttachment::new(color, 0);
    desc.depth_stencil = PassAttachment::new(depth, 0);

    match ctx.try_pass_offscreen_new(desc) {
        Err(PassError::AttachmentSizeMismatch { slot, .. }) => {
            assert_eq!(slot, AttachmentSlot::DepthStencil)
        }
        other => panic!("expected a size mismatch, got {:?}", other),
    }
}

#[test]
fn test_attachments_must_be_render_targets() {
    let (ctx, _log) = make_context(false);
    let plain = ctx.texture_new(TextureDesc {
        size: Size::new(16, 16),
        ..TextureDesc::default()
    });
    let mut desc = PassOffscreenDesc::default();
    desc.color[0] = PassAttachment::new(plain, 0);
    assert_eq!(
        ctx.try_pass_offscreen_new(desc),
        Err(PassError::NotRenderTarget {
            slot: AttachmentSlot::Color(0)
        })
    );
    assert_eq!(
        ctx.try_pass_offscreen_new(PassOffscreenDesc::default()),
        Err(PassError::NoAttachments)
    );
}

#[test]
fn test_pass_free_releases_attachments() {
    let (ctx, log) = make_context(false);
    let color = render_target(&ctx, 128, 128);
    let mut desc = PassOffscreenDesc::default();
    desc.color[0] = PassAttachment::new(color, 0);
    let pass = ctx.pass_offscreen_new(desc);
    assert_eq!(ctx.ref_count(color), Some(2));

    ctx.texture_free(color);
    assert!(ctx.is_alive(color));

    ctx.pass_free(pass);
    assert!(!ctx.is_alive(color));
    let log = entries(&log);
    assert_eq!(&log[log.len() - 2..], ["release:raster_pass", "release:texture"]);
    assert_eq!(ctx.leak_tracker().live_count(), 0);
}

#[test]
fn test_submit_wraps_recorded_commands() {
    let (ctx, log) = make_context(false);
    let swapchain = ctx.swapchain_new(640, 480, NativeSurface::default());
    let pass = ctx.pass_swapchain_new(swapchain);
    ctx.clear(pass, ClearDesc::default());
    ctx.scissor(pass, 0, 0, 10, 10);
    ctx.draw(pass, DrawDesc::default());
    assert_eq!(count(&log, "pass_clear"), 0);

    ctx.pass_submit(pass);
    assert_eq!(
        entries(&log)[2..],
        ["pass_begin", "pass_clear", "scissor", "draw", "pass_end"]
    );

    // the sublist is consumed by a submit
    ctx.pass_submit(pass);
    assert_eq!(count(&log, "pass_clear"), 1);
    assert_eq!(count(&log, "pass_begin"), 2);
}

#[test]
fn test_deferred_submit_splices_into_global_queue() {
    let (ctx, log) = make_context(true);
    let pass = ctx.pass_compute_new();
    let compute = ctx.compute_new(Default::default());
    ctx.use_compute(pass, compute);
    ctx.dispatch(pass, 8, 8, 1);
    ctx.pass_submit(pass);
    ctx.compute_free(compute);
    assert_eq!(ctx.pending_commands(), 7);

    ctx.flush();
    assert_eq!(
        entries(&log),
        vec![
            "pass_compute_new",
            "compute_new",
            "pass_begin",
            "use_compute",
            "dispatch",
            "pass_end",
            "release:compute",
        ]
    );
}

#[test]
fn test_writes_on_null_pass_are_processed_directly() {
    let (ctx, log) = make_context(true);
    let buffer = ctx.buffer_new(BufferDesc {
        usage: Some(Usage::Dynamic),
        access: Access::WRITE,
        ..BufferDesc::new(BufferKind::Vertex, 64)
    });
    ctx.buffer_write(ctx.global_pass(), buffer, 0, &[1, 2, 3, 4]);
    ctx.buffer_zero(ctx.global_pass(), buffer);
    assert_eq!(ctx.pending_commands(), 3);

    ctx.flush();
    assert_eq!(entries(&log), vec!["buffer_new", "buffer_write", "buffer_clear"]);
}

#[test]
#[should_panic(expected = "has static usage")]
fn test_write_to_static_buffer_is_rejected() {
    let (ctx, _log) = make_context(false);
    let buffer = ctx.buffer_new(BufferDesc::new(BufferKind::Vertex, 16));
    ctx.buffer_write(ctx.global_pass(), buffer, 0, &[0; 16]);
}

#[test]
#[should_panic(expected = "expected a raster_pass handle, got a compute_pass handle")]
fn test_raster_command_on_compute_pass_is_rejected() {
    let (ctx, _log) = make_context(false);
    let pass = ctx.pass_compute_new();
    ctx.clear(pass, ClearDesc::default());
}

#[test]
#[should_panic(expected = "expected a compute_pass handle, got a raster_pass handle")]
fn test_dispatch_on_raster_pass_is_rejected() {
    let (ctx, _log) = make_context(false);
    let swapchain = ctx.swapchain_new(64, 64, NativeSurface::default());
    let pass = ctx.pass_swapchain_new(swapchain);
    ctx.dispatch(pass, 1, 1, 1);
}

#[test]
#[should_panic(expected = "it has no meaning to bind a buffer")]
fn test_compute_bind_needs_gpu_access() {
    let (ctx, _log) = make_context(false);
    let pass = ctx.pass_compute_new();
    let buffer = ctx.buffer_new(BufferDesc::new(BufferKind::Compute, 64));
    ctx.buffer_compute_bind(pass, buffer, 0, Access::empty());
}

#[test]
#[should_panic(expected = "read only textures are bound as samplers")]
fn test_read_only_compute_texture_must_use_mip_zero() {
    let (ctx, _log) = make_context(false);
    let pass = ctx.pass_compute_new();
    let texture = render_target_with_mips(&ctx, 64, 64, 4);
    ctx.texture_compute_bind(pass, texture, 0, 1, Access::READ);
}

#[test]
fn test_compute_texture_write_may_use_any_mip() {
    let (ctx, log) = make_context(false);
    let pass = ctx.pass_compute_new();
    let texture = render_target_with_mips(&ctx, 64, 64, 4);
    ctx.texture_compute_bind(pass, texture, 0, 2, Access::WRITE);
    ctx.pass_submit(pass);
    assert_eq!(count(&log, "texture_compute_bind"), 1);
}

#[test]
fn test_equal_samplers_are_deduplicated() {
    let (ctx, log) = make_context(false);
    let swapchain = ctx.swapchain_new(64, 64, NativeSurface::default());
    let pass = ctx.pass_swapchain_new(swapchain);
    let a = render_target(&ctx, 16, 16);
    let b = render_target(&ctx, 16, 16);
    ctx.texture_bind(pass, a, Shader::Pixel, 0);
    ctx.texture_bind(pass, b, Shader::Pixel, 1);
    ctx.pass_submit(pass);

    assert_eq!(count(&log, "sampler_new"), 1);
    assert_eq!(count(&log, "texture_bind"), 2);
    assert_eq!(count(&log, "release:sampler"), 0);
}

#[test]
fn test_evicted_sampler_outlives_pending_binds() {
    let (backend, log) = RecordingBackend::new();
    let settings = Settings {
        sampler_cache_size: 1,
        ..Settings::default()
    };
    let ctx = Context::new(backend, settings).expect("context init");
    let pass = ctx.pass_compute_new();
    let texture = render_target(&ctx, 16, 16);

    let point = SamplerDesc {
        filter: TextureFilter::Point,
        ..SamplerDesc::default()
    };
    ctx.texture_sampler_bind(pass, texture, Shader::Compute, 0, SamplerDesc::default());
    ctx.texture_sampler_bind(pass, texture, Shader::Compute, 1, point);
    // the first sampler was evicted but a recorded bind still uses it
    assert_eq!(count(&log, "release:sampler"), 0);

    ctx.pass_submit(pass);
    assert_eq!(count(&log, "sampler_new"), 2);
    assert_eq!(count(&log, "release:sampler"), 1);
}

#[test]
fn test_freeing_unsubmitted_pass_discards_its_commands() {
    let (ctx, log) = make_context(false);
    let swapchain = ctx.swapchain_new(64, 64, NativeSurface::default());
    let pass = ctx.pass_swapchain_new(swapchain);
    let texture = render_target(&ctx, 16, 16);
    ctx.clear(pass, ClearDesc::default());
    ctx.texture_bind(pass, texture, Shader::Pixel, 0);
    ctx.pass_free(pass);

    assert_eq!(count(&log, "pass_clear"), 0);
    assert_eq!(count(&log, "texture_bind"), 0);
    assert!(!ctx.is_alive(pass));
    ctx.swapchain_free(swapchain);
    ctx.texture_free(texture);
    assert!(ctx.dispose().is_empty());
}

//! The scripted demo: one swapchain pass sampling an offscreen render
//! target, driven by window events until the window closes.

use std::time::Duration;

use bytemuck::{Pod, Zeroable};
use easel_core::{Context, LeakReport};
use easel_protocol::desc::{
    BufferDesc, BufferKind, ClearDesc, ClearFlags, DrawDesc, PassAttachment, PassOffscreenDesc,
    PipelineDesc, ProgramDesc, SamplerDesc, Shader, Size, TextureDesc, TextureFilter, VertexInput,
};
use easel_protocol::{Event, EventSource};
use serde::Serialize;
use tracing::{debug, info};

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct Vertex {
    position: [f32; 2],
    uv: [f32; 2],
}

const TRIANGLE: [Vertex; 3] = [
    Vertex {
        position: [-1.0, -1.0],
        uv: [0.0, 1.0],
    },
    Vertex {
        position: [3.0, -1.0],
        uv: [2.0, 1.0],
    },
    Vertex {
        position: [-1.0, 3.0],
        uv: [0.0, -1.0],
    },
];

const OFFSCREEN_SIZE: u32 = 256;
const CHECKER_SIZE: u32 = 4;

#[derive(Debug, Clone)]
pub struct DemoOptions {
    pub frames: u32,
    pub width: u32,
    pub height: u32,
    /// Sleep between frames, zero to run flat out
    pub frame_interval: Duration,
}

impl Default for DemoOptions {
    fn default() -> Self {
        Self {
            frames: 60,
            width: 640,
            height: 480,
            frame_interval: Duration::ZERO,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DemoSummary {
    pub frames_rendered: u32,
    pub resizes: u32,
    pub closed_by_window: bool,
    pub final_size: Size,
    pub leaks: LeakReport,
}

fn checker(size: u32) -> Vec<u8> {
    (0..size * size)
        .flat_map(|i| {
            let (x, y) = (i % size, i / size);
            if (x + y) % 2 == 0 {
                [255, 255, 255, 255]
            } else {
                [32, 32, 32, 255]
            }
        })
        .collect()
}

fn fullscreen_draw(vertices: easel_protocol::Buffer) -> DrawDesc {
    DrawDesc {
        elements_count: TRIANGLE.len(),
        instances_count: 1,
        vertex_buffers: vec![VertexInput {
            buffer: vertices,
            offset: 0,
            stride: std::mem::size_of::<Vertex>(),
        }],
        ..DrawDesc::default()
    }
}

/// Runs the demo on `ctx` and disposes it, returning what happened.
pub fn run(ctx: Context, window: &mut impl EventSource, options: &DemoOptions) -> DemoSummary {
    let swapchain = ctx.swapchain_new(options.width, options.height, window.native_surface());
    let screen = ctx.pass_swapchain_new(swapchain);

    let vertices = ctx.buffer_new(BufferDesc::with_data(
        BufferKind::Vertex,
        bytemuck::cast_slice(&TRIANGLE).to_vec(),
    ));
    let program = ctx.program_new(ProgramDesc {
        vertex: b"fullscreen.vert".to_vec(),
        pixel: b"textured.frag".to_vec(),
        geometry: None,
    });
    let pipeline = ctx.pipeline_new(PipelineDesc::new(program));
    // the pipeline keeps the program alive
    ctx.program_free(program);

    let target = ctx.texture_new(TextureDesc {
        size: Size::new(OFFSCREEN_SIZE, OFFSCREEN_SIZE),
        render_target: true,
        ..TextureDesc::default()
    });
    let mut attachments = PassOffscreenDesc::default();
    attachments.color[0] = PassAttachment::new(target, 0);
    let offscreen = ctx.pass_offscreen_new(attachments);

    let pattern = ctx.texture_new(TextureDesc {
        size: Size::new(CHECKER_SIZE, CHECKER_SIZE),
        data: vec![checker(CHECKER_SIZE)],
        sampler: SamplerDesc {
            filter: TextureFilter::Point,
            ..SamplerDesc::default()
        },
        ..TextureDesc::default()
    });

    let clear = ClearDesc {
        flags: ClearFlags::all(),
        color: [0.1, 0.1, 0.12, 1.0],
        depth: 1.0,
        stencil: 0,
    };

    let mut summary = DemoSummary {
        frames_rendered: 0,
        resizes: 0,
        closed_by_window: false,
        final_size: Size::new(options.width, options.height),
        leaks: LeakReport::default(),
    };

    'frames: for frame in 0..options.frames {
        while let Some(event) = window.poll() {
            match event {
                Event::Resize { width, height } => {
                    ctx.swapchain_resize(swapchain, width, height);
                    summary.resizes += 1;
                }
                Event::WindowClose => {
                    summary.closed_by_window = true;
                    break 'frames;
                }
                other => debug!("frame {}: ignoring {:?}", frame, other),
            }
        }

        ctx.clear(offscreen, clear);
        ctx.use_pipeline(offscreen, pipeline);
        ctx.texture_bind(offscreen, pattern, Shader::Pixel, 0);
        ctx.draw(offscreen, fullscreen_draw(vertices));
        ctx.pass_submit(offscreen);

        ctx.clear(screen, clear);
        ctx.use_pipeline(screen, pipeline);
        ctx.texture_bind(screen, target, Shader::Pixel, 0);
        ctx.draw(screen, fullscreen_draw(vertices));
        ctx.pass_submit(screen);

        ctx.swapchain_present(swapchain);
        summary.frames_rendered += 1;

        if !options.frame_interval.is_zero() {
            std::thread::sleep(options.frame_interval);
        }
    }

    // a resize polled in the last batch may still be queued
    ctx.flush();
    summary.final_size = ctx.swapchain_size(swapchain);

    ctx.pass_free(offscreen);
    ctx.pass_free(screen);
    ctx.texture_free(pattern);
    ctx.texture_free(target);
    ctx.pipeline_free(pipeline);
    ctx.buffer_free(vertices);
    ctx.swapchain_free(swapchain);

    info!(
        "demo finished after {} frames ({} resizes)",
        summary.frames_rendered, summary.resizes
    );
    summary.leaks = ctx.dispose();
    summary
}

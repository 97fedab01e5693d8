use serde::{Deserialize, Serialize};

use crate::desc::{
    Access, BufferDesc, BufferStorageBindDesc, ClearDesc, ComputeDesc, DrawDesc,
    PassOffscreenDesc, PipelineDesc, ProgramDesc, SamplerDesc, Shader, TextureDesc,
    TextureEditDesc,
};
use crate::event::NativeSurface;
use crate::handle::{
    Buffer, Compute, Pass, Pipeline, Program, Sampler, Swapchain, Texture, Timer,
};

/// One unit of work replayed against a backend, either right away or at the
/// next flush. Creation variants carry the final (defaulted) description so
/// the backend can build native objects in call order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Command {
    // ── Creation ────────────────────────────────────────────────
    SwapchainNew {
        swapchain: Swapchain,
        width: u32,
        height: u32,
        surface: NativeSurface,
    },
    PassSwapchainNew {
        pass: Pass,
        swapchain: Swapchain,
    },
    PassOffscreenNew {
        pass: Pass,
        desc: PassOffscreenDesc,
    },
    PassComputeNew(Pass),
    BufferNew {
        buffer: Buffer,
        desc: BufferDesc,
    },
    TextureNew {
        texture: Texture,
        desc: TextureDesc,
    },
    SamplerNew {
        sampler: Sampler,
        desc: SamplerDesc,
    },
    ProgramNew {
        program: Program,
        desc: ProgramDesc,
    },
    ComputeNew {
        compute: Compute,
        desc: ComputeDesc,
    },
    PipelineNew {
        pipeline: Pipeline,
        desc: PipelineDesc,
    },
    TimerNew(Timer),

    // ── Mutation and presentation ───────────────────────────────
    SwapchainResize {
        swapchain: Swapchain,
        width: u32,
        height: u32,
    },
    SwapchainPresent(Swapchain),

    // ── Destruction ─────────────────────────────────────────────
    SwapchainFree(Swapchain),
    PassFree(Pass),
    BufferFree(Buffer),
    TextureFree(Texture),
    SamplerFree(Sampler),
    ProgramFree(Program),
    ComputeFree(Compute),
    PipelineFree(Pipeline),
    TimerFree(Timer),

    // ── Pass-recorded ───────────────────────────────────────────
    PassBegin(Pass),
    PassEnd(Pass),
    PassClear {
        pass: Pass,
        desc: ClearDesc,
    },
    UsePipeline {
        pass: Pass,
        pipeline: Pipeline,
    },
    UseCompute {
        pass: Pass,
        compute: Compute,
    },
    Scissor {
        pass: Pass,
        x: i32,
        y: i32,
        width: u32,
        height: u32,
    },
    BufferClear {
        pass: Pass,
        buffer: Buffer,
    },
    BufferWrite {
        pass: Pass,
        buffer: Buffer,
        offset: usize,
        bytes: Vec<u8>,
    },
    TextureWrite {
        pass: Pass,
        texture: Texture,
        desc: TextureEditDesc,
    },
    BufferBind {
        pass: Pass,
        buffer: Buffer,
        shader: Shader,
        slot: u32,
    },
    BufferStorageBind {
        pass: Pass,
        desc: BufferStorageBindDesc,
    },
    TextureBind {
        pass: Pass,
        texture: Texture,
        sampler: Sampler,
        shader: Shader,
        slot: u32,
    },
    BufferComputeBind {
        pass: Pass,
        buffer: Buffer,
        slot: u32,
        gpu_access: Access,
    },
    TextureComputeBind {
        pass: Pass,
        texture: Texture,
        slot: u32,
        mip_level: u32,
        gpu_access: Access,
    },
    Draw {
        pass: Pass,
        desc: DrawDesc,
    },
    Dispatch {
        pass: Pass,
        x: u32,
        y: u32,
        z: u32,
    },
    TimerBegin {
        pass: Pass,
        timer: Timer,
    },
    TimerEnd {
        pass: Pass,
        timer: Timer,
    },
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::SwapchainNew { .. } => "swapchain_new",
            Command::PassSwapchainNew { .. } => "pass_swapchain_new",
            Command::PassOffscreenNew { .. } => "pass_offscreen_new",
            Command::PassComputeNew(_) => "pass_compute_new",
            Command::BufferNew { .. } => "buffer_new",
            Command::TextureNew { .. } => "texture_new",
            Command::SamplerNew { .. } => "sampler_new",
            Command::ProgramNew { .. } => "program_new",
            Command::ComputeNew { .. } => "compute_new",
            Command::PipelineNew { .. } => "pipeline_new",
            Command::TimerNew(_) => "timer_new",
            Command::SwapchainResize { .. } => "swapchain_resize",
            Command::SwapchainPresent(_) => "swapchain_present",
            Command::SwapchainFree(_) => "swapchain_free",
            Command::PassFree(_) => "pass_free",
            Command::BufferFree(_) => "buffer_free",
            Command::TextureFree(_) => "texture_free",
            Command::SamplerFree(_) => "sampler_free",
            Command::ProgramFree(_) => "program_free",
            Command::ComputeFree(_) => "compute_free",
            Command::PipelineFree(_) => "pipeline_free",
            Command::TimerFree(_) => "timer_free",
            Command::PassBegin(_) => "pass_begin",
            Command::PassEnd(_) => "pass_end",
            Command::PassClear { .. } => "pass_clear",
            Command::UsePipeline { .. } => "use_pipeline",
            Command::UseCompute { .. } => "use_compute",
            Command::Scissor { .. } => "scissor",
            Command::BufferClear { .. } => "buffer_clear",
            Command::BufferWrite { .. } => "buffer_write",
            Command::TextureWrite { .. } => "texture_write",
            Command::BufferBind { .. } => "buffer_bind",
            Command::BufferStorageBind { .. } => "buffer_storage_bind",
            Command::TextureBind { .. } => "texture_bind",
            Command::BufferComputeBind { .. } => "buffer_compute_bind",
            Command::TextureComputeBind { .. } => "texture_compute_bind",
            Command::Draw { .. } => "draw",
            Command::Dispatch { .. } => "dispatch",
            Command::TimerBegin { .. } => "timer_begin",
            Command::TimerEnd { .. } => "timer_end",
        }
    }

    /// Whether the command releases a reference on a handle.
    pub fn is_destructive(&self) -> bool {
        matches!(
            self,
            Command::SwapchainFree(_)
                | Command::PassFree(_)
                | Command::BufferFree(_)
                | Command::TextureFree(_)
                | Command::SamplerFree(_)
                | Command::ProgramFree(_)
                | Command::ComputeFree(_)
                | Command::PipelineFree(_)
                | Command::TimerFree(_)
        )
    }
}

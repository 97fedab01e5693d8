use std::panic::Location;

use easel_protocol::desc::{BufferDesc, ComputeDesc, PipelineDesc, ProgramDesc, Size, TextureDesc};
use easel_protocol::{
    Buffer, Command, Compute, DescError, HandleKind, Pipeline, Program, Texture, Timer,
};

use crate::context::Context;
use crate::registry::Payload;
use crate::validate;

impl Context {
    // ── Buffers ─────────────────────────────────────────────────

    /// Creates a buffer. Panics on an invalid description.
    #[track_caller]
    pub fn buffer_new(&self, desc: BufferDesc) -> Buffer {
        match self.create_buffer(desc, Location::caller()) {
            Ok(buffer) => buffer,
            Err(e) => panic!("buffer_new: {}", e),
        }
    }

    #[track_caller]
    pub fn try_buffer_new(&self, desc: BufferDesc) -> Result<Buffer, DescError> {
        self.create_buffer(desc, Location::caller())
    }

    fn create_buffer(
        &self,
        mut desc: BufferDesc,
        origin: &'static Location<'static>,
    ) -> Result<Buffer, DescError> {
        validate::buffer_desc(&mut desc)?;

        let mut inner = self.lock();
        let handle = inner.registry.create(
            Payload::Buffer {
                kind: desc.kind,
                usage: desc.usage(),
                access: desc.access,
                size: desc.size,
            },
            origin,
        );
        let buffer = Buffer(handle);
        inner.process(Command::BufferNew { buffer, desc });
        Ok(buffer)
    }

    pub fn buffer_free(&self, buffer: Buffer) {
        self.free(buffer.handle(), HandleKind::Buffer, Command::BufferFree(buffer));
    }

    pub fn buffer_size(&self, buffer: Buffer) -> usize {
        let inner = self.lock();
        match inner.registry.expect_kind(buffer.handle(), HandleKind::Buffer).payload() {
            Payload::Buffer { size, .. } => *size,
            _ => 0,
        }
    }

    // ── Textures ────────────────────────────────────────────────

    /// Creates a texture. Panics on an invalid description.
    #[track_caller]
    pub fn texture_new(&self, desc: TextureDesc) -> Texture {
        match self.create_texture(desc, Location::caller()) {
            Ok(texture) => texture,
            Err(e) => panic!("texture_new: {}", e),
        }
    }

    #[track_caller]
    pub fn try_texture_new(&self, desc: TextureDesc) -> Result<Texture, DescError> {
        self.create_texture(desc, Location::caller())
    }

    fn create_texture(
        &self,
        mut desc: TextureDesc,
        origin: &'static Location<'static>,
    ) -> Result<Texture, DescError> {
        validate::texture_desc(&mut desc)?;

        // the registry keeps the description without its initial contents
        let data = std::mem::take(&mut desc.data);
        let stored = desc.clone();
        desc.data = data;

        let mut inner = self.lock();
        let handle = inner.registry.create(Payload::Texture { desc: stored }, origin);
        let texture = Texture(handle);
        inner.process(Command::TextureNew { texture, desc });
        Ok(texture)
    }

    pub fn texture_free(&self, texture: Texture) {
        self.free(texture.handle(), HandleKind::Texture, Command::TextureFree(texture));
    }

    pub fn texture_size(&self, texture: Texture) -> Size {
        self.texture_desc(texture).size
    }

    /// The description the texture was created with, defaults applied and
    /// initial data omitted.
    pub fn texture_desc(&self, texture: Texture) -> TextureDesc {
        let inner = self.lock();
        match inner.registry.expect_kind(texture.handle(), HandleKind::Texture).payload() {
            Payload::Texture { desc } => desc.clone(),
            _ => TextureDesc::default(),
        }
    }

    pub fn texture_native_handle(&self, texture: Texture) -> u64 {
        let inner = self.lock();
        inner
            .registry
            .expect_kind(texture.handle(), HandleKind::Texture);
        inner.backend.texture_native_handle(texture)
    }

    // ── Programs ────────────────────────────────────────────────

    #[track_caller]
    pub fn program_new(&self, desc: ProgramDesc) -> Program {
        let origin = Location::caller();
        let mut inner = self.lock();
        let program = Program(inner.registry.create(Payload::Program, origin));
        inner.process(Command::ProgramNew { program, desc });
        program
    }

    pub fn program_free(&self, program: Program) {
        self.free(program.handle(), HandleKind::Program, Command::ProgramFree(program));
    }

    #[track_caller]
    pub fn compute_new(&self, desc: ComputeDesc) -> Compute {
        let origin = Location::caller();
        let mut inner = self.lock();
        let compute = Compute(inner.registry.create(Payload::Compute, origin));
        inner.process(Command::ComputeNew { compute, desc });
        compute
    }

    pub fn compute_free(&self, compute: Compute) {
        self.free(compute.handle(), HandleKind::Compute, Command::ComputeFree(compute));
    }

    // ── Pipelines ───────────────────────────────────────────────

    /// Creates a pipeline holding a counted reference on its program.
    /// The program stays alive until both are freed.
    #[track_caller]
    pub fn pipeline_new(&self, mut desc: PipelineDesc) -> Pipeline {
        let origin = Location::caller();
        validate::pipeline_desc(&mut desc);

        let mut inner = self.lock();
        inner
            .registry
            .expect_kind(desc.program.handle(), HandleKind::Program);
        let program = inner.registry.retain(desc.program.handle());
        let pipeline = Pipeline(inner.registry.create(Payload::Pipeline { desc, program }, origin));
        inner.process(Command::PipelineNew { pipeline, desc });
        pipeline
    }

    pub fn pipeline_free(&self, pipeline: Pipeline) {
        self.free(pipeline.handle(), HandleKind::Pipeline, Command::PipelineFree(pipeline));
    }

    // ── Timers ──────────────────────────────────────────────────

    #[track_caller]
    pub fn timer_new(&self) -> Timer {
        let origin = Location::caller();
        let mut inner = self.lock();
        let timer = Timer(inner.registry.create(Payload::Timer, origin));
        inner.process(Command::TimerNew(timer));
        timer
    }

    pub fn timer_free(&self, timer: Timer) {
        self.free(timer.handle(), HandleKind::Timer, Command::TimerFree(timer));
    }

    /// Elapsed GPU time in nanoseconds, once the backend has a result.
    pub fn timer_elapsed(&self, timer: Timer) -> Option<u64> {
        let mut inner = self.lock();
        inner.registry.expect_kind(timer.handle(), HandleKind::Timer);
        inner.backend.timer_elapsed(timer)
    }
}

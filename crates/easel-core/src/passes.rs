use std::panic::Location;

use easel_protocol::desc::{
    Access, BufferStorageBindDesc, ClearDesc, DrawDesc, PassOffscreenDesc, SamplerDesc, Shader,
    Size, TextureEditDesc, Usage, MAX_VERTEX_BUFFERS,
};
use easel_protocol::{
    Buffer, Command, Compute, HandleKind, Pass, PassError, Pipeline, Swapchain, Texture, Timer,
};

use crate::context::{Context, Inner};
use crate::executor::Executor;
use crate::queue::CommandList;
use crate::registry::{HandleRegistry, PassTarget, Payload};
use crate::validate;

fn expect_raster(registry: &HandleRegistry, pass: Pass) {
    registry.expect_kind(pass.handle(), HandleKind::RasterPass);
}

fn expect_compute(registry: &HandleRegistry, pass: Pass) {
    registry.expect_kind(pass.handle(), HandleKind::ComputePass);
}

fn expect_pass(registry: &HandleRegistry, pass: Pass) {
    let kind = registry.record(pass.handle()).kind();
    assert!(
        matches!(kind, HandleKind::RasterPass | HandleKind::ComputePass),
        "expected a pass handle, got a {} handle",
        kind
    );
}

fn expect_writable_buffer(registry: &HandleRegistry, buffer: Buffer) {
    match registry.expect_kind(buffer.handle(), HandleKind::Buffer).payload() {
        Payload::Buffer { usage, .. } => {
            assert!(*usage != Usage::Static, "buffer {} has static usage", buffer.handle())
        }
        _ => unreachable!("buffer handle without buffer payload"),
    }
}

fn expect_writable_texture(registry: &HandleRegistry, texture: Texture) {
    match registry.expect_kind(texture.handle(), HandleKind::Texture).payload() {
        Payload::Texture { desc } => assert!(
            desc.usage() != Usage::Static,
            "texture {} has static usage",
            texture.handle()
        ),
        _ => unreachable!("texture handle without texture payload"),
    }
}

impl Inner {
    /// Writes addressed to the null pass go through `process`, others are
    /// recorded into the pass.
    fn record_or_process(&mut self, pass: Pass, command: Command) {
        if pass.is_null() {
            self.process(command);
        } else {
            expect_pass(&self.registry, pass);
            self.record(pass, command);
        }
    }
}

impl Context {
    // ── Pass creation ───────────────────────────────────────────

    /// A raster pass drawing into a swapchain. Its size follows the swapchain.
    #[track_caller]
    pub fn pass_swapchain_new(&self, swapchain: Swapchain) -> Pass {
        let origin = Location::caller();
        let mut inner = self.lock();
        inner
            .registry
            .expect_kind(swapchain.handle(), HandleKind::Swapchain);
        let pass = Pass(inner.registry.create(
            Payload::RasterPass {
                target: PassTarget::Swapchain(swapchain),
                commands: CommandList::new(),
            },
            origin,
        ));
        inner.process(Command::PassSwapchainNew { pass, swapchain });
        pass
    }

    /// A raster pass drawing into textures. Panics when the attachments do
    /// not resolve to one common size.
    #[track_caller]
    pub fn pass_offscreen_new(&self, desc: PassOffscreenDesc) -> Pass {
        match self.create_offscreen_pass(desc, Location::caller()) {
            Ok(pass) => pass,
            Err(e) => panic!("pass_offscreen_new: {}", e),
        }
    }

    #[track_caller]
    pub fn try_pass_offscreen_new(&self, desc: PassOffscreenDesc) -> Result<Pass, PassError> {
        self.create_offscreen_pass(desc, Location::caller())
    }

    fn create_offscreen_pass(
        &self,
        desc: PassOffscreenDesc,
        origin: &'static Location<'static>,
    ) -> Result<Pass, PassError> {
        let mut inner = self.lock();
        let size = validate::offscreen_size(&inner.registry, &desc)?;

        let attachments: Vec<_> = desc
            .attachments()
            .map(|(_, texture, _)| inner.registry.retain(texture.handle()))
            .collect();
        let pass = Pass(inner.registry.create(
            Payload::RasterPass {
                target: PassTarget::Offscreen {
                    desc,
                    width: size.width,
                    height: size.height,
                    attachments,
                },
                commands: CommandList::new(),
            },
            origin,
        ));
        inner.process(Command::PassOffscreenNew { pass, desc });
        Ok(pass)
    }

    #[track_caller]
    pub fn pass_compute_new(&self) -> Pass {
        let origin = Location::caller();
        let mut inner = self.lock();
        let pass = Pass(inner.registry.create(
            Payload::ComputePass {
                commands: CommandList::new(),
            },
            origin,
        ));
        inner.process(Command::PassComputeNew(pass));
        pass
    }

    /// Frees a pass. Finalizing an offscreen pass releases its attachments.
    pub fn pass_free(&self, pass: Pass) {
        let mut inner = self.lock();
        expect_pass(&inner.registry, pass);
        inner.process(Command::PassFree(pass));
    }

    pub fn pass_size(&self, pass: Pass) -> Size {
        self.lock().registry.pass_size(pass)
    }

    /// Attachments of an offscreen pass; empty for a swapchain pass.
    pub fn pass_offscreen_desc(&self, pass: Pass) -> PassOffscreenDesc {
        let inner = self.lock();
        match inner.registry.expect_kind(pass.handle(), HandleKind::RasterPass).payload() {
            Payload::RasterPass {
                target: PassTarget::Offscreen { desc, .. },
                ..
            } => *desc,
            _ => PassOffscreenDesc::default(),
        }
    }

    // ── Recording ───────────────────────────────────────────────

    /// Hands the commands recorded on `pass` over for execution, wrapped in
    /// begin/end markers. Deferred contexts move them to the global queue.
    pub fn pass_submit(&self, pass: Pass) {
        if pass.is_null() {
            return;
        }
        let mut inner = self.lock();
        expect_pass(&inner.registry, pass);

        let deferred = inner.is_deferred();
        let Inner {
            backend,
            registry,
            pool,
            queue,
            ..
        } = &mut *inner;
        let mut commands = match registry.payload_mut(pass.handle()).commands_mut() {
            Some(list) => std::mem::take(list),
            None => unreachable!("pass handle without a command list"),
        };
        commands.push_front(pool, Command::PassBegin(pass));
        commands.push_back(pool, Command::PassEnd(pass));

        if deferred {
            queue.append(pool, &mut commands);
        } else {
            Executor::live(registry, pool, &mut **backend).drain(&mut commands);
        }
    }

    pub fn clear(&self, pass: Pass, desc: ClearDesc) {
        let mut inner = self.lock();
        expect_raster(&inner.registry, pass);
        inner.record(pass, Command::PassClear { pass, desc });
    }

    pub fn use_pipeline(&self, pass: Pass, pipeline: Pipeline) {
        let mut inner = self.lock();
        expect_raster(&inner.registry, pass);
        inner
            .registry
            .expect_kind(pipeline.handle(), HandleKind::Pipeline);
        inner.record(pass, Command::UsePipeline { pass, pipeline });
    }

    pub fn use_compute(&self, pass: Pass, compute: Compute) {
        let mut inner = self.lock();
        expect_compute(&inner.registry, pass);
        inner
            .registry
            .expect_kind(compute.handle(), HandleKind::Compute);
        inner.record(pass, Command::UseCompute { pass, compute });
    }

    pub fn scissor(&self, pass: Pass, x: i32, y: i32, width: u32, height: u32) {
        let mut inner = self.lock();
        expect_raster(&inner.registry, pass);
        inner.record(
            pass,
            Command::Scissor {
                pass,
                x,
                y,
                width,
                height,
            },
        );
    }

    /// Zeroes a dynamic buffer. The null pass applies it outside any pass.
    pub fn buffer_zero(&self, pass: Pass, buffer: Buffer) {
        let mut inner = self.lock();
        expect_writable_buffer(&inner.registry, buffer);
        inner.record_or_process(pass, Command::BufferClear { pass, buffer });
    }

    pub fn buffer_write(&self, pass: Pass, buffer: Buffer, offset: usize, bytes: &[u8]) {
        let mut inner = self.lock();
        expect_writable_buffer(&inner.registry, buffer);
        inner.record_or_process(
            pass,
            Command::BufferWrite {
                pass,
                buffer,
                offset,
                bytes: bytes.to_vec(),
            },
        );
    }

    pub fn texture_write(&self, pass: Pass, texture: Texture, desc: TextureEditDesc) {
        let mut inner = self.lock();
        expect_writable_texture(&inner.registry, texture);
        inner.record_or_process(pass, Command::TextureWrite { pass, texture, desc });
    }

    /// Reads buffer contents into `out`. Queued commands are flushed first.
    pub fn buffer_read(&self, buffer: Buffer, offset: usize, out: &mut [u8]) {
        let mut inner = self.lock();
        inner.registry.expect_kind(buffer.handle(), HandleKind::Buffer);
        inner.flush();
        inner.backend.buffer_read(buffer, offset, out);
    }

    /// Reads the region described by `desc` into `desc.bytes`. Queued
    /// commands are flushed first.
    pub fn texture_read(&self, texture: Texture, desc: &mut TextureEditDesc) {
        let mut inner = self.lock();
        inner
            .registry
            .expect_kind(texture.handle(), HandleKind::Texture);
        inner.flush();
        inner.backend.texture_read(texture, desc);
    }

    pub fn buffer_bind(&self, pass: Pass, buffer: Buffer, shader: Shader, slot: u32) {
        let mut inner = self.lock();
        expect_raster(&inner.registry, pass);
        inner.registry.expect_kind(buffer.handle(), HandleKind::Buffer);
        inner.record(
            pass,
            Command::BufferBind {
                pass,
                buffer,
                shader,
                slot,
            },
        );
    }

    pub fn buffer_storage_bind(&self, pass: Pass, desc: BufferStorageBindDesc) {
        let mut inner = self.lock();
        expect_raster(&inner.registry, pass);
        for buffer in desc.buffers.iter().flatten() {
            inner.registry.expect_kind(buffer.handle(), HandleKind::Buffer);
        }
        inner.record(pass, Command::BufferStorageBind { pass, desc });
    }

    /// Binds a texture with the sampler from its own description.
    #[track_caller]
    pub fn texture_bind(&self, pass: Pass, texture: Texture, shader: Shader, slot: u32) {
        let origin = Location::caller();
        let sampler = {
            let inner = self.lock();
            match inner.registry.expect_kind(texture.handle(), HandleKind::Texture).payload() {
                Payload::Texture { desc } => desc.sampler,
                _ => unreachable!("texture handle without texture payload"),
            }
        };
        self.bind_texture(pass, texture, shader, slot, &sampler, origin);
    }

    /// Binds a texture with an explicit sampler, deduplicated through the sampler cache.
    #[track_caller]
    pub fn texture_sampler_bind(
        &self,
        pass: Pass,
        texture: Texture,
        shader: Shader,
        slot: u32,
        sampler: SamplerDesc,
    ) {
        self.bind_texture(pass, texture, shader, slot, &sampler, Location::caller());
    }

    fn bind_texture(
        &self,
        pass: Pass,
        texture: Texture,
        shader: Shader,
        slot: u32,
        desc: &SamplerDesc,
        origin: &'static Location<'static>,
    ) {
        let mut inner = self.lock();
        expect_pass(&inner.registry, pass);
        inner
            .registry
            .expect_kind(texture.handle(), HandleKind::Texture);
        let sampler = inner.sampler(desc, origin);
        // released by the executor once the bind has run or been discarded
        inner.registry.add_ref(sampler.handle());
        inner.record(
            pass,
            Command::TextureBind {
                pass,
                texture,
                sampler,
                shader,
                slot,
            },
        );
    }

    pub fn buffer_compute_bind(&self, pass: Pass, buffer: Buffer, slot: u32, gpu_access: Access) {
        let mut inner = self.lock();
        expect_compute(&inner.registry, pass);
        inner.registry.expect_kind(buffer.handle(), HandleKind::Buffer);
        assert!(
            !gpu_access.is_empty(),
            "gpu should read, write, or both, it has no meaning to bind a buffer that the GPU cannot read or write from"
        );
        inner.record(
            pass,
            Command::BufferComputeBind {
                pass,
                buffer,
                slot,
                gpu_access,
            },
        );
    }

    pub fn texture_compute_bind(
        &self,
        pass: Pass,
        texture: Texture,
        slot: u32,
        mip_level: u32,
        gpu_access: Access,
    ) {
        let mut inner = self.lock();
        expect_compute(&inner.registry, pass);
        inner
            .registry
            .expect_kind(texture.handle(), HandleKind::Texture);
        assert!(
            !gpu_access.is_empty(),
            "gpu should read, write, or both, it has no meaning to bind a texture that the GPU cannot read or write from"
        );
        if gpu_access == Access::READ {
            assert!(
                mip_level == 0,
                "read only textures are bound as samplers, so you can't change mip level"
            );
        }
        inner.record(
            pass,
            Command::TextureComputeBind {
                pass,
                texture,
                slot,
                mip_level,
                gpu_access,
            },
        );
    }

    pub fn draw(&self, pass: Pass, desc: DrawDesc) {
        let mut inner = self.lock();
        expect_raster(&inner.registry, pass);
        assert!(
            desc.vertex_buffers.len() <= MAX_VERTEX_BUFFERS,
            "draw binds {} vertex buffers, at most {} are supported",
            desc.vertex_buffers.len(),
            MAX_VERTEX_BUFFERS
        );
        inner.record(pass, Command::Draw { pass, desc });
    }

    pub fn dispatch(&self, pass: Pass, x: u32, y: u32, z: u32) {
        let mut inner = self.lock();
        expect_compute(&inner.registry, pass);
        inner.record(pass, Command::Dispatch { pass, x, y, z });
    }

    pub fn timer_begin(&self, pass: Pass, timer: Timer) {
        let mut inner = self.lock();
        expect_pass(&inner.registry, pass);
        inner.registry.expect_kind(timer.handle(), HandleKind::Timer);
        inner.record(pass, Command::TimerBegin { pass, timer });
    }

    pub fn timer_end(&self, pass: Pass, timer: Timer) {
        let mut inner = self.lock();
        expect_pass(&inner.registry, pass);
        inner.registry.expect_kind(timer.handle(), HandleKind::Timer);
        inner.record(pass, Command::TimerEnd { pass, timer });
    }
}

use easel_protocol::{Command, Handle, HandleKind, Pass};
use tracing::trace;

use crate::backend::Backend;
use crate::queue::{CommandList, CommandPool};
use crate::registry::{CountedRef, HandleRegistry, PassTarget, Payload};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Bookkeeping plus backend work
    Live,
    /// Bookkeeping only. Used at teardown to settle queued frees.
    Settle,
}

/// Applies commands to the registry and forwards them to the backend.
///
/// Free commands drop one reference. The one that drops the last reference
/// finalizes the handle: the backend releases the native object, the slot
/// goes back to the pool, and any counted references the handle held are
/// given back through internal free commands that run right away, whatever
/// the context's execution mode.
pub struct Executor<'a> {
    registry: &'a mut HandleRegistry,
    pool: &'a mut CommandPool,
    backend: Option<&'a mut dyn Backend>,
}

impl<'a> Executor<'a> {
    pub fn live(
        registry: &'a mut HandleRegistry,
        pool: &'a mut CommandPool,
        backend: &'a mut dyn Backend,
    ) -> Self {
        Self {
            registry,
            pool,
            backend: Some(backend),
        }
    }

    pub fn settle(registry: &'a mut HandleRegistry, pool: &'a mut CommandPool) -> Self {
        Self {
            registry,
            pool,
            backend: None,
        }
    }

    pub fn mode(&self) -> Mode {
        if self.backend.is_some() {
            Mode::Live
        } else {
            Mode::Settle
        }
    }

    /// Runs every command of `list` in order, leaving it empty.
    pub fn drain(&mut self, list: &mut CommandList) {
        while let Some(command) = list.pop_front(self.pool) {
            self.run(command);
        }
    }

    pub fn run(&mut self, command: Command) {
        trace!("executing {} ({:?})", command.name(), self.mode());
        match &command {
            Command::SwapchainFree(swapchain) => self.free(swapchain.handle(), HandleKind::Swapchain),
            Command::PassFree(pass) => self.free_pass(*pass),
            Command::BufferFree(buffer) => self.free(buffer.handle(), HandleKind::Buffer),
            Command::TextureFree(texture) => self.free(texture.handle(), HandleKind::Texture),
            Command::SamplerFree(sampler) => self.free(sampler.handle(), HandleKind::Sampler),
            Command::ProgramFree(program) => self.free(program.handle(), HandleKind::Program),
            Command::ComputeFree(compute) => self.free(compute.handle(), HandleKind::Compute),
            Command::PipelineFree(pipeline) => self.free(pipeline.handle(), HandleKind::Pipeline),
            Command::TimerFree(timer) => self.free(timer.handle(), HandleKind::Timer),
            Command::SwapchainResize {
                swapchain,
                width,
                height,
            } => {
                self.registry
                    .expect_kind(swapchain.handle(), HandleKind::Swapchain);
                if let Payload::Swapchain {
                    width: w,
                    height: h,
                    ..
                } = self.registry.payload_mut(swapchain.handle())
                {
                    *w = *width;
                    *h = *height;
                }
                self.forward(&command);
            }
            Command::TextureBind { sampler, .. } => {
                self.forward(&command);
                // the bind held its own reference on the sampler
                self.free(sampler.handle(), HandleKind::Sampler);
            }
            _ => self.forward(&command),
        }
    }

    fn forward(&mut self, command: &Command) {
        if let Some(backend) = self.backend.as_deref_mut() {
            backend.execute(self.registry, command);
        }
    }

    fn free(&mut self, handle: Handle, kind: HandleKind) {
        self.registry.expect_kind(handle, kind);
        if self.registry.unref(handle) {
            self.finalize(handle);
        }
    }

    fn free_pass(&mut self, pass: Pass) {
        let kind = self.registry.record(pass.handle()).kind();
        assert!(
            matches!(kind, HandleKind::RasterPass | HandleKind::ComputePass),
            "expected a pass handle, got a {} handle",
            kind
        );
        if self.registry.unref(pass.handle()) {
            self.finalize(pass.handle());
        }
    }

    fn finalize(&mut self, handle: Handle) {
        if let Some(backend) = self.backend.as_deref_mut() {
            backend.release(handle, self.registry.record(handle));
        }
        let record = self.registry.destroy(handle);
        match record.into_payload() {
            Payload::RasterPass {
                target,
                mut commands,
            } => {
                self.discard(&mut commands);
                if let PassTarget::Offscreen { attachments, .. } = target {
                    for attachment in attachments {
                        self.release(attachment);
                    }
                }
            }
            Payload::ComputePass { mut commands } => self.discard(&mut commands),
            Payload::Pipeline { program, .. } => self.release(program),
            _ => {}
        }
    }

    /// Gives a counted reference back. Never deferred.
    pub fn release(&mut self, counted: CountedRef) {
        let command = counted.into_free_command();
        self.run(command);
    }

    /// Drops commands recorded into a pass that was never submitted again.
    fn discard(&mut self, list: &mut CommandList) {
        while let Some(command) = list.pop_front(self.pool) {
            if let Command::TextureBind { sampler, .. } = command {
                self.free(sampler.handle(), HandleKind::Sampler);
            }
        }
    }
}

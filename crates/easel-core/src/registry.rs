use std::panic::Location;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use easel_protocol::desc::{
    Access, BufferKind, PassOffscreenDesc, PipelineDesc, SamplerDesc, Size, TextureDesc, Usage,
};
use easel_protocol::{
    Buffer, Command, Compute, Handle, HandleKind, NativeSurface, Pass, Pipeline, Program, Sampler,
    Swapchain, Texture, Timer,
};
use tracing::debug;

use crate::leak::LeakTracker;
use crate::queue::CommandList;
use crate::slab::Slab;

/// Atomic reference count of one handle. Starts at 1.
#[derive(Debug)]
pub struct RefCount(AtomicU32);

impl RefCount {
    pub fn new() -> Self {
        Self(AtomicU32::new(1))
    }

    /// Adds a reference and returns the new count.
    pub fn acquire(&self) -> u32 {
        self.0.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// Drops a reference. Returns true when this call released the last one.
    pub fn release(&self) -> bool {
        match self
            .0
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1))
        {
            Ok(previous) => previous == 1,
            Err(_) => panic!("reference count released below zero"),
        }
    }

    pub fn get(&self) -> u32 {
        self.0.load(Ordering::Acquire)
    }
}

impl Default for RefCount {
    fn default() -> Self {
        Self::new()
    }
}

/// A counted ownership edge from one handle to another (pipeline to
/// program, offscreen pass to attachment, recorded bind to sampler).
/// Must be handed back to the executor, which turns it into an internal
/// free command.
#[derive(Debug, PartialEq, Eq)]
#[must_use = "a counted reference must be released through the executor"]
pub struct CountedRef {
    handle: Handle,
    kind: HandleKind,
}

impl CountedRef {
    pub fn handle(&self) -> Handle {
        self.handle
    }

    pub fn kind(&self) -> HandleKind {
        self.kind
    }

    /// The free command that gives this reference back.
    pub fn into_free_command(self) -> Command {
        let h = self.handle;
        match self.kind {
            HandleKind::Swapchain => Command::SwapchainFree(Swapchain(h)),
            HandleKind::RasterPass | HandleKind::ComputePass => Command::PassFree(Pass(h)),
            HandleKind::Buffer => Command::BufferFree(Buffer(h)),
            HandleKind::Texture => Command::TextureFree(Texture(h)),
            HandleKind::Sampler => Command::SamplerFree(Sampler(h)),
            HandleKind::Program => Command::ProgramFree(Program(h)),
            HandleKind::Compute => Command::ComputeFree(Compute(h)),
            HandleKind::Pipeline => Command::PipelineFree(Pipeline(h)),
            HandleKind::Timer => Command::TimerFree(Timer(h)),
            HandleKind::None => panic!("counted reference to a handle of kind none"),
        }
    }
}

#[derive(Debug)]
pub enum PassTarget {
    /// Size follows the swapchain's current size
    Swapchain(Swapchain),
    Offscreen {
        desc: PassOffscreenDesc,
        width: u32,
        height: u32,
        attachments: Vec<CountedRef>,
    },
}

/// Kind-specific state of a live handle.
#[derive(Debug)]
pub enum Payload {
    Swapchain {
        width: u32,
        height: u32,
        surface: NativeSurface,
    },
    RasterPass {
        target: PassTarget,
        commands: CommandList,
    },
    ComputePass {
        commands: CommandList,
    },
    Buffer {
        kind: BufferKind,
        usage: Usage,
        access: Access,
        size: usize,
    },
    /// Description with its initial data stripped
    Texture {
        desc: TextureDesc,
    },
    Sampler {
        desc: SamplerDesc,
    },
    Program,
    Compute,
    Pipeline {
        desc: PipelineDesc,
        program: CountedRef,
    },
    Timer,
}

impl Payload {
    pub fn kind(&self) -> HandleKind {
        match self {
            Payload::Swapchain { .. } => HandleKind::Swapchain,
            Payload::RasterPass { .. } => HandleKind::RasterPass,
            Payload::ComputePass { .. } => HandleKind::ComputePass,
            Payload::Buffer { .. } => HandleKind::Buffer,
            Payload::Texture { .. } => HandleKind::Texture,
            Payload::Sampler { .. } => HandleKind::Sampler,
            Payload::Program => HandleKind::Program,
            Payload::Compute => HandleKind::Compute,
            Payload::Pipeline { .. } => HandleKind::Pipeline,
            Payload::Timer => HandleKind::Timer,
        }
    }

    /// The command sublist of a raster or compute pass.
    pub fn commands_mut(&mut self) -> Option<&mut CommandList> {
        match self {
            Payload::RasterPass { commands, .. } | Payload::ComputePass { commands } => {
                Some(commands)
            }
            _ => None,
        }
    }
}

#[derive(Debug)]
pub struct HandleRecord {
    kind: HandleKind,
    refs: RefCount,
    payload: Payload,
}

impl HandleRecord {
    pub fn kind(&self) -> HandleKind {
        self.kind
    }

    pub fn ref_count(&self) -> u32 {
        self.refs.get()
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    pub fn into_payload(self) -> Payload {
        self.payload
    }
}

/// Every live handle of one context, with its reference count and payload.
pub struct HandleRegistry {
    records: Slab<HandleRecord>,
    leaks: Arc<LeakTracker>,
}

impl HandleRegistry {
    pub fn new(leaks: Arc<LeakTracker>) -> Self {
        Self {
            records: Slab::with_capacity(128),
            leaks,
        }
    }

    /// Allocates a handle with a reference count of 1.
    pub fn create(&mut self, payload: Payload, origin: &'static Location<'static>) -> Handle {
        let kind = payload.kind();
        let handle = self.records.insert(HandleRecord {
            kind,
            refs: RefCount::new(),
            payload,
        });
        if kind.is_tracked() {
            self.leaks.track(handle, kind, origin);
        }
        debug!("created {} handle {}", kind, handle);
        handle
    }

    pub fn add_ref(&self, handle: Handle) -> u32 {
        self.record(handle).refs.acquire()
    }

    /// Drops one reference. True means the caller must now finalize the handle.
    pub fn unref(&self, handle: Handle) -> bool {
        self.record(handle).refs.release()
    }

    /// Returns the slot to the pool. Only valid once `unref` reported the last reference.
    pub fn destroy(&mut self, handle: Handle) -> HandleRecord {
        let record = match self.records.get(handle) {
            Some(record) => record,
            None => panic!("destroying invalid or already freed handle {}", handle),
        };
        assert_eq!(
            record.refs.get(),
            0,
            "destroying {} handle {} while still referenced",
            record.kind,
            handle
        );
        let Some(record) = self.records.remove(handle) else {
            unreachable!("handle {} vanished during destroy", handle);
        };
        if record.kind.is_tracked() {
            self.leaks.untrack(handle);
        }
        debug!("finalized {} handle {}", record.kind, handle);
        record
    }

    /// Takes a counted reference on `handle`.
    pub fn retain(&self, handle: Handle) -> CountedRef {
        let record = self.record(handle);
        record.refs.acquire();
        CountedRef {
            handle,
            kind: record.kind,
        }
    }

    pub fn get(&self, handle: Handle) -> Option<&HandleRecord> {
        self.records.get(handle)
    }

    pub fn get_mut(&mut self, handle: Handle) -> Option<&mut HandleRecord> {
        self.records.get_mut(handle)
    }

    /// Like `get` but treats an unknown handle as a contract violation.
    pub fn record(&self, handle: Handle) -> &HandleRecord {
        match self.records.get(handle) {
            Some(record) => record,
            None => panic!("invalid or already freed handle {}", handle),
        }
    }

    pub fn payload_mut(&mut self, handle: Handle) -> &mut Payload {
        match self.records.get_mut(handle) {
            Some(record) => &mut record.payload,
            None => panic!("invalid or already freed handle {}", handle),
        }
    }

    /// Checks that `handle` is alive and of the given kind.
    pub fn expect_kind(&self, handle: Handle, kind: HandleKind) -> &HandleRecord {
        let record = self.record(handle);
        assert_eq!(
            record.kind, kind,
            "expected a {} handle, got a {} handle",
            kind, record.kind
        );
        record
    }

    pub fn kind(&self, handle: Handle) -> Option<HandleKind> {
        self.records.get(handle).map(|r| r.kind)
    }

    pub fn ref_count(&self, handle: Handle) -> Option<u32> {
        self.records.get(handle).map(|r| r.refs.get())
    }

    pub fn live_count(&self) -> usize {
        self.records.len()
    }

    /// Size of a raster pass: the swapchain's current size or the fixed offscreen size.
    pub fn pass_size(&self, pass: Pass) -> Size {
        match &self.expect_kind(pass.handle(), HandleKind::RasterPass).payload {
            Payload::RasterPass {
                target: PassTarget::Swapchain(swapchain),
                ..
            } => match &self.expect_kind(swapchain.handle(), HandleKind::Swapchain).payload {
                Payload::Swapchain { width, height, .. } => Size::new(*width, *height),
                _ => Size::default(),
            },
            Payload::RasterPass {
                target: PassTarget::Offscreen { width, height, .. },
                ..
            } => Size::new(*width, *height),
            _ => Size::default(),
        }
    }
}

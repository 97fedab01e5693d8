use std::panic::Location;
use std::sync::Arc;

use easel_protocol::desc::{SamplerDesc, Size, TextureOrigin};
use easel_protocol::{Command, Handle, HandleKind, NativeSurface, Pass, Sampler, Swapchain};
use parking_lot::{Mutex, MutexGuard};
use tracing::{debug, info};

use crate::backend::{Backend, BackendInfo};
use crate::config::Settings;
use crate::error::CoreError;
use crate::executor::Executor;
use crate::leak::{LeakReport, LeakTracker};
use crate::queue::{CommandList, CommandPool};
use crate::registry::{HandleRegistry, Payload};
use crate::sampler_cache::SamplerCache;

/// State guarded by the context lock.
pub(crate) struct Inner {
    pub(crate) backend: Box<dyn Backend>,
    pub(crate) registry: HandleRegistry,
    pub(crate) pool: CommandPool,
    /// Global queue, only used in deferred mode
    pub(crate) queue: CommandList,
    pub(crate) samplers: SamplerCache,
    defer: bool,
}

impl Inner {
    pub(crate) fn executor(&mut self) -> Executor<'_> {
        Executor::live(&mut self.registry, &mut self.pool, &mut *self.backend)
    }

    pub(crate) fn is_deferred(&self) -> bool {
        self.defer
    }

    /// Queues `command` in deferred mode, runs it now otherwise.
    pub(crate) fn process(&mut self, command: Command) {
        if self.is_deferred() {
            self.queue.push_back(&mut self.pool, command);
        } else {
            self.executor().run(command);
        }
    }

    pub(crate) fn flush(&mut self) {
        let Inner {
            backend,
            registry,
            pool,
            queue,
            ..
        } = self;
        if !queue.is_empty() {
            debug!("flushing {} commands", queue.len());
        }
        Executor::live(registry, pool, &mut **backend).drain(queue);
    }

    /// Appends to the sublist of a pass.
    pub(crate) fn record(&mut self, pass: Pass, command: Command) {
        let Inner { registry, pool, .. } = self;
        match registry.payload_mut(pass.handle()).commands_mut() {
            Some(commands) => commands.push_back(pool, command),
            None => panic!("handle {} is not a pass", pass.handle()),
        }
    }

    /// Returns the cached sampler for `desc`, creating it on a miss.
    pub(crate) fn sampler(&mut self, desc: &SamplerDesc, origin: &'static Location<'static>) -> Sampler {
        if let Some(sampler) = self.samplers.lookup(desc) {
            return sampler;
        }
        let handle = self.registry.create(Payload::Sampler { desc: *desc }, origin);
        let sampler = Sampler(handle);
        self.process(Command::SamplerNew {
            sampler,
            desc: *desc,
        });
        if let Some(evicted) = self.samplers.insert(*desc, sampler) {
            self.process(Command::SamplerFree(evicted));
        }
        sampler
    }
}

/// A rendering context: one backend, its handles and its command queue.
///
/// Every mutating call takes the context lock for its whole duration.
/// Contract violations (wrong handle kind, double free, writes to static
/// resources, ...) panic.
pub struct Context {
    pub(crate) inner: Mutex<Inner>,
    settings: Settings,
    leaks: Arc<LeakTracker>,
    name: &'static str,
    texture_origin: TextureOrigin,
    disposed: bool,
}

impl Context {
    /// Initialises `backend` and creates a context around it.
    pub fn new<B: Backend + 'static>(backend: B, settings: Settings) -> Result<Self, CoreError> {
        let leaks = Arc::new(LeakTracker::new(settings.leak_tracking));
        Self::with_leak_tracker(backend, settings, leaks)
    }

    /// Same as [`Context::new`] with a caller-provided leak tracker, which
    /// stays readable after the context is gone.
    ///
    /// Fails with [`CoreError::LeakTrackerInUse`] when another context was
    /// already built with `leaks`.
    pub fn with_leak_tracker<B: Backend + 'static>(
        mut backend: B,
        settings: Settings,
        leaks: Arc<LeakTracker>,
    ) -> Result<Self, CoreError> {
        if !leaks.claim() {
            return Err(CoreError::LeakTrackerInUse);
        }
        let settings = settings.normalized();
        backend.init(&settings)?;

        let name = backend.name();
        let texture_origin = backend.texture_origin();
        info!(
            "context initialised: backend={}, deferred={}, sampler_cache_size={}, leak_tracking={:?}",
            name, settings.defer_api_calls, settings.sampler_cache_size, leaks.mode()
        );

        let inner = Inner {
            backend: Box::new(backend),
            registry: HandleRegistry::new(leaks.clone()),
            pool: CommandPool::new(),
            queue: CommandList::new(),
            samplers: SamplerCache::new(settings.sampler_cache_size),
            defer: settings.defer_api_calls,
        };

        Ok(Self {
            inner: Mutex::new(inner),
            settings,
            leaks,
            name,
            texture_origin,
            disposed: false,
        })
    }

    /// Tears the context down and returns the leak report.
    ///
    /// Commands still queued are settled first (their frees are applied
    /// without backend work) so a free that was never flushed does not
    /// show up as a leak.
    pub fn dispose(mut self) -> LeakReport {
        let report = self.teardown();
        self.disposed = true;
        report
    }

    fn teardown(&mut self) -> LeakReport {
        let inner = self.inner.get_mut();
        {
            let Inner {
                registry,
                pool,
                queue,
                samplers,
                ..
            } = &mut *inner;
            let settled = queue.len();
            let mut executor = Executor::settle(registry, pool);
            executor.drain(queue);
            for sampler in samplers.drain() {
                executor.run(Command::SamplerFree(sampler));
            }
            debug!("settled {} queued commands", settled);
        }

        let report = self.leaks.report();
        report.log();
        inner.backend.dispose();
        info!(
            "context disposed: backend={}, leaks={}, handles left={}",
            self.name,
            report.count(),
            inner.registry.live_count()
        );
        report
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock()
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn texture_origin(&self) -> TextureOrigin {
        self.texture_origin
    }

    pub fn info(&self) -> BackendInfo {
        self.lock().backend.info()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn leak_tracker(&self) -> &Arc<LeakTracker> {
        &self.leaks
    }

    /// Takes an extra reference on any handle. Each call must be matched
    /// by one more free of that handle.
    pub fn handle_ref(&self, handle: impl Into<Handle>) {
        let handle = handle.into();
        let inner = self.lock();
        inner.registry.add_ref(handle);
    }

    /// Current reference count of a live handle.
    pub fn ref_count(&self, handle: impl Into<Handle>) -> Option<u32> {
        self.lock().registry.ref_count(handle.into())
    }

    pub fn is_alive(&self, handle: impl Into<Handle>) -> bool {
        self.lock().registry.get(handle.into()).is_some()
    }

    /// Runs every queued command in call order.
    pub fn flush(&self) {
        self.lock().flush();
    }

    pub fn pending_commands(&self) -> usize {
        self.lock().queue.len()
    }

    /// The pass addressing the global queue. Writes recorded on it are
    /// processed like any other API call.
    pub fn global_pass(&self) -> Pass {
        Pass::null()
    }

    // ── Swapchains ──────────────────────────────────────────────

    #[track_caller]
    pub fn swapchain_new(&self, width: u32, height: u32, surface: NativeSurface) -> Swapchain {
        let origin = Location::caller();
        let mut inner = self.lock();
        let handle = inner.registry.create(
            Payload::Swapchain {
                width,
                height,
                surface,
            },
            origin,
        );
        let swapchain = Swapchain(handle);
        inner.process(Command::SwapchainNew {
            swapchain,
            width,
            height,
            surface,
        });
        swapchain
    }

    pub fn swapchain_free(&self, swapchain: Swapchain) {
        self.free(swapchain.handle(), HandleKind::Swapchain, Command::SwapchainFree(swapchain));
    }

    pub fn swapchain_resize(&self, swapchain: Swapchain, width: u32, height: u32) {
        let mut inner = self.lock();
        inner
            .registry
            .expect_kind(swapchain.handle(), HandleKind::Swapchain);
        inner.process(Command::SwapchainResize {
            swapchain,
            width,
            height,
        });
    }

    /// Flushes the queue, then presents.
    pub fn swapchain_present(&self, swapchain: Swapchain) {
        let mut inner = self.lock();
        inner
            .registry
            .expect_kind(swapchain.handle(), HandleKind::Swapchain);
        inner.flush();
        inner.executor().run(Command::SwapchainPresent(swapchain));
    }

    pub fn swapchain_size(&self, swapchain: Swapchain) -> Size {
        let inner = self.lock();
        match inner
            .registry
            .expect_kind(swapchain.handle(), HandleKind::Swapchain)
            .payload()
        {
            Payload::Swapchain { width, height, .. } => Size::new(*width, *height),
            _ => Size::default(),
        }
    }

    /// Checks the handle is alive and of `kind`, then processes its free command.
    pub(crate) fn free(&self, handle: Handle, kind: HandleKind, command: Command) {
        let mut inner = self.lock();
        inner.registry.expect_kind(handle, kind);
        inner.process(command);
    }
}

impl Drop for Context {
    fn drop(&mut self) {
        if !self.disposed {
            self.teardown();
        }
    }
}

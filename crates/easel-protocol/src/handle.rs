use serde::{Deserialize, Serialize};

/// An opaque identity for one live resource.
/// `index` selects the pool slot, `generation` distinguishes successive
/// occupants of the same slot so a stale handle never resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Handle {
    pub index: u32,
    pub generation: u32,
}

impl Handle {
    /// The null handle. Generation 0 is never issued by a pool.
    pub const fn null() -> Self {
        Self {
            index: 0,
            generation: 0,
        }
    }

    pub const fn is_null(&self) -> bool {
        self.generation == 0
    }
}

impl std::fmt::Display for Handle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_null() {
            write!(f, "null")
        } else {
            write!(f, "#{}v{}", self.index, self.generation)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandleKind {
    None,
    Swapchain,
    RasterPass,
    ComputePass,
    Buffer,
    Texture,
    Sampler,
    Program,
    Compute,
    Pipeline,
    Timer,
}

impl HandleKind {
    pub fn name(self) -> &'static str {
        match self {
            HandleKind::None => "none",
            HandleKind::Swapchain => "swapchain",
            HandleKind::RasterPass => "raster_pass",
            HandleKind::ComputePass => "compute_pass",
            HandleKind::Buffer => "buffer",
            HandleKind::Texture => "texture",
            HandleKind::Sampler => "sampler",
            HandleKind::Program => "program",
            HandleKind::Compute => "compute",
            HandleKind::Pipeline => "pipeline",
            HandleKind::Timer => "timer",
        }
    }

    /// Whether handles of this kind are owned by the user and therefore
    /// reported when still alive at teardown. Samplers and pipelines are
    /// cached internally and are never reported.
    pub fn is_tracked(self) -> bool {
        matches!(
            self,
            HandleKind::Swapchain
                | HandleKind::RasterPass
                | HandleKind::ComputePass
                | HandleKind::Buffer
                | HandleKind::Texture
                | HandleKind::Program
                | HandleKind::Compute
        )
    }
}

impl std::fmt::Display for HandleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

macro_rules! handle_newtype {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
        pub struct $name(pub Handle);

        impl $name {
            pub const fn null() -> Self {
                Self(Handle::null())
            }

            pub const fn handle(self) -> Handle {
                self.0
            }

            pub const fn is_null(self) -> bool {
                self.0.is_null()
            }
        }

        impl From<$name> for Handle {
            fn from(value: $name) -> Handle {
                value.0
            }
        }
    };
}

handle_newtype!(Swapchain);
handle_newtype!(
    /// A raster pass (swapchain or offscreen target) or a compute pass.
    /// The null pass addresses the global command queue.
    Pass
);
handle_newtype!(Buffer);
handle_newtype!(Texture);
handle_newtype!(Sampler);
handle_newtype!(Program);
handle_newtype!(Compute);
handle_newtype!(Pipeline);
handle_newtype!(Timer);

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::handle::{Buffer, Program, Texture};

pub const MAX_COLOR_ATTACHMENTS: usize = 4;
pub const MAX_STORAGE_BUFFERS: usize = 8;
pub const MAX_VERTEX_BUFFERS: usize = 10;
pub const DEFAULT_SAMPLER_CACHE_SIZE: usize = 32;

// ============================================================================
// Shared types
// ============================================================================

/// Width/height/depth of a resource. `depth` is 0 for 2D resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: u32,
    pub height: u32,
    pub depth: u32,
}

impl Size {
    pub const fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            depth: 0,
        }
    }

    /// Size of the given mip level: each level halves width and height, rounding down.
    pub fn at_level(self, level: u32) -> Self {
        Self {
            width: self.width.checked_shr(level).unwrap_or(0),
            height: self.height.checked_shr(level).unwrap_or(0),
            depth: self.depth,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Usage {
    Static,
    Dynamic,
}

bitflags! {
    /// CPU or GPU access rights on a resource.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct Access: u8 {
        const READ = 1 << 0;
        const WRITE = 1 << 1;
        const READ_WRITE = Self::READ.bits() | Self::WRITE.bits();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextureOrigin {
    TopLeft,
    BottomLeft,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Shader {
    Vertex,
    Pixel,
    Geometry,
    Compute,
}

// ============================================================================
// Buffers
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BufferKind {
    Vertex,
    Index,
    Uniform,
    Compute,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BufferDesc {
    pub kind: BufferKind,
    /// Defaults to `Usage::Static`
    pub usage: Option<Usage>,
    /// CPU access
    pub access: Access,
    /// Size of the buffer in bytes
    pub size: usize,
    /// Initial contents, at most `size` bytes
    pub data: Option<Vec<u8>>,
    /// Element stride for compute buffers
    pub compute_stride: usize,
}

impl BufferDesc {
    pub fn new(kind: BufferKind, size: usize) -> Self {
        Self {
            kind,
            usage: None,
            access: Access::empty(),
            size,
            data: None,
            compute_stride: 0,
        }
    }

    /// A buffer sized to and initialised with `data`.
    pub fn with_data(kind: BufferKind, data: Vec<u8>) -> Self {
        Self {
            size: data.len(),
            data: Some(data),
            ..Self::new(kind, 0)
        }
    }

    pub fn usage(&self) -> Usage {
        self.usage.unwrap_or(Usage::Static)
    }
}

// ============================================================================
// Textures and samplers
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PixelFormat {
    #[default]
    Rgba8,
    Rgba16F,
    R8,
    R16I,
    R16F,
    R32F,
    R32G32F,
    Depth32,
    Depth24Stencil8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Msaa {
    #[default]
    None,
    X2,
    X4,
    X8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TextureFilter {
    Point,
    #[default]
    Linear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TextureAddressMode {
    #[default]
    Repeat,
    Clamp,
    Border,
    Mirror,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Compare {
    Never,
    Less,
    Equal,
    LessEqual,
    Greater,
    NotEqual,
    GreaterEqual,
    Always,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SamplerDesc {
    pub filter: TextureFilter,
    pub u: TextureAddressMode,
    pub v: TextureAddressMode,
    pub w: TextureAddressMode,
    pub compare: Option<Compare>,
    pub border: [f32; 4],
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TextureDesc {
    pub size: Size,
    pub format: PixelFormat,
    /// Defaults to `Usage::Static`
    pub usage: Option<Usage>,
    /// CPU access
    pub access: Access,
    /// Mip level count, 0 means 1
    pub mipmaps: u32,
    pub cube_map: bool,
    /// Can be attached to an offscreen pass
    pub render_target: bool,
    pub msaa: Msaa,
    /// Initial contents, one entry per cube face (or a single entry)
    pub data: Vec<Vec<u8>>,
    /// Sampler used when the texture is bound without an explicit one
    pub sampler: SamplerDesc,
}

impl TextureDesc {
    pub fn usage(&self) -> Usage {
        self.usage.unwrap_or(Usage::Static)
    }

    pub fn mipmaps(&self) -> u32 {
        self.mipmaps.max(1)
    }
}

/// A region of a texture to write into or read from.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TextureEditDesc {
    pub x: u32,
    pub y: u32,
    pub z: u32,
    pub width: u32,
    pub height: u32,
    pub depth: u32,
    pub mip_level: u32,
    pub bytes: Vec<u8>,
}

// ============================================================================
// Programs
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProgramDesc {
    pub vertex: Vec<u8>,
    pub pixel: Vec<u8>,
    pub geometry: Option<Vec<u8>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ComputeDesc {
    pub compute: Vec<u8>,
}

// ============================================================================
// Pipelines
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Face {
    Back,
    Front,
    FrontBack,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Orientation {
    Ccw,
    Cw,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlendFactor {
    Zero,
    One,
    SrcColor,
    OneMinusSrcColor,
    DstColor,
    OneMinusDstColor,
    SrcAlpha,
    OneMinusSrcAlpha,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlendEq {
    Add,
    Subtract,
    Min,
    Max,
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct ColorMask: u8 {
        const RED = 1 << 0;
        const GREEN = 1 << 1;
        const BLUE = 1 << 2;
        const ALPHA = 1 << 3;
        const ALL = Self::RED.bits() | Self::GREEN.bits() | Self::BLUE.bits() | Self::ALPHA.bits();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RasterizerDesc {
    pub cull: Option<bool>,
    pub cull_face: Option<Face>,
    pub cull_front: Option<Orientation>,
    pub scissor: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DepthStencilDesc {
    pub depth: Option<bool>,
    pub depth_write_mask: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BlendDesc {
    pub enabled: Option<bool>,
    pub src_rgb: Option<BlendFactor>,
    pub dst_rgb: Option<BlendFactor>,
    pub src_alpha: Option<BlendFactor>,
    pub dst_alpha: Option<BlendFactor>,
    pub eq_rgb: Option<BlendEq>,
    pub eq_alpha: Option<BlendEq>,
    pub color_mask: Option<ColorMask>,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PipelineDesc {
    pub rasterizer: RasterizerDesc,
    pub depth_stencil: DepthStencilDesc,
    /// When disabled only `blend[0]` is used for every color attachment
    pub independent_blend: Option<bool>,
    pub blend: [BlendDesc; MAX_COLOR_ATTACHMENTS],
    pub program: Program,
}

impl PipelineDesc {
    pub fn new(program: Program) -> Self {
        Self {
            program,
            ..Self::default()
        }
    }

    /// Fills every unset field with its default. Blend slots past the first
    /// are only touched when independent blending is enabled.
    pub fn apply_defaults(&mut self) {
        let rasterizer = &mut self.rasterizer;
        rasterizer.cull.get_or_insert(true);
        rasterizer.cull_face.get_or_insert(Face::Back);
        rasterizer.cull_front.get_or_insert(Orientation::Ccw);
        rasterizer.scissor.get_or_insert(false);

        self.depth_stencil.depth.get_or_insert(true);
        self.depth_stencil.depth_write_mask.get_or_insert(true);

        let independent = *self.independent_blend.get_or_insert(false);
        let slots = if independent { MAX_COLOR_ATTACHMENTS } else { 1 };
        for blend in &mut self.blend[..slots] {
            blend.enabled.get_or_insert(true);
            blend.src_rgb.get_or_insert(BlendFactor::SrcAlpha);
            blend.dst_rgb.get_or_insert(BlendFactor::OneMinusSrcAlpha);
            blend.src_alpha.get_or_insert(BlendFactor::One);
            blend.dst_alpha.get_or_insert(BlendFactor::OneMinusSrcAlpha);
            blend.eq_rgb.get_or_insert(BlendEq::Add);
            blend.eq_alpha.get_or_insert(BlendEq::Add);
            blend.color_mask.get_or_insert(ColorMask::ALL);
        }
    }
}

// ============================================================================
// Passes
// ============================================================================

/// One render target of an offscreen pass: a texture and the mip level drawn into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PassAttachment {
    pub texture: Option<Texture>,
    pub level: u32,
}

impl PassAttachment {
    pub fn new(texture: Texture, level: u32) -> Self {
        Self {
            texture: Some(texture),
            level,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttachmentSlot {
    Color(usize),
    DepthStencil,
}

impl std::fmt::Display for AttachmentSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttachmentSlot::Color(i) => write!(f, "color[{}]", i),
            AttachmentSlot::DepthStencil => write!(f, "depth_stencil"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PassOffscreenDesc {
    pub color: [PassAttachment; MAX_COLOR_ATTACHMENTS],
    pub depth_stencil: PassAttachment,
}

impl PassOffscreenDesc {
    /// Non-empty attachments in declaration order: colors first, then depth/stencil.
    pub fn attachments(&self) -> impl Iterator<Item = (AttachmentSlot, Texture, u32)> + '_ {
        self.color
            .iter()
            .enumerate()
            .map(|(i, a)| (AttachmentSlot::Color(i), a))
            .chain(std::iter::once((AttachmentSlot::DepthStencil, &self.depth_stencil)))
            .filter_map(|(slot, a)| a.texture.map(|t| (slot, t, a.level)))
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct ClearFlags: u8 {
        const COLOR = 1 << 0;
        const DEPTH = 1 << 1;
        const STENCIL = 1 << 2;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ClearDesc {
    pub flags: ClearFlags,
    pub color: [f32; 4],
    pub depth: f32,
    pub stencil: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Primitive {
    #[default]
    Triangles,
    Lines,
    Points,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum IndexType {
    U16,
    #[default]
    U32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VertexInput {
    pub buffer: Buffer,
    pub offset: usize,
    pub stride: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DrawDesc {
    pub primitive: Primitive,
    pub base_element: usize,
    pub elements_count: usize,
    pub instances_count: usize,
    /// At most `MAX_VERTEX_BUFFERS` entries
    pub vertex_buffers: Vec<VertexInput>,
    pub index_buffer: Option<Buffer>,
    pub index_type: IndexType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BufferStorageBindDesc {
    pub buffers: [Option<Buffer>; MAX_STORAGE_BUFFERS],
    pub start_slot: u32,
}

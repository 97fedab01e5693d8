use serde::{Deserialize, Serialize};

use crate::desc::AttachmentSlot;

/// A description record that can never be turned into a valid resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum DescError {
    #[error("texture width must be greater than zero")]
    ZeroWidth,

    #[error("dynamic resource declared without CPU access")]
    DynamicWithoutAccess,

    #[error("static texture cannot have CPU write access")]
    StaticWithWriteAccess,

    #[error("cube map must be square, got {width}x{height}")]
    CubeMapNotSquare { width: u32, height: u32 },

    #[error("uniform buffer size must be a multiple of 16, got {size}")]
    UniformNotAligned { size: usize },

    #[error("initial data is {len} bytes but the buffer holds {size}")]
    DataTooLarge { len: usize, size: usize },
}

/// Offscreen pass construction failures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum PassError {
    #[error("offscreen pass declares no attachments")]
    NoAttachments,

    #[error("attachment {slot} texture was not created as a render target")]
    NotRenderTarget { slot: AttachmentSlot },

    #[error(
        "attachment {slot} resolves to {width}x{height}, expected {expected_width}x{expected_height}"
    )]
    AttachmentSizeMismatch {
        slot: AttachmentSlot,
        width: u32,
        height: u32,
        expected_width: u32,
        expected_height: u32,
    },
}

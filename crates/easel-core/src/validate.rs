//! Description checks and defaulting, run before any handle is allocated.

use easel_protocol::desc::{
    Access, BufferDesc, BufferKind, PassOffscreenDesc, PipelineDesc, Size, TextureDesc, Usage,
};
use easel_protocol::{DescError, HandleKind, PassError};

use crate::registry::{HandleRegistry, Payload};

/// Fills the buffer's defaults and rejects impossible combinations.
pub fn buffer_desc(desc: &mut BufferDesc) -> Result<(), DescError> {
    let usage = *desc.usage.get_or_insert(Usage::Static);
    if usage == Usage::Dynamic && desc.access.is_empty() {
        return Err(DescError::DynamicWithoutAccess);
    }
    if desc.kind == BufferKind::Uniform && desc.size % 16 != 0 {
        return Err(DescError::UniformNotAligned { size: desc.size });
    }
    if let Some(data) = &desc.data {
        if data.len() > desc.size {
            return Err(DescError::DataTooLarge {
                len: data.len(),
                size: desc.size,
            });
        }
    }
    Ok(())
}

pub fn texture_desc(desc: &mut TextureDesc) -> Result<(), DescError> {
    if desc.size.width == 0 {
        return Err(DescError::ZeroWidth);
    }
    let usage = *desc.usage.get_or_insert(Usage::Static);
    if desc.mipmaps == 0 {
        desc.mipmaps = 1;
    }
    if usage == Usage::Dynamic && desc.access.is_empty() {
        return Err(DescError::DynamicWithoutAccess);
    }
    if usage == Usage::Static && desc.access.contains(Access::WRITE) {
        return Err(DescError::StaticWithWriteAccess);
    }
    if desc.cube_map && desc.size.width != desc.size.height {
        return Err(DescError::CubeMapNotSquare {
            width: desc.size.width,
            height: desc.size.height,
        });
    }
    Ok(())
}

pub fn pipeline_desc(desc: &mut PipelineDesc) {
    desc.apply_defaults();
}

/// Resolves the common size of every attachment of an offscreen pass.
///
/// Each attachment's size is its texture's size shifted down by its mip
/// level. The first attachment (colors in slot order, then depth/stencil)
/// fixes the pass size and all others must match it exactly.
pub fn offscreen_size(
    registry: &HandleRegistry,
    desc: &PassOffscreenDesc,
) -> Result<Size, PassError> {
    let mut resolved: Option<Size> = None;
    for (slot, texture, level) in desc.attachments() {
        let record = registry.expect_kind(texture.handle(), HandleKind::Texture);
        let Payload::Texture { desc: texture_desc } = record.payload() else {
            unreachable!("texture handle without texture payload");
        };
        if !texture_desc.render_target {
            return Err(PassError::NotRenderTarget { slot });
        }

        let size = texture_desc.size.at_level(level);
        match resolved {
            None => resolved = Some(Size::new(size.width, size.height)),
            Some(expected) if expected.width != size.width || expected.height != size.height => {
                return Err(PassError::AttachmentSizeMismatch {
                    slot,
                    width: size.width,
                    height: size.height,
                    expected_width: expected.width,
                    expected_height: expected.height,
                });
            }
            Some(_) => {}
        }
    }
    resolved.ok_or(PassError::NoAttachments)
}

//! The shader bundle consumed from the (external) shader-compiler collaborator.
//!
//! This crate does not compile shaders: an `IShaderCompiler`-equivalent collaborator produces a
//! [`ShaderBundle`] of byte code plus reflection tables, and the RHI only consumes it to build
//! pipeline layouts and pipeline state objects.

use std::convert::TryInto;

/// How the shader's raw payload is encoded.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum ShaderFormat {
    /// Human-readable shader source.
    Text,
    /// Compiled byte code (SPIR-V for the Vulkan back-end).
    ByteCode,
}

/// The source or intermediate language the shader was authored/compiled in.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum ShaderLanguage {
    /// Desktop GLSL.
    Glsl,
    /// OpenGL ES Shading Language.
    Essl,
    /// High Level Shading Language.
    Hlsl,
    /// Vulkan-flavored GLSL.
    VkGlsl,
    /// Metal Shading Language.
    MetalSl,
}

/// Which programmable stage a bundle targets.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum ShaderStage {
    /// Vertex stage.
    Vertex,
    /// Fragment/pixel stage.
    Fragment,
    /// Geometry stage.
    Geometry,
    /// Tessellation control (hull) stage.
    TessControl,
    /// Tessellation evaluation (domain) stage.
    TessEval,
    /// Compute stage.
    Compute,
}

bitflags::bitflags! {
    /// Stages a binding or pipeline-layout entry is visible from, used to merge per-stage
    /// bindings sharing a slot (§4.4).
    pub struct ShaderStageFlags: u32 {
        /// Visible from the vertex stage.
        const VERTEX = 0x01;
        /// Visible from the fragment stage.
        const FRAGMENT = 0x02;
        /// Visible from the geometry stage.
        const GEOMETRY = 0x04;
        /// Visible from the tessellation-control stage.
        const TESS_CONTROL = 0x08;
        /// Visible from the tessellation-evaluation stage.
        const TESS_EVAL = 0x10;
        /// Visible from the compute stage.
        const COMPUTE = 0x20;
    }
}

impl From<ShaderStage> for ShaderStageFlags {
    fn from(stage: ShaderStage) -> Self {
        match stage {
            ShaderStage::Vertex => ShaderStageFlags::VERTEX,
            ShaderStage::Fragment => ShaderStageFlags::FRAGMENT,
            ShaderStage::Geometry => ShaderStageFlags::GEOMETRY,
            ShaderStage::TessControl => ShaderStageFlags::TESS_CONTROL,
            ShaderStage::TessEval => ShaderStageFlags::TESS_EVAL,
            ShaderStage::Compute => ShaderStageFlags::COMPUTE,
        }
    }
}

/// Describes a shader bundle's format, language, target stage and entry point.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ShaderDesc {
    /// Encoding of [`ShaderBundle::raw_code`].
    pub format: ShaderFormat,
    /// Source/intermediate language the byte code was produced from.
    pub language: ShaderLanguage,
    /// Compiler-specific profile string (e.g. a GLSL version), opaque to the RHI.
    pub profile: String,
    /// The programmable stage this bundle targets.
    pub stage: ShaderStage,
    /// Name of the entry-point function inside the byte code.
    pub entry_point: String,
}

/// A single vertex input attribute reported by reflection.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ShaderAttribute {
    /// Name as it appears in source.
    pub name: String,
    /// Semantic string (HLSL-style semantic, or the GLSL attribute name).
    pub semantic: String,
    /// Reflected scalar/vector data type, as a GLSL-style type name (e.g. `"vec3"`).
    pub data_type: String,
    /// Vertex shader input location.
    pub location: u32,
    /// Binding point the attribute is sourced from.
    pub binding_point: u32,
    /// Number of array elements, 1 for a scalar/vector attribute.
    pub count: u32,
}

/// A single resource binding reported by reflection, the unit merged by [`BindingTable::merge`].
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ShaderBinding {
    /// The kind of resource bound at this slot.
    pub binding_type: BindingType,
    /// Name as it appears in source, informational only.
    pub name: String,
    /// The stage this binding was reflected from.
    pub stage: ShaderStage,
    /// Descriptor slot number within its set.
    pub slot: u32,
}

/// The kind of shader-visible resource a binding refers to (§4.4's binding-type table).
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum BindingType {
    /// Reflection produced no usable type information.
    Undefined,
    /// A uniform/constant buffer block.
    Block,
    /// A standalone sampler.
    Sampler,
    /// A sampled (read-only) image.
    SampledImage,
    /// A sampler fused with a sampled image (the merge result of `Sampler` + `SampledImage`).
    CombinedImageSampler,
    /// A storage (read-write) image.
    StorageImage,
    /// A storage (read-write) buffer.
    StorageBuffer,
    /// A read-write texel buffer view.
    RwTexelBuffer,
    /// Push/root constants.
    Constants,
}

/// A named uniform/constant-buffer member reported by reflection.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ShaderUniform {
    /// Name as it appears in source.
    pub name: String,
    /// Byte offset within its containing block.
    pub offset: u32,
    /// Array element count, 0 for a non-array member.
    pub array_size: u32,
}

/// Merged (bindings, uniforms, sets) reflection table consumed by [`crate::rhi::PipelineLayoutDesc`].
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct BindingTable {
    /// Individual resource bindings.
    pub bindings: Vec<ShaderBinding>,
    /// Uniform/constant-buffer members.
    pub uniforms: Vec<ShaderUniform>,
    /// Descriptor-set indices referenced by this table.
    pub sets: Vec<u32>,
}

impl BindingTable {
    /// Merges two binding tables the way `create_pipeline_layout` merges per-stage reflection
    /// (§4.4): bindings at the same slot union their stage-visibility flags, and a
    /// `(Sampler, SampledImage)` pair collapses into `CombinedImageSampler`.
    pub fn merge(&self, other: &BindingTable) -> BindingTable {
        let mut merged: Vec<ShaderBinding> = self.bindings.clone();

        for incoming in &other.bindings {
            if let Some(existing) = merged.iter_mut().find(|b| b.slot == incoming.slot) {
                let is_sampler_image_pair = matches!(
                    (existing.binding_type, incoming.binding_type),
                    (BindingType::Sampler, BindingType::SampledImage)
                        | (BindingType::SampledImage, BindingType::Sampler)
                );
                if is_sampler_image_pair {
                    existing.binding_type = BindingType::CombinedImageSampler;
                }
            } else {
                merged.push(incoming.clone());
            }
        }

        let mut uniforms = self.uniforms.clone();
        for u in &other.uniforms {
            if !uniforms.contains(u) {
                uniforms.push(u.clone());
            }
        }

        let mut sets = self.sets.clone();
        for s in &other.sets {
            if !sets.contains(s) {
                sets.push(*s);
            }
        }

        BindingTable { bindings: merged, uniforms, sets }
    }

    /// Returns, for a given slot, the union of stage flags of every reflected binding sharing
    /// that slot across the (already merged) stages that contributed to this table.
    pub fn stage_flags_for_slot(&self, slot: u32, contributing: &[&BindingTable]) -> ShaderStageFlags {
        let mut flags = ShaderStageFlags::empty();
        for table in contributing {
            for binding in &table.bindings {
                if binding.slot == slot {
                    flags |= ShaderStageFlags::from(binding.stage);
                }
            }
        }
        flags
    }

    /// Builds a [`crate::rhi::PipelineLayoutDesc`] from the per-stage reflection tables that
    /// share a pipeline layout (§4.4): bindings are merged pairwise across `stages`, then each
    /// merged slot's stage visibility is recomputed as the union over every contributing table,
    /// so a `(Sampler, SampledImage)` pair collapsed into one `CombinedImageSampler` binding by
    /// `merge` still reports the union of its contributors' stages (e.g. `Vertex | Fragment`)
    /// rather than only the first stage `merge` happened to see.
    pub fn to_pipeline_layout_desc(stages: &[&BindingTable]) -> crate::rhi::PipelineLayoutDesc {
        let mut merged = BindingTable::default();
        for table in stages {
            merged = merged.merge(table);
        }

        let bindings = merged
            .bindings
            .iter()
            .filter_map(|binding| {
                let descriptor_type = crate::rhi::DescriptorType::from_binding_type(binding.binding_type)?;
                Some(crate::rhi::BindingSlot {
                    set: merged.sets.first().copied().unwrap_or(0),
                    binding: binding.slot,
                    count: 1,
                    descriptor_type,
                    stages: merged.stage_flags_for_slot(binding.slot, stages),
                })
            })
            .collect();

        crate::rhi::PipelineLayoutDesc { bindings, sets: merged.sets.clone() }
    }
}

/// An opaque byte-code blob plus reflection tables, consumed by [`crate::rhi::Device`] to build
/// pipeline layouts and pipeline state objects. The RHI never inspects `raw_code` beyond passing
/// it to the native shader-module creation call.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ShaderBundle {
    /// Format/language/stage/entry-point metadata.
    pub desc: ShaderDesc,
    /// Merged resource-binding reflection.
    pub binding_table: BindingTable,
    /// Vertex input attribute reflection (meaningful for vertex-stage bundles only).
    pub attributes: Vec<ShaderAttribute>,
    /// The raw byte code or text payload.
    pub raw_code: Vec<u8>,
}

fn write_len_prefixed(buf: &mut Vec<u8>, bytes: &[u8]) {
    buf.extend_from_slice(&(bytes.len() as u32).to_le_bytes());
    buf.extend_from_slice(bytes);
}

fn read_len_prefixed(bytes: &[u8], cursor: &mut usize) -> Result<Vec<u8>, ArchiveError> {
    let len_bytes: [u8; 4] = bytes
        .get(*cursor..*cursor + 4)
        .ok_or(ArchiveError::Truncated)?
        .try_into()
        .map_err(|_| ArchiveError::Truncated)?;
    let len = u32::from_le_bytes(len_bytes) as usize;
    *cursor += 4;
    let slice = bytes.get(*cursor..*cursor + len).ok_or(ArchiveError::Truncated)?;
    *cursor += len;
    Ok(slice.to_vec())
}

fn write_string(buf: &mut Vec<u8>, s: &str) {
    write_len_prefixed(buf, s.as_bytes());
}

fn read_string(bytes: &[u8], cursor: &mut usize) -> Result<String, ArchiveError> {
    let raw = read_len_prefixed(bytes, cursor)?;
    String::from_utf8(raw).map_err(|_| ArchiveError::InvalidUtf8)
}

fn write_u32(buf: &mut Vec<u8>, value: u32) {
    buf.extend_from_slice(&value.to_le_bytes());
}

fn read_u32(bytes: &[u8], cursor: &mut usize) -> Result<u32, ArchiveError> {
    let value_bytes: [u8; 4] = bytes
        .get(*cursor..*cursor + 4)
        .ok_or(ArchiveError::Truncated)?
        .try_into()
        .map_err(|_| ArchiveError::Truncated)?;
    *cursor += 4;
    Ok(u32::from_le_bytes(value_bytes))
}

fn shader_format_tag(format: ShaderFormat) -> u32 {
    match format {
        ShaderFormat::Text => 0,
        ShaderFormat::ByteCode => 1,
    }
}

fn shader_format_from_tag(tag: u32) -> Result<ShaderFormat, ArchiveError> {
    match tag {
        0 => Ok(ShaderFormat::Text),
        1 => Ok(ShaderFormat::ByteCode),
        _ => Err(ArchiveError::InvalidTag),
    }
}

fn shader_language_tag(language: ShaderLanguage) -> u32 {
    match language {
        ShaderLanguage::Glsl => 0,
        ShaderLanguage::Essl => 1,
        ShaderLanguage::Hlsl => 2,
        ShaderLanguage::VkGlsl => 3,
        ShaderLanguage::MetalSl => 4,
    }
}

fn shader_language_from_tag(tag: u32) -> Result<ShaderLanguage, ArchiveError> {
    match tag {
        0 => Ok(ShaderLanguage::Glsl),
        1 => Ok(ShaderLanguage::Essl),
        2 => Ok(ShaderLanguage::Hlsl),
        3 => Ok(ShaderLanguage::VkGlsl),
        4 => Ok(ShaderLanguage::MetalSl),
        _ => Err(ArchiveError::InvalidTag),
    }
}

fn shader_stage_tag(stage: ShaderStage) -> u32 {
    match stage {
        ShaderStage::Vertex => 0,
        ShaderStage::Fragment => 1,
        ShaderStage::Geometry => 2,
        ShaderStage::TessControl => 3,
        ShaderStage::TessEval => 4,
        ShaderStage::Compute => 5,
    }
}

fn shader_stage_from_tag(tag: u32) -> Result<ShaderStage, ArchiveError> {
    match tag {
        0 => Ok(ShaderStage::Vertex),
        1 => Ok(ShaderStage::Fragment),
        2 => Ok(ShaderStage::Geometry),
        3 => Ok(ShaderStage::TessControl),
        4 => Ok(ShaderStage::TessEval),
        5 => Ok(ShaderStage::Compute),
        _ => Err(ArchiveError::InvalidTag),
    }
}

fn binding_type_tag(binding_type: BindingType) -> u32 {
    match binding_type {
        BindingType::Undefined => 0,
        BindingType::Block => 1,
        BindingType::Sampler => 2,
        BindingType::SampledImage => 3,
        BindingType::CombinedImageSampler => 4,
        BindingType::StorageImage => 5,
        BindingType::StorageBuffer => 6,
        BindingType::RwTexelBuffer => 7,
        BindingType::Constants => 8,
    }
}

fn binding_type_from_tag(tag: u32) -> Result<BindingType, ArchiveError> {
    match tag {
        0 => Ok(BindingType::Undefined),
        1 => Ok(BindingType::Block),
        2 => Ok(BindingType::Sampler),
        3 => Ok(BindingType::SampledImage),
        4 => Ok(BindingType::CombinedImageSampler),
        5 => Ok(BindingType::StorageImage),
        6 => Ok(BindingType::StorageBuffer),
        7 => Ok(BindingType::RwTexelBuffer),
        8 => Ok(BindingType::Constants),
        _ => Err(ArchiveError::InvalidTag),
    }
}

/// Errors produced while reading a serialized [`ShaderBundle`] archive.
#[derive(failure::Fail, Debug, Clone, Eq, PartialEq)]
pub enum ArchiveError {
    /// The byte stream ended before a length-prefixed field could be fully read.
    #[fail(display = "archive truncated")]
    Truncated,
    /// A length-prefixed string field was not valid UTF-8.
    #[fail(display = "archive contains invalid utf-8")]
    InvalidUtf8,
    /// An enum discriminant did not match any known variant.
    #[fail(display = "archive contains an unrecognized enum tag")]
    InvalidTag,
}

impl ShaderBundle {
    /// Serializes this bundle into the versioned archive format named in the external
    /// interfaces: `desc ‖ binding_table ‖ attributes ‖ raw_byte_code`, each field length-prefixed.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        write_u32(&mut buf, 1); // archive version

        write_u32(&mut buf, shader_format_tag(self.desc.format));
        write_u32(&mut buf, shader_language_tag(self.desc.language));
        write_string(&mut buf, &self.desc.profile);
        write_u32(&mut buf, shader_stage_tag(self.desc.stage));
        write_string(&mut buf, &self.desc.entry_point);

        write_u32(&mut buf, self.binding_table.bindings.len() as u32);
        for binding in &self.binding_table.bindings {
            write_u32(&mut buf, binding_type_tag(binding.binding_type));
            write_string(&mut buf, &binding.name);
            write_u32(&mut buf, shader_stage_tag(binding.stage));
            write_u32(&mut buf, binding.slot);
        }
        write_u32(&mut buf, self.binding_table.uniforms.len() as u32);
        for uniform in &self.binding_table.uniforms {
            write_string(&mut buf, &uniform.name);
            write_u32(&mut buf, uniform.offset);
            write_u32(&mut buf, uniform.array_size);
        }
        write_u32(&mut buf, self.binding_table.sets.len() as u32);
        for set in &self.binding_table.sets {
            write_u32(&mut buf, *set);
        }

        write_u32(&mut buf, self.attributes.len() as u32);
        for attribute in &self.attributes {
            write_string(&mut buf, &attribute.name);
            write_string(&mut buf, &attribute.semantic);
            write_string(&mut buf, &attribute.data_type);
            write_u32(&mut buf, attribute.location);
            write_u32(&mut buf, attribute.binding_point);
            write_u32(&mut buf, attribute.count);
        }

        write_len_prefixed(&mut buf, &self.raw_code);
        buf
    }

    /// Deserializes a bundle previously produced by [`ShaderBundle::to_bytes`].
    pub fn from_bytes(bytes: &[u8]) -> Result<ShaderBundle, ArchiveError> {
        let mut cursor = 0usize;
        let _version = read_u32(bytes, &mut cursor)?;

        let format = shader_format_from_tag(read_u32(bytes, &mut cursor)?)?;
        let language = shader_language_from_tag(read_u32(bytes, &mut cursor)?)?;
        let profile = read_string(bytes, &mut cursor)?;
        let stage = shader_stage_from_tag(read_u32(bytes, &mut cursor)?)?;
        let entry_point = read_string(bytes, &mut cursor)?;
        let desc = ShaderDesc { format, language, profile, stage, entry_point };

        let binding_count = read_u32(bytes, &mut cursor)?;
        let mut bindings = Vec::with_capacity(binding_count as usize);
        for _ in 0..binding_count {
            let binding_type = binding_type_from_tag(read_u32(bytes, &mut cursor)?)?;
            let name = read_string(bytes, &mut cursor)?;
            let stage = shader_stage_from_tag(read_u32(bytes, &mut cursor)?)?;
            let slot = read_u32(bytes, &mut cursor)?;
            bindings.push(ShaderBinding { binding_type, name, stage, slot });
        }

        let uniform_count = read_u32(bytes, &mut cursor)?;
        let mut uniforms = Vec::with_capacity(uniform_count as usize);
        for _ in 0..uniform_count {
            let name = read_string(bytes, &mut cursor)?;
            let offset = read_u32(bytes, &mut cursor)?;
            let array_size = read_u32(bytes, &mut cursor)?;
            uniforms.push(ShaderUniform { name, offset, array_size });
        }

        let set_count = read_u32(bytes, &mut cursor)?;
        let mut sets = Vec::with_capacity(set_count as usize);
        for _ in 0..set_count {
            sets.push(read_u32(bytes, &mut cursor)?);
        }

        let binding_table = BindingTable { bindings, uniforms, sets };

        let attribute_count = read_u32(bytes, &mut cursor)?;
        let mut attributes = Vec::with_capacity(attribute_count as usize);
        for _ in 0..attribute_count {
            let name = read_string(bytes, &mut cursor)?;
            let semantic = read_string(bytes, &mut cursor)?;
            let data_type = read_string(bytes, &mut cursor)?;
            let location = read_u32(bytes, &mut cursor)?;
            let binding_point = read_u32(bytes, &mut cursor)?;
            let count = read_u32(bytes, &mut cursor)?;
            attributes.push(ShaderAttribute { name, semantic, data_type, location, binding_point, count });
        }

        let raw_code = read_len_prefixed(bytes, &mut cursor)?;

        Ok(ShaderBundle { desc, binding_table, attributes, raw_code })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_bundle() -> ShaderBundle {
        ShaderBundle {
            desc: ShaderDesc {
                format: ShaderFormat::ByteCode,
                language: ShaderLanguage::VkGlsl,
                profile: "450".to_string(),
                stage: ShaderStage::Vertex,
                entry_point: "main".to_string(),
            },
            binding_table: BindingTable {
                bindings: vec![ShaderBinding {
                    binding_type: BindingType::Block,
                    name: "PerFrame".to_string(),
                    stage: ShaderStage::Vertex,
                    slot: 0,
                }],
                uniforms: vec![ShaderUniform { name: "model".to_string(), offset: 0, array_size: 0 }],
                sets: vec![0],
            },
            attributes: vec![ShaderAttribute {
                name: "position".to_string(),
                semantic: "POSITION".to_string(),
                data_type: "vec3".to_string(),
                location: 0,
                binding_point: 0,
                count: 1,
            }],
            raw_code: vec![1, 2, 3, 4, 5, 255, 0],
        }
    }

    #[test]
    fn round_trip_preserves_raw_code_and_tables() {
        let bundle = sample_bundle();
        let bytes = bundle.to_bytes();
        let decoded = ShaderBundle::from_bytes(&bytes).unwrap();
        assert_eq!(bundle, decoded);
    }

    #[test]
    fn truncated_archive_errors_instead_of_panicking() {
        let bundle = sample_bundle();
        let mut bytes = bundle.to_bytes();
        bytes.truncate(bytes.len() - 3);
        assert!(ShaderBundle::from_bytes(&bytes).is_err());
    }

    #[test]
    fn merge_collapses_sampler_and_sampled_image_to_combined() {
        let vertex = BindingTable {
            bindings: vec![ShaderBinding {
                binding_type: BindingType::Sampler,
                name: "s".to_string(),
                stage: ShaderStage::Vertex,
                slot: 0,
            }],
            uniforms: vec![],
            sets: vec![0],
        };
        let fragment = BindingTable {
            bindings: vec![ShaderBinding {
                binding_type: BindingType::SampledImage,
                name: "tex".to_string(),
                stage: ShaderStage::Fragment,
                slot: 0,
            }],
            uniforms: vec![],
            sets: vec![0],
        };

        let merged = vertex.merge(&fragment);
        assert_eq!(merged.bindings.len(), 1);
        assert_eq!(merged.bindings[0].binding_type, BindingType::CombinedImageSampler);

        let flags = merged.stage_flags_for_slot(0, &[&vertex, &fragment]);
        assert_eq!(flags, ShaderStageFlags::VERTEX | ShaderStageFlags::FRAGMENT);
    }

    #[test]
    fn pipeline_layout_desc_unions_stages_across_a_collapsed_combined_sampler() {
        let vertex = BindingTable {
            bindings: vec![ShaderBinding { binding_type: BindingType::Sampler, name: "s".to_string(), stage: ShaderStage::Vertex, slot: 0 }],
            uniforms: vec![],
            sets: vec![0],
        };
        let fragment = BindingTable {
            bindings: vec![ShaderBinding { binding_type: BindingType::SampledImage, name: "tex".to_string(), stage: ShaderStage::Fragment, slot: 0 }],
            uniforms: vec![],
            sets: vec![0],
        };

        let desc = BindingTable::to_pipeline_layout_desc(&[&vertex, &fragment]);
        assert_eq!(desc.bindings.len(), 1);
        assert_eq!(desc.bindings[0].descriptor_type, crate::rhi::DescriptorType::CombinedImageSampler);
        assert_eq!(desc.bindings[0].stages, ShaderStageFlags::VERTEX | ShaderStageFlags::FRAGMENT);
    }
}

//! Shadow hypervolume computer
//!
//! Per-tetrahedron alias-free shadow volumes after Sintorn, Olsson &
//! Assarsson 2011, generalized to 4D: every tetrahedral cell of a shadow
//! caster spans, together with the light, a 4D shadow wedge bounded by five
//! hyperplanes. Visible-sample positions from the G-buffer are reduced into
//! a hierarchical grid of view-space AABBs, then every cell's wedge is
//! tested against the hierarchy and its shadow bits are set per tile or per
//! pixel.
//!
//! The computation runs in two compute phases on one command encoder:
//!
//! 1. [`ShadowHypervolumes::precompute`] clears the AABB and shadow-bit
//!    buffers and dispatches the reduction shader, one 8x4 workgroup per
//!    level-3 cell, which folds the tile bounds up through every coarser
//!    level with atomics.
//! 2. [`ShadowHypervolumes::compute`] uploads this frame's model transforms
//!    and dispatches the hyperplane-test shader, one 32-thread workgroup per
//!    tetrahedron.
//!
//! wgpu orders the two passes on the same encoder, so the second phase sees
//! the completed AABB hierarchy without explicit barriers.

use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use tetra4d_core::ShadowGeometry;
use tetra4d_math::{Mat4, Vec4};

use crate::hierarchy;

/// Per-frame uniforms shared by both compute shaders, mirrored in
/// `shaders/reduction.wgsl` and `shaders/shadow_test.wgsl`.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct ShadowUniforms {
    /// World-to-view rotation, column-major.
    pub view_matrix: [f32; 16],
    /// World-to-view translation.
    pub view_translation: [f32; 4],
    /// Light position, world space.
    pub light_pos: [f32; 4],
    /// G-buffer size in pixels.
    pub screen_size: [u32; 2],
    /// Number of shadow-casting tetrahedra.
    pub cell_count: u32,
    pub _padding: u32,
}

impl ShadowUniforms {
    pub fn new(view_matrix: Mat4, view_translation: Vec4, light_pos: Vec4) -> Self {
        Self {
            view_matrix: view_matrix.to_flat(),
            view_translation: view_translation.to_array(),
            light_pos: light_pos.to_array(),
            screen_size: [0, 0],
            cell_count: 0,
            _padding: 0,
        }
    }
}

/// GPU resources for the two-phase shadow computation.
///
/// The static shadow geometry (cells, per-cell object indices, model-space
/// vertices) is uploaded once at [`ShadowHypervolumes::new`] /
/// [`reinit`](ShadowHypervolumes::reinit); only the model transforms and the
/// uniforms change per frame.
#[allow(dead_code)] // Fields hold GPU resources that must outlive bind groups
pub struct ShadowHypervolumes {
    reduction_pipeline: wgpu::ComputePipeline,
    test_pipeline: wgpu::ComputePipeline,
    storage_layout: wgpu::BindGroupLayout,
    frame_layout: wgpu::BindGroupLayout,

    /// Tetrahedron index quadruples, binding 0.
    cell_buffer: wgpu::Buffer,
    /// Per-tetrahedron transform slot, binding 1.
    object_index_buffer: wgpu::Buffer,
    /// Model-space vertex positions, binding 2.
    vertex_buffer: wgpu::Buffer,
    /// Per-object model rotations, binding 3, rewritten every frame.
    model_matrix_buffer: wgpu::Buffer,
    /// Per-object model translations, binding 4, rewritten every frame.
    model_translation_buffer: wgpu::Buffer,
    /// View-space AABB hierarchy, binding 5: 8 encoded words per cell.
    aabb_buffer: wgpu::Buffer,
    /// Shadow bits, binding 6: one bit per hierarchy cell, then one per pixel.
    shadow_buffer: wgpu::Buffer,
    uniform_buffer: wgpu::Buffer,

    storage_bind_group: wgpu::BindGroup,
    frame_bind_group: wgpu::BindGroup,

    width: u32,
    height: u32,
    cell_count: u32,
    object_count: u32,
}

/// Encoded min/max words per AABB hierarchy cell (4 components each way).
const AABB_WORDS_PER_CELL: u64 = 8;

impl ShadowHypervolumes {
    pub fn new(
        device: &wgpu::Device,
        width: u32,
        height: u32,
        position_view: &wgpu::TextureView,
        shadow: &ShadowGeometry,
        object_count: usize,
    ) -> Self {
        let storage_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Shadow Storage Bind Group Layout"),
            entries: &[
                // Cells, object indices, vertices, model matrices, model
                // translations: read-only
                read_only_storage_entry(0),
                read_only_storage_entry(1),
                read_only_storage_entry(2),
                read_only_storage_entry(3),
                read_only_storage_entry(4),
                // AABB hierarchy and shadow bits: read-write
                storage_entry(5),
                storage_entry(6),
            ],
        });

        let frame_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Shadow Frame Bind Group Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                // View-space position G-buffer target
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: false },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Shadow Pipeline Layout"),
            bind_group_layouts: &[&storage_layout, &frame_layout],
            push_constant_ranges: &[],
        });

        let reduction_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Shadow Reduction Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/reduction.wgsl").into()),
        });
        let test_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Shadow Test Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/shadow_test.wgsl").into()),
        });

        let reduction_pipeline =
            device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
                label: Some("Shadow Reduction Pipeline"),
                layout: Some(&pipeline_layout),
                module: &reduction_shader,
                entry_point: Some("main"),
                compilation_options: wgpu::PipelineCompilationOptions::default(),
                cache: None,
            });
        let test_pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("Shadow Test Pipeline"),
            layout: Some(&pipeline_layout),
            module: &test_shader,
            entry_point: Some("main"),
            compilation_options: wgpu::PipelineCompilationOptions::default(),
            cache: None,
        });

        let resources = ShadowResources::create(
            device,
            &storage_layout,
            &frame_layout,
            width,
            height,
            position_view,
            shadow,
            object_count,
        );

        log::info!(
            "shadow hypervolumes: {} cells, {} objects, {}x{} screen",
            shadow.cell_count(),
            object_count,
            width,
            height
        );

        Self {
            reduction_pipeline,
            test_pipeline,
            storage_layout,
            frame_layout,
            cell_buffer: resources.cell_buffer,
            object_index_buffer: resources.object_index_buffer,
            vertex_buffer: resources.vertex_buffer,
            model_matrix_buffer: resources.model_matrix_buffer,
            model_translation_buffer: resources.model_translation_buffer,
            aabb_buffer: resources.aabb_buffer,
            shadow_buffer: resources.shadow_buffer,
            uniform_buffer: resources.uniform_buffer,
            storage_bind_group: resources.storage_bind_group,
            frame_bind_group: resources.frame_bind_group,
            width,
            height,
            cell_count: shadow.cell_count() as u32,
            object_count: object_count as u32,
        }
    }

    /// Rebuild every size-dependent resource. Called on window resize and
    /// whenever the set of shadow casters changes. Pipelines are kept.
    pub fn reinit(
        &mut self,
        device: &wgpu::Device,
        width: u32,
        height: u32,
        position_view: &wgpu::TextureView,
        shadow: &ShadowGeometry,
        object_count: usize,
    ) {
        let resources = ShadowResources::create(
            device,
            &self.storage_layout,
            &self.frame_layout,
            width,
            height,
            position_view,
            shadow,
            object_count,
        );
        self.cell_buffer = resources.cell_buffer;
        self.object_index_buffer = resources.object_index_buffer;
        self.vertex_buffer = resources.vertex_buffer;
        self.model_matrix_buffer = resources.model_matrix_buffer;
        self.model_translation_buffer = resources.model_translation_buffer;
        self.aabb_buffer = resources.aabb_buffer;
        self.shadow_buffer = resources.shadow_buffer;
        self.uniform_buffer = resources.uniform_buffer;
        self.storage_bind_group = resources.storage_bind_group;
        self.frame_bind_group = resources.frame_bind_group;
        self.width = width;
        self.height = height;
        self.cell_count = shadow.cell_count() as u32;
        self.object_count = object_count as u32;
        log::debug!(
            "shadow hypervolumes reinit: {} cells, {}x{}",
            self.cell_count,
            width,
            height
        );
    }

    /// Upload this frame's uniforms. `screen_size` and `cell_count` are
    /// filled in here so callers only provide camera and light state.
    pub fn write_uniforms(&self, queue: &wgpu::Queue, uniforms: &ShadowUniforms) {
        let uniforms = ShadowUniforms {
            screen_size: [self.width, self.height],
            cell_count: self.cell_count,
            ..*uniforms
        };
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));
    }

    /// Phase one: clear the AABB hierarchy and shadow bits, then reduce the
    /// G-buffer positions into per-tile view-space bounds. Must run after
    /// the geometry pass on the same encoder.
    pub fn precompute(&self, encoder: &mut wgpu::CommandEncoder) {
        // A zero word decodes below every encoded float, so a cleared cell
        // is an empty AABB.
        encoder.clear_buffer(&self.aabb_buffer, 0, None);
        encoder.clear_buffer(&self.shadow_buffer, 0, None);

        let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some("Shadow Reduction Pass"),
            timestamp_writes: None,
        });
        pass.set_pipeline(&self.reduction_pipeline);
        pass.set_bind_group(0, &self.storage_bind_group, &[]);
        pass.set_bind_group(1, &self.frame_bind_group, &[]);
        pass.dispatch_workgroups(self.width.div_ceil(8), self.height.div_ceil(4), 1);
    }

    /// Phase two: upload the frame's model transforms and test every
    /// tetrahedron's shadow wedge against the hierarchy.
    ///
    /// `model_matrices[i]` and `model_translations[i]` must be the world
    /// transform of object slot `i` from the same traversal that produced
    /// the shadow geometry's object indices.
    pub fn compute(
        &self,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        model_matrices: &[Mat4],
        model_translations: &[Vec4],
    ) {
        debug_assert_eq!(model_matrices.len(), model_translations.len());
        debug_assert_eq!(model_matrices.len() as u32, self.object_count);

        if self.cell_count == 0 {
            return;
        }

        queue.write_buffer(
            &self.model_matrix_buffer,
            0,
            bytemuck::cast_slice(model_matrices),
        );
        queue.write_buffer(
            &self.model_translation_buffer,
            0,
            bytemuck::cast_slice(model_translations),
        );

        let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some("Shadow Test Pass"),
            timestamp_writes: None,
        });
        pass.set_pipeline(&self.test_pipeline);
        pass.set_bind_group(0, &self.storage_bind_group, &[]);
        pass.set_bind_group(1, &self.frame_bind_group, &[]);
        pass.dispatch_workgroups(self.cell_count, 1, 1);
    }

    /// Shadow-bit buffer, consumed by the shading pass.
    pub fn shadow_bits(&self) -> &wgpu::Buffer {
        &self.shadow_buffer
    }
}

/// Size-dependent buffers and bind groups, grouped so `new` and `reinit`
/// share one construction path.
struct ShadowResources {
    cell_buffer: wgpu::Buffer,
    object_index_buffer: wgpu::Buffer,
    vertex_buffer: wgpu::Buffer,
    model_matrix_buffer: wgpu::Buffer,
    model_translation_buffer: wgpu::Buffer,
    aabb_buffer: wgpu::Buffer,
    shadow_buffer: wgpu::Buffer,
    uniform_buffer: wgpu::Buffer,
    storage_bind_group: wgpu::BindGroup,
    frame_bind_group: wgpu::BindGroup,
}

impl ShadowResources {
    #[allow(clippy::too_many_arguments)]
    fn create(
        device: &wgpu::Device,
        storage_layout: &wgpu::BindGroupLayout,
        frame_layout: &wgpu::BindGroupLayout,
        width: u32,
        height: u32,
        position_view: &wgpu::TextureView,
        shadow: &ShadowGeometry,
        object_count: usize,
    ) -> Self {
        // Zero-length bindings are invalid, so empty scenes still get one
        // slot of each static buffer.
        let cells: &[u32] = if shadow.cells.is_empty() {
            &[0, 0, 0, 0]
        } else {
            &shadow.cells
        };
        let object_indices: &[u32] = if shadow.object_indices.is_empty() {
            &[0]
        } else {
            &shadow.object_indices
        };
        let vertices: &[Vec4] = if shadow.vertices.is_empty() {
            &[Vec4::ZERO]
        } else {
            &shadow.vertices
        };

        let cell_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Shadow Cell Buffer"),
            contents: bytemuck::cast_slice(cells),
            usage: wgpu::BufferUsages::STORAGE,
        });
        let object_index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Shadow Object Index Buffer"),
            contents: bytemuck::cast_slice(object_indices),
            usage: wgpu::BufferUsages::STORAGE,
        });
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Shadow Vertex Buffer"),
            contents: bytemuck::cast_slice(vertices),
            usage: wgpu::BufferUsages::STORAGE,
        });

        let object_slots = object_count.max(1) as u64;
        let model_matrix_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Shadow Model Matrix Buffer"),
            size: object_slots * std::mem::size_of::<Mat4>() as u64,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let model_translation_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Shadow Model Translation Buffer"),
            size: object_slots * std::mem::size_of::<Vec4>() as u64,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let aabb_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Shadow AABB Hierarchy Buffer"),
            size: hierarchy::HIERARCHY_CELLS as u64 * AABB_WORDS_PER_CELL * 4,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let shadow_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Shadow Bit Buffer"),
            size: hierarchy::shadow_word_count(width, height) * 4,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Shadow Uniform Buffer"),
            size: std::mem::size_of::<ShadowUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let storage_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Shadow Storage Bind Group"),
            layout: storage_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: cell_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: object_index_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: vertex_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: model_matrix_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 4,
                    resource: model_translation_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 5,
                    resource: aabb_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 6,
                    resource: shadow_buffer.as_entire_binding(),
                },
            ],
        });
        let frame_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Shadow Frame Bind Group"),
            layout: frame_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(position_view),
                },
            ],
        });

        Self {
            cell_buffer,
            object_index_buffer,
            vertex_buffer,
            model_matrix_buffer,
            model_translation_buffer,
            aabb_buffer,
            shadow_buffer,
            uniform_buffer,
            storage_bind_group,
            frame_bind_group,
        }
    }
}

fn read_only_storage_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::COMPUTE,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Storage { read_only: true },
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

fn storage_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::COMPUTE,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Storage { read_only: false },
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniforms_layout() {
        // Uniform block layout shared with the shaders: matrix, two vec4s,
        // then a 16-byte tail.
        assert_eq!(std::mem::size_of::<ShadowUniforms>(), 112);
        let u = ShadowUniforms::new(Mat4::IDENTITY, Vec4::ZERO, Vec4::ONE);
        assert_eq!(u.view_matrix[0], 1.0);
        assert_eq!(u.view_matrix[1], 0.0);
        assert_eq!(u.light_pos, [1.0; 4]);
    }
}

//! GPU upload of tetrahedral meshes
//!
//! A [`GpuMesh`] holds the vertex and index buffers for one `Geometry4`.
//! The geometry pass rasterizes the four triangular faces of every
//! tetrahedron, so the index buffer is expanded to 12 indices per cell.

use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use tetra4d_core::Geometry4;

/// Interleaved vertex layout shared with `shaders/geometry.wgsl`.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct GpuVertex {
    pub position: [f32; 4],
    pub normal: [f32; 4],
}

impl GpuVertex {
    pub const LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<GpuVertex>() as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &wgpu::vertex_attr_array![0 => Float32x4, 1 => Float32x4],
    };
}

/// A `Geometry4` uploaded to the GPU, ready for the geometry pass.
pub struct GpuMesh {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub index_count: u32,
}

impl GpuMesh {
    /// Upload a geometry. Normals must have been computed
    /// (`recompute_normals`) before uploading.
    pub fn new(device: &wgpu::Device, geometry: &Geometry4) -> Self {
        debug_assert_eq!(
            geometry.vertices.len(),
            geometry.normals.len(),
            "upload requires computed normals"
        );

        let vertices: Vec<GpuVertex> = geometry
            .vertices
            .iter()
            .zip(&geometry.normals)
            .map(|(v, n)| GpuVertex {
                position: v.to_array(),
                normal: n.to_array(),
            })
            .collect();

        let indices = face_indices(geometry);

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Mesh Vertex Buffer"),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Mesh Index Buffer"),
            contents: bytemuck::cast_slice(&indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        log::debug!(
            "uploaded mesh: {} vertices, {} cells, {} face indices",
            vertices.len(),
            geometry.cell_count(),
            indices.len()
        );

        Self {
            vertex_buffer,
            index_buffer,
            index_count: indices.len() as u32,
        }
    }
}

/// The four triangular faces of every tetrahedron, for both indexed and
/// unindexed meshes.
fn face_indices(geometry: &Geometry4) -> Vec<u32> {
    let mut indices = Vec::with_capacity(geometry.cell_count() * 12);
    let mut push_cell_faces = |a: u32, b: u32, c: u32, d: u32| {
        indices.extend_from_slice(&[a, b, c, a, b, d, a, c, d, b, c, d]);
    };
    if geometry.is_indexed() {
        for cell in geometry.cells.chunks_exact(4) {
            push_cell_faces(cell[0], cell[1], cell[2], cell[3]);
        }
    } else {
        for base in (0..geometry.vertices.len() as u32).step_by(4) {
            push_cell_faces(base, base + 1, base + 2, base + 3);
        }
    }
    indices
}

#[cfg(test)]
mod tests {
    use super::*;
    use tetra4d_core::{CUBE_CORNERS, CUBE_TETRAHEDRA};

    #[test]
    fn test_face_indices_indexed() {
        let g = Geometry4::from_3d(&CUBE_CORNERS, &CUBE_TETRAHEDRA);
        let indices = face_indices(&g);
        assert_eq!(indices.len(), 6 * 12);
        // first cell {0,3,5,4} expands into its four faces
        assert_eq!(&indices[..12], &[0, 3, 5, 0, 3, 4, 0, 5, 4, 3, 5, 4]);
    }

    #[test]
    fn test_face_indices_unindexed() {
        let mut g = Geometry4::from_3d(&CUBE_CORNERS, &CUBE_TETRAHEDRA);
        g.unindex();
        let indices = face_indices(&g);
        assert_eq!(indices.len(), 6 * 12);
        assert_eq!(&indices[..12], &[0, 1, 2, 0, 1, 3, 0, 2, 3, 1, 2, 3]);
        assert!(indices.iter().all(|&i| i < 24));
    }
}

use std::mem;
use thiserror::Error;

use crate::render::backend::{BufferId, BufferTarget, GlBackend, VertexArrayId};

/// Floats per vertex; positions only.
pub const POSITION_COMPONENTS: usize = 3;

const POSITION_ATTRIBUTE: u32 = 0;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GeometryError {
    #[error("Vertex data has {0} floats, not a multiple of 3")]
    MisalignedVertices(usize),
    #[error("Index {index} is out of range for {vertex_count} vertices")]
    IndexOutOfRange { index: u32, vertex_count: usize },
    #[error("Driver returned no name for a new {0}")]
    ObjectCreation(&'static str),
}

/// Static triangle data: xyz positions plus optional `u32` indices.
#[derive(Debug, Clone, PartialEq)]
pub struct Geometry {
    pub vertices: Vec<f32>,
    pub indices: Option<Vec<u32>>,
}

impl Geometry {
    pub fn new(vertices: &[f32]) -> Self {
        Self {
            vertices: vertices.to_vec(),
            indices: None,
        }
    }

    pub fn indexed(vertices: &[f32], indices: &[u32]) -> Self {
        Self {
            vertices: vertices.to_vec(),
            indices: Some(indices.to_vec()),
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / POSITION_COMPONENTS
    }

    pub fn index_count(&self) -> usize {
        self.indices.as_ref().map_or(0, Vec::len)
    }

    pub fn validate(&self) -> Result<(), GeometryError> {
        if self.vertices.len() % POSITION_COMPONENTS != 0 {
            return Err(GeometryError::MisalignedVertices(self.vertices.len()));
        }

        let vertex_count = self.vertex_count();
        if let Some(index) = self
            .indices
            .iter()
            .flatten()
            .copied()
            .find(|&i| i as usize >= vertex_count)
        {
            return Err(GeometryError::IndexOutOfRange {
                index,
                vertex_count,
            });
        }

        Ok(())
    }
}

/// GPU copies of one [`Geometry`]: a vertex array object recording the
/// position attribute, its vertex buffer and an optional element buffer.
#[derive(Debug)]
pub struct GeometryBuffers {
    vertex_array: VertexArrayId,
    vertex_buffer: BufferId,
    element_buffer: Option<BufferId>,
}

impl GeometryBuffers {
    pub fn upload<G: GlBackend + ?Sized>(
        gl: &mut G,
        geometry: &Geometry,
    ) -> Result<Self, GeometryError> {
        geometry.validate()?;

        let vertex_array = gl
            .create_vertex_array()
            .ok_or(GeometryError::ObjectCreation("vertex array"))?;
        let vertex_buffer = gl
            .create_buffer()
            .ok_or(GeometryError::ObjectCreation("vertex buffer"))?;
        let element_buffer = match geometry.indices {
            Some(_) => Some(
                gl.create_buffer()
                    .ok_or(GeometryError::ObjectCreation("element buffer"))?,
            ),
            None => None,
        };

        gl.bind_vertex_array(Some(vertex_array));

        gl.bind_buffer(BufferTarget::Array, Some(vertex_buffer));
        gl.buffer_data(BufferTarget::Array, bytemuck::cast_slice(&geometry.vertices));
        gl.vertex_attrib_pointer_f32(
            POSITION_ATTRIBUTE,
            POSITION_COMPONENTS as i32,
            (POSITION_COMPONENTS * mem::size_of::<f32>()) as i32,
            0,
        );
        gl.enable_vertex_attrib_array(POSITION_ATTRIBUTE);

        if let (Some(ebo), Some(indices)) = (element_buffer, &geometry.indices) {
            // The element binding is vertex-array state, so it stays bound.
            gl.bind_buffer(BufferTarget::ElementArray, Some(ebo));
            gl.buffer_data(BufferTarget::ElementArray, bytemuck::cast_slice(indices));
        }

        gl.bind_buffer(BufferTarget::Array, None);
        gl.bind_vertex_array(None);

        log::debug!(
            "Uploaded {} vertices, {} indices into vertex array {}",
            geometry.vertex_count(),
            geometry.index_count(),
            vertex_array
        );

        Ok(Self {
            vertex_array,
            vertex_buffer,
            element_buffer,
        })
    }

    pub fn bind<G: GlBackend + ?Sized>(&self, gl: &mut G) {
        gl.bind_vertex_array(Some(self.vertex_array));
    }

    pub fn release<G: GlBackend + ?Sized>(self, gl: &mut G) {
        gl.delete_vertex_array(self.vertex_array);
        gl.delete_buffer(self.vertex_buffer);
        if let Some(ebo) = self.element_buffer {
            gl.delete_buffer(ebo);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::headless::{GlCall, HeadlessGl};

    const QUAD: [f32; 12] = [
        -0.5, -0.5, 0.0, //
        -0.5, 0.5, 0.0, //
        0.5, 0.5, 0.0, //
        0.5, -0.5, 0.0,
    ];

    #[test]
    fn test_validate() {
        assert!(Geometry::new(&QUAD).validate().is_ok());
        assert_eq!(
            Geometry::new(&QUAD[..11]).validate(),
            Err(GeometryError::MisalignedVertices(11))
        );
        assert_eq!(
            Geometry::indexed(&QUAD, &[0, 1, 4]).validate(),
            Err(GeometryError::IndexOutOfRange {
                index: 4,
                vertex_count: 4
            })
        );
    }

    #[test]
    fn test_upload_indexed() {
        let mut gl = HeadlessGl::new();
        let quad = Geometry::indexed(&QUAD, &[0, 1, 2, 3, 0, 2]);
        let buffers = GeometryBuffers::upload(&mut gl, &quad).unwrap();

        assert_eq!(gl.live_buffer_count(), 2);
        assert_eq!(gl.live_vertex_array_count(), 1);

        let calls = gl.take_calls();
        assert!(calls.contains(&GlCall::BufferData(BufferTarget::Array, 48)));
        assert!(calls.contains(&GlCall::BufferData(BufferTarget::ElementArray, 24)));
        assert!(calls.contains(&GlCall::VertexAttribPointer {
            index: 0,
            components: 3,
            stride: 12,
            offset: 0
        }));
        assert_eq!(calls.last(), Some(&GlCall::BindVertexArray(None)));

        buffers.release(&mut gl);
        assert_eq!(gl.live_buffer_count(), 0);
        assert_eq!(gl.live_vertex_array_count(), 0);
        assert_eq!(gl.invalid_deletes(), 0);
    }

    #[test]
    fn test_upload_rejects_bad_data_before_allocating() {
        let mut gl = HeadlessGl::new();
        let err = GeometryBuffers::upload(&mut gl, &Geometry::new(&[0.0, 1.0])).unwrap_err();

        assert_eq!(err, GeometryError::MisalignedVertices(2));
        assert_eq!(gl.live_buffer_count(), 0);
        assert_eq!(gl.live_vertex_array_count(), 0);
    }
}

//! The slice of OpenGL the renderer talks to.
//!
//! Everything above this module issues graphics commands through
//! [`GlBackend`], so the program builder, geometry upload and the frame loop
//! run unchanged against the native function table or the headless recorder.

use std::ffi::CStr;
use std::fmt;
use std::num::NonZeroU32;

use crate::render::pipeline::DrawMode;
use crate::render::shaders::ShaderStage;

macro_rules! gl_name {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name(NonZeroU32);

        impl $name {
            /// Wraps a raw GL name. Zero is the "no object" name and yields `None`.
            pub fn new(raw: u32) -> Option<Self> {
                NonZeroU32::new(raw).map(Self)
            }

            pub fn get(self) -> u32 {
                self.0.get()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

gl_name!(
    /// A compiled (or failed) shader object.
    ShaderId
);
gl_name!(
    /// A linked program object.
    ProgramId
);
gl_name!(BufferId);
gl_name!(VertexArrayId);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferTarget {
    Array,
    ElementArray,
}

/// Graphics entry points used by this crate.
///
/// Implementations assume a current context on the calling thread; the
/// native backend can only be obtained from a successful bootstrap.
pub trait GlBackend {
    fn create_shader(&mut self, stage: ShaderStage) -> Option<ShaderId>;
    fn shader_source(&mut self, shader: ShaderId, source: &CStr);
    fn compile_shader(&mut self, shader: ShaderId);
    fn compile_status(&mut self, shader: ShaderId) -> bool;
    /// Returns at most `capacity - 1` bytes of the compiler log.
    fn shader_info_log(&mut self, shader: ShaderId, capacity: usize) -> String;
    fn delete_shader(&mut self, shader: ShaderId);

    fn create_program(&mut self) -> Option<ProgramId>;
    fn attach_shader(&mut self, program: ProgramId, shader: ShaderId);
    fn link_program(&mut self, program: ProgramId);
    fn link_status(&mut self, program: ProgramId) -> bool;
    /// Returns at most `capacity - 1` bytes of the linker log.
    fn program_info_log(&mut self, program: ProgramId, capacity: usize) -> String;
    fn use_program(&mut self, program: Option<ProgramId>);
    fn delete_program(&mut self, program: ProgramId);

    fn create_vertex_array(&mut self) -> Option<VertexArrayId>;
    fn bind_vertex_array(&mut self, vertex_array: Option<VertexArrayId>);
    fn delete_vertex_array(&mut self, vertex_array: VertexArrayId);

    fn create_buffer(&mut self) -> Option<BufferId>;
    fn bind_buffer(&mut self, target: BufferTarget, buffer: Option<BufferId>);
    /// Uploads `data` once with a static-draw usage hint.
    fn buffer_data(&mut self, target: BufferTarget, data: &[u8]);
    fn delete_buffer(&mut self, buffer: BufferId);

    /// Describes float attribute `index` of the bound array buffer.
    fn vertex_attrib_pointer_f32(
        &mut self,
        index: u32,
        components: i32,
        stride: i32,
        offset: usize,
    );
    fn enable_vertex_attrib_array(&mut self, index: u32);

    fn viewport(&mut self, x: i32, y: i32, width: i32, height: i32);
    fn clear_color(&mut self, rgba: [f32; 4]);
    /// Clears the colour buffer only.
    fn clear(&mut self);
    fn polygon_mode(&mut self, mode: DrawMode);

    /// Draws `count` vertices as triangles starting at `first`.
    fn draw_arrays(&mut self, first: i32, count: i32);
    /// Draws `count` `u32` indices as triangles, `offset` bytes into the element buffer.
    fn draw_elements(&mut self, count: i32, offset: usize);
}

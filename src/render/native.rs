use gl::types::*;
use std::ffi::CStr;
use std::ptr;

use crate::render::backend::{BufferId, BufferTarget, GlBackend, ProgramId, ShaderId, VertexArrayId};
use crate::render::pipeline::DrawMode;
use crate::render::shaders::ShaderStage;

/// [`GlBackend`] over the loaded `gl` function table.
///
/// Only constructed by the context bootstrap after the context was made
/// current and the entry points were resolved, which is what makes the
/// `unsafe` blocks below sound.
#[derive(Debug)]
pub struct NativeGl {
    _not_send: std::marker::PhantomData<*const ()>,
}

impl NativeGl {
    /// # Safety
    /// The caller must have made a GL context current on this thread and
    /// loaded the `gl` function pointers for it.
    pub(crate) unsafe fn assume_current() -> Self {
        Self {
            _not_send: std::marker::PhantomData,
        }
    }

    fn read_log(
        len: GLint,
        capacity: usize,
        fill: impl FnOnce(GLsizei, *mut GLsizei, *mut GLchar),
    ) -> String {
        let len = (len.max(0) as usize).min(capacity);
        if len == 0 {
            return String::new();
        }

        let mut buffer: Vec<u8> = vec![0; len];
        let mut written: GLsizei = 0;
        fill(len as GLsizei, &mut written, buffer.as_mut_ptr() as *mut GLchar);
        buffer.truncate(written.max(0) as usize);
        String::from_utf8_lossy(&buffer).trim_end().to_string()
    }
}

fn shader_kind(stage: ShaderStage) -> GLenum {
    match stage {
        ShaderStage::Vertex => gl::VERTEX_SHADER,
        ShaderStage::Fragment => gl::FRAGMENT_SHADER,
    }
}

fn buffer_kind(target: BufferTarget) -> GLenum {
    match target {
        BufferTarget::Array => gl::ARRAY_BUFFER,
        BufferTarget::ElementArray => gl::ELEMENT_ARRAY_BUFFER,
    }
}

impl GlBackend for NativeGl {
    fn create_shader(&mut self, stage: ShaderStage) -> Option<ShaderId> {
        ShaderId::new(unsafe { gl::CreateShader(shader_kind(stage)) })
    }

    fn shader_source(&mut self, shader: ShaderId, source: &CStr) {
        unsafe {
            gl::ShaderSource(shader.get(), 1, &source.as_ptr(), ptr::null());
        }
    }

    fn compile_shader(&mut self, shader: ShaderId) {
        unsafe {
            gl::CompileShader(shader.get());
        }
    }

    fn compile_status(&mut self, shader: ShaderId) -> bool {
        let mut success = GLint::from(gl::FALSE);
        unsafe {
            gl::GetShaderiv(shader.get(), gl::COMPILE_STATUS, &mut success);
        }
        success == GLint::from(gl::TRUE)
    }

    fn shader_info_log(&mut self, shader: ShaderId, capacity: usize) -> String {
        let mut len = 0;
        unsafe {
            gl::GetShaderiv(shader.get(), gl::INFO_LOG_LENGTH, &mut len);
        }

        Self::read_log(len, capacity, |size, written, buf| unsafe {
            gl::GetShaderInfoLog(shader.get(), size, written, buf);
        })
    }

    fn delete_shader(&mut self, shader: ShaderId) {
        unsafe {
            gl::DeleteShader(shader.get());
        }
    }

    fn create_program(&mut self) -> Option<ProgramId> {
        ProgramId::new(unsafe { gl::CreateProgram() })
    }

    fn attach_shader(&mut self, program: ProgramId, shader: ShaderId) {
        unsafe {
            gl::AttachShader(program.get(), shader.get());
        }
    }

    fn link_program(&mut self, program: ProgramId) {
        unsafe {
            gl::LinkProgram(program.get());
        }
    }

    fn link_status(&mut self, program: ProgramId) -> bool {
        let mut success = GLint::from(gl::FALSE);
        unsafe {
            gl::GetProgramiv(program.get(), gl::LINK_STATUS, &mut success);
        }
        success == GLint::from(gl::TRUE)
    }

    fn program_info_log(&mut self, program: ProgramId, capacity: usize) -> String {
        let mut len = 0;
        unsafe {
            gl::GetProgramiv(program.get(), gl::INFO_LOG_LENGTH, &mut len);
        }

        Self::read_log(len, capacity, |size, written, buf| unsafe {
            gl::GetProgramInfoLog(program.get(), size, written, buf);
        })
    }

    fn use_program(&mut self, program: Option<ProgramId>) {
        unsafe {
            gl::UseProgram(program.map_or(0, ProgramId::get));
        }
    }

    fn delete_program(&mut self, program: ProgramId) {
        unsafe {
            gl::DeleteProgram(program.get());
        }
    }

    fn create_vertex_array(&mut self) -> Option<VertexArrayId> {
        let mut vao = 0;
        unsafe {
            gl::GenVertexArrays(1, &mut vao);
        }
        VertexArrayId::new(vao)
    }

    fn bind_vertex_array(&mut self, vertex_array: Option<VertexArrayId>) {
        unsafe {
            gl::BindVertexArray(vertex_array.map_or(0, VertexArrayId::get));
        }
    }

    fn delete_vertex_array(&mut self, vertex_array: VertexArrayId) {
        let vao = vertex_array.get();
        unsafe {
            gl::DeleteVertexArrays(1, &vao);
        }
    }

    fn create_buffer(&mut self) -> Option<BufferId> {
        let mut vbo = 0;
        unsafe {
            gl::GenBuffers(1, &mut vbo);
        }
        BufferId::new(vbo)
    }

    fn bind_buffer(&mut self, target: BufferTarget, buffer: Option<BufferId>) {
        unsafe {
            gl::BindBuffer(buffer_kind(target), buffer.map_or(0, BufferId::get));
        }
    }

    fn buffer_data(&mut self, target: BufferTarget, data: &[u8]) {
        unsafe {
            gl::BufferData(
                buffer_kind(target),
                data.len() as GLsizeiptr,
                data.as_ptr() as *const _,
                gl::STATIC_DRAW,
            );
        }
    }

    fn delete_buffer(&mut self, buffer: BufferId) {
        let vbo = buffer.get();
        unsafe {
            gl::DeleteBuffers(1, &vbo);
        }
    }

    fn vertex_attrib_pointer_f32(
        &mut self,
        index: u32,
        components: i32,
        stride: i32,
        offset: usize,
    ) {
        unsafe {
            gl::VertexAttribPointer(
                index,
                components,
                gl::FLOAT,
                gl::FALSE,
                stride,
                offset as *const _,
            );
        }
    }

    fn enable_vertex_attrib_array(&mut self, index: u32) {
        unsafe {
            gl::EnableVertexAttribArray(index);
        }
    }

    fn viewport(&mut self, x: i32, y: i32, width: i32, height: i32) {
        unsafe {
            gl::Viewport(x, y, width, height);
        }
    }

    fn clear_color(&mut self, rgba: [f32; 4]) {
        unsafe {
            gl::ClearColor(rgba[0], rgba[1], rgba[2], rgba[3]);
        }
    }

    fn clear(&mut self) {
        unsafe {
            gl::Clear(gl::COLOR_BUFFER_BIT);
        }
    }

    fn polygon_mode(&mut self, mode: DrawMode) {
        let mode = match mode {
            DrawMode::Fill => gl::FILL,
            DrawMode::Line => gl::LINE,
        };
        unsafe {
            gl::PolygonMode(gl::FRONT_AND_BACK, mode);
        }
    }

    fn draw_arrays(&mut self, first: i32, count: i32) {
        unsafe {
            gl::DrawArrays(gl::TRIANGLES, first, count);
        }
    }

    fn draw_elements(&mut self, count: i32, offset: usize) {
        unsafe {
            gl::DrawElements(gl::TRIANGLES, count, gl::UNSIGNED_INT, offset as *const _);
        }
    }
}

/// Every entry point [`NativeGl`] calls, with its load check.
const ENTRY_POINTS: [(&str, fn() -> bool); 28] = [
    ("glAttachShader", gl::AttachShader::is_loaded),
    ("glBindBuffer", gl::BindBuffer::is_loaded),
    ("glBindVertexArray", gl::BindVertexArray::is_loaded),
    ("glBufferData", gl::BufferData::is_loaded),
    ("glClear", gl::Clear::is_loaded),
    ("glClearColor", gl::ClearColor::is_loaded),
    ("glCompileShader", gl::CompileShader::is_loaded),
    ("glCreateProgram", gl::CreateProgram::is_loaded),
    ("glCreateShader", gl::CreateShader::is_loaded),
    ("glDeleteBuffers", gl::DeleteBuffers::is_loaded),
    ("glDeleteProgram", gl::DeleteProgram::is_loaded),
    ("glDeleteShader", gl::DeleteShader::is_loaded),
    ("glDeleteVertexArrays", gl::DeleteVertexArrays::is_loaded),
    ("glDrawArrays", gl::DrawArrays::is_loaded),
    ("glDrawElements", gl::DrawElements::is_loaded),
    ("glEnableVertexAttribArray", gl::EnableVertexAttribArray::is_loaded),
    ("glGenBuffers", gl::GenBuffers::is_loaded),
    ("glGenVertexArrays", gl::GenVertexArrays::is_loaded),
    ("glGetProgramInfoLog", gl::GetProgramInfoLog::is_loaded),
    ("glGetProgramiv", gl::GetProgramiv::is_loaded),
    ("glGetShaderInfoLog", gl::GetShaderInfoLog::is_loaded),
    ("glGetShaderiv", gl::GetShaderiv::is_loaded),
    ("glLinkProgram", gl::LinkProgram::is_loaded),
    ("glPolygonMode", gl::PolygonMode::is_loaded),
    ("glShaderSource", gl::ShaderSource::is_loaded),
    ("glUseProgram", gl::UseProgram::is_loaded),
    ("glVertexAttribPointer", gl::VertexAttribPointer::is_loaded),
    ("glViewport", gl::Viewport::is_loaded),
];

/// Names of the entry points the loaded function table failed to resolve.
pub(crate) fn missing_entry_points() -> Vec<&'static str> {
    ENTRY_POINTS
        .iter()
        .filter_map(|&(name, is_loaded)| (!is_loaded()).then_some(name))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    /// Function names invoked through the `gl` crate in this file.
    fn called_entry_points() -> HashSet<String> {
        let source = include_str!("native.rs");
        let mut names = HashSet::new();
        for (start, _) in source.match_indices("gl::") {
            let rest = &source[start + 4..];
            let len = rest
                .find(|c: char| !c.is_ascii_alphanumeric() && c != '_')
                .unwrap_or(rest.len());
            let name = &rest[..len];
            let starts_upper = name.chars().next().is_some_and(|c| c.is_ascii_uppercase());
            let is_function = starts_upper && name.chars().any(|c| c.is_ascii_lowercase());
            if is_function && rest[len..].starts_with('(') {
                names.insert(format!("gl{name}"));
            }
        }
        names
    }

    #[test]
    fn test_entry_points_cover_every_call() {
        let checked: HashSet<String> = ENTRY_POINTS
            .iter()
            .map(|(name, _)| name.to_string())
            .collect();
        let called = called_entry_points();

        assert_eq!(checked.len(), ENTRY_POINTS.len());
        assert!(called.contains("glCreateShader"));
        let unchecked: Vec<_> = called.difference(&checked).collect();
        assert!(unchecked.is_empty(), "unchecked entry points: {unchecked:?}");
    }

    #[test]
    fn test_unloaded_table_reports_every_entry_point() {
        let missing = missing_entry_points();
        assert_eq!(missing.len(), ENTRY_POINTS.len());
        assert!(missing.contains(&"glPolygonMode"));
        assert!(missing.contains(&"glGetShaderInfoLog"));
    }
}

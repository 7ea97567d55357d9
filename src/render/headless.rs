//! A context-free [`GlBackend`] that records what it is asked to do.
//!
//! Object names are handed out from a counter and tracked until deleted, so
//! callers can check for leaks and double deletes. Shader "compilation" is a
//! shallow structural check: a `#version` directive and a `main` entry point
//! are required, and fragment shaders must declare an output. Linking fails
//! when a fragment input has no matching vertex output.

use std::collections::{HashMap, HashSet};
use std::ffi::CStr;

use crate::render::backend::{BufferId, BufferTarget, GlBackend, ProgramId, ShaderId, VertexArrayId};
use crate::render::pipeline::DrawMode;
use crate::render::shaders::ShaderStage;

/// A state-changing or drawing command seen by [`HeadlessGl`].
#[derive(Debug, Clone, PartialEq)]
pub enum GlCall {
    UseProgram(Option<ProgramId>),
    BindVertexArray(Option<VertexArrayId>),
    BindBuffer(BufferTarget, Option<BufferId>),
    BufferData(BufferTarget, usize),
    VertexAttribPointer { index: u32, components: i32, stride: i32, offset: usize },
    EnableVertexAttribArray(u32),
    Viewport(i32, i32, i32, i32),
    ClearColor([f32; 4]),
    Clear,
    PolygonMode(DrawMode),
    DrawArrays { first: i32, count: i32 },
    DrawElements { count: i32, offset: usize },
}

#[derive(Debug, Default)]
struct Shader {
    stage: Option<ShaderStage>,
    source: String,
    status: Option<Result<(), String>>,
}

#[derive(Debug, Default)]
struct Program {
    attached: Vec<ShaderId>,
    status: Option<Result<(), String>>,
}

#[derive(Debug, Default)]
pub struct HeadlessGl {
    next_name: u32,
    shaders: HashMap<ShaderId, Shader>,
    programs: HashMap<ProgramId, Program>,
    buffers: HashSet<BufferId>,
    vertex_arrays: HashSet<VertexArrayId>,
    shaders_created: usize,
    programs_created: usize,
    invalid_deletes: usize,
    calls: Vec<GlCall>,
}

impl HeadlessGl {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_name(&mut self) -> u32 {
        self.next_name += 1;
        self.next_name
    }

    pub fn calls(&self) -> &[GlCall] {
        &self.calls
    }

    pub fn take_calls(&mut self) -> Vec<GlCall> {
        std::mem::take(&mut self.calls)
    }

    pub fn live_shader_count(&self) -> usize {
        self.shaders.len()
    }

    pub fn live_program_count(&self) -> usize {
        self.programs.len()
    }

    pub fn live_buffer_count(&self) -> usize {
        self.buffers.len()
    }

    pub fn live_vertex_array_count(&self) -> usize {
        self.vertex_arrays.len()
    }

    pub fn is_live_program(&self, program: ProgramId) -> bool {
        self.programs.contains_key(&program)
    }

    pub fn shaders_created(&self) -> usize {
        self.shaders_created
    }

    pub fn programs_created(&self) -> usize {
        self.programs_created
    }

    /// Deletes of names that were never created or were already deleted.
    pub fn invalid_deletes(&self) -> usize {
        self.invalid_deletes
    }

    fn check_shader(stage: ShaderStage, source: &str) -> Result<(), String> {
        let first_line = source.lines().find(|l| !l.trim().is_empty()).unwrap_or("").trim();

        if !first_line.starts_with("#version") {
            return Err(format!(
                "0:1(1): error: missing #version directive, found `{first_line}`"
            ));
        }

        if !source.contains("void main") {
            return Err("0:1(1): error: no definition of `main` in shader".to_string());
        }

        if stage == ShaderStage::Fragment && declarations(source, "out").is_empty() {
            return Err("0:1(1): error: fragment shader does not declare an output".to_string());
        }

        Ok(())
    }

    fn check_link(&self, program: &Program) -> Result<(), String> {
        let mut vertex = None;
        let mut fragment = None;

        for id in &program.attached {
            let Some(shader) = self.shaders.get(id) else {
                return Err(format!("error: shader {id} was deleted before linking"));
            };
            if !matches!(shader.status, Some(Ok(()))) {
                return Err(format!("error: linking with uncompiled shader {id}"));
            }
            match shader.stage {
                Some(ShaderStage::Vertex) => vertex = Some(shader),
                Some(ShaderStage::Fragment) => fragment = Some(shader),
                None => {}
            }
        }

        let (Some(vertex), Some(fragment)) = (vertex, fragment) else {
            return Err("error: program needs one vertex and one fragment shader".to_string());
        };

        let outputs = declarations(&vertex.source, "out");
        for input in declarations(&fragment.source, "in") {
            if !outputs.contains(&input) {
                return Err(format!(
                    "error: fragment shader input `{input}` has no matching output \
                     in the previous stage"
                ));
            }
        }

        Ok(())
    }

    fn truncate(log: &str, capacity: usize) -> String {
        let mut end = log.len().min(capacity.saturating_sub(1));
        while !log.is_char_boundary(end) {
            end -= 1;
        }
        log[..end].to_string()
    }
}

/// Names declared with `qualifier` (`in`/`out`) at the start of a line,
/// optionally behind a `layout(...)` prefix.
fn declarations(source: &str, qualifier: &str) -> Vec<String> {
    source
        .lines()
        .filter_map(|line| {
            let mut line = line.trim();
            if line.starts_with("layout") {
                line = line.split_once(')').map(|(_, rest)| rest.trim())?;
            }
            let rest = line.strip_prefix(qualifier)?.strip_prefix(char::is_whitespace)?;
            let name = rest.trim_end_matches(';').split_whitespace().last()?;
            Some(name.trim_end_matches(';').to_string())
        })
        .collect()
}

impl GlBackend for HeadlessGl {
    fn create_shader(&mut self, stage: ShaderStage) -> Option<ShaderId> {
        let id = ShaderId::new(self.next_name())?;
        self.shaders.insert(
            id,
            Shader {
                stage: Some(stage),
                ..Shader::default()
            },
        );
        self.shaders_created += 1;
        Some(id)
    }

    fn shader_source(&mut self, shader: ShaderId, source: &CStr) {
        if let Some(entry) = self.shaders.get_mut(&shader) {
            entry.source = source.to_string_lossy().into_owned();
        }
    }

    fn compile_shader(&mut self, shader: ShaderId) {
        if let Some(entry) = self.shaders.get_mut(&shader) {
            let stage = entry.stage.unwrap_or(ShaderStage::Vertex);
            entry.status = Some(Self::check_shader(stage, &entry.source));
        }
    }

    fn compile_status(&mut self, shader: ShaderId) -> bool {
        matches!(self.shaders.get(&shader).and_then(|s| s.status.as_ref()), Some(Ok(())))
    }

    fn shader_info_log(&mut self, shader: ShaderId, capacity: usize) -> String {
        match self.shaders.get(&shader).and_then(|s| s.status.as_ref()) {
            Some(Err(log)) => Self::truncate(log, capacity),
            _ => String::new(),
        }
    }

    fn delete_shader(&mut self, shader: ShaderId) {
        if self.shaders.remove(&shader).is_none() {
            self.invalid_deletes += 1;
        }
    }

    fn create_program(&mut self) -> Option<ProgramId> {
        let id = ProgramId::new(self.next_name())?;
        self.programs.insert(id, Program::default());
        self.programs_created += 1;
        Some(id)
    }

    fn attach_shader(&mut self, program: ProgramId, shader: ShaderId) {
        if let Some(entry) = self.programs.get_mut(&program) {
            entry.attached.push(shader);
        }
    }

    fn link_program(&mut self, program: ProgramId) {
        let Some(entry) = self.programs.get(&program) else {
            return;
        };
        let status = self.check_link(entry);
        if let Some(entry) = self.programs.get_mut(&program) {
            entry.status = Some(status);
        }
    }

    fn link_status(&mut self, program: ProgramId) -> bool {
        matches!(self.programs.get(&program).and_then(|p| p.status.as_ref()), Some(Ok(())))
    }

    fn program_info_log(&mut self, program: ProgramId, capacity: usize) -> String {
        match self.programs.get(&program).and_then(|p| p.status.as_ref()) {
            Some(Err(log)) => Self::truncate(log, capacity),
            _ => String::new(),
        }
    }

    fn use_program(&mut self, program: Option<ProgramId>) {
        self.calls.push(GlCall::UseProgram(program));
    }

    fn delete_program(&mut self, program: ProgramId) {
        if self.programs.remove(&program).is_none() {
            self.invalid_deletes += 1;
        }
    }

    fn create_vertex_array(&mut self) -> Option<VertexArrayId> {
        let id = VertexArrayId::new(self.next_name())?;
        self.vertex_arrays.insert(id);
        Some(id)
    }

    fn bind_vertex_array(&mut self, vertex_array: Option<VertexArrayId>) {
        self.calls.push(GlCall::BindVertexArray(vertex_array));
    }

    fn delete_vertex_array(&mut self, vertex_array: VertexArrayId) {
        if !self.vertex_arrays.remove(&vertex_array) {
            self.invalid_deletes += 1;
        }
    }

    fn create_buffer(&mut self) -> Option<BufferId> {
        let id = BufferId::new(self.next_name())?;
        self.buffers.insert(id);
        Some(id)
    }

    fn bind_buffer(&mut self, target: BufferTarget, buffer: Option<BufferId>) {
        self.calls.push(GlCall::BindBuffer(target, buffer));
    }

    fn buffer_data(&mut self, target: BufferTarget, data: &[u8]) {
        self.calls.push(GlCall::BufferData(target, data.len()));
    }

    fn delete_buffer(&mut self, buffer: BufferId) {
        if !self.buffers.remove(&buffer) {
            self.invalid_deletes += 1;
        }
    }

    fn vertex_attrib_pointer_f32(
        &mut self,
        index: u32,
        components: i32,
        stride: i32,
        offset: usize,
    ) {
        self.calls.push(GlCall::VertexAttribPointer {
            index,
            components,
            stride,
            offset,
        });
    }

    fn enable_vertex_attrib_array(&mut self, index: u32) {
        self.calls.push(GlCall::EnableVertexAttribArray(index));
    }

    fn viewport(&mut self, x: i32, y: i32, width: i32, height: i32) {
        self.calls.push(GlCall::Viewport(x, y, width, height));
    }

    fn clear_color(&mut self, rgba: [f32; 4]) {
        self.calls.push(GlCall::ClearColor(rgba));
    }

    fn clear(&mut self) {
        self.calls.push(GlCall::Clear);
    }

    fn polygon_mode(&mut self, mode: DrawMode) {
        self.calls.push(GlCall::PolygonMode(mode));
    }

    fn draw_arrays(&mut self, first: i32, count: i32) {
        self.calls.push(GlCall::DrawArrays { first, count });
    }

    fn draw_elements(&mut self, count: i32, offset: usize) {
        self.calls.push(GlCall::DrawElements { count, offset });
    }
}

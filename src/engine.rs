use log::{debug, info};
use thiserror::Error;

use crate::demos::{Demo, DemoError};
use crate::input::{Controls, KeyboardState};
use crate::render::backend::GlBackend;
use crate::render::geometry::{GeometryBuffers, GeometryError};
use crate::render::pipeline::{DrawMode, Pass};
use crate::render::shaders::{build_program, ShaderError, ShaderProgram};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Demo(#[from] DemoError),
    #[error(transparent)]
    Shader(#[from] ShaderError),
    #[error(transparent)]
    Geometry(#[from] GeometryError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Running,
    Closing,
}

/// Everything one demo needs on the GPU plus the loop state.
///
/// Owns the backend, the linked programs and the uploaded geometry, and
/// releases them once through [`Session::teardown`]. Dropping a session
/// that was never torn down releases them as well, so the context must
/// still be current when that happens.
pub struct Session<G: GlBackend> {
    gl: G,
    programs: Vec<ShaderProgram>,
    geometry: Vec<GeometryBuffers>,
    passes: Vec<Pass>,
    clear_color: [f32; 4],
    controls: Controls,
    state: LoopState,
    released: bool,
    frames: u64,
}

impl<G: GlBackend> Session<G> {
    /// Builds every program and uploads every geometry of `demo`.
    ///
    /// The first failure aborts; objects created before it are left to the
    /// context teardown.
    pub fn new(mut gl: G, demo: &Demo) -> Result<Self, SessionError> {
        demo.validate()?;

        let mut programs = Vec::with_capacity(demo.programs.len());
        for pair in &demo.programs {
            programs.push(build_program(&mut gl, pair.vertex, pair.fragment)?);
        }

        let mut geometry = Vec::with_capacity(demo.geometry.len());
        for data in &demo.geometry {
            geometry.push(GeometryBuffers::upload(&mut gl, data)?);
        }

        info!(
            "Session '{}' ready: {} program(s), {} geometry buffer(s), {} pass(es)",
            demo.name,
            programs.len(),
            geometry.len(),
            demo.passes.len()
        );

        Ok(Self {
            gl,
            programs,
            geometry,
            passes: demo.passes.clone(),
            clear_color: demo.clear_color,
            controls: Controls::new(demo.draw_mode_toggle),
            state: LoopState::Running,
            released: false,
            frames: 0,
        })
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn draw_mode(&self) -> DrawMode {
        self.controls.draw_mode()
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn is_released(&self) -> bool {
        self.released
    }

    pub fn gl(&self) -> &G {
        &self.gl
    }

    pub fn gl_mut(&mut self) -> &mut G {
        &mut self.gl
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        let width = i32::try_from(width).unwrap_or(i32::MAX);
        let height = i32::try_from(height).unwrap_or(i32::MAX);
        self.gl.viewport(0, 0, width, height);
    }

    /// Runs one loop iteration: input first, then drawing.
    ///
    /// A held close key moves the session to [`LoopState::Closing`] and
    /// nothing is drawn. Once closing, further calls do nothing.
    pub fn frame(&mut self, keys: &mut KeyboardState) -> LoopState {
        if self.state == LoopState::Closing {
            return self.state;
        }

        let input = self.controls.process(keys);
        if input.close_requested {
            info!("Close requested after {} frame(s)", self.frames);
            self.state = LoopState::Closing;
            return self.state;
        }
        if input.draw_mode_changed {
            info!("Draw mode: {}", self.controls.draw_mode());
        }

        self.render();
        self.frames += 1;
        self.state
    }

    fn render(&mut self) {
        let gl = &mut self.gl;

        gl.clear_color(self.clear_color);
        gl.clear();
        gl.polygon_mode(self.controls.draw_mode());

        for pass in &self.passes {
            self.programs[pass.program].set_used(gl);
            self.geometry[pass.geometry].bind(gl);
            for draw in &pass.draws {
                draw.issue(gl);
            }
        }

        gl.bind_vertex_array(None);
        gl.use_program(None);
    }

    /// Releases geometry and programs. Returns `false` if already released.
    pub fn teardown(&mut self) -> bool {
        if self.released {
            return false;
        }

        for buffers in self.geometry.drain(..) {
            buffers.release(&mut self.gl);
        }
        for program in self.programs.drain(..) {
            program.delete(&mut self.gl);
        }

        self.released = true;
        self.state = LoopState::Closing;
        debug!("Session resources released");
        true
    }
}

impl<G: GlBackend> Drop for Session<G> {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demos;
    use crate::render::headless::{GlCall, HeadlessGl};
    use winit::event::ElementState;
    use winit::keyboard::KeyCode;

    #[test]
    fn test_frame_draws_every_pass() {
        let demo = demos::find("two-programs").unwrap();
        let mut session = Session::new(HeadlessGl::new(), &demo).unwrap();
        session.gl_mut().take_calls();

        assert_eq!(session.frame(&mut KeyboardState::default()), LoopState::Running);

        let draws: Vec<_> = session
            .gl()
            .calls()
            .iter()
            .filter(|call| matches!(call, GlCall::DrawElements { .. }))
            .cloned()
            .collect();
        assert_eq!(
            draws,
            vec![
                GlCall::DrawElements { count: 3, offset: 0 },
                GlCall::DrawElements { count: 3, offset: 12 },
            ]
        );
        assert_eq!(session.gl().calls()[0], GlCall::ClearColor([1.0, 0.0, 1.0, 1.0]));
        assert_eq!(session.gl().calls().last(), Some(&GlCall::UseProgram(None)));
        assert_eq!(session.frames(), 1);
    }

    #[test]
    fn test_teardown_is_idempotent() {
        let demo = demos::find("two-buffers").unwrap();
        let mut session = Session::new(HeadlessGl::new(), &demo).unwrap();

        assert!(session.teardown());
        assert!(!session.teardown());
        assert!(session.is_released());
        assert_eq!(session.state(), LoopState::Closing);

        let gl = session.gl();
        assert_eq!(gl.live_program_count(), 0);
        assert_eq!(gl.live_buffer_count(), 0);
        assert_eq!(gl.live_vertex_array_count(), 0);
        assert_eq!(gl.invalid_deletes(), 0);
    }

    #[test]
    fn test_closing_session_stops_drawing() {
        let demo = demos::find("triangle").unwrap();
        let mut session = Session::new(HeadlessGl::new(), &demo).unwrap();
        let mut keys = KeyboardState::default();
        keys.handle_key(KeyCode::Escape, ElementState::Pressed);

        assert_eq!(session.frame(&mut keys), LoopState::Closing);
        session.gl_mut().take_calls();

        keys.release_all();
        assert_eq!(session.frame(&mut keys), LoopState::Closing);
        assert!(session.gl().calls().is_empty());
    }

    #[test]
    fn test_resize_sets_viewport() {
        let mut session = Session::new(HeadlessGl::new(), &demos::find("window").unwrap()).unwrap();
        session.resize(1024, 768);
        assert_eq!(session.gl().calls().last(), Some(&GlCall::Viewport(0, 0, 1024, 768)));
    }

    #[test]
    fn test_oversized_resize_clamps_viewport() {
        let mut session = Session::new(HeadlessGl::new(), &demos::find("window").unwrap()).unwrap();
        session.resize(u32::MAX, 600);
        assert_eq!(
            session.gl().calls().last(),
            Some(&GlCall::Viewport(0, 0, i32::MAX, 600))
        );
    }

    #[test]
    fn test_invalid_demo_rejected_before_gl_work() {
        let mut demo = demos::find("triangle").unwrap();
        demo.passes[0].geometry = 2;

        let err = Session::new(HeadlessGl::new(), &demo).err().unwrap();
        assert!(matches!(err, SessionError::Demo(DemoError::UnknownGeometry { .. })));
    }
}

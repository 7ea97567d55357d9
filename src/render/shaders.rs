use std::ffi::CString;
use std::fmt;
use thiserror::Error;

use crate::render::backend::{GlBackend, ProgramId, ShaderId};

/// Upper bound on the diagnostic text pulled from the compiler or linker.
pub const INFO_LOG_CAPACITY: usize = 512;

const EMPTY_LOG: &str = "driver reported a failure without diagnostic output";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Vertex => write!(f, "vertex"),
            Self::Fragment => write!(f, "fragment"),
        }
    }
}

/// Shader text tagged with the pipeline stage it is compiled for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShaderSource<'a> {
    pub stage: ShaderStage,
    pub text: &'a str,
}

impl<'a> ShaderSource<'a> {
    pub const fn vertex(text: &'a str) -> Self {
        Self {
            stage: ShaderStage::Vertex,
            text,
        }
    }

    pub const fn fragment(text: &'a str) -> Self {
        Self {
            stage: ShaderStage::Fragment,
            text,
        }
    }
}

#[derive(Debug, Error)]
pub enum ShaderError {
    #[error("Failed to compile {stage} shader: {log}")]
    Compile { stage: ShaderStage, log: String },
    #[error("Failed to link shader program: {log}")]
    Link { log: String },
    #[error("{stage} shader source contains an interior NUL byte")]
    InvalidSource { stage: ShaderStage },
    #[error("Driver returned no name for a new {0}")]
    ObjectCreation(&'static str),
}

impl ShaderError {
    /// Compiler or linker diagnostics, or the error description for other kinds.
    pub fn log(&self) -> String {
        match self {
            Self::Compile { log, .. } | Self::Link { log } => log.clone(),
            other => other.to_string(),
        }
    }
}

/// A linked vertex + fragment program.
///
/// Holds a non-zero program name by construction; it must be handed back
/// through [`ShaderProgram::delete`] at shutdown.
#[derive(Debug, PartialEq, Eq)]
pub struct ShaderProgram {
    id: ProgramId,
}

impl ShaderProgram {
    pub fn id(&self) -> ProgramId {
        self.id
    }

    pub fn set_used<G: GlBackend + ?Sized>(&self, gl: &mut G) {
        gl.use_program(Some(self.id));
    }

    pub fn delete<G: GlBackend + ?Sized>(self, gl: &mut G) {
        log::debug!("Deleting shader program {}", self.id);
        gl.delete_program(self.id);
    }
}

/// Compiles `vertex` and `fragment` and links them into a program.
///
/// Stops at the first failing stage. Every shader object created here is
/// deleted before returning, and a program whose link failed is deleted too,
/// so an `Err` leaves nothing allocated.
pub fn build_program<G: GlBackend + ?Sized>(
    gl: &mut G,
    vertex: &str,
    fragment: &str,
) -> Result<ShaderProgram, ShaderError> {
    let vertex_shader = compile_shader(gl, ShaderSource::vertex(vertex))?;
    let fragment_shader = match compile_shader(gl, ShaderSource::fragment(fragment)) {
        Ok(shader) => shader,
        Err(err) => {
            gl.delete_shader(vertex_shader);
            return Err(err);
        }
    };

    let linked = link_program(gl, vertex_shader, fragment_shader);

    gl.delete_shader(vertex_shader);
    gl.delete_shader(fragment_shader);

    let id = linked?;
    log::debug!("Linked shader program {}", id);
    Ok(ShaderProgram { id })
}

fn compile_shader<G: GlBackend + ?Sized>(
    gl: &mut G,
    source: ShaderSource<'_>,
) -> Result<ShaderId, ShaderError> {
    let text = CString::new(source.text.as_bytes()).map_err(|_| ShaderError::InvalidSource {
        stage: source.stage,
    })?;

    let shader = gl
        .create_shader(source.stage)
        .ok_or(ShaderError::ObjectCreation("shader"))?;

    gl.shader_source(shader, &text);
    gl.compile_shader(shader);

    if !gl.compile_status(shader) {
        let log = non_empty(gl.shader_info_log(shader, INFO_LOG_CAPACITY));
        gl.delete_shader(shader);
        return Err(ShaderError::Compile {
            stage: source.stage,
            log,
        });
    }

    Ok(shader)
}

fn link_program<G: GlBackend + ?Sized>(
    gl: &mut G,
    vertex: ShaderId,
    fragment: ShaderId,
) -> Result<ProgramId, ShaderError> {
    let program = gl
        .create_program()
        .ok_or(ShaderError::ObjectCreation("program"))?;

    gl.attach_shader(program, vertex);
    gl.attach_shader(program, fragment);
    gl.link_program(program);

    if !gl.link_status(program) {
        let log = non_empty(gl.program_info_log(program, INFO_LOG_CAPACITY));
        gl.delete_program(program);
        return Err(ShaderError::Link { log });
    }

    Ok(program)
}

fn non_empty(log: String) -> String {
    if log.trim().is_empty() {
        EMPTY_LOG.to_string()
    } else {
        log
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::headless::HeadlessGl;

    const VERTEX: &str = r#"
        #version 330 core
        layout (location = 0) in vec3 aPos;

        void main() {
            gl_Position = vec4(aPos, 1.0);
        }
    "#;

    const FRAGMENT: &str = r#"
        #version 330 core
        out vec4 color;

        void main() {
            color = vec4(1.0, 0.5, 0.2, 1.0);
        }
    "#;

    #[test]
    fn test_build_program_success() {
        let mut gl = HeadlessGl::new();
        let program = build_program(&mut gl, VERTEX, FRAGMENT).unwrap();

        assert!(program.id().get() > 0);
        assert!(gl.is_live_program(program.id()));
        assert!(gl.program_info_log(program.id(), INFO_LOG_CAPACITY).is_empty());
        assert_eq!(gl.live_shader_count(), 0);
    }

    #[test]
    fn test_vertex_failure_skips_fragment_stage() {
        let mut gl = HeadlessGl::new();
        let err = build_program(&mut gl, "void main() {}", FRAGMENT).unwrap_err();

        match err {
            ShaderError::Compile { stage, ref log } => {
                assert_eq!(stage, ShaderStage::Vertex);
                assert!(!log.is_empty());
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(gl.shaders_created(), 1);
        assert_eq!(gl.live_shader_count(), 0);
        assert_eq!(gl.live_program_count(), 0);
    }

    #[test]
    fn test_fragment_failure_deletes_vertex_shader() {
        let mut gl = HeadlessGl::new();
        let broken = r#"
            #version 330 core

            void main() {
            }
        "#;

        let err = build_program(&mut gl, VERTEX, broken).unwrap_err();
        assert!(matches!(
            err,
            ShaderError::Compile {
                stage: ShaderStage::Fragment,
                ..
            }
        ));
        assert!(!err.log().is_empty());
        assert_eq!(gl.shaders_created(), 2);
        assert_eq!(gl.live_shader_count(), 0);
        assert_eq!(gl.programs_created(), 0);
    }

    #[test]
    fn test_link_failure_leaves_nothing_allocated() {
        let mut gl = HeadlessGl::new();
        let fragment = r#"
            #version 330 core
            in vec3 vertexColor;
            out vec4 color;

            void main() {
                color = vec4(vertexColor, 1.0);
            }
        "#;

        let err = build_program(&mut gl, VERTEX, fragment).unwrap_err();
        match err {
            ShaderError::Link { ref log } => assert!(log.contains("vertexColor")),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(gl.live_shader_count(), 0);
        assert_eq!(gl.live_program_count(), 0);
    }

    #[test]
    fn test_interior_nul_rejected_before_gl_objects() {
        let mut gl = HeadlessGl::new();
        let err = build_program(&mut gl, "#version 330 core\0", FRAGMENT).unwrap_err();

        assert!(matches!(
            err,
            ShaderError::InvalidSource {
                stage: ShaderStage::Vertex
            }
        ));
        assert_eq!(gl.shaders_created(), 0);
    }

    #[test]
    fn test_log_is_bounded() {
        let mut gl = HeadlessGl::new();
        let noisy = format!("{}\nvoid main() {{}}", "x".repeat(4 * INFO_LOG_CAPACITY));

        let err = build_program(&mut gl, &noisy, FRAGMENT).unwrap_err();
        assert!(err.log().len() < INFO_LOG_CAPACITY);
    }

    #[test]
    fn test_empty_driver_log_is_replaced() {
        assert_eq!(non_empty(String::new()), EMPTY_LOG);
        assert_eq!(non_empty("  \n".to_string()), EMPTY_LOG);
        assert_eq!(non_empty("0:1: error".to_string()), "0:1: error");
    }
}

pub mod backend;
pub mod geometry;
pub mod headless;
pub mod native;
pub mod pipeline;
pub mod shaders;

pub use backend::GlBackend;
pub use geometry::{Geometry, GeometryBuffers};
pub use pipeline::{DrawCall, DrawMode, Pass};
pub use shaders::{build_program, ShaderError, ShaderProgram, ShaderStage};

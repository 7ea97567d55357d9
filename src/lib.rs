pub mod app;
pub mod config;
pub mod context;
pub mod demos;
pub mod engine;
pub mod input;
pub mod render;
pub mod utils;

// Re-export commonly used types
pub use config::core::AppConfig;
pub use context::{BootstrapError, ContextHints, GlVersion, Profile};
pub use demos::Demo;
pub use engine::{LoopState, Session, SessionError};
pub use input::KeyboardState;
pub use render::headless::HeadlessGl;
pub use render::pipeline::DrawMode;
pub use render::shaders::{build_program, ShaderError, ShaderProgram};
pub use utils::error::AppError;

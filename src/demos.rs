//! The tutorial programs, expressed as data for the generic render loop.

use thiserror::Error;

use crate::render::geometry::{Geometry, GeometryError};
use crate::render::pipeline::{DrawCall, Pass};

const PASS_THROUGH_VERTEX: &str = r#"
#version 330 core
layout (location = 0) in vec3 aPos;

void main() {
    gl_Position = vec4(aPos, 1.0);
}
"#;

const ORANGE_FRAGMENT: &str = r#"
#version 330 core
out vec4 color;

void main() {
    color = vec4(1.0, 0.5, 0.2, 1.0);
}
"#;

const AMBER_FRAGMENT: &str = r#"
#version 330 core
out vec4 color;

void main() {
    color = vec4(1.0, 0.8, 0.0, 1.0);
}
"#;

const BROWN_FRAGMENT: &str = r#"
#version 330 core
out vec4 color;

void main() {
    color = vec4(0.5, 0.3, 0.1, 1.0);
}
"#;

const YELLOW_FRAGMENT: &str = r#"
#version 330 core
out vec4 color;

void main() {
    color = vec4(1.0, 1.0, 0.0, 1.0);
}
"#;

const PINK_FRAGMENT: &str = r#"
#version 330 core
out vec4 color;

void main() {
    color = vec4(1.0, 0.2, 0.8, 1.0);
}
"#;

const INDEXED_USAGE: &str = r#"
Exit Application by pressing <ESC>.

Switch settings with:
  M - Swap Draw mode between Line and Fill
"#;

const WHITE: [f32; 4] = [1.0, 1.0, 1.0, 1.0];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShaderPair {
    pub vertex: &'static str,
    pub fragment: &'static str,
}

impl ShaderPair {
    pub const fn new(vertex: &'static str, fragment: &'static str) -> Self {
        Self { vertex, fragment }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DemoError {
    #[error("Pass {pass} uses program {program}, but only {available} are defined")]
    UnknownProgram { pass: usize, program: usize, available: usize },
    #[error("Pass {pass} uses geometry {geometry}, but only {available} are defined")]
    UnknownGeometry { pass: usize, geometry: usize, available: usize },
    #[error("Pass {pass} draws up to element {end}, but its geometry has {available}")]
    DrawOutOfRange { pass: usize, end: usize, available: usize },
    #[error("Pass {pass} issues an indexed draw on geometry without indices")]
    NotIndexed { pass: usize },
    #[error("Geometry {index} is invalid: {source}")]
    Geometry { index: usize, source: GeometryError },
}

/// One tutorial program: its window title, clear colour, shader pairs,
/// geometry and the passes drawn each frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Demo {
    pub name: &'static str,
    pub title: &'static str,
    pub clear_color: [f32; 4],
    pub programs: Vec<ShaderPair>,
    pub geometry: Vec<Geometry>,
    pub passes: Vec<Pass>,
    /// Whether `M` flips between fill and line rendering.
    pub draw_mode_toggle: bool,
    pub usage: Option<&'static str>,
}

impl Demo {
    /// Checks that every pass points at existing programs and geometry and
    /// only reads vertices/indices that exist.
    pub fn validate(&self) -> Result<(), DemoError> {
        for (index, geometry) in self.geometry.iter().enumerate() {
            geometry
                .validate()
                .map_err(|source| DemoError::Geometry { index, source })?;
        }

        for (pass_index, pass) in self.passes.iter().enumerate() {
            if pass.program >= self.programs.len() {
                return Err(DemoError::UnknownProgram {
                    pass: pass_index,
                    program: pass.program,
                    available: self.programs.len(),
                });
            }

            let Some(geometry) = self.geometry.get(pass.geometry) else {
                return Err(DemoError::UnknownGeometry {
                    pass: pass_index,
                    geometry: pass.geometry,
                    available: self.geometry.len(),
                });
            };

            for draw in &pass.draws {
                let available = if draw.is_indexed() {
                    if geometry.indices.is_none() {
                        return Err(DemoError::NotIndexed { pass: pass_index });
                    }
                    geometry.index_count()
                } else {
                    geometry.vertex_count()
                };

                if draw.end() > available {
                    return Err(DemoError::DrawOutOfRange {
                        pass: pass_index,
                        end: draw.end(),
                        available,
                    });
                }
            }
        }

        Ok(())
    }
}

pub const DEFAULT_DEMO: &str = "triangle";

pub fn names() -> Vec<&'static str> {
    catalog().iter().map(|demo| demo.name).collect()
}

pub fn find(name: &str) -> Option<Demo> {
    catalog().into_iter().find(|demo| demo.name == name)
}

pub fn catalog() -> Vec<Demo> {
    vec![
        window(),
        triangle(),
        indexed(),
        two_triangles(),
        two_buffers(),
        two_programs(),
    ]
}

fn window() -> Demo {
    Demo {
        name: "window",
        title: "Hello World",
        clear_color: [0.0, 0.0, 0.0, 1.0],
        programs: Vec::new(),
        geometry: Vec::new(),
        passes: Vec::new(),
        draw_mode_toggle: false,
        usage: None,
    }
}

fn triangle() -> Demo {
    Demo {
        name: "triangle",
        title: "Hello Triangle",
        clear_color: [0.2, 0.3, 0.4, 1.0],
        programs: vec![ShaderPair::new(PASS_THROUGH_VERTEX, ORANGE_FRAGMENT)],
        geometry: vec![Geometry::new(&[
            -0.5, -0.5, 0.0, //
            0.5, -0.5, 0.0, //
            0.0, 0.5, 0.0,
        ])],
        passes: vec![Pass::new(0, 0, vec![DrawCall::Arrays { first: 0, count: 3 }])],
        draw_mode_toggle: false,
        usage: None,
    }
}

fn indexed() -> Demo {
    Demo {
        name: "indexed",
        title: "Hello Triangle Indexed",
        clear_color: WHITE,
        programs: vec![ShaderPair::new(PASS_THROUGH_VERTEX, BROWN_FRAGMENT)],
        geometry: vec![Geometry::indexed(
            &[
                -0.5, -0.5, 0.0, // bottom left
                -0.5, 0.5, 0.0, // top left
                0.5, 0.5, 0.0, // top right
                0.5, -0.5, 0.0, // bottom right
            ],
            &[
                0, 1, 2, // left triangle
                3, 0, 2, // right triangle
            ],
        )],
        passes: vec![Pass::new(0, 0, vec![DrawCall::Elements { first: 0, count: 6 }])],
        draw_mode_toggle: true,
        usage: Some(INDEXED_USAGE),
    }
}

fn two_triangles() -> Demo {
    Demo {
        name: "two-triangles",
        title: "Hello Triangle Exercise 1",
        clear_color: WHITE,
        programs: vec![ShaderPair::new(PASS_THROUGH_VERTEX, AMBER_FRAGMENT)],
        geometry: vec![Geometry::new(&[
            -0.8, -0.5, 0.0, //
            0.0, -0.5, 0.0, //
            -0.4, 0.5, 0.0, //
            0.0, -0.5, 0.0, //
            0.8, -0.5, 0.0, //
            0.4, 0.5, 0.0,
        ])],
        passes: vec![Pass::new(0, 0, vec![DrawCall::Arrays { first: 0, count: 6 }])],
        draw_mode_toggle: false,
        usage: None,
    }
}

fn two_buffers() -> Demo {
    Demo {
        name: "two-buffers",
        title: "Hello Triangle Exercise 2",
        clear_color: WHITE,
        programs: vec![ShaderPair::new(PASS_THROUGH_VERTEX, ORANGE_FRAGMENT)],
        geometry: vec![
            Geometry::new(&[
                -0.8, -0.5, 0.0, //
                0.0, -0.5, 0.0, //
                -0.4, 0.5, 0.0,
            ]),
            Geometry::new(&[
                0.0, -0.5, 0.0, //
                0.8, -0.5, 0.0, //
                0.4, 0.5, 0.0,
            ]),
        ],
        passes: vec![
            Pass::new(0, 0, vec![DrawCall::Arrays { first: 0, count: 3 }]),
            Pass::new(0, 1, vec![DrawCall::Arrays { first: 0, count: 3 }]),
        ],
        draw_mode_toggle: false,
        usage: None,
    }
}

fn two_programs() -> Demo {
    Demo {
        name: "two-programs",
        title: "Multi Shader",
        clear_color: [1.0, 0.0, 1.0, 1.0],
        programs: vec![
            ShaderPair::new(PASS_THROUGH_VERTEX, YELLOW_FRAGMENT),
            ShaderPair::new(PASS_THROUGH_VERTEX, PINK_FRAGMENT),
        ],
        geometry: vec![Geometry::indexed(
            &[
                -0.8, -0.5, 0.0, // left 1
                -0.4, 0.5, 0.0, // top 1
                0.0, -0.5, 0.0, // right 1, left 2
                0.8, -0.5, 0.0, // right 2
                0.4, 0.5, 0.0, // top 2
            ],
            &[0, 1, 2, 2, 3, 4],
        )],
        passes: vec![
            Pass::new(0, 0, vec![DrawCall::Elements { first: 0, count: 3 }]),
            Pass::new(1, 0, vec![DrawCall::Elements { first: 3, count: 3 }]),
        ],
        draw_mode_toggle: false,
        usage: None,
    }
}

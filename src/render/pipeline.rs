use std::fmt;
use std::mem;

use crate::render::backend::GlBackend;

/// Polygon rasterization mode for every face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DrawMode {
    #[default]
    Fill,
    Line,
}

impl DrawMode {
    pub fn toggled(self) -> Self {
        match self {
            Self::Fill => Self::Line,
            Self::Line => Self::Fill,
        }
    }
}

impl fmt::Display for DrawMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fill => write!(f, "fill"),
            Self::Line => write!(f, "line"),
        }
    }
}

/// One triangle draw against the currently bound geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawCall {
    /// `count` vertices starting at vertex `first`.
    Arrays { first: i32, count: i32 },
    /// `count` indices starting at index `first`.
    Elements { first: usize, count: i32 },
}

impl DrawCall {
    pub fn issue<G: GlBackend + ?Sized>(&self, gl: &mut G) {
        match *self {
            Self::Arrays { first, count } => gl.draw_arrays(first, count),
            Self::Elements { first, count } => {
                gl.draw_elements(count, first * mem::size_of::<u32>())
            }
        }
    }

    pub fn is_indexed(&self) -> bool {
        matches!(self, Self::Elements { .. })
    }

    /// One past the last vertex or index this call reads.
    pub fn end(&self) -> usize {
        match *self {
            Self::Arrays { first, count } => first.max(0) as usize + count.max(0) as usize,
            Self::Elements { first, count } => first + count.max(0) as usize,
        }
    }
}

/// Draws issued with one program bound to one set of geometry buffers.
///
/// `program` and `geometry` index into the owning demo's lists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pass {
    pub program: usize,
    pub geometry: usize,
    pub draws: Vec<DrawCall>,
}

impl Pass {
    pub fn new(program: usize, geometry: usize, draws: Vec<DrawCall>) -> Self {
        Self {
            program,
            geometry,
            draws,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::headless::{GlCall, HeadlessGl};

    #[test]
    fn test_draw_mode_toggle() {
        assert_eq!(DrawMode::default(), DrawMode::Fill);
        assert_eq!(DrawMode::Fill.toggled(), DrawMode::Line);
        assert_eq!(DrawMode::Fill.toggled().toggled(), DrawMode::Fill);
    }

    #[test]
    fn test_elements_offset_in_bytes() {
        let mut gl = HeadlessGl::new();
        DrawCall::Elements { first: 3, count: 3 }.issue(&mut gl);
        DrawCall::Arrays { first: 0, count: 6 }.issue(&mut gl);

        assert_eq!(
            gl.calls(),
            &[
                GlCall::DrawElements { count: 3, offset: 12 },
                GlCall::DrawArrays { first: 0, count: 6 },
            ]
        );
    }

    #[test]
    fn test_draw_call_end() {
        assert_eq!(DrawCall::Arrays { first: 3, count: 3 }.end(), 6);
        assert_eq!(DrawCall::Elements { first: 3, count: 3 }.end(), 6);
        assert!(DrawCall::Elements { first: 0, count: 6 }.is_indexed());
    }
}

// encode.rs - Flatten spans into a float buffer for JS consumers
//
// Layout: 4 floats per span
//   [row, start_column, width, height]

use crate::mesher::Span;

pub const FLOATS_PER_SPAN: usize = 4;

#[derive(Debug, Default)]
pub struct SpanEncoder {
    out: Vec<f32>,
}

impl SpanEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the buffer contents with `spans`
    pub fn encode(&mut self, spans: &[Span]) {
        self.out.clear();
        self.out.reserve(spans.len() * FLOATS_PER_SPAN);
        for s in spans {
            self.out.extend_from_slice(&[
                s.row as f32,
                s.start_column as f32,
                s.width as f32,
                s.height,
            ]);
        }
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.out
    }

    pub fn ptr(&self) -> *const f32 {
        self.out.as_ptr()
    }

    pub fn len(&self) -> usize {
        self.out.len()
    }

    pub fn is_empty(&self) -> bool {
        self.out.is_empty()
    }
}

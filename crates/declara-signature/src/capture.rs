use serde::{Deserialize, Serialize};

use crate::error::SignatureError;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// One line segment drawn during a drag.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub start: Point,
    pub end: Point,
}

/// The segments recorded during one continuous press-drag-release gesture.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Stroke {
    pub segments: Vec<Segment>,
}

/// All strokes of one signature. Empty means "no signature".
pub type SignatureData = Vec<Stroke>;

/// Records a signature gesture by gesture.
///
/// A press starts a new stroke, each drag appends a segment from the last
/// pen position, release finalizes the stroke. `clear` resets to empty.
#[derive(Debug, Default)]
pub struct SignatureCapture {
    strokes: SignatureData,
    pen: Option<Point>,
}

impl SignatureCapture {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restore a capture from previously serialized stroke data.
    pub fn from_data(data: SignatureData) -> Self {
        Self { strokes: data, pen: None }
    }

    /// Pen down: starts a new stroke. A press while a stroke is still active
    /// finalizes the active one first.
    pub fn press(&mut self, at: Point) {
        self.strokes.push(Stroke::default());
        self.pen = Some(at);
    }

    /// Pen moved while down: appends a segment from the last position.
    /// Ignored when no stroke is active.
    pub fn drag_to(&mut self, at: Point) {
        let Some(last) = self.pen else {
            return;
        };
        if let Some(stroke) = self.strokes.last_mut() {
            stroke.segments.push(Segment { start: last, end: at });
        }
        self.pen = Some(at);
    }

    /// Pen up: finalizes the active stroke.
    pub fn release(&mut self) {
        self.pen = None;
    }

    pub fn clear(&mut self) {
        self.strokes.clear();
        self.pen = None;
    }

    pub fn has_signature(&self) -> bool {
        !self.strokes.is_empty()
    }

    pub fn strokes(&self) -> &[Stroke] {
        &self.strokes
    }

    /// Snapshot of the stroke data for persistence.
    pub fn serialize(&self) -> SignatureData {
        self.strokes.clone()
    }

    /// Replace the current strokes with previously serialized data.
    pub fn deserialize(&mut self, data: SignatureData) {
        self.strokes = data;
        self.pen = None;
    }

    pub fn to_json(&self) -> Result<String, SignatureError> {
        Ok(serde_json::to_string(&self.strokes)?)
    }

    pub fn from_json(json: &str) -> Result<Self, SignatureError> {
        Ok(Self::from_data(serde_json::from_str(json)?))
    }
}

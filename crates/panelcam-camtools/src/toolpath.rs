//! Toolpath representation produced by a CAM engine.
//!
//! Coordinates are in the job's machine frame, in millimetres: Z0 is the
//! origin plane and negative Z is below it.

use panelcam_core::{Point2, Point3, Tool};

/// A single tool motion
#[derive(Debug, Clone, PartialEq)]
pub enum Move {
    /// Positioning move at rapid rate
    Rapid(Point3),
    /// Vertical feed into material at plunge rate
    Plunge(Point3),
    /// Linear cut at feed rate
    Cut(Point3),
    /// Clockwise arc (or helix when Z changes) around `center`
    ArcCw {
        /// End point
        to: Point3,
        /// Arc centre in XY
        center: Point2,
    },
}

impl Move {
    /// End point of the move
    pub fn end(&self) -> Point3 {
        match self {
            Self::Rapid(p) | Self::Plunge(p) | Self::Cut(p) => *p,
            Self::ArcCw { to, .. } => *to,
        }
    }

    /// True for moves that remove material
    pub fn is_cutting(&self) -> bool {
        !matches!(self, Self::Rapid(_))
    }
}

/// Realized motion of one operation
#[derive(Debug, Clone, PartialEq)]
pub struct OperationToolpath {
    /// Position of the operation in the job
    pub index: usize,
    /// Human-readable label, e.g. `Profile001`
    pub label: String,
    /// Tool used for every move
    pub tool: Tool,
    /// Motions in execution order
    pub moves: Vec<Move>,
}

impl OperationToolpath {
    /// Creates an empty toolpath for an operation.
    pub fn new(index: usize, label: impl Into<String>, tool: Tool) -> Self {
        Self {
            index,
            label: label.into(),
            tool,
            moves: Vec::new(),
        }
    }

    /// Lowest Z reached
    pub fn min_z(&self) -> Option<f64> {
        self.moves.iter().map(|m| m.end().z).reduce(f64::min)
    }

    /// Length of all cutting moves, arcs measured by their chord.
    pub fn cutting_length(&self) -> f64 {
        let mut length = 0.0;
        let mut last: Option<Point3> = None;
        for m in &self.moves {
            let end = m.end();
            if let (Some(start), true) = (last, m.is_cutting()) {
                length += (end - start).norm();
            }
            last = Some(end);
        }
        length
    }
}

/// Engine output for a whole job
#[derive(Debug, Clone, PartialEq)]
pub struct ToolpathPlan {
    /// One entry per operation, in append order
    pub operations: Vec<OperationToolpath>,
    /// Raw program text before dialect post-processing
    pub program: String,
}

use crate::target::CubeFace;
use lumen_scene::TextureId;
use std::collections::VecDeque;

/// What a recorded pass drew into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassKind {
    CubeFace { target: TextureId, face: CubeFace },
    Main,
}

/// One render pass as observed by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PassRecord {
    /// Monotonic across the renderer's lifetime.
    pub sequence: u64,
    pub frame: u64,
    pub kind: PassKind,
    /// Scene revision the pass rendered.
    pub scene_revision: u64,
}

/// Ways a frame can break capture-before-main ordering.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OrderingViolation {
    #[error("frame {frame}: main pass #{main} ran before cube face pass #{face}")]
    MainBeforeCapture { frame: u64, main: u64, face: u64 },
    #[error("frame {frame}: capture wrote {faces} of 6 faces")]
    IncompleteCapture { frame: u64, faces: usize },
    #[error("frame {frame}: scene changed between capture (rev {capture}) and main pass (rev {main})")]
    StaleCapture { frame: u64, capture: u64, main: u64 },
    #[error("frame {frame}: no main pass recorded")]
    NoMainPass { frame: u64 },
}

/// Bounded history of render passes.
#[derive(Debug, Clone)]
pub struct FrameLog {
    records: VecDeque<PassRecord>,
    capacity: usize,
    next_sequence: u64,
}

impl Default for FrameLog {
    fn default() -> Self {
        Self::with_capacity(256)
    }
}

impl FrameLog {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            records: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
            next_sequence: 0,
        }
    }

    pub fn record(&mut self, frame: u64, kind: PassKind, scene_revision: u64) -> u64 {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        if self.records.len() == self.capacity {
            self.records.pop_front();
        }
        self.records.push_back(PassRecord {
            sequence,
            frame,
            kind,
            scene_revision,
        });
        sequence
    }

    pub fn records(&self) -> impl Iterator<Item = &PassRecord> {
        self.records.iter()
    }

    pub fn passes_in(&self, frame: u64) -> impl Iterator<Item = &PassRecord> {
        self.records.iter().filter(move |r| r.frame == frame)
    }

    /// Total passes ever recorded.
    pub fn total_passes(&self) -> u64 {
        self.next_sequence
    }

    /// Verify that, within `frame`, a capture into `target` (if any happened)
    /// wrote all six faces, finished before the main pass began, and saw the
    /// same scene revision the main pass rendered.
    pub fn check_capture_order(&self, frame: u64, target: TextureId) -> Result<(), OrderingViolation> {
        let passes: Vec<&PassRecord> = self.passes_in(frame).collect();
        let main = passes
            .iter()
            .find(|r| r.kind == PassKind::Main)
            .ok_or(OrderingViolation::NoMainPass { frame })?;

        let faces: Vec<&&PassRecord> = passes
            .iter()
            .filter(|r| matches!(r.kind, PassKind::CubeFace { target: t, .. } if t == target))
            .collect();
        if faces.is_empty() {
            // Throttled frame: nothing captured, nothing to order.
            return Ok(());
        }

        let mut seen = [false; 6];
        for r in &faces {
            if let PassKind::CubeFace { face, .. } = r.kind {
                seen[face.index()] = true;
            }
            if r.sequence > main.sequence {
                return Err(OrderingViolation::MainBeforeCapture {
                    frame,
                    main: main.sequence,
                    face: r.sequence,
                });
            }
            if r.scene_revision != main.scene_revision {
                return Err(OrderingViolation::StaleCapture {
                    frame,
                    capture: r.scene_revision,
                    main: main.scene_revision,
                });
            }
        }
        let written = seen.iter().filter(|s| **s).count();
        if written != 6 {
            return Err(OrderingViolation::IncompleteCapture { frame, faces: written });
        }
        Ok(())
    }
}

//! Frame-scoped scratch state.
//!
//! `TouchedFlags` records which parameter/part slots were already reset to
//! their default during the current evaluation pass. The animator clears it at
//! the start of every tick; it never carries state between frames.

/// Per-frame "already initialized" flags, one per parameter and per part.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TouchedFlags {
    pub parameters: Vec<bool>,
    pub parts: Vec<bool>,
}

impl TouchedFlags {
    pub fn new(parameter_count: usize, part_count: usize) -> Self {
        Self {
            parameters: vec![false; parameter_count],
            parts: vec![false; part_count],
        }
    }

    /// Zero every flag and resize to the model's current counts. Reuses the
    /// existing allocations.
    #[inline]
    pub fn begin_frame(&mut self, parameter_count: usize, part_count: usize) {
        self.parameters.clear();
        self.parameters.resize(parameter_count, false);
        self.parts.clear();
        self.parts.resize(part_count, false);
    }

    /// Mark a parameter, returning whether this is its first touch this frame.
    /// Out-of-range indices are never "first".
    #[inline]
    pub fn touch_parameter(&mut self, idx: usize) -> bool {
        touch(&mut self.parameters, idx)
    }

    #[inline]
    pub fn touch_part(&mut self, idx: usize) -> bool {
        touch(&mut self.parts, idx)
    }
}

#[inline]
fn touch(flags: &mut [bool], idx: usize) -> bool {
    match flags.get_mut(idx) {
        Some(flag) if !*flag => {
            *flag = true;
            true
        }
        _ => false,
    }
}

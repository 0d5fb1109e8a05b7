/// GR6J unit hydrographs.
///
/// S-curve based unit hydrographs (UH1 and UH2) that spread effective rainfall
/// over time. UH1 has base time x4, UH2 has base time 2*x4. Ordinates are only
/// kept for the slots that can be non-zero, so both the ordinate vectors and
/// the convolution buffers are sized from x4 once per run.
use smallvec::SmallVec;

use super::constants::{D, NH};

/// Ordinates (or pending routed water) of one unit hydrograph.
pub type Ordinates = SmallVec<[f64; 2 * NH]>;

/// UH1 S-curve value at position i.
fn ss1(i: f64, x4: f64) -> f64 {
    if i <= 0.0 {
        0.0
    } else if i < x4 {
        (i / x4).powf(D)
    } else {
        1.0
    }
}

/// UH2 S-curve value at position i.
fn ss2(i: f64, x4: f64) -> f64 {
    if i <= 0.0 {
        0.0
    } else if i <= x4 {
        0.5 * (i / x4).powf(D)
    } else if i < 2.0 * x4 {
        1.0 - 0.5 * (2.0 - i / x4).powf(D)
    } else {
        1.0
    }
}

/// Number of UH1 slots: `ceil(x4)`, capped at NH.
pub fn uh1_length(x4: f64) -> usize {
    (x4.ceil() as usize).clamp(1, NH)
}

/// Number of UH2 slots: `ceil(2*x4)`, capped at 2*NH.
pub fn uh2_length(x4: f64) -> usize {
    ((2.0 * x4).ceil() as usize).clamp(1, 2 * NH)
}

fn ordinates(len: usize, x4: f64, curve: fn(f64, f64) -> f64) -> Ordinates {
    (1..=len)
        .map(|i| {
            let fi = i as f64;
            curve(fi, x4) - curve(fi - 1.0, x4)
        })
        .collect()
}

/// Compute the UH1 and UH2 ordinates for a given x4.
///
/// Ordinates are successive differences of the S-curves and each set sums to 1.
pub fn compute_uh_ordinates(x4: f64) -> (Ordinates, Ordinates) {
    (
        ordinates(uh1_length(x4), x4, ss1),
        ordinates(uh2_length(x4), x4, ss2),
    )
}

/// Convolution history of one unit hydrograph, stored as a ring buffer.
///
/// Slot `(head + k) % len` holds the water that leaves the hydrograph `k`
/// steps from now. Starts empty.
#[derive(Debug, Clone, PartialEq)]
pub struct UhBuffer {
    slots: Ordinates,
    head: usize,
}

impl UhBuffer {
    /// An empty buffer with one slot per ordinate.
    pub fn new(len: usize) -> Self {
        Self {
            slots: SmallVec::from_elem(0.0, len.max(1)),
            head: 0,
        }
    }

    /// Route `input` through the hydrograph and return this step's output.
    ///
    /// The current input contributes `ordinates[0] * input` to the output of
    /// the same step.
    pub fn convolve(&mut self, ordinates: &[f64], input: f64) -> f64 {
        let n = self.slots.len();
        debug_assert_eq!(ordinates.len(), n);

        for (k, ord) in ordinates.iter().enumerate() {
            let mut idx = self.head + k;
            if idx >= n {
                idx -= n;
            }
            self.slots[idx] += ord * input;
        }

        let output = self.slots[self.head];
        self.slots[self.head] = 0.0;
        self.head = (self.head + 1) % n;
        output
    }

    /// Water already routed but not yet released [mm].
    pub fn in_transit(&self) -> f64 {
        self.slots.iter().sum()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

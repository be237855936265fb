//! Section resolver.
//!
//! Maps elapsed ritual time to the active section. Section `i` owns the
//! half-open interval `[start_i, start_i + duration_i)`, so a boundary
//! instant belongs to the section being entered.

use serde::{Deserialize, Serialize};

use super::{Ritual, Section};

/// Where in a ritual a given elapsed time falls.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SectionPosition {
    pub index: usize,
    /// Seconds since the section began.
    pub offset_secs: f64,
    /// Seconds until the section ends. Zero once the ritual is over.
    pub remaining_secs: f64,
}

impl Ritual {
    /// Resolve `elapsed_secs` to a section.
    ///
    /// Negative and NaN input resolve as zero. Anything at or past the
    /// ritual total resolves to the final section with nothing remaining;
    /// deciding that the ritual is complete is left to the caller.
    pub fn resolve(&self, elapsed_secs: f64) -> SectionPosition {
        let total = self.total_secs() as f64;
        let elapsed = if elapsed_secs.is_nan() {
            0.0
        } else {
            elapsed_secs.max(0.0)
        };

        if elapsed >= total {
            let index = self.starts.len() - 1;
            return SectionPosition {
                index,
                offset_secs: self.sections()[index].duration_secs() as f64,
                remaining_secs: 0.0,
            };
        }

        // Last section whose start is <= elapsed. starts[0] == 0, so the
        // partition point is at least 1.
        let index = self.starts.partition_point(|&start| start as f64 <= elapsed) - 1;
        let start = self.starts[index] as f64;
        let end = start + self.sections()[index].duration_secs() as f64;
        SectionPosition {
            index,
            offset_secs: elapsed - start,
            remaining_secs: end - elapsed,
        }
    }

    /// Section at a resolved position.
    pub fn section_at(&self, position: &SectionPosition) -> &Section {
        &self.sections()[position.index]
    }

    /// Offset of section `index` from the ritual start, in seconds.
    pub fn section_start_secs(&self, index: usize) -> Option<u64> {
        self.starts.get(index).copied()
    }
}

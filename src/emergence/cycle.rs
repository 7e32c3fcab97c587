//! Overlapping activity cycles and the emergence-rate envelope.

use std::f64::consts::PI;

use super::bins::SizeLadder;
use super::config::EmergenceConfig;

/// Emergence rate of the largest regions at cycle maximum, per unit activity rate
/// (regions per day, both hemispheres).
const PEAK_RATE_PER_ACTIVITY: f64 = 10.0;

/// A cycle that is active on a given day.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActiveCycle {
    /// Cycles elapsed since the start of the simulation. Cycle -1 is still
    /// winding down when a run starts.
    pub index: i64,
    /// Fractional progress through the cycle's active window, in [0, 1].
    pub phase: f64,
}

/// Cycle spacing and duration in days.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CycleTiming {
    /// Days between consecutive cycle starts.
    pub cycle_length_days: f64,
    /// Days each cycle stays active (cycle length plus overlap).
    pub active_window_days: f64,
}

impl CycleTiming {
    pub fn new(cycle_length_days: f64, active_window_days: f64) -> Self {
        Self {
            cycle_length_days,
            active_window_days,
        }
    }

    pub fn from_config(config: &EmergenceConfig) -> Self {
        Self::new(config.cycle_length_days(), config.active_window_days())
    }

    /// Index of the cycle that started most recently on day `nday`.
    pub fn current_cycle(&self, nday: u32) -> i64 {
        (f64::from(nday) / self.cycle_length_days).floor() as i64
    }

    /// Phase of cycle `index` on day `nday`; may fall outside [0, 1].
    pub fn phase(&self, nday: u32, index: i64) -> f64 {
        let start = self.cycle_length_days * index as f64;
        (f64::from(nday) - start) / self.active_window_days
    }

    /// Cycles active on day `nday`, current cycle first, then the previous one.
    ///
    /// Both phase bounds are inclusive, so a transition day can count a cycle twice.
    /// Early in a run the previous cycle has a negative index.
    pub fn active_cycles(&self, nday: u32) -> impl Iterator<Item = ActiveCycle> + '_ {
        let current = self.current_cycle(nday);
        (0..2).filter_map(move |offset| {
            let index = current - offset;
            let phase = self.phase(nday, index);
            (0.0..=1.0).contains(&phase).then_some(ActiveCycle { index, phase })
        })
    }
}

/// Uncorrelated emergence rate of the largest size class, summed over both hemispheres.
///
/// Follows `activity_rate·10·sin²(π·phase)·dcon/amax`: zero at the cycle edges,
/// maximal at mid-cycle.
pub fn emergence_envelope(activity_rate: f64, phase: f64, ladder: &SizeLadder) -> f64 {
    let s = (PI * phase).sin();
    activity_rate * PEAK_RATE_PER_ACTIVITY * s * s * ladder.dcon / ladder.amax
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference_timing() -> CycleTiming {
        CycleTiming::from_config(&EmergenceConfig::default())
    }

    #[test]
    fn test_envelope_vanishes_at_cycle_edges() {
        let ladder = SizeLadder::new(5, 0.5, 100.0);
        assert!(emergence_envelope(1.0, 0.0, &ladder).abs() < 1e-15);
        assert!(emergence_envelope(1.0, 1.0, &ladder).abs() < 1e-15);
    }

    #[test]
    fn test_envelope_peaks_at_mid_cycle() {
        let ladder = SizeLadder::new(5, 0.5, 100.0);
        let peak = emergence_envelope(1.0, 0.5, &ladder);
        assert!((peak - 10.0 * ladder.dcon / 100.0).abs() < 1e-15);
        for i in 0..=100 {
            let phase = i as f64 / 100.0;
            assert!(emergence_envelope(1.0, phase, &ladder) <= peak + 1e-15);
        }
    }

    #[test]
    fn test_envelope_scales_with_activity_rate() {
        let ladder = SizeLadder::new(5, 0.5, 100.0);
        let base = emergence_envelope(1.0, 0.3, &ladder);
        assert!((emergence_envelope(2.0, 0.3, &ladder) - 2.0 * base).abs() < 1e-15);
    }

    #[test]
    fn test_run_starts_inside_previous_cycle() {
        let timing = reference_timing();
        let cycles: Vec<_> = timing.active_cycles(0).collect();
        assert_eq!(
            cycles,
            vec![
                ActiveCycle { index: 0, phase: 0.0 },
                ActiveCycle { index: -1, phase: 0.75 },
            ]
        );

        // Cycle -1 ends on day 365 (phase exactly 1).
        let last: Vec<_> = timing.active_cycles(365).collect();
        assert_eq!(last.len(), 2);
        assert_eq!(last[1], ActiveCycle { index: -1, phase: 1.0 });

        let after: Vec<_> = timing.active_cycles(366).collect();
        assert_eq!(after.len(), 1);
        assert_eq!(after[0].index, 0);
    }

    #[test]
    fn test_overlap_window_has_two_cycles() {
        let timing = reference_timing();
        // Cycle 1 starts on day 1095; cycle 0 stays active until day 1460.
        let cycles: Vec<_> = timing.active_cycles(1200).collect();
        assert_eq!(cycles.len(), 2);
        assert_eq!(cycles[0].index, 1);
        assert_eq!(cycles[1].index, 0);

        let after: Vec<_> = timing.active_cycles(1461).collect();
        assert_eq!(after.len(), 1);
        assert_eq!(after[0].index, 1);
    }

    #[test]
    fn test_phase_one_is_inclusive() {
        let timing = CycleTiming::new(10.0, 15.0);
        // Day 25: cycle 2 is a third of the way in, cycle 1 ends exactly today.
        let cycles: Vec<_> = timing.active_cycles(25).collect();
        assert_eq!(cycles.len(), 2);
        assert_eq!(cycles[1], ActiveCycle { index: 1, phase: 1.0 });

        let start: Vec<_> = timing.active_cycles(20).collect();
        assert_eq!(start[0], ActiveCycle { index: 2, phase: 0.0 });
    }

    #[test]
    fn test_active_cycle_count_never_exceeds_two() {
        let timing = reference_timing();
        for nday in 0..5000 {
            let n = timing.active_cycles(nday).count();
            assert!(n <= 2, "day {} has {} active cycles", nday, n);
        }
    }

    #[test]
    fn test_no_overlap_means_single_cycle() {
        let timing = CycleTiming::new(365.0, 365.0);
        for nday in 1..2000 {
            if nday % 365 != 0 {
                assert_eq!(timing.active_cycles(nday).count(), 1);
            }
        }
    }
}

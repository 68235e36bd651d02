use std::time::{SystemTime, UNIX_EPOCH};

use crate::codec::TimelineState;

/// Wall-clock milliseconds since the Unix epoch.
pub fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

/// A pausable logical clock anchored to wall-clock time.
///
/// While running `millis() == now - memory`; while paused
/// `millis() == memory`. Every transition rewrites `memory` so the value is
/// continuous across it. The `*_at` variants take `now` explicitly; the
/// plain variants read the wall clock.
///
/// Used both for the device clock and for the show timeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeTrack {
    memory: i64,
    paused: bool,
}

impl Default for TimeTrack {
    fn default() -> Self {
        Self::new(0, false)
    }
}

impl TimeTrack {
    pub fn new(timestamp: i64, paused: bool) -> Self {
        Self::new_at(timestamp, paused, now_millis())
    }

    pub fn new_at(timestamp: i64, paused: bool, now: i64) -> Self {
        let mut track = Self {
            memory: 0,
            paused: false,
        };
        if paused {
            track.pause_at(now);
        }
        track.set_millis_at(timestamp, now);
        track
    }

    pub fn millis(&self) -> i64 {
        self.millis_at(now_millis())
    }

    pub fn millis_at(&self, now: i64) -> i64 {
        if self.paused {
            self.memory
        } else {
            now - self.memory
        }
    }

    pub fn paused(&self) -> bool {
        self.paused
    }

    pub fn set_millis(&mut self, timestamp: i64) {
        self.set_millis_at(timestamp, now_millis());
    }

    pub fn set_millis_at(&mut self, timestamp: i64, now: i64) {
        self.memory = if self.paused { timestamp } else { now - timestamp };
    }

    pub fn pause(&mut self) {
        self.pause_at(now_millis());
    }

    pub fn pause_at(&mut self, now: i64) {
        if !self.paused {
            self.paused = true;
            self.memory = now - self.memory;
        }
    }

    pub fn unpause(&mut self) {
        self.unpause_at(now_millis());
    }

    pub fn unpause_at(&mut self, now: i64) {
        if self.paused {
            self.paused = false;
            self.memory = now - self.memory;
        }
    }

    /// Adopt an authoritative `(timestamp, paused)` pair.
    ///
    /// A pause-state toggle is applied first so the value stays continuous,
    /// then the timestamp is set.
    pub fn set_state(&mut self, timestamp: i64, paused: bool) {
        self.set_state_at(timestamp, paused, now_millis());
    }

    pub fn set_state_at(&mut self, timestamp: i64, paused: bool, now: i64) {
        if paused != self.paused {
            self.paused = paused;
            self.memory = now - self.memory;
        }
        self.set_millis_at(timestamp, now);
    }

    /// Apply a remote timeline state, as observed through `clock`.
    ///
    /// A running timeline is advanced by how far `clock` moved since the
    /// sender captured `state.clock_timestamp`, so transport latency does not
    /// shift the receiver's view.
    pub fn apply_remote(&mut self, state: &TimelineState, clock: &TimeTrack) {
        self.apply_remote_at(state, clock, now_millis());
    }

    pub fn apply_remote_at(&mut self, state: &TimelineState, clock: &TimeTrack, now: i64) {
        if state.paused {
            self.set_state_at(state.timeline_timestamp as i64, true, now);
        } else {
            let clock_now = clock.millis_at(now) as u32;
            let elapsed = clock_now.wrapping_sub(state.clock_timestamp) as i32 as i64;
            self.set_state_at(state.timeline_timestamp as i64 + elapsed, false, now);
        }
    }

    /// Capture this timeline as a wire state stamped with `clock`.
    pub fn to_state(&self, clock: &TimeTrack) -> TimelineState {
        self.to_state_at(clock, now_millis())
    }

    pub fn to_state_at(&self, clock: &TimeTrack, now: i64) -> TimelineState {
        TimelineState {
            clock_timestamp: clock.millis_at(now) as u32,
            timeline_timestamp: self.millis_at(now) as i32,
            paused: self.paused,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const T0: i64 = 1_700_000_000_000;

    #[test]
    fn runs_with_wall_clock() {
        let track = TimeTrack::new_at(500, false, T0);
        assert_eq!(track.millis_at(T0), 500);
        assert_eq!(track.millis_at(T0 + 250), 750);
    }

    #[test]
    fn paused_track_holds_value() {
        let track = TimeTrack::new_at(500, true, T0);
        assert!(track.paused());
        assert_eq!(track.millis_at(T0 + 10_000), 500);
    }

    #[test]
    fn transitions_are_continuous() {
        let mut track = TimeTrack::new_at(1000, false, T0);
        let mut now = T0;
        let steps: [fn(&mut TimeTrack, i64); 6] = [
            |t, n| t.pause_at(n),
            |t, n| t.pause_at(n),
            |t, n| t.unpause_at(n),
            |t, n| t.set_state_at(t.millis_at(n), true, n),
            |t, n| t.set_state_at(t.millis_at(n), false, n),
            |t, n| t.unpause_at(n),
        ];
        for step in steps {
            now += 37;
            let before = track.millis_at(now);
            step(&mut track, now);
            assert_eq!(track.millis_at(now), before);
        }
    }

    #[test]
    fn set_state_toggles_then_sets() {
        let mut track = TimeTrack::new_at(0, false, T0);
        track.set_state_at(2000, true, T0 + 100);
        assert!(track.paused());
        assert_eq!(track.millis_at(T0 + 5000), 2000);

        track.set_state_at(3000, false, T0 + 6000);
        assert!(!track.paused());
        assert_eq!(track.millis_at(T0 + 6500), 3500);
    }

    #[test]
    fn remote_running_state_is_latency_compensated() {
        let clock = TimeTrack::new_at(10_000, false, T0);
        let state = TimelineState {
            clock_timestamp: 9_800,
            timeline_timestamp: 4_000,
            paused: false,
        };
        let mut timeline = TimeTrack::new_at(0, true, T0);
        timeline.apply_remote_at(&state, &clock, T0);
        assert!(!timeline.paused());
        assert_eq!(timeline.millis_at(T0), 4_200);
    }

    #[test]
    fn remote_paused_state_is_taken_verbatim() {
        let clock = TimeTrack::new_at(10_000, false, T0);
        let state = TimelineState {
            clock_timestamp: 1,
            timeline_timestamp: 777,
            paused: true,
        };
        let mut timeline = TimeTrack::new_at(0, false, T0);
        timeline.apply_remote_at(&state, &clock, T0);
        assert_eq!(timeline.millis_at(T0 + 99_999), 777);
    }

    #[test]
    fn state_capture_matches_tracks() {
        let clock = TimeTrack::new_at(42, false, T0);
        let timeline = TimeTrack::new_at(-5, true, T0);
        let state = timeline.to_state_at(&clock, T0 + 8);
        assert_eq!(state.clock_timestamp, 50);
        assert_eq!(state.timeline_timestamp, -5);
        assert!(state.paused);
    }
}

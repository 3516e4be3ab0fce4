//! Synthetic gameplay traces
//!
//! A trace is a run of pseudo-input events spaced 1.5–3.5 s apart, starting
//! from the current wall-clock time, until the requested game duration is
//! covered. Nothing here sleeps: the duration only shapes the timestamps.

use core_logic::Clock;
use rand::Rng;
use std::fmt;
use std::ops::Range;

const STEP_MS: Range<i64> = 1_500..3_500;
const POS_X: Range<f64> = 50.0..250.0;
const POS_Y: Range<f64> = 200.0..250.0;
const ANGLE: Range<f64> = -1.0..1.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActivityEvent {
    /// Unix milliseconds at which the event happened
    pub time_ms: i64,
    pub pos_x: f64,
    pub pos_y: f64,
    pub angle: f64,
}

impl fmt::Display for ActivityEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}|{:.3}|{:.3}|{:.3}",
            self.time_ms, self.pos_x, self.pos_y, self.angle
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Trace {
    pub started_at_ms: i64,
    pub events: Vec<ActivityEvent>,
}

impl Trace {
    /// Offset of an event from the start of the trace
    pub fn offset_ms(&self, event: &ActivityEvent) -> i64 {
        event.time_ms - self.started_at_ms
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// `time|x|y|angle` records joined by `;`
    pub fn serialize(&self) -> String {
        self.events
            .iter()
            .map(ActivityEvent::to_string)
            .collect::<Vec<_>>()
            .join(";")
    }
}

pub struct TraceGenerator<'a> {
    clock: &'a dyn Clock,
}

impl<'a> TraceGenerator<'a> {
    pub fn new(clock: &'a dyn Clock) -> Self {
        Self { clock }
    }

    pub fn generate<R: Rng + ?Sized>(&self, duration_ms: u64, rng: &mut R) -> Trace {
        let started_at_ms = self.clock.now_ms();
        let end_ms = started_at_ms.saturating_add(duration_ms as i64);

        let mut events = Vec::new();
        let mut t = started_at_ms;
        while t < end_ms {
            t += rng.gen_range(STEP_MS);
            events.push(ActivityEvent {
                time_ms: t,
                pos_x: round3(rng.gen_range(POS_X)),
                pos_y: round3(rng.gen_range(POS_Y)),
                angle: round3(rng.gen_range(ANGLE)),
            });
        }

        Trace {
            started_at_ms,
            events,
        }
    }
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    struct FixedClock(i64);

    impl Clock for FixedClock {
        fn now_ms(&self) -> i64 {
            self.0
        }
    }

    #[test]
    fn test_trace_covers_duration() {
        let clock = FixedClock(1_700_000_000_000);
        let generator = TraceGenerator::new(&clock);

        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            let trace = generator.generate(45_000, &mut rng);

            assert!(!trace.is_empty());
            let first = trace.events.first().unwrap();
            let last = trace.events.last().unwrap();
            assert!(trace.offset_ms(first) >= 1_500);
            assert!(trace.offset_ms(last) >= 45_000);
            // the last step can overshoot by at most one interval
            assert!(trace.offset_ms(last) < 45_000 + 3_500);
        }
    }

    #[test]
    fn test_timestamps_strictly_increase() {
        let clock = FixedClock(0);
        let mut rng = StdRng::seed_from_u64(42);
        let trace = TraceGenerator::new(&clock).generate(120_000, &mut rng);

        for pair in trace.events.windows(2) {
            let step = pair[1].time_ms - pair[0].time_ms;
            assert!((1_500..3_500).contains(&step), "step {} out of range", step);
        }
    }

    #[test]
    fn test_values_in_range_and_rounded() {
        let clock = FixedClock(0);
        let mut rng = StdRng::seed_from_u64(9);
        let trace = TraceGenerator::new(&clock).generate(300_000, &mut rng);

        for event in &trace.events {
            assert!((50.0..=250.0).contains(&event.pos_x));
            assert!((200.0..=250.0).contains(&event.pos_y));
            assert!((-1.0..=1.0).contains(&event.angle));
            assert_eq!(event.pos_x, round3(event.pos_x));
        }
    }

    #[test]
    fn test_short_duration_still_yields_one_event() {
        let clock = FixedClock(10);
        let mut rng = StdRng::seed_from_u64(0);
        let trace = TraceGenerator::new(&clock).generate(1, &mut rng);
        assert_eq!(trace.len(), 1);
    }

    #[test]
    fn test_serialize_format() {
        let trace = Trace {
            started_at_ms: 0,
            events: vec![
                ActivityEvent {
                    time_ms: 1_700_000_001_500,
                    pos_x: 120.5,
                    pos_y: 210.0,
                    angle: -0.25,
                },
                ActivityEvent {
                    time_ms: 1_700_000_004_000,
                    pos_x: 50.123,
                    pos_y: 249.999,
                    angle: 0.0,
                },
            ],
        };
        assert_eq!(
            trace.serialize(),
            "1700000001500|120.500|210.000|-0.250;1700000004000|50.123|249.999|0.000"
        );
    }
}

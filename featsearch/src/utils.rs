use std::time::Duration;
use log::Level;
use metrics::{histogram, Unit};
use stopwatch::Stopwatch;

pub fn measure<R, F>(descr: &str, f: F) -> R
where
    F: FnOnce() -> R,
{
    measure_l(Level::Trace, descr, f)
}

/// Runs `f` and logs how long it took.
pub fn measure_l<R, F>(level: Level, descr: &str, f: F) -> R
where
    F: FnOnce() -> R,
{
    let (result, duration) = measuring_func(f)();
    log::log!(level, "{} {:?}", descr, duration);
    result
}

/// Like [measure], but also records the duration in the `descr` histogram.
pub fn stat<R, F>(descr: &'static str, unit: &Unit, f: F) -> R
where
    F: FnOnce() -> R,
{
    stat_l(Level::Trace, descr, unit, f)
}

pub fn stat_l<R, F>(level: Level, descr: &'static str, unit: &Unit, f: F) -> R
where
    F: FnOnce() -> R,
{
    let (result, duration) = measuring_func(f)();
    log::log!(level, "{} {:?}", descr, duration);
    histogram!(descr).record(duration.to_unit(unit));
    result
}

fn measuring_func<'a, R, F>(f: F) -> Box<dyn FnOnce() -> (R, Duration) + 'a>
where
    F: FnOnce() -> R + 'a,
    R: 'a,
{
    Box::new(|| {
        let sw = Stopwatch::start_new();
        let result = f();
        (result, sw.elapsed())
    })
}

trait ToUnit {
    fn to_unit(&self, unit: &Unit) -> f64;
}

impl ToUnit for Duration {
    fn to_unit(&self, unit: &Unit) -> f64 {
        match unit {
            Unit::Milliseconds => self.as_millis() as f64,
            Unit::Microseconds => self.as_micros() as f64,
            Unit::Nanoseconds => self.as_nanos() as f64,
            _ => self.as_secs_f64(),
        }
    }
}

use std::time::{Duration, Instant};

use memory_stats::memory_stats;

const BYTES_PER_MB: usize = 1_000_000;

/// Step timings of a single render call, reported at debug level.
#[derive(Debug, Default)]
pub(crate) struct RenderMetadata {
    start: Option<Instant>,
    last: Duration,
    steps: Vec<(String, Duration)>,
}

impl RenderMetadata {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn start(&mut self) {
        self.start = Some(Instant::now());
        self.last = Duration::ZERO;
    }

    pub(crate) fn elapsed(&self) -> Duration {
        self.start.map(|t| t.elapsed()).unwrap_or_default()
    }

    /// Records the time spent since the previous step.
    pub(crate) fn step(&mut self, message: &str) {
        let elapsed = self.elapsed();
        let took = elapsed.saturating_sub(self.last);

        if log::log_enabled!(log::Level::Debug) {
            match memory_stats() {
                Some(usage) => log::debug!(
                    "{message}, took: {:?} - Current mem use: {}Mb",
                    took,
                    usage.physical_mem / BYTES_PER_MB
                ),
                None => log::debug!("{message}, took: {:?}", took),
            }
        }

        self.steps.push((message.to_string(), took));
        self.last = elapsed;
    }

    pub(crate) fn finish(&self) {
        log::debug!(
            "Render finished in {} steps, total elapsed: {:.2?}",
            self.steps.len(),
            self.elapsed()
        );
    }

    #[cfg(test)]
    pub(crate) fn steps(&self) -> &[(String, Duration)] {
        &self.steps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn steps_are_recorded_in_order() {
        let mut metadata = RenderMetadata::new();
        metadata.start();
        metadata.step("encode");
        metadata.step("decode");

        let names: Vec<&str> = metadata.steps().iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, vec!["encode", "decode"]);
        let total: Duration = metadata.steps().iter().map(|(_, took)| *took).sum();
        assert!(total <= metadata.elapsed());
    }

    #[test]
    fn elapsed_is_zero_before_start() {
        assert_eq!(RenderMetadata::new().elapsed(), Duration::ZERO);
    }
}

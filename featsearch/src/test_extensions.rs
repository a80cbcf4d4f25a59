use std::time::{Duration, Instant};
use spectral::{assert_that, Spec};
use spectral::prelude::*;
use crate::background_process::background_process_registry::BackgroundProcessRegistry;

const BACKGROUND_TIMEOUT: Duration = Duration::from_secs(30);

pub trait UniqueElementAssertions<'s, T> {
    fn has_only_element(&mut self) -> Spec<'s, T>;
}

impl<'s, T: std::fmt::Debug> UniqueElementAssertions<'s, T> for Spec<'s, Vec<T>> {
    fn has_only_element(&mut self) -> Spec<'s, T> {
        assert_that(self.subject).has_length(1);
        assert_that(&self.subject[0])
    }
}

/// Pumps the registry until every background process has completed.
pub fn wait_for_all(registry: &mut BackgroundProcessRegistry) {
    let started = Instant::now();
    while !registry.is_empty() {
        assert!(started.elapsed() < BACKGROUND_TIMEOUT, "Background processes did not finish in time");
        registry.handle_events_from_background();
        std::thread::sleep(Duration::from_millis(1));
    }
}

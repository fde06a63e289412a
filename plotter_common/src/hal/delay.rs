//! Cooperative delay port.
//!
//! Every blocking poll and mechanical settle in the control unit waits
//! through a `Delay`, so tests and the simulation can substitute a clock
//! that does not sleep the host.

use std::time::Duration;

/// Injectable delay.
pub trait Delay {
    /// Let `duration` pass before returning.
    fn delay(&mut self, duration: Duration);
}

/// Delay backed by `std::thread::sleep`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadDelay;

impl Delay for ThreadDelay {
    fn delay(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

impl<D: Delay + ?Sized> Delay for &mut D {
    fn delay(&mut self, duration: Duration) {
        (**self).delay(duration);
    }
}

use num_traits::Float;

use crate::{BoundsTracker, Sink, WindowTracker};

/// Transform-and-relay stage sitting behind another indicator
///
/// A relay is the sink of an inner indicator. Every value it receives is
/// mapped through `transform`, booked in the relay's own [`WindowTracker`] and
/// [`BoundsTracker`], then forwarded downstream with the same tick index. It
/// has no windowing of its own: its warm-up is exactly the inner indicator's.
///
/// [`StdDeviation`](crate::StdDeviation) is a [`Variance`](crate::Variance)
/// feeding a relay whose transform is the square root. Other post-transforms
/// are built the same way:
///
/// ```
/// # use ta_chain::{Indicator, Relay, Storage, Variance};
/// // rolling variance expressed in percent of the unit range
/// let relay = Relay::<f64, _>::new(3, |v| v * 100.0, Storage::new());
/// let mut scaled = Variance::<f64, _>::new(3, relay).unwrap();
/// for (i, x) in [0.1, 0.2, 0.3].into_iter().enumerate() {
///     scaled.receive_tick(x, i).unwrap();
/// }
/// let out = scaled.sink().downstream().data();
/// assert!((out[0] - 0.6667).abs() < 1e-4);
/// ```
#[derive(Debug, Clone)]
pub struct Relay<T, S> {
    /// Warm-up bookkeeping of the transformed series
    window: WindowTracker,
    /// Bounds of the transformed series
    bounds: BoundsTracker<T>,
    /// Applied to every inner value
    transform: fn(T) -> T,
    /// Receives the transformed values
    downstream: S,
}

impl<T: Float, S: Sink<T>> Relay<T, S> {
    /// Creates a relay
    ///
    /// # Arguments
    ///
    /// * `period` - Period reported by the relay's window tracker, normally the inner indicator's
    /// * `transform` - Function applied to every inner value
    /// * `downstream` - Sink receiving the transformed values
    pub fn new(period: usize, transform: fn(T) -> T, downstream: S) -> Self {
        Self {
            window: WindowTracker::new(period),
            bounds: BoundsTracker::new(),
            transform,
            downstream,
        }
    }
}

impl<T, S> Relay<T, S> {
    /// Returns the warm-up bookkeeping of the transformed series
    #[inline]
    pub const fn window(&self) -> &WindowTracker {
        &self.window
    }

    /// Returns the bounds of the transformed series
    #[inline]
    pub const fn bounds(&self) -> &BoundsTracker<T> {
        &self.bounds
    }

    /// Returns the downstream sink
    #[inline]
    pub const fn downstream(&self) -> &S {
        &self.downstream
    }

    /// Returns the downstream sink mutably
    #[inline]
    pub const fn downstream_mut(&mut self) -> &mut S {
        &mut self.downstream
    }
}

impl<T: Float, S: Sink<T>> Sink<T> for Relay<T, S> {
    fn on_value(&mut self, value: T, index: usize) {
        let value = (self.transform)(value);
        self.window.record_output(index);
        self.bounds.record_output(value);
        self.downstream.on_value(value, index);
    }
}

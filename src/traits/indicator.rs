use crate::{BoundsTracker, Result, WindowTracker};

/// A streaming indicator stage
///
/// An indicator consumes one scalar tick at a time, in strictly increasing
/// index order, and pushes each value it produces to its downstream
/// [`Sink`](crate::Sink). It never revisits earlier ticks and has no way to be
/// rewound: build a new one to start over.
///
/// Every stage keeps its own warm-up bookkeeping ([`WindowTracker`]) and
/// running extremes ([`BoundsTracker`]), both updated once per emitted value.
pub trait Indicator<T> {
    /// Feeds one tick into the indicator
    ///
    /// Before the window is full the tick only primes the indicator. After
    /// that, every accepted tick emits exactly one value to the sink before
    /// this call returns.
    ///
    /// # Arguments
    ///
    /// * `value` - The tick value
    /// * `index` - Position of the tick in the source series
    ///
    /// # Errors
    ///
    /// * [`OutOfOrderInput`](crate::IndicatorError::OutOfOrderInput) - `index` is not
    ///   strictly greater than the previously accepted index
    /// * [`NonFiniteInput`](crate::IndicatorError::NonFiniteInput) - `value` is NaN or infinite
    ///
    /// A rejected tick leaves the indicator unchanged.
    fn receive_tick(&mut self, value: T, index: usize) -> Result<()>;

    /// Returns the warm-up bookkeeping of this stage
    fn window(&self) -> &WindowTracker;

    /// Returns the running bounds of the values this stage emitted
    fn bounds(&self) -> &BoundsTracker<T>;

    /// Returns the window period
    fn period(&self) -> usize {
        self.window().period()
    }

    /// Returns the number of ticks consumed before the first output
    fn lookback(&self) -> usize {
        self.window().lookback()
    }

    /// Returns the tick index of the first output, or `None` during warm-up
    fn valid_from_bar(&self) -> Option<usize> {
        self.window().valid_from_bar()
    }

    /// Returns the number of values emitted so far
    fn data_length(&self) -> usize {
        self.window().data_length()
    }

    /// Returns true once the indicator emitted its first value
    fn is_ready(&self) -> bool {
        self.window().is_ready()
    }
}

/// Look-back and warm-up bookkeeping for a single indicator stage.
///
/// Records the configured period, the index of the first tick that produced an
/// output and how many outputs were emitted so far. It only changes through
/// [`WindowTracker::record_output`], which a stage calls once per emitted value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowTracker {
    /// Window period
    period: usize,
    /// Tick index of the first output, unset until warm-up completes
    valid_from_bar: Option<usize>,
    /// Outputs emitted so far
    data_length: usize,
}

impl WindowTracker {
    /// Creates a tracker for the specified period
    ///
    /// # Arguments
    ///
    /// * `period` - The window period of the owning stage
    pub const fn new(period: usize) -> Self {
        Self {
            period,
            valid_from_bar: None,
            data_length: 0,
        }
    }

    /// Books one emitted output produced at tick `index`
    ///
    /// The first call pins `valid_from_bar`; every call bumps `data_length`.
    #[inline]
    pub fn record_output(&mut self, index: usize) {
        if self.valid_from_bar.is_none() {
            self.valid_from_bar = Some(index);
        }
        self.data_length += 1;
    }

    /// Returns the window period
    #[inline]
    pub const fn period(&self) -> usize {
        self.period
    }

    /// Returns the number of ticks consumed before the first output
    #[inline]
    pub const fn lookback(&self) -> usize {
        self.period.saturating_sub(1)
    }

    /// Returns the tick index of the first output, or `None` during warm-up
    #[inline]
    pub const fn valid_from_bar(&self) -> Option<usize> {
        self.valid_from_bar
    }

    /// Returns the number of outputs emitted so far
    #[inline]
    pub const fn data_length(&self) -> usize {
        self.data_length
    }

    /// Returns true once at least one output was emitted
    #[inline]
    pub const fn is_ready(&self) -> bool {
        self.valid_from_bar.is_some()
    }
}

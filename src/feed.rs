use tracing::warn;

use crate::{Indicator, IndicatorError, Sink};

/// Sink that drives another indicator, for indicator-of-indicator chains
///
/// Each value reaching the feed becomes a tick of the wrapped indicator, with
/// the upstream tick index carried through. A sink has no way to return an
/// error, so the first error raised by the wrapped indicator is kept and can
/// be read back with [`Feed::error`]. Later values are still delivered.
///
/// ```
/// # use ta_chain::{Feed, Indicator, StdDeviation, Variance};
/// // variance of a 3-tick standard deviation, over 2 outputs
/// let inner = Variance::<f64, _>::with_storage(2).unwrap();
/// let mut chain = StdDeviation::<f64, _>::new(3, Feed::new(inner)).unwrap();
/// for (i, x) in [1.0, 2.0, 4.0, 8.0].into_iter().enumerate() {
///     chain.receive_tick(x, i).unwrap();
/// }
/// let inner = chain.sink().indicator();
/// assert_eq!(inner.valid_from_bar(), Some(3));
/// assert_eq!(inner.data().len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct Feed<E> {
    /// Indicator receiving the upstream values
    indicator: E,
    /// First error raised by `indicator`
    error: Option<IndicatorError>,
}

impl<E> Feed<E> {
    /// Wraps `indicator` so it can be used as a sink
    pub const fn new(indicator: E) -> Self {
        Self {
            indicator,
            error: None,
        }
    }

    /// Returns the wrapped indicator
    #[inline]
    pub const fn indicator(&self) -> &E {
        &self.indicator
    }

    /// Returns the first error raised by the wrapped indicator, if any
    #[inline]
    pub const fn error(&self) -> Option<&IndicatorError> {
        self.error.as_ref()
    }

    /// Consumes the feed and returns the wrapped indicator
    #[inline]
    pub fn into_inner(self) -> E {
        self.indicator
    }
}

impl<T, E: Indicator<T>> Sink<T> for Feed<E> {
    fn on_value(&mut self, value: T, index: usize) {
        if let Err(err) = self.indicator.receive_tick(value, index) {
            warn!(%err, "chained indicator rejected value");
            if self.error.is_none() {
                self.error = Some(err);
            }
        }
    }
}

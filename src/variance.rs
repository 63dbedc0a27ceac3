use alloc::rc::Rc;
use core::cell::RefCell;

use num_traits::Float;
use tracing::{debug, warn};

use crate::{
    BoundsTracker, Discard, Indicator, IndicatorError, Kbn, Result, Sink, Storage,
    WindowTracker,
    stream::{Dohlcv, DohlcvStream, StreamAdapter},
    utils::RingBuffer,
};

/// Rolling variance over the trailing `period` ticks
///
/// The window keeps the raw ticks it needs to retire old values, a
/// compensated running sum for the mean and a sliding Welford accumulator of
/// squared deviations from it, so each tick costs O(1) regardless of how long
/// the series runs. Deviations are taken from the mean rather than from zero,
/// which keeps small moves measurable at large price levels. The first `period - 1` ticks
/// only prime the window; from the `period`-th tick on, every tick emits one
/// variance to the sink.
///
/// The estimator is fixed at construction: population variance (divide by
/// `period`) by default, sample variance (divide by `period - 1`) when built
/// with `ddof` set. Outputs are never negative.
///
/// # Type Parameters
///
/// * `T` - Floating point type of ticks and outputs
/// * `S` - Downstream [`Sink`](crate::Sink) receiving each variance
#[derive(Debug, Clone)]
pub struct Variance<T, S = Discard> {
    /// Raw ticks of the current window
    buf: RingBuffer<T>,
    /// Delta Degrees of Freedom
    ddof: bool,
    /// Window length as `T`
    n: T,
    /// Estimator denominator, `n` or `n - 1`
    denom: T,
    /// Ticks held while warming up, as `T`
    filled: T,
    /// Sum of window values
    sum: Kbn<T>,
    /// Sum of squared deviations from the window mean
    m2: Kbn<T>,
    /// Index of the last accepted tick
    last_index: Option<usize>,
    /// Warm-up bookkeeping
    window: WindowTracker,
    /// Bounds of the emitted variances
    bounds: BoundsTracker<T>,
    /// Receives each variance
    sink: S,
}

impl<T: Float + Default, S> Variance<T, S> {
    /// Creates a population variance with the specified period
    ///
    /// # Arguments
    ///
    /// * `period` - Number of trailing ticks in the window, at least 2
    /// * `sink` - Receives every variance with its tick index
    ///
    /// # Errors
    ///
    /// * [`InvalidConfiguration`](IndicatorError::InvalidConfiguration) - `period` is below 2
    ///
    /// # Examples
    ///
    /// ```
    /// # use ta_chain::{Discard, Indicator, Variance};
    /// let mut var = Variance::<f64, _>::new(3, Discard).unwrap();
    /// for (i, x) in [1.0, 2.0, 4.0, 8.0].into_iter().enumerate() {
    ///     var.receive_tick(x, i).unwrap();
    /// }
    /// assert_eq!(var.valid_from_bar(), Some(2));
    /// assert_eq!(var.data_length(), 2);
    ///
    /// assert!(Variance::<f64, _>::new(1, Discard).is_err());
    /// ```
    pub fn new(period: usize, sink: S) -> Result<Self> {
        Self::with_ddof(period, false, sink)
    }

    /// Creates a variance with an explicit estimator
    ///
    /// # Arguments
    ///
    /// * `period` - Number of trailing ticks in the window, at least 2
    /// * `ddof` - Divide by `period - 1` (sample) instead of `period` (population)
    /// * `sink` - Receives every variance with its tick index
    ///
    /// # Errors
    ///
    /// * [`InvalidConfiguration`](IndicatorError::InvalidConfiguration) - `period` is below 2
    ///   or not representable in `T`
    pub fn with_ddof(period: usize, ddof: bool, sink: S) -> Result<Self> {
        if period < 2 {
            return Err(IndicatorError::invalid_configuration(
                period,
                "variance needs a period of at least 2",
            ));
        }

        let n = T::from(period).ok_or(IndicatorError::invalid_configuration(
            period,
            "period is not representable as a float",
        ))?;
        let denom = if ddof { n - T::one() } else { n };

        Ok(Self {
            buf: RingBuffer::new(period),
            ddof,
            n,
            denom,
            filled: T::zero(),
            sum: Kbn::default(),
            m2: Kbn::default(),
            last_index: None,
            window: WindowTracker::new(period),
            bounds: BoundsTracker::new(),
            sink,
        })
    }
}

impl<T, S> Variance<T, S> {
    /// Returns the Delta Degrees of Freedom
    ///
    /// # Returns
    ///
    /// * `bool` - True for the sample estimator, false for the population one
    #[inline]
    pub const fn ddof(&self) -> bool {
        self.ddof
    }

    /// Returns the downstream sink
    #[inline]
    pub const fn sink(&self) -> &S {
        &self.sink
    }

    /// Returns the downstream sink mutably
    #[inline]
    pub const fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Consumes the indicator and returns its sink
    #[inline]
    pub fn into_sink(self) -> S {
        self.sink
    }
}

impl<T: Float + Default, S> Variance<T, S> {
    /// Returns the number of ticks currently held in the window
    #[inline]
    pub fn count(&self) -> usize {
        self.buf.len()
    }

    /// Checks ordering and finiteness without touching any state
    fn admit(&self, value: T, index: usize) -> Result<()> {
        if let Some(previous) = self.last_index.filter(|previous| index <= *previous) {
            warn!(previous, received = index, "variance rejected out of order tick");
            return Err(IndicatorError::OutOfOrderInput {
                previous,
                received: index,
            });
        }
        if !value.is_finite() {
            warn!(index, "variance rejected non-finite tick");
            return Err(IndicatorError::NonFiniteInput { index });
        }
        Ok(())
    }

    /// Mean of the ticks held so far, `fallback` when the window is empty
    #[inline]
    fn mean_or(&self, fallback: T) -> T {
        if self.filled.is_zero() {
            fallback
        } else {
            self.sum.total() / self.filled
        }
    }

    /// Admits `value` into the running mean and squared deviations
    fn update(&mut self, value: T) {
        let old_mean = self.mean_or(value);
        match self.buf.push(value) {
            Some(popped) => {
                self.sum += value;
                self.sum -= popped;
                let new_mean = self.sum.total() / self.n;
                self.m2 += (value - popped) * ((value - new_mean) + (popped - old_mean));
            }
            None => {
                self.filled = self.filled + T::one();
                self.sum += value;
                let new_mean = self.sum.total() / self.filled;
                self.m2 += (value - old_mean) * (value - new_mean);
            }
        }
    }

    /// Variance of the current full window
    #[inline]
    fn current(&self) -> T {
        (self.m2.total() / self.denom).max(T::zero())
    }
}

impl<T, S> Indicator<T> for Variance<T, S>
where
    T: Float + Default,
    S: Sink<T>,
{
    fn receive_tick(&mut self, value: T, index: usize) -> Result<()> {
        self.admit(value, index)?;
        self.last_index = Some(index);

        self.update(value);

        if !self.buf.is_full() {
            return Ok(());
        }

        let variance = self.current();
        if !self.window.is_ready() {
            debug!(period = self.window.period(), index, "variance warm-up complete");
        }
        self.window.record_output(index);
        self.bounds.record_output(variance);
        self.sink.on_value(variance, index);
        Ok(())
    }

    #[inline]
    fn window(&self) -> &WindowTracker {
        &self.window
    }

    #[inline]
    fn bounds(&self) -> &BoundsTracker<T> {
        &self.bounds
    }
}

impl<T: Float + Default> Variance<T, Storage<T>> {
    /// Creates a population variance that stores every output
    ///
    /// # Arguments
    ///
    /// * `period` - Number of trailing ticks in the window, at least 2
    ///
    /// # Errors
    ///
    /// * [`InvalidConfiguration`](IndicatorError::InvalidConfiguration) - `period` is below 2
    ///
    /// # Examples
    ///
    /// ```
    /// # use ta_chain::{Indicator, Variance};
    /// let mut var = Variance::<f64, _>::with_storage(3).unwrap();
    /// for (i, x) in [1.0, 2.0, 3.0, 4.0, 5.0].into_iter().enumerate() {
    ///     var.receive_tick(x, i).unwrap();
    /// }
    /// assert_eq!(var.data().len(), 3);
    /// assert!(var.data().iter().all(|v| (v - 2.0 / 3.0).abs() < 1e-12));
    /// ```
    pub fn with_storage(period: usize) -> Result<Self> {
        Self::new(period, Storage::new())
    }
}

impl<T: Float + Default + 'static> Variance<T, Storage<T>> {
    /// Creates a storing population variance subscribed to a bar stream
    ///
    /// # Arguments
    ///
    /// * `stream` - Stream publishing the bars
    /// * `period` - Number of trailing ticks in the window, at least 2
    /// * `select` - Picks the value out of each bar
    ///
    /// # Errors
    ///
    /// * [`InvalidConfiguration`](IndicatorError::InvalidConfiguration) - `period` is below 2,
    ///   in which case nothing is subscribed
    pub fn for_stream<F>(
        stream: &mut DohlcvStream<T>,
        period: usize,
        select: F,
    ) -> Result<Rc<RefCell<StreamAdapter<Self, F>>>>
    where
        F: Fn(&Dohlcv<T>) -> T + 'static,
    {
        Ok(StreamAdapter::subscribe(
            stream,
            Self::with_storage(period)?,
            select,
        ))
    }
}

impl<T, D> Variance<T, Storage<T, D>> {
    /// Returns every variance emitted so far, oldest first
    ///
    /// Entry `i` is the `i`-th output since `valid_from_bar()`; with gaps in
    /// the tick indices it is not necessarily tick `valid_from_bar() + i`.
    #[inline]
    pub fn data(&self) -> &[T] {
        self.sink.data()
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use assert_approx_eq::assert_approx_eq;

    use super::*;
    use crate::stream::use_typical_price;

    fn run(var: &mut impl Indicator<f64>, inputs: &[f64]) {
        inputs
            .iter()
            .enumerate()
            .for_each(|(i, x)| var.receive_tick(*x, i).unwrap());
    }

    #[test]
    fn rejects_short_period() {
        for period in [0, 1] {
            let err = Variance::<f64, _>::new(period, Discard).unwrap_err();
            assert!(matches!(
                err,
                IndicatorError::InvalidConfiguration { period: p, .. } if p == period
            ));
        }
        assert!(Variance::<f64, _>::new(2, Discard).is_ok());
    }

    #[test]
    fn silent_during_warm_up() {
        let mut out = Vec::new();
        let mut var = Variance::<f64, _>::new(4, |v: f64, i: usize| out.push((i, v))).unwrap();
        run(&mut var, &[1.0, 2.0, 3.0]);

        assert_eq!(var.count(), 3);
        assert_eq!(var.data_length(), 0);
        assert_eq!(var.valid_from_bar(), None);
        assert_eq!(var.bounds().min(), None);
        drop(var);
        assert!(out.is_empty());
    }

    #[test]
    fn population_variance_works() {
        let mut var = Variance::<f64, _>::with_storage(3).unwrap();
        let inputs = [25.4, 26.2, 26.0, 26.1, 25.8, 25.9, 26.3, 26.2, 26.5];
        run(&mut var, &inputs);

        let expected: [f64; 7] = [0.1156, 0.0067, 0.0156, 0.0156, 0.0467, 0.0289, 0.0156];
        assert_eq!(var.data().len(), expected.len());
        for (i, e) in expected.iter().enumerate() {
            assert_approx_eq!(e, var.data()[i], 0.0001);
        }
        assert_eq!(var.valid_from_bar(), Some(2));
    }

    #[test]
    fn sample_variance_works() {
        let mut var = Variance::<f64, _>::with_ddof(3, true, Storage::new()).unwrap();
        assert!(var.ddof());
        let inputs = [25.4, 26.2, 26.0, 26.1, 25.8, 25.9, 26.3, 26.2, 26.5];
        run(&mut var, &inputs);

        let expected: [f64; 7] = [0.1733, 0.01, 0.0233, 0.0233, 0.07, 0.0433, 0.0233];
        for (i, e) in expected.iter().enumerate() {
            assert_approx_eq!(e, var.data()[i], 0.0001);
        }
    }

    #[test]
    fn emits_with_tick_index() {
        let mut out = Vec::new();
        let mut var = Variance::<f64, _>::new(3, |v: f64, i: usize| out.push((i, v))).unwrap();
        for (i, x) in [1.0, 2.0, 3.0, 4.0, 5.0].iter().enumerate() {
            var.receive_tick(*x, i + 10).unwrap();
        }
        assert_eq!(var.valid_from_bar(), Some(12));
        drop(var);

        let indices: Vec<usize> = out.iter().map(|(i, _)| *i).collect();
        assert_eq!(indices, [12, 13, 14]);
        out.iter().for_each(|(_, v)| assert_approx_eq!(v, 2.0 / 3.0, 1e-12));
    }

    #[test]
    fn tracks_bounds() {
        let mut var = Variance::<f64, _>::with_storage(3).unwrap();
        run(&mut var, &[1.0, 2.0, 4.0, 8.0, 16.0]);

        assert_approx_eq!(var.bounds().min().unwrap(), 14.0 / 9.0, 1e-9);
        assert_approx_eq!(var.bounds().max().unwrap(), 224.0 / 9.0, 1e-9);
    }

    #[test]
    fn constant_series_is_exactly_zero() {
        let mut var = Variance::<f64, _>::with_storage(5).unwrap();
        run(&mut var, &[0.1; 40]);
        assert!(var.data().iter().all(|v| *v >= 0.0 && *v < 1e-12));
    }

    #[test]
    fn rejects_out_of_order_without_side_effects() {
        let mut var = Variance::<f64, _>::with_storage(2).unwrap();
        var.receive_tick(1.0, 5).unwrap();
        var.receive_tick(2.0, 6).unwrap();

        assert_eq!(
            var.receive_tick(100.0, 6),
            Err(IndicatorError::OutOfOrderInput {
                previous: 6,
                received: 6
            })
        );
        assert_eq!(
            var.receive_tick(100.0, 3),
            Err(IndicatorError::OutOfOrderInput {
                previous: 6,
                received: 3
            })
        );

        var.receive_tick(3.0, 7).unwrap();
        assert_eq!(var.data(), [0.25, 0.25]);
        assert_eq!(var.data_length(), 2);
    }

    #[test]
    fn rejects_non_finite() {
        let mut var = Variance::<f64, _>::with_storage(2).unwrap();
        var.receive_tick(1.0, 0).unwrap();
        assert_eq!(
            var.receive_tick(f64::NAN, 1),
            Err(IndicatorError::NonFiniteInput { index: 1 })
        );
        assert_eq!(
            var.receive_tick(f64::INFINITY, 1),
            Err(IndicatorError::NonFiniteInput { index: 1 })
        );
        var.receive_tick(3.0, 1).unwrap();
        assert_eq!(var.data(), [1.0]);
    }

    #[test]
    fn subscribes_to_stream() {
        let mut stream = DohlcvStream::new();
        let var = Variance::<f64, _>::for_stream(&mut stream, 3, use_typical_price).unwrap();
        for (i, mid) in [1.0, 2.0, 3.0, 4.0].into_iter().enumerate() {
            let bar = Dohlcv::new(i as i64, mid, mid + 1.0, mid - 1.0, mid, 10.0);
            stream.receive_tick(bar).unwrap();
        }

        let var = var.borrow();
        assert_eq!(var.indicator().valid_from_bar(), Some(2));
        var.indicator()
            .data()
            .iter()
            .for_each(|v| assert_approx_eq!(v, 2.0 / 3.0, 1e-12));
    }

    #[test]
    fn small_moves_at_large_price_level() {
        let mut var = Variance::<f64, _>::with_storage(10).unwrap();
        let inputs: Vec<f64> = (0..200)
            .map(|i| 1e6 + 0.01 * ((i * 7) % 11) as f64)
            .collect();
        run(&mut var, &inputs);

        assert_eq!(var.data().len(), inputs.len() - 9);
        for (out, window) in var.data().iter().zip(inputs.windows(10)) {
            let mean = window.iter().sum::<f64>() / 10.0;
            let expected = window.iter().map(|x| (x - mean) * (x - mean)).sum::<f64>() / 10.0;
            assert!((out - expected).abs() <= 1e-5 * expected);
        }
    }

    #[test]
    fn works_with_f32() {
        let mut var = Variance::<f32, _>::with_storage(2).unwrap();
        var.receive_tick(1.0, 0).unwrap();
        var.receive_tick(3.0, 1).unwrap();
        assert_eq!(var.data(), [1.0f32]);
    }
}

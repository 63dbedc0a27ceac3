use alloc::rc::Rc;
use core::cell::RefCell;

use num_traits::Float;

use crate::{
    BoundsTracker, Discard, Indicator, Relay, Result, Sink, Storage, Variance, WindowTracker,
    stream::{Dohlcv, DohlcvStream, StreamAdapter},
};

/// Rolling standard deviation over the trailing `period` ticks
///
/// A standard deviation is a [`Variance`] whose outputs go through a square
/// root [`Relay`] before reaching the sink. The variance is owned outright and
/// only reachable through this type; ticks are forwarded to it unchanged, so
/// the standard deviation shares its warm-up and estimator. It keeps its own
/// window and bounds bookkeeping for the square-rooted series.
///
/// # Type Parameters
///
/// * `T` - Floating point type of ticks and outputs
/// * `S` - Downstream [`Sink`](crate::Sink) receiving each standard deviation
#[derive(Debug, Clone)]
pub struct StdDeviation<T, S = Discard> {
    /// Inner variance relaying through `sqrt`
    variance: Variance<T, Relay<T, S>>,
}

impl<T: Float + Default, S: Sink<T>> StdDeviation<T, S> {
    /// Creates a population standard deviation with the specified period
    ///
    /// # Arguments
    ///
    /// * `period` - Number of trailing ticks in the window, at least 2
    /// * `sink` - Receives every standard deviation with its tick index
    ///
    /// # Errors
    ///
    /// * [`InvalidConfiguration`](crate::IndicatorError::InvalidConfiguration) - `period` is below 2
    ///
    /// # Examples
    ///
    /// ```
    /// # use ta_chain::{Indicator, StdDeviation};
    /// let mut out = vec![];
    /// let mut sd = StdDeviation::<f64, _>::new(3, |v: f64, i: usize| out.push((i, v))).unwrap();
    /// for (i, x) in [1.0, 2.0, 3.0, 4.0].into_iter().enumerate() {
    ///     sd.receive_tick(x, i).unwrap();
    /// }
    /// assert_eq!(sd.valid_from_bar(), Some(2));
    /// drop(sd);
    /// assert_eq!(out.len(), 2);
    /// assert!((out[0].1 - 0.8165).abs() < 1e-4);
    /// ```
    pub fn new(period: usize, sink: S) -> Result<Self> {
        Self::with_ddof(period, false, sink)
    }

    /// Creates a standard deviation with an explicit estimator
    ///
    /// # Arguments
    ///
    /// * `period` - Number of trailing ticks in the window, at least 2
    /// * `ddof` - Use the sample variance (divide by `period - 1`) under the root
    /// * `sink` - Receives every standard deviation with its tick index
    ///
    /// # Errors
    ///
    /// * [`InvalidConfiguration`](crate::IndicatorError::InvalidConfiguration) - `period` is below 2
    pub fn with_ddof(period: usize, ddof: bool, sink: S) -> Result<Self> {
        let relay = Relay::new(period, |v: T| v.sqrt(), sink);
        Ok(Self {
            variance: Variance::with_ddof(period, ddof, relay)?,
        })
    }
}

impl<T, S> StdDeviation<T, S> {
    /// Returns the Delta Degrees of Freedom of the inner variance
    #[inline]
    pub const fn ddof(&self) -> bool {
        self.variance.ddof()
    }

    /// Returns the downstream sink
    #[inline]
    pub const fn sink(&self) -> &S {
        self.variance.sink().downstream()
    }

    /// Returns the downstream sink mutably
    #[inline]
    pub const fn sink_mut(&mut self) -> &mut S {
        self.variance.sink_mut().downstream_mut()
    }
}

impl<T, S> Indicator<T> for StdDeviation<T, S>
where
    T: Float + Default,
    S: Sink<T>,
{
    #[inline]
    fn receive_tick(&mut self, value: T, index: usize) -> Result<()> {
        self.variance.receive_tick(value, index)
    }

    #[inline]
    fn window(&self) -> &WindowTracker {
        self.variance.sink().window()
    }

    #[inline]
    fn bounds(&self) -> &BoundsTracker<T> {
        self.variance.sink().bounds()
    }
}

impl<T: Float + Default> StdDeviation<T, Storage<T>> {
    /// Creates a population standard deviation that stores every output
    ///
    /// # Arguments
    ///
    /// * `period` - Number of trailing ticks in the window, at least 2
    ///
    /// # Errors
    ///
    /// * [`InvalidConfiguration`](crate::IndicatorError::InvalidConfiguration) - `period` is below 2
    pub fn with_storage(period: usize) -> Result<Self> {
        Self::new(period, Storage::new())
    }
}

impl<T: Float + Default + 'static> StdDeviation<T, Storage<T>> {
    /// Creates a storing standard deviation subscribed to a bar stream
    ///
    /// # Arguments
    ///
    /// * `stream` - Stream publishing the bars
    /// * `period` - Number of trailing ticks in the window, at least 2
    /// * `select` - Picks the value out of each bar
    ///
    /// # Errors
    ///
    /// * [`InvalidConfiguration`](crate::IndicatorError::InvalidConfiguration) - `period` is below 2,
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

impl<T, D> StdDeviation<T, Storage<T, D>> {
    /// Returns every standard deviation emitted so far, oldest first
    ///
    /// Entry `i` is the `i`-th output since `valid_from_bar()`; with gaps in
    /// the tick indices it is not necessarily tick `valid_from_bar() + i`.
    #[inline]
    pub fn data(&self) -> &[T] {
        self.sink().data()
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use assert_approx_eq::assert_approx_eq;

    use super::*;
    use crate::{IndicatorError, stream::use_close_price};

    fn feed<I: Indicator<f64>>(indicator: &mut I, inputs: &[f64]) {
        inputs
            .iter()
            .enumerate()
            .for_each(|(i, x)| indicator.receive_tick(*x, i).unwrap());
    }

    #[test]
    fn rejects_short_period() {
        assert!(matches!(
            StdDeviation::<f64, _>::new(1, Discard),
            Err(IndicatorError::InvalidConfiguration { period: 1, .. })
        ));
    }

    #[test]
    fn stddev_works() {
        let mut sd = StdDeviation::<f64, _>::with_storage(3).unwrap();
        let inputs = [25.4, 26.2, 26.0, 26.1, 25.8, 25.9, 26.3, 26.2, 26.5];
        feed(&mut sd, &inputs);

        let expected: [f64; 7] = [0.3399, 0.0816, 0.1247, 0.1247, 0.216, 0.17, 0.1247];
        assert_eq!(sd.data().len(), expected.len());
        for (i, e) in expected.iter().enumerate() {
            assert_approx_eq!(e, sd.data()[i], 0.0001);
        }

        let mut sd = StdDeviation::<f64, _>::with_ddof(3, true, Storage::new()).unwrap();
        assert!(sd.ddof());
        feed(&mut sd, &inputs);

        let expected: [f64; 7] = [0.4163, 0.1, 0.1528, 0.1528, 0.2646, 0.2082, 0.1528];
        for (i, e) in expected.iter().enumerate() {
            assert_approx_eq!(e, sd.data()[i], 0.0001);
        }
    }

    #[test]
    fn linear_series_has_constant_deviation() {
        let mut sd = StdDeviation::<f64, _>::with_storage(3).unwrap();
        feed(&mut sd, &[1.0, 2.0, 3.0, 4.0, 5.0]);

        assert_eq!(sd.valid_from_bar(), Some(2));
        assert_eq!(sd.data_length(), 3);
        let expected = (2.0f64 / 3.0).sqrt();
        sd.data().iter().for_each(|v| assert_approx_eq!(v, expected, 1e-12));
        assert_approx_eq!(sd.bounds().min().unwrap(), 0.8165, 1e-4);
        assert_approx_eq!(sd.bounds().max().unwrap(), 0.8165, 1e-4);
    }

    #[test]
    fn geometric_series_widens_bounds() {
        let mut sd = StdDeviation::<f64, _>::with_storage(3).unwrap();
        feed(&mut sd, &[1.0, 2.0, 4.0, 8.0, 16.0]);

        let expected = [
            (14.0f64 / 9.0).sqrt(),
            (56.0f64 / 9.0).sqrt(),
            (224.0f64 / 9.0).sqrt(),
        ];
        for (i, e) in expected.iter().enumerate() {
            assert_approx_eq!(e, sd.data()[i], 1e-9);
        }
        assert_approx_eq!(sd.bounds().min().unwrap(), 1.2472, 1e-4);
        assert_approx_eq!(sd.bounds().max().unwrap(), 4.9889, 1e-4);
    }

    #[test]
    fn matches_square_root_of_variance() {
        let inputs = [1.2, -0.7, 3.4, 2.1, -1.5, 0.0, 2.2, -0.3, 1.5, -2.0];
        let mut var = Variance::<f64, _>::with_storage(4).unwrap();
        let mut sd = StdDeviation::<f64, _>::with_storage(4).unwrap();
        feed(&mut var, &inputs);
        feed(&mut sd, &inputs);

        assert_eq!(var.valid_from_bar(), sd.valid_from_bar());
        assert_eq!(var.data_length(), sd.data_length());
        for (v, s) in var.data().iter().zip(sd.data()) {
            assert_approx_eq!(v.sqrt(), s, 1e-12);
        }
    }

    #[test]
    fn forwards_to_sink_with_index() {
        let mut out = Vec::new();
        let mut sd = StdDeviation::<f64, _>::new(2, |v: f64, i: usize| out.push((i, v))).unwrap();
        sd.receive_tick(1.0, 100).unwrap();
        sd.receive_tick(3.0, 101).unwrap();
        sd.receive_tick(3.0, 102).unwrap();
        drop(sd);

        assert_eq!(out, [(101, 1.0), (102, 0.0)]);
    }

    #[test]
    fn stored_entries_follow_outputs_across_gaps() {
        let mut ticks = Vec::new();
        let mut sd = StdDeviation::<f64, _>::new(
            2,
            Storage::with_downstream(|_v: f64, i: usize| ticks.push(i)),
        )
        .unwrap();
        for (i, x) in [(3, 1.0), (4, 3.0), (9, 3.0), (20, 7.0)] {
            sd.receive_tick(x, i).unwrap();
        }

        assert_eq!(sd.valid_from_bar(), Some(4));
        assert_eq!(sd.data(), [1.0, 0.0, 2.0]);
        assert_eq!(sd.data_length(), 3);
        drop(sd);
        assert_eq!(ticks, [4, 9, 20]);
    }

    #[test]
    fn surfaces_inner_errors() {
        let mut sd = StdDeviation::<f64, _>::with_storage(2).unwrap();
        sd.receive_tick(1.0, 3).unwrap();
        assert_eq!(
            sd.receive_tick(1.0, 2),
            Err(IndicatorError::OutOfOrderInput {
                previous: 3,
                received: 2
            })
        );
        assert_eq!(
            sd.receive_tick(f64::NEG_INFINITY, 4),
            Err(IndicatorError::NonFiniteInput { index: 4 })
        );
        assert!(sd.data().is_empty());
    }

    #[test]
    fn subscribes_to_stream() {
        let mut stream = DohlcvStream::new();
        assert!(StdDeviation::<f64, _>::for_stream(&mut stream, 1, use_close_price).is_err());
        assert_eq!(stream.subscriber_count(), 0);

        let sd = StdDeviation::<f64, _>::for_stream(&mut stream, 2, use_close_price).unwrap();
        for (i, close) in [4.0, 6.0, 6.0].into_iter().enumerate() {
            stream
                .receive_tick(Dohlcv::new(i as i64, close, close, close, close, 0.0))
                .unwrap();
        }
        assert_eq!(sd.borrow().indicator().data(), [1.0, 0.0]);
    }

    #[test]
    fn deterministic_across_instances() {
        let inputs: Vec<f64> = (0..200).map(|i| ((i * 37) % 101) as f64 * 0.13).collect();
        let mut first = StdDeviation::<f64, _>::with_storage(7).unwrap();
        let mut second = StdDeviation::<f64, _>::with_storage(7).unwrap();
        feed(&mut first, &inputs);
        feed(&mut second, &inputs);

        assert_eq!(first.data(), second.data());
    }
}

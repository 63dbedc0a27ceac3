/// Downstream target notified of every value a stage emits
///
/// A sink receives each output together with the index of the tick that
/// produced it. Sinks are driven synchronously from inside
/// [`Indicator::receive_tick`](crate::Indicator::receive_tick), so by the time
/// a tick call returns every sink along the chain has already seen its value.
///
/// Any `FnMut(T, usize)` closure is a sink, which is usually all a consumer
/// needs:
///
/// ```
/// # use ta_chain::{Indicator, Variance};
/// let mut seen = vec![];
/// let mut var = Variance::<f64, _>::new(2, |v: f64, i: usize| seen.push((i, v))).unwrap();
/// var.receive_tick(1.0, 0).unwrap();
/// var.receive_tick(3.0, 1).unwrap();
/// drop(var);
/// assert_eq!(seen, [(1, 1.0)]);
/// ```
pub trait Sink<T> {
    /// Called once per emitted value
    ///
    /// # Arguments
    ///
    /// * `value` - The emitted value
    /// * `index` - Index of the tick that produced it
    fn on_value(&mut self, value: T, index: usize);
}

impl<T, F> Sink<T> for F
where
    F: FnMut(T, usize),
{
    #[inline]
    fn on_value(&mut self, value: T, index: usize) {
        self(value, index)
    }
}

/// Sink that drops every value, for stages read only through their trackers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Discard;

impl<T> Sink<T> for Discard {
    #[inline]
    fn on_value(&mut self, _value: T, _index: usize) {}
}

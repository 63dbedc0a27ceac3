use alloc::{rc::Rc, vec::Vec};
use core::cell::RefCell;

use tracing::{trace, warn};

use super::Dohlcv;
use crate::{Indicator, Result};

/// Receiver of the bars published by a [`DohlcvStream`]
pub trait TickSubscriber<T> {
    /// Handles one bar
    ///
    /// # Arguments
    ///
    /// * `tick` - The published bar
    /// * `index` - Position of the bar in the stream
    fn receive_dohlcv_tick(&mut self, tick: &Dohlcv<T>, index: usize) -> Result<()>;
}

/// Shared handle under which subscribers are registered
type Subscriber<T> = Rc<RefCell<dyn TickSubscriber<T>>>;

/// Minimal single-threaded bar source
///
/// Bars are numbered from zero in publication order and delivered
/// synchronously to every subscriber, in subscription order. Subscribers are
/// shared handles so the caller can keep reading them while the stream runs.
pub struct DohlcvStream<T> {
    /// Registered subscribers
    subscribers: Vec<Subscriber<T>>,
    /// Index given to the next bar
    next_index: usize,
}

impl<T> DohlcvStream<T> {
    /// Creates a stream with no subscribers
    pub const fn new() -> Self {
        Self {
            subscribers: Vec::new(),
            next_index: 0,
        }
    }

    /// Registers a subscriber for every bar published from now on
    pub fn add_tick_subscription(&mut self, subscriber: Rc<RefCell<dyn TickSubscriber<T>>>) {
        self.subscribers.push(subscriber);
    }

    /// Returns the number of registered subscribers
    #[inline]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Returns the number of bars published so far
    #[inline]
    pub const fn bar_count(&self) -> usize {
        self.next_index
    }

    /// Publishes the next bar to every subscriber
    ///
    /// Every subscriber sees the bar even if an earlier one rejects it; the
    /// first rejection is returned.
    ///
    /// # Panics
    ///
    /// If a subscriber is already mutably borrowed by the caller.
    pub fn receive_tick(&mut self, tick: Dohlcv<T>) -> Result<()> {
        let index = self.next_index;
        self.next_index += 1;
        trace!(index, subscribers = self.subscribers.len(), "publishing bar");

        let mut first_error = None;
        for subscriber in &self.subscribers {
            if let Err(err) = subscriber.borrow_mut().receive_dohlcv_tick(&tick, index) {
                warn!(index, %err, "subscriber rejected bar");
                if first_error.is_none() {
                    first_error = Some(err);
                }
            }
        }

        first_error.map_or(Ok(()), Err)
    }
}

impl<T> Default for DohlcvStream<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Stream subscriber feeding one field of every bar to an indicator
///
/// ```
/// # use ta_chain::{Indicator, StdDeviation, stream::{Dohlcv, DohlcvStream, StreamAdapter, use_close_price}};
/// let mut stream = DohlcvStream::new();
/// let sd = StdDeviation::<f64, _>::with_storage(2).unwrap();
/// let adapter = StreamAdapter::subscribe(&mut stream, sd, use_close_price);
///
/// for close in [10.0, 12.0, 12.0] {
///     stream.receive_tick(Dohlcv::new(0, close, close, close, close, 1.0)).unwrap();
/// }
/// assert_eq!(adapter.borrow().indicator().data(), [1.0, 0.0]);
/// ```
#[derive(Debug, Clone)]
pub struct StreamAdapter<E, F> {
    /// Indicator receiving the selected values
    indicator: E,
    /// Picks the value out of each bar
    select: F,
}

impl<E, F> StreamAdapter<E, F> {
    /// Creates an adapter without subscribing it anywhere
    ///
    /// # Arguments
    ///
    /// * `indicator` - Indicator receiving the selected values
    /// * `select` - Picks the value out of each bar
    pub const fn new(indicator: E, select: F) -> Self {
        Self { indicator, select }
    }

    /// Creates an adapter and subscribes it to `stream`
    ///
    /// The returned handle is shared with the stream; read the indicator
    /// through it between bars.
    pub fn subscribe<T>(stream: &mut DohlcvStream<T>, indicator: E, select: F) -> Rc<RefCell<Self>>
    where
        T: 'static,
        E: Indicator<T> + 'static,
        F: Fn(&Dohlcv<T>) -> T + 'static,
    {
        let adapter = Rc::new(RefCell::new(Self::new(indicator, select)));
        let subscriber: Subscriber<T> = adapter.clone();
        stream.add_tick_subscription(subscriber);
        adapter
    }

    /// Returns the wrapped indicator
    #[inline]
    pub const fn indicator(&self) -> &E {
        &self.indicator
    }

    /// Returns the wrapped indicator mutably
    #[inline]
    pub const fn indicator_mut(&mut self) -> &mut E {
        &mut self.indicator
    }

    /// Consumes the adapter and returns the wrapped indicator
    #[inline]
    pub fn into_inner(self) -> E {
        self.indicator
    }
}

impl<T, E, F> TickSubscriber<T> for StreamAdapter<E, F>
where
    E: Indicator<T>,
    F: Fn(&Dohlcv<T>) -> T,
{
    #[inline]
    fn receive_dohlcv_tick(&mut self, tick: &Dohlcv<T>, index: usize) -> Result<()> {
        let value = (self.select)(tick);
        self.indicator.receive_tick(value, index)
    }
}

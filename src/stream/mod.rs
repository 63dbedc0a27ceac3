//! Bridge from bar-based price streams to scalar indicators.
//!
//! A [`DohlcvStream`] publishes one [`Dohlcv`] bar at a time to its
//! subscribers. A [`StreamAdapter`] is such a subscriber: it picks one field
//! of every bar with a selection function and feeds it to an [`Indicator`](crate::Indicator)
//! as a tick carrying the bar index.

mod dohlcv;
pub use dohlcv::{
    DataSelectionFunc, Dohlcv, use_close_price, use_high_price, use_low_price, use_median_price,
    use_open_price, use_typical_price, use_volume,
};

mod adapter;
pub use adapter::{DohlcvStream, StreamAdapter, TickSubscriber};

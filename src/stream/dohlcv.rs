use num_traits::Float;

/// One bar of a price series: date, open, high, low, close and volume
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Dohlcv<T> {
    /// Bar timestamp, in whatever unit the source uses
    pub date: i64,
    /// Opening price
    pub open: T,
    /// Highest price
    pub high: T,
    /// Lowest price
    pub low: T,
    /// Closing price
    pub close: T,
    /// Traded volume
    pub volume: T,
}

impl<T> Dohlcv<T> {
    /// Creates a bar
    pub const fn new(date: i64, open: T, high: T, low: T, close: T, volume: T) -> Self {
        Self {
            date,
            open,
            high,
            low,
            close,
            volume,
        }
    }
}

/// Picks the scalar an indicator consumes out of a bar
pub type DataSelectionFunc<T> = fn(&Dohlcv<T>) -> T;

/// Selects the opening price
#[inline]
pub fn use_open_price<T: Copy>(tick: &Dohlcv<T>) -> T {
    tick.open
}

/// Selects the highest price
#[inline]
pub fn use_high_price<T: Copy>(tick: &Dohlcv<T>) -> T {
    tick.high
}

/// Selects the lowest price
#[inline]
pub fn use_low_price<T: Copy>(tick: &Dohlcv<T>) -> T {
    tick.low
}

/// Selects the closing price
#[inline]
pub fn use_close_price<T: Copy>(tick: &Dohlcv<T>) -> T {
    tick.close
}

/// Selects the traded volume
#[inline]
pub fn use_volume<T: Copy>(tick: &Dohlcv<T>) -> T {
    tick.volume
}

/// Selects the typical price, `(high + low + close) / 3`
#[inline]
pub fn use_typical_price<T: Float>(tick: &Dohlcv<T>) -> T {
    let _3 = T::one() + T::one() + T::one();
    (tick.high + tick.low + tick.close) / _3
}

/// Selects the median price, `(high + low) / 2`
#[inline]
pub fn use_median_price<T: Float>(tick: &Dohlcv<T>) -> T {
    let _2 = T::one() + T::one();
    (tick.high + tick.low) / _2
}

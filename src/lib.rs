#![doc = include_str!("../README.md")]
#![no_std]
#![deny(
    unsafe_code,
    unused_imports,
    unused_variables,
    unused_must_use,
    missing_docs,
    clippy::all,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::dbg_macro,
    clippy::todo,
    clippy::unimplemented
)]
#![allow(clippy::just_underscores_and_digits, clippy::len_without_is_empty)]

extern crate alloc;

pub(crate) type Kbn<T> = compensated_summation::KahanBabuskaNeumaier<T>;

mod utils;

mod error;
pub use error::{IndicatorError, Result};

mod traits;
pub use traits::{Discard, Indicator, Sink};

mod window_tracker;
pub use window_tracker::WindowTracker;

mod bounds_tracker;
pub use bounds_tracker::BoundsTracker;

mod variance;
pub use variance::Variance;

mod relay;
pub use relay::Relay;

mod std_deviation;
pub use std_deviation::StdDeviation;

mod storage;
pub use storage::Storage;

mod feed;
pub use feed::Feed;

pub mod stream;

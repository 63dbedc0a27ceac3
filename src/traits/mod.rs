mod indicator;
pub use indicator::Indicator;

mod sink;
pub use sink::{Discard, Sink};

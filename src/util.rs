/// Numeric conversion helpers.
///
/// Conversions between `i64`, `usize` and `f64` used by the value layer.
/// Lossy conversions are explicit and named as such; index conversions
/// report out-of-range values as runtime errors.
pub mod num;
/// Stack growth for deeply recursive evaluation.
pub mod stack;

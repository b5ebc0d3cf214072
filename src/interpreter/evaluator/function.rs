/// Built-in function implementations.
///
/// The operators, the `applyfunction` and `listindex` pseudo-functions the
/// expression builder produces, and the small set of introspection helpers
/// available by default.
pub mod builtin;
/// Conversion builtins.
///
/// `int`, `float`, `string`, `vec3`, `array`, `list`, `dictionary` and
/// `keys`.
pub mod convert;
/// Call dispatch and the builtin table.
pub mod core;
/// Function and class definitions.
pub mod define;
/// The `print` function implementation.
///
/// Outputs its arguments to the standard output.
pub mod print;

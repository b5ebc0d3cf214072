/// Array storage.
///
/// Defines the homogeneous `Array` type, which keeps its elements in one
/// concrete vector per element type, and `ArrayMember`, the transient handle
/// used as the target of index assignment.
pub mod array;
/// Class instances.
///
/// A class is a named scope copied from the scope that defined it. This module
/// handles instantiation and member storage.
pub mod class;
/// Core value type.
///
/// Declares the `Value` tagged union, the `ValueType` rank order that drives
/// every implicit conversion, and the conversion, truthiness and formatting
/// rules shared by the rest of the interpreter.
pub mod core;
/// Dictionaries keyed by type-tagged hashes of values.
pub mod dictionary;
/// First-class functions and their four body kinds.
pub mod function;
/// Three component float vectors.
pub mod vec3;

/*!
# Core Module

Error types and shared constants for the generation engine.
*/

pub mod errors;

pub use errors::GenError;

/// Upper bound for generated integer values and the modulus used by the
/// `$RANDOM` pseudo-variable.
pub const DEFAULT_MAX: i64 = 1_000_000_000;

/// Zipf range used when a segment's `[min, max]` interval is empty.
pub const DEFAULT_ZIPF: i64 = 99;

/// Largest element count a Zipf generator will be constructed with.
pub const DEFAULT_ZIPF_MAX: i64 = 9_999_999;

/// Maximum template size in bytes, enforced by `Template::parse_file`.
pub const MAX_TEMPLATE_BYTES: usize = 99_999_999;

/// Maximum nesting depth for `gen.file` sub-includes.
pub const MAX_INCLUDE_DEPTH: u32 = 25;

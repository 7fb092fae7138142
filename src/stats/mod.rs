/*!
# Statistical Generators

Random sources behind the `order=` distributions: reproducible name-seeded
uniform streams and a Zipf power-law generator.
*/

pub mod uniform;
pub mod zipf;

pub use uniform::{name_hash, seeded_rng, BASE_SEED};
pub use zipf::ZipfGenerator;

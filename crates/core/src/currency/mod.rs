//! Multi-currency handling: rate resolution and base-currency conversion.

pub mod normalizer;

#[cfg(test)]
mod normalizer_props;

pub use normalizer::CurrencyNormalizer;

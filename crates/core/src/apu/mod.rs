//! Audio building blocks shared by the console engines.
//!
//! - **PolynomialCounter**: TIA-style channel (divider + 4/5/9-bit LFSR waveforms)

pub mod polynomial;

pub use polynomial::PolynomialCounter;

// Core types and upstream client for the Cambist currency-conversion server

pub mod error;
pub mod rates;
pub mod types;

pub use error::{RateError, RateResult};
pub use rates::{ExchangeRateClient, RateSource, RatesConfig};
pub use types::{ConversionRequest, ConversionResult};

//! Encoding of quality-controlled ocean temperature profiles into WMO BUFR
//! template assignments for distribution over the GTS.

pub mod cli;
pub mod config;
pub mod error;
pub mod models;
pub mod processors;
pub mod readers;
pub mod templates;
pub mod utils;
pub mod writers;

pub use error::{ProcessingError, Result};

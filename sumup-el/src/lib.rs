//! Extract-load pipeline for the stores, devices and transactions workbooks
//!
//! Each run reads the three source workbooks from the raw data directory and
//! fully replaces the matching tables in the destination dataset.

pub mod cli;
pub mod config;
pub mod datasets;
pub mod extract;
pub mod load;
pub mod run;

#[cfg(test)]
mod test_support;

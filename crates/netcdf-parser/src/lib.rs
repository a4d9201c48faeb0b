//! NetCDF access for satellite swath files.
//!
//! Swath files describe a spot × scan × channel grid. This crate exposes them
//! as a [`VariableStore`]: named dimensions plus named, flattened numeric
//! arrays whose lengths are checked against what the caller declares.
//!
//! # Implementation Notes
//!
//! [`NetCdfSwath`] wraps the `netcdf` crate (libnetcdf + HDF5). Drivers that
//! already hold decoded arrays, and the tests, use [`MemoryStore`].

pub mod error;
pub mod native;
pub mod store;

pub use error::{NetCdfError, NetCdfResult};
pub use native::{silence_hdf5_errors, NetCdfSwath};
pub use store::{check_len, MemoryStore, VariableStore};

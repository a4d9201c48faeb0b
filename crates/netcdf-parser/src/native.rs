//! Native NetCDF access using the netcdf library.
//!
//! [`NetCdfSwath`] opens a swath file read-only and serves its dimensions and
//! variables through [`VariableStore`]. On-disk types are read in their
//! native representation and widened afterwards, so `ubyte`/`ushort` time
//! components and 16-bit flag words arrive unchanged.

use std::path::Path;
use std::sync::Once;

use netcdf::types::{FloatType, IntType, NcVariableType};
use tracing::debug;

use crate::error::{NetCdfError, NetCdfResult};
use crate::store::{check_len, VariableStore};

/// Silence HDF5's automatic error printing to stderr.
///
/// The HDF5 C library prints verbose error messages to stderr even when errors
/// are handled gracefully by the Rust code (e.g., when opening a file that
/// turns out not to be HDF5). This creates confusing log spam like:
///
/// ```text
/// HDF5-DIAG: Error detected in HDF5 (1.10.8) thread 3:
///   #000: H5F.c line 620 in H5Fopen(): unable to open file
/// ```
///
/// This function disables that output by calling H5Eset_auto2 with null handlers.
/// It only needs to be called once per process, but is safe to call multiple times.
pub fn silence_hdf5_errors() {
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        // SAFETY: H5Eset_auto2 is thread-safe and we're passing null pointers
        // to disable error output, which is a documented valid use.
        unsafe {
            hdf5_metno_sys::h5e::H5Eset_auto2(
                hdf5_metno_sys::h5e::H5E_DEFAULT,
                None,
                std::ptr::null_mut(),
            );
        }
    });
}

/// A swath file opened read-only.
pub struct NetCdfSwath {
    source: String,
    file: netcdf::File,
}

impl NetCdfSwath {
    /// Open a file. Any failure here is reported as [`NetCdfError::Open`].
    pub fn open(path: &Path) -> NetCdfResult<Self> {
        silence_hdf5_errors();

        let source = path.display().to_string();
        let file = netcdf::open(path).map_err(|e| NetCdfError::Open {
            path: source.clone(),
            reason: e.to_string(),
        })?;
        debug!(path = %source, "Opened NetCDF swath file");

        Ok(Self { source, file })
    }

    fn variable(&self, name: &str, expected_len: usize) -> NetCdfResult<netcdf::Variable<'_>> {
        let var = self
            .file
            .variable(name)
            .ok_or_else(|| NetCdfError::MissingData(format!("{} variable", name)))?;
        check_len(name, expected_len, var.len())?;
        Ok(var)
    }
}

impl std::fmt::Debug for NetCdfSwath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NetCdfSwath")
            .field("source", &self.source)
            .finish()
    }
}

/// Read every element in the variable's own type, then convert.
macro_rules! read_as {
    ($var:expr, $name:expr, $native:ty, $target:ty) => {
        $var.get_values::<$native, _>(..)
            .map(|values| values.into_iter().map(|v| v as $target).collect::<Vec<$target>>())
            .map_err(|e| NetCdfError::InvalidFormat(format!("Failed to read {}: {}", $name, e)))
    };
}

impl VariableStore for NetCdfSwath {
    fn source(&self) -> &str {
        &self.source
    }

    fn dimension(&self, name: &str) -> NetCdfResult<usize> {
        Ok(self
            .file
            .dimension(name)
            .ok_or_else(|| NetCdfError::MissingData(format!("{} dimension", name)))?
            .len())
    }

    fn has_variable(&self, name: &str) -> bool {
        self.file.variable(name).is_some()
    }

    fn read_f32(&self, name: &str, expected_len: usize) -> NetCdfResult<Vec<f32>> {
        let var = self.variable(name, expected_len)?;
        match var.vartype() {
            NcVariableType::Float(FloatType::F32) => read_as!(var, name, f32, f32),
            NcVariableType::Float(FloatType::F64) => read_as!(var, name, f64, f32),
            NcVariableType::Int(IntType::U8) => read_as!(var, name, u8, f32),
            NcVariableType::Int(IntType::I8) => read_as!(var, name, i8, f32),
            NcVariableType::Int(IntType::U16) => read_as!(var, name, u16, f32),
            NcVariableType::Int(IntType::I16) => read_as!(var, name, i16, f32),
            NcVariableType::Int(IntType::U32) => read_as!(var, name, u32, f32),
            NcVariableType::Int(IntType::I32) => read_as!(var, name, i32, f32),
            NcVariableType::Int(IntType::U64) => read_as!(var, name, u64, f32),
            NcVariableType::Int(IntType::I64) => read_as!(var, name, i64, f32),
            other => Err(NetCdfError::InvalidFormat(format!(
                "{} has unsupported type {:?}",
                name, other
            ))),
        }
    }

    fn read_i64(&self, name: &str, expected_len: usize) -> NetCdfResult<Vec<i64>> {
        let var = self.variable(name, expected_len)?;
        match var.vartype() {
            NcVariableType::Int(IntType::U8) => read_as!(var, name, u8, i64),
            NcVariableType::Int(IntType::I8) => read_as!(var, name, i8, i64),
            NcVariableType::Int(IntType::U16) => read_as!(var, name, u16, i64),
            NcVariableType::Int(IntType::I16) => read_as!(var, name, i16, i64),
            NcVariableType::Int(IntType::U32) => read_as!(var, name, u32, i64),
            NcVariableType::Int(IntType::I32) => read_as!(var, name, i32, i64),
            NcVariableType::Int(IntType::U64) => read_as!(var, name, u64, i64),
            NcVariableType::Int(IntType::I64) => read_as!(var, name, i64, i64),
            other => Err(NetCdfError::InvalidFormat(format!(
                "{} has type {:?}, expected integers",
                name, other
            ))),
        }
    }
}

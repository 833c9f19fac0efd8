//! Runtime handle on a prebuilt native kernel library.
//!
//! The library exports
//!
//! ```c
//! VECTOR_ADD_RESULT *VectorAdd(double input);
//! ```
//!
//! under some (possibly mangled) name. The returned pointer carries no
//! lifetime of its own, so every call copies the record out before returning
//! and then applies the [`ResultOwnership`] contract to the native memory.

use std::{
    ffi::OsString,
    marker::PhantomData,
    path::{Path, PathBuf},
};

use libloading::Library;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::{
    error::{Error, Result},
    record::VectorAddResult,
    symbol::SymbolName,
};

/// Base name of the library the native build produces.
pub const LIBRARY_NAME: &str = "cuda-python";

type VectorAddFn = unsafe extern "C" fn(f64) -> *const VectorAddResult;
type FreeResultFn = unsafe extern "C" fn(*const VectorAddResult);

/// Who releases the record a kernel call returns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum ResultOwnership {
    /// The library keeps the record alive at least until the next call; the
    /// caller never frees it.
    #[default]
    Static,
    /// Each call allocates a fresh record that must be passed back to
    /// `free_symbol` once read.
    CallerFrees { free_symbol: SymbolName },
}

/// Platform file name of a library, e.g. `libcuda-python.so` or `cuda-python.dll`.
pub fn library_file_name(name: &str) -> OsString {
    libloading::library_filename(name)
}

/// `build/Debug/<platform file name>`, where the native build leaves its
/// Debug artifact.
pub fn default_library_path() -> PathBuf {
    PathBuf::from("build")
        .join("Debug")
        .join(library_file_name(LIBRARY_NAME))
}

pub struct KernelLibrary {
    path: PathBuf,
    library: Library,
}

impl KernelLibrary {
    pub fn open<T>(path: T) -> Result<Self>
    where
        T: Into<PathBuf>,
    {
        let path = path.into();

        // the loader searches system paths for bare names, so only check
        // paths that point somewhere
        if path.components().count() > 1 && !path.exists() {
            return Err(Error::LibraryNotFound(path));
        }

        debug!(path = %path.display(), "loading native library");
        // SAFETY: loading runs the library's initialisers. The caller chose
        // this library and vouches for them.
        let library = unsafe { Library::new(&path) }.map_err(|source| Error::LibraryLoad {
            path: path.clone(),
            source,
        })?;

        Ok(Self { path, library })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Binds the vector-add entry point with the default [`ResultOwnership::Static`]
    /// contract.
    pub fn vector_add(&self, symbol: &SymbolName) -> Result<VectorAddKernel<'_>> {
        self.vector_add_with(symbol, &ResultOwnership::Static)
    }

    /// Binds the vector-add entry point and, for caller-freed results, the
    /// matching free function. Both must resolve before anything is called.
    pub fn vector_add_with(
        &self,
        symbol: &SymbolName,
        ownership: &ResultOwnership,
    ) -> Result<VectorAddKernel<'_>> {
        // SAFETY: the exported function must have the `VectorAddFn` signature.
        // Symbol lookup cannot check this.
        let call = unsafe { self.resolve::<VectorAddFn>(symbol)? };

        let free = match ownership {
            ResultOwnership::Static => None,
            // SAFETY: as above, for `FreeResultFn`.
            ResultOwnership::CallerFrees { free_symbol } => {
                Some(unsafe { self.resolve::<FreeResultFn>(free_symbol)? })
            }
        };

        Ok(VectorAddKernel {
            symbol: symbol.clone(),
            call,
            free,
            _library: PhantomData,
        })
    }

    unsafe fn resolve<F: Copy>(&self, symbol: &SymbolName) -> Result<F> {
        let name = symbol.to_c_string();
        // SAFETY: forwarded to the caller.
        let resolved = unsafe { self.library.get::<F>(name.as_bytes_with_nul()) };
        let resolved = resolved.map_err(|source| Error::SymbolNotFound {
            symbol: symbol.to_string(),
            path: self.path.clone(),
            source,
        })?;

        debug!(%symbol, path = %self.path.display(), "resolved symbol");
        Ok(*resolved)
    }
}

/// A resolved vector-add entry point. It cannot outlive the library it was
/// resolved from.
pub struct VectorAddKernel<'lib> {
    symbol: SymbolName,
    call: VectorAddFn,
    free: Option<FreeResultFn>,
    _library: PhantomData<&'lib Library>,
}

impl VectorAddKernel<'_> {
    pub fn symbol(&self) -> &SymbolName {
        &self.symbol
    }

    /// Launches the kernel once and returns an owned copy of its result.
    pub fn call(&self, input: f64) -> Result<VectorAddResult> {
        trace!(symbol = %self.symbol, input, "calling kernel");
        // SAFETY: the signature was vouched for at bind time and the library
        // is kept loaded by the `'lib` borrow.
        let ptr = unsafe { (self.call)(input) };

        if ptr.is_null() {
            return Err(Error::NullResult(self.symbol.to_string()));
        }

        if !ptr.is_aligned() {
            self.release(ptr);
            return Err(Error::MisalignedResult {
                symbol: self.symbol.to_string(),
                address: ptr as usize,
            });
        }

        // SAFETY: non-null, aligned, and pointing at a record the kernel just
        // produced. Copy it before the native side can reuse the memory.
        let result = unsafe { ptr.read() };
        self.release(ptr);

        Ok(result)
    }

    fn release(&self, ptr: *const VectorAddResult) {
        if let Some(free) = self.free {
            // SAFETY: the ownership contract says this pointer is ours to
            // hand back, exactly once.
            unsafe { free(ptr) };
        }
    }
}

//! Names of the exported kernel entry points.
//!
//! Symbols are matched byte for byte against the library's export table; no
//! demangling is attempted. Prefer [`VECTOR_ADD`] when you control the native
//! build, since mangled names change with the compiler.

use std::{ffi::CString, fmt};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// MSVC-mangled name of `VECTOR_ADD_RESULT* VectorAdd(unsigned int)`.
pub const MSVC_VECTOR_ADD: &str = "?VectorAdd@@YAPEAUVECTOR_ADD_RESULT@@I@Z";

/// C-linkage name of the same entry point.
pub const VECTOR_ADD: &str = "VectorAdd";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SymbolName(String);

impl SymbolName {
    pub fn new<T>(name: T) -> Result<Self>
    where
        T: Into<String>,
    {
        let name = name.into();
        if name.is_empty() || name.contains('\0') {
            return Err(Error::InvalidSymbol(name));
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the name carries a compiler's mangling (MSVC or Itanium).
    pub fn is_mangled(&self) -> bool {
        self.0.starts_with('?') || self.0.starts_with("_Z")
    }

    /// NUL-terminated form handed to the dynamic loader.
    pub(crate) fn to_c_string(&self) -> CString {
        // interior NULs are rejected in `new`
        CString::new(self.0.as_bytes()).unwrap_or_default()
    }
}

impl Default for SymbolName {
    fn default() -> Self {
        Self(MSVC_VECTOR_ADD.to_string())
    }
}

impl fmt::Display for SymbolName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for SymbolName {
    type Error = Error;

    fn try_from(name: String) -> Result<Self> {
        Self::new(name)
    }
}

impl From<SymbolName> for String {
    fn from(symbol: SymbolName) -> Self {
        symbol.0
    }
}

impl std::str::FromStr for SymbolName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

#![allow(dead_code)]

use std::{path::PathBuf, process::Command};

use tempfile::TempDir;

/// Always returns `{ 7.5, 0.002 }` from a static record.
pub const FIXED_STUB: &str = r#"
typedef struct { double amount; double time; } VECTOR_ADD_RESULT;
static VECTOR_ADD_RESULT result;
VECTOR_ADD_RESULT *VectorAdd(double input) {
    (void)input;
    result.amount = 7.5;
    result.time = 0.002;
    return &result;
}
"#;

/// Reports its input back as `amount` and counts calls in `time`.
pub const ECHO_STUB: &str = r#"
typedef struct { double amount; double time; } VECTOR_ADD_RESULT;
static VECTOR_ADD_RESULT result;
VECTOR_ADD_RESULT *VectorAdd(double input) {
    result.amount = input;
    result.time += 1.0;
    return &result;
}
"#;

pub const NULL_STUB: &str = r#"
typedef struct { double amount; double time; } VECTOR_ADD_RESULT;
VECTOR_ADD_RESULT *VectorAdd(double input) {
    (void)input;
    return 0;
}
"#;

pub const MISALIGNED_STUB: &str = r#"
typedef struct { double amount; double time; } VECTOR_ADD_RESULT;
static double storage[4];
VECTOR_ADD_RESULT *VectorAdd(double input) {
    (void)input;
    return (VECTOR_ADD_RESULT *)((char *)storage + 1);
}
"#;

/// Heap-allocates every record and expects it back through `FreeResult`.
pub const CALLER_FREES_STUB: &str = r#"
#include <stdlib.h>
typedef struct { double amount; double time; } VECTOR_ADD_RESULT;
static int live = 0;
static int freed = 0;
VECTOR_ADD_RESULT *VectorAdd(double input) {
    VECTOR_ADD_RESULT *result = malloc(sizeof *result);
    result->amount = input * 2.0;
    result->time = 0.5;
    live++;
    return result;
}
void FreeResult(VECTOR_ADD_RESULT *result) {
    free(result);
    live--;
    freed++;
}
int LiveResults(void) { return live; }
int FreedResults(void) { return freed; }
"#;

/// A shared library compiled from C source into a temporary directory that
/// lives as long as this value.
pub struct StubLibrary {
    pub path: PathBuf,
    _dir: TempDir,
}

pub fn build_stub(c_source: &str) -> StubLibrary {
    let dir = TempDir::new().expect("failed to create temp dir");
    let c_path = dir.path().join("stub.c");
    let so_path = dir.path().join(libloading::library_filename("stub"));

    std::fs::write(&c_path, c_source).expect("failed to write C stub");

    let status = Command::new("cc")
        .args(["-shared", "-fPIC", "-o"])
        .arg(&so_path)
        .arg(&c_path)
        .status()
        .expect("failed to invoke cc");
    assert!(status.success(), "compiling stub library failed");
    assert!(so_path.exists(), "shared library was not created");

    StubLibrary {
        path: so_path,
        _dir: dir,
    }
}

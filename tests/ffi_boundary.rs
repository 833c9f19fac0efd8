//! Calls into stub native libraries compiled with the system C compiler.
#![cfg(unix)]

mod common;

use common::{
    build_stub, CALLER_FREES_STUB, ECHO_STUB, FIXED_STUB, MISALIGNED_STUB, NULL_STUB,
};
use kernlib::{
    symbol::VECTOR_ADD, Error, Input, Invocation, KernelLibrary, ResultOwnership, SymbolName,
    VectorAddResult,
};

fn vector_add() -> SymbolName {
    SymbolName::new(VECTOR_ADD).unwrap()
}

#[test]
fn fixed_stub_result_is_copied_exactly() {
    let stub = build_stub(FIXED_STUB);
    let library = KernelLibrary::open(&stub.path).unwrap();
    let kernel = library.vector_add(&vector_add()).unwrap();

    let result = kernel.call(0.3).unwrap();
    assert_eq!(result, VectorAddResult::new(7.5, 0.002));
}

#[test]
fn repeated_random_calls_through_one_handle() {
    let stub = build_stub(FIXED_STUB);
    let outcomes = Invocation::new()
        .set_library_path(&stub.path)
        .set_symbol(vector_add())
        .set_input(Input::Random)
        .set_repeat(2)
        .run()
        .unwrap();

    assert_eq!(outcomes.len(), 2);
    for outcome in &outcomes {
        assert!((0.0..1.0).contains(&outcome.input));
        assert_eq!(outcome.result, VectorAddResult::new(7.5, 0.002));
    }
}

#[test]
fn input_reaches_the_kernel_and_copies_do_not_alias() {
    let stub = build_stub(ECHO_STUB);
    let library = KernelLibrary::open(&stub.path).unwrap();
    let kernel = library.vector_add(&vector_add()).unwrap();

    let first = kernel.call(0.25).unwrap();
    let second = kernel.call(0.75).unwrap();

    // the stub overwrites one static record; earlier copies must not change
    assert_eq!(first, VectorAddResult::new(0.25, 1.0));
    assert_eq!(second, VectorAddResult::new(0.75, 2.0));
}

#[test]
fn huge_repeat_count_does_not_reserve_up_front() {
    let stub = build_stub(NULL_STUB);

    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        Invocation::new()
            .set_library_path(&stub.path)
            .set_symbol(vector_add())
            .set_repeat(usize::MAX)
            .run()
    }));

    let result = result.expect("a huge repeat count must not panic");
    assert!(matches!(result, Err(Error::NullResult(_))));
}

#[test]
fn kernel_keeps_the_symbol_it_was_bound_to() {
    let stub = build_stub(FIXED_STUB);
    let library = KernelLibrary::open(&stub.path).unwrap();
    let kernel = library.vector_add(&vector_add()).unwrap();

    assert_eq!(kernel.symbol().as_str(), VECTOR_ADD);
}

#[test]
fn missing_library_fails_fast() {
    let stub = build_stub(FIXED_STUB);
    let missing = stub.path.with_file_name("libmissing.so");

    let result = Invocation::new()
        .set_library_path(&missing)
        .set_symbol(vector_add())
        .run();
    assert!(matches!(result, Err(Error::LibraryNotFound(path)) if path == missing));
}

#[test]
fn non_library_file_fails_to_load() {
    let stub = build_stub(FIXED_STUB);
    let bogus = stub.path.with_file_name("not-a-library.so");
    std::fs::write(&bogus, b"plain text").unwrap();

    assert!(matches!(
        KernelLibrary::open(&bogus),
        Err(Error::LibraryLoad { .. })
    ));
}

#[test]
fn missing_symbol_fails_fast() {
    let stub = build_stub(FIXED_STUB);
    let library = KernelLibrary::open(&stub.path).unwrap();

    let err = library
        .vector_add(&SymbolName::default())
        .err()
        .expect("the mangled name is not exported by the stub");
    match err {
        Error::SymbolNotFound { symbol, .. } => assert_eq!(symbol, kernlib::symbol::MSVC_VECTOR_ADD),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn null_result_is_reported() {
    let stub = build_stub(NULL_STUB);
    let library = KernelLibrary::open(&stub.path).unwrap();
    let kernel = library.vector_add(&vector_add()).unwrap();

    assert!(matches!(kernel.call(0.5), Err(Error::NullResult(symbol)) if symbol == VECTOR_ADD));
}

#[test]
fn misaligned_result_is_reported() {
    let stub = build_stub(MISALIGNED_STUB);
    let library = KernelLibrary::open(&stub.path).unwrap();
    let kernel = library.vector_add(&vector_add()).unwrap();

    assert!(matches!(
        kernel.call(0.5),
        Err(Error::MisalignedResult { address, .. }) if address % 8 != 0
    ));
}

#[test]
fn caller_frees_records_are_copied_before_release() {
    let stub = build_stub(CALLER_FREES_STUB);
    let ownership = ResultOwnership::CallerFrees {
        free_symbol: SymbolName::new("FreeResult").unwrap(),
    };

    let outcomes = Invocation::new()
        .set_library_path(&stub.path)
        .set_symbol(vector_add())
        .set_ownership(ownership)
        .set_input(Input::Fixed(1.5))
        .set_repeat(3)
        .run()
        .unwrap();
    assert_eq!(outcomes.len(), 3);
    assert!(outcomes.iter().all(|o| o.result == VectorAddResult::new(3.0, 0.5)));
}

#[test]
fn caller_frees_counts_within_one_handle() {
    let stub = build_stub(CALLER_FREES_STUB);
    let ownership = ResultOwnership::CallerFrees {
        free_symbol: SymbolName::new("FreeResult").unwrap(),
    };

    let library = KernelLibrary::open(&stub.path).unwrap();
    let kernel = library.vector_add_with(&vector_add(), &ownership).unwrap();
    kernel.call(1.0).unwrap();
    kernel.call(2.0).unwrap();

    let counters = unsafe { libloading::Library::new(&stub.path) }.unwrap();
    let live: libloading::Symbol<unsafe extern "C" fn() -> i32> =
        unsafe { counters.get(b"LiveResults\0") }.unwrap();
    let freed: libloading::Symbol<unsafe extern "C" fn() -> i32> =
        unsafe { counters.get(b"FreedResults\0") }.unwrap();

    assert_eq!(unsafe { live() }, 0);
    assert_eq!(unsafe { freed() }, 2);
}

#[test]
fn missing_free_symbol_fails_before_any_call() {
    let stub = build_stub(FIXED_STUB);
    let library = KernelLibrary::open(&stub.path).unwrap();
    let ownership = ResultOwnership::CallerFrees {
        free_symbol: SymbolName::new("FreeResult").unwrap(),
    };

    assert!(matches!(
        library.vector_add_with(&vector_add(), &ownership),
        Err(Error::SymbolNotFound { symbol, .. }) if symbol == "FreeResult"
    ));
}

#[test]
fn spawned_invocation_reports_back() {
    let stub = build_stub(FIXED_STUB);
    let rx = Invocation::new()
        .set_library_path(stub.path.clone())
        .set_symbol(vector_add())
        .spawn();

    let outcomes = rx.recv().unwrap().unwrap();
    assert_eq!(outcomes[0].result.amount, 7.5);
}

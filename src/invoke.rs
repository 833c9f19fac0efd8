use std::{
    path::PathBuf,
    sync::mpsc::{self, Receiver},
    thread,
    time::{Duration, Instant},
};

use serde::Serialize;
use tracing::{debug, info};

use crate::{
    error::{Error, Result},
    library::{self, KernelLibrary, ResultOwnership},
    record::VectorAddResult,
    symbol::SymbolName,
};

/// Upper bound on outcomes reserved up front; larger repeat counts grow the
/// vector as calls complete.
const MAX_PREALLOCATED_OUTCOMES: usize = 1024;

/// Scalar handed to the kernel on each call.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Input {
    Fixed(f64),
    /// A fresh uniform draw from `[0, 1)` per call.
    #[default]
    Random,
}

impl Input {
    pub fn sample(&self) -> f64 {
        match self {
            Input::Fixed(value) => *value,
            Input::Random => rand::random::<f64>(),
        }
    }
}

/// One kernel call: what went in, what came back, and how long the host waited.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Outcome {
    #[serde(serialize_with = "crate::record::float::serialize")]
    pub input: f64,
    #[serde(flatten)]
    pub result: VectorAddResult,
    #[serde(rename = "wall_time_us", serialize_with = "as_micros")]
    pub wall_time: Duration,
}

fn as_micros<S>(duration: &Duration, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_u128(duration.as_micros())
}

pub struct Invocation {
    library_path: PathBuf,
    symbol: SymbolName,
    input: Input,
    ownership: ResultOwnership,
    repeat: usize,
}

impl Invocation {
    pub fn new() -> Self {
        Self {
            library_path: library::default_library_path(),
            symbol: SymbolName::default(),
            input: Input::Random,
            ownership: ResultOwnership::Static,
            repeat: 1,
        }
    }

    pub fn set_library_path<T>(mut self, path: T) -> Self
    where
        T: Into<PathBuf>,
    {
        self.library_path = path.into();
        self
    }

    pub fn set_symbol(mut self, symbol: SymbolName) -> Self {
        self.symbol = symbol;
        self
    }

    pub fn set_input(mut self, input: Input) -> Self {
        self.input = input;
        self
    }

    pub fn set_ownership(mut self, ownership: ResultOwnership) -> Self {
        self.ownership = ownership;
        self
    }

    pub fn set_repeat(mut self, repeat: usize) -> Self {
        self.repeat = repeat;
        self
    }

    pub fn run(&self) -> Result<Vec<Outcome>> {
        self.execute()
    }

    pub fn spawn(self) -> Receiver<Result<Vec<Outcome>>> {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let _ = tx.send(self.execute());
        });

        rx
    }

    fn execute(&self) -> Result<Vec<Outcome>> {
        if self.repeat == 0 {
            return Err(Error::InvalidRepeat);
        }

        let library = KernelLibrary::open(&self.library_path)?;
        let kernel = library.vector_add_with(&self.symbol, &self.ownership)?;

        let mut outcomes = Vec::with_capacity(self.repeat.min(MAX_PREALLOCATED_OUTCOMES));
        for _ in 0..self.repeat {
            let input = self.input.sample();

            let started = Instant::now();
            let result = kernel.call(input)?;
            let wall_time = started.elapsed();

            debug!(input, amount = result.amount, time = result.time, ?wall_time, "kernel returned");
            outcomes.push(Outcome {
                input,
                result,
                wall_time,
            });
        }

        info!(
            symbol = %kernel.symbol(),
            library = %library.path().display(),
            calls = outcomes.len(),
            "invocation finished"
        );
        Ok(outcomes)
    }
}

impl Default for Invocation {
    fn default() -> Self {
        Self::new()
    }
}

use std::fmt;

use serde::{Deserialize, Serialize};

/// Result of one vector-add kernel launch, laid out exactly as the native
/// `VECTOR_ADD_RESULT` struct: two contiguous doubles.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct VectorAddResult {
    /// Sum computed by the kernel.
    #[serde(with = "float")]
    pub amount: f64,
    /// Time the kernel reports for the addition.
    #[serde(with = "float")]
    pub time: f64,
}

impl VectorAddResult {
    pub fn new(amount: f64, time: f64) -> Self {
        Self { amount, time }
    }
}

impl fmt::Display for VectorAddResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, " sum: {}", self.amount)?;
        write!(f, "time: {}", self.time)
    }
}

/// JSON has no NaN or infinity, and serde_json would write them as `null`.
/// Non-finite values are written as the strings `"NaN"`, `"inf"` and `"-inf"`
/// instead, and read back from either form.
pub(crate) mod float {
    use serde::{Deserialize, Deserializer, Serializer, de};

    pub(crate) fn serialize<S>(value: &f64, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if value.is_finite() {
            serializer.serialize_f64(*value)
        } else {
            serializer.serialize_str(&value.to_string())
        }
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Number(f64),
        Text(String),
    }

    pub(crate) fn deserialize<'de, D>(deserializer: D) -> Result<f64, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Repr::deserialize(deserializer)? {
            Repr::Number(value) => Ok(value),
            Repr::Text(text) => text
                .parse::<f64>()
                .ok()
                .filter(|value| !value.is_finite())
                .ok_or_else(|| de::Error::custom(format!("expected a number, NaN or inf, got {text:?}"))),
        }
    }
}

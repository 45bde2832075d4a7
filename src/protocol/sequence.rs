//! Sequence builder
//!
//! An ordered list of mutating steps the server applies as one atomic
//! unit: either every step applies or none does. The first failing
//! assert aborts the whole batch, reported as a single
//! `assertion-failed` error rather than per-step results.
//!
//! Steps are a closed sum type, so an invalid step cannot be constructed
//! in the first place. Sequences may nest.

use bytes::BufMut;

use crate::protocol::codec;

/// Step tag for the outer sequence update itself
const SEQUENCE_TAG: u32 = 5;

/// One mutating step inside a sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Write a key/value pair
    Set { key: String, value: String },

    /// Remove a key (fails the batch if it does not exist)
    Delete { key: String },

    /// Atomically replace a value if it matches the expected one
    TestAndSet {
        key: String,
        expected: Option<String>,
        replacement: Option<String>,
    },

    /// Fail the batch unless the key's current value equals `expected`
    /// (`None` = key must be absent)
    Assert {
        key: String,
        expected: Option<String>,
    },

    /// Remove every key starting with `prefix`
    DeletePrefix { prefix: String },

    /// Fail the batch unless the key exists
    AssertExists { key: String },

    /// A nested sequence, applied as part of the same atomic unit
    Sequence(Sequence),
}

impl Step {
    /// The step's stable wire tag
    pub fn tag(&self) -> u32 {
        match self {
            Step::Set { .. } => 1,
            Step::Delete { .. } => 2,
            Step::TestAndSet { .. } => 3,
            Step::Sequence(_) => SEQUENCE_TAG,
            Step::Assert { .. } => 8,
            Step::DeletePrefix { .. } => 14,
            Step::AssertExists { .. } => 15,
        }
    }

    /// Encode: `tag(4)` + the step's arguments
    pub fn encode<B: BufMut>(&self, buf: &mut B) {
        match self {
            Step::Set { key, value } => {
                codec::write_u32(buf, self.tag());
                codec::write_string(buf, key);
                codec::write_string(buf, value);
            }
            Step::Delete { key } => {
                codec::write_u32(buf, self.tag());
                codec::write_string(buf, key);
            }
            Step::TestAndSet {
                key,
                expected,
                replacement,
            } => {
                codec::write_u32(buf, self.tag());
                codec::write_string(buf, key);
                codec::write_option_string(buf, expected.as_deref());
                codec::write_option_string(buf, replacement.as_deref());
            }
            Step::Assert { key, expected } => {
                codec::write_u32(buf, self.tag());
                codec::write_string(buf, key);
                codec::write_option_string(buf, expected.as_deref());
            }
            Step::DeletePrefix { prefix } => {
                codec::write_u32(buf, self.tag());
                codec::write_string(buf, prefix);
            }
            Step::AssertExists { key } => {
                codec::write_u32(buf, self.tag());
                codec::write_string(buf, key);
            }
            Step::Sequence(sequence) => {
                // Nested sequences reuse the whole inner encoding
                sequence.encode(buf);
            }
        }
    }
}

/// An atomic batch of steps, built by the caller and consumed by one
/// sequence command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sequence {
    steps: Vec<Step>,
}

impl Sequence {
    /// Create an empty sequence
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a set step
    pub fn add_set(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.steps.push(Step::Set {
            key: key.into(),
            value: value.into(),
        });
        self
    }

    /// Append a delete step
    pub fn add_delete(&mut self, key: impl Into<String>) -> &mut Self {
        self.steps.push(Step::Delete { key: key.into() });
        self
    }

    /// Append a test-and-set step
    pub fn add_test_and_set(
        &mut self,
        key: impl Into<String>,
        expected: Option<String>,
        replacement: Option<String>,
    ) -> &mut Self {
        self.steps.push(Step::TestAndSet {
            key: key.into(),
            expected,
            replacement,
        });
        self
    }

    /// Append an assert step (`None` = key must be absent)
    pub fn add_assert(&mut self, key: impl Into<String>, expected: Option<String>) -> &mut Self {
        self.steps.push(Step::Assert {
            key: key.into(),
            expected,
        });
        self
    }

    /// Append an assert-exists step
    pub fn add_assert_exists(&mut self, key: impl Into<String>) -> &mut Self {
        self.steps.push(Step::AssertExists { key: key.into() });
        self
    }

    /// Append a delete-prefix step
    pub fn add_delete_prefix(&mut self, prefix: impl Into<String>) -> &mut Self {
        self.steps.push(Step::DeletePrefix {
            prefix: prefix.into(),
        });
        self
    }

    /// Append a nested sequence
    pub fn add_sequence(&mut self, sequence: Sequence) -> &mut Self {
        self.steps.push(Step::Sequence(sequence));
        self
    }

    /// Append an already-built step
    pub fn add_step(&mut self, step: Step) -> &mut Self {
        self.steps.push(step);
        self
    }

    /// The steps in application order
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Encode the sequence update: `tag(4) = 5` + u32 step count + steps
    pub fn encode<B: BufMut>(&self, buf: &mut B) {
        codec::write_u32(buf, SEQUENCE_TAG);
        codec::write_u32(buf, self.steps.len() as u32);
        for step in &self.steps {
            step.encode(buf);
        }
    }

    /// Encode into the opaque blob the sequence command ships as a single
    /// string argument
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        self.encode(&mut buf);
        buf
    }
}

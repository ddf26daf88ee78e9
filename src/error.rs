// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! Error types for approximate-distinct aggregation operations.

use std::fmt;

/// ErrorKind is all kinds of Error of this crate.
///
/// None of these are recoverable by retry inside the engine; each one
/// is a hard failure of the enclosing aggregation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorKind {
    /// The requested accuracy is outside the supported range.
    ///
    /// Rejected when the accumulator is created, never at add time.
    InvalidConfiguration,
    /// Two sketches with different register counts were merged.
    ///
    /// Sketches built for different accuracy targets cannot be
    /// combined; the caller picked mismatched configurations.
    ConfigurationMismatch,
    /// A serialized sketch could not be decoded.
    ///
    /// The bytes are fixed, so retrying is meaningless; the partial
    /// result must not be interpreted.
    CorruptSketch,
}

impl ErrorKind {
    /// Convert this error kind instance into static str.
    pub const fn into_static(self) -> &'static str {
        match self {
            ErrorKind::InvalidConfiguration => "InvalidConfiguration",
            ErrorKind::ConfigurationMismatch => "ConfigurationMismatch",
            ErrorKind::CorruptSketch => "CorruptSketch",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.into_static())
    }
}

/// Error is the error struct returned by all fallible crate functions.
pub struct Error {
    kind: ErrorKind,
    message: String,
    context: Vec<(&'static str, String)>,
    source: Option<anyhow::Error>,
}

impl Error {
    /// Create a new Error with error kind and message.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            context: Vec::default(),
            source: None,
        }
    }

    /// Add more context in error.
    pub fn with_context(mut self, key: &'static str, value: impl ToString) -> Self {
        self.context.push((key, value.to_string()));
        self
    }

    /// Set source for error.
    ///
    /// # Panics
    ///
    /// Panics if the source has been set.
    pub fn set_source(mut self, src: impl Into<anyhow::Error>) -> Self {
        assert!(self.source.is_none(), "the source error has been set");
        self.source = Some(src.into());
        self
    }

    /// Return error's kind.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Return error's message.
    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    /// Corrupt-sketch error for a payload that ended before the named field.
    pub(crate) fn truncated(field: &'static str) -> Self {
        Self::new(ErrorKind::CorruptSketch, "serialized sketch data too short")
            .with_context("field", field)
    }

    /// Corrupt-sketch error for a field holding an unexpected value.
    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::CorruptSketch, message)
    }

    /// Mismatched-precision error for a merge of incompatible sketches.
    pub(crate) fn precision_mismatch(expected: u8, actual: u8) -> Self {
        Self::new(
            ErrorKind::ConfigurationMismatch,
            "cannot merge sketches with different register counts",
        )
        .with_context("expected_precision", expected)
        .with_context("actual_precision", actual)
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // If alternate has been specified, we will print like Debug.
        if f.alternate() {
            let mut de = f.debug_struct("Error");
            de.field("kind", &self.kind);
            de.field("message", &self.message);
            de.field("context", &self.context);
            de.field("source", &self.source);
            return de.finish();
        }

        write!(f, "{}", self.kind)?;
        if !self.message.is_empty() {
            write!(f, " => {}", self.message)?;
        }
        writeln!(f)?;

        if !self.context.is_empty() {
            writeln!(f)?;
            writeln!(f, "Context:")?;
            for (k, v) in self.context.iter() {
                writeln!(f, "   {k}: {v}")?;
            }
        }

        if let Some(source) = &self.source {
            writeln!(f)?;
            writeln!(f, "Source:")?;
            writeln!(f, "   {source:#}")?;
        }

        Ok(())
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;

        if !self.context.is_empty() {
            write!(f, ", context: {{ ")?;
            write!(
                f,
                "{}",
                self.context
                    .iter()
                    .map(|(k, v)| format!("{k}: {v}"))
                    .collect::<Vec<_>>()
                    .join(", ")
            )?;
            write!(f, " }}")?;
        }

        if !self.message.is_empty() {
            write!(f, " => {}", self.message)?;
        }

        if let Some(source) = &self.source {
            write!(f, ", source: {source}")?;
        }

        Ok(())
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_ref().map(|v| v.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kind_roundtrip() {
        assert_eq!(
            ErrorKind::ConfigurationMismatch.to_string(),
            "ConfigurationMismatch"
        );
        let err = Error::new(ErrorKind::InvalidConfiguration, "bad bound")
            .with_context("max_standard_error", 0.5);
        assert_eq!(err.kind(), ErrorKind::InvalidConfiguration);
        assert_eq!(err.message(), "bad bound");
        assert!(err.to_string().contains("max_standard_error: 0.5"));
    }

    #[test]
    fn test_error_source() {
        use std::error::Error as _;

        let err = Error::malformed("payload length mismatch");
        assert!(err.source().is_none());
        let err = err.set_source(std::io::Error::other("IO error"));
        assert!(err.source().is_some());
    }
}

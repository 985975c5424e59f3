// This module defines the error type of the lanewise generator using the thiserror crate.
// GenError covers every way generation can fail before or while text is produced: a
// capability matrix missing a (tier, operation) row, a supported cell whose type does not fit
// in the tier's register, an intrinsic table missing a binding or register type that a
// supported cell needs, an unknown tier name in the configuration, and output files that
// cannot be opened or written. Each variant carries the identities needed
// to find the defect in the tables. All of these are construction defects, so callers abort
// on them; GenResult<T> is the convenience alias used throughout the crate.

//! Error types for the generator.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::types::{NumericType, Operation, Role, Tier};

/// Main error type for table construction and code generation.
#[derive(Error, Debug)]
pub enum GenError {
    #[error("capability matrix has no row for `{op}` on the {tier} tier")]
    MissingCapabilityRow { tier: Tier, op: Operation },

    #[error("no {role} binding for `{ty}` on the {tier} tier")]
    MissingBinding {
        tier: Tier,
        role: Role,
        ty: NumericType,
    },

    #[error("`{ty}` is wider than the {tier} register")]
    TypeWiderThanRegister { tier: Tier, ty: NumericType },

    #[error("no register type for `{ty}` on the {tier} tier")]
    MissingRegister { tier: Tier, ty: NumericType },

    #[error("unknown tier `{0}`")]
    UnknownTier(String),

    #[error("failed to open output {path}")]
    OpenSink {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write output {path}")]
    WriteSink {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Result type alias for generator operations.
pub type GenResult<T> = Result<T, GenError>;

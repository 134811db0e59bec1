// Copyright 2025 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Conditional logging macros.
//!
//! With the `tracing` feature these re-export `tracing` macros; without it they expand to `()`,
//! so they stay valid in both statement and expression position.

#[cfg(feature = "tracing")]
pub(crate) use tracing::{debug, warn};

#[cfg(not(feature = "tracing"))]
macro_rules! disabled {
    ($($arg:tt)*) => {
        ()
    };
}

// Imported under a different name first: a local `warn` would be ambiguous with the built-in
// `#[warn]` attribute.
#[cfg(not(feature = "tracing"))]
pub(crate) use disabled as debug;
#[cfg(not(feature = "tracing"))]
pub(crate) use disabled as warn;

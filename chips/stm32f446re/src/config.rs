// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Compile-time configuration of the EXTI and SYSCFG drivers.
//!
//! Options are held in a `const` object rather than scattered `#[cfg]`
//! attributes, so that every code path is type-checked regardless of which
//! features are enabled, and disabled paths are folded away by the compiler.

/// Data structure holding compile-time configuration options.
pub(crate) struct Config {
    /// Whether every EXTI and SYSCFG register write is reported at trace
    /// level through the logging shim.
    ///
    /// Has no visible effect unless the `log` feature is enabled as well.
    pub(crate) trace_exti: bool,

    /// Whether `Exti::init` checks the whole configuration before touching
    /// any register.
    ///
    /// When disabled (the default), a configuration without a client still
    /// has its trigger edge and mask state applied before `init` reports the
    /// failure.
    pub(crate) atomic_init: bool,
}

/// The only location in this crate where Cargo features are consulted.
pub(crate) const CONFIG: Config = Config {
    trace_exti: cfg!(feature = "trace_exti"),
    atomic_init: cfg!(feature = "atomic_init"),
};

// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! External interrupt support for the STM32F446RE: the EXTI controller and
//! the SYSCFG multiplexer that routes GPIO ports onto EXTI lines.
//!
//! STM32F446RE: <https://www.st.com/en/microcontrollers/stm32f4.html>
//!
//! A board wires a pin to an interrupt in three steps:
//!
//! 1. configure the GPIO pin as an input (outside this crate),
//! 2. route the pin's port onto the EXTI line with
//!    [`syscfg::Syscfg::set_exti_port`] (or [`exti::Exti::associate_line_port`]),
//! 3. hand an [`exti::ExtiConfig`] to [`exti::Exti::init`].
//!
//! The board's interrupt service routine for the EXTI vectors (see [`nvic`])
//! then calls [`exti::Exti::handle_interrupt`], which acknowledges the
//! pending lines and calls the installed clients.

#![no_std]

#[cfg(test)]
extern crate std;

mod fmt;

mod config;
mod static_ref;

pub mod errorcode;
pub mod exti;
pub mod nvic;
pub mod syscfg;

pub use crate::errorcode::ErrorCode;
pub use crate::exti::{LineId, LINE_COUNT};
pub use crate::syscfg::{PortId, PORT_COUNT};

#[cfg(test)]
pub(crate) mod testing {
    use crate::static_ref::StaticRef;
    use std::boxed::Box;

    /// A zeroed, never freed block of `N` words standing in for the register
    /// file of a peripheral.
    pub(crate) fn simulated<T, const N: usize>() -> StaticRef<T> {
        assert_eq!(core::mem::size_of::<T>(), N * core::mem::size_of::<u32>());
        let words: &'static mut [u32; N] = Box::leak(Box::new([0; N]));
        unsafe { StaticRef::new(words.as_mut_ptr().cast::<T>()) }
    }
}

// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Named constants for the NVIC ids of the EXTI GPIO lines
//!
//! Extracted from `CMSIS/Device/ST/STM32F4xx/Include/stm32f446xx.h`

pub const EXTI0: u32 = 6;
pub const EXTI1: u32 = 7;
pub const EXTI2: u32 = 8;
pub const EXTI3: u32 = 9;
pub const EXTI4: u32 = 10;
pub const EXTI9_5: u32 = 23;
pub const EXTI15_10: u32 = 40;

// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! External interrupt/event controller (EXTI) for the sixteen GPIO lines.
//!
//! Each line `n` is fed by pin `n` of the port selected in SYSCFG. A line is
//! configured once with an [`ExtiConfig`]: its trigger edge, whether it is
//! unmasked, and the [`ExtiClient`] to call when it fires.
//!
//! Reconfiguring a line while it is unmasked races with its own interrupt;
//! mask it first.

use core::cell::Cell;

use tock_registers::fields::Field;
use tock_registers::interfaces::{ReadWriteable, Readable, Writeable};
use tock_registers::registers::ReadWrite;
use tock_registers::{register_bitfields, RegisterLongName};

use crate::config::CONFIG;
use crate::errorcode::ErrorCode;
use crate::nvic;
use crate::static_ref::StaticRef;
use crate::syscfg::{PortId, Syscfg};

/// Number of EXTI lines wired to GPIO pins.
pub const LINE_COUNT: usize = 16;

/// External interrupt/event controller
#[repr(C)]
pub(crate) struct ExtiRegisters {
    /// Interrupt mask register (EXTI_IMR)
    imr: ReadWrite<u32, IMR::Register>,
    /// Event mask register (EXTI_EMR)
    emr: ReadWrite<u32, EMR::Register>,
    /// Rising trigger selection register (EXTI_RTSR)
    rtsr: ReadWrite<u32, RTSR::Register>,
    /// Falling trigger selection register (EXTI_FTSR)
    ftsr: ReadWrite<u32, FTSR::Register>,
    /// Software interrupt event register (EXTI_SWIER)
    swier: ReadWrite<u32, SWIER::Register>,
    /// Pending register (EXTI_PR)
    pr: ReadWrite<u32, PR::Register>,
}

// Bits 16 to 22 of every register belong to the PVD, RTC, USB OTG and
// Ethernet lines and are not driven from here.
register_bitfields![u32,
    IMR [
        /// Interrupt mask on GPIO lines 0 to 15
        MR OFFSET(0) NUMBITS(16) []
    ],
    EMR [
        /// Event mask on GPIO lines 0 to 15
        MR OFFSET(0) NUMBITS(16) []
    ],
    RTSR [
        /// Rising trigger event configuration of GPIO lines 0 to 15
        TR OFFSET(0) NUMBITS(16) []
    ],
    FTSR [
        /// Falling trigger event configuration of GPIO lines 0 to 15
        TR OFFSET(0) NUMBITS(16) []
    ],
    SWIER [
        /// Software interrupt on GPIO lines 0 to 15
        SWIER OFFSET(0) NUMBITS(16) []
    ],
    PR [
        /// Pending bits of GPIO lines 0 to 15, cleared by writing 1
        PR OFFSET(0) NUMBITS(16) []
    ]
];

const EXTI_BASE: StaticRef<ExtiRegisters> =
    unsafe { StaticRef::new(0x40013C00 as *const ExtiRegisters) };

/// The bit of `lineid` in any of the one-bit-per-line EXTI registers.
fn line_bit<R: RegisterLongName>(lineid: LineId) -> Field<u32, R> {
    Field::new(1, lineid.index())
}

/// EXTI line fed by pin `n` of the port selected in SYSCFG.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineId {
    Exti0 = 0,
    Exti1 = 1,
    Exti2 = 2,
    Exti3 = 3,
    Exti4 = 4,
    Exti5 = 5,
    Exti6 = 6,
    Exti7 = 7,
    Exti8 = 8,
    Exti9 = 9,
    Exti10 = 10,
    Exti11 = 11,
    Exti12 = 12,
    Exti13 = 13,
    Exti14 = 14,
    Exti15 = 15,
}

impl LineId {
    pub const ALL: [LineId; LINE_COUNT] = [
        LineId::Exti0,
        LineId::Exti1,
        LineId::Exti2,
        LineId::Exti3,
        LineId::Exti4,
        LineId::Exti5,
        LineId::Exti6,
        LineId::Exti7,
        LineId::Exti8,
        LineId::Exti9,
        LineId::Exti10,
        LineId::Exti11,
        LineId::Exti12,
        LineId::Exti13,
        LineId::Exti14,
        LineId::Exti15,
    ];

    /// Bit position of the line in the EXTI registers, and its slot in the
    /// client table.
    pub const fn index(self) -> usize {
        self as usize
    }

    /// The NVIC interrupt that signals this line. Lines 5 to 9 and 10 to 15
    /// share a vector.
    pub const fn nvic_irq(self) -> u32 {
        match self {
            LineId::Exti0 => nvic::EXTI0,
            LineId::Exti1 => nvic::EXTI1,
            LineId::Exti2 => nvic::EXTI2,
            LineId::Exti3 => nvic::EXTI3,
            LineId::Exti4 => nvic::EXTI4,
            LineId::Exti5 | LineId::Exti6 | LineId::Exti7 | LineId::Exti8 | LineId::Exti9 => {
                nvic::EXTI9_5
            }
            _ => nvic::EXTI15_10,
        }
    }
}

impl TryFrom<u8> for LineId {
    type Error = ErrorCode;

    fn try_from(line: u8) -> Result<Self, Self::Error> {
        LineId::ALL
            .get(usize::from(line))
            .copied()
            .ok_or(ErrorCode::FAIL)
    }
}

/// Edge(s) of the pin signal that set a line's pending bit.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TriggerEdge {
    Falling = 0,
    Rising = 1,
    Both = 2,
}

impl TryFrom<u8> for TriggerEdge {
    type Error = ErrorCode;

    fn try_from(edge: u8) -> Result<Self, Self::Error> {
        match edge {
            0 => Ok(TriggerEdge::Falling),
            1 => Ok(TriggerEdge::Rising),
            2 => Ok(TriggerEdge::Both),
            _ => Err(ErrorCode::FAIL),
        }
    }
}

/// Whether a pending edge on the line raises an interrupt.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineState {
    Enabled = 0,
    Disabled = 1,
}

impl TryFrom<u8> for LineState {
    type Error = ErrorCode;

    fn try_from(state: u8) -> Result<Self, Self::Error> {
        match state {
            0 => Ok(LineState::Enabled),
            1 => Ok(LineState::Disabled),
            _ => Err(ErrorCode::FAIL),
        }
    }
}

/// Interface for users of EXTI interrupts. In order to receive interrupts,
/// the user must implement this `ExtiClient` interface, or pass any `Fn()`.
pub trait ExtiClient {
    /// Called from interrupt context when the line the client was installed
    /// on fires.
    fn fired(&self);
}

impl<F: Fn()> ExtiClient for F {
    fn fired(&self) {
        self();
    }
}

/// Everything `Exti::init` needs to set up one line.
#[derive(Clone, Copy)]
pub struct ExtiConfig<'a> {
    pub line: LineId,
    pub trigger: TriggerEdge,
    pub state: LineState,
    /// `None` is rejected by `Exti::init`.
    pub client: Option<&'a dyn ExtiClient>,
}

/// `clients` holds the per-line callbacks called from `handle_interrupt()`.
pub struct Exti<'a> {
    registers: StaticRef<ExtiRegisters>,
    clients: [Cell<Option<&'a dyn ExtiClient>>; LINE_COUNT],
    syscfg: &'a Syscfg,
}

impl<'a> Exti<'a> {
    pub const fn new(syscfg: &'a Syscfg) -> Exti<'a> {
        Exti::with_registers(EXTI_BASE, syscfg)
    }

    pub(crate) const fn with_registers(
        registers: StaticRef<ExtiRegisters>,
        syscfg: &'a Syscfg,
    ) -> Exti<'a> {
        Exti {
            registers,
            clients: [
                Cell::new(None),
                Cell::new(None),
                Cell::new(None),
                Cell::new(None),
                Cell::new(None),
                Cell::new(None),
                Cell::new(None),
                Cell::new(None),
                Cell::new(None),
                Cell::new(None),
                Cell::new(None),
                Cell::new(None),
                Cell::new(None),
                Cell::new(None),
                Cell::new(None),
                Cell::new(None),
            ],
            syscfg,
        }
    }

    /// Configure one line: trigger edge first, then the mask bit, then the
    /// client.
    ///
    /// A missing `config` fails with `NOREF` before anything is written. A
    /// missing client fails with `FAIL`; unless the `atomic_init` feature is
    /// enabled, the trigger and mask writes made before that check are kept.
    pub fn init(&self, config: Option<&ExtiConfig<'a>>) -> Result<(), ErrorCode> {
        let config = config.ok_or(ErrorCode::NOREF)?;

        if CONFIG.atomic_init && config.client.is_none() {
            debug!("exti: rejected {:?} without a client", config.line);
            return Err(ErrorCode::FAIL);
        }

        self.set_trigger_source(config.trigger, config.line);
        match config.state {
            LineState::Enabled => self.unmask_interrupt(config.line),
            LineState::Disabled => self.mask_interrupt(config.line),
        }

        let Some(client) = config.client else {
            debug!(
                "exti: {:?} configured without a client, trigger and mask left applied",
                config.line
            );
            return Err(ErrorCode::FAIL);
        };
        self.clients[config.line.index()].set(Some(client));

        Ok(())
    }

    /// Route `port` to `lineid` through SYSCFG and make sure the line starts
    /// out masked.
    pub fn associate_line_port(&self, lineid: LineId, port: PortId) {
        self.syscfg.set_exti_port(port, lineid);
        self.mask_interrupt(lineid);
    }

    /// Select the edge(s) that set the pending bit of `lineid`. Selecting a
    /// single edge deselects the other one.
    pub fn set_trigger_source(&self, edge: TriggerEdge, lineid: LineId) {
        match edge {
            TriggerEdge::Rising => {
                self.select_rising_trigger(lineid);
                self.deselect_falling_trigger(lineid);
            }
            TriggerEdge::Falling => {
                self.select_falling_trigger(lineid);
                self.deselect_rising_trigger(lineid);
            }
            TriggerEdge::Both => {
                self.select_rising_trigger(lineid);
                self.select_falling_trigger(lineid);
            }
        }

        if CONFIG.trace_exti {
            trace!("exti: {:?} triggers on {:?}", lineid, edge);
        }
    }

    /// The edge(s) currently selected for `lineid`, if any.
    pub fn trigger_edge(&self, lineid: LineId) -> Option<TriggerEdge> {
        let rising = self.registers.rtsr.is_set(line_bit(lineid));
        let falling = self.registers.ftsr.is_set(line_bit(lineid));
        match (rising, falling) {
            (true, true) => Some(TriggerEdge::Both),
            (true, false) => Some(TriggerEdge::Rising),
            (false, true) => Some(TriggerEdge::Falling),
            (false, false) => None,
        }
    }

    pub fn select_rising_trigger(&self, lineid: LineId) {
        self.registers.rtsr.modify(line_bit(lineid).val(1));
    }

    pub fn deselect_rising_trigger(&self, lineid: LineId) {
        self.registers.rtsr.modify(line_bit(lineid).val(0));
    }

    pub fn select_falling_trigger(&self, lineid: LineId) {
        self.registers.ftsr.modify(line_bit(lineid).val(1));
    }

    pub fn deselect_falling_trigger(&self, lineid: LineId) {
        self.registers.ftsr.modify(line_bit(lineid).val(0));
    }

    pub fn mask_interrupt(&self, lineid: LineId) {
        self.registers.imr.modify(line_bit(lineid).val(0));

        if CONFIG.trace_exti {
            trace!("exti: {:?} masked", lineid);
        }
    }

    pub fn unmask_interrupt(&self, lineid: LineId) {
        self.registers.imr.modify(line_bit(lineid).val(1));

        if CONFIG.trace_exti {
            trace!("exti: {:?} unmasked", lineid);
        }
    }

    pub fn is_unmasked(&self, lineid: LineId) -> bool {
        self.registers.imr.is_set(line_bit(lineid))
    }

    /// Request an interrupt on `lineid` from software. The pending bit is set
    /// as if the selected edge had occurred.
    pub fn generate_swint(&self, lineid: LineId) {
        self.registers.swier.modify(line_bit(lineid).val(1));
    }

    // Pending clear happens by writing 1, so this is a plain write: a
    // read-modify-write would also clear every other pending line.
    pub fn clear_pending(&self, lineid: LineId) {
        self.registers.pr.write(line_bit(lineid).val(1));

        if CONFIG.trace_exti {
            trace!("exti: {:?} pending cleared", lineid);
        }
    }

    pub fn is_pending(&self, lineid: LineId) -> bool {
        self.registers.pr.is_set(line_bit(lineid))
    }

    /// Store 1 in `status` if `lineid` is pending, 0 otherwise.
    ///
    /// Fails with `NOREF`, writing nothing, when no `status` slot is given.
    pub fn read_pending(&self, lineid: LineId, status: Option<&mut u8>) -> Result<(), ErrorCode> {
        let status = status.ok_or(ErrorCode::NOREF)?;
        *status = u8::from(self.is_pending(lineid));
        Ok(())
    }

    /// Call the client installed for `lineid`, if there is one. The pending
    /// bit is left for the caller to clear.
    pub fn dispatch(&self, lineid: LineId) {
        if let Some(client) = self.clients[lineid.index()].get() {
            if CONFIG.trace_exti {
                trace!("exti: dispatching {:?}", lineid);
            }
            client.fired();
        } else {
            warn!("exti: {:?} fired with no client installed", lineid);
        }
    }

    /// Service routine for every EXTI vector in `nvic`.
    pub fn handle_interrupt(&self) {
        // `EXTI_PR` is a read/clear write 1 register (`rc_w1`), and an edge
        // can land between the read and the write. Only the bits captured in
        // `exti_pr` are written back, so a later edge stays pending.
        // Masked lines latch edges too; those stay pending for `read_pending`.
        let mut exti_pr = critical_section::with(|_| {
            let pending = self.registers.pr.read(PR::PR) & self.registers.imr.read(IMR::MR);
            self.registers.pr.write(PR::PR.val(pending));
            pending
        });

        let mut flagged_bit = 0;

        // stay in loop until we have processed all the flagged event bits
        while exti_pr != 0 {
            if (exti_pr & 0b1) != 0 {
                if let Some(lineid) = LineId::ALL.get(flagged_bit) {
                    self.dispatch(*lineid);
                }
            }
            // move to next bit
            flagged_bit += 1;
            exti_pr >>= 1;
        }
    }
}

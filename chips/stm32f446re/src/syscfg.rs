// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! System configuration controller: EXTI line to GPIO port routing.

use tock_registers::fields::Field;
use tock_registers::interfaces::ReadWriteable;
use tock_registers::register_bitfields;
use tock_registers::registers::ReadWrite;

use crate::config::CONFIG;
use crate::errorcode::ErrorCode;
use crate::exti::LineId;
use crate::static_ref::StaticRef;

/// Number of GPIO ports that can drive an EXTI line.
pub const PORT_COUNT: usize = 8;

/// System configuration controller (STM32F446)
/// Reference: RM0390 (SYSCFG chapter)
#[repr(C)]
pub(crate) struct SyscfgRegisters {
    /// memory remap register
    memrmp: ReadWrite<u32, MEMRMP::Register>,
    /// peripheral mode configuration register
    pmc: ReadWrite<u32, PMC::Register>,
    /// external interrupt configuration registers 1 to 4
    exticr: [ReadWrite<u32, EXTICR::Register>; 4],
    _reserved0: [u32; 2],
    /// compensation cell control register
    cmpcr: ReadWrite<u32, CMPCR::Register>,
    _reserved1: [u32; 2],
    /// configuration register
    cfgr: ReadWrite<u32, CFGR::Register>,
}

register_bitfields![u32,
    MEMRMP [
        /// FMC memory mapping swap
        SWP_FMC OFFSET(10) NUMBITS(2) [],
        /// Memory mapping selection
        MEM_MODE OFFSET(0) NUMBITS(3) []
    ],
    PMC [
        /// ADC3 additional power-down mode
        ADC3DC2 OFFSET(18) NUMBITS(1) [],
        /// ADC2 additional power-down mode
        ADC2DC2 OFFSET(17) NUMBITS(1) [],
        /// ADC1 additional power-down mode
        ADC1DC2 OFFSET(16) NUMBITS(1) []
    ],
    // EXTICRn routes lines 4n to 4n + 3; `EXTIk` is the selector of line
    // 4n + k.
    EXTICR [
        EXTI3 OFFSET(12) NUMBITS(4) [],
        EXTI2 OFFSET(8) NUMBITS(4) [],
        EXTI1 OFFSET(4) NUMBITS(4) [],
        EXTI0 OFFSET(0) NUMBITS(4) []
    ],
    CMPCR [
        /// Compensation cell ready flag
        READY OFFSET(8) NUMBITS(1) [],
        /// Compensation cell power-down
        CMP_PD OFFSET(0) NUMBITS(1) []
    ],
    CFGR [
        /// Fast-mode plus driving capability on FMPI2C1_SDA
        FMPI2C1_SDA OFFSET(1) NUMBITS(1) [],
        /// Fast-mode plus driving capability on FMPI2C1_SCL
        FMPI2C1_SCL OFFSET(0) NUMBITS(1) []
    ]
];

const SYSCFG_BASE: StaticRef<SyscfgRegisters> =
    unsafe { StaticRef::new(0x40013800 as *const SyscfgRegisters) };

/// SYSCFG EXTI source selection [^1]
///
/// [^1]: Section 7.2.3, SYSCFG_EXTICR1 of the reference manual
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PortId {
    PA = 0b0000,
    PB = 0b0001,
    PC = 0b0010,
    PD = 0b0011,
    PE = 0b0100,
    PF = 0b0101,
    PG = 0b0110,
    PH = 0b0111,
}

impl PortId {
    pub const ALL: [PortId; PORT_COUNT] = [
        PortId::PA,
        PortId::PB,
        PortId::PC,
        PortId::PD,
        PortId::PE,
        PortId::PF,
        PortId::PG,
        PortId::PH,
    ];
}

impl TryFrom<u8> for PortId {
    type Error = ErrorCode;

    fn try_from(port: u8) -> Result<Self, Self::Error> {
        PortId::ALL
            .get(usize::from(port))
            .copied()
            .ok_or(ErrorCode::FAIL)
    }
}

/// Location of the selector for `lineid`: the index of its `EXTICR` register
/// and the bit offset of its 4-bit field within that register.
pub fn exticr_position(lineid: LineId) -> (usize, usize) {
    let line = lineid.index();
    (line / 4, (line % 4) * 4)
}

/// SYSCFG driver; only the EXTI line routing is exposed.
pub struct Syscfg {
    registers: StaticRef<SyscfgRegisters>,
}

impl Syscfg {
    pub const fn new() -> Syscfg {
        Syscfg::with_registers(SYSCFG_BASE)
    }

    pub(crate) const fn with_registers(registers: StaticRef<SyscfgRegisters>) -> Syscfg {
        Syscfg { registers }
    }

    /// Route `port` onto EXTI line `lineid`.
    ///
    /// Only the line's 4-bit field in `SYSCFG_EXTICR{1, 2, 3, 4}` changes; the
    /// selectors of the three other lines sharing the register are kept.
    pub fn set_exti_port(&self, port: PortId, lineid: LineId) {
        let (index, offset) = exticr_position(lineid);
        let selector = Field::<u32, EXTICR::Register>::new(EXTICR::EXTI0.mask, offset);

        self.registers.exticr[index].modify(selector.val(port as u32));

        if CONFIG.trace_exti {
            trace!(
                "syscfg: EXTICR{}[{}:{}] <- {:?} for {:?}",
                index + 1,
                offset + 3,
                offset,
                port,
                lineid
            );
        }
    }

    #[cfg(test)]
    pub(crate) fn exticr_value(&self, index: usize) -> u32 {
        use tock_registers::interfaces::Readable;
        self.registers.exticr[index].get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::simulated;
    use tock_registers::interfaces::{Readable, Writeable};

    fn new_syscfg() -> Syscfg {
        Syscfg::with_registers(simulated::<SyscfgRegisters, 12>())
    }

    #[test]
    fn exticr_layout_matches_reference_manual() {
        let regs = simulated::<SyscfgRegisters, 12>();
        let base = &*regs as *const SyscfgRegisters as usize;
        assert_eq!(&regs.exticr[0] as *const _ as usize - base, 0x08);
        assert_eq!(&regs.exticr[3] as *const _ as usize - base, 0x14);
        assert_eq!(&regs.cmpcr as *const _ as usize - base, 0x20);
        assert_eq!(&regs.cfgr as *const _ as usize - base, 0x2c);
    }

    #[test]
    fn position_is_register_and_nibble() {
        assert_eq!(exticr_position(LineId::Exti0), (0, 0));
        assert_eq!(exticr_position(LineId::Exti3), (0, 12));
        assert_eq!(exticr_position(LineId::Exti5), (1, 4));
        assert_eq!(exticr_position(LineId::Exti10), (2, 8));
        assert_eq!(exticr_position(LineId::Exti15), (3, 12));
    }

    #[test]
    fn routing_line5_to_port_c_touches_only_its_nibble() {
        let syscfg = new_syscfg();
        syscfg.registers.exticr[1].set(0xA5A5_A5A5);

        syscfg.set_exti_port(PortId::PC, LineId::Exti5);

        assert_eq!((syscfg.exticr_value(1) >> 4) & 0b1111, 0b0010);
        assert_eq!(syscfg.exticr_value(1), 0xA5A5_A525);
        assert_eq!(syscfg.exticr_value(0), 0);
        assert_eq!(syscfg.exticr_value(2), 0);
    }

    #[test]
    fn rerouting_replaces_previous_port() {
        let syscfg = new_syscfg();

        syscfg.set_exti_port(PortId::PH, LineId::Exti13);
        syscfg.set_exti_port(PortId::PB, LineId::Exti13);

        assert_eq!(syscfg.exticr_value(3), 0x0000_0010);
    }

    #[test]
    fn every_line_lands_in_its_own_field() {
        let syscfg = new_syscfg();

        for lineid in LineId::ALL {
            let port = PortId::ALL[lineid.index() % PORT_COUNT];
            syscfg.set_exti_port(port, lineid);
        }

        // Lines 0-7 get ports A-H, and so do lines 8-15.
        for index in 0..4 {
            let expected = if index % 2 == 0 { 0x3210 } else { 0x7654 };
            assert_eq!(syscfg.exticr_value(index), expected);
        }
        assert_eq!(syscfg.registers.memrmp.get(), 0);
        assert_eq!(syscfg.registers.pmc.get(), 0);
    }

    #[test]
    fn port_from_raw_value() {
        assert_eq!(PortId::try_from(2), Ok(PortId::PC));
        assert_eq!(PortId::try_from(7), Ok(PortId::PH));
        assert_eq!(PortId::try_from(8), Err(ErrorCode::FAIL));
    }
}

mod alu;
mod bit;
mod block;
mod branch;
mod decode;
mod flags;
mod io;
mod load_store;
mod stack;

pub use flags::Flag;

use crate::core::Bus;
use crate::cpu::{Cpu, Snapshot, Step, Z80State};

/// Register rewrite selected by a DD/FD prefix for the current instruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IndexMode {
    Hl,
    Ix,
    Iy,
}

/// Zilog Z80 core: instruction-accurate interpreter.
///
/// Register pairs are stored at their 16-bit width; the 8-bit halves are
/// views of the same storage (writing B through `set_b` changes `bc`).
/// `tstates` counts elapsed clock cycles and never decreases; hosts use its
/// delta to schedule external events between steps.
pub struct Z80 {
    pub af: u16,
    pub bc: u16,
    pub de: u16,
    pub hl: u16,
    // Shadow set, reachable only through EX AF,AF' and EXX
    pub af_alt: u16,
    pub bc_alt: u16,
    pub de_alt: u16,
    pub hl_alt: u16,
    // Index & special registers
    pub ix: u16,
    pub iy: u16,
    pub sp: u16,
    pub pc: u16,
    pub i: u8,
    pub r: u8,

    // Interrupt state
    pub iff1: bool,
    pub iff2: bool,
    pub im: u8,
    pub halted: bool,
    pub tstates: u64,

    ei_pending: bool,
    pending_nmi: bool,
    pending_int: Option<u8>,
    index_mode: IndexMode,
}

impl Default for Z80 {
    fn default() -> Self {
        Self::new()
    }
}

impl Z80 {
    /// A fresh core: every register zeroed, execution starting at address 0.
    pub fn new() -> Self {
        Self {
            af: 0,
            bc: 0,
            de: 0,
            hl: 0,
            af_alt: 0,
            bc_alt: 0,
            de_alt: 0,
            hl_alt: 0,
            ix: 0,
            iy: 0,
            sp: 0,
            pc: 0,
            i: 0,
            r: 0,
            iff1: false,
            iff2: false,
            im: 0,
            halted: false,
            tstates: 0,
            ei_pending: false,
            pending_nmi: false,
            pending_int: None,
            index_mode: IndexMode::Hl,
        }
    }

    // 8-bit halves of the 16-bit pairs. A is the high byte of AF.
    pub fn a(&self) -> u8 { (self.af >> 8) as u8 }
    pub fn set_a(&mut self, val: u8) { self.af = (self.af & 0x00FF) | ((val as u16) << 8); }

    pub fn f(&self) -> u8 { self.af as u8 }
    pub fn set_f(&mut self, val: u8) { self.af = (self.af & 0xFF00) | val as u16; }

    pub fn b(&self) -> u8 { (self.bc >> 8) as u8 }
    pub fn set_b(&mut self, val: u8) { self.bc = (self.bc & 0x00FF) | ((val as u16) << 8); }

    pub fn c(&self) -> u8 { self.bc as u8 }
    pub fn set_c(&mut self, val: u8) { self.bc = (self.bc & 0xFF00) | val as u16; }

    pub fn d(&self) -> u8 { (self.de >> 8) as u8 }
    pub fn set_d(&mut self, val: u8) { self.de = (self.de & 0x00FF) | ((val as u16) << 8); }

    pub fn e(&self) -> u8 { self.de as u8 }
    pub fn set_e(&mut self, val: u8) { self.de = (self.de & 0xFF00) | val as u16; }

    pub fn h(&self) -> u8 { (self.hl >> 8) as u8 }
    pub fn set_h(&mut self, val: u8) { self.hl = (self.hl & 0x00FF) | ((val as u16) << 8); }

    pub fn l(&self) -> u8 { self.hl as u8 }
    pub fn set_l(&mut self, val: u8) { self.hl = (self.hl & 0xFF00) | val as u16; }

    pub fn flag(&self, flag: Flag) -> bool {
        (self.f() & flag as u8) != 0
    }

    /// Latch a non-maskable interrupt; honored before the next fetch.
    pub fn raise_nmi(&mut self) {
        self.pending_nmi = true;
    }

    /// Latch a maskable interrupt with the byte the device would place on
    /// the data bus (used by IM 0 and IM 2). The latch is consumed when the
    /// interrupt is accepted; a level-triggered device re-raises it.
    pub fn raise_int(&mut self, data_bus: u8) {
        self.pending_int = Some(data_bus);
    }

    /// Execute one instruction, interrupt response, or halted idle tick.
    /// Returns the T-states consumed.
    pub fn step<B: Bus + ?Sized>(&mut self, bus: &mut B) -> Step {
        let start = self.tstates;

        // EI defers interrupt acceptance for exactly one instruction, so
        // the EI; RET idiom returns before the handler can re-enter.
        let irq_deferred = self.ei_pending;
        self.ei_pending = false;

        if self.pending_nmi {
            self.pending_nmi = false;
            self.serve_nmi(bus);
            return Step::Ran((self.tstates - start) as u32);
        }

        if let Some(data_bus) = self.pending_int {
            if self.iff1 && !irq_deferred {
                self.pending_int = None;
                self.serve_int(bus, data_bus);
                return Step::Ran((self.tstates - start) as u32);
            }
        }

        if self.halted {
            // Refresh continues while halted; PC stays on the HALT opcode.
            self.refresh_r();
            self.tstates += 4;
            return if self.iff1 {
                Step::Ran(4)
            } else {
                Step::Halted(4)
            };
        }

        self.index_mode = IndexMode::Hl;
        self.execute(bus);
        Step::Ran((self.tstates - start) as u32)
    }

    /// Fetch/decode/execute one instruction, prefixes included.
    fn execute<B: Bus + ?Sized>(&mut self, bus: &mut B) {
        let mut opcode = self.fetch_opcode(bus);

        // DD/FD chains rebind H/L/(HL) for the one instruction; each prefix
        // byte is its own M1 cycle and the last prefix wins.
        loop {
            match opcode {
                0xDD => self.index_mode = IndexMode::Ix,
                0xFD => self.index_mode = IndexMode::Iy,
                _ => break,
            }
            self.tstates += 4;
            opcode = self.fetch_opcode(bus);
        }

        match opcode {
            0xCB => {
                if self.index_mode == IndexMode::Hl {
                    let sub = self.fetch_opcode(bus);
                    self.execute_cb(bus, sub);
                } else {
                    // DD CB d op: displacement before the sub-opcode, which
                    // is fetched as data (no refresh).
                    let disp = self.fetch8(bus) as i8;
                    let addr = self.index_base().wrapping_add(disp as i16 as u16);
                    let sub = self.fetch8(bus);
                    self.execute_index_cb(bus, sub, addr);
                }
            }
            0xED => {
                self.index_mode = IndexMode::Hl;
                let sub = self.fetch_opcode(bus);
                self.execute_ed(bus, sub);
            }
            _ => self.execute_main(bus, opcode),
        }
    }

    /// NMI response — 11 T. IFF1 cleared, IFF2 preserved for RETN.
    fn serve_nmi<B: Bus + ?Sized>(&mut self, bus: &mut B) {
        log::trace!("NMI accepted at PC={:#06X}", self.pc);
        self.wake();
        self.iff1 = false;
        self.refresh_r();
        self.push16(bus, self.pc);
        self.pc = 0x0066;
        self.tstates += 11;
    }

    /// Maskable interrupt response. IM 0/1: 13 T, IM 2: 19 T.
    fn serve_int<B: Bus + ?Sized>(&mut self, bus: &mut B, data_bus: u8) {
        debug_assert!(self.im <= 2, "interrupt mode {} out of range", self.im);
        log::trace!(
            "IRQ accepted at PC={:#06X} (IM {}, bus byte {:#04X})",
            self.pc,
            self.im,
            data_bus
        );
        self.wake();
        self.iff1 = false;
        self.iff2 = false;
        self.refresh_r();

        if self.im == 2 {
            // Vector table entry at I:data_bus, read little-endian.
            let entry = ((self.i as u16) << 8) | data_bus as u16;
            let target = bus.read16(entry);
            self.push16(bus, self.pc);
            self.pc = target;
            self.tstates += 19;
        } else {
            // IM 1 executes RST 38h. IM 0 executes the byte off the bus:
            // only the RST family is honored, anything else degrades to
            // RST 38h (the usual open-bus 0xFF is exactly that).
            let target = if self.im == 0 && (data_bus & 0xC7) == 0xC7 {
                (data_bus & 0x38) as u16
            } else {
                0x0038
            };
            self.push16(bus, self.pc);
            self.pc = target;
            self.tstates += 13;
        }
    }

    /// Leave the halt state: PC moves past the HALT opcode it was parked on.
    fn wake(&mut self) {
        if self.halted {
            self.halted = false;
            self.pc = self.pc.wrapping_add(1);
        }
    }

    /// M1 opcode fetch: advances PC and the low 7 bits of R (bit 7 sticky).
    pub(crate) fn fetch_opcode<B: Bus + ?Sized>(&mut self, bus: &mut B) -> u8 {
        let opcode = bus.read(self.pc);
        self.pc = self.pc.wrapping_add(1);
        self.refresh_r();
        opcode
    }

    /// Operand byte fetch (no refresh).
    pub(crate) fn fetch8<B: Bus + ?Sized>(&mut self, bus: &mut B) -> u8 {
        let val = bus.read(self.pc);
        self.pc = self.pc.wrapping_add(1);
        val
    }

    /// Little-endian operand word fetch.
    pub(crate) fn fetch16<B: Bus + ?Sized>(&mut self, bus: &mut B) -> u16 {
        let low = self.fetch8(bus) as u16;
        let high = self.fetch8(bus) as u16;
        (high << 8) | low
    }

    pub(crate) fn refresh_r(&mut self) {
        self.r = (self.r & 0x80) | (self.r.wrapping_add(1) & 0x7F);
    }

    pub(crate) fn push16<B: Bus + ?Sized>(&mut self, bus: &mut B, val: u16) {
        self.sp = self.sp.wrapping_sub(1);
        bus.write(self.sp, (val >> 8) as u8);
        self.sp = self.sp.wrapping_sub(1);
        bus.write(self.sp, val as u8);
    }

    pub(crate) fn pop16<B: Bus + ?Sized>(&mut self, bus: &mut B) -> u16 {
        let low = bus.read(self.sp) as u16;
        self.sp = self.sp.wrapping_add(1);
        let high = bus.read(self.sp) as u16;
        self.sp = self.sp.wrapping_add(1);
        (high << 8) | low
    }

    /// IX or IY under the active prefix.
    pub(crate) fn index_base(&self) -> u16 {
        match self.index_mode {
            IndexMode::Hl => self.hl,
            IndexMode::Ix => self.ix,
            IndexMode::Iy => self.iy,
        }
    }

    pub(crate) fn indexed(&self) -> bool {
        self.index_mode != IndexMode::Hl
    }

    /// Effective address of the memory operand: HL, or IX/IY plus a
    /// sign-extended displacement fetched from the instruction stream.
    pub(crate) fn mem_addr<B: Bus + ?Sized>(&mut self, bus: &mut B) -> u16 {
        if self.indexed() {
            let disp = self.fetch8(bus) as i8;
            self.index_base().wrapping_add(disp as i16 as u16)
        } else {
            self.hl
        }
    }

    /// 8-bit register by selector index. Index 6 is the memory operand and
    /// is never handled here.
    pub(crate) fn reg8(&self, index: u8) -> u8 {
        match index {
            0 => self.b(),
            1 => self.c(),
            2 => self.d(),
            3 => self.e(),
            4 => self.h(),
            5 => self.l(),
            7 => self.a(),
            _ => unreachable!("reg8 called with index {}", index),
        }
    }

    pub(crate) fn set_reg8(&mut self, index: u8, val: u8) {
        match index {
            0 => self.set_b(val),
            1 => self.set_c(val),
            2 => self.set_d(val),
            3 => self.set_e(val),
            4 => self.set_h(val),
            5 => self.set_l(val),
            7 => self.set_a(val),
            _ => unreachable!("set_reg8 called with index {}", index),
        }
    }

    /// 8-bit register by selector index, with H/L rewritten to the halves
    /// of IX/IY under a DD/FD prefix. Memory-operand forms must use the
    /// plain `reg8` for their register side instead.
    pub(crate) fn reg8_ix(&self, index: u8) -> u8 {
        match (index, self.index_mode) {
            (4, IndexMode::Ix) => (self.ix >> 8) as u8,
            (5, IndexMode::Ix) => self.ix as u8,
            (4, IndexMode::Iy) => (self.iy >> 8) as u8,
            (5, IndexMode::Iy) => self.iy as u8,
            _ => self.reg8(index),
        }
    }

    pub(crate) fn set_reg8_ix(&mut self, index: u8, val: u8) {
        match (index, self.index_mode) {
            (4, IndexMode::Ix) => self.ix = (self.ix & 0x00FF) | ((val as u16) << 8),
            (5, IndexMode::Ix) => self.ix = (self.ix & 0xFF00) | val as u16,
            (4, IndexMode::Iy) => self.iy = (self.iy & 0x00FF) | ((val as u16) << 8),
            (5, IndexMode::Iy) => self.iy = (self.iy & 0xFF00) | val as u16,
            _ => self.set_reg8(index, val),
        }
    }

    /// 16-bit pair by selector index (0=BC, 1=DE, 2=HL/IX/IY, 3=SP).
    pub(crate) fn rp(&self, index: u8) -> u16 {
        match index {
            0 => self.bc,
            1 => self.de,
            2 => self.index_base(),
            3 => self.sp,
            _ => unreachable!("rp called with index {}", index),
        }
    }

    pub(crate) fn set_rp(&mut self, index: u8, val: u16) {
        match index {
            0 => self.bc = val,
            1 => self.de = val,
            2 => match self.index_mode {
                IndexMode::Hl => self.hl = val,
                IndexMode::Ix => self.ix = val,
                IndexMode::Iy => self.iy = val,
            },
            3 => self.sp = val,
            _ => unreachable!("set_rp called with index {}", index),
        }
    }

    /// 16-bit pair by selector index for PUSH/POP (AF replaces SP).
    pub(crate) fn rp_af(&self, index: u8) -> u16 {
        match index {
            3 => self.af,
            _ => self.rp(index),
        }
    }

    pub(crate) fn set_rp_af(&mut self, index: u8, val: u16) {
        match index {
            3 => self.af = val,
            _ => self.set_rp(index, val),
        }
    }
}

impl Cpu for Z80 {
    fn step(&mut self, bus: &mut dyn Bus) -> Step {
        Z80::step(self, bus)
    }

    /// Hardware reset: clears PC, the interrupt state and the refresh
    /// counter. General registers, SP and the T-state counter survive.
    fn reset(&mut self) {
        self.pc = 0;
        self.i = 0;
        self.r = 0;
        self.im = 0;
        self.iff1 = false;
        self.iff2 = false;
        self.halted = false;
        self.ei_pending = false;
        self.pending_nmi = false;
        self.pending_int = None;
        self.index_mode = IndexMode::Hl;
    }

    fn is_sleeping(&self) -> bool {
        self.halted
    }
}

impl Snapshot for Z80 {
    type State = Z80State;

    fn snapshot(&self) -> Z80State {
        Z80State {
            af: self.af,
            bc: self.bc,
            de: self.de,
            hl: self.hl,
            af_alt: self.af_alt,
            bc_alt: self.bc_alt,
            de_alt: self.de_alt,
            hl_alt: self.hl_alt,
            ix: self.ix,
            iy: self.iy,
            sp: self.sp,
            pc: self.pc,
            i: self.i,
            r: self.r,
            iff1: self.iff1,
            iff2: self.iff2,
            im: self.im,
            halted: self.halted,
        }
    }

    fn restore(&mut self, state: &Z80State) {
        self.af = state.af;
        self.bc = state.bc;
        self.de = state.de;
        self.hl = state.hl;
        self.af_alt = state.af_alt;
        self.bc_alt = state.bc_alt;
        self.de_alt = state.de_alt;
        self.hl_alt = state.hl_alt;
        self.ix = state.ix;
        self.iy = state.iy;
        self.sp = state.sp;
        self.pc = state.pc;
        self.i = state.i;
        self.r = state.r;
        self.iff1 = state.iff1;
        self.iff2 = state.iff2;
        self.im = state.im;
        self.halted = state.halted;
    }
}

use std::mem;

use crate::core::Bus;
use crate::cpu::z80::Z80;
use crate::cpu::z80::flags::{self, Flag};

impl Z80 {
    /// LD r,r' — 4T register-to-register, 7T through (HL), 19T through (IX+d).
    /// When either side is the memory operand the register side uses the
    /// real H/L, not the index-register halves.
    pub(crate) fn op_ld_r_r<B: Bus + ?Sized>(&mut self, bus: &mut B, y: u8, z: u8) {
        if y == 6 {
            let addr = self.mem_addr(bus);
            bus.write(addr, self.reg8(z));
            self.tstates += if self.indexed() { 15 } else { 7 };
        } else if z == 6 {
            let addr = self.mem_addr(bus);
            let val = bus.read(addr);
            self.set_reg8(y, val);
            self.tstates += if self.indexed() { 15 } else { 7 };
        } else {
            let val = self.reg8_ix(z);
            self.set_reg8_ix(y, val);
            self.tstates += 4;
        }
    }

    /// LD r,n — 7T register, 10T (HL), 19T (IX+d).
    /// The displacement precedes the immediate in the instruction stream.
    pub(crate) fn op_ld_r_n<B: Bus + ?Sized>(&mut self, bus: &mut B, y: u8) {
        if y == 6 {
            let addr = self.mem_addr(bus);
            let val = self.fetch8(bus);
            bus.write(addr, val);
            self.tstates += if self.indexed() { 15 } else { 10 };
        } else {
            let val = self.fetch8(bus);
            self.set_reg8_ix(y, val);
            self.tstates += 7;
        }
    }

    /// LD rp,nn — 10T
    pub(crate) fn op_ld_rp_nn<B: Bus + ?Sized>(&mut self, bus: &mut B, p: u8) {
        let val = self.fetch16(bus);
        self.set_rp(p, val);
        self.tstates += 10;
    }

    /// LD (BC),A / LD (DE),A — 7T
    pub(crate) fn op_ld_ind_a<B: Bus + ?Sized>(&mut self, bus: &mut B, addr: u16) {
        bus.write(addr, self.a());
        self.tstates += 7;
    }

    /// LD A,(BC) / LD A,(DE) — 7T
    pub(crate) fn op_ld_a_ind<B: Bus + ?Sized>(&mut self, bus: &mut B, addr: u16) {
        let val = bus.read(addr);
        self.set_a(val);
        self.tstates += 7;
    }

    /// LD (nn),A — 13T
    pub(crate) fn op_ld_nn_a<B: Bus + ?Sized>(&mut self, bus: &mut B) {
        let addr = self.fetch16(bus);
        bus.write(addr, self.a());
        self.tstates += 13;
    }

    /// LD A,(nn) — 13T
    pub(crate) fn op_ld_a_nn<B: Bus + ?Sized>(&mut self, bus: &mut B) {
        let addr = self.fetch16(bus);
        let val = bus.read(addr);
        self.set_a(val);
        self.tstates += 13;
    }

    /// LD (nn),HL — 16T. HL may be IX/IY under prefix.
    pub(crate) fn op_ld_nn_hl<B: Bus + ?Sized>(&mut self, bus: &mut B) {
        let addr = self.fetch16(bus);
        bus.write16(addr, self.rp(2));
        self.tstates += 16;
    }

    /// LD HL,(nn) — 16T
    pub(crate) fn op_ld_hl_nn<B: Bus + ?Sized>(&mut self, bus: &mut B) {
        let addr = self.fetch16(bus);
        let val = bus.read16(addr);
        self.set_rp(2, val);
        self.tstates += 16;
    }

    /// LD SP,HL — 6T
    pub(crate) fn op_ld_sp_hl(&mut self) {
        self.sp = self.rp(2);
        self.tstates += 6;
    }

    /// EX AF,AF' — 4T
    pub(crate) fn op_ex_af_af(&mut self) {
        mem::swap(&mut self.af, &mut self.af_alt);
        self.tstates += 4;
    }

    /// EXX — 4T: BC/DE/HL swap with the shadow set, AF stays
    pub(crate) fn op_exx(&mut self) {
        mem::swap(&mut self.bc, &mut self.bc_alt);
        mem::swap(&mut self.de, &mut self.de_alt);
        mem::swap(&mut self.hl, &mut self.hl_alt);
        self.tstates += 4;
    }

    /// EX DE,HL — 4T. Not affected by DD/FD.
    pub(crate) fn op_ex_de_hl(&mut self) {
        mem::swap(&mut self.de, &mut self.hl);
        self.tstates += 4;
    }

    /// EX (SP),HL — 19T, EX (SP),IX/IY — 23T total
    pub(crate) fn op_ex_sp_hl<B: Bus + ?Sized>(&mut self, bus: &mut B) {
        let from_stack = bus.read16(self.sp);
        bus.write16(self.sp, self.rp(2));
        self.set_rp(2, from_stack);
        self.tstates += 19;
    }

    // --- ED loads ---

    /// LD I,A — 9T
    pub(crate) fn op_ld_i_a(&mut self) {
        self.i = self.a();
        self.tstates += 9;
    }

    /// LD R,A — 9T
    pub(crate) fn op_ld_r_a(&mut self) {
        self.r = self.a();
        self.tstates += 9;
    }

    /// LD A,I — 9T. S/Z from I, H=0, N=0, PV = IFF2, C preserved.
    pub(crate) fn op_ld_a_i(&mut self) {
        self.set_a(self.i);
        self.set_interrupt_load_flags();
        self.tstates += 9;
    }

    /// LD A,R — 9T. Same flag rule as LD A,I.
    pub(crate) fn op_ld_a_r(&mut self) {
        self.set_a(self.r);
        self.set_interrupt_load_flags();
        self.tstates += 9;
    }

    fn set_interrupt_load_flags(&mut self) {
        let mut f = (self.f() & Flag::C as u8) | flags::sz8(self.a());
        if self.iff2 {
            f |= Flag::PV as u8;
        }
        self.set_f(f);
    }

    /// LD (nn),rp — 20T (ED)
    pub(crate) fn op_ld_nn_rp<B: Bus + ?Sized>(&mut self, bus: &mut B, p: u8) {
        let addr = self.fetch16(bus);
        bus.write16(addr, self.rp(p));
        self.tstates += 20;
    }

    /// LD rp,(nn) — 20T (ED)
    pub(crate) fn op_ld_rp_nn_ind<B: Bus + ?Sized>(&mut self, bus: &mut B, p: u8) {
        let addr = self.fetch16(bus);
        let val = bus.read16(addr);
        self.set_rp(p, val);
        self.tstates += 20;
    }
}

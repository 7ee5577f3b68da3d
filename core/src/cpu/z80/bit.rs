use crate::core::Bus;
use crate::cpu::z80::Z80;
use crate::cpu::z80::flags::{self, Flag};

impl Z80 {
    /// CB rotate/shift by operation index:
    /// 0=RLC, 1=RRC, 2=RL, 3=RR, 4=SLA, 5=SRA, 6=SLL, 7=SRL.
    /// Sets the full flag byte (S/Z/parity, C from the shifted-out bit).
    pub(crate) fn rot_shift(&mut self, operation: u8, val: u8) -> u8 {
        let carry_in = self.f() & Flag::C as u8;
        let (result, carry) = match operation {
            0 => ((val << 1) | (val >> 7), val >> 7),
            1 => ((val >> 1) | (val << 7), val & 1),
            2 => ((val << 1) | carry_in, val >> 7),
            3 => ((val >> 1) | (carry_in << 7), val & 1),
            4 => (val << 1, val >> 7),
            5 => (((val as i8) >> 1) as u8, val & 1),
            6 => ((val << 1) | 1, val >> 7), // SLL: shift left, bit 0 set
            _ => (val >> 1, val & 1),
        };

        let mut f = flags::logic(result, false);
        if carry != 0 {
            f |= Flag::C as u8;
        }
        self.set_f(f);
        result
    }

    /// BIT b flags: Z (and PV) from the tested bit, S only for a set bit 7,
    /// H=1, N=0, C preserved.
    pub(crate) fn bit_flags(&mut self, bit: u8, val: u8) {
        let tested = val & (1 << bit);
        let mut f = (self.f() & Flag::C as u8) | Flag::H as u8;
        if tested == 0 {
            f |= Flag::Z as u8 | Flag::PV as u8;
        }
        if bit == 7 && tested != 0 {
            f |= Flag::S as u8;
        }
        self.set_f(f);
    }

    /// Rotate/shift r — 8T register, 15T (HL)
    pub(crate) fn op_cb_rot<B: Bus + ?Sized>(&mut self, bus: &mut B, y: u8, z: u8) {
        if z == 6 {
            let addr = self.hl;
            let result = self.rot_shift(y, bus.read(addr));
            bus.write(addr, result);
            self.tstates += 15;
        } else {
            let result = self.rot_shift(y, self.reg8(z));
            self.set_reg8(z, result);
            self.tstates += 8;
        }
    }

    /// BIT b,r — 8T register, 12T (HL)
    pub(crate) fn op_cb_bit<B: Bus + ?Sized>(&mut self, bus: &mut B, y: u8, z: u8) {
        if z == 6 {
            let val = bus.read(self.hl);
            self.bit_flags(y, val);
            self.tstates += 12;
        } else {
            self.bit_flags(y, self.reg8(z));
            self.tstates += 8;
        }
    }

    /// RES b,r — 8T register, 15T (HL). No flags.
    pub(crate) fn op_cb_res<B: Bus + ?Sized>(&mut self, bus: &mut B, y: u8, z: u8) {
        let mask = !(1u8 << y);
        if z == 6 {
            let addr = self.hl;
            let val = bus.read(addr);
            bus.write(addr, val & mask);
            self.tstates += 15;
        } else {
            self.set_reg8(z, self.reg8(z) & mask);
            self.tstates += 8;
        }
    }

    /// SET b,r — 8T register, 15T (HL). No flags.
    pub(crate) fn op_cb_set<B: Bus + ?Sized>(&mut self, bus: &mut B, y: u8, z: u8) {
        let mask = 1u8 << y;
        if z == 6 {
            let addr = self.hl;
            let val = bus.read(addr);
            bus.write(addr, val | mask);
            self.tstates += 15;
        } else {
            self.set_reg8(z, self.reg8(z) | mask);
            self.tstates += 8;
        }
    }

    /// RRD — 18T (ED): low nibble of (HL) into A, A's low nibble rotated
    /// through the high nibble of (HL).
    pub(crate) fn op_rrd<B: Bus + ?Sized>(&mut self, bus: &mut B) {
        let a = self.a();
        let mem = bus.read(self.hl);
        bus.write(self.hl, (a << 4) | (mem >> 4));
        self.set_a((a & 0xF0) | (mem & 0x0F));
        self.set_nibble_rotate_flags();
        self.tstates += 18;
    }

    /// RLD — 18T (ED): the opposite nibble rotation.
    pub(crate) fn op_rld<B: Bus + ?Sized>(&mut self, bus: &mut B) {
        let a = self.a();
        let mem = bus.read(self.hl);
        bus.write(self.hl, (mem << 4) | (a & 0x0F));
        self.set_a((a & 0xF0) | (mem >> 4));
        self.set_nibble_rotate_flags();
        self.tstates += 18;
    }

    /// S/Z/parity from A, H=0, N=0, C preserved.
    fn set_nibble_rotate_flags(&mut self) {
        let mut f = (self.f() & Flag::C as u8) | flags::sz8(self.a());
        if flags::parity(self.a()) {
            f |= Flag::PV as u8;
        }
        self.set_f(f);
    }
}

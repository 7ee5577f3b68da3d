use crate::core::Bus;
use crate::cpu::z80::Z80;
use crate::cpu::z80::flags::{self, Flag};

impl Z80 {
    /// Apply ALU operation y (ADD/ADC/SUB/SBC/AND/XOR/OR/CP) to A.
    fn alu_a(&mut self, operation: u8, val: u8) {
        let a = self.a();
        let carry = self.f() & Flag::C as u8;
        match operation {
            0 => {
                let (result, f) = flags::add8(a, val, 0);
                self.set_a(result);
                self.set_f(f);
            }
            1 => {
                let (result, f) = flags::add8(a, val, carry);
                self.set_a(result);
                self.set_f(f);
            }
            2 => {
                let (result, f) = flags::sub8(a, val, 0);
                self.set_a(result);
                self.set_f(f);
            }
            3 => {
                let (result, f) = flags::sub8(a, val, carry);
                self.set_a(result);
                self.set_f(f);
            }
            4 => {
                self.set_a(a & val);
                self.set_f(flags::logic(self.a(), true));
            }
            5 => {
                self.set_a(a ^ val);
                self.set_f(flags::logic(self.a(), false));
            }
            6 => {
                self.set_a(a | val);
                self.set_f(flags::logic(self.a(), false));
            }
            _ => {
                // CP: subtract and discard, keeping only the flags
                let (_, f) = flags::sub8(a, val, 0);
                self.set_f(f);
            }
        }
    }

    /// ALU A,r — 4T register, 7T (HL), 19T (IX+d)
    pub(crate) fn op_alu_r<B: Bus + ?Sized>(&mut self, bus: &mut B, y: u8, z: u8) {
        let val = if z == 6 {
            let addr = self.mem_addr(bus);
            self.tstates += if self.indexed() { 15 } else { 7 };
            bus.read(addr)
        } else {
            self.tstates += 4;
            self.reg8_ix(z)
        };
        self.alu_a(y, val);
    }

    /// ALU A,n — 7T
    pub(crate) fn op_alu_n<B: Bus + ?Sized>(&mut self, bus: &mut B, y: u8) {
        let val = self.fetch8(bus);
        self.alu_a(y, val);
        self.tstates += 7;
    }

    /// INC r — 4T register, 11T (HL), 23T (IX+d). C is not affected.
    pub(crate) fn op_inc_r<B: Bus + ?Sized>(&mut self, bus: &mut B, y: u8) {
        if y == 6 {
            let addr = self.mem_addr(bus);
            let (result, f) = flags::inc8(self.f(), bus.read(addr));
            bus.write(addr, result);
            self.set_f(f);
            self.tstates += if self.indexed() { 19 } else { 11 };
        } else {
            let (result, f) = flags::inc8(self.f(), self.reg8_ix(y));
            self.set_reg8_ix(y, result);
            self.set_f(f);
            self.tstates += 4;
        }
    }

    /// DEC r — 4T register, 11T (HL), 23T (IX+d). C is not affected.
    pub(crate) fn op_dec_r<B: Bus + ?Sized>(&mut self, bus: &mut B, y: u8) {
        if y == 6 {
            let addr = self.mem_addr(bus);
            let (result, f) = flags::dec8(self.f(), bus.read(addr));
            bus.write(addr, result);
            self.set_f(f);
            self.tstates += if self.indexed() { 19 } else { 11 };
        } else {
            let (result, f) = flags::dec8(self.f(), self.reg8_ix(y));
            self.set_reg8_ix(y, result);
            self.set_f(f);
            self.tstates += 4;
        }
    }

    /// ADD HL,rp — 11T. Under DD/FD the destination is IX/IY.
    pub(crate) fn op_add_hl_rp(&mut self, p: u8) {
        let (result, f) = flags::add16(self.f(), self.rp(2), self.rp(p));
        self.set_rp(2, result);
        self.set_f(f);
        self.tstates += 11;
    }

    /// ADC HL,rp — 15T (ED)
    pub(crate) fn op_adc_hl_rp(&mut self, p: u8) {
        let carry = self.f() & Flag::C as u8;
        let (result, f) = flags::adc16(self.hl, self.rp(p), carry);
        self.hl = result;
        self.set_f(f);
        self.tstates += 15;
    }

    /// SBC HL,rp — 15T (ED)
    pub(crate) fn op_sbc_hl_rp(&mut self, p: u8) {
        let carry = self.f() & Flag::C as u8;
        let (result, f) = flags::sbc16(self.hl, self.rp(p), carry);
        self.hl = result;
        self.set_f(f);
        self.tstates += 15;
    }

    /// INC rp — 6T, no flags
    pub(crate) fn op_inc_rp(&mut self, p: u8) {
        self.set_rp(p, self.rp(p).wrapping_add(1));
        self.tstates += 6;
    }

    /// DEC rp — 6T, no flags
    pub(crate) fn op_dec_rp(&mut self, p: u8) {
        self.set_rp(p, self.rp(p).wrapping_sub(1));
        self.tstates += 6;
    }

    /// NEG — 8T (ED): A = 0 - A with full subtract flags
    pub(crate) fn op_neg(&mut self) {
        let (result, f) = flags::sub8(0, self.a(), 0);
        self.set_a(result);
        self.set_f(f);
        self.tstates += 8;
    }

    // Accumulator rotates affect only H, N and C; S/Z/PV survive.

    /// RLCA — 4T
    pub(crate) fn op_rlca(&mut self) {
        let a = self.a();
        let bit7 = a >> 7;
        self.set_a((a << 1) | bit7);
        self.set_acc_rotate_flags(bit7 != 0);
        self.tstates += 4;
    }

    /// RRCA — 4T
    pub(crate) fn op_rrca(&mut self) {
        let a = self.a();
        let bit0 = a & 1;
        self.set_a((a >> 1) | (bit0 << 7));
        self.set_acc_rotate_flags(bit0 != 0);
        self.tstates += 4;
    }

    /// RLA — 4T: rotate left through carry
    pub(crate) fn op_rla(&mut self) {
        let a = self.a();
        let carry_in = self.f() & Flag::C as u8;
        self.set_a((a << 1) | carry_in);
        self.set_acc_rotate_flags((a & 0x80) != 0);
        self.tstates += 4;
    }

    /// RRA — 4T: rotate right through carry
    pub(crate) fn op_rra(&mut self) {
        let a = self.a();
        let carry_in = (self.f() & Flag::C as u8) << 7;
        self.set_a((a >> 1) | carry_in);
        self.set_acc_rotate_flags((a & 1) != 0);
        self.tstates += 4;
    }

    fn set_acc_rotate_flags(&mut self, carry: bool) {
        let keep = Flag::S as u8 | Flag::Z as u8 | Flag::PV as u8;
        let mut f = self.f() & keep;
        if carry {
            f |= Flag::C as u8;
        }
        self.set_f(f);
    }

    /// DAA — 4T: BCD correction after an add (N=0) or subtract (N=1).
    /// H tracks the bit-4 toggle, PV is parity, C latches once set.
    pub(crate) fn op_daa(&mut self) {
        let a = self.a();
        let f_old = self.f();
        let mut adjust = 0u8;
        let mut carry = (f_old & Flag::C as u8) != 0;

        if (f_old & Flag::H as u8) != 0 || (a & 0xF) > 0x9 {
            adjust |= 0x06;
        }
        if carry || a > 0x99 {
            adjust |= 0x60;
            carry = true;
        }

        let result = if (f_old & Flag::N as u8) != 0 {
            a.wrapping_sub(adjust)
        } else {
            a.wrapping_add(adjust)
        };

        let mut f = flags::sz8(result) | (f_old & Flag::N as u8);
        if flags::parity(result) {
            f |= Flag::PV as u8;
        }
        if ((a ^ result) & 0x10) != 0 {
            f |= Flag::H as u8;
        }
        if carry {
            f |= Flag::C as u8;
        }
        self.set_a(result);
        self.set_f(f);
        self.tstates += 4;
    }

    /// CPL — 4T: A inverted; only H and N set
    pub(crate) fn op_cpl(&mut self) {
        self.set_a(!self.a());
        self.set_f(self.f() | Flag::H as u8 | Flag::N as u8);
        self.tstates += 4;
    }

    /// SCF — 4T: C set, H and N cleared
    pub(crate) fn op_scf(&mut self) {
        let keep = Flag::S as u8 | Flag::Z as u8 | Flag::PV as u8;
        self.set_f((self.f() & keep) | Flag::C as u8);
        self.tstates += 4;
    }

    /// CCF — 4T: C inverted, previous C into H, N cleared
    pub(crate) fn op_ccf(&mut self) {
        let keep = Flag::S as u8 | Flag::Z as u8 | Flag::PV as u8;
        let old_c = (self.f() & Flag::C as u8) != 0;
        let mut f = self.f() & keep;
        if old_c {
            f |= Flag::H as u8;
        } else {
            f |= Flag::C as u8;
        }
        self.set_f(f);
        self.tstates += 4;
    }
}

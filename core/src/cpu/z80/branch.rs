use crate::core::Bus;
use crate::cpu::z80::Z80;
use crate::cpu::z80::flags::Flag;

impl Z80 {
    /// Evaluate a condition code (3 bits from opcode bits 5-3).
    /// 0=NZ, 1=Z, 2=NC, 3=C, 4=PO, 5=PE, 6=P, 7=M
    pub(crate) fn condition(&self, cc: u8) -> bool {
        let f = self.f();
        match cc {
            0 => (f & Flag::Z as u8) == 0,
            1 => (f & Flag::Z as u8) != 0,
            2 => (f & Flag::C as u8) == 0,
            3 => (f & Flag::C as u8) != 0,
            4 => (f & Flag::PV as u8) == 0, // PO (parity odd)
            5 => (f & Flag::PV as u8) != 0, // PE (parity even)
            6 => (f & Flag::S as u8) == 0,  // P (positive)
            7 => (f & Flag::S as u8) != 0,  // M (minus)
            _ => unreachable!("condition called with code {}", cc),
        }
    }

    /// Sign-extend a displacement byte and add it to an address.
    fn relative(base: u16, disp: u8) -> u16 {
        base.wrapping_add(disp as i8 as i16 as u16)
    }

    /// JP nn — 10T
    pub(crate) fn op_jp_nn<B: Bus + ?Sized>(&mut self, bus: &mut B) {
        self.pc = self.fetch16(bus);
        self.tstates += 10;
    }

    /// JP cc,nn — 10T taken or not
    pub(crate) fn op_jp_cc_nn<B: Bus + ?Sized>(&mut self, bus: &mut B, cc: u8) {
        let target = self.fetch16(bus);
        if self.condition(cc) {
            self.pc = target;
        }
        self.tstates += 10;
    }

    /// JP (HL) — 4T; JP (IX)/(IY) — 8T total. Loads PC from the pair.
    pub(crate) fn op_jp_hl(&mut self) {
        self.pc = self.rp(2);
        self.tstates += 4;
    }

    /// JR d — 12T
    pub(crate) fn op_jr<B: Bus + ?Sized>(&mut self, bus: &mut B) {
        let disp = self.fetch8(bus);
        self.pc = Self::relative(self.pc, disp);
        self.tstates += 12;
    }

    /// JR cc,d — 12T taken, 7T not taken (NZ/Z/NC/C only)
    pub(crate) fn op_jr_cc<B: Bus + ?Sized>(&mut self, bus: &mut B, cc: u8) {
        let disp = self.fetch8(bus);
        if self.condition(cc) {
            self.pc = Self::relative(self.pc, disp);
            self.tstates += 12;
        } else {
            self.tstates += 7;
        }
    }

    /// DJNZ d — 13T while B stays non-zero, 8T on fall-through
    pub(crate) fn op_djnz<B: Bus + ?Sized>(&mut self, bus: &mut B) {
        let disp = self.fetch8(bus);
        let b = self.b().wrapping_sub(1);
        self.set_b(b);
        if b != 0 {
            self.pc = Self::relative(self.pc, disp);
            self.tstates += 13;
        } else {
            self.tstates += 8;
        }
    }

    /// CALL nn — 17T
    pub(crate) fn op_call_nn<B: Bus + ?Sized>(&mut self, bus: &mut B) {
        let target = self.fetch16(bus);
        self.push16(bus, self.pc);
        self.pc = target;
        self.tstates += 17;
    }

    /// CALL cc,nn — 17T taken, 10T not taken (the address bytes are read
    /// either way)
    pub(crate) fn op_call_cc_nn<B: Bus + ?Sized>(&mut self, bus: &mut B, cc: u8) {
        let target = self.fetch16(bus);
        if self.condition(cc) {
            self.push16(bus, self.pc);
            self.pc = target;
            self.tstates += 17;
        } else {
            self.tstates += 10;
        }
    }

    /// RET — 10T
    pub(crate) fn op_ret<B: Bus + ?Sized>(&mut self, bus: &mut B) {
        self.pc = self.pop16(bus);
        self.tstates += 10;
    }

    /// RET cc — 11T taken, 5T not taken
    pub(crate) fn op_ret_cc<B: Bus + ?Sized>(&mut self, bus: &mut B, cc: u8) {
        if self.condition(cc) {
            self.pc = self.pop16(bus);
            self.tstates += 11;
        } else {
            self.tstates += 5;
        }
    }

    /// RST p — 11T. Target address is y*8 (0x00..0x38).
    pub(crate) fn op_rst<B: Bus + ?Sized>(&mut self, bus: &mut B, y: u8) {
        self.push16(bus, self.pc);
        self.pc = (y as u16) << 3;
        self.tstates += 11;
    }

    /// RETN/RETI — 14T (ED): pop PC and copy IFF2 back to IFF1
    pub(crate) fn op_reti_retn<B: Bus + ?Sized>(&mut self, bus: &mut B) {
        self.iff1 = self.iff2;
        self.pc = self.pop16(bus);
        self.tstates += 14;
    }

    /// HALT — 4T. PC stays on the HALT opcode until an interrupt wakes the
    /// core; each halted step burns 4T without advancing.
    pub(crate) fn op_halt(&mut self) {
        self.halted = true;
        self.pc = self.pc.wrapping_sub(1);
        self.tstates += 4;
    }

    /// DI — 4T: immediate
    pub(crate) fn op_di(&mut self) {
        self.iff1 = false;
        self.iff2 = false;
        self.tstates += 4;
    }

    /// EI — 4T: enables interrupts but defers acceptance for one instruction
    pub(crate) fn op_ei(&mut self) {
        self.iff1 = true;
        self.iff2 = true;
        self.ei_pending = true;
        self.tstates += 4;
    }

    /// IM 0/1/2 — 8T (ED). Opcode bits 4-3: 00/01 -> 0, 10 -> 1, 11 -> 2.
    pub(crate) fn op_im(&mut self, y: u8) {
        self.im = match y & 0x03 {
            0 | 1 => 0,
            2 => 1,
            _ => 2,
        };
        self.tstates += 8;
    }
}

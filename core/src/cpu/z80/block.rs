use crate::core::Bus;
use crate::cpu::z80::Z80;
use crate::cpu::z80::flags::{self, Flag};

// ED block operations, y encoding: bit 0 of y picks the direction
// (4/6 increment, 5/7 decrement), bit 1 picks the repeating form (6/7).

impl Z80 {
    /// LDI/LDD (16T) and LDIR/LDDR (21T per repeat, 16T on the last).
    /// One iteration: (DE) <- (HL), pointers step, BC decrements; the
    /// repeating form rewinds PC by 2 while BC is non-zero.
    pub(crate) fn op_ld_block<B: Bus + ?Sized>(&mut self, bus: &mut B, y: u8) {
        let step = Self::block_step(y);
        let val = bus.read(self.hl);
        bus.write(self.de, val);
        self.hl = self.hl.wrapping_add(step);
        self.de = self.de.wrapping_add(step);
        self.bc = self.bc.wrapping_sub(1);

        // H=0, N=0, PV = (BC != 0); S, Z, C survive
        let keep = Flag::S as u8 | Flag::Z as u8 | Flag::C as u8;
        let mut f = self.f() & keep;
        if self.bc != 0 {
            f |= Flag::PV as u8;
        }
        self.set_f(f);

        if Self::block_repeats(y) && self.bc != 0 {
            self.pc = self.pc.wrapping_sub(2);
            self.tstates += 21;
        } else {
            self.tstates += 16;
        }
    }

    /// CPI/CPD (16T) and CPIR/CPDR (21/16T). Compare A with (HL); the
    /// repeating form stops on a match (Z) or when BC runs out.
    pub(crate) fn op_cp_block<B: Bus + ?Sized>(&mut self, bus: &mut B, y: u8) {
        let step = Self::block_step(y);
        let val = bus.read(self.hl);
        self.hl = self.hl.wrapping_add(step);
        self.bc = self.bc.wrapping_sub(1);

        // Subtract flags without C; PV = (BC != 0), N=1
        let (_, sub_f) = flags::sub8(self.a(), val, 0);
        let mut f = (self.f() & Flag::C as u8)
            | (sub_f & (Flag::S as u8 | Flag::Z as u8 | Flag::H as u8))
            | Flag::N as u8;
        if self.bc != 0 {
            f |= Flag::PV as u8;
        }
        self.set_f(f);

        let found = (f & Flag::Z as u8) != 0;
        if Self::block_repeats(y) && self.bc != 0 && !found {
            self.pc = self.pc.wrapping_sub(2);
            self.tstates += 21;
        } else {
            self.tstates += 16;
        }
    }

    /// INI/IND (16T) and INIR/INDR (21/16T). Port (C) read into (HL) with
    /// B as the loop counter. The port sees BC before B decrements.
    pub(crate) fn op_in_block<B: Bus + ?Sized>(&mut self, bus: &mut B, y: u8) {
        let step = Self::block_step(y);
        let val = bus.io_read(self.bc);
        bus.write(self.hl, val);
        self.hl = self.hl.wrapping_add(step);
        self.set_b(self.b().wrapping_sub(1));
        self.set_block_io_flags();

        if Self::block_repeats(y) && self.b() != 0 {
            self.pc = self.pc.wrapping_sub(2);
            self.tstates += 21;
        } else {
            self.tstates += 16;
        }
    }

    /// OUTI/OUTD (16T) and OTIR/OTDR (21/16T). (HL) written to port (C);
    /// B decrements before the port sees the address.
    pub(crate) fn op_out_block<B: Bus + ?Sized>(&mut self, bus: &mut B, y: u8) {
        let step = Self::block_step(y);
        let val = bus.read(self.hl);
        self.hl = self.hl.wrapping_add(step);
        self.set_b(self.b().wrapping_sub(1));
        bus.io_write(self.bc, val);
        self.set_block_io_flags();

        if Self::block_repeats(y) && self.b() != 0 {
            self.pc = self.pc.wrapping_sub(2);
            self.tstates += 21;
        } else {
            self.tstates += 16;
        }
    }

    /// Z and S track the decremented B; N=1, C preserved.
    fn set_block_io_flags(&mut self) {
        let b = self.b();
        let mut f = (self.f() & Flag::C as u8) | Flag::N as u8;
        if b == 0 {
            f |= Flag::Z as u8;
        }
        f |= b & Flag::S as u8;
        self.set_f(f);
    }

    fn block_step(y: u8) -> u16 {
        if y & 1 != 0 { 0xFFFF } else { 1 }
    }

    fn block_repeats(y: u8) -> bool {
        y & 2 != 0
    }
}

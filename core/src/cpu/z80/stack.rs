use crate::core::Bus;
use crate::cpu::z80::Z80;

impl Z80 {
    /// PUSH rp2 — 11T (rp2: 0=BC, 1=DE, 2=HL/IX/IY, 3=AF)
    pub(crate) fn op_push<B: Bus + ?Sized>(&mut self, bus: &mut B, p: u8) {
        let val = self.rp_af(p);
        self.push16(bus, val);
        self.tstates += 11;
    }

    /// POP rp2 — 10T
    pub(crate) fn op_pop<B: Bus + ?Sized>(&mut self, bus: &mut B, p: u8) {
        let val = self.pop16(bus);
        self.set_rp_af(p, val);
        self.tstates += 10;
    }
}

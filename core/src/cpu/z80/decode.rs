//! Opcode bit-field slicing and table dispatch.
//!
//! An opcode byte splits into x (bits 7-6), y (5-3), z (2-0) and the
//! derived p = y >> 1, q = y & 1. x selects one of four top-level tables;
//! the CB and ED prefix tables decompose the same way. Prefix bytes
//! (CB/ED/DD/FD) are intercepted in `Z80::execute` before these tables run.

use crate::core::Bus;
use crate::cpu::z80::Z80;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Opcode {
    pub x: u8,
    pub y: u8,
    pub z: u8,
    pub p: u8,
    pub q: u8,
}

impl Opcode {
    pub fn split(byte: u8) -> Self {
        let y = (byte >> 3) & 0x07;
        Self {
            x: (byte >> 6) & 0x03,
            y,
            z: byte & 0x07,
            p: y >> 1,
            q: y & 1,
        }
    }
}

impl Z80 {
    /// Unprefixed table.
    pub(crate) fn execute_main<B: Bus + ?Sized>(&mut self, bus: &mut B, byte: u8) {
        let op = Opcode::split(byte);
        match op.x {
            // x=0: relative jumps, 16-bit loads/add, indirect loads,
            // INC/DEC, immediate loads, accumulator rotates and flag ops
            0 => match op.z {
                0 => match op.y {
                    0 => self.tstates += 4,            // NOP — 4T
                    1 => self.op_ex_af_af(),           // EX AF,AF' — 4T
                    2 => self.op_djnz(bus),            // DJNZ d — 13/8T
                    3 => self.op_jr(bus),              // JR d — 12T
                    _ => self.op_jr_cc(bus, op.y - 4), // JR cc,d — 12/7T
                },
                1 => match op.q {
                    0 => self.op_ld_rp_nn(bus, op.p), // LD rp,nn — 10T
                    _ => self.op_add_hl_rp(op.p),     // ADD HL,rp — 11T
                },
                2 => match (op.q, op.p) {
                    (0, 0) => self.op_ld_ind_a(bus, self.bc), // LD (BC),A — 7T
                    (0, 1) => self.op_ld_ind_a(bus, self.de), // LD (DE),A — 7T
                    (0, 2) => self.op_ld_nn_hl(bus),          // LD (nn),HL — 16T
                    (0, _) => self.op_ld_nn_a(bus),           // LD (nn),A — 13T
                    (_, 0) => self.op_ld_a_ind(bus, self.bc), // LD A,(BC) — 7T
                    (_, 1) => self.op_ld_a_ind(bus, self.de), // LD A,(DE) — 7T
                    (_, 2) => self.op_ld_hl_nn(bus),          // LD HL,(nn) — 16T
                    (_, _) => self.op_ld_a_nn(bus),           // LD A,(nn) — 13T
                },
                3 => match op.q {
                    0 => self.op_inc_rp(op.p), // INC rp — 6T
                    _ => self.op_dec_rp(op.p), // DEC rp — 6T
                },
                4 => self.op_inc_r(bus, op.y),  // INC r — 4/11/23T
                5 => self.op_dec_r(bus, op.y),  // DEC r — 4/11/23T
                6 => self.op_ld_r_n(bus, op.y), // LD r,n — 7/10/19T
                _ => match op.y {
                    0 => self.op_rlca(), // 4T
                    1 => self.op_rrca(),
                    2 => self.op_rla(),
                    3 => self.op_rra(),
                    4 => self.op_daa(),
                    5 => self.op_cpl(),
                    6 => self.op_scf(),
                    _ => self.op_ccf(),
                },
            },

            // x=1: LD r,r' except the (HL),(HL) slot, which is HALT
            1 => {
                if op.y == 6 && op.z == 6 {
                    self.op_halt();
                } else {
                    self.op_ld_r_r(bus, op.y, op.z); // 4/7/19T
                }
            }

            // x=2: 8-bit ALU on A, operation from y, operand from z
            2 => self.op_alu_r(bus, op.y, op.z), // 4/7/19T

            // x=3: returns, stack, absolute jumps/calls, I/O, RST
            _ => match op.z {
                0 => self.op_ret_cc(bus, op.y), // RET cc — 11/5T
                1 => match (op.q, op.p) {
                    (0, _) => self.op_pop(bus, op.p), // POP rp2 — 10T
                    (_, 0) => self.op_ret(bus),       // RET — 10T
                    (_, 1) => self.op_exx(),          // EXX — 4T
                    (_, 2) => self.op_jp_hl(),        // JP (HL) — 4T
                    (_, _) => self.op_ld_sp_hl(),     // LD SP,HL — 6T
                },
                2 => self.op_jp_cc_nn(bus, op.y), // JP cc,nn — 10T
                3 => match op.y {
                    0 => self.op_jp_nn(bus),     // JP nn — 10T
                    2 => self.op_out_n_a(bus),   // OUT (n),A — 11T
                    3 => self.op_in_a_n(bus),    // IN A,(n) — 11T
                    4 => self.op_ex_sp_hl(bus),  // EX (SP),HL — 19/23T
                    5 => self.op_ex_de_hl(),     // EX DE,HL — 4T
                    6 => self.op_di(),           // DI — 4T
                    7 => self.op_ei(),           // EI — 4T
                    _ => unreachable!("CB prefix is intercepted before table dispatch"),
                },
                4 => self.op_call_cc_nn(bus, op.y), // CALL cc,nn — 17/10T
                5 => match (op.q, op.p) {
                    (0, _) => self.op_push(bus, op.p), // PUSH rp2 — 11T
                    (_, 0) => self.op_call_nn(bus),    // CALL nn — 17T
                    _ => unreachable!("DD/ED/FD prefixes are intercepted before table dispatch"),
                },
                6 => self.op_alu_n(bus, op.y), // ALU A,n — 7T
                _ => self.op_rst(bus, op.y),   // RST y*8 — 11T
            },
        }
    }

    /// CB prefix table: rotates/shifts (x=0), BIT (x=1), RES (x=2), SET (x=3).
    pub(crate) fn execute_cb<B: Bus + ?Sized>(&mut self, bus: &mut B, byte: u8) {
        let op = Opcode::split(byte);
        match op.x {
            0 => self.op_cb_rot(bus, op.y, op.z), // 8/15T
            1 => self.op_cb_bit(bus, op.y, op.z), // 8/12T
            2 => self.op_cb_res(bus, op.y, op.z), // 8/15T
            _ => self.op_cb_set(bus, op.y, op.z), // 8/15T
        }
    }

    /// ED prefix table. Reserved entries behave as two NOPs: they still
    /// consume 8 T-states and leave PC past the two bytes.
    pub(crate) fn execute_ed<B: Bus + ?Sized>(&mut self, bus: &mut B, byte: u8) {
        let op = Opcode::split(byte);
        match op.x {
            1 => match op.z {
                0 => self.op_in_r_c(bus, op.y),  // IN r,(C) — 12T
                1 => self.op_out_c_r(bus, op.y), // OUT (C),r — 12T
                2 => match op.q {
                    0 => self.op_sbc_hl_rp(op.p), // SBC HL,rp — 15T
                    _ => self.op_adc_hl_rp(op.p), // ADC HL,rp — 15T
                },
                3 => match op.q {
                    0 => self.op_ld_nn_rp(bus, op.p), // LD (nn),rp — 20T
                    _ => self.op_ld_rp_nn_ind(bus, op.p), // LD rp,(nn) — 20T
                },
                4 => self.op_neg(),          // NEG — 8T (all y slots)
                5 => self.op_reti_retn(bus), // RETN/RETI — 14T
                6 => self.op_im(op.y),       // IM 0/1/2 — 8T
                _ => match op.y {
                    0 => self.op_ld_i_a(), // LD I,A — 9T
                    1 => self.op_ld_r_a(), // LD R,A — 9T
                    2 => self.op_ld_a_i(), // LD A,I — 9T
                    3 => self.op_ld_a_r(), // LD A,R — 9T
                    4 => self.op_rrd(bus), // RRD — 18T
                    5 => self.op_rld(bus), // RLD — 18T
                    _ => self.ed_nop(byte),
                },
            },
            2 if op.z <= 3 && op.y >= 4 => match op.z {
                0 => self.op_ld_block(bus, op.y),  // LDI/LDD/LDIR/LDDR — 16/21T
                1 => self.op_cp_block(bus, op.y),  // CPI/CPD/CPIR/CPDR — 16/21T
                2 => self.op_in_block(bus, op.y),  // INI/IND/INIR/INDR — 16/21T
                _ => self.op_out_block(bus, op.y), // OUTI/OUTD/OTIR/OTDR — 16/21T
            },
            _ => self.ed_nop(byte),
        }
    }

    fn ed_nop(&mut self, byte: u8) {
        log::warn!(
            "reserved ED opcode {:#04X} at PC={:#06X}, executing as NOP",
            byte,
            self.pc.wrapping_sub(2)
        );
        self.tstates += 8;
    }

    /// DD CB / FD CB table: the operand address is already computed from
    /// the displacement; non-BIT results are also copied to register z
    /// unless z is the pure memory slot (6).
    pub(crate) fn execute_index_cb<B: Bus + ?Sized>(&mut self, bus: &mut B, byte: u8, addr: u16) {
        let op = Opcode::split(byte);
        match op.x {
            1 => {
                // BIT b,(IX+d) — 20T
                let val = bus.read(addr);
                self.bit_flags(op.y, val);
                self.tstates += 16;
            }
            _ => {
                // Rotate/shift/RES/SET (IX+d) — 23T, with store-back
                let val = bus.read(addr);
                let result = match op.x {
                    0 => self.rot_shift(op.y, val),
                    2 => val & !(1 << op.y),
                    _ => val | (1 << op.y),
                };
                bus.write(addr, result);
                if op.z != 6 {
                    self.set_reg8(op.z, result);
                }
                self.tstates += 19;
            }
        }
    }
}

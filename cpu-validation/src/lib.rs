use std::collections::VecDeque;

use argon_core::core::Bus;
use argon_core::cpu::{Snapshot, Z80State};
use argon_core::cpu::z80::Z80;
use serde::{Deserialize, Serialize};

// --- RecordingBus: flat 64KB memory that logs every access ---

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BusOp {
    Read,
    Write,
    PortRead,
    PortWrite,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BusEvent {
    pub addr: u16,
    pub data: u8,
    pub op: BusOp,
}

pub struct RecordingBus {
    pub memory: Box<[u8; 0x10000]>,
    pub events: Vec<BusEvent>,
    /// Bytes handed out by `io_read`, in order; 0xFF once exhausted.
    pub port_data: VecDeque<u8>,
}

impl RecordingBus {
    pub fn new() -> Self {
        Self {
            memory: Box::new([0; 0x10000]),
            events: Vec::new(),
            port_data: VecDeque::new(),
        }
    }

    pub fn load(&mut self, addr: u16, data: &[u8]) {
        let start = addr as usize;
        self.memory[start..start + data.len()].copy_from_slice(data);
    }

    /// Addresses touched by any memory event, deduplicated and sorted.
    pub fn touched_addresses(&self) -> Vec<u16> {
        let mut addrs: Vec<u16> = self
            .events
            .iter()
            .filter(|e| matches!(e.op, BusOp::Read | BusOp::Write))
            .map(|e| e.addr)
            .collect();
        addrs.sort_unstable();
        addrs.dedup();
        addrs
    }

    pub fn port_writes(&self) -> Vec<(u16, u8)> {
        self.events
            .iter()
            .filter(|e| e.op == BusOp::PortWrite)
            .map(|e| (e.addr, e.data))
            .collect()
    }
}

impl Default for RecordingBus {
    fn default() -> Self {
        Self::new()
    }
}

impl Bus for RecordingBus {
    fn read(&mut self, addr: u16) -> u8 {
        let data = self.memory[addr as usize];
        self.events.push(BusEvent {
            addr,
            data,
            op: BusOp::Read,
        });
        data
    }

    fn write(&mut self, addr: u16, data: u8) {
        self.memory[addr as usize] = data;
        self.events.push(BusEvent {
            addr,
            data,
            op: BusOp::Write,
        });
    }

    fn io_read(&mut self, port: u16) -> u8 {
        let data = self.port_data.pop_front().unwrap_or(0xFF);
        self.events.push(BusEvent {
            addr: port,
            data,
            op: BusOp::PortRead,
        });
        data
    }

    fn io_write(&mut self, port: u16, data: u8) {
        self.events.push(BusEvent {
            addr: port,
            data,
            op: BusOp::PortWrite,
        });
    }
}

// --- JSON test vector types ---

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Z80TestCase {
    pub name: String,
    pub initial: VectorState,
    #[serde(rename = "final")]
    pub final_state: VectorState,
    /// Total T-states the single step must consume.
    pub tstates: u32,
    /// Bytes the ports feed to IN-family instructions, in order.
    #[serde(default)]
    pub port_reads: Vec<u8>,
    /// (port, byte) pairs OUT-family instructions must emit, in order.
    #[serde(default)]
    pub port_writes: Vec<(u16, u8)>,
}

/// Architectural state plus the RAM cells relevant to one test case.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VectorState {
    pub af: u16,
    pub bc: u16,
    pub de: u16,
    pub hl: u16,
    pub af_alt: u16,
    pub bc_alt: u16,
    pub de_alt: u16,
    pub hl_alt: u16,
    pub ix: u16,
    pub iy: u16,
    pub sp: u16,
    pub pc: u16,
    pub i: u8,
    pub r: u8,
    pub iff1: bool,
    pub iff2: bool,
    pub im: u8,
    pub halted: bool,
    pub ram: Vec<(u16, u8)>,
}

impl VectorState {
    pub fn capture(cpu: &Z80, bus: &RecordingBus, addresses: &[u16]) -> Self {
        let ram = addresses
            .iter()
            .map(|&addr| (addr, bus.memory[addr as usize]))
            .collect();
        Self::from_snapshot(&cpu.snapshot(), ram)
    }

    pub fn from_snapshot(state: &Z80State, ram: Vec<(u16, u8)>) -> Self {
        Self {
            af: state.af,
            bc: state.bc,
            de: state.de,
            hl: state.hl,
            af_alt: state.af_alt,
            bc_alt: state.bc_alt,
            de_alt: state.de_alt,
            hl_alt: state.hl_alt,
            ix: state.ix,
            iy: state.iy,
            sp: state.sp,
            pc: state.pc,
            i: state.i,
            r: state.r,
            iff1: state.iff1,
            iff2: state.iff2,
            im: state.im,
            halted: state.halted,
            ram,
        }
    }

    pub fn to_snapshot(&self) -> Z80State {
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

    /// Put this state onto a core and bus.
    pub fn apply(&self, cpu: &mut Z80, bus: &mut RecordingBus) {
        cpu.restore(&self.to_snapshot());
        for &(addr, val) in &self.ram {
            bus.memory[addr as usize] = val;
        }
    }
}

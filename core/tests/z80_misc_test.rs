use argon_core::cpu::{Cpu, Step};
use argon_core::cpu::z80::Z80;

mod common;
use common::TestBus;

fn step(cpu: &mut Z80, bus: &mut TestBus) -> u32 {
    cpu.step(bus).tstates()
}

#[test]
fn test_ex_af_af_twice_is_identity() {
    let mut cpu = Z80::new();
    let mut bus = TestBus::new();
    cpu.af = 0x1234;
    cpu.af_alt = 0xABCD;
    bus.load(0, &[0x08, 0x08]); // EX AF,AF' twice

    let t = step(&mut cpu, &mut bus);
    assert_eq!(t, 4);
    assert_eq!(cpu.af, 0xABCD);
    assert_eq!(cpu.af_alt, 0x1234);

    step(&mut cpu, &mut bus);
    assert_eq!(cpu.af, 0x1234);
    assert_eq!(cpu.af_alt, 0xABCD);
}

#[test]
fn test_exx_twice_is_identity() {
    let mut cpu = Z80::new();
    let mut bus = TestBus::new();
    cpu.bc = 0x1111;
    cpu.de = 0x2222;
    cpu.hl = 0x3333;
    cpu.bc_alt = 0xAAAA;
    cpu.de_alt = 0xBBBB;
    cpu.hl_alt = 0xCCCC;
    cpu.af = 0x9999;
    bus.load(0, &[0xD9, 0xD9]); // EXX twice

    step(&mut cpu, &mut bus);
    assert_eq!(cpu.bc, 0xAAAA);
    assert_eq!(cpu.de, 0xBBBB);
    assert_eq!(cpu.hl, 0xCCCC);
    assert_eq!(cpu.af, 0x9999, "AF is not part of EXX");

    step(&mut cpu, &mut bus);
    assert_eq!(cpu.bc, 0x1111);
    assert_eq!(cpu.de, 0x2222);
    assert_eq!(cpu.hl, 0x3333);
}

#[test]
fn test_ex_de_hl() {
    let mut cpu = Z80::new();
    let mut bus = TestBus::new();
    cpu.de = 0x1234;
    cpu.hl = 0x5678;
    bus.load(0, &[0xEB]); // EX DE,HL

    let t = step(&mut cpu, &mut bus);
    assert_eq!(t, 4);
    assert_eq!(cpu.de, 0x5678);
    assert_eq!(cpu.hl, 0x1234);
}

#[test]
fn test_halt_parks_pc_and_burns_four_t() {
    let mut cpu = Z80::new();
    let mut bus = TestBus::new();
    cpu.iff1 = true;
    bus.load(0, &[0x76]); // HALT

    let t = step(&mut cpu, &mut bus);
    assert_eq!(t, 4);
    assert!(cpu.halted);
    assert!(cpu.is_sleeping());
    assert_eq!(cpu.pc, 0, "PC stays on the HALT opcode");

    for _ in 0..3 {
        let outcome = cpu.step(&mut bus);
        assert_eq!(outcome, Step::Ran(4), "interrupts enabled, so just idling");
        assert_eq!(cpu.pc, 0);
    }
    assert_eq!(cpu.tstates, 16);
}

#[test]
fn test_halt_with_interrupts_disabled_reports_terminal() {
    let mut cpu = Z80::new();
    let mut bus = TestBus::new();
    bus.load(0, &[0xF3, 0x76]); // DI; HALT

    step(&mut cpu, &mut bus);
    step(&mut cpu, &mut bus);
    assert!(cpu.halted);

    let outcome = cpu.step(&mut bus);
    assert_eq!(outcome, Step::Halted(4), "nothing but NMI or reset can resume");
}

#[test]
fn test_in_a_n_port_addressing() {
    let mut cpu = Z80::new();
    let mut bus = TestBus::new();
    cpu.set_a(0x12);
    bus.in_data.push_back(0x5C);
    bus.load(0, &[0xDB, 0x34]); // IN A,(0x34)

    let t = step(&mut cpu, &mut bus);
    assert_eq!(t, 11);
    assert_eq!(cpu.a(), 0x5C);
    assert_eq!(bus.in_log, vec![0x1234], "A rides the high byte of the port");
}

#[test]
fn test_out_n_a() {
    let mut cpu = Z80::new();
    let mut bus = TestBus::new();
    cpu.set_a(0x7F);
    bus.load(0, &[0xD3, 0x55]); // OUT (0x55),A

    let t = step(&mut cpu, &mut bus);
    assert_eq!(t, 11);
    assert_eq!(bus.out_log, vec![(0x7F55, 0x7F)]);
}

#[test]
fn test_open_bus_port_reads_ff() {
    let mut cpu = Z80::new();
    let mut bus = TestBus::new();
    bus.load(0, &[0xDB, 0x00]); // IN A,(0) with nothing scripted

    step(&mut cpu, &mut bus);
    assert_eq!(cpu.a(), 0xFF);
}

#[test]
fn test_r_counts_m1_cycles_with_sticky_bit7() {
    let mut cpu = Z80::new();
    let mut bus = TestBus::new();
    cpu.r = 0x80;
    bus.load(0, &[0x00, 0x00, 0xCB, 0x00]); // NOP; NOP; RLC B

    step(&mut cpu, &mut bus);
    step(&mut cpu, &mut bus);
    assert_eq!(cpu.r, 0x82);

    step(&mut cpu, &mut bus);
    assert_eq!(cpu.r, 0x84, "prefix and sub-opcode are both M1 fetches");
}

#[test]
fn test_r_wraps_within_low_seven_bits() {
    let mut cpu = Z80::new();
    let mut bus = TestBus::new();
    cpu.r = 0xFF;
    bus.load(0, &[0x00]); // NOP

    step(&mut cpu, &mut bus);
    assert_eq!(cpu.r, 0x80, "bit 7 sticky, low bits wrap");
}

#[test]
fn test_reset_clears_control_state_only() {
    let mut cpu = Z80::new();
    let mut bus = TestBus::new();
    cpu.bc = 0x1234;
    cpu.sp = 0x8000;
    cpu.i = 0x55;
    cpu.im = 2;
    cpu.iff1 = true;
    cpu.iff2 = true;
    bus.load(0, &[0x76]); // HALT

    step(&mut cpu, &mut bus);
    let elapsed = cpu.tstates;
    cpu.reset();

    assert_eq!(cpu.pc, 0);
    assert_eq!(cpu.i, 0);
    assert_eq!(cpu.r, 0);
    assert_eq!(cpu.im, 0);
    assert!(!cpu.iff1);
    assert!(!cpu.iff2);
    assert!(!cpu.halted);
    assert_eq!(cpu.bc, 0x1234, "general registers survive reset");
    assert_eq!(cpu.sp, 0x8000);
    assert_eq!(cpu.tstates, elapsed, "the clock does not rewind");
}

#[test]
fn test_snapshot_restore_round_trip() {
    use argon_core::cpu::Snapshot;

    let mut cpu = Z80::new();
    let mut bus = TestBus::new();
    bus.load(0, &[0x01, 0x34, 0x12, 0x3E, 0x99]); // LD BC,0x1234; LD A,0x99

    step(&mut cpu, &mut bus);
    step(&mut cpu, &mut bus);
    let state = cpu.snapshot();

    let mut other = Z80::new();
    other.restore(&state);
    assert_eq!(other.bc, 0x1234);
    assert_eq!(other.a(), 0x99);
    assert_eq!(other.pc, cpu.pc);
    assert_eq!(other.snapshot(), state);
}

#[test]
fn test_new_core_is_zeroed() {
    let cpu = Z80::new();
    assert_eq!(cpu.af, 0);
    assert_eq!(cpu.bc, 0);
    assert_eq!(cpu.pc, 0);
    assert_eq!(cpu.sp, 0);
    assert_eq!(cpu.tstates, 0);
    assert!(!cpu.iff1);
    assert!(!cpu.halted);
}

use argon_core::cpu::z80::{Flag, Z80};

mod common;
use common::TestBus;

fn step(cpu: &mut Z80, bus: &mut TestBus) -> u32 {
    cpu.step(bus).tstates()
}

#[test]
fn test_nop() {
    let mut cpu = Z80::new();
    let mut bus = TestBus::new();
    cpu.set_f(0xA5);
    bus.load(0, &[0x00]); // NOP

    let t = step(&mut cpu, &mut bus);
    assert_eq!(t, 4);
    assert_eq!(cpu.pc, 1);
    assert_eq!(cpu.tstates, 4);
    assert_eq!(cpu.f(), 0xA5, "NOP must not touch flags");
}

#[test]
fn test_adc_a_b_with_carry_in() {
    let mut cpu = Z80::new();
    let mut bus = TestBus::new();
    cpu.set_a(0x12);
    cpu.set_b(0x34);
    cpu.set_f(Flag::C as u8);
    bus.load(0, &[0x88]); // ADC A,B

    let t = step(&mut cpu, &mut bus);
    assert_eq!(t, 4);
    assert_eq!(cpu.a(), 0x47);
    assert!(!cpu.flag(Flag::S));
    assert!(!cpu.flag(Flag::Z));
    assert!(!cpu.flag(Flag::H));
    assert!(!cpu.flag(Flag::PV));
    assert!(!cpu.flag(Flag::N));
    assert!(!cpu.flag(Flag::C));
}

#[test]
fn test_adc_consumes_carry() {
    let mut cpu = Z80::new();
    let mut bus = TestBus::new();
    cpu.set_a(0x50);
    cpu.set_b(0x00);
    cpu.set_f(Flag::C as u8);
    bus.load(0, &[0x88]); // ADC A,B

    step(&mut cpu, &mut bus);
    assert_eq!(cpu.a(), 0x51);
    assert!(!cpu.flag(Flag::C));
    assert!(!cpu.flag(Flag::S));
    assert!(!cpu.flag(Flag::Z));
    assert!(!cpu.flag(Flag::PV));
}

#[test]
fn test_adc_signed_overflow() {
    let mut cpu = Z80::new();
    let mut bus = TestBus::new();
    cpu.set_a(120);
    cpu.set_b(105);
    cpu.set_f(Flag::C as u8);
    bus.load(0, &[0x88]); // ADC A,B

    step(&mut cpu, &mut bus);
    assert_eq!(cpu.a(), 226); // (120 + 105 + 1) & 0xFF
    assert!(cpu.flag(Flag::PV), "positive + positive -> negative overflows");
    assert!(cpu.flag(Flag::S));
}

#[test]
fn test_adc_a_hl_memory_operand() {
    let mut cpu = Z80::new();
    let mut bus = TestBus::new();
    cpu.set_a(0x12);
    cpu.hl = 0x8000;
    cpu.set_f(Flag::C as u8);
    bus.load(0, &[0x8E]); // ADC A,(HL)
    bus.load(0x8000, &[0x34]);

    let t = step(&mut cpu, &mut bus);
    assert_eq!(t, 7, "memory operand costs the extra access");
    assert_eq!(cpu.a(), 0x47);
}

#[test]
fn test_add_hl_bc_half_carry() {
    let mut cpu = Z80::new();
    let mut bus = TestBus::new();
    cpu.hl = 0x0FFF;
    cpu.bc = 0x0001;
    bus.load(0, &[0x09]); // ADD HL,BC

    let t = step(&mut cpu, &mut bus);
    assert_eq!(t, 11);
    assert_eq!(cpu.hl, 0x1000);
    assert!(cpu.flag(Flag::H));
    assert!(!cpu.flag(Flag::C));
    assert!(!cpu.flag(Flag::N));
}

#[test]
fn test_djnz_loops_until_b_zero() {
    let mut cpu = Z80::new();
    let mut bus = TestBus::new();
    cpu.set_b(0x03);
    bus.load(0, &[0x10, 0xFE]); // DJNZ -2

    let t = step(&mut cpu, &mut bus);
    assert_eq!(cpu.b(), 0x02);
    assert_eq!(cpu.pc, 0, "taken branch jumps back onto itself");
    assert_eq!(t, 13);

    let t = step(&mut cpu, &mut bus);
    assert_eq!(cpu.b(), 0x01);
    assert_eq!(t, 13);

    let t = step(&mut cpu, &mut bus);
    assert_eq!(cpu.b(), 0x00);
    assert_eq!(cpu.pc, 2, "fall through once B reaches zero");
    assert_eq!(t, 8);
}

#[test]
fn test_inc_a_at_positive_limit() {
    let mut cpu = Z80::new();
    let mut bus = TestBus::new();
    cpu.set_a(0x7F);
    cpu.set_f(Flag::C as u8);
    bus.load(0, &[0x3C]); // INC A

    step(&mut cpu, &mut bus);
    assert_eq!(cpu.a(), 0x80);
    assert!(cpu.flag(Flag::S));
    assert!(!cpu.flag(Flag::Z));
    assert!(cpu.flag(Flag::H));
    assert!(cpu.flag(Flag::PV));
    assert!(!cpu.flag(Flag::N));
    assert!(cpu.flag(Flag::C), "INC leaves carry alone");
}

#[test]
fn test_add_a_zero_is_inert_on_carry_and_half() {
    for a in [0x00u8, 0x01, 0x7F, 0x80, 0xFF] {
        let mut cpu = Z80::new();
        let mut bus = TestBus::new();
        cpu.set_a(a);
        cpu.set_b(0);
        bus.load(0, &[0x80]); // ADD A,B

        step(&mut cpu, &mut bus);
        assert_eq!(cpu.a(), a);
        assert_eq!(cpu.flag(Flag::Z), a == 0);
        assert!(!cpu.flag(Flag::C));
        assert!(!cpu.flag(Flag::H));
    }
}

#[test]
fn test_tstates_accumulate_across_instructions() {
    let mut cpu = Z80::new();
    let mut bus = TestBus::new();
    bus.load(0, &[0x00, 0x3C, 0x06, 0x12]); // NOP; INC A; LD B,0x12

    let mut total = 0;
    for _ in 0..3 {
        total += step(&mut cpu, &mut bus);
    }
    assert_eq!(total, 4 + 4 + 7);
    assert_eq!(cpu.tstates, total as u64);
    assert_eq!(cpu.pc, 4);
}

#[test]
fn test_pair_and_halves_share_storage() {
    let mut cpu = Z80::new();
    cpu.bc = 0x1234;
    assert_eq!(cpu.b(), 0x12);
    assert_eq!(cpu.c(), 0x34);

    cpu.set_b(0xAB);
    assert_eq!(cpu.bc, 0xAB34);
    cpu.set_c(0xCD);
    assert_eq!(cpu.bc, 0xABCD);
    assert_eq!(cpu.bc, ((cpu.b() as u16) << 8) | cpu.c() as u16);
}

//! # Real Opcode Tests

use pretty_assertions::assert_eq;
use rstest::rstest;
use vsim_core::logic::literal::encode_real;
use vsim_core::net::VArray;
use vsim_core::vm::Arg;

use crate::common::builder::program::{Asm, n};
use crate::common::harness::{TestContext, bits, real, uint};

fn push_real(asm: &mut Asm, value: f64) -> &mut Asm {
    let (mant, exp) = encode_real(value);
    asm.op("%pushi/real", &[n(mant), n(u64::from(exp))])
}

/// Applies a binary real opcode to two immediates.
fn binary(op: &str, l: f64, r: f64) -> f64 {
    let mut ctx = TestContext::new();
    let out = ctx.real_var();
    let main = ctx.thread("main");
    let _ = push_real(main, l);
    let _ = push_real(main, r);
    let _ = main.op(op, &[]).op("%store/real", &[Arg::Net(out)]).end();
    let (sim, _) = ctx.run();
    real(&sim, out)
}

#[rstest]
#[case("%add/wr", 1.5, 2.25, 3.75)]
#[case("%sub/wr", 1.5, 2.25, -0.75)]
#[case("%mul/wr", 2.5, 4.0, 10.0)]
#[case("%div/wr", 7.0, 2.0, 3.5)]
#[case("%mod/wr", 7.5, 2.0, 1.5)]
#[case("%pow/wr", 2.0, 10.0, 1024.0)]
#[case("%max/wr", -1.0, 3.0, 3.0)]
#[case("%min/wr", -1.0, 3.0, -1.0)]
fn test_real_binary(#[case] op: &str, #[case] l: f64, #[case] r: f64, #[case] expected: f64) {
    assert_eq!(binary(op, l, r), expected);
}

#[test]
fn test_max_ignores_nan() {
    assert_eq!(binary("%max/wr", f64::NAN, 3.0), 3.0);
    assert_eq!(binary("%min/wr", 2.0, f64::NAN), 2.0);
}

#[test]
fn test_division_by_zero_follows_ieee() {
    assert_eq!(binary("%div/wr", 1.0, 0.0), f64::INFINITY);
    assert!(binary("%div/wr", 0.0, 0.0).is_nan());
}

#[test]
fn test_abs_dup_pop() {
    let mut ctx = TestContext::new();
    let (a, d) = (ctx.real_var(), ctx.real_var());
    let main = ctx.thread("main");
    let _ = push_real(main, -4.5);
    let _ = main.op("%abs/wr", &[]).op("%dup/real", &[]).op("%store/real", &[Arg::Net(a)]);
    let _ = push_real(main, 9.0);
    let _ = main.op("%pop/real", &[n(1)]).op("%store/real", &[Arg::Net(d)]).end();
    let (sim, _) = ctx.run();
    assert_eq!(real(&sim, a), 4.5);
    assert_eq!(real(&sim, d), 4.5);
}

#[rstest]
#[case(1.5, 2.5, "0", "1")]
#[case(2.5, 2.5, "1", "0")]
#[case(3.0, -3.0, "0", "0")]
fn test_real_compare(#[case] l: f64, #[case] r: f64, #[case] eq: &str, #[case] lt: &str) {
    let mut ctx = TestContext::new();
    let (feq, flt) = (ctx.var(1), ctx.var(1));
    let main = ctx.thread("main");
    let _ = push_real(main, l);
    let _ = push_real(main, r);
    let _ = main.op("%cmp/wr", &[]).store_flag(4, feq).store_flag(5, flt).end();
    let (sim, _) = ctx.run();
    assert_eq!(bits(&sim, feq), eq);
    assert_eq!(bits(&sim, flt), lt);
}

#[test]
fn test_load_and_store_real_variable() {
    let mut ctx = TestContext::new();
    let (a, b) = (ctx.real_var(), ctx.real_var());
    let main = ctx.thread("main");
    let _ = push_real(main, 0.125);
    let _ = main
        .op("%store/real", &[Arg::Net(a)])
        .op("%load/real", &[Arg::Net(a)])
        .op("%load/real", &[Arg::Net(a)])
        .op("%add/wr", &[])
        .op("%store/real", &[Arg::Net(b)])
        .end();
    let (sim, _) = ctx.run();
    assert_eq!(real(&sim, b), 0.25);
}

#[rstest]
#[case(5.5, 8, "00000110")]
#[case(-2.0, 4, "1110")]
#[case(3.4, 4, "0011")]
fn test_real_to_vector(#[case] value: f64, #[case] width: u32, #[case] expected: &str) {
    let mut ctx = TestContext::new();
    let out = ctx.var(width);
    let main = ctx.thread("main");
    let _ = push_real(main, value);
    let _ = main.op("%cvt/vr", &[n(u64::from(width))]).store(out, u64::from(width)).end();
    let (sim, _) = ctx.run();
    assert_eq!(bits(&sim, out), expected);
}

#[test]
fn test_vector_to_real() {
    let mut ctx = TestContext::new();
    let (u, s) = (ctx.real_var(), ctx.real_var());
    ctx.thread("main")
        .push_bits("1110")
        .op("%cvt/rv", &[])
        .op("%store/real", &[Arg::Net(u)])
        .push_bits("1110")
        .op("%cvt/rv/s", &[])
        .op("%store/real", &[Arg::Net(s)])
        .end();
    let (sim, _) = ctx.run();
    assert_eq!(real(&sim, u), 14.0);
    assert_eq!(real(&sim, s), -2.0);
}

#[rstest]
#[case("%cvt/sr", 7.4, 7)]
#[case("%cvt/sr", 6.5, 7)]
#[case("%cvt/ur", 2.6, 3)]
#[case("%cvt/sr", -3.0, 0)]
fn test_real_to_index_register(#[case] op: &str, #[case] value: f64, #[case] delay: u64) {
    // The register is observed through `%delayx`, which treats negative values as zero.
    let mut ctx = TestContext::new();
    let site = ctx.finish_site();
    let main = ctx.thread("main");
    let _ = push_real(main, value);
    let _ = main.op(op, &[n(1)]).op("%delayx", &[n(1)]).call(site).end();
    let (sim, _) = ctx.run();
    assert_eq!(sim.now().0, delay);
}

#[test]
fn test_real_array() {
    let mut ctx = TestContext::new();
    let mem = ctx.network.add_array(VArray::real(2));
    let (hit, miss, neg) = (ctx.real_var(), ctx.real_var(), ctx.real_var());
    let main = ctx.thread("main");
    let _ = push_real(main, 6.25);
    let _ = main
        .ix_load(2, 1)
        .op("%store/reala", &[Arg::Array(mem), n(2)])
        .op("%load/ar", &[Arg::Array(mem), n(2)])
        .op("%store/real", &[Arg::Net(hit)])
        .ix_load(2, 9)
        .op("%load/ar", &[Arg::Array(mem), n(2)])
        .op("%store/real", &[Arg::Net(miss)])
        .ix_load(2, u64::MAX)
        .op("%load/ar", &[Arg::Array(mem), n(2)])
        .op("%store/real", &[Arg::Net(neg)])
        .end();
    let (sim, _) = ctx.run();
    assert_eq!(real(&sim, hit), 6.25);
    assert_eq!(real(&sim, miss), 0.0);
    assert_eq!(real(&sim, neg), 0.0);
    assert_eq!(sim.network().array(mem).get_real(1), 6.25);
}

#[test]
fn test_real_round_trip_through_vector() {
    let mut ctx = TestContext::new();
    let out = ctx.var(16);
    let main = ctx.thread("main");
    let _ = push_real(main, 1234.0);
    let _ = main.op("%cvt/vr", &[n(16)]).store(out, 16).end();
    let (sim, _) = ctx.run();
    assert_eq!(uint(&sim, out), 1234);
}

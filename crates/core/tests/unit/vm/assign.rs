//! # Assignment Opcode Tests
//!
//! Non-blocking assignments scheduled from code, procedural continuous assignment and force
//! with their release paths.

use pretty_assertions::assert_eq;
use vsim_core::vm::Arg;

use crate::common::builder::program::n;
use crate::common::harness::{TestContext, bits, uint};

#[test]
fn test_nonblocking_assign_lands_after_the_thread() {
    let mut ctx = TestContext::new();
    let (x, before) = (ctx.var(1), ctx.var(1));
    ctx.thread("main")
        .push(1, 1)
        .op("%assign/vec4", &[Arg::Net(x), n(0)])
        .load(x)
        .store(before, 1)
        .end();
    let (sim, _) = ctx.run();
    assert_eq!(bits(&sim, before), "x");
    assert_eq!(bits(&sim, x), "1");
    assert_eq!(sim.stats().assignments, 1);
    assert_eq!(sim.now().0, 0);
}

#[test]
fn test_nonblocking_assign_with_delay() {
    let mut ctx = TestContext::new();
    let x = ctx.var(4);
    ctx.thread("main").push(6, 4).op("%assign/vec4", &[Arg::Net(x), n(5)]).end();
    let (sim, _) = ctx.run();
    assert_eq!(uint(&sim, x), 6);
    assert_eq!(sim.now().0, 5);
}

#[test]
fn test_nonblocking_assign_delay_from_register() {
    let mut ctx = TestContext::new();
    let x = ctx.var(4);
    ctx.thread("main").ix_load(1, 3).push(2, 4).op("%assign/vec4/d", &[Arg::Net(x), n(1)]).end();
    let (sim, _) = ctx.run();
    assert_eq!(uint(&sim, x), 2);
    assert_eq!(sim.now().0, 3);
}

#[test]
fn test_last_nonblocking_assign_wins() {
    let mut ctx = TestContext::new();
    let x = ctx.var(4);
    ctx.thread("main")
        .push(1, 4)
        .op("%assign/vec4", &[Arg::Net(x), n(0)])
        .push(2, 4)
        .op("%assign/vec4", &[Arg::Net(x), n(0)])
        .end();
    let (sim, _) = ctx.run();
    assert_eq!(uint(&sim, x), 2);
    assert_eq!(sim.stats().assignments, 2);
}

#[test]
fn test_nonblocking_part_assign() {
    let mut ctx = TestContext::new();
    let x = ctx.var(4);
    ctx.thread("main")
        .push(0, 4)
        .store(x, 4)
        .push_bits("11")
        .ix_load(1, 1)
        .ix_load(2, 0)
        .op("%assign/vec4/off/d", &[Arg::Net(x), n(1), n(2)])
        .end();
    let (sim, _) = ctx.run();
    assert_eq!(bits(&sim, x), "0110");
}

#[test]
fn test_nonblocking_part_assign_with_undefined_offset_is_skipped() {
    let mut ctx = TestContext::new();
    let x = ctx.var(4);
    ctx.thread("main")
        .push(0, 4)
        .store(x, 4)
        .push_bits("z")
        .op("%ix/vec4", &[n(1)])
        .push_bits("11")
        .op("%assign/vec4/off/d", &[Arg::Net(x), n(1), n(2)])
        .end();
    let (sim, _) = ctx.run();
    assert_eq!(bits(&sim, x), "0000");
    assert_eq!(sim.stats().assignments, 0);
}

#[test]
fn test_continuous_assign_masks_writes_until_deassigned() {
    let mut ctx = TestContext::new();
    let (x, held) = (ctx.var(4), ctx.var(4));
    ctx.thread("main")
        .push(5, 4)
        .store(x, 4)
        .push(9, 4)
        .op("%cassign/vec4", &[Arg::Net(x)])
        .push(3, 4)
        .store(x, 4)
        .load(x)
        .store(held, 4)
        .op("%deassign", &[Arg::Net(x), n(0), n(4)])
        .push(2, 4)
        .store(x, 4)
        .end();
    let (sim, _) = ctx.run();
    assert_eq!(uint(&sim, held), 9);
    assert_eq!(uint(&sim, x), 2);
}

#[test]
fn test_continuous_assign_link_follows_source() {
    let mut ctx = TestContext::new();
    let (src, dst, first) = (ctx.var(4), ctx.var(4), ctx.var(4));
    ctx.thread("main")
        .push(3, 4)
        .store(src, 4)
        .op("%cassign/link", &[Arg::Net(dst), Arg::Net(src)])
        .load(dst)
        .store(first, 4)
        .push(7, 4)
        .store(src, 4)
        .end();
    let (sim, _) = ctx.run();
    assert_eq!(uint(&sim, first), 3);
    assert_eq!(uint(&sim, dst), 7);
}

#[test]
fn test_force_and_release_variable() {
    let mut ctx = TestContext::new();
    let (v, forced, released) = (ctx.var(4), ctx.var(4), ctx.var(4));
    ctx.thread("main")
        .push(5, 4)
        .store(v, 4)
        .push(10, 4)
        .op("%force/vec4", &[Arg::Net(v)])
        .push(3, 4)
        .store(v, 4)
        .load(v)
        .store(forced, 4)
        .op("%release/reg", &[Arg::Net(v), n(0), n(4)])
        .load(v)
        .store(released, 4)
        .push(6, 4)
        .store(v, 4)
        .end();
    let (sim, _) = ctx.run();
    assert_eq!(uint(&sim, forced), 10);
    assert_eq!(uint(&sim, released), 10);
    assert_eq!(uint(&sim, v), 6);
}

#[test]
fn test_force_link_until_release() {
    let mut ctx = TestContext::new();
    let (src, dst, tracked) = (ctx.var(4), ctx.var(4), ctx.var(4));
    ctx.thread("main")
        .push(3, 4)
        .store(src, 4)
        .op("%force/link", &[Arg::Net(dst), Arg::Net(src)])
        .push(7, 4)
        .store(src, 4)
        .load(dst)
        .store(tracked, 4)
        .op("%release/reg", &[Arg::Net(dst), n(0), n(4)])
        .push(1, 4)
        .store(src, 4)
        .end();
    let (sim, _) = ctx.run();
    assert_eq!(uint(&sim, tracked), 7);
    assert_eq!(uint(&sim, dst), 7);
    assert_eq!(uint(&sim, src), 1);
}

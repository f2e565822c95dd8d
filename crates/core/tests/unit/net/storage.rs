//! # Array and Filter Tests

use pretty_assertions::assert_eq;
use vsim_core::logic::Vec4;
use vsim_core::net::{Filter, FilterResult, VArray, Value};
use vsim_core::sched::PartSelect;

use crate::common::harness::vec;

#[test]
fn test_vector_array_defaults_and_bounds() {
    let mut arr = VArray::vec4(4, 2);
    assert_eq!(arr.len(), 2);
    assert_eq!(arr.width(), 4);
    assert_eq!(arr.get_vec4(0), Vec4::xs(4));
    assert_eq!(arr.get_vec4(9), Vec4::xs(4));

    assert!(arr.set_vec4(1, 0, &vec("1010")));
    assert!(!arr.set_vec4(2, 0, &vec("1010")));
    assert_eq!(arr.get_vec4(1).to_string(), "1010");

    assert!(arr.set_vec4(0, 2, &vec("01")));
    assert_eq!(arr.get_vec4(0).to_string(), "01xx");
}

#[test]
fn test_real_and_string_arrays() {
    let mut reals = VArray::real(1);
    assert!(reals.set_real(0, 2.5));
    assert!(!reals.set_real(1, 1.0));
    assert_eq!(reals.get_real(0), 2.5);
    assert_eq!(reals.get_real(7), 0.0);

    let mut strings = VArray::string(1);
    assert!(strings.set_str(0, "abc".to_owned()));
    assert_eq!(strings.get_str(0), "abc");
    assert_eq!(strings.get_str(3), "");
    assert!(!strings.set_vec4(0, 0, &vec("1")));
}

#[test]
fn test_filter_full_force_stops_values() {
    let mut filter = Filter::default();
    assert_eq!(filter.apply(&Value::Vec4(vec("00"))), FilterResult::Prop);

    filter.force(&Value::Vec4(vec("11")), None);
    assert!(filter.is_fully_forced());
    assert_eq!(filter.apply(&Value::Vec4(vec("00"))), FilterResult::Stop);
    assert_eq!(filter.filtered(&Value::Vec4(vec("00"))), Value::Vec4(vec("11")));
}

#[test]
fn test_filter_partial_force_replaces() {
    let mut filter = Filter::default();
    filter.force(&Value::Vec4(vec("1")), Some(PartSelect { base: 3, vwid: 4 }));
    assert!(filter.is_forced());
    assert!(!filter.is_fully_forced());
    assert_eq!(filter.apply(&Value::Vec4(vec("0000"))), FilterResult::Repl(Value::Vec4(vec("1000"))));

    assert_eq!(filter.apply_part(&vec("00"), PartSelect { base: 0, vwid: 4 }), FilterResult::Prop);
    assert_eq!(filter.apply_part(&vec("0"), PartSelect { base: 3, vwid: 4 }), FilterResult::Stop);
    assert_eq!(
        filter.apply_part(&vec("00"), PartSelect { base: 2, vwid: 4 }),
        FilterResult::Repl(Value::Vec4(vec("10")))
    );
}

#[test]
fn test_filter_release() {
    let mut filter = Filter::default();
    filter.force(&Value::Vec4(vec("11")), None);
    assert!(!filter.release(0, 1));
    assert_eq!(filter.filtered(&Value::Vec4(vec("00"))), Value::Vec4(vec("10")));
    assert!(filter.release(1, 1));
    assert!(filter.force_value().is_none());
}

#[test]
fn test_filter_scalar_kinds() {
    let mut filter = Filter::default();
    filter.force(&Value::Real(3.0), None);
    assert_eq!(filter.filtered(&Value::Real(1.0)), Value::Real(3.0));
    assert!(filter.release(0, 1));
    assert_eq!(filter.filtered(&Value::Real(1.0)), Value::Real(1.0));
}

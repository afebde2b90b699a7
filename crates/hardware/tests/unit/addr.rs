//! Line Address Arithmetic Tests.

use berti_core::common::LineAddr;

#[test]
fn byte_address_round_trips_to_line_start() {
    let line = LineAddr::from_byte(0x1234, 6);
    assert_eq!(line.val(), 0x48);
    assert_eq!(line.to_byte(6), 0x1200);
}

#[test]
fn delta_is_signed_line_distance() {
    assert_eq!(LineAddr(105).delta_from(LineAddr(100)), 5);
    assert_eq!(LineAddr(100).delta_from(LineAddr(105)), -5);
    assert_eq!(LineAddr(7).delta_from(LineAddr(7)), 0);
}

#[test]
fn offset_applies_negative_delta() {
    assert_eq!(LineAddr(100).offset(-3), LineAddr(97));
    assert_eq!(LineAddr(100).offset(5), LineAddr(105));
}

#[test]
fn offset_wraps_at_address_space_edge() {
    assert_eq!(LineAddr(0).offset(-1), LineAddr(u64::MAX));
    assert_eq!(LineAddr(u64::MAX).offset(1), LineAddr(0));
}

#[test]
fn offset_undoes_delta() {
    let base = LineAddr(0x40_0000);
    let target = LineAddr(0x3F_FFF0);
    assert_eq!(base.offset(target.delta_from(base)), target);
}

#[test]
fn display_is_raw_line_index() {
    assert_eq!(LineAddr(42).to_string(), "42");
}

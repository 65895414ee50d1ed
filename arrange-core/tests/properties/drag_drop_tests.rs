//! Property-based tests for drop position classification
//!
//! The indicator must always agree with the classified band, and the
//! classification must be total over the row.

use arrange_core::drag_drop::{indicator_y, row_at};
use arrange_core::{DropPosition, DropZones, NodeKind, classify_drop_position};
use proptest::prelude::*;

fn kind_strategy() -> impl Strategy<Value = NodeKind> {
    prop_oneof![Just(NodeKind::Container), Just(NodeKind::Leaf)]
}

/// Valid zone configurations
fn zones_strategy() -> impl Strategy<Value = DropZones> {
    (0.0..0.49f64, 0.0..1.0f64, 0.0..1.0f64).prop_map(|(edge, a, b)| DropZones {
        container_edge: edge,
        leaf_before: a.min(b),
        leaf_after: a.max(b),
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Generated zones always pass validation
    #[test]
    fn prop_generated_zones_validate(zones in zones_strategy()) {
        prop_assert!(zones.validate().is_ok());
    }

    /// Classification follows the band order top to bottom
    #[test]
    fn prop_bands_are_monotonic(
        row_height in 8.0..96.0f64,
        a in 0.0..1.0f64,
        b in 0.0..1.0f64,
        kind in kind_strategy(),
        zones in zones_strategy(),
    ) {
        let rank = |p: DropPosition| match p {
            DropPosition::Before => 0,
            DropPosition::Inside => 1,
            DropPosition::After => 2,
        };
        let (upper, lower) = (a.min(b) * row_height, a.max(b) * row_height);
        let top = classify_drop_position(upper, row_height, kind, &zones);
        let bottom = classify_drop_position(lower, row_height, kind, &zones);
        prop_assert!(
            rank(top) <= rank(bottom),
            "{:?} at {} should not come after {:?} at {}",
            top, upper, bottom, lower
        );
    }

    /// The very top of a row is never After, the very bottom never Before
    #[test]
    fn prop_row_edges(
        row_height in 8.0..96.0f64,
        kind in kind_strategy(),
    ) {
        let zones = DropZones::default();
        prop_assert_eq!(
            classify_drop_position(0.0, row_height, kind, &zones),
            DropPosition::Before
        );
        prop_assert_eq!(
            classify_drop_position(row_height, row_height, kind, &zones),
            DropPosition::After
        );
    }

    /// A degenerate row height always classifies as After
    #[test]
    fn prop_degenerate_height_is_after(
        y in -100.0..100.0f64,
        row_height in prop_oneof![Just(0.0), Just(-1.0), Just(f64::NAN), Just(f64::INFINITY)],
        kind in kind_strategy(),
    ) {
        prop_assert_eq!(
            classify_drop_position(y, row_height, kind, &DropZones::default()),
            DropPosition::After
        );
    }

    /// Indicator lines sit on the row's top or bottom edge; Inside has none
    #[test]
    fn prop_indicator_on_row_edge(
        row_index in 0u32..500,
        row_height in 8.0..96.0f64,
    ) {
        let top = f64::from(row_index) * row_height;
        let bottom = (f64::from(row_index) + 1.0) * row_height;
        prop_assert_eq!(indicator_y(row_index, DropPosition::Before, row_height), Some(top));
        prop_assert_eq!(indicator_y(row_index, DropPosition::After, row_height), Some(bottom));
        // One row apart, up to rounding
        prop_assert!((bottom - top - row_height).abs() <= bottom * 1e-12);
        prop_assert_eq!(indicator_y(row_index, DropPosition::Inside, row_height), None);
    }

    /// row_at inverts the row layout
    #[test]
    fn prop_row_at_finds_containing_row(
        row_index in 0u32..500,
        frac in 0.01..0.99f64,
        row_height in 8.0..96.0f64,
    ) {
        let y = (f64::from(row_index) + frac) * row_height;
        let (found, offset) = row_at(y, row_height).unwrap();
        prop_assert_eq!(found, row_index);
        prop_assert!(offset >= 0.0 && offset < row_height);
    }
}

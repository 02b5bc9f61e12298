use proptest::prelude::*;
use spacerkit_core::{
    data::{fallback_depths, FALLBACK_BREAKTHROUGH},
    DepthSource, DepthTable, GenerationError, LatheId, OpSide, PCodeTable, PartSpecBuilder,
    SpacerType, ThicknessKey,
};

#[test]
fn test_table_hit_and_fallback() {
    let table = DepthTable::standard();

    let key: ThicknessKey = "1.50".parse().unwrap();
    let (depths, source) = table.lookup(key.key(), Some(key.inches())).unwrap();
    assert_eq!(source, DepthSource::Table);
    assert!(depths.drill < depths.profile);

    let (depths, source) = table.lookup("1.37", Some(1.37)).unwrap();
    assert_eq!(source, DepthSource::Fallback);
    assert!((depths.drill + 1.52).abs() < 1e-9);
    assert!((depths.profile + 1.37 * 0.525).abs() < 1e-9);
}

#[test]
fn test_depth_miss_without_thickness() {
    let err = DepthTable::standard().lookup("BOGUS", None).unwrap_err();
    assert!(err.is_lookup_miss());
}

#[test]
fn test_fallback_bands() {
    assert_eq!(fallback_depths(0.6, FALLBACK_BREAKTHROUGH).profile, -0.10);
    assert!((fallback_depths(0.9, FALLBACK_BREAKTHROUGH).profile + 0.45).abs() < 1e-9);
    assert!((fallback_depths(2.0, FALLBACK_BREAKTHROUGH).profile + 1.05).abs() < 1e-9);
}

#[test]
fn test_pcode_lookup_by_part_thickness() {
    let spec = PartSpecBuilder::new()
        .program_number(50001)
        .round_size(6.0)
        .thickness("15mm")
        .cb_mm(64.1)
        .lathe("L1")
        .spacer_type(SpacerType::Standard)
        .build(&Default::default())
        .unwrap();
    assert_eq!(spec.thickness.key(), "15MM");

    let table = PCodeTable::standard();
    let op1 = table
        .get_pcode(spec.lathe, spec.thickness.key(), OpSide::Op1)
        .unwrap();
    let op2 = table
        .get_pcode(spec.lathe, spec.thickness.key(), OpSide::Op2)
        .unwrap();
    assert_eq!(op2.0, op1.0 + 1);
}

#[test]
fn test_pcode_miss_has_no_fallback() {
    let err = PCodeTable::standard()
        .get_pcode(LatheId::L2, "4.13", OpSide::Op1)
        .unwrap_err();
    assert!(matches!(err, GenerationError::LookupMiss { .. }));
}

proptest! {
    #[test]
    fn prop_fallback_depths_ordered(thickness in 0.01f64..8.0) {
        let depths = fallback_depths(thickness, FALLBACK_BREAKTHROUGH);
        prop_assert!(depths.drill < depths.profile);
        prop_assert!(depths.profile < 0.0);
    }

    #[test]
    fn prop_lookup_is_total_and_idempotent(thickness in 0.01f64..8.0) {
        let key = ThicknessKey::from_inches(thickness);
        let table = DepthTable::standard();
        let first = table.lookup(key.key(), Some(key.inches())).unwrap();
        let second = table.lookup(key.key(), Some(key.inches())).unwrap();
        prop_assert_eq!(first, second);
        prop_assert!(first.0.drill < first.0.profile);
        prop_assert!(first.0.profile < 0.0);
    }
}

use proptest::prelude::*;
use spacerkit_camtools::{bore_diameters, BoringPassCalculator, PassKind};

proptest! {
    #[test]
    fn prop_passes_respect_step_rules(
        target in 2.31f64..6.0,
        drill in -5.0f64..-0.1,
        chamfer in any::<bool>(),
    ) {
        let passes = BoringPassCalculator::default()
            .calculate_passes(target, drill, chamfer)
            .unwrap();
        let diameters = bore_diameters(&passes);

        prop_assert!(diameters[0] <= 2.3);
        prop_assert!((diameters[diameters.len() - 1] - target).abs() < 1e-4);
        for pair in diameters.windows(2) {
            prop_assert!(pair[1] >= pair[0]);
            prop_assert!(pair[1] - pair[0] <= 0.305);
        }
        prop_assert_eq!(passes.last().unwrap().kind, PassKind::Finish);
        prop_assert!(passes.iter().all(|p| p.z <= 0.0));
        prop_assert_eq!(passes.iter().any(|p| p.kind == PassKind::Chamfer), chamfer);
    }

    #[test]
    fn prop_two_zone_is_continuous(
        holder in 2.4f64..4.0,
        extra in 0.05f64..1.5,
        depth in 0.2f64..0.9,
    ) {
        let plan = BoringPassCalculator::default()
            .calculate_two_zone(holder, holder + extra, -1.0, depth, false)
            .unwrap();
        let all: Vec<_> = plan.passes().copied().collect();
        let diameters = bore_diameters(&all);
        for pair in diameters.windows(2) {
            prop_assert!(pair[1] > pair[0]);
            prop_assert!(pair[1] - pair[0] <= 0.305);
        }
    }
}

use spacerkit_core::{GeneratorTuning, PartSpecBuilder, SpacerType};

fn hub_part(spacer_type: SpacerType, ob_mm: f64) -> PartSpecBuilder {
    PartSpecBuilder::new()
        .program_number(12345)
        .round_size(7.0)
        .thickness("1.50")
        .cb_mm(87.1)
        .lathe("L2")
        .spacer_type(spacer_type)
        .hub(ob_mm, 0.5)
}

#[test]
fn test_explicit_thin_lip_kept_for_wide_lip() {
    let tuning = GeneratorTuning::default();
    let spec = hub_part(SpacerType::ThinLip, 93.1).build(&tuning).unwrap();
    let hub = spec.variant.hub().unwrap();
    assert!(hub.outer_bore_mm - 87.1 > tuning.thin_lip_threshold_mm);
    assert_eq!(spec.spacer_type(), SpacerType::ThinLip);
    assert!(spec.title.contains("THIN_LIP"));
}

#[test]
fn test_hub_centric_promoted_only_under_threshold() {
    let tuning = GeneratorTuning::default();
    let wide = hub_part(SpacerType::HubCentric, 93.1).build(&tuning).unwrap();
    assert_eq!(wide.spacer_type(), SpacerType::HubCentric);

    let thin = hub_part(SpacerType::HubCentric, 92.0).build(&tuning).unwrap();
    assert_eq!(thin.spacer_type(), SpacerType::ThinLip);

    let tight = GeneratorTuning {
        thin_lip_threshold_mm: 4.0,
        ..GeneratorTuning::default()
    };
    let spec = hub_part(SpacerType::HubCentric, 92.0).build(&tight).unwrap();
    assert_eq!(spec.spacer_type(), SpacerType::HubCentric);
}

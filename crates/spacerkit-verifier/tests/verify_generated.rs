use spacerkit_camtools::ProgramGenerator;
use spacerkit_core::{GeneratorTuning, PartSpec, PartSpecBuilder, Severity, SpacerType, VerifierTuning};
use spacerkit_verifier::{
    extract_features, verify_program, BorePassStepsValidator, FixPipeline, PartMetadata,
};

fn build(builder: PartSpecBuilder) -> PartSpec {
    builder.build(&GeneratorTuning::default()).unwrap()
}

fn variants() -> Vec<PartSpec> {
    vec![
        build(
            PartSpecBuilder::new()
                .program_number(20001)
                .round_size(6.0)
                .thickness("1.00")
                .cb_mm(66.1)
                .lathe("L1")
                .spacer_type(SpacerType::Standard),
        ),
        build(
            PartSpecBuilder::new()
                .program_number(20002)
                .round_size(7.0)
                .thickness("1.50")
                .cb_mm(87.1)
                .lathe("L2")
                .spacer_type(SpacerType::HubCentric)
                .hub(93.1, 0.5),
        ),
        build(
            PartSpecBuilder::new()
                .program_number(20003)
                .round_size(7.0)
                .thickness("1.50")
                .cb_mm(87.1)
                .lathe("L2")
                .spacer_type(SpacerType::HubCentric)
                .hub(91.0, 0.5),
        ),
        build(
            PartSpecBuilder::new()
                .program_number(20004)
                .round_size(7.0)
                .thickness("1.25")
                .cb_mm(70.0)
                .lathe("L2")
                .spacer_type(SpacerType::Step)
                .counterbore(90.0, 0.5),
        ),
        build(
            PartSpecBuilder::new()
                .program_number(20005)
                .round_size(7.5)
                .thickness("1.00")
                .cb_mm(70.0)
                .lathe("L2")
                .spacer_type(SpacerType::SteelRing),
        ),
        build(
            PartSpecBuilder::new()
                .program_number(20006)
                .round_size(9.5)
                .thickness("2.00")
                .cb_mm(100.0)
                .lathe("L3")
                .spacer_type(SpacerType::TwoPieceLug)
                .counterbore(120.0, 0.31),
        ),
        build(
            PartSpecBuilder::new()
                .program_number(20007)
                .round_size(6.0)
                .thickness("15mm")
                .cb_mm(64.1)
                .lathe("L1")
                .spacer_type(SpacerType::TwoPieceStud)
                .hub(70.0, 0.25),
        ),
    ]
}

#[test]
fn test_generated_programs_pass_fix_passes() {
    let generator = ProgramGenerator::default();
    let pipeline = FixPipeline::with_defaults(&VerifierTuning::default());
    for spec in variants() {
        let text = generator.generate(&spec).unwrap();
        let report = pipeline.run(&text);
        assert!(
            report.diagnostics.is_empty(),
            "{}: {:?}",
            spec.spacer_type(),
            report.diagnostics
        );
        assert!(report.fixed_text.is_none());
    }
}

#[test]
fn test_generated_programs_pass_bore_steps() {
    let generator = ProgramGenerator::default();
    let validator = BorePassStepsValidator::default();
    for spec in variants() {
        let text = generator.generate(&spec).unwrap();
        let diags = validator.validate(&text);
        assert!(diags.is_empty(), "{}: {:?}", spec.spacer_type(), diags);
    }
}

#[test]
fn test_generated_programs_are_feasible() {
    let generator = ProgramGenerator::default();
    let tuning = VerifierTuning::default();
    for spec in variants() {
        let text = generator.generate(&spec).unwrap();
        let metadata = PartMetadata::from(&spec);
        let report = verify_program(&text, Some(&metadata), &tuning);
        assert_eq!(
            report.count(Severity::Critical),
            0,
            "{}: {:?}",
            spec.spacer_type(),
            report.diagnostics
        );
        assert!(report.feasibility.as_ref().unwrap().feasible);
        assert_eq!(report.features.program_number, Some(spec.program_number));
    }
}

#[test]
fn test_hub_centric_markers_match_dimensions() {
    let spec = &variants()[1];
    let text = ProgramGenerator::default().generate(spec).unwrap();
    let features = extract_features(&text);

    let cb = features.center_bore.unwrap();
    assert!((cb.diameter - spec.cb_in).abs() < 0.001);
    let ob = features.outer_bore.unwrap();
    assert!((ob.diameter - spec.variant.hub().unwrap().outer_bore_in).abs() < 0.001);

    let report = verify_program(
        &text,
        Some(&PartMetadata::from(spec)),
        &VerifierTuning::default(),
    );
    assert_eq!(report.count(Severity::Warning), 0, "{:?}", report.diagnostics);
}

#[test]
fn test_broken_program_is_fixed() {
    let spec = &variants()[0];
    let text = ProgramGenerator::default().generate(spec).unwrap();
    // drill feed left to inherit the approach rapid
    let plunge = text.replacen("\nG01 Z-", "\nZ-", 1);
    assert_ne!(plunge, text);

    let tuning = VerifierTuning::default();
    let report = verify_program(&plunge, None, &tuning);
    assert!(report.has_critical());
    let fixed = report.fixed_text.expect("fix expected");
    assert!(!verify_program(&fixed, None, &tuning).has_critical());
}

#[test]
fn test_report_serializes() {
    let report = verify_program("G00 X3.0 Z0.2\nZ-0.09\n", None, &VerifierTuning::default());
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["diagnostics"][0]["severity"], "CRITICAL");
    assert_eq!(json["diagnostics"][0]["line"], 2);
}

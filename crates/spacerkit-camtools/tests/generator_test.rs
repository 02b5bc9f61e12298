use spacerkit_camtools::{
    CuttingParams, FeedRates, InMemoryTemplates, Operation, ProgramGenerator, Section,
    SectionKind, SpindleParams, TemplateEntry,
};
use spacerkit_core::{GenerationError, GeneratorTuning, PartSpec, PartSpecBuilder, SpacerType};

fn build(builder: PartSpecBuilder) -> PartSpec {
    builder.build(&GeneratorTuning::default()).unwrap()
}

fn hub_centric() -> PartSpec {
    build(
        PartSpecBuilder::new()
            .program_number(12345)
            .round_size(7.0)
            .thickness("1.50")
            .cb_mm(87.1)
            .lathe("L2")
            .spacer_type(SpacerType::HubCentric)
            .hub(93.1, 0.5),
    )
}

fn all_variants() -> Vec<PartSpec> {
    vec![
        build(
            PartSpecBuilder::new()
                .program_number(10001)
                .round_size(6.0)
                .thickness("1.00")
                .cb_mm(66.1)
                .lathe("L1")
                .spacer_type(SpacerType::Standard),
        ),
        hub_centric(),
        build(
            PartSpecBuilder::new()
                .program_number(10003)
                .round_size(7.0)
                .thickness("1.50")
                .cb_mm(87.1)
                .lathe("L2")
                .spacer_type(SpacerType::HubCentric)
                .hub(91.0, 0.5),
        ),
        build(
            PartSpecBuilder::new()
                .program_number(10004)
                .round_size(7.0)
                .thickness("1.25")
                .cb_mm(70.0)
                .lathe("L2")
                .spacer_type(SpacerType::Step)
                .counterbore(90.0, 0.5),
        ),
        build(
            PartSpecBuilder::new()
                .program_number(10005)
                .round_size(7.5)
                .thickness("1.00")
                .cb_mm(70.0)
                .lathe("L2")
                .spacer_type(SpacerType::SteelRing),
        ),
        build(
            PartSpecBuilder::new()
                .program_number(10006)
                .round_size(9.5)
                .thickness("2.00")
                .cb_mm(100.0)
                .lathe("L3")
                .spacer_type(SpacerType::TwoPieceLug)
                .counterbore(120.0, 0.31),
        ),
        build(
            PartSpecBuilder::new()
                .program_number(10007)
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
fn test_hub_centric_end_to_end() {
    let spec = hub_centric();
    let program = ProgramGenerator::default().build_program(&spec).unwrap();

    let bore = program.section(SectionKind::Op1Bore).unwrap();
    let reached = bore.max_feed_x_below(-0.2).unwrap();
    assert!((reached - spec.cb_in).abs() < 0.001);

    let turn = program.section(SectionKind::Op2Turn).unwrap();
    assert!((turn.deepest_z().unwrap() + 0.5).abs() < 0.001);

    assert_eq!(program.order(), SectionKind::standard_order());
}

#[test]
fn test_hub_centric_text() {
    let text = ProgramGenerator::default().generate(&hub_centric()).unwrap();
    assert!(text.starts_with("%\nO12345 ("));
    assert!(text.ends_with("M30\n%\n"));
    assert!(text.contains("T121 (BORE)"));
    assert!(text.contains("G154 P47"));
    assert!(text.contains("G154 P48"));
    assert!(text.contains("G00 X3.4291 (X IS CB)"));
    assert!(text.contains("(X IS OB)"));
    assert!(text.contains("G01 Z-2.15 F"));
}

#[test]
fn test_every_feed_line_has_feed_word() {
    let generator = ProgramGenerator::default();
    for spec in all_variants() {
        let text = generator.generate(&spec).unwrap();
        for line in text.lines().filter(|l| l.starts_with("G01")) {
            assert!(line.contains(" F"), "{}: {}", spec.spacer_type(), line);
        }
        for line in text.lines().filter(|l| l.starts_with("G154")) {
            assert!(line.starts_with("G154 P"));
        }
    }
}

#[test]
fn test_variant_shapes() {
    let generator = ProgramGenerator::default();
    let specs = all_variants();

    let thin = &specs[2];
    assert_eq!(thin.spacer_type(), SpacerType::ThinLip);
    let program = generator.build_program(thin).unwrap();
    let text = generator.generate(thin).unwrap();
    assert!(text.contains("SHELF CLEANUP"));
    assert!(text.contains("G01 Z-1.28 F"));
    let turn = program.section(SectionKind::Op2Turn).unwrap();
    assert!((turn.deepest_z().unwrap() + 0.5).abs() < 1e-9);
    assert!(text.contains("G01 Z-0.1 F"));

    let steel = generator.build_program(&specs[4]).unwrap();
    assert_eq!(steel.order()[1], SectionKind::Op1Turn);
    assert_eq!(steel.order()[2], SectionKind::Op1Drill);
    let steel_text = generator.generate(&specs[4]).unwrap();
    assert!(steel_text.contains("RING POCKET"));
    assert!(steel_text.contains("Z-0.55"));
    assert!(steel_text.contains("G01 Z-1. F"));

    let step = generator.generate(&specs[3]).unwrap();
    assert!(step.contains("G01 Z-0.5 F"));
    assert!(step.contains("X3.5433"));

    let lug = generator.generate(&specs[5]).unwrap();
    assert!(lug.contains("G01 Z-0.31 F"));

    let stud = generator.build_program(&specs[6]).unwrap();
    let turn = stud.section(SectionKind::Op2Turn).unwrap();
    assert!((turn.deepest_z().unwrap() + 0.25).abs() < 1e-9);
}

/// (x, z) of every feed move that sets Z, X carried modally
fn feed_plunges(section: &Section) -> Vec<(f64, f64)> {
    let mut x = None;
    let mut out = Vec::new();
    for m in section.motions() {
        if m.x.is_some() {
            x = m.x;
        }
        if let (true, Some(cx), Some(z)) = (m.is_feed(), x, m.z) {
            out.push((cx, z));
        }
    }
    out
}

#[test]
fn test_thin_lip_small_cb_keeps_safe_entry() {
    let tuning = GeneratorTuning::default();
    let spec = build(
        PartSpecBuilder::new()
            .program_number(10008)
            .round_size(6.0)
            .thickness("1.00")
            .cb_mm(66.1)
            .lathe("L1")
            .spacer_type(SpacerType::HubCentric)
            .hub(70.0, 0.5),
    );
    assert_eq!(spec.spacer_type(), SpacerType::ThinLip);
    assert!(spec.cb_in - tuning.thin_lip_shelf_inset < tuning.safe_entry_diameter);

    let program = ProgramGenerator::default().build_program(&spec).unwrap();

    let bore = program.section(SectionKind::Op1Bore).unwrap();
    let drill_z = bore.deepest_z().unwrap();
    let op1 = feed_plunges(bore);
    let (entry_x, entry_z) = op1[0];
    assert!((entry_x - tuning.safe_entry_diameter).abs() < 1e-9);
    assert!((entry_z - drill_z).abs() < 1e-9, "entry pass stopped at Z{}", entry_z);

    let full_depth = op1
        .iter()
        .filter(|(_, z)| (z - drill_z).abs() < 1e-9)
        .map(|(x, _)| *x)
        .fold(f64::MIN, f64::max);

    let cleanup = program.section(SectionKind::Op2Chamfer).unwrap();
    let (first_x, _) = feed_plunges(cleanup)[0];
    assert!(
        first_x <= full_depth + tuning.max_step_with_tolerance(),
        "cleanup enters at X{} over a X{} bore",
        first_x,
        full_depth
    );
}

#[test]
fn test_lookup_miss_blocks_generation() {
    let spec = build(
        PartSpecBuilder::new()
            .program_number(20001)
            .round_size(6.0)
            .thickness("3.00")
            .cb_mm(66.1)
            .lathe("L1")
            .spacer_type(SpacerType::Standard),
    );
    let err = ProgramGenerator::default().generate(&spec).unwrap_err();
    assert!(matches!(err, GenerationError::LookupMiss { .. }));
}

#[test]
fn test_bore_out_of_range_blocks_generation() {
    let spec = build(
        PartSpecBuilder::new()
            .program_number(20002)
            .round_size(8.0)
            .thickness("1.00")
            .cb_mm(160.0)
            .lathe("L2")
            .spacer_type(SpacerType::Standard),
    );
    let err = ProgramGenerator::default().generate(&spec).unwrap_err();
    assert!(err.is_invalid_dimension());
}

#[test]
fn test_tampered_spec_is_rejected() {
    let mut spec = hub_centric();
    spec.cb_in = 7.5;
    let err = ProgramGenerator::default().generate(&spec).unwrap_err();
    assert_eq!(
        err,
        GenerationError::InvalidDimension {
            field: "cb_mm".to_string(),
            reason: "center bore 7.5000in must be smaller than round size 7in".to_string(),
        }
    );
}

#[test]
fn test_templates_override_feeds() {
    let params = CuttingParams {
        spindle: SpindleParams {
            max_rpm: 1800,
            rpm: 600,
            css: Some(520),
        },
        feeds: FeedRates {
            rough: 0.011,
            finish: 0.0045,
            chamfer: 0.004,
        },
    };
    let templates = InMemoryTemplates::new(
        vec![TemplateEntry {
            round_size: 7.0,
            cb_mm: 87.1,
            operation: Operation::Bore,
            params,
        }],
        0.5,
    );
    let generator = ProgramGenerator::default().with_templates(Box::new(templates));
    let text = generator.generate(&hub_centric()).unwrap();
    assert!(text.contains("G96 S520 M03"));
    assert!(text.contains("F0.011"));
    assert!(text.contains("F0.0045"));
}

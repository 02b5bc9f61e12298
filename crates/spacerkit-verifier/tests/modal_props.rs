use proptest::prelude::*;
use spacerkit_core::{format_number, Severity, VerifierTuning};
use spacerkit_verifier::{tokenize, verify_program, FixPipeline, ModalStateSimulator};

proptest! {
    #[test]
    fn prop_inherited_plunge_is_critical(
        x in 2.0f64..8.0,
        depth in 0.01f64..3.0,
    ) {
        let x = format_number(x);
        let z = format_number(-depth);
        let tuning = VerifierTuning::default();

        let defect = format!("G00 X{} Z0.2\nZ{}\n", x, z);
        let report = verify_program(&defect, None, &tuning);
        prop_assert_eq!(report.count(Severity::Critical), 1);
        prop_assert_eq!(report.diagnostics[0].line, Some(2));

        let explicit = format!("G00 X{} Z0.2\nG01 Z{}\n", x, z);
        let report = verify_program(&explicit, None, &tuning);
        prop_assert_eq!(report.count(Severity::Critical), 0);
    }

    #[test]
    fn prop_fixes_keep_line_count(text in "[GXZFMT0-9. \\-()\n]{0,200}") {
        let report = FixPipeline::with_defaults(&VerifierTuning::default()).run(&text);
        if let Some(fixed) = report.fixed_text {
            prop_assert_eq!(fixed.lines().count(), text.lines().count());
        }
    }

    #[test]
    fn prop_simulator_is_total(text in "\\PC{0,300}") {
        let lines = tokenize(&text);
        let steps = ModalStateSimulator::new().run(&lines);
        prop_assert_eq!(steps.len(), lines.len());
    }
}

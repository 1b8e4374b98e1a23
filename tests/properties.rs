use laplace_dp::{process, process_line, LaplaceNoise, LineOutcome, NoiseParams, SkippedRecord};
use proptest::prelude::*;

fn params() -> NoiseParams {
    NoiseParams::new(1.0, 0.5).unwrap()
}

proptest! {
    #[test]
    fn output_has_one_line_per_input_line(
        lines in prop::collection::vec("[a-z0-9.,-]{0,12}", 0..40),
        column in 0usize..4,
        seed in any::<u64>(),
    ) {
        let mut noise = LaplaceNoise::from_seed(seed);
        let mut sink: Vec<SkippedRecord> = Vec::new();
        let out = process(&lines, column, ",", &params(), &mut noise, &mut sink).unwrap();

        prop_assert_eq!(out.len(), lines.len());
        for (input, output) in lines.iter().zip(&out) {
            // Untouched fields and field count come from the same input line
            let a: Vec<&str> = input.split(',').collect();
            let b: Vec<&str> = output.split(',').collect();
            prop_assert_eq!(a.len(), b.len());
            for (idx, (x, y)) in a.iter().zip(&b).enumerate() {
                if idx != column {
                    prop_assert_eq!(x, y);
                }
            }
        }
    }

    #[test]
    fn skipped_records_are_byte_identical(
        text in "[a-z ]{0,10}",
        prefix in "[0-9]{1,4}",
    ) {
        let line = format!("{prefix},{text}x");
        let mut zero = |_: &NoiseParams| 0.0;
        let out = process_line(&format!("{line}\n"), 1, ",", &params(), &mut zero);
        let is_pass_through = matches!(out, LineOutcome::PassedThrough { .. });
        prop_assert!(is_pass_through);
        prop_assert_eq!(out.line(), line.as_str());

        let out = process_line(&line, 9, ",", &params(), &mut zero);
        prop_assert_eq!(out.into_line(), line);
    }

    #[test]
    fn zero_noise_preserves_numeric_value(value in -1.0e12f64..1.0e12) {
        let line = format!("{value},tail");
        let mut zero = |_: &NoiseParams| 0.0;
        let out = process_line(&line, 0, ",", &params(), &mut zero);
        prop_assert!(out.is_perturbed());
        let parsed: f64 = out.line().split(',').next().unwrap().parse().unwrap();
        prop_assert_eq!(parsed, value);
    }
}

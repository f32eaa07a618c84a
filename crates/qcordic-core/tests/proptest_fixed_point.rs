use proptest::prelude::*;
use qcordic_core::{decode_bits, decode_word, encode, CordicError, QFormat};

fn formats() -> impl Strategy<Value = QFormat> {
    (0u32..=31)
        .prop_flat_map(|m| (Just(m), 0u32..=(31 - m)))
        .prop_map(|(m, n)| QFormat::new(m, n).unwrap())
}

// Property 1: grid-aligned values survive encode → decode exactly
proptest! {
    #[test]
    fn prop_grid_roundtrip((fmt, frac) in (formats(), 0.0f64..=1.0)) {
        let span = (fmt.max_raw() - fmt.min_raw()) as f64;
        let k = fmt.min_raw() + (frac * span).floor() as i64;
        let value = k as f64 / fmt.scale();

        let word = encode(value, fmt).unwrap();
        prop_assert_eq!(word.raw(), k);
        prop_assert_eq!(decode_word(word.word(), fmt).unwrap(), value);
        prop_assert_eq!(decode_bits(&word.bit_string(), fmt).unwrap(), value);
    }
}

// Property 2: anything strictly outside the range is rejected
proptest! {
    #[test]
    fn prop_range_rejection((fmt, excess) in (formats(), 1e-9f64..1e3)) {
        let above = fmt.max_value() + excess.max(fmt.max_value().abs() * 1e-12);
        let below = fmt.min_value() - excess.max(fmt.min_value().abs() * 1e-12);
        if above > fmt.max_value() {
            let is_range = matches!(encode(above, fmt), Err(CordicError::Range { .. }));
            prop_assert!(is_range);
        }
        if below < fmt.min_value() {
            let is_range = matches!(encode(below, fmt), Err(CordicError::Range { .. }));
            prop_assert!(is_range);
        }
    }
}

// Property 3: off-grid values land on the nearest grid point
proptest! {
    #[test]
    fn prop_nearest_grid_point(value in -3.9f64..3.9) {
        let fmt = QFormat::new(2, 12).unwrap();
        let decoded = encode(value, fmt).unwrap().to_f64();
        prop_assert!((decoded - value).abs() <= fmt.step() / 2.0 + 1e-12);
    }
}

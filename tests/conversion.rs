use mdf_ods::conversion::{Formula, TextFallback, TextRange, ValueRange};
use mdf_ods::{ConversionRule, RawValue, Result};

fn text(value: &str) -> RawValue {
    RawValue::String(value.to_string())
}

fn on_off() -> ConversionRule {
    ConversionRule::TextTable {
        entries: vec![(0.0, "Off".into()), (1.0, "On".into())],
        default: Some(TextFallback::Text("Unknown".into())),
    }
}

#[test]
fn unit_linear_is_identity() {
    let rule = ConversionRule::Linear {
        offset: 0.0,
        factor: 1.0,
    };
    for x in [0.0, -3.5, 1e300, f64::INFINITY] {
        assert_eq!(rule.apply_f64(x), x);
    }
    assert!(rule.apply_f64(f64::NAN).is_nan());
}

#[test]
fn linear_over_indices_is_arithmetic() {
    let rule = ConversionRule::Linear {
        offset: 10.0,
        factor: 0.5,
    };
    let values: Vec<f64> = (0..5).map(|i| rule.apply_f64(i as f64)).collect();
    assert_eq!(values, vec![10.0, 10.5, 11.0, 11.5, 12.0]);
    assert_eq!(
        rule.apply(&RawValue::SignedInteger(-4)),
        RawValue::Float(8.0)
    );
}

#[test]
fn text_table_with_default() {
    let rule = on_off();
    assert_eq!(rule.apply(&RawValue::Float(1.0)), text("On"));
    assert_eq!(rule.apply(&RawValue::UnsignedInteger(0)), text("Off"));
    assert_eq!(rule.apply(&RawValue::Float(2.0)), text("Unknown"));
}

#[test]
fn text_range_table_first_match_wins() {
    let rule = ConversionRule::TextRangeTable {
        ranges: vec![
            TextRange {
                min: 0.0,
                max: 10.0,
                text: "Low".into(),
            },
            TextRange {
                min: 10.0,
                max: 20.0,
                text: "High".into(),
            },
        ],
        default: Some(TextFallback::Text("Out".into())),
    };
    assert_eq!(rule.apply(&RawValue::Float(5.0)), text("Low"));
    assert_eq!(rule.apply(&RawValue::Float(15.0)), text("High"));
    assert_eq!(rule.apply(&RawValue::Float(10.0)), text("Low"));
    assert_eq!(rule.apply(&RawValue::Float(25.0)), text("Out"));
}

#[test]
fn text_default_can_be_a_rule() {
    let rule = ConversionRule::TextTable {
        entries: vec![(255.0, "SNA".into())],
        default: Some(TextFallback::Rule(Box::new(ConversionRule::Linear {
            offset: 0.0,
            factor: 2.0,
        }))),
    };
    assert_eq!(rule.apply(&RawValue::UnsignedInteger(255)), text("SNA"));
    assert_eq!(rule.apply(&RawValue::UnsignedInteger(3)), text("6"));
    assert_eq!(rule.depth(), 2);
}

#[test]
fn value_tables() {
    let interpolated = ConversionRule::ValueTable {
        entries: vec![(0.0, 0.0), (10.0, 100.0)],
        interpolate: true,
    };
    assert_eq!(interpolated.apply_f64(2.5), 25.0);

    let ranges = ConversionRule::ValueRangeTable {
        ranges: vec![ValueRange {
            min: 0.0,
            max: 1.0,
            value: 7.0,
        }],
        default: -1.0,
    };
    assert_eq!(ranges.apply_f64(0.5), 7.0);
    assert_eq!(ranges.apply_f64(3.0), -1.0);
}

#[test]
fn rational_and_algebraic() {
    let rational = ConversionRule::Rational {
        coefficients: [0.0, 2.0, 1.0, 0.0, 0.0, 1.0],
    };
    assert_eq!(rational.apply_f64(3.0), 7.0);

    let formula = Formula::parse("X * 2 + 1").unwrap();
    let algebraic = ConversionRule::Algebraic { formula };
    assert_eq!(algebraic.apply_f64(4.0), 9.0);
}

#[test]
fn strings_pass_through() {
    let rule = on_off();
    assert_eq!(rule.apply(&text("raw")), text("raw"));
    assert_eq!(
        ConversionRule::Identity.apply(&RawValue::ByteArray(vec![1, 2])),
        RawValue::ByteArray(vec![1, 2])
    );
}

#[test]
fn rules_survive_json() -> Result<()> {
    let rule = on_off();
    assert_eq!(ConversionRule::from_json(&rule.to_json()?)?, rule);
    Ok(())
}

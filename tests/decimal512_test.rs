use bytes::BytesMut;
use chwire::prelude::*;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn dec(s: &str) -> Value {
    Value::Decimal(s.parse().unwrap())
}

fn round_trip(schema: &Schema, rows: &[Vec<Value>]) -> Vec<Vec<Value>> {
    let mut buf = BytesMut::new();
    schema.encode_rows(rows, &mut buf).expect("encode batch");
    schema.decode_rows(&buf).expect("decode batch")
}

#[test]
fn test_decimal512_basic() {
    let schema = Schema::parse(
        "
          Col1 Decimal(77, 10)
        , Col2 Decimal(100, 20)
        , Col3 Decimal(154, 30)
        ",
    )
    .unwrap();

    let val1 = dec("123456789012345678901234567890.1234567890");
    let val2 = dec("987654321098765432109876543210.98765432109876543210");
    let val3 = dec("111111111111111111111111111111.111111111111111111111111111111");

    let rows = vec![vec![val1.clone(), val2.clone(), val3.clone()]];
    let mut buf = BytesMut::new();
    schema.encode_rows(&rows, &mut buf).unwrap();
    assert_eq!(buf.len(), 3 * 64);

    let decoded = schema.decode_rows(&buf).unwrap();
    assert_eq!(decoded, rows);
    assert_eq!(
        decoded[0][2].to_string(),
        "111111111111111111111111111111.111111111111111111111111111111"
    );
}

#[test]
fn test_decimal512_negative_and_null() {
    let schema = Schema::parse(
        "Col1 Nullable(Decimal(80, 10)), Col2 Nullable(Decimal(120, 25)), Col3 Nullable(Decimal(154, 40))",
    )
    .unwrap();

    let val1 = dec("-123456789012345678901234567890.1234567890");
    let val2 = dec("-987654321098765432109876543210.98765432109876543210");

    let rows = vec![
        vec![val1.clone(), val2.clone(), Value::Null],
        vec![Value::Null, val2.clone(), val1.clone()],
    ];
    let decoded = round_trip(&schema, &rows);
    assert_eq!(decoded, rows);
    assert!(decoded[0][2].is_null());
    assert!(decoded[1][0].is_null());
    assert!(decoded[1][2].as_decimal().unwrap().is_negative());
}

#[test]
fn test_decimal512_array_order() {
    let schema = Schema::parse("Col1 Array(Decimal(100, 10))").unwrap();
    let values = vec![dec("123.456"), dec("789.012"), dec("-345.678")];
    let decoded = round_trip(&schema, &[vec![Value::Array(values.clone())]]);

    let Value::Array(items) = &decoded[0][0] else {
        panic!("expected an array, got {:?}", decoded[0][0]);
    };
    assert_eq!(items, &values);
    assert_eq!(items[2].to_string(), "-345.6780000000");
}

#[test]
fn test_decimal512_string_input() {
    let schema = Schema::parse("Col1 Decimal(90, 15)").unwrap();
    let literal = "123456789012345678901234567890.123456789012345";
    let decoded = round_trip(&schema, &[vec![Value::from(literal)]]);
    assert_eq!(decoded[0][0].to_string(), literal);
}

#[test]
fn test_154_digit_literal_round_trips_exactly() {
    let integer = format!("{}1234", "1234567890".repeat(10));
    let fraction = "1234567890".repeat(5);
    assert_eq!((integer.len(), fraction.len()), (104, 50));
    let literal = format!("{}.{}", integer, fraction);

    let ty = chwire::parse_type("Decimal(154, 50)").unwrap();
    let codec = CompositeCodec::new();
    let mut buf = BytesMut::new();
    codec.encode(&ty, &Value::from(literal.as_str()), &mut buf).unwrap();
    assert_eq!(buf.len(), 64);

    let decoded = codec.decode(&ty, &mut &buf[..]).unwrap();
    assert_eq!(decoded.to_string(), literal);

    let negative = format!("-{}", literal);
    buf.clear();
    codec.encode(&ty, &Value::from(negative.as_str()), &mut buf).unwrap();
    assert_eq!(codec.decode(&ty, &mut &buf[..]).unwrap().to_string(), negative);
}

#[test]
fn test_width_boundaries() {
    let d76 = resolve(76, 0).unwrap();
    let d77 = resolve(77, 0).unwrap();
    assert_eq!(d76.width(), DecimalWidth::W256);
    assert_eq!(d77.width(), DecimalWidth::W512);
    assert_eq!(resolve(154, 0).unwrap().width(), DecimalWidth::W512);
    assert!(matches!(
        resolve(155, 0),
        Err(WireError::InvalidPrecision { precision: 155, max: 154 })
    ));
    assert!(chwire::parse_type("Decimal(155, 0)").is_err());
}

#[test]
fn test_all_nines_round_trip() {
    let codec = CompositeCodec::new();
    for (p, s) in [(9, 0), (18, 4), (38, 38), (76, 10), (77, 0), (100, 50), (153, 3)] {
        let digits = "9".repeat(p as usize);
        let (int_part, frac_part) = digits.split_at((p - s) as usize);
        let literal = match (int_part.is_empty(), frac_part.is_empty()) {
            (_, true) => int_part.to_string(),
            (true, false) => format!("0.{}", frac_part),
            (false, false) => format!("{}.{}", int_part, frac_part),
        };

        for text in [literal.clone(), format!("-{}", literal)] {
            let ty = chwire::parse_type(&format!("Decimal({}, {})", p, s)).unwrap();
            let mut buf = BytesMut::new();
            codec.encode(&ty, &Value::from(text.as_str()), &mut buf).unwrap();
            let back = codec.decode(&ty, &mut &buf[..]).unwrap();
            assert_eq!(back.to_string(), text, "Decimal({p}, {s})");
        }
    }
}

#[test]
fn test_value_errors_are_reported_not_truncated() {
    let ty = chwire::parse_type("Decimal(80, 2)").unwrap();
    let codec = CompositeCodec::new();
    let mut buf = BytesMut::new();

    let err = codec.encode(&ty, &Value::from("1.005"), &mut buf).unwrap_err();
    assert!(matches!(err, WireError::ScaleMismatch { fractional_digits: 3, scale: 2 }));

    let too_big = "1".repeat(79);
    let err = codec.encode(&ty, &Value::from(too_big.as_str()), &mut buf).unwrap_err();
    assert!(matches!(err, WireError::MagnitudeOverflow { precision: 80, .. }));

    let err = codec.encode(&ty, &Value::from("12,5"), &mut buf).unwrap_err();
    assert!(matches!(err, WireError::MalformedDecimalLiteral(_)));

    assert!(buf.is_empty());
}

#[test]
fn test_decimal512_can_be_disabled() {
    let config = CodecConfig {
        allow_decimal512: false,
        ..CodecConfig::default()
    };
    assert!(Schema::parse_with("a Decimal(76, 2)", &config).is_ok());
    assert!(matches!(
        Schema::parse_with("a Decimal(77, 2)", &config),
        Err(WireError::InvalidPrecision { max: 76, .. })
    ));
}

proptest! {
    #[test]
    fn prop_decimal_round_trip(text in "-?[1-9][0-9]{0,29}\\.[0-9]{10}") {
        let ty = chwire::parse_type("Decimal(60, 10)").unwrap();
        let codec = CompositeCodec::new();
        let mut buf = BytesMut::new();
        codec.encode(&ty, &Value::from(text.as_str()), &mut buf).unwrap();
        prop_assert_eq!(buf.len(), 32);
        let back = codec.decode(&ty, &mut &buf[..]).unwrap();
        prop_assert_eq!(back.to_string(), text);
    }

    #[test]
    fn prop_width_is_minimal((p, s) in (1u32..=154).prop_flat_map(|p| (Just(p), 0..=p))) {
        let spec = resolve(i64::from(p), i64::from(s)).unwrap();
        let expected = match p {
            1..=9 => 32,
            10..=18 => 64,
            19..=38 => 128,
            39..=76 => 256,
            _ => 512,
        };
        prop_assert_eq!(spec.width().bits(), expected);
        prop_assert_eq!(spec.scale(), s);
    }
}

use proptest::prelude::*;
use sexpio::formatting::{CharacterFormatting, EscapingStyle, Formatting, ListFormatting,
                         NumberFormatting, Radix};
use sexpio::settings::WriterSettings;
use sexpio::write::to_string_with;
use sexpio::{Value, parse_all_str, parse_str, to_string};

proptest! {
    #[test]
    fn reader_never_panics(input in "\\PC*") {
        // Ok or Err, never a panic
        let _ = parse_all_str(&input);
    }

    #[test]
    fn reader_never_panics_on_syntax_soup(input in "[()\\[\\]{}#|\\\\\";. a-z0-9xu8tf:]{0,40}") {
        let _ = parse_all_str(&input);
    }
}

fn escaping_overrides() -> Vec<Option<Formatting>> {
    let mut v = vec![None];
    for escaping in [EscapingStyle::XStyle, EscapingStyle::UStyle] {
        v.push(Some(CharacterFormatting {
            ascii_only: Some(true),
            escaping: Some(escaping),
        }.into()));
    }
    v
}

fn assert_roundtrips(v: &Value, over: Option<&Formatting>) -> Result<(), TestCaseError> {
    let s = to_string_with(v, &WriterSettings::default(), over)
        .map_err(|e| TestCaseError::fail(e.to_string()))?;
    let back = parse_str(&s).map_err(|e| TestCaseError::fail(format!("{:?}: {}", s, e)))?;
    prop_assert_eq!(&back, v, "written as {:?}", s);
    Ok(())
}

proptest! {
    #[test]
    fn strings_roundtrip(s in any::<String>()) {
        let v = Value::string(&s);
        for over in escaping_overrides() {
            assert_roundtrips(&v, over.as_ref())?;
        }
    }

    #[test]
    fn symbols_roundtrip(s in any::<String>()) {
        let v = Value::symbol(&s);
        for over in escaping_overrides() {
            assert_roundtrips(&v, over.as_ref())?;
        }
    }

    #[test]
    fn plain_looking_symbols_roundtrip(s in "[a-z0-9+.#`@!?*/<=>_-]{0,8}") {
        assert_roundtrips(&Value::symbol(&s), None)?;
    }

    #[test]
    fn chars_roundtrip(c in any::<char>()) {
        let v = Value::char(c);
        for over in escaping_overrides() {
            assert_roundtrips(&v, over.as_ref())?;
        }
    }

    #[test]
    fn byte_strings_roundtrip(b in proptest::collection::vec(any::<u8>(), 0..40)) {
        let v = Value::bytes(&b);
        assert_roundtrips(&v, None)?;
        let f: Formatting = sexpio::formatting::BytesFormatting {
            byte_string: Some(true),
            ..Default::default()
        }.into();
        assert_roundtrips(&v, Some(&f))?;
    }

    #[test]
    fn integers_roundtrip_in_every_radix(i in any::<i64>()) {
        let v = Value::integer(i);
        for radix in [Radix::Decimal, Radix::PrefixedDecimal, Radix::Hexadecimal,
                      Radix::Octal, Radix::Binary] {
            let f: Formatting = NumberFormatting { radix: Some(radix) }.into();
            assert_roundtrips(&v, Some(&f))?;
        }
    }

    #[test]
    fn reals_roundtrip(x in any::<f64>()) {
        assert_roundtrips(&Value::real(x), None)?;
    }
}

fn arb_atom() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<i64>().prop_map(Value::integer),
        any::<f64>().prop_map(Value::real),
        any::<bool>().prop_map(Value::boolean),
        any::<char>().prop_map(Value::char),
        "\\PC{0,10}".prop_map(|s| Value::string(&s)),
        "\\PC{0,10}".prop_map(|s| Value::symbol(&s)),
        "[a-z]{1,6}".prop_map(|s| Value::type_identifier(&s)),
        proptest::collection::vec(any::<u8>(), 0..10).prop_map(|b| Value::bytes(&b)),
    ]
}

fn arb_value() -> impl Strategy<Value = Value> {
    arb_atom().prop_recursive(4, 64, 8, |inner| {
        prop_oneof![
            proptest::collection::vec(inner.clone(), 0..8).prop_map(Value::list),
            (inner.clone(), inner).prop_map(|(a, d)| Value::cons(a, d)),
        ]
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    #[test]
    fn trees_roundtrip(v in arb_value()) {
        let s = to_string(&v).map_err(|e| TestCaseError::fail(e.to_string()))?;
        let back = parse_str(&s).map_err(|e| TestCaseError::fail(format!("{:?}: {}", s, e)))?;
        prop_assert_eq!(back, v);
    }

    #[test]
    fn broken_lines_read_the_same(v in arb_value(), n in 1usize..4) {
        let f: Formatting = ListFormatting {
            line_elems_count: Some(n),
            ..Default::default()
        }.into();
        if v.is_pair() {
            assert_roundtrips(&v, Some(&f))?;
        }
    }
}

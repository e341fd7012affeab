use payload_core::{decode, decode_slice, decode_with, from_json, DecodeError, Limits, Map, Value};

/// Helper: build an object from pairs.
fn obj(pairs: &[(&str, Value)]) -> Value {
    Value::Object(pairs.iter().cloned().collect::<Map>())
}

/// Helper: decode and expect an `UnrecognizedShape`, returning its path text.
fn unrecognized_path(input: &str) -> String {
    match decode(input) {
        Err(DecodeError::UnrecognizedShape { path, .. }) => path.to_string(),
        other => panic!("expected UnrecognizedShape for {input:?}, got {other:?}"),
    }
}

// ============================================================================
// Scalars and probing order
// ============================================================================

#[test]
fn decode_null() {
    assert_eq!(decode("null").unwrap(), Value::Null);
}

#[test]
fn decode_true_is_bool_not_int() {
    let value = decode("true").unwrap();
    assert_eq!(value, Value::Bool(true));
    assert!(!value.is_int() && !value.is_double() && !value.is_string());
}

#[test]
fn decode_false() {
    assert_eq!(decode("false").unwrap(), Value::Bool(false));
}

#[test]
fn decode_one_is_int() {
    let value = decode("1").unwrap();
    assert_eq!(value, Value::Int(1));
    assert!(!value.is_bool() && !value.is_double());
}

#[test]
fn decode_top_level_integer() {
    assert_eq!(decode("42").unwrap(), Value::Int(42));
}

#[test]
fn decode_negative_integer() {
    assert_eq!(decode("-7").unwrap(), Value::Int(-7));
}

#[test]
fn decode_negative_zero_is_int() {
    assert_eq!(decode("-0").unwrap(), Value::Int(0));
}

#[test]
fn decode_i64_bounds() {
    assert_eq!(decode("9223372036854775807").unwrap(), Value::Int(i64::MAX));
    assert_eq!(decode("-9223372036854775808").unwrap(), Value::Int(i64::MIN));
}

#[test]
fn decode_integer_beyond_i64_is_double() {
    assert_eq!(
        decode("9223372036854775808").unwrap(),
        Value::Double(9223372036854775808.0)
    );
}

#[test]
fn decode_one_point_zero_is_double() {
    assert_eq!(decode("1.0").unwrap(), Value::Double(1.0));
}

#[test]
fn decode_exponent_is_double() {
    assert_eq!(decode("1e2").unwrap(), Value::Double(100.0));
    assert_eq!(decode("2E-3").unwrap(), Value::Double(0.002));
    assert_eq!(decode("-1.5e+1").unwrap(), Value::Double(-15.0));
}

#[test]
fn decode_float() {
    assert_eq!(decode("3.14").unwrap(), Value::Double(3.14));
}

#[test]
fn decode_string() {
    assert_eq!(decode(r#""hello""#).unwrap(), Value::from("hello"));
}

#[test]
fn decode_numeric_looking_string_stays_string() {
    assert_eq!(decode(r#""42""#).unwrap(), Value::from("42"));
    assert_eq!(decode(r#""true""#).unwrap(), Value::from("true"));
    assert_eq!(decode(r#""null""#).unwrap(), Value::from("null"));
}

#[test]
fn decode_string_escapes() {
    assert_eq!(
        decode(r#""a\"b\\c\/d\b\f\n\r\t""#).unwrap(),
        Value::from("a\"b\\c/d\u{8}\u{c}\n\r\t")
    );
}

#[test]
fn decode_unicode_escapes() {
    assert_eq!(decode(r#""caf\u00e9""#).unwrap(), Value::from("café"));
    assert_eq!(decode(r#""\ud83d\ude00""#).unwrap(), Value::from("😀"));
    assert_eq!(decode(r#""\u0041\u00DF""#).unwrap(), Value::from("Aß"));
}

#[test]
fn decode_raw_unicode() {
    assert_eq!(decode("\"你好\"").unwrap(), Value::from("你好"));
}

#[test]
fn decode_surrounding_whitespace() {
    assert_eq!(decode(" \n\t 42 \r\n").unwrap(), Value::Int(42));
}

// ============================================================================
// Composites
// ============================================================================

#[test]
fn decode_empty_array_is_not_null() {
    assert_eq!(decode("[]").unwrap(), Value::Array(vec![]));
}

#[test]
fn decode_empty_object_is_not_null() {
    assert_eq!(decode("{}").unwrap(), Value::Object(Map::new()));
}

#[test]
fn decode_array_preserves_order() {
    assert_eq!(
        decode(r#"[1, "a", null]"#).unwrap(),
        Value::Array(vec![Value::Int(1), Value::from("a"), Value::Null])
    );
}

#[test]
fn decode_object_preserves_insertion_order() {
    let value = decode(r#"{"b":1,"a":2}"#).unwrap();
    let keys: Vec<_> = value.as_object().unwrap().keys().collect();
    assert_eq!(keys, vec!["b", "a"]);
}

#[test]
fn decode_nested() {
    let value = decode(r#"{"user":{"tags":["x",{"deep":[true,1.5]}]},"n":null}"#).unwrap();
    let expected = obj(&[
        (
            "user",
            obj(&[(
                "tags",
                Value::Array(vec![
                    Value::from("x"),
                    obj(&[(
                        "deep",
                        Value::Array(vec![Value::Bool(true), Value::Double(1.5)]),
                    )]),
                ]),
            )]),
        ),
        ("n", Value::Null),
    ]);
    assert_eq!(value, expected);
}

#[test]
fn decode_nested_empty_composites() {
    assert_eq!(
        decode(r#"{"a":[],"b":{},"c":[[],{}]}"#).unwrap(),
        obj(&[
            ("a", Value::Array(vec![])),
            ("b", Value::Object(Map::new())),
            (
                "c",
                Value::Array(vec![Value::Array(vec![]), Value::Object(Map::new())])
            ),
        ])
    );
}

#[test]
fn decode_reserved_word_and_odd_keys() {
    let value = decode(r#"{"":1,"null":2,"true":3,"two words":4,"é":5}"#).unwrap();
    let keys: Vec<_> = value.as_object().unwrap().keys().collect();
    assert_eq!(keys, vec!["", "null", "true", "two words", "é"]);
}

#[test]
fn decode_escaped_key() {
    let value = decode(r#"{"say \"hi\"":1}"#).unwrap();
    assert_eq!(value.get("say \"hi\""), Some(&Value::Int(1)));
}

#[test]
fn duplicate_keys_keep_last_value_at_first_position() {
    let value = decode(r#"{"a":1,"b":2,"a":3}"#).unwrap();
    let pairs: Vec<_> = value.as_object().unwrap().iter().collect();
    assert_eq!(pairs, vec![("a", &Value::Int(3)), ("b", &Value::Int(2))]);
}

#[test]
fn wide_object_decodes_in_linear_time() {
    let n = 100_000;
    let body: Vec<String> = (0..n).map(|i| format!("\"k{i}\":{i}")).collect();
    let text = format!("{{{},\"k0\":-1}}", body.join(","));

    let started = std::time::Instant::now();
    let value = decode(&text).unwrap();
    let elapsed = started.elapsed();

    let map = value.as_object().unwrap();
    assert_eq!(map.len(), n);
    assert_eq!(map.keys().next(), Some("k0"));
    assert_eq!(map.get("k0"), Some(&Value::Int(-1)));
    assert_eq!(map.get("k99999"), Some(&Value::Int(99_999)));
    assert!(
        elapsed < std::time::Duration::from_secs(10),
        "decoding {n} keys took {elapsed:?}"
    );
}

// ============================================================================
// Malformed input
// ============================================================================

#[test]
fn empty_input_is_rejected() {
    assert_eq!(unrecognized_path(""), "$");
    assert_eq!(unrecognized_path("   "), "$");
}

#[test]
fn trailing_content_is_rejected() {
    assert_eq!(unrecognized_path("1 2"), "$");
    assert_eq!(unrecognized_path("{} x"), "$");
}

#[test]
fn malformed_literals_are_rejected() {
    for input in ["tru", "nul", "trueish", "True", "NaN", "Infinity", "undefined"] {
        assert_eq!(unrecognized_path(input), "$", "input {input:?}");
    }
}

#[test]
fn malformed_numbers_are_rejected() {
    for input in ["01", "+1", "1.", ".5", "1e", "-", "1.2.3", "0x10"] {
        assert_eq!(unrecognized_path(input), "$", "input {input:?}");
    }
}

#[test]
fn double_overflow_is_rejected() {
    match decode("1e400") {
        Err(DecodeError::UnrecognizedShape { detail, .. }) => {
            assert!(detail.contains("out of double range"), "detail: {detail}")
        }
        other => panic!("unexpected: {other:?}"),
    }
}

#[test]
fn malformed_strings_are_rejected() {
    for input in [
        r#""unterminated"#,
        "\"raw\nnewline\"",
        r#""bad \x escape""#,
        r#""\u12""#,
        r#""\ud83d alone""#,
        r#""\ude00""#,
    ] {
        assert_eq!(unrecognized_path(input), "$", "input {input:?}");
    }
}

#[test]
fn truncated_nested_object_reports_member_path() {
    assert_eq!(unrecognized_path(r#"{"a":"#), "$.a");
    assert_eq!(unrecognized_path(r#"{"a":{"b":"#), "$.a.b");
}

#[test]
fn truncated_nested_array_reports_slot_path() {
    assert_eq!(unrecognized_path(r#"{"items":[1,2"#), "$.items[2]");
    assert_eq!(unrecognized_path(r#"{"items":[1,"#), "$.items[1]");
}

#[test]
fn bad_value_deep_inside_reports_full_path() {
    assert_eq!(
        unrecognized_path(r#"{"user":{"tags":["ok", nope]}}"#),
        "$.user.tags[1]"
    );
}

#[test]
fn trailing_commas_are_rejected() {
    assert_eq!(unrecognized_path("[1,]"), "$[1]");
    assert_eq!(unrecognized_path(r#"{"a":1,}"#), "$");
}

#[test]
fn missing_colon_is_rejected() {
    assert_eq!(unrecognized_path(r#"{"a" 1}"#), "$");
}

#[test]
fn non_string_key_is_rejected() {
    assert_eq!(unrecognized_path(r#"{"ok":{1:2}}"#), "$.ok");
}

#[test]
fn invalid_utf8_is_rejected() {
    let err = decode_slice(b"\"\xff\"").unwrap_err();
    assert!(matches!(err, DecodeError::UnrecognizedShape { ref path, .. } if path.is_root()));
}

#[test]
fn decode_slice_accepts_utf8_bytes() {
    assert_eq!(
        decode_slice("[\"ü\"]".as_bytes()).unwrap(),
        Value::Array(vec![Value::from("ü")])
    );
}

// ============================================================================
// Depth limit
// ============================================================================

fn nested_arrays(depth: usize) -> String {
    format!("{}{}", "[".repeat(depth), "]".repeat(depth))
}

#[test]
fn depth_within_limit_is_accepted() {
    let limits = Limits::new(4);
    assert!(decode_with(nested_arrays(4).as_bytes(), &limits).is_ok());
    assert!(decode_with(b"7", &Limits::new(0)).is_ok());
}

#[test]
fn depth_beyond_limit_fails_with_path() {
    let err = decode_with(br#"{"a":[[1]]}"#, &Limits::new(2)).unwrap_err();
    match err {
        DecodeError::DepthExceeded { path, max_depth } => {
            assert_eq!(path.to_string(), "$.a[0]");
            assert_eq!(max_depth, 2);
        }
        other => panic!("unexpected: {other:?}"),
    }
}

#[test]
fn very_deep_input_fails_cleanly_with_default_limits() {
    let err = decode(&nested_arrays(100_000)).unwrap_err();
    assert!(matches!(err, DecodeError::DepthExceeded { max_depth: 128, .. }));
}

// ============================================================================
// Already-parsed serde_json input
// ============================================================================

#[test]
fn from_json_probes_numbers() {
    let json: serde_json::Value =
        serde_json::from_str(r#"{"i":1,"d":1.0,"b":true,"s":"1","n":null,"big":18446744073709551615}"#)
            .unwrap();
    let value = from_json(&json).unwrap();
    assert_eq!(value.get("i"), Some(&Value::Int(1)));
    assert_eq!(value.get("d"), Some(&Value::Double(1.0)));
    assert_eq!(value.get("b"), Some(&Value::Bool(true)));
    assert_eq!(value.get("s"), Some(&Value::from("1")));
    assert_eq!(value.get("n"), Some(&Value::Null));
    assert!(value.get("big").unwrap().is_double());
}

#[test]
fn from_json_keeps_parsed_negative_zero_as_double() {
    let json: serde_json::Value = serde_json::from_str("[-0, -0.0]").unwrap();
    let value = from_json(&json).unwrap();
    for item in value.as_array().unwrap() {
        match item {
            Value::Double(f) => assert!(*f == 0.0 && f.is_sign_negative()),
            other => panic!("expected a negative zero double, got {other:?}"),
        }
    }
    assert_eq!(decode("-0").unwrap(), Value::Int(0));
}

#[test]
fn from_json_preserves_member_order() {
    let json: serde_json::Value = serde_json::from_str(r#"{"z":1,"a":2,"m":3}"#).unwrap();
    let value = from_json(&json).unwrap();
    let keys: Vec<_> = value.as_object().unwrap().keys().collect();
    assert_eq!(keys, vec!["z", "a", "m"]);
}

#[test]
fn from_json_matches_text_decoding() {
    let text = r#"{"screen":"cart","items":[{"sku":"A1","qty":2,"price":9.99}],"gift":false}"#;
    let json: serde_json::Value = serde_json::from_str(text).unwrap();
    assert_eq!(from_json(&json).unwrap(), decode(text).unwrap());
}

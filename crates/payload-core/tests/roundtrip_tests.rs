use payload_core::{decode, encode, from_json, Value};

/// Assert that decode → encode reproduces the input byte for byte, and that
/// decoding the output again yields the same tree.
fn assert_roundtrip(json: &str) {
    let value = decode(json).expect("decode failed");
    let encoded = encode(&value).expect("encode failed");
    assert_eq!(
        json, encoded,
        "Roundtrip failed:\n  input:   {json}\n  value:   {value:?}\n  output:  {encoded}"
    );
    assert_eq!(decode(&encoded).expect("re-decode failed"), value);
}

// ============================================================================
// Primitive Roundtrips
// ============================================================================

#[test]
fn roundtrip_null() {
    assert_roundtrip("null");
}

#[test]
fn roundtrip_bools() {
    assert_roundtrip("true");
    assert_roundtrip("false");
}

#[test]
fn roundtrip_integers() {
    assert_roundtrip("0");
    assert_roundtrip("42");
    assert_roundtrip("-7");
    assert_roundtrip("9223372036854775807");
}

#[test]
fn roundtrip_whole_double_stays_double() {
    assert_roundtrip("1.0");
    assert_eq!(decode("1.0").unwrap(), Value::Double(1.0));
}

#[test]
fn roundtrip_doubles() {
    assert_roundtrip("3.14");
    assert_roundtrip("-0.5");
    assert_roundtrip("1e300");
}

#[test]
fn roundtrip_strings() {
    assert_roundtrip(r#""""#);
    assert_roundtrip(r#""hello world""#);
    assert_roundtrip(r#""line\nbreak \"quoted\" back\\slash""#);
    assert_roundtrip("\"naïve 😀\"");
}

// ============================================================================
// Composite Roundtrips
// ============================================================================

#[test]
fn roundtrip_button_click_byte_identical() {
    assert_roundtrip(r#"{"button_id":"checkout","button_text":"Buy Now","screen_name":"cart"}"#);
}

#[test]
fn roundtrip_empty_composites() {
    assert_roundtrip("[]");
    assert_roundtrip("{}");
    assert_roundtrip(r#"{"a":[],"b":{}}"#);
}

#[test]
fn roundtrip_nested_event() {
    assert_roundtrip(
        r#"{"schema":"iglu:com.dating-demo/dating-demo-profile-swipe/jsonschema/1-0-0","data":{"profile_id":"p-17","screen_name":"discover","swipe_direction":"super_like","score":0.75,"rank":3,"flags":[true,false,null]}}"#,
    );
}

#[test]
fn roundtrip_array_of_objects() {
    assert_roundtrip(r#"[{"id":1,"ok":true},{"id":2,"ok":false},{"id":3,"ok":null}]"#);
}

#[test]
fn roundtrip_deep_nesting() {
    assert_roundtrip(r#"{"a":{"b":{"c":{"d":[[[1]]]}}}}"#);
}

// ============================================================================
// Normalizing inputs
// ============================================================================

#[test]
fn whitespace_is_dropped() {
    let value = decode("{ \"a\" : [ 1 , 2 ] }").unwrap();
    assert_eq!(encode(&value).unwrap(), r#"{"a":[1,2]}"#);
}

#[test]
fn negative_zero_integer_normalizes() {
    assert_eq!(encode(&decode("-0").unwrap()).unwrap(), "0");
}

#[test]
fn doubles_normalize_to_shortest_form() {
    assert_eq!(encode(&decode("1.50").unwrap()).unwrap(), "1.5");
    assert_eq!(encode(&decode("1E2").unwrap()).unwrap(), "100.0");
}

#[test]
fn escaped_unicode_is_written_verbatim() {
    let value = decode(r#""caf\u00e9""#).unwrap();
    assert_eq!(encode(&value).unwrap(), "\"café\"");
}

#[test]
fn duplicate_keys_collapse() {
    let value = decode(r#"{"a":1,"b":2,"a":3}"#).unwrap();
    assert_eq!(encode(&value).unwrap(), r#"{"a":3,"b":2}"#);
}

#[test]
fn serde_json_path_agrees_with_text_path() {
    let text = r#"{"count":3,"ratio":1.0,"tags":["x"],"none":null}"#;
    let json: serde_json::Value = serde_json::from_str(text).unwrap();
    assert_eq!(encode(&from_json(&json).unwrap()).unwrap(), text);
}

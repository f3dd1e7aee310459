//! Instruction encoding and account decoding against the Multisynq schema,
//! including the fixed-offset fallback for the synchronizer account.

use borsh::BorshSerialize;
use multisynq_idl_core::decode::{decode_with_schema, LegacySynchronizerLayout};
use multisynq_idl_core::error::InterfaceError;
use multisynq_idl_core::prelude::*;

const POC_IDL: &str = include_str!("fixtures/multisynq_poc.json");

/// Synchronizer as the on-chain program lays it out, minus the scratch space.
#[derive(BorshSerialize)]
struct SynchronizerData {
    owner: [u8; 32],
    location: [u8; 32],
    is_active: bool,
}

#[derive(BorshSerialize)]
struct SessionData {
    id: String,
    synchronizer: [u8; 32],
    is_active: bool,
}

fn poc_schema() -> CanonicalSchema {
    CanonicalSchema::from_json(POC_IDL).unwrap()
}

fn location_bytes(text: &str) -> [u8; 32] {
    let mut buf = [0u8; 32];
    buf[..text.len()].copy_from_slice(text.as_bytes());
    buf
}

fn synchronizer_account(owner: [u8; 32], location: &str, active: bool, scratch: usize) -> Vec<u8> {
    let mut raw = vec![101, 102, 103, 104, 105, 106, 107, 108];
    let body = SynchronizerData { owner, location: location_bytes(location), is_active: active };
    raw.extend(borsh::to_vec(&body).unwrap());
    raw.extend(std::iter::repeat(0u8).take(scratch));
    raw
}

/// Schema whose Synchronizer layout also declares the trailing scratch space.
fn schema_with_scratch_space() -> CanonicalSchema {
    let mut raw: serde_json::Value = serde_json::from_str(POC_IDL).unwrap();
    let types = raw["types"].as_array_mut().unwrap();
    let sync = types.iter_mut().find(|t| t["name"] == "Synchronizer").unwrap();
    sync["type"]["fields"]
        .as_array_mut()
        .unwrap()
        .push(serde_json::json!({ "name": "extra_space", "type": { "array": ["u8", 1000] } }));
    CanonicalSchema::from_json(&raw.to_string()).unwrap()
}

#[test]
fn test_initialize_synchronizer_wire_bytes() {
    let schema = poc_schema();
    let data = encode_instruction(&schema, "initialize_synchronizer", &[Value::from("New York")]).unwrap();
    assert_eq!(data.len(), 40);
    assert_eq!(&data[..8], &[1, 2, 3, 4, 5, 6, 7, 8]);
    assert_eq!(&data[8..16], b"New York");
    assert!(data[16..].iter().all(|&b| b == 0));
}

#[test]
fn test_encoding_is_deterministic() {
    let schema = poc_schema();
    let args = [Value::Unsigned(100_000_000)];
    let a = encode_instruction(&schema, "burn_and_mint", &args).unwrap();
    let b = encode_instruction(&schema, "burn_and_mint", &args).unwrap();
    assert_eq!(a, b);
    assert_eq!(&a[8..], &100_000_000u64.to_le_bytes());
}

#[test]
fn test_wrong_arity_rejected() {
    let schema = poc_schema();
    for args in [vec![], vec![Value::from("a"), Value::from("b")]] {
        match encode_instruction(&schema, "initialize_synchronizer", &args).unwrap_err() {
            InterfaceError::ArgumentCountMismatch { expected, actual, .. } => {
                assert_eq!(expected, 1);
                assert_eq!(actual, args.len());
            }
            other => panic!("Expected ArgumentCountMismatch, got {:?}", other),
        }
    }
}

#[test]
fn test_unknown_instruction() {
    let schema = poc_schema();
    let err = encode_instruction(&schema, "close_synchronizer", &[]).unwrap_err();
    assert!(matches!(err, InterfaceError::UnknownName { .. }));
}

#[test]
fn test_value_out_of_range() {
    let schema = poc_schema();
    let err = encode_instruction(&schema, "burn_and_mint", &[Value::Unsigned(u64::MAX as u128 + 1)]).unwrap_err();
    match err {
        InterfaceError::ValueOutOfRange { width, .. } => assert_eq!(width, 8),
        other => panic!("Expected ValueOutOfRange, got {:?}", other),
    }
    assert!(encode_instruction(&schema, "burn_and_mint", &[Value::Unsigned(u64::MAX as u128)]).is_ok());
}

#[test]
fn test_text_longer_than_field_rejected() {
    let schema = poc_schema();
    let long = "x".repeat(33);
    let err = encode_instruction(&schema, "initialize_synchronizer", &[Value::Text(long)]).unwrap_err();
    assert!(matches!(err, InterfaceError::LengthMismatch { expected: 32, actual: 33, .. }), "{:?}", err);
}

#[test]
fn test_kind_mismatch_rejected() {
    let schema = poc_schema();
    let err = encode_instruction(&schema, "burn_and_mint", &[Value::Bool(true)]).unwrap_err();
    assert!(matches!(err, InterfaceError::TypeMismatch { .. }));
}

#[test]
fn test_variable_string_is_unsupported_on_the_wire() {
    let schema = poc_schema();
    let err = encode_instruction(&schema, "create_session", &[Value::from("session1")]).unwrap_err();
    match err {
        InterfaceError::UnsupportedType { field, type_name } => {
            assert_eq!(field, "session_id");
            assert_eq!(type_name, "string");
        }
        other => panic!("Expected UnsupportedType, got {:?}", other),
    }
}

#[test]
fn test_decode_matches_borsh_layout() {
    let schema = poc_schema();
    let raw = synchronizer_account([7u8; 32], "New York", true, 1000);
    let decoded = decode_account(&schema, "Synchronizer", &raw).unwrap();
    assert_eq!(decoded.path, DecodePath::Schema);
    assert_eq!(decoded.get("owner"), Some(&Value::Pubkey(Pubkey::new([7u8; 32]))));
    assert_eq!(decoded.get("location").and_then(Value::as_text), Some("New York"));
    assert_eq!(decoded.get("is_active"), Some(&Value::Bool(true)));
}

#[test]
fn test_decode_is_idempotent() {
    let schema = poc_schema();
    let raw = synchronizer_account([3u8; 32], "Tokyo", false, 0);
    let a = decode_account(&schema, "Synchronizer", &raw).unwrap();
    let b = decode_account(&schema, "Synchronizer", &raw).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_account_round_trip() {
    let schema = poc_schema();
    let owner = Pubkey::new([9u8; 32]);
    let values = vec![Value::Pubkey(owner), Value::from("New York"), Value::Bool(true)];
    let raw = encode_account(&schema, "Synchronizer", &values).unwrap();
    assert_eq!(raw.len(), 73);
    let decoded = decode_account(&schema, "Synchronizer", &raw).unwrap();
    assert_eq!(decoded.path, DecodePath::Schema);
    assert_eq!(decoded.get("owner"), Some(&Value::Pubkey(owner)));
    assert_eq!(decoded.get("location"), Some(&Value::Bytes(b"New York".to_vec())));
    assert_eq!(decoded.get("is_active"), Some(&Value::Bool(true)));
}

#[test]
fn test_instruction_round_trip_through_account_layout() {
    let schema = poc_schema();
    let data = encode_instruction(&schema, "initialize_synchronizer", &[Value::from("New York")]).unwrap();

    let decoded = decode_instruction_data(&schema, &data).unwrap();
    assert_eq!(decoded.name, "initialize_synchronizer");
    assert_eq!(decoded.args, vec![("location".to_string(), Value::Bytes(b"New York".to_vec()))]);

    // Read as account data, the leading 8 bytes are skipped like an account discriminator.
    let location_only = AccountSchema {
        name: "Location".into(),
        discriminator: [0; 8],
        fields: vec![FieldSpec { name: "location".into(), wire_type: WireType::FixedBytes(32), byte_width: Some(32) }],
    };
    let fields = decode_with_schema(&location_only, &data).unwrap();
    assert_eq!(fields[0].1.as_text(), Some("New York"));
}

#[test]
fn test_truncated_account_without_fallback_shape() {
    let schema = poc_schema();
    let raw = vec![0u8; 40];
    match decode_account(&schema, "Synchronizer", &raw).unwrap_err() {
        InterfaceError::TruncatedAccountData { required, actual, .. } => {
            assert_eq!(required, LegacySynchronizerLayout::MIN_LEN);
            assert_eq!(actual, 40);
        }
        other => panic!("Expected TruncatedAccountData, got {:?}", other),
    }
}

#[test]
fn test_schema_path_reports_truncation() {
    let schema = poc_schema();
    let sync = schema.account_type("Synchronizer").unwrap();
    for len in [0, 8, 72] {
        let err = decode_with_schema(sync, &vec![1u8; len]).unwrap_err();
        assert!(
            matches!(err, InterfaceError::TruncatedAccountData { required: 73, .. }),
            "len {}: {:?}",
            len,
            err
        );
    }
}

#[test]
fn test_fallback_when_schema_declares_scratch_space() {
    let schema = schema_with_scratch_space();
    let raw = synchronizer_account([5u8; 32], "New York", true, 0);

    let decoded = decode_account(&schema, "Synchronizer", &raw).unwrap();
    assert!(decoded.used_fallback());
    match &decoded.path {
        DecodePath::Fallback { cause } => assert!(matches!(cause, InterfaceError::TruncatedAccountData { .. })),
        DecodePath::Schema => unreachable!(),
    }

    let primary = decode_account(&poc_schema(), "Synchronizer", &raw).unwrap();
    assert_eq!(primary.path, DecodePath::Schema);
    assert_eq!(decoded.fields, primary.fields);
}

#[test]
fn test_session_decode_failure_is_not_guessed() {
    let schema = poc_schema();
    // Session as the program writes it: borsh string (u32 length prefix),
    // synchronizer key, active flag.
    let mut raw = vec![243, 81, 72, 115, 214, 188, 72, 144];
    raw.extend(borsh::to_vec(&SessionData { id: "session1".to_string(), synchronizer: [7u8; 32], is_active: true }).unwrap());
    // Allocated with room to spare, so the synchronizer offsets are in bounds.
    raw.resize(128, 0);

    match decode_account(&schema, "Session", &raw).unwrap_err() {
        InterfaceError::UnsupportedType { field, type_name } => {
            assert_eq!(field, "id");
            assert_eq!(type_name, "string");
        }
        other => panic!("Expected UnsupportedType, got {:?}", other),
    }
}

#[test]
fn test_fallback_requires_synchronizer_prefix() {
    let schema = poc_schema();
    assert!(LegacySynchronizerLayout::matches(schema.account_type("Synchronizer").unwrap()));
    assert!(LegacySynchronizerLayout::matches(schema_with_scratch_space().account_type("Synchronizer").unwrap()));
    assert!(!LegacySynchronizerLayout::matches(schema.account_type("Session").unwrap()));

    let renamed = AccountSchema {
        name: "Synchronizer".into(),
        discriminator: [101, 102, 103, 104, 105, 106, 107, 108],
        fields: vec![
            FieldSpec { name: "authority".into(), wire_type: WireType::Pubkey, byte_width: Some(32) },
            FieldSpec { name: "location".into(), wire_type: WireType::FixedBytes(32), byte_width: Some(32) },
            FieldSpec { name: "is_active".into(), wire_type: WireType::Bool, byte_width: Some(1) },
        ],
    };
    assert!(!LegacySynchronizerLayout::matches(&renamed));
}

#[test]
fn test_fallback_flag_is_any_nonzero_byte() {
    let mut raw = synchronizer_account([2u8; 32], "Berlin", true, 0);
    raw[LegacySynchronizerLayout::IS_ACTIVE] = 7;
    let fields = LegacySynchronizerLayout::decode("Synchronizer", &raw).unwrap();
    assert_eq!(fields[2], ("is_active".to_string(), Value::Bool(true)));
}

#[test]
fn test_padding_strips_only_trailing_zeros() {
    let schema = poc_schema();
    let mut location = location_bytes("ab");
    location[3] = b'c'; // "ab\0c"
    let mut raw = vec![101, 102, 103, 104, 105, 106, 107, 108];
    raw.extend_from_slice(&[0u8; 32]);
    raw.extend_from_slice(&location);
    raw.push(0);
    let decoded = decode_account(&schema, "Synchronizer", &raw).unwrap();
    assert_eq!(decoded.get("location"), Some(&Value::Bytes(b"ab\0c".to_vec())));
    assert_eq!(decoded.get("is_active"), Some(&Value::Bool(false)));
}

#[test]
fn test_unknown_account_type_skips_fallback() {
    let schema = poc_schema();
    let raw = synchronizer_account([2u8; 32], "Berlin", true, 0);
    let err = decode_account(&schema, "Mint", &raw).unwrap_err();
    assert!(matches!(err, InterfaceError::UnknownName { .. }));
}

#[test]
fn test_decode_unknown_instruction_data() {
    let schema = poc_schema();
    let err = decode_instruction_data(&schema, &[0u8; 16]).unwrap_err();
    assert!(matches!(err, InterfaceError::UnknownName { .. }));
}

#[test]
fn test_nested_struct_round_trip() {
    let schema = CanonicalSchema::from_json(
        r#"{"address":"CBTq287t3pjLuwgHMcmkq1ErQu7EW16aBLy79JjKsTDc","instructions":[],
            "accounts":[{"name":"Pool","discriminator":[9,9,9,9,9,9,9,9]}],
            "types":[
              {"name":"Pool","type":{"kind":"struct","fields":[
                {"name":"fees","type":{"defined":{"name":"Fees"}}},{"name":"total","type":"u128"}]}},
              {"name":"Fees","type":{"kind":"struct","fields":[
                {"name":"bps","type":"u16"},{"name":"enabled","type":"bool"}]}}]}"#,
    )
    .unwrap();
    let fees = Value::Struct(vec![("bps".into(), Value::Unsigned(30)), ("enabled".into(), Value::Bool(true))]);
    let raw = encode_account(&schema, "Pool", &[fees.clone(), Value::Unsigned(u128::MAX)]).unwrap();
    assert_eq!(raw.len(), 8 + 3 + 16);
    assert_eq!(&raw[8..11], &[30, 0, 1]);

    let decoded = decode_account(&schema, "Pool", &raw).unwrap();
    assert_eq!(decoded.path, DecodePath::Schema);
    assert_eq!(decoded.get("fees"), Some(&fees));
    assert_eq!(decoded.get("total"), Some(&Value::Unsigned(u128::MAX)));
}

#[test]
fn test_struct_fields_must_follow_declared_names() {
    let schema = CanonicalSchema::from_json(
        r#"{"address":"CBTq287t3pjLuwgHMcmkq1ErQu7EW16aBLy79JjKsTDc","instructions":[],
            "accounts":[{"name":"Pair","discriminator":[8,8,8,8,8,8,8,8]}],
            "types":[{"name":"Pair","type":{"kind":"struct","fields":[
                {"name":"limits","type":{"defined":{"name":"Limits"}}}]}},
              {"name":"Limits","type":{"kind":"struct","fields":[
                {"name":"low","type":"u16"},{"name":"high","type":"u16"}]}}]}"#,
    )
    .unwrap();
    let swapped = Value::Struct(vec![("high".into(), Value::Unsigned(9)), ("low".into(), Value::Unsigned(1))]);
    match encode_account(&schema, "Pair", &[swapped]).unwrap_err() {
        InterfaceError::TypeMismatch { field, .. } => assert_eq!(field, "limits.low"),
        other => panic!("Expected TypeMismatch, got {:?}", other),
    }

    let ordered = Value::Struct(vec![("low".into(), Value::Unsigned(1)), ("high".into(), Value::Unsigned(9))]);
    let raw = encode_account(&schema, "Pair", &[ordered]).unwrap();
    assert_eq!(&raw[8..], &[1, 0, 9, 0]);
}

#[test]
fn test_overflowing_widths_are_errors_not_panics() {
    let field = |name: &str, wire_type: WireType| FieldSpec {
        name: name.into(),
        byte_width: wire_type.byte_width(),
        wire_type,
    };
    let summed = AccountSchema {
        name: "Big".into(),
        discriminator: [1; 8],
        fields: vec![field("a", WireType::FixedBytes(usize::MAX)), field("b", WireType::Bool)],
    };
    assert_eq!(summed.data_len(), None);
    assert!(matches!(
        decode_with_schema(&summed, &[0u8; 80]).unwrap_err(),
        InterfaceError::SchemaConflict { .. }
    ));

    let with_prefix = AccountSchema {
        name: "Big".into(),
        discriminator: [1; 8],
        fields: vec![field("a", WireType::FixedBytes(usize::MAX))],
    };
    assert!(matches!(
        decode_with_schema(&with_prefix, &[0u8; 80]).unwrap_err(),
        InterfaceError::SchemaConflict { .. }
    ));
}

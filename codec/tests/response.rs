use bytes::{BufMut, Bytes, BytesMut};
use recwire_codec::{
    decode, decode_with, encode,
    records::{ErrorInfo, Node, Response},
    BinaryInput, Error, FieldHeader, InputProtocol, Limits, Protocol, Record, WireType,
};
use std::collections::{BTreeMap, HashSet};
use test_case::test_case;

fn full_response() -> Response {
    let mut response = Response::default();
    response
        .set_thread_id("thread-7")
        .set_error(ErrorInfo::new(503).with_info("unavailable"))
        .add_to_extra_list(Node::new("a").with_name("alpha"))
        .add_to_extra_list(Node::new("b"))
        .put_to_extra_map("region", "eu")
        .put_to_extra_map("retry", "3");
    response
}

fn scenario_response() -> Response {
    let mut response = Response::default();
    response
        .set_thread_id("abc")
        .add_to_extra_list(Node::new("n1"))
        .add_to_extra_list(Node::new("n2").with_name("second"));
    response
}

#[test_case(Protocol::Binary ; "binary")]
#[test_case(Protocol::Compact ; "compact")]
#[test_case(Protocol::Tuple ; "tuple")]
fn test_roundtrip(protocol: Protocol) {
    for response in [
        Response::default(),
        scenario_response(),
        full_response(),
    ] {
        let encoded = encode(&response, protocol).unwrap();
        let decoded: Response = decode(encoded, protocol).unwrap();
        assert_eq!(decoded, response);
        assert!(decoded.equals(&response));
    }
}

#[test_case(Protocol::Binary ; "binary")]
#[test_case(Protocol::Compact ; "compact")]
#[test_case(Protocol::Tuple ; "tuple")]
fn test_presence_fidelity(protocol: Protocol) {
    // An empty string and an empty list are present, not absent.
    let mut response = Response::default();
    response
        .set_thread_id("")
        .set_extra_list(Vec::new())
        .set_extra_map(BTreeMap::new());

    let decoded = Response::decode(response.encode(protocol).unwrap(), protocol).unwrap();
    assert!(decoded.is_set_thread_id());
    assert_eq!(decoded.thread_id(), Some(""));
    assert!(decoded.is_set_extra_list());
    assert_eq!(decoded.extra_list_size(), 0);
    assert!(decoded.is_set_extra_map());
    assert!(!decoded.is_set_error());
}

#[test_case(Protocol::Binary ; "binary")]
#[test_case(Protocol::Compact ; "compact")]
#[test_case(Protocol::Tuple ; "tuple")]
fn test_encoding_is_deterministic(protocol: Protocol) {
    let mut a = Response::default();
    a.put_to_extra_map("x", "1").put_to_extra_map("y", "2");
    let mut b = Response::default();
    b.put_to_extra_map("y", "2").put_to_extra_map("x", "1");
    assert_eq!(encode(&a, protocol).unwrap(), encode(&b, protocol).unwrap());
}

#[test]
fn test_unset_thread_id() {
    let mut response = scenario_response();
    response.unset_thread_id();
    assert!(!response.is_set_thread_id());
    assert_eq!(response.thread_id(), None);

    let decoded: Response = decode(encode(&response, Protocol::Compact).unwrap(), Protocol::Compact)
        .unwrap();
    assert!(!decoded.is_set_thread_id());
}

#[test]
fn test_tagged_field_order() {
    let encoded = encode(&scenario_response(), Protocol::Binary).unwrap();
    let mut input = BinaryInput::new(encoded.freeze(), Limits::default());
    input.read_struct_begin().unwrap();

    assert_eq!(
        input.read_field_begin().unwrap(),
        FieldHeader::new(WireType::String, Response::THREAD_ID)
    );
    assert_eq!(input.read_string().unwrap(), "abc");
    input.read_field_end().unwrap();

    assert_eq!(
        input.read_field_begin().unwrap(),
        FieldHeader::new(WireType::List, Response::EXTRA_LIST)
    );
    input.skip(WireType::List).unwrap();
    input.read_field_end().unwrap();

    assert!(input.read_field_begin().unwrap().is_stop());
    input.read_struct_end().unwrap();
    assert_eq!(input.remaining(), 0);

    let decoded: Response = decode(
        encode(&scenario_response(), Protocol::Binary).unwrap(),
        Protocol::Binary,
    )
    .unwrap();
    assert!(!decoded.is_set_error());
    assert!(!decoded.is_set_extra_map());
    assert_eq!(decoded.extra_list().unwrap()[1].name.as_deref(), Some("second"));
}

#[test]
fn test_exact_layouts() {
    let mut response = Response::default();
    response.set_thread_id("abc");

    let binary = encode(&response, Protocol::Binary).unwrap();
    assert_eq!(
        &binary[..],
        &[0x0B, 0x00, 0x01, 0x00, 0x00, 0x00, 0x03, b'a', b'b', b'c', 0x00]
    );

    let compact = encode(&response, Protocol::Compact).unwrap();
    assert_eq!(&compact[..], &[0x18, 0x03, b'a', b'b', b'c', 0x00]);

    // One bitset byte for four fields, then the string.
    let tuple = encode(&response, Protocol::Tuple).unwrap();
    assert_eq!(&tuple[..], &[0x01, 0x03, b'a', b'b', b'c']);
}

#[test]
fn test_nested_compact_layout() {
    let mut response = Response::default();
    response.set_error(ErrorInfo::new(1));
    let compact = encode(&response, Protocol::Compact).unwrap();
    // error: delta 2, struct; code: delta 1, i32, zigzag(1); nested stop; outer stop.
    assert_eq!(&compact[..], &[0x2C, 0x15, 0x02, 0x00, 0x00]);

    let tuple = encode(&response, Protocol::Tuple).unwrap();
    // Outer bitset {1}, nested bitset {0}, code.
    assert_eq!(&tuple[..], &[0x02, 0x01, 0x02]);
}

#[test_case(Protocol::Binary ; "binary")]
#[test_case(Protocol::Compact ; "compact")]
#[test_case(Protocol::Tuple ; "tuple")]
fn test_missing_required_field(protocol: Protocol) {
    let mut response = Response::default();
    response.add_to_extra_list(Node::default());
    assert!(matches!(
        response.validate(),
        Err(Error::SchemaViolation {
            record: "Node",
            field: "id"
        })
    ));
    assert!(matches!(
        encode(&response, protocol),
        Err(Error::SchemaViolation { .. })
    ));
}

#[test]
fn test_decode_validates() {
    // A binary ErrorInfo with no fields: the required code is missing.
    let bytes = Bytes::from_static(&[0x00]);
    assert!(matches!(
        decode::<ErrorInfo>(bytes, Protocol::Binary),
        Err(Error::SchemaViolation {
            record: "ErrorInfo",
            field: "code"
        })
    ));

    // Tuple ErrorInfo with an empty bitset.
    let bytes = Bytes::from_static(&[0x00]);
    assert!(matches!(
        decode::<ErrorInfo>(bytes, Protocol::Tuple),
        Err(Error::SchemaViolation { .. })
    ));
}

#[test_case(Protocol::Binary ; "binary")]
#[test_case(Protocol::Compact ; "compact")]
#[test_case(Protocol::Tuple ; "tuple")]
fn test_truncated(protocol: Protocol) {
    let encoded = encode(&full_response(), protocol).unwrap().freeze();
    for len in 0..encoded.len() {
        let result = decode::<Response>(encoded.slice(..len), protocol);
        assert!(result.is_err(), "prefix of {len} bytes decoded");
    }
}

#[test_case(Protocol::Binary ; "binary")]
#[test_case(Protocol::Compact ; "compact")]
#[test_case(Protocol::Tuple ; "tuple")]
fn test_extra_data(protocol: Protocol) {
    let mut encoded = encode(&scenario_response(), protocol).unwrap();
    encoded.put_u8(0);
    assert!(matches!(
        decode::<Response>(encoded, protocol),
        Err(Error::ExtraData(1))
    ));
}

#[test_case(Protocol::Binary ; "binary")]
#[test_case(Protocol::Compact ; "compact")]
#[test_case(Protocol::Tuple ; "tuple")]
fn test_depth_limit(protocol: Protocol) {
    let encoded = encode(&full_response(), protocol).unwrap();
    let limits = Limits::default().with_max_depth(1);
    assert!(matches!(
        decode_with::<Response>(encoded, protocol, limits),
        Err(Error::DepthLimit(1))
    ));

    // Response, its list and the nodes in it.
    let encoded = encode(&full_response(), protocol).unwrap();
    let limits = Limits::default().with_max_depth(3);
    decode_with::<Response>(encoded, protocol, limits).unwrap();
}

#[test_case(Protocol::Binary ; "binary")]
#[test_case(Protocol::Compact ; "compact")]
#[test_case(Protocol::Tuple ; "tuple")]
fn test_length_limits(protocol: Protocol) {
    let mut response = Response::default();
    response.set_thread_id("x".repeat(65));
    let encoded = encode(&response, protocol).unwrap();
    let limits = Limits {
        string_length: (..=64).into(),
        ..Limits::default()
    };
    assert!(matches!(
        decode_with::<Response>(encoded, protocol, limits),
        Err(Error::InvalidLength(65))
    ));

    let mut response = Response::default();
    for i in 0..5 {
        response.add_to_extra_list(Node::new(i.to_string()));
    }
    let encoded = encode(&response, protocol).unwrap();
    let limits = Limits {
        container_length: (..=4).into(),
        ..Limits::default()
    };
    assert!(matches!(
        decode_with::<Response>(encoded, protocol, limits),
        Err(Error::InvalidLength(5))
    ));
}

#[test]
fn test_oversized_length_fails_before_allocation() {
    // Binary string field claiming i32::MAX bytes.
    let mut buf = BytesMut::new();
    buf.put_u8(WireType::String.code());
    buf.put_i16(Response::THREAD_ID);
    buf.put_i32(i32::MAX);
    buf.put_slice(b"abc");
    assert!(decode::<Response>(buf, Protocol::Binary).is_err());
}

#[test]
fn test_deep_copy_isolation() {
    let original = full_response();
    let mut copy = original.deep_copy();
    assert_eq!(copy, original);

    copy.extra_list.as_mut().unwrap()[0].name = Some("changed".into());
    copy.error.as_mut().unwrap().code = Some(0);
    copy.put_to_extra_map("region", "us");

    assert_eq!(
        original.extra_list().unwrap()[0].name.as_deref(),
        Some("alpha")
    );
    assert_eq!(original.error().unwrap().code, Some(503));
    assert_eq!(original.extra_map().unwrap()["region"], "eu");
    assert_ne!(copy, original);
}

fn samples() -> Vec<Response> {
    let mut samples = vec![Response::default(), scenario_response(), full_response()];

    let mut r = Response::default();
    r.set_thread_id("a");
    samples.push(r);

    let mut r = Response::default();
    r.set_thread_id("b");
    samples.push(r);

    let mut r = Response::default();
    r.set_error(ErrorInfo::new(-1));
    samples.push(r);

    let mut r = Response::default();
    r.set_error(ErrorInfo::new(-1).with_info("x"));
    samples.push(r);

    let mut r = Response::default();
    r.put_to_extra_map("k", "v");
    samples.push(r);

    let mut r = Response::default();
    r.put_to_extra_map("a", "z").put_to_extra_map("b", "z");
    samples.push(r);

    let mut r = Response::default();
    r.add_to_extra_list(Node::new("a"));
    samples.push(r);

    let mut r = Response::default();
    r.add_to_extra_list(Node::new("a")).add_to_extra_list(Node::new("a"));
    samples.push(r);

    samples
}

#[test]
fn test_ordering_is_total() {
    let samples = samples();
    for a in &samples {
        assert_eq!(a.compare(a), std::cmp::Ordering::Equal);
        for b in &samples {
            assert_eq!(a.compare(b), b.compare(a).reverse());
            assert_eq!(a.compare(b) == std::cmp::Ordering::Equal, a == b);
            for c in &samples {
                if a <= b && b <= c {
                    assert!(a <= c);
                }
            }
        }
    }
}

#[test]
fn test_ordering_rules() {
    let mut small_map = Response::default();
    small_map.put_to_extra_map("z", "z");
    let mut large_map = Response::default();
    large_map.put_to_extra_map("a", "a").put_to_extra_map("b", "b");
    // Maps with fewer entries sort first.
    assert!(small_map < large_map);

    let mut short_list = Response::default();
    short_list.add_to_extra_list(Node::new("b"));
    let mut long_list = Response::default();
    long_list
        .add_to_extra_list(Node::new("a"))
        .add_to_extra_list(Node::new("z"));
    // Lists compare element by element.
    assert!(long_list < short_list);

    // An absent field sorts before a present one.
    let mut unset = Response::default();
    unset.put_to_extra_map("a", "a");
    let mut set = unset.clone();
    set.set_thread_id("");
    assert!(unset < set);
}

#[test]
fn test_hash_consistent_with_eq() {
    let samples = samples();
    let mut set: HashSet<Response> = samples.iter().cloned().collect();
    assert_eq!(set.len(), samples.len());
    for sample in &samples {
        assert!(!set.insert(sample.deep_copy()));
    }
}

#[test]
fn test_dynamic_field_access() {
    let mut response = Response::default();
    response
        .set_field_value(Response::THREAD_ID, Some(Box::new("t".to_string())))
        .unwrap();
    response
        .set_field_value(Response::ERROR, Some(Box::new(ErrorInfo::new(2))))
        .unwrap();
    assert_eq!(response.thread_id(), Some("t"));
    assert_eq!(
        response
            .get_field_value(Response::ERROR)
            .unwrap()
            .and_then(|value| value.downcast_ref::<ErrorInfo>()),
        Some(&ErrorInfo::new(2))
    );
    assert!(matches!(
        response.set_field_value(Response::EXTRA_MAP, Some(Box::new(vec![1i32]))),
        Err(Error::FieldTypeMismatch {
            record: "Response",
            field: "extraMap"
        })
    ));
    assert!(matches!(
        response.set_is_set(42, true),
        Err(Error::UnknownFieldId {
            record: "Response",
            id: 42
        })
    ));

    response.clear();
    assert_eq!(response, Response::default());
}

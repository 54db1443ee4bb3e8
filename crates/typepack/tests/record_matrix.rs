use typepack::{
    packable_record, Bytes, PackError, PackerCompat, SerializationContext, SerializationMethod,
    SerializationOptions, SerializerExt, Unpacker,
};

#[derive(Default, Debug, PartialEq)]
struct Single {
    val: Vec<String>,
}

packable_record! {
    Single {
        val as "Val": Vec<String>,
    }
}

#[derive(Default, Debug, PartialEq)]
struct Raw {
    val: Bytes,
}

packable_record! {
    Raw {
        val as "Val": Bytes,
    }
}

#[derive(Default, Debug, PartialEq)]
struct Node {
    val: Option<Vec<String>>,
    child: Option<Box<Node>>,
}

packable_record! {
    Node {
        val as "Val": Option<Vec<String>>,
        child as "Child": Option<Box<Node>>,
    }
}

#[derive(Default, Debug, PartialEq)]
struct Mixed {
    id: u32,
    label: Option<String>,
    notes: Vec<String>,
}

packable_record! {
    Mixed {
        id: u32,
        label: Option<String> => nil,
        notes: Vec<String>,
    }
}

#[derive(Default, Debug, PartialEq)]
struct Strict {
    id: u32,
    token: String,
}

packable_record! {
    Strict {
        id: u32,
        token: String => prohibit,
    }
}

fn array_ctx() -> std::sync::Arc<SerializationContext> {
    let mut options = SerializationOptions::new();
    options.method = SerializationMethod::Array;
    SerializationContext::with_options(options)
}

fn single(value: &str) -> Single {
    Single {
        val: vec![value.to_owned()],
    }
}

#[test]
fn map_shape_wire_bytes() {
    let ctx = SerializationContext::new();
    let ser = ctx.serializer_for::<Single>().unwrap();
    let bytes = ser.pack_bytes(&single("A")).unwrap();
    assert_eq!(bytes, vec![0x81, 0xa3, b'V', b'a', b'l', 0x91, 0xa1, 0x41]);
    assert_eq!(ser.unpack_bytes(&bytes).unwrap(), single("A"));
}

#[test]
fn array_shape_wire_bytes() {
    let ctx = array_ctx();
    let ser = ctx.serializer_for::<Single>().unwrap();
    let bytes = ser.pack_bytes(&single("A")).unwrap();
    assert_eq!(bytes, vec![0x91, 0x91, 0xa1, 0x41]);
    assert_eq!(ser.unpack_bytes(&bytes).unwrap(), single("A"));
}

#[test]
fn raw_byte_field_by_compat_mode() {
    let classic = {
        let mut options = SerializationOptions::new();
        options.method = SerializationMethod::Array;
        options.compat = PackerCompat::CLASSIC;
        SerializationContext::with_options(options)
    };
    let ser = classic.serializer_for::<Raw>().unwrap();
    let value = Raw {
        val: Bytes::from(&[0x41u8][..]),
    };
    let bytes = ser.pack_bytes(&value).unwrap();
    assert_eq!(bytes, vec![0x91, 0xa1, 0x41]);
    assert_eq!(ser.unpack_bytes(&bytes).unwrap(), value);

    let modern = array_ctx();
    let ser = modern.serializer_for::<Raw>().unwrap();
    let bytes = ser.pack_bytes(&value).unwrap();
    assert_eq!(bytes, vec![0x91, 0xc4, 0x01, 0x41]);
    assert_eq!(ser.unpack_bytes(&bytes).unwrap(), value);
}

/// A record holding a member of its own type builds through the lazy
/// delegating serializer and round-trips.
#[test]
fn self_referential_record() {
    let ctx = array_ctx();
    let ser = ctx.serializer_for::<Node>().unwrap();
    let value = Node {
        val: None,
        child: Some(Box::new(Node {
            val: Some(vec!["A".to_owned()]),
            child: None,
        })),
    };
    let bytes = ser.pack_bytes(&value).unwrap();
    // [nil, [["A"], nil]]
    assert_eq!(bytes, vec![0x92, 0xc0, 0x92, 0x91, 0xa1, 0x41, 0xc0]);
    assert_eq!(ser.unpack_bytes(&bytes).unwrap(), value);
}

#[test]
fn deep_nesting_round_trip() {
    let ctx = SerializationContext::new();
    let ser = ctx.serializer_for::<Node>().unwrap();
    let mut value = Node {
        val: Some(vec!["leaf".to_owned()]),
        child: None,
    };
    for depth in 0..8 {
        value = Node {
            val: Some(vec![format!("level{depth}")]),
            child: Some(Box::new(value)),
        };
    }
    let bytes = ser.pack_bytes(&value).unwrap();
    assert_eq!(ser.unpack_bytes(&bytes).unwrap(), value);
}

/// Reordered wire maps and unknown member names must not break
/// map-shape unpacking.
#[test]
fn map_shape_tolerates_reordering_and_unknown_keys() {
    let ctx = SerializationContext::new();
    let ser = ctx.serializer_for::<Mixed>().unwrap();

    let mut frame = Vec::new();
    frame.push(0x84); // four entries: three known (reordered) + one unknown
    frame.extend_from_slice(&[0xa5, b'n', b'o', b't', b'e', b's']);
    frame.extend_from_slice(&[0x91, 0xa1, b'x']);
    frame.extend_from_slice(&[0xa5, b'e', b'x', b't', b'r', b'a']);
    frame.extend_from_slice(&[0x92, 0x01, 0x02]); // skipped whole
    frame.extend_from_slice(&[0xa5, b'l', b'a', b'b', b'e', b'l']);
    frame.extend_from_slice(&[0xa2, b'h', b'i']);
    frame.extend_from_slice(&[0xa2, b'i', b'd']);
    frame.push(0x07);

    let value = ser.unpack_bytes(&frame).unwrap();
    assert_eq!(
        value,
        Mixed {
            id: 7,
            label: Some("hi".to_owned()),
            notes: vec!["x".to_owned()],
        }
    );
}

#[test]
fn map_shape_round_trip() {
    let ctx = SerializationContext::new();
    let ser = ctx.serializer_for::<Mixed>().unwrap();
    let value = Mixed {
        id: 42,
        label: None,
        notes: vec!["a".to_owned(), "b".to_owned()],
    };
    let bytes = ser.pack_bytes(&value).unwrap();
    assert_eq!(bytes[0], 0x83);
    assert_eq!(ser.unpack_bytes(&bytes).unwrap(), value);
}

/// An array-shaped stream shorter than the member list applies each
/// missing member's nil-implication.
#[test]
fn array_shape_schema_tolerance() {
    let ctx = array_ctx();
    let ser = ctx.serializer_for::<Mixed>().unwrap();

    // Only the first member present: label (nil policy) becomes None,
    // notes (member-default policy) stays empty.
    let frame = [0x91, 0x07];
    assert_eq!(
        ser.unpack_bytes(&frame).unwrap(),
        Mixed {
            id: 7,
            label: None,
            notes: Vec::new(),
        }
    );

    // Extra trailing entries beyond the member list are skipped.
    let frame = [0x95, 0x07, 0xc0, 0x90, 0x01, 0x02];
    assert_eq!(
        ser.unpack_bytes(&frame).unwrap(),
        Mixed {
            id: 7,
            label: None,
            notes: Vec::new(),
        }
    );
}

#[test]
fn prohibited_member_must_be_present_and_non_nil() {
    let ctx = array_ctx();
    let ser = ctx.serializer_for::<Strict>().unwrap();

    // Missing trailing member.
    let frame = [0x91, 0x07];
    assert!(matches!(
        ser.unpack_bytes(&frame),
        Err(PackError::MissingRequiredValue("token"))
    ));

    // Present but nil.
    let frame = [0x92, 0x07, 0xc0];
    assert!(matches!(
        ser.unpack_bytes(&frame),
        Err(PackError::MissingRequiredValue("token"))
    ));

    let frame = [0x92, 0x07, 0xa2, b'o', b'k'];
    assert_eq!(
        ser.unpack_bytes(&frame).unwrap(),
        Strict {
            id: 7,
            token: "ok".to_owned(),
        }
    );
}

#[test]
fn either_shape_unpacks_regardless_of_configured_method() {
    // A map-configured serializer still reads array-shaped input and
    // vice versa; the method only directs packing.
    let map_ctx = SerializationContext::new();
    let ser = map_ctx.serializer_for::<Single>().unwrap();
    let array_frame = [0x91, 0x91, 0xa1, 0x41];
    assert_eq!(ser.unpack_bytes(&array_frame).unwrap(), single("A"));

    let ctx = array_ctx();
    let ser = ctx.serializer_for::<Single>().unwrap();
    let map_frame = [0x81, 0xa3, b'V', b'a', b'l', 0x91, 0xa1, 0x41];
    assert_eq!(ser.unpack_bytes(&map_frame).unwrap(), single("A"));
}

#[test]
fn record_rejects_scalar_input() {
    let ctx = SerializationContext::new();
    let ser = ctx.serializer_for::<Single>().unwrap();
    assert!(matches!(
        ser.unpack_bytes(&[0x07]),
        Err(PackError::MessageTypeMismatch { .. })
    ));
}

#[test]
fn unpack_into_is_not_supported_for_records() {
    let ctx = SerializationContext::new();
    let ser = ctx.serializer_for::<Single>().unwrap();
    let mut target = Single::default();
    assert!(matches!(
        ser.unpack_into(&mut Unpacker::new(&[0x80]), &mut target),
        Err(PackError::NotSupported(_))
    ));
}

#[test]
fn default_context_convenience_round_trip() {
    let value = single("hey");
    let bytes = typepack::to_bytes(&value).unwrap();
    assert_eq!(typepack::from_bytes::<Single>(&bytes).unwrap(), value);
}

#[test]
fn pack_to_io_sink() {
    let ctx = SerializationContext::new();
    let ser = ctx.serializer_for::<Single>().unwrap();
    let mut sink = Vec::new();
    ser.pack(&mut sink, &single("A")).unwrap();
    let mut source = std::io::Cursor::new(sink);
    assert_eq!(ser.unpack(&mut source).unwrap(), single("A"));
}

use mcnbt::{pack, pack_into, parse, ErrorKind, Framing, Kind, Node, Payload};

#[test]
fn minimal_compound_round_trips_byte_identically() {
    let data = [0x0a, 0x00, 0x00, 0x00];
    let (root, _) = parse(&data).unwrap();
    let packed = pack(&root, Framing::Raw).unwrap();
    assert_eq!(packed, data);
}

#[test]
fn list_of_compounds_round_trips_in_order() {
    let items = vec![
        Node::unkeyed(Payload::Compound(vec![Node::keyed("n", Payload::Int(1))])),
        Node::unkeyed(Payload::Compound(vec![Node::keyed("n", Payload::Int(2))])),
    ];
    let root = Node::keyed(
        "",
        Payload::Compound(vec![Node::keyed(
            "list",
            Payload::List { element_kind: Kind::Compound, items },
        )]),
    );

    let packed = pack(&root, Framing::Raw).unwrap();
    let (decoded, soft_err) = parse(&packed).unwrap();
    assert!(soft_err.is_none());
    assert_eq!(decoded, root);

    let list_node = &decoded.children()[0];
    match &list_node.payload {
        Payload::List { items, .. } => {
            assert_eq!(items[0].children()[0].payload, Payload::Int(1));
            assert_eq!(items[1].children()[0].payload, Payload::Int(2));
        }
        _ => panic!("expected a list"),
    }
}

#[test]
fn pack_applies_gzip_framing_by_default_choice() {
    let root = Node::keyed("", Payload::Compound(vec![Node::keyed("v", Payload::Int(1))]));
    let gzipped = pack(&root, Framing::Gzip).unwrap();
    assert_eq!(&gzipped[0..2], &[0x1f, 0x8b]);
    let (decoded, soft_err) = parse(&gzipped).unwrap();
    assert!(soft_err.is_none());
    assert_eq!(decoded, root);
}

#[test]
fn pack_into_undersized_window_fails_with_buffer_overflow() {
    let root = Node::keyed("", Payload::Compound(vec![Node::keyed("v", Payload::Int(1))]));
    let exact_len = pack(&root, Framing::Raw).unwrap().len();
    let mut buf = vec![0u8; exact_len - 1];
    let err = pack_into(&root, Framing::Raw, &mut buf).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::BufferOverflow);
}

#[test]
fn pack_into_exact_window_succeeds() {
    let root = Node::keyed("", Payload::Compound(vec![Node::keyed("v", Payload::Int(1))]));
    let exact_len = pack(&root, Framing::Raw).unwrap().len();
    let mut buf = vec![0u8; exact_len];
    let written = pack_into(&root, Framing::Raw, &mut buf).unwrap();
    assert_eq!(written, exact_len);
    assert_eq!(buf, pack(&root, Framing::Raw).unwrap());
}

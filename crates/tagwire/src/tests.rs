// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Integration tests across catalog, dispatch and codec.

use super::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

// Hierarchy used throughout:
//
//   Node (abstract) <- Leaf <- Twig
//   Leaf implements Visitable, Shape
//   Shape implements Drawable

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Leaf {
    label: String,
    weight: u32,
}

impl Remotable for Leaf {
    const TYPE_NAME: &'static str = "tree.Leaf";
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Twig {
    label: String,
}

impl Remotable for Twig {
    const TYPE_NAME: &'static str = "tree.Twig";
}

fn tree_catalog() -> TypeCatalog {
    TypeCatalog::builder()
        .declare(TypeDecl::class("tree.Node"))
        .declare(TypeDecl::interface("tree.Drawable"))
        .declare(TypeDecl::interface("tree.Shape").implements("tree.Drawable"))
        .declare(TypeDecl::interface("tree.Visitable"))
        .declare(
            TypeDecl::of::<Leaf>()
                .extends("tree.Node")
                .implements("tree.Visitable")
                .implements("tree.Shape"),
        )
        .declare(TypeDecl::of::<Twig>().extends("tree.Leaf"))
        .build()
        .expect("tree catalog")
}

fn codec_with(config: CodecConfig) -> WireCodec {
    WireCodec::new(
        Arc::new(tree_catalog()),
        Arc::new(DispatchTable::new()),
        config,
    )
}

fn tree_codec() -> WireCodec {
    codec_with(CodecConfig::default())
}

/// Encoder that tags its output with `marker` so the chosen handler is visible.
fn register_marker(table: &DispatchTable, type_name: &str, marker: &'static str) {
    table.register(
        type_name,
        move |_: &Object| Ok(marker.to_string()),
        |text: &str| Ok(Value::from(text)),
    );
}

/// Custom text of an encoded `UNKNOWN` value.
fn custom_text(bytes: &[u8]) -> String {
    let mut cursor = Cursor::new(bytes);
    assert_eq!(cursor.read_u8().expect("tag"), WireTag::Unknown.as_u8());
    cursor.read_str_u16().expect("type name");
    assert!(cursor.read_bool().expect("flag"), "custom flag not set");
    let payload = cursor.read_bytes_u32(usize::MAX).expect("payload");
    String::from_utf8(payload.to_vec()).expect("utf-8")
}

#[test]
fn test_superclass_beats_interfaces() {
    let codec = tree_codec();
    register_marker(codec.table(), "tree.Visitable", "visitable");
    register_marker(codec.table(), "tree.Shape", "shape");
    register_marker(codec.table(), "tree.Node", "node");

    let leaf = Value::object(Leaf {
        label: "a".into(),
        weight: 1,
    });
    let bytes = codec.to_bytes(&leaf).expect("encode");
    assert_eq!(custom_text(&bytes), "node");
}

#[test]
fn test_shallower_interface_wins() {
    let codec = tree_codec();
    // Drawable is reached at level 2 (through Shape), Visitable at level 1.
    register_marker(codec.table(), "tree.Drawable", "drawable");
    register_marker(codec.table(), "tree.Visitable", "visitable");

    let leaf = Value::object(Leaf {
        label: "a".into(),
        weight: 1,
    });
    assert_eq!(
        custom_text(&codec.to_bytes(&leaf).expect("encode")),
        "visitable"
    );

    // Only the deeper one left: it still applies.
    codec.table().clear();
    register_marker(codec.table(), "tree.Drawable", "drawable");
    assert_eq!(
        custom_text(&codec.to_bytes(&leaf).expect("encode")),
        "drawable"
    );
}

#[test]
fn test_subtype_does_not_inherit_superclass_interfaces() {
    let codec = tree_codec();
    register_marker(codec.table(), "tree.Shape", "shape");

    // Twig extends Leaf but declares no interfaces of its own; Leaf is not
    // registered, so nothing applies and the fallback is used.
    let twig = Value::object(Twig { label: "t".into() });
    let bytes = codec.to_bytes(&twig).expect("encode");
    let mut cursor = Cursor::new(&bytes);
    cursor.read_u8().expect("tag");
    assert_eq!(cursor.read_str_u16().expect("name"), "tree.Twig");
    assert!(!cursor.read_bool().expect("flag"));
}

#[test]
fn test_overwrite_keeps_last_registration() {
    let codec = tree_codec();
    register_marker(codec.table(), "tree.Leaf", "first");
    register_marker(codec.table(), "tree.Leaf", "second");

    let leaf = Value::object(Leaf {
        label: "a".into(),
        weight: 1,
    });
    assert_eq!(
        custom_text(&codec.to_bytes(&leaf).expect("encode")),
        "second"
    );
}

#[test]
fn test_unknown_round_trip_through_ancestor() {
    let codec = tree_codec();
    codec.table().register(
        "tree.Node",
        |object: &Object| {
            if let Some(twig) = object.downcast_ref::<Twig>() {
                Ok(format!("twig:{}", twig.label))
            } else if let Some(leaf) = object.downcast_ref::<Leaf>() {
                Ok(format!("leaf:{}:{}", leaf.label, leaf.weight))
            } else {
                Err(HandlerError::new("not a node"))
            }
        },
        |text: &str| match text.split(':').collect::<Vec<_>>().as_slice() {
            ["twig", label] => Ok(Value::object(Twig {
                label: (*label).to_string(),
            })),
            ["leaf", label, weight] => Ok(Value::object(Leaf {
                label: (*label).to_string(),
                weight: weight.parse().map_err(|_| "bad weight")?,
            })),
            _ => Err(HandlerError::new(format!("bad node text {:?}", text))),
        },
    );

    let twig = Value::object(Twig {
        label: "spruce".into(),
    });
    let bytes = codec.to_bytes(&twig).expect("encode");
    assert_eq!(custom_text(&bytes), "twig:spruce");
    assert_eq!(codec.from_bytes(&bytes).expect("decode"), twig);

    let leaf = Value::object(Leaf {
        label: "oak".into(),
        weight: 3,
    });
    let bytes = codec.to_bytes(&leaf).expect("encode");
    assert_eq!(codec.from_bytes(&bytes).expect("decode"), leaf);
}

#[test]
fn test_fallback_round_trip_without_handlers() {
    let codec = tree_codec();
    let leaf = Value::object(Leaf {
        label: "elm".into(),
        weight: 9,
    });
    let bytes = codec.to_bytes(&leaf).expect("encode");

    let mut cursor = Cursor::new(&bytes);
    cursor.read_u8().expect("tag");
    cursor.read_str_u16().expect("name");
    assert!(!cursor.read_bool().expect("flag"));
    let payload = cursor.read_bytes_u32(usize::MAX).expect("payload");
    assert_eq!(payload, br#"{"label":"elm","weight":9}"#);

    assert_eq!(codec.from_bytes(&bytes).expect("decode"), leaf);
}

#[test]
fn test_fallback_payload_ignores_decoder() {
    let sender = tree_codec();
    let leaf = Value::object(Leaf {
        label: "ash".into(),
        weight: 2,
    });
    let bytes = sender.to_bytes(&leaf).expect("encode");

    // Receiver has a decoder the sender did not use.
    let receiver = tree_codec();
    receiver.table().register(
        "tree.Leaf",
        |_: &Object| Ok(String::new()),
        |_: &str| Err(HandlerError::new("must not be called")),
    );
    assert_eq!(receiver.from_bytes(&bytes).expect("decode"), leaf);
}

#[test]
fn test_abstract_fallback_not_loadable() {
    let codec = tree_codec();
    let mut bytes = vec![WireTag::Unknown.as_u8()];
    {
        let mut out = CursorMut::new(&mut bytes);
        out.write_str_u16("tree.Node").expect("name");
        out.write_bool(false);
        out.write_bytes_u32(b"{}").expect("payload");
    }
    assert!(matches!(
        codec.from_bytes(&bytes),
        Err(CodecError::NotLoadable { ref type_name }) if type_name == "tree.Node"
    ));
}

#[test]
fn test_unknown_type_keeps_cursor_usable() {
    // Sender knows a type the receiver never declared.
    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Stranger {
        id: u8,
    }

    impl Remotable for Stranger {
        const TYPE_NAME: &'static str = "far.Stranger";
    }

    let sender = WireCodec::default();
    let mut buffer = Vec::new();
    {
        let mut out = CursorMut::new(&mut buffer);
        sender
            .encode(&Value::object(Stranger { id: 5 }), &mut out)
            .expect("encode undeclared");
        sender.encode(&Value::Int(42), &mut out).expect("encode int");
    }

    let receiver = tree_codec();
    let mut input = Cursor::new(&buffer);
    match receiver.decode(&mut input) {
        Err(CodecError::UnknownType {
            type_name,
            custom_encoded,
            payload,
        }) => {
            assert_eq!(type_name, "far.Stranger");
            assert!(!custom_encoded);
            assert_eq!(payload, br#"{"id":5}"#);
        }
        other => panic!("expected unknown type, got {:?}", other),
    }
    assert_eq!(receiver.decode(&mut input).expect("next"), Value::Int(42));
    assert!(input.is_eof());
}

#[test]
fn test_missing_decoder_policies() {
    let sender = tree_codec();
    register_marker(sender.table(), "tree.Shape", "drawn");
    let leaf = Value::object(Leaf {
        label: "x".into(),
        weight: 0,
    });
    let bytes = sender.to_bytes(&leaf).expect("encode");

    let strict = tree_codec();
    assert!(matches!(
        strict.from_bytes(&bytes),
        Err(CodecError::MissingDecoder { ref type_name }) if type_name == "tree.Leaf"
    ));

    let warn = codec_with(
        CodecConfig::default().with_missing_decoder(MissingDecoderPolicy::WarnAndPassThrough),
    );
    assert_eq!(warn.from_bytes(&bytes).expect("warn"), Value::from("drawn"));

    let silent =
        codec_with(CodecConfig::default().with_missing_decoder(MissingDecoderPolicy::PassThrough));
    assert_eq!(silent.from_bytes(&bytes).expect("silent"), Value::from("drawn"));
}

#[test]
fn test_decoder_resolved_from_wire_type() {
    // The receiver registers a different ancestor than the sender did.
    let sender = tree_codec();
    register_marker(sender.table(), "tree.Node", "from-node");
    let bytes = sender
        .to_bytes(&Value::object(Leaf {
            label: "x".into(),
            weight: 0,
        }))
        .expect("encode");

    let receiver = tree_codec();
    receiver.table().register(
        "tree.Drawable",
        |_: &Object| Ok(String::new()),
        |text: &str| Ok(Value::from(format!("drawable saw {}", text))),
    );
    assert_eq!(
        receiver.from_bytes(&bytes).expect("decode"),
        Value::from("drawable saw from-node")
    );
}

#[test]
fn test_encoder_failure_rewinds_buffer() {
    let codec = tree_codec();
    codec.table().register(
        "tree.Leaf",
        |_: &Object| Err(HandlerError::new("refused")),
        |_: &str| Ok(Value::Null),
    );

    let mut buffer = Vec::new();
    let mut out = CursorMut::new(&mut buffer);
    codec.encode(&Value::Int(1), &mut out).expect("int");
    let err = codec
        .encode(
            &Value::object(Leaf {
                label: "x".into(),
                weight: 0,
            }),
            &mut out,
        )
        .unwrap_err();
    assert!(matches!(
        err,
        CodecError::Custom { ref type_name, ref reason }
            if type_name == "tree.Leaf" && reason == "refused"
    ));
    assert_eq!(out.offset(), 5);
    assert_eq!(buffer, vec![4, 0, 0, 0, 1]);
}

#[test]
fn test_decoder_failure_is_custom_error() {
    let codec = tree_codec();
    register_marker(codec.table(), "tree.Leaf", "x");
    let bytes = codec
        .to_bytes(&Value::object(Leaf {
            label: "x".into(),
            weight: 0,
        }))
        .expect("encode");

    codec.table().register(
        "tree.Leaf",
        |_: &Object| Ok(String::new()),
        |_: &str| Err(HandlerError::new("cannot parse")),
    );
    let err = codec.from_bytes(&bytes).unwrap_err();
    assert!(!err.is_format_error());
    assert!(matches!(err, CodecError::Custom { .. }));
}

#[test]
fn test_root_registration_catches_everything() {
    let codec = tree_codec();
    register_marker(codec.table(), ROOT_TYPE, "root");
    let bytes = codec
        .to_bytes(&Value::object(Twig { label: "t".into() }))
        .expect("encode");
    assert_eq!(custom_text(&bytes), "root");
    assert_eq!(codec.from_bytes(&bytes).expect("decode"), Value::from("root"));
}

#[test]
fn test_independent_tables_per_codec() {
    let a = tree_codec();
    let b = tree_codec();
    register_marker(a.table(), "tree.Leaf", "a");

    let leaf = Value::object(Leaf {
        label: "x".into(),
        weight: 0,
    });
    assert_eq!(custom_text(&a.to_bytes(&leaf).expect("a")), "a");
    let plain = b.to_bytes(&leaf).expect("b");
    let mut cursor = Cursor::new(&plain);
    cursor.read_u8().expect("tag");
    cursor.read_str_u16().expect("name");
    assert!(!cursor.read_bool().expect("flag"));
}

#[test]
fn test_concurrent_register_and_encode() {
    let codec = Arc::new(tree_codec());
    register_marker(codec.table(), "tree.Leaf", "old");

    let writer = {
        let codec = codec.clone();
        std::thread::spawn(move || {
            for _ in 0..200 {
                register_marker(codec.table(), "tree.Leaf", "new");
                register_marker(codec.table(), "tree.Leaf", "old");
            }
        })
    };

    let leaf = Value::object(Leaf {
        label: "x".into(),
        weight: 0,
    });
    for _ in 0..500 {
        let text = custom_text(&codec.to_bytes(&leaf).expect("encode"));
        assert!(text == "old" || text == "new", "torn entry: {}", text);
    }
    writer.join().expect("writer");
}

#[test]
fn test_config_drives_codec() {
    let config = CodecConfig::default().with_max_payload_len(8);
    let codec = codec_with(config);
    let bytes = codec
        .to_bytes(&Value::object(Leaf {
            label: "long enough".into(),
            weight: 0,
        }))
        .expect("encode");
    let err = codec.from_bytes(&bytes).unwrap_err();
    assert!(err.is_format_error());
}

// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![no_main]

use libfuzzer_sys::fuzz_target;
use serde::{Deserialize, Serialize};
use tagwire::{
    CodecConfig, Cursor, DispatchTable, MissingDecoderPolicy, Object, Remotable, TypeCatalog,
    TypeDecl, Value, WireCodec,
};
use std::sync::{Arc, OnceLock};

#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct Blob {
    tag: String,
    data: Vec<u8>,
}

impl Remotable for Blob {
    const TYPE_NAME: &'static str = "fuzz.Blob";
}

fn codec() -> &'static WireCodec {
    static CODEC: OnceLock<WireCodec> = OnceLock::new();
    CODEC.get_or_init(|| {
        let catalog = TypeCatalog::builder()
            .declare(TypeDecl::interface("fuzz.Opaque"))
            .declare(TypeDecl::of::<Blob>().implements("fuzz.Opaque"))
            .build()
            .expect("catalog");
        let table = DispatchTable::new();
        table.register(
            "fuzz.Opaque",
            |o: &Object| Ok(o.to_json()?),
            |text: &str| Ok(Value::object(serde_json::from_str::<Blob>(text)?)),
        );
        let config = CodecConfig::default()
            .with_max_string_len(1 << 16)
            .with_max_payload_len(1 << 16)
            .with_missing_decoder(MissingDecoderPolicy::PassThrough);
        WireCodec::new(Arc::new(catalog), Arc::new(table), config)
    })
}

fuzz_target!(|data: &[u8]| {
    let codec = codec();
    let mut cursor = Cursor::new(data);

    // Decode until the stream ends or is abandoned.
    while !cursor.is_eof() {
        match codec.decode(&mut cursor) {
            Ok(value) => {
                // Anything decoded must encode again.
                let _ = codec.to_bytes(&value);
            }
            Err(e) if e.is_format_error() => {
                assert!(cursor.is_poisoned());
                break;
            }
            Err(_) => {}
        }
    }
});

// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![no_main]

use libfuzzer_sys::fuzz_target;
use tagwire::{AsyncCompletion, Cursor, InvokeArguments, PendingRef, TypeCatalog, WireCodec};

fuzz_target!(|data: &[u8]| {
    let catalog = TypeCatalog::builder()
        .concrete::<PendingRef>()
        .build()
        .expect("catalog");
    let codec = WireCodec::with_catalog(catalog);

    // Fuzz invocation argument lists
    let _ = InvokeArguments::decode(&codec, &mut Cursor::new(data));

    // Fuzz async completion bodies
    if let Ok(completion) = AsyncCompletion::decode(&codec, 0, &mut Cursor::new(data)) {
        let _ = completion.into_outcome();
    }
});

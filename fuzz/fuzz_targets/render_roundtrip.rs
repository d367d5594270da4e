#![no_main]

use std::collections::BTreeMap;

use libfuzzer_sys::fuzz_target;
use ndfilter_core::pipeline::RecordRenderer;
use ndfilter_core::record::Record;
use ndfilter_pipeline::render::{CsvRenderer, JsonRenderer};

fuzz_target!(|fields: BTreeMap<String, String>| {
    let record = Record::new(fields.clone());

    // JSON 출력은 한 줄이고 원래 필드로 되돌아와야 함
    let line = JsonRenderer
        .render(&record)
        .expect("json rendering should not fail");
    assert!(!line.contains('\n'));
    let parsed: BTreeMap<String, String> =
        serde_json::from_str(&line).expect("rendered json should parse");
    assert_eq!(parsed, fields);

    let _ = CsvRenderer.render(&record);
});

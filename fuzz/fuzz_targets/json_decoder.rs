#![no_main]

use libfuzzer_sys::fuzz_target;
use ndfilter_core::pipeline::RecordDecoder;
use ndfilter_pipeline::config::NonStringPolicy;
use ndfilter_pipeline::decoder::JsonRecordDecoder;

fuzz_target!(|data: &[u8]| {
    let reject = JsonRecordDecoder::new(NonStringPolicy::Reject).decode(data);
    let stringify = JsonRecordDecoder::new(NonStringPolicy::Stringify).decode(data);

    // reject 정책으로 성공한 입력은 stringify 정책에서도 같은 레코드
    if let Ok(record) = reject {
        assert_eq!(stringify.ok(), Some(record));
    }
});

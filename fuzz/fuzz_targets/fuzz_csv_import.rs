#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        let (circuits, report) = decomm_engine::csv::import_csv(text, &[], "fuzz");
        assert_eq!(circuits.len(), report.imported);
        let _ = decomm_engine::csv::export_csv(&circuits);
    }
});

#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(value) = serde_json::from_slice::<serde_json::Value>(data) {
        if let Ok((migrated, _)) = decomm_core::migrate::migrate_rules(&value) {
            // Migration is idempotent.
            let (again, changed) = decomm_core::migrate::migrate_rules(&migrated).unwrap();
            assert_eq!(changed, 0);
            assert_eq!(again, migrated);
        }
    }
});

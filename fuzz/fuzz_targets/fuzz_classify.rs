#![no_main]
use libfuzzer_sys::fuzz_target;

use decomm_core::model::{Circuit, Rule};

fuzz_target!(|data: &[u8]| {
    // Rules as JSON on the first line, circuits as JSON on the rest.
    let Some(split) = data.iter().position(|b| *b == b'\n') else {
        return;
    };
    let (left, right) = data.split_at(split);
    if let (Ok(rules), Ok(mut circuits)) = (
        serde_json::from_slice::<Vec<Rule>>(left),
        serde_json::from_slice::<Vec<Circuit>>(&right[1..]),
    ) {
        let before: Vec<_> = circuits.iter().map(|c| c.status).collect();
        let summary = decomm_engine::classify::classify(&mut circuits, &rules);
        assert!(summary.flagged <= summary.evaluated);
        let after: Vec<_> = circuits.iter().map(|c| c.status).collect();
        assert_eq!(before, after);
    }
});

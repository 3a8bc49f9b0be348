#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(data);
    let rows: Vec<actuator_config::ScriptRow> =
        rdr.deserialize().filter_map(Result::ok).collect();
    if let Ok(steps) = actuator_config::script_from_rows(rows) {
        // Accepted scripts are sorted and carry a level exactly when needed.
        assert!(steps.windows(2).all(|w| w[0].time_ms <= w[1].time_ms));
        assert!(steps.iter().all(|s| s.level.is_some() == s.action.takes_level()));
    }
});

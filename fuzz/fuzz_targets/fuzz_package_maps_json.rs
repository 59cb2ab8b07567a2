#![no_main]

use idiff::diff::DiffEngine;
use idiff::model::PackageMaps;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data)
        && let Ok(maps) = PackageMaps::from_json_str(s)
    {
        // A parsed inventory always diffs cleanly against itself
        let result = DiffEngine::new().diff_packages(&maps, &maps);
        assert!(result.is_ok_and(|r| !r.has_changes()));
    }
});

#![no_main]

use encore_menu::{parse_selection, Selection};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Some((&count, rest)) = data.split_first() else {
        return;
    };
    let option_count = usize::from(count % 11);
    let content = String::from_utf8_lossy(rest);
    match parse_selection(&content, option_count) {
        Selection::Chosen(index) => assert!(index < option_count),
        Selection::Cancelled => assert!(content.trim().eq_ignore_ascii_case("cancel")),
        Selection::Unrecognized => {}
    }
});

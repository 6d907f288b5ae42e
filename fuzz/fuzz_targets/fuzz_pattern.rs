#![no_main]

use libfuzzer_sys::fuzz_target;

use gramdex::{MatchMode, WildcardPattern};

fuzz_target!(|input: (&str, &str, u8)| {
    // Compile arbitrary patterns and match arbitrary text
    // This should never panic, whatever the byte content
    let (pattern, text, mode) = input;
    let mode = match mode % 4 {
        0 => MatchMode::Exact,
        1 => MatchMode::Contains,
        2 => MatchMode::StartsWith,
        _ => MatchMode::EndsWith,
    };
    if let Ok(compiled) = WildcardPattern::new(pattern, mode) {
        let matched = compiled.is_match(text);
        if let Some(span) = compiled.find(text) {
            assert!(matched);
            assert!(span.start <= span.end && span.end <= text.len());
        } else {
            assert!(!matched);
        }
        let _ = compiled.find_iter(text).take(64).count();
        let _ = compiled.to_regex();
    }
});

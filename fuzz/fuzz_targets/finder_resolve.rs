#![no_main]

use encore_finder::{resolve_detailed, Member, MentionKind, ResolvedVia};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let raw = String::from_utf8_lossy(data);
    let members = vec![
        Member::new(100_000_000_000_000_001, "alice", Some("0042")),
        Member::new(100_000_000_000_000_002, "Alice", Some("0000")),
        Member::new(100_000_000_000_000_003, "alicia", None).with_nickname("Ali"),
        Member::new(100_000_000_000_000_004, "bob", Some("0007")),
    ];

    for mention in [None, Some(MentionKind::User)] {
        let resolved = resolve_detailed(&raw, &members, mention);
        assert!(resolved.matches.len() <= members.len());
        for (index, found) in resolved.matches.iter().enumerate() {
            let position = members
                .iter()
                .position(|member| std::ptr::eq(member, *found))
                .expect("matches come from the candidate list");
            if let Some(next) = resolved.matches.get(index + 1) {
                let next_position = members
                    .iter()
                    .position(|member| std::ptr::eq(member, *next))
                    .expect("matches come from the candidate list");
                assert!(position < next_position, "input order must be preserved");
            }
        }
        match resolved.via {
            ResolvedVia::Empty | ResolvedVia::NoMatch => assert!(resolved.matches.is_empty()),
            ResolvedVia::Mention | ResolvedVia::Snowflake => assert!(resolved.matches.len() <= 1),
            ResolvedVia::Composite | ResolvedVia::Name(_) => assert!(!resolved.matches.is_empty()),
        }
    }
});

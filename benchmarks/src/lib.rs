//! Shared fixtures for the NiceObjects benchmarks

use niceobj_core::{Event, EventCode, GmObject};

/// Event codes cycled through when building objects
const CODES: &[(u32, u32)] = &[(0, 0), (1, 0), (3, 0), (3, 1), (2, 0), (2, 5), (8, 0), (7, 10), (7, 4)];

/// An object with `events` code events of about `lines` lines each
pub fn sample_object(events: usize, lines: usize) -> GmObject {
    let events = (0..events)
        .map(|i| {
            let (category, subcode) = CODES[i % CODES.len()];
            let code: Vec<String> = (0..lines)
                .map(|j| format!("var v{} = x + {}; // line {}", j, i, j))
                .collect();
            Event::with_code(EventCode::new(category, subcode), code.join("\n"))
        })
        .collect();

    GmObject {
        sprite: Some("sprBread".to_string()),
        solid: true,
        depth: -10,
        parent: Some("objFood".to_string()),
        events,
        ..GmObject::default()
    }
}

/// A project manifest listing `objects` objects
pub fn sample_manifest(objects: usize) -> String {
    let mut text = String::from("<!--This Document is generated by GameMaker, if you edit it by hand then you do so at your own risk!-->\r\n<assets>\r\n  <objects name=\"objects\">\r\n");
    for i in 0..objects {
        text.push_str(&format!("    <object>objects\\obj{}</object>\r\n", i));
    }
    text.push_str("  </objects>\r\n  <scripts name=\"scripts\">\r\n  </scripts>\r\n</assets>\r\n");
    text
}

//! Help texts printed by `niceobj help`

pub const GENERAL: &str = "\
Translation supports:
1. both objects and scripts,
2. both modifying and creating files,
3. in both directions (GM <--> NiceObjects)

.gml files are scripts and are simply copied back and forth.
.gmo files are translated objects. Run \"niceobj help objects\" for the .gmo format.

Creating new .gmo or .gml files adds them to the project.
Physics properties cannot be edited from .gmo files; existing values are kept.

The watch window logs each translation, as well as translation errors.
";

pub const OBJECTS: &str = "\
.gmo files are formatted as follows:
Property
Property

---Event Name
//code
---Event Name
//code

All possible Properties:
Sprite [sprite]
Invisible
Solid
Persistent
Depth [depth]
Parent [parent]
Mask [mask]
Omitting a Property assumes the default value for a new object.

Event Names are what you'd expect, such as Create, Alarm 0, Collision objPlayer.
Run \"niceobj events\" for a complete list.
";

/// Event listing, with a note on parameters
pub fn events(registry: &niceobj_core::EventRegistry) -> String {
    format!(
        "{}\n[num] takes a number, [obj] takes an object name, e.g. Alarm 3, Collision objWall.\n",
        registry.help_listing()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_events_listing() {
        let text = events(niceobj_core::EventRegistry::standard());
        assert!(text.contains("Alarm [num]"));
        assert!(text.contains("Collision [obj]"));
        assert!(text.ends_with("Collision objWall.\n"));
    }

    #[test]
    fn test_objects_help_lists_every_property() {
        for keyword in ["Sprite", "Invisible", "Solid", "Persistent", "Depth", "Parent", "Mask"] {
            assert!(OBJECTS.contains(keyword), "{}", keyword);
        }
    }
}

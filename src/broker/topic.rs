use serde_json::Value;

/// Derives the topic an event is registered and looked up under.
///
/// The same resolver runs at subscribe time and at broadcast time, so any
/// implementation must be a pure function of its inputs.
pub trait TopicResolver: Send + Sync {
    fn topic_for(&self, field_name: &str, arguments: &Value) -> String;
}

/// Default resolver: upper-snake-cases the field name and ignores
/// arguments, so every subscriber of a field shares one topic.
///
/// Partitioning topics by argument value would need the derivation to agree
/// between subscribe and broadcast time, which gets fragile once arguments
/// are enums or objects. Filtering instead happens per subscriber, after
/// lookup, against the arguments each subscriber captured.
#[derive(Debug, Clone, Default)]
pub struct FieldTopicResolver;

impl TopicResolver for FieldTopicResolver {
    fn topic_for(&self, field_name: &str, _arguments: &Value) -> String {
        to_upper_snake(field_name)
    }
}

/// `onPostCreated` -> `ON_POST_CREATED`
fn to_upper_snake(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let mut prev_lower = false;
    for ch in name.chars() {
        if ch.is_uppercase() && prev_lower {
            out.push('_');
        }
        prev_lower = ch.is_lowercase() || ch.is_ascii_digit();
        out.extend(ch.to_uppercase());
    }
    out
}

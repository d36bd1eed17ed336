use rand::Rng;

/// Synthesizes a service id from its display name: `{normalized-name}-{8 hex
/// chars}`, e.g. `deckview-a1b2c3d4`.
///
/// Normalization: lowercase, strip anything that isn't alphanumeric,
/// whitespace or `-`; collapse runs of whitespace/underscore into a single
/// `-`; collapse runs of `-`; trim leading/trailing `-`; truncate to 20
/// characters. An empty result (e.g. a name of only punctuation) falls back
/// to `service`.
pub fn generate_service_id(name: &str) -> String {
    let lowered = name.to_lowercase();

    let filtered: String = lowered
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c.is_whitespace() || c == '_' {
                c
            } else {
                '\0'
            }
        })
        .filter(|&c| c != '\0')
        .collect();

    let mut normalized = String::with_capacity(filtered.len());
    let mut last_was_separator = false;
    for c in filtered.chars() {
        if c.is_whitespace() || c == '_' {
            if !last_was_separator {
                normalized.push('-');
            }
            last_was_separator = true;
        } else if c == '-' {
            if !last_was_separator {
                normalized.push('-');
            }
            last_was_separator = true;
        } else {
            normalized.push(c);
            last_was_separator = false;
        }
    }

    let normalized = normalized.trim_matches('-');
    let normalized: String = normalized.chars().take(20).collect();
    let normalized = normalized.trim_matches('-');

    let base = if normalized.is_empty() {
        "service"
    } else {
        normalized
    };

    format!("{base}-{}", random_hex_suffix())
}

fn random_hex_suffix() -> String {
    let mut rng = rand::thread_rng();
    (0..8)
        .map(|_| std::char::from_digit(rng.gen_range(0..16), 16).expect("0..16 is a valid hex digit"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prefix(id: &str) -> &str {
        id.rsplit_once('-').map(|(prefix, _)| prefix).unwrap_or(id)
    }

    #[test]
    fn normalizes_and_slugifies_the_name() {
        let id = generate_service_id("Deckview API");
        assert_eq!(prefix(&id), "deckview-api");
        assert!(id.ends_with(&id[id.len() - 8..]));
        assert_eq!(id.len(), "deckview-api".len() + 1 + 8);
    }

    #[test]
    fn strips_punctuation_and_collapses_separators() {
        let id = generate_service_id("  My__Cool!!  Service  ");
        assert_eq!(prefix(&id), "my-cool-service");
    }

    #[test]
    fn truncates_long_names_to_twenty_characters() {
        let id = generate_service_id("a-name-that-is-definitely-way-too-long-for-a-slug");
        let p = prefix(&id);
        assert!(p.len() <= 20, "prefix {p:?} exceeds 20 chars");
    }

    #[test]
    fn falls_back_to_service_for_punctuation_only_names() {
        let id = generate_service_id("!!!");
        assert_eq!(prefix(&id), "service");
    }

    #[test]
    fn appends_an_eight_character_hex_suffix() {
        let id = generate_service_id("auth");
        let suffix = &id[id.len() - 8..];
        assert_eq!(suffix.len(), 8);
        assert!(suffix.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn two_calls_with_the_same_name_differ() {
        let a = generate_service_id("auth");
        let b = generate_service_id("auth");
        assert_ne!(a, b);
    }
}

//! URL slug generation.

/// Lowercase, hyphen-separated, ASCII alphanumerics only.
///
/// Runs of anything else collapse to a single hyphen; leading and trailing
/// hyphens are trimmed. Returns `"item"` when nothing usable remains.
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_hyphen = false;

    for ch in input.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_hyphen = true;
        }
    }

    if slug.is_empty() {
        "item".to_string()
    } else {
        slug
    }
}

/// `base`, `base-1`, `base-2`, ... in the order they should be tried when
/// looking for a free slug.
pub fn slug_candidates(base: &str) -> impl Iterator<Item = String> + '_ {
    std::iter::once(base.to_string()).chain((1u32..).map(move |n| format!("{}-{}", base, n)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Heavy Equipment"), "heavy-equipment");
        assert_eq!(slugify("  Oil & Gas -- Services "), "oil-gas-services");
        assert_eq!(slugify("PT. Maju_Jaya 2024"), "pt-maju-jaya-2024");
        assert_eq!(slugify("***"), "item");
    }

    #[test]
    fn test_slug_candidates_append_counter() {
        let taken: HashSet<&str> = ["mining", "mining-1"].into_iter().collect();
        let free = slug_candidates("mining")
            .find(|s| !taken.contains(s.as_str()))
            .unwrap();
        assert_eq!(free, "mining-2");

        let first: Vec<String> = slug_candidates("oil").take(3).collect();
        assert_eq!(first, vec!["oil", "oil-1", "oil-2"]);
    }
}

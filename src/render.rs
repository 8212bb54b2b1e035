//! Text rendering of comparison results.

use std::fmt::Write;

use crate::compare::CompareResult;

pub const EXACT_MATCH_BANNER: &str = "✅ Match exact trouvé!";
pub const CLOSE_MATCHES_BANNER: &str = "🔍 Correspondances proches:";
pub const NO_MATCH_BANNER: &str = "🆕 Aucune correspondance trouvée";
pub const MATCH_LIST_HEADER: &str = "Meilleures correspondances:";

/// Rendering switches.
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderOptions {
    /// Show `name_fr` instead of `name` when the server sends it
    pub localized_names: bool,
}

/// Human-readable summary of a result.
///
/// The banner is chosen from, in order: exact match, single closest match,
/// non-empty match list, nothing. Matches are listed in server order.
pub fn render_result(result: &CompareResult, options: &RenderOptions) -> String {
    let mut out = String::new();

    if result.exact_match {
        out.push_str(EXACT_MATCH_BANNER);
    } else if let Some(closest) = &result.closest_match {
        let _ = write!(
            out,
            "🎯 Meilleure correspondance: {} (distance: {}",
            closest.name, closest.distance
        );
        if let Some(hash) = &closest.hash {
            let _ = write!(out, ", hash: {}", hash);
        }
        out.push(')');
    } else if !result.matches().is_empty() {
        out.push_str(CLOSE_MATCHES_BANNER);
    } else {
        out.push_str(NO_MATCH_BANNER);
    }
    out.push('\n');

    let _ = writeln!(out, "Hash: {}", result.hash);
    let _ = writeln!(out, "Type: {} (size: {})", result.hash_type, result.hash_size);

    let matches = result.matches();
    if !matches.is_empty() {
        out.push('\n');
        out.push_str(MATCH_LIST_HEADER);
        out.push('\n');
        for (i, entry) in matches.iter().enumerate() {
            let _ = writeln!(
                out,
                "{}. {} (distance: {})",
                i + 1,
                entry.display_name(options.localized_names),
                entry.distance
            );
        }
    }

    out
}

/// Error banner shown in place of a result.
pub fn render_error(message: impl std::fmt::Display) -> String {
    format!("❌ Erreur: {}", message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compare::{ClosestMatch, MatchEntry};

    fn base() -> CompareResult {
        CompareResult {
            exact_match: false,
            hash: "c3d2".to_string(),
            hash_type: "phash".to_string(),
            hash_size: "16".to_string(),
            total_matches: 0,
            closest_match: None,
            closest_matches: None,
        }
    }

    fn entry(name: &str, distance: f64) -> MatchEntry {
        MatchEntry {
            id: None,
            name: name.to_string(),
            name_fr: None,
            distance,
            hash: None,
        }
    }

    #[test]
    fn test_exact_match_banner_wins() {
        let result = CompareResult {
            exact_match: true,
            closest_match: Some(ClosestMatch {
                name: "Other".to_string(),
                distance: 4.0,
                hash: None,
            }),
            closest_matches: Some(vec![entry("A", 0.0)]),
            total_matches: 1,
            ..base()
        };
        let out = render_result(&result, &RenderOptions::default());
        assert!(out.starts_with(EXACT_MATCH_BANNER));
        assert!(!out.contains("Meilleure correspondance:"));
        assert!(!out.contains(CLOSE_MATCHES_BANNER));
    }

    #[test]
    fn test_no_match() {
        let out = render_result(&base(), &RenderOptions::default());
        assert_eq!(out, "🆕 Aucune correspondance trouvée\nHash: c3d2\nType: phash (size: 16)\n");
    }

    #[test]
    fn test_single_closest_match() {
        let result = CompareResult {
            closest_match: Some(ClosestMatch {
                name: "Pikachu".to_string(),
                distance: 3.0,
                hash: Some("c3d3".to_string()),
            }),
            ..base()
        };
        let out = render_result(&result, &RenderOptions::default());
        assert!(out.starts_with("🎯 Meilleure correspondance: Pikachu (distance: 3, hash: c3d3)\n"));
    }

    #[test]
    fn test_match_list_keeps_server_order() {
        let result = CompareResult {
            closest_matches: Some(vec![entry("B", 5.0), entry("A", 2.0)]),
            total_matches: 2,
            ..base()
        };
        let out = render_result(&result, &RenderOptions::default());
        assert!(out.starts_with(CLOSE_MATCHES_BANNER));
        let b = out.find("1. B (distance: 5)").unwrap();
        let a = out.find("2. A (distance: 2)").unwrap();
        assert!(b < a);
    }

    #[test]
    fn test_localized_names() {
        let mut fr = entry("Charizard", 1.0);
        fr.name_fr = Some("Dracaufeu".to_string());
        let result = CompareResult {
            closest_matches: Some(vec![fr, entry("Blastoise", 6.0)]),
            ..base()
        };

        let out = render_result(&result, &RenderOptions { localized_names: true });
        assert!(out.contains("1. Dracaufeu (distance: 1)"));
        assert!(out.contains("2. Blastoise (distance: 6)"));

        let out = render_result(&result, &RenderOptions::default());
        assert!(out.contains("1. Charizard (distance: 1)"));
    }

    #[test]
    fn test_render_error() {
        assert_eq!(render_error("bad image"), "❌ Erreur: bad image");
    }
}

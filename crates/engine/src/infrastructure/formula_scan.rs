//! Die-role tagging for formulas stored only as strings.
//!
//! Rolls built by this engine carry structured term tags. Chat messages
//! posted before that (or by other modules) only have the formula text and
//! the dice results, so roles are recovered from the text: a group whose
//! notation contains `d20` is the base die (so `1d200` counts too), any other
//! group is a boon when the sign in front of it is `+` (or absent) and a bane
//! when it is `-`.

use std::sync::LazyLock;

use regex_lite::Regex;
use serde::Serialize;
use weirdwizard_domain::DieRole;

static DIE_GROUP_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([+-])?\s*(\d*)d(\d+)((?:kh1?|r1)*)").expect("valid regex")
});

/// One die group found in a formula string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScannedGroup {
    /// The group as written, without its sign (`2d6kh`).
    pub notation: String,
    pub count: u32,
    pub faces: u32,
    pub role: DieRole,
}

/// Every die group of `formula`, in order.
pub fn scan_die_groups(formula: &str) -> Vec<ScannedGroup> {
    let lowered = formula.to_ascii_lowercase();
    DIE_GROUP_RE
        .captures_iter(&lowered)
        .filter_map(|caps| {
            let count = match caps.get(2).map(|m| m.as_str()) {
                None | Some("") => 1,
                Some(digits) => digits.parse().ok()?,
            };
            let faces: u32 = caps.get(3)?.as_str().parse().ok()?;
            let suffix = caps.get(4).map_or("", |m| m.as_str());
            let notation = format!("{}d{}{}", count, faces, suffix);
            let role = if notation.contains("d20") {
                DieRole::Base
            } else if caps.get(1).map(|m| m.as_str()) == Some("-") {
                DieRole::Bane
            } else {
                DieRole::Boon
            };
            Some(ScannedGroup {
                notation,
                count,
                faces,
                role,
            })
        })
        .collect()
}

/// A stored die result with its recovered role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaggedDie {
    pub role: DieRole,
    pub faces: u32,
    pub result: i32,
}

/// Tag stored results, given per die group in formula order.
///
/// Groups without results are skipped; results past the last group are
/// dropped.
pub fn tag_stored_dice(formula: &str, results: &[Vec<i32>]) -> Vec<TaggedDie> {
    scan_die_groups(formula)
        .into_iter()
        .zip(results)
        .flat_map(|(group, results)| {
            results.iter().map(move |&result| TaggedDie {
                role: group.role,
                faces: group.faces,
                result,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roles(formula: &str) -> Vec<DieRole> {
        scan_die_groups(formula).into_iter().map(|g| g.role).collect()
    }

    #[test]
    fn d20_is_base_and_signs_decide_the_rest() {
        assert_eq!(roles("1d20+2+2d6kh"), vec![DieRole::Base, DieRole::Boon]);
        assert_eq!(roles("1d20-1-3d6kh"), vec![DieRole::Base, DieRole::Bane]);
    }

    #[test]
    fn any_group_containing_d20_is_base() {
        assert_eq!(roles("1d200-1d6"), vec![DieRole::Base, DieRole::Bane]);
        assert_eq!(roles("2d2+1d12"), vec![DieRole::Boon, DieRole::Boon]);
    }

    #[test]
    fn several_d6_groups_keep_their_own_sign() {
        assert_eq!(
            roles("1d20+1d6+2d6kh-1d6kh"),
            vec![DieRole::Base, DieRole::Boon, DieRole::Boon, DieRole::Bane]
        );
    }

    #[test]
    fn spaced_damage_formula_with_modifiers() {
        let groups = scan_die_groups("2d6r1 + 1d6r1 + 2");
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].notation, "2d6r1");
        assert_eq!(groups[0].count, 2);
        assert_eq!(groups[1].notation, "1d6r1");
        assert!(groups.iter().all(|g| g.role == DieRole::Boon));
    }

    #[test]
    fn bare_d6_counts_one_die() {
        let groups = scan_die_groups("d6");
        assert_eq!(groups[0].count, 1);
        assert_eq!(groups[0].faces, 6);
    }

    #[test]
    fn tags_results_per_group() {
        let dice = tag_stored_dice("1d20+2-2d6kh", &[vec![14], vec![3, 5]]);
        assert_eq!(
            dice,
            vec![
                TaggedDie { role: DieRole::Base, faces: 20, result: 14 },
                TaggedDie { role: DieRole::Bane, faces: 6, result: 3 },
                TaggedDie { role: DieRole::Bane, faces: 6, result: 5 },
            ]
        );
    }

    #[test]
    fn no_dice_no_groups() {
        assert!(scan_die_groups("5 + 2").is_empty());
        assert!(tag_stored_dice("", &[vec![1]]).is_empty());
    }
}

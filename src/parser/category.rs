/// Record set kinds found on the site. Declaration order is output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    Aircrafts,
    Engines,
    Listings,
    Companies,
}

/// One row of the marker dispatch table: how a category is found and shaped.
#[derive(Debug)]
pub struct CategoryRule {
    pub category: Category,
    /// JS variable holding the array literal (`var <name> = [...]`).
    pub var_name: &'static str,
    pub sheet_name: &'static str,
    /// Applied to the raw literal before JSON decoding.
    pub fixups: &'static [(&'static str, &'static str)],
    pub renames: &'static [(&'static str, &'static str)],
    pub drops: &'static [&'static str],
    /// Uppercase field names and split the composite contact field.
    pub decompose_contact: bool,
}

/// Zero-width space inside "Outright": as served, and mis-decoded upstream as
/// Latin-1 or Windows-1252.
pub const OUTRIGHT_FIXUPS: &[(&str, &str)] = &[
    ("Out\u{200b}right", "Outright"),
    ("Out\u{e2}\u{80}\u{8b}right", "Outright"),
    ("Out\u{e2}\u{20ac}\u{2039}right", "Outright"),
];

const LISTING_DROPS: &[&str] = &["yom", "hc", "engines", "cc"];

pub const RULES: &[CategoryRule] = &[
    CategoryRule {
        category: Category::Aircrafts,
        var_name: "aircrafts",
        sheet_name: "Aircrafts",
        fixups: OUTRIGHT_FIXUPS,
        renames: &[("hc", "H/C")],
        drops: &[],
        decompose_contact: true,
    },
    CategoryRule {
        category: Category::Engines,
        var_name: "engines",
        sheet_name: "Engines",
        fixups: &[],
        renames: &[],
        drops: LISTING_DROPS,
        decompose_contact: true,
    },
    CategoryRule {
        category: Category::Listings,
        var_name: "listings",
        sheet_name: "Listings",
        fixups: &[],
        renames: &[],
        drops: LISTING_DROPS,
        decompose_contact: true,
    },
    CategoryRule {
        category: Category::Companies,
        var_name: "products",
        sheet_name: "Companies",
        fixups: &[],
        renames: &[],
        drops: &[],
        decompose_contact: false,
    },
];

impl Category {
    pub fn rule(self) -> &'static CategoryRule {
        // RULES holds exactly one row per variant, in declaration order.
        &RULES[self as usize]
    }

    pub fn key(self) -> &'static str {
        match self {
            Category::Aircrafts => "aircrafts",
            Category::Engines => "engines",
            Category::Listings => "listings",
            Category::Companies => "companies",
        }
    }

    pub fn sheet_name(self) -> &'static str {
        self.rule().sheet_name
    }

    /// Literal substring whose presence in a script block triggers a capture.
    pub fn marker(self) -> String {
        format!("var {}", self.rule().var_name)
    }
}

/// Apply the category's text fixups to a captured literal.
pub fn apply_fixups(rule: &CategoryRule, literal: &str) -> String {
    rule.fixups
        .iter()
        .fold(literal.to_string(), |acc, (from, to)| acc.replace(*from, to))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rules_follow_declaration_order() {
        for (i, rule) in RULES.iter().enumerate() {
            assert_eq!(rule.category as usize, i);
        }
        assert_eq!(Category::Engines.rule().var_name, "engines");
        assert_eq!(Category::Companies.marker(), "var products");
    }

    #[test]
    fn outright_fixup_repairs_mojibake() {
        let rule = Category::Aircrafts.rule();
        let broken = "[{\"terms\":\"Out\u{e2}\u{80}\u{8b}right sale\"}]";
        assert_eq!(apply_fixups(rule, &broken), r#"[{"terms":"Outright sale"}]"#);

        assert_eq!(apply_fixups(rule, "Out\u{200b}right"), "Outright");

        let cp1252 = "Out\u{e2}\u{20ac}\u{2039}right / Lease";
        assert_eq!(apply_fixups(rule, cp1252), "Outright / Lease");
    }

    #[test]
    fn outright_fixup_is_idempotent() {
        let rule = Category::Aircrafts.rule();
        let clean = "Outright, Outright and Lease";
        assert_eq!(apply_fixups(rule, clean), clean);
        let once = apply_fixups(rule, "Out\u{e2}\u{80}\u{8b}right");
        assert_eq!(apply_fixups(rule, &once), once);
    }

    #[test]
    fn fixups_scoped_to_aircrafts() {
        for broken in ["Out\u{e2}\u{80}\u{8b}right", "Out\u{200b}right"] {
            for category in [Category::Engines, Category::Listings, Category::Companies] {
                assert_eq!(apply_fixups(category.rule(), broken), broken);
            }
        }
    }
}

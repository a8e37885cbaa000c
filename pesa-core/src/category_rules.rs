//! Deterministic merchant-name to category mapping.
//!
//! Case-insensitive substring membership over an ordered keyword table;
//! the first rule containing a matching keyword wins. Order resolves
//! overlaps: "SAFARICOM HOME" must land on Utilities before the bare
//! "SAFARICOM" airtime keyword can claim it, and savings products named
//! after banks must be checked before the banks themselves.

struct CategoryRule {
    keywords: &'static [&'static str],
    category: &'static str,
}

const RULES: &[CategoryRule] = &[
    // Savings products first: several share names with banks and telcos
    CategoryRule {
        keywords: &["M-SHWARI", "KCB M-PESA", "MALI", "MMF", "SACCO", "UNIT TRUST", "MONEY MARKET"],
        category: "Savings",
    },
    // Fixed-line/utility products, above the bare telco keywords
    CategoryRule {
        keywords: &[
            "SAFARICOM HOME",
            "KPLC",
            "KENYA POWER",
            "NAIROBI WATER",
            "ZUKU",
            "DSTV",
            "GOTV",
        ],
        category: "Utilities",
    },
    CategoryRule {
        keywords: &["SAFARICOM", "AIRTEL", "TELKOM"],
        category: "Airtime",
    },
    CategoryRule {
        keywords: &["NAIVAS", "CARREFOUR", "QUICKMART", "CLEANSHELF", "CHANDARANA"],
        category: "Groceries",
    },
    CategoryRule {
        keywords: &["JAVA HOUSE", "ARTCAFFE", "KFC", "CHICKEN INN", "PIZZA", "BURGER"],
        category: "Dining",
    },
    // Fuel stations and rail; ride-hailing intentionally absent, those
    // merchants resolve through the cache or the remote pass
    CategoryRule {
        keywords: &["SHELL", "TOTAL ENERGIES", "RUBIS", "OLA ENERGY", "SGR", "MADARAKA EXPRESS"],
        category: "Transport",
    },
    CategoryRule {
        keywords: &["PHARMACY", "CHEMIST", "HOSPITAL", "CLINIC"],
        category: "Health",
    },
    CategoryRule {
        keywords: &["RENT", "LANDLORD", "APARTMENTS"],
        category: "Rent",
    },
    // Extractor prefixes agent cash-outs with "Agent "
    CategoryRule {
        keywords: &["AGENT "],
        category: "Cash Withdrawal",
    },
];

/// Look up a category for a merchant display name. `None` is a normal
/// outcome and sends the cascade on to the cache and remote layers.
pub fn category_for(merchant: &str) -> Option<&'static str> {
    let name = merchant.to_uppercase();
    for rule in RULES {
        if rule.keywords.iter().any(|k| name.contains(k)) {
            return Some(rule.category);
        }
    }
    None
}

//! Ordered regex cascade over raw statement-line descriptions.
//!
//! The first rule whose pattern matches wins and no further rules are
//! tried, so specific bank layouts must sit above generic formats. A
//! reshuffle here changes behavior; the table is a plain slice for that
//! reason, never a map.

use std::sync::LazyLock;

use regex::Regex;

/// Result of a single extraction attempt. No match is a normal outcome:
/// the cache key then falls back to the trimmed description itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeuristicResult {
    pub merchant: Option<String>,
    pub cache_key: String,
}

struct PatternRule {
    name: &'static str,
    re: Regex,
    /// Literal prefix prepended to the captured text ("Agent " for agent
    /// withdrawals, so cash-out points read as agents, not merchants)
    prefix: Option<&'static str>,
}

fn rule(name: &'static str, pattern: &str, prefix: Option<&'static str>) -> PatternRule {
    PatternRule {
        name,
        re: Regex::new(pattern).unwrap(),
        prefix,
    }
}

static MERCHANT_RULES: LazyLock<Vec<PatternRule>> = LazyLock::new(|| {
    vec![
        // IBKG bank relay of an M-PESA payment. The payee sits between the
        // phone-number dash and the first " KE-" marker. Must precede the
        // generic pay-to rule, which would swallow the whole reference tail.
        rule("ibkg-mpesa-pay", r"^IBKG MPESA PAY TO \d+-(.+?) KE-", None),
        // Card processor layout: merchant text runs up to the dd-mm-yyyy
        // timestamp. More specific than any pay-to/paid-to wording.
        rule("debit-card", r"^DEBIT CARD TXN AT (.+?)\s+\d{2}-\d{2}-\d{4}", None),
        // M-PESA agent cash-out: "Withdraw Ksh... from 084316 - DUKA LA PESA"
        rule(
            "agent-withdraw",
            r"(?i)withdraw ksh[\d,.]+ from \d+ ?- ?(.+?)(?: new m-pesa| new balance|\.|$)",
            Some("Agent "),
        ),
        // M-PESA paybill / buy-goods: "Ksh1,450.00 paid to KPLC PREPAID for account ..."
        rule(
            "mpesa-paid-to",
            r"(?i)ksh[\d,.]+ paid to (.+?)(?: for account| ref|\.|$)",
            None,
        ),
        // Person-to-person send: name runs up to the phone number or "on <date>"
        rule(
            "mpesa-sent-to",
            r"(?i)sent to ([a-z .'-]+?)(?: 07\d{8}| \+?2547\d{8}| on )",
            None,
        ),
        rule(
            "mpesa-received-from",
            r"(?i)received ksh[\d,.]+ from ([a-z .'-]+?)(?: 07\d{8}| \+?2547\d{8}| on |\.|$)",
            None,
        ),
        // Generic bank pay-to, last resort before giving up. Kept below the
        // bank-specific layouts: on those formats it captures reference
        // noise instead of the payee.
        rule("bank-pay-to", r"(?i)\bpay to (?:\d+-)?([a-z0-9 .&'-]+)", None),
    ]
});

fn collapse_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Name of the first rule matching `description`, with the merchant it
/// extracts. Exposed for tests asserting which extraction path fired.
pub fn match_merchant_rule(description: &str) -> Option<(&'static str, String)> {
    let trimmed = description.trim();
    for r in MERCHANT_RULES.iter() {
        if let Some(caps) = r.re.captures(trimmed) {
            let captured = caps.get(1).map(|m| m.as_str()).unwrap_or("");
            let mut merchant = collapse_ws(captured);
            if merchant.is_empty() {
                continue;
            }
            if let Some(p) = r.prefix {
                merchant.insert_str(0, p);
            }
            return Some((r.name, merchant));
        }
    }
    None
}

/// Map a raw description to an optional merchant and a cache key.
///
/// On a match the cache key equals the extracted merchant; otherwise it is
/// the trimmed input itself, so unresolved descriptions cache under their
/// own literal text.
pub fn extract_merchant(description: &str) -> HeuristicResult {
    match match_merchant_rule(description) {
        Some((_, merchant)) => HeuristicResult {
            cache_key: merchant.clone(),
            merchant: Some(merchant),
        },
        None => HeuristicResult {
            merchant: None,
            cache_key: description.trim().to_string(),
        },
    }
}

static POINTS_RULES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(r"(?i)(?:bonga|loyalty) points balance (?:is )?([\d,]+)").unwrap(),
        Regex::new(r"(?i)you have earned ([\d,]+) (?:bonga |loyalty )?points").unwrap(),
        Regex::new(r"(?i)points balance[: ]+([\d,]+)").unwrap(),
    ]
});

/// Pull a loyalty-points balance out of free text. Same single-first-match
/// policy as the merchant rules, over its own list. Used only for
/// loyalty-card bookkeeping, independent of merchant resolution.
pub fn extract_points(text: &str) -> Option<i64> {
    for re in POINTS_RULES.iter() {
        if let Some(caps) = re.captures(text.trim()) {
            let raw = caps.get(1)?.as_str().replace(',', "");
            return raw.parse().ok();
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const IBKG_LINE: &str = "IBKG MPESA PAY TO 254117449222-MOBILE MONEY KE-IBNK-HAOSP9 KE-016-251119-213837517-051220-045";
    const DEBIT_LINE: &str = "DEBIT CARD TXN AT UBER * PENDING AMSTERDAM     17-11-2025 / 08:52:09 47-83-9408 16530408 4783940816530408";

    #[test]
    fn test_ibkg_line_takes_the_bank_rule() {
        let (name, merchant) = match_merchant_rule(IBKG_LINE).unwrap();
        assert_eq!(name, "ibkg-mpesa-pay");
        assert_eq!(merchant, "MOBILE MONEY");
        let r = extract_merchant(IBKG_LINE);
        assert_eq!(r.merchant.as_deref(), Some("MOBILE MONEY"));
        assert_eq!(r.cache_key, "MOBILE MONEY");
    }

    #[test]
    fn test_generic_pay_to_would_misread_ibkg() {
        // Ordering commitment: the generic rule does match the IBKG layout,
        // but captures reference noise. The specific rule must win.
        let generic = MERCHANT_RULES
            .iter()
            .find(|r| r.name == "bank-pay-to")
            .unwrap();
        let caps = generic.re.captures(IBKG_LINE).unwrap();
        assert_ne!(caps.get(1).unwrap().as_str(), "MOBILE MONEY");
    }

    #[test]
    fn test_debit_card_extracts_merchant_and_normalizes_whitespace() {
        let (name, merchant) = match_merchant_rule(DEBIT_LINE).unwrap();
        assert_eq!(name, "debit-card");
        assert_eq!(merchant, "UBER * PENDING AMSTERDAM");
        let r = extract_merchant(DEBIT_LINE);
        assert_eq!(r.cache_key, "UBER * PENDING AMSTERDAM");
    }

    #[test]
    fn test_agent_withdraw_gets_prefix() {
        let line = "TAH6KL123 Confirmed. Withdraw Ksh2,500.00 from 084316 - DUKA LA PESA RONGAI New M-PESA balance is Ksh3,210.00.";
        let r = extract_merchant(line);
        assert_eq!(r.merchant.as_deref(), Some("Agent DUKA LA PESA RONGAI"));
        assert_eq!(r.cache_key, "Agent DUKA LA PESA RONGAI");
    }

    #[test]
    fn test_paybill_payment() {
        let line = "QGH7XK55M Confirmed. Ksh1,450.00 paid to KPLC PREPAID for account 54405123.";
        let r = extract_merchant(line);
        assert_eq!(r.merchant.as_deref(), Some("KPLC PREPAID"));
    }

    #[test]
    fn test_sent_to_person() {
        let line = "QGH8AB123 Confirmed. Ksh1,000.00 sent to JANE WANJIKU 0722123456 on 17/11/25 at 9:01 AM.";
        let r = extract_merchant(line);
        assert_eq!(r.merchant.as_deref(), Some("JANE WANJIKU"));
    }

    #[test]
    fn test_no_match_caches_by_trimmed_literal() {
        let r = extract_merchant("  SOME OPAQUE BANK CODE 991 \n");
        assert_eq!(r.merchant, None);
        assert_eq!(r.cache_key, "SOME OPAQUE BANK CODE 991");
    }

    #[test]
    fn test_points_balance_with_commas() {
        assert_eq!(
            extract_points("Thank you! Bonga points balance is 12,430 as of today"),
            Some(12430)
        );
        assert_eq!(extract_points("You have earned 55 points this week"), Some(55));
        assert_eq!(extract_points("No points here"), None);
    }
}

//! Scanning `account_tx` pages for a memo.
//!
//! The transaction list is looked up by name (`result.transactions`). Each
//! entry wraps its transaction as `tx` (API v1) or `tx_json` (API v2); v2
//! also moves `date` and `hash` up to the entry, so both places are checked.

use serde_json::Value;

use crate::utils::{NotaryError, Result};

/// A transaction whose first memo carried the data we looked for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HistoryMatch {
    /// Ledger close time, seconds since 2000-01-01T00:00:00Z.
    pub timestamp: Option<u64>,
    pub tx_hash: Option<String>,
}

#[derive(Clone, Debug)]
pub struct HistoryPage {
    pub matched: Option<HistoryMatch>,
    /// Present when more history is available.
    pub marker: Option<Value>,
    pub scanned: usize,
}

fn first_memo_data(tx: &Value) -> Option<&str> {
    tx.get("Memos")?
        .as_array()?
        .first()?
        .get("Memo")?
        .get("MemoData")?
        .as_str()
}

/// Scan one `account_tx` result for the first transaction whose first memo's
/// data equals `memo_data_hex` (hex compared case-insensitively).
pub fn scan_page(result: &Value, memo_data_hex: &str) -> Result<HistoryPage> {
    let transactions = result
        .get("transactions")
        .and_then(Value::as_array)
        .ok_or_else(|| NotaryError::MalformedResponse("account_tx result has no transactions list".into()))?;

    let matched = transactions.iter().find_map(|entry| {
        let tx = entry.get("tx").or_else(|| entry.get("tx_json"))?;
        let data = first_memo_data(tx)?;
        if !data.eq_ignore_ascii_case(memo_data_hex) {
            return None;
        }
        let field = |name: &str| tx.get(name).or_else(|| entry.get(name));
        Some(HistoryMatch {
            timestamp: field("date").and_then(Value::as_u64),
            tx_hash: field("hash").and_then(Value::as_str).map(str::to_string),
        })
    });

    let marker = result.get("marker").filter(|m| !m.is_null()).cloned();
    Ok(HistoryPage { matched, marker, scanned: transactions.len() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn memo_tx(data: &str, date: u64) -> Value {
        json!({
            "meta": {},
            "tx": {
                "Account": "rHb9CJAWyB4rj91VRWn96DkukG4bwdtyTh",
                "TransactionType": "AccountSet",
                "Memos": [{ "Memo": { "MemoType": "48617368", "MemoData": data } }],
                "date": date,
                "hash": "AB"
            },
            "validated": true
        })
    }

    #[test]
    fn test_first_match_wins() {
        let result = json!({
            "account": "rHb9CJAWyB4rj91VRWn96DkukG4bwdtyTh",
            "ledger_index_max": 100,
            "ledger_index_min": 1,
            "limit": 200,
            "transactions": [memo_tx("3131", 5), memo_tx("3232", 6), memo_tx("3232", 7)]
        });
        let page = scan_page(&result, "3232").unwrap();
        assert_eq!(page.matched, Some(HistoryMatch { timestamp: Some(6), tx_hash: Some("AB".into()) }));
        assert_eq!(page.scanned, 3);
        assert!(page.marker.is_none());
    }

    #[test]
    fn test_not_found_and_marker() {
        let result = json!({
            "transactions": [memo_tx("3131", 5)],
            "marker": { "ledger": 10, "seq": 2 }
        });
        let page = scan_page(&result, "3232").unwrap();
        assert!(page.matched.is_none());
        assert_eq!(page.marker, Some(json!({ "ledger": 10, "seq": 2 })));
    }

    #[test]
    fn test_api_v2_layout() {
        let result = json!({
            "transactions": [{
                "tx_json": { "Memos": [{ "Memo": { "MemoData": "6162" } }] },
                "date": 812_345_678u64,
                "hash": "CD",
                "validated": true
            }]
        });
        let page = scan_page(&result, "6162").unwrap();
        assert_eq!(page.matched, Some(HistoryMatch { timestamp: Some(812_345_678), tx_hash: Some("CD".into()) }));
    }

    #[test]
    fn test_case_insensitive_hex_and_first_memo_only() {
        let result = json!({
            "transactions": [
                { "tx": { "Memos": [
                    { "Memo": { "MemoData": "00" } },
                    { "Memo": { "MemoData": "6e6f" } }
                ] } },
                { "tx": { "Memos": [{ "Memo": { "MemoData": "6E6F" } }] } }
            ]
        });
        let page = scan_page(&result, "6e6f").unwrap();
        // second memo of the first tx is ignored; match has no date
        assert_eq!(page.matched, Some(HistoryMatch { timestamp: None, tx_hash: None }));
    }

    #[test]
    fn test_entries_without_memos_skipped() {
        let result = json!({ "transactions": [{ "tx": { "TransactionType": "Payment" } }, {}] });
        assert!(scan_page(&result, "00").unwrap().matched.is_none());
    }

    #[test]
    fn test_missing_transactions_is_malformed() {
        let err = scan_page(&json!({ "account": "r" }), "00").unwrap_err();
        assert!(matches!(err, NotaryError::MalformedResponse(_)));
    }
}

//! Key normalization
//!
//! Rewrites mixed/camel-case mapping keys to snake case.

use crate::document::Record;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

/// Capitalized word preceded by any character (`SSBFreq` → `SSB_Freq`)
static WORD_BOUNDARY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(.)([A-Z][a-z]+)").expect("word boundary pattern"));

/// Lowercase or digit followed by uppercase (`trigChan` → `trig_Chan`)
static CASE_BOUNDARY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([a-z0-9])([A-Z])").expect("case boundary pattern"));

/// Convert one key to snake case
///
/// # Examples
/// ```
/// use labconf_migrate::snakeify;
///
/// assert_eq!(snakeify("SSBFreq"), "ssb_freq");
/// assert_eq!(snakeify("trigChan"), "trig_chan");
/// assert_eq!(snakeify("i_ffreq"), "i_ffreq");
/// ```
#[must_use]
pub fn snakeify(name: &str) -> String {
    let words = WORD_BOUNDARY.replace_all(name, "${1}_${2}");
    CASE_BOUNDARY.replace_all(&words, "${1}_${2}").to_lowercase()
}

/// Snake-case every key at depth `start_depth` or deeper
///
/// Depth 0 is `map` itself. Mapping values are recursed into; values inside
/// sequences are left alone. When two keys of one mapping normalize to the
/// same name, the one that was already normalized wins.
#[must_use]
pub fn rec_snakeify(map: &Record, start_depth: usize) -> Record {
    rename_below(map, start_depth, 0)
}

fn rename_below(map: &Record, start_depth: usize, depth: usize) -> Record {
    let mut out = Record::new();
    let mut renamed = Vec::new();

    for (key, value) in map {
        let value = match value {
            Value::Object(inner) => Value::Object(rename_below(inner, start_depth, depth + 1)),
            other => other.clone(),
        };

        if depth < start_depth {
            out.insert(key.clone(), value);
            continue;
        }
        let snake = snakeify(key);
        if snake == *key {
            out.insert(snake, value);
        } else {
            renamed.push((snake, value));
        }
    }

    for (key, value) in renamed {
        out.entry(key).or_insert(value);
    }
    out
}

//! Remediation text parsing
//!
//! Scans the model's free-form answer and extracts the structured fix
//! entries it was asked to emit: a `File:` line, a `Block Name:` line, and
//! an hcl-tagged fenced code block holding the complete replacement.

use regex::Regex;

/// One extracted fix: target file, raw block header text, and the verbatim
/// replacement block (header through closing brace).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixRecord {
    pub file: String,
    pub block_name: String,
    pub suggestion: String,
}

/// Extract fix records from remediation text, in appearance order.
///
/// An entry is the marker triple `File:`, `Block Name:`, then an hcl fence,
/// with arbitrary prose tolerated between the block-name line and the fence
/// and between entries. Matching is non-greedy per entry so consecutive
/// entries never merge. Entries missing any part of the triple are dropped
/// silently; malformed input yields fewer records, not an error.
pub fn extract_fixes(response: &str) -> Vec<FixRecord> {
    let re = match Regex::new(r"(?s)File:\s*(.*?)\nBlock Name:\s*(.*?)\n.*?```hcl(.*?)```") {
        Ok(re) => re,
        Err(_) => return Vec::new(),
    };

    re.captures_iter(response)
        .map(|cap| FixRecord {
            file: cap[1].trim().to_string(),
            block_name: cap[2].trim().to_string(),
            suggestion: cap[3].trim().to_string(),
        })
        .collect()
}

//! Block header parsing
//!
//! Turns a header string like `resource "aws_instance" "example"` into a
//! typed descriptor the locator can match against.

/// Parsed identity of a named HCL block: a kind plus up to two labels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockDescriptor {
    pub kind: String,
    pub label1: Option<String>,
    pub label2: Option<String>,
    /// More than two quoted labels were present. Both labels are unset and
    /// the descriptor must never locate a block: a bare-kind prefix would
    /// silently match the first block of that kind.
    pub ambiguous: bool,
}

impl BlockDescriptor {
    /// Parse a block header string.
    ///
    /// Quoted substrings become the labels in order; the first whitespace
    /// token is the kind. Zero quoted substrings means an unlabeled block
    /// (`locals`, `terraform`). More than two is ambiguous and both labels
    /// are left unset — callers will fail to locate such a block, which is
    /// the intended outcome.
    pub fn parse(header: &str) -> Self {
        let kind = header
            .split_whitespace()
            .next()
            .unwrap_or_default()
            .to_string();

        let labels = quoted_parts(header);

        let (label1, label2) = match labels.len() {
            1 => (Some(labels[0].clone()), None),
            2 => (Some(labels[0].clone()), Some(labels[1].clone())),
            _ => (None, None),
        };

        Self {
            kind,
            label1,
            label2,
            ambiguous: labels.len() > 2,
        }
    }

    /// The line prefix a block opening this descriptor must start with,
    /// matching exactly which labels are present.
    pub fn header_prefix(&self) -> String {
        match (&self.label1, &self.label2) {
            (Some(l1), Some(l2)) => format!("{} \"{}\" \"{}\"", self.kind, l1, l2),
            (Some(l1), None) => format!("{} \"{}\"", self.kind, l1),
            _ => self.kind.clone(),
        }
    }
}

/// Collect the contents of double-quoted substrings, in order.
fn quoted_parts(s: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut rest = s;
    while let Some(open) = rest.find('"') {
        let after = &rest[open + 1..];
        match after.find('"') {
            Some(close) => {
                parts.push(after[..close].to_string());
                rest = &after[close + 1..];
            }
            None => break,
        }
    }
    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_two_labels() {
        let d = BlockDescriptor::parse("resource \"aws_instance\" \"example\"");
        assert_eq!(d.kind, "resource");
        assert_eq!(d.label1.as_deref(), Some("aws_instance"));
        assert_eq!(d.label2.as_deref(), Some("example"));
        assert_eq!(d.header_prefix(), "resource \"aws_instance\" \"example\"");
    }

    #[test]
    fn test_parse_one_label() {
        let d = BlockDescriptor::parse("module \"vpc\"");
        assert_eq!(d.kind, "module");
        assert_eq!(d.label1.as_deref(), Some("vpc"));
        assert_eq!(d.label2, None);
        assert_eq!(d.header_prefix(), "module \"vpc\"");
    }

    #[test]
    fn test_parse_unlabeled() {
        let d = BlockDescriptor::parse("locals");
        assert_eq!(d.kind, "locals");
        assert_eq!(d.label1, None);
        assert_eq!(d.label2, None);
        assert_eq!(d.header_prefix(), "locals");
    }

    #[test]
    fn test_parse_three_labels_is_ambiguous() {
        let d = BlockDescriptor::parse("resource \"a\" \"b\" \"c\"");
        assert_eq!(d.kind, "resource");
        assert_eq!(d.label1, None);
        assert_eq!(d.label2, None);
        assert!(d.ambiguous);
    }

    #[test]
    fn test_unlabeled_is_not_ambiguous() {
        assert!(!BlockDescriptor::parse("locals").ambiguous);
        assert!(!BlockDescriptor::parse("module \"vpc\"").ambiguous);
    }

    #[test]
    fn test_parse_empty_string() {
        let d = BlockDescriptor::parse("");
        assert_eq!(d.kind, "");
        assert_eq!(d.label1, None);
    }

    #[test]
    fn test_unterminated_quote_ignored() {
        let d = BlockDescriptor::parse("module \"vpc");
        assert_eq!(d.kind, "module");
        assert_eq!(d.label1, None);
        assert_eq!(d.label2, None);
    }
}

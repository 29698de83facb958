//! Block span location
//!
//! Finds the inclusive line range of a named block in a Terraform file
//! using header matching plus brace-depth tracking.
//!
//! Depth tracking is purely lexical: it does not special-case braces inside
//! quoted strings or comments, so a block whose attribute values contain
//! literal `{`/`}` characters can desynchronize the count. That is an
//! accepted fidelity boundary of this locator, not something callers should
//! try to compensate for.

use crate::block::BlockDescriptor;

/// 1-based inclusive line range of a block, header through closing brace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineSpan {
    pub start: usize,
    pub end: usize,
}

impl LineSpan {
    pub fn line_count(&self) -> usize {
        self.end.saturating_sub(self.start) + 1
    }
}

/// Locate the block matching `descriptor` in `lines`.
///
/// A candidate start is a line (trimmed) that begins with the descriptor's
/// header prefix and ends with an opening brace, seen while not inside any
/// block. From there every line adjusts the depth by its brace counts; the
/// line bringing depth back to zero closes the block.
///
/// Returns `None` when no candidate start exists or the braces never balance
/// before end of file — never a partial span.
pub fn find_block_span(lines: &[String], descriptor: &BlockDescriptor) -> Option<LineSpan> {
    // An ambiguous descriptor would degrade to a bare-kind prefix and hit
    // the first block of that kind; refuse instead of guessing.
    if descriptor.ambiguous {
        return None;
    }

    let expected = descriptor.header_prefix();

    let mut start_idx: Option<usize> = None;
    let mut depth: i32 = 0;

    for (i, line) in lines.iter().enumerate() {
        let stripped = line.trim();

        if start_idx.is_none() {
            if stripped.starts_with(&expected) && stripped.ends_with('{') {
                start_idx = Some(i);
                depth = 1;
            }
            continue;
        }

        depth += line.matches('{').count() as i32;
        depth -= line.matches('}').count() as i32;
        if depth == 0 {
            return start_idx.map(|s| LineSpan {
                start: s + 1,
                end: i + 1,
            });
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(s: &str) -> Vec<String> {
        s.lines().map(|l| l.to_string()).collect()
    }

    #[test]
    fn test_find_simple_resource() {
        let file = lines(
            "provider \"aws\" {\n  region = \"us-east-1\"\n}\n\nresource \"aws_instance\" \"example\" {\n  ami = \"x\"\n}\n",
        );
        let d = BlockDescriptor::parse("resource \"aws_instance\" \"example\"");
        let span = find_block_span(&file, &d).unwrap();
        assert_eq!(span, LineSpan { start: 5, end: 7 });
        assert_eq!(span.line_count(), 3);
    }

    #[test]
    fn test_find_with_nested_blocks() {
        let file = lines(
            "resource \"aws_instance\" \"web\" {\n  ami = \"x\"\n  root_block_device {\n    volume_size = 20\n    tags = {\n      Name = \"root\"\n    }\n  }\n}\nresource \"aws_s3_bucket\" \"b\" {\n}\n",
        );
        let d = BlockDescriptor::parse("resource \"aws_instance\" \"web\"");
        let span = find_block_span(&file, &d).unwrap();
        assert_eq!(span, LineSpan { start: 1, end: 9 });

        let trimmed_start = file[span.start - 1].trim();
        assert!(trimmed_start.starts_with(&d.header_prefix()));
        assert_eq!(file[span.end - 1].trim(), "}");
    }

    #[test]
    fn test_find_unlabeled_block() {
        let file = lines("locals {\n  name = \"demo\"\n}\n");
        let d = BlockDescriptor::parse("locals");
        let span = find_block_span(&file, &d).unwrap();
        assert_eq!(span, LineSpan { start: 1, end: 3 });
    }

    #[test]
    fn test_header_absent_returns_none() {
        let file = lines("resource \"aws_instance\" \"other\" {\n  ami = \"x\"\n}\n");
        let d = BlockDescriptor::parse("resource \"aws_instance\" \"example\"");
        assert!(find_block_span(&file, &d).is_none());
    }

    #[test]
    fn test_unbalanced_braces_return_none() {
        let file = lines("resource \"aws_instance\" \"example\" {\n  ami = \"x\"\n");
        let d = BlockDescriptor::parse("resource \"aws_instance\" \"example\"");
        assert!(find_block_span(&file, &d).is_none());
    }

    #[test]
    fn test_wrong_label_not_matched() {
        let file = lines("module \"vpc\" {\n  source = \"./vpc\"\n}\n");
        let d = BlockDescriptor::parse("module \"vpc\"");
        let span = find_block_span(&file, &d).unwrap();
        assert_eq!(span, LineSpan { start: 1, end: 3 });

        let wrong = BlockDescriptor::parse("module \"network\"");
        assert!(find_block_span(&file, &wrong).is_none());
    }

    #[test]
    fn test_ambiguous_descriptor_never_locates() {
        let file = lines("resource \"aws_instance\" \"a\" {\n  ami = \"x\"\n}\n");
        let d = BlockDescriptor::parse("resource \"aws_instance\" \"a\" \"extra\"");
        assert!(find_block_span(&file, &d).is_none());
    }

    #[test]
    fn test_braces_inside_strings_desynchronize() {
        // Documented limitation: a literal `{` inside a string value bumps
        // the depth and the closing brace line no longer balances it.
        let file = lines(
            "resource \"aws_iam_policy\" \"p\" {\n  policy = \"{\"\n}\n",
        );
        let d = BlockDescriptor::parse("resource \"aws_iam_policy\" \"p\"");
        assert!(find_block_span(&file, &d).is_none());
    }

    #[test]
    fn test_first_match_wins() {
        let file = lines(
            "resource \"aws_instance\" \"example\" {\n  ami = \"a\"\n}\nresource \"aws_instance\" \"example\" {\n  ami = \"b\"\n}\n",
        );
        let d = BlockDescriptor::parse("resource \"aws_instance\" \"example\"");
        let span = find_block_span(&file, &d).unwrap();
        assert_eq!(span, LineSpan { start: 1, end: 3 });
    }
}

//! Prompt builder for the remediation call
//!
//! The user prompt enforces a strict per-issue output format; the response
//! parser in `remediation` depends on the model honoring it. Keep the two
//! in sync when changing either side.

pub const SYSTEM_PROMPT: &str = "You are a Terraform and AWS expert.";

/// Build the analysis prompt from the failure log and retrieved context.
pub fn build_remediation_prompt(log: &str, context: &str) -> String {
    format!(
        r##"ROLE: You are a Terraform expert. Analyze this failure log systematically and provide solutions to fix in code.

CRITICAL REQUIREMENTS:
- NEVER use "# other configurations..." or "..." or any truncation
- Always provide COMPLETE resource blocks with ALL existing attributes
- Work with ANY AWS resource type (EC2, S3, RDS, Lambda, SQS, etc.)
- Preserve ALL original attributes, nested blocks, and configurations
- Only fix the specific error - keep everything else identical

REQUIRED OUTPUT FORMAT (no deviations):

File: [file_path]
Block Name: [block_type] "[block_name]"
Issue: [one sentence description]
Solution:
```hcl
[complete fixed code block, no omissions]
```

ANALYSIS RULES:
- Analyze errors in the order they appear in the log
- Include COMPLETE resource blocks in solutions (not partial)
- Only output blocks that contain actual errors
- Use exact file paths from the log
- Maintain ALL original attributes, tags, lifecycle blocks, etc.
- Separate multiple issues with a blank line
- Show the ENTIRE block, not just changed parts

LOG TO ANALYZE:
{log}

TERRAFORM FILES:
{context}

Begin systematic analysis with complete resource blocks:"##
    )
}

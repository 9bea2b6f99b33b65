//! Prompt construction for generated commit messages.

/// Build the prompt asking for a commit message describing `diff`.
///
/// The diff is embedded verbatim; it is neither chunked nor shortened.
pub fn build_commit_prompt(diff: &str) -> String {
    format!(
        r#"Generate a concise and informative Git commit message for the following changes.

## Rules
- Use the imperative mood: "Add", "Fix", "Remove", not "Added" or "Fixes".
- Write a single summary line between 50 and 72 characters long.
- Explain what changed and why, not how it was implemented.
- Describe one purpose; do not enumerate files.
- Reply with the commit message only: no quotes, no code fences, no preamble.

## Changes
```diff
{diff}
```"#
    )
}

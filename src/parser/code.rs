//! Sanitization of generated source and extraction of dependency tokens.

use regex::Regex;

/// Strip fenced code-delimiter lines from a generation response.
///
/// Generators are instructed to return bare source, but frequently wrap it
/// in ``` fences anyway. Every line containing a fence marker is dropped
/// before the content is persisted.
pub fn sanitize_generated(response: &str) -> String {
    let mut out: String = response
        .trim()
        .lines()
        .filter(|line| !line.contains("```"))
        .collect::<Vec<_>>()
        .join("\n");
    if !out.is_empty() {
        out.push('\n');
    }
    out
}

/// Root module tokens referenced by import-like statements.
///
/// Matches `import x`, `import x.y`, and `from x.y import z`, recording the
/// root segment. Relative imports and lines the pattern cannot pin down are
/// skipped rather than guessed.
pub fn extract_import_tokens(content: &str) -> Vec<String> {
    let pattern = Regex::new(r"^\s*(?:import|from)\s+([A-Za-z_][A-Za-z0-9_]*(?:\.[A-Za-z0-9_]+)*)")
        .expect("valid regex");

    let mut tokens = Vec::new();
    for line in content.lines() {
        let trimmed = line.trim_start();
        if !(trimmed.starts_with("import ") || trimmed.starts_with("from ")) {
            continue;
        }
        if let Some(captures) = pattern.captures(line) {
            let root = captures[1]
                .split('.')
                .next()
                .unwrap_or_default()
                .to_string();
            if !root.is_empty() && !tokens.contains(&root) {
                tokens.push(root);
            }
        }
    }
    tokens
}

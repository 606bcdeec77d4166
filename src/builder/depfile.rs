//! Parser for makefile-style dependency rules.
//!
//! GCC-compatible preprocessors in dependency-only mode (`-M`/`-MM`) print a
//! single make rule whose prerequisites are the full include closure of the
//! translation unit:
//!
//! ```text
//! obj/main.o: src/main.c include/util.h \
//!   include/my\ config.h
//! ```
//!
//! The closure is already transitive, so a flat list is all we need.

use std::path::PathBuf;

/// Parse a dependency rule into its prerequisite paths.
///
/// Rule targets (everything up to and including the first token ending in
/// `:`) are dropped, as are the bodies-less phony rules emitted by `-MP`.
/// Order is preserved and duplicates are removed.
pub fn parse_dependency_rule(output: &str) -> Vec<PathBuf> {
    let mut deps: Vec<PathBuf> = Vec::new();
    let mut seen_target = false;

    for token in tokenize(output) {
        // `a.o :` splits the colon into its own token
        if token.ends_with(':') {
            seen_target = true;
            continue;
        }

        if !seen_target {
            continue;
        }

        let path = PathBuf::from(token);
        if !deps.contains(&path) {
            deps.push(path);
        }
    }

    deps
}

/// Split a rule into whitespace-separated words, honouring make escapes.
///
/// - `\` + newline is a line continuation (word boundary)
/// - `\ ` is a literal space inside a path
/// - `\#` is a literal `#`
/// - `$$` is a literal `$`
/// - any other backslash is kept verbatim (Windows path separators)
fn tokenize(input: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.peek() {
                Some('\n') => {
                    chars.next();
                    flush(&mut current, &mut tokens);
                }
                Some('\r') => {
                    chars.next();
                    if chars.peek() == Some(&'\n') {
                        chars.next();
                    }
                    flush(&mut current, &mut tokens);
                }
                Some(' ') => {
                    chars.next();
                    current.push(' ');
                }
                Some('#') => {
                    chars.next();
                    current.push('#');
                }
                _ => current.push('\\'),
            },
            '$' if chars.peek() == Some(&'$') => {
                chars.next();
                current.push('$');
            }
            c if c.is_whitespace() => flush(&mut current, &mut tokens),
            c => current.push(c),
        }
    }
    flush(&mut current, &mut tokens);

    tokens
}

fn flush(current: &mut String, tokens: &mut Vec<String>) {
    if !current.is_empty() {
        tokens.push(std::mem::take(current));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths(items: &[&str]) -> Vec<PathBuf> {
        items.iter().map(PathBuf::from).collect()
    }

    #[test]
    fn test_single_line_rule() {
        let deps = parse_dependency_rule("main.o: src/main.c include/util.h\n");
        assert_eq!(deps, paths(&["src/main.c", "include/util.h"]));
    }

    #[test]
    fn test_line_continuations() {
        let output = "main.o: src/main.c \\\n  include/a.h \\\n  include/b.h\n";
        let deps = parse_dependency_rule(output);
        assert_eq!(deps, paths(&["src/main.c", "include/a.h", "include/b.h"]));
    }

    #[test]
    fn test_crlf_continuations() {
        let output = "main.o: src/main.c \\\r\n include/a.h\r\n";
        let deps = parse_dependency_rule(output);
        assert_eq!(deps, paths(&["src/main.c", "include/a.h"]));
    }

    #[test]
    fn test_escaped_spaces_are_reassembled() {
        let output = "main.o: src/main.c include/my\\ project\\ config.h \\\n include/b.h\n";
        let deps = parse_dependency_rule(output);
        assert_eq!(
            deps,
            paths(&["src/main.c", "include/my project config.h", "include/b.h"])
        );
    }

    #[test]
    fn test_hash_and_dollar_escapes() {
        let deps = parse_dependency_rule("a.o: a.c odd\\#name.h price$$.h\n");
        assert_eq!(deps, paths(&["a.c", "odd#name.h", "price$.h"]));
    }

    #[test]
    fn test_windows_paths_keep_backslashes() {
        let deps = parse_dependency_rule("obj\\a.o: src\\a.c C:\\mingw\\include\\stdio.h\n");
        assert_eq!(deps, paths(&["src\\a.c", "C:\\mingw\\include\\stdio.h"]));
    }

    #[test]
    fn test_detached_colon_and_multiple_targets() {
        let deps = parse_dependency_rule("a.o a.d : a.c a.h\n");
        assert_eq!(deps, paths(&["a.c", "a.h"]));
    }

    #[test]
    fn test_phony_rules_and_duplicates_are_dropped() {
        let output = "a.o: a.c a.h b.h a.h\n\na.h:\n\nb.h:\n";
        let deps = parse_dependency_rule(output);
        assert_eq!(deps, paths(&["a.c", "a.h", "b.h"]));
    }

    #[test]
    fn test_empty_output() {
        assert!(parse_dependency_rule("").is_empty());
        assert!(parse_dependency_rule("   \n").is_empty());
    }
}

//! Text tree of the bundled paths.
//!
//! The shape depends only on the sorted path strings, so the same set of
//! paths always renders the same way no matter how it was discovered.

const BRANCH: &str = "├── ";
const LAST_BRANCH: &str = "└── ";
const PIPE: &str = "│   ";
const SPACE: &str = "    ";

/// Renders `/`-separated relative paths as an indented tree.
///
/// Paths are sorted by byte order first. A path's depth is its separator
/// count. A line is drawn as the last branch when it is the final path or
/// the next path is not deeper; each ancestor level contributes a pipe
/// unless that level was drawn as last.
///
/// ```
/// let tree = codefuse::render_tree(&["sub/b.go", "sub", "a.go"]);
/// assert_eq!(tree, "└── a.go\n├── sub\n│   └── b.go\n");
/// ```
#[must_use]
pub fn render_tree<S: AsRef<str>>(paths: &[S]) -> String {
    let mut sorted: Vec<&str> = paths.iter().map(AsRef::as_ref).collect();
    sorted.sort_unstable();

    let mut output = String::new();
    // Whether the line last drawn at each level was a last branch.
    let mut last_at_level: Vec<bool> = Vec::new();

    for (i, path) in sorted.iter().enumerate() {
        let level = depth(path);
        let is_last = sorted.get(i + 1).is_none_or(|next| depth(next) <= level);

        for ancestor in 0..level {
            let ancestor_last = last_at_level.get(ancestor).copied().unwrap_or(false);
            output.push_str(if ancestor_last { SPACE } else { PIPE });
        }

        output.push_str(if is_last { LAST_BRANCH } else { BRANCH });
        output.push_str(base_name(path));
        output.push('\n');

        last_at_level.truncate(level);
        last_at_level.resize(level, false);
        last_at_level.push(is_last);
    }

    output
}

fn depth(path: &str) -> usize {
    path.matches('/').count()
}

fn base_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_empty() {
        let paths: [&str; 0] = [];
        assert_eq!(render_tree(&paths), "");
    }

    #[test]
    fn test_render_single_file() {
        assert_eq!(render_tree(&["main.go"]), "└── main.go\n");
    }

    #[test]
    fn test_render_nested_scenario() {
        let tree = render_tree(&["a.go", "sub", "sub/b.go"]);
        assert_eq!(tree, "└── a.go\n├── sub\n│   └── b.go\n");
    }

    #[test]
    fn test_render_single_chain() {
        let tree = render_tree(&["src", "src/lib", "src/lib/mod.rs"]);
        assert_eq!(tree, "├── src\n│   ├── lib\n│   │   └── mod.rs\n");
    }

    #[test]
    fn test_render_deeper_then_shallower() {
        let tree = render_tree(&["a", "a/b", "a/b/c.txt", "a/d.txt", "e.txt"]);
        let expected = "\
├── a
│   ├── b
│   │   └── c.txt
│   └── d.txt
└── e.txt
";
        assert_eq!(tree, expected);
    }

    #[test]
    fn test_render_independent_of_input_order() {
        let ordered = ["a", "a/b", "a/b/c.txt", "a/d.txt", "e.txt"];
        let shuffled = ["a/d.txt", "e.txt", "a", "a/b/c.txt", "a/b"];
        assert_eq!(render_tree(&ordered), render_tree(&shuffled));
        assert_eq!(render_tree(&ordered), render_tree(&ordered));
    }

    #[test]
    fn test_render_sorts_by_bytes() {
        // Uppercase sorts before lowercase.
        let tree = render_tree(&["b.txt", "B.txt"]);
        assert!(tree.starts_with("└── B.txt\n"));
    }

    #[test]
    fn test_render_accepts_owned_strings() {
        let paths = vec!["x".to_string(), "x/y".to_string()];
        assert_eq!(render_tree(&paths), "├── x\n│   └── y\n");
    }
}

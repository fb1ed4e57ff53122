use crate::file::ContentRecord;

/// Heading placed above the rendered tree.
pub const BUNDLE_HEADER: &str = "Project Directory Structure:";

/// Joins a rendered tree and loaded contents into the final bundle text.
///
/// Layout:
///
/// ```text
/// Project Directory Structure:
/// <tree>
///
/// File:
/// <path>
/// Content:
/// <content>
///
/// ```
///
/// The `File:` and `Content:` labels carry a trailing space. Records
/// appear in ascending path order and file text is copied verbatim.
#[must_use]
pub fn serialize(tree_text: &str, contents: &ContentRecord) -> String {
    let body_len: usize = contents
        .iter()
        .map(|(path, content)| path.len() + content.len() + 24)
        .sum();
    let mut output = String::with_capacity(BUNDLE_HEADER.len() + tree_text.len() + body_len + 2);

    output.push_str(BUNDLE_HEADER);
    output.push('\n');
    output.push_str(tree_text);
    output.push('\n');

    for (path, content) in contents.iter() {
        output.push_str("File: \n");
        output.push_str(path);
        output.push_str("\nContent: \n");
        output.push_str(content);
        output.push_str("\n\n");
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file::EMPTY_DIRECTORY_MARKER;
    use crate::tree::render_tree;

    #[test]
    fn test_serialize_exact_layout() {
        let mut contents = ContentRecord::new();
        contents.insert("sub/b.go", "package b");
        contents.insert("a.go", "package a");

        let tree = render_tree(&["a.go", "sub", "sub/b.go"]);
        let bundle = serialize(&tree, &contents);

        let expected = "Project Directory Structure:\n\
└── a.go\n\
├── sub\n\
│   └── b.go\n\
\n\
File: \na.go\nContent: \npackage a\n\n\
File: \nsub/b.go\nContent: \npackage b\n\n";
        assert_eq!(bundle, expected);
    }

    #[test]
    fn test_serialize_without_contents() {
        let bundle = serialize("", &ContentRecord::new());
        assert_eq!(bundle, "Project Directory Structure:\n\n");
    }

    #[test]
    fn test_serialize_empty_directory_marker() {
        let mut contents = ContentRecord::new();
        contents.insert("assets", EMPTY_DIRECTORY_MARKER);

        let bundle = serialize(&render_tree(&["assets"]), &contents);

        assert!(bundle.ends_with("File: \nassets\nContent: \nempty directory\n\n"));
    }

    #[test]
    fn test_serialize_is_order_independent() {
        let forward: ContentRecord = vec![
            ("a".to_string(), "1".to_string()),
            ("b".to_string(), "2".to_string()),
        ]
        .into_iter()
        .collect();
        let backward: ContentRecord = vec![
            ("b".to_string(), "2".to_string()),
            ("a".to_string(), "1".to_string()),
        ]
        .into_iter()
        .collect();

        assert_eq!(serialize("t\n", &forward), serialize("t\n", &backward));
    }

    #[test]
    fn test_serialize_keeps_trailing_newlines() {
        let mut contents = ContentRecord::new();
        contents.insert("x.txt", "line\n");

        let bundle = serialize("", &contents);

        assert!(bundle.ends_with("Content: \nline\n\n\n"));
    }
}

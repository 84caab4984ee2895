//! Multi-document splitting

/// Separator used when joining documents back together
pub const DOCUMENT_SEPARATOR: &str = "---\n";

/// Split every raw input on `---` separator lines into individual documents.
///
/// Documents that are empty or whitespace-only are dropped. No YAML
/// validation happens here.
pub fn split_documents<S: AsRef<str>>(raw_specs: &[S]) -> Vec<String> {
    raw_specs
        .iter()
        .flat_map(|raw| split_yaml(raw.as_ref()))
        .collect()
}

/// Split a single multi-document text
pub fn split_yaml(raw: &str) -> Vec<String> {
    let mut docs = Vec::new();
    let mut current = String::new();

    for line in raw.lines() {
        if line.trim_end() == "---" {
            push_doc(&mut docs, std::mem::take(&mut current));
            continue;
        }
        current.push_str(line);
        current.push('\n');
    }
    push_doc(&mut docs, current);

    docs
}

fn push_doc(docs: &mut Vec<String>, doc: String) {
    if !doc.trim().is_empty() {
        docs.push(doc);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_multi_document() {
        let docs = split_yaml("kind: A\n---\nkind: B\n---\n\n---\nkind: C");
        assert_eq!(docs, vec!["kind: A\n", "kind: B\n", "kind: C\n"]);
    }

    #[test]
    fn test_leading_separator_and_crlf() {
        let docs = split_yaml("---\r\nkind: A\r\n---\r\nkind: B\r\n");
        assert_eq!(docs, vec!["kind: A\n", "kind: B\n"]);
    }

    #[test]
    fn test_indented_dashes_are_content() {
        let docs = split_yaml("data:\n  text: |\n    ---\n    inner\n");
        assert_eq!(docs.len(), 1);
    }

    #[test]
    fn test_split_many_inputs_flattens_in_order() {
        let docs = split_documents(&["kind: A\n---\nkind: B", "", "kind: C"]);
        assert_eq!(docs, vec!["kind: A\n", "kind: B\n", "kind: C\n"]);
    }
}

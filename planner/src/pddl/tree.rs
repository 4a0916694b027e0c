use crate::{Error, Result};

/// One parenthesized form: the loose text inside it plus its nested
/// forms, in source order.
#[derive(Debug, Default)]
pub(crate) struct Node {
    pub(crate) text: String,
    pub(crate) children: Vec<Node>,
}

/// Reads the first parenthesized form of `input` into a tree. Comments
/// run from `;` to the end of the line.
pub(crate) fn parse_tree(input: &str) -> Result<Node> {
    let mut stack: Vec<Node> = Vec::new();

    for line in input.lines() {
        let code = match line.find(';') {
            Some(idx) => &line[..idx],
            None => line,
        };
        for c in code.chars() {
            match c {
                '(' => stack.push(Node::default()),
                ')' => {
                    let node = stack
                        .pop()
                        .ok_or_else(|| Error::Parse("unbalanced ')'".to_string()))?;
                    match stack.last_mut() {
                        Some(parent) => parent.children.push(node),
                        // The first complete top-level form is the result.
                        None => return Ok(node),
                    }
                }
                _ => {
                    if let Some(open) = stack.last_mut() {
                        open.text.push(c);
                    }
                }
            }
        }
        if let Some(open) = stack.last_mut() {
            open.text.push(' ');
        }
    }

    Err(Error::Parse(if stack.is_empty() {
        "no parenthesized form found".to_string()
    } else {
        "unbalanced '('".to_string()
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_forms_become_children() {
        let tree = parse_tree("(define (domain d) (:predicates (on ?x)))").unwrap();
        assert_eq!(tree.text.trim(), "define");
        assert_eq!(tree.children.len(), 2);
        assert_eq!(tree.children[0].text.trim(), "domain d");
        assert_eq!(tree.children[1].children[0].text.trim(), "on ?x");
    }

    #[test]
    fn comments_are_stripped() {
        let tree = parse_tree("(define ; a comment with (parens)\n (domain d))").unwrap();
        assert_eq!(tree.children.len(), 1);
    }

    #[test]
    fn unbalanced_input_is_rejected() {
        assert!(parse_tree("(define (domain d)").is_err());
        assert!(parse_tree("no parens at all").is_err());
    }
}

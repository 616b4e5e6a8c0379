//! Traversal and cursor APIs for navigating element trees
//!
//! Navigation matches on local names, so callers can walk a compiled
//! payload without spelling out namespaces.

use crate::node::XmlElement;
use crate::{Error, Result};

/// A cursor for navigating the element tree
pub struct Cursor<'a> {
    /// Current element
    element: &'a XmlElement,

    /// Path to current element (for error reporting)
    path: Vec<String>,
}

/// Trait for traversing the element tree
pub trait Traversal {
    /// Visit an element
    fn visit(&mut self, element: &XmlElement, path: &[String]);

    /// Called when entering an element with children
    fn enter(&mut self, _element: &XmlElement, _path: &[String]) {}

    /// Called when leaving an element with children
    fn leave(&mut self, _element: &XmlElement, _path: &[String]) {}

    /// Returns true if traversal should continue
    fn should_continue(&self) -> bool {
        true
    }
}

impl<'a> Cursor<'a> {
    /// Create a new cursor at the given element
    pub fn new(element: &'a XmlElement) -> Self {
        Self {
            element,
            path: vec![element.name.local.clone()],
        }
    }

    /// Get the current element
    pub fn element(&self) -> &'a XmlElement {
        self.element
    }

    /// Get the current path
    pub fn path(&self) -> &[String] {
        &self.path
    }

    /// Text of the current element, if any
    pub fn text(&self) -> Option<&'a str> {
        self.element.text.as_deref()
    }

    /// Navigate to a child element by local name
    pub fn child(&self, local: &str) -> Result<Cursor<'a>> {
        match self.element.find_child(local) {
            Some(child) => {
                let mut path = self.path.clone();
                path.push(local.to_string());
                Ok(Cursor {
                    element: child,
                    path,
                })
            }
            None => Err(Error::node_not_found(format!(
                "{}/{}",
                self.path.join("/"),
                local
            ))),
        }
    }

    /// Get all children matching a local name
    pub fn children(&self, local: &str) -> Vec<Cursor<'a>> {
        self.element
            .find_children(local)
            .into_iter()
            .enumerate()
            .map(|(idx, child)| {
                let mut path = self.path.clone();
                path.push(format!("{}[{}]", local, idx));
                Cursor {
                    element: child,
                    path,
                }
            })
            .collect()
    }

    /// Navigate using a path (e.g., "authority/router[1]/name")
    pub fn navigate(&self, path: &str) -> Result<Cursor<'a>> {
        let mut current = self.element;
        let mut current_path = self.path.clone();

        for segment in path.split('/') {
            if segment.is_empty() {
                continue;
            }

            if let Some(open_bracket) = segment.find('[') {
                let local = &segment[..open_bracket];
                let close_bracket = segment
                    .find(']')
                    .ok_or_else(|| Error::invalid_path(segment, "unclosed bracket"))?;
                let index: usize = segment[open_bracket + 1..close_bracket]
                    .parse()
                    .map_err(|_| Error::invalid_path(segment, "invalid index"))?;

                current = current
                    .find_children(local)
                    .get(index)
                    .copied()
                    .ok_or_else(|| {
                        Error::node_not_found(format!("{}/{}", current_path.join("/"), segment))
                    })?;
                current_path.push(format!("{}[{}]", local, index));
            } else {
                current = current.find_child(segment).ok_or_else(|| {
                    Error::node_not_found(format!("{}/{}", current_path.join("/"), segment))
                })?;
                current_path.push(segment.to_string());
            }
        }

        Ok(Cursor {
            element: current,
            path: current_path,
        })
    }
}

/// Walk the tree using a visitor
pub fn walk<T: Traversal>(element: &XmlElement, visitor: &mut T) {
    walk_recursive(element, visitor, &mut vec![]);
}

fn walk_recursive<T: Traversal>(element: &XmlElement, visitor: &mut T, path: &mut Vec<String>) {
    if !visitor.should_continue() {
        return;
    }

    visitor.visit(element, path);

    if !element.children.is_empty() {
        visitor.enter(element, path);
        path.push(element.name.local.clone());

        for child in &element.children {
            walk_recursive(child, visitor, path);
        }

        path.pop();
        visitor.leave(element, path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::QName;

    fn elem(local: &str) -> XmlElement {
        XmlElement::new(QName::qualified("t", "urn:test", local))
    }

    fn sample() -> XmlElement {
        let mut root = elem("config");
        let mut authority = elem("authority");
        let mut router_a = elem("router");
        let mut name_a = elem("name");
        name_a.set_text("combo1");
        router_a.add_child(name_a);
        let mut router_b = elem("router");
        let mut name_b = elem("name");
        name_b.set_text("combo2");
        router_b.add_child(name_b);
        authority.add_child(router_a);
        authority.add_child(router_b);
        root.add_child(authority);
        root
    }

    #[test]
    fn test_cursor_child() {
        let root = sample();
        let cursor = Cursor::new(&root);
        let authority = cursor.child("authority").unwrap();
        assert_eq!(authority.element().name.local, "authority");
        assert_eq!(authority.path(), &["config", "authority"]);
    }

    #[test]
    fn test_cursor_child_not_found() {
        let root = sample();
        match Cursor::new(&root).child("tenant") {
            Err(Error::NodeNotFound { path }) => {
                assert!(path.contains("config"));
                assert!(path.contains("tenant"));
            }
            _ => panic!("Expected NodeNotFound error"),
        }
    }

    #[test]
    fn test_cursor_children() {
        let root = sample();
        let routers = Cursor::new(&root).child("authority").unwrap().children("router");
        assert_eq!(routers.len(), 2);
        assert_eq!(routers[1].path(), &["config", "authority", "router[1]"]);
    }

    #[test]
    fn test_cursor_navigate_with_index() {
        let root = sample();
        let name = Cursor::new(&root).navigate("authority/router[1]/name").unwrap();
        assert_eq!(name.text(), Some("combo2"));
    }

    #[test]
    fn test_cursor_navigate_invalid_path() {
        let root = sample();
        let cursor = Cursor::new(&root);
        assert!(matches!(
            cursor.navigate("authority/router[0"),
            Err(Error::InvalidPath { .. })
        ));
        assert!(matches!(
            cursor.navigate("authority/router[x]"),
            Err(Error::InvalidPath { .. })
        ));
        assert!(matches!(
            cursor.navigate("authority/router[5]"),
            Err(Error::NodeNotFound { .. })
        ));
    }

    struct Counter {
        visited: Vec<String>,
        entered: usize,
        left: usize,
    }

    impl Traversal for Counter {
        fn visit(&mut self, element: &XmlElement, _path: &[String]) {
            self.visited.push(element.name.local.clone());
        }

        fn enter(&mut self, _element: &XmlElement, _path: &[String]) {
            self.entered += 1;
        }

        fn leave(&mut self, _element: &XmlElement, _path: &[String]) {
            self.left += 1;
        }
    }

    #[test]
    fn test_walk_order() {
        let root = sample();
        let mut counter = Counter {
            visited: Vec::new(),
            entered: 0,
            left: 0,
        };
        walk(&root, &mut counter);

        assert_eq!(
            counter.visited,
            vec!["config", "authority", "router", "name", "router", "name"]
        );
        assert_eq!(counter.entered, 4);
        assert_eq!(counter.left, 4);
    }
}

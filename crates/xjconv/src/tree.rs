//! Document tree shared by the XML and JSON conversions

use indexmap::map::{Entry, IntoIter, Iter, Keys, Values};
use indexmap::IndexMap;
use std::ops::Index;

/// A node of the document tree
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Node {
    /// JSON `null`
    #[default]
    Null,
    /// Scalar leaf; numbers and booleans keep their JSON lexeme
    Text(String),
    /// Ordered sequence, e.g. repeated sibling elements
    Array(Array),
    /// Named fields with order preservation
    Object(Object),
}

impl Node {
    /// Returns true if this node is null
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns true if this node is a text leaf
    pub fn is_text(&self) -> bool {
        matches!(self, Self::Text(_))
    }

    /// Returns true if this node is an array
    pub fn is_array(&self) -> bool {
        matches!(self, Self::Array(_))
    }

    /// Returns true if this node is an object
    pub fn is_object(&self) -> bool {
        matches!(self, Self::Object(_))
    }

    /// Returns the text if this is a text leaf, None otherwise
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Array> {
        match self {
            Self::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Self::Object(o) => Some(o),
            _ => None,
        }
    }

    pub fn as_array_mut(&mut self) -> Option<&mut Array> {
        match self {
            Self::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_object_mut(&mut self) -> Option<&mut Object> {
        match self {
            Self::Object(o) => Some(o),
            _ => None,
        }
    }
}

impl From<String> for Node {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for Node {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<Array> for Node {
    fn from(value: Array) -> Self {
        Self::Array(value)
    }
}

impl From<Object> for Node {
    fn from(value: Object) -> Self {
        Self::Object(value)
    }
}

impl From<Vec<Node>> for Node {
    fn from(nodes: Vec<Node>) -> Self {
        Self::Array(Array(nodes))
    }
}

/// An order-preserving object (map of string keys to nodes)
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Object(IndexMap<String, Node>);

impl Object {
    /// Creates a new empty object
    pub fn new() -> Self {
        Self(IndexMap::new())
    }

    /// Returns the number of fields in the object
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the object has no fields
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns a reference to the node stored under the key
    pub fn get(&self, key: &str) -> Option<&Node> {
        self.0.get(key)
    }

    /// Returns a mutable reference to the node stored under the key
    pub fn get_mut(&mut self, key: &str) -> Option<&mut Node> {
        self.0.get_mut(key)
    }

    /// Inserts a field; an existing key keeps its position and gets the new node
    pub fn insert(&mut self, key: impl Into<String>, node: impl Into<Node>) -> Option<Node> {
        self.0.insert(key.into(), node.into())
    }

    /// Appends a node under `key`, turning a repeated key into an array.
    ///
    /// The key keeps the position of its first occurrence. Callers must not
    /// append array nodes themselves.
    pub fn append(&mut self, key: impl Into<String>, node: Node) {
        match self.0.entry(key.into()) {
            Entry::Vacant(slot) => {
                slot.insert(node);
            }
            Entry::Occupied(mut slot) => match slot.get_mut() {
                Node::Array(items) => items.push(node),
                existing => {
                    let first = std::mem::take(existing);
                    *existing = Node::Array(Array(vec![first, node]));
                }
            },
        }
    }

    /// Removes a key, preserving the order of the remaining fields
    pub fn remove(&mut self, key: &str) -> Option<Node> {
        self.0.shift_remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn keys(&self) -> Keys<'_, String, Node> {
        self.0.keys()
    }

    /// Returns an iterator over the nodes
    pub fn values(&self) -> Values<'_, String, Node> {
        self.0.values()
    }

    /// Returns an iterator over fields
    pub fn iter(&self) -> Iter<'_, String, Node> {
        self.0.iter()
    }
}

impl Index<&str> for Object {
    type Output = Node;

    #[allow(clippy::indexing_slicing)]
    fn index(&self, key: &str) -> &Self::Output {
        &self.0[key]
    }
}

impl<'a> IntoIterator for &'a Object {
    type Item = (&'a String, &'a Node);
    type IntoIter = Iter<'a, String, Node>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl IntoIterator for Object {
    type Item = (String, Node);
    type IntoIter = IntoIter<String, Node>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl FromIterator<(String, Node)> for Object {
    fn from_iter<I: IntoIterator<Item = (String, Node)>>(iter: I) -> Self {
        Self(IndexMap::from_iter(iter))
    }
}

/// An ordered sequence of nodes
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Array(Vec<Node>);

impl Array {
    /// Creates a new empty array
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Node> {
        self.0.get(index)
    }

    pub fn push(&mut self, node: impl Into<Node>) {
        self.0.push(node.into());
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Node> {
        self.0.iter()
    }
}

impl Index<usize> for Array {
    type Output = Node;

    #[allow(clippy::indexing_slicing)]
    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

impl<'a> IntoIterator for &'a Array {
    type Item = &'a Node;
    type IntoIter = std::slice::Iter<'a, Node>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl IntoIterator for Array {
    type Item = Node;
    type IntoIter = std::vec::IntoIter<Node>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl From<Vec<Node>> for Array {
    fn from(items: Vec<Node>) -> Self {
        Self(items)
    }
}

impl FromIterator<Node> for Array {
    fn from_iter<I: IntoIterator<Item = Node>>(iter: I) -> Self {
        Self(Vec::from_iter(iter))
    }
}

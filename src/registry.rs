//! Ordered association lists.
//!
//! A [`Registry`] keeps its nodes in insertion order and never sorts them. The shell
//! uses it three ways: environment variables and aliases (`Registry<String, String>`)
//! and history lines (`Registry<usize, String>`, keyed by sequence number).

/// One key-bearing node of a [`Registry`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node<K, V> {
    pub key: K,
    pub value: V,
}

/// Insertion-ordered list of key/value nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registry<K, V> {
    nodes: Vec<Node<K, V>>,
}

impl<K, V> Default for Registry<K, V> {
    fn default() -> Self {
        Self { nodes: Vec::new() }
    }
}

impl<K, V> Registry<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a new trailing node. Does not check for an existing key; see [`Registry::set`].
    pub fn append(&mut self, key: K, value: V) {
        self.nodes.push(Node { key, value });
    }

    /// Delete the node at `index`, keeping the order of the rest.
    ///
    /// Returns `false` and leaves the registry untouched when `index` is out of range.
    pub fn remove_at(&mut self, index: usize) -> bool {
        if index >= self.nodes.len() {
            return false;
        }
        self.nodes.remove(index);
        true
    }

    /// Drop every node.
    pub fn clear(&mut self) {
        self.nodes.clear();
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Node<K, V>> {
        self.nodes.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Node<K, V>> {
        self.nodes.iter_mut()
    }
}

impl<K: PartialEq, V> Registry<K, V> {
    /// Index of the node whose key equals `key`.
    pub fn position<Q>(&self, key: &Q) -> Option<usize>
    where
        K: PartialEq<Q>,
        Q: ?Sized,
    {
        self.nodes.iter().position(|node| node.key == *key)
    }

    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: PartialEq<Q>,
        Q: ?Sized,
    {
        self.position(key).map(|i| &self.nodes[i].value)
    }

    /// Overwrite the value of an existing key in place, or append a new node.
    pub fn set(&mut self, key: K, value: V) {
        match self.position(&key) {
            Some(i) => self.nodes[i].value = value,
            None => self.append(key, value),
        }
    }

    /// Remove the node with the given key. Returns `false` when there is none.
    pub fn remove<Q>(&mut self, key: &Q) -> bool
    where
        K: PartialEq<Q>,
        Q: ?Sized,
    {
        match self.position(key) {
            Some(i) => self.remove_at(i),
            None => false,
        }
    }
}

/// Alias table: `name -> replacement text`.
#[derive(Debug, Clone, Default)]
pub struct Aliases {
    entries: Registry<String, String>,
}

impl Aliases {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(String::as_str)
    }

    /// Define or redefine an alias. Redefinition keeps the alias' original position.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries.set(name.into(), value.into());
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|node| (node.key.as_str(), node.value.as_str()))
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

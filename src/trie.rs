// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! A byte-keyed trie used as the completion index for the line editor.
//!
//! Completion semantics (longest unambiguous suffix vs. "too many candidates")
//! are the three-way result from [`Completion`]; see [`Trie::complete`].

use std::collections::BTreeMap;

/// Result of [`Trie::complete`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    /// No stored word has this prefix.
    None,
    /// Exactly one stored word has this prefix; `suffix` completes it.
    One { suffix: String },
    /// Two or more stored words share this prefix (or this prefix is itself a
    /// complete word with further children). `suffix` is empty.
    Many,
}

#[derive(Debug, Default)]
struct TrieNode {
    children: BTreeMap<u8, TrieNode>,
    is_word: bool,
}

/// Prefix index of completable words (built-in names plus everything found on
/// `PATH` at startup).
#[derive(Debug, Default)]
pub struct Trie {
    root: TrieNode,
}

impl Trie {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `word`, creating nodes as needed. Idempotent.
    pub fn insert(&mut self, word: &str) {
        let mut node = &mut self.root;
        for &b in word.as_bytes() {
            node = node.children.entry(b).or_default();
        }
        node.is_word = true;
    }

    /// Longest-unambiguous-completion lookup.
    ///
    /// Descends along `prefix`; if the path doesn't exist, returns `None`.
    /// From the landing node it walks down while there is exactly one child
    /// and the current node is not itself a complete word, accumulating
    /// bytes into the suffix. It stops (returning `Many` with an empty
    /// suffix) at the first fork, or at a node that is already a complete
    /// word but still has children — completion must not run past a word
    /// boundary even when there's only one way to extend it.
    pub fn complete(&self, prefix: &str) -> Completion {
        if prefix.is_empty() {
            return Completion::None;
        }

        let Some(mut node) = self.descend(prefix) else {
            return Completion::None;
        };

        let mut suffix = Vec::new();
        loop {
            if node.children.is_empty() {
                return Completion::One {
                    suffix: String::from_utf8_lossy(&suffix).into_owned(),
                };
            }
            if node.is_word || node.children.len() > 1 {
                return Completion::Many;
            }
            let (&byte, child) = node.children.iter().next().expect("checked non-empty above");
            suffix.push(byte);
            node = child;
        }
    }

    /// All stored words beginning with `prefix`, in a stable (lexicographic)
    /// order. Empty if no word has this prefix.
    pub fn words_with_prefix(&self, prefix: &str) -> Vec<String> {
        let Some(node) = self.descend(prefix) else {
            return Vec::new();
        };

        let mut out = Vec::new();
        let mut path = prefix.as_bytes().to_vec();
        Self::dfs(node, &mut path, &mut out);
        out
    }

    fn descend(&self, prefix: &str) -> Option<&TrieNode> {
        let mut node = &self.root;
        for &b in prefix.as_bytes() {
            node = node.children.get(&b)?;
        }
        Some(node)
    }

    fn dfs(node: &TrieNode, path: &mut Vec<u8>, out: &mut Vec<String>) {
        if node.is_word {
            out.push(String::from_utf8_lossy(path).into_owned());
        }
        for (&b, child) in &node.children {
            path.push(b);
            Self::dfs(child, path, out);
            path.pop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn trie_of(words: &[&str]) -> Trie {
        let mut t = Trie::new();
        for w in words {
            t.insert(w);
        }
        t
    }

    #[test]
    fn completes_unique_prefix() {
        let t = trie_of(&["echo", "exit", "env"]);
        assert_eq!(t.complete("ec"), Completion::One { suffix: "ho".into() });
    }

    #[test]
    fn forks_to_many() {
        let t = trie_of(&["echo", "exit", "env"]);
        assert_eq!(t.complete("e"), Completion::Many);
    }

    #[test]
    fn unknown_prefix_is_none() {
        let t = trie_of(&["echo", "exit", "env"]);
        assert_eq!(t.complete("ez"), Completion::None);
    }

    #[test]
    fn empty_prefix_is_none() {
        let t = trie_of(&["echo"]);
        assert_eq!(t.complete(""), Completion::None);
    }

    #[test]
    fn word_with_further_children_is_many_not_extension() {
        let t = trie_of(&["ex", "exit"]);
        assert_eq!(t.complete("ex"), Completion::Many);
    }

    #[test]
    fn words_with_prefix_lists_all() {
        let t = trie_of(&["echo", "exit", "env"]);
        let mut got = t.words_with_prefix("e");
        got.sort();
        assert_eq!(got, vec!["echo".to_string(), "env".to_string(), "exit".to_string()]);
    }
}

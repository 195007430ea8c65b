use std::convert::TryFrom;
use std::path::{Path, PathBuf};
use std::slice;

use log::debug;
use walkdir::WalkDir;

use crate::error::Error;

/// A file or directory below the root of a source tree.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Node {
    File {
        name: String,
        size: u32,
        /// Where the payload is read from when the disc is built.
        source: PathBuf,
    },
    Directory {
        name: String,
        children: Vec<Node>,
    },
}

impl Node {
    pub fn file(name: impl Into<String>, size: u32, source: impl Into<PathBuf>) -> Node {
        Node::File {
            name: name.into(),
            size,
            source: source.into(),
        }
    }

    pub fn directory(name: impl Into<String>, children: Vec<Node>) -> Node {
        Node::Directory {
            name: name.into(),
            children,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Node::File { name, .. } | Node::Directory { name, .. } => name,
        }
    }
}

/// The contents of a directory that will become the disc's file system.
///
/// Children are kept in the order they will be written, which for [`scan`](Tree::scan) is sorted by
/// file name.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Tree {
    children: Vec<Node>,
}

impl Tree {
    pub fn from_nodes(children: Vec<Node>) -> Tree {
        Tree { children }
    }

    /// Reads a directory recursively. Symbolic links are followed.
    pub fn scan<P: AsRef<Path>>(root: P) -> Result<Tree, Error> {
        let root = root.as_ref();
        let mut children = Vec::new();
        // Directories whose contents are still being read, innermost last.
        let mut open: Vec<(String, Vec<Node>)> = Vec::new();

        for entry in WalkDir::new(root)
            .min_depth(1)
            .follow_links(true)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|source| Error::Enumeration {
                path: source.path().unwrap_or(root).to_owned(),
                source,
            })?;

            while open.len() >= entry.depth() {
                close_directory(&mut children, &mut open);
            }

            let name = entry
                .file_name()
                .to_str()
                .ok_or_else(|| Error::InvalidName {
                    path: entry.path().to_owned(),
                })?
                .to_owned();

            if entry.file_type().is_dir() {
                open.push((name, Vec::new()));
            } else {
                let metadata = entry.metadata().map_err(|source| Error::Enumeration {
                    path: entry.path().to_owned(),
                    source,
                })?;
                let size = u32::try_from(metadata.len())
                    .map_err(|_| Error::SizeOverflow { what: "file size" })?;
                siblings(&mut children, &mut open).push(Node::file(name, size, entry.path()));
            }
        }
        while !open.is_empty() {
            close_directory(&mut children, &mut open);
        }

        let tree = Tree { children };
        debug!("scanned {}: {} entries", root.display(), tree.entry_count());
        Ok(tree)
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// Visits every node below the root, each directory before its contents.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            stack: vec![self.children.iter()],
        }
    }

    /// The number of files and directories at every depth, not counting the root.
    pub fn entry_count(&self) -> usize {
        self.iter().count()
    }
}

fn siblings<'a>(
    root: &'a mut Vec<Node>,
    open: &'a mut [(String, Vec<Node>)],
) -> &'a mut Vec<Node> {
    match open.last_mut() {
        Some((_, children)) => children,
        None => root,
    }
}

fn close_directory(root: &mut Vec<Node>, open: &mut Vec<(String, Vec<Node>)>) {
    if let Some((name, children)) = open.pop() {
        siblings(root, open).push(Node::directory(name, children));
    }
}

/// Preorder iterator over a [`Tree`].
pub struct Iter<'a> {
    stack: Vec<slice::Iter<'a, Node>>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<&'a Node> {
        loop {
            let node = match self.stack.last_mut()?.next() {
                Some(node) => node,
                None => {
                    self.stack.pop();
                    continue;
                }
            };
            if let Node::Directory { children, .. } = node {
                self.stack.push(children.iter());
            }
            return Some(node);
        }
    }
}

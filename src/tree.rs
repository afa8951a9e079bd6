//! Directory tree and statistics over a collection of sources.

use crate::collector::SourceFile;
use crate::utils::format_file_size;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write;

#[derive(Debug, PartialEq)]
pub enum TreeNode<'a> {
    File(&'a SourceFile),
    Directory(BTreeMap<String, TreeNode<'a>>),
}

pub type DirectoryTree<'a> = BTreeMap<String, TreeNode<'a>>;

/// Builds a nested tree keyed by the segments of each `relative_path`.
pub fn build_directory_tree(files: &[SourceFile]) -> DirectoryTree<'_> {
    let mut tree = DirectoryTree::new();

    for file in files {
        let parts: Vec<&str> = file
            .relative_path
            .split('/')
            .filter(|part| !part.is_empty())
            .collect();
        let Some((leaf, dirs)) = parts.split_last() else {
            continue;
        };

        let mut level = &mut tree;
        for dir in dirs {
            let node = level
                .entry(dir.to_string())
                .or_insert_with(|| TreeNode::Directory(BTreeMap::new()));
            if let TreeNode::File(_) = node {
                *node = TreeNode::Directory(BTreeMap::new());
            }
            level = match node {
                TreeNode::Directory(children) => children,
                TreeNode::File(_) => unreachable!("replaced by a directory above"),
            };
        }
        level.insert(leaf.to_string(), TreeNode::File(file));
    }

    tree
}

/// Renders the tree one entry per line in name order, directories marked with `/`.
pub fn render_tree(tree: &DirectoryTree<'_>) -> String {
    fn walk(out: &mut String, level: &DirectoryTree<'_>, depth: usize) {
        for (name, node) in level {
            let indent = "  ".repeat(depth);
            match node {
                TreeNode::Directory(children) => {
                    let _ = writeln!(out, "{}📁 {}/", indent, name);
                    walk(out, children, depth + 1);
                }
                TreeNode::File(file) => {
                    let _ = writeln!(
                        out,
                        "{}🖼️  {} ({})",
                        indent,
                        name,
                        format_file_size(file.size)
                    );
                }
            }
        }
    }

    let mut out = String::new();
    walk(&mut out, tree, 0);
    out
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DirectoryStats {
    pub total_files: usize,
    pub total_size: u64,
    /// Count per MIME subtype ("jpeg", "png", ...)
    pub file_types: BTreeMap<String, usize>,
    pub directory_count: usize,
    pub max_depth: usize,
}

pub fn directory_stats(files: &[SourceFile]) -> DirectoryStats {
    let mut stats = DirectoryStats {
        total_files: files.len(),
        ..Default::default()
    };
    let mut directories = BTreeSet::new();

    for file in files {
        stats.total_size += file.size;

        let subtype = file
            .mime_type
            .rsplit('/')
            .next()
            .unwrap_or(&file.mime_type)
            .to_string();
        *stats.file_types.entry(subtype).or_insert(0) += 1;

        let parts: Vec<&str> = file
            .relative_path
            .split('/')
            .filter(|part| !part.is_empty())
            .collect();
        for index in 1..parts.len() {
            directories.insert(parts[..index].join("/"));
        }

        let depth = file.relative_path.split('/').count().saturating_sub(1);
        stats.max_depth = stats.max_depth.max(depth);
    }

    stats.directory_count = directories.len();
    stats
}

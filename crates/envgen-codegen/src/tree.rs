//! Grouping declarations into a tree of sections.
//!
//! Names are split on `__`: every segment but the last names a section and
//! the last names a field. `PFX_DB__POOL__SIZE` becomes the field `size` of
//! section `pool` inside section `db`.

use std::collections::HashMap;

use envgen::{Declaration, Error, Kind, Value};
use tracing::trace;

use crate::naming;

/// Separator between name segments.
pub const SEGMENT_SEPARATOR: &str = "__";

/// A declared variable at the bottom of the tree.
#[derive(Debug, Clone, PartialEq)]
pub struct LeafInfo {
    /// Full environment variable name, prefix included.
    pub env_name: String,
    /// Constant holding `env_name` in generated code.
    pub const_name: String,
    /// Field names from the root down to this leaf.
    pub path: Vec<String>,
    pub default: Value,
    pub line: usize,
}

impl LeafInfo {
    pub fn kind(&self) -> Kind {
        self.default.kind()
    }

    /// Local binding holding the registered handle.
    pub fn handle_name(&self) -> String {
        format!("{}_var", self.path.join("_"))
    }

    pub fn dotted_path(&self) -> String {
        self.path.join(".")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Leaf(LeafInfo),
    Section {
        type_name: String,
        children: Vec<ConfigNode>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConfigNode {
    /// Case-normalized segment, e.g. `MaxSize`.
    pub name: String,
    /// Field identifier in the parent struct, e.g. `max_size`.
    pub field: String,
    pub kind: NodeKind,
}

impl ConfigNode {
    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf(_))
    }

    pub fn leaf(&self) -> Option<&LeafInfo> {
        match &self.kind {
            NodeKind::Leaf(leaf) => Some(leaf),
            NodeKind::Section { .. } => None,
        }
    }

    pub fn children(&self) -> &[ConfigNode] {
        match &self.kind {
            NodeKind::Leaf(_) => &[],
            NodeKind::Section { children, .. } => children,
        }
    }

    /// Child whose normalized name is `name`.
    pub fn child(&self, name: &str) -> Option<&ConfigNode> {
        self.children().iter().find(|node| node.name == name)
    }
}

/// Top-level nodes in declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigForest {
    pub roots: Vec<ConfigNode>,
}

impl ConfigForest {
    pub fn get(&self, name: &str) -> Option<&ConfigNode> {
        self.roots.iter().find(|node| node.name == name)
    }

    /// Every leaf, depth first in declaration order.
    pub fn leaves(&self) -> Vec<&LeafInfo> {
        fn walk<'a>(nodes: &'a [ConfigNode], out: &mut Vec<&'a LeafInfo>) {
            for node in nodes {
                match &node.kind {
                    NodeKind::Leaf(leaf) => out.push(leaf),
                    NodeKind::Section { children, .. } => walk(children, out),
                }
            }
        }
        let mut out = Vec::new();
        walk(&self.roots, &mut out);
        out
    }

    /// Number of section nodes at every depth.
    pub fn section_count(&self) -> usize {
        fn walk(nodes: &[ConfigNode]) -> usize {
            nodes
                .iter()
                .map(|node| match &node.kind {
                    NodeKind::Leaf(_) => 0,
                    NodeKind::Section { children, .. } => 1 + walk(children),
                })
                .sum()
        }
        walk(&self.roots)
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }
}

/// Normalize a prefix so that it ends with exactly one `_`.
///
/// Returns `None` when the prefix has nothing but underscores.
pub fn normalize_prefix(prefix: &str) -> Option<String> {
    let trimmed = prefix.trim_end_matches('_');
    if trimmed.is_empty() {
        None
    } else {
        Some(format!("{trimmed}_"))
    }
}

/// Build the name tree for `declarations`, stripping `prefix` from names
/// that start with it.
pub fn build_forest(declarations: &[Declaration], prefix: Option<&str>) -> Result<ConfigForest, Error> {
    let prefix = prefix.and_then(normalize_prefix);
    let mut builder = Builder::default();
    for decl in declarations {
        builder
            .insert(decl, prefix.as_deref())
            .map_err(|err| err.at_line(decl.line))?;
    }
    Ok(builder.forest)
}

#[derive(Default)]
struct Builder {
    forest: ConfigForest,
    /// Constant name to the variable that claimed it.
    consts: HashMap<String, String>,
    /// Struct name to the dotted section path that claimed it.
    types: HashMap<String, String>,
}

impl Builder {
    fn insert(&mut self, decl: &Declaration, prefix: Option<&str>) -> Result<(), Error> {
        let local = match prefix {
            Some(prefix) => decl.name.strip_prefix(prefix).unwrap_or(&decl.name),
            None => decl.name.as_str(),
        };
        let segments: Vec<&str> = local.split(SEGMENT_SEPARATOR).collect();
        if segments.iter().any(|segment| segment.is_empty()) {
            return Err(Error::invalid_name(&decl.name, "empty name segment"));
        }
        let fields = segments
            .iter()
            .map(|segment| naming::field_name(segment))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|reason| Error::invalid_name(&decl.name, reason))?;
        let (leaf_segment, sections) = match segments.split_last() {
            Some(split) => split,
            None => return Err(Error::invalid_name(&decl.name, "empty name")),
        };

        let const_name = naming::const_name(&fields);
        if let Some(owner) = self.consts.get(&const_name) {
            return Err(Error::conflict(
                &decl.name,
                format!("constant {const_name} is already used by {owner}"),
            ));
        }

        let mut level = &mut self.forest.roots;
        for (depth, segment) in sections.iter().enumerate() {
            let field = &fields[depth];
            let index = match level.iter().position(|node| node.field == *field) {
                Some(index) => index,
                None => {
                    let type_name = naming::type_name(&segments[..=depth]);
                    let path = fields[..=depth].join(".");
                    if let Some(owner) = self.types.get(&type_name) {
                        return Err(Error::conflict(
                            &decl.name,
                            format!("section `{path}` and section `{owner}` both map to struct {type_name}"),
                        ));
                    }
                    trace!(%path, %type_name, "new section");
                    self.types.insert(type_name.clone(), path);
                    level.push(ConfigNode {
                        name: naming::normalize(segment, true),
                        field: field.clone(),
                        kind: NodeKind::Section {
                            type_name,
                            children: Vec::new(),
                        },
                    });
                    level.len() - 1
                }
            };
            level = match &mut level[index].kind {
                NodeKind::Section { children, .. } => children,
                NodeKind::Leaf(leaf) => {
                    return Err(Error::conflict(
                        &decl.name,
                        format!("`{}` is already a variable ({})", leaf.dotted_path(), leaf.env_name),
                    ));
                }
            };
        }

        let field = &fields[sections.len()];
        if let Some(existing) = level.iter().find(|node| node.field == *field) {
            let reason = match &existing.kind {
                NodeKind::Leaf(leaf) => format!("field `{field}` is already declared by {}", leaf.env_name),
                NodeKind::Section { .. } => format!("`{field}` is already a section"),
            };
            return Err(Error::conflict(&decl.name, reason));
        }
        self.consts.insert(const_name.clone(), decl.name.clone());
        level.push(ConfigNode {
            name: naming::normalize(leaf_segment, true),
            field: field.clone(),
            kind: NodeKind::Leaf(LeafInfo {
                env_name: decl.name.clone(),
                const_name,
                path: fields,
                default: decl.value.clone(),
                line: decl.line,
            }),
        });
        Ok(())
    }
}

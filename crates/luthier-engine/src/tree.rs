//! Hierarchical tree manager
//!
//! Pure functions over any flat set of parent-pointing rows. Three
//! independent resource kinds (libraries, media folders, menu items)
//! share this contract; none of these functions query the store — the
//! caller supplies the node set, typically every node in one workspace
//! scope.
//!
//! A node whose `parent_id` points at a missing id is treated as a root
//! (orphan-safe); traversal never errors on dangling pointers, only
//! explicit cycle attempts are rejected, and only at reparent time —
//! prevention is the only supported strategy, cycles are never silently
//! "fixed".

use luthier_core::{IntegrityViolation, Resource};
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

use crate::error::Result;

/// Capability interface for anything with the `(id, parent_id)` shape
pub trait TreeNode {
	/// Node id
	fn id(&self) -> Uuid;

	/// Declared parent, if any
	fn parent_id(&self) -> Option<Uuid>;
}

impl TreeNode for Resource {
	fn id(&self) -> Uuid {
		self.id
	}

	fn parent_id(&self) -> Option<Uuid> {
		self.parent_id
	}
}

/// A node with its recursively nested children
#[derive(Debug, Clone)]
pub struct TreeEntry<N> {
	/// The node row, exactly as supplied
	pub node: N,

	/// Child entries, nested recursively
	pub children: Vec<TreeEntry<N>>,
}

impl<N: TreeNode> TreeEntry<N> {
	/// Number of direct children
	pub fn child_count(&self) -> usize {
		self.children.len()
	}

	/// Number of descendants, the entry itself excluded
	pub fn descendant_count(&self) -> usize {
		self.children
			.iter()
			.map(|c| 1 + c.descendant_count())
			.sum()
	}
}

fn children_index<N: TreeNode>(nodes: &[N]) -> HashMap<Option<Uuid>, Vec<usize>> {
	let ids: HashSet<Uuid> = nodes.iter().map(|n| n.id()).collect();
	let mut index: HashMap<Option<Uuid>, Vec<usize>> = HashMap::new();
	for (pos, node) in nodes.iter().enumerate() {
		// Dangling parents group under the root bucket
		let key = match node.parent_id() {
			Some(p) if ids.contains(&p) => Some(p),
			_ => None,
		};
		index.entry(key).or_default().push(pos);
	}
	index
}

fn attach<N: TreeNode + Clone>(
	nodes: &[N],
	index: &HashMap<Option<Uuid>, Vec<usize>>,
	parent: Option<Uuid>,
	visited: &mut HashSet<Uuid>,
) -> Vec<TreeEntry<N>> {
	let Some(positions) = index.get(&parent) else {
		return Vec::new();
	};
	let mut entries = Vec::with_capacity(positions.len());
	for &pos in positions {
		let node = &nodes[pos];
		// Visited guard terminates traversal over corrupt parent chains
		if !visited.insert(node.id()) {
			continue;
		}
		let children = attach(nodes, index, Some(node.id()), visited);
		entries.push(TreeEntry {
			node: node.clone(),
			children,
		});
	}
	entries
}

/// Build a nested tree from a flat node set
///
/// Pure function of its input. With `root_parent_id = None` the result
/// holds every root, orphans included; with `Some(id)` it holds the
/// subtree entries directly under that id.
pub fn build_tree<N: TreeNode + Clone>(nodes: &[N], root_parent_id: Option<Uuid>) -> Vec<TreeEntry<N>> {
	let index = children_index(nodes);
	let mut visited = HashSet::new();
	match root_parent_id {
		None => attach(nodes, &index, None, &mut visited),
		Some(root) => attach(nodes, &index, Some(root), &mut visited),
	}
}

/// Flatten a tree back to its node rows, depth-first
///
/// Rows come back exactly as supplied to `build_tree`, so
/// `flatten(build_tree(nodes, None))` reproduces `nodes` up to child
/// ordering.
pub fn flatten<N: Clone>(tree: &[TreeEntry<N>]) -> Vec<N> {
	let mut out = Vec::new();
	fn walk<N: Clone>(entries: &[TreeEntry<N>], out: &mut Vec<N>) {
		for entry in entries {
			out.push(entry.node.clone());
			walk(&entry.children, out);
		}
	}
	walk(tree, &mut out);
	out
}

/// Whether `candidate_id` sits anywhere inside the subtree rooted at
/// `ancestor_id`
///
/// Depth-first search over the supplied node set; also answers the
/// inverted "is X a parent of Y" question.
pub fn is_descendant_of<N: TreeNode + Clone>(
	candidate_id: Uuid,
	ancestor_id: Uuid,
	nodes: &[N],
) -> bool {
	let subtree = build_tree(nodes, Some(ancestor_id));
	fn contains<N: TreeNode>(entries: &[TreeEntry<N>], id: Uuid) -> bool {
		entries
			.iter()
			.any(|e| e.node.id() == id || contains(&e.children, id))
	}
	contains(&subtree, candidate_id)
}

/// Reparent guard: reject any assignment that would create a cycle
///
/// `node.parent_id = new_parent_id` is illegal when the new parent is
/// the node itself or one of its descendants. Violations return a
/// dedicated integrity error and must never be auto-corrected.
pub fn check_reparent<N: TreeNode + Clone>(
	node_id: Uuid,
	new_parent_id: Option<Uuid>,
	nodes: &[N],
) -> Result<()> {
	let Some(new_parent) = new_parent_id else {
		// Detaching to root can never form a cycle
		return Ok(());
	};
	if new_parent == node_id || is_descendant_of(new_parent, node_id, nodes) {
		return Err(IntegrityViolation::CycleAttempt {
			node: node_id,
			new_parent,
		}
		.into());
	}
	Ok(())
}

/// Ids of the subtree rooted at `root_id`, root first, depth-first
pub fn subtree_ids<N: TreeNode + Clone>(root_id: Uuid, nodes: &[N]) -> Vec<Uuid> {
	let mut out = vec![root_id];
	fn collect<N: TreeNode>(entries: &[TreeEntry<N>], out: &mut Vec<Uuid>) {
		for entry in entries {
			out.push(entry.node.id());
			collect(&entry.children, out);
		}
	}
	collect(&build_tree(nodes, Some(root_id)), &mut out);
	out
}

/// Number of direct children of `id` in the node set
///
/// Equivalent to the store's counting join over the same rows, so list
/// endpoints are testable without a live store.
pub fn child_count<N: TreeNode>(id: Uuid, nodes: &[N]) -> usize {
	nodes.iter().filter(|n| n.parent_id() == Some(id)).count()
}

/// Number of descendants of `id` in the node set, `id` excluded
pub fn descendant_count<N: TreeNode + Clone>(id: Uuid, nodes: &[N]) -> usize {
	subtree_ids(id, nodes).len() - 1
}

impl<S: luthier_store::Store> crate::Engine<S> {
	/// The flat node set of one workspace scope and kind
	///
	/// This is the input the pure tree functions expect; callers read
	/// it once per request and reuse it.
	pub async fn scope_nodes(
		&self,
		workspace_id: Option<Uuid>,
		kind: luthier_core::ResourceKind,
	) -> Result<Vec<Resource>> {
		Ok(self
			.store()
			.resources_in_scope(workspace_id, kind)
			.await?)
	}

	/// Reparent a tree node, guarding the forest invariant
	///
	/// Check-then-act: the cycle check runs against a fresh scope
	/// snapshot, then the parent pointer is written. A rejected
	/// reparent leaves the store untouched.
	pub async fn move_subtree(&self, node_id: Uuid, new_parent_id: Option<Uuid>) -> Result<()> {
		let mut node = self
			.store()
			.resource(node_id)
			.await?
			.ok_or(crate::error::EngineError::NotFound {
				entity: "resource",
				id: node_id,
			})?;
		let nodes = self
			.store()
			.resources_in_scope(node.workspace_id, node.kind)
			.await?;
		check_reparent(node_id, new_parent_id, &nodes)?;

		node.parent_id = new_parent_id;
		node.updated_at = self.clock().now();
		self.store()
			.apply(luthier_store::WriteBatch::single(
				luthier_store::WriteOp::UpdateResource(node),
			))
			.await?;
		Ok(())
	}
}

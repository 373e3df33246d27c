use std::{
    any::type_name,
    ops::{Index, IndexMut},
    rc::Rc,
    sync::Arc,
};

use log::debug;

use super::{Handle, Node, Scope, handle::Allocator, short_type_name};
use crate::{
    error::{Error, Result},
    reflect::{Attributed, Context, Datum, Kind, Pointer, Signature},
};

/// Owner of every scope in a tree (or forest) of scopes.
///
/// Nodes are addressed by [`Handle`]. Freed slots are recycled with a new generation, so handles
/// to destroyed scopes are rejected with [`Error::InvalidHandle`].
///
/// The hierarchy holds the [`Context`] it was built with: reflected nodes are populated from its
/// type registry, and class names are resolved through its factory.
pub struct Hierarchy {
    context: Rc<Context>,
    allocator: Allocator,
    nodes: Vec<Option<Box<dyn Node>>>,
    live: usize,
}

impl Default for Hierarchy {
    fn default() -> Self {
        Self::new(Context::builder().build())
    }
}

impl Hierarchy {
    pub fn new(context: Rc<Context>) -> Self {
        Self {
            context,
            allocator: Allocator::default(),
            nodes: Vec::new(),
            live: 0,
        }
    }

    #[inline]
    pub fn context(&self) -> &Rc<Context> {
        &self.context
    }

    /// Number of live scopes.
    #[inline]
    pub fn len(&self) -> usize {
        self.live
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// True if `handle` names a live scope.
    pub fn contains(&self, handle: Handle) -> bool {
        self.allocator.is_current(handle)
            && matches!(self.nodes.get(handle.index()), Some(Some(_)))
    }

    // ==================== Node access ====================

    pub fn node(&self, handle: Handle) -> Result<&dyn Node> {
        match self.nodes.get(handle.index()) {
            Some(Some(node)) if self.allocator.is_current(handle) => Ok(node.as_ref()),
            _ => Err(Error::InvalidHandle(handle)),
        }
    }

    pub fn node_mut(&mut self, handle: Handle) -> Result<&mut dyn Node> {
        if !self.allocator.is_current(handle) {
            return Err(Error::InvalidHandle(handle));
        }
        match self.nodes.get_mut(handle.index()) {
            Some(Some(node)) => Ok(node.as_mut()),
            _ => Err(Error::InvalidHandle(handle)),
        }
    }

    /// The node at `handle` as a concrete type.
    pub fn get<T: Node>(&self, handle: Handle) -> Result<&T> {
        let node = self.node(handle)?;
        node.downcast_ref::<T>().ok_or(Error::WrongType {
            expected: short_type_name::<T>(),
            actual: node.class_name(),
        })
    }

    pub fn get_mut<T: Node>(&mut self, handle: Handle) -> Result<&mut T> {
        let node = self.node_mut(handle)?;
        let actual = node.class_name();
        node.downcast_mut::<T>().ok_or(Error::WrongType {
            expected: short_type_name::<T>(),
            actual,
        })
    }

    #[inline]
    pub fn scope(&self, handle: Handle) -> Result<&Scope> {
        Ok(self.node(handle)?.scope())
    }

    #[inline]
    pub fn scope_mut(&mut self, handle: Handle) -> Result<&mut Scope> {
        Ok(self.node_mut(handle)?.scope_mut())
    }

    #[inline]
    pub fn parent(&self, handle: Handle) -> Result<Option<Handle>> {
        Ok(self.scope(handle)?.parent())
    }

    #[inline]
    pub fn class_name(&self, handle: Handle) -> Result<&'static str> {
        Ok(self.node(handle)?.class_name())
    }

    /// Shorthand for appending to the scope at `handle`.
    pub fn append(&mut self, handle: Handle, name: &str) -> Result<&mut Datum> {
        self.scope_mut(handle)?.append(name)
    }

    // ==================== Creation ====================

    /// Create an empty root scope.
    pub fn new_scope(&mut self) -> Handle {
        self.place(Box::new(Scope::new()), None)
    }

    /// Create a root instance of a reflected type.
    pub fn create<T: Attributed + Default>(&mut self) -> Result<Handle> {
        self.insert(Box::new(T::default()))
    }

    /// Create a root instance of the class registered with the factory under `class_name`.
    pub fn create_class(&mut self, class_name: &str) -> Result<Handle> {
        let node = self
            .context
            .factory()
            .create(class_name)
            .ok_or_else(|| Error::UnknownClass(class_name.to_string()))?;
        self.insert(node)
    }

    /// Place `node` as a new root, populating its prescribed attributes if it is reflected.
    ///
    /// The node's scope is expected to be empty; any attributes it already holds are kept ahead
    /// of the prescribed ones.
    pub fn insert(&mut self, node: Box<dyn Node>) -> Result<Handle> {
        let signatures = self.signatures_of_node(node.as_ref())?;
        let handle = self.place(node, None);
        if let Some(signatures) = signatures
            && let Err(error) = self.populate(handle, &signatures)
        {
            self.free_subtree(handle);
            return Err(error);
        }
        Ok(handle)
    }

    /// Store `node` in a fresh slot, stamping its handle and parent.
    fn place(&mut self, mut node: Box<dyn Node>, parent: Option<Handle>) -> Handle {
        let handle = self.allocator.alloc();
        let scope = node.scope_mut();
        scope.set_handle(Some(handle));
        scope.set_parent(parent);

        if handle.index() >= self.nodes.len() {
            self.nodes.resize_with(handle.index() + 1, || None);
        }
        self.nodes[handle.index()] = Some(node);
        self.live += 1;
        handle
    }

    /// Append the self-reference and one datum per signature. External signatures are bound to
    /// the node's fields; table signatures receive `count` fresh child scopes.
    fn populate(&mut self, handle: Handle, signatures: &[Signature]) -> Result<()> {
        let node = self.node_mut(handle)?;
        node.scope_mut()
            .append(Scope::THIS)?
            .assign(Pointer::Node(handle))?;

        for signature in signatures {
            let binding = signature.binding(&*node)?;
            let datum = node.scope_mut().append(signature.name())?;
            datum.set_kind(signature.kind())?;
            if let Some(binding) = binding {
                binding.attach(datum)?;
            }
        }

        for signature in signatures.iter().filter(|s| s.kind() == Kind::Table) {
            for _ in 0..signature.count() {
                self.append_scope(handle, signature.name())?;
            }
        }
        Ok(())
    }

    /// Point the self-reference and every external datum of the node at `handle` back at the
    /// node's own fields.
    fn rebind(&mut self, handle: Handle) -> Result<()> {
        let Some(signatures) = self.signatures(handle)? else {
            return Ok(());
        };

        let node = self.node_mut(handle)?;
        if let Some(this) = node.scope_mut().find_mut(Scope::THIS) {
            this.set(0, Pointer::Node(handle))?;
        }
        for signature in signatures.iter() {
            let Some(binding) = signature.binding(&*node)? else {
                continue;
            };
            let datum = node
                .scope_mut()
                .find_mut(signature.name())
                .ok_or_else(|| Error::MissingAttribute(signature.name().to_string()))?;
            if datum.is_external() {
                binding.attach(datum)?;
            }
        }
        Ok(())
    }

    // ==================== Structure ====================

    /// Create a new empty child scope under `parent`'s table attribute `name`.
    ///
    /// Always adds a new child, even when `name` already holds some.
    pub fn append_scope(&mut self, parent: Handle, name: &str) -> Result<Handle> {
        let scope = self.scope_mut(parent)?;
        let (datum, _) = scope.append_entry(name)?;
        if let Err(Error::KindReassignment { current, .. }) = datum.set_kind(Kind::Table) {
            return Err(Error::IncompatibleAttribute {
                name: name.to_string(),
                kind: current,
            });
        }

        let child = self.place(Box::new(Scope::new()), Some(parent));
        self.table_mut(parent, name)?.push_handle(child)?;
        Ok(child)
    }

    /// Move `child` under `parent`'s table attribute `name`, detaching it from its current
    /// parent first.
    ///
    /// Fails without modifying the tree if `child` is `parent`, if `child` is an ancestor of
    /// `parent`, or if `name` holds non-table data.
    pub fn adopt(&mut self, parent: Handle, child: Handle, name: &str) -> Result<()> {
        self.node(child)?;
        let scope = self.scope(parent)?;
        if parent == child {
            return Err(Error::SelfAdoption);
        }
        if self.is_ancestor_of(child, parent) {
            return Err(Error::AncestorAdoption);
        }
        if name.is_empty() {
            return Err(Error::EmptyName);
        }
        if let Some(datum) = scope.find(name)
            && !matches!(datum.kind(), Kind::Table | Kind::Unknown)
        {
            return Err(Error::IncompatibleAttribute {
                name: name.to_string(),
                kind: datum.kind(),
            });
        }

        self.detach(child)?;
        let datum = self.append(parent, name)?;
        datum.push_handle(child)?;
        self.scope_mut(child)?.set_parent(Some(parent));
        debug!("adopted {child} into {parent}.{name}");
        Ok(())
    }

    /// Remove `child` from `parent`'s table datums without destroying it. The caller takes over
    /// its lifetime. Returns false if `child` is not a direct child of `parent`.
    pub fn orphan(&mut self, parent: Handle, child: Handle) -> Result<bool> {
        let found = self
            .scope_mut(parent)?
            .iter_mut()
            .any(|(_, datum)| datum.remove_handle(child).is_some());
        if found {
            if let Ok(scope) = self.scope_mut(child) {
                scope.set_parent(None);
            }
            debug!("orphaned {child} from {parent}");
        }
        Ok(found)
    }

    /// Orphan `handle` from whichever scope holds it, making it a root.
    pub fn detach(&mut self, handle: Handle) -> Result<()> {
        if let Some(parent) = self.parent(handle)? {
            self.orphan(parent, handle)?;
        }
        Ok(())
    }

    fn table_mut(&mut self, handle: Handle, name: &str) -> Result<&mut Datum> {
        self.scope_mut(handle)?
            .find_mut(name)
            .ok_or_else(|| Error::MissingAttribute(name.to_string()))
    }

    /// True if `ancestor` is a strict ancestor of `handle`.
    pub fn is_ancestor_of(&self, ancestor: Handle, handle: Handle) -> bool {
        let mut current = self.scope(handle).ok().and_then(Scope::parent);
        while let Some(scope) = current {
            if scope == ancestor {
                return true;
            }
            current = self.scope(scope).ok().and_then(Scope::parent);
        }
        false
    }

    /// True if `handle` is a strict descendant of `ancestor`.
    #[inline]
    pub fn is_descendant_of(&self, handle: Handle, ancestor: Handle) -> bool {
        self.is_ancestor_of(ancestor, handle)
    }

    /// The root of the tree holding `handle`.
    pub fn root_of(&self, handle: Handle) -> Result<Handle> {
        let mut current = handle;
        while let Some(parent) = self.parent(current)? {
            current = parent;
        }
        Ok(current)
    }

    /// Child handles of `handle`, in attribute then element order.
    pub fn children(&self, handle: Handle) -> Result<Vec<Handle>> {
        Ok(self.scope(handle)?.children().collect())
    }

    // ==================== Search ====================

    /// Find `name` at `handle` or the nearest ancestor holding it.
    pub fn search(&self, handle: Handle, name: &str) -> Option<(Handle, &Datum)> {
        let mut current = Some(handle);
        while let Some(at) = current {
            let scope = self.scope(at).ok()?;
            if let Some(datum) = scope.find(name) {
                return Some((at, datum));
            }
            current = scope.parent();
        }
        None
    }

    pub fn search_mut(&mut self, handle: Handle, name: &str) -> Option<(Handle, &mut Datum)> {
        let (at, _) = self.search(handle, name)?;
        let datum = self.scope_mut(at).ok()?.find_mut(name)?;
        Some((at, datum))
    }

    /// Depth-first search for `name` from `handle` downward: a scope's own attributes in order,
    /// descending into each table attribute's children as it is passed.
    ///
    /// Returns the scope holding the match and the attribute's index within it.
    pub fn down_search(&self, handle: Handle, name: &str) -> Option<(Handle, usize)> {
        let scope = self.scope(handle).ok()?;
        for (index, (attribute, datum)) in scope.iter().enumerate() {
            if attribute == name {
                return Some((handle, index));
            }
            for child in datum.handles() {
                if let Some(found) = self.down_search(*child, name) {
                    return Some(found);
                }
            }
        }
        None
    }

    /// Search the whole tree holding `handle`, starting from its root.
    pub fn search_for_target(&self, handle: Handle, name: &str) -> Option<(Handle, usize)> {
        let root = self.root_of(handle).ok()?;
        self.down_search(root, name)
    }

    pub fn search_for_target_datum(&mut self, handle: Handle, name: &str) -> Option<&mut Datum> {
        let (at, index) = self.search_for_target(handle, name)?;
        self.scope_mut(at).ok()?.get_mut(index)
    }

    // ==================== Copy, move, assign ====================

    /// Deep copy the subtree at `handle` into a new root.
    pub fn clone_scope(&mut self, handle: Handle) -> Result<Handle> {
        let copy = self.clone_subtree(handle, None)?;
        debug!("cloned {handle} into {copy}");
        Ok(copy)
    }

    fn clone_subtree(&mut self, source: Handle, parent: Option<Handle>) -> Result<Handle> {
        let node = self.node(source)?.clone_node();
        let handle = self.place(node, parent);
        if let Err(error) = self.copy_children(handle).and_then(|()| self.rebind(handle)) {
            self.strip_foreign_children(handle)?;
            self.free_subtree(handle);
            return Err(error);
        }
        Ok(handle)
    }

    /// Replace every child handle of the freshly placed node at `handle` with a deep copy.
    fn copy_children(&mut self, handle: Handle) -> Result<()> {
        for position in self.scope(handle)?.table_positions() {
            let sources = self.scope(handle)?[position].handles().to_vec();
            let mut copies = Vec::with_capacity(sources.len());
            for source in sources {
                match self.clone_subtree(source, Some(handle)) {
                    Ok(copy) => copies.push(copy),
                    Err(error) => {
                        for copy in copies {
                            self.free_subtree(copy);
                        }
                        return Err(error);
                    }
                }
            }
            self.scope_mut(handle)?[position]
                .handles_mut()
                .copy_from_slice(&copies);
        }
        Ok(())
    }

    /// Drop table entries of `handle` that name another node's children, left over from a copy
    /// that failed before replacing them.
    fn strip_foreign_children(&mut self, handle: Handle) -> Result<()> {
        let foreign: Vec<Handle> = self
            .scope(handle)?
            .children()
            .filter(|child| !matches!(self.parent(*child), Ok(Some(parent)) if parent == handle))
            .collect();
        let scope = self.scope_mut(handle)?;
        for position in scope.table_positions() {
            for child in &foreign {
                scope[position].remove_handle(*child);
            }
        }
        Ok(())
    }

    /// Move the node at `handle` to a new slot, returning its new handle.
    ///
    /// The moved node becomes a root and its children are re-parented to it. The old slot keeps an
    /// empty, detached scope that the caller may destroy.
    pub fn move_scope(&mut self, handle: Handle) -> Result<Handle> {
        self.detach(handle)?;
        let husk: Box<dyn Node> = Box::new(Scope::new());
        let node = self.nodes[handle.index()]
            .replace(husk)
            .ok_or(Error::InvalidHandle(handle))?;
        if let Some(Some(husk)) = self.nodes.get_mut(handle.index()) {
            husk.scope_mut().set_handle(Some(handle));
        }

        let moved = self.place(node, None);
        for child in self.children(moved)? {
            self.scope_mut(child)?.set_parent(Some(moved));
        }
        self.rebind(moved)?;
        debug!("moved {handle} to {moved}");
        Ok(moved)
    }

    /// Make the node at `target` a deep copy of the node at `source`, keeping `target`'s handle and
    /// parent. `target`'s previous children are destroyed.
    pub fn assign(&mut self, target: Handle, source: Handle) -> Result<()> {
        self.node(source)?;
        let parent = self.parent(target)?;
        if target == source {
            return Ok(());
        }
        if self.is_ancestor_of(target, source) || self.is_ancestor_of(source, target) {
            return Err(Error::OverlappingAssignment);
        }

        for child in self.children(target)? {
            self.free_subtree(child);
        }
        let mut node = self.node(source)?.clone_node();
        let scope = node.scope_mut();
        scope.set_handle(Some(target));
        scope.set_parent(parent);
        self.nodes[target.index()] = Some(node);

        if let Err(error) = self.copy_children(target) {
            self.strip_foreign_children(target)?;
            return Err(error);
        }
        self.rebind(target)
    }

    // ==================== Equality ====================

    /// Structural equality of two subtrees: same attribute names in the same order with equal
    /// datums, comparing table children recursively. The self-reference is ignored.
    pub fn equals(&self, a: Handle, b: Handle) -> Result<bool> {
        let (left, right) = (self.scope(a)?, self.scope(b)?);
        if left.len() != right.len() {
            return Ok(false);
        }
        for ((left_name, left), (right_name, right)) in left.iter().zip(right.iter()) {
            if left_name != right_name {
                return Ok(false);
            }
            if left_name == Scope::THIS {
                continue;
            }
            let equal = match (left.kind(), right.kind()) {
                (Kind::Table, Kind::Table) => {
                    let (left, right) = (left.handles(), right.handles());
                    left.len() == right.len() && self.all_equal(left, right)?
                }
                _ => left == right,
            };
            if !equal {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn all_equal(&self, left: &[Handle], right: &[Handle]) -> Result<bool> {
        for (a, b) in left.iter().zip(right) {
            if !self.equals(*a, *b)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    // ==================== Destruction ====================

    /// Destroy the subtree at `handle`, detaching it from its parent first.
    pub fn destroy(&mut self, handle: Handle) -> Result<()> {
        self.detach(handle)?;
        let freed = self.free_subtree(handle);
        debug!("destroyed {handle} ({freed} scope(s))");
        Ok(())
    }

    /// Free `handle` and every descendant. Returns how many slots were released.
    fn free_subtree(&mut self, handle: Handle) -> usize {
        let mut pending = vec![handle];
        let mut freed = 0;
        while let Some(handle) = pending.pop() {
            if !self.allocator.is_current(handle) {
                continue;
            }
            if let Some(node) = self.nodes.get_mut(handle.index()).and_then(Option::take) {
                pending.extend(node.scope().children());
                self.allocator.free(handle);
                self.live -= 1;
                freed += 1;
            }
        }
        freed
    }

    // ==================== Reflection ====================

    fn signatures_of_node(&self, node: &dyn Node) -> Result<Option<Arc<[Signature]>>> {
        if !node.is_attributed() {
            return Ok(None);
        }
        self.context
            .types()
            .signatures_by_type(node.as_any().type_id(), node.class_name())
            .map(Some)
    }

    /// Registered signatures of the node at `handle`, or `None` for plain scopes.
    pub fn signatures(&self, handle: Handle) -> Result<Option<Arc<[Signature]>>> {
        self.signatures_of_node(self.node(handle)?)
    }

    /// Number of prescribed attributes of the node at `handle`, counting the self-reference.
    pub fn prescribed_len(&self, handle: Handle) -> Result<usize> {
        Ok(self.signatures(handle)?.map_or(0, |s| s.len() + 1))
    }

    pub fn is_attribute(&self, handle: Handle, name: &str) -> Result<bool> {
        Ok(self.scope(handle)?.contains(name))
    }

    /// True if `name` is the self-reference or one of the registered signatures, sitting at the
    /// position its signature gives it.
    pub fn is_prescribed_attribute(&self, handle: Handle, name: &str) -> Result<bool> {
        let Some(signatures) = self.signatures(handle)? else {
            return Ok(false);
        };
        Ok(match self.scope(handle)?.index_of(name) {
            Some(0) => name == Scope::THIS,
            Some(position) if position <= signatures.len() => {
                signatures[position - 1].name() == name
            }
            _ => false,
        })
    }

    pub fn is_auxiliary_attribute(&self, handle: Handle, name: &str) -> Result<bool> {
        Ok(self.is_attribute(handle, name)? && !self.is_prescribed_attribute(handle, name)?)
    }

    /// Append an attribute beyond the prescribed set. Fails if `name` is prescribed.
    pub fn append_auxiliary_attribute(&mut self, handle: Handle, name: &str) -> Result<&mut Datum> {
        if self.is_prescribed_attribute(handle, name)? {
            return Err(Error::PrescribedAttribute(name.to_string()));
        }
        self.append(handle, name)
    }
}

impl Index<Handle> for Hierarchy {
    type Output = Scope;

    fn index(&self, handle: Handle) -> &Scope {
        match self.scope(handle) {
            Ok(scope) => scope,
            Err(error) => panic!("{error}"),
        }
    }
}

impl IndexMut<Handle> for Hierarchy {
    fn index_mut(&mut self, handle: Handle) -> &mut Scope {
        match self.scope_mut(handle) {
            Ok(scope) => scope,
            Err(error) => panic!("{error}"),
        }
    }
}

impl std::fmt::Debug for Hierarchy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct(type_name::<Self>())
            .field("live", &self.live)
            .field("slots", &self.allocator.slots())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// root { Name: "root", Children: [a { Health: 10, Children: [b] }, c] }
    fn sample() -> (Hierarchy, [Handle; 4]) {
        let mut tree = Hierarchy::default();
        let root = tree.new_scope();
        tree.append(root, "Name").unwrap().push_back("root".to_string()).unwrap();
        let a = tree.append_scope(root, "Children").unwrap();
        tree.append(a, "Health").unwrap().push_back(10).unwrap();
        let b = tree.append_scope(a, "Children").unwrap();
        let c = tree.append_scope(root, "Children").unwrap();
        (tree, [root, a, b, c])
    }

    // ==================== Structure ====================

    #[test]
    fn append_scope_builds_a_tree() {
        // When
        let (tree, [root, a, b, c]) = sample();

        // Then
        assert_eq!(tree.len(), 4);
        assert_eq!(tree[root]["Children"].handles(), &[a, c]);
        assert_eq!(tree.parent(a), Ok(Some(root)));
        assert_eq!(tree.parent(b), Ok(Some(a)));
        assert_eq!(tree.parent(root), Ok(None));
        assert_eq!(tree[b].handle(), Some(b));
        assert_eq!(tree.children(root), Ok(vec![a, c]));
        assert_eq!(tree.root_of(b), Ok(root));
    }

    #[test]
    fn append_scope_rejects_non_table_attributes() {
        // Given
        let (mut tree, [root, ..]) = sample();

        // When
        let result = tree.append_scope(root, "Name");

        // Then
        assert_eq!(
            result,
            Err(Error::IncompatibleAttribute {
                name: "Name".to_string(),
                kind: Kind::String,
            })
        );
        assert_eq!(tree.len(), 4);
    }

    #[test]
    fn adopt_moves_between_parents() {
        // Given
        let (mut tree, [root, a, b, c]) = sample();

        // When
        tree.adopt(c, b, "Adopted").unwrap();

        // Then
        assert_eq!(tree.parent(b), Ok(Some(c)));
        assert!(tree[a]["Children"].is_empty());
        assert_eq!(tree[c]["Adopted"].handles(), &[b]);
        assert!(tree.is_descendant_of(b, root));
        assert!(!tree.is_descendant_of(b, a));
        assert_eq!(tree.len(), 4);
    }

    #[test]
    fn adopt_rejects_cycles() {
        // Given
        let (mut tree, [root, a, b, _]) = sample();

        // Then
        assert_eq!(tree.adopt(a, a, "Self"), Err(Error::SelfAdoption));
        assert_eq!(tree.adopt(b, root, "Up"), Err(Error::AncestorAdoption));
        assert_eq!(tree.adopt(b, a, "Up"), Err(Error::AncestorAdoption));

        // Then - nothing moved
        assert_eq!(tree.parent(a), Ok(Some(root)));
        assert_eq!(tree.parent(b), Ok(Some(a)));
        assert!(!tree.is_attribute(b, "Up").unwrap());
    }

    #[test]
    fn adopt_rejects_bad_names() {
        // Given
        let (mut tree, [root, a, b, _]) = sample();

        // Then
        assert_eq!(tree.adopt(root, b, ""), Err(Error::EmptyName));
        assert_eq!(
            tree.adopt(root, b, "Name"),
            Err(Error::IncompatibleAttribute {
                name: "Name".to_string(),
                kind: Kind::String,
            })
        );
        assert_eq!(tree.parent(b), Ok(Some(a)));
    }

    #[test]
    fn orphan_releases_without_destroying() {
        // Given
        let (mut tree, [root, a, b, c]) = sample();

        // When
        let orphaned = tree.orphan(root, a).unwrap();

        // Then
        assert!(orphaned);
        assert_eq!(tree[root]["Children"].handles(), &[c]);
        assert_eq!(tree.parent(a), Ok(None));
        assert_eq!(tree.root_of(b), Ok(a));
        assert_eq!(tree.len(), 4);

        // Then - orphaning a non child is a no-op
        assert_eq!(tree.orphan(root, b), Ok(false));
    }

    // ==================== Search ====================

    #[test]
    fn search_walks_up() {
        // Given
        let (tree, [root, a, b, _]) = sample();

        // When
        let found = tree.search(b, "Health");

        // Then
        assert_eq!(found.map(|(at, datum)| (at, datum.get::<i32>(0))), Some((a, Ok(10))));
        assert_eq!(tree.search(b, "Name").map(|(at, _)| at), Some(root));
        assert!(tree.search(b, "Missing").is_none());
        assert!(tree.search(root, "Health").is_none());
    }

    #[test]
    fn search_mut_writes_the_ancestor() {
        // Given
        let (mut tree, [_, a, b, _]) = sample();

        // When
        let (at, datum) = tree.search_mut(b, "Health").unwrap();
        datum.set(0, 11).unwrap();

        // Then
        assert_eq!(at, a);
        assert_eq!(tree[a]["Health"].get::<i32>(0), Ok(11));
    }

    #[test]
    fn down_search_is_depth_first() {
        // Given
        let (mut tree, [root, a, b, c]) = sample();
        tree.append(b, "Target").unwrap().push_back(1.0f32).unwrap();
        tree.append(c, "Target").unwrap().push_back(2.0f32).unwrap();

        // When
        let found = tree.down_search(root, "Target");

        // Then - b is reached through a before c
        assert_eq!(found, Some((b, 0)));
        assert_eq!(tree.down_search(a, "Health"), Some((a, 0)));
        assert_eq!(tree.down_search(c, "Health"), None);
    }

    #[test]
    fn search_for_target_starts_at_the_root() {
        // Given
        let (mut tree, [_, _, b, c]) = sample();
        tree.append(b, "Target").unwrap().push_back(1.0f32).unwrap();

        // When
        let datum = tree.search_for_target_datum(c, "Target").unwrap();
        datum.set(0, 5.0f32).unwrap();

        // Then
        assert_eq!(tree.search_for_target(c, "Target"), Some((b, 0)));
        assert_eq!(tree[b]["Target"].get::<f32>(0), Ok(5.0));
        assert!(tree.search_for_target(c, "Nope").is_none());
    }

    // ==================== Copy, move, assign ====================

    #[test]
    fn clone_scope_is_deep_and_independent() {
        // Given
        let (mut tree, [root, a, ..]) = sample();

        // When
        let copy = tree.clone_scope(root).unwrap();

        // Then
        assert_eq!(tree.len(), 8);
        assert!(tree.equals(root, copy).unwrap());
        assert_eq!(tree.parent(copy), Ok(None));
        let copied_a = tree[copy]["Children"].table(0).unwrap();
        assert_ne!(copied_a, a);
        assert_eq!(tree.parent(copied_a), Ok(Some(copy)));

        // When - the copy diverges
        tree[copied_a]["Health"].set(0, 99).unwrap();

        // Then
        assert_eq!(tree[a]["Health"].get::<i32>(0), Ok(10));
        assert!(!tree.equals(root, copy).unwrap());
    }

    fn stale_handle(tree: &mut Hierarchy) -> Handle {
        let handle = tree.new_scope();
        tree.destroy(handle).unwrap();
        handle
    }

    #[test]
    fn failed_clone_releases_partial_copies() {
        // Given - the second child of root is gone
        let (mut tree, [root, a, b, _]) = sample();
        let stale = stale_handle(&mut tree);
        tree[root]["Children"].handles_mut()[1] = stale;

        // When
        let result = tree.clone_scope(root);

        // Then
        assert_eq!(result, Err(Error::InvalidHandle(stale)));
        assert_eq!(tree.len(), 4);
        assert_eq!(tree.parent(b), Ok(Some(a)));
        assert_eq!(tree[a]["Health"].get::<i32>(0), Ok(10));
        assert_eq!(tree[root]["Children"].handles(), &[a, stale]);
    }

    #[test]
    fn failed_assign_keeps_no_source_children() {
        // Given
        let (mut tree, [root, a, b, c]) = sample();
        let stale = stale_handle(&mut tree);
        tree[a]["Children"].push_handle(stale).unwrap();

        // When
        let result = tree.assign(c, a);

        // Then
        assert_eq!(result, Err(Error::InvalidHandle(stale)));
        assert_eq!(tree.len(), 4);
        assert!(tree[c]["Children"].handles().is_empty());
        assert_eq!(tree.parent(c), Ok(Some(root)));
        assert_eq!(tree.parent(b), Ok(Some(a)));
        assert_eq!(tree[a]["Children"].handles(), &[b, stale]);
    }

    #[test]
    fn move_scope_relocates_the_node() {
        // Given
        let (mut tree, [root, a, b, _]) = sample();

        // When
        let moved = tree.move_scope(a).unwrap();

        // Then
        assert_ne!(moved, a);
        assert_eq!(tree.parent(moved), Ok(None));
        assert_eq!(tree.parent(b), Ok(Some(moved)));
        assert_eq!(tree[moved]["Health"].get::<i32>(0), Ok(10));
        assert!(!tree[root].children().any(|child| child == a || child == moved));

        // Then - the old slot is an empty husk
        assert!(tree[a].is_empty());
        tree.destroy(a).unwrap();
        assert!(tree.contains(b));
    }

    #[test]
    fn assign_replaces_contents_in_place() {
        // Given
        let (mut tree, [root, a, b, c]) = sample();

        // When
        tree.assign(c, a).unwrap();

        // Then
        assert_eq!(tree.parent(c), Ok(Some(root)));
        assert!(tree.equals(c, a).unwrap());
        assert_eq!(tree[root]["Children"].handles(), &[a, c]);
        let copied_b = tree[c]["Children"].table(0).unwrap();
        assert_ne!(copied_b, b);
        assert_eq!(tree.parent(copied_b), Ok(Some(c)));
        assert_eq!(tree.len(), 5);
    }

    #[test]
    fn assign_rejects_overlapping_trees() {
        // Given
        let (mut tree, [root, a, b, _]) = sample();

        // Then
        assert_eq!(tree.assign(a, b), Err(Error::OverlappingAssignment));
        assert_eq!(tree.assign(b, root), Err(Error::OverlappingAssignment));
        assert_eq!(tree.assign(a, a), Ok(()));
        assert_eq!(tree.len(), 4);
    }

    // ==================== Equality ====================

    #[test]
    fn equality_compares_structure() {
        // Given
        let mut tree = Hierarchy::default();
        let left = tree.new_scope();
        let right = tree.new_scope();
        for handle in [left, right] {
            tree.append(handle, "A").unwrap().push_back(1).unwrap();
            tree.append_scope(handle, "Kids").unwrap();
        }

        // Then
        assert!(tree.equals(left, right).unwrap());

        // When - different child contents
        let kid = tree[right]["Kids"].table(0).unwrap();
        tree.append(kid, "B").unwrap();

        // Then
        assert!(!tree.equals(left, right).unwrap());
    }

    // ==================== Destruction ====================

    #[test]
    fn destroy_frees_the_subtree() {
        // Given
        let (mut tree, [root, a, b, c]) = sample();

        // When
        tree.destroy(a).unwrap();

        // Then
        assert_eq!(tree.len(), 2);
        assert!(!tree.contains(a));
        assert!(!tree.contains(b));
        assert_eq!(tree[root]["Children"].handles(), &[c]);
        assert_eq!(tree.scope(b).err(), Some(Error::InvalidHandle(b)));
    }

    #[test]
    fn stale_handles_are_rejected_after_reuse() {
        // Given
        let mut tree = Hierarchy::default();
        let first = tree.new_scope();
        tree.destroy(first).unwrap();

        // When
        let second = tree.new_scope();

        // Then
        assert_eq!(second.index(), first.index());
        assert_ne!(second, first);
        assert!(tree.contains(second));
        assert!(tree.node(first).is_err());
        assert_eq!(tree.destroy(first), Err(Error::InvalidHandle(first)));
    }

    #[test]
    #[should_panic(expected = "does not refer to a live scope")]
    fn indexing_a_stale_handle_panics() {
        let mut tree = Hierarchy::default();
        let handle = tree.new_scope();
        tree.destroy(handle).unwrap();
        let _ = &tree[handle];
    }

    #[test]
    fn typed_access() {
        // Given
        let mut tree = Hierarchy::default();
        let handle = tree.new_scope();

        // Then
        assert!(tree.get::<Scope>(handle).is_ok());
        assert_eq!(tree.class_name(handle), Ok(Scope::CLASS_NAME));
        assert_eq!(tree.create_class("Scope").map(|h| tree.contains(h)), Ok(true));
    }
}

use std::{
    any::TypeId as StdTypeId,
    sync::{
        Arc, PoisonError, RwLock,
        atomic::{AtomicU32, Ordering},
    },
};

use dashmap::{DashMap, mapref::entry::Entry};
use log::info;

use crate::{
    error::{Error, Result},
    reflect::{Attributed, Signature},
};

/// Dense identifier of a registered reflected type.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(pub(crate) u32);

impl TypeId {
    #[inline]
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

/// What the registry knows about one reflected type.
#[derive(Debug, Clone)]
pub struct TypeInfo {
    id: TypeId,
    name: &'static str,
    type_id: StdTypeId,
    signatures: Arc<[Signature]>,
}

impl TypeInfo {
    fn new<T: Attributed>(id: TypeId) -> Self {
        Self {
            id,
            name: T::CLASS_NAME,
            type_id: StdTypeId::of::<T>(),
            signatures: T::signatures().into(),
        }
    }

    #[inline]
    pub fn id(&self) -> TypeId {
        self.id
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[inline]
    pub fn type_id(&self) -> StdTypeId {
        self.type_id
    }

    /// Prescribed attributes, in the order they are appended to an instance.
    #[inline]
    pub fn signatures(&self) -> &Arc<[Signature]> {
        &self.signatures
    }
}

/// Registry of reflected types and their prescribed attribute signatures.
///
/// Lookups by Rust type go through a `DashMap`, the per-type information sits behind an `RwLock`
/// that is only written on registration. A registry is built once per [`Context`] and read from
/// then on.
///
/// [`Context`]: crate::reflect::Context
pub struct TypeRegistry {
    /// Rust type to registry id.
    type_map: DashMap<StdTypeId, TypeId>,

    /// Registered types, indexed by id.
    types: RwLock<Vec<Option<TypeInfo>>>,

    /// Next available id.
    next_id: AtomicU32,
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeRegistry {
    #[inline]
    pub fn new() -> Self {
        Self {
            type_map: DashMap::new(),
            types: RwLock::new(Vec::new()),
            next_id: AtomicU32::new(0),
        }
    }

    /// Register `T` and its signatures. Registering the same type twice is an error.
    pub fn register<T: Attributed>(&self) -> Result<TypeId> {
        match self.type_map.entry(StdTypeId::of::<T>()) {
            Entry::Occupied(_) => Err(Error::AlreadyRegistered(T::CLASS_NAME.to_string())),
            Entry::Vacant(entry) => {
                let id = TypeId(self.next_id.fetch_add(1, Ordering::Relaxed));
                let info = TypeInfo::new::<T>(id);
                info!(
                    "registered type {} as {} ({} signature(s))",
                    info.name,
                    id.0,
                    info.signatures.len()
                );

                let mut types = self.types.write().unwrap_or_else(PoisonError::into_inner);
                if id.index() >= types.len() {
                    types.resize(id.index() + 1, None);
                }
                types[id.index()] = Some(info);

                entry.insert(id);
                Ok(id)
            }
        }
    }

    /// The id of `T`, if registered.
    #[inline]
    pub fn get<T: Attributed>(&self) -> Option<TypeId> {
        self.id_of(StdTypeId::of::<T>())
    }

    #[inline]
    pub fn id_of(&self, type_id: StdTypeId) -> Option<TypeId> {
        self.type_map.get(&type_id).map(|entry| *entry.value())
    }

    pub fn is_registered<T: Attributed>(&self) -> bool {
        self.get::<T>().is_some()
    }

    pub fn info(&self, id: TypeId) -> Option<TypeInfo> {
        let types = self.types.read().unwrap_or_else(PoisonError::into_inner);
        types.get(id.index()).and_then(Clone::clone)
    }

    pub fn signatures(&self, id: TypeId) -> Result<Arc<[Signature]>> {
        self.info(id)
            .map(|info| info.signatures)
            .ok_or_else(|| Error::UnregisteredType(format!("type id {}", id.0)))
    }

    pub fn signatures_of<T: Attributed>(&self) -> Result<Arc<[Signature]>> {
        self.signatures_by_type(StdTypeId::of::<T>(), T::CLASS_NAME)
    }

    /// Signatures of the type with the given Rust type id; `name` is only used in the error.
    pub(crate) fn signatures_by_type(
        &self,
        type_id: StdTypeId,
        name: &str,
    ) -> Result<Arc<[Signature]>> {
        let id = self
            .id_of(type_id)
            .ok_or_else(|| Error::UnregisteredType(name.to_string()))?;
        self.signatures(id)
    }

    /// Number of registered types.
    pub fn len(&self) -> usize {
        self.type_map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.type_map.is_empty()
    }
}

impl std::fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("types", &self.len())
            .finish()
    }
}

//! Keys identify bindable slots. A [TypeKey] consists of the identity of the bound type and an
//! optional [Tag], which allows binding the same type multiple times under different
//! annotations:
//!
//! ```
//! use orchard_di::key::Key;
//!
//! struct Primary;
//! struct Secondary;
//!
//! let primary = Key::<i32>::tagged::<Primary>();
//! let secondary = Key::<i32>::tagged::<Secondary>();
//!
//! assert_ne!(primary.type_key(), secondary.type_key());
//! assert_ne!(primary.type_key(), Key::<i32>::new().type_key());
//! ```
//!
//! Tags are plain marker types and are never instantiated.

use std::any::{type_name, TypeId};
use std::cmp::Ordering;
use std::fmt::{Debug, Display, Formatter};
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

/// Annotation distinguishing multiple bindings of the same type.
#[derive(Clone, Copy, Debug)]
pub struct Tag {
    id: TypeId,
    name: &'static str,
}

impl Tag {
    /// Creates a tag identified by the marker type `A`.
    pub fn of<A: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<A>(),
            name: type_name::<A>(),
        }
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for Tag {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Tag {}

impl Hash for Tag {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl PartialOrd for Tag {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Tag {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name
            .cmp(other.name)
            .then_with(|| self.id.cmp(&other.id))
    }
}

/// Type-erased identity of a bindable slot. Two keys are equal only if both the type and the
/// tag are equal - there is no implicit conversion between tagged and untagged keys.
#[derive(Clone, Copy, Debug)]
pub struct TypeKey {
    type_id: TypeId,
    type_name: &'static str,
    tag: Option<Tag>,
}

impl TypeKey {
    /// Creates an untagged key for `T`.
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: type_name::<T>(),
            tag: None,
        }
    }

    /// Creates a key for `T` tagged with the marker type `A`.
    pub fn tagged<T: ?Sized + 'static, A: ?Sized + 'static>() -> Self {
        Self {
            tag: Some(Tag::of::<A>()),
            ..Self::of::<T>()
        }
    }

    #[inline]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    #[inline]
    pub fn tag(&self) -> Option<Tag> {
        self.tag
    }
}

impl PartialEq for TypeKey {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id && self.tag == other.tag
    }
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
        self.tag.hash(state);
    }
}

impl PartialOrd for TypeKey {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// ordered by names first, so that reported errors are readable and stable
impl Ord for TypeKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.type_name
            .cmp(other.type_name)
            .then_with(|| self.tag.cmp(&other.tag))
            .then_with(|| self.type_id.cmp(&other.type_id))
    }
}

impl Display for TypeKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.tag {
            Some(tag) => write!(f, "Annotated<{}, {}>", tag.name, self.type_name),
            None => f.write_str(self.type_name),
        }
    }
}

/// Strongly-typed wrapper for a [TypeKey], used to get typed instances without manual casts.
pub struct Key<T: ?Sized> {
    key: TypeKey,
    _marker: PhantomData<fn() -> Box<T>>,
}

impl<T: ?Sized + 'static> Key<T> {
    /// Creates an untagged key.
    pub fn new() -> Self {
        Self {
            key: TypeKey::of::<T>(),
            _marker: PhantomData,
        }
    }

    /// Creates a key tagged with the marker type `A`.
    pub fn tagged<A: ?Sized + 'static>() -> Self {
        Self {
            key: TypeKey::tagged::<T, A>(),
            _marker: PhantomData,
        }
    }
}

impl<T: ?Sized> Key<T> {
    #[inline]
    pub fn type_key(&self) -> &TypeKey {
        &self.key
    }
}

impl<T: ?Sized + 'static> Default for Key<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized> Clone for Key<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: ?Sized> Copy for Key<T> {}

impl<T: ?Sized> PartialEq for Key<T> {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl<T: ?Sized> Eq for Key<T> {}

impl<T: ?Sized> Debug for Key<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Key").field(&self.key).finish()
    }
}

impl<T: ?Sized> From<Key<T>> for TypeKey {
    #[inline]
    fn from(value: Key<T>) -> Self {
        value.key
    }
}

impl<T: ?Sized> From<&Key<T>> for TypeKey {
    #[inline]
    fn from(value: &Key<T>) -> Self {
        value.key
    }
}

//! # Identifier Keys
//!
//! Every scheduled item is addressed by a [`TimerKey`]: the owning
//! component plus a [`TimerId`] drawn from one of three disjoint
//! namespaces.
//!
//! | Namespace  | Value                  | Assigned by                     |
//! |------------|------------------------|---------------------------------|
//! | `Internal` | `u16`                  | framework base classes          |
//! | `Numeric`  | `u32`                  | the component                   |
//! | `Named`    | text                   | the component                   |
//!
//! The namespace tag is part of equality and ordering, so
//! `Internal(7)` and `Numeric(7)` on the same owner are different keys.
//! Ordering is owner first, which lets the scheduler walk every key of one
//! owner as a contiguous range of its index.

use alloc::borrow::Cow;
use alloc::string::String;
use core::fmt;

/// Opaque identity of a component that owns scheduled items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OwnerId(u32);

impl OwnerId {
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "owner#{}", self.raw())
    }
}

/// The three identifier namespaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Namespace {
    Internal,
    Numeric,
    Named,
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Namespace::Internal => "internal",
            Namespace::Numeric => "numeric",
            Namespace::Named => "named",
        })
    }
}

/// An identifier within one owner. The variant is the namespace.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TimerId {
    Internal(u16),
    Numeric(u32),
    Named(Cow<'static, str>),
}

impl TimerId {
    /// Framework-assigned identifier. Never collides with component ids.
    pub const fn internal(id: u16) -> Self {
        TimerId::Internal(id)
    }

    pub const fn numeric(id: u32) -> Self {
        TimerId::Numeric(id)
    }

    pub fn named(name: impl Into<Cow<'static, str>>) -> Self {
        TimerId::Named(name.into())
    }

    pub fn namespace(&self) -> Namespace {
        match self {
            TimerId::Internal(_) => Namespace::Internal,
            TimerId::Numeric(_) => Namespace::Numeric,
            TimerId::Named(_) => Namespace::Named,
        }
    }

    /// The smallest id in the ordering. Used as the lower bound of an
    /// owner's range in the index.
    pub(crate) const MIN: TimerId = TimerId::Internal(0);
}

impl From<u32> for TimerId {
    fn from(id: u32) -> Self {
        TimerId::Numeric(id)
    }
}

impl From<&'static str> for TimerId {
    fn from(name: &'static str) -> Self {
        TimerId::Named(Cow::Borrowed(name))
    }
}

impl From<String> for TimerId {
    fn from(name: String) -> Self {
        TimerId::Named(Cow::Owned(name))
    }
}

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimerId::Internal(id) => write!(f, "internal:{}", id),
            TimerId::Numeric(id) => write!(f, "numeric:{}", id),
            TimerId::Named(name) => write!(f, "named:{:?}", name),
        }
    }
}

/// Composite uniqueness key of a scheduled item.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerKey {
    pub owner: OwnerId,
    pub id: TimerId,
}

impl TimerKey {
    pub fn new(owner: OwnerId, id: impl Into<TimerId>) -> Self {
        Self {
            owner,
            id: id.into(),
        }
    }

    #[inline]
    pub fn namespace(&self) -> Namespace {
        self.id.namespace()
    }

    /// First key of `owner` in key order.
    pub(crate) const fn owner_start(owner: OwnerId) -> Self {
        Self {
            owner,
            id: TimerId::MIN,
        }
    }
}

impl fmt::Display for TimerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn test_namespaces_never_collide() {
        let owner = OwnerId::new(1);
        let internal = TimerKey::new(owner, TimerId::internal(7));
        let numeric = TimerKey::new(owner, 7u32);
        let named = TimerKey::new(owner, "7");

        assert_ne!(internal, numeric);
        assert_ne!(numeric, named);
        assert_ne!(internal, named);
        assert_eq!(internal.namespace(), Namespace::Internal);
        assert_eq!(numeric.namespace(), Namespace::Numeric);
        assert_eq!(named.namespace(), Namespace::Named);
    }

    #[test]
    fn test_owner_is_part_of_identity() {
        let a = TimerKey::new(OwnerId::new(1), 3u32);
        let b = TimerKey::new(OwnerId::new(2), 3u32);
        assert_ne!(a, b);
    }

    #[test]
    fn test_borrowed_and_owned_names_are_equal() {
        let owner = OwnerId::new(4);
        let borrowed = TimerKey::new(owner, "update");
        let owned = TimerKey::new(owner, String::from("update"));
        assert_eq!(borrowed, owned);
    }

    #[test]
    fn test_owner_start_is_lowest_key() {
        let owner = OwnerId::new(9);
        let start = TimerKey::owner_start(owner);
        assert!(start <= TimerKey::new(owner, TimerId::internal(0)));
        assert!(start < TimerKey::new(owner, 0u32));
        assert!(start < TimerKey::new(owner, ""));
        assert!(TimerKey::new(OwnerId::new(8), "zzz") < start);
    }

    #[test]
    fn test_display() {
        let key = TimerKey::new(OwnerId::new(3), "blink");
        assert_eq!(key.to_string(), "owner#3/named:\"blink\"");
        let key = TimerKey::new(OwnerId::new(3), TimerId::internal(2));
        assert_eq!(key.to_string(), "owner#3/internal:2");
    }
}

//! Weight handles and the policies that decide whether mirrored edge records
//! share one weight value.

use std::{cell::RefCell, fmt::Debug, ops::Deref, rc::Rc};

/// Storage for one edge weight as seen from a single edge record.
pub trait WeightHandle<W>: Sized {
    type Ref<'a>: Deref<Target = W>
    where
        Self: 'a;

    fn new(weight: W) -> Self;

    /// Borrows the weight value.
    fn get(&self) -> Self::Ref<'_>;

    /// Replaces the weight value, returning the old one.
    fn set(&mut self, weight: W) -> W;

    fn mutate<R>(&mut self, f: impl FnOnce(&mut W) -> R) -> R;

    /// Creates the handle stored in the mirror of the record holding `self`.
    fn mirror(&self) -> Self
    where
        W: Clone;

    /// Creates a handle to a fresh copy of the weight, never aliased with `self`.
    fn duplicate(&self) -> Self
    where
        W: Clone;

    /// Returns `true` if both handles refer to the same storage.
    fn aliases(&self, other: &Self) -> bool;

    /// Returns `true` if `other` may be the handle held by the mirror of the
    /// record holding `self`.
    fn matches(&self, other: &Self) -> bool
    where
        W: PartialEq;

    /// Identifies the shared allocation behind the handle, if there is one.
    fn share_key(&self) -> Option<usize>;
}

/// Policy selecting how mirrored edge records hold their weights.
pub trait WeightSharing: 'static {
    type Handle<W>: WeightHandle<W>;

    fn is_shared() -> bool;
}

/// Marker type: every edge record owns its own copy of the weight.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Independent;

/// Marker type: mirrored edge records share a single weight value.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Shared;

impl WeightSharing for Independent {
    type Handle<W> = OwnedWeight<W>;

    fn is_shared() -> bool {
        false
    }
}

impl WeightSharing for Shared {
    type Handle<W> = SharedWeight<W>;

    fn is_shared() -> bool {
        true
    }
}

#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct OwnedWeight<W>(W);

impl<W> WeightHandle<W> for OwnedWeight<W> {
    type Ref<'a>
        = &'a W
    where
        Self: 'a;

    fn new(weight: W) -> Self {
        OwnedWeight(weight)
    }

    fn get(&self) -> &W {
        &self.0
    }

    fn set(&mut self, weight: W) -> W {
        std::mem::replace(&mut self.0, weight)
    }

    fn mutate<R>(&mut self, f: impl FnOnce(&mut W) -> R) -> R {
        f(&mut self.0)
    }

    fn mirror(&self) -> Self
    where
        W: Clone,
    {
        OwnedWeight(self.0.clone())
    }

    fn duplicate(&self) -> Self
    where
        W: Clone,
    {
        OwnedWeight(self.0.clone())
    }

    fn aliases(&self, _other: &Self) -> bool {
        false
    }

    fn matches(&self, other: &Self) -> bool
    where
        W: PartialEq,
    {
        self.0 == other.0
    }

    fn share_key(&self) -> Option<usize> {
        None
    }
}

/// A weight jointly owned by the two records of a mirrored pair.  The value
/// is dropped when the second record of the pair goes away.
pub struct SharedWeight<W>(Rc<RefCell<W>>);

impl<W> WeightHandle<W> for SharedWeight<W> {
    type Ref<'a>
        = std::cell::Ref<'a, W>
    where
        Self: 'a;

    fn new(weight: W) -> Self {
        SharedWeight(Rc::new(RefCell::new(weight)))
    }

    fn get(&self) -> std::cell::Ref<'_, W> {
        self.0.borrow()
    }

    fn set(&mut self, weight: W) -> W {
        self.0.replace(weight)
    }

    fn mutate<R>(&mut self, f: impl FnOnce(&mut W) -> R) -> R {
        f(&mut self.0.borrow_mut())
    }

    fn mirror(&self) -> Self
    where
        W: Clone,
    {
        SharedWeight(Rc::clone(&self.0))
    }

    fn duplicate(&self) -> Self
    where
        W: Clone,
    {
        SharedWeight::new(self.0.borrow().clone())
    }

    fn aliases(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    fn matches(&self, other: &Self) -> bool
    where
        W: PartialEq,
    {
        self.aliases(other)
    }

    fn share_key(&self) -> Option<usize> {
        Some(Rc::as_ptr(&self.0) as *const () as usize)
    }
}

impl<W> SharedWeight<W> {
    /// Number of records currently holding this weight.
    pub fn holders(&self) -> usize {
        Rc::strong_count(&self.0)
    }
}

impl<W: PartialEq> PartialEq for SharedWeight<W> {
    fn eq(&self, other: &Self) -> bool {
        self.aliases(other) || *self.0.borrow() == *other.0.borrow()
    }
}

impl<W: Eq> Eq for SharedWeight<W> {}

impl<W: Debug> Debug for SharedWeight<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("SharedWeight").field(&*self.0.borrow()).finish()
    }
}

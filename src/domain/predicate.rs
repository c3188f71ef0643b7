//! Caller-supplied entity predicates.

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

type Test<T> = Arc<dyn Fn(&T) -> bool + Send + Sync>;

/// Boolean test over one entity, with a label for logs.
///
/// Cloning is cheap; clones share the same closure.
pub struct Predicate<T> {
    label: Cow<'static, str>,
    test: Test<T>,
}

impl<T: 'static> Predicate<T> {
    /// Unlabeled predicate.
    pub fn new<F>(test: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        Self::labeled("<closure>", test)
    }

    pub fn labeled<F>(label: impl Into<Cow<'static, str>>, test: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        Self {
            label: label.into(),
            test: Arc::new(test),
        }
    }

    /// Matches every entity.
    pub fn any() -> Self {
        Self::labeled("any", |_| true)
    }

    pub fn matches(&self, entity: &T) -> bool {
        (self.test)(entity)
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn and(self, other: Predicate<T>) -> Self {
        let label = format!("({} && {})", self.label, other.label);
        Self::labeled(label, move |e| self.matches(e) && other.matches(e))
    }

    pub fn or(self, other: Predicate<T>) -> Self {
        let label = format!("({} || {})", self.label, other.label);
        Self::labeled(label, move |e| self.matches(e) || other.matches(e))
    }

    pub fn negate(self) -> Self {
        let label = format!("!{}", self.label);
        Self::labeled(label, move |e| !self.matches(e))
    }
}

impl<T> Clone for Predicate<T> {
    fn clone(&self) -> Self {
        Self {
            label: self.label.clone(),
            test: Arc::clone(&self.test),
        }
    }
}

impl<T> fmt::Debug for Predicate<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Predicate").field(&self.label).finish()
    }
}

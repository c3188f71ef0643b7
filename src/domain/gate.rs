//! Absent-input gate for mutating operations.
//!
//! Mutations run only on [`Gate::Present`]; [`Gate::Absent`] is a no-op that
//! never reaches the unit of work.

/// Input of a mutating operation after the absent check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Gate<T> {
    Absent,
    Present(T),
}

impl<T> Gate<T> {
    pub fn check(input: Option<T>) -> Self {
        match input {
            Some(value) => Gate::Present(value),
            None => Gate::Absent,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Gate::Absent)
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            Gate::Present(value) => Some(value),
            Gate::Absent => None,
        }
    }
}

impl<T> From<Option<T>> for Gate<T> {
    fn from(input: Option<T>) -> Self {
        Gate::check(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_none_is_absent() {
        let gate: Gate<i32> = Gate::check(None);
        assert!(gate.is_absent());
        assert_eq!(gate.into_option(), None);
    }

    #[test]
    fn test_some_is_present() {
        let gate = Gate::from(Some("value"));
        assert_eq!(gate, Gate::Present("value"));
        assert_eq!(gate.into_option(), Some("value"));
    }
}

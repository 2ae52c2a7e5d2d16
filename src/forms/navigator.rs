use super::validation::ErrorMap;

/// Tracks the 1-based current step of a wizard with `total` steps.
///
/// Forward movement is gated on an empty error map; backward movement never
/// re-validates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepNavigator {
    current: usize,
    total: usize,
}

impl StepNavigator {
    pub fn new(total: usize) -> Self {
        Self {
            current: 1,
            total: total.max(1),
        }
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn is_first(&self) -> bool {
        self.current == 1
    }

    pub fn is_final(&self) -> bool {
        self.current == self.total
    }

    /// Advances when `errors` is empty. Returns whether the step changed.
    pub fn next(&mut self, errors: &ErrorMap) -> bool {
        if !errors.is_empty() || self.is_final() {
            return false;
        }
        self.current += 1;
        true
    }

    pub fn prev(&mut self) -> bool {
        if self.is_first() {
            return false;
        }
        self.current -= 1;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_is_blocked_by_errors_and_clamped() {
        let mut nav = StepNavigator::new(3);
        let mut errors = ErrorMap::new();
        errors.insert("name".into(), "Name is required".into());
        assert!(!nav.next(&errors));
        assert_eq!(nav.current(), 1);

        errors.clear();
        assert!(nav.next(&errors));
        assert!(nav.next(&errors));
        assert!(!nav.next(&errors));
        assert_eq!(nav.current(), 3);
        assert!(nav.is_final());
    }

    #[test]
    fn prev_is_clamped_at_first_step() {
        let mut nav = StepNavigator::new(2);
        assert!(!nav.prev());
        nav.next(&ErrorMap::new());
        assert!(nav.prev());
        assert_eq!(nav.current(), 1);
    }
}

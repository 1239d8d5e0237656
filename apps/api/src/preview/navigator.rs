use serde::{Deserialize, Serialize};

/// Navigation request from the preview controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum NavAction {
    First,
    Prev,
    Next,
    Last,
    /// Zero-based page index; clamped into range.
    Goto { page: usize },
}

/// Current-page state for one-page-at-a-time preview.
///
/// The index always lies in `[0, page_count - 1]`, or is 0 when there are no pages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageNavigator {
    current: usize,
    page_count: usize,
}

impl PageNavigator {
    #[cfg(test)]
    pub fn new(page_count: usize) -> Self {
        Self {
            current: 0,
            page_count,
        }
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn page_count(&self) -> usize {
        self.page_count
    }

    fn last_index(&self) -> usize {
        self.page_count.saturating_sub(1)
    }

    pub fn first(&mut self) {
        self.current = 0;
    }

    pub fn prev(&mut self) {
        self.current = self.current.saturating_sub(1);
    }

    pub fn next(&mut self) {
        self.current = (self.current + 1).min(self.last_index());
    }

    pub fn last(&mut self) {
        self.current = self.last_index();
    }

    pub fn go_to(&mut self, index: usize) {
        self.current = index.min(self.last_index());
    }

    pub fn apply(&mut self, action: NavAction) {
        match action {
            NavAction::First => self.first(),
            NavAction::Prev => self.prev(),
            NavAction::Next => self.next(),
            NavAction::Last => self.last(),
            NavAction::Goto { page } => self.go_to(page),
        }
    }

    /// Adopts a new page count after repagination. The index resets to the first page
    /// when it no longer points at an existing page.
    pub fn on_repaginate(&mut self, page_count: usize) {
        self.page_count = page_count;
        if self.current >= page_count {
            self.current = 0;
        }
    }

    pub fn can_go_back(&self) -> bool {
        self.current > 0
    }

    pub fn can_go_forward(&self) -> bool {
        self.current < self.last_index()
    }

    /// "Page 2 of 3"; empty for an empty pagination.
    pub fn label(&self) -> String {
        if self.page_count == 0 {
            return String::new();
        }
        format!("Page {} of {}", self.current + 1, self.page_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_and_prev_clamp() {
        let mut nav = PageNavigator::new(3);
        nav.prev();
        assert_eq!(nav.current(), 0);
        nav.next();
        nav.next();
        nav.next();
        assert_eq!(nav.current(), 2);
        assert!(!nav.can_go_forward());
        assert!(nav.can_go_back());
    }

    #[test]
    fn test_first_last_and_goto() {
        let mut nav = PageNavigator::new(5);
        nav.last();
        assert_eq!(nav.current(), 4);
        nav.first();
        assert_eq!(nav.current(), 0);
        nav.apply(NavAction::Goto { page: 42 });
        assert_eq!(nav.current(), 4);
        assert_eq!(nav.label(), "Page 5 of 5");
    }

    #[test]
    fn test_empty_pagination_stays_at_zero() {
        let mut nav = PageNavigator::new(0);
        nav.next();
        nav.last();
        assert_eq!(nav.current(), 0);
        assert!(!nav.can_go_forward());
        assert_eq!(nav.label(), "");
    }

    #[test]
    fn test_repaginate_resets_out_of_range_index() {
        let mut nav = PageNavigator::new(4);
        nav.last();
        nav.on_repaginate(2);
        assert_eq!(nav.current(), 0);

        nav.next();
        nav.on_repaginate(3);
        assert_eq!(nav.current(), 1, "in-range index is kept");
    }

    #[test]
    fn test_action_deserializes() {
        let action: NavAction = serde_json::from_str(r#"{"action":"goto","page":2}"#).unwrap();
        assert_eq!(action, NavAction::Goto { page: 2 });
        let action: NavAction = serde_json::from_str(r#"{"action":"next"}"#).unwrap();
        assert_eq!(action, NavAction::Next);
    }
}

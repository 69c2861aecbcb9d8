//! Pager engine.
//!
//! Holds the page cursor and page size, the totals reported by the count
//! subscription, and the derived page window and page-size choices. All
//! arithmetic is total: a zero page size yields zero pages instead of a
//! division by zero.

use alloc::vec::Vec;

/// Page sizes offered when none are configured.
pub const DEFAULT_PAGE_SIZES: [usize; 5] = [10, 20, 30, 40, 50];

/// Static pager configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PagerConfig {
    /// Candidate page sizes
    pub options: Vec<usize>,
    /// Initial page size
    pub items_per_page: usize,
    /// Initial page (1-based)
    pub current_page: usize,
    /// Width of the visible page-number window
    pub show_pages: usize,
}

impl Default for PagerConfig {
    fn default() -> Self {
        Self {
            options: DEFAULT_PAGE_SIZES.to_vec(),
            items_per_page: 10,
            current_page: 1,
            show_pages: 10,
        }
    }
}

/// One entry of the visible page window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageLink {
    pub page: usize,
    pub active: bool,
}

/// One page-size choice.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageSizeOption {
    pub value: usize,
    pub selected: bool,
}

/// A copy of the pager state including all derived fields.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PagerState {
    pub current_page: usize,
    pub items_per_page: usize,
    pub total_items: usize,
    pub total_pages: usize,
    pub show_pages: usize,
    pub default_options: Vec<usize>,
    pub pages: Vec<PageLink>,
    pub options: Vec<PageSizeOption>,
    pub offset_start: usize,
    pub offset_end: usize,
}

/// Page cursor with derived window and page-size choices.
#[derive(Clone, Debug)]
pub struct Pager {
    current_page: usize,
    items_per_page: usize,
    total_items: usize,
    total_pages: usize,
    show_pages: usize,
    default_options: Vec<usize>,
    pages: Vec<PageLink>,
    options: Vec<PageSizeOption>,
}

impl Default for Pager {
    fn default() -> Self {
        Self::new(PagerConfig::default())
    }
}

impl Pager {
    /// Creates a pager with no items and derived fields computed.
    pub fn new(config: PagerConfig) -> Self {
        let mut pager = Self {
            current_page: config.current_page.max(1),
            items_per_page: config.items_per_page,
            total_items: 0,
            total_pages: 0,
            show_pages: config.show_pages,
            default_options: config.options,
            pages: Vec::new(),
            options: Vec::new(),
        };
        pager.recompute();
        pager
    }

    #[inline]
    pub fn current_page(&self) -> usize {
        self.current_page
    }

    #[inline]
    pub fn items_per_page(&self) -> usize {
        self.items_per_page
    }

    #[inline]
    pub fn total_items(&self) -> usize {
        self.total_items
    }

    #[inline]
    pub fn total_pages(&self) -> usize {
        self.total_pages
    }

    /// The visible page window.
    pub fn pages(&self) -> &[PageLink] {
        &self.pages
    }

    /// The page-size choices.
    pub fn options(&self) -> &[PageSizeOption] {
        &self.options
    }

    /// Index of the first item on the current page.
    pub fn offset_start(&self) -> usize {
        self.current_page
            .saturating_sub(1)
            .saturating_mul(self.items_per_page)
    }

    /// Index one past the last item on the current page, capped at the
    /// total item count.
    pub fn offset_end(&self) -> usize {
        self.offset_start()
            .saturating_add(self.items_per_page)
            .min(self.total_items)
    }

    /// Number of documents to skip for the current page.
    #[inline]
    pub fn skip(&self) -> usize {
        self.offset_start()
    }

    /// Number of documents on one page.
    #[inline]
    pub fn limit(&self) -> usize {
        self.items_per_page
    }

    /// Sets the page size without recomputing.
    pub fn set_items_per_page(&mut self, items_per_page: usize) {
        self.items_per_page = items_per_page;
    }

    /// Sets the current page without recomputing or clamping.
    pub fn set_current_page(&mut self, page: usize) {
        self.current_page = page.max(1);
    }

    /// Recomputes total pages, the page window and the page-size choices.
    pub fn recompute(&mut self) {
        self.total_pages = if self.items_per_page == 0 {
            0
        } else {
            self.total_items.div_ceil(self.items_per_page)
        };
        self.pages = self.compute_pages();
        self.options = self.compute_options();
    }

    /// Records a new item count from the store and recomputes.
    pub fn set_totals(&mut self, total_items: usize) {
        self.total_items = total_items;
        self.recompute();
    }

    fn compute_pages(&self) -> Vec<PageLink> {
        let half = self.show_pages / 2;
        let mut start = self.current_page.saturating_sub(1).saturating_sub(half);
        let mut end = start.saturating_add(self.show_pages);
        if end > self.total_pages {
            end = self.total_pages;
            start = end.saturating_sub(self.show_pages);
        }
        (start..end)
            .map(|i| PageLink {
                page: i + 1,
                active: self.current_page == i + 1,
            })
            .collect()
    }

    // Listed in reverse configuration order; a single synthetic entry of
    // `total_items` when no configured size fits.
    fn compute_options(&self) -> Vec<PageSizeOption> {
        let options: Vec<PageSizeOption> = self
            .default_options
            .iter()
            .rev()
            .filter(|&&value| value <= self.total_items)
            .map(|&value| PageSizeOption {
                value,
                selected: value == self.items_per_page,
            })
            .collect();
        if options.is_empty() {
            return alloc::vec![PageSizeOption {
                value: self.total_items,
                selected: self.total_items == self.items_per_page,
            }];
        }
        options
    }

    pub fn has_previous(&self) -> bool {
        self.current_page > 1
    }

    pub fn has_next(&self) -> bool {
        self.current_page < self.total_pages
    }

    /// Moves to `page`, clamped to `[1, total_pages]` when there are pages.
    /// Returns true if the current page changed.
    pub fn move_to(&mut self, page: usize) -> bool {
        let mut page = page.max(1);
        if self.total_pages > 0 {
            page = page.min(self.total_pages);
        }
        if page == self.current_page {
            return false;
        }
        self.current_page = page;
        self.recompute();
        true
    }

    pub fn move_previous(&mut self) -> bool {
        if !self.has_previous() {
            return false;
        }
        self.current_page -= 1;
        self.recompute();
        true
    }

    pub fn move_next(&mut self) -> bool {
        if !self.has_next() {
            return false;
        }
        self.current_page += 1;
        self.recompute();
        true
    }

    pub fn move_first(&mut self) -> bool {
        if !self.has_previous() {
            return false;
        }
        self.current_page = 1;
        self.recompute();
        true
    }

    pub fn move_last(&mut self) -> bool {
        if !self.has_next() {
            return false;
        }
        self.current_page = self.total_pages;
        self.recompute();
        true
    }

    /// Returns a copy of the full state.
    pub fn snapshot(&self) -> PagerState {
        PagerState {
            current_page: self.current_page,
            items_per_page: self.items_per_page,
            total_items: self.total_items,
            total_pages: self.total_pages,
            show_pages: self.show_pages,
            default_options: self.default_options.clone(),
            pages: self.pages.clone(),
            options: self.options.clone(),
            offset_start: self.offset_start(),
            offset_end: self.offset_end(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn page_numbers(pager: &Pager) -> Vec<usize> {
        pager.pages().iter().map(|p| p.page).collect()
    }

    fn pager_with(total: usize, per_page: usize, show: usize) -> Pager {
        let mut pager = Pager::new(PagerConfig {
            items_per_page: per_page,
            show_pages: show,
            ..PagerConfig::default()
        });
        pager.set_totals(total);
        pager
    }

    #[test]
    fn test_empty_pager() {
        let pager = Pager::default();
        assert_eq!(pager.total_pages(), 0);
        assert!(pager.pages().is_empty());
        assert_eq!(pager.offset_start(), 0);
        assert_eq!(pager.offset_end(), 0);
    }

    #[test]
    fn test_totals() {
        let pager = pager_with(95, 10, 10);
        assert_eq!(pager.total_pages(), 10);
        assert_eq!(page_numbers(&pager), (1..=10).collect::<Vec<_>>());
        assert!(pager.pages()[0].active);
    }

    #[test]
    fn test_zero_page_size() {
        let pager = pager_with(95, 0, 10);
        assert_eq!(pager.total_pages(), 0);
        assert!(pager.pages().is_empty());
    }

    #[test]
    fn test_window_centers_on_current_page() {
        let mut pager = pager_with(200, 10, 5);
        pager.move_to(10);
        assert_eq!(page_numbers(&pager), vec![8, 9, 10, 11, 12]);
    }

    #[test]
    fn test_window_shrinks_from_end() {
        let mut pager = pager_with(200, 10, 5);
        pager.move_to(20);
        assert_eq!(page_numbers(&pager), vec![16, 17, 18, 19, 20]);

        let small = pager_with(25, 10, 5);
        assert_eq!(page_numbers(&small), vec![1, 2, 3]);
    }

    #[test]
    fn test_offsets() {
        let mut pager = pager_with(95, 10, 10);
        pager.move_last();
        assert_eq!(pager.current_page(), 10);
        assert_eq!(pager.offset_start(), 90);
        assert_eq!(pager.offset_end(), 95);
        assert_eq!(pager.skip(), 90);
        assert_eq!(pager.limit(), 10);
    }

    #[test]
    fn test_navigation_boundaries() {
        let mut pager = pager_with(30, 10, 10);
        assert!(!pager.move_previous());
        assert!(!pager.move_first());
        assert!(pager.move_next());
        assert!(pager.move_next());
        assert_eq!(pager.current_page(), 3);
        assert!(!pager.move_next());
        assert!(!pager.move_last());
        assert!(pager.move_first());
        assert_eq!(pager.current_page(), 1);
    }

    #[test]
    fn test_move_to_clamps() {
        let mut pager = pager_with(30, 10, 10);
        assert!(pager.move_to(99));
        assert_eq!(pager.current_page(), 3);
        assert!(pager.move_to(0));
        assert_eq!(pager.current_page(), 1);
        assert!(!pager.move_to(1));
    }

    #[test]
    fn test_move_to_without_totals() {
        let mut pager = Pager::default();
        assert!(pager.move_to(4));
        assert_eq!(pager.current_page(), 4);
    }

    #[test]
    fn test_options_filtered_by_total() {
        let pager = pager_with(35, 20, 10);
        assert_eq!(
            pager.options(),
            &[
                PageSizeOption { value: 30, selected: false },
                PageSizeOption { value: 20, selected: true },
                PageSizeOption { value: 10, selected: false },
            ]
        );
    }

    #[test]
    fn test_options_synthetic_entry() {
        let pager = pager_with(7, 10, 10);
        assert_eq!(
            pager.options(),
            &[PageSizeOption { value: 7, selected: false }]
        );
    }

    #[test]
    fn test_snapshot() {
        let mut pager = pager_with(95, 10, 10);
        pager.move_to(2);
        let state = pager.snapshot();
        assert_eq!(state.current_page, 2);
        assert_eq!(state.offset_start, 10);
        assert_eq!(state.offset_end, 20);
        assert_eq!(state.total_items, 95);
        assert_eq!(state.default_options, DEFAULT_PAGE_SIZES.to_vec());
    }

    #[test]
    fn test_huge_page_numbers_saturate() {
        let mut pager = Pager::default();
        pager.move_to(usize::MAX);
        assert_eq!(pager.skip(), usize::MAX);
        assert_eq!(pager.offset_end(), 0);

        let mut pager = pager_with(95, 10, usize::MAX);
        pager.set_current_page(usize::MAX / 2);
        pager.recompute();
        assert_eq!(pager.offset_end(), 95);
        assert_eq!(page_numbers(&pager), (1..=10).collect::<Vec<_>>());
    }
}

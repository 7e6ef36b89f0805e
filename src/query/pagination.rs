//! Page arithmetic for record lists.

/// Number of pages for `count` items; never less than one.
pub fn total_pages(count: usize, page_size: usize) -> usize {
    count.div_ceil(page_size.max(1)).max(1)
}

/// Clamp a 1-based page number into `[1, total_pages]`.
pub fn clamp_page(page: usize, count: usize, page_size: usize) -> usize {
    page.clamp(1, total_pages(count, page_size))
}

/// Half-open index range `[start, end)` of a page within the filtered list.
pub fn page_bounds(page: usize, count: usize, page_size: usize) -> (usize, usize) {
    let size = page_size.max(1);
    let page = clamp_page(page, count, size);
    let start = ((page - 1) * size).min(count);
    let end = (start + size).min(count);
    (start, end)
}

/// One entry of a windowed page selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageItem {
    Page(usize),
    Ellipsis,
}

/// Page numbers to show around `current`, with the first and last page
/// always present and gaps collapsed into an ellipsis.
///
/// `radius` is the number of neighbours shown on each side of `current`.
pub fn page_window(current: usize, total: usize, radius: usize) -> Vec<PageItem> {
    let total = total.max(1);
    let current = current.clamp(1, total);
    let low = current.saturating_sub(radius).max(1);
    let high = (current + radius).min(total);

    let mut items = Vec::new();
    if low > 1 {
        items.push(PageItem::Page(1));
        if low > 2 {
            items.push(PageItem::Ellipsis);
        }
    }
    items.extend((low..=high).map(PageItem::Page));
    if high < total {
        if high < total - 1 {
            items.push(PageItem::Ellipsis);
        }
        items.push(PageItem::Page(total));
    }
    items
}

//! Helpers for navigating and extracting data from parsed HTML trees.
//!
//! CSS selectors cover most lookups. The pages this crate reads also need
//! structural walks (nearest enclosing table, preceding header, direct cells
//! only), which these helpers provide on top of [`scraper::ElementRef`].

use scraper::ElementRef;

/// Non-breaking space. The source pads empty cells and marks non-league
/// participants with it.
pub const NBSP: char = '\u{a0}';

/// Declare a lazily parsed static CSS selector.
macro_rules! selector {
    ($name:ident, $css:expr) => {
        #[allow(clippy::expect_used)] // Static selector that is guaranteed to be valid
        static $name: std::sync::LazyLock<scraper::Selector> = std::sync::LazyLock::new(|| {
            scraper::Selector::parse($css).expect("valid selector")
        });
    };
}
pub(crate) use selector;

/// Local tag name of an element.
///
/// # Examples
/// ```
/// use scraper::{Html, Selector};
/// use nhlstats_collector::html::tag_name;
///
/// let html = Html::parse_fragment("<table><tr><td>1</td></tr></table>");
/// let td = html.select(&Selector::parse("td").unwrap()).next().unwrap();
/// assert_eq!(tag_name(td), "td");
/// ```
#[must_use]
pub fn tag_name<'a>(element: ElementRef<'a>) -> &'a str {
    element.value().name()
}

/// Direct child elements.
pub fn child_elements<'a>(element: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> {
    element.children().filter_map(ElementRef::wrap)
}

/// Direct child elements with the given tag name.
pub fn find_children<'a>(
    element: ElementRef<'a>,
    tag: &'a str,
) -> impl Iterator<Item = ElementRef<'a>> {
    child_elements(element).filter(move |child| tag_name(*child) == tag)
}

/// First direct child element with the given tag name.
#[must_use]
pub fn find_child<'a>(element: ElementRef<'a>, tag: &str) -> Option<ElementRef<'a>> {
    child_elements(element).find(|child| tag_name(*child) == tag)
}

/// Rows of a table, in order, whether or not the parser wrapped them in
/// row groups. Rows of nested tables are not included.
pub fn table_rows<'a>(table: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> {
    child_elements(table).flat_map(|child| match tag_name(child) {
        "tr" => vec![child],
        "thead" | "tbody" | "tfoot" => find_children(child, "tr").collect(),
        _ => Vec::new(),
    })
}

/// Direct cells of a row.
pub fn row_cells<'a>(row: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> {
    child_elements(row).filter(|cell| matches!(tag_name(*cell), "td" | "th"))
}

/// Text that precedes the element's first child element, untrimmed.
///
/// Returns `None` when the element starts with a child element or is empty.
#[must_use]
pub fn leading_text(element: ElementRef<'_>) -> Option<String> {
    let first = element.children().next()?;
    first.value().as_text().map(|text| (&**text).to_owned())
}

/// All text below the element, concatenated, untrimmed.
#[must_use]
pub fn text_content(element: ElementRef<'_>) -> String {
    element.text().collect()
}

/// Whether the element's class list contains `class`.
#[must_use]
pub fn has_class(element: ElementRef<'_>, class: &str) -> bool {
    element.value().classes().any(|c| c == class)
}

/// Nearest ancestor element with the given tag name.
#[must_use]
pub fn ancestor<'a>(element: ElementRef<'a>, tag: &str) -> Option<ElementRef<'a>> {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|a| tag_name(*a) == tag)
}

/// Nearest preceding sibling element accepted by `predicate`.
pub fn preceding_sibling<'a>(
    element: ElementRef<'a>,
    mut predicate: impl FnMut(ElementRef<'a>) -> bool,
) -> Option<ElementRef<'a>> {
    element
        .prev_siblings()
        .filter_map(ElementRef::wrap)
        .find(|sibling| predicate(*sibling))
}

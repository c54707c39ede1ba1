use scraper::{ElementRef, Html, Selector};

use crate::browser::HtmlElement;
use crate::{Error, Result};

/// Parses a whole page and returns a snapshot of every element matching `css`.
pub(crate) fn select_document(html: &str, css: &str) -> Result<Vec<HtmlElement>> {
    let selector = create_selector(css)?;
    let doc = Html::parse_document(html);
    let found = doc.select(&selector).map(capture).collect();
    Ok(found)
}

/// Same as `select_document` but only looks below an element captured earlier.
pub(crate) fn select_fragment(parent: &HtmlElement, css: &str) -> Result<Vec<HtmlElement>> {
    let selector = create_selector(css)?;
    let fragment = Html::parse_fragment(parent.html());
    let found = fragment.select(&selector).map(capture).collect();
    Ok(found)
}

#[inline]
fn create_selector(sel_str: &str) -> Result<Selector> {
    Selector::parse(sel_str).map_err(|_| Error::InvalidSelector(sel_str.into()))
}

/// Snapshots what the browser boundary can ask for later, so the parsed tree
/// does not need to outlive the query.
fn capture(element: ElementRef) -> HtmlElement {
    let attrs = element
        .value()
        .attrs()
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .collect();
    HtmlElement::new(visible_text(element), attrs, element.html())
}

/// Concatenates the text nodes under `element`, skipping scripts and styles,
/// and collapses whitespace the way a rendered page shows it.
pub(crate) fn visible_text(element: ElementRef) -> String {
    let raw: String = element
        .descendants()
        .filter_map(|node| {
            let text = node.value().as_text()?;
            let hidden = node
                .parent()
                .and_then(|parent| parent.value().as_element())
                .is_some_and(|el| matches!(el.name(), "script" | "style" | "noscript"));
            (!hidden).then_some(&**text)
        })
        .collect();

    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html><body>
            <span id="productTitle">
                Fridge   <b>X</b>
            </span>
            <script>var rating = "Energy Rating: 9";</script>
            <table>
                <tr class="a-spacing-small po-brand"><td>Brand</td><td><span>BrandY</span></td></tr>
            </table>
        </body></html>
    "#;

    #[test]
    fn text_is_trimmed_and_collapsed() {
        let found = select_document(PAGE, r#"span[id="productTitle"]"#).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].text(), "Fridge X");
    }

    #[test]
    fn scripts_do_not_count_as_text() {
        let body = select_document(PAGE, "body").unwrap();
        assert!(!body[0].text().contains("Energy Rating"));
        assert!(body[0].text().contains("BrandY"));
    }

    #[test]
    fn second_cell_of_a_row() {
        let found = select_document(
            PAGE,
            r#"tr[class="a-spacing-small po-brand"] > td:nth-of-type(2) > span"#,
        )
        .unwrap();
        assert_eq!(found[0].text(), "BrandY");
    }

    #[test]
    fn fragment_search_stays_inside_the_parent() {
        let html = r#"<div id="list">
            <div class="r"><i data-hook="star" class="a-star-4"></i></div>
            <div class="r"><i data-hook="star" class="a-star-2"></i></div>
        </div>"#;
        let blocks = select_document(html, r#"div[id="list"] > div"#).unwrap();
        assert_eq!(blocks.len(), 2);

        let stars = select_fragment(&blocks[1], r#"i[data-hook="star"]"#).unwrap();
        assert_eq!(stars.len(), 1);
        assert_eq!(stars[0].attr("class"), Some("a-star-2"));
    }

    #[test]
    fn bad_selector_is_reported() {
        let err = select_document(PAGE, "td:[[").unwrap_err();
        assert!(matches!(err, Error::InvalidSelector(_)));
    }
}

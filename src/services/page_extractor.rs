use std::sync::LazyLock;

use regex::Regex;

use crate::models::content::PageFragment;

static PAGE_SECTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?s)<section class="page">.*?</section>"#).expect("valid regex"));

/// 按出现顺序提取所有页面片段（原样保留）
pub fn extract_pages(markup: &str) -> Vec<PageFragment> {
    PAGE_SECTION
        .find_iter(markup)
        .map(|m| PageFragment::new(m.as_str()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_pages_in_order() {
        let markup = r#"<div>
<section class="page"><h1>Eins</h1>
<p>a</p></section>
<aside>skip</aside>
<section class="page">Zwei</section><section class="page">Drei</section>
</div>"#;
        let pages = extract_pages(markup);
        assert_eq!(pages.len(), 3);
        assert_eq!(
            pages[0].as_str(),
            "<section class=\"page\"><h1>Eins</h1>\n<p>a</p></section>"
        );
        assert_eq!(pages[1].as_str(), "<section class=\"page\">Zwei</section>");
        assert_eq!(pages[2].as_str(), "<section class=\"page\">Drei</section>");
    }

    #[test]
    fn test_no_pages() {
        assert!(extract_pages("<section class=\"cover\">x</section>").is_empty());
        assert!(extract_pages("").is_empty());
    }
}

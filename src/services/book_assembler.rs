//! 书籍组装 - 业务能力层
//!
//! 把所有页面按顺序放进同一个 HTML 外壳。

use crate::config::BookSettings;
use crate::models::content::{BookDocument, PageFragment};

/// 组装整本书
pub fn assemble(pages: &[PageFragment], settings: &BookSettings, stylesheet_href: &str) -> BookDocument {
    let head = format!(
        "<!doctype html>\n\
         <html lang=\"{lang}\">\n\
         <head>\n  \
         <meta charset=\"utf-8\">\n  \
         <title>{title}</title>\n  \
         <link rel=\"stylesheet\" href=\"{href}\">\n\
         </head>\n\
         <body>",
        lang = settings.html_lang,
        title = settings.title,
        href = stylesheet_href,
    );
    let body = pages
        .iter()
        .map(PageFragment::as_str)
        .collect::<Vec<_>>()
        .join("\n");

    BookDocument {
        html: format!("{}\n{}\n</body>\n</html>\n", head, body),
        page_count: pages.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::page_extractor::extract_pages;

    #[test]
    fn test_shell_and_page_order() {
        let pages = extract_pages(
            r#"<section class="page">1</section><section class="page">2</section><section class="page">3</section>"#,
        );
        let book = assemble(&pages, &BookSettings::default(), "style.css");

        assert_eq!(book.page_count, 3);
        assert_eq!(
            book.html,
            "<!doctype html>\n<html lang=\"de\">\n<head>\n  <meta charset=\"utf-8\">\n  \
             <title>German Book</title>\n  <link rel=\"stylesheet\" href=\"style.css\">\n\
             </head>\n<body>\n\
             <section class=\"page\">1</section>\n\
             <section class=\"page\">2</section>\n\
             <section class=\"page\">3</section>\n</body>\n</html>\n"
        );
    }

    #[test]
    fn test_locale_settings() {
        let settings = BookSettings {
            html_lang: "fr".to_string(),
            title: "Cahier".to_string(),
            ..BookSettings::default()
        };
        let book = assemble(&[], &settings, "templates/style.css");
        assert!(book.html.contains("<html lang=\"fr\">"));
        assert!(book.html.contains("<title>Cahier</title>"));
        assert!(book.html.contains("href=\"templates/style.css\""));
        assert_eq!(book.page_count, 0);
    }
}

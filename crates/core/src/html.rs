use std::sync::LazyLock;

use scraper::{Html, Selector};

static ANCHORS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a").expect("valid anchor selector"));

static NAV_LANDMARKS: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"nav, [role="navigation"]"#).expect("valid navigation selector")
});

/// Structural signals extracted from a fetched page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StructureCounts {
    pub anchors: usize,
    pub nav_landmarks: usize,
}

/// Parses `body` as HTML5 and counts anchor elements and navigation landmarks.
///
/// An element that is both a `<nav>` and carries `role="navigation"` counts once.
pub fn analyze(body: &str) -> StructureCounts {
    let document = Html::parse_document(body);
    StructureCounts {
        anchors: document.select(&ANCHORS).count(),
        nav_landmarks: document.select(&NAV_LANDMARKS).count(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_anchors_and_landmarks() {
        let body = r#"
            <html><body>
              <nav role="navigation"><a href="/">home</a><a href="/about">about</a></nav>
              <div role="navigation"><a href="/x">x</a></div>
              <p>text</p>
            </body></html>
        "#;
        assert_eq!(
            analyze(body),
            StructureCounts {
                anchors: 3,
                nav_landmarks: 2
            }
        );
    }

    #[test]
    fn tolerates_plain_text_and_broken_markup() {
        assert_eq!(analyze("just some words"), StructureCounts::default());
        assert_eq!(analyze("<a href=x>one<a href=y>two").anchors, 2);
    }
}

use scraper::{ElementRef, Html, Selector};

use super::{ContentExtractor, ExtractedContent, ExtractionMode, ExtractionOutcome};

const BLOCK_SELECTOR: &str = "p, h1, h2, h3, h4, h5, h6, li, blockquote, pre";
const BLOCK_TAGS: [&str; 10] = [
    "p",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "li",
    "blockquote",
    "pre",
];
const CHROME_TAGS: [&str; 8] = [
    "nav", "header", "footer", "aside", "form", "script", "style", "noscript",
];
const INVISIBLE_TAGS: [&str; 5] = ["script", "style", "noscript", "template", "svg"];
const MAX_LIST_LINK_DENSITY: f64 = 0.5;

/// Readability-style extraction over `scraper`. Content shorter than
/// `min_chars` is rejected.
#[derive(Debug, Clone)]
pub struct ReadabilityExtractor {
    min_chars: usize,
}

impl ReadabilityExtractor {
    pub fn new(min_chars: usize) -> Self {
        Self { min_chars }
    }
}

impl ContentExtractor for ReadabilityExtractor {
    fn extract(&self, html: &str, url: &str, mode: ExtractionMode) -> ExtractedContent {
        let document = Html::parse_document(html);
        let text = match mode {
            ExtractionMode::Readability => readable_text(&document),
            ExtractionMode::Verbatim => visible_text(&document),
        };

        let chars = text.chars().count();
        let outcome = if chars == 0 {
            ExtractionOutcome::Rejected {
                reason: "No readable content found".to_string(),
            }
        } else if chars < self.min_chars {
            ExtractionOutcome::Rejected {
                reason: format!(
                    "Not enough content after parsing ({} < {} chars)",
                    chars, self.min_chars
                ),
            }
        } else {
            ExtractionOutcome::Extracted { text }
        };

        ExtractedContent {
            url: url.to_string(),
            outcome,
        }
    }
}

fn select_first<'a>(document: &'a Html, selector: &str) -> Option<ElementRef<'a>> {
    Selector::parse(selector)
        .ok()
        .and_then(|sel| document.select(&sel).next())
}

/// `article` with the most text, then `main`, `[role=main]`, `body`.
fn content_root(document: &Html) -> ElementRef<'_> {
    let largest_article = Selector::parse("article").ok().and_then(|sel| {
        document
            .select(&sel)
            .max_by_key(|article| article.text().map(str::len).sum::<usize>())
    });

    largest_article
        .or_else(|| select_first(document, "main"))
        .or_else(|| select_first(document, "[role=main]"))
        .or_else(|| select_first(document, "body"))
        .unwrap_or_else(|| document.root_element())
}

fn readable_text(document: &Html) -> String {
    let root = content_root(document);
    let (Ok(block_sel), Ok(link_sel)) = (Selector::parse(BLOCK_SELECTOR), Selector::parse("a"))
    else {
        return String::new();
    };

    let mut blocks: Vec<String> = Vec::new();
    for elem in root.select(&block_sel) {
        if inside_chrome_or_block(elem, root) {
            continue;
        }

        let text = compact_ws(&elem.text().collect::<String>());
        if text.is_empty() {
            continue;
        }

        if elem.value().name() == "li" {
            let link_chars: usize = elem
                .select(&link_sel)
                .map(|a| compact_ws(&a.text().collect::<String>()).chars().count())
                .sum();
            let density = link_chars as f64 / text.chars().count() as f64;
            if density > MAX_LIST_LINK_DENSITY {
                continue;
            }
        }

        blocks.push(text);
    }

    blocks.join("\n\n")
}

/// True when an ancestor below `root` is page chrome or another text block
/// (the outer block already carries this element's text).
fn inside_chrome_or_block(elem: ElementRef<'_>, root: ElementRef<'_>) -> bool {
    for ancestor in elem.ancestors() {
        if ancestor.id() == root.id() {
            return false;
        }
        let Some(name) = ancestor.value().as_element().map(|e| e.name()) else {
            continue;
        };
        if CHROME_TAGS.contains(&name) || BLOCK_TAGS.contains(&name) {
            return true;
        }
    }
    false
}

fn visible_text(document: &Html) -> String {
    let root = select_first(document, "body").unwrap_or_else(|| document.root_element());

    let mut segments: Vec<String> = Vec::new();
    for node in root.descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .map(|e| INVISIBLE_TAGS.contains(&e.name()))
                .unwrap_or(false)
        });
        if hidden {
            continue;
        }
        let compact = compact_ws(text);
        if !compact.is_empty() {
            segments.push(compact);
        }
    }

    segments.join("\n")
}

fn compact_ws(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const ARTICLE_PAGE: &str = r#"
        <html>
          <head><title>EV guide</title><style>p { color: red; }</style></head>
          <body>
            <header><nav><ul><li><a href="/">Home</a></li><li><a href="/ev">EVs</a></li></ul></nav></header>
            <article>
              <h1>Electric vehicles in 2026</h1>
              <p>Battery prices kept <b>falling</b> this year, which pushed the average range of new
                 electric cars past four hundred kilometres for the first time.</p>
              <ul>
                <li>Charging networks doubled in size across most of Europe.</li>
                <li><a href="/ad">Sponsored: buy now</a></li>
              </ul>
              <blockquote><p>Nested quote paragraph.</p></blockquote>
            </article>
            <aside><p>Related posts you might like</p></aside>
            <footer><p>Copyright 2026</p></footer>
          </body>
        </html>
    "#;

    #[test]
    fn readability_keeps_article_blocks_and_drops_chrome() {
        let extractor = ReadabilityExtractor::new(50);
        let content = extractor.extract(ARTICLE_PAGE, "https://ev.example", ExtractionMode::Readability);

        let text = content.text().expect("extracted");
        assert!(text.starts_with("Electric vehicles in 2026\n\nBattery prices kept falling this year"));
        assert!(text.contains("Charging networks doubled"));
        assert!(text.contains("Nested quote paragraph."));
        assert_eq!(text.matches("Nested quote paragraph.").count(), 1);
        assert!(!text.contains("Sponsored"));
        assert!(!text.contains("Home"));
        assert!(!text.contains("Related posts"));
        assert!(!text.contains("Copyright"));
        assert!(!text.contains("color: red"));
    }

    #[test]
    fn short_content_is_rejected() {
        let extractor = ReadabilityExtractor::new(150);
        let content = extractor.extract(
            "<html><body><p>Too short.</p></body></html>",
            "https://short.example",
            ExtractionMode::Readability,
        );

        assert!(!content.is_success());
        assert!(content.text().is_none());
        match content.outcome {
            ExtractionOutcome::Rejected { reason } => assert!(reason.contains("10 < 150")),
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn empty_document_reports_no_content() {
        let extractor = ReadabilityExtractor::new(1);
        let content = extractor.extract("", "https://empty.example", ExtractionMode::Readability);
        assert_eq!(
            content.outcome,
            ExtractionOutcome::Rejected {
                reason: "No readable content found".to_string()
            }
        );
    }

    #[test]
    fn verbatim_keeps_all_visible_text() {
        let extractor = ReadabilityExtractor::new(10);
        let content = extractor.extract(ARTICLE_PAGE, "https://ev.example", ExtractionMode::Verbatim);

        let text = content.text().expect("extracted");
        assert!(text.contains("Home"));
        assert!(text.contains("Copyright 2026"));
        assert!(!text.contains("color: red"));
    }

    #[test]
    fn extraction_is_deterministic() {
        let extractor = ReadabilityExtractor::new(50);
        let first = extractor.extract(ARTICLE_PAGE, "https://ev.example", ExtractionMode::Readability);
        let second = extractor.extract(ARTICLE_PAGE, "https://ev.example", ExtractionMode::Readability);
        assert_eq!(first, second);
    }

    #[test]
    fn falls_back_to_body_without_article() {
        let extractor = ReadabilityExtractor::new(20);
        let html = "<html><body><nav><p>menu entry text here</p></nav>\
                    <div><p>The body paragraph carries the actual story.</p></div></body></html>";
        let content = extractor.extract(html, "https://plain.example", ExtractionMode::Readability);

        assert_eq!(
            content.text(),
            Some("The body paragraph carries the actual story.")
        );
    }
}

/// Separator placed between aggregated sources.
const SOURCE_SEPARATOR: &str = "\n\n---\n\n";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceText {
    pub url: String,
    pub text: String,
}

/// Concatenates sources in input order, each tagged with its URL.
pub fn aggregate(items: &[SourceText]) -> String {
    items
        .iter()
        .map(|item| format!("SOURCE: {}\n\n{}", item.url, item.text))
        .collect::<Vec<_>>()
        .join(SOURCE_SEPARATOR)
}

use crate::models::GenerationRequest;

const OUTPUT_FIELDS: &str = "After the article, you MUST return the following two fields in the specified JSON format:\n\
1) \"seoTitle\" - An SEO-optimized title for the blog post. It MUST NOT exceed 60 characters.\n\
2) \"seoDescription\" - An SEO-optimized meta description for the blog post. It MUST NOT exceed 160 characters.\n\
Put the article itself in \"htmlContent\".";

fn request_details(request: &GenerationRequest) -> String {
    let mut lines = vec![
        format!("Topic: {}", request.topic.trim()),
        format!("Keywords: {}", request.keywords.trim()),
        format!("Tone: {}", request.tone.as_str()),
    ];
    if let Some(length) = request.length.and_then(|l| l.prompt_text()) {
        lines.push(format!("Length: {}", length));
    }
    if let Some(notes) = request.instructions() {
        lines.push(format!("Notes: {}", notes));
    }
    lines.join("\n")
}

pub(crate) fn standard_article(request: &GenerationRequest) -> String {
    format!(
        "You are an expert blog-post writer and SEO specialist.\n\
         Write an engaging, ORIGINAL article using standard HTML tags (<h1>, <h2>, <p>, <ul>, <li>, <strong>).\n\n\
         {}\n\n{}",
        OUTPUT_FIELDS,
        request_details(request)
    )
}

pub(crate) fn rag_article(request: &GenerationRequest, context: &str) -> String {
    format!(
        "You are an expert writer and researcher. Synthesise a completely NEW and ORIGINAL article based \
         *only* on the provided research context.\n\
         IMPORTANT: Do NOT copy text from the research context. Use it as a foundation to write an \
         entirely new piece in your own words.\n\
         Use standard HTML tags (<h1>, <h2>, <p>, <ul>, <li>, <strong>).\n\n\
         {}\n\n\
         --- RESEARCH CONTEXT START ---\n{}\n--- RESEARCH CONTEXT END ---\n\n\
         Your task is to write a new article based on the provided context, focusing on this topic and keywords:\n{}",
        OUTPUT_FIELDS,
        context,
        request_details(request)
    )
}

pub(crate) fn seo_only(topic: &str, keywords: &str) -> String {
    format!(
        "You are an expert SEO specialist. Your only task is to generate an SEO-optimized title and meta description.\n\
         Based on the provided topic and keywords, generate:\n\
         1. A concise, SEO-optimized title (\"seoTitle\"). IMPORTANT: The title must be a maximum of 60 characters.\n\
         2. A compelling meta description (\"seoDescription\"). IMPORTANT: The description must be a maximum of 160 characters.\n\n\
         Topic: {}\nKeywords: {}",
        topic.trim(),
        keywords.trim()
    )
}

pub(crate) fn regenerate_title(content: &str, keywords: &str) -> String {
    format!(
        "Based on the following blog post and keywords, generate a new, concise, SEO-optimized title (\"seoTitle\").\n\
         IMPORTANT: The title MUST be 60 characters or less.\n\n\
         Keywords: {}\nBlog Content:\n---\n{}\n---",
        keywords.trim(),
        content
    )
}

pub(crate) fn regenerate_description(content: &str, keywords: &str) -> String {
    format!(
        "Based on the following blog post and keywords, generate a new, compelling, SEO-optimized meta description (\"seoDescription\").\n\
         IMPORTANT: The description MUST be 160 characters or less.\n\n\
         Keywords: {}\nBlog Content:\n---\n{}\n---",
        keywords.trim(),
        content
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ArticleLength, Tone};

    #[test]
    fn details_include_optional_length_and_notes() {
        let mut request = GenerationRequest::new("Heat pumps");
        request.keywords = "efficiency, cost".to_string();
        request.tone = Tone::Humorous;
        request.length = Some(ArticleLength::Custom(5));
        request.instructions = Some("Use metric units".to_string());

        let prompt = standard_article(&request);

        assert!(prompt.contains("Topic: Heat pumps"));
        assert!(prompt.contains("Tone: humorous"));
        assert!(prompt.contains("Length: 5 sections"));
        assert!(prompt.contains("Notes: Use metric units"));
    }

    #[test]
    fn rag_prompt_embeds_context_and_synthesis_instruction() {
        let request = GenerationRequest::new("Heat pumps");
        let prompt = rag_article(&request, "SOURCE: https://a\n\nfacts");

        assert!(prompt.contains("--- RESEARCH CONTEXT START ---\nSOURCE: https://a\n\nfacts\n"));
        assert!(prompt.contains("Do NOT copy text"));
        assert!(!prompt.contains("Length:"));
    }
}

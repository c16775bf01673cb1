use serde::{Deserialize, Serialize};

/// The document written by the site crawler. Only `pages` feeds the index.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CrawlOutput {
	#[serde(default)]
	pub metadata: Option<CrawlMetadata>,
	#[serde(default)]
	pub pages: Vec<CrawlPage>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CrawlMetadata {
	pub crawl_date: Option<String>,
	pub base_url: Option<String>,
	pub max_depth: Option<u32>,
	pub total_pages: Option<u64>,
	pub version: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CrawlPage {
	pub url: Option<String>,
	pub title: Option<String>,
	pub content: Option<String>,
}

/// A page with every field present and trimmed, and non-empty content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
	pub url: String,
	pub title: String,
	pub content: String,
}

pub fn parse_crawl_output(raw: &str) -> serde_json::Result<CrawlOutput> {
	serde_json::from_str(raw)
}

pub fn valid_pages(pages: &[CrawlPage]) -> Vec<Page> {
	let mut valid = Vec::with_capacity(pages.len());

	for page in pages {
		let (Some(url), Some(title), Some(content)) =
			(page.url.as_deref(), page.title.as_deref(), page.content.as_deref())
		else {
			tracing::warn!(
				url = page.url.as_deref().unwrap_or("unknown"),
				"Skipping page missing required fields."
			);

			continue;
		};
		let content = content.trim();

		if content.is_empty() {
			tracing::warn!(url = url.trim(), "Skipping page with empty content.");

			continue;
		}

		valid.push(Page {
			url: url.trim().to_string(),
			title: title.trim().to_string(),
			content: content.to_string(),
		});
	}

	tracing::info!(valid = valid.len(), total = pages.len(), "Validated crawled pages.");

	valid
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_crawler_document() {
		let raw = r#"{
			"metadata": {
				"crawl_date": "2025-04-01T10:00:00",
				"base_url": "https://example.org",
				"max_depth": 3,
				"total_pages": 2,
				"version": "1.0"
			},
			"pages": [
				{ "url": "https://example.org/", "title": "Home", "content": "Welcome." },
				{ "url": "https://example.org/empty", "title": "Empty", "content": "   " },
				{ "url": "https://example.org/untitled", "content": "No title." }
			]
		}"#;
		let output = parse_crawl_output(raw).expect("Failed to parse crawl output.");
		let pages = valid_pages(&output.pages);

		assert_eq!(output.metadata.and_then(|m| m.total_pages), Some(2));
		assert_eq!(pages.len(), 1);
		assert_eq!(pages[0].title, "Home");
	}
}

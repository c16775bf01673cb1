pub mod crawl;

pub use crawl::{CrawlMetadata, CrawlOutput, CrawlPage, Page, parse_crawl_output, valid_pages};

use std::sync::LazyLock;

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

const SECTION_HEADINGS: [&str; 9] = [
	r"^#\s+",
	r"^##\s+",
	r"^###\s+",
	r"^Board\s+\d{4}",
	r"^Newsletter",
	r"^Blog",
	r"^Contact",
	r"^Security",
	r"^Waste\s+&\s+Recycling",
];
const CONTACT_PATTERNS: [&str; 5] =
	[r"Unit\s+\d+", r"Seat\s+\d+", r"\(\d{4}\)", r"@", r"\d{3}[-\s]?\d{3}[-\s]?\d{4}"];
const CONTACT_WINDOW: usize = 4;
const CONTACT_MIN_MATCHES: usize = 2;
const BREADCRUMB_SCAN_LINES: usize = 5;

static SECTION_HEADING_RES: LazyLock<Vec<Regex>> =
	LazyLock::new(|| SECTION_HEADINGS.iter().map(|pattern| case_insensitive(pattern)).collect());
static CONTACT_RES: LazyLock<Vec<Regex>> =
	LazyLock::new(|| CONTACT_PATTERNS.iter().map(|pattern| case_insensitive(pattern)).collect());
static HEADING_MARKER_RE: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"(?m)^#+ +").expect("heading marker regex is valid"));
static BLANK_LINES_RE: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"\n{2,}").expect("blank line regex is valid"));

#[derive(Clone, Debug)]
pub struct ChunkingConfig {
	/// Word budget per chunk. A single longer sentence still becomes one chunk.
	pub max_tokens: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkMetadata {
	pub breadcrumb: String,
	pub source_url: String,
	pub tokens: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
	pub text: String,
	pub metadata: ChunkMetadata,
}

pub fn chunk_pages(pages: &[Page], cfg: &ChunkingConfig) -> Vec<Chunk> {
	let chunks: Vec<Chunk> = pages.iter().flat_map(|page| chunk_page(page, cfg)).collect();

	tracing::info!(pages = pages.len(), chunks = chunks.len(), "Chunked pages.");

	chunks
}

pub fn chunk_page(page: &Page, cfg: &ChunkingConfig) -> Vec<Chunk> {
	let cleaned = clean_text(&page.content);
	let breadcrumb = extract_breadcrumb(&page.title, &cleaned);
	let sentences = split_sentences(&cleaned);

	group_sentences(&sentences, cfg.max_tokens)
		.into_iter()
		.map(|group| {
			let text = format!("{breadcrumb} > {}", group.join(" "));
			let tokens = count_tokens(&text);

			Chunk {
				text,
				metadata: ChunkMetadata {
					breadcrumb: breadcrumb.clone(),
					source_url: page.url.clone(),
					tokens,
				},
			}
		})
		.collect()
}

/// Strips markdown heading markers and collapses blank lines.
pub fn clean_text(text: &str) -> String {
	let text = HEADING_MARKER_RE.replace_all(text, "");
	let text = BLANK_LINES_RE.replace_all(&text, "\n");

	text.trim().to_string()
}

/// Picks a section label from the title, then from the first lines of content, else the title.
pub fn extract_breadcrumb(title: &str, content: &str) -> String {
	if is_section_heading(title) {
		return title.to_string();
	}

	content
		.lines()
		.take(BREADCRUMB_SCAN_LINES)
		.find(|line| is_section_heading(line))
		.map(|line| line.trim().to_string())
		.unwrap_or_else(|| title.to_string())
}

pub fn split_sentences(text: &str) -> Vec<String> {
	text.unicode_sentences()
		.map(str::trim)
		.filter(|sentence| !sentence.is_empty())
		.map(str::to_string)
		.collect()
}

pub fn is_contact_info(text: &str) -> bool {
	CONTACT_RES.iter().filter(|re| re.is_match(text)).count() >= CONTACT_MIN_MATCHES
}

pub fn count_tokens(text: &str) -> u32 {
	text.unicode_words().count() as u32
}

fn group_sentences(sentences: &[String], max_tokens: u32) -> Vec<Vec<String>> {
	let mut groups = Vec::new();
	let mut current: Vec<String> = Vec::new();
	let mut current_tokens = 0_u32;
	let mut idx = 0_usize;

	while idx < sentences.len() {
		let sentence = &sentences[idx];
		let tokens = count_tokens(sentence);

		if tokens > max_tokens {
			flush(&mut groups, &mut current, &mut current_tokens);
			groups.push(vec![sentence.clone()]);

			idx += 1;

			continue;
		}
		if current_tokens + tokens <= max_tokens {
			current.push(sentence.clone());

			current_tokens += tokens;
			idx += 1;
		} else {
			flush(&mut groups, &mut current, &mut current_tokens);
		}

		let window_end = (idx + CONTACT_WINDOW).min(sentences.len());

		if idx < sentences.len() && is_contact_info(&sentences[idx..window_end].join("\n")) {
			flush(&mut groups, &mut current, &mut current_tokens);

			let mut contact = Vec::new();
			let mut contact_tokens = 0_u32;

			for sentence in &sentences[idx..window_end] {
				contact_tokens += count_tokens(sentence);

				contact.push(sentence.clone());

				if contact_tokens > max_tokens {
					break;
				}
			}

			idx += contact.len();

			groups.push(contact);
		}
	}

	flush(&mut groups, &mut current, &mut current_tokens);

	groups
}

fn flush(groups: &mut Vec<Vec<String>>, current: &mut Vec<String>, current_tokens: &mut u32) {
	if !current.is_empty() {
		groups.push(std::mem::take(current));
	}

	*current_tokens = 0;
}

fn is_section_heading(line: &str) -> bool {
	SECTION_HEADING_RES.iter().any(|re| re.is_match(line))
}

fn case_insensitive(pattern: &str) -> Regex {
	RegexBuilder::new(pattern).case_insensitive(true).build().expect("chunking regex is valid")
}

#[cfg(test)]
mod tests {
	use super::*;

	fn page(title: &str, content: &str) -> Page {
		Page {
			url: "https://example.org/page".to_string(),
			title: title.to_string(),
			content: content.to_string(),
		}
	}

	#[test]
	fn clean_text_strips_heading_markers_and_blank_lines() {
		let cleaned = clean_text("# Amenities\n\n\nThe gym is on floor 2.\n\n## Hours\nDaily.");

		assert_eq!(cleaned, "Amenities\nThe gym is on floor 2.\nHours\nDaily.");
	}

	#[test]
	fn breadcrumb_prefers_section_title() {
		assert_eq!(extract_breadcrumb("Board 2024", "Members listed below."), "Board 2024");
		assert_eq!(
			extract_breadcrumb("Home", "Welcome\nSecurity Notes\nLock the doors."),
			"Security Notes"
		);
		assert_eq!(extract_breadcrumb("Home", "Welcome to the building."), "Home");
	}

	#[test]
	fn contact_info_needs_two_signals() {
		assert!(is_contact_info("Jane Doe, Unit 22, jane@example.org"));
		assert!(!is_contact_info("Email the office@ anytime."));
	}

	#[test]
	fn packs_sentences_within_budget() {
		let cfg = ChunkingConfig { max_tokens: 5 };
		let chunks = chunk_page(
			&page("Rules", "Quiet hours start at ten. Pets must be leashed. Recycling goes out Monday."),
			&cfg,
		);

		assert_eq!(chunks.len(), 3);
		assert!(chunks.iter().all(|chunk| chunk.text.starts_with("Rules > ")));
		assert_eq!(chunks[0].metadata.source_url, "https://example.org/page");
	}

	#[test]
	fn long_sentence_becomes_its_own_chunk() {
		let cfg = ChunkingConfig { max_tokens: 3 };
		let chunks =
			chunk_page(&page("Notes", "Short one. This sentence is clearly far too long."), &cfg);

		assert_eq!(chunks.len(), 2);
		assert_eq!(chunks[1].text, "Notes > This sentence is clearly far too long.");
	}

	#[test]
	fn contact_block_stays_together() {
		let cfg = ChunkingConfig { max_tokens: 200 };
		let chunks = chunk_page(
			&page(
				"Board",
				"The board meets monthly.\nJane Doe, Unit 22\njane@example.org\n206-555-0100",
			),
			&cfg,
		);

		assert_eq!(chunks.len(), 2);
		assert!(chunks[1].text.contains("Unit 22"));
		assert!(chunks[1].text.contains("206-555-0100"));
	}
}

use std::path::Path;

use color_eyre::eyre::{self, WrapErr};

use docent_chunking::Page;

const TEXT_EXTENSION: &str = "txt";
const PDF_EXTENSION: &str = "pdf";

pub async fn load_crawl(path: &Path) -> color_eyre::Result<Vec<Page>> {
	let raw = tokio::fs::read_to_string(path)
		.await
		.wrap_err_with(|| format!("Failed to read crawl output {}.", path.display()))?;
	let output = docent_chunking::parse_crawl_output(&raw)
		.wrap_err_with(|| format!("Failed to parse crawl output {}.", path.display()))?;

	Ok(docent_chunking::valid_pages(&output.pages))
}

/// Reads every `*.txt` and `*.pdf` file in `dir`, sorted by name. Each becomes one page titled by
/// its file stem. Empty documents and PDFs whose text cannot be extracted are skipped.
pub async fn load_documents(dir: &Path) -> color_eyre::Result<Vec<Page>> {
	let mut entries = tokio::fs::read_dir(dir)
		.await
		.wrap_err_with(|| format!("Failed to read documents directory {}.", dir.display()))?;
	let mut paths = Vec::new();

	while let Some(entry) = entries.next_entry().await? {
		let path = entry.path();

		if document_kind(&path).is_some() {
			paths.push(path);
		}
	}

	paths.sort();

	let mut pages = Vec::with_capacity(paths.len());

	for path in paths {
		let content = match document_kind(&path) {
			Some(DocumentKind::Text) => tokio::fs::read_to_string(&path)
				.await
				.wrap_err_with(|| format!("Failed to read document {}.", path.display()))?,
			Some(DocumentKind::Pdf) => match extract_pdf_text(&path).await {
				Ok(text) => text,
				Err(err) => {
					tracing::warn!(path = %path.display(), error = %err, "Skipping unreadable PDF.");

					continue;
				},
			},
			None => continue,
		};
		let content = content.trim();

		if content.is_empty() {
			tracing::warn!(path = %path.display(), "Skipping empty document.");

			continue;
		}

		let title = path
			.file_stem()
			.map(|stem| stem.to_string_lossy().into_owned())
			.unwrap_or_default();

		pages.push(Page { url: path.display().to_string(), title, content: content.to_string() });
	}

	tracing::info!(documents = pages.len(), dir = %dir.display(), "Loaded documents.");

	Ok(pages)
}

/// Extracts the text layer of a PDF. Parsing is CPU bound and runs off the async workers.
pub async fn extract_pdf_text(path: &Path) -> color_eyre::Result<String> {
	let bytes = tokio::fs::read(path)
		.await
		.wrap_err_with(|| format!("Failed to read PDF {}.", path.display()))?;
	let text = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes))
		.await
		.wrap_err_with(|| format!("PDF extraction aborted for {}.", path.display()))?
		.map_err(|err| eyre::eyre!("Failed to extract text from {}: {err}.", path.display()))?;

	Ok(text)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum DocumentKind {
	Text,
	Pdf,
}

fn document_kind(path: &Path) -> Option<DocumentKind> {
	let ext = path.extension()?.to_str()?.to_ascii_lowercase();

	match ext.as_str() {
		TEXT_EXTENSION => Some(DocumentKind::Text),
		PDF_EXTENSION => Some(DocumentKind::Pdf),
		_ => None,
	}
}

// Preview fetch pipeline: for every document directly inside a chosen remote
// folder, optionally copy it aside, read its definition, stage a clean local
// directory, and download one preview image per page. Documents are handled
// strictly one after another; only the pages of a single document are ever
// in flight together.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{Datelike, Local};
use futures::future::join_all;
use uuid::Uuid;

use crate::api::{RemoteApi, Session, RESOURCE_NAME};
use crate::nav::FolderListing;
use crate::staging;
use crate::ui::{self, Prompt};

/// Where per-document preview directories are created.
pub const OUTPUT_ROOT: &str = "./output";

/// Requested fidelity tier of the generated page images.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewType {
    Highest,
    Full,
    Thumb,
}

impl PreviewType {
    pub const ALL: [PreviewType; 3] = [PreviewType::Highest, PreviewType::Full, PreviewType::Thumb];

    /// Wire encoding used in the download URL.
    pub fn as_str(&self) -> &'static str {
        match self {
            PreviewType::Highest => "highest",
            PreviewType::Full => "full",
            PreviewType::Thumb => "thumb",
        }
    }
}

/// Parameters gathered once per run and applied to every document in it.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub copy_first: bool,
    pub concurrent: bool,
    pub auto_generation: bool,
    pub preview_type: PreviewType,
}

/// Ask the operator for the four run-scoped parameters.
pub fn prompt_run_options(prompt: &dyn Prompt) -> Result<RunOptions> {
    let copy_first = prompt.confirm("Do you want to copy the documents first?")?;
    let concurrent = prompt.confirm("Do you want to request all pages at once (async)?")?;
    let auto_generation = prompt.confirm("Do you want auto preview generation on?")?;
    let labels: Vec<String> = PreviewType::ALL
        .iter()
        .map(|t| t.as_str().to_string())
        .collect();
    let index = prompt.choose("Preview Type?", &labels)?;
    Ok(RunOptions {
        copy_first,
        concurrent,
        auto_generation,
        preview_type: PreviewType::ALL[index],
    })
}

/// Build the download URL for one page. `async=false` is a remote-side hint
/// on every request and is unrelated to this run's own concurrency setting.
pub fn page_url(
    session: &Session,
    preview_type: PreviewType,
    document_id: &str,
    page: usize,
) -> String {
    format!(
        "{}/{}/download.aspx?page={}&apiKey={}&resourceName={}&type={}&id={}&async=false",
        session.url,
        session.environment,
        page,
        session.api_key,
        RESOURCE_NAME,
        preview_type.as_str(),
        document_id
    )
}

/// The page count arrives string-typed from the server. Anything that does
/// not parse as a non-negative integer disqualifies the document.
pub fn parse_page_count(raw: &str) -> Option<usize> {
    raw.trim().parse().ok()
}

/// Remote staging folder for copied documents: `00Copy/<year>/<day-of-month>`.
fn copy_folder_path() -> String {
    let now = Local::now();
    format!("00Copy/{}/{}", now.year(), now.day())
}

/// Prompt for run options, then generate previews for every document directly
/// inside `folder_path` (non-recursive).
pub async fn run(
    api: &dyn RemoteApi,
    session: &Session,
    prompt: &dyn Prompt,
    folder_path: &str,
    output_root: &Path,
) -> Result<()> {
    let options = prompt_run_options(prompt)?;
    run_with_options(api, session, folder_path, &options, output_root).await
}

/// Pipeline body, separated from the prompting so tests can drive it with
/// fixed options.
pub async fn run_with_options(
    api: &dyn RemoteApi,
    session: &Session,
    folder_path: &str,
    options: &RunOptions,
    output_root: &Path,
) -> Result<()> {
    api.set_auto_preview_generation(&session.api_key, options.auto_generation)
        .await?;

    let items = api.tree_level(&session.api_key, folder_path).await?;
    for document_id in FolderListing::document_ids(&items) {
        process_document(api, session, &document_id, options, output_root).await?;
    }

    println!();
    Ok(())
}

/// Handle one document end to end. When `copy_first` is set the copy's id
/// replaces the original for everything that follows: definition fetch,
/// staging, and every download URL.
async fn process_document(
    api: &dyn RemoteApi,
    session: &Session,
    document_id: &str,
    options: &RunOptions,
    output_root: &Path,
) -> Result<()> {
    let document_id = if options.copy_first {
        api.copy_item(
            &session.api_key,
            document_id,
            &Uuid::new_v4().to_string(),
            &copy_folder_path(),
        )
        .await?
    } else {
        document_id.to_string()
    };

    let spinner = ui::spinner("Fetching document definition...");
    let definition = api.item_definition(&session.api_key, &document_id).await;
    spinner.finish_and_clear();
    let definition = definition?;

    println!();
    println!("Processing {}", definition.name);

    let pages = match parse_page_count(&definition.page_count) {
        Some(pages) => pages,
        None => {
            ui::banner(&[
                "Skipping document: page count is not a non-negative integer",
                &format!("Document: {}", definition.name),
                &format!("Reported page count: {:?}", definition.page_count),
            ]);
            return Ok(());
        }
    };

    let dir = staging::ensure(output_root, &document_id).await?;

    // Lightweight manifest: the page count in the filename, the display name
    // as the content.
    tokio::fs::write(dir.join(format!("count {}.txt", pages)), &definition.name)
        .await
        .context("Failed to write manifest file")?;

    download_pages(api, session, &document_id, pages, options, &dir).await;
    Ok(())
}

/// Download every page of one document. Failures never abort the document:
/// each one prints a warning and leaves a missing file behind. In concurrent
/// mode all pages are launched together (no cap) and the function returns
/// only once every one of them has settled.
async fn download_pages(
    api: &dyn RemoteApi,
    session: &Session,
    document_id: &str,
    pages: usize,
    options: &RunOptions,
    dir: &Path,
) {
    let bar = ui::page_bar(pages as u64);
    let bar = &bar;

    if options.concurrent {
        let downloads: Vec<_> = (0..pages)
            .map(|page| {
                let url = page_url(session, options.preview_type, document_id, page);
                let dest = page_path(dir, page);
                async move {
                    let result = api.download_to_file(&url, &dest).await;
                    bar.inc(1);
                    (page, result)
                }
            })
            .collect();
        for (page, result) in join_all(downloads).await {
            if let Err(e) = result {
                println!("Page {} failed: {:#}", page + 1, e);
            }
        }
    } else {
        for page in 0..pages {
            let url = page_url(session, options.preview_type, document_id, page);
            let dest = page_path(dir, page);
            let result = api.download_to_file(&url, &dest).await;
            bar.inc(1);
            if let Err(e) = result {
                println!("Page {} failed: {:#}", page + 1, e);
            }
        }
    }

    bar.finish_and_clear();
}

/// Pages are 0-based remotely but 1-based on disk.
fn page_path(dir: &Path, page: usize) -> PathBuf {
    dir.join(format!("{}.png", page + 1))
}

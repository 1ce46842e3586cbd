use crate::domain::models::{DbBuildReport, IndexFile, IndexedApp};
use crate::services::storage::write_atomic;
use scraper::{ElementRef, Html, Selector};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

const PAGE_PREFIX: &str = "List_of_applications";
const DEFAULT_CATEGORY: &str = "General";
const DESC_TRIM: &[char] = &[' ', '\t', '\n', '—', '–', '-'];
const MAX_NAME_CHARS: usize = 30;
const MIN_DESC_CHARS: usize = 5;
const MAX_DESC_CHARS: usize = 150;

/// The offline wiki stores sub-pages either as `List_of_applications/X.html`,
/// `List_of_applications_X.html` or URL-encoded `List_of_applications%2FX.html`.
pub fn find_pages(wiki_dir: &Path) -> Vec<PathBuf> {
    let mut pages = BTreeSet::new();
    let top = std::fs::read_dir(wiki_dir).into_iter().flatten().flatten();
    for entry in top {
        let name = entry.file_name().to_string_lossy().to_string();
        if name.starts_with(PAGE_PREFIX) && name.ends_with(".html") && entry.path().is_file() {
            pages.insert(entry.path());
        }
    }
    let nested = std::fs::read_dir(wiki_dir.join(PAGE_PREFIX))
        .into_iter()
        .flatten()
        .flatten();
    for entry in nested {
        if entry.file_name().to_string_lossy().ends_with(".html") && entry.path().is_file() {
            pages.insert(entry.path());
        }
    }
    pages.into_iter().collect()
}

fn selector(css: &str) -> anyhow::Result<Selector> {
    Selector::parse(css).map_err(|e| anyhow::anyhow!("bad selector {}: {}", css, e))
}

fn text_of(el: ElementRef) -> String {
    el.text().collect()
}

fn entry_from_item(item: ElementRef, link: &Selector, bold: &Selector) -> Option<(String, String)> {
    let a = item.select(link).next()?;
    let text = text_of(item);
    if text.is_empty() {
        return None;
    }
    // The wiki bolds the package name; fall back to the link text.
    let name = match item.select(bold).next() {
        Some(b) => text_of(b).trim().to_string(),
        None => text_of(a).trim().to_string(),
    };
    let desc = text.replacen(&name, "", 1).trim_matches(DESC_TRIM).to_string();

    let keep = !name.is_empty()
        && desc.chars().count() > MIN_DESC_CHARS
        && name.chars().count() < MAX_NAME_CHARS
        && !name.contains('\n');
    keep.then_some((name, desc))
}

pub fn parse_page(html: &str) -> anyhow::Result<Vec<IndexedApp>> {
    let doc = Html::parse_document(html);
    let walk = selector("h2, h3, h4, li")?;
    let headline = selector(".mw-headline")?;
    let link = selector("a")?;
    let bold = selector("b")?;

    let mut category = DEFAULT_CATEGORY.to_string();
    let mut apps = Vec::new();
    for el in doc.select(&walk) {
        if el.value().name() == "li" {
            if let Some((name, desc)) = entry_from_item(el, &link, &bold) {
                apps.push(IndexedApp {
                    name: name.to_lowercase(),
                    desc: desc.chars().take(MAX_DESC_CHARS).collect(),
                    category: category.clone(),
                });
            }
        } else if let Some(h) = el.select(&headline).next() {
            category = text_of(h).trim().to_string();
        }
    }
    Ok(apps)
}

pub fn build_index(wiki_dir: &Path, out: &Path) -> anyhow::Result<DbBuildReport> {
    let pages = find_pages(wiki_dir);
    if pages.is_empty() {
        anyhow::bail!(
            "could not find the application sub-pages under {} (is arch-wiki-docs installed?)",
            wiki_dir.display()
        );
    }

    write_index(&pages, out)
}

/// Parses `pages` and replaces `out`. Unreadable pages are skipped, but at
/// least one must parse or `out` is left untouched.
pub fn write_index(pages: &[PathBuf], out: &Path) -> anyhow::Result<DbBuildReport> {
    let mut index = IndexFile::default();
    let mut files = Vec::new();
    for page in pages {
        let bytes = match std::fs::read(page) {
            Ok(b) => b,
            Err(e) => {
                tracing::warn!(page = %page.display(), error = %e, "skipping unreadable page");
                continue;
            }
        };
        let apps = parse_page(&String::from_utf8_lossy(&bytes))?;
        tracing::info!(page = %page.display(), apps = apps.len(), "parsed wiki page");
        index.apps.extend(apps);
        files.push(page.to_string_lossy().to_string());
    }

    if files.is_empty() {
        anyhow::bail!("none of the {} application pages could be read", pages.len());
    }
    write_atomic(out, serde_json::to_string_pretty(&index)?.as_bytes())?;
    Ok(DbBuildReport {
        files,
        apps: index.apps.len(),
        output: out.to_string_lossy().to_string(),
    })
}

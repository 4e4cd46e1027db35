//! HTML table report
//!
//! Buffers each data type as a page model and renders it through the
//! [`TemplateEngine`] when the data type ends. Tagged files with a local copy
//! are copied under `Tagged Files/<tag>/` and linked from their row; tagged
//! images get a thumbnails page showing those copies.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, warn};

use super::error::{ReportError, ReportResult};
use super::modules::{TableReportModule, THUMBNAIL_COLUMNS};
use super::naming::safe_file_name;
use super::template::{TemplateEngine, REPORT_CSS};
use crate::audit;
use crate::case::{ContentTag, FileRecord};

pub const HTML_FOLDER: &str = "HTML Report";
const CONTENT_FOLDER: &str = "content";
const TAGGED_FILES_FOLDER: &str = "Tagged Files";
const THUMBNAILS_FOLDER: &str = "thumbs";

#[derive(Debug, Clone, Serialize)]
struct Cell {
    text: String,
    href: Option<String>,
    /// Show the linked file inline
    image: bool,
}

impl Cell {
    fn plain(text: &str) -> Self {
        Self { text: text.to_string(), href: None, image: false }
    }
}

#[derive(Debug, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum Block {
    SetStart { name: String, index: usize },
    SetEnd,
    Element { name: String },
    Table { headers: Vec<String>, rows: Vec<Vec<Cell>> },
}

#[derive(Debug, Serialize)]
struct Page {
    name: String,
    comment: String,
    set_index: Vec<String>,
    blocks: Vec<Block>,
}

/// Index entry for a written page
#[derive(Debug, Serialize)]
struct PageLink {
    name: String,
    file_name: String,
    rows: usize,
}

pub struct HtmlReport {
    case_name: String,
    engine: Option<TemplateEngine>,
    template_dir: Option<PathBuf>,
    root: PathBuf,
    page: Option<Page>,
    sets_started: usize,
    rows: usize,
    links: Vec<PageLink>,
    /// Object id -> link of the report's copy of that file
    copies: HashMap<i64, String>,
}

impl HtmlReport {
    pub fn new(case_name: impl Into<String>) -> Self {
        Self {
            case_name: case_name.into(),
            engine: None,
            template_dir: None,
            root: PathBuf::new(),
            page: None,
            sets_started: 0,
            rows: 0,
            links: Vec::new(),
            copies: HashMap::new(),
        }
    }

    /// Use templates from this directory where present
    pub fn with_template_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.template_dir = Some(dir.into());
        self
    }

    fn engine(&self) -> ReportResult<&TemplateEngine> {
        self.engine
            .as_ref()
            .ok_or_else(|| ReportError::InvalidState("HTML report was not started".to_string()))
    }

    fn page_mut(&mut self) -> ReportResult<&mut Page> {
        self.page
            .as_mut()
            .ok_or_else(|| ReportError::InvalidState("no data type is open".to_string()))
    }

    fn current_table(&mut self) -> ReportResult<&mut Vec<Vec<Cell>>> {
        match self.page_mut()?.blocks.last_mut() {
            Some(Block::Table { rows, .. }) => Ok(rows),
            _ => Err(ReportError::InvalidState("no table is open".to_string())),
        }
    }

    fn push_row(&mut self, row: Vec<Cell>) -> ReportResult<()> {
        self.current_table()?.push(row);
        self.rows += 1;
        Ok(())
    }

    /// Copy a file's local content to `<root>/<folder>/`; returns the link
    /// relative to the content pages
    fn copy_into_report(&mut self, folder: &Path, file: &FileRecord) -> Option<String> {
        let source = file.local_path.as_deref().filter(|p| !p.is_empty())?;
        let file_name = safe_file_name(&format!("{}-{}", file.object_id, file.name));
        let dir = self.root.join(folder);
        let target = dir.join(&file_name);

        let copied = fs::create_dir_all(&dir).and_then(|_| fs::copy(source, &target));
        match copied {
            Ok(bytes) => {
                audit::log_data_export(Path::new(source), &target, bytes);
                let mut link = String::from("..");
                for part in folder.iter() {
                    link.push('/');
                    link.push_str(&part.to_string_lossy());
                }
                link.push('/');
                link.push_str(&file_name);
                self.copies.insert(file.object_id, link.clone());
                Some(link)
            }
            Err(e) => {
                warn!(file = %file.unique_path, error = %e, "Failed to copy tagged file into report");
                None
            }
        }
    }

    fn copy_tagged_file(&mut self, tag: &ContentTag, file: &FileRecord) -> Option<String> {
        let folder = Path::new(TAGGED_FILES_FOLDER).join(safe_file_name(&tag.tag_name));
        self.copy_into_report(&folder, file)
    }

    /// Link to the report's copy of an image, copying it if no tag row did
    fn thumbnail_link(&mut self, file: &FileRecord) -> Option<String> {
        match self.copies.get(&file.object_id) {
            Some(link) => Some(link.clone()),
            None => self.copy_into_report(Path::new(THUMBNAILS_FOLDER), file),
        }
    }
}

impl TableReportModule for HtmlReport {
    fn name(&self) -> &str {
        "HTML"
    }

    fn relative_file_path(&self) -> &str {
        "HTML Report/index.html"
    }

    fn start_report(&mut self, report_dir: &Path) -> ReportResult<()> {
        self.root = report_dir.join(HTML_FOLDER);
        fs::create_dir_all(self.root.join(CONTENT_FOLDER))?;
        fs::write(self.root.join(CONTENT_FOLDER).join("report.css"), REPORT_CSS)?;
        self.engine = Some(match &self.template_dir {
            Some(dir) => TemplateEngine::with_directory(dir)?,
            None => TemplateEngine::new()?,
        });
        Ok(())
    }

    fn end_report(&mut self) -> ReportResult<()> {
        let generated_at = chrono::Local::now().format("%Y/%m/%d %H:%M:%S").to_string();
        let html = self.engine()?.render_index(&self.case_name, &generated_at, &self.links)?;
        fs::write(self.root.join("index.html"), html)?;
        debug!(pages = self.links.len(), "HTML report written");
        Ok(())
    }

    fn start_data_type(&mut self, name: &str, comment: &str) -> ReportResult<()> {
        self.page = Some(Page {
            name: name.to_string(),
            comment: comment.to_string(),
            set_index: Vec::new(),
            blocks: Vec::new(),
        });
        self.sets_started = 0;
        self.rows = 0;
        Ok(())
    }

    fn end_data_type(&mut self) -> ReportResult<()> {
        let page = self
            .page
            .take()
            .ok_or_else(|| ReportError::InvalidState("no data type is open".to_string()))?;
        let file_name = format!("{}.html", safe_file_name(&page.name));
        let html = self.engine()?.render_data_type(&self.case_name, &page)?;
        fs::write(self.root.join(CONTENT_FOLDER).join(&file_name), html)?;
        self.links.push(PageLink { name: page.name, file_name, rows: self.rows });
        Ok(())
    }

    fn start_set(&mut self, set_name: &str) -> ReportResult<()> {
        self.sets_started += 1;
        let index = self.sets_started;
        self.page_mut()?.blocks.push(Block::SetStart { name: set_name.to_string(), index });
        Ok(())
    }

    fn end_set(&mut self) -> ReportResult<()> {
        self.page_mut()?.blocks.push(Block::SetEnd);
        Ok(())
    }

    fn add_set_index(&mut self, sets: &[String]) -> ReportResult<()> {
        self.page_mut()?.set_index = sets.to_vec();
        Ok(())
    }

    fn add_set_element(&mut self, element_name: &str) -> ReportResult<()> {
        self.page_mut()?.blocks.push(Block::Element { name: element_name.to_string() });
        Ok(())
    }

    fn start_table(&mut self, headers: &[String]) -> ReportResult<()> {
        self.page_mut()?
            .blocks
            .push(Block::Table { headers: headers.to_vec(), rows: Vec::new() });
        Ok(())
    }

    fn end_table(&mut self) -> ReportResult<()> {
        self.current_table().map(|_| ())
    }

    fn add_row(&mut self, cells: &[String]) -> ReportResult<()> {
        self.push_row(cells.iter().map(|c| Cell::plain(c)).collect())
    }

    fn supports_tagged_content_links(&self) -> bool {
        true
    }

    fn add_tagged_content_row(
        &mut self,
        cells: &[String],
        tag: &ContentTag,
        file: Option<&FileRecord>,
    ) -> ReportResult<()> {
        let href = file.and_then(|f| self.copy_tagged_file(tag, f));
        let mut row: Vec<Cell> = cells.iter().map(|c| Cell::plain(c)).collect();
        // Column 1 is the file path
        if let Some(cell) = row.get_mut(1) {
            cell.href = href;
        }
        self.push_row(row)
    }

    fn supports_thumbnails(&self) -> bool {
        true
    }

    fn add_thumbnail_rows(&mut self, images: &[FileRecord]) -> ReportResult<()> {
        for chunk in images.chunks(THUMBNAIL_COLUMNS) {
            let mut row = Vec::with_capacity(THUMBNAIL_COLUMNS);
            for file in chunk {
                let href = self.thumbnail_link(file);
                row.push(Cell { text: file.name.clone(), image: href.is_some(), href });
            }
            self.push_row(row)?;
        }
        Ok(())
    }
}

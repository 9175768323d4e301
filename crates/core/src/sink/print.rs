//! Print sink.
//!
//! Printing writes a complete HTML document into a freshly opened print window. The document
//! carries an auto-print script, so the platform print dialog opens once the window has loaded it.
//! A host that refuses to open a window (a blocked popup) yields [`PrintError::PopupBlocked`].

use super::targets::TargetRegistry;
use crate::document::PrintableDocument;
use crate::layout::PageLayout;
use crate::render::{html, Renderer};
use crate::{PrintError, PrintResult};
use std::fs;
use std::path::PathBuf;
use uuid::Uuid;

/// A print job handed to the platform.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PrintJob {
    pub id: Uuid,
    pub name: String,
    /// Where the printed HTML was stored, for hosts that store it.
    pub location: Option<PathBuf>,
}

/// Something that can open print windows.
pub trait PrintHost {
    type Window: PrintWindow;

    /// Opens a window named `name`. `Ok(None)` means the host refused to open one.
    fn open_window(&self, name: &str) -> PrintResult<Option<Self::Window>>;
}

/// An open print window.
pub trait PrintWindow {
    fn write(&mut self, html: &str) -> PrintResult<()>;

    /// Finishes the document and triggers printing.
    fn print(self) -> PrintResult<PrintJob>;
}

/// Writes each print job to `<spool_dir>/<name>-<uuid>.html`.
#[derive(Clone, Debug)]
pub struct SpoolPrintHost {
    dir: PathBuf,
}

impl SpoolPrintHost {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[derive(Debug)]
pub struct SpoolWindow {
    id: Uuid,
    name: String,
    path: PathBuf,
    buffer: String,
}

impl PrintHost for SpoolPrintHost {
    type Window = SpoolWindow;

    fn open_window(&self, name: &str) -> PrintResult<Option<SpoolWindow>> {
        fs::create_dir_all(&self.dir).map_err(PrintError::OutputDirCreation)?;
        let id = Uuid::new_v4();
        let path = self.dir.join(format!("{name}-{id}.html"));
        Ok(Some(SpoolWindow {
            id,
            name: name.to_string(),
            path,
            buffer: String::new(),
        }))
    }
}

impl PrintWindow for SpoolWindow {
    fn write(&mut self, html: &str) -> PrintResult<()> {
        self.buffer.push_str(html);
        Ok(())
    }

    fn print(self) -> PrintResult<PrintJob> {
        fs::write(&self.path, self.buffer.as_bytes()).map_err(PrintError::FileWrite)?;
        tracing::info!(path = %self.path.display(), "print job spooled");
        Ok(PrintJob {
            id: self.id,
            name: self.name,
            location: Some(self.path),
        })
    }
}

fn print_html<H: PrintHost>(host: &H, name: &str, html: &str) -> PrintResult<PrintJob> {
    let mut window = host.open_window(name)?.ok_or(PrintError::PopupBlocked)?;
    window.write(html)?;
    window.print()
}

fn window_name(document: &PrintableDocument) -> String {
    clinic_types::FileNameComponent::new(format!(
        "{}-{}",
        document.kind(),
        document.record_id()
    ))
    .map(|c| c.as_str().to_string())
    .unwrap_or_else(|_| "document".to_string())
}

/// Renders `document` and prints it.
pub fn print_document<H: PrintHost>(
    host: &H,
    renderer: &Renderer,
    document: &PrintableDocument,
) -> PrintResult<PrintJob> {
    let html = renderer.render(document);
    print_html(host, &window_name(document), &html)
}

/// Prints the target registered under `target_id`.
pub fn print_element<H: PrintHost>(
    host: &H,
    registry: &TargetRegistry,
    target_id: &str,
    layout: PageLayout,
) -> PrintResult<PrintJob> {
    let guard = registry.acquire(target_id)?;
    let html = html::to_html(guard.tree(), layout);
    let name = clinic_types::FileNameComponent::new(target_id)
        .map(|c| c.as_str().to_string())
        .unwrap_or_else(|_| "target".to_string());
    print_html(host, &name, &html)
}

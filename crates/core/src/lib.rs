//! # Clinic Print Core
//!
//! Document generation for the clinic application: prescriptions, lab orders, consultations,
//! patient summaries and insurance policies, printed as HTML or exported as PDF and CSV.
//!
//! The pipeline has three layers:
//! - [`assembler`]: fetches the print context and builds an immutable [`PrintableDocument`]
//! - [`render`]: turns a document into a [`DocumentTree`] and serializes it to HTML
//! - [`sink`]: prints, exports PDF and exports CSV
//!
//! **No API concerns**: HTTP routing and the command-line interface live in `api-rest` and `cli`.

pub mod action;
pub mod assembler;
pub mod config;
pub mod constants;
pub mod document;
pub mod error;
pub mod filename;
pub mod format;
pub mod layout;
pub mod markup;
pub mod names;
pub mod render;
pub mod sink;

#[cfg(test)]
mod test_support;

pub use action::{ActionState, Notice, NoticeLevel, PrintAction};
pub use assembler::{
    fetch_print_context, ContextSource, DocumentAssembler, HttpContextSource, PrintContext,
    PrintRequest, Resolved, StaticContextSource, Unresolved,
};
pub use config::PrintConfig;
pub use document::{DocumentContent, DocumentKind, PrintableDocument};
pub use error::{PrintError, PrintResult};
pub use filename::FilenameStyle;
pub use layout::{Orientation, PageFormat, PageLayout};
pub use markup::DocumentTree;
pub use render::Renderer;
pub use sink::csv::export_to_csv;
pub use sink::pdf::{export_to_pdf, PdfOptions};
pub use sink::print::{print_document, print_element, PrintHost, SpoolPrintHost};
pub use sink::targets::TargetRegistry;
pub use sink::{DirectoryDownloads, DownloadSink, Export};

// Export Adapter
// JSON export/import, PDF file naming, and delivery to a download sink.

pub mod json;
pub mod pdf;
pub mod sink;

pub use json::{export_json, import_file, import_json, JSON_FILE_NAME};
pub use pdf::{pdf_file_name, ExportedPdf, PdfExporter, LARGE_PDF_BYTES};
pub use sink::{DirectorySink, DownloadSink};

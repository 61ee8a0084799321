// PDF Encoder
// Serializes a laid-out document into PDF bytes with pdf-writer.

pub mod pdf;

pub use pdf::encode_pdf;

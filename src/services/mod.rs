pub mod archive_finalizer;
pub mod artifact_store;
pub mod form_submitter;
pub mod order_source;
pub mod pdf_embed;
pub mod receipt_capturer;
pub mod warn_writer;

pub use archive_finalizer::{ArchiveFinalizer, ZipArchiveFinalizer};
pub use artifact_store::ArtifactStore;
pub use form_submitter::{BrowserFormSubmitter, FormState, FormSubmitter};
pub use order_source::{HttpOrderSource, OrderSource};
pub use receipt_capturer::{BrowserReceiptCapturer, ReceiptCapturer};
pub use warn_writer::WarnWriter;

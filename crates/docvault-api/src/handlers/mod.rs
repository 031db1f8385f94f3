pub mod document_archive;
pub mod document_download;
pub mod document_get;
pub mod document_upload;

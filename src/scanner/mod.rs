//! File scanning and output naming

pub mod file_scanner;

pub use file_scanner::{base_name, ensure_output_directory, final_path, intermediate_path, list_pdf_files};

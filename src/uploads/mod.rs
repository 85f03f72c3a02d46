//! Receipt file storage

pub mod receipts;

pub use receipts::ReceiptStore;

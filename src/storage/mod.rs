pub mod record_store;
pub mod table;

pub use record_store::RecordStore;
pub use table::UserTable;

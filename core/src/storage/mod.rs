pub mod record;
pub mod recorder;

pub use record::{ScanRecord, COLUMNS};
pub use recorder::{read_records, CsvScanRecorder, ScanRecorder};

pub mod events;
pub mod scan;
pub mod service;
pub mod session;
pub mod state;

pub use events::{ProgressEvent, ScanEvent, ScanObserver, StopToken};
pub use scan::ScanController;
pub use service::ScanService;
pub use session::{ScanAbort, ScanOutcome, ScanReport, ScanRequest};
pub use state::{ScanState, ScanStatus};

//! `track_io` — the outside world around the registry: CSV files in,
//! prediction tables out, and the CTC UDP listen/transmit loops.

pub mod csv_loader;
pub mod live;
pub mod output;
pub mod transmit;

pub use csv_loader::{load_many, load_updates, track_labels, updates_only, LabelledUpdate};
pub use live::{FrameReport, Listener, ListenerConfig, ReportTrigger};
pub use output::{with_output, write_feature_matrix, write_predictions};
pub use transmit::{TransmitConfig, Transmitter};

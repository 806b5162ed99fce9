//! navdat - layered access to X-Plane aeronautical data files
//!
//! This library reads X-Plane's navigation databases (`nav.dat`, `apt.dat`,
//! `fix.dat`, `awy.dat` and their `earth_*` variants) and exposes their
//! records as ordered, typed layers.
//!
//! ```no_run
//! use navdat::XPlaneDataSource;
//!
//! let mut ds = XPlaneDataSource::new();
//! if ds.open("/X-Plane 12/Resources/default data/earth_nav.dat", true) {
//!     ds.read_whole_file_if_necessary();
//!     for layer in ds.layers() {
//!         println!("{}: {} records", layer.name(), layer.feature_count());
//!     }
//! }
//! ```
//!
//! Open failures are reported as `false` and logged through `tracing`; see
//! [`logging::init_logging`] to print them.

pub mod config;
pub mod datasource;
pub mod error;
pub mod geo;
pub mod layer;
pub mod logging;
pub mod reader;
pub mod record;

pub use config::{ConfigError, NavdatConfig};
pub use datasource::{DataSourceId, XPlaneDataSource};
pub use error::{ReaderError, RecordError};
pub use layer::{FieldDefn, Layer, LayerKind, RecordSink};
pub use reader::{
    create_apt_reader, create_awy_reader, create_fix_reader, create_nav_reader, FileFormat,
    XPlaneReader,
};
pub use record::{FieldType, FieldValue, Record};

pub mod error;
pub mod settings;
pub mod source;

pub use error::{FeedError, Result};
pub use settings::{CONFIG_ENV, Settings, resolve_config_path};
pub use source::{decode_combinations, load_records, parse_records};

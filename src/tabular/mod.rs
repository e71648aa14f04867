//! Clipboard grid parsing and the address and change-log rules built on it.

pub mod address;
pub mod changelog;
pub mod table;

pub use address::{
    format_coordinate, format_for_geocoding, set_coordinates, truncate_coordinate,
    validate_address_table, ESSENTIAL_COLUMNS, LATITUDE_COLUMN, LONGITUDE_COLUMN,
};
pub use changelog::{last_updated_by, UPDATED_BY_COLUMN};
pub use table::Table;

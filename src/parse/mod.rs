//! Settings and palette documents.

pub mod palette;
pub mod settings;

pub use palette::{PaletteError, PaletteResult, Palettes, Swatch};
pub use settings::{
    SETTINGS_VERSION, SettingsDocument, SettingsError, SettingsResult, load_settings,
    save_settings,
};

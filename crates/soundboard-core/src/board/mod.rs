mod catalog;
mod slot;
mod soundboard;
mod view;

pub use {
    catalog::{CatalogEntry, PlaybackCatalog},
    slot::{RecordingSlot, SlotState, SlotStatus},
    soundboard::{MAX_VOLUME, Soundboard},
    view::{BoardView, ClipButton, SlotRow},
};

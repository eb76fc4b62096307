//! Recordings export/import
//!
//! Features:
//! - Versioned JSON envelope around the whole recordings list
//! - Inputs stored as one small integer per tick
//! - Best-effort import: anything unreadable becomes an empty list
//! - LocalStorage slot per level on the web

use serde::{Deserialize, Serialize};

use crate::sim::Recording;

/// Current envelope version
pub const FORMAT_VERSION: u32 = 1;

#[derive(Serialize)]
struct EnvelopeRef<'a> {
    version: u32,
    recordings: Vec<&'a Recording>,
}

#[derive(Deserialize)]
struct Envelope {
    version: u32,
    recordings: Vec<Recording>,
}

/// Encode recordings (oldest first) as JSON text
pub fn encode_recordings<'a, I>(recordings: I) -> String
where
    I: IntoIterator<Item = &'a Recording>,
{
    let envelope = EnvelopeRef {
        version: FORMAT_VERSION,
        recordings: recordings.into_iter().collect(),
    };
    // Plain structs of numbers and bools always serialize
    serde_json::to_string(&envelope).unwrap_or_default()
}

/// Decode recordings; malformed or foreign data yields an empty list
pub fn decode_recordings(json: &str) -> Vec<Recording> {
    let envelope: Envelope = match serde_json::from_str(json) {
        Ok(envelope) => envelope,
        Err(err) => {
            log::warn!("Ignoring malformed recordings: {err}");
            return Vec::new();
        }
    };

    if envelope.version != FORMAT_VERSION {
        log::warn!(
            "Ignoring recordings with format version {} (expected {})",
            envelope.version,
            FORMAT_VERSION
        );
        return Vec::new();
    }

    envelope
        .recordings
        .into_iter()
        .map(Recording::normalized)
        .collect()
}

/// LocalStorage key for a level's recordings
#[allow(dead_code)]
fn storage_key(level_name: &str) -> String {
    format!("echo_loop_recordings:{level_name}")
}

/// Save recordings to LocalStorage (WASM only)
#[cfg(target_arch = "wasm32")]
pub fn save_recordings<'a, I>(level_name: &str, recordings: I)
where
    I: IntoIterator<Item = &'a Recording>,
{
    let storage = web_sys::window()
        .and_then(|w| w.local_storage().ok())
        .flatten();

    if let Some(storage) = storage {
        let json = encode_recordings(recordings);
        if storage.set_item(&storage_key(level_name), &json).is_ok() {
            log::info!("Recordings saved for '{level_name}'");
        }
    }
}

/// Load recordings from LocalStorage (WASM only)
#[cfg(target_arch = "wasm32")]
pub fn load_recordings(level_name: &str) -> Vec<Recording> {
    let storage = web_sys::window()
        .and_then(|w| w.local_storage().ok())
        .flatten();

    if let Some(storage) = storage {
        if let Ok(Some(json)) = storage.get_item(&storage_key(level_name)) {
            let recordings = decode_recordings(&json);
            log::info!("Loaded {} recordings for '{level_name}'", recordings.len());
            return recordings;
        }
    }

    Vec::new()
}

/// Native stubs
#[cfg(not(target_arch = "wasm32"))]
pub fn save_recordings<'a, I>(_level_name: &str, _recordings: I)
where
    I: IntoIterator<Item = &'a Recording>,
{
    // No-op for native
}

#[cfg(not(target_arch = "wasm32"))]
pub fn load_recordings(_level_name: &str) -> Vec<Recording> {
    Vec::new()
}

use std::fs;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread;

use serde::Deserialize;

use crate::error::AssetError;

/// Opaque handle to a texture owned by an [`AssetLoader`].
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub struct TextureHandle(pub u32);

/// Resolves texture URLs to handles.
///
/// Loading may finish later; callers can use the handle right away and will
/// see a placeholder until then.
pub trait AssetLoader {
    fn load_texture(&mut self, url: &str) -> TextureHandle;
}

/// Prefix of URLs served from the bundled skins.
pub const BUILTIN_PREFIX: &str = "builtin:";

/// Single opaque blue layer shown until a texture arrives.
pub const PLACEHOLDER_COLOR: [u8; 3] = [0, 0, 255];

/// A texture as the game uses it: a strip of colour layers.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Skin {
    pub layers: Vec<[u8; 3]>,
}

impl Skin {
    #[must_use]
    pub fn placeholder() -> Self {
        Self {
            layers: vec![PLACEHOLDER_COLOR],
        }
    }

    /// Colour of `layer`, wrapping around the strip.
    #[must_use]
    pub fn layer(&self, layer: u8) -> [u8; 3] {
        if self.layers.is_empty() {
            return PLACEHOLDER_COLOR;
        }
        self.layers[usize::from(layer) % self.layers.len()]
    }

    /// Parses a JSON skin document.
    pub fn from_json(url: &str, raw: &str) -> Result<Self, AssetError> {
        let skin: Self = serde_json::from_str(raw).map_err(|source| AssetError::Parse {
            url: url.to_owned(),
            source,
        })?;
        if skin.layers.is_empty() {
            return Err(AssetError::Empty(url.to_owned()));
        }
        Ok(skin)
    }
}

/// Bundled skins addressable as `builtin:<name>`.
pub fn builtin_skin(name: &str) -> Result<Skin, AssetError> {
    let layers = match name {
        "snake" => vec![
            [40, 140, 40],
            [52, 160, 48],
            [64, 178, 56],
            [78, 196, 64],
            [92, 210, 72],
            [78, 196, 64],
            [64, 178, 56],
            [52, 160, 48],
        ],
        "rival" => vec![
            [150, 90, 20],
            [170, 104, 26],
            [190, 118, 32],
            [210, 132, 40],
            [228, 148, 48],
            [210, 132, 40],
            [190, 118, 32],
            [170, 104, 26],
        ],
        "item" => vec![[120, 120, 130], [48, 52, 60]],
        other => return Err(AssetError::UnknownBuiltin(other.to_owned())),
    };
    Ok(Skin { layers })
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum LoadState {
    Pending,
    Ready,
    Failed,
}

#[derive(Debug)]
struct TextureSlot {
    url: String,
    skin: Skin,
    state: LoadState,
}

type LoadResult = (TextureHandle, Result<Skin, AssetError>);

/// Texture cache that loads file-backed skins on worker threads.
///
/// Results are picked up by [`TextureStore::poll`] between frames.
#[derive(Debug)]
pub struct TextureStore {
    slots: Vec<TextureSlot>,
    sender: Sender<LoadResult>,
    receiver: Receiver<LoadResult>,
}

impl Default for TextureStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TextureStore {
    #[must_use]
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            slots: Vec::new(),
            sender,
            receiver,
        }
    }

    /// Installs finished loads. Failures are logged and keep the placeholder.
    ///
    /// Returns how many textures changed state.
    pub fn poll(&mut self) -> usize {
        let mut settled = 0;
        loop {
            match self.receiver.try_recv() {
                Ok((handle, result)) => {
                    self.settle(handle, result);
                    settled += 1;
                }
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => break,
            }
        }
        settled
    }

    /// Skin to draw with for `handle`; the placeholder until loaded.
    #[must_use]
    pub fn skin(&self, handle: TextureHandle) -> Option<&Skin> {
        self.slots.get(handle.0 as usize).map(|slot| &slot.skin)
    }

    #[must_use]
    pub fn layer_color(&self, handle: TextureHandle, layer: u8) -> [u8; 3] {
        self.skin(handle)
            .map_or(PLACEHOLDER_COLOR, |skin| skin.layer(layer))
    }

    #[must_use]
    pub fn is_ready(&self, handle: TextureHandle) -> bool {
        self.slots
            .get(handle.0 as usize)
            .is_some_and(|slot| slot.state == LoadState::Ready)
    }

    #[must_use]
    pub fn is_pending(&self, handle: TextureHandle) -> bool {
        self.slots
            .get(handle.0 as usize)
            .is_some_and(|slot| slot.state == LoadState::Pending)
    }

    fn settle(&mut self, handle: TextureHandle, result: Result<Skin, AssetError>) {
        let Some(slot) = self.slots.get_mut(handle.0 as usize) else {
            return;
        };
        match result {
            Ok(skin) => {
                tracing::debug!(url = %slot.url, layers = skin.layers.len(), "texture loaded");
                slot.skin = skin;
                slot.state = LoadState::Ready;
            }
            Err(error) => {
                tracing::warn!(url = %slot.url, %error, "texture load failed, keeping placeholder");
                slot.state = LoadState::Failed;
            }
        }
    }
}

impl AssetLoader for TextureStore {
    fn load_texture(&mut self, url: &str) -> TextureHandle {
        if let Some(position) = self.slots.iter().position(|slot| slot.url == url) {
            return TextureHandle(position as u32);
        }

        let handle = TextureHandle(self.slots.len() as u32);
        self.slots.push(TextureSlot {
            url: url.to_owned(),
            skin: Skin::placeholder(),
            state: LoadState::Pending,
        });

        if let Some(name) = url.strip_prefix(BUILTIN_PREFIX) {
            let result = builtin_skin(name);
            self.settle(handle, result);
            return handle;
        }

        let sender = self.sender.clone();
        let url = url.to_owned();
        thread::spawn(move || {
            let result = fs::read_to_string(&url)
                .map_err(|source| AssetError::Io {
                    url: url.clone(),
                    source,
                })
                .and_then(|raw| Skin::from_json(&url, &raw));
            // The store may already be gone on shutdown.
            let _ = sender.send((handle, result));
        });

        handle
    }
}

//! Sound emitters and the listener
//!
//! An entity can own several sounds, addressed by the index returned from
//! [`Sounds::add`]. A sound slot is empty until its asset has loaded, and
//! playing an empty slot does nothing. Playback itself belongs to the audio
//! device; this manager only produces [`SoundCue`]s for it to consume.

use super::{Components, LoadOrders};
use glam::DVec3;
use kestrel_assets::{AssetKind, Sound, SoundHandle};
use kestrel_core::{EntityId, SparseStorage};
use std::sync::Arc;

/// Instruction for the audio device
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SoundCue {
    /// Start a sound at a world location
    Play { sound: SoundHandle, location: DVec3 },
    /// The listener moved
    Listener { location: DVec3 },
}

#[derive(Default)]
pub struct Sounds {
    storage: SparseStorage<Vec<Option<Arc<Sound>>>>,
    listener: Option<EntityId>,
    heard_at: Option<DVec3>,
    cues: Vec<SoundCue>,
}

impl Sounds {
    pub fn new() -> Self {
        Self::default()
    }

    /// Give an entity a sound, returning its index on that entity
    pub fn add(&mut self, entity: EntityId, name: &str, orders: &mut LoadOrders) -> usize {
        let index = match self.storage.get_mut(entity) {
            Some(slots) => {
                slots.push(None);
                slots.len() - 1
            }
            None => {
                self.storage.insert(entity, vec![None]);
                0
            }
        };
        orders.asset(AssetKind::Sound, name, entity, move |c: &mut Components, eid, asset| {
            if let Some(sound) = asset.as_sound() {
                c.sounds.resolve(eid, index, sound.clone());
            }
        });
        index
    }

    /// Fill a sound slot once its asset has loaded
    pub fn resolve(&mut self, entity: EntityId, index: usize, sound: Arc<Sound>) {
        match self.storage.get_mut(entity).and_then(|s| s.get_mut(index)) {
            Some(slot) => *slot = Some(sound),
            None => tracing::debug!(entity = %entity, index, "sound loaded for a removed emitter"),
        }
    }

    pub fn get(&self, entity: EntityId, index: usize) -> Option<&Arc<Sound>> {
        self.storage.get(entity)?.get(index)?.as_ref()
    }

    /// Number of sounds on an entity, loaded or not
    pub fn count(&self, entity: EntityId) -> usize {
        self.storage.get(entity).map_or(0, Vec::len)
    }

    pub fn is_playable(&self, entity: EntityId, index: usize) -> bool {
        self.get(entity, index).is_some()
    }

    /// Queue a sound to play at `location`
    ///
    /// Returns false if the sound does not exist or has not loaded yet.
    pub fn play(&mut self, entity: EntityId, index: usize, location: DVec3) -> bool {
        let Some(sound) = self.get(entity, index) else {
            tracing::debug!(entity = %entity, index, "sound not ready");
            return false;
        };
        self.cues.push(SoundCue::Play {
            sound: sound.handle,
            location,
        });
        true
    }

    pub fn listener(&self) -> Option<EntityId> {
        self.listener
    }

    /// Hear the world from `entity`
    pub fn set_listener(&mut self, entity: EntityId) {
        self.listener = Some(entity);
        self.heard_at = None;
    }

    /// Record the listener's location, queueing a cue if it changed
    pub fn reposition_listener(&mut self, location: DVec3) {
        if self.heard_at == Some(location) {
            return;
        }
        self.heard_at = Some(location);
        self.cues.push(SoundCue::Listener { location });
    }

    /// Take every cue queued since the last call
    pub fn drain_cues(&mut self) -> Vec<SoundCue> {
        std::mem::take(&mut self.cues)
    }

    pub fn dispose(&mut self, entity: EntityId) {
        self.storage.remove(entity);
        if self.listener == Some(entity) {
            self.listener = None;
            self.heard_at = None;
        }
    }
}

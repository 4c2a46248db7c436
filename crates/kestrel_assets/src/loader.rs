//! Threaded asset loading
//!
//! The loader is a producer/consumer pipeline:
//!
//! ```text
//!  request() ──► [request queue] ──► N workers ──► [result queue] ──► drain()
//!  main thread      bounded          import()         bounded        main thread
//! ```
//!
//! Workers only ever touch the two queues and the [`Importer`]. Everything
//! that needs a device or the [`Depot`] happens in [`Loader::drain`], which
//! must be called from the single thread that owns the [`Uploader`]. The
//! drain is time boxed so a flood of finished files cannot stall a frame.
//!
//! Each file moves from unrequested to loading to loaded (see
//! [`FileState`]). Requests for a file that is already loading are attached
//! to the in-flight load instead of reading the file again.

use crate::asset::{Asset, AssetId, AssetKind, Mesh, Shader, Sound, Texture};
use crate::data::AssetData;
use crate::depot::Depot;
use crate::error::{AssetError, Result};
use crate::font::Font;
use crate::importers::Importer;
use crate::upload::{MeshHandle, Uploader};
use kestrel_core::EntityId;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, SyncSender, TryRecvError, TrySendError};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Loader tuning
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Number of worker threads
    pub workers: usize,
    /// Files that may wait for a worker before submissions are held back
    pub request_capacity: usize,
    /// Finished files that may wait for a drain before workers block
    pub result_capacity: usize,
    /// Wall clock budget for one drain, in milliseconds
    pub drain_budget_ms: u64,
    /// Directory that file names are resolved against
    pub asset_dir: PathBuf,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            workers: 5,
            request_capacity: 256,
            result_capacity: 64,
            drain_budget_ms: 5,
            asset_dir: PathBuf::from("."),
        }
    }
}

impl LoaderConfig {
    pub fn drain_budget(&self) -> Duration {
        Duration::from_millis(self.drain_budget_ms)
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_asset_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.asset_dir = dir.into();
        self
    }

    pub fn with_drain_budget_ms(mut self, ms: u64) -> Self {
        self.drain_budget_ms = ms;
        self
    }

    pub fn with_request_capacity(mut self, capacity: usize) -> Self {
        self.request_capacity = capacity;
        self
    }
}

/// Load progress of a single file
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum FileState {
    /// Never requested, or released
    #[default]
    Unrequested,
    /// Queued or being read by a worker
    Loading,
    /// Read and drained, successfully or not
    Loaded,
}

/// Called once an asset is available
pub type AssetCallback<C> = Box<dyn FnOnce(&mut C, EntityId, &Asset)>;

/// Called once a glyph mesh has been generated
pub type GlyphCallback<C> = Box<dyn FnOnce(&mut C, EntityId, GlyphMesh)>;

/// Text typeset into an uploaded mesh
#[derive(Clone, Debug, PartialEq)]
pub struct GlyphMesh {
    /// The uploaded mesh. Not cached in the depot.
    pub mesh: Mesh,
    /// Text width in pixels
    pub width: u32,
    /// Text height in pixels
    pub height: u32,
}

/// What happened during one [`Loader::drain`]
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DrainStats {
    /// Finished files taken off the result queue
    pub batches: usize,
    /// Assets uploaded and cached
    pub uploaded: usize,
    /// Files or assets that failed to load or upload
    pub failed: usize,
    /// Callbacks invoked
    pub notified: usize,
    /// Glyph meshes generated
    pub deferred_resolved: usize,
    /// The drain stopped early because the time budget ran out
    pub budget_exhausted: bool,
}

impl DrainStats {
    /// True if the drain did nothing
    pub fn is_empty(&self) -> bool {
        *self == DrainStats::default()
    }
}

struct Waiter<C> {
    entity: EntityId,
    callback: AssetCallback<C>,
}

struct GlyphRequest<C> {
    entity: EntityId,
    font: String,
    text: String,
    wrap: u32,
    existing: Option<MeshHandle>,
    callback: GlyphCallback<C>,
}

/// A finished file handed back by a worker
struct LoadBatch {
    file: String,
    result: Result<Vec<AssetData>>,
}

/// Concurrent asset loader
///
/// `C` is the context handed to completion callbacks, typically the
/// component managers that asked for the assets.
pub struct Loader<C> {
    config: LoaderConfig,
    requests: Option<SyncSender<String>>,
    results: Receiver<LoadBatch>,
    workers: Vec<JoinHandle<()>>,
    files: FxHashMap<String, FileState>,
    waiting: FxHashMap<AssetId, SmallVec<[Waiter<C>; 2]>>,
    /// Requests for assets that were already cached when requested.
    ready: Vec<(AssetId, Waiter<C>)>,
    /// Files that did not fit in the request queue.
    backlog: VecDeque<String>,
    glyphs: Vec<GlyphRequest<C>>,
    in_flight: usize,
}

impl<C> Loader<C> {
    /// Start the worker pool
    pub fn new(config: LoaderConfig, importer: Arc<dyn Importer>) -> Result<Self> {
        let (request_tx, request_rx) = mpsc::sync_channel::<String>(config.request_capacity.max(1));
        let (result_tx, result_rx) = mpsc::sync_channel::<LoadBatch>(config.result_capacity.max(1));
        let request_rx = Arc::new(Mutex::new(request_rx));

        let count = config.workers.max(1);
        let mut workers = Vec::with_capacity(count);
        for id in 0..count {
            let requests = Arc::clone(&request_rx);
            let results = result_tx.clone();
            let importer = Arc::clone(&importer);
            let dir = config.asset_dir.clone();
            let handle = thread::Builder::new()
                .name(format!("kestrel-loader-{id}"))
                .spawn(move || worker_loop(id, requests, results, importer, dir))
                .map_err(AssetError::WorkerSpawn)?;
            workers.push(handle);
        }

        tracing::info!(workers = count, dir = %config.asset_dir.display(), "asset loader started");
        Ok(Self {
            config,
            requests: Some(request_tx),
            results: result_rx,
            workers,
            files: FxHashMap::default(),
            waiting: FxHashMap::default(),
            ready: Vec::new(),
            backlog: VecDeque::new(),
            glyphs: Vec::new(),
            in_flight: 0,
        })
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Ask for an asset on behalf of an entity
    ///
    /// The callback runs during a later [`drain`](Self::drain), never from
    /// inside this call. Assets that are already cached resolve on the next
    /// drain without a file read.
    pub fn request<F>(
        &mut self,
        depot: &Depot,
        kind: AssetKind,
        name: &str,
        entity: EntityId,
        callback: F,
    ) where
        F: FnOnce(&mut C, EntityId, &Asset) + 'static,
    {
        let id = AssetId::new(kind, name);
        let waiter = Waiter {
            entity,
            callback: Box::new(callback),
        };
        if depot.contains(id) {
            self.ready.push((id, waiter));
            return;
        }
        self.waiting.entry(id).or_default().push(waiter);
        self.ensure_loading(kind, name);
    }

    /// Ask for `text` to be typeset with `font` once the font is cached
    ///
    /// Replaces any glyph request still pending for the same entity. When
    /// `existing` is given the mesh data behind it is replaced instead of
    /// uploading a new mesh.
    pub fn request_glyphs<F>(
        &mut self,
        depot: &Depot,
        entity: EntityId,
        font: &str,
        text: &str,
        wrap: u32,
        existing: Option<MeshHandle>,
        callback: F,
    ) where
        F: FnOnce(&mut C, EntityId, GlyphMesh) + 'static,
    {
        self.glyphs.retain(|g| g.entity != entity);
        self.glyphs.push(GlyphRequest {
            entity,
            font: font.to_string(),
            text: text.to_string(),
            wrap,
            existing,
            callback: Box::new(callback),
        });
        if !depot.contains(AssetId::new(AssetKind::Font, font)) {
            self.ensure_loading(AssetKind::Font, font);
        }
    }

    /// Cache an asset built on this thread and notify its waiters now
    ///
    /// Returns the canonical cached asset, which is the earlier one if an
    /// asset of the same kind and name was already cached.
    pub fn store(&mut self, depot: &mut Depot, ctx: &mut C, asset: Asset) -> Asset {
        let id = asset.id();
        depot.cache(asset.clone());
        let canonical = depot.get(id).cloned().unwrap_or(asset);
        self.notify(id, &canonical, ctx);
        canonical
    }

    /// Process finished loads
    ///
    /// Uploads and caches every asset of each finished file in the order the
    /// importer produced them, then runs the callbacks waiting on them.
    /// Stops early once the configured budget is spent; the remaining files
    /// are picked up by the next drain. Must only be called from the thread
    /// that owns the uploader.
    pub fn drain(&mut self, depot: &mut Depot, uploader: &mut dyn Uploader, ctx: &mut C) -> DrainStats {
        let start = Instant::now();
        let budget = self.config.drain_budget();
        let mut stats = DrainStats::default();

        self.flush_backlog();

        for (id, waiter) in std::mem::take(&mut self.ready) {
            match depot.get(id).cloned() {
                Some(asset) => {
                    (waiter.callback)(ctx, waiter.entity, &asset);
                    stats.notified += 1;
                }
                None => {
                    // Evicted since it was requested.
                    self.waiting.entry(id).or_default().push(waiter);
                }
            }
        }

        loop {
            let batch = match self.results.try_recv() {
                Ok(batch) => batch,
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            };
            self.in_flight = self.in_flight.saturating_sub(1);
            stats.batches += 1;
            self.files.insert(batch.file.clone(), FileState::Loaded);

            match batch.result {
                Ok(records) => {
                    for record in records {
                        self.upload(record, &batch.file, depot, uploader, ctx, &mut stats);
                    }
                }
                Err(err) => {
                    tracing::error!(file = %batch.file, error = %err, "asset load failed");
                    stats.failed += 1;
                }
            }

            // Atlas textures held back by `ensure_loading` fall back to the png
            if let Some(name) = batch.file.strip_suffix(".fnt") {
                let texture = AssetId::new(AssetKind::Texture, name);
                if self.waiting.contains_key(&texture) && !depot.contains(texture) {
                    self.ensure_loading(AssetKind::Texture, name);
                }
            }

            if start.elapsed() > budget {
                stats.budget_exhausted = true;
                break;
            }
        }

        self.resolve_glyphs(depot, uploader, ctx, &mut stats);

        if !stats.is_empty() {
            tracing::debug!(
                batches = stats.batches,
                uploaded = stats.uploaded,
                failed = stats.failed,
                notified = stats.notified,
                glyphs = stats.deferred_resolved,
                budget_exhausted = stats.budget_exhausted,
                "loader drained"
            );
        }
        stats
    }

    /// Stop accepting work
    ///
    /// Idle workers exit once the request queue closes. Files already queued
    /// or being read may still finish and are drained as normal if `drain` is
    /// called again. Files still held back in the backlog are never read and
    /// go back to unrequested, along with glyph requests waiting on them.
    pub fn shutdown(&mut self) {
        if self.requests.take().is_none() {
            return;
        }
        let dropped: Vec<String> = self.backlog.drain(..).collect();
        for file in &dropped {
            self.files.remove(file);
        }
        self.in_flight = self.in_flight.saturating_sub(dropped.len());
        self.glyphs.retain(|g| {
            AssetKind::Font
                .file_name(&g.font)
                .map_or(true, |file| !dropped.contains(&file))
        });
        tracing::info!(
            workers = self.workers.len(),
            dropped = dropped.len(),
            "asset loader shut down"
        );
    }

    /// True once [`shutdown`](Self::shutdown) has been called
    pub fn is_shut_down(&self) -> bool {
        self.requests.is_none()
    }

    /// True if no file is loading and no request is waiting to be resolved
    pub fn is_idle(&self) -> bool {
        self.in_flight == 0 && self.backlog.is_empty() && self.ready.is_empty() && self.glyphs.is_empty()
    }

    /// Number of callbacks that have not run yet
    pub fn pending_requests(&self) -> usize {
        self.waiting.values().map(|w| w.len()).sum::<usize>() + self.ready.len() + self.glyphs.len()
    }

    /// Load state of a file
    pub fn file_state(&self, file: &str) -> FileState {
        self.files.get(file).copied().unwrap_or_default()
    }

    /// Forget that a file was loaded so the next request reads it again
    ///
    /// Has no effect on a file that is still loading.
    pub fn release(&mut self, file: &str) {
        if self.file_state(file) == FileState::Loaded {
            self.files.remove(file);
        }
    }

    fn ensure_loading(&mut self, kind: AssetKind, name: &str) {
        // Models are assembled on the main thread and arrive through `store`.
        let Some(file) = kind.file_name(name) else {
            return;
        };
        // A loaded file is only read again if the asset is missing from the
        // depot, which the caller has already checked.
        if self.file_state(&file) == FileState::Loading {
            return;
        }
        // A font file carries its own atlas, so the png is only read if the
        // font load does not produce the texture.
        if kind == AssetKind::Texture {
            let atlas = AssetKind::Font.file_name(name);
            if atlas.is_some_and(|f| self.file_state(&f) == FileState::Loading) {
                tracing::debug!(texture = %name, "waiting on font atlas");
                return;
            }
        }
        self.submit(file);
    }

    fn submit(&mut self, file: String) {
        let Some(requests) = &self.requests else {
            tracing::warn!(file = %file, "request after loader shutdown ignored");
            return;
        };
        self.files.insert(file.clone(), FileState::Loading);
        self.in_flight += 1;
        if !self.backlog.is_empty() {
            self.backlog.push_back(file);
            return;
        }
        match requests.try_send(file) {
            Ok(()) => {}
            Err(TrySendError::Full(file)) => self.backlog.push_back(file),
            Err(TrySendError::Disconnected(file)) => {
                tracing::error!(file = %file, "loader workers have exited");
                self.files.remove(&file);
                self.in_flight -= 1;
            }
        }
    }

    fn flush_backlog(&mut self) {
        let Some(requests) = &self.requests else {
            return;
        };
        while let Some(file) = self.backlog.pop_front() {
            match requests.try_send(file) {
                Ok(()) => {}
                Err(TrySendError::Full(file)) => {
                    self.backlog.push_front(file);
                    break;
                }
                Err(TrySendError::Disconnected(file)) => {
                    tracing::error!(file = %file, "loader workers have exited");
                    self.files.remove(&file);
                    self.in_flight = self.in_flight.saturating_sub(1);
                }
            }
        }
    }

    fn notify(&mut self, id: AssetId, asset: &Asset, ctx: &mut C) -> usize {
        let Some(waiters) = self.waiting.remove(&id) else {
            return 0;
        };
        let count = waiters.len();
        for waiter in waiters {
            (waiter.callback)(ctx, waiter.entity, asset);
        }
        count
    }

    fn upload(
        &mut self,
        record: AssetData,
        file: &str,
        depot: &mut Depot,
        uploader: &mut dyn Uploader,
        ctx: &mut C,
        stats: &mut DrainStats,
    ) {
        for result in convert(record, depot, uploader) {
            match result {
                Ok(asset) => {
                    let id = asset.id();
                    if !depot.contains(id) && depot.cache(asset) {
                        stats.uploaded += 1;
                    }
                    if let Some(canonical) = depot.get(id).cloned() {
                        stats.notified += self.notify(id, &canonical, ctx);
                    }
                }
                Err(err) => {
                    tracing::error!(file = %file, error = %err, "asset upload failed");
                    stats.failed += 1;
                }
            }
        }
    }

    fn resolve_glyphs(
        &mut self,
        depot: &Depot,
        uploader: &mut dyn Uploader,
        ctx: &mut C,
        stats: &mut DrainStats,
    ) {
        if self.glyphs.is_empty() {
            return;
        }
        let (ready, waiting): (Vec<_>, Vec<_>) = std::mem::take(&mut self.glyphs)
            .into_iter()
            .partition(|g| depot.font(&g.font).is_some());
        self.glyphs = waiting;

        for request in ready {
            let Some(font) = depot.font(&request.font) else {
                continue;
            };
            match typeset(&font, &request, uploader) {
                Ok(glyphs) => {
                    (request.callback)(ctx, request.entity, glyphs);
                    stats.deferred_resolved += 1;
                }
                Err(err) => {
                    tracing::error!(entity = %request.entity, font = %request.font, error = %err, "glyph mesh upload failed");
                    stats.failed += 1;
                }
            }
        }
    }
}

impl<C> Drop for Loader<C> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn typeset<C>(font: &Font, request: &GlyphRequest<C>, uploader: &mut dyn Uploader) -> Result<GlyphMesh> {
    let name = format!("{}:{}", font.name(), request.entity);
    let layout = font.typeset(&name, &request.text, request.wrap);
    let handle = match request.existing {
        Some(handle) => {
            uploader.update_mesh(handle, &layout.mesh)?;
            handle
        }
        None => uploader.upload_mesh(&layout.mesh)?,
    };
    Ok(GlyphMesh {
        mesh: Mesh {
            name,
            handle,
            vertex_count: layout.mesh.vertex_count(),
            index_count: layout.mesh.indices.len(),
        },
        width: layout.width,
        height: layout.height,
    })
}

/// Turn one imported record into uploaded assets
///
/// Assets already in the depot are passed through without a second upload.
fn convert(record: AssetData, depot: &Depot, uploader: &mut dyn Uploader) -> SmallVec<[Result<Asset>; 2]> {
    let mut out = SmallVec::new();
    match record {
        AssetData::Mesh(data) => out.push(cached_or(depot, AssetKind::Mesh, &data.name, || {
            let handle = uploader.upload_mesh(&data)?;
            Ok(Mesh {
                handle,
                vertex_count: data.vertex_count(),
                index_count: data.indices.len(),
                name: data.name.clone(),
            }
            .into())
        })),
        AssetData::Image(data) => out.push(upload_texture(depot, uploader, &data)),
        AssetData::Audio(data) => out.push(cached_or(depot, AssetKind::Sound, &data.name, || {
            let handle = uploader.upload_sound(&data)?;
            Ok(Sound {
                name: data.name.clone(),
                handle,
                channels: data.channels,
                sample_bits: data.sample_bits,
                frequency: data.frequency,
            }
            .into())
        })),
        AssetData::Shader(source) => out.push(cached_or(depot, AssetKind::Shader, &source.name, || {
            let handle = uploader.compile_shader(&source)?;
            Ok(Shader {
                name: source.name.clone(),
                handle,
            }
            .into())
        })),
        AssetData::FontAtlas(glyphs, image) => {
            out.push(Ok(Font::from_glyphs(glyphs).into()));
            out.push(upload_texture(depot, uploader, &image));
        }
        AssetData::Material(data) => out.push(Ok(crate::asset::Material::from(data).into())),
        AssetData::Animation(data) => out.push(Ok(crate::asset::Animation::from(data).into())),
    }
    out
}

fn upload_texture(depot: &Depot, uploader: &mut dyn Uploader, data: &crate::data::ImageData) -> Result<Asset> {
    cached_or(depot, AssetKind::Texture, &data.name, || {
        let handle = uploader.upload_texture(data)?;
        Ok(Texture {
            name: data.name.clone(),
            handle,
            width: data.width,
            height: data.height,
            opaque: data.is_opaque(),
        }
        .into())
    })
}

fn cached_or(
    depot: &Depot,
    kind: AssetKind,
    name: &str,
    upload: impl FnOnce() -> Result<Asset>,
) -> Result<Asset> {
    match depot.fetch(kind, name) {
        Some(asset) => Ok(asset.clone()),
        None => upload(),
    }
}

fn worker_loop(
    id: usize,
    requests: Arc<Mutex<Receiver<String>>>,
    results: SyncSender<LoadBatch>,
    importer: Arc<dyn Importer>,
    dir: PathBuf,
) {
    tracing::debug!(worker = id, "loader worker started");
    loop {
        let file = {
            let receiver = match requests.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            match receiver.recv() {
                Ok(file) => file,
                Err(_) => break,
            }
        };

        let result = importer.load(&dir.join(&file));
        if results.send(LoadBatch { file, result }).is_err() {
            break;
        }
    }
    tracing::debug!(worker = id, "loader worker stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{GlyphData, GlyphMap, ImageData, MeshData};
    use crate::upload::HeadlessUploader;
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Serves meshes and fonts from memory and counts reads
    #[derive(Default)]
    struct MemoryImporter {
        reads: AtomicUsize,
    }

    impl Importer for MemoryImporter {
        fn load(&self, path: &Path) -> Result<Vec<AssetData>> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            let name = crate::importers::asset_name(path);
            match path.extension().and_then(|e| e.to_str()) {
                Some("obj") if name == "broken" => Err(AssetError::parse("broken.obj", "bad face")),
                Some("obj") if name == "empty" => Ok(vec![AssetData::Mesh(MeshData::new(name))]),
                Some("obj") => {
                    let mut mesh = MeshData::new(name);
                    mesh.positions = vec![[0.0; 3], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]];
                    mesh.indices = vec![0, 1, 2];
                    Ok(vec![AssetData::Mesh(mesh)])
                }
                Some("fnt") if name == "broken" => Err(AssetError::parse("broken.fnt", "no glyphs")),
                Some("fnt") => Ok(vec![AssetData::FontAtlas(
                    GlyphMap {
                        name: name.clone(),
                        width: 16,
                        height: 16,
                        line_height: 10,
                        glyphs: vec![GlyphData {
                            ch: 'a',
                            width: 4,
                            height: 8,
                            x_advance: 5,
                            ..Default::default()
                        }],
                    },
                    ImageData {
                        name,
                        width: 16,
                        height: 16,
                        pixels: vec![255; 16 * 16 * 4],
                    },
                )]),
                _ => Err(AssetError::NotFound(path.display().to_string())),
            }
        }

        fn supported_extensions(&self) -> &[&str] {
            &["obj", "fnt"]
        }

        fn name(&self) -> &'static str {
            "memory"
        }
    }

    /// Records which entities were handed which assets
    #[derive(Default)]
    struct Received {
        assets: Vec<(EntityId, String)>,
        glyphs: Vec<(EntityId, u32)>,
    }

    struct Harness {
        importer: Arc<MemoryImporter>,
        loader: Loader<Received>,
        depot: Depot,
        uploader: HeadlessUploader,
        received: Received,
    }

    impl Harness {
        fn new(config: LoaderConfig) -> Self {
            let importer = Arc::new(MemoryImporter::default());
            let loader = Loader::new(config, importer.clone()).unwrap();
            Self {
                importer,
                loader,
                depot: Depot::new(),
                uploader: HeadlessUploader::new(),
                received: Received::default(),
            }
        }

        fn request(&mut self, kind: AssetKind, name: &str, entity: EntityId) {
            self.loader.request(&self.depot, kind, name, entity, |r: &mut Received, eid, asset| {
                r.assets.push((eid, asset.name().to_string()));
            });
        }

        fn drain(&mut self) -> DrainStats {
            self.loader
                .drain(&mut self.depot, &mut self.uploader, &mut self.received)
        }

        /// Drain until the loader is idle, returning accumulated stats
        fn drain_until_idle(&mut self) -> DrainStats {
            let deadline = Instant::now() + Duration::from_secs(5);
            let mut total = DrainStats::default();
            loop {
                let stats = self.drain();
                total.batches += stats.batches;
                total.uploaded += stats.uploaded;
                total.failed += stats.failed;
                total.notified += stats.notified;
                total.deferred_resolved += stats.deferred_resolved;
                if self.loader.is_idle() {
                    return total;
                }
                assert!(Instant::now() < deadline, "loader did not go idle");
                thread::sleep(Duration::from_millis(1));
            }
        }
    }

    fn eid(index: u32) -> EntityId {
        EntityId::new(index, 0)
    }

    #[test]
    fn test_config_defaults() {
        let config = LoaderConfig::default();
        assert_eq!(config.workers, 5);
        assert_eq!(config.drain_budget(), Duration::from_millis(5));
    }

    #[test]
    fn test_request_loads_and_notifies() {
        let mut h = Harness::new(LoaderConfig::default().with_workers(2));
        h.request(AssetKind::Mesh, "box", eid(1));
        assert_eq!(h.loader.file_state("box.obj"), FileState::Loading);
        assert_eq!(h.loader.pending_requests(), 1);

        let stats = h.drain_until_idle();
        assert_eq!(stats.batches, 1);
        assert_eq!(stats.uploaded, 1);
        assert_eq!(stats.notified, 1);
        assert_eq!(h.received.assets, vec![(eid(1), "box".to_string())]);
        assert_eq!(h.loader.file_state("box.obj"), FileState::Loaded);
        assert!(h.depot.mesh("box").is_some());
        assert_eq!(h.loader.pending_requests(), 0);
    }

    #[test]
    fn test_duplicate_requests_coalesce() {
        let mut h = Harness::new(LoaderConfig::default());
        h.request(AssetKind::Mesh, "box", eid(1));
        h.request(AssetKind::Mesh, "box", eid(2));

        h.drain_until_idle();
        assert_eq!(h.importer.reads.load(Ordering::SeqCst), 1);
        assert_eq!(h.uploader.meshes, 1);
        assert_eq!(h.received.assets.len(), 2);
        assert!(h.received.assets.contains(&(eid(1), "box".to_string())));
        assert!(h.received.assets.contains(&(eid(2), "box".to_string())));
    }

    #[test]
    fn test_cached_asset_resolves_without_read() {
        let mut h = Harness::new(LoaderConfig::default());
        h.request(AssetKind::Mesh, "box", eid(1));
        h.drain_until_idle();

        h.request(AssetKind::Mesh, "box", eid(3));
        assert!(h.received.assets.iter().all(|(e, _)| *e != eid(3)));
        let stats = h.drain();
        assert_eq!(stats.notified, 1);
        assert_eq!(stats.batches, 0);
        assert_eq!(h.importer.reads.load(Ordering::SeqCst), 1);
        assert_eq!(h.received.assets.last(), Some(&(eid(3), "box".to_string())));
    }

    #[test]
    fn test_load_failure_leaves_request_unresolved() {
        let mut h = Harness::new(LoaderConfig::default());
        h.request(AssetKind::Mesh, "broken", eid(1));

        let stats = h.drain_until_idle();
        assert_eq!(stats.failed, 1);
        assert!(h.received.assets.is_empty());
        assert_eq!(h.loader.pending_requests(), 1);
        assert_eq!(h.loader.file_state("broken.obj"), FileState::Loaded);
    }

    #[test]
    fn test_upload_failure_skips_asset() {
        let mut h = Harness::new(LoaderConfig::default());
        h.request(AssetKind::Mesh, "empty", eid(1));
        h.request(AssetKind::Mesh, "box", eid(2));

        let stats = h.drain_until_idle();
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.uploaded, 1);
        assert!(h.depot.mesh("empty").is_none());
        assert_eq!(h.received.assets, vec![(eid(2), "box".to_string())]);
    }

    #[test]
    fn test_font_atlas_yields_font_and_texture() {
        let mut h = Harness::new(LoaderConfig::default());
        h.request(AssetKind::Font, "mono", eid(1));
        h.request(AssetKind::Texture, "mono", eid(2));

        assert_eq!(h.loader.file_state("mono.png"), FileState::Unrequested);

        h.drain_until_idle();
        assert!(h.depot.font("mono").is_some());
        assert!(h.depot.texture("mono").unwrap().opaque);
        assert_eq!(h.received.assets.len(), 2);
        assert_eq!(h.importer.reads.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_failed_font_falls_back_to_png() {
        let mut h = Harness::new(LoaderConfig::default());
        h.request(AssetKind::Font, "broken", eid(1));
        h.request(AssetKind::Texture, "broken", eid(2));

        let stats = h.drain_until_idle();
        // The font fails, then the png is tried and is missing as well
        assert_eq!(stats.failed, 2);
        assert_eq!(h.importer.reads.load(Ordering::SeqCst), 2);
        assert_eq!(h.loader.file_state("broken.png"), FileState::Loaded);
    }

    #[test]
    fn test_drain_stops_when_budget_spent() {
        let mut h = Harness::new(LoaderConfig::default().with_drain_budget_ms(0));
        for i in 0..4 {
            h.request(AssetKind::Mesh, &format!("box{i}"), eid(i + 1));
        }
        let deadline = Instant::now() + Duration::from_secs(5);
        while h.importer.reads.load(Ordering::SeqCst) < 4 {
            assert!(Instant::now() < deadline, "workers did not read every file");
            thread::sleep(Duration::from_millis(1));
        }
        thread::sleep(Duration::from_millis(20));

        let stats = h.drain();
        assert!(stats.budget_exhausted);
        assert_eq!(stats.batches, 1);
        assert_eq!(h.received.assets.len(), 1);
        assert!(!h.loader.is_idle());

        // Deferred files arrive on later drains
        let rest = h.drain_until_idle();
        assert_eq!(rest.batches, 3);
        assert_eq!(h.received.assets.len(), 4);
        assert_eq!(h.importer.reads.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn test_glyphs_wait_for_font() {
        let mut h = Harness::new(LoaderConfig::default());
        h.loader.request_glyphs(&h.depot, eid(4), "mono", "aa", 0, None, |r: &mut Received, e, g| {
            r.glyphs.push((e, g.width));
        });
        assert_eq!(h.loader.file_state("mono.fnt"), FileState::Loading);

        let stats = h.drain_until_idle();
        assert_eq!(stats.deferred_resolved, 1);
        assert_eq!(h.received.glyphs, vec![(eid(4), 10)]);
        assert_eq!(h.uploader.meshes, 1);
        // Generated meshes are not cached.
        assert_eq!(h.depot.stats().count(AssetKind::Mesh), 0);

        h.loader.request_glyphs(&h.depot, eid(4), "mono", "a", 0, Some(MeshHandle(1)), |r: &mut Received, e, g| {
            r.glyphs.push((e, g.width));
        });
        h.drain();
        assert_eq!(h.uploader.mesh_updates, 1);
        assert_eq!(h.received.glyphs.last(), Some(&(eid(4), 5)));
    }

    #[test]
    fn test_backlog_when_queue_full() {
        let mut h = Harness::new(LoaderConfig::default().with_workers(1).with_request_capacity(1));
        for i in 0..6 {
            h.request(AssetKind::Mesh, &format!("box{i}"), eid(i + 1));
        }
        let stats = h.drain_until_idle();
        assert_eq!(stats.batches, 6);
        assert_eq!(h.received.assets.len(), 6);
        assert_eq!(h.importer.reads.load(Ordering::SeqCst), 6);
    }

    #[test]
    fn test_store_notifies_immediately() {
        let mut h = Harness::new(LoaderConfig::default());
        h.request(AssetKind::Material, "red", eid(7));

        let asset = Asset::from(crate::asset::Material {
            name: "red".into(),
            color: [1.0, 0.0, 0.0, 1.0],
            metallic: 0.0,
            roughness: 1.0,
        });
        let canonical = h.loader.store(&mut h.depot, &mut h.received, asset.clone());
        assert!(canonical.ptr_eq(&asset));
        assert_eq!(h.received.assets, vec![(eid(7), "red".to_string())]);
    }

    #[test]
    fn test_release_allows_reload() {
        let mut h = Harness::new(LoaderConfig::default());
        h.request(AssetKind::Mesh, "box", eid(1));
        h.drain_until_idle();

        h.depot.remove(AssetKind::Mesh, "box");
        h.loader.release("box.obj");
        assert_eq!(h.loader.file_state("box.obj"), FileState::Unrequested);

        h.request(AssetKind::Mesh, "box", eid(2));
        h.drain_until_idle();
        assert_eq!(h.importer.reads.load(Ordering::SeqCst), 2);
        assert!(h.depot.mesh("box").is_some());
    }

    #[test]
    fn test_shutdown_releases_backlog() {
        let mut h = Harness::new(LoaderConfig::default().with_workers(1).with_request_capacity(1));
        for i in 0..6 {
            h.request(AssetKind::Mesh, &format!("box{i}"), eid(i + 1));
        }
        h.loader.request_glyphs(&h.depot, eid(9), "mono", "a", 0, None, |r: &mut Received, e, g| {
            r.glyphs.push((e, g.width));
        });
        h.loader.shutdown();

        // Whatever reached a worker finishes, the rest is never read
        h.drain_until_idle();
        let mut loaded = 0;
        for i in 0..6 {
            match h.loader.file_state(&format!("box{i}.obj")) {
                FileState::Loaded => loaded += 1,
                FileState::Unrequested => {}
                FileState::Loading => panic!("box{i}.obj still loading"),
            }
        }
        assert_eq!(h.received.assets.len(), loaded);
        let font_read = match h.loader.file_state("mono.fnt") {
            FileState::Loaded => 1,
            FileState::Unrequested => 0,
            FileState::Loading => panic!("mono.fnt still loading"),
        };
        assert_eq!(h.importer.reads.load(Ordering::SeqCst), loaded + font_read);
        assert!(h.loader.is_idle());
    }

    #[test]
    fn test_shutdown() {
        let mut h = Harness::new(LoaderConfig::default());
        h.loader.shutdown();
        assert!(h.loader.is_shut_down());

        h.request(AssetKind::Mesh, "box", eid(1));
        assert_eq!(h.loader.file_state("box.obj"), FileState::Unrequested);
        assert!(h.drain().is_empty());
        assert!(h.loader.is_idle());
    }
}

//! Typed asset records resolved out of a parsed container.
//!
//! The graph is built in one synchronous pass and is read-only afterwards.
//! Cross-references that fail to resolve mark the owning asset and push a
//! [`LoadIssue`] rather than aborting: only container-level inconsistency
//! is fatal.

use std::collections::HashSet;

use gmdata::{GameData, StringRef};
use serde::Serialize;
use tracing::warn;

use crate::error::Result;

/// Game-level metadata from the GEN8 chunk.
#[derive(Debug, Clone, Serialize)]
pub struct GameInfo {
    pub name: String,
    pub game_id: u32,
    pub version: (u32, u32, u32, u32),
    pub window_width: u32,
    pub window_height: u32,
}

/// A texture page header. Pixels are decoded elsewhere; the graph only
/// carries the dimensions read from the PNG header, for region checks.
#[derive(Debug, Clone, Serialize)]
pub struct PageRecord {
    pub dimensions: Option<(u32, u32)>,
}

/// A texture-page region, validated against its page's header dimensions.
#[derive(Debug, Clone, Serialize)]
pub struct RegionRecord {
    pub source_x: u16,
    pub source_y: u16,
    pub source_width: u16,
    pub source_height: u16,
    pub target_x: u16,
    pub target_y: u16,
    pub target_width: u16,
    pub target_height: u16,
    pub bounds_width: u16,
    pub bounds_height: u16,
    pub page: usize,
    /// False when the source rect fails containment or the page is unknown.
    pub available: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct SpriteRecord {
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub origin_x: i32,
    pub origin_y: i32,
    /// Region indices, one per declared frame. `None` marks a frame whose
    /// region reference never resolved.
    pub frames: Vec<Option<usize>>,
    /// Nominal playback rate in frames per second. This container
    /// generation carries no per-sprite rate, so every sprite gets the
    /// engine default.
    pub playback_rate: f32,
}

/// Detected container format of an audio payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AudioFormat {
    Ogg,
    Wav,
    Mp3,
    Unknown,
}

impl AudioFormat {
    /// Sniff the format from the payload's leading bytes.
    pub fn sniff(payload: &[u8]) -> Self {
        if payload.starts_with(b"OggS") {
            Self::Ogg
        } else if payload.starts_with(b"RIFF") {
            Self::Wav
        } else if payload.starts_with(b"ID3") || payload.starts_with(&[0xFF, 0xFB]) {
            Self::Mp3
        } else {
            Self::Unknown
        }
    }
}

/// Where a sound's samples live.
#[derive(Debug, Clone, Serialize)]
pub enum SoundPayload {
    /// Index into the AUDO chunk, with the sniffed format.
    Embedded { index: usize, format: AudioFormat },
    /// Streamed from a file next to the container.
    External,
}

#[derive(Debug, Clone, Serialize)]
pub struct SoundRecord {
    pub name: String,
    pub kind: Option<String>,
    pub file: Option<String>,
    pub volume: f32,
    pub pitch: f32,
    pub audio_group: i32,
    pub payload: SoundPayload,
}

#[derive(Debug, Clone, Serialize)]
pub struct BackgroundRecord {
    pub name: String,
    pub region: Option<usize>,
    pub transparent: bool,
    pub smooth: bool,
    pub tile_width: u32,
    pub tile_height: u32,
    pub tile_columns: u32,
    pub tiling_flags: u32,
}

impl BackgroundRecord {
    pub fn is_tileset(&self) -> bool {
        self.tile_width > 0 && self.tile_height > 0
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ObjectRecord {
    pub name: String,
    pub sprite: Option<usize>,
    pub visible: bool,
    pub solid: bool,
    pub depth: i32,
    pub persistent: bool,
    pub parent: Option<usize>,
    pub mask: Option<usize>,
    pub uses_physics: bool,
    pub is_sensor: bool,
    pub shape: i32,
    pub density: f32,
    pub restitution: f32,
    pub friction: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct RoomBackgroundRecord {
    pub visible: bool,
    pub foreground: bool,
    pub background: Option<usize>,
    pub x: i32,
    pub y: i32,
    pub tile_h: bool,
    pub tile_v: bool,
    pub stretch: bool,
    pub depth: i32,
}

#[derive(Debug, Clone, Serialize)]
pub struct TileLayerRecord {
    pub background: Option<usize>,
    pub depth: i32,
    pub x: i32,
    pub y: i32,
    pub grid_width: u32,
    pub grid_height: u32,
    /// Row-major tile ids, −1 marking an empty cell.
    pub cells: Vec<i32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InstanceRecord {
    pub x: i32,
    pub y: i32,
    pub object: Option<usize>,
    pub instance_id: u32,
    pub scale_x: f32,
    pub scale_y: f32,
    pub color: u32,
    pub rotation: f32,
    /// Position in the room's flattened declaration order; the
    /// compositor's tie-break for equal depth.
    pub order: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct RoomRecord {
    pub name: String,
    pub caption: String,
    pub width: u32,
    pub height: u32,
    pub speed: u32,
    pub persistent: bool,
    /// 0xAARRGGBB.
    pub background_color: u32,
    pub draw_background_color: bool,
    pub backgrounds: Vec<RoomBackgroundRecord>,
    pub tile_layers: Vec<TileLayerRecord>,
    /// Flattened across instance layers, declaration order preserved.
    pub instances: Vec<InstanceRecord>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GlyphRecord {
    pub character: u16,
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
    pub shift: i16,
    pub offset: i16,
}

#[derive(Debug, Clone, Serialize)]
pub struct FontRecord {
    pub name: String,
    pub display_name: String,
    pub size: f32,
    pub bold: bool,
    pub italic: bool,
    pub range_start: u16,
    pub range_end: u16,
    pub region: Option<usize>,
    pub scale_x: f32,
    pub scale_y: f32,
    pub glyphs: Vec<GlyphRecord>,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct PathPointRecord {
    pub x: f32,
    pub y: f32,
    pub speed: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct PathRecord {
    pub name: String,
    pub smooth: bool,
    pub closed: bool,
    pub precision: u32,
    pub points: Vec<PathPointRecord>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScriptRecord {
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ShaderRecord {
    pub name: String,
    pub shader_type: Option<String>,
    pub vertex_source: Option<String>,
    pub fragment_source: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TimelineRecord {
    pub name: String,
    pub moment_count: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExtensionRecord {
    pub name: String,
    pub class_name: Option<String>,
}

/// A non-fatal problem found while resolving the graph.
#[derive(Debug, Clone, Serialize)]
pub enum LoadIssue {
    /// A name reference did not resolve; a fallback name was substituted.
    UnresolvedName { asset: String },
    /// A TPAG address referenced by an asset has no matching region.
    UnresolvedRegion { asset: String, address: u32 },
    /// A region's source rect falls outside its page's declared bounds.
    RegionOutOfBounds { region: usize, page: usize },
    /// An index reference points past the end of its target table.
    IndexOutOfRange { asset: String, index: i32 },
    /// A sound's audio id points past the end of the AUDO chunk.
    MissingAudio { asset: String, audio_id: i32 },
    /// Object parent links loop back on themselves.
    ParentCycle { object: usize },
}

/// The resolved asset graph for one loaded container.
#[derive(Debug, Serialize)]
pub struct AssetGraph {
    pub info: GameInfo,
    pub pages: Vec<PageRecord>,
    pub regions: Vec<RegionRecord>,
    pub sprites: Vec<SpriteRecord>,
    pub sounds: Vec<SoundRecord>,
    pub backgrounds: Vec<BackgroundRecord>,
    pub objects: Vec<ObjectRecord>,
    pub rooms: Vec<RoomRecord>,
    pub fonts: Vec<FontRecord>,
    pub paths: Vec<PathRecord>,
    pub scripts: Vec<ScriptRecord>,
    pub shaders: Vec<ShaderRecord>,
    pub timelines: Vec<TimelineRecord>,
    pub extensions: Vec<ExtensionRecord>,
    pub issues: Vec<LoadIssue>,
}

/// Default playback rate for this container generation (no per-sprite
/// rate is stored on disk).
pub const DEFAULT_PLAYBACK_RATE: f32 = 15.0;

impl AssetGraph {
    /// Resolve every asset chunk of `game` into typed records.
    ///
    /// GEN8 and STRG are required; every asset chunk is optional and an
    /// absent chunk simply yields an empty table.
    pub fn build(game: &GameData) -> Result<Self> {
        let mut b = Builder {
            game,
            issues: Vec::new(),
        };
        let info = b.game_info()?;
        let pages = b.pages()?;
        let (regions, region_index) = b.regions(&pages)?;
        let sprites = b.sprites(&region_index)?;
        let sounds = b.sounds()?;
        let backgrounds = b.backgrounds(&region_index)?;
        let objects = b.objects(&sprites)?;
        let rooms = b.rooms(&backgrounds, &objects)?;
        let fonts = b.fonts(&region_index)?;
        let paths = b.paths()?;
        let scripts = b.scripts()?;
        let shaders = b.shaders()?;
        let timelines = b.timelines()?;
        let extensions = b.extensions()?;

        Ok(Self {
            info,
            pages,
            regions,
            sprites,
            sounds,
            backgrounds,
            objects,
            rooms,
            fonts,
            paths,
            scripts,
            shaders,
            timelines,
            extensions,
            issues: b.issues,
        })
    }

    /// The parent chain of an object, nearest ancestor first.
    ///
    /// Parent links are supposed to form a tree; a cycle in the input is
    /// broken at the first revisited index.
    pub fn ancestors(&self, object: usize) -> Vec<usize> {
        let mut chain = Vec::new();
        let mut seen = HashSet::new();
        seen.insert(object);
        let mut current = object;
        while let Some(parent) = self.objects.get(current).and_then(|o| o.parent) {
            if !seen.insert(parent) {
                warn!(object, "object parent chain loops, breaking");
                break;
            }
            chain.push(parent);
            current = parent;
        }
        chain
    }
}

/// Region-address → region-index map, carried through graph construction.
type RegionIndex = std::collections::HashMap<u32, usize>;

struct Builder<'a> {
    game: &'a GameData,
    issues: Vec<LoadIssue>,
}

impl Builder<'_> {
    fn game_info(&mut self) -> Result<GameInfo> {
        let gen8 = self.game.gen8()?;
        // STRG is required even if GEN8's name fails to resolve.
        self.game.strings()?;
        let name = self.name(gen8.name, "game", 0);
        Ok(GameInfo {
            name,
            game_id: gen8.game_id,
            version: (gen8.major, gen8.minor, gen8.release, gen8.build),
            window_width: gen8.window_width,
            window_height: gen8.window_height,
        })
    }

    /// Resolve a name reference, falling back to `{prefix}_{index}`.
    fn name(&mut self, sref: StringRef, prefix: &str, index: usize) -> String {
        match self.game.resolve_string(sref) {
            Ok(s) => s.to_owned(),
            Err(_) => {
                let fallback = format!("{prefix}_{index}");
                warn!(asset = %fallback, "name reference did not resolve");
                self.issues.push(LoadIssue::UnresolvedName {
                    asset: fallback.clone(),
                });
                fallback
            }
        }
    }

    /// Resolve an optional string reference (null means absent).
    fn optional_string(&mut self, sref: StringRef) -> Option<String> {
        if sref.is_null() {
            return None;
        }
        self.game.resolve_string(sref).ok().map(str::to_owned)
    }

    fn pages(&mut self) -> Result<Vec<PageRecord>> {
        let Some(txtr) = self.game.txtr()? else {
            return Ok(Vec::new());
        };
        Ok(txtr
            .pages
            .iter()
            .map(|p| PageRecord {
                dimensions: p.dimensions,
            })
            .collect())
    }

    fn regions(&mut self, pages: &[PageRecord]) -> Result<(Vec<RegionRecord>, RegionIndex)> {
        let Some(tpag) = self.game.tpag()? else {
            return Ok((Vec::new(), RegionIndex::new()));
        };
        let mut records = Vec::with_capacity(tpag.regions.len());
        for (i, r) in tpag.regions.iter().enumerate() {
            let page = r.page_id as usize;
            // Containment is checked against the page's header dimensions,
            // before any pixel decode happens.
            let available = match pages.get(page).and_then(|p| p.dimensions) {
                Some((pw, ph)) => {
                    let fits = u32::from(r.source_x) + u32::from(r.source_width) <= pw
                        && u32::from(r.source_y) + u32::from(r.source_height) <= ph;
                    if !fits {
                        warn!(region = i, page, "source rect outside page bounds");
                        self.issues.push(LoadIssue::RegionOutOfBounds { region: i, page });
                    }
                    fits
                }
                None => {
                    self.issues.push(LoadIssue::RegionOutOfBounds { region: i, page });
                    false
                }
            };
            records.push(RegionRecord {
                source_x: r.source_x,
                source_y: r.source_y,
                source_width: r.source_width,
                source_height: r.source_height,
                target_x: r.target_x,
                target_y: r.target_y,
                target_width: r.target_width,
                target_height: r.target_height,
                bounds_width: r.bounds_width,
                bounds_height: r.bounds_height,
                page,
                available,
            });
        }
        let index = tpag.address_index().clone();
        Ok((records, index))
    }

    fn sprites(&mut self, regions: &RegionIndex) -> Result<Vec<SpriteRecord>> {
        let Some(sprt) = self.game.sprt()? else {
            return Ok(Vec::new());
        };
        let mut records = Vec::with_capacity(sprt.sprites.len());
        for (i, s) in sprt.sprites.iter().enumerate() {
            let name = self.name(s.name, "sprite", i);
            let mut frames = Vec::with_capacity(s.frame_addresses.len());
            for &addr in &s.frame_addresses {
                let region = regions.get(&addr).copied();
                if region.is_none() {
                    self.issues.push(LoadIssue::UnresolvedRegion {
                        asset: name.clone(),
                        address: addr,
                    });
                }
                frames.push(region);
            }
            records.push(SpriteRecord {
                name,
                width: s.width,
                height: s.height,
                origin_x: s.origin_x,
                origin_y: s.origin_y,
                frames,
                playback_rate: DEFAULT_PLAYBACK_RATE,
            });
        }
        Ok(records)
    }

    fn sounds(&mut self) -> Result<Vec<SoundRecord>> {
        let Some(sond) = self.game.sond()? else {
            return Ok(Vec::new());
        };
        let audo_len = self.game.audo()?.map_or(0, |a| a.len());
        let mut records = Vec::with_capacity(sond.sounds.len());
        for (i, s) in sond.sounds.iter().enumerate() {
            let name = self.name(s.name, "sound", i);
            let payload = if s.audio_id < 0 {
                SoundPayload::External
            } else {
                let index = s.audio_id as usize;
                if index >= audo_len {
                    self.issues.push(LoadIssue::MissingAudio {
                        asset: name.clone(),
                        audio_id: s.audio_id,
                    });
                    SoundPayload::External
                } else {
                    let format = self
                        .game
                        .audo()?
                        .and_then(|a| a.payload(index, self.game.data()))
                        .map_or(AudioFormat::Unknown, AudioFormat::sniff);
                    SoundPayload::Embedded { index, format }
                }
            };
            records.push(SoundRecord {
                name,
                kind: self.optional_string(s.kind),
                file: self.optional_string(s.file),
                volume: s.volume,
                pitch: s.pitch,
                audio_group: s.audio_group,
                payload,
            });
        }
        Ok(records)
    }

    fn backgrounds(&mut self, regions: &RegionIndex) -> Result<Vec<BackgroundRecord>> {
        let Some(bgnd) = self.game.bgnd()? else {
            return Ok(Vec::new());
        };
        let mut records = Vec::with_capacity(bgnd.backgrounds.len());
        for (i, b) in bgnd.backgrounds.iter().enumerate() {
            let name = self.name(b.name, "background", i);
            let region = regions.get(&b.region_address).copied();
            if region.is_none() {
                self.issues.push(LoadIssue::UnresolvedRegion {
                    asset: name.clone(),
                    address: b.region_address,
                });
            }
            records.push(BackgroundRecord {
                name,
                region,
                transparent: b.transparent,
                smooth: b.smooth,
                tile_width: b.tile_width,
                tile_height: b.tile_height,
                tile_columns: b.tile_columns,
                tiling_flags: b.tiling_flags,
            });
        }
        Ok(records)
    }

    /// Clamp an i32 table reference: −1 means absent, out-of-range is an
    /// issue and maps to absent.
    fn table_ref(&mut self, asset: &str, index: i32, len: usize) -> Option<usize> {
        if index < 0 {
            return None;
        }
        let i = index as usize;
        if i >= len {
            self.issues.push(LoadIssue::IndexOutOfRange {
                asset: asset.to_owned(),
                index,
            });
            return None;
        }
        Some(i)
    }

    fn objects(&mut self, sprites: &[SpriteRecord]) -> Result<Vec<ObjectRecord>> {
        let Some(objt) = self.game.objt()? else {
            return Ok(Vec::new());
        };
        let object_count = objt.objects.len();
        let mut records = Vec::with_capacity(object_count);
        for (i, o) in objt.objects.iter().enumerate() {
            let name = self.name(o.name, "object", i);
            let sprite = self.table_ref(&name, o.sprite_index, sprites.len());
            let parent = self.table_ref(&name, o.parent_index, object_count);
            let mask = self.table_ref(&name, o.mask_index, sprites.len());
            records.push(ObjectRecord {
                name,
                sprite,
                visible: o.visible,
                solid: o.solid,
                depth: o.depth,
                persistent: o.persistent,
                parent,
                mask,
                uses_physics: o.uses_physics,
                is_sensor: o.is_sensor,
                shape: o.shape,
                density: o.density,
                restitution: o.restitution,
                friction: o.friction,
            });
        }
        // Self-parenting is the degenerate cycle; deeper loops are broken
        // lazily by `ancestors`, but flag the obvious case at load.
        for (i, r) in records.iter().enumerate() {
            if r.parent == Some(i) {
                self.issues.push(LoadIssue::ParentCycle { object: i });
            }
        }
        Ok(records)
    }

    fn rooms(
        &mut self,
        backgrounds: &[BackgroundRecord],
        objects: &[ObjectRecord],
    ) -> Result<Vec<RoomRecord>> {
        let Some(room) = self.game.room()? else {
            return Ok(Vec::new());
        };
        let mut records = Vec::with_capacity(room.rooms.len());
        for (i, r) in room.rooms.iter().enumerate() {
            let name = self.name(r.name, "room", i);
            let caption = self.optional_string(r.caption).unwrap_or_default();

            let background_layers = r
                .backgrounds
                .iter()
                .map(|l| RoomBackgroundRecord {
                    visible: l.visible,
                    foreground: l.foreground,
                    background: self.table_ref(&name, l.background_index, backgrounds.len()),
                    x: l.x,
                    y: l.y,
                    tile_h: l.tile_h,
                    tile_v: l.tile_v,
                    stretch: l.stretch,
                    depth: l.depth,
                })
                .collect();

            let tile_layers = r
                .tile_layers
                .iter()
                .map(|l| TileLayerRecord {
                    background: self.table_ref(&name, l.background_index, backgrounds.len()),
                    depth: l.depth,
                    x: l.x,
                    y: l.y,
                    grid_width: l.grid_width,
                    grid_height: l.grid_height,
                    cells: l.cells.clone(),
                })
                .collect();

            let mut instances = Vec::new();
            for layer in &r.instance_layers {
                for inst in &layer.instances {
                    let order = instances.len();
                    instances.push(InstanceRecord {
                        x: inst.x,
                        y: inst.y,
                        object: self.table_ref(&name, inst.object_index, objects.len()),
                        instance_id: inst.instance_id,
                        scale_x: inst.scale_x,
                        scale_y: inst.scale_y,
                        color: inst.color,
                        rotation: inst.rotation,
                        order,
                    });
                }
            }

            records.push(RoomRecord {
                name,
                caption,
                width: r.width,
                height: r.height,
                speed: r.speed,
                persistent: r.persistent,
                background_color: r.background_color,
                draw_background_color: r.draw_background_color,
                backgrounds: background_layers,
                tile_layers,
                instances,
            });
        }
        Ok(records)
    }

    fn fonts(&mut self, regions: &RegionIndex) -> Result<Vec<FontRecord>> {
        let Some(font) = self.game.font()? else {
            return Ok(Vec::new());
        };
        let mut records = Vec::with_capacity(font.fonts.len());
        for (i, f) in font.fonts.iter().enumerate() {
            let name = self.name(f.name, "font", i);
            let region = regions.get(&f.region_address).copied();
            if region.is_none() {
                self.issues.push(LoadIssue::UnresolvedRegion {
                    asset: name.clone(),
                    address: f.region_address,
                });
            }
            records.push(FontRecord {
                name,
                display_name: self.optional_string(f.display_name).unwrap_or_default(),
                size: f.size,
                bold: f.bold,
                italic: f.italic,
                range_start: f.range_start,
                range_end: f.range_end,
                region,
                scale_x: f.scale_x,
                scale_y: f.scale_y,
                glyphs: f
                    .glyphs
                    .iter()
                    .map(|g| GlyphRecord {
                        character: g.character,
                        x: g.x,
                        y: g.y,
                        width: g.width,
                        height: g.height,
                        shift: g.shift,
                        offset: g.offset,
                    })
                    .collect(),
            });
        }
        Ok(records)
    }

    fn paths(&mut self) -> Result<Vec<PathRecord>> {
        let Some(path) = self.game.path()? else {
            return Ok(Vec::new());
        };
        let mut records = Vec::with_capacity(path.paths.len());
        for (i, p) in path.paths.iter().enumerate() {
            records.push(PathRecord {
                name: self.name(p.name, "path", i),
                smooth: p.smooth,
                closed: p.closed,
                precision: p.precision,
                points: p
                    .points
                    .iter()
                    .map(|pt| PathPointRecord {
                        x: pt.x,
                        y: pt.y,
                        speed: pt.speed,
                    })
                    .collect(),
            });
        }
        Ok(records)
    }

    fn scripts(&mut self) -> Result<Vec<ScriptRecord>> {
        let Some(scpt) = self.game.scpt()? else {
            return Ok(Vec::new());
        };
        let mut records = Vec::with_capacity(scpt.scripts.len());
        for (i, s) in scpt.scripts.iter().enumerate() {
            records.push(ScriptRecord {
                name: self.name(s.name, "script", i),
            });
        }
        Ok(records)
    }

    fn shaders(&mut self) -> Result<Vec<ShaderRecord>> {
        let Some(shdr) = self.game.shdr()? else {
            return Ok(Vec::new());
        };
        let mut records = Vec::with_capacity(shdr.shaders.len());
        for (i, s) in shdr.shaders.iter().enumerate() {
            records.push(ShaderRecord {
                name: self.name(s.name, "shader", i),
                shader_type: self.optional_string(s.shader_type),
                vertex_source: self.optional_string(s.vertex_source),
                fragment_source: self.optional_string(s.fragment_source),
            });
        }
        Ok(records)
    }

    fn timelines(&mut self) -> Result<Vec<TimelineRecord>> {
        let Some(tmln) = self.game.tmln()? else {
            return Ok(Vec::new());
        };
        let mut records = Vec::with_capacity(tmln.timelines.len());
        for (i, t) in tmln.timelines.iter().enumerate() {
            records.push(TimelineRecord {
                name: self.name(t.name, "timeline", i),
                moment_count: t.moment_count,
            });
        }
        Ok(records)
    }

    fn extensions(&mut self) -> Result<Vec<ExtensionRecord>> {
        let Some(extn) = self.game.extn()? else {
            return Ok(Vec::new());
        };
        let mut records = Vec::with_capacity(extn.extensions.len());
        for (i, e) in extn.extensions.iter().enumerate() {
            records.push(ExtensionRecord {
                name: self.name(e.name, "extension", i),
                class_name: self.optional_string(e.class_name),
            });
        }
        Ok(records)
    }
}

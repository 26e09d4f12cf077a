//! Synthetic container assembly for integration tests.
//!
//! Builds a minimal but wire-accurate data.win in memory: real FORM
//! envelope, real pointer lists with backpatched absolute offsets, and
//! real PNG payloads encoded through the `image` crate.
#![allow(dead_code)]

use gmdata::cursor::Writer;
use image::{Rgba, RgbaImage};

pub struct RoomSpec {
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub background_color: u32,
    pub draw_background_color: bool,
    pub backgrounds: Vec<RoomBgSpec>,
    pub tile_layers: Vec<TileLayerSpec>,
    pub instances: Vec<InstanceSpec>,
}

impl RoomSpec {
    pub fn new(name: &str, width: u32, height: u32) -> Self {
        Self {
            name: name.to_owned(),
            width,
            height,
            background_color: 0,
            draw_background_color: false,
            backgrounds: Vec::new(),
            tile_layers: Vec::new(),
            instances: Vec::new(),
        }
    }
}

pub struct RoomBgSpec {
    pub background: i32,
    pub foreground: bool,
    pub x: i32,
    pub y: i32,
    pub tile_h: bool,
    pub tile_v: bool,
    pub depth: i32,
}

pub struct TileLayerSpec {
    pub background: i32,
    pub depth: i32,
    pub x: i32,
    pub y: i32,
    pub grid_width: u32,
    pub grid_height: u32,
    pub cells: Vec<i32>,
}

pub struct InstanceSpec {
    pub x: i32,
    pub y: i32,
    pub object: i32,
    pub scale_x: f32,
    pub scale_y: f32,
    pub rotation: f32,
}

impl InstanceSpec {
    pub fn at(x: i32, y: i32, object: i32) -> Self {
        Self {
            x,
            y,
            object,
            scale_x: 1.0,
            scale_y: 1.0,
            rotation: 0.0,
        }
    }
}

struct SpriteSpec {
    name: String,
    width: u32,
    height: u32,
    origin: (i32, i32),
    frames: Vec<usize>,
}

struct BackgroundSpec {
    name: String,
    region: usize,
    tile_width: u32,
    tile_height: u32,
    tile_columns: u32,
}

struct ObjectSpec {
    name: String,
    sprite: i32,
    visible: bool,
    depth: i32,
}

struct SoundSpec {
    name: String,
    audio_id: i32,
}

/// Region source rect + owning page; target offset defaults to (0, 0).
struct RegionSpec {
    page: u16,
    src: (u16, u16, u16, u16),
    target: (u16, u16),
}

/// Assembles a complete container. Add assets in any order; `build`
/// lays out the chunks and patches every absolute offset.
#[derive(Default)]
pub struct ContainerBuilder {
    strings: Vec<String>,
    pages: Vec<RgbaImage>,
    corrupt_pages: Vec<u16>,
    regions: Vec<RegionSpec>,
    sprites: Vec<SpriteSpec>,
    backgrounds: Vec<BackgroundSpec>,
    objects: Vec<ObjectSpec>,
    rooms: Vec<RoomSpec>,
    sounds: Vec<SoundSpec>,
    audio: Vec<Vec<u8>>,
    raw_chunks: Vec<([u8; 4], Vec<u8>)>,
}

impl ContainerBuilder {
    pub fn new() -> Self {
        let mut b = Self::default();
        b.string("testgame");
        b
    }

    fn string(&mut self, s: &str) -> usize {
        if let Some(i) = self.strings.iter().position(|e| e == s) {
            return i;
        }
        self.strings.push(s.to_owned());
        self.strings.len() - 1
    }

    pub fn page(&mut self, image: RgbaImage) -> u16 {
        self.pages.push(image);
        (self.pages.len() - 1) as u16
    }

    /// Emit the page with a mangled IDAT payload: the IHDR and IEND stay
    /// intact, so the header scan succeeds but pixel decode fails.
    pub fn corrupt_page(&mut self, page: u16) {
        self.corrupt_pages.push(page);
    }

    pub fn region(&mut self, page: u16, src: (u16, u16, u16, u16)) -> usize {
        self.region_at(page, src, (0, 0))
    }

    pub fn region_at(&mut self, page: u16, src: (u16, u16, u16, u16), target: (u16, u16)) -> usize {
        self.regions.push(RegionSpec { page, src, target });
        self.regions.len() - 1
    }

    pub fn sprite(
        &mut self,
        name: &str,
        width: u32,
        height: u32,
        origin: (i32, i32),
        frames: &[usize],
    ) -> usize {
        self.string(name);
        self.sprites.push(SpriteSpec {
            name: name.to_owned(),
            width,
            height,
            origin,
            frames: frames.to_vec(),
        });
        self.sprites.len() - 1
    }

    pub fn background(
        &mut self,
        name: &str,
        region: usize,
        tile_width: u32,
        tile_height: u32,
        tile_columns: u32,
    ) -> usize {
        self.string(name);
        self.backgrounds.push(BackgroundSpec {
            name: name.to_owned(),
            region,
            tile_width,
            tile_height,
            tile_columns,
        });
        self.backgrounds.len() - 1
    }

    pub fn object(&mut self, name: &str, sprite: i32, visible: bool, depth: i32) -> usize {
        self.string(name);
        self.objects.push(ObjectSpec {
            name: name.to_owned(),
            sprite,
            visible,
            depth,
        });
        self.objects.len() - 1
    }

    pub fn room(&mut self, spec: RoomSpec) -> usize {
        self.string(&spec.name);
        self.rooms.push(spec);
        self.rooms.len() - 1
    }

    pub fn sound(&mut self, name: &str, audio_id: i32) -> usize {
        self.string(name);
        self.sounds.push(SoundSpec {
            name: name.to_owned(),
            audio_id,
        });
        self.sounds.len() - 1
    }

    pub fn audio(&mut self, payload: &[u8]) -> usize {
        self.audio.push(payload.to_vec());
        self.audio.len() - 1
    }

    pub fn raw_chunk(&mut self, tag: &[u8; 4], payload: &[u8]) {
        self.raw_chunks.push((*tag, payload.to_vec()));
    }

    pub fn build(self) -> Vec<u8> {
        let mut w = Writer::new();
        w.write_tag(b"FORM");
        let form_len_pos = w.position();
        w.write_u32(0);

        // STRG first so every name reference points backwards.
        let mut string_addrs = vec![0u32; self.strings.len()];
        {
            let (len_pos, start) = begin_chunk(&mut w, b"STRG");
            w.write_u32(self.strings.len() as u32);
            let ptr_base = w.position();
            for _ in &self.strings {
                w.write_u32(0);
            }
            for (i, s) in self.strings.iter().enumerate() {
                let entry = w.position() as u32;
                w.patch_u32(ptr_base + i * 4, entry);
                w.write_gm_string(s);
                string_addrs[i] = entry + 4;
            }
            end_chunk(&mut w, len_pos, start);
        }
        let sref = |addr_table: &[u32], strings: &[String], name: &str| -> u32 {
            strings
                .iter()
                .position(|s| s == name)
                .map(|i| addr_table[i])
                .unwrap_or(0)
        };

        // GEN8 (fixed 68-byte record).
        {
            let (len_pos, start) = begin_chunk(&mut w, b"GEN8");
            w.write_u8(0); // debug
            w.write_u8(16); // bytecode version
            w.write_u16(0);
            w.write_u32(string_addrs[0]); // filename
            w.write_u32(string_addrs[0]); // config
            w.write_u32(100); // last object id
            w.write_u32(10_000_000); // last tile id
            w.write_u32(0xBEEF); // game id
            w.write_bytes(&[0u8; 16]); // guid
            w.write_u32(string_addrs[0]); // name
            w.write_u32(1);
            w.write_u32(0);
            w.write_u32(0);
            w.write_u32(0);
            w.write_u32(640);
            w.write_u32(480);
            end_chunk(&mut w, len_pos, start);
        }

        // TXTR: entries first, PNG payloads after, offsets patched.
        {
            let (len_pos, start) = begin_chunk(&mut w, b"TXTR");
            w.write_u32(self.pages.len() as u32);
            let ptr_base = w.position();
            for _ in &self.pages {
                w.write_u32(0);
            }
            let mut data_ptr_positions = Vec::new();
            for (i, _) in self.pages.iter().enumerate() {
                let entry = w.position() as u32;
                w.patch_u32(ptr_base + i * 4, entry);
                w.write_u32(0); // scaled
                data_ptr_positions.push(w.position());
                w.write_u32(0);
            }
            for (i, page) in self.pages.iter().enumerate() {
                let mut png = encode_png(page);
                if self.corrupt_pages.contains(&(i as u16)) {
                    mangle_idat(&mut png);
                }
                let offset = w.position() as u32;
                w.patch_u32(data_ptr_positions[i], offset);
                w.write_bytes(&png);
            }
            end_chunk(&mut w, len_pos, start);
        }

        // TPAG.
        let mut region_addrs = vec![0u32; self.regions.len()];
        {
            let (len_pos, start) = begin_chunk(&mut w, b"TPAG");
            w.write_u32(self.regions.len() as u32);
            let ptr_base = w.position();
            for _ in &self.regions {
                w.write_u32(0);
            }
            for (i, r) in self.regions.iter().enumerate() {
                let entry = w.position() as u32;
                w.patch_u32(ptr_base + i * 4, entry);
                region_addrs[i] = entry;
                let (sx, sy, sw, sh) = r.src;
                w.write_u16(sx);
                w.write_u16(sy);
                w.write_u16(sw);
                w.write_u16(sh);
                w.write_u16(r.target.0);
                w.write_u16(r.target.1);
                w.write_u16(sw);
                w.write_u16(sh);
                w.write_u16(sw);
                w.write_u16(sh);
                w.write_u16(r.page);
                w.align4();
            }
            end_chunk(&mut w, len_pos, start);
        }

        // BGND.
        {
            let (len_pos, start) = begin_chunk(&mut w, b"BGND");
            w.write_u32(self.backgrounds.len() as u32);
            let ptr_base = w.position();
            for _ in &self.backgrounds {
                w.write_u32(0);
            }
            for (i, b) in self.backgrounds.iter().enumerate() {
                let entry = w.position() as u32;
                w.patch_u32(ptr_base + i * 4, entry);
                w.write_u32(sref(&string_addrs, &self.strings, &b.name));
                w.write_u32(1); // transparent
                w.write_u32(0); // smooth
                w.write_u32(1); // preload
                w.write_u32(region_addrs[b.region]);
                w.write_u32(b.tile_width);
                w.write_u32(b.tile_height);
                w.write_u32(b.tile_columns);
                w.write_u32(0); // tiling flags
            }
            end_chunk(&mut w, len_pos, start);
        }

        // SPRT.
        {
            let (len_pos, start) = begin_chunk(&mut w, b"SPRT");
            w.write_u32(self.sprites.len() as u32);
            let ptr_base = w.position();
            for _ in &self.sprites {
                w.write_u32(0);
            }
            for (i, s) in self.sprites.iter().enumerate() {
                let entry = w.position() as u32;
                w.patch_u32(ptr_base + i * 4, entry);
                w.write_u32(sref(&string_addrs, &self.strings, &s.name));
                w.write_u32(s.width);
                w.write_u32(s.height);
                w.write_i32(0); // margin left
                w.write_i32(s.width as i32 - 1); // margin right
                w.write_i32(s.height as i32 - 1); // margin bottom
                w.write_i32(0); // margin top
                w.write_u32(1); // transparent
                w.write_u32(0); // smooth
                w.write_u32(0); // preload
                w.write_u32(0); // bbox mode
                w.write_u32(0); // sep masks
                w.write_i32(s.origin.0);
                w.write_i32(s.origin.1);
                w.write_u32(s.frames.len() as u32);
                for &f in &s.frames {
                    w.write_u32(region_addrs[f]);
                }
            }
            end_chunk(&mut w, len_pos, start);
        }

        // OBJT.
        {
            let (len_pos, start) = begin_chunk(&mut w, b"OBJT");
            w.write_u32(self.objects.len() as u32);
            let ptr_base = w.position();
            for _ in &self.objects {
                w.write_u32(0);
            }
            for (i, o) in self.objects.iter().enumerate() {
                let entry = w.position() as u32;
                w.patch_u32(ptr_base + i * 4, entry);
                w.write_u32(sref(&string_addrs, &self.strings, &o.name));
                w.write_i32(o.sprite);
                w.write_u32(o.visible as u32);
                w.write_u32(0); // solid
                w.write_i32(o.depth);
                w.write_u32(0); // persistent
                w.write_i32(-1); // parent
                w.write_i32(-1); // mask
                w.write_u32(0); // uses physics
                w.write_u32(0); // is sensor
                w.write_i32(0); // shape
                w.write_f32(0.0);
                w.write_f32(0.0);
                w.write_f32(0.0);
            }
            end_chunk(&mut w, len_pos, start);
        }

        // ROOM: sub-records, then sub-lists, then room records.
        {
            let (len_pos, start) = begin_chunk(&mut w, b"ROOM");
            w.write_u32(self.rooms.len() as u32);
            let ptr_base = w.position();
            for _ in &self.rooms {
                w.write_u32(0);
            }
            for (i, room) in self.rooms.iter().enumerate() {
                let mut bg_addrs = Vec::new();
                for bg in &room.backgrounds {
                    bg_addrs.push(w.position() as u32);
                    w.write_u32(1); // visible
                    w.write_u32(bg.foreground as u32);
                    w.write_i32(bg.background);
                    w.write_i32(bg.x);
                    w.write_i32(bg.y);
                    w.write_u32(bg.tile_h as u32);
                    w.write_u32(bg.tile_v as u32);
                    w.write_u32(0); // stretch
                    w.write_i32(bg.depth);
                }
                let mut tile_addrs = Vec::new();
                for t in &room.tile_layers {
                    tile_addrs.push(w.position() as u32);
                    w.write_i32(t.background);
                    w.write_i32(t.depth);
                    w.write_i32(t.x);
                    w.write_i32(t.y);
                    w.write_u32(t.grid_width);
                    w.write_u32(t.grid_height);
                    for &cell in &t.cells {
                        w.write_i32(cell);
                    }
                }
                let mut inst_addrs = Vec::new();
                for (j, inst) in room.instances.iter().enumerate() {
                    inst_addrs.push(w.position() as u32);
                    w.write_i32(inst.x);
                    w.write_i32(inst.y);
                    w.write_i32(inst.object);
                    w.write_u32(100_000 + j as u32);
                    w.write_i32(-1); // creation code
                    w.write_f32(inst.scale_x);
                    w.write_f32(inst.scale_y);
                    w.write_u32(0xFFFF_FFFF); // blend color
                    w.write_f32(inst.rotation);
                }

                let bg_list = w.position() as u32;
                w.write_u32(bg_addrs.len() as u32);
                for a in &bg_addrs {
                    w.write_u32(*a);
                }
                let tile_list = w.position() as u32;
                w.write_u32(tile_addrs.len() as u32);
                for a in &tile_addrs {
                    w.write_u32(*a);
                }
                // One instance layer holding every instance.
                let inner_list = w.position() as u32;
                w.write_u32(inst_addrs.len() as u32);
                for a in &inst_addrs {
                    w.write_u32(*a);
                }
                let inst_list = w.position() as u32;
                w.write_u32(1);
                w.write_u32(inner_list);

                let entry = w.position() as u32;
                w.patch_u32(ptr_base + i * 4, entry);
                w.write_u32(sref(&string_addrs, &self.strings, &room.name));
                w.write_u32(0); // caption
                w.write_u32(room.width);
                w.write_u32(room.height);
                w.write_u32(30); // speed
                w.write_u32(0); // persistent
                w.write_u32(room.background_color);
                w.write_u32(room.draw_background_color as u32);
                w.write_u32(bg_list);
                w.write_u32(tile_list);
                w.write_u32(inst_list);
            }
            end_chunk(&mut w, len_pos, start);
        }

        // SOND.
        {
            let (len_pos, start) = begin_chunk(&mut w, b"SOND");
            w.write_u32(self.sounds.len() as u32);
            let ptr_base = w.position();
            for _ in &self.sounds {
                w.write_u32(0);
            }
            for (i, s) in self.sounds.iter().enumerate() {
                let entry = w.position() as u32;
                w.patch_u32(ptr_base + i * 4, entry);
                w.write_u32(sref(&string_addrs, &self.strings, &s.name));
                w.write_u32(0x64); // flags
                w.write_u32(0); // kind (null)
                w.write_u32(0); // file (null)
                w.write_f32(1.0); // volume
                w.write_f32(1.0); // pitch
                w.write_i32(0); // audio group
                w.write_i32(s.audio_id);
            }
            end_chunk(&mut w, len_pos, start);
        }

        // AUDO.
        {
            let (len_pos, start) = begin_chunk(&mut w, b"AUDO");
            w.write_u32(self.audio.len() as u32);
            let ptr_base = w.position();
            for _ in &self.audio {
                w.write_u32(0);
            }
            for (i, payload) in self.audio.iter().enumerate() {
                let entry = w.position() as u32;
                w.patch_u32(ptr_base + i * 4, entry);
                w.write_u32(payload.len() as u32);
                w.write_bytes(payload);
            }
            end_chunk(&mut w, len_pos, start);
        }

        for (tag, payload) in &self.raw_chunks {
            let (len_pos, start) = begin_chunk(&mut w, tag);
            w.write_bytes(payload);
            end_chunk(&mut w, len_pos, start);
        }

        let total = w.position() - 8;
        w.patch_u32(form_len_pos, total as u32);
        w.into_bytes()
    }
}

fn begin_chunk(w: &mut Writer, tag: &[u8; 4]) -> (usize, usize) {
    w.write_tag(tag);
    let len_pos = w.position();
    w.write_u32(0);
    (len_pos, w.position())
}

fn end_chunk(w: &mut Writer, len_pos: usize, start: usize) {
    let len = (w.position() - start) as u32;
    w.patch_u32(len_pos, len);
}

/// Flip the first byte of IDAT data. The chunk CRC no longer matches, so
/// any decoder rejects the pixel stream while the envelope stays valid.
fn mangle_idat(png: &mut [u8]) {
    let pos = png
        .windows(4)
        .position(|w| w == b"IDAT")
        .expect("png has an IDAT chunk");
    png[pos + 4] ^= 0xFF;
}

fn encode_png(image: &RgbaImage) -> Vec<u8> {
    let mut buf = Vec::new();
    image
        .write_to(&mut std::io::Cursor::new(&mut buf), image::ImageFormat::Png)
        .expect("png encode");
    buf
}

/// A w×h image where every pixel encodes its own coordinates, so crops
/// can be asserted precisely.
pub fn coordinate_image(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| Rgba([x as u8, y as u8, 0, 255]))
}

/// A solid-color image.
pub fn solid_image(width: u32, height: u32, rgba: [u8; 4]) -> RgbaImage {
    RgbaImage::from_pixel(width, height, Rgba(rgba))
}

/// Install the test subscriber once per binary; `RUST_LOG` scopes it.
/// Repeated calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

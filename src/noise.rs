//! # Signal Static
//! Decorative "no signal" noise for panels without a stream.
//!
//! Each frame fills an overscanned RGBA buffer with random grayscale, darkens
//! every third row, and brightens a horizontal bar that rolls down the buffer.
//! The visible frame is a crop of that buffer, nudged by a small random jitter;
//! the overscan margin keeps the jitter from ever exposing an edge.
//!
//! The generator is driven by an external clock (`tick(now_ms, rng)`) and only
//! produces frames while visible and when motion is allowed.

use rand::Rng;

const SCANLINE_EVERY: usize = 3;
const SCANLINE_ALPHA_DROP: u8 = 30;
const BAR_BOOST: u8 = 35;
const MIN_FRAME_MS: f64 = 16.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StaticConfig {
    pub fps: f64,
    /// 0..=1 noise opacity.
    pub opacity: f64,
    /// Extra drawn area around each edge as a fraction (0.08 = 8%).
    pub overscan: f64,
    /// Jitter range in pixels.
    pub jitter: i32,
}

impl Default for StaticConfig {
    fn default() -> Self {
        Self {
            fps: 24.0,
            opacity: 0.85,
            overscan: 0.08,
            jitter: 2,
        }
    }
}

impl StaticConfig {
    pub fn frame_ms(&self) -> f64 {
        let fps = if self.fps > 0.0 { self.fps } else { 1.0 };
        (1000.0 / fps).max(MIN_FRAME_MS)
    }

    fn alpha(&self) -> u8 {
        (255.0 * self.opacity.clamp(0.0, 1.0)).floor() as u8
    }
}

/// RGBA pixels, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub width: usize,
    pub height: usize,
    pub rgba: Vec<u8>,
}

impl Frame {
    fn blank(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            rgba: vec![0; width * height * 4],
        }
    }

    pub fn pixel(&self, x: usize, y: usize) -> [u8; 4] {
        let i = (y * self.width + x) * 4;
        [self.rgba[i], self.rgba[i + 1], self.rgba[i + 2], self.rgba[i + 3]]
    }

    /// Binary PGM (P5) of the red channel, alpha-premultiplied over black.
    pub fn to_pgm(&self) -> Vec<u8> {
        let mut out = format!("P5\n{} {}\n255\n", self.width, self.height).into_bytes();
        out.reserve(self.width * self.height);
        for px in self.rgba.chunks_exact(4) {
            out.push(((px[0] as u16 * px[3] as u16) / 255) as u8);
        }
        out
    }
}

#[derive(Debug)]
pub struct StaticGenerator {
    cfg: StaticConfig,
    width: usize,
    height: usize,
    buffer: Frame,
    frame: Frame,
    scan_y: usize,
    last_ms: Option<f64>,
    visible: bool,
    reduced_motion: bool,
}

impl StaticGenerator {
    pub fn new(width: usize, height: usize, cfg: StaticConfig) -> Self {
        let mut g = Self {
            cfg,
            width: 0,
            height: 0,
            buffer: Frame::blank(0, 0),
            frame: Frame::blank(0, 0),
            scan_y: 0,
            last_ms: None,
            visible: true,
            reduced_motion: false,
        };
        g.resize(width, height);
        g
    }

    /// Target size changed; reallocates the overscan buffer.
    pub fn resize(&mut self, width: usize, height: usize) {
        self.width = width.max(1);
        self.height = height.max(1);
        let grow = 1.0 + self.cfg.overscan.max(0.0) * 2.0;
        let bw = ((self.width as f64 * grow).floor() as usize).max(self.width);
        let bh = ((self.height as f64 * grow).floor() as usize).max(self.height);
        self.buffer = Frame::blank(bw, bh);
        self.frame = Frame::blank(self.width, self.height);
        self.scan_y = 0;
    }

    /// Becoming visible again resets the frame clock so the next tick draws.
    pub fn set_visible(&mut self, visible: bool) {
        if visible && !self.visible {
            self.last_ms = None;
        }
        self.visible = visible;
    }

    /// Under reduced motion the last frame stays frozen.
    pub fn set_reduced_motion(&mut self, reduced: bool) {
        self.reduced_motion = reduced;
    }

    pub fn buffer_size(&self) -> (usize, usize) {
        (self.buffer.width, self.buffer.height)
    }

    pub fn scan_y(&self) -> usize {
        self.scan_y
    }

    pub fn last_frame(&self) -> &Frame {
        &self.frame
    }

    /// Advance the effect. Returns the new frame, or `None` when hidden, under
    /// reduced motion, or still inside the frame budget.
    pub fn tick<R: Rng + ?Sized>(&mut self, now_ms: f64, rng: &mut R) -> Option<&Frame> {
        if !self.visible || self.reduced_motion {
            return None;
        }
        if let Some(last) = self.last_ms {
            if now_ms - last < self.cfg.frame_ms() {
                return None;
            }
        }
        self.last_ms = Some(now_ms);
        self.render(rng);
        Some(&self.frame)
    }

    /// Draw one frame unconditionally.
    pub fn render<R: Rng + ?Sized>(&mut self, rng: &mut R) -> &Frame {
        self.fill_noise(rng);
        self.darken_scanlines();
        self.roll_bar();
        self.crop(rng);
        &self.frame
    }

    fn fill_noise<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let alpha = self.cfg.alpha();
        for px in self.buffer.rgba.chunks_exact_mut(4) {
            let v: u8 = rng.random();
            px[0] = v;
            px[1] = v;
            px[2] = v;
            px[3] = alpha;
        }
    }

    fn darken_scanlines(&mut self) {
        let bw = self.buffer.width;
        for y in (0..self.buffer.height).step_by(SCANLINE_EVERY) {
            for x in 0..bw {
                let a = (y * bw + x) * 4 + 3;
                self.buffer.rgba[a] = self.buffer.rgba[a].saturating_sub(SCANLINE_ALPHA_DROP);
            }
        }
    }

    fn roll_bar(&mut self) {
        let (bw, bh) = (self.buffer.width, self.buffer.height);
        let step = ((bh as f64 * 0.004).round() as usize).max(1);
        self.scan_y = (self.scan_y + step) % bh;
        let bar_h = ((bh as f64 * 0.06).floor() as usize).max(2);
        for y in self.scan_y..self.scan_y + bar_h {
            let row = (y % bh) * bw * 4;
            for x in 0..bw {
                let base = row + x * 4;
                for c in 0..3 {
                    self.buffer.rgba[base + c] = self.buffer.rgba[base + c].saturating_add(BAR_BOOST);
                }
            }
        }
    }

    fn crop<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let (bw, bh) = (self.buffer.width, self.buffer.height);
        let (w, h) = (self.width, self.height);
        let j = self.cfg.jitter.max(0);
        let (jx, jy) = if j > 0 {
            (rng.random_range(-j..=j), rng.random_range(-j..=j))
        } else {
            (0, 0)
        };
        let margin_x = ((bw - w) / 2) as i64;
        let margin_y = ((bh - h) / 2) as i64;
        let sx = (margin_x + jx as i64).clamp(0, (bw - w) as i64) as usize;
        let sy = (margin_y + jy as i64).clamp(0, (bh - h) as i64) as usize;

        for y in 0..h {
            let src = ((sy + y) * bw + sx) * 4;
            let dst = y * w * 4;
            self.frame.rgba[dst..dst + w * 4].copy_from_slice(&self.buffer.rgba[src..src + w * 4]);
        }
    }
}

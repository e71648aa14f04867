//! Template matching against a screen capture.

use image::imageops::{self, FilterType};
use image::GrayImage;
use imageproc::template_matching::{match_template_parallel, MatchTemplateMethod};

use crate::desktop::Point;
use crate::error::Result;

/// A grayscale capture and where its top-left pixel sits on the desktop.
#[derive(Debug, Clone)]
pub struct Screenshot {
    /// Captured pixels.
    pub image: GrayImage,
    /// Desktop coordinate of pixel (0, 0).
    pub origin: Point,
}

/// Something that can capture the screen.
pub trait ScreenSource {
    /// Capture the current screen contents.
    fn capture(&mut self) -> Result<Screenshot>;
}

/// A fixed image served as the screen.
pub struct StaticScreen {
    shot: Screenshot,
}

impl StaticScreen {
    /// Serve `image` with its origin at (0, 0).
    pub fn new(image: GrayImage) -> Self {
        Self {
            shot: Screenshot {
                image,
                origin: Point::default(),
            },
        }
    }
}

impl ScreenSource for StaticScreen {
    fn capture(&mut self) -> Result<Screenshot> {
        Ok(self.shot.clone())
    }
}

/// Best match of a template on a screenshot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TemplateMatch {
    /// Desktop coordinate of the matched region's center.
    pub center: Point,
    /// Zero-mean normalized cross-correlation score, at most 1.
    pub score: f32,
}

/// Running sums over rectangular windows of an image.
struct WindowSums {
    width: usize,
    sums: Vec<u64>,
    squares: Vec<u64>,
}

impl WindowSums {
    fn new(image: &GrayImage) -> Self {
        let (w, h) = image.dimensions();
        let width = w as usize + 1;
        let mut sums = vec![0u64; width * (h as usize + 1)];
        let mut squares = sums.clone();
        for y in 0..h as usize {
            let mut row = 0u64;
            let mut row_sq = 0u64;
            for x in 0..w as usize {
                let v = u64::from(image.get_pixel(x as u32, y as u32)[0]);
                row += v;
                row_sq += v * v;
                let idx = (y + 1) * width + x + 1;
                sums[idx] = sums[idx - width] + row;
                squares[idx] = squares[idx - width] + row_sq;
            }
        }
        Self {
            width,
            sums,
            squares,
        }
    }

    /// Sum and sum of squares of the `w` x `h` window at (`x`, `y`).
    fn window(&self, x: u32, y: u32, w: u32, h: u32) -> (f64, f64) {
        let (x0, y0) = (x as usize, y as usize);
        let (x1, y1) = (x0 + w as usize, y0 + h as usize);
        let at = |table: &[u64], x: usize, y: usize| table[y * self.width + x] as f64;
        let sum = |table: &[u64]| at(table, x1, y1) - at(table, x0, y1) - at(table, x1, y0) + at(table, x0, y0);
        (sum(&self.sums), sum(&self.squares))
    }
}

/// Largest screen downscale tried by the coarse pass.
const MAX_COARSE_FACTOR: u32 = 4;
/// Smallest template side, in coarse pixels, the coarse pass accepts.
const MIN_COARSE_SIDE: u32 = 6;
/// Coarse hits re-scored at full resolution.
const COARSE_CANDIDATES: usize = 3;

/// Mean and variance terms of a template.
struct TemplateStats {
    n: f64,
    mean: f64,
    var: f64,
}

impl TemplateStats {
    fn of(template: &GrayImage) -> Self {
        let (w, h) = template.dimensions();
        let n = f64::from(w * h);
        let (sum, sq) = template.pixels().fold((0f64, 0f64), |(s, sq), p| {
            let v = f64::from(p[0]);
            (s + v, sq + v * v)
        });
        Self {
            n,
            mean: sum / n,
            var: sq - sum * sum / n,
        }
    }
}

/// Score every position of `template` on `image`, calling `visit` with
/// the top-left corner and its zero-mean normalized cross-correlation.
///
/// The raw correlation comes from imageproc; window means are removed with
/// summed-area tables so flat regions do not score high.
fn scan(image: &GrayImage, template: &GrayImage, mut visit: impl FnMut(u32, u32, f64)) {
    let (tw, th) = template.dimensions();
    let stats = TemplateStats::of(template);
    let correlation = match_template_parallel(image, template, MatchTemplateMethod::CrossCorrelation);
    let windows = WindowSums::new(image);

    for (x, y, cc) in correlation.enumerate_pixels() {
        let (s1, s2) = windows.window(x, y, tw, th);
        let i_var = (s2 - s1 * s1 / stats.n).max(0.0);
        let score = if stats.var <= f64::EPSILON {
            // flat template: match flat windows of the same brightness
            if i_var <= f64::EPSILON && (s1 / stats.n - stats.mean).abs() < 0.5 {
                1.0
            } else {
                0.0
            }
        } else if i_var <= f64::EPSILON {
            0.0
        } else {
            (f64::from(cc[0]) - stats.mean * s1) / (i_var * stats.var).sqrt()
        };
        visit(x, y, score);
    }
}

/// Best position found by [`scan`].
fn scan_best(image: &GrayImage, template: &GrayImage) -> Option<(u32, u32, f64)> {
    let mut best: Option<(u32, u32, f64)> = None;
    scan(image, template, |x, y, score| {
        if best.is_none_or(|(_, _, s)| score > s) {
            best = Some((x, y, score));
        }
    });
    best
}

/// The `limit` best positions, at least two pixels apart.
fn scan_ranked(image: &GrayImage, template: &GrayImage, limit: usize) -> Vec<(u32, u32, f64)> {
    let mut ranked: Vec<(u32, u32, f64)> = Vec::with_capacity(limit + 1);
    scan(image, template, |x, y, score| {
        if ranked.len() == limit && ranked.last().is_some_and(|&(_, _, s)| score <= s) {
            return;
        }
        let near = ranked
            .iter()
            .position(|&(cx, cy, _)| cx.abs_diff(x) <= 2 && cy.abs_diff(y) <= 2);
        match near {
            Some(i) if ranked[i].2 >= score => return,
            Some(i) => {
                ranked.remove(i);
            }
            None => {}
        }
        let at = ranked.partition_point(|&(_, _, s)| s >= score);
        ranked.insert(at, (x, y, score));
        ranked.truncate(limit);
    });
    ranked
}

/// Downscale factor for the coarse pass, or 1 when the template is too
/// small to survive shrinking.
fn coarse_factor(template: &GrayImage) -> u32 {
    let side = template.width().min(template.height());
    (2..=MAX_COARSE_FACTOR)
        .rev()
        .find(|f| side / f >= MIN_COARSE_SIDE)
        .unwrap_or(1)
}

fn shrink(image: &GrayImage, factor: u32) -> GrayImage {
    let (w, h) = image.dimensions();
    imageops::resize(
        image,
        (w / factor).max(1),
        (h / factor).max(1),
        FilterType::Triangle,
    )
}

/// Result of a search plus how much full-resolution work it took.
struct Search {
    found: Option<(u32, u32, f64)>,
    full_positions: u64,
}

/// Coarse-to-fine search.
///
/// Screen and template are shrunk by [`coarse_factor`] and scanned whole;
/// the best few coarse hits are then re-scored at full resolution inside a
/// window of twice the factor around each. Small templates fall back to a
/// full-resolution scan.
fn search(screen: &GrayImage, template: &GrayImage) -> Search {
    let (sw, sh) = screen.dimensions();
    let (tw, th) = template.dimensions();
    let factor = coarse_factor(template);
    if factor == 1 {
        return Search {
            found: scan_best(screen, template),
            full_positions: u64::from(sw - tw + 1) * u64::from(sh - th + 1),
        };
    }

    let small_screen = shrink(screen, factor);
    let small_template = shrink(template, factor);
    let candidates = if small_template.width() <= small_screen.width()
        && small_template.height() <= small_screen.height()
    {
        scan_ranked(&small_screen, &small_template, COARSE_CANDIDATES)
    } else {
        Vec::new()
    };

    let radius = 2 * factor;
    let (max_x, max_y) = (sw - tw, sh - th);
    let mut found: Option<(u32, u32, f64)> = None;
    let mut full_positions = 0u64;
    for (cx, cy, _) in candidates {
        let (gx, gy) = ((cx * factor).min(max_x), (cy * factor).min(max_y));
        let (x0, y0) = (gx.saturating_sub(radius), gy.saturating_sub(radius));
        let (x1, y1) = ((gx + radius).min(max_x), (gy + radius).min(max_y));
        let region = imageops::crop_imm(screen, x0, y0, x1 - x0 + tw, y1 - y0 + th).to_image();
        full_positions += u64::from(x1 - x0 + 1) * u64::from(y1 - y0 + 1);

        if let Some((x, y, score)) = scan_best(&region, template) {
            if found.is_none_or(|(_, _, s)| score > s) {
                found = Some((x0 + x, y0 + y, score));
            }
        }
    }
    Search {
        found,
        full_positions,
    }
}

/// Find the best position of `template` on `screen`.
///
/// Returns `None` when the template does not fit inside the screenshot.
pub fn best_match(screen: &Screenshot, template: &GrayImage) -> Option<TemplateMatch> {
    let (sw, sh) = screen.image.dimensions();
    let (tw, th) = template.dimensions();
    if tw == 0 || th == 0 || tw > sw || th > sh {
        return None;
    }

    search(&screen.image, template)
        .found
        .map(|(x, y, score)| TemplateMatch {
            center: screen
                .origin
                .offset((x + tw / 2) as i32, (y + th / 2) as i32),
            score: score.min(1.0) as f32,
        })
}

/// Best match only if it reaches `confidence`.
pub fn locate_template(screen: &Screenshot, template: &GrayImage, confidence: f32) -> Option<TemplateMatch> {
    best_match(screen, template).filter(|m| m.score.is_finite() && m.score >= confidence)
}

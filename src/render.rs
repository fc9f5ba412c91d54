//! Half-block terminal renderer for the game state.
//!
//! Each terminal cell shows two vertical pixels: the upper one as the
//! foreground of `▀`, the lower one as the background. The play area is
//! stretched onto whatever pixel grid the terminal offers, with a ground
//! strip below it.

use crate::game::{Game, Overlay, Rect};
use crossterm::{
    cursor, queue,
    style::{self, Color as CColor},
};
use std::io::{self, Write};

// ── Colors ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    const fn lerp(a: Rgb, b: Rgb, t_256: u16) -> Rgb {
        let t = t_256 as i32;
        Rgb(
            (a.0 as i32 + (b.0 as i32 - a.0 as i32) * t / 256) as u8,
            (a.1 as i32 + (b.1 as i32 - a.1 as i32) * t / 256) as u8,
            (a.2 as i32 + (b.2 as i32 - a.2 as i32) * t / 256) as u8,
        )
    }

    const fn dim(self) -> Rgb {
        Rgb(self.0 / 2, self.1 / 2, self.2 / 2)
    }

    fn to_crossterm(self) -> CColor {
        CColor::Rgb {
            r: self.0,
            g: self.1,
            b: self.2,
        }
    }
}

const SKY_TOP: Rgb = Rgb(78, 192, 202);
const SKY_BOT: Rgb = Rgb(200, 236, 240);
const GRASS: Rgb = Rgb(94, 180, 60);
const GRASS_LIGHT: Rgb = Rgb(130, 210, 80);
const DIRT: Rgb = Rgb(222, 216, 149);
const DIRT_DARK: Rgb = Rgb(196, 186, 120);
const PIPE_L: Rgb = Rgb(74, 122, 26);
const PIPE_M: Rgb = Rgb(100, 170, 40);
const PIPE_R: Rgb = Rgb(115, 191, 46);
const PIPE_HI: Rgb = Rgb(145, 215, 62);
const CAP_DARK: Rgb = Rgb(60, 100, 20);
const BIRD_BODY: Rgb = Rgb(245, 200, 66);
const BIRD_WING: Rgb = Rgb(215, 165, 35);
const BIRD_EYE: Rgb = Rgb(255, 255, 255);
const BIRD_PUPIL: Rgb = Rgb(20, 20, 20);
const BIRD_BEAK: Rgb = Rgb(225, 75, 35);
const WHITE: Rgb = Rgb(255, 255, 255);
const SHADOW: Rgb = Rgb(30, 30, 30);
const PANEL: Rgb = Rgb(222, 200, 130);
const PANEL_EDGE: Rgb = Rgb(120, 80, 40);
const BUTTON: Rgb = Rgb(230, 97, 29);

// ── Pixel buffer ────────────────────────────────────────────────────────────

pub struct PixelBuf {
    w: usize,
    h: usize, // terminal rows * 2
    px: Vec<Rgb>,
}

impl PixelBuf {
    pub fn new(w: usize, h: usize) -> Self {
        Self {
            w,
            h,
            px: vec![SKY_TOP; w * h],
        }
    }

    /// Buffer covering a terminal of `cols` x `rows` cells.
    pub fn for_terminal(cols: u16, rows: u16) -> Self {
        Self::new(cols as usize, rows as usize * 2)
    }

    pub fn resize(&mut self, w: usize, h: usize) {
        self.w = w;
        self.h = h;
        self.px.resize(w * h, SKY_TOP);
    }

    pub fn width(&self) -> usize {
        self.w
    }

    pub fn height(&self) -> usize {
        self.h
    }

    fn set(&mut self, x: i32, y: i32, c: Rgb) {
        if x >= 0 && y >= 0 && (x as usize) < self.w && (y as usize) < self.h {
            self.px[y as usize * self.w + x as usize] = c;
        }
    }

    pub fn get(&self, x: usize, y: usize) -> Rgb {
        self.px[y * self.w + x]
    }

    fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, c: Rgb) {
        for dy in 0..h {
            for dx in 0..w {
                self.set(x + dx, y + dy, c);
            }
        }
    }

    fn dim_all(&mut self) {
        for p in &mut self.px {
            *p = p.dim();
        }
    }

    /// Writes the whole buffer, only emitting colour changes.
    pub fn render(&self, out: &mut impl Write) -> io::Result<()> {
        queue!(out, cursor::MoveTo(0, 0))?;
        let rows = self.h / 2;
        let mut fg: Option<Rgb> = None;
        let mut bg: Option<Rgb> = None;

        for row in 0..rows {
            for col in 0..self.w {
                let top = self.get(col, row * 2);
                let bot = self.get(col, row * 2 + 1);

                if top == bot {
                    if bg != Some(top) {
                        queue!(out, style::SetBackgroundColor(top.to_crossterm()))?;
                        bg = Some(top);
                    }
                    queue!(out, style::Print(' '))?;
                } else {
                    if fg != Some(top) {
                        queue!(out, style::SetForegroundColor(top.to_crossterm()))?;
                        fg = Some(top);
                    }
                    if bg != Some(bot) {
                        queue!(out, style::SetBackgroundColor(bot.to_crossterm()))?;
                        bg = Some(bot);
                    }
                    queue!(out, style::Print('\u{2580}'))?; // ▀
                }
            }
            if row + 1 < rows {
                queue!(out, style::ResetColor, style::Print("\r\n"))?;
                fg = None;
                bg = None;
            }
        }
        queue!(out, style::ResetColor)?;
        out.flush()
    }
}

// ── 3x5 bitmap font ─────────────────────────────────────────────────────────

#[rustfmt::skip]
const DIGITS: [[u8; 15]; 10] = [
    [1,1,1, 1,0,1, 1,0,1, 1,0,1, 1,1,1], // 0
    [0,1,0, 1,1,0, 0,1,0, 0,1,0, 1,1,1], // 1
    [1,1,1, 0,0,1, 1,1,1, 1,0,0, 1,1,1], // 2
    [1,1,1, 0,0,1, 0,1,1, 0,0,1, 1,1,1], // 3
    [1,0,1, 1,0,1, 1,1,1, 0,0,1, 0,0,1], // 4
    [1,1,1, 1,0,0, 1,1,1, 0,0,1, 1,1,1], // 5
    [1,1,1, 1,0,0, 1,1,1, 1,0,1, 1,1,1], // 6
    [1,1,1, 0,0,1, 0,1,0, 0,1,0, 0,1,0], // 7
    [1,1,1, 1,0,1, 1,1,1, 1,0,1, 1,1,1], // 8
    [1,1,1, 1,0,1, 1,1,1, 0,0,1, 1,1,1], // 9
];

#[rustfmt::skip]
fn glyph(ch: char) -> Option<[u8; 15]> {
    let g = match ch {
        '0'..='9' => DIGITS[ch as usize - '0' as usize],
        'A' => [0,1,0, 1,0,1, 1,1,1, 1,0,1, 1,0,1],
        'C' => [1,1,1, 1,0,0, 1,0,0, 1,0,0, 1,1,1],
        'E' => [1,1,1, 1,0,0, 1,1,0, 1,0,0, 1,1,1],
        'F' => [1,1,1, 1,0,0, 1,1,0, 1,0,0, 1,0,0],
        'G' => [1,1,1, 1,0,0, 1,0,1, 1,0,1, 1,1,1],
        'L' => [1,0,0, 1,0,0, 1,0,0, 1,0,0, 1,1,1],
        'M' => [1,0,1, 1,1,1, 1,1,1, 1,0,1, 1,0,1],
        'O' => [1,1,1, 1,0,1, 1,0,1, 1,0,1, 1,1,1],
        'P' => [1,1,1, 1,0,1, 1,1,1, 1,0,0, 1,0,0],
        'R' => [1,1,0, 1,0,1, 1,1,0, 1,0,1, 1,0,1],
        'S' => [1,1,1, 1,0,0, 1,1,1, 0,0,1, 1,1,1],
        'T' => [1,1,1, 0,1,0, 0,1,0, 0,1,0, 0,1,0],
        'V' => [1,0,1, 1,0,1, 1,0,1, 1,0,1, 0,1,0],
        'Y' => [1,0,1, 1,0,1, 0,1,0, 0,1,0, 0,1,0],
        _ => return None,
    };
    Some(g)
}

/// Pixel width of `text` at magnification `k`.
fn text_width(text: &str, k: i32) -> i32 {
    (text.chars().count() as i32 * 4 - 1) * k
}

/// Draws `text` centred on `cx` with a drop shadow. Unknown characters
/// (including spaces) leave a blank cell.
fn draw_text(buf: &mut PixelBuf, cx: i32, y: i32, text: &str, fg: Rgb, k: i32) {
    let start_x = cx - text_width(text, k) / 2;
    for (i, ch) in text.chars().enumerate() {
        let Some(g) = glyph(ch) else { continue };
        let gx = start_x + i as i32 * 4 * k;
        for row in 0..5 {
            for col in 0..3 {
                if g[row * 3 + col] == 1 {
                    let px = gx + col as i32 * k;
                    let py = y + row as i32 * k;
                    buf.fill_rect(px + 1, py + 1, k, k, SHADOW);
                    buf.fill_rect(px, py, k, k, fg);
                }
            }
        }
    }
}

// ── Scene ───────────────────────────────────────────────────────────────────

/// Maps play-area pixels onto the buffer.
#[derive(Debug, Clone, Copy)]
struct Viewport {
    sx: f64,
    sy: f64,
    sky_h: i32,
}

impl Viewport {
    fn new(game: &Game, buf: &PixelBuf) -> Self {
        let ground_h = (buf.height() / 8).max(2).min(buf.height());
        let sky_h = buf.height() - ground_h;
        let t = game.tuning();
        Self {
            sx: buf.width() as f64 / t.arena_width,
            sy: sky_h as f64 / t.arena_height,
            sky_h: sky_h as i32,
        }
    }

    fn x(&self, x: f64) -> i32 {
        (x * self.sx).round() as i32
    }

    fn y(&self, y: f64) -> i32 {
        (y * self.sy).round() as i32
    }

    /// Pixel box as (x, y, w, h), at least one pixel each way.
    fn rect(&self, r: &Rect) -> (i32, i32, i32, i32) {
        let x0 = self.x(r.left);
        let y0 = self.y(r.top);
        let w = (self.x(r.right) - x0).max(1);
        let h = (self.y(r.bottom) - y0).max(1);
        (x0, y0, w, h)
    }
}

/// Draws the full frame for the current game state.
pub fn draw(game: &Game, buf: &mut PixelBuf) {
    if buf.width() == 0 || buf.height() < 2 {
        return;
    }
    let vp = Viewport::new(game, buf);

    draw_sky(buf, &vp);
    draw_pipes(game, buf, &vp);
    draw_ground(game, buf, &vp);
    draw_bird(game, buf, &vp);

    // The score stays visible behind either panel.
    let cx = buf.width() as i32 / 2;
    draw_text(buf, cx, 2, &game.score().to_string(), WHITE, 1);
    match game.overlay() {
        None => {}
        Some(Overlay::Start) => draw_start(buf, &vp),
        Some(Overlay::GameOver { score }) => draw_game_over(buf, &vp, score),
    }
}

fn draw_sky(buf: &mut PixelBuf, vp: &Viewport) {
    let sky_h = vp.sky_h.max(1);
    for y in 0..sky_h {
        let t = (y * 256 / sky_h) as u16;
        let c = Rgb::lerp(SKY_TOP, SKY_BOT, t);
        for x in 0..buf.width() as i32 {
            buf.set(x, y, c);
        }
    }
}

fn draw_ground(game: &Game, buf: &mut PixelBuf, vp: &Viewport) {
    let gy = vp.sky_h;
    let scroll = (game.ticks() as f64 * game.tuning().pipe_speed * vp.sx) as i32;
    for x in 0..buf.width() as i32 {
        let alt = ((x + scroll) / 3) % 2 == 0;
        buf.set(x, gy, if alt { GRASS } else { GRASS_LIGHT });
        buf.set(x, gy + 1, GRASS);
    }
    for y in (gy + 2)..buf.height() as i32 {
        for x in 0..buf.width() as i32 {
            let stripe = (x + scroll + (y - gy) * 2) % 12 < 6;
            buf.set(x, y, if stripe { DIRT } else { DIRT_DARK });
        }
    }
}

fn draw_pipes(game: &Game, buf: &mut PixelBuf, vp: &Viewport) {
    let cap_h = (buf.height() as i32 / 24).max(1);
    let cap_extra = (buf.width() as i32 / 80).max(1);

    for pipe in game.pipes() {
        let (top, bottom) = game.pipe_rects(pipe);
        let (px, top_y, pw, top_h) = vp.rect(&top);
        let (_, bot_y, _, _) = vp.rect(&bottom);
        let gap_top = top_y + top_h;

        for x in 0..pw {
            let c = pipe_shade(x, pw);
            for y in 0..gap_top - cap_h {
                buf.set(px + x, y, c);
            }
            for y in (bot_y + cap_h)..vp.sky_h {
                buf.set(px + x, y, c);
            }
        }

        let cap_w = pw + cap_extra * 2;
        for x in -cap_extra..(pw + cap_extra) {
            let c = pipe_shade(x + cap_extra, cap_w);
            for y in (gap_top - cap_h)..gap_top {
                buf.set(px + x, y, c);
            }
            for y in bot_y..(bot_y + cap_h) {
                buf.set(px + x, y, c);
            }
            buf.set(px + x, gap_top - 1, CAP_DARK);
            buf.set(px + x, bot_y, CAP_DARK);
        }
    }
}

fn draw_bird(game: &Game, buf: &mut PixelBuf, vp: &Viewport) {
    let (x, y, w, h) = vp.rect(&game.bird_rect());
    buf.fill_rect(x, y, w, h, BIRD_BODY);

    // Wing droops while falling, lifts while rising.
    let wing_y = if game.bird().vy < 0.0 { y + h / 4 } else { y + h / 2 };
    buf.fill_rect(x, wing_y, (w / 2).max(1), (h / 3).max(1), BIRD_WING);

    let eye = (w / 5).max(1);
    let ex = x + w - eye - (w / 4).max(1);
    buf.fill_rect(ex, y, eye + 1, eye, BIRD_EYE);
    buf.set(ex + eye, y + eye - 1, BIRD_PUPIL);

    let beak_w = (w / 4).max(1);
    buf.fill_rect(x + w, y + h / 2, beak_w, (h / 3).max(1), BIRD_BEAK);
}

fn draw_start(buf: &mut PixelBuf, vp: &Viewport) {
    let cx = buf.width() as i32 / 2;
    let k = if text_width("FLAPPY", 2) + 4 <= buf.width() as i32 { 2 } else { 1 };
    let title_y = vp.sky_h / 4;
    draw_text(buf, cx, title_y, "FLAPPY", BIRD_BODY, k);
    draw_text(buf, cx, title_y + 5 * k + 4, "SPACE", WHITE, 1);
}

fn draw_game_over(buf: &mut PixelBuf, vp: &Viewport, score: u32) {
    buf.dim_all();

    let cx = buf.width() as i32 / 2;
    let cy = vp.sky_h / 2;
    let panel_w = text_width("GAME OVER", 1) + 8;
    let panel_h = 30;
    let px = cx - panel_w / 2;
    let py = cy - panel_h / 2;

    buf.fill_rect(px - 1, py - 1, panel_w + 2, panel_h + 2, PANEL_EDGE);
    buf.fill_rect(px, py, panel_w, panel_h, PANEL);
    draw_text(buf, cx, py + 3, "GAME OVER", WHITE, 1);
    draw_text(buf, cx, py + 11, &score.to_string(), BIRD_BODY, 1);

    // Restart control, bound to the R key.
    let label = "R RESTART";
    let bw = text_width(label, 1) + 4;
    buf.fill_rect(cx - bw / 2, py + 19, bw, 9, BUTTON);
    draw_text(buf, cx, py + 21, label, WHITE, 1);
}

fn pipe_shade(x: i32, total_w: i32) -> Rgb {
    if total_w <= 1 {
        return PIPE_M;
    }
    let t = (x.clamp(0, total_w - 1) as f64 / (total_w - 1) as f64 * 256.0) as u16;
    if t < 64 {
        Rgb::lerp(PIPE_L, PIPE_M, (t * 4).min(256))
    } else if t < 100 {
        Rgb::lerp(PIPE_M, PIPE_HI, ((t - 64) * 7).min(256))
    } else if t < 160 {
        Rgb::lerp(PIPE_HI, PIPE_R, ((t - 100) * 4).min(256))
    } else {
        Rgb::lerp(PIPE_R, PIPE_L, ((t - 160) * 3).min(256))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Tuning;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::time::Duration;

    fn game() -> Game {
        Game::new(Tuning::default(), ChaCha8Rng::seed_from_u64(1))
    }

    #[test]
    fn test_set_ignores_out_of_bounds() {
        let mut buf = PixelBuf::new(4, 4);
        buf.set(-1, 0, WHITE);
        buf.set(0, 4, WHITE);
        buf.set(4, 0, WHITE);
        assert!((0..4).all(|y| (0..4).all(|x| buf.get(x, y) == SKY_TOP)));
        buf.set(3, 3, WHITE);
        assert_eq!(buf.get(3, 3), WHITE);
    }

    #[test]
    fn test_render_uses_half_blocks() {
        let mut buf = PixelBuf::new(2, 2);
        buf.set(0, 0, WHITE);
        let mut out = Vec::new();
        buf.render(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        // Column 0 differs top/bottom, column 1 does not.
        assert_eq!(text.matches('\u{2580}').count(), 1);
        assert!(text.contains(' '));
    }

    #[test]
    fn test_render_emits_one_line_per_cell_row() {
        let buf = PixelBuf::for_terminal(3, 4);
        let mut out = Vec::new();
        buf.render(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.matches("\r\n").count(), 3);
    }

    #[test]
    fn test_bird_drawn_at_scaled_position() {
        let g = game();
        let mut buf = PixelBuf::new(80, 48);
        draw(&g, &mut buf);
        // 80/400 = 0.2 horizontally; sky is 42 px for 600, so 0.07 vertically.
        // Bird box 50..90 x 300..330 -> 10..18 x 21..23, wing on the lower row.
        assert_eq!(buf.get(11, 21), BIRD_BODY);
        assert_ne!(buf.get(5, 21), BIRD_BODY);
    }

    #[test]
    fn test_game_over_panel_drawn() {
        let mut g = game();
        g.jump();
        g.advance(Duration::from_secs(5));
        let mut buf = PixelBuf::new(80, 48);
        draw(&g, &mut buf);
        // Panel centred on the sky; its corner is plain panel colour.
        let panel_w = text_width("GAME OVER", 1) + 8;
        let px = 40 - panel_w / 2;
        let py = 21 - 15;
        assert_eq!(buf.get(px as usize, py as usize), PANEL);
        // Outside the panel the scene is dimmed.
        assert_eq!(buf.get(0, 0), Rgb::lerp(SKY_TOP, SKY_BOT, 0).dim());
    }

    #[test]
    fn test_score_shown_behind_panels() {
        // "0" centred on x = 40 starts at x = 39 with its top-left pixel lit.
        let mut g = game();
        let mut buf = PixelBuf::new(80, 48);
        draw(&g, &mut buf);
        assert_eq!(buf.get(39, 2), WHITE);

        g.jump();
        g.advance(Duration::from_secs(5));
        draw(&g, &mut buf);
        assert_eq!(buf.get(39, 2), WHITE.dim());
    }

    #[test]
    fn test_tiny_buffer_does_not_panic() {
        let g = game();
        let mut buf = PixelBuf::new(1, 2);
        draw(&g, &mut buf);
        let mut buf = PixelBuf::new(0, 0);
        draw(&g, &mut buf);
    }

    #[test]
    fn test_glyphs_cover_overlay_text() {
        for text in ["FLAPPY", "SPACE", "GAME OVER", "R RESTART", "0123456789"] {
            for ch in text.chars().filter(|c| *c != ' ') {
                assert!(glyph(ch).is_some(), "missing glyph {ch}");
            }
        }
    }
}

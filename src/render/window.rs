use anyhow::Result;
use minifb::{Key, Window, WindowOptions};

use crate::render::surface::{DrawSurface, Rgba};

/// minifbを使用したレンダラー
pub struct MinifbRenderer {
    window: Window,
    buffer: Vec<u32>,
    width: usize,
    height: usize,
}

impl MinifbRenderer {
    /// ウィンドウを作成
    pub fn new(title: &str, width: usize, height: usize) -> Result<Self> {
        let mut window = Window::new(
            title,
            width,
            height,
            WindowOptions {
                resize: false,
                ..WindowOptions::default()
            },
        )?;
        window.set_target_fps(60);

        let buffer = vec![0u32; width * height];

        Ok(Self {
            window,
            buffer,
            width,
            height,
        })
    }

    /// ウィンドウが開いているか
    pub fn is_open(&self) -> bool {
        self.window.is_open() && !self.window.is_key_down(Key::Escape)
    }

    pub fn is_key_pressed(&self, key: Key) -> bool {
        self.window.is_key_pressed(key, minifb::KeyRepeat::No)
    }

    pub fn size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// 背景色で塗りつぶす
    pub fn clear(&mut self, color: u32) {
        self.buffer.fill(color);
    }

    /// バッファをウィンドウに表示
    pub fn present(&mut self) -> Result<()> {
        self.window
            .update_with_buffer(&self.buffer, self.width, self.height)?;
        Ok(())
    }

    /// Bresenhamのアルゴリズムで線を描画
    fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, half_width: i32, color: Rgba) {
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;

        let mut x = x0;
        let mut y = y0;

        loop {
            if half_width > 0 {
                self.draw_circle(x, y, half_width, color);
            } else {
                self.blend_pixel(x, y, color);
            }

            if x == x1 && y == y1 {
                break;
            }

            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    /// 円を描画（塗りつぶし）
    fn draw_circle(&mut self, cx: i32, cy: i32, radius: i32, color: Rgba) {
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                if dx * dx + dy * dy <= radius * radius {
                    self.blend_pixel(cx + dx, cy + dy, color);
                }
            }
        }
    }

    /// アルファブレンドでピクセルを合成（境界チェック付き）
    fn blend_pixel(&mut self, x: i32, y: i32, color: Rgba) {
        if x < 0 || x >= self.width as i32 || y < 0 || y >= self.height as i32 {
            return;
        }
        let idx = y as usize * self.width + x as usize;
        self.buffer[idx] = blend(self.buffer[idx], color);
    }
}

impl DrawSurface for MinifbRenderer {
    fn fill_circle(&mut self, center: (f32, f32), radius: f32, color: Rgba) {
        if color.a <= 0.0 {
            return;
        }
        self.draw_circle(
            center.0.round() as i32,
            center.1.round() as i32,
            radius.round() as i32,
            color,
        );
    }

    fn stroke_line(&mut self, from: (f32, f32), to: (f32, f32), width: f32, color: Rgba) {
        if color.a <= 0.0 {
            return;
        }
        self.draw_line(
            from.0.round() as i32,
            from.1.round() as i32,
            to.0.round() as i32,
            to.1.round() as i32,
            (width / 2.0).floor() as i32,
            color,
        );
    }
}

/// 0x00RRGGBB の背景に Rgba を重ねる
fn blend(dst: u32, src: Rgba) -> u32 {
    let a = src.a.clamp(0.0, 1.0);
    let mix = |d: u32, s: u8| -> u32 {
        let d = d as f32;
        (d + (s as f32 - d) * a).round() as u32
    };
    let r = mix((dst >> 16) & 0xFF, src.r);
    let g = mix((dst >> 8) & 0xFF, src.g);
    let b = mix(dst & 0xFF, src.b);
    (r << 16) | (g << 8) | b
}

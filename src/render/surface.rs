/// 描画色（RGB + 不透明度）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    /// 不透明度 (0.0〜1.0)
    pub a: f32,
}

impl Rgba {
    pub fn new(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// 色相（度）から彩度・明度最大の色を作る
    pub fn from_hue(hue: f32, alpha: f32) -> Self {
        let h = hue.rem_euclid(360.0) / 60.0;
        let x = 1.0 - ((h % 2.0) - 1.0).abs();
        let (r, g, b) = match h as u32 {
            0 => (1.0, x, 0.0),
            1 => (x, 1.0, 0.0),
            2 => (0.0, 1.0, x),
            3 => (0.0, x, 1.0),
            4 => (x, 0.0, 1.0),
            _ => (1.0, 0.0, x),
        };
        let to_u8 = |v: f32| (v * 255.0).round() as u8;
        Self::new(to_u8(r), to_u8(g), to_u8(b), alpha.clamp(0.0, 1.0))
    }

    /// 0x00RRGGBB
    pub fn to_rgb_u32(self) -> u32 {
        ((self.r as u32) << 16) | ((self.g as u32) << 8) | self.b as u32
    }
}

/// 描画先。トラッキング側はこのプリミティブだけを使う
pub trait DrawSurface {
    fn fill_circle(&mut self, center: (f32, f32), radius: f32, color: Rgba);
    fn stroke_line(&mut self, from: (f32, f32), to: (f32, f32), width: f32, color: Rgba);
}

/// 記録された描画命令
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Circle {
        center: (f32, f32),
        radius: f32,
        color: Rgba,
    },
    Line {
        from: (f32, f32),
        to: (f32, f32),
        width: f32,
        color: Rgba,
    },
}

/// 描画命令を順に記録するだけのサーフェス
#[derive(Debug, Clone, Default)]
pub struct CommandRecorder {
    commands: Vec<DrawCommand>,
}

impl CommandRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn lines(&self) -> impl Iterator<Item = &DrawCommand> {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Line { .. }))
    }

    pub fn circles(&self) -> impl Iterator<Item = &DrawCommand> {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Circle { .. }))
    }
}

impl DrawSurface for CommandRecorder {
    fn fill_circle(&mut self, center: (f32, f32), radius: f32, color: Rgba) {
        self.commands.push(DrawCommand::Circle { center, radius, color });
    }

    fn stroke_line(&mut self, from: (f32, f32), to: (f32, f32), width: f32, color: Rgba) {
        self.commands.push(DrawCommand::Line { from, to, width, color });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primary_hues() {
        let red = Rgba::from_hue(0.0, 1.0);
        assert_eq!((red.r, red.g, red.b), (255, 0, 0));
        let green = Rgba::from_hue(120.0, 1.0);
        assert_eq!((green.r, green.g, green.b), (0, 255, 0));
        let blue = Rgba::from_hue(240.0, 1.0);
        assert_eq!((blue.r, blue.g, blue.b), (0, 0, 255));
        let yellow = Rgba::from_hue(60.0, 1.0);
        assert_eq!((yellow.r, yellow.g, yellow.b), (255, 255, 0));
    }

    #[test]
    fn test_hue_wraps() {
        assert_eq!(Rgba::from_hue(360.0, 1.0), Rgba::from_hue(0.0, 1.0));
        assert_eq!(Rgba::from_hue(-120.0, 1.0), Rgba::from_hue(240.0, 1.0));
    }

    #[test]
    fn test_alpha_clamped() {
        assert_eq!(Rgba::from_hue(0.0, 2.0).a, 1.0);
        assert_eq!(Rgba::from_hue(0.0, -1.0).a, 0.0);
    }

    #[test]
    fn test_to_rgb_u32() {
        assert_eq!(Rgba::new(0xFF, 0x80, 0x01, 1.0).to_rgb_u32(), 0xFF8001);
    }

    #[test]
    fn test_recorder_keeps_order() {
        let mut rec = CommandRecorder::new();
        let c = Rgba::new(1, 2, 3, 0.5);
        rec.stroke_line((0.0, 0.0), (1.0, 1.0), 1.0, c);
        rec.fill_circle((2.0, 2.0), 3.0, c);
        assert_eq!(rec.commands().len(), 2);
        assert_eq!(rec.lines().count(), 1);
        assert_eq!(rec.circles().count(), 1);
        assert!(matches!(rec.commands()[0], DrawCommand::Line { .. }));
    }
}

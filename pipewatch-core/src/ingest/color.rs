#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// Color for series `index` out of `count`, hues spread evenly around the wheel
/// at full saturation and half lightness.
pub fn series_color(index: usize, count: usize) -> Rgb {
    let hue = index as f64 / count.max(1) as f64;
    hsl_to_rgb(hue, 1.0, 0.5)
}

/// `h`, `s`, `l` in `0.0..=1.0`.
pub fn hsl_to_rgb(h: f64, s: f64, l: f64) -> Rgb {
    if s == 0.0 {
        let v = channel(l);
        return Rgb { r: v, g: v, b: v };
    }

    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;

    Rgb {
        r: channel(hue_to_rgb(p, q, h + 1.0 / 3.0)),
        g: channel(hue_to_rgb(p, q, h)),
        b: channel(hue_to_rgb(p, q, h - 1.0 / 3.0)),
    }
}

fn hue_to_rgb(p: f64, q: f64, t: f64) -> f64 {
    let t = t.rem_euclid(1.0);
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 1.0 / 2.0 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}

fn channel(v: f64) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

use stance_infer::{LineSegment, PoseFrame, RenderSink};

const KEYPOINT_COLOR: [u8; 3] = [255, 255, 255];

/// Draw a line using Bresenham's algorithm with clipping
pub fn draw_line(
    buf: &mut [u8],
    width: usize,
    height: usize,
    x0: i32,
    y0: i32,
    x1: i32,
    y1: i32,
    color: [u8; 3],
) {
    if let Some((x0, y0, x1, y1)) = clip_line(x0, y0, x1, y1, width as i32, height as i32) {
        bresenham(x0, y0, x1, y1, |x, y| {
            set_pixel(buf, width, x as usize, y as usize, color)
        });
    }
}

/// Draw a line `thickness` pixels wide by stamping discs along it
pub fn draw_thick_line(
    buf: &mut [u8],
    width: usize,
    height: usize,
    (x0, y0): (i32, i32),
    (x1, y1): (i32, i32),
    thickness: f32,
    color: [u8; 3],
) {
    let radius = (thickness / 2.0).floor() as i32;
    if radius <= 0 {
        draw_line(buf, width, height, x0, y0, x1, y1, color);
        return;
    }

    // Clip in a frame padded by the radius on every side
    let (w, h) = (width as i32 + 2 * radius, height as i32 + 2 * radius);
    let Some((x0, y0, x1, y1)) = clip_line(x0 + radius, y0 + radius, x1 + radius, y1 + radius, w, h)
    else {
        return;
    };
    bresenham(x0, y0, x1, y1, |x, y| {
        draw_filled_circle(buf, width, height, x - radius, y - radius, radius, color)
    });
}

/// Draw a filled circle with clipping
pub fn draw_filled_circle(
    buf: &mut [u8],
    width: usize,
    height: usize,
    cx: i32,
    cy: i32,
    radius: i32,
    color: [u8; 3],
) {
    let r2 = radius * radius;

    for dy in -radius..=radius {
        for dx in -radius..=radius {
            if dx * dx + dy * dy <= r2 {
                let x = cx + dx;
                let y = cy + dy;

                if x >= 0 && x < width as i32 && y >= 0 && y < height as i32 {
                    set_pixel(buf, width, x as usize, y as usize, color);
                }
            }
        }
    }
}

/// Convert HWC RGB buffer to packed ARGB u32 for minifb
pub fn rgb_to_argb(buf: &[u8], width: usize, height: usize) -> Vec<u32> {
    buf[..width * height * 3]
        .chunks_exact(3)
        .map(|px| ((px[0] as u32) << 16) | ((px[1] as u32) << 8) | px[2] as u32)
        .collect()
}

/// RGB frame that pose overlays are drawn onto.
pub struct FrameCanvas {
    pub buf: Vec<u8>,
    pub width: usize,
    pub height: usize,
}

impl FrameCanvas {
    pub fn new(buf: Vec<u8>, width: usize, height: usize) -> Self {
        debug_assert_eq!(buf.len(), width * height * 3);
        Self { buf, width, height }
    }

    /// Dot every joint that passed the confidence gate.
    pub fn draw_keypoints(&mut self, frame: &PoseFrame, radius: i32) {
        for kp in frame.keypoints.iter().filter(|kp| kp.renderable) {
            draw_filled_circle(
                &mut self.buf,
                self.width,
                self.height,
                kp.keypoint.position.x as i32,
                kp.keypoint.position.y as i32,
                radius,
                KEYPOINT_COLOR,
            );
        }
    }

    pub fn to_argb(&self) -> Vec<u32> {
        rgb_to_argb(&self.buf, self.width, self.height)
    }
}

impl RenderSink for FrameCanvas {
    fn draw_segment(&mut self, segment: &LineSegment) {
        draw_thick_line(
            &mut self.buf,
            self.width,
            self.height,
            (segment.from.position.x as i32, segment.from.position.y as i32),
            (segment.to.position.x as i32, segment.to.position.y as i32),
            segment.width,
            segment.color.to_array(),
        );
    }
}

// Helper functions

fn set_pixel(buf: &mut [u8], width: usize, x: usize, y: usize, color: [u8; 3]) {
    let idx = (y * width + x) * 3;
    buf[idx..idx + 3].copy_from_slice(&color);
}

fn bresenham(mut x0: i32, mut y0: i32, x1: i32, y1: i32, mut plot: impl FnMut(i32, i32)) {
    let dx = (x1 - x0).abs();
    let dy = (y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx - dy;

    loop {
        plot(x0, y0);

        if x0 == x1 && y0 == y1 {
            break;
        }

        let e2 = 2 * err;
        if e2 > -dy {
            err -= dy;
            x0 += sx;
        }
        if e2 < dx {
            err += dx;
            y0 += sy;
        }
    }
}

// Cohen-Sutherland clipping
const INSIDE: u8 = 0; // 0000
const LEFT: u8 = 1; // 0001
const RIGHT: u8 = 2; // 0010
const BOTTOM: u8 = 4; // 0100
const TOP: u8 = 8; // 1000

fn clip_line(
    mut x0: i32,
    mut y0: i32,
    mut x1: i32,
    mut y1: i32,
    width: i32,
    height: i32,
) -> Option<(i32, i32, i32, i32)> {
    loop {
        let outcode0 = compute_outcode(x0, y0, width, height);
        let outcode1 = compute_outcode(x1, y1, width, height);

        if (outcode0 | outcode1) == 0 {
            return Some((x0, y0, x1, y1));
        } else if (outcode0 & outcode1) != 0 {
            return None;
        }

        let outcode = if outcode0 != 0 { outcode0 } else { outcode1 };
        let (x, y) = clip_point(x0, y0, x1, y1, outcode, width, height);
        if outcode == outcode0 {
            x0 = x;
            y0 = y;
        } else {
            x1 = x;
            y1 = y;
        }
    }
}

fn compute_outcode(x: i32, y: i32, width: i32, height: i32) -> u8 {
    let mut code = INSIDE;
    if x < 0 {
        code |= LEFT;
    } else if x >= width {
        code |= RIGHT;
    }
    if y < 0 {
        code |= TOP;
    } else if y >= height {
        code |= BOTTOM;
    }
    code
}

fn clip_point(
    x0: i32,
    y0: i32,
    x1: i32,
    y1: i32,
    outcode: u8,
    width: i32,
    height: i32,
) -> (i32, i32) {
    let dx = x1 - x0;
    let dy = y1 - y0;

    if outcode & TOP != 0 {
        (x0 + dx * (0 - y0) / dy, 0)
    } else if outcode & BOTTOM != 0 {
        (x0 + dx * (height - 1 - y0) / dy, height - 1)
    } else if outcode & LEFT != 0 {
        (0, y0 + dy * (0 - x0) / dx)
    } else {
        (width - 1, y0 + dy * (width - 1 - x0) / dx)
    }
}

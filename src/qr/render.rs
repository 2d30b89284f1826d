//! Drawing encoded modules to files.

use super::{HexColor, Modules, QrStyle};
use anyhow::{Context, Result};
use image::{ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use std::fmt::Write as _;
use std::path::Path;

/// Pixel geometry shared by every format.
struct Layout {
    box_size: u32,
    border: u32,
    size: u32,
}

impl Layout {
    fn new(modules: &Modules, style: &QrStyle) -> Self {
        let side = modules.width as u32 + 2 * style.border;
        Self {
            box_size: style.box_size,
            border: style.border,
            size: side * style.box_size,
        }
    }

    /// Whether pixel `(x, y)` falls on a dark module.
    fn is_dark(&self, modules: &Modules, x: u32, y: u32) -> bool {
        let mx = x / self.box_size;
        let my = y / self.box_size;
        let width = modules.width as u32;
        if mx < self.border || my < self.border {
            return false;
        }
        let (mx, my) = (mx - self.border, my - self.border);
        mx < width && my < width && modules.is_dark(mx as usize, my as usize)
    }

    /// Top-left pixel of every dark module, row by row from the top.
    fn dark_squares<'a>(&'a self, modules: &'a Modules) -> impl Iterator<Item = (u32, u32)> + 'a {
        (0..modules.width).flat_map(move |my| {
            (0..modules.width)
                .filter(move |&mx| modules.is_dark(mx, my))
                .map(move |mx| {
                    (
                        (mx as u32 + self.border) * self.box_size,
                        (my as u32 + self.border) * self.box_size,
                    )
                })
        })
    }
}

fn rgb(color: HexColor) -> Rgb<u8> {
    Rgb([color.r, color.g, color.b])
}

fn opaque_image(modules: &Modules, style: &QrStyle) -> RgbImage {
    let layout = Layout::new(modules, style);
    let fill = rgb(style.fill);
    let background = rgb(style.opaque_background());
    RgbImage::from_fn(layout.size, layout.size, |x, y| {
        if layout.is_dark(modules, x, y) {
            fill
        } else {
            background
        }
    })
}

/// Write a PNG, with a transparent background when requested.
pub fn render_png(modules: &Modules, style: &QrStyle, path: &Path) -> Result<()> {
    if style.transparent {
        let layout = Layout::new(modules, style);
        let fill = Rgba([style.fill.r, style.fill.g, style.fill.b, 255]);
        let clear = Rgba([255, 255, 255, 0]);
        let img = RgbaImage::from_fn(layout.size, layout.size, |x, y| {
            if layout.is_dark(modules, x, y) {
                fill
            } else {
                clear
            }
        });
        img.save_with_format(path, ImageFormat::Png)?;
    } else {
        opaque_image(modules, style).save_with_format(path, ImageFormat::Png)?;
    }
    Ok(())
}

pub fn render_tiff(modules: &Modules, style: &QrStyle, path: &Path) -> Result<()> {
    opaque_image(modules, style).save_with_format(path, ImageFormat::Tiff)?;
    Ok(())
}

/// Write an SVG with one path holding every dark module.
pub fn render_svg(modules: &Modules, style: &QrStyle, path: &Path) -> Result<()> {
    std::fs::write(path, svg_document(modules, style))?;
    Ok(())
}

fn svg_document(modules: &Modules, style: &QrStyle) -> String {
    let layout = Layout::new(modules, style);
    let b = layout.box_size;

    let mut d = String::new();
    for (x, y) in layout.dark_squares(modules) {
        let _ = write!(d, "M{x} {y}h{b}v{b}h-{b}z");
    }

    format!(
        concat!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n",
            "<svg xmlns=\"http://www.w3.org/2000/svg\" version=\"1.1\" ",
            "width=\"{size}\" height=\"{size}\" viewBox=\"0 0 {size} {size}\">\n",
            "<rect width=\"{size}\" height=\"{size}\" fill=\"{background}\"/>\n",
            "<path fill=\"{fill}\" d=\"{d}\"/>\n",
            "</svg>\n"
        ),
        size = layout.size,
        background = style.opaque_background(),
        fill = style.fill,
        d = d,
    )
}

/// Colour channels scaled to `0.0..=1.0`, as PostScript and PDF expect.
fn unit_rgb(color: HexColor) -> [f32; 3] {
    [color.r, color.g, color.b].map(|c| f32::from(c) / 255.0)
}

/// Write an Encapsulated PostScript file, one `rectfill` per dark module.
pub fn render_eps(modules: &Modules, style: &QrStyle, path: &Path) -> Result<()> {
    std::fs::write(path, eps_document(modules, style))?;
    Ok(())
}

fn eps_document(modules: &Modules, style: &QrStyle) -> String {
    let layout = Layout::new(modules, style);
    let (size, b) = (layout.size, layout.box_size);
    let [br, bg, bb] = unit_rgb(style.opaque_background());
    let [fr, fg, fb] = unit_rgb(style.fill);

    let mut eps = format!(
        concat!(
            "%!PS-Adobe-3.0 EPSF-3.0\n",
            "%%BoundingBox: 0 0 {size} {size}\n",
            "%%EndComments\n",
            "{br:.3} {bg:.3} {bb:.3} setrgbcolor 0 0 {size} {size} rectfill\n",
            "{fr:.3} {fg:.3} {fb:.3} setrgbcolor\n"
        ),
        size = size,
        br = br,
        bg = bg,
        bb = bb,
        fr = fr,
        fg = fg,
        fb = fb,
    );
    // PostScript's origin is the bottom-left corner
    for (x, y) in layout.dark_squares(modules) {
        let _ = writeln!(eps, "{x} {} {b} {b} rectfill", size - y - b);
    }
    eps.push_str("showpage\n%%EOF\n");
    eps
}

/// Write a single-page vector PDF sized to the code.
pub fn render_pdf(modules: &Modules, style: &QrStyle, path: &Path) -> Result<()> {
    let mut doc = pdf_document(modules, style)?;
    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).context("Failed to serialize PDF")?;
    std::fs::write(path, buffer)?;
    Ok(())
}

fn pdf_document(modules: &Modules, style: &QrStyle) -> Result<Document> {
    let layout = Layout::new(modules, style);
    let (size, b) = (layout.size as i64, layout.box_size as i64);

    let set_color = |color: HexColor| {
        Operation::new("rg", unit_rgb(color).into_iter().map(Object::Real).collect())
    };
    let rect = |x: i64, y: i64, w: i64, h: i64| {
        Operation::new("re", vec![x.into(), y.into(), w.into(), h.into()])
    };

    let mut operations = vec![
        set_color(style.opaque_background()),
        rect(0, 0, size, size),
        Operation::new("f", vec![]),
        set_color(style.fill),
    ];
    // PDF's origin is the bottom-left corner
    for (x, y) in layout.dark_squares(modules) {
        operations.push(rect(x as i64, size - y as i64 - b, b, b));
    }
    operations.push(Operation::new("f", vec![]));

    let content = Content { operations }
        .encode()
        .context("Failed to encode PDF content")?;

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let content_id = doc.add_object(Stream::new(dictionary! {}, content));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![0.into(), 0.into(), size.into(), size.into()],
        "Contents" => content_id,
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    Ok(doc)
}

use resvg::usvg::{Options, Tree, fontdb::Database};
use std::sync::{Arc, LazyLock};
use tiny_skia::{Pixmap, Transform};

static OPTIONS: LazyLock<Options> = LazyLock::new(|| {
    let mut fontdb = Database::new();
    fontdb.load_system_fonts();
    fontdb.set_sans_serif_family("Noto Sans");

    Options {
        fontdb: Arc::new(fontdb),
        ..Options::default()
    }
});

/// Rasterizes an SVG document. `None` when the markup cannot be parsed or the
/// image has no area.
pub fn svg_to_png(svg: &str) -> Option<Vec<u8>> {
    let tree = Tree::from_str(svg, &OPTIONS)
        .inspect_err(|err| tracing::warn!(error = %err, "SVG parse failed"))
        .ok()?;
    let size = tree.size();
    let mut pixmap = Pixmap::new(size.width().ceil() as u32, size.height().ceil() as u32)?;
    resvg::render(&tree, Transform::default(), &mut pixmap.as_mut());
    pixmap.encode_png().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_png_signature() {
        let svg = r##"<svg xmlns="http://www.w3.org/2000/svg" width="20" height="10"><rect width="20" height="10" fill="#2c5282"/></svg>"##;
        let png = svg_to_png(svg).expect("renders");
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
    }

    #[test]
    fn rejects_garbage() {
        assert!(svg_to_png("not svg").is_none());
    }
}

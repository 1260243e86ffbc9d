//! Character artwork: finding the full-resolution files behind the outfit tabs, downloading
//! them once, and trimming transparent margins.

use std::{
    io::Cursor,
    path::{Path, PathBuf},
};

use image::{DynamicImage, GenericImageView};
use tracing::{debug, info, warn};
use url::Url;

use crate::{
    fetch::Fetcher,
    parse::{Document, Node},
    request::Transport,
    Result,
};

const ORIGINAL_FILE_LINK: &str = "Original file";

/// One image to fetch, and where it goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaAsset {
    pub source_url: String,
    pub destination: PathBuf,
    /// Outfit/variant the file shows, from the `(Label)` suffix of its name.
    pub label: Option<String>,
}

impl MediaAsset {
    /// Builds the asset for `source_url`; the file keeps its own URL-decoded name inside `folder`.
    pub fn new(source_url: Url, folder: &Path) -> Option<Self> {
        let file_name = decoded_file_name(&source_url)?;
        Some(Self {
            label: variant_label(&file_name),
            destination: folder.join(file_name),
            source_url: source_url.into(),
        })
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MediaSummary {
    pub downloaded: usize,
    pub skipped: usize,
}

/// Downloads every outfit image of a character page into `folder`.
///
/// Each direct `<article>` of the tabbed section links to a file page, whose
/// "Original file" link is the full-resolution image. Articles missing either link are skipped.
pub async fn extract_media<T: Transport>(
    fetcher: &mut Fetcher<T>,
    doc: &Document,
    base: &Url,
    folder: &Path,
) -> Result<MediaSummary> {
    let mut summary = MediaSummary::default();

    for file_page in file_page_links(doc) {
        let Some(asset) = resolve_asset(fetcher, base, &file_page, folder).await? else {
            continue;
        };
        if download(fetcher, &asset).await? {
            summary.downloaded += 1;
        } else {
            summary.skipped += 1;
        }
    }
    Ok(summary)
}

/// The first link of every direct `<article>` in the page's tab section, in tab order.
pub fn file_page_links(doc: &Document) -> Vec<String> {
    let Some(section) = doc.find("section", Some("tabber__section")) else {
        debug!("no tabbed image section");
        return Vec::new();
    };
    section
        .children_matching("article", None)
        .into_iter()
        .filter_map(|article| article.find("a", None)?.attribute("href"))
        .map(str::to_string)
        .collect()
}

async fn resolve_asset<T: Transport>(
    fetcher: &mut Fetcher<T>,
    base: &Url,
    file_page: &str,
    folder: &Path,
) -> Result<Option<MediaAsset>> {
    let page = fetcher.fetch(base.join(file_page)?.as_str()).await?;
    let Some(href) = page.find_link(ORIGINAL_FILE_LINK).and_then(|a| a.attribute("href")) else {
        debug!(file_page, "file page has no original file link");
        return Ok(None);
    };
    let asset = MediaAsset::new(base.join(href)?, folder);
    if asset.is_none() {
        warn!(href, "original file link has no file name");
    }
    Ok(asset)
}

/// Fetches `asset` unless its destination already exists. Returns whether anything was downloaded.
pub async fn download<T: Transport>(fetcher: &mut Fetcher<T>, asset: &MediaAsset) -> Result<bool> {
    if tokio::fs::try_exists(&asset.destination).await? {
        debug!(path = %asset.destination.display(), "image already present");
        return Ok(false);
    }

    info!(
        path = %asset.destination.display(),
        variant = asset.label.as_deref().unwrap_or("-"),
        "Downloading image"
    );
    let bytes = fetcher.download(&asset.source_url).await?;
    let bytes = match crop_encoded(&bytes) {
        Ok(Some(cropped)) => cropped,
        Ok(None) => bytes,
        Err(err) => {
            warn!(path = %asset.destination.display(), %err, "couldn't crop image, keeping original");
            bytes
        }
    };
    tokio::fs::write(&asset.destination, bytes).await?;
    Ok(true)
}

/// Re-encodes `bytes` cropped to its opaque area, in the same format.
/// `None` when there is nothing to crop.
pub fn crop_encoded(bytes: &[u8]) -> image::ImageResult<Option<Vec<u8>>> {
    let format = image::guess_format(bytes)?;
    let img = image::load_from_memory_with_format(bytes, format)?;
    let Some(cropped) = crop_transparent(&img) else {
        return Ok(None);
    };
    let mut out = Cursor::new(Vec::new());
    cropped.write_to(&mut out, format)?;
    Ok(Some(out.into_inner()))
}

/// The image cut down to its non-transparent pixels, or `None` if it has no alpha
/// channel, no opaque pixel, or no transparent margin.
pub fn crop_transparent(img: &DynamicImage) -> Option<DynamicImage> {
    let (x, y, width, height) = opaque_bounds(img)?;
    if (width, height) == img.dimensions() {
        return None;
    }
    Some(img.crop_imm(x, y, width, height))
}

/// Bounding box `(x, y, width, height)` of pixels with non-zero alpha.
pub fn opaque_bounds(img: &DynamicImage) -> Option<(u32, u32, u32, u32)> {
    if !img.color().has_alpha() {
        return None;
    }
    let rgba = img.to_rgba8();
    let mut bounds: Option<(u32, u32, u32, u32)> = None;
    for (x, y, pixel) in rgba.enumerate_pixels() {
        if pixel[3] == 0 {
            continue;
        }
        bounds = Some(match bounds {
            None => (x, y, x, y),
            Some((x0, y0, x1, y1)) => (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
        });
    }
    bounds.map(|(x0, y0, x1, y1)| (x0, y0, x1 - x0 + 1, y1 - y0 + 1))
}

fn decoded_file_name(url: &Url) -> Option<String> {
    let raw = url.path_segments()?.last()?;
    let name = urlencoding::decode(raw)
        .map(|name| name.into_owned())
        .unwrap_or_else(|_| raw.to_string())
        .replace(['/', '\\'], "-");
    (!name.is_empty()).then_some(name)
}

/// `Special_Week_(Race).png` -> `Race`.
pub fn variant_label(file_name: &str) -> Option<String> {
    let stem = Path::new(file_name).file_stem()?.to_str()?;
    let open = stem.rfind('(')?;
    let label = stem.strip_suffix(')')?.get(open + 1..)?;
    (!label.is_empty()).then(|| label.to_string())
}

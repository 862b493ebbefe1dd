use anyhow::{anyhow, bail, Context, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use std::path::Path;

/// MIME type for the image extensions the editor accepts.
pub fn mime_for_extension(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "svg" => Some("image/svg+xml"),
        _ => None,
    }
}

/// Encode raw bytes as a `data:<mime>;base64,...` URI.
pub fn data_uri_from_bytes(bytes: &[u8], mime: &str) -> String {
    format!("data:{};base64,{}", mime, STANDARD.encode(bytes))
}

/// Shape check plus payload decode. The store treats the image as an opaque
/// string, so validation only happens at the attach boundary.
pub fn is_valid_data_uri(uri: &str) -> bool {
    let Some(rest) = uri.strip_prefix("data:") else {
        return false;
    };
    let Some((meta, payload)) = rest.split_once(',') else {
        return false;
    };
    meta.ends_with(";base64") && STANDARD.decode(payload).is_ok()
}

/// Read an image file into a data URI. This is the one operation in the
/// system that suspends; everything else completes synchronously.
pub async fn read_image_as_data_uri(path: &Path) -> Result<String> {
    let mime = mime_for_extension(path)
        .ok_or_else(|| anyhow!("Unsupported image type: '{}'", path.display()))?;
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read image '{}'", path.display()))?;
    if bytes.is_empty() {
        bail!("Image file '{}' is empty", path.display());
    }
    Ok(data_uri_from_bytes(&bytes, mime))
}

// ---- Tests ----

//! On-disk storage for evidence files.
//!
//! Files are stored flat in one directory as `<uuid>_<sanitized name>`. Only
//! that stored name is recorded in the database.

use std::path::{Path, PathBuf};

use uuid::Uuid;

/// Extensions accepted for evidence, compared case-insensitively.
pub const ALLOWED_EXTENSIONS: [&str; 7] = ["pdf", "png", "jpg", "jpeg", "gif", "doc", "docx"];

/// Reduce a client-supplied file name to a safe ASCII name.
///
/// Path separators and anything outside `[A-Za-z0-9._-]` are dropped,
/// whitespace becomes `_`, and leading or trailing `.`/`_` are stripped so
/// the result can never be `..` or a hidden file. May return an empty string.
pub fn sanitize_file_name(name: &str) -> String {
  let cleaned: String = base_name(name)
    .chars()
    .filter_map(|c| match c {
      c if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') => Some(c),
      c if c.is_whitespace() => Some('_'),
      _ => None,
    })
    .collect();

  cleaned.trim_matches(['.', '_']).to_owned()
}

/// The last path component. Browsers on some platforms send the full client
/// path.
fn base_name(name: &str) -> &str { name.rsplit(['/', '\\']).next().unwrap_or(name) }

/// Stored-name stem used when nothing printable survives sanitizing.
const FALLBACK_STEM: &str = "file";

/// Validate a client-supplied name and derive the name to store it under.
///
/// The extension is checked on the name as sent, so `تصویر.jpg` is accepted.
/// If sanitizing leaves no usable stem the result is `file.<ext>`. Returns
/// `None` when the extension is not allowed.
pub fn evidence_file_name(original: &str) -> Option<String> {
  let base = base_name(original);
  if !has_allowed_extension(base) {
    return None;
  }
  let sanitized = sanitize_file_name(base);
  if has_allowed_extension(&sanitized) {
    return Some(sanitized);
  }
  let (_, ext) = base.rsplit_once('.')?;
  Some(format!("{FALLBACK_STEM}.{ext}"))
}

/// Whether `name` ends in one of [`ALLOWED_EXTENSIONS`].
pub fn has_allowed_extension(name: &str) -> bool {
  name
    .rsplit_once('.')
    .is_some_and(|(stem, ext)| {
      !stem.trim().is_empty()
        && ALLOWED_EXTENSIONS.iter().any(|allowed| ext.eq_ignore_ascii_case(allowed))
    })
}

/// The uploads directory.
#[derive(Debug, Clone)]
pub struct UploadDir {
  root: PathBuf,
}

impl UploadDir {
  pub fn new(root: impl Into<PathBuf>) -> Self { Self { root: root.into() } }

  pub fn path(&self) -> &Path { &self.root }

  /// Create the directory if it does not exist yet.
  pub async fn ensure(&self) -> std::io::Result<()> {
    tokio::fs::create_dir_all(&self.root).await
  }

  /// Write `bytes` under a fresh unique name derived from the already
  /// sanitized `name`; returns the stored name.
  pub async fn store(&self, name: &str, bytes: &[u8]) -> std::io::Result<String> {
    let stored = format!("{}_{name}", Uuid::new_v4());
    tokio::fs::write(self.root.join(&stored), bytes).await?;
    tracing::debug!(file = %stored, size = bytes.len(), "evidence file stored");
    Ok(stored)
  }

  /// Remove a stored file. Failure is logged, not returned.
  pub async fn discard(&self, stored: &str) {
    if let Err(e) = tokio::fs::remove_file(self.root.join(stored)).await {
      tracing::warn!(file = %stored, error = %e, "failed to remove orphaned upload");
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn sanitize_keeps_safe_characters() {
    assert_eq!(sanitize_file_name("scene photo 1.JPG"), "scene_photo_1.JPG");
    assert_eq!(sanitize_file_name("report-v2_final.pdf"), "report-v2_final.pdf");
  }

  #[test]
  fn sanitize_strips_paths_and_dots() {
    assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
    assert_eq!(sanitize_file_name("C:\\Users\\me\\statement.docx"), "statement.docx");
    assert_eq!(sanitize_file_name("..."), "");
    assert_eq!(sanitize_file_name("_.hidden.png_"), "hidden.png");
  }

  #[test]
  fn sanitize_drops_non_ascii() {
    assert_eq!(sanitize_file_name("fïlé.pdf"), "fl.pdf");
  }

  #[test]
  fn non_ascii_names_keep_their_extension() {
    assert_eq!(evidence_file_name("تصویر.jpg").as_deref(), Some("file.jpg"));
    assert_eq!(evidence_file_name("fïlé.pdf").as_deref(), Some("fl.pdf"));
    assert_eq!(evidence_file_name("C:\\docs\\报告.DOCX").as_deref(), Some("file.DOCX"));
    assert_eq!(evidence_file_name("scene photo.png").as_deref(), Some("scene_photo.png"));
  }

  #[test]
  fn evidence_names_reject_disallowed_extensions() {
    assert_eq!(evidence_file_name("tool.exe"), None);
    assert_eq!(evidence_file_name("تصویر.exe"), None);
    assert_eq!(evidence_file_name("jpg"), None);
    assert_eq!(evidence_file_name("dir.pdf/notes"), None);
  }

  #[test]
  fn extension_check_is_case_insensitive() {
    assert!(has_allowed_extension("a.PDF"));
    assert!(has_allowed_extension("scan.JpEg"));
    assert!(!has_allowed_extension("tool.exe"));
    assert!(!has_allowed_extension("pdf"));
    assert!(!has_allowed_extension("archive.pdf.zip"));
  }

  #[tokio::test]
  async fn store_prefixes_a_unique_id() {
    let dir = tempfile::tempdir().unwrap();
    let uploads = UploadDir::new(dir.path());

    let a = uploads.store("a.pdf", b"one").await.unwrap();
    let b = uploads.store("a.pdf", b"two").await.unwrap();
    assert_ne!(a, b);
    assert!(a.ends_with("_a.pdf"));
    assert_eq!(std::fs::read(dir.path().join(&b)).unwrap(), b"two");

    uploads.discard(&a).await;
    assert!(!dir.path().join(&a).exists());
  }
}

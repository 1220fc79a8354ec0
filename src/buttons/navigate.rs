//! Button actions: hand a URL to the system browser or save a bundled file.
use std::path::{Path, PathBuf};
use std::process::Command;

use super::ButtonTarget;

const ASSET_ROOT: &str = "assets";

#[derive(Debug, thiserror::Error)]
pub enum NavigateError {
    #[error("refusing to open non-http url `{0}`")]
    UnsupportedUrl(String),
    #[error("failed to launch browser for `{url}`: {source}")]
    Launch {
        url: String,
        #[source]
        source: std::io::Error,
    },
    #[error("no download directory available")]
    NoDownloadDir,
    #[error("failed to copy {from} to {to}: {source}")]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Carry out a button's action.
///
/// # Errors
/// See [`open_url`] and [`download_file`].
pub fn perform(target: &ButtonTarget) -> Result<(), NavigateError> {
    match target {
        ButtonTarget::Url(url) => open_url(url),
        ButtonTarget::Download(path) => {
            let dir = dirs::download_dir().ok_or(NavigateError::NoDownloadDir)?;
            download_file(Path::new(ASSET_ROOT), path, &dir).map(|_| ())
        }
    }
}

fn opener() -> (&'static str, &'static [&'static str]) {
    if cfg!(target_os = "windows") {
        ("cmd", &["/C", "start", ""])
    } else if cfg!(target_os = "macos") {
        ("open", &[])
    } else {
        ("xdg-open", &[])
    }
}

/// Open `url` in the system browser without waiting for it.
///
/// # Errors
/// Rejects anything that is not `http(s)://` and reports spawn failures.
pub fn open_url(url: &str) -> Result<(), NavigateError> {
    if !(url.starts_with("https://") || url.starts_with("http://")) {
        return Err(NavigateError::UnsupportedUrl(url.to_string()));
    }
    let (program, args) = opener();
    Command::new(program)
        .args(args)
        .arg(url)
        .spawn()
        .map(|_| ())
        .map_err(|source| NavigateError::Launch { url: url.to_string(), source })
}

/// Copy `asset` (relative to `asset_root`) into `dest_dir`, keeping its file name.
///
/// # Errors
/// Returns [`NavigateError::Copy`] when the source is missing or the copy fails.
pub fn download_file(asset_root: &Path, asset: &str, dest_dir: &Path) -> Result<PathBuf, NavigateError> {
    let relative = asset.trim_start_matches('/');
    let from = asset_root.join(relative);
    let name = from.file_name().map(PathBuf::from).unwrap_or_else(|| PathBuf::from(relative));
    let to = dest_dir.join(name);
    std::fs::copy(&from, &to).map_err(|source| NavigateError::Copy { from: from.clone(), to: to.clone(), source })?;
    Ok(to)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn download_copies_into_destination() {
        let assets = tempfile::tempdir().unwrap();
        let dest = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(assets.path().join("docs")).unwrap();
        std::fs::write(assets.path().join("docs/cv.pdf"), b"%PDF").unwrap();

        let saved = download_file(assets.path(), "/docs/cv.pdf", dest.path()).unwrap();
        assert_eq!(saved, dest.path().join("cv.pdf"));
        assert_eq!(std::fs::read(saved).unwrap(), b"%PDF");
    }

    #[test]
    fn missing_download_is_an_error() {
        let assets = tempfile::tempdir().unwrap();
        let dest = tempfile::tempdir().unwrap();
        assert!(matches!(
            download_file(assets.path(), "docs/none.pdf", dest.path()),
            Err(NavigateError::Copy { .. })
        ));
    }

    #[test]
    fn non_http_urls_are_rejected() {
        assert!(matches!(open_url("file:///etc/passwd"), Err(NavigateError::UnsupportedUrl(_))));
    }
}

//! Fetching installer files over HTTP or from local `file://` URLs

use crate::error::{DownloadError, Result};
use crate::files::InstallerFile;

use indicatif::{ProgressBar, ProgressStyle};
use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::Path;

const PROGRESS_TEMPLATE: &str = "  {msg} [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec}, {eta})";

/// Fetch `file` into its destination and return the final path
pub fn download(file: &InstallerFile) -> Result<std::path::PathBuf> {
    let url = file.url()?;
    let dest = file.dest_file()?;
    let tmp = file.download_file()?;

    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)?;
    }
    remove_previous(file, &dest)?;

    if let Some(local) = url.strip_prefix("file://") {
        tracing::info!("Copying {} to {}", local, dest.display());
        fs::copy(local, &tmp)?;
    } else if url.starts_with("http") {
        tracing::info!("Downloading {} to {}", url, dest.display());
        if let Err(e) = fetch(file, &url, &tmp) {
            fs::remove_file(&tmp).ok();
            return Err(e);
        }
    } else {
        return Err(DownloadError::UnsupportedUrl(url).into());
    }

    fs::rename(&tmp, &dest)?;
    Ok(dest)
}

/// Without a persistent cache a leftover from a previous attempt is stale
fn remove_previous(file: &InstallerFile, dest: &Path) -> Result<()> {
    if file.uses_persistent_cache() || !dest.exists() {
        return Ok(());
    }
    if dest.is_dir() {
        fs::remove_dir_all(dest)?;
    } else {
        fs::remove_file(dest)?;
    }
    Ok(())
}

fn fetch(file: &InstallerFile, url: &str, tmp: &Path) -> Result<()> {
    let client = reqwest::blocking::Client::builder()
        .user_agent(concat!("lutris-installer/", env!("CARGO_PKG_VERSION")))
        .build()?;

    let mut request = client.get(url);
    if let Some(referer) = file.referer() {
        request = request.header(reqwest::header::REFERER, referer);
    }
    let mut response = request.send()?;

    if !response.status().is_success() {
        return Err(DownloadError::Status {
            url: url.to_string(),
            status: response.status().as_u16(),
        }
        .into());
    }

    let total = response.content_length().or(file.size()).unwrap_or(0);
    let progress = ProgressBar::new(total);
    progress.set_style(
        ProgressStyle::default_bar()
            .template(PROGRESS_TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> "),
    );
    progress.set_message(file.filename().unwrap_or_else(|_| file.id.clone()));

    let mut out = io::BufWriter::new(File::create(tmp)?);
    let mut buffer = [0u8; 64 * 1024];
    loop {
        let read = response.read(&mut buffer)?;
        if read == 0 {
            break;
        }
        out.write_all(&buffer[..read])?;
        progress.inc(read as u64);
    }
    out.flush()?;
    progress.finish_and_clear();
    Ok(())
}

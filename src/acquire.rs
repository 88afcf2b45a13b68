//! Acquisition of the dataset file

use crate::{
    error::AcquisitionError,
    progress::{ProgressConfig, ProgressReport, Work},
};
use futures::StreamExt;
use reqwest::Response;
use std::{
    io,
    path::{Path, PathBuf},
};
use tokio::{fs, io::AsyncWriteExt};

/// Make sure that a dataset file is available locally
///
/// If there already is a file at `destination`, it is used as is. Otherwise,
/// `url` is downloaded there. The download goes to a temporary file first, so
/// that an interrupted download is never mistaken for a complete one.
pub async fn ensure_local(
    client: &reqwest::Client,
    destination: &Path,
    url: &str,
    report: &ProgressReport,
) -> Result<PathBuf, AcquisitionError> {
    // Reuse existing local copy, if any
    if fs::try_exists(destination)
        .await
        .map_err(write_error(destination))?
    {
        log::debug!("Reusing local copy {} of {url}", destination.display());
        return Ok(destination.to_owned());
    }

    // Set up the destination directory
    if let Some(parent) = destination
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
    {
        fs::create_dir_all(parent)
            .await
            .map_err(write_error(parent))?;
    }

    // Download into a temporary file, then move it into place
    log::info!("Downloading {url} into {}", destination.display());
    let partial = partial_path(destination);
    let downloaded = match download(client, url, &partial, report).await {
        Ok(downloaded) => downloaded,
        Err(e) => {
            if let Err(cleanup) = fs::remove_file(&partial).await {
                if cleanup.kind() != io::ErrorKind::NotFound {
                    log::warn!(
                        "Failed to clean up partial download {}: {cleanup}",
                        partial.display()
                    );
                }
            }
            return Err(e);
        }
    };
    fs::rename(&partial, destination)
        .await
        .map_err(write_error(destination))?;
    log::info!(
        "Downloaded {downloaded} bytes from {url} into {}",
        destination.display()
    );
    Ok(destination.to_owned())
}

/// Download a file, returning the number of bytes written
async fn download(
    client: &reqwest::Client,
    url: &str,
    path: &Path,
    report: &ProgressReport,
) -> Result<u64, AcquisitionError> {
    let download_error = |source| AcquisitionError::Download {
        url: url.into(),
        source,
    };

    // Start the download
    let response = client
        .get(url)
        .send()
        .await
        .and_then(Response::error_for_status)
        .map_err(download_error)?;
    let expected_len = response.content_length();
    if expected_len.is_none() {
        log::debug!("Server did not announce the size of {url}");
    }
    let bytes = report.add(
        "Downloading dataset",
        ProgressConfig::new(Work::Bytes(expected_len.unwrap_or(0))),
    );

    // Write down downloaded blocks of bytes as they come
    let mut file = fs::File::create(path).await.map_err(write_error(path))?;
    let mut stream = response.bytes_stream();
    let mut written = 0;
    while let Some(block) = stream.next().await {
        let block = block.map_err(download_error)?;
        file.write_all(&block).await.map_err(write_error(path))?;
        written += block.len() as u64;
        bytes.make_progress(block.len() as u64);
    }
    file.flush().await.map_err(write_error(path))?;
    bytes.finish();
    Ok(written)
}

/// Location of an ongoing download
fn partial_path(destination: &Path) -> PathBuf {
    let mut file_name = destination
        .file_name()
        .map(ToOwned::to_owned)
        .unwrap_or_default();
    file_name.push(".part");
    destination.with_file_name(file_name)
}

/// Error constructor for local storage failures
fn write_error(path: &Path) -> impl FnOnce(io::Error) -> AcquisitionError {
    let path = Box::<Path>::from(path);
    move |source| AcquisitionError::Write { path, source }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_downloads_live_next_to_their_destination() {
        assert_eq!(
            partial_path(Path::new("/data/AmazonReviews.zip")),
            Path::new("/data/AmazonReviews.zip.part")
        );
    }

    /// URL on a local port that nothing listens on
    async fn unreachable_url() -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        drop(listener);
        format!("http://{address}/reviews.txt")
    }

    #[tokio::test]
    async fn existing_file_is_reused_without_network_access() {
        let dir = tempfile::tempdir().unwrap();
        let destination = dir.path().join("reviews.txt");
        std::fs::write(&destination, "already here").unwrap();

        // Any request would fail
        let path = ensure_local(
            &reqwest::Client::new(),
            &destination,
            &unreachable_url().await,
            &ProgressReport::hidden(),
        )
        .await
        .unwrap();
        assert_eq!(path, destination);
        assert_eq!(std::fs::read_to_string(path).unwrap(), "already here");
    }

    #[tokio::test]
    async fn failed_download_leaves_nothing_behind() {
        let dir = tempfile::tempdir().unwrap();
        let destination = dir.path().join("nested").join("reviews.txt");
        let err = ensure_local(
            &reqwest::Client::new(),
            &destination,
            &unreachable_url().await,
            &ProgressReport::hidden(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AcquisitionError::Download { .. }));
        assert!(!destination.exists());
        assert!(!partial_path(&destination).exists());
    }
}

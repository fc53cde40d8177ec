use std::path::Path;
use std::time::Instant;

use tokio::io::{AsyncWrite, AsyncWriteExt};

use blockvault_model::validation::{validate_limit, validate_marker};
use blockvault_model::{BlockId, File, FileId, Vault};
use blockvault_protocol::headers::{media, CONTENT_TYPE, LOCATION, X_FILE_ID, X_FILE_LENGTH};
use blockvault_protocol::{
    decode_file_blocks, decode_json, encode_assignment, listing_path, next_marker, Separator,
};

use crate::assign::resolve_assignment;
use crate::client::VaultClient;
use crate::error::{ClientError, ClientResult};
use crate::transport::{Method, StreamingResponse};

impl VaultClient {
    /// Create a file in the vault and track it locally.
    pub async fn create_file(&self, vault: &mut Vault) -> ClientResult<FileId> {
        let request = self
            .request(Method::Post, &self.paths().files(vault.vault_id()))
            .await?;
        let (file_id, url) = self
            .execute("Create File", request, &[201], |response| {
                let file_id = FileId::new(response.headers.require(X_FILE_ID)?.trim())?;
                let url = response.headers.require(LOCATION)?.to_string();
                Ok((file_id, url))
            })
            .await?;

        let file = File::new(
            vault.project_id().clone(),
            vault.vault_id().clone(),
            file_id.clone(),
        )
        .with_url(url);
        vault.files_mut().add(file)?;
        Ok(file_id)
    }

    pub async fn delete_file(&self, vault: &Vault, file_id: &FileId) -> ClientResult<()> {
        let request = self
            .request(Method::Delete, &self.paths().file(vault.vault_id(), file_id))
            .await?;
        self.execute("Delete File", request, &[204], |_| Ok(()))
            .await
    }

    /// Finalize a file, declaring its length as the number of local offsets.
    pub async fn finalize_file(&self, vault: &Vault, file_id: &FileId) -> ClientResult<()> {
        let file = vault
            .files()
            .get(file_id)
            .ok_or_else(|| ClientError::FileNotInVault(file_id.clone()))?;
        let request = self
            .request(Method::Post, &self.paths().file(vault.vault_id(), file_id))
            .await?
            .header(X_FILE_LENGTH, file.len().to_string());
        self.execute("Finalize File", request, &[200, 204], |_| Ok(()))
            .await
    }

    /// Assign blocks to offsets of a file.
    ///
    /// Without `blocks`, the file's whole local offset map is submitted.
    /// Returns the block ids the service still needs uploaded.
    pub async fn assign_blocks_to_file(
        &self,
        vault: &Vault,
        file_id: &FileId,
        blocks: Option<&[(BlockId, u64)]>,
    ) -> ClientResult<Vec<BlockId>> {
        let pairs = resolve_assignment(vault.files(), file_id, blocks)?;
        for (block_id, offset) in &pairs {
            self.diagnostics().debug(
                "Assign Blocks To File",
                &format!("file {file_id}: offset {offset} -> block {block_id}"),
            );
        }
        let body = encode_assignment(&pairs)?;
        let request = self
            .request(
                Method::Post,
                &self.paths().file_blocks(vault.vault_id(), file_id),
            )
            .await?
            .header(CONTENT_TYPE, media::JSON)
            .body(body);
        self.execute("Assign Blocks To File", request, &[200], |response| {
            Ok(decode_json::<Vec<BlockId>>(&response.body)?)
        })
        .await
    }

    /// List the blocks assigned to a file, recording each in its offset map.
    ///
    /// Returns the listed block ids and the marker of the next page.
    pub async fn list_file_blocks(
        &self,
        vault: &mut Vault,
        file_id: &FileId,
        marker: Option<&str>,
        limit: Option<u32>,
    ) -> ClientResult<(Vec<BlockId>, Option<String>)> {
        if !vault.files().contains(file_id) {
            return Err(ClientError::FileNotInVault(file_id.clone()));
        }
        if let Some(marker) = marker {
            validate_marker(marker)?;
        }
        if let Some(limit) = limit {
            validate_limit(limit)?;
        }
        let path = listing_path(
            &self.paths().file_blocks(vault.vault_id(), file_id),
            marker,
            limit,
            Separator::Comma,
        );
        let request = self.request(Method::Get, &path).await?;
        let (entries, next) = self
            .execute("List File Blocks", request, &[200], |response| {
                Ok((
                    decode_file_blocks(&response.body)?,
                    next_marker(&response.headers)?,
                ))
            })
            .await?;

        let file = vault
            .files_mut()
            .get_mut(file_id)
            .ok_or_else(|| ClientError::FileNotInVault(file_id.clone()))?;
        let mut ids = Vec::with_capacity(entries.len());
        for (block_id, offset) in entries {
            file.assign(offset, block_id.clone());
            ids.push(block_id);
        }
        Ok((ids, next))
    }

    /// Stream a file's content into `sink`, returning the byte count.
    ///
    /// Writes never exceed the configured download chunk size.
    pub async fn download_file<W>(
        &self,
        vault: &Vault,
        file_id: &FileId,
        sink: &mut W,
    ) -> ClientResult<u64>
    where
        W: AsyncWrite + Unpin + Send,
    {
        let response = self.open_file(vault, file_id).await?;
        self.stream_into(response, sink).await
    }

    /// Download a file to `path`.
    ///
    /// Content is staged in a temporary file beside `path` and moved over it
    /// only once the whole body has arrived, so a failed download leaves any
    /// existing file at `path` as it was.
    pub async fn download_file_to_path(
        &self,
        vault: &Vault,
        file_id: &FileId,
        path: impl AsRef<Path>,
    ) -> ClientResult<u64> {
        let path = path.as_ref();
        let response = self.open_file(vault, file_id).await?;

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let staging = tempfile::Builder::new()
            .prefix(".download-")
            .tempfile_in(dir)?;
        let mut output = tokio::fs::File::from_std(staging.reopen()?);
        let written = self.stream_into(response, &mut output).await?;
        output.sync_all().await?;
        drop(output);
        staging
            .persist(path)
            .map_err(|err| ClientError::Io(err.error))?;
        Ok(written)
    }

    async fn open_file(&self, vault: &Vault, file_id: &FileId) -> ClientResult<StreamingResponse> {
        let request = self
            .request(Method::Get, &self.paths().file(vault.vault_id(), file_id))
            .await?;
        self.execute_streaming("Download File", request, &[200])
            .await
    }

    async fn stream_into<W>(&self, mut response: StreamingResponse, sink: &mut W) -> ClientResult<u64>
    where
        W: AsyncWrite + Unpin + Send,
    {
        let chunk_size = self.config().download_chunk_size;
        let started = Instant::now();
        let mut downloaded: u64 = 0;
        while let Some(chunk) = response.body.next_chunk().await? {
            for piece in chunk.chunks(chunk_size) {
                sink.write_all(piece).await?;
            }
            downloaded += chunk.len() as u64;
        }
        sink.flush().await?;

        let seconds = started.elapsed().as_secs_f64();
        let rate = if seconds > 0.0 {
            downloaded as f64 / seconds
        } else {
            downloaded as f64
        };
        self.diagnostics().info(
            "Download File",
            &format!(
                "downloaded {downloaded} bytes in {seconds:.3}s ({rate:.0} B/s, {:.1} KiB/s, {:.2} MiB/s)",
                rate / 1024.0,
                rate / 1024.0 / 1024.0
            ),
        );
        Ok(downloaded)
    }
}

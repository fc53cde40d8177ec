use bytes::Bytes;

use blockvault_model::validation::validate_limit;
use blockvault_model::{Block, BlockId, StorageId, Vault};
use blockvault_protocol::headers::{self, media, CONTENT_LENGTH, CONTENT_TYPE};
use blockvault_protocol::{decode_json, encode_block_batch, listing_path, next_marker, Separator};

use crate::client::VaultClient;
use crate::error::{ClientError, ClientResult};
use crate::transport::Method;

/// Metadata block fields carried by a head response.
struct BlockHead {
    ref_modified: i64,
    ref_count: u64,
    block_size: u64,
    storage_id: Option<StorageId>,
}

impl VaultClient {
    /// List metadata block ids of the vault, starting after `marker`.
    ///
    /// Every listed id is upserted into the vault's blocks; known blocks keep
    /// their state. The continuation marker is stored on the blocks
    /// collection, or cleared on the last page.
    pub async fn list_blocks(
        &self,
        vault: &mut Vault,
        marker: Option<&BlockId>,
        limit: Option<u32>,
    ) -> ClientResult<Vec<BlockId>> {
        if let Some(limit) = limit {
            validate_limit(limit)?;
        }
        let path = listing_path(
            &self.paths().blocks(vault.vault_id()),
            marker.map(BlockId::as_str),
            limit,
            Separator::Comma,
        );
        let request = self.request(Method::Get, &path).await?;
        let (ids, next) = self
            .execute("List Blocks", request, &[200], |response| {
                let ids: Vec<BlockId> = decode_json(&response.body)?;
                let next = next_marker(&response.headers)?
                    .map(BlockId::new)
                    .transpose()?;
                Ok((ids, next))
            })
            .await?;

        let blocks = vault.blocks_mut();
        for id in &ids {
            blocks.get_or_insert(id.clone());
        }
        blocks.set_marker(next);
        Ok(ids)
    }

    /// Fetch a metadata block's reference information.
    pub async fn head_block<'a>(
        &self,
        vault: &'a mut Vault,
        block_id: &BlockId,
    ) -> ClientResult<&'a Block> {
        let request = self
            .request(Method::Head, &self.paths().block(vault.vault_id(), block_id))
            .await?
            .header(CONTENT_TYPE, media::OCTET_STREAM);
        let head = self
            .execute("Head Block", request, &[204], |response| {
                Ok(BlockHead {
                    ref_modified: headers::ref_modified(&response.headers)?,
                    ref_count: headers::ref_count(&response.headers)?,
                    block_size: headers::block_size(&response.headers)?,
                    storage_id: headers::storage_id(&response.headers)?,
                })
            })
            .await?;

        let block = vault.blocks_mut().get_or_insert(block_id.clone());
        block.set_storage_id(head.storage_id)?;
        block.ref_modified = Some(head.ref_modified);
        block.ref_count = Some(head.ref_count);
        block.block_size = Some(head.block_size);
        // Metadata blocks are never orphaned.
        block.block_orphaned = Some(false);
        Ok(&*block)
    }

    /// Upload one block from the vault's blocks.
    pub async fn upload_block(&self, vault: &Vault, block_id: &BlockId) -> ClientResult<()> {
        let data = block_data(vault, block_id)?;
        let request = self
            .request(Method::Put, &self.paths().block(vault.vault_id(), block_id))
            .await?
            .header(CONTENT_TYPE, media::OCTET_STREAM)
            .header(CONTENT_LENGTH, data.len().to_string())
            .body(data);
        self.execute("Upload Block", request, &[201], |_| Ok(()))
            .await
    }

    /// Upload several blocks in one request.
    ///
    /// Every id must name a block of the vault that carries data; nothing is
    /// sent otherwise.
    pub async fn upload_blocks(&self, vault: &Vault, block_ids: &[BlockId]) -> ClientResult<()> {
        let mut batch = Vec::with_capacity(block_ids.len());
        for id in block_ids {
            batch.push((id, block_data(vault, id)?));
        }
        let body = encode_block_batch(batch.iter().map(|(id, data)| (*id, &data[..])))?;
        let request = self
            .request(Method::Post, &self.paths().blocks(vault.vault_id()))
            .await?
            .header(CONTENT_TYPE, media::MSGPACK)
            .body(body);
        self.execute("Upload Blocks", request, &[201], |_| Ok(()))
            .await
    }

    pub async fn delete_block(&self, vault: &Vault, block_id: &BlockId) -> ClientResult<()> {
        let request = self
            .request(Method::Delete, &self.paths().block(vault.vault_id(), block_id))
            .await?;
        self.execute("Delete Block", request, &[204], |_| Ok(()))
            .await
    }

    /// Delete each block in turn, reporting per id whether it was deleted.
    pub async fn delete_blocks(&self, vault: &Vault, block_ids: &[BlockId]) -> Vec<(BlockId, bool)> {
        let mut results = Vec::with_capacity(block_ids.len());
        for id in block_ids {
            let deleted = match self.delete_block(vault, id).await {
                Ok(()) => true,
                Err(err) => {
                    self.diagnostics()
                        .debug("Delete Blocks", &format!("block {id} not deleted: {err}"));
                    false
                }
            };
            results.push((id.clone(), deleted));
        }
        results
    }

    /// Download a block's content into the vault's blocks.
    pub async fn download_block<'a>(
        &self,
        vault: &'a mut Vault,
        block_id: &BlockId,
    ) -> ClientResult<&'a Block> {
        let request = self
            .request(Method::Get, &self.paths().block(vault.vault_id(), block_id))
            .await?;
        let data = self
            .execute("Download Block", request, &[200], |response| Ok(response.body))
            .await?;
        let block = vault.blocks_mut().get_or_insert(block_id.clone());
        block.data = Some(data);
        Ok(&*block)
    }
}

fn block_data(vault: &Vault, block_id: &BlockId) -> ClientResult<Bytes> {
    let block = vault
        .blocks()
        .get(block_id)
        .ok_or_else(|| ClientError::BlockNotInVault(block_id.clone()))?;
    block
        .data
        .clone()
        .ok_or_else(|| ClientError::BlockDataMissing(block_id.clone()))
}

use bytes::Bytes;

use blockvault_model::validation::validate_limit;
use blockvault_model::{Block, BlockId, StorageId, Vault};
use blockvault_protocol::headers::{self, media, CONTENT_TYPE};
use blockvault_protocol::{decode_json, listing_path, next_marker, Separator};

use crate::client::VaultClient;
use crate::error::ClientResult;
use crate::transport::Method;

struct StorageHead {
    ref_modified: i64,
    ref_count: u64,
    block_size: u64,
    block_id: Option<BlockId>,
    orphaned: bool,
}

struct StorageContent {
    data: Bytes,
    ref_modified: i64,
    ref_count: u64,
    block_id: Option<BlockId>,
}

impl VaultClient {
    /// List storage block ids of the vault, starting after `marker`.
    pub async fn list_storage_blocks(
        &self,
        vault: &mut Vault,
        marker: Option<&StorageId>,
        limit: Option<u32>,
    ) -> ClientResult<Vec<StorageId>> {
        if let Some(limit) = limit {
            validate_limit(limit)?;
        }
        let path = listing_path(
            &self.paths().storage_blocks(vault.vault_id()),
            marker.map(StorageId::as_str),
            limit,
            Separator::Ampersand,
        );
        let request = self.request(Method::Get, &path).await?;
        let (ids, next) = self
            .execute("List Storage Blocks", request, &[200], |response| {
                let ids: Vec<StorageId> = decode_json(&response.body)?;
                let next = next_marker(&response.headers)?
                    .map(StorageId::new)
                    .transpose()?;
                Ok((ids, next))
            })
            .await?;

        let blocks = vault.storage_blocks_mut();
        for id in &ids {
            blocks.get_or_insert(id.clone());
        }
        blocks.set_marker(next);
        Ok(ids)
    }

    pub async fn head_storage_block<'a>(
        &self,
        vault: &'a mut Vault,
        storage_id: &StorageId,
    ) -> ClientResult<&'a Block> {
        let request = self
            .request(
                Method::Head,
                &self.paths().storage_block(vault.vault_id(), storage_id),
            )
            .await?
            .header(CONTENT_TYPE, media::OCTET_STREAM);
        let head = self
            .execute("Head Storage Block", request, &[204], |response| {
                Ok(StorageHead {
                    ref_modified: headers::ref_modified(&response.headers)?,
                    ref_count: headers::ref_count(&response.headers)?,
                    block_size: headers::block_size(&response.headers)?,
                    block_id: headers::block_id(&response.headers)?,
                    orphaned: headers::orphaned(&response.headers)?,
                })
            })
            .await?;

        let block = vault.storage_blocks_mut().get_or_insert(storage_id.clone());
        block.set_block_id(head.block_id)?;
        block.ref_modified = Some(head.ref_modified);
        block.ref_count = Some(head.ref_count);
        block.block_size = Some(head.block_size);
        block.block_orphaned = Some(head.orphaned);
        Ok(&*block)
    }

    /// Download a storage block's content and reference information.
    pub async fn download_storage_block<'a>(
        &self,
        vault: &'a mut Vault,
        storage_id: &StorageId,
    ) -> ClientResult<&'a Block> {
        let request = self
            .request(
                Method::Get,
                &self.paths().storage_block(vault.vault_id(), storage_id),
            )
            .await?;
        let content = self
            .execute("Download Storage Block", request, &[200], |response| {
                Ok(StorageContent {
                    ref_modified: headers::ref_modified(&response.headers)?,
                    ref_count: headers::ref_count(&response.headers)?,
                    block_id: headers::block_id(&response.headers)?,
                    data: response.body,
                })
            })
            .await?;

        let block = vault.storage_blocks_mut().get_or_insert(storage_id.clone());
        block.set_block_id(content.block_id)?;
        block.ref_modified = Some(content.ref_modified);
        block.ref_count = Some(content.ref_count);
        block.data = Some(content.data);
        Ok(&*block)
    }

    pub async fn delete_storage_block(
        &self,
        vault: &Vault,
        storage_id: &StorageId,
    ) -> ClientResult<()> {
        let request = self
            .request(
                Method::Delete,
                &self.paths().storage_block(vault.vault_id(), storage_id),
            )
            .await?;
        self.execute("Delete Storage Block", request, &[204], |_| Ok(()))
            .await
    }
}

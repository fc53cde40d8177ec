use serde_json::{Map, Value};

use blockvault_model::validation::validate_limit;
use blockvault_model::{Vault, VaultId, VaultStatus, Vaults};
use blockvault_protocol::{decode_json, decode_vault_listing, listing_path, next_marker, Separator};

use crate::client::VaultClient;
use crate::error::{ClientError, ClientResult};
use crate::transport::Method;

impl VaultClient {
    /// List vault ids of the project, starting after `marker`.
    ///
    /// Vaults not yet in `vaults` are added as valid. The continuation marker
    /// is stored on `vaults`, or cleared on the last page.
    pub async fn list_vaults(
        &self,
        vaults: &mut Vaults,
        marker: Option<&VaultId>,
        limit: Option<u32>,
    ) -> ClientResult<Vec<VaultId>> {
        if let Some(limit) = limit {
            validate_limit(limit)?;
        }
        let path = listing_path(
            &self.paths().vaults(),
            marker.map(VaultId::as_str),
            limit,
            Separator::Ampersand,
        );
        let request = self.request(Method::Get, &path).await?;
        let (ids, next) = self
            .execute("List Vaults", request, &[200], |response| {
                let ids = decode_vault_listing(&response.body)?;
                let next = next_marker(&response.headers)?
                    .map(VaultId::new)
                    .transpose()?;
                Ok((ids, next))
            })
            .await?;

        for id in &ids {
            if !vaults.contains(id) {
                vaults.get_or_insert(id.clone()).set_status(VaultStatus::Valid);
            }
        }
        vaults.set_marker(next);
        Ok(ids)
    }

    pub async fn create_vault(&self, vault_id: &VaultId) -> ClientResult<Vault> {
        let project_id = self.project_id()?;
        let request = self
            .request(Method::Put, &self.paths().vault(vault_id))
            .await?;
        self.execute("Create Vault", request, &[201], |_| Ok(()))
            .await?;
        let mut vault = Vault::new(project_id, vault_id.clone());
        vault.set_status(VaultStatus::Created);
        Ok(vault)
    }

    /// Fetch a vault that the service reports as existing.
    pub async fn get_vault(&self, vault_id: &VaultId) -> ClientResult<Vault> {
        let project_id = self.project_id()?;
        if !self.vault_exists_by_id(vault_id).await? {
            return Err(ClientError::VaultNotFound(vault_id.clone()));
        }
        let mut vault = Vault::new(project_id, vault_id.clone());
        vault.set_status(VaultStatus::Valid);
        Ok(vault)
    }

    /// Probe the vault and record the outcome in its status.
    pub async fn vault_exists(&self, vault: &mut Vault) -> ClientResult<bool> {
        let exists = self.vault_exists_by_id(vault.vault_id()).await?;
        vault.set_status(if exists {
            VaultStatus::Valid
        } else {
            VaultStatus::Invalid
        });
        Ok(exists)
    }

    pub async fn vault_exists_by_id(&self, vault_id: &VaultId) -> ClientResult<bool> {
        let request = self
            .request(Method::Head, &self.paths().vault(vault_id))
            .await?;
        self.execute("Vault Exists", request, &[204, 404], |response| {
            Ok(response.status == 204)
        })
        .await
    }

    pub async fn delete_vault(&self, vault: &mut Vault) -> ClientResult<()> {
        let request = self
            .request(Method::Delete, &self.paths().vault(vault.vault_id()))
            .await?;
        self.execute("Delete Vault", request, &[204], |_| Ok(()))
            .await?;
        vault.set_status(VaultStatus::Deleted);
        Ok(())
    }

    /// Fetch the statistics document and store it on the vault.
    pub async fn vault_statistics<'a>(
        &self,
        vault: &'a mut Vault,
    ) -> ClientResult<&'a Map<String, Value>> {
        let request = self
            .request(Method::Get, &self.paths().vault(vault.vault_id()))
            .await?;
        let statistics = self
            .execute("Get Vault Statistics", request, &[200], |response| {
                Ok(decode_json::<Map<String, Value>>(&response.body)?)
            })
            .await?;
        Ok(&*vault.statistics.insert(statistics))
    }
}
